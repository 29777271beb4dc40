// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::tickets::TicketError;
use twilight_model::channel::message::MessageFlags;
use twilight_model::http::interaction::{InteractionResponse, InteractionResponseType};
use twilight_util::builder::InteractionResponseDataBuilder;

/// A reply only the interacting user can see.
pub fn ephemeral_message(content: impl Into<String>) -> InteractionResponse {
	let response = InteractionResponseDataBuilder::new()
		.content(content)
		.flags(MessageFlags::EPHEMERAL)
		.build();
	InteractionResponse {
		kind: InteractionResponseType::ChannelMessageWithSource,
		data: Some(response),
	}
}

/// Acknowledges an interaction now with a private "thinking" state, to be followed up later.
pub fn deferred_ephemeral_message() -> InteractionResponse {
	let response = InteractionResponseDataBuilder::new()
		.flags(MessageFlags::EPHEMERAL)
		.build();
	InteractionResponse {
		kind: InteractionResponseType::DeferredChannelMessageWithSource,
		data: Some(response),
	}
}

/// The text shown to a user when their ticket action fails.
///
/// Failures that aren't the user's doing are logged as well.
pub fn error_notice(error: &TicketError) -> String {
	if !error.is_validation() {
		tracing::error!(source = ?error, "A ticket action failed");
	}
	error.notice()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn validation_errors_are_shown_to_the_user() {
		assert_eq!(error_notice(&TicketError::NotStaff), TicketError::NotStaff.notice());
	}

	#[test]
	fn platform_errors_get_a_generic_notice() {
		let error = TicketError::Platform(crate::tickets::PlatformError::new("Missing Access"));
		assert!(!error_notice(&error).contains("Missing Access"));
	}

	#[test]
	fn replies_are_private() {
		let response = ephemeral_message("hi");
		let flags = response.data.and_then(|data| data.flags).unwrap();
		assert!(flags.contains(MessageFlags::EPHEMERAL));
	}
}
