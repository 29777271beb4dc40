// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::discord::DiscordTickets;
use crate::discord::utils::responses::{ephemeral_message, error_notice};
use miette::{IntoDiagnostic, bail};
use twilight_http::client::Client;
use twilight_model::application::command::{Command, CommandType};
use twilight_model::application::interaction::InteractionContextType;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::guild::Permissions;
use twilight_model::id::Id;
use twilight_model::id::marker::ApplicationMarker;
use twilight_util::builder::command::CommandBuilder;

pub const COMMAND_NAME: &str = "ticketpanel";

pub fn command_definition() -> Command {
	CommandBuilder::new(
		COMMAND_NAME,
		"Post the support ticket panel in this channel",
		CommandType::ChatInput,
	)
	.contexts([InteractionContextType::Guild])
	.default_member_permissions(Permissions::ADMINISTRATOR)
	.build()
}

pub async fn handle_command(
	interaction: &InteractionCreate,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	ticket_system: &DiscordTickets,
) -> miette::Result<()> {
	let Some(channel) = &interaction.channel else {
		bail!("Ticket panel command used outside of a channel");
	};
	let is_administrator = interaction
		.member
		.as_ref()
		.and_then(|member| member.permissions)
		.is_some_and(|permissions| permissions.contains(Permissions::ADMINISTRATOR));

	let response = if !is_administrator {
		ephemeral_message("Only administrators can post the ticket panel.")
	} else {
		match ticket_system.post_panel(channel.id).await {
			Ok(_) => ephemeral_message("Ticket panel posted."),
			Err(error) => ephemeral_message(error_notice(&error)),
		}
	};

	let interaction_client = http_client.interaction(application_id);
	interaction_client
		.create_response(interaction.id, &interaction.token, &response)
		.await
		.into_diagnostic()?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn command_is_limited_to_administrators() {
		let command = command_definition();
		assert_eq!(command.name, COMMAND_NAME);
		assert_eq!(command.default_member_permissions, Some(Permissions::ADMINISTRATOR));
	}
}
