// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::config::ChannelRef;
use miette::Diagnostic;
use std::error::Error;
use std::fmt;
use twilight_mention::fmt::Mention;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, UserMarker};

/// A failure from the chat platform: HTTP errors, response decoding errors, and the like.
///
/// Boxed so the ticket flows don't depend on the error types of any one client.
#[derive(Debug, Diagnostic)]
pub struct PlatformError(pub Box<dyn Error + Send + Sync>);

impl PlatformError {
	pub fn new(error: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
		Self(error.into())
	}
}

impl fmt::Display for PlatformError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(&self.0, f)
	}
}

impl Error for PlatformError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		self.0.source()
	}
}

/// Everything that can stop a ticket flow.
#[derive(Debug, Diagnostic)]
pub enum TicketError {
	/// The user already has an open ticket (or is opening one right now).
	AlreadyOpen { channel_id: Option<Id<ChannelMarker>> },
	NotStaff,
	AlreadyClaimed { claimed_by: Id<UserMarker> },
	NotATicketChannel,
	/// Someone else is already closing the ticket.
	AlreadyClosing,
	/// One of the fixed ticket channels is missing.
	ContainerNotFound(ChannelRef),
	/// The submitted issue text was empty or too long.
	InvalidIssue { max_length: u16 },
	Platform(PlatformError),
}

impl TicketError {
	/// Whether the error is a validation failure caused by the acting user rather than a failure talking to the
	/// platform.
	pub fn is_validation(&self) -> bool {
		!matches!(self, Self::Platform(_) | Self::ContainerNotFound(_))
	}

	/// The message shown privately to the user whose action failed.
	pub fn notice(&self) -> String {
		match self {
			Self::AlreadyOpen { channel_id: Some(channel_id) } => {
				format!("You already have an open ticket: {}", channel_id.mention())
			}
			Self::AlreadyOpen { channel_id: None } => String::from("You already have an open ticket!"),
			Self::NotStaff => String::from("Only staff can claim tickets."),
			Self::AlreadyClaimed { claimed_by } => {
				format!("This ticket is already claimed by {}!", claimed_by.mention())
			}
			Self::NotATicketChannel => String::from("This is not a ticket channel."),
			Self::AlreadyClosing => String::from("This ticket is already being closed."),
			Self::ContainerNotFound(_) => {
				String::from("The ticket system isn't set up correctly right now. Please let the staff know.")
			}
			Self::InvalidIssue { max_length } => format!(
				"Please describe your issue in at most {} characters.",
				max_length
			),
			Self::Platform(_) => String::from("Something went wrong while handling the ticket. Please try again."),
		}
	}
}

impl From<PlatformError> for TicketError {
	fn from(error: PlatformError) -> Self {
		Self::Platform(error)
	}
}

impl Error for TicketError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			Self::Platform(error) => Some(error),
			_ => None,
		}
	}
}

impl fmt::Display for TicketError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::AlreadyOpen { .. } => write!(f, "the user already has an open ticket"),
			Self::NotStaff => write!(f, "the user is not a staff member"),
			Self::AlreadyClaimed { claimed_by } => write!(f, "the ticket is already claimed by {}", claimed_by),
			Self::NotATicketChannel => write!(f, "the channel is not a ticket channel"),
			Self::AlreadyClosing => write!(f, "the ticket is already being closed"),
			Self::ContainerNotFound(channel) => write!(f, "the ticket channel {} does not exist", channel),
			Self::InvalidIssue { max_length } => {
				write!(f, "the issue text is empty or longer than {} characters", max_length)
			}
			Self::Platform(error) => write!(f, "platform error: {}", error),
		}
	}
}
