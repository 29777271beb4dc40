// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::components::ticket_controls;
use super::{Actor, NewTextChannel, OutgoingMessage, TicketError, TicketPlatform, TicketSystem};
use crate::model::{Ticket, TicketCategory, TicketTopic};
use twilight_mention::fmt::Mention;
use twilight_model::channel::ChannelType;
use twilight_model::channel::permission_overwrite::{PermissionOverwrite, PermissionOverwriteType};
use twilight_model::guild::Permissions;
use twilight_model::id::Id;
use twilight_model::id::marker::{GuildMarker, RoleMarker, UserMarker};

const MAX_CHANNEL_NAME_LENGTH: usize = 100;

/// Builds the channel name for a new ticket, like `report-ticket-alice`.
pub fn ticket_channel_name(category: TicketCategory, user_name: &str) -> String {
	let mut user_part = String::new();
	for character in user_name.chars().flat_map(char::to_lowercase) {
		if character.is_alphanumeric() || character == '_' {
			user_part.push(character);
		} else if !user_part.ends_with('-') {
			user_part.push('-');
		}
	}
	let user_part = user_part.trim_matches('-');
	let user_part = if user_part.is_empty() { "user" } else { user_part };

	let name = format!("{}-ticket-{}", category.as_id(), user_part);
	name.chars().take(MAX_CHANNEL_NAME_LENGTH).collect()
}

/// The access rules for a new ticket channel: hidden from everyone except the requester (who can write) and staff
/// (who can read).
pub fn ticket_permission_overwrites(
	guild_id: Id<GuildMarker>,
	requester_id: Id<UserMarker>,
	staff_role: Id<RoleMarker>,
) -> Vec<PermissionOverwrite> {
	let read = Permissions::VIEW_CHANNEL | Permissions::READ_MESSAGE_HISTORY;
	vec![
		PermissionOverwrite {
			allow: Permissions::empty(),
			deny: Permissions::VIEW_CHANNEL,
			id: guild_id.cast(),
			kind: PermissionOverwriteType::Role,
		},
		PermissionOverwrite {
			allow: read | Permissions::SEND_MESSAGES,
			deny: Permissions::empty(),
			id: requester_id.cast(),
			kind: PermissionOverwriteType::Member,
		},
		PermissionOverwrite {
			allow: read,
			deny: Permissions::empty(),
			id: staff_role.cast(),
			kind: PermissionOverwriteType::Role,
		},
	]
}

impl<P: TicketPlatform> TicketSystem<P> {
	/// Checks whether a user may start opening a ticket. The check is repeated when the form is submitted.
	pub fn check_can_open(&self, requester_id: Id<UserMarker>) -> Result<(), TicketError> {
		match self.registry.get(requester_id) {
			Some(ticket) => Err(TicketError::AlreadyOpen {
				channel_id: Some(ticket.channel_id),
			}),
			None => Ok(()),
		}
	}

	/// Opens a ticket from a submitted issue form.
	///
	/// Creates the ticket channel, posts the issue in it, and records the ticket. Nothing is recorded unless the
	/// channel was created and the issue was posted.
	pub async fn open_ticket(
		&self,
		requester: &Actor,
		category: TicketCategory,
		issue: &str,
	) -> Result<Ticket, TicketError> {
		let issue = issue.trim();
		let max_length = self.settings.issue_max_length;
		if issue.is_empty() || issue.chars().count() > usize::from(max_length) {
			return Err(TicketError::InvalidIssue { max_length });
		}

		let reservation = self.registry.reserve(requester.id)?;

		let container = self
			.resolve_channel(&self.settings.category, ChannelType::GuildCategory)
			.await?;

		let new_channel = NewTextChannel {
			name: ticket_channel_name(category, &requester.name),
			parent_id: Some(container.id),
			topic: Some(TicketTopic::render(category, &requester.name, requester.id)),
			permission_overwrites: ticket_permission_overwrites(
				self.settings.guild_id,
				requester.id,
				self.settings.staff_role,
			),
		};
		let channel = self.platform.create_text_channel(new_channel).await?;

		let first_message = OutgoingMessage {
			content: Some(format!(
				"**New {} Ticket**\n**User:** {}\n**Issue:** {}",
				category,
				requester.id.mention(),
				issue
			)),
			embeds: Vec::new(),
			components: vec![ticket_controls()],
			mentioned_users: vec![requester.id],
		};
		if let Err(error) = self.platform.send_message(channel.id, first_message).await {
			if let Err(delete_error) = self.platform.delete_channel(channel.id).await {
				tracing::warn!(
					channel = %channel.id,
					source = ?delete_error,
					"Failed to delete ticket channel after its first message failed"
				);
			}
			return Err(error.into());
		}

		let ticket = Ticket::new(requester.id, channel.id, category, channel.created_at);
		reservation.commit(ticket.clone());
		tracing::info!(
			requester = %requester.id,
			channel = %channel.id,
			category = %category,
			"Opened ticket"
		);
		Ok(ticket)
	}
}
