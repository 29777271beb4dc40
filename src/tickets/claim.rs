// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{Actor, OutgoingMessage, TicketError, TicketPlatform, TicketSystem};
use crate::model::{Ticket, TicketTopic};
use twilight_mention::fmt::Mention;
use twilight_model::channel::permission_overwrite::{PermissionOverwrite, PermissionOverwriteType};
use twilight_model::guild::Permissions;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, UserMarker};

/// The access rules for a ticket channel once a staff member claims it.
///
/// Every member overwrite except the requester's loses the ability to send messages, and the claimant gets their own
/// read and write access. Role overwrites are left alone.
pub fn claimed_permission_overwrites(
	current: &[PermissionOverwrite],
	requester_id: Id<UserMarker>,
	claimant_id: Id<UserMarker>,
) -> Vec<PermissionOverwrite> {
	let mut overwrites: Vec<PermissionOverwrite> = current
		.iter()
		.filter(|overwrite| !is_member(overwrite, claimant_id))
		.map(|overwrite| {
			let mut overwrite = overwrite.clone();
			if overwrite.kind == PermissionOverwriteType::Member && !is_member(&overwrite, requester_id) {
				overwrite.allow.remove(Permissions::SEND_MESSAGES);
				overwrite.deny.insert(Permissions::SEND_MESSAGES);
			}
			overwrite
		})
		.collect();
	overwrites.push(PermissionOverwrite {
		allow: Permissions::VIEW_CHANNEL | Permissions::READ_MESSAGE_HISTORY | Permissions::SEND_MESSAGES,
		deny: Permissions::empty(),
		id: claimant_id.cast(),
		kind: PermissionOverwriteType::Member,
	});
	overwrites
}

fn is_member(overwrite: &PermissionOverwrite, user_id: Id<UserMarker>) -> bool {
	overwrite.kind == PermissionOverwriteType::Member && overwrite.id == user_id.cast()
}

impl<P: TicketPlatform> TicketSystem<P> {
	/// Assigns the ticket in a channel to the staff member using the claim button.
	///
	/// If the channel's access rules can't be changed, the claim is undone. If the topic can't be updated afterward,
	/// the access rules stay changed and the error is returned.
	pub async fn claim_ticket(&self, channel_id: Id<ChannelMarker>, actor: &Actor) -> Result<Ticket, TicketError> {
		if !actor.has_role(self.settings.staff_role) {
			return Err(TicketError::NotStaff);
		}

		let Some(channel) = self.platform.channel(channel_id).await? else {
			return Err(TicketError::NotATicketChannel);
		};
		let topic = channel.topic.as_deref().unwrap_or_default();
		if let Some(claimed_by) = TicketTopic::parse(topic).and_then(|topic| topic.claimed_by) {
			return Err(TicketError::AlreadyClaimed { claimed_by });
		}

		let ticket = self.registry.claim(channel_id, actor.id)?;

		let overwrites = claimed_permission_overwrites(&channel.permission_overwrites, ticket.requester_id, actor.id);
		if let Err(error) = self.platform.set_permission_overwrites(channel_id, &overwrites).await {
			self.registry.release_claim(channel_id);
			return Err(error.into());
		}

		let claimed_topic = TicketTopic::render_claim(topic, &actor.name, actor.id);
		self.platform.set_topic(channel_id, &claimed_topic).await?;

		let announcement = OutgoingMessage {
			mentioned_users: vec![actor.id],
			..OutgoingMessage::text(format!(
				"🔒 Ticket has been claimed by {} and locked.",
				actor.id.mention()
			))
		};
		self.platform.send_message(channel_id, announcement).await?;

		tracing::info!(channel = %channel_id, staff = %actor.id, "Claimed ticket");
		Ok(ticket)
	}
}
