// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The support ticket lifecycle: opening tickets from a panel, claiming them, and closing them into a transcript.
//!
//! The flows only talk to the chat platform through [TicketPlatform], and all ticket state lives in the
//! [TicketRegistry] owned by a [TicketSystem].

use crate::config::{ChannelRef, ConfigData};
use twilight_model::channel::ChannelType;
use twilight_model::id::Id;
use twilight_model::id::marker::{GuildMarker, RoleMarker, UserMarker};

mod claim;
mod close;
pub mod components;
mod error;
mod intake;
mod panel;
pub mod platform;
mod registry;
pub mod transcript;

#[cfg(test)]
mod testing;

pub use claim::claimed_permission_overwrites;
pub use close::ClosedTicket;
pub use intake::{ticket_channel_name, ticket_permission_overwrites};
pub use error::{PlatformError, TicketError};
pub use panel::PanelReport;
pub use platform::{ChannelInfo, HistoryMessage, NewTextChannel, OutgoingMessage, TicketPlatform};
pub use registry::{ClosingChannel, Reservation, TicketRegistry};

/// The fixed settings the ticket flows need.
#[derive(Clone, Debug)]
pub struct TicketSettings {
	pub guild_id: Id<GuildMarker>,
	pub staff_role: Id<RoleMarker>,
	pub category: ChannelRef,
	pub panel_channel: ChannelRef,
	pub transcript_channel: ChannelRef,
	pub issue_max_length: u16,
}

impl TicketSettings {
	pub fn from_config(config: &ConfigData) -> Self {
		let tickets = &config.tickets;
		Self {
			guild_id: config.discord.guild_id,
			staff_role: tickets.staff_role,
			category: tickets.category.clone(),
			panel_channel: tickets.panel_channel.clone(),
			transcript_channel: tickets.transcript_channel.clone(),
			issue_max_length: tickets.issue_max_length,
		}
	}
}

/// The user performing a ticket action.
#[derive(Clone, Debug)]
pub struct Actor {
	pub id: Id<UserMarker>,
	pub name: String,
	pub roles: Vec<Id<RoleMarker>>,
}

impl Actor {
	pub fn has_role(&self, role: Id<RoleMarker>) -> bool {
		self.roles.contains(&role)
	}
}

/// The ticket system for one guild: the platform it runs against, its open tickets, and its settings.
pub struct TicketSystem<P> {
	pub platform: P,
	pub registry: TicketRegistry,
	pub settings: TicketSettings,
}

impl<P: TicketPlatform> TicketSystem<P> {
	pub fn new(platform: P, settings: TicketSettings) -> Self {
		Self {
			platform,
			registry: TicketRegistry::new(),
			settings,
		}
	}

	/// Looks up one of the fixed channels. Missing channels are an error; they are never created here.
	async fn resolve_channel(&self, channel: &ChannelRef, kind: ChannelType) -> Result<ChannelInfo, TicketError> {
		let found = match channel {
			ChannelRef::Id(id) => self.platform.channel(*id).await?,
			ChannelRef::Name(name) => self.platform.find_channel(name, kind).await?,
		};
		found.ok_or_else(|| TicketError::ContainerNotFound(channel.clone()))
	}

	/// Looks up one of the fixed channels, creating it if it's referenced by name and doesn't exist yet.
	async fn ensure_channel(&self, channel: &ChannelRef, kind: ChannelType) -> Result<ChannelInfo, TicketError> {
		let ChannelRef::Name(name) = channel else {
			return self.resolve_channel(channel, kind).await;
		};
		if let Some(existing) = self.platform.find_channel(name, kind).await? {
			return Ok(existing);
		}

		let created = if kind == ChannelType::GuildCategory {
			self.platform.create_category(name).await?
		} else {
			let new_channel = NewTextChannel {
				name: name.clone(),
				parent_id: None,
				topic: None,
				permission_overwrites: Vec::new(),
			};
			self.platform.create_text_channel(new_channel).await?
		};
		tracing::info!(name = %name, channel = %created.id, "Created ticket channel");
		Ok(created)
	}
}
