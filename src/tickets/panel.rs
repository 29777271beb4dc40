// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::components::{is_panel_message, panel_message};
use super::{TicketError, TicketPlatform, TicketSystem};
use crate::model::{Ticket, TicketState, TicketTopic};
use twilight_model::channel::ChannelType;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, MessageMarker};

/// How many of the panel channel's latest messages are checked for an existing panel.
const PANEL_SEARCH_DEPTH: u16 = 50;

/// What happened while setting up the ticket channels at startup.
#[derive(Debug, Default)]
pub struct PanelReport {
	pub panel_channel: Option<Id<ChannelMarker>>,
	/// Set when a new panel message was posted. Stays unset if an existing panel was found.
	pub panel_message: Option<Id<MessageMarker>>,
	pub recovered_tickets: usize,
}

impl<P: TicketPlatform> TicketSystem<P> {
	/// Makes sure the ticket category, transcript channel, and panel channel exist, and posts the panel if the panel
	/// channel doesn't already have one.
	pub async fn publish_panel(&self) -> Result<PanelReport, TicketError> {
		self.ensure_channel(&self.settings.category, ChannelType::GuildCategory)
			.await?;
		self.ensure_channel(&self.settings.transcript_channel, ChannelType::GuildText)
			.await?;
		let panel_channel = self
			.ensure_channel(&self.settings.panel_channel, ChannelType::GuildText)
			.await?;

		let bot_id = self.platform.current_user_id().await?;
		let recent = self
			.platform
			.recent_messages(panel_channel.id, PANEL_SEARCH_DEPTH)
			.await?;
		let existing_panel = recent
			.iter()
			.find(|message| message.author_id == bot_id && is_panel_message(&message.component_ids));
		if let Some(existing) = existing_panel {
			tracing::debug!(channel = %panel_channel.id, message = %existing.id, "Ticket panel already posted");
			return Ok(PanelReport {
				panel_channel: Some(panel_channel.id),
				..PanelReport::default()
			});
		}

		let message_id = self.post_panel(panel_channel.id).await?;
		Ok(PanelReport {
			panel_channel: Some(panel_channel.id),
			panel_message: Some(message_id),
			recovered_tickets: 0,
		})
	}

	/// Posts the ticket panel in a channel, whether or not it already has one.
	pub async fn post_panel(&self, channel_id: Id<ChannelMarker>) -> Result<Id<MessageMarker>, TicketError> {
		let message_id = self.platform.send_message(channel_id, panel_message()).await?;
		tracing::info!(channel = %channel_id, message = %message_id, "Posted ticket panel");
		Ok(message_id)
	}

	/// Rebuilds the registry from the topics of the channels in the ticket category.
	///
	/// Tickets opened before a restart are otherwise unknown, since the registry lives only in memory. Returns how
	/// many tickets were added.
	pub async fn reconcile(&self) -> Result<usize, TicketError> {
		let container = self
			.resolve_channel(&self.settings.category, ChannelType::GuildCategory)
			.await?;
		let channels = self.platform.channels_in_category(container.id).await?;

		let mut recovered = 0;
		for channel in channels {
			if channel.kind != ChannelType::GuildText || self.registry.lookup_by_channel(channel.id).is_some() {
				continue;
			}
			let Some(topic) = channel.topic.as_deref().and_then(TicketTopic::parse) else {
				tracing::debug!(channel = %channel.id, name = %channel.name, "Skipping channel without a ticket topic");
				continue;
			};

			let mut ticket = Ticket::new(topic.requester_id, channel.id, topic.category, channel.created_at);
			if let Some(claimed_by) = topic.claimed_by {
				ticket.claimed_by = Some(claimed_by);
				ticket.state = TicketState::Claimed;
			}
			match self.registry.register(ticket) {
				Ok(()) => recovered += 1,
				Err(error) => tracing::warn!(
					channel = %channel.id,
					requester = %topic.requester_id,
					source = ?error,
					"Not recovering ticket channel"
				),
			}
		}

		tracing::info!(recovered, "Reconciled open tickets");
		Ok(recovered)
	}

	/// The startup work for the ticket system: channels, panel, and recovered tickets.
	pub async fn start(&self) -> Result<PanelReport, TicketError> {
		let mut report = self.publish_panel().await?;
		report.recovered_tickets = self.reconcile().await?;
		Ok(report)
	}
}
