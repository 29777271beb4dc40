// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::transcript::render_transcript;
use super::{Actor, ChannelInfo, TicketError, TicketPlatform, TicketSystem};
use crate::model::{Ticket, TicketState};
use twilight_model::channel::ChannelType;
use twilight_model::id::Id;
use twilight_model::id::marker::ChannelMarker;

/// The result of closing a ticket channel.
#[derive(Debug)]
pub struct ClosedTicket {
	/// The registry entry removed for the channel. Channels left over from a previous run may not have one.
	pub ticket: Option<Ticket>,
	pub transcript_lines: usize,
}

impl<P: TicketPlatform> TicketSystem<P> {
	/// Checks that a channel is a ticket channel that can be closed, returning it.
	pub async fn check_can_close(&self, channel_id: Id<ChannelMarker>) -> Result<ChannelInfo, TicketError> {
		let Some(channel) = self.platform.channel(channel_id).await? else {
			return Err(TicketError::NotATicketChannel);
		};
		let container = self
			.resolve_channel(&self.settings.category, ChannelType::GuildCategory)
			.await?;
		if channel.parent_id != Some(container.id) {
			return Err(TicketError::NotATicketChannel);
		}
		Ok(channel)
	}

	/// Archives a ticket channel's transcript and deletes the channel.
	///
	/// The transcript is uploaded before anything is removed. If the upload fails, the ticket stays open and the
	/// error is returned. While one close of a channel is running, others fail with [TicketError::AlreadyClosing].
	pub async fn close_ticket(&self, channel: &ChannelInfo, actor: &Actor) -> Result<ClosedTicket, TicketError> {
		let _closing = self.registry.begin_close(channel.id)?;
		let history = self.platform.message_history(channel.id).await?;
		let transcript = render_transcript(&channel.name, &history);

		let archive = self
			.ensure_channel(&self.settings.transcript_channel, ChannelType::GuildText)
			.await?;
		self.platform
			.upload_file(
				archive.id,
				&transcript.header,
				&transcript.file_name,
				transcript.body.into_bytes(),
			)
			.await?;

		let ticket = self.registry.remove_by_channel(channel.id).map(|mut ticket| {
			ticket.state = TicketState::Closed;
			ticket
		});
		self.platform.delete_channel(channel.id).await?;

		tracing::info!(
			channel = %channel.id,
			closed_by = %actor.id,
			requester = ?ticket.as_ref().map(|ticket| ticket.requester_id),
			lines = transcript.line_count,
			"Closed ticket"
		);
		Ok(ClosedTicket {
			ticket,
			transcript_lines: transcript.line_count,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::TicketCategory;
	use crate::tickets::testing::{FakePlatform, provisioned_system, staff, user};

	async fn system_with_ticket() -> (TicketSystem<FakePlatform>, Ticket) {
		let system = provisioned_system();
		let ticket = system
			.open_ticket(&user(11, "U1"), TicketCategory::Report, "cannot login")
			.await
			.unwrap();
		(system, ticket)
	}

	#[tokio::test]
	async fn closing_archives_three_messages_in_order() {
		let system = provisioned_system();
		let ticket = system
			.open_ticket(&user(11, "U1"), TicketCategory::Report, "cannot login")
			.await
			.unwrap();
		// Only the three user messages should be in the history.
		system.platform.state().channels.get_mut(&ticket.channel_id).unwrap().messages.clear();
		system.platform.post_as(ticket.channel_id, 11, "U1", "hello");
		system.platform.post_as(ticket.channel_id, 21, "S", "hi, what's wrong?");
		system.platform.post_as(ticket.channel_id, 11, "U1", "it's fixed now");

		let closer = staff(21, "S");
		let channel = system.check_can_close(ticket.channel_id).await.unwrap();
		let closed = system.close_ticket(&channel, &closer).await.unwrap();

		assert_eq!(closed.transcript_lines, 3);
		assert_eq!(closed.ticket.unwrap().state, TicketState::Closed);
		let state = system.platform.state();
		let upload = &state.uploads[0];
		assert_eq!(upload.file_name, "report-ticket-u1.txt");
		assert_eq!(upload.channel_id, state.channel_named("ticket-transcripts").unwrap().info.id);
		let lines: Vec<&str> = upload.file.lines().collect();
		assert_eq!(lines.len(), 3);
		assert!(lines[0].ends_with("U1: hello"));
		assert!(lines[1].ends_with("S: hi, what's wrong?"));
		assert!(lines[2].ends_with("U1: it's fixed now"));
		assert!(!state.channels.contains_key(&ticket.channel_id));
		drop(state);
		assert!(!system.registry.contains(Id::new(11)));
	}

	#[tokio::test]
	async fn closing_removes_only_the_matching_ticket() {
		let system = provisioned_system();
		let first = system
			.open_ticket(&user(11, "U1"), TicketCategory::Report, "one")
			.await
			.unwrap();
		let second = system
			.open_ticket(&user(12, "U2"), TicketCategory::Order, "two")
			.await
			.unwrap();

		let channel = system.check_can_close(second.channel_id).await.unwrap();
		system.close_ticket(&channel, &user(12, "U2")).await.unwrap();

		assert_eq!(system.registry.lookup_by_channel(first.channel_id), Some(Id::new(11)));
		assert!(!system.registry.contains(Id::new(12)));
		assert_eq!(system.registry.len(), 1);
	}

	#[tokio::test]
	async fn closing_outside_the_ticket_category_is_rejected() {
		let system = provisioned_system();
		let panel = system.platform.state().channel_named("ticket-panel").unwrap().info.id;

		let error = system.check_can_close(panel).await.unwrap_err();
		assert!(matches!(error, TicketError::NotATicketChannel));
		assert!(system.platform.state().channels.contains_key(&panel));
	}

	#[tokio::test]
	async fn failed_upload_keeps_the_ticket_open() {
		let (system, ticket) = system_with_ticket().await;
		system.platform.state().fail_uploads = true;

		let channel = system.check_can_close(ticket.channel_id).await.unwrap();
		let error = system.close_ticket(&channel, &user(11, "U1")).await.unwrap_err();

		assert!(matches!(error, TicketError::Platform(_)));
		assert!(system.platform.state().channels.contains_key(&ticket.channel_id));
		assert!(system.registry.contains(Id::new(11)));
	}

	#[tokio::test]
	async fn simultaneous_closes_archive_once() {
		let (system, ticket) = system_with_ticket().await;
		let channel = system.check_can_close(ticket.channel_id).await.unwrap();
		let first_closer = staff(21, "S");
		let second_closer = user(11, "U1");

		let (first, second) = tokio::join!(
			system.close_ticket(&channel, &first_closer),
			system.close_ticket(&channel, &second_closer)
		);

		let results = [first, second];
		assert_eq!(results.iter().filter(|result| result.is_ok()).count(), 1);
		assert!(
			results
				.iter()
				.any(|result| matches!(result, Err(TicketError::AlreadyClosing)))
		);
		let state = system.platform.state();
		assert_eq!(state.uploads.len(), 1);
		assert!(!state.channels.contains_key(&ticket.channel_id));
	}

	#[tokio::test]
	async fn closing_can_be_retried_after_a_failure() {
		let (system, ticket) = system_with_ticket().await;
		let channel = system.check_can_close(ticket.channel_id).await.unwrap();
		system.platform.state().fail_uploads = true;
		assert!(system.close_ticket(&channel, &user(11, "U1")).await.is_err());

		system.platform.state().fail_uploads = false;
		assert!(system.close_ticket(&channel, &user(11, "U1")).await.is_ok());
	}

	#[tokio::test]
	async fn missing_archive_channel_is_recreated() {
		let (system, ticket) = system_with_ticket().await;
		{
			let mut state = system.platform.state();
			let archive = state.channel_named("ticket-transcripts").unwrap().info.id;
			state.channels.remove(&archive);
		}

		let channel = system.check_can_close(ticket.channel_id).await.unwrap();
		system.close_ticket(&channel, &user(11, "U1")).await.unwrap();

		let state = system.platform.state();
		let archive = state.channel_named("ticket-transcripts").unwrap();
		assert_eq!(state.uploads[0].channel_id, archive.info.id);
	}

	#[tokio::test]
	async fn tickets_without_registry_entries_can_still_be_closed() {
		let system = provisioned_system();
		let container = system.platform.state().channel_named("Tickets").unwrap().info.id;
		let orphan = system
			.platform
			.add_channel("report-ticket-old", ChannelType::GuildText, Some(container));

		let channel = system.check_can_close(orphan).await.unwrap();
		let closed = system.close_ticket(&channel, &staff(21, "S")).await.unwrap();

		assert!(closed.ticket.is_none());
		assert!(!system.platform.state().channels.contains_key(&orphan));
	}
}
