// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! An in-memory chat platform for exercising the ticket flows.

use super::components::component_ids;
use super::{
	Actor, ChannelInfo, HistoryMessage, NewTextChannel, OutgoingMessage, PlatformError, TicketPlatform, TicketSettings,
	TicketSystem,
};
use crate::config::ChannelRef;
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use twilight_model::channel::ChannelType;
use twilight_model::channel::permission_overwrite::PermissionOverwrite;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, MessageMarker, RoleMarker, UserMarker};

pub const GUILD_ID: u64 = 1;
pub const STAFF_ROLE: u64 = 50;
pub const BOT_ID: u64 = 99;

#[derive(Debug)]
pub struct FakeChannel {
	pub info: ChannelInfo,
	pub messages: Vec<HistoryMessage>,
}

#[derive(Debug)]
pub struct Upload {
	pub channel_id: Id<ChannelMarker>,
	pub content: String,
	pub file_name: String,
	pub file: String,
}

#[derive(Debug, Default)]
pub struct FakeState {
	next_id: u64,
	pub channels: BTreeMap<Id<ChannelMarker>, FakeChannel>,
	pub uploads: Vec<Upload>,
	pub channels_created: usize,
	pub overwrite_updates: usize,
	pub fail_uploads: bool,
	pub fail_sends: bool,
	pub fail_overwrites: bool,
	pub fail_topic_updates: bool,
}

impl FakeState {
	fn next_id(&mut self) -> u64 {
		self.next_id += 1;
		1000 + self.next_id
	}

	pub fn channel_named(&self, name: &str) -> Option<&FakeChannel> {
		self.channels.values().find(|channel| channel.info.name == name)
	}

	pub fn channels_under(&self, parent_id: Id<ChannelMarker>) -> Vec<&FakeChannel> {
		self.channels
			.values()
			.filter(|channel| channel.info.parent_id == Some(parent_id))
			.collect()
	}
}

#[derive(Debug, Default)]
pub struct FakePlatform {
	state: Mutex<FakeState>,
}

fn fake_time(id: u64) -> DateTime<Utc> {
	let base = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
	base + TimeDelta::seconds(id as i64)
}

impl FakePlatform {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn state(&self) -> MutexGuard<'_, FakeState> {
		self.state.lock().unwrap()
	}

	pub fn add_channel(&self, name: &str, kind: ChannelType, parent_id: Option<Id<ChannelMarker>>) -> Id<ChannelMarker> {
		let mut state = self.state();
		let id = state.next_id();
		let channel_id = Id::new(id);
		let info = ChannelInfo {
			id: channel_id,
			name: name.to_string(),
			kind,
			parent_id,
			topic: None,
			permission_overwrites: Vec::new(),
			created_at: fake_time(id),
		};
		state.channels.insert(
			channel_id,
			FakeChannel {
				info,
				messages: Vec::new(),
			},
		);
		channel_id
	}

	pub fn set_topic_directly(&self, channel_id: Id<ChannelMarker>, topic: &str) {
		let mut state = self.state();
		if let Some(channel) = state.channels.get_mut(&channel_id) {
			channel.info.topic = Some(topic.to_string());
		}
	}

	/// Adds a message to a channel as if a user had sent it.
	pub fn post_as(&self, channel_id: Id<ChannelMarker>, author_id: u64, author_name: &str, content: &str) {
		let mut state = self.state();
		let id = state.next_id();
		let message = HistoryMessage {
			id: Id::new(id),
			author_id: Id::new(author_id),
			author_name: author_name.to_string(),
			content: content.to_string(),
			attachment_urls: Vec::new(),
			component_ids: Vec::new(),
			timestamp: fake_time(id),
		};
		if let Some(channel) = state.channels.get_mut(&channel_id) {
			channel.messages.push(message);
		}
	}

	fn record_message(
		&self,
		channel_id: Id<ChannelMarker>,
		content: String,
		component_ids: Vec<String>,
	) -> Result<Id<MessageMarker>, PlatformError> {
		let mut state = self.state();
		let id = state.next_id();
		let Some(channel) = state.channels.get_mut(&channel_id) else {
			return Err(PlatformError::new("Unknown Channel"));
		};
		channel.messages.push(HistoryMessage {
			id: Id::new(id),
			author_id: Id::new(BOT_ID),
			author_name: String::from("ticket-bot"),
			content,
			attachment_urls: Vec::new(),
			component_ids,
			timestamp: fake_time(id),
		});
		Ok(Id::new(id))
	}
}

#[async_trait]
impl TicketPlatform for FakePlatform {
	async fn current_user_id(&self) -> Result<Id<UserMarker>, PlatformError> {
		Ok(Id::new(BOT_ID))
	}

	async fn channel(&self, channel_id: Id<ChannelMarker>) -> Result<Option<ChannelInfo>, PlatformError> {
		Ok(self.state().channels.get(&channel_id).map(|channel| channel.info.clone()))
	}

	async fn find_channel(&self, name: &str, kind: ChannelType) -> Result<Option<ChannelInfo>, PlatformError> {
		let state = self.state();
		let found = state
			.channels
			.values()
			.find(|channel| channel.info.name == name && channel.info.kind == kind);
		Ok(found.map(|channel| channel.info.clone()))
	}

	async fn channels_in_category(&self, category_id: Id<ChannelMarker>) -> Result<Vec<ChannelInfo>, PlatformError> {
		let state = self.state();
		Ok(state
			.channels_under(category_id)
			.into_iter()
			.map(|channel| channel.info.clone())
			.collect())
	}

	async fn create_category(&self, name: &str) -> Result<ChannelInfo, PlatformError> {
		let channel_id = self.add_channel(name, ChannelType::GuildCategory, None);
		self.state().channels_created += 1;
		Ok(self.state().channels[&channel_id].info.clone())
	}

	async fn create_text_channel(&self, channel: NewTextChannel) -> Result<ChannelInfo, PlatformError> {
		// Lets concurrently running flows interleave here, like they would on a network call.
		tokio::task::yield_now().await;
		let channel_id = self.add_channel(&channel.name, ChannelType::GuildText, channel.parent_id);
		let mut state = self.state();
		state.channels_created += 1;
		let Some(created) = state.channels.get_mut(&channel_id) else {
			return Err(PlatformError::new("Unknown Channel"));
		};
		created.info.topic = channel.topic;
		created.info.permission_overwrites = channel.permission_overwrites;
		Ok(created.info.clone())
	}

	async fn set_permission_overwrites(
		&self,
		channel_id: Id<ChannelMarker>,
		permission_overwrites: &[PermissionOverwrite],
	) -> Result<(), PlatformError> {
		let mut state = self.state();
		if state.fail_overwrites {
			return Err(PlatformError::new("Missing Permissions"));
		}
		state.overwrite_updates += 1;
		let Some(channel) = state.channels.get_mut(&channel_id) else {
			return Err(PlatformError::new("Unknown Channel"));
		};
		channel.info.permission_overwrites = permission_overwrites.to_vec();
		Ok(())
	}

	async fn set_topic(&self, channel_id: Id<ChannelMarker>, topic: &str) -> Result<(), PlatformError> {
		let mut state = self.state();
		if state.fail_topic_updates {
			return Err(PlatformError::new("Missing Permissions"));
		}
		let Some(channel) = state.channels.get_mut(&channel_id) else {
			return Err(PlatformError::new("Unknown Channel"));
		};
		channel.info.topic = Some(topic.to_string());
		Ok(())
	}

	async fn delete_channel(&self, channel_id: Id<ChannelMarker>) -> Result<(), PlatformError> {
		match self.state().channels.remove(&channel_id) {
			Some(_) => Ok(()),
			None => Err(PlatformError::new("Unknown Channel")),
		}
	}

	async fn send_message(
		&self,
		channel_id: Id<ChannelMarker>,
		message: OutgoingMessage,
	) -> Result<Id<MessageMarker>, PlatformError> {
		if self.state().fail_sends {
			return Err(PlatformError::new("Missing Access"));
		}
		let mut content = message.content.unwrap_or_default();
		for embed in message.embeds.iter() {
			if let Some(title) = &embed.title {
				content.push_str(title);
			}
		}
		self.record_message(channel_id, content, component_ids(&message.components))
	}

	async fn upload_file(
		&self,
		channel_id: Id<ChannelMarker>,
		content: &str,
		file_name: &str,
		file: Vec<u8>,
	) -> Result<Id<MessageMarker>, PlatformError> {
		tokio::task::yield_now().await;
		{
			let mut state = self.state();
			if state.fail_uploads {
				return Err(PlatformError::new("Request entity too large"));
			}
			state.uploads.push(Upload {
				channel_id,
				content: content.to_string(),
				file_name: file_name.to_string(),
				file: String::from_utf8(file).map_err(PlatformError::new)?,
			});
		}
		self.record_message(channel_id, content.to_string(), Vec::new())
	}

	async fn message_history(&self, channel_id: Id<ChannelMarker>) -> Result<Vec<HistoryMessage>, PlatformError> {
		let state = self.state();
		match state.channels.get(&channel_id) {
			Some(channel) => Ok(channel.messages.clone()),
			None => Err(PlatformError::new("Unknown Channel")),
		}
	}

	async fn recent_messages(
		&self,
		channel_id: Id<ChannelMarker>,
		limit: u16,
	) -> Result<Vec<HistoryMessage>, PlatformError> {
		let mut messages = self.message_history(channel_id).await?;
		messages.reverse();
		messages.truncate(usize::from(limit));
		Ok(messages)
	}
}

pub fn settings() -> TicketSettings {
	TicketSettings {
		guild_id: Id::new(GUILD_ID),
		staff_role: Id::new(STAFF_ROLE),
		category: ChannelRef::Name(String::from("Tickets")),
		panel_channel: ChannelRef::Name(String::from("ticket-panel")),
		transcript_channel: ChannelRef::Name(String::from("ticket-transcripts")),
		issue_max_length: 500,
	}
}

/// A ticket system whose fixed channels already exist.
pub fn provisioned_system() -> TicketSystem<FakePlatform> {
	let platform = FakePlatform::new();
	platform.add_channel("Tickets", ChannelType::GuildCategory, None);
	platform.add_channel("ticket-panel", ChannelType::GuildText, None);
	platform.add_channel("ticket-transcripts", ChannelType::GuildText, None);
	TicketSystem::new(platform, settings())
}

pub fn user(id: u64, name: &str) -> Actor {
	Actor {
		id: Id::new(id),
		name: name.to_string(),
		roles: Vec::new(),
	}
}

pub fn staff(id: u64, name: &str) -> Actor {
	let staff_role: Id<RoleMarker> = Id::new(STAFF_ROLE);
	Actor {
		id: Id::new(id),
		name: name.to_string(),
		roles: vec![staff_role],
	}
}
