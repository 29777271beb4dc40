// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::error::PlatformError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use twilight_model::channel::ChannelType;
use twilight_model::channel::message::component::Component;
use twilight_model::channel::message::embed::Embed;
use twilight_model::channel::permission_overwrite::PermissionOverwrite;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, MessageMarker, UserMarker};

/// The parts of a guild channel the ticket flows look at.
#[derive(Clone, Debug)]
pub struct ChannelInfo {
	pub id: Id<ChannelMarker>,
	pub name: String,
	pub kind: ChannelType,
	pub parent_id: Option<Id<ChannelMarker>>,
	pub topic: Option<String>,
	pub permission_overwrites: Vec<PermissionOverwrite>,
	pub created_at: DateTime<Utc>,
}

/// A text channel to create.
#[derive(Clone, Debug)]
pub struct NewTextChannel {
	pub name: String,
	pub parent_id: Option<Id<ChannelMarker>>,
	pub topic: Option<String>,
	pub permission_overwrites: Vec<PermissionOverwrite>,
}

/// A message to post in a channel.
#[derive(Clone, Debug, Default)]
pub struct OutgoingMessage {
	pub content: Option<String>,
	pub embeds: Vec<Embed>,
	pub components: Vec<Component>,
	/// Users the message may ping. No other mentions ping anyone.
	pub mentioned_users: Vec<Id<UserMarker>>,
}

impl OutgoingMessage {
	pub fn text(content: impl Into<String>) -> Self {
		Self {
			content: Some(content.into()),
			..Self::default()
		}
	}
}

/// A message read back from a channel's history.
#[derive(Clone, Debug)]
pub struct HistoryMessage {
	pub id: Id<MessageMarker>,
	pub author_id: Id<UserMarker>,
	pub author_name: String,
	pub content: String,
	pub attachment_urls: Vec<String>,
	/// Custom IDs of the buttons and other components on the message.
	pub component_ids: Vec<String>,
	pub timestamp: DateTime<Utc>,
}

/// The chat platform operations the ticket system needs.
///
/// Every call may suspend on the network; none are retried.
#[async_trait]
pub trait TicketPlatform: Send + Sync {
	/// The bot's own user ID.
	async fn current_user_id(&self) -> Result<Id<UserMarker>, PlatformError>;

	/// Gets a channel by ID, or `None` if it doesn't exist in the guild.
	async fn channel(&self, channel_id: Id<ChannelMarker>) -> Result<Option<ChannelInfo>, PlatformError>;

	/// Finds a guild channel of the given kind by name.
	async fn find_channel(&self, name: &str, kind: ChannelType) -> Result<Option<ChannelInfo>, PlatformError>;

	/// Lists the channels inside a category.
	async fn channels_in_category(&self, category_id: Id<ChannelMarker>) -> Result<Vec<ChannelInfo>, PlatformError>;

	async fn create_category(&self, name: &str) -> Result<ChannelInfo, PlatformError>;

	async fn create_text_channel(&self, channel: NewTextChannel) -> Result<ChannelInfo, PlatformError>;

	/// Replaces the full set of permission overwrites on a channel.
	async fn set_permission_overwrites(
		&self,
		channel_id: Id<ChannelMarker>,
		permission_overwrites: &[PermissionOverwrite],
	) -> Result<(), PlatformError>;

	async fn set_topic(&self, channel_id: Id<ChannelMarker>, topic: &str) -> Result<(), PlatformError>;

	async fn delete_channel(&self, channel_id: Id<ChannelMarker>) -> Result<(), PlatformError>;

	async fn send_message(
		&self,
		channel_id: Id<ChannelMarker>,
		message: OutgoingMessage,
	) -> Result<Id<MessageMarker>, PlatformError>;

	/// Posts a file attachment with a short message.
	async fn upload_file(
		&self,
		channel_id: Id<ChannelMarker>,
		content: &str,
		file_name: &str,
		file: Vec<u8>,
	) -> Result<Id<MessageMarker>, PlatformError>;

	/// Reads the full message history of a channel, oldest message first.
	async fn message_history(&self, channel_id: Id<ChannelMarker>) -> Result<Vec<HistoryMessage>, PlatformError>;

	/// Reads up to `limit` of the most recent messages in a channel, newest first.
	async fn recent_messages(
		&self,
		channel_id: Id<ChannelMarker>,
		limit: u16,
	) -> Result<Vec<HistoryMessage>, PlatformError>;
}
