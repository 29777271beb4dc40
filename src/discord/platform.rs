// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::utils::timestamp::{datetime_from_id, datetime_from_timestamp};
use crate::tickets::components::component_ids;
use crate::tickets::{ChannelInfo, HistoryMessage, NewTextChannel, OutgoingMessage, PlatformError, TicketPlatform};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::OnceCell;
use twilight_http::client::Client;
use twilight_http::error::ErrorType;
use twilight_http::response::{DeserializeBodyError, StatusCode};
use twilight_model::channel::message::AllowedMentions;
use twilight_model::channel::permission_overwrite::PermissionOverwrite;
use twilight_model::channel::{Channel, ChannelType, Message};
use twilight_model::http::attachment::Attachment;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, GuildMarker, MessageMarker, UserMarker};

/// Discord allows fetching at most this many messages per request.
const HISTORY_PAGE_SIZE: u16 = 100;

impl From<twilight_http::Error> for PlatformError {
	fn from(error: twilight_http::Error) -> Self {
		Self(Box::new(error))
	}
}

impl From<DeserializeBodyError> for PlatformError {
	fn from(error: DeserializeBodyError) -> Self {
		Self(Box::new(error))
	}
}

/// The ticket platform backed by one Discord guild.
pub struct DiscordPlatform {
	http_client: Arc<Client>,
	guild_id: Id<GuildMarker>,
	current_user_id: OnceCell<Id<UserMarker>>,
}

impl DiscordPlatform {
	pub fn new(http_client: Arc<Client>, guild_id: Id<GuildMarker>) -> Self {
		Self {
			http_client,
			guild_id,
			current_user_id: OnceCell::new(),
		}
	}

	async fn guild_channels(&self) -> Result<Vec<ChannelInfo>, PlatformError> {
		let channels = self.http_client.guild_channels(self.guild_id).await?.models().await?;
		Ok(channels.into_iter().map(channel_info).collect())
	}

	async fn create_channel(
		&self,
		name: &str,
		kind: ChannelType,
		parent_id: Option<Id<ChannelMarker>>,
		topic: Option<&str>,
		permission_overwrites: &[PermissionOverwrite],
	) -> Result<ChannelInfo, PlatformError> {
		let mut request = self
			.http_client
			.create_guild_channel(self.guild_id, name)
			.kind(kind)
			.permission_overwrites(permission_overwrites);
		if let Some(parent_id) = parent_id {
			request = request.parent_id(parent_id);
		}
		if let Some(topic) = topic {
			request = request.topic(topic);
		}
		let channel = request.await?.model().await?;
		Ok(channel_info(channel))
	}

	async fn message_page(
		&self,
		channel_id: Id<ChannelMarker>,
		before: Option<Id<MessageMarker>>,
		limit: u16,
	) -> Result<Vec<Message>, PlatformError> {
		let request = self.http_client.channel_messages(channel_id);
		let response = match before {
			Some(before) => request.before(before).limit(limit).await?,
			None => request.limit(limit).await?,
		};
		Ok(response.models().await?)
	}
}

fn channel_info(channel: Channel) -> ChannelInfo {
	ChannelInfo {
		id: channel.id,
		name: channel.name.unwrap_or_default(),
		kind: channel.kind,
		parent_id: channel.parent_id,
		topic: channel.topic,
		permission_overwrites: channel.permission_overwrites.unwrap_or_default(),
		created_at: datetime_from_id(channel.id).unwrap_or_else(Utc::now),
	}
}

fn history_message(message: Message) -> HistoryMessage {
	HistoryMessage {
		id: message.id,
		author_id: message.author.id,
		author_name: message.author.name,
		content: message.content,
		attachment_urls: message.attachments.into_iter().map(|attachment| attachment.url).collect(),
		component_ids: component_ids(&message.components),
		timestamp: datetime_from_timestamp(&message.timestamp).unwrap_or_else(Utc::now),
	}
}

fn is_not_found(error: &twilight_http::Error) -> bool {
	matches!(
		error.kind(),
		ErrorType::Response {
			status: StatusCode::NOT_FOUND,
			..
		}
	)
}

#[async_trait]
impl TicketPlatform for DiscordPlatform {
	async fn current_user_id(&self) -> Result<Id<UserMarker>, PlatformError> {
		let user_id = self
			.current_user_id
			.get_or_try_init(|| async {
				let user = self.http_client.current_user().await?.model().await?;
				Ok::<_, PlatformError>(user.id)
			})
			.await?;
		Ok(*user_id)
	}

	async fn channel(&self, channel_id: Id<ChannelMarker>) -> Result<Option<ChannelInfo>, PlatformError> {
		let response = match self.http_client.channel(channel_id).await {
			Ok(response) => response,
			Err(error) if is_not_found(&error) => return Ok(None),
			Err(error) => return Err(error.into()),
		};
		let channel = response.model().await?;
		if channel.guild_id != Some(self.guild_id) {
			return Ok(None);
		}
		Ok(Some(channel_info(channel)))
	}

	async fn find_channel(&self, name: &str, kind: ChannelType) -> Result<Option<ChannelInfo>, PlatformError> {
		let channels = self.guild_channels().await?;
		Ok(channels
			.into_iter()
			.find(|channel| channel.name == name && channel.kind == kind))
	}

	async fn channels_in_category(&self, category_id: Id<ChannelMarker>) -> Result<Vec<ChannelInfo>, PlatformError> {
		let channels = self.guild_channels().await?;
		Ok(channels
			.into_iter()
			.filter(|channel| channel.parent_id == Some(category_id))
			.collect())
	}

	async fn create_category(&self, name: &str) -> Result<ChannelInfo, PlatformError> {
		self.create_channel(name, ChannelType::GuildCategory, None, None, &[])
			.await
	}

	async fn create_text_channel(&self, channel: NewTextChannel) -> Result<ChannelInfo, PlatformError> {
		self.create_channel(
			&channel.name,
			ChannelType::GuildText,
			channel.parent_id,
			channel.topic.as_deref(),
			&channel.permission_overwrites,
		)
		.await
	}

	async fn set_permission_overwrites(
		&self,
		channel_id: Id<ChannelMarker>,
		permission_overwrites: &[PermissionOverwrite],
	) -> Result<(), PlatformError> {
		self.http_client
			.update_channel(channel_id)
			.permission_overwrites(permission_overwrites)
			.await?;
		Ok(())
	}

	async fn set_topic(&self, channel_id: Id<ChannelMarker>, topic: &str) -> Result<(), PlatformError> {
		self.http_client.update_channel(channel_id).topic(topic).await?;
		Ok(())
	}

	async fn delete_channel(&self, channel_id: Id<ChannelMarker>) -> Result<(), PlatformError> {
		self.http_client.delete_channel(channel_id).await?;
		Ok(())
	}

	async fn send_message(
		&self,
		channel_id: Id<ChannelMarker>,
		message: OutgoingMessage,
	) -> Result<Id<MessageMarker>, PlatformError> {
		let mut allowed_mentions = AllowedMentions::default();
		allowed_mentions.users = message.mentioned_users.clone();

		let mut request = self
			.http_client
			.create_message(channel_id)
			.embeds(&message.embeds)
			.components(&message.components)
			.allowed_mentions(Some(&allowed_mentions));
		if let Some(content) = &message.content {
			request = request.content(content);
		}
		let sent = request.await?.model().await?;
		Ok(sent.id)
	}

	async fn upload_file(
		&self,
		channel_id: Id<ChannelMarker>,
		content: &str,
		file_name: &str,
		file: Vec<u8>,
	) -> Result<Id<MessageMarker>, PlatformError> {
		let attachments = [Attachment::from_bytes(file_name.to_string(), file, 0)];
		let sent = self
			.http_client
			.create_message(channel_id)
			.content(content)
			.attachments(&attachments)
			.await?
			.model()
			.await?;
		Ok(sent.id)
	}

	async fn message_history(&self, channel_id: Id<ChannelMarker>) -> Result<Vec<HistoryMessage>, PlatformError> {
		let mut messages = Vec::new();
		let mut before = None;
		loop {
			let page = self.message_page(channel_id, before, HISTORY_PAGE_SIZE).await?;
			let page_len = page.len();
			// Pages come newest first, so the last message is the oldest one fetched so far.
			before = page.last().map(|message| message.id);
			messages.extend(page.into_iter().map(history_message));
			if page_len < usize::from(HISTORY_PAGE_SIZE) {
				break;
			}
		}
		messages.sort_by_key(|message| message.id);
		Ok(messages)
	}

	async fn recent_messages(
		&self,
		channel_id: Id<ChannelMarker>,
		limit: u16,
	) -> Result<Vec<HistoryMessage>, PlatformError> {
		let limit = limit.min(HISTORY_PAGE_SIZE);
		let page = self.message_page(channel_id, None, limit).await?;
		Ok(page.into_iter().map(history_message).collect())
	}
}

