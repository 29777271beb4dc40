// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{post_log, shorten};
use crate::config::ServerEventsConfig;
use twilight_cache_inmemory::DefaultInMemoryCache;
use twilight_http::client::Client;
use twilight_mention::fmt::Mention;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, MessageMarker};

/// A message as it was before it was deleted or edited.
///
/// Deletions and edits only carry the message's ID (or its new state), so the old message has to be read from the
/// cache before the cache applies the event.
#[derive(Clone, Debug)]
pub struct MessageSnapshot {
	pub channel_id: Id<ChannelMarker>,
	pub author_name: String,
	pub author_is_bot: bool,
	pub content: String,
}

pub fn snapshot_message(cache: &DefaultInMemoryCache, message_id: Id<MessageMarker>) -> Option<MessageSnapshot> {
	let message = cache.message(message_id)?;
	let author_id = message.author();
	let author = cache.user(author_id);
	let author_name = match &author {
		Some(author) => author.name.clone(),
		None => author_id.to_string(),
	};
	Some(MessageSnapshot {
		channel_id: message.channel_id(),
		author_name,
		author_is_bot: author.is_some_and(|author| author.bot),
		content: message.content().to_string(),
	})
}

pub fn delete_log(message: &MessageSnapshot) -> String {
	format!(
		"🗑️ **Message deleted in {}**\n**Author:** {}\n**Content:** {}",
		message.channel_id.mention(),
		message.author_name,
		shorten(&message.content)
	)
}

/// The log entry for an edit, or `None` if the edit shouldn't be logged.
pub fn edit_log(before: &MessageSnapshot, new_content: &str) -> Option<String> {
	if before.author_is_bot || before.content == new_content {
		return None;
	}
	Some(format!(
		"✏️ **Message edited in {}**\n**Author:** {}\n**Before:** {}\n**After:** {}",
		before.channel_id.mention(),
		before.author_name,
		shorten(&before.content),
		shorten(new_content)
	))
}

pub async fn handle_delete(
	deleted: Option<MessageSnapshot>,
	http_client: &Client,
	server_events: &ServerEventsConfig,
) -> miette::Result<()> {
	// Messages sent before the bot started aren't cached, so there's nothing to log for them.
	let Some(deleted) = deleted else {
		return Ok(());
	};
	if deleted.author_is_bot {
		return Ok(());
	}
	post_log(http_client, server_events.log_channel, &delete_log(&deleted)).await
}

pub async fn handle_edit(
	before: Option<MessageSnapshot>,
	new_content: &str,
	http_client: &Client,
	server_events: &ServerEventsConfig,
) -> miette::Result<()> {
	let Some(entry) = before.and_then(|before| edit_log(&before, new_content)) else {
		return Ok(());
	};
	post_log(http_client, server_events.log_channel, &entry).await
}
