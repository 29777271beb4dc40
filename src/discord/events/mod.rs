// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Server activity outside the ticket system: welcoming new members and keeping the server log.

use crate::config::ConfigData;
use miette::IntoDiagnostic;
use twilight_http::client::Client;
use twilight_model::channel::message::AllowedMentions;
use twilight_model::gateway::event::Event;
use twilight_model::id::Id;
use twilight_model::id::marker::ChannelMarker;

mod bans;
mod members;
mod messages;

pub use messages::{MessageSnapshot, snapshot_message};

/// The longest piece of user-written content copied into a single log entry.
const MAX_LOGGED_CONTENT_LENGTH: usize = 800;

pub async fn route_events(
	event: &Event,
	previous_message: Option<MessageSnapshot>,
	http_client: &Client,
	config: &ConfigData,
) -> miette::Result<()> {
	let guild_id = config.discord.guild_id;
	let server_events = &config.server_events;
	match event {
		Event::MemberAdd(member_add) if member_add.guild_id == guild_id => {
			members::handle_join(&member_add.user, http_client, guild_id, server_events).await?
		}
		Event::MemberRemove(member_remove) if member_remove.guild_id == guild_id => {
			members::handle_leave(&member_remove.user, http_client, server_events).await?
		}
		Event::BanAdd(ban_add) if ban_add.guild_id == guild_id => {
			bans::handle_ban(&ban_add.user, http_client, server_events).await?
		}
		Event::MessageDelete(message_delete) if message_delete.guild_id == Some(guild_id) => {
			messages::handle_delete(previous_message, http_client, server_events).await?
		}
		Event::MessageUpdate(message_update) if message_update.guild_id == Some(guild_id) => {
			messages::handle_edit(previous_message, &message_update.content, http_client, server_events).await?
		}
		_ => (),
	}
	Ok(())
}

/// Posts an entry to the log channel, if one is configured. Log entries never ping anyone.
async fn post_log(http_client: &Client, log_channel: Option<Id<ChannelMarker>>, content: &str) -> miette::Result<()> {
	let Some(log_channel) = log_channel else {
		return Ok(());
	};
	http_client
		.create_message(log_channel)
		.content(content)
		.allowed_mentions(Some(&AllowedMentions::default()))
		.await
		.into_diagnostic()?;
	Ok(())
}

/// Cuts user-written content down so a log entry stays within Discord's message length limit.
fn shorten(content: &str) -> String {
	if content.chars().count() <= MAX_LOGGED_CONTENT_LENGTH {
		return content.to_string();
	}
	let mut shortened: String = content.chars().take(MAX_LOGGED_CONTENT_LENGTH - 1).collect();
	shortened.push('…');
	shortened
}
