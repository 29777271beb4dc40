// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::post_log;
use crate::config::ServerEventsConfig;
use miette::IntoDiagnostic;
use twilight_http::client::Client;
use twilight_mention::fmt::Mention;
use twilight_model::channel::message::AllowedMentions;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, GuildMarker, RoleMarker, UserMarker};
use twilight_model::user::User;

pub fn welcome_message(user_id: Id<UserMarker>) -> String {
	format!("Welcome to the server, {}!", user_id.mention())
}

pub fn join_log(user_name: &str) -> String {
	format!("🟢 **{} joined the server.**", user_name)
}

pub fn leave_log(user_name: &str) -> String {
	format!("🔴 **{} left the server.**", user_name)
}

pub async fn handle_join(
	user: &User,
	http_client: &Client,
	guild_id: Id<GuildMarker>,
	server_events: &ServerEventsConfig,
) -> miette::Result<()> {
	run_join_steps(
		user.id,
		send_welcome(user.id, http_client, server_events.welcome_channel),
		give_auto_role(user.id, http_client, guild_id, server_events.auto_role),
		post_log(http_client, server_events.log_channel, &join_log(&user.name)),
	)
	.await
}

async fn send_welcome(
	user_id: Id<UserMarker>,
	http_client: &Client,
	welcome_channel: Option<Id<ChannelMarker>>,
) -> miette::Result<()> {
	let Some(welcome_channel) = welcome_channel else {
		return Ok(());
	};
	let mut allowed_mentions = AllowedMentions::default();
	allowed_mentions.users.push(user_id);
	http_client
		.create_message(welcome_channel)
		.content(&welcome_message(user_id))
		.allowed_mentions(Some(&allowed_mentions))
		.await
		.into_diagnostic()?;
	Ok(())
}

async fn give_auto_role(
	user_id: Id<UserMarker>,
	http_client: &Client,
	guild_id: Id<GuildMarker>,
	auto_role: Option<Id<RoleMarker>>,
) -> miette::Result<()> {
	let Some(auto_role) = auto_role else {
		return Ok(());
	};
	http_client
		.add_guild_member_role(guild_id, user_id, auto_role)
		.await
		.into_diagnostic()?;
	tracing::info!(user = %user_id, role = %auto_role, "Gave automatic role to new member");
	Ok(())
}

/// Runs the side effects of a member joining, in order. The welcome message and automatic role are best-effort, so
/// their failures are only logged and never stop the later steps.
async fn run_join_steps(
	user_id: Id<UserMarker>,
	welcome: impl Future<Output = miette::Result<()>>,
	auto_role: impl Future<Output = miette::Result<()>>,
	log: impl Future<Output = miette::Result<()>>,
) -> miette::Result<()> {
	if let Err(error) = welcome.await {
		tracing::warn!(user = %user_id, source = ?error, "Couldn't welcome new member");
	}
	if let Err(error) = auto_role.await {
		tracing::warn!(user = %user_id, source = ?error, "Couldn't give automatic role to new member");
	}
	log.await
}

pub async fn handle_leave(user: &User, http_client: &Client, server_events: &ServerEventsConfig) -> miette::Result<()> {
	post_log(http_client, server_events.log_channel, &leave_log(&user.name)).await
}
