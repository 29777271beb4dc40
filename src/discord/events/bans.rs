// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::post_log;
use crate::config::ServerEventsConfig;
use twilight_http::client::Client;
use twilight_model::user::User;

pub fn ban_log(user_name: &str) -> String {
	format!("⛔ **{} was banned from the server.**", user_name)
}

pub async fn handle_ban(
	banned_user: &User,
	http_client: &Client,
	server_events: &ServerEventsConfig,
) -> miette::Result<()> {
	tracing::info!(user = %banned_user.id, "Member banned");
	post_log(http_client, server_events.log_channel, &ban_log(&banned_user.name)).await
}
