// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::Arc;
use ticket_desk::config::parse_config;
use ticket_desk::discord::{run_bot, set_up_client};

const DEFAULT_CONFIG_PATH: &str = "config.kdl";

#[tokio::main]
async fn main() -> miette::Result<()> {
	let config_path = std::env::args().nth(1).unwrap_or_else(|| String::from(DEFAULT_CONFIG_PATH));
	let config = Arc::new(parse_config(&config_path).await?);

	tracing_subscriber::fmt().with_max_level(config.log_level).init();
	tracing::info!(config_path, guild = %config.discord.guild_id, "Configuration loaded");

	let http_client = set_up_client(&config);
	run_bot(config, http_client).await
}
