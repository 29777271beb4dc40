// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use kdl::{KdlDocument, KdlValue};
use miette::{Diagnostic, IntoDiagnostic};
use std::fmt;
use tokio::fs::read_to_string;
use tracing::Level;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, GuildMarker, RoleMarker};
use twilight_validate::component::TEXT_INPUT_LENGTH_MAX;

const DEFAULT_TICKET_CATEGORY: &str = "Tickets";
const DEFAULT_PANEL_CHANNEL: &str = "ticket-panel";
const DEFAULT_TRANSCRIPT_CHANNEL: &str = "ticket-transcripts";
const DEFAULT_ISSUE_MAX_LENGTH: u16 = 500;

pub async fn parse_config(config_path: &str) -> miette::Result<ConfigData> {
	let config_file_contents = read_to_string(config_path).await.into_diagnostic()?;
	parse_config_str(&config_file_contents)
}

/// Parses the KDL configuration document.
pub fn parse_config_str(config_file_contents: &str) -> miette::Result<ConfigData> {
	let document: KdlDocument = config_file_contents.parse()?;

	let log_level = match document.get_arg("log-level") {
		Some(value) => {
			let Some(level) = value.as_string() else {
				return Err(ConfigError::InvalidValue {
					path: String::from("log-level"),
					expected: "a log level name",
				}
				.into());
			};
			level.parse().map_err(|_| ConfigError::InvalidValue {
				path: String::from("log-level"),
				expected: "one of trace, debug, info, warn, error",
			})?
		}
		None => Level::INFO,
	};

	let discord = section(&document, "discord")?;
	let discord = DiscordConfig {
		bot_token: required_string(discord, "discord", "bot-token")?,
		guild_id: required_id(discord, "discord", "guild-id")?,
	};

	let tickets = section(&document, "tickets")?;
	let issue_max_length = match tickets.get_arg("issue-max-length") {
		Some(value) => {
			let length = value
				.as_integer()
				.and_then(|length| u16::try_from(length).ok())
				.filter(|length| *length > 0 && usize::from(*length) <= TEXT_INPUT_LENGTH_MAX);
			length.ok_or(ConfigError::InvalidValue {
				path: String::from("tickets.issue-max-length"),
				expected: "a length between 1 and 4000",
			})?
		}
		None => DEFAULT_ISSUE_MAX_LENGTH,
	};
	let tickets = TicketConfig {
		staff_role: required_id(tickets, "tickets", "staff-role")?,
		category: channel_ref(tickets, "tickets", "category", DEFAULT_TICKET_CATEGORY)?,
		panel_channel: channel_ref(tickets, "tickets", "panel-channel", DEFAULT_PANEL_CHANNEL)?,
		transcript_channel: channel_ref(tickets, "tickets", "transcript-channel", DEFAULT_TRANSCRIPT_CHANNEL)?,
		issue_max_length,
	};

	let server_events = match document.get("server-events").and_then(|node| node.children()) {
		Some(server_events) => ServerEventsConfig {
			welcome_channel: optional_id(server_events, "server-events", "welcome-channel")?,
			log_channel: optional_id(server_events, "server-events", "log-channel")?,
			auto_role: optional_id(server_events, "server-events", "auto-role")?,
		},
		None => ServerEventsConfig::default(),
	};

	Ok(ConfigData {
		log_level,
		discord,
		tickets,
		server_events,
	})
}

fn section<'a>(document: &'a KdlDocument, name: &'static str) -> Result<&'a KdlDocument, ConfigError> {
	document
		.get(name)
		.and_then(|node| node.children())
		.ok_or(ConfigError::MissingSection(name))
}

fn required_string(section: &KdlDocument, section_name: &str, name: &str) -> Result<String, ConfigError> {
	let Some(value) = section.get_arg(name) else {
		return Err(ConfigError::MissingValue(format!("{}.{}", section_name, name)));
	};
	match value.as_string() {
		Some(value) => Ok(value.to_string()),
		None => Err(ConfigError::InvalidValue {
			path: format!("{}.{}", section_name, name),
			expected: "a string",
		}),
	}
}

fn required_id<T>(section: &KdlDocument, section_name: &str, name: &str) -> Result<Id<T>, ConfigError> {
	optional_id(section, section_name, name)?
		.ok_or_else(|| ConfigError::MissingValue(format!("{}.{}", section_name, name)))
}

fn optional_id<T>(section: &KdlDocument, section_name: &str, name: &str) -> Result<Option<Id<T>>, ConfigError> {
	match section.get_arg(name) {
		Some(value) => match id_from_value(value) {
			Some(id) => Ok(Some(id)),
			None => Err(ConfigError::InvalidValue {
				path: format!("{}.{}", section_name, name),
				expected: "a nonzero Discord ID",
			}),
		},
		None => Ok(None),
	}
}

fn channel_ref(
	section: &KdlDocument,
	section_name: &str,
	name: &str,
	default_name: &str,
) -> Result<ChannelRef, ConfigError> {
	let Some(value) = section.get_arg(name) else {
		return Ok(ChannelRef::Name(default_name.to_string()));
	};
	if let Some(channel_name) = value.as_string() {
		return Ok(ChannelRef::Name(channel_name.to_string()));
	}
	match id_from_value(value) {
		Some(id) => Ok(ChannelRef::Id(id)),
		None => Err(ConfigError::InvalidValue {
			path: format!("{}.{}", section_name, name),
			expected: "a channel ID or channel name",
		}),
	}
}

fn id_from_value<T>(value: &KdlValue) -> Option<Id<T>> {
	value
		.as_integer()
		.and_then(|id| u64::try_from(id).ok())
		.and_then(Id::new_checked)
}

#[derive(Debug)]
pub struct ConfigData {
	pub log_level: Level,
	pub discord: DiscordConfig,
	pub tickets: TicketConfig,
	pub server_events: ServerEventsConfig,
}

pub struct DiscordConfig {
	pub bot_token: String,
	/// The single guild the bot serves.
	pub guild_id: Id<GuildMarker>,
}

impl fmt::Debug for DiscordConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DiscordConfig")
			.field("bot_token", &"<redacted>")
			.field("guild_id", &self.guild_id)
			.finish()
	}
}

#[derive(Clone, Debug)]
pub struct TicketConfig {
	/// The role whose members can see and claim tickets.
	pub staff_role: Id<RoleMarker>,
	/// The category under which ticket channels are created.
	pub category: ChannelRef,
	/// The channel in which the "open a ticket" panel is posted.
	pub panel_channel: ChannelRef,
	/// The channel to which transcripts of closed tickets are uploaded.
	pub transcript_channel: ChannelRef,
	/// The maximum length of the issue text submitted when opening a ticket.
	pub issue_max_length: u16,
}

/// Targets for the welcome, automatic role, and server log handlers. Each one that isn't set disables its feature.
#[derive(Clone, Debug, Default)]
pub struct ServerEventsConfig {
	pub welcome_channel: Option<Id<ChannelMarker>>,
	pub log_channel: Option<Id<ChannelMarker>>,
	pub auto_role: Option<Id<RoleMarker>>,
}

/// A fixed channel, referenced either by ID or by name.
///
/// Channels referenced by ID must already exist. Channels referenced by name are looked up by name and, where the bot
/// provisions its own channels, created when missing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ChannelRef {
	Id(Id<ChannelMarker>),
	Name(String),
}

impl fmt::Display for ChannelRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Id(id) => write!(f, "channel {}", id),
			Self::Name(name) => write!(f, "\"{}\"", name),
		}
	}
}

#[derive(Debug, Diagnostic)]
pub enum ConfigError {
	MissingSection(&'static str),
	MissingValue(String),
	InvalidValue { path: String, expected: &'static str },
}

impl std::error::Error for ConfigError {}

impl fmt::Display for ConfigError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::MissingSection(name) => write!(f, "configuration is missing the `{}` section", name),
			Self::MissingValue(path) => write!(f, "configuration is missing `{}`", path),
			Self::InvalidValue { path, expected } => {
				write!(f, "configuration value `{}` is invalid: expected {}", path, expected)
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const MINIMAL: &str = r#"
discord {
	bot-token "token"
	guild-id 1438946135871062199
}
tickets {
	staff-role 1438950739664830534
}
"#;

	#[test]
	fn minimal_config_uses_default_channel_names() {
		let config = parse_config_str(MINIMAL).unwrap();
		assert_eq!(config.log_level, Level::INFO);
		assert_eq!(config.discord.guild_id.get(), 1438946135871062199);
		assert_eq!(config.tickets.staff_role.get(), 1438950739664830534);
		assert_eq!(config.tickets.category, ChannelRef::Name(String::from("Tickets")));
		assert_eq!(config.tickets.panel_channel, ChannelRef::Name(String::from("ticket-panel")));
		assert_eq!(
			config.tickets.transcript_channel,
			ChannelRef::Name(String::from("ticket-transcripts"))
		);
		assert_eq!(config.tickets.issue_max_length, 500);
		assert!(config.server_events.welcome_channel.is_none());
		assert!(config.server_events.auto_role.is_none());
	}

	#[test]
	fn channel_references_accept_ids_and_names() {
		let config = parse_config_str(
			r#"
log-level "debug"
discord {
	bot-token "token"
	guild-id 10
}
tickets {
	staff-role 20
	category 30
	panel-channel "open-a-ticket"
	issue-max-length 1000
}
server-events {
	welcome-channel 40
	log-channel 50
	auto-role 60
}
"#,
		)
		.unwrap();
		assert_eq!(config.log_level, Level::DEBUG);
		assert_eq!(config.tickets.category, ChannelRef::Id(Id::new(30)));
		assert_eq!(config.tickets.panel_channel, ChannelRef::Name(String::from("open-a-ticket")));
		assert_eq!(config.tickets.issue_max_length, 1000);
		assert_eq!(config.server_events.welcome_channel, Some(Id::new(40)));
		assert_eq!(config.server_events.log_channel, Some(Id::new(50)));
		assert_eq!(config.server_events.auto_role, Some(Id::new(60)));
	}

	#[test]
	fn missing_staff_role_is_rejected() {
		let error = parse_config_str(
			r#"
discord {
	bot-token "token"
	guild-id 10
}
tickets {
}
"#,
		)
		.unwrap_err();
		assert!(error.to_string().contains("tickets.staff-role"));
	}

	#[test]
	fn zero_ids_and_oversized_limits_are_rejected() {
		let zero_guild = MINIMAL.replace("1438946135871062199", "0");
		assert!(parse_config_str(&zero_guild).is_err());

		let too_long = MINIMAL.replace("staff-role 1438950739664830534", "staff-role 5\n\tissue-max-length 5000");
		let error = parse_config_str(&too_long).unwrap_err();
		assert!(error.to_string().contains("issue-max-length"));
	}

	#[test]
	fn example_config_parses() {
		let config = parse_config_str(include_str!("../config.example.kdl")).unwrap();
		assert_eq!(config.tickets.category, ChannelRef::Name(String::from("Tickets")));
		assert!(config.server_events.log_channel.is_some());
	}

	#[test]
	fn bot_token_is_not_printed() {
		let config = parse_config_str(MINIMAL).unwrap();
		let printed = format!("{:?}", config);
		assert!(!printed.contains("\"token\""));
		assert!(printed.contains("<redacted>"));
	}
}
