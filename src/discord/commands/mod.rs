// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::DiscordTickets;
use miette::bail;
use twilight_http::client::Client;
use twilight_model::application::command::Command;
use twilight_model::application::interaction::application_command::CommandData;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::id::Id;
use twilight_model::id::marker::ApplicationMarker;

mod ticket_panel;

pub fn command_definitions() -> Vec<Command> {
	vec![ticket_panel::command_definition()]
}

pub async fn route_command(
	interaction: &InteractionCreate,
	command_data: &CommandData,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	ticket_system: &DiscordTickets,
) -> miette::Result<()> {
	match command_data.name.as_str() {
		ticket_panel::COMMAND_NAME => {
			ticket_panel::handle_command(interaction, http_client, application_id, ticket_system).await
		}
		_ => bail!("Unknown command encountered: {}\n{:?}", command_data.name, command_data),
	}
}
