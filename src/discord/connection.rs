// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::DiscordTickets;
use super::commands::{command_definitions, route_command};
use super::events::{MessageSnapshot, route_events, snapshot_message};
use super::interactions::{route_interaction, route_modal_submit};
use super::platform::DiscordPlatform;
use crate::config::ConfigData;
use crate::tickets::{TicketSettings, TicketSystem};
use miette::IntoDiagnostic;
use std::sync::Arc;
use twilight_cache_inmemory::{DefaultInMemoryCache, ResourceType};
use twilight_gateway::{EventTypeFlags, Intents, Shard, ShardId, StreamExt};
use twilight_http::client::Client;
use twilight_model::application::interaction::InteractionData;
use twilight_model::gateway::event::Event;
use twilight_model::id::Id;
use twilight_model::id::marker::ApplicationMarker;

pub fn set_up_client(config: &ConfigData) -> Arc<Client> {
	Arc::new(Client::new(config.discord.bot_token.clone()))
}

pub async fn run_bot(config: Arc<ConfigData>, http_client: Arc<Client>) -> miette::Result<()> {
	let intents = Intents::GUILDS
		| Intents::GUILD_MEMBERS
		| Intents::GUILD_MESSAGES
		| Intents::MESSAGE_CONTENT
		| Intents::GUILD_MODERATION;

	let mut shard = Shard::new(ShardId::ONE, config.discord.bot_token.clone(), intents);

	let cache = DefaultInMemoryCache::builder()
		.resource_types(ResourceType::all())
		.build();

	let application_id = {
		let application_response = http_client.current_user_application().await.into_diagnostic()?;
		application_response.model().await.into_diagnostic()?.id
	};

	{
		let interaction_client = http_client.interaction(application_id);
		let commands = command_definitions();
		interaction_client
			.set_global_commands(&commands)
			.await
			.into_diagnostic()?;
	}

	let platform = DiscordPlatform::new(Arc::clone(&http_client), config.discord.guild_id);
	let ticket_system = Arc::new(TicketSystem::new(platform, TicketSettings::from_config(&config)));

	while let Some(event) = shard.next_event(EventTypeFlags::all()).await {
		let event = match event {
			Ok(event) => event,
			Err(error) => {
				tracing::warn!(source = ?error, "error receiving event");
				continue;
			}
		};

		// Deletions and edits replace the cached message, so it has to be read first.
		let previous_message = match &event {
			Event::MessageDelete(message_delete) => snapshot_message(&cache, message_delete.id),
			Event::MessageUpdate(message_update) => snapshot_message(&cache, message_update.id),
			_ => None,
		};
		cache.update(&event);

		tokio::spawn(handle_event(
			event,
			previous_message,
			Arc::clone(&http_client),
			application_id,
			Arc::clone(&config),
			Arc::clone(&ticket_system),
		));
	}

	Ok(())
}

async fn handle_event(
	event: Event,
	previous_message: Option<MessageSnapshot>,
	http_client: Arc<Client>,
	application_id: Id<ApplicationMarker>,
	config: Arc<ConfigData>,
	ticket_system: Arc<DiscordTickets>,
) {
	let event_result = handle_event_route(
		event,
		previous_message,
		&http_client,
		application_id,
		&config,
		&ticket_system,
	)
	.await;
	if let Err(error) = event_result {
		tracing::error!(source = ?error, "An error occurred handling a gateway event");
	}
}

async fn handle_event_route(
	event: Event,
	previous_message: Option<MessageSnapshot>,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	config: &ConfigData,
	ticket_system: &DiscordTickets,
) -> miette::Result<()> {
	tracing::debug!("Incoming gateway message: {:?}", event);
	match &event {
		Event::InteractionCreate(interaction) => match &interaction.data {
			Some(InteractionData::ApplicationCommand(command_data)) => {
				route_command(interaction, command_data, http_client, application_id, ticket_system).await?
			}
			Some(InteractionData::MessageComponent(interaction_data)) => {
				route_interaction(interaction, interaction_data, http_client, application_id, ticket_system).await?
			}
			Some(InteractionData::ModalSubmit(modal_data)) => {
				route_modal_submit(interaction, modal_data, http_client, application_id, ticket_system).await?
			}
			_ => (),
		},
		Event::Ready(_) => {
			tracing::info!("Discord gateway is ready");
			start_tickets(ticket_system).await;
		}
		_ => route_events(&event, previous_message, http_client, config).await?,
	}
	Ok(())
}

/// Sets up the ticket channels and panel and recovers tickets from before a restart. Failures are logged; the bot
/// keeps handling other events either way.
async fn start_tickets(ticket_system: &DiscordTickets) {
	match ticket_system.start().await {
		Ok(report) => tracing::info!(
			panel_channel = ?report.panel_channel,
			panel_posted = report.panel_message.is_some(),
			recovered_tickets = report.recovered_tickets,
			"Ticket system started"
		),
		Err(error) => tracing::error!(source = ?error, "Failed to start the ticket system"),
	}
}
