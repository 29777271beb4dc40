// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::interaction_actor;
use crate::discord::DiscordTickets;
use crate::discord::utils::responses::{deferred_ephemeral_message, ephemeral_message, error_notice};
use crate::model::TicketCategory;
use crate::tickets::components::TicketAction;
use miette::{IntoDiagnostic, bail};
use twilight_http::client::InteractionClient;
use twilight_mention::fmt::Mention;
use twilight_model::application::interaction::modal::ModalInteractionData;
use twilight_model::channel::message::component::{ActionRow, Component, TextInput, TextInputStyle};
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::http::interaction::{InteractionResponse, InteractionResponseType};
use twilight_util::builder::InteractionResponseDataBuilder;

const ISSUE_FIELD: &str = "issue";

async fn respond(
	interaction: &InteractionCreate,
	interaction_client: &InteractionClient<'_>,
	response: &InteractionResponse,
) -> miette::Result<()> {
	interaction_client
		.create_response(interaction.id, &interaction.token, response)
		.await
		.into_diagnostic()?;
	Ok(())
}

async fn update_deferred(
	interaction: &InteractionCreate,
	interaction_client: &InteractionClient<'_>,
	content: &str,
) -> miette::Result<()> {
	interaction_client
		.update_response(&interaction.token)
		.content(Some(content))
		.await
		.into_diagnostic()?;
	Ok(())
}

/// Shows the issue form for a new ticket, unless the user already has a ticket open.
pub async fn show_issue_form(
	interaction: &InteractionCreate,
	category: TicketCategory,
	interaction_client: &InteractionClient<'_>,
	ticket_system: &DiscordTickets,
) -> miette::Result<()> {
	let actor = interaction_actor(interaction)?;
	if let Err(error) = ticket_system.check_can_open(actor.id) {
		return respond(interaction, interaction_client, &ephemeral_message(error_notice(&error))).await;
	}

	let issue_input = Component::TextInput(TextInput {
		custom_id: String::from(ISSUE_FIELD),
		label: String::from("What is the issue?"),
		max_length: Some(ticket_system.settings.issue_max_length),
		min_length: Some(1),
		placeholder: Some(String::from("Describe your issue")),
		required: Some(true),
		style: TextInputStyle::Paragraph,
		value: None,
	});
	let issue_row = Component::ActionRow(ActionRow {
		components: vec![issue_input],
	});

	let response = InteractionResponseDataBuilder::new()
		.custom_id(TicketAction::Submit(category).custom_id())
		.title(format!("Open {} Ticket", category))
		.components(vec![issue_row])
		.build();
	let response = InteractionResponse {
		kind: InteractionResponseType::Modal,
		data: Some(response),
	};
	respond(interaction, interaction_client, &response).await
}

/// Opens the ticket described in a submitted issue form.
pub async fn submit_issue(
	interaction: &InteractionCreate,
	modal_data: &ModalInteractionData,
	category: TicketCategory,
	interaction_client: &InteractionClient<'_>,
	ticket_system: &DiscordTickets,
) -> miette::Result<()> {
	let actor = interaction_actor(interaction)?;
	let mut issue: Option<String> = None;
	for row in modal_data.components.iter() {
		for component in row.components.iter() {
			if component.custom_id == ISSUE_FIELD {
				issue = component.value.clone();
			}
		}
	}
	let Some(issue) = issue else {
		bail!("Ticket form submitted without an issue: {:?}", modal_data);
	};

	respond(interaction, interaction_client, &deferred_ephemeral_message()).await?;
	let content = match ticket_system.open_ticket(&actor, category, &issue).await {
		Ok(ticket) => format!("Your ticket has been created: {}", ticket.channel_id.mention()),
		Err(error) => error_notice(&error),
	};
	update_deferred(interaction, interaction_client, &content).await
}

pub async fn claim(
	interaction: &InteractionCreate,
	interaction_client: &InteractionClient<'_>,
	ticket_system: &DiscordTickets,
) -> miette::Result<()> {
	let actor = interaction_actor(interaction)?;
	let Some(channel) = &interaction.channel else {
		bail!("Claim button used outside of a channel");
	};

	respond(interaction, interaction_client, &deferred_ephemeral_message()).await?;
	let content = match ticket_system.claim_ticket(channel.id, &actor).await {
		Ok(_) => String::from("You claimed this ticket."),
		Err(error) => error_notice(&error),
	};
	update_deferred(interaction, interaction_client, &content).await
}

/// Closes the ticket in the interaction's channel. The channel is gone afterward, so only failures are reported.
pub async fn close(
	interaction: &InteractionCreate,
	interaction_client: &InteractionClient<'_>,
	ticket_system: &DiscordTickets,
) -> miette::Result<()> {
	let actor = interaction_actor(interaction)?;
	let Some(channel) = &interaction.channel else {
		bail!("Close button used outside of a channel");
	};

	let ticket_channel = match ticket_system.check_can_close(channel.id).await {
		Ok(ticket_channel) => ticket_channel,
		Err(error) => {
			return respond(interaction, interaction_client, &ephemeral_message(error_notice(&error))).await;
		}
	};

	respond(interaction, interaction_client, &deferred_ephemeral_message()).await?;
	if let Err(error) = ticket_system.close_ticket(&ticket_channel, &actor).await {
		let content = if error.is_validation() {
			error_notice(&error)
		} else {
			format!("The ticket was not closed. {}", error_notice(&error))
		};
		update_deferred(interaction, interaction_client, &content).await?;
	}
	Ok(())
}
