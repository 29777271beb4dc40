// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::DiscordTickets;
use crate::tickets::Actor;
use crate::tickets::components::TicketAction;
use miette::bail;
use twilight_http::client::Client;
use twilight_model::application::interaction::message_component::MessageComponentInteractionData;
use twilight_model::application::interaction::modal::ModalInteractionData;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::id::Id;
use twilight_model::id::marker::ApplicationMarker;

mod tickets;

pub async fn route_interaction(
	interaction: &InteractionCreate,
	interaction_data: &MessageComponentInteractionData,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	ticket_system: &DiscordTickets,
) -> miette::Result<()> {
	let interaction_client = http_client.interaction(application_id);
	match TicketAction::from_custom_id(&interaction_data.custom_id) {
		Some(TicketAction::Open(category)) => {
			tickets::show_issue_form(interaction, category, &interaction_client, ticket_system).await
		}
		Some(TicketAction::Claim) => tickets::claim(interaction, &interaction_client, ticket_system).await,
		Some(TicketAction::Close) => tickets::close(interaction, &interaction_client, ticket_system).await,
		Some(TicketAction::Submit(_)) | None => bail!(
			"Unknown component interaction: {} ({:?})",
			interaction_data.custom_id,
			interaction_data
		),
	}
}

pub async fn route_modal_submit(
	interaction: &InteractionCreate,
	modal_data: &ModalInteractionData,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	ticket_system: &DiscordTickets,
) -> miette::Result<()> {
	let interaction_client = http_client.interaction(application_id);
	match TicketAction::from_custom_id(&modal_data.custom_id) {
		Some(TicketAction::Submit(category)) => {
			tickets::submit_issue(interaction, modal_data, category, &interaction_client, ticket_system).await
		}
		_ => bail!("Unknown modal submitted: {} ({:?})", modal_data.custom_id, modal_data),
	}
}

/// Gets the member using an interaction as the actor for a ticket action.
fn interaction_actor(interaction: &InteractionCreate) -> miette::Result<Actor> {
	let Some(member) = &interaction.member else {
		bail!("Ticket interaction used outside of a guild");
	};
	let Some(user) = &member.user else {
		bail!("Interaction member is not a user");
	};
	Ok(Actor {
		id: user.id,
		name: user.name.clone(),
		roles: member.roles.clone(),
	})
}
