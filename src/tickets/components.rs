// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::platform::OutgoingMessage;
use crate::model::TicketCategory;
use twilight_model::channel::message::component::{ActionRow, Button, ButtonStyle, Component};
use twilight_util::builder::embed::EmbedBuilder;

const PANEL_COLOR: u32 = 0x3498db;

/// Every button and modal the ticket system responds to.
///
/// Custom IDs are `/`-separated paths starting with `ticket`, so the same dispatch works no matter when the message
/// carrying the component was posted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TicketAction {
	/// A panel button asking to open a ticket of a category.
	Open(TicketCategory),
	/// The issue form for a new ticket was submitted.
	Submit(TicketCategory),
	Claim,
	Close,
}

impl TicketAction {
	pub fn from_custom_id(custom_id: &str) -> Option<Self> {
		let mut path = custom_id.split('/');
		if path.next() != Some("ticket") {
			return None;
		}
		let action = match (path.next(), path.next()) {
			(Some("open"), Some(category)) => Self::Open(TicketCategory::from_id(category)?),
			(Some("intake"), Some(category)) => Self::Submit(TicketCategory::from_id(category)?),
			(Some("claim"), None) => Self::Claim,
			(Some("close"), None) => Self::Close,
			_ => return None,
		};
		match path.next() {
			Some(_) => None,
			None => Some(action),
		}
	}

	pub fn custom_id(&self) -> String {
		match self {
			Self::Open(category) => format!("ticket/open/{}", category.as_id()),
			Self::Submit(category) => format!("ticket/intake/{}", category.as_id()),
			Self::Claim => String::from("ticket/claim"),
			Self::Close => String::from("ticket/close"),
		}
	}
}

fn button(action: TicketAction, label: &str, style: ButtonStyle) -> Component {
	Component::Button(Button {
		custom_id: Some(action.custom_id()),
		disabled: false,
		emoji: None,
		label: Some(label.to_string()),
		style,
		url: None,
		sku_id: None,
	})
}

/// The entry point message with one button per ticket category.
pub fn panel_message() -> OutgoingMessage {
	let embed = EmbedBuilder::new()
		.title("Support Tickets")
		.description("Click the button below to open a ticket.")
		.color(PANEL_COLOR)
		.build();
	let buttons = Component::ActionRow(ActionRow {
		components: vec![
			button(
				TicketAction::Open(TicketCategory::Report),
				"Open Report Ticket",
				ButtonStyle::Danger,
			),
			button(
				TicketAction::Open(TicketCategory::Order),
				"Open Order Ticket",
				ButtonStyle::Success,
			),
		],
	});
	OutgoingMessage {
		content: None,
		embeds: vec![embed],
		components: vec![buttons],
		mentioned_users: Vec::new(),
	}
}

/// Collects the custom IDs of every button in a message's components, including those nested in action rows.
pub fn component_ids(components: &[Component]) -> Vec<String> {
	let mut ids = Vec::new();
	for component in components {
		match component {
			Component::ActionRow(row) => ids.extend(component_ids(&row.components)),
			Component::Button(button) => ids.extend(button.custom_id.clone()),
			_ => (),
		}
	}
	ids
}

/// Whether a message carries the panel's buttons.
pub fn is_panel_message(component_ids: &[String]) -> bool {
	let report_id = TicketAction::Open(TicketCategory::Report).custom_id();
	component_ids.iter().any(|id| *id == report_id)
}

/// The staff controls attached to the first message in a ticket channel.
pub fn ticket_controls() -> Component {
	Component::ActionRow(ActionRow {
		components: vec![
			button(TicketAction::Claim, "Claim Ticket", ButtonStyle::Primary),
			button(TicketAction::Close, "Close Ticket", ButtonStyle::Danger),
		],
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn custom_ids_dispatch_to_actions() {
		assert_eq!(
			TicketAction::from_custom_id("ticket/open/report"),
			Some(TicketAction::Open(TicketCategory::Report))
		);
		assert_eq!(
			TicketAction::from_custom_id("ticket/intake/order"),
			Some(TicketAction::Submit(TicketCategory::Order))
		);
		assert_eq!(TicketAction::from_custom_id("ticket/claim"), Some(TicketAction::Claim));
		assert_eq!(TicketAction::from_custom_id("ticket/close"), Some(TicketAction::Close));
	}

	#[test]
	fn unknown_custom_ids_are_ignored() {
		assert_eq!(TicketAction::from_custom_id("ticket/open/refund"), None);
		assert_eq!(TicketAction::from_custom_id("ticket/close/now"), None);
		assert_eq!(TicketAction::from_custom_id("open_report_ticket"), None);
		assert_eq!(TicketAction::from_custom_id("ticket"), None);
	}

	#[test]
	fn panel_has_a_button_per_category() {
		let panel = panel_message();
		let ids = component_ids(&panel.components);
		assert_eq!(ids, vec!["ticket/open/report", "ticket/open/order"]);
		assert!(is_panel_message(&ids));
	}
}
