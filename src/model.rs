// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, Utc};
use std::fmt;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, UserMarker};

/// The kinds of tickets a user can open from the ticket panel.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TicketCategory {
	Report,
	Order,
}

impl TicketCategory {
	pub fn from_id(id: &str) -> Option<Self> {
		match id {
			"report" => Some(Self::Report),
			"order" => Some(Self::Order),
			_ => None,
		}
	}

	/// The identifier used for this category in custom IDs and channel names.
	pub fn as_id(&self) -> &'static str {
		match self {
			Self::Report => "report",
			Self::Order => "order",
		}
	}

	pub fn all_categories() -> [Self; 2] {
		[Self::Report, Self::Order]
	}

	pub fn name(&self) -> &'static str {
		match self {
			Self::Report => "Report",
			Self::Order => "Order",
		}
	}
}

impl fmt::Display for TicketCategory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.name())
	}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TicketState {
	Open,
	Claimed,
	/// Closed tickets are removed from the registry; this state only appears on the value returned from closing.
	Closed,
}

/// An open support ticket.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ticket {
	/// The user who opened the ticket. A user may only have one open ticket at a time.
	pub requester_id: Id<UserMarker>,
	/// The channel created for this ticket.
	pub channel_id: Id<ChannelMarker>,
	pub category: TicketCategory,
	/// The staff member handling the ticket, if someone has claimed it.
	pub claimed_by: Option<Id<UserMarker>>,
	pub state: TicketState,
	/// When the ticket was opened.
	pub created_at: DateTime<Utc>,
}

impl Ticket {
	pub fn new(
		requester_id: Id<UserMarker>,
		channel_id: Id<ChannelMarker>,
		category: TicketCategory,
		created_at: DateTime<Utc>,
	) -> Self {
		Self {
			requester_id,
			channel_id,
			category,
			claimed_by: None,
			state: TicketState::Open,
			created_at,
		}
	}

	pub fn is_claimed(&self) -> bool {
		self.claimed_by.is_some()
	}
}

const TICKET_FOR: &str = " ticket for ";
const CLAIMED_BY: &str = " | Claimed by ";

/// The structured annotation kept in a ticket channel's topic.
///
/// The topic is rendered as `Report ticket for name (ID: 123)`, and claiming appends
/// ` | Claimed by staff (ID: 456)`. Only the IDs are used when reading it back; names are for people reading the
/// channel.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TicketTopic {
	pub category: TicketCategory,
	pub requester_id: Id<UserMarker>,
	pub claimed_by: Option<Id<UserMarker>>,
}

impl TicketTopic {
	pub fn render(category: TicketCategory, requester_name: &str, requester_id: Id<UserMarker>) -> String {
		format!("{}{}{} (ID: {})", category.name(), TICKET_FOR, requester_name, requester_id)
	}

	pub fn render_claim(topic: &str, staff_name: &str, staff_id: Id<UserMarker>) -> String {
		format!("{}{}{} (ID: {})", topic, CLAIMED_BY, staff_name, staff_id)
	}

	/// Reads a ticket topic back. Returns `None` for anything that wasn't rendered by [Self::render].
	pub fn parse(topic: &str) -> Option<Self> {
		let (category_name, rest) = topic.split_once(TICKET_FOR)?;
		let category = TicketCategory::all_categories()
			.into_iter()
			.find(|category| category.name() == category_name)?;

		if let Some((requester_part, claim_part)) = rest.rsplit_once(CLAIMED_BY) {
			if let (Some(requester_id), Some(staff_id)) = (trailing_id(requester_part), trailing_id(claim_part)) {
				return Some(Self {
					category,
					requester_id,
					claimed_by: Some(staff_id),
				});
			}
		}

		let requester_id = trailing_id(rest)?;
		Some(Self {
			category,
			requester_id,
			claimed_by: None,
		})
	}
}

/// Gets the ID from the `(ID: 123)` suffix of a topic segment.
fn trailing_id(segment: &str) -> Option<Id<UserMarker>> {
	let id_part = segment.strip_suffix(')')?;
	let (_, id) = id_part.rsplit_once(" (ID: ")?;
	id.parse::<u64>().ok().and_then(Id::new_checked)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn topic_round_trips_through_a_claim() {
		let topic = TicketTopic::render(TicketCategory::Report, "alice", Id::new(11));
		assert_eq!(topic, "Report ticket for alice (ID: 11)");
		let parsed = TicketTopic::parse(&topic).unwrap();
		assert_eq!(parsed.requester_id, Id::new(11));
		assert_eq!(parsed.claimed_by, None);

		let claimed = TicketTopic::render_claim(&topic, "staffer", Id::new(22));
		let parsed = TicketTopic::parse(&claimed).unwrap();
		assert_eq!(parsed.category, TicketCategory::Report);
		assert_eq!(parsed.requester_id, Id::new(11));
		assert_eq!(parsed.claimed_by, Some(Id::new(22)));
	}

	#[test]
	fn claim_lookalike_in_a_name_is_not_a_claim() {
		let topic = TicketTopic::render(TicketCategory::Order, "x | Claimed by y", Id::new(5));
		let parsed = TicketTopic::parse(&topic).unwrap();
		assert_eq!(parsed.requester_id, Id::new(5));
		assert_eq!(parsed.claimed_by, None);
	}

	#[test]
	fn unrelated_topics_are_ignored() {
		assert_eq!(TicketTopic::parse("General chat. Claimed by nobody"), None);
		assert_eq!(TicketTopic::parse("Support ticket for bob (ID: 3)"), None);
		assert_eq!(TicketTopic::parse("Report ticket for bob"), None);
	}
}
