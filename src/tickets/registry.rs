// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::error::TicketError;
use crate::model::{Ticket, TicketState};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, UserMarker};

/// The open tickets, keyed by the user who opened them.
///
/// Each operation holds the lock for its whole read-modify-write, and the lock is never held across an `.await`.
/// Nothing is persisted; see the reconciliation pass in the panel module for how tickets are recovered on startup.
#[derive(Debug, Default)]
pub struct TicketRegistry {
	inner: Mutex<RegistryInner>,
}

#[derive(Debug, Default)]
struct RegistryInner {
	by_requester: HashMap<Id<UserMarker>, Ticket>,
	by_channel: HashMap<Id<ChannelMarker>, Id<UserMarker>>,
	pending: HashSet<Id<UserMarker>>,
	closing: HashSet<Id<ChannelMarker>>,
}

impl RegistryInner {
	fn check_requester_free(&self, requester_id: Id<UserMarker>) -> Result<(), TicketError> {
		if let Some(ticket) = self.by_requester.get(&requester_id) {
			return Err(TicketError::AlreadyOpen {
				channel_id: Some(ticket.channel_id),
			});
		}
		if self.pending.contains(&requester_id) {
			return Err(TicketError::AlreadyOpen { channel_id: None });
		}
		Ok(())
	}

	fn insert(&mut self, ticket: Ticket) {
		self.by_channel.insert(ticket.channel_id, ticket.requester_id);
		self.by_requester.insert(ticket.requester_id, ticket);
	}

	fn remove(&mut self, requester_id: Id<UserMarker>) -> Option<Ticket> {
		let ticket = self.by_requester.remove(&requester_id)?;
		self.by_channel.remove(&ticket.channel_id);
		Some(ticket)
	}
}

impl TicketRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	fn lock(&self) -> MutexGuard<'_, RegistryInner> {
		// The maps are only modified in single statements, so the state is consistent even after a panic.
		self.inner.lock().unwrap_or_else(PoisonError::into_inner)
	}

	/// Claims the right to open a ticket for a user.
	///
	/// Fails with [TicketError::AlreadyOpen] if the user has an open ticket or another intake for them is in
	/// progress. The reservation is released when dropped unless [Reservation::commit] is called.
	pub fn reserve(&self, requester_id: Id<UserMarker>) -> Result<Reservation<'_>, TicketError> {
		let mut inner = self.lock();
		inner.check_requester_free(requester_id)?;
		inner.pending.insert(requester_id);
		Ok(Reservation {
			registry: self,
			requester_id,
			committed: false,
		})
	}

	/// Adds a ticket directly, without a reservation.
	pub fn register(&self, ticket: Ticket) -> Result<(), TicketError> {
		let mut inner = self.lock();
		inner.check_requester_free(ticket.requester_id)?;
		if inner.by_channel.contains_key(&ticket.channel_id) {
			return Err(TicketError::AlreadyOpen {
				channel_id: Some(ticket.channel_id),
			});
		}
		inner.insert(ticket);
		Ok(())
	}

	pub fn contains(&self, requester_id: Id<UserMarker>) -> bool {
		self.lock().by_requester.contains_key(&requester_id)
	}

	pub fn get(&self, requester_id: Id<UserMarker>) -> Option<Ticket> {
		self.lock().by_requester.get(&requester_id).cloned()
	}

	pub fn lookup_by_channel(&self, channel_id: Id<ChannelMarker>) -> Option<Id<UserMarker>> {
		self.lock().by_channel.get(&channel_id).copied()
	}

	pub fn ticket_for_channel(&self, channel_id: Id<ChannelMarker>) -> Option<Ticket> {
		let inner = self.lock();
		let requester_id = inner.by_channel.get(&channel_id)?;
		inner.by_requester.get(requester_id).cloned()
	}

	/// Marks the ticket in a channel as claimed by a staff member, returning the updated ticket.
	pub fn claim(&self, channel_id: Id<ChannelMarker>, staff_id: Id<UserMarker>) -> Result<Ticket, TicketError> {
		let mut inner = self.lock();
		let Some(requester_id) = inner.by_channel.get(&channel_id).copied() else {
			return Err(TicketError::NotATicketChannel);
		};
		let Some(ticket) = inner.by_requester.get_mut(&requester_id) else {
			return Err(TicketError::NotATicketChannel);
		};
		if let Some(claimed_by) = ticket.claimed_by {
			return Err(TicketError::AlreadyClaimed { claimed_by });
		}
		ticket.claimed_by = Some(staff_id);
		ticket.state = TicketState::Claimed;
		Ok(ticket.clone())
	}

	/// Undoes [Self::claim] when the claim couldn't be applied to the channel.
	pub fn release_claim(&self, channel_id: Id<ChannelMarker>) {
		let mut inner = self.lock();
		let Some(requester_id) = inner.by_channel.get(&channel_id).copied() else {
			return;
		};
		if let Some(ticket) = inner.by_requester.get_mut(&requester_id) {
			ticket.claimed_by = None;
			ticket.state = TicketState::Open;
		}
	}

	/// Marks a channel as being closed, so only one close runs for it at a time.
	///
	/// Fails with [TicketError::AlreadyClosing] while another close holds the marker. The marker is released when the
	/// returned guard is dropped.
	pub fn begin_close(&self, channel_id: Id<ChannelMarker>) -> Result<ClosingChannel<'_>, TicketError> {
		let mut inner = self.lock();
		if !inner.closing.insert(channel_id) {
			return Err(TicketError::AlreadyClosing);
		}
		Ok(ClosingChannel {
			registry: self,
			channel_id,
		})
	}

	pub fn remove(&self, requester_id: Id<UserMarker>) -> Option<Ticket> {
		self.lock().remove(requester_id)
	}

	/// Removes the ticket whose channel matches, found through the channel index.
	pub fn remove_by_channel(&self, channel_id: Id<ChannelMarker>) -> Option<Ticket> {
		let mut inner = self.lock();
		let requester_id = inner.by_channel.get(&channel_id).copied()?;
		inner.remove(requester_id)
	}

	pub fn len(&self) -> usize {
		self.lock().by_requester.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// A pending ticket for one user, held while their ticket channel is being created.
#[derive(Debug)]
pub struct Reservation<'a> {
	registry: &'a TicketRegistry,
	requester_id: Id<UserMarker>,
	committed: bool,
}

impl Reservation<'_> {
	/// Records the finished ticket. The ticket must be for the reserved user.
	pub fn commit(mut self, ticket: Ticket) {
		debug_assert_eq!(ticket.requester_id, self.requester_id);
		let mut inner = self.registry.lock();
		inner.pending.remove(&self.requester_id);
		inner.insert(ticket);
		self.committed = true;
	}
}

impl Drop for Reservation<'_> {
	fn drop(&mut self) {
		if !self.committed {
			self.registry.lock().pending.remove(&self.requester_id);
		}
	}
}

/// A close in progress for one channel.
#[derive(Debug)]
pub struct ClosingChannel<'a> {
	registry: &'a TicketRegistry,
	channel_id: Id<ChannelMarker>,
}

impl Drop for ClosingChannel<'_> {
	fn drop(&mut self) {
		self.registry.lock().closing.remove(&self.channel_id);
	}
}
