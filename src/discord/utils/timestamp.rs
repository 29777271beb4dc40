// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, TimeZone, Utc};
use twilight_model::util::datetime::Timestamp;
use twilight_util::snowflake::Snowflake;

/// The creation time encoded in a Discord ID. Returns `None` if the ID holds an impossible time.
pub fn datetime_from_id(id: impl Snowflake) -> Option<DateTime<Utc>> {
	Utc.timestamp_millis_opt(id.timestamp()).single()
}

/// Converts a timestamp sent by Discord, such as a message's send time.
pub fn datetime_from_timestamp(timestamp: &Timestamp) -> Option<DateTime<Utc>> {
	Utc.timestamp_micros(timestamp.as_micros()).single()
}

#[cfg(test)]
mod tests {
	use super::*;
	use twilight_model::id::Id;
	use twilight_model::id::marker::ChannelMarker;

	#[test]
	fn channel_ids_carry_their_creation_time() {
		// The ID from Discord's snowflake documentation.
		let channel_id: Id<ChannelMarker> = Id::new(175928847299117063);
		let created = datetime_from_id(channel_id).unwrap();
		assert_eq!(created.to_rfc3339(), "2016-04-30T11:18:25.796+00:00");
	}

	#[test]
	fn message_timestamps_convert_exactly() {
		let timestamp = Timestamp::from_secs(1_735_732_800).unwrap();
		let converted = datetime_from_timestamp(&timestamp).unwrap();
		assert_eq!(converted, Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap());
	}
}
