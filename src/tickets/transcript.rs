// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::HistoryMessage;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The archived record of a closed ticket channel.
#[derive(Debug)]
pub struct Transcript {
	pub file_name: String,
	/// The message posted alongside the transcript file.
	pub header: String,
	pub body: String,
	pub line_count: usize,
}

/// Renders one message as a single transcript line: `[2025-01-01 12:00:00] author: content`.
///
/// Line breaks inside the message are written as `\n` (and lone carriage returns as `\r`) so every message stays on one
/// line.
pub fn render_line(message: &HistoryMessage) -> String {
	let content = message
		.content
		.replace("\r\n", "\n")
		.replace('\n', "\\n")
		.replace('\r', "\\r");
	let mut line = format!(
		"[{}] {}: {}",
		message.timestamp.format(TIMESTAMP_FORMAT),
		message.author_name,
		content
	);
	for url in message.attachment_urls.iter() {
		line.push_str(&format!(" [attachment: {}]", url));
	}
	line
}

/// Renders a channel's history, which must be in the order the messages were sent.
pub fn render_transcript(channel_name: &str, messages: &[HistoryMessage]) -> Transcript {
	let mut body = String::new();
	for message in messages {
		body.push_str(&render_line(message));
		body.push('\n');
	}
	Transcript {
		file_name: format!("{}.txt", channel_name),
		header: format!("Transcript for ticket: {}", channel_name),
		body,
		line_count: messages.len(),
	}
}
