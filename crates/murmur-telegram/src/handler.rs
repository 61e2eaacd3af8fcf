// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversion of Telegram updates into channel-agnostic inbound messages.
//!
//! Only text messages with a known sender are forwarded. Text starting with
//! `/` becomes a command; everything else goes to admission as-is.

use std::sync::Arc;

use murmur_core::types::{InboundMessage, MessageContent, UserId};
use teloxide::prelude::*;

use crate::reply::TelegramReply;

/// Channel name reported on inbound messages.
pub const CHANNEL_NAME: &str = "telegram";

/// Returns the message text, or `None` for photos, locations and other
/// non-text updates.
pub fn extract_text(msg: &Message) -> Option<&str> {
    msg.text().filter(|text| !text.trim().is_empty())
}

/// Converts a Telegram message into an [`InboundMessage`] that replies to the
/// originating chat.
///
/// Returns `None` for messages without a sender (channel posts) or without text.
pub fn to_inbound_message(bot: &Bot, msg: &Message) -> Option<InboundMessage> {
    let sender = msg.from.as_ref()?;
    let text = extract_text(msg)?;

    Some(InboundMessage {
        id: msg.id.0.to_string(),
        channel: CHANNEL_NAME.to_string(),
        sender_id: UserId::from(sender.id.0),
        content: MessageContent::from_text(text),
        timestamp: chrono::DateTime::to_rfc3339(&msg.date),
        reply: Arc::new(TelegramReply::new(bot.clone(), msg.chat.id)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a mock private chat message from JSON, matching Telegram Bot API structure.
    fn make_private_message(user_id: u64, text: &str) -> Message {
        let json = serde_json::json!({
            "message_id": 7,
            "date": 1700000000i64,
            "chat": {
                "id": user_id as i64,
                "type": "private",
                "first_name": "Test",
            },
            "from": {
                "id": user_id,
                "is_bot": false,
                "first_name": "Test",
            },
            "text": text,
        });

        serde_json::from_value(json).expect("failed to deserialize mock message")
    }

    /// Build a mock message without a sender.
    fn make_no_sender_message(text: &str) -> Message {
        let json = serde_json::json!({
            "message_id": 1,
            "date": 1700000000i64,
            "chat": {
                "id": 12345i64,
                "type": "private",
                "first_name": "Test",
            },
            "text": text,
        });

        serde_json::from_value(json).expect("failed to deserialize mock message")
    }

    /// Build a mock location message, which has no text.
    fn make_location_message(user_id: u64) -> Message {
        let json = serde_json::json!({
            "message_id": 2,
            "date": 1700000000i64,
            "chat": {
                "id": user_id as i64,
                "type": "private",
                "first_name": "Test",
            },
            "from": {
                "id": user_id,
                "is_bot": false,
                "first_name": "Test",
            },
            "location": {
                "longitude": 24.94,
                "latitude": 60.17,
            },
        });

        serde_json::from_value(json).expect("failed to deserialize mock location")
    }

    #[test]
    fn text_message_maps_fields() {
        let bot = Bot::new("test:token");
        let msg = make_private_message(12345, "check this out http://example.com/a");
        let inbound = to_inbound_message(&bot, &msg).expect("text message is forwarded");

        assert_eq!(inbound.id, "7");
        assert_eq!(inbound.channel, "telegram");
        assert_eq!(inbound.sender_id, UserId::from(12345u64));
        assert_eq!(
            inbound.content,
            MessageContent::Text("check this out http://example.com/a".into())
        );
        assert!(inbound.timestamp.starts_with("2023-11-14"));
    }

    #[test]
    fn command_message_is_parsed() {
        let bot = Bot::new("test:token");
        let msg = make_private_message(12345, "/model large-v3");
        let inbound = to_inbound_message(&bot, &msg).unwrap();
        assert_eq!(
            inbound.content,
            MessageContent::Command {
                name: "model".into(),
                args: vec!["large-v3".into()],
            }
        );
    }

    #[test]
    fn message_without_sender_is_dropped() {
        let bot = Bot::new("test:token");
        assert!(to_inbound_message(&bot, &make_no_sender_message("hello")).is_none());
    }

    #[test]
    fn non_text_message_is_dropped() {
        let bot = Bot::new("test:token");
        let msg = make_location_message(12345);
        assert!(extract_text(&msg).is_none());
        assert!(to_inbound_message(&bot, &msg).is_none());
    }
}
