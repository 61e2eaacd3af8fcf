// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Replies to a Telegram chat.
//!
//! Telegram rejects messages over 4096 characters, so long replies are split at
//! paragraph boundaries and sent as several messages.

use async_trait::async_trait;
use murmur_core::error::MurmurError;
use murmur_core::traits::ReplyHandle;
use murmur_core::types::ReplyFormat;
use teloxide::prelude::*;
use teloxide::types::{ChatId, ParseMode};
use tracing::warn;

/// Maximum message length accepted by the Bot API. Counting bytes keeps every
/// chunk under the limit, which Telegram measures in UTF-16 code units.
pub const MAX_MESSAGE_LEN: usize = 4096;

/// Reply handle bound to one Telegram chat.
#[derive(Clone)]
pub struct TelegramReply {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramReply {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }

    pub fn chat_id(&self) -> ChatId {
        self.chat_id
    }

    async fn send_chunk(&self, chunk: &str, format: ReplyFormat) -> Result<(), MurmurError> {
        let result = match parse_mode(format) {
            Some(mode) => {
                match self
                    .bot
                    .send_message(self.chat_id, chunk)
                    .parse_mode(mode)
                    .await
                {
                    Ok(sent) => Ok(sent),
                    Err(e) => {
                        warn!(chat_id = self.chat_id.0, error = %e, "HTML reply failed, sending as plain text");
                        self.bot.send_message(self.chat_id, chunk).await
                    }
                }
            }
            None => self.bot.send_message(self.chat_id, chunk).await,
        };

        result.map(|_| ()).map_err(|e| MurmurError::Channel {
            message: format!("failed to send message: {e}"),
            source: Some(Box::new(e)),
        })
    }
}

#[async_trait]
impl ReplyHandle for TelegramReply {
    async fn reply(&self, text: &str, format: ReplyFormat) -> Result<(), MurmurError> {
        for chunk in split_message(text, MAX_MESSAGE_LEN) {
            self.send_chunk(chunk, format).await?;
        }
        Ok(())
    }
}

/// Telegram parse mode for a reply format.
pub fn parse_mode(format: ReplyFormat) -> Option<ParseMode> {
    match format {
        ReplyFormat::Plain => None,
        ReplyFormat::Html => Some(ParseMode::Html),
    }
}

/// Splits `text` into chunks of at most `max_len` bytes.
pub fn split_message(text: &str, max_len: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let (chunk, remainder) = split_at_paragraph_boundary(rest, max_len);
        if !chunk.is_empty() {
            chunks.push(chunk);
        }
        rest = remainder;
    }
    chunks
}

/// Splits off a prefix of at most `max_len` bytes, preferring a blank line,
/// then a newline, then a space as the cut point.
pub fn split_at_paragraph_boundary(text: &str, max_len: usize) -> (&str, &str) {
    if text.len() <= max_len {
        return (text, "");
    }

    let limit = floor_char_boundary(text, max_len.max(1));
    let search_region = &text[..limit];

    if let Some(pos) = search_region.rfind("\n\n").filter(|&pos| pos > 0) {
        return (&text[..pos], text[pos + 2..].trim_start());
    }
    if let Some(pos) = search_region.rfind('\n').filter(|&pos| pos > 0) {
        return (&text[..pos], text[pos + 1..].trim_start());
    }
    if let Some(pos) = search_region.rfind(' ').filter(|&pos| pos > 0) {
        return (&text[..pos], &text[pos + 1..]);
    }

    // Hard split. A single character wider than `max_len` still goes out whole.
    let cut = if limit == 0 {
        text.chars().next().map_or(text.len(), char::len_utf8)
    } else {
        limit
    };
    (&text[..cut], &text[cut..])
}

fn floor_char_boundary(text: &str, index: usize) -> usize {
    (0..=index.min(text.len()))
        .rev()
        .find(|&i| text.is_char_boundary(i))
        .unwrap_or(0)
}
