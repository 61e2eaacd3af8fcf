// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bot commands and the HTML replies they produce.

use std::time::Duration;

/// Version reported by `/help`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A recognized bot command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/help`, `/about` or `/start`.
    Help,
    /// `/model` with an optional model name.
    Model(Option<String>),
    /// Anything else.
    Unknown(String),
}

impl Command {
    /// Maps a parsed command name and its arguments to a [`Command`].
    ///
    /// Extra arguments to `/model` are ignored.
    pub fn parse(name: &str, args: &[String]) -> Self {
        match name {
            "help" | "about" | "start" => Command::Help,
            "model" => Command::Model(args.first().cloned()),
            other => Command::Unknown(other.to_string()),
        }
    }
}

/// Result of a `/model <name>` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelChangeOutcome {
    Changed { model: String },
    RateLimited { remaining: Duration },
    InvalidModel { requested: String, valid: Vec<String> },
}

impl ModelChangeOutcome {
    /// HTML reply for the user.
    pub fn reply_text(&self) -> String {
        match self {
            ModelChangeOutcome::Changed { model } => {
                format!("Model set to: <code>{model}</code>")
            }
            ModelChangeOutcome::RateLimited { remaining } => {
                let secs = remaining.as_secs_f64().ceil().max(1.0) as u64;
                let unit = if secs == 1 { "second" } else { "seconds" };
                format!(
                    "You are changing models too often. Please wait <b>{secs}</b> {unit} before changing the model again."
                )
            }
            ModelChangeOutcome::InvalidModel { valid, .. } => {
                format!(
                    "Invalid model specified.\n\n<b>Available models:</b>\n{}",
                    valid.join(", ")
                )
            }
        }
    }
}

/// `/help` and `/about` reply.
pub fn help_text(default_model: &str, valid_models: &[String]) -> String {
    format!(
        "<b>Murmur transcription bot</b>\n\n\
         <b>Version:</b> {VERSION}\n\n\
         <b>How to use:</b>\n\
         - Send a message containing a media URL to have its audio transcribed.\n\
         - Requests are processed one at a time, in the order they arrive.\n\
         - Use /model to see or change your transcription model.\n\
         - Use /help or /about to display this message.\n\n\
         <b>Default model:</b>\n<code>{default_model}</code>\n\n\
         <b>Available models:</b>\n{}",
        valid_models.join(", ")
    )
}

/// `/model` reply when no model name is given.
pub fn model_status(current: &str, valid_models: &[String]) -> String {
    format!(
        "<b>Current model:</b>\n<code>{current}</code>\n\n\
         <b>Available models:</b>\n{}\n\n\
         To change the model, use commands like:\n\
         <code>/model medium.en</code>\n\
         <code>/model large-v3</code>\n\n\
         <b>Model details:</b>\n\
         - <b>Tiny</b>: fastest, ~1GB VRAM, about 32x faster than large.\n\
         - <b>Base</b>: faster, ~1GB VRAM, about 16x faster than large.\n\
         - <b>Small</b>: balanced, ~2GB VRAM, about 6x faster than large.\n\
         - <b>Medium</b>: more precise, ~5GB VRAM, about 2x faster than large.\n\
         - <b>Large</b>: most precise, real-time speed, ~10GB VRAM.\n\n\
         Models ending in <code>.en</code> are tuned for English; the gain shrinks as model size grows. \
         Larger models are more accurate but slower. For English, <code>medium.en</code> is usually \
         the best balance of speed and accuracy.",
        valid_models.join(", ")
    )
}

/// Reply for a command the bot does not know.
pub fn unknown_command(name: &str) -> String {
    format!("Unknown command /{name}. Type /help for usage.")
}
