// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the collaborators the core depends on.
//!
//! Channel and transcriber adapters extend the [`PluginAdapter`] base trait and
//! use `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod channel;
pub mod reply;
pub mod transcriber;

pub use adapter::PluginAdapter;
pub use channel::ChannelAdapter;
pub use reply::ReplyHandle;
pub use transcriber::Transcriber;
