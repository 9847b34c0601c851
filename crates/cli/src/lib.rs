// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! heyama - client library and CLI for the Heyama object catalogue.
//!
//! The backend stores objects (title, description, optional image) behind
//! a REST API and announces changes over a Socket.IO channel. This crate
//! keeps a local list in sync with both.
//!
//! # Main Components
//!
//! - [`api`] - REST client ([`HttpApiClient`]) behind the [`ObjectApi`] trait
//! - [`push`] - reconnecting push channel ([`PushChannel`])
//! - [`store`] - the canonical object list ([`ObjectStore`])
//! - [`image`] - permission-gated image acquisition ([`ImageService`])
//! - [`Config`] - base URL, timeouts and reconnect policy
//! - [`Error`] - Error types for all operations
//!
//! # Usage
//!
//! ```rust,ignore
//! use heyama::{HttpApiClient, ObjectStore, PushChannel, PushConfig};
//!
//! let channel = PushChannel::new(PushConfig::default());
//! let api = HttpApiClient::new("https://api.example.com")?;
//! let store = ObjectStore::open(api, &channel).await;
//! channel.open();
//!
//! for object in store.objects() {
//!     println!("{}: {}", object.id, object.title);
//! }
//! ```

mod cli;
mod commands;
mod display;

pub mod api;
pub mod config;
pub mod env;
pub mod error;
pub mod image;
pub mod push;
pub mod store;

#[cfg(test)]
mod test_helpers;

pub use api::{ApiError, HttpApiClient, ObjectApi};
pub use cli::{Cli, Command, OutputFormat, PageArgs};
pub use config::Config;
pub use error::{Error, Result};
pub use image::{ImageService, MediaSource, PickOutcome};
pub use push::{ConnectionState, PushChannel, PushConfig};
pub use store::ObjectStore;

use commands::Context;

/// Execute a parsed command line.
pub async fn run(cli: Cli) -> Result<()> {
    let ctx = Context::load(cli.config.as_deref())?;
    match cli.command {
        Command::List { page, output } => {
            commands::list::run(&ctx, page.pagination(), output).await
        }
        Command::Show { id, output } => commands::show::run(&ctx, &id, output).await,
        Command::Create {
            title,
            description,
            image,
            output,
        } => commands::create::run(&ctx, title, description, image.as_deref(), output).await,
        Command::Update {
            id,
            title,
            description,
            output,
        } => commands::update::run(&ctx, &id, title, description, output).await,
        Command::Delete { id } => commands::delete::run(&ctx, &id).await,
        Command::Watch { events } => commands::watch::run(&ctx, events).await,
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
