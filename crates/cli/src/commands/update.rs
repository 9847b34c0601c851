// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::{self, Write};

use heyama_core::UpdatePayload;

use crate::api::ObjectApi;
use crate::cli::OutputFormat;
use crate::error::{Error, Result};
use crate::store::ObjectStore;

use super::Context;

pub async fn run(
    ctx: &Context,
    id: &str,
    title: Option<String>,
    description: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let store = ctx.store()?;
    run_impl(&store, id, title, description, format, &mut io::stdout().lock()).await
}

/// Internal implementation that accepts a store for testing.
pub(crate) async fn run_impl<A: ObjectApi>(
    store: &ObjectStore<A>,
    id: &str,
    title: Option<String>,
    description: Option<String>,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    let patch = UpdatePayload { title, description };
    if patch.is_empty() {
        return Err(Error::EmptyUpdate);
    }
    patch.validate()?;

    let updated = store.update_object(id, patch).await?;
    match format {
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(&updated)?)?,
        OutputFormat::Text => writeln!(out, "Updated {}: {}", updated.id, updated.title)?,
    }
    Ok(())
}

#[cfg(test)]
#[path = "update_tests.rs"]
mod tests;
