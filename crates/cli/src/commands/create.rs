// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::{self, Write};
use std::path::Path;

use heyama_core::{CreatePayload, PickedImage};

use crate::api::ObjectApi;
use crate::cli::OutputFormat;
use crate::error::{Error, Result};
use crate::store::ObjectStore;

use super::Context;

pub async fn run(
    ctx: &Context,
    title: String,
    description: String,
    image: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let store = ctx.store()?;
    run_impl(&store, title, description, image, format, &mut io::stdout().lock()).await
}

/// Build and check the payload before anything is sent.
pub(crate) fn build_payload(
    title: String,
    description: String,
    image: Option<&Path>,
) -> Result<CreatePayload> {
    let mut payload = CreatePayload::new(title, description);
    payload.validate()?;

    if let Some(path) = image {
        if !path.is_file() {
            return Err(Error::InvalidInput(format!(
                "image not found: {}",
                path.display()
            )));
        }
        payload = payload.with_image(PickedImage::from_path(path)?);
    }
    Ok(payload)
}

/// Internal implementation that accepts a store for testing.
pub(crate) async fn run_impl<A: ObjectApi>(
    store: &ObjectStore<A>,
    title: String,
    description: String,
    image: Option<&Path>,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    let payload = build_payload(title, description, image)?;
    let with_image = payload.image.is_some();
    tracing::debug!(title = %payload.title, with_image, "creating object");

    let created = store.create_object(payload).await?;
    match format {
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(&created)?)?,
        OutputFormat::Text => writeln!(out, "Created {}: {}", created.id, created.title)?,
    }
    Ok(())
}

#[cfg(test)]
#[path = "create_tests.rs"]
mod tests;
