// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::api::ApiError;
use crate::image::ImageError;
use crate::push::TransportError;

/// All possible errors that can occur in the heyama library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error("push channel error: {0}")]
    Push(#[from] TransportError),

    #[error(transparent)]
    Core(#[from] heyama_core::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("could not load objects: {0}")]
    Load(String),

    #[error("nothing to update\n  hint: pass --title and/or --description")]
    EmptyUpdate,

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for heyama operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
