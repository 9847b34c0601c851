// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote API Client for the Heyama backend.
//!
//! | Operation | Method | Path             |
//! |-----------|--------|------------------|
//! | list      | GET    | `/objects`       |
//! | get       | GET    | `/objects/{id}`  |
//! | create    | POST   | `/objects`       |
//! | update    | PATCH  | `/objects/{id}`  |
//! | delete    | DELETE | `/objects/{id}`  |
//!
//! Every failure is reported as an [`ApiError`]: 404 is `NotFound`, other
//! 4xx are `Validation`, 5xx are `Server`, and timeouts or connection
//! failures are `Network`.

mod client;
mod error;

pub use client::{ApiFuture, HttpApiClient, ObjectApi, DEFAULT_TIMEOUT};
pub use error::{server_message, ApiError, ApiResult};
