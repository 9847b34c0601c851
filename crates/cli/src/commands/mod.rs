// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod create;
pub mod delete;
pub mod list;
pub mod show;
pub mod update;
pub mod watch;

use std::io::Write;
use std::path::Path;

use heyama_core::HeyamaObject;

use crate::api::HttpApiClient;
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::error::Result;
use crate::push::PushChannel;
use crate::store::ObjectStore;

/// Everything a command needs from the environment.
pub struct Context {
    pub config: Config,
}

impl Context {
    /// Resolve configuration from `--config`, the environment and defaults.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = Config::resolve(config_path)?;
        tracing::debug!(base_url = %config.api.base_url, "resolved config");
        Ok(Context { config })
    }

    pub fn api(&self) -> Result<HttpApiClient> {
        let api = HttpApiClient::with_timeout(
            &self.config.api.base_url,
            self.config.request_timeout(),
        )?;
        Ok(api)
    }

    /// A store backed by the HTTP client, with no push subscription.
    pub fn store(&self) -> Result<ObjectStore<HttpApiClient>> {
        Ok(ObjectStore::new(self.api()?))
    }

    pub fn push_channel(&self) -> PushChannel {
        PushChannel::new(self.config.push_config())
    }
}

/// Print one object in the requested format.
fn write_object(out: &mut impl Write, object: &HeyamaObject, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => writeln!(out, "{}", crate::display::format_object_details(object))?,
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(object)?)?,
    }
    Ok(())
}

/// "1 object", "3 objects".
fn count_label(n: usize) -> String {
    if n == 1 {
        "1 object".to_string()
    } else {
        format!("{} objects", n)
    }
}
