// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Picked image descriptors and file helpers.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Filename used when none can be derived from the uri.
pub const DEFAULT_IMAGE_NAME: &str = "image.jpg";

/// MIME type used when none is known.
pub const DEFAULT_IMAGE_TYPE: &str = "image/jpeg";

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "svg"];

/// A transport-ready image chosen on the device.
///
/// Transient: created by a capture, consumed by a create payload, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickedImage {
    /// Local resource locator (path or `file://` uri).
    pub uri: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
}

impl PickedImage {
    pub fn new(uri: impl Into<String>, mime_type: impl Into<String>, name: impl Into<String>) -> Self {
        PickedImage {
            uri: uri.into(),
            mime_type: mime_type.into(),
            name: name.into(),
            width: None,
            height: None,
            file_size: None,
        }
    }

    /// Sets the pixel dimensions.
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Builds a descriptor for an image file on the local filesystem.
    ///
    /// The MIME type is derived from the extension. Fails if the file name
    /// does not look like an image.
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_IMAGE_NAME)
            .to_string();
        if !is_image_file(&name) {
            return Err(Error::NotAnImage(name));
        }
        let mime_type = mime_type_for(&name);
        Ok(PickedImage::new(path.display().to_string(), mime_type, name))
    }

    /// Returns the filesystem path behind the uri, with any `file://` prefix
    /// removed.
    pub fn local_path(&self) -> &str {
        self.uri.strip_prefix("file://").unwrap_or(&self.uri)
    }
}

/// Returns the last path segment of a uri, or [`DEFAULT_IMAGE_NAME`].
pub fn filename_from_uri(uri: &str) -> String {
    match uri.rsplit('/').next() {
        Some(segment) if !segment.is_empty() => segment.to_string(),
        _ => DEFAULT_IMAGE_NAME.to_string(),
    }
}

/// Returns the extension of a filename without the dot.
///
/// Empty when there is no extension or the name is a dotfile.
pub fn file_extension(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(i) if i > 0 => &filename[i + 1..],
        _ => "",
    }
}

/// Returns true if the filename has an image extension.
pub fn is_image_file(filename: &str) -> bool {
    let ext = file_extension(filename).to_lowercase();
    IMAGE_EXTENSIONS.contains(&ext.as_str())
}

/// Returns the MIME type for an image filename, defaulting to JPEG.
pub fn mime_type_for(filename: &str) -> &'static str {
    match file_extension(filename).to_lowercase().as_str() {
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => DEFAULT_IMAGE_TYPE,
    }
}

#[cfg(test)]
#[path = "media_tests.rs"]
mod tests;
