// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Object types for the Heyama backend.
//!
//! This module contains the domain entity ([`HeyamaObject`]) and the request
//! payloads the client builds for it: [`CreatePayload`], [`UpdatePayload`]
//! and [`Pagination`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};
use crate::media::PickedImage;

/// Minimum title length accepted by the creation form.
pub const MIN_TITLE_LEN: usize = 3;

/// Minimum description length accepted by the creation form.
pub const MIN_DESCRIPTION_LEN: usize = 10;

/// A user-submitted object as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeyamaObject {
    /// Server-assigned identifier, immutable once created.
    pub id: String,
    pub title: String,
    pub description: String,
    /// Absolute URL of the stored image; empty when no image is attached.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    /// Equals `created_at` until the first edit.
    pub updated_at: DateTime<Utc>,
}

/// The backend sends `null` for objects stored without an image.
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl HeyamaObject {
    /// Creates an object without an image, as the server would on first insert.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        HeyamaObject {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            image_url: String::new(),
            created_at,
            updated_at: created_at,
        }
    }

    /// Sets the image URL.
    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = url.into();
        self
    }

    /// Returns true if an image is attached.
    pub fn has_image(&self) -> bool {
        !self.image_url.is_empty()
    }

    /// Returns true if the object was edited after creation.
    pub fn is_edited(&self) -> bool {
        self.updated_at > self.created_at
    }
}

/// Payload for creating an object.
///
/// Consumed exactly once by the create call.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatePayload {
    pub title: String,
    pub description: String,
    pub image: Option<PickedImage>,
}

impl CreatePayload {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        CreatePayload {
            title: title.into(),
            description: description.into(),
            image: None,
        }
    }

    /// Attaches an image to the payload.
    pub fn with_image(mut self, image: PickedImage) -> Self {
        self.image = Some(image);
        self
    }

    /// Checks the form rules: title of at least [`MIN_TITLE_LEN`] and
    /// description of at least [`MIN_DESCRIPTION_LEN`] characters, trimmed.
    ///
    /// Reports the first failing field.
    pub fn validate(&self) -> Result<()> {
        validate_title(&self.title)?;
        validate_description(&self.description)
    }
}

/// Partial update of an object. Only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdatePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl UpdatePayload {
    /// Returns true if no field would be changed.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }

    /// Checks the same rules as creation, for the fields that are set.
    pub fn validate(&self) -> Result<()> {
        if let Some(ref title) = self.title {
            validate_title(title)?;
        }
        if let Some(ref description) = self.description {
            validate_description(description)?;
        }
        Ok(())
    }
}

/// Optional paging parameters for the list call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl Pagination {
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Pagination { page, limit }
    }

    /// Returns the query pairs to send, skipping unset parameters.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}

fn validate_title(title: &str) -> Result<()> {
    let actual = title.trim().chars().count();
    if actual < MIN_TITLE_LEN {
        return Err(Error::TitleTooShort {
            min: MIN_TITLE_LEN,
            actual,
        });
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<()> {
    let actual = description.trim().chars().count();
    if actual < MIN_DESCRIPTION_LEN {
        return Err(Error::DescriptionTooShort {
            min: MIN_DESCRIPTION_LEN,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "object_tests.rs"]
mod tests;
