// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! REST client for the `/objects` resource.
//!
//! [`ObjectApi`] is the seam the sync store talks through, so tests can
//! substitute a fake. [`HttpApiClient`] is the reqwest implementation.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

use heyama_core::media::{DEFAULT_IMAGE_NAME, DEFAULT_IMAGE_TYPE};
use heyama_core::{CreatePayload, HeyamaObject, Pagination, PickedImage, UpdatePayload};

use super::error::{ApiError, ApiResult};

/// Fixed timeout applied to every request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Boxed future returned by [`ObjectApi`] methods.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = ApiResult<T>> + Send + 'a>>;

/// Contract of the Remote API Client.
pub trait ObjectApi: Send + Sync {
    /// `GET /objects`, with optional paging.
    fn list(&self, pagination: Option<Pagination>) -> ApiFuture<'_, Vec<HeyamaObject>>;

    /// `GET /objects/{id}`.
    fn get<'a>(&'a self, id: &'a str) -> ApiFuture<'a, HeyamaObject>;

    /// `POST /objects` as multipart, with the image attached as `file`.
    fn create(&self, payload: CreatePayload) -> ApiFuture<'_, HeyamaObject>;

    /// `PATCH /objects/{id}` with only the fields that are set.
    fn update<'a>(&'a self, id: &'a str, patch: UpdatePayload) -> ApiFuture<'a, HeyamaObject>;

    /// `DELETE /objects/{id}`.
    fn delete<'a>(&'a self, id: &'a str) -> ApiFuture<'a, ()>;
}

/// HTTP implementation of [`ObjectApi`].
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpApiClient {
    /// Create a client with the default 30 second timeout.
    pub fn new(base_url: &str) -> ApiResult<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::Network(format!("invalid base url '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Network(format!(
                "invalid base url '{}'",
                base_url
            )));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// Get base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Get timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Builds `<base>/objects[/<id>]`, percent-encoding the id.
    fn objects_url(&self, id: Option<&str>) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ApiError::Network(format!("invalid base url '{}'", self.base_url)))?;
            segments.pop_if_empty().push("objects");
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        tracing::debug!("{} {}", method, url.path());
        self.client.request(method, url)
    }

    async fn list_objects(&self, pagination: Option<Pagination>) -> ApiResult<Vec<HeyamaObject>> {
        let url = self.objects_url(None)?;
        let mut request = self.request(Method::GET, url);
        let query = pagination.map(|p| p.query_pairs()).unwrap_or_default();
        if !query.is_empty() {
            request = request.query(&query);
        }
        let resp = send(request).await?;
        decode(resp).await
    }

    async fn get_object(&self, id: &str) -> ApiResult<HeyamaObject> {
        let url = self.objects_url(Some(id))?;
        let resp = send(self.request(Method::GET, url)).await?;
        decode(resp).await
    }

    async fn create_object(&self, payload: CreatePayload) -> ApiResult<HeyamaObject> {
        let url = self.objects_url(None)?;
        let mut form = Form::new()
            .text("title", payload.title)
            .text("description", payload.description);

        if let Some(image) = payload.image {
            form = form.part("file", file_part(&image).await?);
        }

        let resp = send(self.request(Method::POST, url).multipart(form)).await?;
        decode(resp).await
    }

    async fn update_object(&self, id: &str, patch: UpdatePayload) -> ApiResult<HeyamaObject> {
        let url = self.objects_url(Some(id))?;
        let resp = send(self.request(Method::PATCH, url).json(&patch)).await?;
        decode(resp).await
    }

    async fn delete_object(&self, id: &str) -> ApiResult<()> {
        let url = self.objects_url(Some(id))?;
        send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }
}

impl ObjectApi for HttpApiClient {
    fn list(&self, pagination: Option<Pagination>) -> ApiFuture<'_, Vec<HeyamaObject>> {
        Box::pin(self.list_objects(pagination))
    }

    fn get<'a>(&'a self, id: &'a str) -> ApiFuture<'a, HeyamaObject> {
        Box::pin(self.get_object(id))
    }

    fn create(&self, payload: CreatePayload) -> ApiFuture<'_, HeyamaObject> {
        Box::pin(self.create_object(payload))
    }

    fn update<'a>(&'a self, id: &'a str, patch: UpdatePayload) -> ApiFuture<'a, HeyamaObject> {
        Box::pin(self.update_object(id, patch))
    }

    fn delete<'a>(&'a self, id: &'a str) -> ApiFuture<'a, ()> {
        Box::pin(self.delete_object(id))
    }
}

/// Sends the request and turns non-success statuses into errors.
async fn send(request: RequestBuilder) -> ApiResult<Response> {
    let resp = request.send().await.map_err(|e| {
        let err = ApiError::from(e);
        tracing::warn!("request failed: {}", err);
        err
    })?;

    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let path = resp.url().path().to_string();
    let body = resp.text().await.unwrap_or_default();
    let err = ApiError::from_status(status.as_u16(), &body);
    tracing::warn!("{} on {}: {}", status, path, err);
    Err(err)
}

async fn decode<T: DeserializeOwned>(resp: Response) -> ApiResult<T> {
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::InvalidResponse(e.to_string()))
}

/// Reads the picked image from disk into a multipart file part.
async fn file_part(image: &PickedImage) -> ApiResult<Part> {
    let path = image.local_path().to_string();
    let attachment_error = |reason: String| ApiError::Attachment {
        path: path.clone(),
        reason,
    };

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| attachment_error(e.to_string()))?;

    let name = if image.name.is_empty() {
        DEFAULT_IMAGE_NAME.to_string()
    } else {
        image.name.clone()
    };
    let mime_type = if image.mime_type.is_empty() {
        DEFAULT_IMAGE_TYPE
    } else {
        image.mime_type.as_str()
    };

    Part::bytes(bytes)
        .file_name(name)
        .mime_str(mime_type)
        .map_err(|e| attachment_error(e.to_string()))
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
