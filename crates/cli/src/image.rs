// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Image acquisition with permission handling.
//!
//! The camera, photo library and permission prompts belong to the platform,
//! so [`ImageService`] reaches them through [`MediaDevice`] and reports
//! refusals through [`Notifier`].
//!
//! ```text
//! Idle ──► RequestingPermission ──► Capturing ──► Idle
//!                  │                                ▲
//!                  └──────── refused / failed ──────┘
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, MutexGuard};

use heyama_core::media::{filename_from_uri, DEFAULT_IMAGE_TYPE};
use heyama_core::PickedImage;

/// Where an image comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaSource {
    Camera,
    Gallery,
}

impl MediaSource {
    /// Body of the alert raised when access is refused.
    pub fn denied_message(&self) -> &'static str {
        match self {
            MediaSource::Camera => "We need your permission to access the camera.",
            MediaSource::Gallery => "We need your permission to access your photo library.",
        }
    }
}

impl fmt::Display for MediaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaSource::Camera => write!(f, "camera"),
            MediaSource::Gallery => write!(f, "gallery"),
        }
    }
}

/// Title of the alert raised when access is refused.
pub const PERMISSION_DENIED_TITLE: &str = "Permission denied";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    /// The user has not been asked yet.
    Undetermined,
}

/// Options passed to the platform picker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureOptions {
    /// Crop aspect ratio as (width, height).
    pub aspect: (u32, u32),
    /// Compression quality in `0.0..=1.0`.
    pub quality: f32,
    pub allows_editing: bool,
}

impl CaptureOptions {
    /// Policy for images attached to new objects.
    pub const UPLOAD: CaptureOptions = CaptureOptions {
        aspect: (16, 9),
        quality: 0.8,
        allows_editing: true,
    };
}

/// What the platform picker hands back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedAsset {
    pub uri: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub file_size: Option<u64>,
}

/// Failure reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct DeviceError(pub String);

/// Boxed future returned by [`MediaDevice`] methods.
pub type DeviceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, DeviceError>> + Send + 'a>>;

/// Platform camera, photo library and their permissions.
pub trait MediaDevice: Send + Sync {
    /// Current permission, without prompting.
    fn permission_status(&self, source: MediaSource) -> DeviceFuture<'_, PermissionStatus>;

    /// Prompts the user for permission.
    fn request_permission(&self, source: MediaSource) -> DeviceFuture<'_, PermissionStatus>;

    /// Opens the picker. `None` means the user cancelled.
    fn launch(
        &self,
        source: MediaSource,
        options: CaptureOptions,
    ) -> DeviceFuture<'_, Option<CapturedAsset>>;
}

/// Shows blocking alerts to the user.
pub trait Notifier: Send + Sync {
    fn alert(&self, title: &str, message: &str);
}

/// Errors from image acquisition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageError {
    #[error("{0} permission denied")]
    PermissionDenied(MediaSource),

    #[error("failed to request {media} permission: {reason}")]
    PermissionRequest { media: MediaSource, reason: String },

    #[error("failed to pick image from {media}: {reason}")]
    Capture { media: MediaSource, reason: String },
}

/// Result of a pick.
#[derive(Debug, Clone, PartialEq)]
pub enum PickOutcome {
    Picked(PickedImage),
    /// The user closed the picker without choosing.
    Canceled,
    /// Access was refused; the user has been alerted.
    PermissionDenied,
}

impl PickOutcome {
    /// The picked image, if any.
    pub fn into_image(self) -> Option<PickedImage> {
        match self {
            PickOutcome::Picked(image) => Some(image),
            PickOutcome::Canceled | PickOutcome::PermissionDenied => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageState {
    Idle,
    RequestingPermission,
    Capturing,
}

#[derive(Debug)]
struct ServiceState {
    state: ImageState,
    image: Option<PickedImage>,
    error: Option<ImageError>,
}

/// Acquires images from the camera or the photo library.
///
/// Holds the last picked image and the last error until [`reset`](Self::reset).
pub struct ImageService<D, N> {
    device: D,
    notifier: N,
    inner: Mutex<ServiceState>,
}

impl<D: MediaDevice, N: Notifier> ImageService<D, N> {
    pub fn new(device: D, notifier: N) -> Self {
        ImageService {
            device,
            notifier,
            inner: Mutex::new(ServiceState {
                state: ImageState::Idle,
                image: None,
                error: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ServiceState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn state(&self) -> ImageState {
        self.lock().state
    }

    /// True while a permission prompt or picker is open.
    pub fn is_busy(&self) -> bool {
        self.state() != ImageState::Idle
    }

    /// The last picked image.
    pub fn image(&self) -> Option<PickedImage> {
        self.lock().image.clone()
    }

    /// The last device failure.
    pub fn error(&self) -> Option<ImageError> {
        self.lock().error.clone()
    }

    /// Clears the held image and error.
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.image = None;
        inner.error = None;
        inner.state = ImageState::Idle;
    }

    pub async fn pick_from_gallery(&self) -> Result<PickOutcome, ImageError> {
        self.pick(MediaSource::Gallery).await
    }

    pub async fn pick_from_camera(&self) -> Result<PickOutcome, ImageError> {
        self.pick(MediaSource::Camera).await
    }

    /// Checks the permission for `source`, prompting when undetermined.
    pub async fn ensure_permission(&self, source: MediaSource) -> Result<(), ImageError> {
        let request_failed = |e: DeviceError| ImageError::PermissionRequest {
            media: source,
            reason: e.0,
        };

        let mut status = self
            .device
            .permission_status(source)
            .await
            .map_err(request_failed)?;
        if status == PermissionStatus::Undetermined {
            tracing::debug!("prompting for {} permission", source);
            status = self
                .device
                .request_permission(source)
                .await
                .map_err(request_failed)?;
        }

        match status {
            PermissionStatus::Granted => Ok(()),
            PermissionStatus::Denied | PermissionStatus::Undetermined => {
                Err(ImageError::PermissionDenied(source))
            }
        }
    }

    async fn pick(&self, source: MediaSource) -> Result<PickOutcome, ImageError> {
        {
            let mut inner = self.lock();
            inner.state = ImageState::RequestingPermission;
            inner.error = None;
        }

        match self.ensure_permission(source).await {
            Ok(()) => {}
            Err(ImageError::PermissionDenied(_)) => {
                tracing::info!("{} permission denied", source);
                self.notifier
                    .alert(PERMISSION_DENIED_TITLE, source.denied_message());
                self.lock().state = ImageState::Idle;
                return Ok(PickOutcome::PermissionDenied);
            }
            Err(e) => return Err(self.fail(e)),
        }

        self.lock().state = ImageState::Capturing;
        let asset = match self.device.launch(source, CaptureOptions::UPLOAD).await {
            Ok(Some(asset)) => asset,
            Ok(None) => {
                tracing::debug!("{} pick cancelled", source);
                self.lock().state = ImageState::Idle;
                return Ok(PickOutcome::Canceled);
            }
            Err(e) => {
                return Err(self.fail(ImageError::Capture {
                    media: source,
                    reason: e.0,
                }))
            }
        };

        let image = picked_image(source, asset);
        let mut inner = self.lock();
        inner.image = Some(image.clone());
        inner.state = ImageState::Idle;
        Ok(PickOutcome::Picked(image))
    }

    fn fail(&self, error: ImageError) -> ImageError {
        tracing::warn!("{}", error);
        let mut inner = self.lock();
        inner.error = Some(error.clone());
        inner.state = ImageState::Idle;
        error
    }
}

/// Normalizes a picker result. Camera shots get a timestamped name.
fn picked_image(source: MediaSource, asset: CapturedAsset) -> PickedImage {
    let name = match source {
        MediaSource::Camera => format!("photo_{}.jpg", chrono::Utc::now().timestamp_millis()),
        MediaSource::Gallery => filename_from_uri(&asset.uri),
    };
    PickedImage {
        uri: asset.uri,
        mime_type: DEFAULT_IMAGE_TYPE.to_string(),
        name,
        width: asset.width,
        height: asset.height,
        file_size: asset.file_size,
    }
}

#[cfg(test)]
#[path = "image_tests.rs"]
mod tests;
