// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;
use yare::parameterized;

use super::*;

#[derive(Default)]
struct DeviceState {
    status: HashMap<MediaSource, PermissionStatus>,
    /// Answer to a permission prompt.
    prompt_answer: Option<PermissionStatus>,
    prompt_error: Option<String>,
    launch_result: Option<Result<Option<CapturedAsset>, String>>,
    prompts: u32,
    launches: Vec<(MediaSource, CaptureOptions)>,
    gate: Option<Arc<Gate>>,
}

/// Holds prompts and pickers open until the test lets them finish.
#[derive(Default)]
struct Gate {
    entered: Notify,
    release: Notify,
}

impl Gate {
    async fn pass(gate: Option<Arc<Gate>>) {
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
    }
}

#[derive(Clone, Default)]
struct FakeDevice {
    state: Arc<Mutex<DeviceState>>,
}

impl FakeDevice {
    fn granted() -> Self {
        let device = FakeDevice::default();
        device.set_status(MediaSource::Camera, PermissionStatus::Granted);
        device.set_status(MediaSource::Gallery, PermissionStatus::Granted);
        device
    }

    fn set_status(&self, source: MediaSource, status: PermissionStatus) {
        self.state.lock().unwrap().status.insert(source, status);
    }

    fn answer_prompt(&self, status: PermissionStatus) {
        self.state.lock().unwrap().prompt_answer = Some(status);
    }

    fn returns(&self, result: Result<Option<CapturedAsset>, String>) {
        self.state.lock().unwrap().launch_result = Some(result);
    }

    fn launches(&self) -> Vec<(MediaSource, CaptureOptions)> {
        self.state.lock().unwrap().launches.clone()
    }

    fn prompts(&self) -> u32 {
        self.state.lock().unwrap().prompts
    }

    fn gated(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        self.state.lock().unwrap().gate = Some(Arc::clone(&gate));
        gate
    }
}

impl MediaDevice for FakeDevice {
    fn permission_status(&self, source: MediaSource) -> DeviceFuture<'_, PermissionStatus> {
        let status = self
            .state
            .lock()
            .unwrap()
            .status
            .get(&source)
            .copied()
            .unwrap_or(PermissionStatus::Undetermined);
        Box::pin(async move { Ok(status) })
    }

    fn request_permission(&self, source: MediaSource) -> DeviceFuture<'_, PermissionStatus> {
        let (result, gate) = {
            let mut state = self.state.lock().unwrap();
            state.prompts += 1;
            let result = match state.prompt_error.clone() {
                Some(e) => Err(DeviceError(e)),
                None => {
                    let answer = state.prompt_answer.unwrap_or(PermissionStatus::Denied);
                    state.status.insert(source, answer);
                    Ok(answer)
                }
            };
            (result, state.gate.clone())
        };
        Box::pin(async move {
            Gate::pass(gate).await;
            result
        })
    }

    fn launch(
        &self,
        source: MediaSource,
        options: CaptureOptions,
    ) -> DeviceFuture<'_, Option<CapturedAsset>> {
        let (result, gate) = {
            let mut state = self.state.lock().unwrap();
            state.launches.push((source, options));
            let result = state
                .launch_result
                .clone()
                .unwrap_or(Ok(None))
                .map_err(DeviceError);
            (result, state.gate.clone())
        };
        Box::pin(async move {
            Gate::pass(gate).await;
            result
        })
    }
}

#[derive(Clone, Default)]
struct RecordingNotifier {
    alerts: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingNotifier {
    fn alerts(&self) -> Vec<(String, String)> {
        self.alerts.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&self, title: &str, message: &str) {
        self.alerts
            .lock()
            .unwrap()
            .push((title.to_string(), message.to_string()));
    }
}

fn asset(uri: &str) -> CapturedAsset {
    CapturedAsset {
        uri: uri.to_string(),
        width: Some(1600),
        height: Some(900),
        file_size: Some(204_800),
    }
}

fn service(
    device: &FakeDevice,
) -> (ImageService<FakeDevice, RecordingNotifier>, RecordingNotifier) {
    let notifier = RecordingNotifier::default();
    (ImageService::new(device.clone(), notifier.clone()), notifier)
}

#[tokio::test]
async fn gallery_pick_uses_last_uri_segment() {
    let device = FakeDevice::granted();
    device.returns(Ok(Some(asset("file:///data/cache/ImagePicker/IMG_0042.jpg"))));
    let (service, _) = service(&device);

    let outcome = service.pick_from_gallery().await.unwrap();
    let PickOutcome::Picked(image) = outcome else {
        panic!("expected a picked image");
    };

    assert_eq!(image.uri, "file:///data/cache/ImagePicker/IMG_0042.jpg");
    assert_eq!(image.name, "IMG_0042.jpg");
    assert_eq!(image.mime_type, "image/jpeg");
    assert_eq!((image.width, image.height), (Some(1600), Some(900)));
    assert_eq!(image.file_size, Some(204_800));
    assert_eq!(service.image(), Some(image));
    assert_eq!(service.state(), ImageState::Idle);
}

#[tokio::test]
async fn state_tracks_prompt_then_picker() {
    let device = FakeDevice::default();
    device.answer_prompt(PermissionStatus::Granted);
    device.returns(Ok(Some(asset("file:///tmp/shot.jpg"))));
    let gate = device.gated();
    let (service, _) = service(&device);
    assert!(!service.is_busy());

    let (outcome, ()) = tokio::join!(service.pick_from_camera(), async {
        gate.entered.notified().await;
        assert_eq!(service.state(), ImageState::RequestingPermission);
        assert!(service.is_busy());
        gate.release.notify_one();

        gate.entered.notified().await;
        assert_eq!(service.state(), ImageState::Capturing);
        assert!(service.is_busy());
        gate.release.notify_one();
    });

    assert!(matches!(outcome.unwrap(), PickOutcome::Picked(_)));
    assert_eq!(service.state(), ImageState::Idle);
    assert!(!service.is_busy());
    assert_eq!(device.prompts(), 1);
}

#[tokio::test]
async fn gallery_pick_falls_back_to_default_name() {
    let device = FakeDevice::granted();
    device.returns(Ok(Some(asset("content://media/"))));
    let (service, _) = service(&device);

    let image = service.pick_from_gallery().await.unwrap().into_image().unwrap();
    assert_eq!(image.name, "image.jpg");
}

#[tokio::test]
async fn camera_pick_gets_timestamped_name() {
    let device = FakeDevice::granted();
    device.returns(Ok(Some(asset("file:///tmp/capture.heic"))));
    let (service, _) = service(&device);

    let image = service.pick_from_camera().await.unwrap().into_image().unwrap();
    let millis = image
        .name
        .strip_prefix("photo_")
        .and_then(|rest| rest.strip_suffix(".jpg"))
        .unwrap();
    assert!(millis.parse::<i64>().unwrap() > 0);
    assert_eq!(image.mime_type, "image/jpeg");
}

#[tokio::test]
async fn picker_receives_upload_policy() {
    let device = FakeDevice::granted();
    let (service, _) = service(&device);

    service.pick_from_camera().await.unwrap();

    let launches = device.launches();
    assert_eq!(launches.len(), 1);
    let (source, options) = launches[0];
    assert_eq!(source, MediaSource::Camera);
    assert_eq!(options.aspect, (16, 9));
    assert!((options.quality - 0.8).abs() < f32::EPSILON);
    assert!(options.allows_editing);
}

#[tokio::test]
async fn camera_denied_alerts_and_never_launches() {
    let device = FakeDevice::default();
    device.set_status(MediaSource::Camera, PermissionStatus::Denied);
    let (service, notifier) = service(&device);

    let outcome = service.pick_from_camera().await.unwrap();

    assert_eq!(outcome, PickOutcome::PermissionDenied);
    assert!(device.launches().is_empty());
    assert_eq!(
        notifier.alerts(),
        vec![(
            "Permission denied".to_string(),
            "We need your permission to access the camera.".to_string()
        )]
    );
    assert!(service.image().is_none());
    assert!(service.error().is_none());
    assert_eq!(service.state(), ImageState::Idle);
}

#[tokio::test]
async fn undetermined_permission_prompts_once() {
    let device = FakeDevice::default();
    device.answer_prompt(PermissionStatus::Granted);
    device.returns(Ok(Some(asset("file:///x/a.png"))));
    let (service, notifier) = service(&device);

    assert!(matches!(
        service.pick_from_gallery().await.unwrap(),
        PickOutcome::Picked(_)
    ));
    assert_eq!(device.prompts(), 1);

    service.pick_from_gallery().await.unwrap();
    assert_eq!(device.prompts(), 1);
    assert!(notifier.alerts().is_empty());
}

#[tokio::test]
async fn refused_prompt_alerts_with_gallery_message() {
    let device = FakeDevice::default();
    device.answer_prompt(PermissionStatus::Denied);
    let (service, notifier) = service(&device);

    let outcome = service.pick_from_gallery().await.unwrap();

    assert_eq!(outcome, PickOutcome::PermissionDenied);
    let alerts = notifier.alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].1, MediaSource::Gallery.denied_message());
}

#[tokio::test]
async fn cancel_keeps_previous_image() {
    let device = FakeDevice::granted();
    device.returns(Ok(Some(asset("file:///x/first.jpg"))));
    let (service, _) = service(&device);
    service.pick_from_gallery().await.unwrap();

    device.returns(Ok(None));
    let outcome = service.pick_from_gallery().await.unwrap();

    assert_eq!(outcome, PickOutcome::Canceled);
    assert_eq!(service.image().unwrap().name, "first.jpg");
}

#[tokio::test]
async fn device_failure_is_held() {
    let device = FakeDevice::granted();
    device.returns(Err("camera unavailable".to_string()));
    let (service, notifier) = service(&device);

    let err = service.pick_from_camera().await.unwrap_err();

    assert_eq!(
        err,
        ImageError::Capture {
            media: MediaSource::Camera,
            reason: "camera unavailable".into()
        }
    );
    assert_eq!(service.error(), Some(err));
    assert_eq!(service.state(), ImageState::Idle);
    assert!(notifier.alerts().is_empty());
}

#[tokio::test]
async fn prompt_failure_is_held() {
    let device = FakeDevice::default();
    device.state.lock().unwrap().prompt_error = Some("dialog crashed".into());
    let (service, _) = service(&device);

    let err = service.pick_from_gallery().await.unwrap_err();
    assert!(matches!(err, ImageError::PermissionRequest { .. }));
    assert!(service.error().is_some());
    assert!(device.launches().is_empty());
}

#[tokio::test]
async fn next_pick_clears_error() {
    let device = FakeDevice::granted();
    device.returns(Err("busy".to_string()));
    let (service, _) = service(&device);
    let _ = service.pick_from_gallery().await;
    assert!(service.error().is_some());

    device.returns(Ok(Some(asset("file:///x/ok.jpg"))));
    service.pick_from_gallery().await.unwrap();
    assert!(service.error().is_none());
}

#[tokio::test]
async fn reset_clears_image_and_error() {
    let device = FakeDevice::granted();
    device.returns(Ok(Some(asset("file:///x/ok.jpg"))));
    let (service, _) = service(&device);
    service.pick_from_gallery().await.unwrap();

    service.reset();
    assert!(service.image().is_none());
    assert!(service.error().is_none());
    assert!(!service.is_busy());
}

#[parameterized(
    granted = { PermissionStatus::Granted, true },
    denied = { PermissionStatus::Denied, false },
)]
fn ensure_permission_reflects_status(status: PermissionStatus, allowed: bool) {
    let device = FakeDevice::default();
    device.set_status(MediaSource::Camera, status);
    let (service, _) = service(&device);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let result = runtime.block_on(service.ensure_permission(MediaSource::Camera));
    assert_eq!(result.is_ok(), allowed);
}

#[test]
fn error_messages() {
    assert_eq!(
        ImageError::PermissionDenied(MediaSource::Gallery).to_string(),
        "gallery permission denied"
    );
    assert_eq!(
        ImageError::Capture {
            media: MediaSource::Camera,
            reason: "busy".into()
        }
        .to_string(),
        "failed to pick image from camera: busy"
    );
}
