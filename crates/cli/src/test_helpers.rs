// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test fixtures.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{TimeZone, Utc};

use heyama_core::{CreatePayload, HeyamaObject, Pagination, UpdatePayload};

use crate::api::{ApiError, ApiFuture, ObjectApi};

/// An object with fixed timestamps.
pub(crate) fn obj(id: &str) -> HeyamaObject {
    let at = Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap();
    HeyamaObject::new(id, format!("Object {}", id), "Some description", at)
}

#[derive(Default)]
pub(crate) struct FakeState {
    pub(crate) server: Vec<HeyamaObject>,
    pub(crate) next_created: Option<HeyamaObject>,
    pub(crate) fail_next: Option<ApiError>,
    pub(crate) delay: Option<Duration>,
    pub(crate) last_pagination: Option<Pagination>,
    pub(crate) last_create: Option<CreatePayload>,
    pub(crate) list_calls: u32,
    pub(crate) get_calls: u32,
    pub(crate) create_calls: u32,
    pub(crate) update_calls: u32,
    pub(crate) delete_calls: u32,
}

/// In-memory backend. Clones share state so tests can inspect it after
/// handing one to a store.
#[derive(Clone, Default)]
pub(crate) struct FakeApi {
    pub(crate) state: Arc<Mutex<FakeState>>,
}

impl FakeApi {
    pub(crate) fn with_objects(objects: Vec<HeyamaObject>) -> Self {
        let api = FakeApi::default();
        api.lock().server = objects;
        api
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub(crate) fn fail_next(&self, error: ApiError) {
        self.lock().fail_next = Some(error);
    }

    pub(crate) fn respond_to_create(&self, object: HeyamaObject) {
        self.lock().next_created = Some(object);
    }

    pub(crate) fn set_delay(&self, delay: Duration) {
        self.lock().delay = Some(delay);
    }

    async fn pause(&self) {
        let delay = self.lock().delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

impl ObjectApi for FakeApi {
    fn list(&self, pagination: Option<Pagination>) -> ApiFuture<'_, Vec<HeyamaObject>> {
        Box::pin(async move {
            self.pause().await;
            let mut state = self.lock();
            state.list_calls += 1;
            state.last_pagination = pagination;
            match state.fail_next.take() {
                Some(e) => Err(e),
                None => Ok(state.server.clone()),
            }
        })
    }

    fn get<'a>(&'a self, id: &'a str) -> ApiFuture<'a, HeyamaObject> {
        Box::pin(async move {
            self.pause().await;
            let mut state = self.lock();
            state.get_calls += 1;
            if let Some(e) = state.fail_next.take() {
                return Err(e);
            }
            state
                .server
                .iter()
                .find(|o| o.id == id)
                .cloned()
                .ok_or_else(|| ApiError::NotFound("Object not found".into()))
        })
    }

    fn create(&self, payload: CreatePayload) -> ApiFuture<'_, HeyamaObject> {
        Box::pin(async move {
            self.pause().await;
            let mut state = self.lock();
            state.create_calls += 1;
            state.last_create = Some(payload.clone());
            if let Some(e) = state.fail_next.take() {
                return Err(e);
            }
            let created = state.next_created.take().unwrap_or_else(|| {
                let at = Utc.with_ymd_and_hms(2026, 2, 1, 8, 0, 0).unwrap();
                HeyamaObject::new(
                    format!("new-{}", state.create_calls),
                    payload.title.clone(),
                    payload.description.clone(),
                    at,
                )
            });
            state.server.insert(0, created.clone());
            Ok(created)
        })
    }

    fn update<'a>(&'a self, id: &'a str, patch: UpdatePayload) -> ApiFuture<'a, HeyamaObject> {
        Box::pin(async move {
            self.pause().await;
            let mut state = self.lock();
            state.update_calls += 1;
            if let Some(e) = state.fail_next.take() {
                return Err(e);
            }
            let object = state
                .server
                .iter_mut()
                .find(|o| o.id == id)
                .ok_or_else(|| ApiError::NotFound("Object not found".into()))?;
            if let Some(title) = patch.title {
                object.title = title;
            }
            if let Some(description) = patch.description {
                object.description = description;
            }
            object.updated_at += chrono::Duration::minutes(5);
            Ok(object.clone())
        })
    }

    fn delete<'a>(&'a self, id: &'a str) -> ApiFuture<'a, ()> {
        Box::pin(async move {
            self.pause().await;
            let mut state = self.lock();
            state.delete_calls += 1;
            if let Some(e) = state.fail_next.take() {
                return Err(e);
            }
            let before = state.server.len();
            state.server.retain(|o| o.id != id);
            if state.server.len() == before {
                return Err(ApiError::NotFound("Object not found".into()));
            }
            Ok(())
        })
    }
}
