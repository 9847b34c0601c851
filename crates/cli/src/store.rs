// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Object synchronization store.
//!
//! [`ObjectStore`] owns the canonical in-memory list of objects. REST
//! results and push events both land here:
//!
//! - `refresh` replaces the list wholesale.
//! - Successful mutations are applied locally as soon as the API answers,
//!   without waiting for the matching push event.
//! - Push events are applied idempotently, so an event that echoes a
//!   mutation already applied locally changes nothing.
//!
//! The list lives behind a mutex that is never held across an await.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use heyama_core::{CreatePayload, EventKind, HeyamaObject, Pagination, PushEvent, UpdatePayload};

use crate::api::{ApiResult, ObjectApi};
use crate::push::{EventSource, HandlerId};

const REFRESH_FAILED: &str = "failed to load objects";
const CREATE_FAILED: &str = "failed to create object";
const UPDATE_FAILED: &str = "failed to update object";
const DELETE_FAILED: &str = "failed to delete object";
const GET_FAILED: &str = "failed to fetch object";

#[derive(Debug, Default)]
struct StoreState {
    objects: Vec<HeyamaObject>,
    in_flight: u32,
    /// Set once the first refresh has finished, failed or not.
    loaded: bool,
    error: Option<String>,
    closed: bool,
}

impl StoreState {
    fn position(&self, id: &str) -> Option<usize> {
        self.objects.iter().position(|o| o.id == id)
    }

    /// Prepends unless an object with the same id is already listed.
    fn insert_if_absent(&mut self, object: HeyamaObject) -> bool {
        if self.position(&object.id).is_some() {
            return false;
        }
        self.objects.insert(0, object);
        true
    }

    /// Replaces in place. Unknown ids are ignored.
    fn replace(&mut self, object: HeyamaObject) -> bool {
        match self.position(&object.id) {
            Some(idx) => {
                self.objects[idx] = object;
                true
            }
            None => false,
        }
    }

    fn remove(&mut self, id: &str) -> bool {
        let before = self.objects.len();
        self.objects.retain(|o| o.id != id);
        self.objects.len() != before
    }

    fn apply(&mut self, event: &PushEvent) -> bool {
        match event {
            PushEvent::Created(object) => self.insert_if_absent(object.clone()),
            PushEvent::Updated(object) => self.replace(object.clone()),
            PushEvent::Deleted(id) => self.remove(id),
        }
    }

    /// Replaces the list, keeping the first occurrence of any repeated id.
    fn reset(&mut self, objects: Vec<HeyamaObject>) {
        let mut unique: Vec<HeyamaObject> = Vec::with_capacity(objects.len());
        for object in objects {
            if unique.iter().all(|o| o.id != object.id) {
                unique.push(object);
            }
        }
        self.objects = unique;
    }
}

fn lock(state: &Mutex<StoreState>) -> MutexGuard<'_, StoreState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

/// Push handlers registered by a store. Unregistered on drop.
struct Subscription {
    source: Box<dyn EventSource>,
    handlers: Vec<(EventKind, HandlerId)>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        for (kind, id) in self.handlers.drain(..) {
            self.source.unsubscribe(kind, id);
        }
    }
}

struct StoreInner<A> {
    api: A,
    state: Arc<Mutex<StoreState>>,
    subscription: Mutex<Option<Subscription>>,
}

/// The canonical object list, kept in sync with the backend.
///
/// Cheap to clone; clones share one list. Push subscriptions are released
/// when [`close`](Self::close) is called or the last clone is dropped.
pub struct ObjectStore<A: ObjectApi> {
    inner: Arc<StoreInner<A>>,
}

impl<A: ObjectApi> Clone for ObjectStore<A> {
    fn clone(&self) -> Self {
        ObjectStore {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: ObjectApi> ObjectStore<A> {
    /// Creates an empty store that is not subscribed to any push source.
    pub fn new(api: A) -> Self {
        ObjectStore {
            inner: Arc::new(StoreInner {
                api,
                state: Arc::new(Mutex::new(StoreState::default())),
                subscription: Mutex::new(None),
            }),
        }
    }

    /// Creates a store, subscribes it to `source` and loads the list.
    ///
    /// A failed initial load is recorded in [`error`](Self::error); the
    /// store is still returned and stays subscribed.
    pub async fn open<S>(api: A, source: &S) -> Self
    where
        S: EventSource + Clone + 'static,
    {
        let store = Self::new(api);
        store.subscribe(source);
        store.refresh().await;
        store
    }

    /// Registers the store's push handlers on `source`, replacing any
    /// previous subscription.
    pub fn subscribe<S>(&self, source: &S)
    where
        S: EventSource + Clone + 'static,
    {
        let mut handlers = Vec::with_capacity(EventKind::ALL.len());
        for kind in EventKind::ALL {
            let state: Weak<Mutex<StoreState>> = Arc::downgrade(&self.inner.state);
            let id = source.subscribe(
                kind,
                Arc::new(move |event: &PushEvent| {
                    if let Some(state) = state.upgrade() {
                        apply_push(&state, event);
                    }
                }),
            );
            handlers.push((kind, id));
        }

        let subscription = Subscription {
            source: Box::new(source.clone()),
            handlers,
        };
        let previous = self.subscription().replace(subscription);
        drop(previous);
    }

    /// Releases push subscriptions. Results of requests still in flight
    /// are discarded.
    pub fn close(&self) {
        self.state().closed = true;
        let subscription = self.subscription().take();
        drop(subscription);
        tracing::debug!("object store closed");
    }

    /// Returns true once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.state().closed
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        lock(&self.inner.state)
    }

    fn subscription(&self) -> MutexGuard<'_, Option<Subscription>> {
        self.inner
            .subscription
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }

    /// Snapshot of the list, newest first.
    pub fn objects(&self) -> Vec<HeyamaObject> {
        self.state().objects.clone()
    }

    /// Number of listed objects.
    pub fn len(&self) -> usize {
        self.state().objects.len()
    }

    /// True when no objects are listed. A store that has not loaded yet is
    /// also empty; check [`is_loading`](Self::is_loading) to tell them apart.
    pub fn is_empty(&self) -> bool {
        self.state().objects.is_empty()
    }

    /// Message of the last failed operation, if the latest one failed.
    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    /// True until the first refresh finishes, and while any refresh is
    /// in flight. A closed store never reports loading.
    pub fn is_loading(&self) -> bool {
        let state = self.state();
        !state.closed && (!state.loaded || state.in_flight > 0)
    }

    /// Applies a push event as if it had arrived from the channel.
    pub fn apply_event(&self, event: &PushEvent) -> bool {
        apply_push(&self.inner.state, event)
    }

    /// Reloads the whole list. Failures are recorded, never propagated.
    pub async fn refresh(&self) {
        self.refresh_with(None).await;
    }

    /// Reloads the list with optional paging.
    pub async fn refresh_with(&self, pagination: Option<Pagination>) {
        {
            let mut state = self.state();
            if state.closed {
                return;
            }
            state.in_flight += 1;
            state.error = None;
        }

        let result = self.inner.api.list(pagination).await;

        let mut state = self.state();
        state.in_flight = state.in_flight.saturating_sub(1);
        state.loaded = true;
        if state.closed {
            return;
        }
        match result {
            Ok(objects) => {
                tracing::debug!("loaded {} objects", objects.len());
                state.reset(objects);
            }
            Err(e) => {
                tracing::warn!("refresh failed: {}", e);
                state.error = Some(e.display_message(REFRESH_FAILED));
            }
        }
    }

    /// Creates an object and lists it immediately.
    pub async fn create_object(&self, payload: CreatePayload) -> ApiResult<HeyamaObject> {
        self.begin();
        let result = self.inner.api.create(payload).await;
        self.finish(result, CREATE_FAILED, |state, object| {
            state.insert_if_absent(object.clone());
        })
    }

    /// Applies a partial update and replaces the listed copy in place.
    pub async fn update_object(&self, id: &str, patch: UpdatePayload) -> ApiResult<HeyamaObject> {
        self.begin();
        let result = self.inner.api.update(id, patch).await;
        self.finish(result, UPDATE_FAILED, |state, object| {
            state.replace(object.clone());
        })
    }

    /// Deletes an object and drops it from the list immediately.
    pub async fn delete_object(&self, id: &str) -> ApiResult<()> {
        self.begin();
        let result = self.inner.api.delete(id).await;
        self.finish(result, DELETE_FAILED, |state, _| {
            state.remove(id);
        })
    }

    /// Returns the listed copy, or fetches it once when not listed.
    ///
    /// A fetched object is not added to the list.
    pub async fn get_object_by_id(&self, id: &str) -> ApiResult<HeyamaObject> {
        if let Some(object) = self.state().objects.iter().find(|o| o.id == id) {
            return Ok(object.clone());
        }

        let result = self.inner.api.get(id).await;
        self.finish(result, GET_FAILED, |_, _| {})
    }

    fn begin(&self) {
        let mut state = self.state();
        if !state.closed {
            state.error = None;
        }
    }

    /// Records the outcome of a request and applies `on_success` to the
    /// list, unless the store was closed meanwhile.
    fn finish<T>(
        &self,
        result: ApiResult<T>,
        fallback: &str,
        on_success: impl FnOnce(&mut StoreState, &T),
    ) -> ApiResult<T> {
        let mut state = self.state();
        if state.closed {
            return result;
        }
        match &result {
            Ok(value) => on_success(&mut state, value),
            Err(e) => {
                tracing::warn!("{}: {}", fallback, e);
                state.error = Some(e.display_message(fallback));
            }
        }
        result
    }
}

fn apply_push(state: &Mutex<StoreState>, event: &PushEvent) -> bool {
    let mut state = lock(state);
    if state.closed {
        return false;
    }
    let changed = state.apply(event);
    if !changed {
        tracing::debug!(
            "{} for {} left the list unchanged",
            event.kind(),
            event.object_id()
        );
    }
    changed
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
