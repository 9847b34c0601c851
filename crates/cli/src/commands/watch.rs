// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Follow live changes.
//!
//! Loads the list once, then prints every push notification with the
//! resulting list size until interrupted, the channel gives up, or the
//! requested number of events has been seen.

use std::io::{self, Write};

use heyama_core::{EventKind, PushEvent};
use tokio::sync::{mpsc, watch};

use crate::api::ObjectApi;
use crate::display::format_push_event;
use crate::error::Result;
use crate::push::{ConnectionState, PushChannel, Transport, TransportError};
use crate::store::ObjectStore;

use super::{count_label, Context};

pub async fn run(ctx: &Context, max_events: Option<usize>) -> Result<()> {
    let api = ctx.api()?;
    let channel = ctx.push_channel();
    run_impl(api, &channel, max_events, &mut io::stdout()).await
}

/// Internal implementation that accepts a channel for testing.
pub(crate) async fn run_impl<A, T>(
    api: A,
    channel: &PushChannel<T>,
    max_events: Option<usize>,
    out: &mut impl Write,
) -> Result<()>
where
    A: ObjectApi + 'static,
    T: Transport + 'static,
{
    // The store registers first so each event is applied before it is counted.
    let store = ObjectStore::open(api, channel).await;
    if let Some(message) = store.error() {
        eprintln!("warning: {}", message);
    }
    writeln!(out, "{}", count_label(store.len()))?;
    out.flush()?;

    let (tx, mut rx) = mpsc::unbounded_channel::<(PushEvent, usize)>();
    let ids: Vec<_> = EventKind::ALL
        .into_iter()
        .map(|kind| {
            let tx = tx.clone();
            let store = store.clone();
            let id = channel.on(kind, move |event: &PushEvent| {
                let _ = tx.send((event.clone(), store.len()));
            });
            (kind, id)
        })
        .collect();
    drop(tx);

    channel.open();
    let mut states = channel.watch_state();
    let result = pump(&mut rx, &mut states, max_events, out).await;

    // Removing the handlers also releases their store clones.
    for (kind, id) in ids {
        channel.remove(kind, id);
    }
    store.close();
    channel.close().await;
    result
}

async fn pump(
    rx: &mut mpsc::UnboundedReceiver<(PushEvent, usize)>,
    states: &mut watch::Receiver<ConnectionState>,
    max_events: Option<usize>,
    out: &mut impl Write,
) -> Result<()> {
    if max_events == Some(0) {
        return Ok(());
    }

    let mut seen = 0usize;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::debug!("interrupted");
                return Ok(());
            }
            received = rx.recv() => {
                let Some((event, len)) = received else {
                    return Ok(());
                };
                writeln!(out, "{}  ({})", format_push_event(&event), count_label(len))?;
                out.flush()?;
                seen += 1;
                if max_events.is_some_and(|max| seen >= max) {
                    return Ok(());
                }
            }
            changed = states.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
                let state = *states.borrow_and_update();
                tracing::info!(%state, "push channel");
                if state == ConnectionState::Disconnected {
                    return Err(TransportError::ConnectionClosed.into());
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
