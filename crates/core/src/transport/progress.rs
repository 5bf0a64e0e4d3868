//! Upload progress relay.
//!
//! Progress is pushed through an unbounded channel. Each call gets its own
//! scope of the caller's reporter; the scope is closed as soon as the call
//! resolves, so every event a receiver sees was sent before the operation
//! returned.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;
use reqwest::Body;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::trace;

/// Bytes handed to the transport so far for one upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    /// Cumulative bytes transmitted. Never decreases within one upload.
    pub loaded: u64,
    /// Total bytes of the upload, when known.
    ///
    /// For multipart uploads this counts file content only. Boundaries and
    /// part headers are not included, so the final event can arrive just
    /// before the last framing bytes are written.
    pub total: Option<u64>,
    /// Size of the chunk that produced this event.
    pub bytes: u64,
}

impl ProgressEvent {
    /// Fraction in `0.0..=1.0`, if the total is known and non-zero.
    pub fn fraction(&self) -> Option<f64> {
        match self.total {
            Some(total) if total > 0 => Some(self.loaded as f64 / total as f64),
            _ => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.total.is_some_and(|total| self.loaded >= total)
    }
}

pub type ProgressReceiver = mpsc::UnboundedReceiver<ProgressEvent>;

/// Create a progress channel for one or more uploads.
pub fn progress_channel() -> (ProgressReporter, ProgressReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        ProgressReporter {
            tx,
            closed: Arc::new(AtomicBool::new(false)),
        },
        rx,
    )
}

/// Sending half of a progress channel.
///
/// Cheaply cloneable. A dropped receiver is not an error: reports are
/// discarded and the upload carries on.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    tx: mpsc::UnboundedSender<ProgressEvent>,
    closed: Arc<AtomicBool>,
}

impl ProgressReporter {
    /// Push an event. Returns false if the reporter is closed or nobody listens.
    pub fn report(&self, event: ProgressEvent) -> bool {
        if self.closed.load(Ordering::Acquire) {
            return false;
        }
        self.tx.send(event).is_ok()
    }

    /// A handle sharing this channel with its own open/closed state.
    pub(crate) fn scoped(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub(crate) fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire) || self.tx.is_closed()
    }
}

/// Split `data` into views of at most `chunk_size` bytes sharing its buffer.
fn chunks(data: &Bytes, chunk_size: usize) -> Vec<Bytes> {
    let chunk_size = chunk_size.max(1);
    (0..data.len())
        .step_by(chunk_size)
        .map(|start| data.slice(start..(start + chunk_size).min(data.len())))
        .collect()
}

/// Wrap `data` in a streaming body that reports each chunk as it is polled.
///
/// `offset` and `total` place this body inside a larger upload (several
/// multipart files share one counter).
pub(crate) fn progress_body(
    data: Bytes,
    chunk_size: usize,
    offset: u64,
    total: u64,
    reporter: ProgressReporter,
) -> Body {
    let chunks = chunks(&data, chunk_size);
    let mut loaded = offset;

    let stream = futures::stream::iter(chunks).map(move |chunk| {
        loaded += chunk.len() as u64;
        trace!(loaded, total, "upload chunk");
        reporter.report(ProgressEvent {
            loaded,
            total: Some(total),
            bytes: chunk.len() as u64,
        });
        Ok::<_, std::io::Error>(chunk)
    });

    Body::wrap_stream(stream)
}
