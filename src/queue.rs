//! Bounded overflow queue for rate-limited requests.
//!
//! Requests the rate limiter turns away are parked here and replayed by a
//! single consumer task. The queue is a bounded `tokio::sync::mpsc` channel;
//! a depth counter reserves a slot before each send so the number of
//! waiting requests (including the one the consumer is holding while it
//! waits for admission) never exceeds the configured capacity.
//!
//! # Drain loop
//!
//! For each request, oldest first, the consumer asks for admission. If the
//! rate limiter says no, it sleeps one full window and asks again. Once
//! admitted it runs the request through the pipeline, hands the result to
//! the waiting caller, and pauses briefly before the next item.
//!
//! Requests are not individually cancellable. On shutdown the consumer is
//! stopped and everything still queued is dropped; abandoned callers see
//! [`Deferred::wait`] return `None`.

use std::sync::Arc;
use std::sync::Weak;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

use crate::telemetry;
use crate::types::{Content, GenerationRequest};
use crate::{GatewayError, Result};

/// A request parked until the rate limiter admits it.
pub(crate) struct QueuedRequest {
    request: GenerationRequest,
    reply: oneshot::Sender<Content>,
    enqueued_at: Instant,
}

/// Handle to the eventual result of a queued request.
pub struct Deferred {
    reply: oneshot::Receiver<Content>,
}

impl Deferred {
    /// Wait for the queued request to be processed.
    ///
    /// Returns `None` if the request was dropped by a shutdown.
    pub async fn wait(self) -> Option<Content> {
        self.reply.await.ok()
    }
}

/// What the drain loop needs from its owner.
#[async_trait]
pub(crate) trait QueueProcessor: Send + Sync + 'static {
    /// Ask the rate limiter for one slot.
    fn admit(&self) -> bool;

    /// How long to wait after a refused admission.
    fn retry_after(&self) -> Duration;

    /// Run an admitted request. Never fails: errors become fallback content.
    async fn process(&self, request: &GenerationRequest) -> Content;
}

/// Bounded FIFO of deferred requests.
pub struct RequestQueue {
    capacity: usize,
    sender: Mutex<Option<mpsc::Sender<QueuedRequest>>>,
    depth: Arc<AtomicUsize>,
    drain_task: Mutex<Option<JoinHandle<()>>>,
    drain_delay: Duration,
}

impl RequestQueue {
    /// Create a queue and the receiving end for its consumer.
    ///
    /// A capacity of zero creates no channel: every enqueue overflows.
    pub(crate) fn new(
        capacity: usize,
        drain_delay: Duration,
    ) -> (Self, Option<mpsc::Receiver<QueuedRequest>>) {
        let (sender, receiver) = if capacity > 0 {
            let (tx, rx) = mpsc::channel(capacity);
            (Some(tx), Some(rx))
        } else {
            (None, None)
        };
        let queue = Self {
            capacity,
            sender: Mutex::new(sender),
            depth: Arc::new(AtomicUsize::new(0)),
            drain_task: Mutex::new(None),
            drain_delay,
        };
        (queue, receiver)
    }

    /// Start the single consumer task.
    pub(crate) fn start<P: QueueProcessor>(
        &self,
        receiver: mpsc::Receiver<QueuedRequest>,
        processor: Weak<P>,
        runtime: &tokio::runtime::Handle,
    ) {
        let depth = self.depth.clone();
        let delay = self.drain_delay;
        let handle = runtime.spawn(drain(receiver, processor, depth, delay));
        *self.drain_task.lock() = Some(handle);
    }

    /// Park a request.
    ///
    /// Fails with `QueueOverflow` when the queue is full or closed.
    pub fn enqueue(&self, request: GenerationRequest) -> Result<Deferred> {
        let overflow = GatewayError::QueueOverflow {
            capacity: self.capacity,
        };
        let sender = self.sender.lock();
        let Some(sender) = sender.as_ref() else {
            metrics::counter!(telemetry::QUEUE_OVERFLOW_TOTAL).increment(1);
            return Err(overflow);
        };

        let reserved = self
            .depth
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |depth| {
                (depth < self.capacity).then_some(depth + 1)
            });
        if reserved.is_err() {
            metrics::counter!(telemetry::QUEUE_OVERFLOW_TOTAL).increment(1);
            return Err(overflow);
        }

        let (reply, receiver) = oneshot::channel();
        let item = QueuedRequest {
            request,
            reply,
            enqueued_at: Instant::now(),
        };
        if sender.try_send(item).is_err() {
            self.depth.fetch_sub(1, Ordering::AcqRel);
            metrics::counter!(telemetry::QUEUE_OVERFLOW_TOTAL).increment(1);
            return Err(overflow);
        }

        let depth = self.depth.load(Ordering::Acquire);
        metrics::counter!(telemetry::QUEUE_ENQUEUED_TOTAL).increment(1);
        metrics::gauge!(telemetry::QUEUE_DEPTH).set(depth as f64);
        debug!(depth, capacity = self.capacity, "request queued");
        Ok(Deferred { reply: receiver })
    }

    /// Requests waiting to be processed.
    pub fn len(&self) -> usize {
        self.depth.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stop accepting requests, stop the consumer and drop everything queued.
    pub(crate) fn close(&self) {
        self.sender.lock().take();
        if let Some(handle) = self.drain_task.lock().take() {
            handle.abort();
        }
        self.depth.store(0, Ordering::Release);
        metrics::gauge!(telemetry::QUEUE_DEPTH).set(0.0);
    }
}

impl Drop for RequestQueue {
    fn drop(&mut self) {
        if let Some(handle) = self.drain_task.get_mut().take() {
            handle.abort();
        }
    }
}

async fn drain<P: QueueProcessor>(
    mut receiver: mpsc::Receiver<QueuedRequest>,
    processor: Weak<P>,
    depth: Arc<AtomicUsize>,
    delay: Duration,
) {
    while let Some(item) = receiver.recv().await {
        loop {
            let Some(owner) = processor.upgrade() else {
                return;
            };
            if owner.admit() {
                break;
            }
            let wait = owner.retry_after();
            drop(owner);
            debug!(
                wait_ms = wait.as_millis() as u64,
                "queue drain deferred by rate limit"
            );
            tokio::time::sleep(wait).await;
        }

        // close() may have zeroed the depth already
        let remaining = depth
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                Some(n.saturating_sub(1))
            })
            .map_or(0, |n| n.saturating_sub(1));
        metrics::gauge!(telemetry::QUEUE_DEPTH).set(remaining as f64);

        let Some(owner) = processor.upgrade() else {
            return;
        };
        debug!(
            category = %item.request.category(),
            waited_ms = item.enqueued_at.elapsed().as_millis() as u64,
            "draining queued request"
        );
        let content = owner.process(&item.request).await;
        drop(owner);
        // The caller may have stopped waiting
        let _ = item.reply.send(content);

        if depth.load(Ordering::Acquire) > 0 {
            tokio::time::sleep(delay).await;
        }
    }
}
