//! # Deferred publish queue.
//!
//! [`Bus::publish_async`](crate::Bus::publish_async) does not publish inline. It
//! enqueues a job on an unbounded FIFO queue drained by a single worker task.
//! The worker runs each job through the ordinary synchronous `publish` and then
//! completes the caller's [`PendingPublish`].
//!
//! ## Diagram
//! ```text
//!   publish_async(ctx, p) ──► [queue] ──► worker ──► Bus::publish(ctx, p) ──► oneshot ──► PendingPublish
//!   publish_async(ctx, q) ──►    │                     (FIFO, one at a time)
//! ```
//!
//! ## Rules
//! - Enqueue happens at call time; dropping the `PendingPublish` does not cancel the job.
//! - The worker is spawned on the current tokio runtime the first time a job is
//!   enqueued (or a `PendingPublish` is polled) from inside one. Jobs enqueued
//!   before that wait in the queue.
//! - The worker leases the receiver. If its runtime shuts down, dropping the task
//!   hands the receiver back, queued jobs included, and the next call from a live
//!   runtime starts a new worker.
//! - The worker holds only a weak reference to the bus; dropping the last bus
//!   handle closes the queue and ends the worker.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::task::{Context, Poll};

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace};

use crate::error::BusError;

use super::{bus::Inner, Bus, Event, Payload};

type Slot = Arc<Mutex<Option<mpsc::UnboundedReceiver<Job>>>>;

/// One queued publish.
pub(crate) struct Job {
    context: Arc<str>,
    payload: Payload,
    done: oneshot::Sender<Event>,
}

/// FIFO queue plus the (lazily spawned) worker that drains it.
pub(crate) struct Dispatcher {
    tx: mpsc::UnboundedSender<Job>,
    /// Holds the receiver while no worker is running.
    rx: Slot,
}

impl Dispatcher {
    pub(crate) fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Arc::new(Mutex::new(Some(rx))),
        }
    }

    /// Enqueues a publish and returns the handle that resolves once it ran.
    pub(crate) fn submit(
        &self,
        bus: Weak<Inner>,
        context: Arc<str>,
        payload: Payload,
    ) -> PendingPublish {
        let (done, rx) = oneshot::channel();
        let job = Job {
            context: Arc::clone(&context),
            payload,
            done,
        };

        let rx = match self.tx.send(job) {
            Ok(()) => Some(rx),
            Err(_) => {
                debug!(context = &*context, "deferred publish rejected: queue closed");
                None
            }
        };
        self.ensure_worker(&bus);
        PendingPublish { context, bus, rx }
    }

    /// Spawns the worker if it is not running and a runtime is available.
    pub(crate) fn ensure_worker(&self, bus: &Weak<Inner>) {
        let mut slot = self.rx.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            trace!("no tokio runtime; deferred publish stays queued");
            return;
        };
        let lease = Lease {
            rx: slot.take(),
            slot: Arc::clone(&self.rx),
        };
        drop(slot);
        handle.spawn(worker(lease, bus.clone()));
        debug!("deferred publish worker started");
    }
}

/// Receiver on loan to a worker; returned to the slot when the worker goes away.
struct Lease {
    rx: Option<mpsc::UnboundedReceiver<Job>>,
    slot: Slot,
}

impl Lease {
    async fn recv(&mut self) -> Option<Job> {
        self.rx.as_mut()?.recv().await
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        if let Some(rx) = self.rx.take() {
            *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(rx);
        }
    }
}

async fn worker(mut lease: Lease, bus: Weak<Inner>) {
    while let Some(job) = lease.recv().await {
        let Some(inner) = bus.upgrade() else {
            break;
        };
        let event = Bus::from_inner(inner).dispatch(job.context, job.payload);
        let _ = job.done.send(event);
    }
    debug!("deferred publish worker stopped");
}

/// Completion handle for [`Bus::publish_async`](crate::Bus::publish_async).
///
/// Resolves to the published [`Event`] after every matching subscriber ran.
#[must_use = "the publish is already scheduled; await this to know when it ran"]
#[derive(Debug)]
pub struct PendingPublish {
    context: Arc<str>,
    bus: Weak<Inner>,
    rx: Option<oneshot::Receiver<Event>>,
}

impl PendingPublish {
    /// Context of the scheduled publish.
    pub fn context(&self) -> &str {
        &self.context
    }

    fn closed(&self) -> BusError {
        BusError::DispatcherClosed {
            context: self.context.to_string(),
        }
    }
}

impl Future for PendingPublish {
    type Output = Result<Event, BusError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;
        match this.rx.as_mut() {
            None => Poll::Ready(Err(this.closed())),
            Some(rx) => match Pin::new(rx).poll(cx) {
                Poll::Pending => {
                    // the worker's runtime may be gone; restart it on the polling one
                    if let Some(inner) = this.bus.upgrade() {
                        inner.dispatcher().ensure_worker(&this.bus);
                    }
                    Poll::Pending
                }
                Poll::Ready(Ok(event)) => Poll::Ready(Ok(event)),
                Poll::Ready(Err(_)) => Poll::Ready(Err(this.closed())),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscribers::subscriber_fn;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn deferred_publishes_run_in_schedule_order() {
        let bus = Bus::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        bus.subscribe("a", subscriber_fn(move |ev| {
            s.lock().unwrap().push(ev.payload["n"].as_i64().unwrap());
        }));

        let first = bus.publish_async("a", json!({ "n": 1 }));
        let second = bus.publish_async("a", json!({ "n": 2 }));
        assert!(seen.lock().unwrap().is_empty());

        let (b, a) = (second.await.unwrap(), first.await.unwrap());
        assert!(a.seq < b.seq);
        assert_eq!(*seen.lock().unwrap(), [1, 2]);
    }

    #[tokio::test]
    async fn resolves_after_subscribers_ran() {
        let bus = Bus::default();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        bus.subscribe("a", subscriber_fn(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        }));

        let pending = bus.publish_async("a.b", json!("x"));
        assert_eq!(pending.context(), "a.b");
        let ev = pending.await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(&*ev.context, "a.b");
        assert_eq!(ev.payload.value(), &json!("x"));
    }

    #[tokio::test]
    async fn dropping_the_handle_does_not_cancel() {
        let bus = Bus::default();
        drop(bus.publish_async("a", Payload::default()));
        bus.publish_async("b", Payload::default()).await.unwrap();

        let contexts: Vec<String> = bus.log().iter().map(|e| e.context.to_string()).collect();
        assert_eq!(contexts, ["a", "b"]);
    }

    #[test]
    fn jobs_queued_outside_a_runtime_run_once_one_starts() {
        let bus = Bus::default();
        let early = bus.publish_async("early", Payload::default());
        assert_eq!(bus.log_len(), 0);

        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        rt.block_on(async {
            let late = bus.publish_async("late", Payload::default());
            let (e, l) = (early.await.unwrap(), late.await.unwrap());
            assert!(e.seq < l.seq);
        });
        assert_eq!(bus.log_len(), 2);
    }

    #[test]
    fn dropped_bus_fails_pending_publish() {
        let bus = Bus::default();
        let pending = bus.publish_async("a", Payload::default());
        drop(bus);

        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let err = rt.block_on(pending).unwrap_err();
        assert_eq!(err, BusError::DispatcherClosed { context: "a".into() });
    }

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
    }

    #[test]
    fn worker_restarts_on_a_later_runtime() {
        let bus = Bus::default();

        let first = runtime();
        first.block_on(bus.publish_async("a", Payload::default())).unwrap();
        drop(first);

        let second = runtime();
        let ev = second
            .block_on(bus.publish_async("b", Payload::default()))
            .unwrap();
        assert_eq!(&*ev.context, "b");

        let contexts: Vec<String> = bus.log().iter().map(|e| e.context.to_string()).collect();
        assert_eq!(contexts, ["a", "b"]);
    }

    #[test]
    fn jobs_left_by_a_dropped_runtime_run_on_the_next() {
        let bus = Bus::default();

        // the worker is spawned but never polled before the runtime goes away
        let first = runtime();
        let stranded = first.block_on(async { bus.publish_async("stranded", Payload::default()) });
        drop(first);
        assert_eq!(bus.log_len(), 0);

        let second = runtime();
        let ev = second.block_on(stranded).unwrap();
        assert_eq!(&*ev.context, "stranded");
        assert_eq!(bus.log_len(), 1);
    }
}
