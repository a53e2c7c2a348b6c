//! In-process notifier that delivers requests as log records

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex, PoisonError,
    },
    time::Duration,
};

use anyhow::Context;
use tokio::{runtime::Handle, task::JoinHandle, time::sleep};
use tracing::{debug, info};

use crate::background::{NotificationRequest, Notifier};

/// Delivers each request after its delay by emitting an `info` record.
///
/// Pending deliveries are tokio tasks; `cancel_all` aborts them.
#[derive(Debug, Default)]
pub struct TracingNotifier {
    pending: Mutex<Vec<JoinHandle<()>>>,
    delivered: Arc<AtomicUsize>,
}

impl TracingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of notifications delivered so far
    pub fn delivered(&self) -> usize {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Number of deliveries still waiting for their delay
    pub fn pending(&self) -> usize {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.retain(|handle| !handle.is_finished());
        pending.len()
    }
}

impl Notifier for TracingNotifier {
    fn schedule(&self, requests: Vec<NotificationRequest>) -> anyhow::Result<()> {
        let runtime = Handle::try_current().context("No async runtime to schedule notifications on")?;

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.retain(|handle| !handle.is_finished());

        for request in requests {
            debug!(id = %request.id, delay = request.delay_seconds, "Scheduling notification");
            let delivered = Arc::clone(&self.delivered);
            pending.push(runtime.spawn(async move {
                sleep(Duration::from_secs(request.delay_seconds)).await;
                info!(
                    id = %request.id,
                    sound = request.play_sound,
                    "{}: {}",
                    request.title,
                    request.body
                );
                delivered.fetch_add(1, Ordering::Relaxed);
            }));
        }

        Ok(())
    }

    fn cancel_all(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let count = pending.len();
        for handle in pending.drain(..) {
            handle.abort();
        }
        debug!(count, "Cancelled pending notifications");
    }
}
