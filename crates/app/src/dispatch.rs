//! Concurrent event dispatch
//!
//! Every membership event runs in its own task. A semaphore bounds how many
//! are in flight, and each member's tasks are chained so that member's events
//! reach the processor in delivery order.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use jtc_core::{EventProcessor, MemberId, MembershipEvent};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub struct Dispatcher {
    processor: Arc<EventProcessor>,
    permits: Arc<Semaphore>,
    max_in_flight: usize,
    chains: HashMap<MemberId, JoinHandle<()>>,
}

impl Dispatcher {
    pub fn new(processor: Arc<EventProcessor>, max_in_flight: usize) -> Self {
        let max_in_flight = max_in_flight.max(1);
        Self {
            processor,
            permits: Arc::new(Semaphore::new(max_in_flight)),
            max_in_flight,
            chains: HashMap::new(),
        }
    }

    /// Queue an event; waits while `max_in_flight` events are already running
    pub async fn dispatch(&mut self, event: MembershipEvent) {
        let Ok(permit) = self.permits.clone().acquire_owned().await else {
            return;
        };

        self.chains.retain(|_, task| !task.is_finished());
        let previous = self.chains.remove(&event.member);
        let member = event.member.clone();
        let processor = self.processor.clone();

        let task = tokio::spawn(async move {
            if let Some(previous) = previous {
                // A panicked predecessor must not stall this member forever
                let _ = previous.await;
            }
            processor.handle(event).await;
            drop(permit);
        });
        self.chains.insert(member, task);
    }

    /// Wait for every queued event to finish
    pub async fn drain(&mut self) {
        debug!(pending = self.chains.len(), "Draining event tasks");
        for (_, task) in self.chains.drain() {
            let _ = task.await;
        }
        // Tasks not tracked in `chains` still hold permits until they finish
        let _ = self.permits.acquire_many(self.max_in_flight as u32).await;
    }

    /// `drain` with a deadline; false if events were still running at it
    pub async fn drain_within(&mut self, budget: Duration) -> bool {
        match tokio::time::timeout(budget, self.drain()).await {
            Ok(()) => true,
            Err(_) => {
                warn!(budget_ms = budget.as_millis() as u64, "Events still in flight at shutdown");
                false
            }
        }
    }
}
