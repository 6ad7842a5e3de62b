use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::interval;

use crate::config::{ConfigError, LimitConfig};
use crate::metrics::TRACKED_CLIENTS;

/// Outcome of one admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Admitted,
    Rejected,
}

// Request timestamps for one client, oldest first
#[derive(Debug, Default)]
pub struct ClientWindow {
    timestamps: VecDeque<Instant>,
}

impl ClientWindow {
    // Drop everything that is not strictly newer than `cutoff`
    fn prune(&mut self, cutoff: Option<Instant>) {
        let Some(cutoff) = cutoff else { return };
        // out-of-order pushes are possible under clock skew, so no early exit on the front
        self.timestamps.retain(|ts| *ts > cutoff);
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// Sliding-window limiter keyed by client identifier.
///
/// Each entry of the registry holds the timestamps recorded for one client.
/// The DashMap shard lock is held across prune, decide and record, so calls
/// for the same client are linearizable. Calls for different clients only
/// contend when they hash to the same shard.
pub struct SlidingWindowLimiter {
    clients: DashMap<String, ClientWindow>,
    max_requests: usize,
    window: Duration,
}

impl SlidingWindowLimiter {
    pub fn new(config: LimitConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            clients: DashMap::new(),
            max_requests: config.max_requests as usize,
            window: config.window,
        })
    }

    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    // Oldest instant that is already expired at `now`; None near the clock origin
    fn cutoff(&self, now: Instant) -> Option<Instant> {
        now.checked_sub(self.window)
    }

    /// Admit or reject one request from `client_id` at `now`.
    ///
    /// A rejected request is not recorded and does not extend the client's
    /// penalty.
    pub fn check_and_record(&self, client_id: &str, now: Instant) -> Decision {
        let cutoff = self.cutoff(now);
        let mut entry = self.clients.entry(client_id.to_string()).or_default();

        entry.prune(cutoff);

        if entry.len() >= self.max_requests {
            return Decision::Rejected;
        }

        entry.timestamps.push_back(now);
        Decision::Admitted
    }

    pub fn check(&self, client_id: &str) -> Decision {
        self.check_and_record(client_id, Instant::now())
    }

    /// Prune every client window and drop the ones left empty.
    /// Returns how many clients were removed.
    pub fn sweep(&self, now: Instant) -> usize {
        let cutoff = self.cutoff(now);
        let before = self.clients.len();

        self.clients.retain(|_, window| {
            window.prune(cutoff);
            !window.is_empty()
        });

        before.saturating_sub(self.clients.len())
    }

    pub fn tracked_clients(&self) -> usize {
        self.clients.len()
    }

    // Stored timestamps for a client, without pruning
    pub fn window_len(&self, client_id: &str) -> usize {
        self.clients.get(client_id).map(|w| w.len()).unwrap_or(0)
    }
}

// Background sweep - keeps the registry from growing with idle clients
pub async fn sweeper(limiters: Vec<Arc<SlidingWindowLimiter>>, sweep_interval: Duration) {
    let mut interval = interval(sweep_interval);

    tracing::info!(
        interval = ?sweep_interval,
        pools = limiters.len(),
        "Rate limit sweeper started"
    );

    loop {
        interval.tick().await;

        let now = Instant::now();
        let mut removed = 0;
        let mut tracked = 0;
        for limiter in &limiters {
            removed += limiter.sweep(now);
            tracked += limiter.tracked_clients();
        }

        TRACKED_CLIENTS.set(tracked as f64);
        if removed > 0 {
            tracing::debug!(removed, tracked, "Swept idle rate limit entries");
        }
    }
}
