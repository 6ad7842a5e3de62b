use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::{ConfigError, QuotaPolicy};
use crate::error::ApiError;
use crate::metrics::{RATE_LIMITED_TOTAL, REQUEST_TOTAL, TRACKED_CLIENTS};
use crate::rate_limit::{Decision, SlidingWindowLimiter};

// Key used when the peer address is not available
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Groups of routes that may carry their own quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteClass {
    Health,
    Read,
    Write,
}

impl RouteClass {
    pub fn as_str(self) -> &'static str {
        match self {
            RouteClass::Health => "health",
            RouteClass::Read => "read",
            RouteClass::Write => "write",
        }
    }
}

/// Route class -> limiter, resolved once at startup.
///
/// Under a shared policy every class points at the same limiter, so a
/// client has one pool across all routes.
#[derive(Clone)]
pub struct Admission {
    health: Arc<SlidingWindowLimiter>,
    read: Arc<SlidingWindowLimiter>,
    write: Arc<SlidingWindowLimiter>,
}

impl Admission {
    pub fn from_policy(policy: &QuotaPolicy) -> Result<Self, ConfigError> {
        match policy {
            QuotaPolicy::Shared(limit) => {
                let shared = Arc::new(SlidingWindowLimiter::new(*limit)?);
                Ok(Self {
                    health: Arc::clone(&shared),
                    read: Arc::clone(&shared),
                    write: shared,
                })
            }
            QuotaPolicy::PerRoute {
                health,
                read,
                write,
            } => Ok(Self {
                health: Arc::new(SlidingWindowLimiter::new(*health)?),
                read: Arc::new(SlidingWindowLimiter::new(*read)?),
                write: Arc::new(SlidingWindowLimiter::new(*write)?),
            }),
        }
    }

    pub fn limiter(&self, class: RouteClass) -> Arc<SlidingWindowLimiter> {
        match class {
            RouteClass::Health => Arc::clone(&self.health),
            RouteClass::Read => Arc::clone(&self.read),
            RouteClass::Write => Arc::clone(&self.write),
        }
    }

    // Distinct pools, for the sweeper
    pub fn limiters(&self) -> Vec<Arc<SlidingWindowLimiter>> {
        let mut pools: Vec<Arc<SlidingWindowLimiter>> = Vec::new();
        for limiter in [&self.health, &self.read, &self.write] {
            if !pools.iter().any(|p| Arc::ptr_eq(p, limiter)) {
                pools.push(Arc::clone(limiter));
            }
        }
        pools
    }

    // Clients held across all pools; a client seen on two per-route pools counts twice
    pub fn tracked_clients(&self) -> usize {
        self.limiters().iter().map(|l| l.tracked_clients()).sum()
    }

    pub fn guard(&self, class: RouteClass) -> AdmissionGuard {
        AdmissionGuard {
            class,
            limiter: self.limiter(class),
            admission: self.clone(),
        }
    }
}

/// Middleware state attached to one route group.
#[derive(Clone)]
pub struct AdmissionGuard {
    pub class: RouteClass,
    pub limiter: Arc<SlidingWindowLimiter>,
    admission: Admission,
}

pub fn client_id(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

// Runs before every rate-limited handler
pub async fn rate_limit_middleware(
    State(guard): State<AdmissionGuard>,
    request: Request<Body>,
    next: Next,
) -> Response {
    REQUEST_TOTAL.inc();

    let client = client_id(&request);

    let decision = guard.limiter.check(&client);
    TRACKED_CLIENTS.set(guard.admission.tracked_clients() as f64);

    match decision {
        Decision::Admitted => next.run(request).await,
        Decision::Rejected => {
            RATE_LIMITED_TOTAL
                .with_label_values(&[guard.class.as_str()])
                .inc();
            tracing::warn!(client = %client, route = guard.class.as_str(), "Rate limit exceeded");
            ApiError::RateLimited {
                max_requests: guard.limiter.max_requests(),
                window: guard.limiter.window(),
            }
            .into_response()
        }
    }
}
