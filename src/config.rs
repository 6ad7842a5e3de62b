use clap::Parser;
use std::time::Duration;
use thiserror::Error;

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "employee-directory")]
#[command(about = "Employee search directory API with per-IP rate limiting")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, default_value_t = 8000)]
    pub port: u16,

    // sqlx connection string
    #[arg(short, long, default_value = "sqlite://employees.db?mode=rwc")]
    pub database_url: String,

    // Pool size
    #[arg(long, default_value_t = 5)]
    pub max_connections: u32,

    // Shared pool: max requests per window
    #[arg(long, default_value_t = 30)]
    pub rate_limit: u32,

    // Rate limit window in seconds
    #[arg(long, default_value_t = 60)]
    pub rate_window: u64,

    // Give each route class its own pool instead of one shared pool
    #[arg(long, default_value_t = false)]
    pub per_route_limits: bool,

    // Per-route quotas, only used with --per-route-limits
    #[arg(long, default_value_t = 100)]
    pub health_limit: u32,

    #[arg(long, default_value_t = 50)]
    pub read_limit: u32,

    #[arg(long, default_value_t = 20)]
    pub write_limit: u32,

    // How often idle clients are dropped from the registry, in seconds
    #[arg(long, default_value_t = 300)]
    pub sweep_interval: u64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_requests must be at least 1")]
    ZeroQuota,

    #[error("rate limit window must be longer than zero")]
    ZeroWindow,

    #[error("sweep interval must be longer than zero")]
    ZeroSweepInterval,
}

/// Quota for one pool: at most `max_requests` within any trailing `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitConfig {
    pub max_requests: u32,
    pub window: Duration,
}

impl LimitConfig {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }

    pub fn per_minute(max_requests: u32) -> Self {
        Self::new(max_requests, Duration::from_secs(60))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_requests == 0 {
            return Err(ConfigError::ZeroQuota);
        }
        if self.window.is_zero() {
            return Err(ConfigError::ZeroWindow);
        }
        Ok(())
    }
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self::per_minute(30)
    }
}

/// Which quota pools are active for this process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuotaPolicy {
    // One pool for every rate-limited route
    Shared(LimitConfig),
    // One pool per route class
    PerRoute {
        health: LimitConfig,
        read: LimitConfig,
        write: LimitConfig,
    },
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        QuotaPolicy::Shared(LimitConfig::default())
    }
}

impl Args {
    pub fn quota_policy(&self) -> Result<QuotaPolicy, ConfigError> {
        let window = Duration::from_secs(self.rate_window);

        let policy = if self.per_route_limits {
            QuotaPolicy::PerRoute {
                health: LimitConfig::new(self.health_limit, window),
                read: LimitConfig::new(self.read_limit, window),
                write: LimitConfig::new(self.write_limit, window),
            }
        } else {
            QuotaPolicy::Shared(LimitConfig::new(self.rate_limit, window))
        };

        match &policy {
            QuotaPolicy::Shared(limit) => limit.validate()?,
            QuotaPolicy::PerRoute {
                health,
                read,
                write,
            } => {
                health.validate()?;
                read.validate()?;
                write.validate()?;
            }
        }

        Ok(policy)
    }

    pub fn sweep_interval(&self) -> Result<Duration, ConfigError> {
        if self.sweep_interval == 0 {
            return Err(ConfigError::ZeroSweepInterval);
        }
        Ok(Duration::from_secs(self.sweep_interval))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::parse_from(std::iter::once("employee-directory").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_to_one_shared_pool() {
        let args = parse(&[]);
        assert_eq!(args.port, 8000);
        assert_eq!(
            args.quota_policy().unwrap(),
            QuotaPolicy::Shared(LimitConfig::per_minute(30))
        );
        assert_eq!(args.sweep_interval().unwrap(), Duration::from_secs(300));
    }

    #[test]
    fn per_route_flag_builds_three_pools() {
        let args = parse(&["--per-route-limits", "--write-limit", "5"]);
        assert_eq!(
            args.quota_policy().unwrap(),
            QuotaPolicy::PerRoute {
                health: LimitConfig::per_minute(100),
                read: LimitConfig::per_minute(50),
                write: LimitConfig::per_minute(5),
            }
        );
    }

    #[test]
    fn rejects_zero_values() {
        assert_eq!(
            parse(&["--rate-limit", "0"]).quota_policy(),
            Err(ConfigError::ZeroQuota)
        );
        assert_eq!(
            parse(&["--rate-window", "0"]).quota_policy(),
            Err(ConfigError::ZeroWindow)
        );
        assert_eq!(
            parse(&["--per-route-limits", "--read-limit", "0"]).quota_policy(),
            Err(ConfigError::ZeroQuota)
        );
        assert_eq!(
            parse(&["--sweep-interval", "0"]).sweep_interval(),
            Err(ConfigError::ZeroSweepInterval)
        );
    }
}
