//! Opt-in `tracing` output for bump chart builds.
//!
//! The crate only emits events and never installs a subscriber itself:
//! - `debug` once per `rank_observations` call (observation and period
//!   counts, direction, tie method), per prepared or filled table, and per
//!   built frame (entity, period and primitive counts);
//! - `trace` for every label the collision pass pushes down;
//! - `warn` when an unknown palette name falls back to the default colors.
//!
//! Hosts with their own subscriber can ignore this module.

/// Filter used when `RUST_LOG` is unset: warnings from everything, plus this
/// crate's info events.
pub const DEFAULT_FILTER: &str = "warn,bump_chart=info";

/// Installs a compact fmt subscriber filtered by `RUST_LOG`, falling back to
/// `DEFAULT_FILTER`.
///
/// Only does something with the `telemetry` feature; returns `false` without
/// it, or when a global subscriber is already set.
#[must_use]
pub fn init_default_tracing() -> bool {
    #[cfg(feature = "telemetry")]
    {
        use tracing_subscriber::EnvFilter;

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .try_init()
            .is_ok()
    }

    #[cfg(not(feature = "telemetry"))]
    {
        false
    }
}
