#![deny(unsafe_code)]
//! # shadowbox-testkit
//!
//! Test support for Shadowbox
//!
//! - [`Transcript`]: an ordered, shared record of labelled events, used to
//!   observe the order in which hooks and test methods run
//! - [`init_test_tracing`]: installs a `tracing` subscriber whose output is
//!   captured by the test harness

pub mod transcript;

pub use transcript::Transcript;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install a test-friendly subscriber.
///
/// The filter comes from `RUST_LOG` and defaults to `warn`. Calling this
/// more than once is harmless; only the first call installs anything.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_test_writer().without_time())
        .try_init();
}
