//! Shared helpers for paladin's integration tests.

pub mod builders;
pub mod fake_launcher;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Install a test-captured tracing subscriber once per test binary.
///
/// Output shows up only for failing tests unless run with `--nocapture`;
/// `RUST_LOG` picks the level (default `info`).
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Await `fut`, panicking if it takes longer than five seconds.
pub async fn with_timeout<F, T>(fut: F) -> T
where
    F: Future<Output = T>,
{
    tokio::time::timeout(Duration::from_secs(5), fut)
        .await
        .expect("test timed out after 5 seconds")
}
