//! Continuous mode: filesystem subscription, event dispatch and the
//! long-lived script compiler.

pub mod dispatch;
mod error;
mod session;
mod single_flight;

pub use dispatch::{normalize, plan, Action, WatchEvent};
pub use error::WatchError;
pub use session::{Dispatcher, WatchSession};
pub use single_flight::SingleFlight;

/// Install the process-wide subscriber. `RUST_LOG` overrides the default
/// `info` filter. Calling it twice is harmless.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
