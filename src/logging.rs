//! Log output.
//!
//! Everything logs through [`tracing`]; this module owns the subscriber.
//! Lines carry a timestamp, the emitting module (target), the level and the
//! message.  `RUST_LOG` overrides the level given on the command line.

use anyhow::{Context, Result};
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Default filter when neither `RUST_LOG` nor `--log-level` is given.
pub const DEFAULT_LEVEL: &str = "debug";

/// Build a subscriber that writes to `writer` at `level` and above.
pub fn subscriber<W>(level: &str, writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    with_filter(filter, writer)
}

fn with_filter<W>(filter: EnvFilter, writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(false)
        .with_writer(writer)
        .finish()
}

/// Install the process-wide subscriber, writing to stdout.
pub fn init(level: &str) -> Result<()> {
    tracing::subscriber::set_global_default(subscriber(level, std::io::stdout))
        .context("failed to install log subscriber")
}

/// Run `f` with a DEBUG subscriber that writes into a buffer, and return the
/// buffer alongside `f`'s result.
#[cfg(test)]
pub(crate) fn capture<T>(f: impl FnOnce() -> T) -> (T, String) {
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Buffer {
        fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(bytes);
            Ok(bytes.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let buffer = Buffer::default();
    let sink = buffer.clone();
    let result = tracing::subscriber::with_default(
        with_filter(EnvFilter::new("debug"), move || sink.clone()),
        f,
    );
    let logs = String::from_utf8_lossy(&buffer.0.lock().unwrap()).into_owned();
    (result, logs)
}
