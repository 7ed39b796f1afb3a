use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::Subscriber;
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Target carried by every important record.
pub const IMPORTANT_TARGET: &str = "important";

/// Layer that only lets important records through to `writer`.
pub fn results_layer<S, W>(writer: W) -> impl Layer<S> + Send + Sync + 'static
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .with_filter(filter_fn(|meta| meta.target() == IMPORTANT_TARGET))
}

/// Console output for everything, plus a per-run results file that only
/// receives important records. Returns the results file path.
pub fn setup_logging(log_dir: impl AsRef<Path>) -> eyre::Result<PathBuf> {
    let log_dir = log_dir.as_ref();
    fs::create_dir_all(log_dir)?;

    let now = chrono::Utc::now().timestamp();
    let path = log_dir.join(format!("transfer_results_{now}.log"));
    let file = File::create(&path)?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_filter(env_filter))
        .with(results_layer(Mutex::new(file)))
        .try_init()?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::report::{Reporter, TracingReporter};

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Buffer {
        fn lines(&self) -> Vec<String> {
            let bytes = self.0.lock().unwrap().clone();
            String::from_utf8(bytes).unwrap().lines().map(str::to_string).collect()
        }
    }

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Buffer {
        type Writer = Buffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn results_file_only_gets_important_records() {
        let buffer = Buffer::default();
        let subscriber = tracing_subscriber::registry().with(results_layer(buffer.clone()));

        tracing::subscriber::with_default(subscriber, || {
            let reporter = TracingReporter;
            reporter.routine("Waiting for transfer");
            reporter.important("transfer completed");
            reporter.critical("key is not valid");
            tracing::info!("plain record");
        });

        let lines = buffer.lines();
        assert_eq!(lines.len(), 2, "{lines:?}");
        assert!(lines.iter().all(|l| l.contains("Important: ")));
        assert!(lines[0].contains(" INFO ") && lines[0].ends_with("Important: transfer completed"));
        assert!(lines[1].contains("ERROR") && lines[1].ends_with("Important: key is not valid"));
    }
}
