use std::sync::Arc;

use scwos_events::{LogKind, LogSink, SharedSink};

/// Target under which transaction lines are emitted.
pub const TRANSACTIONS_TARGET: &str = "scwos::transactions";

/// Forwards every transaction line to `tracing`. Warnings go out at WARN,
/// everything else at INFO.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn record_as(&self, kind: LogKind, line: &str) {
        match kind {
            LogKind::Warning => tracing::warn!(target: TRANSACTIONS_TARGET, kind = kind.as_str(), line, "transaction"),
            _ => tracing::info!(target: TRANSACTIONS_TARGET, kind = kind.as_str(), line, "transaction"),
        }
    }
}

pub fn tracing_sink() -> SharedSink {
    Arc::new(TracingSink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn lines_reach_the_transactions_target() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            tracing_sink().record("Order O-1 transitioned PENDING -> PICKED");
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Order O-1 transitioned PENDING -> PICKED"));
        assert!(output.contains(TRANSACTIONS_TARGET));
        assert!(output.contains("\"kind\":\"INFO\""));
    }

    #[test]
    fn warnings_are_emitted_at_warn_level() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            tracing_sink().record_as(LogKind::Warning, "Order O-2 pick rejected");
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("\"level\":\"WARN\""));
        assert!(output.contains("\"kind\":\"WARNING\""));
    }
}
