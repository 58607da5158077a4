//! Log sinks and domain events.

pub mod event;
pub mod sink;
pub mod transaction_log;

pub use event::Event;
pub use sink::{LogKind, LogSink, NullSink, SharedSink, null_sink};
pub use transaction_log::{LogRecord, TransactionLog};
