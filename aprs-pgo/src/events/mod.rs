//! Event sink system for observability.
//!
//! The pipeline reports its lifecycle through an [`EventSink`]; the CLI
//! installs a [`LoggingEventSink`] and tests use a [`CollectingEventSink`].

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
