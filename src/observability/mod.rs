//! Observability for drbd-reactorctl
//!
//! - Structured logging (JSON lines on stderr)
//! - Typed lifecycle events
//! - Scope-based begin/complete tracing
//!
//! Operator output (status, countdowns, outcomes) is not logging and does
//! not go through this module.
//!
//! ```ignore
//! use reactorctl::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::SnippetDisabled, &[("path", "/etc/drbd-reactor.d/r0.toml")]);
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use scope::ObservationScope;

/// Log a lifecycle event
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let severity = if event.is_fatal() {
        Severity::Fatal
    } else {
        Severity::Info
    };
    Logger::log(severity, event.as_str(), fields);
}

/// Log a lifecycle event that needs operator attention
pub fn warn_event(event: Event, fields: &[(&str, &str)]) {
    let severity = if event.is_fatal() {
        Severity::Fatal
    } else {
        Severity::Warn
    };
    Logger::log(severity, event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        log_event(Event::ConfigLoaded);
        log_event(Event::ReloadSkipped);
    }

    #[test]
    fn test_log_event_with_fields() {
        log_event_with_fields(Event::SnippetDisabled, &[("path", "/tmp/r0.toml")]);
        warn_event(Event::SnippetMissing, &[("path", "/tmp/r1.toml")]);
    }
}
