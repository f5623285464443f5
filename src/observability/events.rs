//! Observable events emitted by drbd-reactorctl
//!
//! Events are explicit and typed.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Main configuration loaded
    ConfigLoaded,
    /// `snippets` entry added to the main configuration
    SnippetsEntryAdded,

    // Snippet repository
    /// A requested snippet does not exist
    SnippetMissing,
    /// Snippet renamed to its disabled form
    SnippetDisabled,
    /// Snippet renamed back to its enabled form
    SnippetEnabled,
    /// Snippet removed
    SnippetRemoved,
    /// Snippet written by the editor flow
    SnippetPersisted,

    // Cluster role resolution
    /// Storage status query failed, role is unknown
    RoleQueryFailed,

    // Service manager
    /// Service manager invoked
    ServiceManagerCall,
    /// Service manager returned a non-zero status
    ServiceManagerFailed,
    /// Daemon reload skipped because autoload is active
    ReloadSkipped,

    // Eviction
    /// Eviction refused by the scope checks
    EvictRefused,
    /// Operator interrupted the takeover wait
    EvictInterrupted,
    /// Guard re-enabled a snippet outside the normal path
    EvictRollback,
    /// Re-enable after eviction failed; operator must run `enable`
    EvictRollbackFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SnippetsEntryAdded => "SNIPPETS_ENTRY_ADDED",

            Event::SnippetMissing => "SNIPPET_MISSING",
            Event::SnippetDisabled => "SNIPPET_DISABLED",
            Event::SnippetEnabled => "SNIPPET_ENABLED",
            Event::SnippetRemoved => "SNIPPET_REMOVED",
            Event::SnippetPersisted => "SNIPPET_PERSISTED",

            Event::RoleQueryFailed => "ROLE_QUERY_FAILED",

            Event::ServiceManagerCall => "SERVICE_MANAGER_CALL",
            Event::ServiceManagerFailed => "SERVICE_MANAGER_FAILED",
            Event::ReloadSkipped => "RELOAD_SKIPPED",

            Event::EvictRefused => "EVICT_REFUSED",
            Event::EvictInterrupted => "EVICT_INTERRUPTED",
            Event::EvictRollback => "EVICT_ROLLBACK",
            Event::EvictRollbackFailed => "EVICT_ROLLBACK_FAILED",
        }
    }

    /// Returns true if this event leaves persisted state needing manual repair
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::EvictRollbackFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::ConfigLoaded,
            Event::SnippetsEntryAdded,
            Event::SnippetMissing,
            Event::SnippetDisabled,
            Event::SnippetEnabled,
            Event::SnippetRemoved,
            Event::SnippetPersisted,
            Event::RoleQueryFailed,
            Event::ServiceManagerCall,
            Event::ServiceManagerFailed,
            Event::ReloadSkipped,
            Event::EvictRefused,
            Event::EvictInterrupted,
            Event::EvictRollback,
            Event::EvictRollbackFailed,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_fatal_events() {
        assert!(Event::EvictRollbackFailed.is_fatal());
        assert!(!Event::EvictRollback.is_fatal());
        assert!(!Event::SnippetDisabled.is_fatal());
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::SnippetDisabled), "SNIPPET_DISABLED");
    }
}
