//! Issue tracker registry

use std::sync::Arc;

use tracing::debug;

use jig_core::IssueTracker;

/// A tracker label, with the implementation serving it if there is one
#[derive(Clone)]
pub struct TrackerEntry {
    label: String,
    tracker: Option<Arc<dyn IssueTracker>>,
}

impl TrackerEntry {
    /// Upper-cased tracker label
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn tracker(&self) -> Option<&dyn IssueTracker> {
        self.tracker.as_deref()
    }
}

impl std::fmt::Debug for TrackerEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackerEntry")
            .field("label", &self.label)
            .field("tracker", &self.tracker.as_ref().map(|t| t.name().to_string()))
            .finish()
    }
}

/// Trackers consulted during enrichment, in registration order.
///
/// A label may be registered without an implementation; records carrying
/// it are then reported from commit details alone.
#[derive(Debug, Clone, Default)]
pub struct TrackerRegistry {
    entries: Vec<TrackerEntry>,
}

impl TrackerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an implementation under `label`
    pub fn register<T: IssueTracker + 'static>(&mut self, label: &str, tracker: T) {
        self.insert(label, Some(Arc::new(tracker)));
    }

    /// Register a shared implementation under `label`
    pub fn register_shared(&mut self, label: &str, tracker: Arc<dyn IssueTracker>) {
        self.insert(label, Some(tracker));
    }

    /// Register a label served from commit details only
    pub fn register_label(&mut self, label: &str) {
        self.insert(label, None);
    }

    fn insert(&mut self, label: &str, tracker: Option<Arc<dyn IssueTracker>>) {
        let label = label.trim().to_uppercase();
        if label.is_empty() {
            debug!("ignoring tracker registration without label");
            return;
        }

        debug!(
            label = %label,
            implementation = tracker.as_ref().map(|t| t.name()).unwrap_or("none"),
            "tracker registered"
        );
        match self.entries.iter_mut().find(|e| e.label == label) {
            Some(entry) => entry.tracker = tracker,
            None => self.entries.push(TrackerEntry { label, tracker }),
        }
    }

    /// Entry registered under `label`
    pub fn get(&self, label: &str) -> Option<&TrackerEntry> {
        let label = label.to_uppercase();
        self.entries.iter().find(|e| e.label == label)
    }

    /// Whether `label` is registered, with or without implementation
    pub fn contains(&self, label: &str) -> bool {
        self.get(label).is_some()
    }

    /// Get all registered entries
    pub fn all(&self) -> &[TrackerEntry] {
        &self.entries
    }

    /// Get registered labels
    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.label.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTracker;

    #[test]
    fn test_empty_registry() {
        let registry = TrackerRegistry::new();
        assert!(registry.all().is_empty());
        assert!(registry.get("JIRA").is_none());
    }

    #[test]
    fn test_registration_order_and_case() {
        let mut registry = TrackerRegistry::new();
        registry.register("jira", MockTracker::new("jira"));
        registry.register_label("Git");
        registry.register_label("");

        assert_eq!(registry.labels(), vec!["JIRA", "GIT"]);
        assert!(registry.get("jira").unwrap().tracker().is_some());
        assert!(registry.get("GIT").unwrap().tracker().is_none());
        assert!(registry.contains("git"));
    }

    #[test]
    fn test_reregistration_replaces_in_place() {
        let mut registry = TrackerRegistry::new();
        registry.register_label("JIRA");
        registry.register_label("GIT");
        registry.register("JIRA", MockTracker::new("jira"));

        assert_eq!(registry.labels(), vec!["JIRA", "GIT"]);
        assert_eq!(registry.get("JIRA").unwrap().tracker().unwrap().name(), "jira");
    }
}
