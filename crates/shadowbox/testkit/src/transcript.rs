//! Event transcript

use parking_lot::Mutex;
use std::sync::Arc;

/// Append-only, ordered sequence of event labels.
///
/// Clones share the same record, so one handle can be given to a lifecycle
/// hook set and another to the test body and both append to one sequence.
#[derive(Clone, Debug, Default)]
pub struct Transcript {
    events: Arc<Mutex<Vec<String>>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, event: impl Into<String>) {
        self.events.lock().push(event.into());
    }

    /// Snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    /// Assert the recorded events equal `expected`, then forget them.
    #[track_caller]
    pub fn assert_events_so_far(&self, expected: &[&str]) {
        let actual = std::mem::take(&mut *self.events.lock());
        assert_eq!(actual, expected, "unexpected transcript");
    }

    #[track_caller]
    pub fn assert_no_events_so_far(&self) {
        self.assert_events_so_far(&[]);
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order_across_clones() {
        let transcript = Transcript::new();
        let other = transcript.clone();
        transcript.add("one");
        other.add("two");
        transcript.add(String::from("three"));
        assert_eq!(transcript.len(), 3);
        assert_eq!(other.events(), ["one", "two", "three"]);
    }

    #[test]
    fn assert_drains() {
        let transcript = Transcript::new();
        transcript.add("configureShadows");
        transcript.assert_events_so_far(&["configureShadows"]);
        transcript.assert_no_events_so_far();
        assert!(transcript.is_empty());
    }

    #[test]
    #[should_panic(expected = "unexpected transcript")]
    fn mismatch_panics() {
        let transcript = Transcript::new();
        transcript.add("beforeTest");
        transcript.assert_events_so_far(&["afterTest"]);
    }

    #[test]
    fn clear_forgets_everything() {
        let transcript = Transcript::new();
        transcript.add("x");
        transcript.clear();
        assert!(transcript.is_empty());
    }
}
