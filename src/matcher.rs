//! Per-consumer key-sequence matching against the latest snapshot
//!
//! Accumulates up to [`MAX_SEQUENCE_KEYS`] consecutive keystrokes and decides,
//! per keystroke: full match (resolved action, history cleared), partial match
//! (ignored, history kept growing), or no match. A single-key match always
//! pre-empts sequence accumulation, and the shortest matching sequence wins.

use crate::binding::KeyBinding;
use crate::key;
use crate::resolve::ResolvedSnapshot;

/// Hard ceiling on sequence length. Sequences longer than this can never
/// match; the history ring simply evicts the oldest keystroke.
pub const MAX_SEQUENCE_KEYS: usize = 4;

/// Outcome of handling one keystroke
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    /// A binding matched; the caller should run its action
    Resolved(KeyBinding),
    /// Absorb the keystroke silently: either mid-sequence, or bound to the
    /// "ignore" sentinel
    Ignored,
    /// Nothing matches; the caller may give invalid-key feedback
    NoMatch,
}

/// Fixed-capacity FIFO of unresolved keystrokes.
///
/// Explicit ring (array + head index) so push/evict is O(1) and the sequence
/// length ceiling is structural.
#[derive(Debug, Clone, Default)]
struct KeyHistory {
    slots: [Option<String>; MAX_SEQUENCE_KEYS],
    head: usize,
    len: usize,
}

impl KeyHistory {
    /// Append a keystroke, evicting the oldest when full
    fn push(&mut self, key: String) {
        if self.len < MAX_SEQUENCE_KEYS {
            self.slots[(self.head + self.len) % MAX_SEQUENCE_KEYS] = Some(key);
            self.len += 1;
        } else {
            self.slots[self.head] = Some(key);
            self.head = (self.head + 1) % MAX_SEQUENCE_KEYS;
        }
    }

    fn clear(&mut self) {
        self.slots = Default::default();
        self.head = 0;
        self.len = 0;
    }

    fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Keystrokes oldest-first
    fn chronological(&self) -> Vec<&str> {
        (0..self.len)
            .filter_map(|i| self.slots[(self.head + i) % MAX_SEQUENCE_KEYS].as_deref())
            .collect()
    }
}

/// Stateful matcher for one consumer's keystroke stream.
///
/// Reads whatever snapshot the caller passes in; snapshots are immutable, so
/// handling a keystroke never races with a rebuild.
#[derive(Debug, Clone, Default)]
pub struct KeySequenceMatcher {
    history: KeyHistory,
}

impl KeySequenceMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle one keystroke against the given snapshot.
    ///
    /// The keystroke is normalized first, so callers may pass raw spellings
    /// like `"Shift+Ctrl+a"`.
    pub fn handle(&mut self, keystroke: &str, snapshot: &ResolvedSnapshot) -> MatchResult {
        let keystroke = key::normalize_trigger(keystroke);

        // A single-key match always pre-empts sequence accumulation
        if let Some(binding) = snapshot.resolve(&keystroke) {
            if binding.is_ignored() {
                return MatchResult::Ignored;
            }
            let binding = binding.clone();
            self.history.clear();
            return MatchResult::Resolved(binding);
        }

        // Build candidate sequences from prior keystrokes, shortest first
        let sequences = {
            let prior = self.history.chronological();
            let max_prior = prior.len().min(MAX_SEQUENCE_KEYS - 1);
            (1..=max_prior)
                .map(|take| {
                    let mut parts = prior[prior.len() - take..].to_vec();
                    parts.push(&keystroke);
                    parts.join("-")
                })
                .collect::<Vec<_>>()
        };

        for sequence in &sequences {
            if let Some(binding) = snapshot.resolve(sequence) {
                if binding.is_ignored() {
                    return MatchResult::Ignored;
                }
                let binding = binding.clone();
                self.history.clear();
                return MatchResult::Resolved(binding);
            }
        }

        // Mid-sequence: suppress invalid-key feedback while a longer trigger
        // could still complete
        let mid_sequence = snapshot.is_partial_trigger(&keystroke)
            || sequences.iter().any(|s| snapshot.is_partial_trigger(s));

        self.history.push(keystroke);
        if mid_sequence {
            MatchResult::Ignored
        } else {
            MatchResult::NoMatch
        }
    }

    /// Drop any accumulated keystrokes (idle-timeout hook)
    pub fn reset(&mut self) {
        self.history.clear();
    }

    /// Unresolved keystrokes as a dash-joined string, for status display
    pub fn pending_display(&self) -> Option<String> {
        if self.history.is_empty() {
            None
        } else {
            Some(self.history.chronological().join("-"))
        }
    }
}
