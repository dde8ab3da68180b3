//! KeyBinding struct representing one trigger-to-action mapping

use crate::key;

/// Action name that silently absorbs a keystroke instead of running a command.
pub const IGNORE_ACTION: &str = "ignore";

/// A single immutable binding: normalized trigger string to raw command text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBinding {
    /// Normalized key name or dash-joined key sequence (e.g. `"ctrl+a"`, `"a-b-c"`)
    pub trigger: String,
    /// Raw command text, in the embedded engine's syntax unless
    /// `is_extended_command` is set
    pub action: String,
    /// True if the action uses the host application's extended command syntax
    pub is_extended_command: bool,
    /// Trailing comment captured from the config file line, if any
    pub comment: Option<String>,
    /// 1-based line number in the backing config file; `None` for bindings
    /// supplied by plugins or scripts
    pub source_line: Option<u32>,
}

impl KeyBinding {
    /// Create a binding, normalizing the trigger. Triggers must be non-empty.
    pub fn new(raw_trigger: &str, action: &str) -> Self {
        debug_assert!(!raw_trigger.trim().is_empty(), "binding trigger must be non-empty");
        Self {
            trigger: key::normalize_trigger(raw_trigger),
            action: action.trim().to_string(),
            is_extended_command: false,
            comment: None,
            source_line: None,
        }
    }

    /// Mark this binding as using the extended command syntax (builder pattern)
    pub fn extended(mut self, is_extended: bool) -> Self {
        self.is_extended_command = is_extended;
        self
    }

    /// Attach a trailing comment (builder pattern)
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Record the config-file line this binding came from (builder pattern)
    pub fn with_source_line(mut self, line: u32) -> Self {
        self.source_line = Some(line);
        self
    }

    /// Whether the action is the "ignore" sentinel that absorbs the keystroke
    pub fn is_ignored(&self) -> bool {
        self.action.trim() == IGNORE_ACTION
    }

    /// Whether the trigger is a multi-keystroke sequence
    pub fn is_sequence(&self) -> bool {
        key::sequence_steps(&self.trigger).len() > 1
    }

    /// Equality ignoring file provenance (`source_line`), used for the
    /// serialize round-trip check
    pub fn equivalent_to(&self, other: &KeyBinding) -> bool {
        self.trigger == other.trigger
            && self.action == other.action
            && self.is_extended_command == other.is_extended_command
            && self.comment == other.comment
    }
}
