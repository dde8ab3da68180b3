//! Ordered stack of named sections with independent enable/disable state
//!
//! One stack exists per consumer (one player instance), plus a smaller stack
//! shared across all consumers. Definitions are retained across disable so a
//! section can be re-enabled without redefinition. Referencing an unknown
//! section is a no-op, not an error: scripts legitimately enable section
//! names that are defined moments later.

use std::collections::HashMap;

use crate::binding::KeyBinding;
use crate::section::InputSection;

/// Where an enabled section is inserted in the precedence order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Highest precedence
    Top,
    /// Lowest precedence
    Bottom,
    /// Directly below the named section; falls back to `Bottom` if that
    /// section is not currently enabled
    After(String),
}

/// The precedence stack for one logical consumer.
///
/// `enabled` index 0 is the highest-precedence section. Every mutating method
/// returns whether anything actually changed, so callers can skip scheduling
/// a rebuild for no-ops.
#[derive(Debug, Clone, Default)]
pub struct SectionStack {
    defined: HashMap<String, InputSection>,
    enabled: Vec<String>,
}

impl SectionStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or wholesale-replace a section definition.
    ///
    /// Enabled/disabled status is untouched if the section already existed.
    pub fn define(&mut self, section: InputSection) -> bool {
        tracing::debug!(section = %section.name, origin = section.origin.label(), "defining input section");
        self.defined.insert(section.name.clone(), section);
        true
    }

    /// Enable a defined section at the given placement.
    ///
    /// Re-enabling an already-enabled section with a different placement moves
    /// it. Enabling an undefined section is a no-op.
    pub fn enable(&mut self, name: &str, placement: Placement) -> bool {
        if !self.defined.contains_key(name) {
            tracing::debug!(section = name, "ignoring enable of undefined section");
            return false;
        }

        let before = self.enabled.clone();
        if let Some(pos) = self.enabled.iter().position(|n| n == name) {
            self.enabled.remove(pos);
        }
        let index = match &placement {
            Placement::Top => 0,
            Placement::Bottom => self.enabled.len(),
            Placement::After(anchor) => {
                match self.enabled.iter().position(|n| n == anchor) {
                    Some(pos) => pos + 1,
                    None => {
                        tracing::debug!(section = name, anchor = %anchor, "placement anchor not enabled, appending at bottom");
                        self.enabled.len()
                    }
                }
            }
        };
        self.enabled.insert(index, name.to_string());
        self.enabled != before
    }

    /// Remove a section from the enabled order. The definition is retained.
    pub fn disable(&mut self, name: &str) -> bool {
        match self.enabled.iter().position(|n| n == name) {
            Some(pos) => {
                self.enabled.remove(pos);
                true
            }
            None => {
                tracing::debug!(section = name, "ignoring disable of section not enabled");
                false
            }
        }
    }

    /// Atomically overwrite a defined section's bindings.
    pub fn replace_bindings(&mut self, name: &str, bindings: Vec<KeyBinding>) -> bool {
        match self.defined.get_mut(name) {
            Some(section) => {
                section.bindings = bindings;
                true
            }
            None => {
                tracing::debug!(section = name, "ignoring bindings replacement for undefined section");
                false
            }
        }
    }

    /// Look up a section definition by name (enabled or not)
    pub fn get(&self, name: &str) -> Option<&InputSection> {
        self.defined.get(name)
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.enabled.iter().any(|n| n == name)
    }

    /// Enabled section names, highest precedence first
    pub fn enabled_names(&self) -> &[String] {
        &self.enabled
    }

    /// Clones of the enabled sections in precedence order, for handing to the
    /// resolution builder off-thread
    pub fn enabled_sections(&self) -> Vec<InputSection> {
        self.enabled
            .iter()
            .filter_map(|name| self.defined.get(name).cloned())
            .collect()
    }
}
