//! Precedence merge: flatten layered section stacks into one versioned snapshot
//!
//! Merge order, highest precedence first: all force sections (shared stack
//! then consumer stack, each in enabled order), then all weak sections in the
//! same order. Within that order the first section to claim a trigger wins;
//! losing duplicates stay in the candidate list flagged as shadowed so the UI
//! can show binding conflicts.

use std::collections::{HashMap, HashSet};
use std::ops::Range;

use crate::binding::KeyBinding;
use crate::key;
use crate::section::{InputSection, SectionOrigin, DEFAULT_SECTION};

/// One merged binding with provenance and the outcome of its precedence
/// contest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub binding: KeyBinding,
    pub origin: SectionOrigin,
    /// Name of the section the binding came from
    pub section: String,
    /// False if another binding won the trigger (shadowed duplicate)
    pub is_enabled: bool,
}

/// Immutable, versioned result of one resolution build.
///
/// A newer snapshot always has a higher version than any snapshot it
/// supersedes.
#[derive(Debug, Clone)]
pub struct ResolvedSnapshot {
    version: u64,
    /// Every binding from every enabled section, in merge order
    candidates: Vec<Candidate>,
    /// Trigger to index of the winning candidate
    lookup: HashMap<String, usize>,
    /// Every proper prefix of every multi-key trigger in `lookup`
    partial_triggers: HashSet<String>,
    /// Contiguous range of `candidates` contributed by the conf-file
    /// `"default"` section, for callers that redraw only that slice
    default_section_range: Option<Range<usize>>,
}

impl ResolvedSnapshot {
    /// The snapshot published before any rebuild has run: version 0, empty
    pub fn empty() -> Self {
        Self {
            version: 0,
            candidates: Vec::new(),
            lookup: HashMap::new(),
            partial_triggers: HashSet::new(),
            default_section_range: None,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// The single binding currently active for a normalized trigger
    pub fn resolve(&self, trigger: &str) -> Option<&KeyBinding> {
        self.lookup.get(trigger).map(|&i| &self.candidates[i].binding)
    }

    /// Whether the string is a proper prefix of some active multi-key trigger
    pub fn is_partial_trigger(&self, trigger: &str) -> bool {
        self.partial_triggers.contains(trigger)
    }

    /// Number of distinct triggers with an active binding
    pub fn active_trigger_count(&self) -> usize {
        self.lookup.len()
    }

    pub fn default_section_range(&self) -> Option<Range<usize>> {
        self.default_section_range.clone()
    }
}

/// Merge the shared and consumer stacks into a snapshot with the given
/// version.
///
/// Sections arrive pre-cloned and in enabled order (index 0 = highest
/// precedence); this function is pure and safe to run off-thread.
pub fn build(
    version: u64,
    shared: &[InputSection],
    consumer: &[InputSection],
) -> ResolvedSnapshot {
    let mut candidates = Vec::new();
    let mut lookup = HashMap::new();
    let mut default_section_range = None;

    let force = shared
        .iter()
        .filter(|s| s.is_force)
        .chain(consumer.iter().filter(|s| s.is_force));
    let weak = shared
        .iter()
        .filter(|s| !s.is_force)
        .chain(consumer.iter().filter(|s| !s.is_force));

    for section in force.chain(weak) {
        let start = candidates.len();
        merge_section(section, &mut candidates, &mut lookup);
        if section.name == DEFAULT_SECTION && default_section_range.is_none() {
            default_section_range = Some(start..candidates.len());
        }
    }

    let mut partial_triggers = HashSet::new();
    for trigger in lookup.keys() {
        for prefix in key::sequence_prefixes(trigger) {
            partial_triggers.insert(prefix);
        }
    }

    tracing::debug!(
        version,
        candidates = candidates.len(),
        active = lookup.len(),
        "built binding snapshot"
    );

    ResolvedSnapshot { version, candidates, lookup, partial_triggers, default_section_range }
}

/// Append one section's bindings to the merge.
///
/// Within a section, the last definition of a trigger is that section's
/// contender; earlier duplicates are shadowed. Across sections, the first
/// section (in merge order) to claim a trigger keeps it.
fn merge_section(
    section: &InputSection,
    candidates: &mut Vec<Candidate>,
    lookup: &mut HashMap<String, usize>,
) {
    let mut last_definition: HashMap<&str, usize> = HashMap::new();
    for (i, binding) in section.bindings.iter().enumerate() {
        last_definition.insert(binding.trigger.as_str(), i);
    }

    for (i, binding) in section.bindings.iter().enumerate() {
        let index = candidates.len();
        let wins = last_definition[binding.trigger.as_str()] == i
            && !lookup.contains_key(&binding.trigger);
        if wins {
            lookup.insert(binding.trigger.clone(), index);
        }
        candidates.push(Candidate {
            binding: binding.clone(),
            origin: section.origin,
            section: section.name.clone(),
            is_enabled: wins,
        });
    }
}
