//! Debug snapshot dump for development diagnostics
//!
//! Serializes a resolved snapshot to JSON for easier debugging of precedence
//! conflicts (who shadows whom, which triggers are sequence prefixes).

use serde::Serialize;

use crate::resolve::{Candidate, ResolvedSnapshot};

#[derive(Serialize)]
pub struct SnapshotDump {
    pub version: u64,
    pub active_triggers: usize,
    pub candidates: Vec<CandidateDump>,
    pub partial_triggers: Vec<String>,
    pub default_section_range: Option<(usize, usize)>,
}

#[derive(Serialize)]
pub struct CandidateDump {
    pub trigger: String,
    pub action: String,
    pub section: String,
    pub origin: &'static str,
    pub is_enabled: bool,
    pub is_extended_command: bool,
    pub source_line: Option<u32>,
}

impl SnapshotDump {
    pub fn from_snapshot(snapshot: &ResolvedSnapshot) -> Self {
        let candidates = snapshot.candidates().iter().map(CandidateDump::from_candidate).collect();

        let mut partial_triggers: Vec<String> = snapshot
            .candidates()
            .iter()
            .filter(|c| c.is_enabled)
            .flat_map(|c| crate::key::sequence_prefixes(&c.binding.trigger))
            .collect();
        partial_triggers.sort();
        partial_triggers.dedup();

        Self {
            version: snapshot.version(),
            active_triggers: snapshot.active_trigger_count(),
            candidates,
            partial_triggers,
            default_section_range: snapshot.default_section_range().map(|r| (r.start, r.end)),
        }
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl CandidateDump {
    fn from_candidate(candidate: &Candidate) -> Self {
        Self {
            trigger: candidate.binding.trigger.clone(),
            action: candidate.binding.action.clone(),
            section: candidate.section.clone(),
            origin: candidate.origin.label(),
            is_enabled: candidate.is_enabled,
            is_extended_command: candidate.binding.is_extended_command,
            source_line: candidate.binding.source_line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::KeyBinding;
    use crate::resolve::build;
    use crate::section::{InputSection, SectionOrigin};

    #[test]
    fn test_dump_reflects_snapshot() {
        let conf = InputSection::force(
            "default",
            vec![KeyBinding::new("f", "toggle fullscreen"), KeyBinding::new("g-h", "show-text hi")],
            SectionOrigin::ConfFile,
        );
        let plugin =
            InputSection::weak("plugin", vec![KeyBinding::new("f", "flip")], SectionOrigin::Plugin);

        let snapshot = build(3, &[plugin], &[conf]);
        let dump = SnapshotDump::from_snapshot(&snapshot);

        assert_eq!(dump.version, 3);
        assert_eq!(dump.active_triggers, 2);
        assert_eq!(dump.candidates.len(), 3);
        assert_eq!(dump.partial_triggers, vec!["g".to_string()]);

        let shadowed: Vec<_> = dump.candidates.iter().filter(|c| !c.is_enabled).collect();
        assert_eq!(shadowed.len(), 1);
        assert_eq!(shadowed[0].origin, "plugin");
    }

    #[test]
    fn test_dump_serializes_to_json() {
        let section = InputSection::force(
            "default",
            vec![KeyBinding::new("q", "quit")],
            SectionOrigin::ConfFile,
        );
        let snapshot = build(1, &[], &[section]);

        let json = SnapshotDump::from_snapshot(&snapshot).to_json_string().unwrap();
        assert!(json.contains("\"version\": 1"));
        assert!(json.contains("\"trigger\": \"q\""));
        assert!(json.contains("conf-file"));
    }
}
