//! Layered input-binding resolution engine
//!
//! Resolves user key input into a single executable command for a media
//! player that aggregates bindings from independent sources: the
//! user-editable config file, runtime-registered plugin bindings, and named
//! sections pushed by embedded scripts. At any instant exactly one merged
//! set of bindings is active, even though the sources mutate independently.
//!
//! # Architecture
//!
//! ```text
//! conf file / plugin / script
//!         │ define / enable / disable / replace
//!         ▼
//! SectionStack (per consumer) + SharedSections
//!         │ trigger
//!         ▼
//! RebuildScheduler ──async──▶ resolve::build ──▶ ResolvedSnapshot
//!                                                      ▲
//! keystroke ──▶ KeySequenceMatcher::handle ────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use keystack::{
//!     conf, KeySequenceMatcher, InputSection, MatchResult, SectionOrigin,
//! };
//!
//! let bindings = conf::parse_text("f toggle fullscreen\ng-h show-text hello\n").unwrap();
//! let section = InputSection::force("default", bindings, SectionOrigin::ConfFile);
//! let snapshot = keystack::resolve::build(1, &[], &[section]);
//!
//! let mut matcher = KeySequenceMatcher::new();
//! match matcher.handle("f", &snapshot) {
//!     MatchResult::Resolved(binding) => assert_eq!(binding.action, "toggle fullscreen"),
//!     other => panic!("unexpected: {:?}", other),
//! }
//! assert_eq!(matcher.handle("g", &snapshot), MatchResult::Ignored);
//! ```

pub mod binding;
pub mod conf;
pub mod dump;
pub mod engine;
pub mod key;
pub mod matcher;
pub mod resolve;
pub mod scheduler;
pub mod section;
pub mod stack;

// Re-export commonly used types
pub use binding::{KeyBinding, IGNORE_ACTION};
pub use conf::ConfError;
pub use engine::{PlayerBindings, SharedSections};
pub use matcher::{KeySequenceMatcher, MatchResult, MAX_SEQUENCE_KEYS};
pub use resolve::{Candidate, ResolvedSnapshot};
pub use scheduler::{RebuildScheduler, SnapshotGate};
pub use section::{InputSection, SectionOrigin, DEFAULT_SECTION};
pub use stack::{Placement, SectionStack};
