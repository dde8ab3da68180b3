//! Named binding sections with a force/weak precedence class and provenance

use crate::binding::KeyBinding;

/// Name of the conf-file section that backs the user's editable config file
pub const DEFAULT_SECTION: &str = "default";

/// Where a section's bindings came from. Used for display/diagnostics and for
/// replacing one source's contents without touching the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionOrigin {
    /// The user-editable config file
    ConfFile,
    /// Registered at runtime by a plugin
    Plugin,
    /// Pushed by an embedded script
    Script,
    /// A saved filter preset
    SavedFilter,
}

impl SectionOrigin {
    /// Short label for logs and debug dumps
    pub fn label(self) -> &'static str {
        match self {
            SectionOrigin::ConfFile => "conf-file",
            SectionOrigin::Plugin => "plugin",
            SectionOrigin::Script => "script",
            SectionOrigin::SavedFilter => "saved-filter",
        }
    }
}

/// A named, ordered list of bindings.
///
/// Force sections always override weak sections for a shared trigger,
/// regardless of stack position. Contents are replaced wholesale on each
/// source update; there is no incremental patching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSection {
    /// Unique among sections of the same consumer
    pub name: String,
    /// Definition order matters: within one section, the last definition of a
    /// trigger wins
    pub bindings: Vec<KeyBinding>,
    /// Force sections beat weak sections for the same trigger
    pub is_force: bool,
    pub origin: SectionOrigin,
}

impl InputSection {
    /// Create a force section
    pub fn force(
        name: impl Into<String>,
        bindings: Vec<KeyBinding>,
        origin: SectionOrigin,
    ) -> Self {
        Self { name: name.into(), bindings, is_force: true, origin }
    }

    /// Create a weak section
    pub fn weak(
        name: impl Into<String>,
        bindings: Vec<KeyBinding>,
        origin: SectionOrigin,
    ) -> Self {
        Self { name: name.into(), bindings, is_force: false, origin }
    }
}
