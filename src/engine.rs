//! Wiring: shared sections, per-consumer stacks, and rebuild scheduling
//!
//! [`SharedSections`] is the explicitly owned handle for sections visible to
//! every consumer (default conf-file section, plugin section, filter
//! sections). Each player instance owns a [`PlayerBindings`], whose four
//! section operations are the engine's only mutation surface. Every mutation
//! that changes anything triggers an async rebuild; the latest snapshot is
//! always readable without blocking.

use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use crate::binding::KeyBinding;
use crate::resolve::ResolvedSnapshot;
use crate::scheduler::RebuildScheduler;
use crate::section::InputSection;
use crate::stack::{Placement, SectionStack};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Sections shared across all consumers, passed around as an `Arc` handle
/// with its lifecycle tied to application startup/shutdown.
///
/// Mutations notify every attached consumer's scheduler so each rebuilds its
/// own snapshot.
#[derive(Debug, Default)]
pub struct SharedSections {
    stack: Mutex<SectionStack>,
    listeners: Mutex<Vec<Weak<RebuildScheduler>>>,
}

impl SharedSections {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn define(&self, section: InputSection) {
        if lock(&self.stack).define(section) {
            self.notify();
        }
    }

    pub fn enable(&self, name: &str, placement: Placement) {
        if lock(&self.stack).enable(name, placement) {
            self.notify();
        }
    }

    pub fn disable(&self, name: &str) {
        if lock(&self.stack).disable(name) {
            self.notify();
        }
    }

    pub fn replace_bindings(&self, name: &str, bindings: Vec<KeyBinding>) {
        if lock(&self.stack).replace_bindings(name, bindings) {
            self.notify();
        }
    }

    /// Clones of the enabled shared sections in precedence order
    pub fn enabled_sections(&self) -> Vec<InputSection> {
        lock(&self.stack).enabled_sections()
    }

    fn attach(&self, scheduler: &Arc<RebuildScheduler>) {
        lock(&self.listeners).push(Arc::downgrade(scheduler));
    }

    fn notify(&self) {
        let mut listeners = lock(&self.listeners);
        listeners.retain(|listener| match listener.upgrade() {
            Some(scheduler) => {
                scheduler.trigger();
                true
            }
            None => false,
        });
    }
}

/// The binding engine for one consumer (one player instance).
///
/// Owns the consumer's section stack and rebuild scheduler, and holds a
/// handle to the shared stack so shared mutations rebuild this consumer too.
pub struct PlayerBindings {
    shared: Arc<SharedSections>,
    sections: Arc<Mutex<SectionStack>>,
    scheduler: Arc<RebuildScheduler>,
}

impl PlayerBindings {
    pub fn new(shared: Arc<SharedSections>) -> Self {
        let sections = Arc::new(Mutex::new(SectionStack::new()));

        let source_shared = shared.clone();
        let source_sections = sections.clone();
        let scheduler = Arc::new(RebuildScheduler::new(move || {
            (source_shared.enabled_sections(), lock(&source_sections).enabled_sections())
        }));
        shared.attach(&scheduler);

        Self { shared, sections, scheduler }
    }

    /// Insert or wholesale-replace a section definition
    pub fn define_section(&self, section: InputSection) {
        if lock(&self.sections).define(section) {
            self.scheduler.trigger();
        }
    }

    /// Enable a defined section at the given placement
    pub fn enable_section(&self, name: &str, placement: Placement) {
        if lock(&self.sections).enable(name, placement) {
            self.scheduler.trigger();
        }
    }

    /// Disable a section, retaining its definition
    pub fn disable_section(&self, name: &str) {
        if lock(&self.sections).disable(name) {
            self.scheduler.trigger();
        }
    }

    /// Atomically overwrite a section's bindings
    pub fn replace_section_bindings(&self, name: &str, bindings: Vec<KeyBinding>) {
        if lock(&self.sections).replace_bindings(name, bindings) {
            self.scheduler.trigger();
        }
    }

    /// The latest published snapshot; never blocks on a rebuild
    pub fn current_snapshot(&self) -> Arc<ResolvedSnapshot> {
        self.scheduler.current()
    }

    /// Receive every snapshot published for this consumer (UI subscription)
    pub fn subscribe(&self) -> Receiver<Arc<ResolvedSnapshot>> {
        self.scheduler.subscribe()
    }

    pub fn shared(&self) -> &Arc<SharedSections> {
        &self.shared
    }

    /// Whether a section of this consumer is currently enabled
    pub fn is_section_enabled(&self, name: &str) -> bool {
        lock(&self.sections).is_enabled(name)
    }
}

impl std::fmt::Debug for PlayerBindings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sections = lock(&self.sections);
        f.debug_struct("PlayerBindings")
            .field("enabled", &sections.enabled_names())
            .field("scheduler", &self.scheduler)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::SectionOrigin;
    use std::time::Duration;

    fn wait_for<F>(rx: &Receiver<Arc<ResolvedSnapshot>>, predicate: F) -> Arc<ResolvedSnapshot>
    where
        F: Fn(&ResolvedSnapshot) -> bool,
    {
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        loop {
            let remaining = deadline
                .checked_duration_since(std::time::Instant::now())
                .expect("timed out waiting for snapshot");
            let snapshot = rx.recv_timeout(remaining).expect("no snapshot published");
            if predicate(&snapshot) {
                return snapshot;
            }
        }
    }

    #[test]
    fn test_define_enable_publishes_snapshot() {
        let shared = SharedSections::new();
        let player = PlayerBindings::new(shared);
        let rx = player.subscribe();

        player.define_section(InputSection::weak(
            "osc",
            vec![KeyBinding::new("f", "toggle fullscreen")],
            SectionOrigin::Script,
        ));
        player.enable_section("osc", Placement::Top);

        let snapshot = wait_for(&rx, |s| s.resolve("f").is_some());
        assert_eq!(snapshot.resolve("f").unwrap().action, "toggle fullscreen");
    }

    #[test]
    fn test_shared_mutation_rebuilds_consumer() {
        let shared = SharedSections::new();
        let player = PlayerBindings::new(shared.clone());
        let rx = player.subscribe();

        shared.define(InputSection::force(
            "default",
            vec![KeyBinding::new("q", "quit")],
            SectionOrigin::ConfFile,
        ));
        shared.enable("default", Placement::Top);

        let snapshot = wait_for(&rx, |s| s.resolve("q").is_some());
        assert_eq!(snapshot.resolve("q").unwrap().action, "quit");
    }

    #[test]
    fn test_noop_mutations_do_not_trigger_rebuild() {
        let shared = SharedSections::new();
        let player = PlayerBindings::new(shared);

        player.enable_section("undefined", Placement::Top);
        player.disable_section("undefined");
        player.replace_section_bindings("undefined", Vec::new());

        assert_eq!(player.scheduler.gate().requested_version(), 0);
        assert_eq!(player.current_snapshot().version(), 0);
    }

    #[test]
    fn test_two_consumers_share_sections_independently() {
        let shared = SharedSections::new();
        let player_a = PlayerBindings::new(shared.clone());
        let player_b = PlayerBindings::new(shared.clone());
        let rx_a = player_a.subscribe();
        let rx_b = player_b.subscribe();

        shared.define(InputSection::force(
            "default",
            vec![KeyBinding::new("q", "quit")],
            SectionOrigin::ConfFile,
        ));
        shared.enable("default", Placement::Top);

        // Consumer-private section only on player A
        player_a.define_section(InputSection::weak(
            "script-a",
            vec![KeyBinding::new("s", "script-only")],
            SectionOrigin::Script,
        ));
        player_a.enable_section("script-a", Placement::Top);

        let snap_a = wait_for(&rx_a, |s| s.resolve("s").is_some());
        assert!(snap_a.resolve("q").is_some());

        let snap_b = wait_for(&rx_b, |s| s.resolve("q").is_some());
        assert!(snap_b.resolve("s").is_none());
    }
}
