//! The capability surface the host shell has to provide. The crate never
//! reaches for ambient compositor state; every component is handed the
//! narrowest trait object it needs at construction, which is also what makes
//! the whole thing runnable against [`crate::sys::fake::FakeShell`].

use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Opaque handle to a host-owned window. The orchestrator never creates or
/// destroys windows, it only reassigns their workspace and monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowId(u64);

impl WindowId {
    pub fn new(id: u64) -> Self {
        WindowId(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// Opaque action id the host hands back for a grabbed key chord. Activation
/// events carry this id; it is the join key into the registry's binding
/// table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TriggerId(u32);

impl TriggerId {
    pub fn new(id: u32) -> Self {
        TriggerId(id)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

/// Handle for a change-notification subscription, returned by
/// [`crate::common::config::SettingsStore::connect_changed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignalId(u64);

impl SignalId {
    pub fn new(id: u64) -> Self {
        SignalId(id)
    }
}

/// Window, workspace and monitor state plus the mutation primitives the
/// placement engine and the lifecycle guard consume.
///
/// Workspace indices are contiguous from zero. `append_workspace` is the
/// only growth primitive; the host owns removal (its periodic cleanup pass,
/// see [`CleanupHook`]).
pub trait WindowShell {
    fn windows(&self) -> Vec<WindowId>;

    fn window_is_skip_taskbar(&self, window: WindowId) -> bool;

    /// True for windows pinned to every workspace. Pinned windows are never
    /// relocated and do not count when looking for the last significant
    /// workspace.
    fn window_on_all_workspaces(&self, window: WindowId) -> bool;

    /// `None` if the host no longer knows the window (it can disappear
    /// between enumeration and inspection).
    fn window_workspace(&self, window: WindowId) -> Option<usize>;

    fn window_monitor(&self, window: WindowId) -> Option<usize>;

    fn move_window_to_workspace(&self, window: WindowId, workspace: usize);

    fn move_window_to_monitor(&self, window: WindowId, monitor: usize);

    fn primary_monitor(&self) -> usize;

    fn workspace_count(&self) -> usize;

    /// Appends exactly one workspace at the end of the list.
    fn append_workspace(&self);

    fn workspace_windows(&self, workspace: usize) -> Vec<WindowId>;

    /// Transient flag the host's cleanup pass must honour by treating the
    /// workspace as non-empty. Never persisted.
    fn workspace_keep_alive(&self, workspace: usize) -> bool;

    fn set_workspace_keep_alive(&self, workspace: usize, keep_alive: bool);
}

/// Resolves the owning application of a window. Kept separate from
/// [`WindowShell`] because hosts typically implement it with a dedicated
/// window-tracker service that can lag behind window creation.
pub trait WindowTracker {
    fn app_id_for_window(&self, window: WindowId) -> Option<String>;
}

/// Global key-chord grabs. `grab_accelerator` returns `None` when another
/// consumer already holds the chord.
pub trait AcceleratorShell {
    fn grab_accelerator(&self, pattern: &str) -> Option<TriggerId>;

    fn ungrab_accelerator(&self, trigger: TriggerId);
}

/// The host's periodic "remove empty trailing workspaces" routine. Returns
/// true when the pass completed synchronously; false tells the host a
/// finalize pass is still pending.
pub type CleanupRoutine = Rc<dyn Fn() -> bool>;

/// Hook point for intercepting the host's workspace cleanup. Swapping is the
/// install *and* uninstall primitive: install swaps the guarded routine in
/// and keeps the returned original, uninstall swaps the original back.
pub trait CleanupHook {
    fn swap_cleanup_routine(&self, routine: CleanupRoutine) -> CleanupRoutine;
}

/// The full surface a host shell implements. Components never take this
/// directly; the orchestrator splits it into the narrower traits above.
pub trait HostShell: WindowShell + WindowTracker + AcceleratorShell + CleanupHook {}

impl<T: WindowShell + WindowTracker + AcceleratorShell + CleanupHook> HostShell for T {}
