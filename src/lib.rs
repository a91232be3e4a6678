//! Moves application windows to configured workspaces on the primary
//! monitor, creating workspaces on demand and shielding them from the host
//! shell's empty-workspace reaper while a relocation batch is in flight.
//!
//! The host compositor is never touched directly; everything goes through
//! the capability traits in [`sys::shell`], so the whole crate runs against
//! a fake shell in tests.

pub mod actor;
pub mod common;
pub mod model;
pub mod placement;
pub mod sys;

pub use actor::hotkeys::AcceleratorRegistry;
pub use actor::organiser::Organiser;
pub use common::config::{
    FileSettingsStore, MemorySettingsStore, Settings, SettingsStore, DEFAULT_ORGANISE_HOTKEY,
};
pub use common::error::OrganiseError;
pub use model::app_map::AppWorkspaceMap;
pub use placement::engine::PlacementEngine;
pub use placement::workspace_guard::WorkspaceLifecycleGuard;
pub use sys::shell::{
    AcceleratorShell, CleanupHook, CleanupRoutine, HostShell, SignalId, TriggerId, WindowId,
    WindowShell, WindowTracker,
};
