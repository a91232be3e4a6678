//! Guards workspaces against the host's empty-workspace reaper while a
//! relocation batch is in flight.
//!
//! The host periodically scans workspaces from the end and removes empty
//! trailing ones. If that scan interleaves with a relocation that is about
//! to populate a freshly appended workspace, the workspace can be destroyed
//! before the window lands on it. The guard wraps the host's cleanup slot:
//! before delegating to the original routine it flags every workspace above
//! the last significant one as keep-alive, and it clears exactly the flags
//! it set as soon as the original returns. A transiently empty workspace
//! therefore survives the pass; nothing at or below the boundary is ever
//! touched.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::{trace, warn};

use crate::sys::shell::{CleanupHook, CleanupRoutine, WindowShell};

pub struct WorkspaceLifecycleGuard {
    shell: Rc<dyn WindowShell>,
    original: RefCell<Option<CleanupRoutine>>,
    installed: Cell<bool>,
}

impl WorkspaceLifecycleGuard {
    pub fn new(shell: Rc<dyn WindowShell>) -> Rc<Self> {
        Rc::new(WorkspaceLifecycleGuard {
            shell,
            original: RefCell::new(None),
            installed: Cell::new(false),
        })
    }

    /// Swaps the guarded routine into the host's cleanup slot and records
    /// the original for restoration. Installing twice is a logged no-op.
    pub fn install(self: &Rc<Self>, hook: &dyn CleanupHook) {
        if self.installed.replace(true) {
            warn!("workspace lifecycle guard is already installed");
            return;
        }
        let guard = Rc::clone(self);
        let original = hook.swap_cleanup_routine(Rc::new(move || guard.guarded_cleanup()));
        *self.original.borrow_mut() = Some(original);
    }

    /// Restores the exact original routine. Safe to call when nothing was
    /// installed, and safe when no relocation ever ran.
    pub fn uninstall(&self, hook: &dyn CleanupHook) {
        if !self.installed.replace(false) {
            return;
        }
        if let Some(original) = self.original.borrow_mut().take() {
            let _ = hook.swap_cleanup_routine(original);
        }
    }

    /// Highest-index workspace containing at least one non-pinned window.
    /// Pinned windows don't count; they live on every workspace.
    fn last_significant_workspace(&self) -> Option<usize> {
        (0..self.shell.workspace_count()).rev().find(|&idx| {
            self.shell
                .workspace_windows(idx)
                .into_iter()
                .any(|w| !self.shell.window_on_all_workspaces(w))
        })
    }

    fn guarded_cleanup(&self) -> bool {
        let count = self.shell.workspace_count();
        let boundary = self.last_significant_workspace();

        // Side table of the flags this invocation set; pre-existing flags
        // belong to someone else and survive untouched. With no significant
        // workspace at all there is nothing worth protecting.
        let mut flagged = Vec::new();
        if let Some(boundary) = boundary {
            for idx in boundary + 1..count {
                if !self.shell.workspace_keep_alive(idx) {
                    self.shell.set_workspace_keep_alive(idx, true);
                    flagged.push(idx);
                }
            }
        }
        trace!(?boundary, flagged = flagged.len(), "running guarded workspace cleanup");

        // Clone out of the slot so the original can itself reach back into
        // the guard without a borrow conflict.
        let original = self.original.borrow().clone();
        if let Some(original) = original {
            let _ = original();
        }

        for idx in flagged {
            self.shell.set_workspace_keep_alive(idx, false);
        }

        // Tell the host a finalize pass is still pending; genuinely empty
        // trailing workspaces go in a later, uncontended pass.
        false
    }
}
