//! One full reorganisation pass: every window goes to the primary monitor,
//! and windows whose application carries a configured target get moved to
//! that workspace, growing the workspace list on demand.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, info_span, trace, warn};

use crate::common::error::OrganiseError;
use crate::model::app_map::AppWorkspaceMap;
use crate::sys::shell::{WindowId, WindowShell, WindowTracker};

pub struct PlacementEngine {
    shell: Rc<dyn WindowShell>,
    tracker: Rc<dyn WindowTracker>,
    app_map: Rc<RefCell<AppWorkspaceMap>>,
}

impl PlacementEngine {
    pub fn new(
        shell: Rc<dyn WindowShell>,
        tracker: Rc<dyn WindowTracker>,
        app_map: Rc<RefCell<AppWorkspaceMap>>,
    ) -> Self {
        PlacementEngine {
            shell,
            tracker,
            app_map,
        }
    }

    /// Runs one pass over all windows the host knows about. Idempotent:
    /// with no intervening window or config change a second pass appends no
    /// workspaces and touches no attributes. Per-window failures skip that
    /// window only.
    pub fn organise_windows(&self) {
        let span = info_span!("organise_windows");
        let _s = span.enter();
        self.move_windows_to_primary_monitor();
        self.move_windows_to_workspaces();
    }

    fn move_windows_to_primary_monitor(&self) {
        let primary = self.shell.primary_monitor();
        for window in self.shell.windows() {
            if self.shell.window_monitor(window) != Some(primary) {
                trace!(?window, primary, "moving window to primary monitor");
                self.shell.move_window_to_monitor(window, primary);
            }
        }
    }

    fn move_windows_to_workspaces(&self) {
        let app_map = self.app_map.borrow();
        for window in self.shell.windows() {
            let Some(app_id) = self.tracker.app_id_for_window(window) else {
                // App tracker can lag window creation during startup.
                debug!(
                    "{}",
                    OrganiseError::UnresolvedAppForWindow { window }
                );
                continue;
            };
            // Presence check, not truthiness: workspace index 0 is a valid
            // target.
            if let Some(target) = app_map.target_for(&app_id) {
                self.move_window(window, target);
            }
        }
    }

    fn move_window(&self, window: WindowId, target: usize) {
        if self.shell.window_is_skip_taskbar(window)
            || self.shell.window_on_all_workspaces(window)
        {
            return;
        }

        // Grow the workspace list one append at a time until the target
        // index exists, re-anchoring the window to the current top index
        // before each append so the host's insertion side effects cannot
        // sweep it into the just-created workspace early.
        let mut count = self.shell.workspace_count();
        while count <= target {
            if let Some(top) = count.checked_sub(1) {
                self.shell.move_window_to_workspace(window, top);
            }
            self.shell.append_workspace();
            let grown = self.shell.workspace_count();
            if grown <= count {
                warn!(count, target, "host refused to append a workspace; giving up");
                return;
            }
            count = grown;
        }

        if self.shell.window_workspace(window) != Some(target) {
            trace!(?window, target, "moving window to workspace");
            self.shell.move_window_to_workspace(window, target);
        }
    }
}
