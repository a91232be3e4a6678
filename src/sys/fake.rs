//! In-memory host shell used by the unit tests. Implements the whole
//! capability surface over `RefCell` state on a single thread, including a
//! native cleanup routine that removes trailing empty workspaces unless they
//! carry a keep-alive flag.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use crate::common::collections::{HashMap, HashSet};
use crate::sys::shell::{
    AcceleratorShell, CleanupHook, CleanupRoutine, TriggerId, WindowId, WindowShell, WindowTracker,
};

#[derive(Debug, Clone, Default)]
pub struct FakeWindow {
    pub app_id: Option<String>,
    pub skip_taskbar: bool,
    pub on_all_workspaces: bool,
    pub workspace: usize,
    pub monitor: usize,
}

pub struct FakeShell {
    windows: RefCell<BTreeMap<WindowId, FakeWindow>>,
    next_window: Cell<u64>,
    workspace_count: Cell<usize>,
    keep_alive: RefCell<HashSet<usize>>,
    primary_monitor: usize,

    grabbed: RefCell<HashMap<TriggerId, String>>,
    denied_patterns: RefCell<HashSet<String>>,
    next_trigger: Cell<u32>,

    cleanup_routine: RefCell<CleanupRoutine>,

    // Mutation counters for idempotence assertions.
    pub appended_workspaces: Cell<usize>,
    pub workspace_moves: Cell<usize>,
    pub monitor_moves: Cell<usize>,
    /// Every `move_window_to_workspace` call in order, for asserting the
    /// anchoring dance during workspace expansion.
    pub workspace_move_log: RefCell<Vec<(WindowId, usize)>>,
}

impl FakeShell {
    pub fn new(workspace_count: usize) -> Rc<Self> {
        let shell = Rc::new(FakeShell {
            windows: RefCell::new(BTreeMap::new()),
            next_window: Cell::new(1),
            workspace_count: Cell::new(workspace_count),
            keep_alive: RefCell::new(HashSet::default()),
            primary_monitor: 0,
            grabbed: RefCell::new(HashMap::default()),
            denied_patterns: RefCell::new(HashSet::default()),
            next_trigger: Cell::new(1),
            cleanup_routine: RefCell::new(Rc::new(|| true)),
            appended_workspaces: Cell::new(0),
            workspace_moves: Cell::new(0),
            monitor_moves: Cell::new(0),
            workspace_move_log: RefCell::new(Vec::new()),
        });
        let weak: Weak<FakeShell> = Rc::downgrade(&shell);
        *shell.cleanup_routine.borrow_mut() = Rc::new(move || {
            if let Some(shell) = weak.upgrade() {
                shell.native_cleanup();
            }
            true
        });
        shell
    }

    pub fn add_window(&self, app_id: Option<&str>, workspace: usize, monitor: usize) -> WindowId {
        let id = WindowId::new(self.next_window.get());
        self.next_window.set(self.next_window.get() + 1);
        self.windows.borrow_mut().insert(id, FakeWindow {
            app_id: app_id.map(str::to_owned),
            workspace,
            monitor,
            ..FakeWindow::default()
        });
        id
    }

    pub fn set_skip_taskbar(&self, window: WindowId, skip: bool) {
        self.windows.borrow_mut().get_mut(&window).unwrap().skip_taskbar = skip;
    }

    pub fn set_on_all_workspaces(&self, window: WindowId, pinned: bool) {
        self.windows.borrow_mut().get_mut(&window).unwrap().on_all_workspaces = pinned;
    }

    pub fn window(&self, window: WindowId) -> FakeWindow {
        self.windows.borrow().get(&window).unwrap().clone()
    }

    /// Makes future grabs of this chord fail, simulating another client
    /// holding it.
    pub fn deny_accelerator(&self, pattern: &str) {
        self.denied_patterns.borrow_mut().insert(pattern.to_owned());
    }

    pub fn grabbed_patterns(&self) -> Vec<String> {
        let mut patterns: Vec<String> = self.grabbed.borrow().values().cloned().collect();
        patterns.sort();
        patterns
    }

    pub fn keep_alive_flags(&self) -> Vec<usize> {
        let mut flags: Vec<usize> = self.keep_alive.borrow().iter().copied().collect();
        flags.sort();
        flags
    }

    /// Invokes whatever currently sits in the cleanup slot, as the host's
    /// idle scheduler would.
    pub fn run_cleanup(&self) -> bool {
        let routine = self.cleanup_routine.borrow().clone();
        routine()
    }

    pub fn current_cleanup_routine(&self) -> CleanupRoutine {
        self.cleanup_routine.borrow().clone()
    }

    /// The host's own cleanup body: drops trailing empty workspaces, always
    /// leaving at least one, treating keep-alive flagged workspaces as
    /// non-empty.
    pub fn native_cleanup(&self) {
        while self.workspace_count.get() > 1 {
            let top = self.workspace_count.get() - 1;
            if self.keep_alive.borrow().contains(&top) {
                break;
            }
            let occupied =
                self.windows.borrow().values().any(|w| w.workspace == top);
            if occupied {
                break;
            }
            self.workspace_count.set(top);
        }
    }
}

impl WindowShell for FakeShell {
    fn windows(&self) -> Vec<WindowId> {
        self.windows.borrow().keys().copied().collect()
    }

    fn window_is_skip_taskbar(&self, window: WindowId) -> bool {
        self.windows.borrow().get(&window).is_some_and(|w| w.skip_taskbar)
    }

    fn window_on_all_workspaces(&self, window: WindowId) -> bool {
        self.windows.borrow().get(&window).is_some_and(|w| w.on_all_workspaces)
    }

    fn window_workspace(&self, window: WindowId) -> Option<usize> {
        self.windows.borrow().get(&window).map(|w| w.workspace)
    }

    fn window_monitor(&self, window: WindowId) -> Option<usize> {
        self.windows.borrow().get(&window).map(|w| w.monitor)
    }

    fn move_window_to_workspace(&self, window: WindowId, workspace: usize) {
        if let Some(w) = self.windows.borrow_mut().get_mut(&window) {
            w.workspace = workspace;
            self.workspace_moves.set(self.workspace_moves.get() + 1);
            self.workspace_move_log.borrow_mut().push((window, workspace));
        }
    }

    fn move_window_to_monitor(&self, window: WindowId, monitor: usize) {
        if let Some(w) = self.windows.borrow_mut().get_mut(&window) {
            w.monitor = monitor;
            self.monitor_moves.set(self.monitor_moves.get() + 1);
        }
    }

    fn primary_monitor(&self) -> usize {
        self.primary_monitor
    }

    fn workspace_count(&self) -> usize {
        self.workspace_count.get()
    }

    fn append_workspace(&self) {
        self.workspace_count.set(self.workspace_count.get() + 1);
        self.appended_workspaces.set(self.appended_workspaces.get() + 1);
    }

    fn workspace_windows(&self, workspace: usize) -> Vec<WindowId> {
        self.windows
            .borrow()
            .iter()
            .filter(|(_, w)| w.workspace == workspace)
            .map(|(id, _)| *id)
            .collect()
    }

    fn workspace_keep_alive(&self, workspace: usize) -> bool {
        self.keep_alive.borrow().contains(&workspace)
    }

    fn set_workspace_keep_alive(&self, workspace: usize, keep_alive: bool) {
        if keep_alive {
            self.keep_alive.borrow_mut().insert(workspace);
        } else {
            self.keep_alive.borrow_mut().remove(&workspace);
        }
    }
}

impl WindowTracker for FakeShell {
    fn app_id_for_window(&self, window: WindowId) -> Option<String> {
        self.windows.borrow().get(&window).and_then(|w| w.app_id.clone())
    }
}

impl AcceleratorShell for FakeShell {
    fn grab_accelerator(&self, pattern: &str) -> Option<TriggerId> {
        if self.denied_patterns.borrow().contains(pattern) {
            return None;
        }
        if self.grabbed.borrow().values().any(|p| p == pattern) {
            return None;
        }
        let id = TriggerId::new(self.next_trigger.get());
        self.next_trigger.set(self.next_trigger.get() + 1);
        self.grabbed.borrow_mut().insert(id, pattern.to_owned());
        Some(id)
    }

    fn ungrab_accelerator(&self, trigger: TriggerId) {
        self.grabbed.borrow_mut().remove(&trigger);
    }
}

impl CleanupHook for FakeShell {
    fn swap_cleanup_routine(&self, routine: CleanupRoutine) -> CleanupRoutine {
        std::mem::replace(&mut *self.cleanup_routine.borrow_mut(), routine)
    }
}
