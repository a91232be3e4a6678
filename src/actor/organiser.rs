//! Top-level wiring: settings changes rebuild the app map, the configured
//! hotkey and the UI click both trigger a placement pass, and teardown
//! unwinds everything through disposers.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::actor::hotkeys::AcceleratorRegistry;
use crate::common::config::SettingsStore;
use crate::model::app_map::AppWorkspaceMap;
use crate::placement::engine::PlacementEngine;
use crate::placement::workspace_guard::WorkspaceLifecycleGuard;
use crate::sys::shell::{CleanupHook, HostShell, TriggerId, WindowShell, WindowTracker};

/// One-shot teardown handle. Running it twice is a no-op, so teardown code
/// never has to care whether an earlier path already disposed something.
pub struct Disposer(Option<Box<dyn FnOnce()>>);

impl Disposer {
    pub fn new(dispose: impl FnOnce() + 'static) -> Self {
        Disposer(Some(Box::new(dispose)))
    }

    pub fn dispose(&mut self) {
        if let Some(dispose) = self.0.take() {
            dispose();
        }
    }
}

pub struct Organiser {
    engine: Rc<PlacementEngine>,
    registry: Rc<AcceleratorRegistry>,
    store: Rc<dyn SettingsStore>,
    app_map: Rc<RefCell<AppWorkspaceMap>>,
    hotkey_pattern: RefCell<String>,
    disposers: RefCell<Vec<Disposer>>,
    enabled: Cell<bool>,
}

impl Organiser {
    /// Wires the whole system against a host shell: builds the map from the
    /// current settings, installs the workspace lifecycle guard, grabs the
    /// configured hotkey and subscribes to settings changes. Everything set
    /// up here is released again by [`Organiser::disable`].
    pub fn enable<H>(shell: Rc<H>, store: Rc<dyn SettingsStore>) -> Rc<Organiser>
    where
        H: HostShell + 'static,
    {
        let windows: Rc<dyn WindowShell> = shell.clone();
        let tracker: Rc<dyn WindowTracker> = shell.clone();
        let hook: Rc<dyn CleanupHook> = shell.clone();
        let registry = AcceleratorRegistry::new(shell);

        let settings = store.settings();
        let app_map = Rc::new(RefCell::new(AppWorkspaceMap::rebuild(
            &settings.application_list,
        )));
        debug!(mappings = app_map.borrow().len(), "built app workspace map");

        let engine = Rc::new(PlacementEngine::new(
            windows.clone(),
            tracker,
            app_map.clone(),
        ));
        let guard = WorkspaceLifecycleGuard::new(windows);
        guard.install(&*hook);

        let organiser = Rc::new(Organiser {
            engine,
            registry: Rc::new(registry),
            store: store.clone(),
            app_map,
            hotkey_pattern: RefCell::new(String::new()),
            disposers: RefCell::new(Vec::new()),
            enabled: Cell::new(true),
        });
        organiser.register_hotkey(&settings.organise_hotkey);

        let signal = store.connect_changed({
            let weak = Rc::downgrade(&organiser);
            Rc::new(move || {
                if let Some(organiser) = weak.upgrade() {
                    organiser.reload_settings();
                }
            })
        });

        let mut disposers = organiser.disposers.borrow_mut();
        disposers.push(Disposer::new({
            let registry = organiser.registry.clone();
            move || registry.unregister_all()
        }));
        disposers.push(Disposer::new({
            let store = store.clone();
            move || store.disconnect_changed(signal)
        }));
        disposers.push(Disposer::new({
            let guard = guard.clone();
            let hook = hook.clone();
            move || guard.uninstall(&*hook)
        }));
        drop(disposers);

        info!("window organiser enabled");
        organiser
    }

    /// The UI click path; the hotkey ends up here too.
    pub fn organise_windows(&self) {
        self.engine.organise_windows();
    }

    /// Entry point for the host's accelerator-activation event stream.
    /// After [`Organiser::disable`] every activation is dropped.
    pub fn dispatch_accelerator(&self, trigger: TriggerId) {
        self.registry.dispatch(trigger);
    }

    /// Full rebuild on every change notification; nothing is patched
    /// incrementally. Cheap enough that back-to-back notifications just
    /// rebuild twice.
    fn reload_settings(&self) {
        let settings = self.store.settings();
        *self.app_map.borrow_mut() = AppWorkspaceMap::rebuild(&settings.application_list);
        debug!(
            mappings = self.app_map.borrow().len(),
            "rebuilt app workspace map"
        );

        if *self.hotkey_pattern.borrow() != settings.organise_hotkey {
            self.registry.unregister_all();
            self.register_hotkey(&settings.organise_hotkey);
        }
    }

    fn register_hotkey(&self, pattern: &str) {
        let engine = self.engine.clone();
        match self.registry.register(pattern, Rc::new(move || engine.organise_windows())) {
            Ok(_) => debug!(pattern, "organise hotkey registered"),
            // The binding stays inert; everything else keeps working.
            Err(err) => warn!("{err}"),
        }
        *self.hotkey_pattern.borrow_mut() = pattern.to_owned();
    }

    /// Unregisters the accelerators, disconnects the settings subscription
    /// and restores the host's original cleanup routine. Idempotent.
    pub fn disable(&self) {
        if !self.enabled.replace(false) {
            return;
        }
        for disposer in self.disposers.borrow_mut().iter_mut() {
            disposer.dispose();
        }
        info!("window organiser disabled");
    }
}

impl Drop for Organiser {
    fn drop(&mut self) {
        self.disable();
    }
}
