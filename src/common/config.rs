//! Settings and the stores that hold them. The orchestrator only ever sees
//! the [`SettingsStore`] trait; the concrete stores are a TOML file watched
//! for changes and an in-memory store for hosts that persist settings
//! themselves.

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use anyhow::Context;
use crossbeam_channel::{Receiver, Sender};
use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, Debouncer};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::common::collections::HashMap;
use crate::sys::shell::SignalId;

pub const DEFAULT_ORGANISE_HOTKEY: &str = "<Super><Shift>o";

const WATCH_DEBOUNCE: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// `"appId:workspaceNumber"` entries, workspace numbers 1-based.
    pub application_list: Vec<String>,
    /// Key chord that triggers a reorganisation pass.
    pub organise_hotkey: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            application_list: Vec::new(),
            organise_hotkey: DEFAULT_ORGANISE_HOTKEY.to_owned(),
        }
    }
}

/// The configuration store the orchestrator consumes: current settings plus
/// an edge-triggered change notification. All callbacks run synchronously on
/// the caller's thread; both methods stay safe after teardown.
pub trait SettingsStore {
    fn settings(&self) -> Settings;

    fn connect_changed(&self, callback: Rc<dyn Fn()>) -> SignalId;

    fn disconnect_changed(&self, signal: SignalId);
}

/// Shared subscription bookkeeping for the concrete stores.
#[derive(Default)]
struct ChangedSignals {
    callbacks: RefCell<HashMap<SignalId, Rc<dyn Fn()>>>,
    next_signal: Cell<u64>,
}

impl ChangedSignals {
    fn connect(&self, callback: Rc<dyn Fn()>) -> SignalId {
        let id = SignalId::new(self.next_signal.get());
        self.next_signal.set(self.next_signal.get() + 1);
        self.callbacks.borrow_mut().insert(id, callback);
        id
    }

    fn disconnect(&self, signal: SignalId) {
        self.callbacks.borrow_mut().remove(&signal);
    }

    fn emit(&self) {
        // Snapshot first so a callback may connect or disconnect while we
        // iterate.
        let callbacks: Vec<Rc<dyn Fn()>> =
            self.callbacks.borrow().values().cloned().collect();
        for callback in callbacks {
            callback();
        }
    }
}

/// In-memory store, for hosts that own settings persistence (and for tests).
#[derive(Default)]
pub struct MemorySettingsStore {
    settings: RefCell<Settings>,
    signals: ChangedSignals,
}

impl MemorySettingsStore {
    pub fn new(settings: Settings) -> Rc<Self> {
        Rc::new(MemorySettingsStore {
            settings: RefCell::new(settings),
            signals: ChangedSignals::default(),
        })
    }

    pub fn set_settings(&self, settings: Settings) {
        *self.settings.borrow_mut() = settings;
        self.signals.emit();
    }
}

impl SettingsStore for MemorySettingsStore {
    fn settings(&self) -> Settings {
        self.settings.borrow().clone()
    }

    fn connect_changed(&self, callback: Rc<dyn Fn()>) -> SignalId {
        self.signals.connect(callback)
    }

    fn disconnect_changed(&self, signal: SignalId) {
        self.signals.disconnect(signal)
    }
}

/// TOML file store with a debounced file watcher. The watcher thread only
/// pushes a token into a channel; [`FileSettingsStore::pump`] drains it on
/// the event-loop thread, reloads the file and fires the callbacks there,
/// keeping every callback on one logical thread.
pub struct FileSettingsStore {
    path: PathBuf,
    settings: RefCell<Settings>,
    signals: ChangedSignals,
    events_rx: Receiver<()>,
    // Held for its Drop: dropping the store stops the watcher thread.
    _debouncer: Debouncer<RecommendedWatcher>,
}

impl FileSettingsStore {
    /// Opens the store and starts watching the file's directory. A missing
    /// or malformed file is not an error; it logs a warning and yields
    /// defaults until the file becomes readable.
    pub fn new(path: impl Into<PathBuf>) -> anyhow::Result<Rc<Self>> {
        let path: PathBuf = path.into();
        let settings = match load_settings(&path) {
            Ok(settings) => settings,
            Err(err) => {
                warn!("unable to load settings from {}: {err:#}", path.display());
                Settings::default()
            }
        };

        let (events_tx, events_rx): (Sender<()>, Receiver<()>) =
            crossbeam_channel::unbounded();
        let watched = path.clone();
        let mut debouncer =
            new_debouncer(WATCH_DEBOUNCE, move |result: DebounceEventResult| {
                match result {
                    Ok(events) => {
                        if events.iter().any(|event| event.path == watched) {
                            let _ = events_tx.send(());
                        }
                    }
                    Err(err) => warn!("settings watcher error: {err}"),
                }
            })
            .context("starting settings watcher")?;
        // Watch the parent directory so atomic-rename saves are seen.
        let watch_root = path.parent().filter(|p| !p.as_os_str().is_empty());
        debouncer
            .watcher()
            .watch(watch_root.unwrap_or(Path::new(".")), RecursiveMode::NonRecursive)
            .with_context(|| format!("watching {}", path.display()))?;

        Ok(Rc::new(FileSettingsStore {
            path,
            settings: RefCell::new(settings),
            signals: ChangedSignals::default(),
            events_rx,
            _debouncer: debouncer,
        }))
    }

    /// Drains pending watcher events; if any arrived, reloads and notifies.
    /// The host event loop calls this from an idle source.
    pub fn pump(&self) {
        let mut dirty = false;
        while self.events_rx.try_recv().is_ok() {
            dirty = true;
        }
        if dirty {
            self.reload();
        }
    }

    /// Reloads from disk and fires the change callbacks. A file that went
    /// missing or unparsable keeps the last good settings and notifies
    /// nobody.
    pub fn reload(&self) {
        match load_settings(&self.path) {
            Ok(settings) => {
                debug!("settings reloaded from {}", self.path.display());
                *self.settings.borrow_mut() = settings;
                self.signals.emit();
            }
            Err(err) => {
                warn!(
                    "keeping previous settings, reload of {} failed: {err:#}",
                    self.path.display()
                );
            }
        }
    }
}

impl SettingsStore for FileSettingsStore {
    fn settings(&self) -> Settings {
        self.settings.borrow().clone()
    }

    fn connect_changed(&self, callback: Rc<dyn Fn()>) -> SignalId {
        self.signals.connect(callback)
    }

    fn disconnect_changed(&self, signal: SignalId) {
        self.signals.disconnect(signal)
    }
}

fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}
