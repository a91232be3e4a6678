//! Global hotkey registration and dispatch. The host delivers activation
//! events carrying the opaque trigger id it handed out at grab time; this
//! registry is the single point that turns those ids back into callbacks.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::common::collections::HashMap;
use crate::common::error::OrganiseError;
use crate::sys::shell::{AcceleratorShell, TriggerId};

/// One registered key chord. Owned exclusively by the registry; dropped when
/// the chord is released.
struct AcceleratorBinding {
    pattern: String,
    callback: Rc<dyn Fn()>,
}

pub struct AcceleratorRegistry {
    shell: Rc<dyn AcceleratorShell>,
    bindings: RefCell<HashMap<TriggerId, AcceleratorBinding>>,
}

impl AcceleratorRegistry {
    pub fn new(shell: Rc<dyn AcceleratorShell>) -> Self {
        AcceleratorRegistry {
            shell,
            bindings: RefCell::new(HashMap::default()),
        }
    }

    /// Asks the host to reserve the chord. Denial is not fatal to anything:
    /// the caller logs it and the rest of the system keeps running without
    /// that trigger.
    pub fn register(
        &self,
        pattern: &str,
        callback: Rc<dyn Fn()>,
    ) -> Result<TriggerId, OrganiseError> {
        let Some(trigger) = self.shell.grab_accelerator(pattern) else {
            return Err(OrganiseError::GrabDenied {
                pattern: pattern.to_owned(),
            });
        };
        debug!(?trigger, pattern, "grabbed accelerator");
        self.bindings.borrow_mut().insert(trigger, AcceleratorBinding {
            pattern: pattern.to_owned(),
            callback,
        });
        Ok(trigger)
    }

    /// Dispatches one activation event. Membership is checked before the
    /// call so an event for a chord released mid-flight is dropped instead
    /// of reaching a stale callback. The callback runs outside the table
    /// borrow, so it may re-enter `register` without tripping a borrow.
    pub fn dispatch(&self, trigger: TriggerId) {
        let callback = self.bindings.borrow().get(&trigger).map(|b| b.callback.clone());
        match callback {
            Some(callback) => callback(),
            None => trace!(?trigger, "activation for unknown or released accelerator"),
        }
    }

    /// Releases every held chord. Idempotent; after this no dispatch can
    /// reach a callback.
    pub fn unregister_all(&self) {
        for (trigger, binding) in self.bindings.borrow_mut().drain() {
            debug!(?trigger, pattern = %binding.pattern, "released accelerator");
            self.shell.ungrab_accelerator(trigger);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.borrow().is_empty()
    }
}

impl Drop for AcceleratorRegistry {
    fn drop(&mut self) {
        if !self.bindings.borrow().is_empty() {
            warn!("accelerator registry dropped with live grabs; releasing");
            self.unregister_all();
        }
    }
}
