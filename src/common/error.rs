use thiserror::Error;

use crate::sys::shell::WindowId;

/// Everything that can go wrong while organising windows. None of these is
/// fatal; each is absorbed at the site that produced it with at most one log
/// line. The degraded states a user can observe are "a hotkey doesn't work"
/// and "a window didn't move".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrganiseError {
    /// Another client already holds the key chord; the binding stays inert.
    #[error("accelerator {pattern:?} is already grabbed by another client")]
    GrabDenied { pattern: String },

    /// A configuration entry failed the `appId:workspaceNumber` grammar and
    /// was dropped from the rebuilt map.
    #[error("malformed application-list entry {entry:?}: {reason}")]
    MalformedConfigEntry {
        entry: String,
        reason: &'static str,
    },

    /// The host's window tracker has no application for this window yet
    /// (startup race); the window is skipped for the current pass only.
    #[error("no application resolved for window {window:?}")]
    UnresolvedAppForWindow { window: WindowId },
}
