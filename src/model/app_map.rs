//! The application-to-workspace mapping, rebuilt wholesale from the
//! configured string list on every settings change.

use tracing::debug;

use crate::common::collections::HashMap;
use crate::common::error::OrganiseError;

/// Maps app ids to zero-based workspace indices. Configuration entries are
/// 1-based (`"org.gnome.Terminal:3"` targets the third workspace, internal
/// index 2).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppWorkspaceMap {
    targets: HashMap<String, usize>,
}

impl AppWorkspaceMap {
    /// Rebuilds the whole map from the configured entries. Malformed entries
    /// are dropped with a debug line and never abort the rebuild; duplicate
    /// app ids resolve last-wins in input order.
    pub fn rebuild<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut targets = HashMap::default();
        for entry in entries {
            match parse_entry(entry.as_ref()) {
                Ok((app_id, workspace)) => {
                    targets.insert(app_id, workspace);
                }
                Err(err) => debug!("dropping application-list entry: {err}"),
            }
        }
        AppWorkspaceMap { targets }
    }

    /// Explicit presence check; workspace index 0 is a valid target.
    pub fn target_for(&self, app_id: &str) -> Option<usize> {
        self.targets.get(app_id).copied()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Grammar: `appId ':' positiveInteger`. The app id is everything before the
/// first colon, so app ids may not contain one (none of the reverse-DNS ids
/// hosts hand out do).
fn parse_entry(entry: &str) -> Result<(String, usize), OrganiseError> {
    let malformed = |reason| OrganiseError::MalformedConfigEntry {
        entry: entry.to_owned(),
        reason,
    };
    let Some((app_id, number)) = entry.split_once(':') else {
        return Err(malformed("missing ':' separator"));
    };
    let app_id = app_id.trim();
    if app_id.is_empty() {
        return Err(malformed("empty app id"));
    }
    let workspace: usize = number
        .trim()
        .parse()
        .map_err(|_| malformed("workspace number is not an integer"))?;
    if workspace == 0 {
        return Err(malformed("workspace numbers are 1-based"));
    }
    Ok((app_id.to_owned(), workspace - 1))
}
