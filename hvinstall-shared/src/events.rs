//! Install lifecycle events fired through webhooks.

use crate::errors::InstallerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named transition in the install lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InstallEvent {
    Started,
    Completed,
}

impl InstallEvent {
    pub const ALL: [InstallEvent; 2] = [InstallEvent::Started, InstallEvent::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            InstallEvent::Started => "STARTED",
            InstallEvent::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for InstallEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstallEvent {
    type Err = InstallerError;

    /// Event names are matched exactly; webhook definitions must use the
    /// upper-case wire names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InstallEvent::ALL
            .into_iter()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| InstallerError::WebhookConfig(format!("unknown install event: {:?}", s)))
    }
}
