use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;

use serde::Deserialize;

/// Boxed future returned by the pluggable backends.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Behaviour when a trigger is accepted while a build/restart cycle is
/// already in flight.
///
/// - `Queue`: remember the trigger in a single pending slot and run one more
///   cycle once the current one finishes (default behaviour).
/// - `Ignore`: drop the trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TriggerWhileBuildingBehaviour {
    #[default]
    Queue,
    Ignore,
}

impl FromStr for TriggerWhileBuildingBehaviour {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "queue" => Ok(TriggerWhileBuildingBehaviour::Queue),
            "ignore" => Ok(TriggerWhileBuildingBehaviour::Ignore),
            other => Err(format!(
                "invalid triggered_while_building_behaviour: {other} (expected \"queue\" or \"ignore\")"
            )),
        }
    }
}

/// Kind of filesystem operation carried by a change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Create,
    Write,
    Rename,
    Remove,
    /// Permission, ownership or timestamp change only.
    Metadata,
    /// File was opened, read or closed.
    Access,
    Other,
}

impl ChangeKind {
    /// True for operations that cannot have changed file contents.
    pub fn is_metadata_only(self) -> bool {
        matches!(self, ChangeKind::Metadata | ChangeKind::Access)
    }
}

impl From<&notify::EventKind> for ChangeKind {
    fn from(kind: &notify::EventKind) -> Self {
        use notify::EventKind;
        use notify::event::ModifyKind;

        match kind {
            EventKind::Create(_) => ChangeKind::Create,
            EventKind::Remove(_) => ChangeKind::Remove,
            EventKind::Modify(ModifyKind::Metadata(_)) => ChangeKind::Metadata,
            EventKind::Modify(ModifyKind::Name(_)) => ChangeKind::Rename,
            EventKind::Modify(_) => ChangeKind::Write,
            EventKind::Access(_) => ChangeKind::Access,
            EventKind::Any | EventKind::Other => ChangeKind::Other,
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeKind::Create => "create",
            ChangeKind::Write => "write",
            ChangeKind::Rename => "rename",
            ChangeKind::Remove => "remove",
            ChangeKind::Metadata => "metadata",
            ChangeKind::Access => "access",
            ChangeKind::Other => "other",
        };
        f.write_str(s)
    }
}
