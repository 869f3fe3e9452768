use std::fmt;

use crate::resource::ResourceType;

/// Names observed on the bridge while resolving a hint.
///
/// Attached to [`Error::NotFound`] so a failed lookup can be diagnosed
/// without a second round-trip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Observed {
    /// Names of every grouped light (unnamed groups use a placeholder).
    pub groups: Vec<String>,
    /// `(name, id)` of every room.
    pub rooms: Vec<(String, String)>,
    /// `(name, id)` of every zone.
    pub zones: Vec<(String, String)>,
}

impl Observed {
    pub(crate) const UNNAMED: &'static str = "<unnamed>";

    /// Returns `true` if `name` appears among the observed groups, rooms or zones.
    pub fn contains(&self, name: &str) -> bool {
        self.groups.iter().any(|g| g == name)
            || self.rooms.iter().any(|(n, _)| n == name)
            || self.zones.iter().any(|(n, _)| n == name)
    }
}

impl fmt::Display for Observed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "grouped lights: {:?}; rooms: {:?}; zones: {:?}", self.groups, self.rooms, self.zones)
    }
}

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidInput,
    TransientWriteFailure,
    GraphInconsistency,
    Transport,
    Decode,
    Config,
}

/// All error types that can occur when talking to a Hue bridge.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failed to serialize data to JSON.
    #[error("failed to dump json: {0:?}")]
    JsonDump(serde_json::Error),

    /// A record returned by the bridge did not have the expected shape.
    #[error("failed to load {rtype} record: {err:?}")]
    JsonLoad {
        rtype: ResourceType,
        err: serde_json::Error,
    },

    /// No grouped light matches the requested hint or identifier.
    #[error("no grouped light found for '{hint}' (observed {observed})")]
    NotFound { hint: String, observed: Observed },

    /// The input is structurally invalid (as opposed to merely out of range).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A reference needed to resolve a group does not exist on the bridge.
    #[error("{rtype} {id} is referenced but does not exist")]
    GraphInconsistency { rtype: ResourceType, id: String },

    /// Reading a resource collection failed.
    #[error("fetching {rtype} failed: {reason}")]
    Fetch { rtype: ResourceType, reason: String },

    /// Writing to a resource failed (transport, timeout, status or bridge error).
    #[error("writing {rtype} {id} failed: {reason}")]
    Write {
        rtype: ResourceType,
        id: String,
        reason: String,
    },

    /// The bridge configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Attempted to send a [`crate::Patch`] with no attributes set.
    #[error("invalid patch; no attributes set")]
    EmptyPatch,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::InvalidInput(_) | Error::EmptyPatch => ErrorKind::InvalidInput,
            Error::Write { .. } => ErrorKind::TransientWriteFailure,
            Error::GraphInconsistency { .. } => ErrorKind::GraphInconsistency,
            Error::Fetch { .. } => ErrorKind::Transport,
            Error::JsonDump(_) | Error::JsonLoad { .. } => ErrorKind::Decode,
            Error::InvalidConfig(_) => ErrorKind::Config,
        }
    }

    /// Create a new write error
    pub fn write(rtype: ResourceType, id: &str, reason: impl fmt::Display) -> Self {
        Error::Write {
            rtype,
            id: id.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a new fetch error
    pub fn fetch(rtype: ResourceType, reason: impl fmt::Display) -> Self {
        Error::Fetch {
            rtype,
            reason: reason.to_string(),
        }
    }

    /// Create a new graph inconsistency error
    pub fn dangling(rtype: ResourceType, id: &str) -> Self {
        Error::GraphInconsistency {
            rtype,
            id: id.to_string(),
        }
    }

    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        Error::InvalidInput(reason.into())
    }
}

/// Hacky implementation of PartialEq for testing
#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}
