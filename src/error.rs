use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

/// The result type used across the crate.
pub type Result<T> = std::result::Result<T, NnError>;

/// Every failure the network, its persistence layer and the coordinator can report.
#[derive(Debug)]
pub enum NnError {
    /// Invalid topology; the instance is never created.
    Configuration { reason: String },
    /// An input, target or sample batch has the wrong length.
    InputShape {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    /// Somebody tried to assign the activation of a computed (non-input) node.
    ActivationMisuse { node: usize, layer: usize },
    /// A node id that does not belong to this instance.
    UnknownNode { node: usize, node_count: usize },
    /// A parameter file is missing, truncated or does not fit the topology.
    Persistence { reason: String },
    /// A pass was requested before the pass it depends on.
    OutOfOrder {
        operation: &'static str,
        required: &'static str,
    },
    /// The coordinator's stop flag was raised.
    Stopped,
    /// The worker thread owning a replica is gone.
    WorkerLost { replica: usize },
    Io(io::Error),
    Json(serde_json::Error),
}

impl NnError {
    pub(crate) fn persistence(reason: impl Into<String>) -> Self {
        NnError::Persistence {
            reason: reason.into(),
        }
    }

    pub(crate) fn configuration(reason: impl Into<String>) -> Self {
        NnError::Configuration {
            reason: reason.into(),
        }
    }

    /// Whether the failure only aborts the current operation and leaves the
    /// instance usable.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            NnError::InputShape { .. }
                | NnError::ActivationMisuse { .. }
                | NnError::UnknownNode { .. }
                | NnError::OutOfOrder { .. }
        )
    }
}

impl Display for NnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NnError::Configuration { reason } => write!(f, "invalid configuration: {reason}"),
            NnError::InputShape {
                what,
                got,
                expected,
            } => write!(f, "{what} has length {got}, expected {expected}"),
            NnError::ActivationMisuse { node, layer } => write!(
                f,
                "cannot assign the activation of node {node}: it lives in computed layer {layer}"
            ),
            NnError::UnknownNode { node, node_count } => {
                write!(f, "node {node} does not exist in a network of {node_count} nodes")
            }
            NnError::Persistence { reason } => write!(f, "parameter persistence failed: {reason}"),
            NnError::OutOfOrder {
                operation,
                required,
            } => write!(f, "{operation} requires a completed {required} for the current sample"),
            NnError::Stopped => write!(f, "training was stopped"),
            NnError::WorkerLost { replica } => {
                write!(f, "the worker owning replica {replica} is no longer running")
            }
            NnError::Io(e) => write!(f, "io error: {e}"),
            NnError::Json(e) => write!(f, "json error: {e}"),
        }
    }
}

impl Error for NnError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            NnError::Io(e) => Some(e),
            NnError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for NnError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for NnError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_errors_are_recoverable() {
        let err = NnError::InputShape {
            what: "input sample",
            got: 3,
            expected: 4,
        };
        assert!(err.is_recoverable());
        assert_eq!(err.to_string(), "input sample has length 3, expected 4");
    }

    #[test]
    fn unknown_nodes_name_the_id() {
        let err = NnError::UnknownNode { node: 12, node_count: 5 };
        assert!(err.is_recoverable());
        assert_eq!(err.to_string(), "node 12 does not exist in a network of 5 nodes");
    }

    #[test]
    fn configuration_errors_are_fatal() {
        assert!(!NnError::configuration("layer 1 is empty").is_recoverable());
        assert!(!NnError::persistence("truncated").is_recoverable());
    }

    #[test]
    fn io_errors_keep_their_source() {
        let err: NnError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(err.source().is_some());
    }
}
