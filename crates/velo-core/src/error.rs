//! Error types for the advisor core.

/// Shown to the user for every failed completion, whatever the cause.
pub const USER_FACING_ERROR: &str =
    "Entschuldigung, es ist ein Fehler aufgetreten. Bitte versuche es noch einmal.";

/// A completion request that did not produce an assistant reply.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    /// Transport level: connection refused, reset, DNS, ...
    #[error("Network failure: {0}")]
    Network(String),

    /// The backend answered, but not with a usable `{ response: string }` body.
    #[error("Protocol failure: {0}")]
    Protocol(String),
}

impl ChatError {
    /// The message surfaced to the end user. Both kinds look the same.
    pub fn user_message(&self) -> &'static str {
        USER_FACING_ERROR
    }
}

/// A decision tree definition that must not be offered to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Option '{option}' on node '{node}' has neither a next node nor terminal=true")]
    DanglingOption { node: String, option: String },

    #[error("Option '{option}' on node '{node}' sets both a next node and terminal=true")]
    AmbiguousOption { node: String, option: String },

    #[error("Option '{option}' on node '{node}' points at unknown node '{target}'")]
    UnknownTarget {
        node: String,
        option: String,
        target: String,
    },

    #[error("Start node '{0}' does not exist")]
    UnknownStart(String),

    #[error("Node id '{0}' is defined more than once")]
    DuplicateNode(String),

    #[error("Node '{0}' offers no options")]
    EmptyNode(String),

    #[error("Node '{0}' can be reached from itself")]
    Cycle(String),

    #[error("Failed to parse decision tree: {0}")]
    Parse(String),
}

/// Selecting something the current wizard node does not offer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("Node '{node}' has no option '{value}'")]
    UnknownOption { node: String, value: String },
}

/// Settings file errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Decision tree error: {0}")]
    Tree(#[from] ConfigurationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_and_protocol_look_the_same_to_users() {
        let network = ChatError::Network("connection refused".into());
        let protocol = ChatError::Protocol("missing response".into());
        assert_eq!(network.user_message(), protocol.user_message());
        assert_ne!(network.to_string(), protocol.to_string());
    }
}
