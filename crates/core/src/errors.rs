use thiserror::Error;

/// Local, synchronous failures of the step navigation state machine.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("history is empty")]
    EmptyHistory,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl ApplicationError {
    /// Stable classifier used in structured command output.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Navigation(NavigationError::InvalidArgument(_)) => "invalid_argument",
            Self::Navigation(NavigationError::InvalidState(_)) => "invalid_state",
            Self::Navigation(NavigationError::EmptyHistory) => "empty_history",
            Self::Transport(_) => "transport",
            Self::Configuration(_) => "config_validation",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration(_) => 2,
            Self::Navigation(_) => 3,
            Self::Transport(_) => 4,
        }
    }
}
