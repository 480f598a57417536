use thiserror::Error;

use crate::config::ConfigError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error("configuration failure: {0}")]
    Configuration(String),
    #[error("input failure: {0}")]
    Input(String),
    #[error("render failure: {0}")]
    Render(String),
}

impl From<ConfigError> for ApplicationError {
    fn from(value: ConfigError) -> Self {
        Self::Configuration(value.to_string())
    }
}

/// What a command surface reports back to the operator.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },
    #[error("unreadable input: {message}")]
    UnreadableInput { message: String },
    #[error("output failed: {message}")]
    OutputFailed { message: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration { .. } => {
                "The configuration could not be loaded. Check quickquote.toml and QUICKQUOTE_* variables."
            }
            Self::UnreadableInput { .. } => {
                "The quote input could not be read. Check the input file path and its JSON."
            }
            Self::OutputFailed { .. } => "The quote could not be rendered or written.",
        }
    }

    pub fn error_class(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration { .. } => "config",
            Self::UnreadableInput { .. } => "input",
            Self::OutputFailed { .. } => "render",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidConfiguration { .. } => 2,
            Self::UnreadableInput { .. } => 3,
            Self::OutputFailed { .. } => 4,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            Self::InvalidConfiguration { message }
            | Self::UnreadableInput { message }
            | Self::OutputFailed { message } => message,
        }
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        match value {
            ApplicationError::Configuration(message) => Self::InvalidConfiguration { message },
            ApplicationError::Input(message) => Self::UnreadableInput { message },
            ApplicationError::Render(message) => Self::OutputFailed { message },
        }
    }
}
