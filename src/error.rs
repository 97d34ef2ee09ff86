use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::hiring::{ApplicationId, InvalidCommand, ManagerError};
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Command(InvalidCommand),
    Workflow(ManagerError),
    NotFound(ApplicationId),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Command(err) => write!(f, "invalid command: {}", err),
            AppError::Workflow(err) => write!(f, "workflow error: {}", err),
            AppError::NotFound(id) => write!(f, "no application with id {}", id),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Command(err) => Some(err),
            AppError::Workflow(err) => Some(err),
            AppError::NotFound(_) => None,
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<InvalidCommand> for AppError {
    fn from(value: InvalidCommand) -> Self {
        Self::Command(value)
    }
}

impl From<ManagerError> for AppError {
    fn from(value: ManagerError) -> Self {
        Self::Workflow(value)
    }
}
