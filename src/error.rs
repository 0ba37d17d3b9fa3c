use crate::{ConfigError, Origin, ValidationProblem};
use std::fmt::{Display, Formatter};

impl ConfigError {
    pub(crate) fn parse(origin: Origin, message: String) -> Self {
        ConfigError::Parse { origin, message }
    }

    pub(crate) fn wrong_type(origin: &Origin, path: &str, expected: &str, got: &str) -> Self {
        ConfigError::WrongType {
            origin: origin.clone(),
            message: format!("{} has type {} rather than {}", path, got, expected),
        }
    }

    pub(crate) fn not_resolved(detail: &str) -> Self {
        ConfigError::NotResolved {
            message: format!(
                "need to call resolve() on the Config before using it: {}",
                detail
            ),
        }
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Parse { origin, message } => {
                write!(f, "{}: {}", origin.description(), message)
            }
            ConfigError::UnresolvedSubstitution { origin, message } => {
                write!(f, "{}: {}", origin.description(), message)
            }
            ConfigError::Missing { path } => {
                write!(f, "No configuration setting found for key '{}'", path)
            }
            ConfigError::Null { path, expected } => {
                write!(
                    f,
                    "Configuration key '{}' is set to null but expected {}",
                    path, expected
                )
            }
            ConfigError::WrongType { origin, message } => {
                write!(f, "{}: {}", origin.description(), message)
            }
            ConfigError::BadValue {
                origin,
                path,
                message,
            } => {
                write!(
                    f,
                    "{}: Invalid value at '{}': {}",
                    origin.description(),
                    path,
                    message
                )
            }
            ConfigError::BadPath { path, message } => {
                write!(f, "Invalid path '{}': {}", path, message)
            }
            ConfigError::Io { message } => write!(f, "{}", message),
            ConfigError::FileNotFound { path } => write!(f, "file not found: {}", path),
            ConfigError::NotResolved { message } => write!(f, "{}", message),
            ConfigError::ValidationFailed { problems } => {
                let mut first = true;
                for p in problems {
                    if !first {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p)?;
                    first = false;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl ValidationProblem {
    pub fn new(path: String, origin: Origin, problem: String) -> Self {
        Self {
            path,
            origin,
            problem,
        }
    }
}

impl Display for ValidationProblem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}: {}",
            self.origin.description(),
            self.path,
            self.problem
        )
    }
}
