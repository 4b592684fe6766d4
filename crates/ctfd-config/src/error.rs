//! Error types for ctfd-config
//!
//! Errors are structured: a kind, the option path it concerns
//! (e.g. "server.REDIS_PORT"), an optional file location, the underlying
//! cause and an actionable help message.

use std::fmt;

/// Result type alias for configuration operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for configuration resolution
#[derive(Debug, Clone)]
pub struct Error {
    /// The kind of error that occurred
    pub kind: ErrorKind,
    /// Option path the error concerns (e.g., "security.PERMANENT_SESSION_LIFETIME")
    pub path: Option<String>,
    /// Source location (file, line) if available
    pub source_location: Option<SourceLocation>,
    /// Actionable help message
    pub help: Option<String>,
    /// Underlying cause (as string for Clone compatibility)
    pub cause: Option<String>,
}

/// Location in a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: String,
    pub line: Option<usize>,
}

/// Categories of errors that can occur
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    /// A raw value could not be coerced to the type it is required to have
    #[error("Parse error")]
    Parse,
    /// An `[extra]` key shadows a built-in option
    #[error("Config conflict")]
    ConfigConflict { key: String },
    /// Malformed INI input
    #[error("Syntax error")]
    Syntax,
    /// `%(name)s` expansion failed
    #[error("Interpolation error")]
    Interpolation,
    /// I/O error reading the configuration file
    #[error("I/O error")]
    Io,
}

impl Error {
    fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            path: None,
            source_location: None,
            help: None,
            cause: None,
        }
    }

    /// Create a coercion error for a value that must have type `expected`
    pub fn parse(
        path: impl Into<String>,
        expected: impl Into<String>,
        got: impl Into<String>,
    ) -> Self {
        Self {
            path: Some(path.into()),
            help: Some(format!(
                "Ensure the value can be converted to {}",
                expected.into()
            )),
            cause: Some(format!("Got: {}", got.into())),
            ..Self::new(ErrorKind::Parse)
        }
    }

    /// Create an error for an `[extra]` key that collides with a built-in option
    pub fn config_conflict(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            path: Some(format!("extra.{}", key)),
            help: Some(format!(
                "Built-in option '{}' must not be defined in the [extra] section",
                key
            )),
            ..Self::new(ErrorKind::ConfigConflict { key: key.clone() })
        }
    }

    /// Create an INI syntax error
    pub fn syntax(message: impl Into<String>) -> Self {
        Self {
            cause: Some(message.into()),
            ..Self::new(ErrorKind::Syntax)
        }
    }

    /// Create an interpolation error
    pub fn interpolation(message: impl Into<String>) -> Self {
        Self {
            help: Some("Write a literal '%' as '%%'".into()),
            cause: Some(message.into()),
            ..Self::new(ErrorKind::Interpolation)
        }
    }

    /// Create an I/O error for the configuration file
    pub fn io(file: impl Into<String>, cause: &std::io::Error) -> Self {
        let file = file.into();
        Self {
            help: Some(format!("Check that '{}' exists and is readable", file)),
            cause: Some(cause.to_string()),
            source_location: Some(SourceLocation { file, line: None }),
            ..Self::new(ErrorKind::Io)
        }
    }

    /// Add path context to the error
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add source location to the error
    pub fn with_source_location(mut self, loc: SourceLocation) -> Self {
        self.source_location = Some(loc);
        self
    }

    /// Add help message to the error
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let ErrorKind::ConfigConflict { key } = &self.kind {
            write!(f, ": {}", key)?;
        }

        if let Some(path) = &self.path {
            write!(f, "\n  Path: {}", path)?;
        }

        if let Some(loc) = &self.source_location {
            write!(f, "\n  File: {}", loc.file)?;
            if let Some(line) = loc.line {
                write!(f, ":{}", line)?;
            }
        }

        if let Some(cause) = &self.cause {
            write!(f, "\n  {}", cause)?;
        }

        if let Some(help) = &self.help {
            write!(f, "\n  Help: {}", help)?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = Error::parse("server.REDIS_PORT", "integer", "string (\"abc\")");
        let display = format!("{}", err);

        assert!(display.contains("Parse error"));
        assert!(display.contains("Path: server.REDIS_PORT"));
        assert!(display.contains("Got: string (\"abc\")"));
        assert!(display.contains("Help: Ensure the value can be converted to integer"));
    }

    #[test]
    fn test_config_conflict_display() {
        let err = Error::config_conflict("SECRET_KEY");
        let display = format!("{}", err);

        assert!(display.contains("Config conflict: SECRET_KEY"));
        assert!(display.contains("Path: extra.SECRET_KEY"));
        assert_eq!(
            err.kind,
            ErrorKind::ConfigConflict {
                key: "SECRET_KEY".into()
            }
        );
    }

    #[test]
    fn test_syntax_error_with_location() {
        let err = Error::syntax("option outside of any section").with_source_location(
            SourceLocation {
                file: "config.ini".into(),
                line: Some(3),
            },
        );
        let display = format!("{}", err);

        assert!(display.contains("Syntax error"));
        assert!(display.contains("config.ini:3"));
        assert!(display.contains("option outside of any section"));
    }

    #[test]
    fn test_io_error() {
        let cause = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = Error::io("/etc/ctfd/config.ini", &cause);

        assert_eq!(err.kind, ErrorKind::Io);
        assert!(format!("{}", err).contains("File: /etc/ctfd/config.ini"));
    }

    #[test]
    fn test_with_help_overrides() {
        let err = Error::syntax("bad").with_help("Try fixing the syntax");
        assert!(format!("{}", err).contains("Help: Try fixing the syntax"));
    }
}
