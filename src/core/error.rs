//! Application error types for user-facing error handling.
//!
//! `AppError` is designed to be displayed in the error dialog with detailed
//! information and recovery options. `LogoFetchError` covers channel logo
//! fetches, which never surface to the user and only leave a cell empty.

use std::path::PathBuf;
use thiserror::Error;

/// Application-level errors that can be displayed to users.
#[derive(Debug, Clone, Error)]
pub enum AppError {
    /// File was not found at the specified path
    #[error("File not found")]
    FileNotFound {
        /// Path to the file that was not found
        path: PathBuf,
    },

    /// File exists but cannot be read (permissions, locked, etc.)
    #[error("Cannot read file")]
    FileReadError {
        /// Path to the file that could not be read
        path: PathBuf,
        /// Reason for the failure
        reason: String,
    },

    /// Listings document is malformed or violates the ordering rules
    #[error("Invalid listings")]
    InvalidListings {
        /// Path to the offending file
        path: Option<PathBuf>,
        /// Description of what's wrong
        message: String,
        /// Line number where the error occurred (1-indexed)
        line: Option<usize>,
        /// Column where the error occurred
        column: Option<usize>,
    },

    /// Listings format version is not supported
    #[error("Unsupported version")]
    UnsupportedVersion {
        /// Path to the file with unsupported version
        path: Option<PathBuf>,
        /// Version found in the file
        found: u32,
        /// Version supported by this application
        supported: u32,
    },

    /// File extension is not recognized
    #[error("Unsupported file type")]
    UnsupportedFileType {
        /// Path to the file
        path: PathBuf,
        /// Expected file extensions
        expected: Vec<String>,
    },

    /// A settings value cannot produce a usable guide
    #[error("Invalid setting {field}")]
    InvalidSettings {
        /// Name of the offending field
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// Settings could not be saved
    #[error("Settings save error")]
    SettingsSaveError {
        /// Description of the failure
        reason: String,
    },
}

impl AppError {
    /// Returns true if the failed operation can be retried.
    ///
    /// File-related errors can be retried after the user fixes the
    /// underlying issue (e.g., file permissions, file location).
    pub fn supports_retry(&self) -> bool {
        matches!(self, Self::FileNotFound { .. } | Self::FileReadError { .. })
    }

    /// Get the file path associated with this error, if any.
    pub fn file_path(&self) -> Option<&PathBuf> {
        match self {
            Self::FileNotFound { path } => Some(path),
            Self::FileReadError { path, .. } => Some(path),
            Self::InvalidListings { path, .. } => path.as_ref(),
            Self::UnsupportedVersion { path, .. } => path.as_ref(),
            Self::UnsupportedFileType { path, .. } => Some(path),
            Self::InvalidSettings { .. } | Self::SettingsSaveError { .. } => None,
        }
    }

    /// Get the title for the error dialog.
    pub fn dialog_title(&self) -> &'static str {
        match self {
            Self::FileNotFound { .. } => "File Not Found",
            Self::FileReadError { .. } => "Cannot Read File",
            Self::InvalidListings { .. } => "Invalid Listings",
            Self::UnsupportedVersion { .. } => "Unsupported Version",
            Self::UnsupportedFileType { .. } => "Unsupported File Type",
            Self::InvalidSettings { .. } | Self::SettingsSaveError { .. } => "Settings Error",
        }
    }

    /// Get a brief description of the error suitable for display.
    pub fn brief_description(&self) -> String {
        match self {
            Self::FileNotFound { path } => {
                format!("The file '{}' could not be found.", display_name(path))
            }
            Self::FileReadError { path, .. } => {
                format!("Could not read the file '{}'.", display_name(path))
            }
            Self::InvalidListings { message, .. } => message.clone(),
            Self::UnsupportedVersion {
                found, supported, ..
            } => {
                format!(
                    "Listings version {} is not supported. This guide reads version {}.",
                    found, supported
                )
            }
            Self::UnsupportedFileType { expected, .. } => {
                format!(
                    "Please use a file with one of these extensions: {}",
                    expected.join(", ")
                )
            }
            Self::InvalidSettings { field, reason } => {
                format!("Setting '{}' {}", field, reason)
            }
            Self::SettingsSaveError { reason } => format!("Could not save settings: {}", reason),
        }
    }

    /// Get detailed error information for bug reports.
    pub fn detailed_info(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Error Type: {}", self.dialog_title()));
        lines.push(format!("Description: {}", self.brief_description()));

        match self {
            Self::FileNotFound { path } => {
                lines.push(format!("Full Path: {}", path.display()));
            }
            Self::FileReadError { path, reason } => {
                lines.push(format!("Full Path: {}", path.display()));
                lines.push(format!("Reason: {}", reason));
            }
            Self::InvalidListings {
                path,
                message,
                line,
                column,
            } => {
                if let Some(p) = path {
                    lines.push(format!("File: {}", p.display()));
                }
                if let Some(l) = line {
                    lines.push(format!("Line: {}", l));
                }
                if let Some(c) = column {
                    lines.push(format!("Column: {}", c));
                }
                lines.push(format!("Details: {}", message));
            }
            Self::UnsupportedVersion {
                path,
                found,
                supported,
            } => {
                if let Some(p) = path {
                    lines.push(format!("File: {}", p.display()));
                }
                lines.push(format!("Found Version: {}", found));
                lines.push(format!("Supported Version: {}", supported));
            }
            Self::UnsupportedFileType { path, expected } => {
                lines.push(format!("File: {}", path.display()));
                lines.push(format!("Supported Extensions: {}", expected.join(", ")));
            }
            Self::InvalidSettings { reason, .. } | Self::SettingsSaveError { reason } => {
                lines.push(format!("Details: {}", reason));
            }
        }

        lines.join("\n")
    }
}

fn display_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// Create an AppError from a file path and I/O error.
pub fn from_io_error(path: PathBuf, error: std::io::Error) -> AppError {
    match error.kind() {
        std::io::ErrorKind::NotFound => AppError::FileNotFound { path },
        std::io::ErrorKind::PermissionDenied => AppError::FileReadError {
            path,
            reason: "Permission denied".to_string(),
        },
        _ => AppError::FileReadError {
            path,
            reason: error.to_string(),
        },
    }
}

/// Create an AppError from a listings parse error with optional path context.
pub fn from_parse_error(
    path: Option<PathBuf>,
    error: &crate::core::parser::ParseError,
) -> AppError {
    use crate::core::parser::{ParseError, SUPPORTED_VERSION};

    match error {
        ParseError::JsonSyntax(e) => {
            let (line, column) = extract_json_position(e);
            AppError::InvalidListings {
                path,
                message: e.to_string(),
                line,
                column,
            }
        }
        ParseError::UnsupportedVersion { version } => AppError::UnsupportedVersion {
            path,
            found: *version,
            supported: SUPPORTED_VERSION,
        },
        other => AppError::InvalidListings {
            path,
            message: other.to_string(),
            line: None,
            column: None,
        },
    }
}

/// Extract line and column from a serde_json::Error if available.
fn extract_json_position(error: &serde_json::Error) -> (Option<usize>, Option<usize>) {
    // line() returns 0 if not applicable, otherwise 1-indexed
    let line = Some(error.line()).filter(|l| *l > 0);
    let column = Some(error.column()).filter(|c| *c > 0);
    (line, column)
}

/// Failure to resolve a channel logo.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogoFetchError {
    /// The HTTP request failed or returned an error status
    #[error("request for {key} failed: {reason}")]
    Http { key: String, reason: String },

    /// A local logo file could not be read
    #[error("cannot read {key}: {reason}")]
    Io { key: String, reason: String },

    /// The payload is not a decodable image
    #[error("cannot decode {key}: {reason}")]
    Decode { key: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parser::ParseError;

    #[test]
    fn test_file_not_found_error() {
        let error = AppError::FileNotFound {
            path: PathBuf::from("/path/to/guide.json"),
        };
        assert!(error.supports_retry());
        assert_eq!(error.dialog_title(), "File Not Found");
        assert!(error.brief_description().contains("guide.json"));
        assert!(error.file_path().is_some());
    }

    #[test]
    fn test_invalid_listings_error() {
        let error = AppError::InvalidListings {
            path: Some(PathBuf::from("/path/to/guide.json")),
            message: "Invalid JSON".to_string(),
            line: Some(10),
            column: Some(5),
        };
        assert!(!error.supports_retry());
        assert_eq!(error.dialog_title(), "Invalid Listings");
        let details = error.detailed_info();
        assert!(details.contains("Line: 10"));
        assert!(details.contains("Column: 5"));
    }

    #[test]
    fn test_from_io_error_not_found() {
        let path = PathBuf::from("/test/guide.json");
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        match from_io_error(path.clone(), io_error) {
            AppError::FileNotFound { path: p } => assert_eq!(p, path),
            other => panic!("Expected FileNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_io_error_permission_denied() {
        let path = PathBuf::from("/test/guide.json");
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        match from_io_error(path, io_error) {
            AppError::FileReadError { reason, .. } => assert!(reason.contains("Permission")),
            other => panic!("Expected FileReadError error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_parse_error_keeps_json_position() {
        let json_error = serde_json::from_str::<serde_json::Value>("{\n  oops\n}").unwrap_err();
        let error = from_parse_error(None, &ParseError::JsonSyntax(json_error));
        match error {
            AppError::InvalidListings { line, .. } => assert_eq!(line, Some(2)),
            other => panic!("Expected InvalidListings, got {:?}", other),
        }
    }

    #[test]
    fn test_from_parse_error_version() {
        let error = from_parse_error(None, &ParseError::UnsupportedVersion { version: 7 });
        assert!(matches!(
            error,
            AppError::UnsupportedVersion {
                found: 7,
                supported: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_logo_fetch_error_message() {
        let error = LogoFetchError::Decode {
            key: "logo.png".to_string(),
            reason: "truncated".to_string(),
        };
        assert_eq!(error.to_string(), "cannot decode logo.png: truncated");
    }
}
