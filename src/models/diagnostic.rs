//! Diagnostic model shared by the parser, binder and checker

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

use super::message::{MessageKey, message};
use super::source::{Location, Range};

/// A recoverable problem found in a document
///
/// Diagnostics are immutable once created; builders consume `self`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub message: String,
    pub range: Range,
    pub severity: ErrorSeverity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<DiagnosticInfo>,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>, range: Range, severity: ErrorSeverity) -> Self {
        Self {
            message: message.into(),
            range,
            severity,
            info: None,
        }
    }

    pub fn error(message: impl Into<String>, range: Range) -> Self {
        Self::new(message, range, ErrorSeverity::Error)
    }

    pub fn warning(message: impl Into<String>, range: Range) -> Self {
        Self::new(message, range, ErrorSeverity::Warning)
    }

    /// Build an `Error` diagnostic from the message catalog
    pub fn from_key(key: MessageKey, args: &[&str], range: Range) -> Self {
        Self::error(message(key, args), range)
    }

    pub fn with_severity(mut self, severity: ErrorSeverity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_related(mut self, location: Location, message: impl Into<String>) -> Self {
        self.info
            .get_or_insert_with(DiagnosticInfo::default)
            .related
            .push(DiagnosticRelatedInfo {
                location,
                message: message.into(),
            });
        self
    }

    pub fn with_code_action(mut self, code_action: impl Into<String>) -> Self {
        self.info.get_or_insert_with(DiagnosticInfo::default).code_action =
            Some(code_action.into());
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.info.get_or_insert_with(DiagnosticInfo::default).deprecated = true;
        self
    }

    pub fn unnecessary(mut self) -> Self {
        self.info.get_or_insert_with(DiagnosticInfo::default).unnecessary = true;
        self
    }

    pub fn related(&self) -> &[DiagnosticRelatedInfo] {
        self.info
            .as_ref()
            .map(|info| info.related.as_slice())
            .unwrap_or_default()
    }

    pub fn is_error(&self) -> bool {
        self.severity == ErrorSeverity::Error
    }
}

/// Severity levels, ordered from least to most severe
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize_repr, Deserialize_repr,
)]
#[repr(u8)]
pub enum ErrorSeverity {
    Hint = 0,
    Information = 1,
    Warning = 2,
    Error = 3,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Information => write!(f, "info"),
            Self::Hint => write!(f, "hint"),
        }
    }
}

impl std::str::FromStr for ErrorSeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" | "e" => Ok(Self::Error),
            "warning" | "warn" | "w" => Ok(Self::Warning),
            "info" | "information" | "i" => Ok(Self::Information),
            "hint" | "h" => Ok(Self::Hint),
            _ => Err(format!(
                "Unknown severity: '{}'. Valid: error, warning, info, hint",
                s
            )),
        }
    }
}

/// Optional metadata attached to a diagnostic
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_action: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unnecessary: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<DiagnosticRelatedInfo>,
}

/// Related diagnostic information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticRelatedInfo {
    pub location: Location,
    pub message: String,
}
