//! Interpreter configuration

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Options for [`crate::Interpreter`]
///
/// Loadable from JSON; missing fields take their defaults.
///
/// ```
/// use quoll::InterpreterConfig;
///
/// let config = InterpreterConfig::from_json(r#"{"strict_syntax": false}"#).unwrap();
/// assert!(!config.strict_syntax);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterConfig {
    /// Refuse to evaluate a document that has syntax errors
    ///
    /// When false, the well-formed forms are evaluated and the first
    /// `SyntaxError` node reached fails with `CannotEvaluate`.
    pub strict_syntax: bool,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        InterpreterConfig {
            strict_syntax: true,
        }
    }
}

impl InterpreterConfig {
    /// Parses a JSON configuration document
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::ConfigError(e.to_string()))
    }

    /// Serializes the configuration as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::ConfigError(e.to_string()))
    }
}
