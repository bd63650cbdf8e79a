//! Compiler Configuration

use serde::{Deserialize, Serialize};

/// Shape of the emitted CSS text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStyle {
    /// One declaration per line, nested blocks indented
    #[default]
    Pretty,
    /// One line per top-level block: `.a { display: flex; }`
    Compact,
    /// No optional whitespace: `.a{display:flex}`
    Minified,
}

/// Compiler configuration options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Output formatting
    pub output: OutputStyle,

    /// Spaces per nesting level in pretty output
    pub indent_width: usize,

    /// Fail when one selector sets the same variable to two values
    pub reject_conflicting_vars: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            output: OutputStyle::Pretty,
            indent_width: 2,
            reject_conflicting_vars: true,
        }
    }
}

impl CompilerConfig {
    pub fn with_output(mut self, output: OutputStyle) -> Self {
        self.output = output;
        self
    }

    /// Load from JSON; missing fields keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
