//! Rule options and their schema.
//!
//! The rule accepts either a boolean shorthand or an object:
//!
//! ```json
//! {
//!   "sync": false,
//!   "sassOptions": "./config/sass",
//!   "checkUndefinedFunctions": true,
//!   "disallowedKnownCssFunctions": ["rem"],
//!   "additionalKnownCssFunctions": ["theme"]
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::OptionsError;

/// Where the compiler options come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SassOptionsValue {
    /// Module specifier resolved from the nearest package root
    Module(String),
    /// Options given inline
    Inline(Map<String, Value>),
}

impl Default for SassOptionsValue {
    fn default() -> Self {
        Self::Inline(Map::new())
    }
}

/// Compiler execution strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// Non-blocking; renderers run concurrently
    #[default]
    Async,
    /// Blocking; renderers run one after another
    Sync,
}

/// Options for the undefined-function renderer.
///
/// The serialized form doubles as part of the renderer cache key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UndefinedFunctionsOptions {
    /// Known CSS functions that are reported anyway
    pub disallowed_known_css_functions: Vec<String>,
    /// Functions treated as known; wins over the disallow list
    pub additional_known_css_functions: Vec<String>,
}

impl UndefinedFunctionsOptions {
    /// Stable string form used to key memoized renderers
    pub fn cache_key(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Parsed rule options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RuleOptions {
    #[serde(default)]
    pub sync: bool,
    #[serde(default)]
    pub sass_options: SassOptionsValue,
    #[serde(default)]
    pub check_undefined_functions: bool,
    #[serde(default)]
    pub disallowed_known_css_functions: Vec<String>,
    #[serde(default)]
    pub additional_known_css_functions: Vec<String>,
}

impl RuleOptions {
    /// Validate a raw options value.
    ///
    /// Returns `Ok(None)` when the rule is switched off (`false` or `null`).
    pub fn parse(value: &Value) -> Result<Option<Self>, OptionsError> {
        match value {
            Value::Null | Value::Bool(false) => Ok(None),
            Value::Bool(true) => Ok(Some(Self::default())),
            Value::Object(_) => Ok(Some(serde_json::from_value(value.clone())?)),
            other => Err(OptionsError::UnexpectedType(json_kind(other))),
        }
    }

    #[inline]
    pub fn render_mode(&self) -> RenderMode {
        if self.sync {
            RenderMode::Sync
        } else {
            RenderMode::Async
        }
    }

    /// Options for the undefined-function renderer, when the check is on
    pub fn undefined_functions(&self) -> Option<UndefinedFunctionsOptions> {
        self.check_undefined_functions
            .then(|| UndefinedFunctionsOptions {
                disallowed_known_css_functions: self.disallowed_known_css_functions.clone(),
                additional_known_css_functions: self.additional_known_css_functions.clone(),
            })
    }
}

/// Human-readable name of a JSON value's type
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// JSON Schema for the rule options.
pub const RULE_OPTIONS_SCHEMA: &str = r#"{
  "$schema": "http://json-schema.org/draft-07/schema#",
  "title": "plugin/sass-render-errors options",
  "oneOf": [
    { "type": "boolean" },
    {
      "type": "object",
      "additionalProperties": false,
      "properties": {
        "checkUndefinedFunctions": {
          "type": "boolean",
          "description": "Report calls to functions that are neither Sass, CSS nor allow-listed"
        },
        "disallowedKnownCssFunctions": {
          "type": "array",
          "items": { "type": "string" },
          "description": "Known CSS functions to report as undefined"
        },
        "additionalKnownCssFunctions": {
          "type": "array",
          "items": { "type": "string" },
          "description": "Functions to treat as known, overriding the disallow list"
        },
        "sync": {
          "type": "boolean",
          "description": "Run the compiler in blocking mode"
        },
        "sassOptions": {
          "oneOf": [{ "type": "string" }, { "type": "object" }],
          "description": "Inline compiler options, or a module path providing them"
        }
      }
    }
  ]
}"#;
