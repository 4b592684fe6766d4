//! Forced value types for options read from the environment
//!
//! By default an environment override is type-inferred (`"42"` becomes an
//! integer, `"yes"` a boolean). A schema pins individual options to one type
//! so that inference cannot guess wrong, e.g. a numeric password that must
//! stay a string, or a port that must fail loudly when it is not a number.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::value::ValueType;

/// Mapping from option name to the type it is forced to
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    types: HashMap<String, ValueType>,
}

impl Schema {
    /// Create an empty schema (every option is type-inferred)
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration of a forced type
    pub fn with_type(mut self, option: impl Into<String>, ty: ValueType) -> Self {
        self.insert(option, ty);
        self
    }

    /// Register a forced type for an option, replacing any previous one
    pub fn insert(&mut self, option: impl Into<String>, ty: ValueType) {
        self.types.insert(option.into(), ty);
    }

    /// The forced type for an option, if any
    pub fn forced_type(&self, option: &str) -> Option<ValueType> {
        self.types.get(option).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Load a schema from a JSON object such as `{"REDIS_PORT": "int"}`
    pub fn from_json(json: &str) -> Result<Self> {
        let types: HashMap<String, ValueType> = serde_json::from_str(json)
            .map_err(|e| Error::syntax(format!("Invalid type schema: {}", e)))?;
        Ok(Self { types })
    }

    /// Load a schema from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| Error::io(path.display().to_string(), &e))?;
        Self::from_json(&content)
    }
}

impl<K: Into<String>> FromIterator<(K, ValueType)> for Schema {
    fn from_iter<I: IntoIterator<Item = (K, ValueType)>>(iter: I) -> Self {
        Self {
            types: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
