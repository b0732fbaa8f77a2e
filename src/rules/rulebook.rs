//! Rule books: TOML files declaring normalization rules and fill settings
//!
//! ```toml
//! [settings]
//! sentinel = "_"
//! leftover = "discard"
//!
//! [[rules]]
//! name = "cep"
//! description = "Brazilian postal code"
//! template = "{d5}-{d3}"
//! example_input = "70000000"
//! example_output = "70000-000"
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::normalize::{FillOptions, LeftoverPolicy};
use crate::rules::model::NewRule;
use crate::rules::store::{InMemoryRuleStore, RuleError, RuleStore};

/// Errors that can occur when loading or parsing rule books
#[derive(Error, Debug)]
pub enum RuleBookError {
    #[error("Failed to read rule book file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse rule book TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid sentinel '{0}': expected a single character")]
    InvalidSentinel(String),
}

/// A set of rule declarations with the fill settings they are tested with
#[derive(Debug, Clone)]
pub struct RuleBook {
    pub settings: FillOptions,
    pub rules: Vec<NewRule>,
}

/// TOML structure for deserializing rule books
#[derive(Deserialize)]
struct TomlRuleBook {
    settings: Option<TomlSettings>,
    #[serde(default)]
    rules: Vec<NewRule>,
}

#[derive(Deserialize)]
struct TomlSettings {
    sentinel: Option<String>,
    leftover: Option<LeftoverPolicy>,
}

/// Built-in rules for common Brazilian document and contact formats
const DEFAULT_RULES: &str = r#"
[[rules]]
name = "cpf"
description = "Individual taxpayer registry number"
template = "{d3}.{d3}.{d3}-{d2}"
example_input = "12345678901"
example_output = "123.456.789-01"

[[rules]]
name = "cnpj"
description = "Company taxpayer registry number"
template = "{d2}.{d3}.{d3}/{d4}-{d2}"
example_input = "12345678000195"
example_output = "12.345.678/0001-95"

[[rules]]
name = "cep"
description = "Postal code"
template = "{d5}-{d3}"
example_input = "70000000"
example_output = "70000-000"

[[rules]]
name = "phone"
description = "Mobile phone number with area code"
template = "({d2}) {d5}-{d4}"
example_input = "61999998888"
example_output = "(61) 99999-8888"

[[rules]]
name = "plate"
description = "Vehicle plate, Mercosur layout"
template = "{l3:upper}{d}{l:upper}{d2}"
example_input = "abc1d23"
example_output = "ABC1D23"
"#;

impl RuleBook {
    /// Load a rule book from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, RuleBookError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load a rule book from a TOML string
    pub fn from_str(content: &str) -> Result<Self, RuleBookError> {
        let parsed: TomlRuleBook = toml::from_str(content)?;

        let mut settings = FillOptions::default();
        if let Some(toml_settings) = parsed.settings {
            if let Some(sentinel) = toml_settings.sentinel {
                let mut chars = sentinel.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => settings.sentinel = c,
                    _ => return Err(RuleBookError::InvalidSentinel(sentinel)),
                }
            }
            if let Some(leftover) = toml_settings.leftover {
                settings.leftover = leftover;
            }
        }

        Ok(RuleBook {
            settings,
            rules: parsed.rules,
        })
    }

    /// Create every rule in `store`, returning the ones that were rejected
    pub fn load_into(&self, store: &mut impl RuleStore) -> Vec<RuleError> {
        let mut rejected = Vec::new();
        for rule in &self.rules {
            if let Err(e) = store.create(rule.clone()) {
                tracing::warn!(rule = %rule.name, error = %e, "skipping rule");
                rejected.push(e);
            }
        }
        rejected
    }

    /// Build an in-memory store from the rule book, skipping invalid rules
    pub fn into_store(self) -> InMemoryRuleStore {
        let mut store = InMemoryRuleStore::new();
        self.load_into(&mut store);
        store
    }
}

impl Default for RuleBook {
    fn default() -> Self {
        Self::from_str(DEFAULT_RULES).expect("Default rules should be valid TOML")
    }
}
