//! Normalization rule records

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier assigned by a [`RuleStore`](super::RuleStore)
pub type RuleId = u64;

/// A stored normalization rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizationRule {
    pub id: RuleId,
    pub name: String,
    pub description: Option<String>,
    /// Template source, e.g. `{d3}.{d3}.{d3}-{d2}`
    pub template: String,
    /// Documentation only; never used for validation
    pub example_input: Option<String>,
    /// Documentation only; never used for validation
    pub example_output: Option<String>,
    pub is_active: bool,
    /// Compiled form of `template`, derived by the store
    pub regex_pattern: String,
}

/// Fields for creating a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRule {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub template: String,
    #[serde(default)]
    pub example_input: Option<String>,
    #[serde(default)]
    pub example_output: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl NewRule {
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            template: template.into(),
            example_input: None,
            example_output: None,
            is_active: true,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_example(mut self, input: impl Into<String>, output: impl Into<String>) -> Self {
        self.example_input = Some(input.into());
        self.example_output = Some(output.into());
        self
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }
}

/// Partial update of a rule; `None` leaves a field unchanged
///
/// The optional text fields take `Some(None)` to clear them. In JSON or TOML
/// a missing key leaves the field alone and an explicit `null` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub example_input: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub example_output: Option<Option<String>>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Keep an explicit `null` apart from a missing key
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl RuleUpdate {
    pub fn template(template: impl Into<String>) -> Self {
        Self {
            template: Some(template.into()),
            ..Self::default()
        }
    }

    pub fn active(is_active: bool) -> Self {
        Self {
            is_active: Some(is_active),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    /// Set or clear both examples
    pub fn with_example(mut self, input: Option<String>, output: Option<String>) -> Self {
        self.example_input = Some(input);
        self.example_output = Some(output);
        self
    }
}
