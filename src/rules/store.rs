//! Rule persistence interface and an in-memory implementation

use std::collections::BTreeMap;

use thiserror::Error;

use crate::error::MalformedTemplate;
use crate::matcher::CompiledTemplate;
use crate::rules::model::{NewRule, NormalizationRule, RuleId, RuleUpdate};

/// Errors that can occur during rule operations
#[derive(Debug, Error)]
pub enum RuleError {
    /// No rule with this id
    #[error("rule not found: {id}")]
    NotFound { id: RuleId },

    /// Another rule already uses this name
    #[error("duplicate rule name: {name}")]
    DuplicateName { name: String },

    /// A required field is empty
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    /// The rule's template does not parse
    #[error("rule {name} has a malformed template: {}", crate::format_malformed(.errors))]
    Malformed {
        name: String,
        errors: Vec<MalformedTemplate>,
    },

    /// The compiled pattern was refused by the regex engine
    #[error("rule {name} has an unusable pattern: {source}")]
    Pattern {
        name: String,
        source: regex::Error,
    },
}

/// Persistence collaborator for normalization rules
///
/// Implementations compile the template on `create` and on any `update`
/// that changes it, so a malformed template is never stored and
/// `regex_pattern` always reflects the current template.
pub trait RuleStore {
    fn list(&self) -> Vec<NormalizationRule>;

    fn get(&self, id: RuleId) -> Option<NormalizationRule>;

    fn find_by_name(&self, name: &str) -> Option<NormalizationRule> {
        self.list().into_iter().find(|r| r.name == name)
    }

    fn create(&mut self, rule: NewRule) -> Result<NormalizationRule, RuleError>;

    fn update(&mut self, id: RuleId, update: RuleUpdate) -> Result<NormalizationRule, RuleError>;

    fn delete(&mut self, id: RuleId) -> Result<NormalizationRule, RuleError>;
}

/// Compile a rule's template and return its derived pattern
pub fn derive_pattern(name: &str, template: &str) -> Result<String, RuleError> {
    let parsed = crate::parse(template).map_err(|errors| RuleError::Malformed {
        name: name.to_string(),
        errors,
    })?;
    let compiled = CompiledTemplate::compile(parsed).map_err(|source| RuleError::Pattern {
        name: name.to_string(),
        source,
    })?;
    Ok(compiled.pattern().to_string())
}

fn required(value: &str, field: &'static str) -> Result<(), RuleError> {
    if value.trim().is_empty() {
        Err(RuleError::MissingField { field })
    } else {
        Ok(())
    }
}

/// Rule store kept in memory, ordered by id
#[derive(Debug, Default)]
pub struct InMemoryRuleStore {
    rules: BTreeMap<RuleId, NormalizationRule>,
    next_id: RuleId,
}

impl InMemoryRuleStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn name_taken(&self, name: &str, except: Option<RuleId>) -> bool {
        self.rules
            .values()
            .any(|r| r.name == name && Some(r.id) != except)
    }
}

impl RuleStore for InMemoryRuleStore {
    fn list(&self) -> Vec<NormalizationRule> {
        self.rules.values().cloned().collect()
    }

    fn get(&self, id: RuleId) -> Option<NormalizationRule> {
        self.rules.get(&id).cloned()
    }

    fn create(&mut self, rule: NewRule) -> Result<NormalizationRule, RuleError> {
        required(&rule.name, "name")?;
        required(&rule.template, "template")?;
        if self.name_taken(&rule.name, None) {
            return Err(RuleError::DuplicateName { name: rule.name });
        }
        let regex_pattern = derive_pattern(&rule.name, &rule.template)?;

        self.next_id += 1;
        let stored = NormalizationRule {
            id: self.next_id,
            name: rule.name,
            description: rule.description,
            template: rule.template,
            example_input: rule.example_input,
            example_output: rule.example_output,
            is_active: rule.is_active,
            regex_pattern,
        };
        tracing::info!(id = stored.id, name = %stored.name, "created rule");
        self.rules.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn update(&mut self, id: RuleId, update: RuleUpdate) -> Result<NormalizationRule, RuleError> {
        let current = self.rules.get(&id).ok_or(RuleError::NotFound { id })?;
        let mut next = current.clone();

        if let Some(name) = update.name {
            required(&name, "name")?;
            if self.name_taken(&name, Some(id)) {
                return Err(RuleError::DuplicateName { name });
            }
            next.name = name;
        }
        if let Some(template) = update.template {
            required(&template, "template")?;
            next.regex_pattern = derive_pattern(&next.name, &template)?;
            next.template = template;
        }
        if let Some(description) = update.description {
            next.description = description;
        }
        if let Some(input) = update.example_input {
            next.example_input = input;
        }
        if let Some(output) = update.example_output {
            next.example_output = output;
        }
        if let Some(is_active) = update.is_active {
            next.is_active = is_active;
        }

        tracing::info!(id, name = %next.name, "updated rule");
        self.rules.insert(id, next.clone());
        Ok(next)
    }

    fn delete(&mut self, id: RuleId) -> Result<NormalizationRule, RuleError> {
        let removed = self.rules.remove(&id).ok_or(RuleError::NotFound { id })?;
        tracing::info!(id, name = %removed.name, "deleted rule");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Reason;

    fn store_with_cpf() -> (InMemoryRuleStore, NormalizationRule) {
        let mut store = InMemoryRuleStore::new();
        let rule = store
            .create(
                NewRule::new("cpf", "{d3}.{d3}.{d3}-{d2}")
                    .with_description("Brazilian individual taxpayer id")
                    .with_example("12345678901", "123.456.789-01"),
            )
            .unwrap();
        (store, rule)
    }

    #[test]
    fn test_create_derives_pattern() {
        let (store, rule) = store_with_cpf();
        assert_eq!(rule.id, 1);
        assert!(rule.is_active);
        assert!(rule.regex_pattern.starts_with('^'));
        assert!(rule.regex_pattern.ends_with('$'));
        assert_eq!(store.get(1), Some(rule));
    }

    #[test]
    fn test_create_rejects_malformed_template() {
        let mut store = InMemoryRuleStore::new();
        let err = store.create(NewRule::new("bad", "{d:upper}")).unwrap_err();
        match err {
            RuleError::Malformed { name, errors } => {
                assert_eq!(name, "bad");
                assert_eq!(errors[0].reason, Reason::CaseOnDigit);
            }
            other => panic!("expected malformed rule, got {other:?}"),
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_create_requires_name_and_template() {
        let mut store = InMemoryRuleStore::new();
        assert!(matches!(
            store.create(NewRule::new("", "{d}")),
            Err(RuleError::MissingField { field: "name" })
        ));
        assert!(matches!(
            store.create(NewRule::new("x", "  ")),
            Err(RuleError::MissingField { field: "template" })
        ));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let (mut store, _) = store_with_cpf();
        assert!(matches!(
            store.create(NewRule::new("cpf", "{d11}")),
            Err(RuleError::DuplicateName { .. })
        ));
    }

    #[test]
    fn test_update_recompiles_template() {
        let (mut store, rule) = store_with_cpf();
        let updated = store
            .update(rule.id, RuleUpdate::template("{d11}"))
            .unwrap();
        assert_eq!(updated.template, "{d11}");
        assert_eq!(updated.regex_pattern, "^([0-9]{11})$");
        assert_eq!(updated.description, rule.description);
    }

    #[test]
    fn test_update_clears_optional_fields() {
        let (mut store, rule) = store_with_cpf();
        let updated = store
            .update(rule.id, RuleUpdate::default().with_description(None))
            .unwrap();
        assert_eq!(updated.description, None);
        assert_eq!(updated.example_input.as_deref(), Some("12345678901"));

        let updated = store
            .update(rule.id, RuleUpdate::default().with_example(None, None))
            .unwrap();
        assert_eq!(updated.example_input, None);
        assert_eq!(updated.example_output, None);
        assert_eq!(store.get(rule.id), Some(updated));
    }

    #[test]
    fn test_update_with_malformed_template_keeps_old_rule() {
        let (mut store, rule) = store_with_cpf();
        assert!(store.update(rule.id, RuleUpdate::template("{d3")).is_err());
        assert_eq!(store.get(rule.id), Some(rule));
    }

    #[test]
    fn test_soft_disable() {
        let (mut store, rule) = store_with_cpf();
        let updated = store.update(rule.id, RuleUpdate::active(false)).unwrap();
        assert!(!updated.is_active);
        assert_eq!(updated.regex_pattern, rule.regex_pattern);
    }

    #[test]
    fn test_rename_to_taken_name() {
        let (mut store, _) = store_with_cpf();
        let cep = store.create(NewRule::new("cep", "{d5}-{d3}")).unwrap();
        let update = RuleUpdate {
            name: Some("cpf".into()),
            ..RuleUpdate::default()
        };
        assert!(matches!(
            store.update(cep.id, update),
            Err(RuleError::DuplicateName { .. })
        ));
    }

    #[test]
    fn test_delete() {
        let (mut store, rule) = store_with_cpf();
        assert_eq!(store.delete(rule.id).unwrap().name, "cpf");
        assert!(store.get(rule.id).is_none());
        assert!(matches!(
            store.delete(rule.id),
            Err(RuleError::NotFound { id: 1 })
        ));
    }

    #[test]
    fn test_list_and_find_by_name() {
        let (mut store, _) = store_with_cpf();
        store.create(NewRule::new("cep", "{d5}-{d3}")).unwrap();
        let names: Vec<_> = store.list().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["cpf", "cep"]);
        assert_eq!(store.find_by_name("cep").map(|r| r.id), Some(2));
    }
}
