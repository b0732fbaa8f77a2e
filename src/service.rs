//! Rule test invocations
//!
//! Implements the request/response contract of the "test rule" endpoint:
//! `{ rule_id | template, value }` in, `{ success, normalized_value,
//! original_value, error }` out. A response with `success = false` and no
//! `error` means the value did not match and could not be filled; `error`
//! is set only for malformed templates and invalid requests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::matcher::CompiledTemplate;
use crate::normalize::{FillOptions, Normalized};
use crate::rules::{RuleId, RuleStore};
use crate::{compile, NormalizeError};

/// A request to test a value against a stored rule or an ad-hoc template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRequest {
    #[serde(default)]
    pub rule_id: Option<RuleId>,
    #[serde(default)]
    pub template: Option<String>,
    pub value: String,
}

impl TestRequest {
    pub fn for_rule(rule_id: RuleId, value: impl Into<String>) -> Self {
        Self {
            rule_id: Some(rule_id),
            template: None,
            value: value.into(),
        }
    }

    pub fn for_template(template: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            rule_id: None,
            template: Some(template.into()),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResponse {
    pub success: bool,
    pub normalized_value: Option<String>,
    pub original_value: String,
    pub error: Option<String>,
}

impl TestResponse {
    pub fn from_normalized(original: impl Into<String>, normalized: Normalized) -> Self {
        Self {
            success: normalized.is_complete(),
            normalized_value: Some(normalized.into_value()),
            original_value: original.into(),
            error: None,
        }
    }

    pub fn error(original: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            normalized_value: None,
            original_value: original.into(),
            error: Some(message.into()),
        }
    }
}

/// Entries a [`TemplateCache`] holds before it starts over
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Compiled templates keyed by source text
///
/// Compiling is a pure function of the source, so entries never go stale.
/// The cache is cleared when a new template arrives while it is full.
#[derive(Debug)]
pub struct TemplateCache {
    entries: Mutex<HashMap<String, Arc<CompiledTemplate>>>,
    capacity: usize,
}

impl Default for TemplateCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache holding at most `capacity` templates (at least one)
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Return the cached matcher for `source`, compiling it on first use
    pub fn get_or_compile(&self, source: &str) -> Result<Arc<CompiledTemplate>, NormalizeError> {
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(hit) = entries.get(source) {
            tracing::trace!(template = source, "template cache hit");
            return Ok(Arc::clone(hit));
        }
        let compiled = Arc::new(compile(source)?);
        if entries.len() >= self.capacity {
            tracing::debug!(capacity = self.capacity, "template cache full, clearing");
            entries.clear();
        }
        entries.insert(source.to_string(), Arc::clone(&compiled));
        Ok(compiled)
    }

    pub fn len(&self) -> usize {
        match self.entries.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handles test requests against a rule store
#[derive(Debug)]
pub struct RuleTester<S> {
    store: S,
    cache: TemplateCache,
    options: FillOptions,
}

impl<S: RuleStore> RuleTester<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            cache: TemplateCache::new(),
            options: FillOptions::default(),
        }
    }

    /// Replace the template cache, e.g. to change its capacity
    pub fn with_cache(mut self, cache: TemplateCache) -> Self {
        self.cache = cache;
        self
    }

    /// Set the fill options used for values that do not match verbatim
    pub fn with_options(mut self, options: FillOptions) -> Self {
        self.options = options;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn cache(&self) -> &TemplateCache {
        &self.cache
    }

    /// Test one value
    pub fn handle(&self, request: &TestRequest) -> TestResponse {
        let source = match self.resolve_template(request) {
            Ok(source) => source,
            Err(message) => return TestResponse::error(&request.value, message),
        };
        match self.cache.get_or_compile(&source) {
            Ok(compiled) => {
                let normalized = compiled.normalize(&request.value, &self.options);
                TestResponse::from_normalized(&request.value, normalized)
            }
            Err(e) => TestResponse::error(&request.value, e.to_string()),
        }
    }

    /// Test one value given as a JSON request body, answering with JSON
    pub fn handle_json(&self, body: &str) -> Result<String, serde_json::Error> {
        let response = match serde_json::from_str::<TestRequest>(body) {
            Ok(request) => self.handle(&request),
            Err(e) => TestResponse::error("", format!("invalid request: {}", e)),
        };
        serde_json::to_string(&response)
    }

    fn resolve_template(&self, request: &TestRequest) -> Result<String, String> {
        match (request.rule_id, &request.template) {
            (Some(id), None) => {
                let rule = self
                    .store
                    .get(id)
                    .ok_or_else(|| format!("rule not found: {}", id))?;
                if !rule.is_active {
                    return Err(format!("rule {} is inactive", rule.name));
                }
                Ok(rule.template)
            }
            (None, Some(template)) => Ok(template.clone()),
            (Some(_), Some(_)) => Err("invalid request: give either rule_id or template, not both".into()),
            (None, None) => Err("invalid request: rule_id or template is required".into()),
        }
    }
}
