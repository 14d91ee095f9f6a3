//! Per-exchange audit context: a small, typed map of diagnostic fields populated as a
//! request moves through the middleware chain. Keyed by a closed enum rather than a string,
//! since the set of fields the pipeline ever writes is fixed ahead of time.

use serde_json::Value;
use std::collections::HashMap;

/// The fixed set of fields the middleware chain is known to populate over the lifetime of
/// one exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditKey {
    /// `"<normalisedPath>@<method>"`, set once the spec-match stage resolves an operation.
    Endpoint,
    Operation,
    ClientId,
    UserId,
    SubjectClaims,
    ScopeClientId,
    AccessClaims,
}

/// Owned per-exchange; never shared across threads or requests. The downstream business
/// handler must not mutate claim-bearing keys once the JWT stage has written them.
#[derive(Debug, Default)]
pub struct AuditContext {
    fields: HashMap<AuditKey, Value>,
}

impl AuditContext {
    pub fn new() -> Self {
        Self {
            fields: HashMap::new(),
        }
    }

    pub fn insert(&mut self, key: AuditKey, value: impl Into<Value>) {
        self.fields.insert(key, value.into());
    }

    pub fn get(&self, key: AuditKey) -> Option<&Value> {
        self.fields.get(&key)
    }

    pub fn get_str(&self, key: AuditKey) -> Option<&str> {
        self.fields.get(&key).and_then(Value::as_str)
    }

    pub fn contains(&self, key: AuditKey) -> bool {
        self.fields.contains_key(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
