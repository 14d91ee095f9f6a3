use crate::error::ValidationErrorType;
use crate::validator::OpenApiPayloadValidator;
use dashmap::{DashMap, Entry, VacantEntry};
use serde_json::{Error, Value};
use std::fmt::{Display, Formatter};
use std::hash::Hash;
use std::path::Path;
use std::sync::{Arc, OnceLock};

static GLOBAL_CACHE: OnceLock<ValidatorCollection<String>> = OnceLock::new();
pub fn global_validator_cache() -> &'static ValidatorCollection<String> {
    GLOBAL_CACHE.get_or_init(ValidatorCollection::new)
}

/// Error types for cache operations
#[derive(Debug)]
pub enum CacheError {
    /// The validator with the specified ID was not found in the cache
    ValidatorNotFound,
    /// The validator with the specified ID already exists in the cache
    ValidatorAlreadyExists,
    /// Attempted to create a new validator but failed.
    FailedToCreateValidator(ValidationErrorType),
    /// The specification file could not be read from disk.
    FailedToReadFile(String),
    /// The specification could not be serialized to a `Value`.
    FailedToSerializeSpec(String),
}

impl Display for CacheError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheError::ValidatorNotFound => write!(f, "Validator not found in cache"),
            CacheError::ValidatorAlreadyExists => write!(f, "Validator already exists in cache"),
            CacheError::FailedToCreateValidator(err) => {
                write!(f, "Failed to create new validator: {}", err)
            }
            CacheError::FailedToReadFile(err) => {
                write!(f, "Failed to read specification file: {}", err)
            }
            CacheError::FailedToSerializeSpec(err) => {
                write!(f, "Failed to serialize specification: {}", err)
            }
        }
    }
}

impl std::error::Error for CacheError {}

pub struct ValidatorCollection<K> {
    cache: DashMap<K, Arc<OpenApiPayloadValidator>>,
}

impl<K> ValidatorCollection<K>
where
    K: Hash + Eq,
{
    pub fn new() -> Self {
        ValidatorCollection {
            cache: DashMap::new(),
        }
    }

    pub fn insert_from_file_path<P>(
        &self,
        id: K,
        file_path: P,
    ) -> Result<Arc<OpenApiPayloadValidator>, CacheError>
    where
        P: AsRef<Path>,
    {
        let path = file_path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| CacheError::FailedToReadFile(e.to_string()))?;
        let content: Value = crate::spec_index::parse_spec_document(&content)
            .map_err(|e| CacheError::FailedToSerializeSpec(e.to_string()))?;
        self.insert(id, content)
    }

    pub fn insert<V>(&self, id: K, spec: V) -> Result<Arc<OpenApiPayloadValidator>, CacheError>
    where
        V: serde::Serialize,
    {
        match self.cache.entry(id) {
            Entry::Occupied(_) => Err(CacheError::ValidatorAlreadyExists),
            Entry::Vacant(entry) => Self::create_validator(entry, spec),
        }
    }

    fn create_validator<V>(
        entry: VacantEntry<K, Arc<OpenApiPayloadValidator>>,
        spec: V,
    ) -> Result<Arc<OpenApiPayloadValidator>, CacheError>
    where
        V: serde::Serialize,
    {
        let spec = serde_json::to_value(spec)
            .map_err(|e| CacheError::FailedToSerializeSpec(e.to_string()))?;
        match OpenApiPayloadValidator::new(spec) {
            Ok(validator) => {
                let validator = Arc::new(validator);
                entry.insert(validator.clone());
                Ok(validator)
            }
            Err(e) => Err(CacheError::FailedToCreateValidator(e)),
        }
    }

    pub fn get(&self, id: &K) -> Result<Arc<OpenApiPayloadValidator>, CacheError> {
        match self.cache.get(id) {
            Some(validator) => Ok(Arc::clone(validator.value())),
            None => Err(CacheError::ValidatorNotFound),
        }
    }

    pub fn remove(&self, id: &K) -> Result<(), CacheError> {
        if self.cache.remove(id).is_none() {
            return Err(CacheError::ValidatorNotFound);
        }
        Ok(())
    }

    pub fn contains(&self, id: &K) -> bool {
        self.cache.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn clear(&self) {
        self.cache.clear();
        log::debug!("Cleared validator cache");
    }
}
