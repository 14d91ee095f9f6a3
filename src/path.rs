//! Canonicalised request path: base-path stripped, leading slash guaranteed, split into
//! parts that line up index-for-index with a spec path template's segments.

use crate::PATH_SEPARATOR;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalisedPath {
    original: String,
    normalised: String,
    parts: Vec<String>,
}

impl NormalisedPath {
    pub fn new(path: &str, base_path: &str) -> Self {
        let original = path.to_string();

        let stripped = if !base_path.is_empty() && path.starts_with(base_path) {
            &path[base_path.len()..]
        } else {
            path
        };

        let normalised = if stripped.starts_with('/') {
            stripped.to_string()
        } else {
            format!("/{}", stripped)
        };

        let parts = normalised
            .split(PATH_SEPARATOR)
            .map(String::from)
            .collect();

        Self {
            original,
            normalised,
            parts,
        }
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn normalised(&self) -> &str {
        &self.normalised
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    pub fn part(&self, index: usize) -> Option<&str> {
        self.parts.get(index).map(String::as_str)
    }

    pub fn is_param(&self, index: usize) -> bool {
        self.part(index)
            .is_some_and(|segment| segment.starts_with('{') && segment.ends_with('}'))
    }

    pub fn param_name(&self, index: usize) -> Option<&str> {
        self.part(index).and_then(|segment| {
            if segment.starts_with('{') && segment.ends_with('}') {
                Some(&segment[1..segment.len() - 1])
            } else {
                None
            }
        })
    }
}
