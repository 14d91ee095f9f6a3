//! Matches a normalised request path against the set of path templates declared in a spec,
//! picking the most specific one when more than one shape could apply.

use crate::path::NormalisedPath;
use crate::PATH_SEPARATOR;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
enum TemplateSegment {
    Literal(String),
    Parameter(String),
}

/// A spec path such as `/pets/{petId}`, split into segments plus its original text (needed
/// to look the operation back up in the spec document).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    text: String,
    segments: Vec<TemplateSegment>,
}

impl PathTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let segments = text
            .split(PATH_SEPARATOR)
            .map(|segment| {
                if segment.starts_with('{') && segment.ends_with('}') && segment.len() >= 2 {
                    TemplateSegment::Parameter(segment[1..segment.len() - 1].to_string())
                } else {
                    TemplateSegment::Literal(segment.to_string())
                }
            })
            .collect();
        Self { text, segments }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn literal_segment_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|segment| matches!(segment, TemplateSegment::Literal(_)))
            .count()
    }

    fn matches(&self, request_parts: &[String]) -> bool {
        if self.segments.len() != request_parts.len() {
            return false;
        }
        self.segments
            .iter()
            .zip(request_parts)
            .all(|(template_segment, request_segment)| match template_segment {
                TemplateSegment::Literal(literal) => literal == request_segment,
                TemplateSegment::Parameter(_) => !request_segment.is_empty(),
            })
    }
}

/// The full set of templates declared for one HTTP method, ready to be matched against a
/// normalised request path.
#[derive(Debug, Default)]
pub struct PathRouter {
    templates: Vec<PathTemplate>,
}

impl PathRouter {
    pub fn new() -> Self {
        Self {
            templates: Vec::new(),
        }
    }

    pub fn add_template(&mut self, template: PathTemplate) {
        if !self.templates.iter().any(|t| t.text == template.text) {
            self.templates.push(template);
        }
    }

    /// Finds the most specific template matching the normalised path's parts. Ties are broken
    /// by the greatest literal-segment count, then by lexicographic comparison of the original
    /// template text.
    pub fn find_matching_api_path(&self, path: &NormalisedPath) -> Option<&PathTemplate> {
        self.templates
            .iter()
            .filter(|template| template.matches(path.parts()))
            .max_by(|a, b| {
                a.literal_segment_count()
                    .cmp(&b.literal_segment_count())
                    .then_with(|| b.text.cmp(&a.text))
            })
    }

    /// Extracts `{name: value}` pairs for every parameter segment of `template`, percent-decoding
    /// each captured value (falling back to the raw segment, logged at info, on decode failure).
    pub fn capture_params(
        template: &PathTemplate,
        path: &NormalisedPath,
    ) -> HashMap<String, String> {
        let mut captured = HashMap::new();
        for (index, segment) in template.segments.iter().enumerate() {
            if let TemplateSegment::Parameter(name) = segment {
                if let Some(raw) = path.part(index) {
                    let decoded = percent_encoding::percent_decode_str(raw)
                        .decode_utf8()
                        .map(|decoded| decoded.into_owned())
                        .unwrap_or_else(|_| {
                            log::info!(
                                "Path parameter '{}' value '{}' is not valid UTF-8 after percent-decoding; using raw segment.",
                                name, raw
                            );
                            raw.to_string()
                        });
                    captured.insert(name.clone(), decoded);
                }
            }
        }
        captured
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn router(templates: &[&str]) -> PathRouter {
        let mut router = PathRouter::new();
        for template in templates {
            router.add_template(PathTemplate::new(*template));
        }
        router
    }

    #[test]
    fn matches_totality_for_parameterized_template() {
        let router = router(&["/pets/{petId}"]);
        let path = NormalisedPath::new("/pets/42", "");
        let matched = router.find_matching_api_path(&path).unwrap();
        assert_eq!(matched.text(), "/pets/{petId}");
    }

    #[test]
    fn literal_template_wins_over_parameter_template() {
        let router = router(&["/a/b", "/a/{x}"]);
        let path = NormalisedPath::new("/a/b", "");
        let matched = router.find_matching_api_path(&path).unwrap();
        assert_eq!(matched.text(), "/a/b");
    }

    #[test]
    fn part_count_must_match() {
        let router = router(&["/pets/{petId}"]);
        let path = NormalisedPath::new("/pets/42/toys", "");
        assert!(router.find_matching_api_path(&path).is_none());
    }

    #[test]
    fn ties_break_lexicographically_on_template_text() {
        let router = router(&["/a/{x}", "/{y}/b"]);
        let path = NormalisedPath::new("/a/b", "");
        let matched = router.find_matching_api_path(&path).unwrap();
        // both have one literal segment; the tie-break picks the lexicographically
        // smaller original template text.
        assert_eq!(matched.text(), "/a/{x}");
    }

    #[test]
    fn captures_percent_decoded_path_params() {
        let template = PathTemplate::new("/pets/{petId}");
        let path = NormalisedPath::new("/pets/red%20fox", "");
        let captured = PathRouter::capture_params(&template, &path);
        assert_eq!(captured.get("petId"), Some(&"red fox".to_string()));
    }

    #[test]
    fn empty_parameter_segment_does_not_match() {
        let router = router(&["/pets/{petId}"]);
        let path = NormalisedPath::new("/pets/", "");
        assert!(router.find_matching_api_path(&path).is_none());
    }
}
