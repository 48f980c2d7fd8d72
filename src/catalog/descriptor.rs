//! Lenient view over one dataset descriptor.
//!
//! Descriptors are not schema-checked. The wrapper keeps whatever YAML value
//! the file held (including null or a bare list) and exposes optional typed
//! accessors for the handful of fields the explorer renders.

use serde::Serialize;
use serde_yaml::Value;

/// Literal used in descriptors to say "no image".
const NO_IMAGE_MARKER: &str = "none";

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DatasetDescriptor(Value);

impl DatasetDescriptor {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Only mapping descriptors carry fields; null (empty file), lists and
    /// scalars load fine but every accessor returns `None` for them.
    pub fn is_mapping(&self) -> bool {
        self.0.is_mapping()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.as_mapping()?.get(key)
    }

    pub fn title(&self) -> Option<&str> {
        self.non_empty_str("title")
    }

    pub fn description(&self) -> Option<&str> {
        self.non_empty_str("description")
    }

    pub fn homepage(&self) -> Option<&str> {
        self.non_empty_str("homepage")
    }

    pub fn image(&self) -> Option<&str> {
        self.non_empty_str("image")
            .filter(|image| !image.eq_ignore_ascii_case(NO_IMAGE_MARKER))
    }

    /// Keywords given either as a comma separated string or as a list.
    pub fn keywords(&self) -> Vec<String> {
        match self.get("keywords") {
            Some(Value::String(raw)) => raw
                .split(',')
                .map(str::trim)
                .filter(|kw| !kw.is_empty())
                .map(str::to_string)
                .collect(),
            Some(Value::Sequence(items)) => items
                .iter()
                .filter_map(scalar_text)
                .filter(|kw| !kw.is_empty())
                .collect(),
            Some(other) => scalar_text(other).into_iter().collect(),
            None => Vec::new(),
        }
    }

    /// Headline for pickers and detail views; falls back to the file name.
    pub fn display_title<'a>(&'a self, file_name: &'a str) -> &'a str {
        self.title().unwrap_or(file_name)
    }

    /// Title, Description and Keywords rows, in that order, skipping absent ones.
    pub fn info_rows(&self) -> Vec<(&'static str, String)> {
        let mut rows = Vec::new();
        if let Some(title) = self.title() {
            rows.push(("Title", title.to_string()));
        }
        if let Some(description) = self.description() {
            rows.push(("Description", description.trim().to_string()));
        }
        let keywords = self.keywords();
        if !keywords.is_empty() {
            rows.push(("Keywords", keywords.join(", ")));
        }
        rows
    }

    fn non_empty_str(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

impl Default for DatasetDescriptor {
    fn default() -> Self {
        Self(Value::Null)
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
