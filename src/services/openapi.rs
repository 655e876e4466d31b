//! OpenAPI document context for the Schemathesis report.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::{info, warn};

/// Operation keys of an OpenAPI path item.
const HTTP_METHODS: [&str; 8] = [
    "get", "post", "put", "delete", "patch", "head", "options", "trace",
];

/// Placeholder substituted for concrete identifiers.
const ID_PLACEHOLDER: &str = "{id}";

static NUMERIC_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("valid numeric segment regex"));

static UUID_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .expect("valid uuid segment regex")
});

/// Load an OpenAPI JSON document.
///
/// A missing or unparseable document is not fatal: the report is rendered
/// without the OpenAPI context.
pub fn load_openapi_spec(path: &Path) -> Option<Value> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => {
            warn!("OpenAPI spec not found: {}", path.display());
            return None;
        }
    };

    match serde_json::from_str(&content) {
        Ok(spec) => Some(spec),
        Err(e) => {
            warn!("Could not parse OpenAPI spec {}: {}", path.display(), e);
            None
        }
    }
}

/// Documented HTTP methods per path template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenApiIndex {
    paths: BTreeMap<String, Vec<String>>,
}

impl OpenApiIndex {
    /// Build the index from a parsed document's `paths` mapping.
    /// Paths without any recognised operation are left out.
    pub fn from_spec(spec: &Value) -> Self {
        let mut paths = BTreeMap::new();

        if let Some(items) = spec.get("paths").and_then(Value::as_object) {
            for (path, item) in items {
                let Some(operations) = item.as_object() else {
                    continue;
                };
                let methods: Vec<String> = operations
                    .keys()
                    .filter(|key| HTTP_METHODS.contains(&key.to_lowercase().as_str()))
                    .map(|key| key.to_uppercase())
                    .collect();
                if !methods.is_empty() {
                    paths.insert(path.clone(), methods);
                }
            }
        }

        Self { paths }
    }

    /// Load and index a document in one step.
    pub fn load(path: &Path) -> Option<Self> {
        let index = Self::from_spec(&load_openapi_spec(path)?);
        if index.is_empty() {
            return None;
        }
        info!("Loaded OpenAPI spec: {} paths", index.path_count());
        Some(index)
    }

    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Number of paths documenting each method, sorted by method name.
    pub fn method_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for method in self.paths.values().flatten() {
            *counts.entry(method.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// True when some path template matches the endpoint's path.
    pub fn documents_endpoint(&self, endpoint: &str) -> bool {
        let path = normalize_path(endpoint);
        self.paths
            .keys()
            .any(|template| template_matches(template, &path))
    }

    /// Distinct endpoints whose path no template matches, sorted.
    pub fn undocumented<'a>(&self, endpoints: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
        let mut missing: Vec<&str> = endpoints
            .into_iter()
            .filter(|e| !self.documents_endpoint(e))
            .collect();
        missing.sort_unstable();
        missing.dedup();
        missing
    }
}

/// Strip the method prefix and replace numeric and UUID segments with `{id}`.
///
/// `GET /trials/123` becomes `/trials/{id}`.
pub fn normalize_path(endpoint: &str) -> String {
    let path = endpoint
        .split_once(' ')
        .map(|(_, path)| path)
        .unwrap_or(endpoint);
    path.split('/')
        .map(|segment| {
            if NUMERIC_SEGMENT.is_match(segment) || UUID_SEGMENT.is_match(segment) {
                ID_PLACEHOLDER
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn is_placeholder(segment: &str) -> bool {
    segment.starts_with('{') && segment.ends_with('}')
}

/// Segment-wise match where `{...}` on either side matches any segment.
fn template_matches(template: &str, path: &str) -> bool {
    let template: Vec<&str> = template.trim_end_matches('/').split('/').collect();
    let path: Vec<&str> = path.trim_end_matches('/').split('/').collect();

    template.len() == path.len()
        && template
            .iter()
            .zip(&path)
            .all(|(t, p)| t == p || is_placeholder(t) || is_placeholder(p))
}
