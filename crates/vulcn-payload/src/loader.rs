//! Load a `PayloadSet` from a YAML fixture file. Not part of the scan
//! surface itself (authoring format is out of scope per spec.md's
//! Non-goals) — this exists purely so tests can keep payload fixtures in
//! data files instead of inline Rust literals.

use serde::Deserialize;
use std::path::Path;

use vulcn_types::{Category, PayloadSet, VulcnError};

#[derive(Deserialize)]
struct PayloadSetFile {
    name: String,
    category: String,
    description: String,
    payloads: Vec<String>,
    #[serde(default)]
    detect_patterns: Vec<String>,
}

fn parse_category(raw: &str) -> Category {
    match raw {
        "xss" => Category::Xss,
        "sqli" => Category::Sqli,
        "command-injection" => Category::CommandInjection,
        "path-traversal" => Category::PathTraversal,
        "open-redirect" => Category::OpenRedirect,
        "xxe" => Category::Xxe,
        other => Category::Custom(other.to_string()),
    }
}

pub fn load_from_yaml_str(source: &str, origin: &str) -> Result<PayloadSet, VulcnError> {
    let parsed: PayloadSetFile =
        serde_yaml::from_str(source).map_err(|e| VulcnError::new(format!("invalid payload set yaml: {e}")))?;
    PayloadSet::new(
        parsed.name,
        parse_category(&parsed.category),
        parsed.description,
        parsed.payloads,
        parsed.detect_patterns,
        origin,
    )
}

pub fn load_from_file(path: &Path) -> Result<PayloadSet, VulcnError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| VulcnError::new(format!("failed to read {}: {e}", path.display())))?;
    load_from_yaml_str(&content, &path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_minimal_payload_set() {
        let yaml = r#"
name: test-xss
category: xss
description: test fixture
payloads:
  - "<script>alert(1)</script>"
detect_patterns:
  - "alert\\(1\\)"
"#;
        let set = load_from_yaml_str(yaml, "inline").unwrap();
        assert_eq!(set.name, "test-xss");
        assert_eq!(set.payloads.len(), 1);
        assert!(set.matches("alert(1)"));
    }
}
