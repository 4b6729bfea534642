//! The `PayloadSet` data model (spec.md §3). Regexes compile once, at
//! construction time, so a malformed pattern fails fast instead of panicking
//! mid-scan.

use regex::Regex;

use crate::error::VulcnError;

#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Category {
    Xss,
    Sqli,
    CommandInjection,
    PathTraversal,
    OpenRedirect,
    Xxe,
    Custom(String),
}

impl Category {
    /// CWE id/name pair used to enrich findings (spec §4.6).
    pub fn cwe(&self) -> Option<(u32, &'static str)> {
        match self {
            Category::Xss => Some((79, "Improper Neutralization of Input During Web Page Generation")),
            Category::Sqli => Some((89, "Improper Neutralization of Special Elements used in an SQL Command")),
            Category::CommandInjection => Some((78, "Improper Neutralization of Special Elements used in an OS Command")),
            Category::PathTraversal => Some((22, "Improper Limitation of a Pathname to a Restricted Directory")),
            Category::OpenRedirect => Some((601, "URL Redirection to Untrusted Site")),
            Category::Xxe => Some((611, "Improper Restriction of XML External Entity Reference")),
            Category::Custom(_) => None,
        }
    }
}

pub struct PayloadSet {
    pub name: String,
    pub category: Category,
    pub description: String,
    pub payloads: Vec<String>,
    pub detect_patterns: Vec<Regex>,
    pub source: String,
}

impl std::fmt::Debug for PayloadSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayloadSet")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("payloads", &self.payloads.len())
            .field("detect_patterns", &self.detect_patterns.len())
            .finish()
    }
}

impl PayloadSet {
    pub fn new(
        name: impl Into<String>,
        category: Category,
        description: impl Into<String>,
        payloads: Vec<String>,
        detect_patterns: Vec<String>,
        source: impl Into<String>,
    ) -> Result<Self, VulcnError> {
        let name = name.into();
        if payloads.is_empty() {
            return Err(VulcnError::new(format!("payload set '{name}' has no payloads")));
        }
        let compiled = detect_patterns
            .iter()
            .map(|p| Regex::new(p).map_err(|e| VulcnError::new(format!("invalid detect_pattern '{p}': {e}"))))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name,
            category,
            description: description.into(),
            payloads,
            detect_patterns: compiled,
            source: source.into(),
        })
    }

    /// True if any compiled detect pattern matches `body`.
    pub fn matches(&self, body: &str) -> bool {
        self.detect_patterns.iter().any(|re| re.is_match(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_patterns_at_construction() {
        let set = PayloadSet::new(
            "sql-error",
            Category::Sqli,
            "classic SQL error strings",
            vec!["' OR '1'='1".to_string()],
            vec![r"you have an error in your sql syntax".to_string()],
            "builtin",
        )
        .unwrap();
        assert!(set.matches("You have an error in your SQL syntax near".to_lowercase().as_str()));
    }

    #[test]
    fn rejects_invalid_pattern() {
        let err = PayloadSet::new(
            "bad",
            Category::Xss,
            "broken",
            vec!["<script>".to_string()],
            vec!["(unclosed".to_string()],
            "builtin",
        );
        assert!(err.is_err());
    }

    #[test]
    fn rejects_empty_payload_list() {
        let err = PayloadSet::new("empty", Category::Xss, "no payloads", vec![], vec![], "builtin");
        assert!(err.is_err());
    }
}
