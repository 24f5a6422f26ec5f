//! Detection result and merge semantics

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Unordered set of human-readable framework or tool labels
pub type LabelSet = BTreeSet<String>;

/// What the detector learned about a PHP project.
///
/// Serializes to the plugin's context-data shape (`php_detected`, `project_name`, ...).
/// Identity fields are independently present or absent. Label sets and the
/// installed flag are populated by every successful detection, and serialize only
/// when non-empty / true. A parse failure carries none of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionResult {
    #[serde(rename = "php_detected")]
    pub detected: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "version", skip_serializing_if = "Option::is_none")]
    pub declared_version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,

    #[serde(rename = "php_version", skip_serializing_if = "Option::is_none")]
    pub language_version_constraint: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub frameworks: LabelSet,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub testing_tools: LabelSet,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub quality_tools: LabelSet,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub dependencies_installed: bool,

    #[serde(rename = "error", skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<String>,
}

impl DetectionResult {
    /// A detected project whose manifest could not be decoded.
    pub fn parse_failure(message: impl Into<String>) -> Self {
        Self {
            detected: true,
            parse_error: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn is_parse_failure(&self) -> bool {
        self.parse_error.is_some()
    }

    /// Tool labels: testing tools followed by quality tools.
    pub fn tools(&self) -> impl Iterator<Item = &str> {
        self.testing_tools
            .iter()
            .chain(self.quality_tools.iter())
            .map(String::as_str)
    }

    /// Shallow, right-biased overwrite: every field `newer` carries replaces the one
    /// in `self`. Identity fields `newer` lacks are kept from `self`. Label sets are
    /// replaced wholesale, never unioned, so a newer result without frameworks
    /// drops the older frameworks. A newer parse failure carries no sets and no
    /// installed flag, so those stay as `self` had them.
    pub fn merge(self, newer: DetectionResult) -> DetectionResult {
        let (frameworks, testing_tools, quality_tools, dependencies_installed) =
            if newer.is_parse_failure() {
                (
                    self.frameworks,
                    self.testing_tools,
                    self.quality_tools,
                    self.dependencies_installed,
                )
            } else {
                (
                    newer.frameworks,
                    newer.testing_tools,
                    newer.quality_tools,
                    newer.dependencies_installed,
                )
            };

        DetectionResult {
            detected: newer.detected,
            project_name: newer.project_name.or(self.project_name),
            description: newer.description.or(self.description),
            declared_version: newer.declared_version.or(self.declared_version),
            project_type: newer.project_type.or(self.project_type),
            language_version_constraint: newer
                .language_version_constraint
                .or(self.language_version_constraint),
            frameworks,
            testing_tools,
            quality_tools,
            dependencies_installed,
            parse_error: newer.parse_error.or(self.parse_error),
        }
    }
}

/// Merge two optional results. An absent operand yields the other one unchanged.
pub fn merge(
    existing: Option<DetectionResult>,
    newer: Option<DetectionResult>,
) -> Option<DetectionResult> {
    match (existing, newer) {
        (None, newer) => newer,
        (existing, None) => existing,
        (Some(existing), Some(newer)) => Some(existing.merge(newer)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn labels(items: &[&str]) -> LabelSet {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_merge_newer_without_frameworks_drops_them() {
        let older = DetectionResult {
            detected: true,
            frameworks: labels(&["Laravel"]),
            ..Default::default()
        };
        let newer = DetectionResult {
            detected: true,
            project_name: Some("x".to_string()),
            ..Default::default()
        };

        let merged = merge(Some(older), Some(newer)).unwrap();
        assert_eq!(merged.project_name.as_deref(), Some("x"));
        assert!(merged.frameworks.is_empty());
        assert_eq!(
            serde_json::to_value(&merged).unwrap(),
            json!({"php_detected": true, "project_name": "x"})
        );
    }

    #[test]
    fn test_merge_keeps_identity_fields_missing_from_newer() {
        let older = DetectionResult {
            detected: true,
            project_name: Some("acme/app".to_string()),
            description: Some("old".to_string()),
            ..Default::default()
        };
        let newer = DetectionResult {
            detected: true,
            description: Some("new".to_string()),
            ..Default::default()
        };

        let merged = older.merge(newer);
        assert_eq!(merged.project_name.as_deref(), Some("acme/app"));
        assert_eq!(merged.description.as_deref(), Some("new"));
    }

    #[test]
    fn test_merge_parse_failure_keeps_older_sets() {
        let older = DetectionResult {
            detected: true,
            project_name: Some("acme/app".to_string()),
            frameworks: labels(&["Laravel"]),
            quality_tools: labels(&["PHPStan"]),
            dependencies_installed: true,
            ..Default::default()
        };

        let merged = older.merge(DetectionResult::parse_failure("bad"));
        assert_eq!(merged.frameworks, labels(&["Laravel"]));
        assert_eq!(merged.quality_tools, labels(&["PHPStan"]));
        assert!(merged.dependencies_installed);
        assert_eq!(merged.project_name.as_deref(), Some("acme/app"));
        assert_eq!(merged.parse_error.as_deref(), Some("bad"));
    }

    #[test]
    fn test_merge_with_absent() {
        let result = DetectionResult {
            detected: true,
            project_name: Some("acme/app".to_string()),
            ..Default::default()
        };

        assert_eq!(merge(Some(result.clone()), None), Some(result.clone()));
        assert_eq!(merge(None, Some(result.clone())), Some(result));
        assert_eq!(merge(None, None), None);
    }

    #[test]
    fn test_parse_failure_shape() {
        let result = DetectionResult::parse_failure("failed to parse composer.json");
        assert!(result.detected);
        assert!(result.is_parse_failure());
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"php_detected": true, "error": "failed to parse composer.json"})
        );
    }

    #[test]
    fn test_deserialize_wire_form() {
        let result: DetectionResult = serde_json::from_value(json!({
            "php_detected": true,
            "project_name": "acme/app",
            "php_version": "^8.2",
            "frameworks": ["Laravel"],
            "dependencies_installed": true
        }))
        .unwrap();

        assert_eq!(result.language_version_constraint.as_deref(), Some("^8.2"));
        assert_eq!(result.frameworks, labels(&["Laravel"]));
        assert!(result.dependencies_installed);
        assert!(result.testing_tools.is_empty());
    }
}
