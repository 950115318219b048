//! Session configuration.

use serde::Deserialize;

/// What happens when an attribute is redeclared with an explicit type that
/// differs from its existing explicit type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedeclarePolicy {
    /// Record a conflict error and skip the redeclaration.
    #[default]
    Reject,
    /// The later type replaces the earlier one.
    Override,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    pub redeclaration: RedeclarePolicy,
}

impl SessionConfig {
    pub fn from_json(src: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(src)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let config = SessionConfig::from_json("{}").unwrap();
        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.redeclaration, RedeclarePolicy::Reject);
    }

    #[test]
    fn override_policy_parses() {
        let config = SessionConfig::from_json(r#"{"redeclaration": "override"}"#).unwrap();
        assert_eq!(config.redeclaration, RedeclarePolicy::Override);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(SessionConfig::from_json(r#"{"strict": true}"#).is_err());
        assert!(SessionConfig::from_json(r#"{"redeclaration": "merge"}"#).is_err());
    }
}
