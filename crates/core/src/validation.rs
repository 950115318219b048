//! Validation definitions and the declarations that attach them.
//!
//! Constructors check their own arguments and nothing else. Whether a rule
//! makes sense for the attribute's type (a range on a string, say) is left to
//! whatever consumes the finished tree.

use crate::error::{DslError, Provenance};
use crate::session::Session;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("enum requires at least one allowed value")]
    EmptyEnum,

    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("range bound must be finite, got {0}")]
    NonFiniteBound(f64),

    #[error("range minimum {min} is greater than maximum {max}")]
    InvertedRange { min: f64, max: f64 },

    #[error("length minimum {min} is greater than maximum {max}")]
    InvertedLength { min: usize, max: usize },

    #[error("required needs at least one attribute name")]
    EmptyRequired,

    #[error("required attribute names must not be empty")]
    EmptyRequiredName,

    #[error("unknown format '{0}'")]
    UnknownFormat(String),
}

/// Well-known string formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    DateTime,
    Email,
    Hostname,
    Ipv4,
    Ipv6,
    Uri,
    Mac,
    Cidr,
    Regexp,
}

impl Format {
    pub fn as_str(self) -> &'static str {
        match self {
            Format::DateTime => "date-time",
            Format::Email => "email",
            Format::Hostname => "hostname",
            Format::Ipv4 => "ipv4",
            Format::Ipv6 => "ipv6",
            Format::Uri => "uri",
            Format::Mac => "mac",
            Format::Cidr => "cidr",
            Format::Regexp => "regexp",
        }
    }
}

impl FromStr for Format {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "date-time" => Format::DateTime,
            "email" => Format::Email,
            "hostname" => Format::Hostname,
            "ipv4" => Format::Ipv4,
            "ipv6" => Format::Ipv6,
            "uri" => Format::Uri,
            "mac" => Format::Mac,
            "cidr" => Format::Cidr,
            "regexp" => Format::Regexp,
            other => return Err(ValidationError::UnknownFormat(other.to_owned())),
        })
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A constraint a downstream validator checks against actual data.
#[derive(Debug, Clone, PartialEq)]
pub enum Validation {
    Enum { values: Vec<Value> },
    Format(Format),
    Pattern { regex: String },
    /// Numeric bounds, inclusive.
    Range { min: Option<f64>, max: Option<f64> },
    /// String or collection length bounds, inclusive.
    Length { min: Option<usize>, max: Option<usize> },
    /// Child attributes that must be present.
    Required { names: Vec<String> },
}

impl Validation {
    pub fn enumeration<I, V>(values: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Err(ValidationError::EmptyEnum);
        }
        Ok(Validation::Enum { values })
    }

    pub fn format(name: &str) -> Result<Self, ValidationError> {
        name.parse().map(Validation::Format)
    }

    pub fn pattern(regex: &str) -> Result<Self, ValidationError> {
        regex::Regex::new(regex).map_err(|source| ValidationError::InvalidPattern {
            pattern: regex.to_owned(),
            source,
        })?;
        Ok(Validation::Pattern {
            regex: regex.to_owned(),
        })
    }

    pub fn range(min: f64, max: f64) -> Result<Self, ValidationError> {
        let min = finite(min)?;
        let max = finite(max)?;
        if min > max {
            return Err(ValidationError::InvertedRange { min, max });
        }
        Ok(Validation::Range {
            min: Some(min),
            max: Some(max),
        })
    }

    pub fn minimum(min: f64) -> Result<Self, ValidationError> {
        Ok(Validation::Range {
            min: Some(finite(min)?),
            max: None,
        })
    }

    pub fn maximum(max: f64) -> Result<Self, ValidationError> {
        Ok(Validation::Range {
            min: None,
            max: Some(finite(max)?),
        })
    }

    pub fn length(min: usize, max: usize) -> Result<Self, ValidationError> {
        if min > max {
            return Err(ValidationError::InvertedLength { min, max });
        }
        Ok(Validation::Length {
            min: Some(min),
            max: Some(max),
        })
    }

    pub fn min_length(min: usize) -> Self {
        Validation::Length {
            min: Some(min),
            max: None,
        }
    }

    pub fn max_length(max: usize) -> Self {
        Validation::Length {
            min: None,
            max: Some(max),
        }
    }

    pub fn required<I, S>(names: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(ValidationError::EmptyRequired);
        }
        if names.iter().any(String::is_empty) {
            return Err(ValidationError::EmptyRequiredName);
        }
        Ok(Validation::Required { names })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Validation::Enum { .. } => "enum",
            Validation::Format(_) => "format",
            Validation::Pattern { .. } => "pattern",
            Validation::Range { .. } => "range",
            Validation::Length { .. } => "length",
            Validation::Required { .. } => "required",
        }
    }
}

fn finite(bound: f64) -> Result<f64, ValidationError> {
    if bound.is_finite() {
        Ok(bound)
    } else {
        Err(ValidationError::NonFiniteBound(bound))
    }
}

// ── Declarations ──────────────────────────────────────────────────────────────

impl Session {
    /// Allowed values, in order.
    #[track_caller]
    pub fn enumeration<I, V>(&mut self, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.attach("enum", Validation::enumeration(values));
    }

    #[track_caller]
    pub fn format(&mut self, name: &str) {
        self.attach("format", Validation::format(name));
    }

    #[track_caller]
    pub fn pattern(&mut self, regex: &str) {
        self.attach("pattern", Validation::pattern(regex));
    }

    #[track_caller]
    pub fn range(&mut self, min: f64, max: f64) {
        self.attach("range", Validation::range(min, max));
    }

    #[track_caller]
    pub fn minimum(&mut self, min: f64) {
        self.attach("minimum", Validation::minimum(min));
    }

    #[track_caller]
    pub fn maximum(&mut self, max: f64) {
        self.attach("maximum", Validation::maximum(max));
    }

    #[track_caller]
    pub fn length(&mut self, min: usize, max: usize) {
        self.attach("length", Validation::length(min, max));
    }

    #[track_caller]
    pub fn min_length(&mut self, min: usize) {
        self.attach("min_length", Ok(Validation::min_length(min)));
    }

    #[track_caller]
    pub fn max_length(&mut self, max: usize) {
        self.attach("max_length", Ok(Validation::max_length(max)));
    }

    #[track_caller]
    pub fn required<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attach("required", Validation::required(names));
    }

    /// Append to the open definition. A failed construction appends nothing.
    #[track_caller]
    fn attach(&mut self, name: &str, built: Result<Validation, ValidationError>) {
        let location = Provenance::caller();
        let target = self.current().map(ToString::to_string).unwrap_or_default();
        let outcome = match self.current_definition_mut() {
            Err(e) => Err(e),
            Ok(def) => match built {
                Ok(validation) => {
                    def.push_validation(validation);
                    Ok(())
                }
                Err(e) => Err(DslError::validation(format!("{} on {}: {}", name, target, e))),
            },
        };
        match outcome {
            Ok(()) => tracing::debug!(validation = name, target = %target, "attached validation"),
            Err(e) => self.record(e.at(location)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn enum_keeps_value_order() {
        let v = Validation::enumeration(["one", "two"]).unwrap();
        assert_eq!(
            v,
            Validation::Enum {
                values: vec![json!("one"), json!("two")]
            }
        );
        assert_eq!(v.kind(), "enum");
    }

    #[test]
    fn enum_accepts_mixed_values() {
        let v = Validation::enumeration(vec![json!(1), json!("x"), json!(null)]).unwrap();
        assert!(matches!(v, Validation::Enum { values } if values.len() == 3));
    }

    #[test]
    fn empty_enum_is_rejected() {
        let err = Validation::enumeration(Vec::<Value>::new()).unwrap_err();
        assert!(matches!(err, ValidationError::EmptyEnum));
    }

    #[test]
    fn pattern_must_compile() {
        assert!(Validation::pattern("^[a-z]+$").is_ok());
        let err = Validation::pattern("([a-z]").unwrap_err();
        assert!(err.to_string().starts_with("invalid pattern '([a-z]'"));
    }

    #[test]
    fn range_bounds() {
        assert_eq!(
            Validation::range(1.0, 10.0).unwrap(),
            Validation::Range {
                min: Some(1.0),
                max: Some(10.0)
            }
        );
        assert!(Validation::range(5.0, 5.0).is_ok());
        assert!(matches!(
            Validation::range(10.0, 1.0),
            Err(ValidationError::InvertedRange { .. })
        ));
        assert!(matches!(
            Validation::minimum(f64::NAN),
            Err(ValidationError::NonFiniteBound(_))
        ));
        assert_eq!(
            Validation::maximum(3.5).unwrap(),
            Validation::Range {
                min: None,
                max: Some(3.5)
            }
        );
    }

    #[test]
    fn length_bounds() {
        assert!(Validation::length(1, 3).is_ok());
        assert!(matches!(
            Validation::length(4, 3),
            Err(ValidationError::InvertedLength { min: 4, max: 3 })
        ));
        assert_eq!(
            Validation::min_length(2),
            Validation::Length {
                min: Some(2),
                max: None
            }
        );
    }

    #[test]
    fn required_names() {
        assert_eq!(
            Validation::required(["id", "name"]).unwrap(),
            Validation::Required {
                names: vec!["id".to_string(), "name".to_string()]
            }
        );
        assert!(matches!(
            Validation::required(Vec::<String>::new()),
            Err(ValidationError::EmptyRequired)
        ));
        assert!(matches!(
            Validation::required(["id", ""]),
            Err(ValidationError::EmptyRequiredName)
        ));
    }

    #[test]
    fn formats_parse_by_name() {
        assert_eq!(
            Validation::format("email").unwrap(),
            Validation::Format(Format::Email)
        );
        for name in ["date-time", "hostname", "ipv4", "ipv6", "uri", "mac", "cidr", "regexp"] {
            let f: Format = name.parse().unwrap();
            assert_eq!(f.to_string(), name);
        }
        assert!(matches!(
            Validation::format("phone"),
            Err(ValidationError::UnknownFormat(name)) if name == "phone"
        ));
    }
}
