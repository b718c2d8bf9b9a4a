use std::fmt;

use crate::{ObjectError, ObjectTag, Value, ValueKind, World};

/// Plain scalar text with numeric and boolean coercions
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ElementTag(String);

impl ElementTag {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_lowercase(&self) -> String {
        self.0.to_lowercase()
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.0.trim().parse().ok()
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.0.trim().parse::<f64>().ok().filter(|v| v.is_finite())
    }

    /// `true` / `false`, case-insensitive
    pub fn as_bool(&self) -> Option<bool> {
        match self.0.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    pub fn is_int(&self) -> bool {
        self.as_i64().is_some()
    }

    pub fn is_decimal(&self) -> bool {
        self.as_f64().is_some()
    }

    pub fn is_bool(&self) -> bool {
        self.as_bool().is_some()
    }
}

impl ObjectTag for ElementTag {
    const KIND: ValueKind = ValueKind::Element;

    fn identify(&self) -> String {
        self.0.clone()
    }

    fn value_of(text: &str, _world: &dyn World) -> Result<Self, ObjectError> {
        Ok(Self::new(text))
    }

    fn into_value(self) -> Value {
        Value::Element(self)
    }
}

impl fmt::Display for ElementTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementTag {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ElementTag {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<bool> for ElementTag {
    fn from(value: bool) -> Self {
        Self(value.to_string())
    }
}

impl From<i64> for ElementTag {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl From<f64> for ElementTag {
    fn from(value: f64) -> Self {
        Self(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_coercions() {
        assert_eq!(ElementTag::new(" 42 ").as_i64(), Some(42));
        assert_eq!(ElementTag::new("-1").as_f64(), Some(-1.0));
        assert_eq!(ElementTag::new("2.5").as_i64(), None);
        assert!(ElementTag::new("2.5").is_decimal());
        assert!(!ElementTag::new("NaN").is_decimal());
        assert!(!ElementTag::new("chest").is_int());
    }

    #[test]
    fn test_boolean_coercion_is_case_insensitive() {
        assert_eq!(ElementTag::new("TRUE").as_bool(), Some(true));
        assert_eq!(ElementTag::new("False").as_bool(), Some(false));
        assert_eq!(ElementTag::new("yes").as_bool(), None);
    }

    #[test]
    fn test_from_scalars() {
        assert_eq!(ElementTag::from(true).as_str(), "true");
        assert_eq!(ElementTag::from(5.0).as_str(), "5");
        assert_eq!(ElementTag::from(-3i64).as_str(), "-3");
    }
}
