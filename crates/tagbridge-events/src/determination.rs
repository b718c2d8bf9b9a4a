use tagbridge_objects::{ObjectError, Value};

/// A script's returned value, parsed once before any handler sees it.
///
/// The wire form stays textual: `none` is the default sentinel, and text
/// starting with `KIND:` selects a named override mode.
#[derive(Debug, Clone, PartialEq)]
pub enum Determination {
    /// No override
    Default,
    /// `KIND:payload`, kind lower-cased
    Tagged { kind: String, payload: String },
    /// Anything else; meaning is event-specific
    Plain(Value),
}

impl Determination {
    pub fn parse(value: &Value) -> Self {
        let Value::Element(element) = value else {
            return Determination::Plain(value.clone());
        };
        let text = element.as_str().trim();
        if text.is_empty() || text.eq_ignore_ascii_case("none") {
            return Determination::Default;
        }
        match text.split_once(':') {
            Some((kind, payload))
                if !kind.is_empty()
                    && kind.chars().all(|c| c.is_ascii_alphabetic() || c == '_') =>
            {
                Determination::Tagged {
                    kind: kind.to_ascii_lowercase(),
                    payload: payload.to_string(),
                }
            }
            _ => Determination::Plain(value.clone()),
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Determination::Default)
    }

    /// The plain text of a `Plain` element determination, lower-cased
    pub fn plain_text_lower(&self) -> Option<String> {
        match self {
            Determination::Plain(Value::Element(element)) => Some(element.to_lowercase()),
            _ => None,
        }
    }
}

impl From<&Value> for Determination {
    fn from(value: &Value) -> Self {
        Self::parse(value)
    }
}

/// A determination that was recognised but could not be applied
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DeterminationError {
    #[error("invalid '{kind}' determination: element '{element}' is not valid: {source}")]
    MalformedPayload {
        kind: String,
        element: String,
        #[source]
        source: ObjectError,
    },
    #[error("invalid '{kind}' determination: '{payload}' is not a valid value")]
    InvalidValue { kind: String, payload: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagbridge_objects::{ListTag, Value};

    #[test]
    fn test_default_sentinel() {
        assert!(Determination::parse(&Value::element("NONE")).is_default());
        assert!(Determination::parse(&Value::element("")).is_default());
    }

    #[test]
    fn test_tagged_prefix_is_case_insensitive() {
        assert_eq!(
            Determination::parse(&Value::element("LOOT:diamond|Diamond")),
            Determination::Tagged {
                kind: "loot".into(),
                payload: "diamond|Diamond".into()
            }
        );
    }

    #[test]
    fn test_plain_values() {
        let list = Value::List(ListTag::from_iter(["loot:x"]));
        assert_eq!(Determination::parse(&list), Determination::Plain(list.clone()));

        let text = Value::element("Cancelled");
        assert_eq!(
            Determination::parse(&text).plain_text_lower().as_deref(),
            Some("cancelled")
        );

        let odd = Value::element("1:2");
        assert_eq!(Determination::parse(&odd), Determination::Plain(odd.clone()));
    }
}
