use std::fmt;

use crate::DeclarationError;
use crate::switch::SwitchMatcher;

/// Where a declaration came from, for error reporting
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScriptLocation {
    pub script: String,
    pub line: u32,
}

impl ScriptLocation {
    pub fn new(script: impl Into<String>, line: u32) -> Self {
        Self {
            script: script.into(),
            line,
        }
    }
}

impl fmt::Display for ScriptLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "script '{}' line {}", self.script, self.line)
    }
}

/// A named switch on a declaration, e.g. `for:chest`
#[derive(Debug, Clone)]
pub struct Switch {
    name: String,
    raw: String,
    matcher: SwitchMatcher,
}

impl Switch {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The value as written in the script
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, value: &str) -> bool {
        self.matcher.matches(value)
    }
}

/// A script-authored trigger pattern such as
/// `on loot generates for:chest in:vault`.
///
/// Built once when the script loads and immutable afterwards, so it can be
/// shared across dispatch threads.
#[derive(Debug, Clone)]
pub struct TriggerDeclaration {
    raw: String,
    event_lower: String,
    switches: Vec<Switch>,
    ignore_cancelled: bool,
    source: ScriptLocation,
}

impl TriggerDeclaration {
    /// Parse an event line. Words of the form `name:value` are switches,
    /// every other word is part of the event name.
    pub fn parse(line: &str, source: ScriptLocation) -> Result<Self, DeclarationError> {
        let trimmed = line.trim();
        let mut words = trimmed.split_whitespace().peekable();
        if words
            .peek()
            .is_some_and(|first| first.eq_ignore_ascii_case("on"))
        {
            words.next();
        }

        let mut name_words = Vec::new();
        let mut switches: Vec<Switch> = Vec::new();
        let mut ignore_cancelled = false;

        for word in words {
            let Some((name, value)) = split_switch(word) else {
                name_words.push(word.to_lowercase());
                continue;
            };
            if switches.iter().any(|s| s.name == name)
                || (name == "ignorecancelled" && ignore_cancelled)
            {
                return Err(DeclarationError::DuplicateSwitch(name));
            }
            if name == "ignorecancelled" {
                ignore_cancelled = match value.to_ascii_lowercase().as_str() {
                    "true" => true,
                    "false" => false,
                    _ => {
                        return Err(DeclarationError::InvalidSwitch {
                            name,
                            value: value.to_string(),
                        });
                    }
                };
                continue;
            }
            switches.push(Switch {
                matcher: SwitchMatcher::compile(value)?,
                raw: value.to_string(),
                name,
            });
        }

        if name_words.is_empty() {
            return Err(DeclarationError::MissingEventName(trimmed.to_string()));
        }

        Ok(Self {
            raw: trimmed.to_string(),
            event_lower: name_words.join(" "),
            switches,
            ignore_cancelled,
            source,
        })
    }

    /// The line as written
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Normalized event name: lower-case, no leading `on`, no switches
    pub fn event_lower(&self) -> &str {
        &self.event_lower
    }

    /// Switches in declared order
    pub fn switches(&self) -> impl Iterator<Item = &Switch> {
        self.switches.iter()
    }

    pub fn switch(&self, name: &str) -> Option<&Switch> {
        self.switches.iter().find(|s| s.name == name)
    }

    pub fn has_switch(&self, name: &str) -> bool {
        self.switch(name).is_some()
    }

    /// `ignorecancelled:true` skips events that are already cancelled
    pub fn ignore_cancelled(&self) -> bool {
        self.ignore_cancelled
    }

    pub fn source(&self) -> &ScriptLocation {
        &self.source
    }
}

impl fmt::Display for TriggerDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' ({})", self.raw, self.source)
    }
}

fn split_switch(word: &str) -> Option<(String, &str)> {
    let (name, value) = word.split_once(':')?;
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    Some((name.to_ascii_lowercase(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<TriggerDeclaration, DeclarationError> {
        TriggerDeclaration::parse(line, ScriptLocation::new("test", 1))
    }

    #[test]
    fn test_splits_name_and_switches() {
        let decl = parse("on Loot Generates for:chest in:vault").unwrap();
        assert_eq!(decl.event_lower(), "loot generates");
        let names: Vec<_> = decl.switches().map(|s| s.name()).collect();
        assert_eq!(names, vec!["for", "in"]);
        assert_eq!(decl.switch("in").map(|s| s.raw()), Some("vault"));
        assert!(decl.switch("for").unwrap().matches("CHEST"));
        assert!(!decl.ignore_cancelled());
    }

    #[test]
    fn test_switch_names_are_lower_cased() {
        let decl = parse("loot generates FOR:Chest").unwrap();
        assert!(decl.has_switch("for"));
    }

    #[test]
    fn test_ignorecancelled_is_a_flag() {
        let decl = parse("loot generates ignorecancelled:true").unwrap();
        assert!(decl.ignore_cancelled());
        assert!(!decl.has_switch("ignorecancelled"));

        assert!(matches!(
            parse("loot generates ignorecancelled:maybe"),
            Err(DeclarationError::InvalidSwitch { .. })
        ));
    }

    #[test]
    fn test_rejects_duplicate_switches() {
        assert!(matches!(
            parse("loot generates for:chest for:barrel"),
            Err(DeclarationError::DuplicateSwitch(name)) if name == "for"
        ));
    }

    #[test]
    fn test_rejects_missing_event_name() {
        assert!(matches!(
            parse("on for:chest"),
            Err(DeclarationError::MissingEventName(_))
        ));
    }

    #[test]
    fn test_display_includes_source() {
        let decl =
            TriggerDeclaration::parse("on reload scripts", ScriptLocation::new("boot", 12))
                .unwrap();
        assert_eq!(decl.to_string(), "'on reload scripts' (script 'boot' line 12)");
    }
}
