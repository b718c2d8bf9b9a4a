use std::collections::HashMap;

use crate::params::{ParameterSpec, Role};

/// Error building a [`CommandRegistration`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    #[error("argument counts are inverted: required {required} > maximum {maximum}")]
    InvalidArgumentCounts { required: usize, maximum: usize },
    #[error("parameter '{0}' is declared more than once")]
    DuplicateParameter(String),
    #[error("only one linear parameter is allowed, found '{first}' and '{second}'")]
    MultipleLinear { first: String, second: String },
    #[error("linear parameter '{linear}' must come after positional parameter '{positional}'")]
    LinearNotLast { linear: String, positional: String },
    #[error("synonym '{synonym}' points at '{parameter}', which is not a prefixed or flag parameter")]
    UnknownSynonymTarget { synonym: String, parameter: String },
    #[error("synonym '{0}' collides with another parameter or synonym")]
    SynonymConflict(String),
}

/// Everything the binder needs to know about a command
#[derive(Debug, Clone)]
pub struct CommandRegistration {
    name: String,
    syntax: String,
    required_args: usize,
    maximum_args: usize,
    parameters: Vec<ParameterSpec>,
    synonyms: HashMap<String, String>,
    allow_unknown_prefixes: bool,
}

impl CommandRegistration {
    pub fn builder(name: impl Into<String>) -> CommandRegistrationBuilder {
        CommandRegistrationBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable usage line
    pub fn syntax(&self) -> &str {
        &self.syntax
    }

    pub fn required_args(&self) -> usize {
        self.required_args
    }

    pub fn maximum_args(&self) -> usize {
        self.maximum_args
    }

    /// Parameters in declaration order
    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name() == name)
    }

    pub fn allows_unknown_prefixes(&self) -> bool {
        self.allow_unknown_prefixes
    }

    /// Resolve a written name (any case, synonyms folded) to a parameter
    /// with the given role
    pub fn resolve(&self, written: &str, role: Role) -> Option<&ParameterSpec> {
        let lower = written.to_lowercase();
        let canonical = self.synonyms.get(&lower).unwrap_or(&lower);
        self.parameter(canonical).filter(|p| p.role() == role)
    }
}

/// Builder for [`CommandRegistration`]
pub struct CommandRegistrationBuilder {
    name: String,
    syntax: Option<String>,
    required_args: usize,
    maximum_args: usize,
    parameters: Vec<ParameterSpec>,
    remaps: Vec<(String, String)>,
    allow_unknown_prefixes: bool,
}

impl CommandRegistrationBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_lowercase(),
            syntax: None,
            required_args: 0,
            maximum_args: usize::MAX,
            parameters: Vec::new(),
            remaps: Vec::new(),
            allow_unknown_prefixes: false,
        }
    }

    pub fn syntax(mut self, syntax: impl Into<String>) -> Self {
        self.syntax = Some(syntax.into());
        self
    }

    /// Aggregate token count bounds, checked before any parameter binds
    pub fn arguments(mut self, required: usize, maximum: usize) -> Self {
        self.required_args = required;
        self.maximum_args = maximum;
        self
    }

    pub fn parameter(mut self, spec: ParameterSpec) -> Self {
        self.parameters.push(spec);
        self
    }

    /// Fold alternative prefix names onto one parameter, e.g.
    /// `remap("targets", &["target", "t"])`
    pub fn remap(mut self, parameter: &str, synonyms: &[&str]) -> Self {
        for synonym in synonyms {
            self.remaps
                .push((synonym.to_lowercase(), parameter.to_lowercase()));
        }
        self
    }

    /// Treat `name:value` tokens with unknown names as positional text
    pub fn allow_unknown_prefixes(mut self) -> Self {
        self.allow_unknown_prefixes = true;
        self
    }

    pub fn build(self) -> Result<CommandRegistration, RegistrationError> {
        if self.required_args > self.maximum_args {
            return Err(RegistrationError::InvalidArgumentCounts {
                required: self.required_args,
                maximum: self.maximum_args,
            });
        }

        let mut linear: Option<&ParameterSpec> = None;
        for (index, spec) in self.parameters.iter().enumerate() {
            if self.parameters[..index]
                .iter()
                .any(|p| p.name() == spec.name())
            {
                return Err(RegistrationError::DuplicateParameter(spec.name().to_string()));
            }
            match (spec.role(), linear) {
                (Role::Linear, Some(first)) => {
                    return Err(RegistrationError::MultipleLinear {
                        first: first.name().to_string(),
                        second: spec.name().to_string(),
                    });
                }
                (Role::Linear, None) => linear = Some(spec),
                (Role::Positional, Some(first)) => {
                    return Err(RegistrationError::LinearNotLast {
                        linear: first.name().to_string(),
                        positional: spec.name().to_string(),
                    });
                }
                _ => {}
            }
        }

        let mut synonyms = HashMap::new();
        for (synonym, parameter) in self.remaps {
            let target_ok = self
                .parameters
                .iter()
                .any(|p| p.name() == parameter && matches!(p.role(), Role::Prefixed | Role::Flag));
            if !target_ok {
                return Err(RegistrationError::UnknownSynonymTarget { synonym, parameter });
            }
            if self.parameters.iter().any(|p| p.name() == synonym)
                || synonyms.contains_key(&synonym)
            {
                return Err(RegistrationError::SynonymConflict(synonym));
            }
            synonyms.insert(synonym, parameter);
        }

        let syntax = self.syntax.unwrap_or_else(|| self.name.clone());
        Ok(CommandRegistration {
            name: self.name,
            syntax,
            required_args: self.required_args,
            maximum_args: self.maximum_args,
            parameters: self.parameters,
            synonyms,
            allow_unknown_prefixes: self.allow_unknown_prefixes,
        })
    }
}
