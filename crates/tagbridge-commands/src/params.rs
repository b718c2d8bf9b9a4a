//! Parameter declarations
//!
//! A command lists its parameters once at registration time. The binder
//! reads these declarations for every invocation; nothing here changes after
//! the command is registered.

use std::fmt;

/// How a parameter is located in the token stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Takes the next unclaimed bare token
    Positional,
    /// Written as `name:value`
    Prefixed,
    /// Takes every remaining bare token, joined with spaces
    Linear,
    /// A bare word equal to the parameter name; binds a boolean
    Flag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Single,
    /// Split with the list text convention (`a|b|c`)
    List,
}

/// Expected element type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Text,
    Integer,
    Decimal,
    Boolean,
    Entity,
    Item,
    Inventory,
    Location,
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArgKind::Text => "text",
            ArgKind::Integer => "integer",
            ArgKind::Decimal => "decimal",
            ArgKind::Boolean => "boolean",
            ArgKind::Entity => "entity",
            ArgKind::Item => "item",
            ArgKind::Inventory => "inventory",
            ArgKind::Location => "location",
        };
        write!(f, "{name}")
    }
}

/// Values computed from the invocation when a parameter is absent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextDefault {
    LinkedPlayer,
    LinkedNpc,
}

/// What happens when a parameter is not supplied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultValue {
    Required,
    /// Left out of the bound arguments
    Null,
    /// Literal text, converted through the parameter's kind at bind time
    Text(String),
    /// Computed from the invocation; left out if the context has nothing
    Context(ContextDefault),
}

/// One declared command parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSpec {
    name: String,
    role: Role,
    cardinality: Cardinality,
    kind: ArgKind,
    default: DefaultValue,
}

impl ParameterSpec {
    fn with_role(name: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into().to_lowercase(),
            role,
            cardinality: Cardinality::Single,
            kind: ArgKind::Text,
            default: DefaultValue::Required,
        }
    }

    pub fn positional(name: impl Into<String>) -> Self {
        Self::with_role(name, Role::Positional)
    }

    pub fn prefixed(name: impl Into<String>) -> Self {
        Self::with_role(name, Role::Prefixed)
    }

    pub fn linear(name: impl Into<String>) -> Self {
        Self::with_role(name, Role::Linear)
    }

    /// A boolean switch word. Absent means `false`.
    pub fn flag(name: impl Into<String>) -> Self {
        Self {
            kind: ArgKind::Boolean,
            default: DefaultValue::Text("false".to_string()),
            ..Self::with_role(name, Role::Flag)
        }
    }

    pub fn kind(mut self, kind: ArgKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn list(mut self) -> Self {
        self.cardinality = Cardinality::List;
        self
    }

    pub fn default_null(mut self) -> Self {
        self.default = DefaultValue::Null;
        self
    }

    pub fn default_text(mut self, text: impl Into<String>) -> Self {
        self.default = DefaultValue::Text(text.into());
        self
    }

    pub fn default_context(mut self, source: ContextDefault) -> Self {
        self.default = DefaultValue::Context(source);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub fn arg_kind(&self) -> ArgKind {
        self.kind
    }

    pub fn default(&self) -> &DefaultValue {
        &self.default
    }

    pub fn is_required(&self) -> bool {
        self.default == DefaultValue::Required
    }

    /// Positional and linear parameters both draw from the bare tokens
    pub fn is_positional_like(&self) -> bool {
        matches!(self.role, Role::Positional | Role::Linear)
    }
}
