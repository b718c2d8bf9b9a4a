//! Argument binding
//!
//! Turns the raw tokens of one invocation into typed values according to a
//! command's [`CommandRegistration`]. Binding is pure: it reads the world
//! and the invocation context but never changes anything.

use std::collections::HashMap;

use tagbridge_objects::{
    ElementTag, EntityId, EntityRef, InventoryRef, ItemRef, ListTag, LocationTag, ObjectTag, Value,
    World,
};
use tracing::debug;

use crate::params::{ArgKind, Cardinality, ContextDefault, DefaultValue, ParameterSpec, Role};
use crate::registration::CommandRegistration;

/// Who and where a command is being run for
#[derive(Clone, Copy)]
pub struct InvocationContext<'a> {
    pub linked_player: Option<EntityId>,
    pub linked_npc: Option<EntityId>,
    pub world: &'a dyn World,
}

impl<'a> InvocationContext<'a> {
    pub fn new(world: &'a dyn World) -> Self {
        Self {
            linked_player: None,
            linked_npc: None,
            world,
        }
    }

    pub fn with_player(mut self, player: EntityId) -> Self {
        self.linked_player = Some(player);
        self
    }

    pub fn with_npc(mut self, npc: EntityId) -> Self {
        self.linked_npc = Some(npc);
        self
    }

    fn lookup(&self, source: ContextDefault) -> Option<EntityId> {
        match source {
            ContextDefault::LinkedPlayer => self.linked_player,
            ContextDefault::LinkedNpc => self.linked_npc,
        }
    }
}

// ============================================================================
// Bound values
// ============================================================================

/// A bound argument value
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Text(String),
    Integer(i64),
    Decimal(f64),
    Boolean(bool),
    Object(Value),
    List(Vec<Arg>),
}

impl Arg {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Arg::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Arg::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Decimals, and integers widened to decimals
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Arg::Decimal(value) => Some(*value),
            Arg::Integer(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Arg::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Arg::Object(value) => Some(value),
            _ => None,
        }
    }

    /// The elements of a list argument, or the argument itself as a
    /// one-element slice
    pub fn as_slice(&self) -> &[Arg] {
        match self {
            Arg::List(items) => items,
            single => std::slice::from_ref(single),
        }
    }
}

/// The typed result of one successful bind. Every required parameter is
/// present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundArguments {
    values: HashMap<String, Arg>,
}

impl BoundArguments {
    pub fn get(&self, name: &str) -> Option<&Arg> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Arg::as_text)
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Arg::as_i64)
    }

    pub fn decimal(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Arg::as_f64)
    }

    /// Flag or boolean value; absent is `false`
    pub fn flag(&self, name: &str) -> bool {
        self.get(name).and_then(Arg::as_bool).unwrap_or(false)
    }

    /// Entity handles bound to `name`, whether declared single or list
    pub fn entities(&self, name: &str) -> Vec<EntityRef> {
        self.get(name)
            .map(|arg| {
                arg.as_slice()
                    .iter()
                    .filter_map(|item| match item {
                        Arg::Object(Value::Entity(entity)) => Some(*entity),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn insert(&mut self, name: &str, arg: Arg) {
        self.values.insert(name.to_string(), arg);
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Why binding failed. Every variant except the aggregate count check and
/// a stray token names exactly one parameter.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ArgumentError {
    #[error("expected {required} to {maximum} arguments, got {given}")]
    WrongArgumentCount {
        required: usize,
        maximum: usize,
        given: usize,
    },
    #[error("missing required argument '{parameter}'")]
    MissingArgument { parameter: String },
    #[error("argument '{parameter}' is given more than once")]
    DuplicateArgument { parameter: String },
    #[error("unknown argument prefix '{prefix}'")]
    UnknownPrefix { prefix: String },
    #[error("unexpected argument '{token}'")]
    UnexpectedArgument { token: String },
    #[error("argument '{parameter}': '{value}' is not a valid {kind}: {reason}")]
    Unparseable {
        parameter: String,
        value: String,
        kind: ArgKind,
        reason: String,
    },
}

impl ArgumentError {
    /// The offending parameter, when the failure is tied to one
    pub fn parameter(&self) -> Option<&str> {
        match self {
            ArgumentError::MissingArgument { parameter }
            | ArgumentError::DuplicateArgument { parameter }
            | ArgumentError::Unparseable { parameter, .. } => Some(parameter),
            ArgumentError::UnknownPrefix { prefix } => Some(prefix),
            ArgumentError::WrongArgumentCount { .. } | ArgumentError::UnexpectedArgument { .. } => {
                None
            }
        }
    }
}

// ============================================================================
// Binding
// ============================================================================

/// Bind `tokens` against `registration`.
///
/// Steps, in order: aggregate count check, partition into prefixed, flag
/// and positional tokens, positional binding (the linear parameter takes the
/// rest), conversion, defaults. The first failure is returned.
pub fn bind<S: AsRef<str>>(
    registration: &CommandRegistration,
    tokens: &[S],
    context: &InvocationContext<'_>,
) -> Result<BoundArguments, ArgumentError> {
    let given = tokens.len();
    if given < registration.required_args() || given > registration.maximum_args() {
        return Err(ArgumentError::WrongArgumentCount {
            required: registration.required_args(),
            maximum: registration.maximum_args(),
            given,
        });
    }

    let mut raw: HashMap<&str, String> = HashMap::new();
    let mut positional: Vec<&str> = Vec::new();

    for token in tokens.iter().map(|t| t.as_ref()) {
        if let Some((prefix, value)) = split_prefix(token) {
            if let Some(spec) = registration.resolve(prefix, Role::Prefixed) {
                claim(&mut raw, spec, value.to_string())?;
                continue;
            }
            if !registration.allows_unknown_prefixes() {
                return Err(ArgumentError::UnknownPrefix {
                    prefix: prefix.to_lowercase(),
                });
            }
        } else if let Some(spec) = registration.resolve(token, Role::Flag) {
            claim(&mut raw, spec, "true".to_string())?;
            continue;
        }
        positional.push(token);
    }

    let mut remaining = positional.into_iter();
    for spec in registration
        .parameters()
        .iter()
        .filter(|p| p.is_positional_like())
    {
        let value = match spec.role() {
            Role::Linear => {
                let rest: Vec<&str> = remaining.by_ref().collect();
                (!rest.is_empty()).then(|| rest.join(" "))
            }
            _ => remaining.next().map(str::to_string),
        };
        if let Some(value) = value {
            raw.insert(spec.name(), value);
        }
    }
    if let Some(token) = remaining.next() {
        return Err(ArgumentError::UnexpectedArgument {
            token: token.to_string(),
        });
    }

    let mut bound = BoundArguments::default();
    for spec in registration.parameters() {
        match raw.remove(spec.name()) {
            Some(text) => bound.insert(spec.name(), convert(spec, &text, context.world)?),
            None => {
                if let Some(arg) = default_for(spec, context)? {
                    bound.insert(spec.name(), arg);
                }
            }
        }
    }

    debug!(target: "commands", "Bound {} argument(s) for '{}'", bound.len(), registration.name());
    Ok(bound)
}

fn claim<'r>(
    raw: &mut HashMap<&'r str, String>,
    spec: &'r ParameterSpec,
    value: String,
) -> Result<(), ArgumentError> {
    if raw.contains_key(spec.name()) {
        return Err(ArgumentError::DuplicateArgument {
            parameter: spec.name().to_string(),
        });
    }
    raw.insert(spec.name(), value);
    Ok(())
}

/// `name:value` where the name is letters and underscores only
fn split_prefix(token: &str) -> Option<(&str, &str)> {
    let (prefix, value) = token.split_once(':')?;
    if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphabetic() || c == '_') {
        return None;
    }
    Some((prefix, value))
}

fn default_for(
    spec: &ParameterSpec,
    context: &InvocationContext<'_>,
) -> Result<Option<Arg>, ArgumentError> {
    match spec.default() {
        DefaultValue::Required => Err(ArgumentError::MissingArgument {
            parameter: spec.name().to_string(),
        }),
        DefaultValue::Null => Ok(None),
        DefaultValue::Text(text) => convert(spec, text, context.world).map(Some),
        DefaultValue::Context(source) => Ok(context.lookup(*source).map(|id| {
            let entity = Arg::Object(EntityRef::new(id).into_value());
            match spec.cardinality() {
                Cardinality::Single => entity,
                Cardinality::List => Arg::List(vec![entity]),
            }
        })),
    }
}

fn convert(spec: &ParameterSpec, text: &str, world: &dyn World) -> Result<Arg, ArgumentError> {
    match spec.cardinality() {
        Cardinality::Single => convert_one(spec, text, world),
        Cardinality::List => ListTag::parse(text)
            .iter()
            .map(|element| convert_one(spec, element, world))
            .collect::<Result<Vec<_>, _>>()
            .map(Arg::List),
    }
}

fn convert_one(spec: &ParameterSpec, text: &str, world: &dyn World) -> Result<Arg, ArgumentError> {
    let unparseable = |reason: String| ArgumentError::Unparseable {
        parameter: spec.name().to_string(),
        value: text.to_string(),
        kind: spec.arg_kind(),
        reason,
    };
    let element = ElementTag::new(text);
    let object = |result: Result<Value, tagbridge_objects::ObjectError>| {
        result.map(Arg::Object).map_err(|e| unparseable(e.to_string()))
    };

    match spec.arg_kind() {
        ArgKind::Text => Ok(Arg::Text(text.to_string())),
        ArgKind::Integer => element
            .as_i64()
            .map(Arg::Integer)
            .ok_or_else(|| unparseable("not an integer".to_string())),
        ArgKind::Decimal => element
            .as_f64()
            .map(Arg::Decimal)
            .ok_or_else(|| unparseable("not a number".to_string())),
        ArgKind::Boolean => element
            .as_bool()
            .map(Arg::Boolean)
            .ok_or_else(|| unparseable("expected true or false".to_string())),
        ArgKind::Entity => object(EntityRef::value_of(text, world).map(ObjectTag::into_value)),
        ArgKind::Item => object(ItemRef::value_of(text, world).map(ObjectTag::into_value)),
        ArgKind::Inventory => {
            object(InventoryRef::value_of(text, world).map(ObjectTag::into_value))
        }
        ArgKind::Location => {
            object(LocationTag::value_of(text, world).map(ObjectTag::into_value))
        }
    }
}
