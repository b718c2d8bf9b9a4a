use std::sync::Arc;

use tagbridge_commands::{CommandError, CommandOutcome, InvocationContext};
use tagbridge_events::{RuntimeEvent, ScriptEvent, TriggerDeclaration};
use tagbridge_objects::{EntityId, Value, World};
use tracing::warn;

use crate::dispatcher::Dispatcher;

/// Read-only view a script body gets of the event that triggered it
pub struct ScriptScope<'a> {
    pub(crate) handler: &'a dyn ScriptEvent,
    pub(crate) declaration: &'a TriggerDeclaration,
    pub(crate) event: &'a RuntimeEvent,
    pub(crate) world: &'a dyn World,
    pub(crate) dispatcher: &'a Dispatcher,
}

impl<'a> ScriptScope<'a> {
    /// `<context.name>` for the current event
    pub fn context(&self, name: &str) -> Option<Value> {
        self.handler.get_context(self.event, self.world, name)
    }

    pub fn declaration(&self) -> &TriggerDeclaration {
        self.declaration
    }

    pub fn event_name(&self) -> &'static str {
        self.handler.name()
    }

    pub fn world(&self) -> &'a dyn World {
        self.world
    }

    /// Player the event links to this script, if any
    pub fn linked_player(&self) -> Option<EntityId> {
        self.handler.linked_player(self.event, self.world)
    }

    /// Invocation context for commands run by this script
    pub fn invocation(&self) -> InvocationContext<'a> {
        let invocation = InvocationContext::new(self.world);
        match self.linked_player() {
            Some(player) => invocation.with_player(player),
            None => invocation,
        }
    }

    /// Run a command line with this script's linked player
    pub fn execute(&self, line: &str) -> Result<CommandOutcome, CommandError> {
        self.dispatcher.execute(line, self.invocation())
    }
}

/// The executable part of a trigger script. Running it yields the script's
/// determinations, applied in order.
pub trait ScriptBody: Send + Sync {
    fn run(&self, scope: &ScriptScope<'_>) -> Vec<Value>;
}

// Allow closures to be used as script bodies
impl<F> ScriptBody for F
where
    F: Fn(&ScriptScope<'_>) -> Vec<Value> + Send + Sync,
{
    fn run(&self, scope: &ScriptScope<'_>) -> Vec<Value> {
        (self)(scope)
    }
}

/// A body that always returns the same determination texts
#[derive(Debug, Clone, Default)]
pub struct StaticDeterminations(pub Vec<String>);

impl ScriptBody for StaticDeterminations {
    fn run(&self, _scope: &ScriptScope<'_>) -> Vec<Value> {
        self.0.iter().map(Value::element).collect()
    }
}

/// Body of a script declared in config: runs its command lines, then
/// returns its determination texts
#[derive(Debug, Clone, Default)]
pub struct ConfigScriptBody {
    pub run: Vec<String>,
    pub determine: Vec<String>,
}

impl ScriptBody for ConfigScriptBody {
    fn run(&self, scope: &ScriptScope<'_>) -> Vec<Value> {
        for line in &self.run {
            if let Err(e) = scope.execute(line) {
                warn!(target: "scripting", "{}: '{}' failed: {}", scope.declaration(), line, e);
            }
        }
        self.determine.iter().map(Value::element).collect()
    }
}

/// A loaded trigger: declaration plus body
pub struct TriggerScript {
    name: String,
    declaration: Arc<TriggerDeclaration>,
    body: Box<dyn ScriptBody>,
}

impl TriggerScript {
    pub fn new(
        name: impl Into<String>,
        declaration: TriggerDeclaration,
        body: impl ScriptBody + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            declaration: Arc::new(declaration),
            body: Box::new(body),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declaration(&self) -> &Arc<TriggerDeclaration> {
        &self.declaration
    }

    pub(crate) fn body(&self) -> &dyn ScriptBody {
        self.body.as_ref()
    }
}
