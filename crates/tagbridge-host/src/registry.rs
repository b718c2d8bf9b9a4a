use std::collections::BTreeMap;

use tagbridge_commands::{ChatCommand, NarrateCommand, RegistrationError, ScriptCommand};
use tagbridge_events::{
    LootGenerateScriptEvent, ScriptEvent, ScriptsReloadedScriptEvent, TriggerDeclaration,
};
use tracing::{debug, warn};

/// Event handlers known to the bridge, one per event kind
#[derive(Default)]
pub struct EventRegistry {
    handlers: Vec<Box<dyn ScriptEvent>>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in event
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(LootGenerateScriptEvent);
        registry.register(ScriptsReloadedScriptEvent);
        registry
    }

    /// Add a handler. A handler with the same name is replaced.
    pub fn register(&mut self, handler: impl ScriptEvent) {
        debug!(target: "scripting", "Registering event: {}", handler.name());
        if let Some(existing) = self.handlers.iter_mut().find(|h| h.name() == handler.name()) {
            warn!(target: "scripting", "Event {} registered twice, replacing", handler.name());
            *existing = Box::new(handler);
        } else {
            self.handlers.push(Box::new(handler));
        }
    }

    /// Look up by registry name (see `RuntimeEvent::name`)
    pub fn get(&self, name: &str) -> Option<&dyn ScriptEvent> {
        self.handlers
            .iter()
            .find(|h| h.name() == name)
            .map(|h| h.as_ref())
    }

    /// Handlers whose pre-filter accepts `declaration`
    pub fn candidates<'a>(
        &'a self,
        declaration: &'a TriggerDeclaration,
    ) -> impl Iterator<Item = &'a dyn ScriptEvent> + 'a {
        self.handlers
            .iter()
            .map(|h| h.as_ref())
            .filter(move |h| h.could_match(declaration))
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Script commands by name
#[derive(Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, Box<dyn ScriptCommand>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in command
    pub fn with_builtins() -> Result<Self, RegistrationError> {
        let mut registry = Self::new();
        registry.register(ChatCommand::new()?);
        registry.register(NarrateCommand::new()?);
        Ok(registry)
    }

    pub fn register(&mut self, command: impl ScriptCommand) {
        let name = command.registration().name().to_string();
        debug!(target: "scripting", "Registering command: {}", name);
        if self.commands.insert(name.clone(), Box::new(command)).is_some() {
            warn!(target: "scripting", "Command {} registered twice, replacing", name);
        }
    }

    /// Case-insensitive lookup
    pub fn get(&self, name: &str) -> Option<&dyn ScriptCommand> {
        self.commands.get(&name.to_lowercase()).map(|c| c.as_ref())
    }

    /// Names in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.commands.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
