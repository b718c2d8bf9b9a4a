//! Event and command dispatch
//!
//! The dispatcher owns the registries and the loaded trigger scripts. Firing
//! an event runs every matching script in load order and applies what each
//! returns; executing a command line binds its tokens and runs the command.
//! Both take the live state as arguments and keep nothing afterwards.

use tagbridge_commands::{
    ChatConfig, CommandContext, CommandError, CommandOutcome, HostAction, InvocationContext,
    RegistrationError, split_command_line,
};
use tagbridge_events::{
    BASE_SWITCHES, DeclarationError, Determination, DeterminationError, RuntimeEvent,
    ScriptLocation, ScriptsReloadedEvent, TriggerDeclaration,
};
use tagbridge_objects::World;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info, warn};

use crate::config::{BridgeConfig, ScriptingConfig};
use crate::registry::{CommandRegistry, EventRegistry};
use crate::script::{ConfigScriptBody, ScriptBody, ScriptScope, TriggerScript};

/// Failure tied to one script
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("{location}: {source}")]
    Declaration {
        location: ScriptLocation,
        #[source]
        source: DeclarationError,
    },
    #[error("{location}: no event matches '{line}'")]
    UnknownEvent {
        location: ScriptLocation,
        line: String,
    },
    #[error("{location}: {source}")]
    Determination {
        location: ScriptLocation,
        #[source]
        source: DeterminationError,
    },
}

impl ScriptError {
    pub fn location(&self) -> &ScriptLocation {
        match self {
            ScriptError::Declaration { location, .. }
            | ScriptError::UnknownEvent { location, .. }
            | ScriptError::Determination { location, .. } => location,
        }
    }
}

/// What happened during one [`Dispatcher::fire`]
#[derive(Debug, Default)]
pub struct FireReport {
    /// Scripts whose declaration matched the event
    pub matched: usize,
    /// Determinations accepted by the event
    pub applied: usize,
    /// Determinations the event did not recognise
    pub unrecognised: usize,
    pub errors: Vec<ScriptError>,
}

impl FireReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Outcome of loading scripts from config
#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: usize,
    pub errors: Vec<ScriptError>,
}

pub struct Dispatcher {
    events: EventRegistry,
    commands: CommandRegistry,
    scripts: Vec<TriggerScript>,
    chat: ChatConfig,
    action_tx: UnboundedSender<HostAction>,
}

impl Dispatcher {
    pub fn new(
        events: EventRegistry,
        commands: CommandRegistry,
        chat: ChatConfig,
        action_tx: UnboundedSender<HostAction>,
    ) -> Self {
        Self {
            events,
            commands,
            scripts: Vec::new(),
            chat,
            action_tx,
        }
    }

    /// Dispatcher with the built-in events and commands and the scripts
    /// declared in `config`
    pub fn from_config(
        config: &BridgeConfig,
        action_tx: UnboundedSender<HostAction>,
    ) -> Result<(Self, LoadReport), RegistrationError> {
        let mut dispatcher = Self::new(
            EventRegistry::with_builtins(),
            CommandRegistry::with_builtins()?,
            config.chat.clone(),
            action_tx,
        );
        let report = dispatcher.load_config_scripts(&config.scripting);
        Ok((dispatcher, report))
    }

    pub fn events(&self) -> &EventRegistry {
        &self.events
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    pub fn scripts(&self) -> &[TriggerScript] {
        &self.scripts
    }

    pub fn script_count(&self) -> usize {
        self.scripts.len()
    }

    /// Parse `event_line` and add the script after all previously loaded
    /// ones. Nothing is added on error.
    pub fn load_script(
        &mut self,
        name: &str,
        event_line: &str,
        source: ScriptLocation,
        body: impl ScriptBody + 'static,
    ) -> Result<(), ScriptError> {
        let declaration = TriggerDeclaration::parse(event_line, source.clone()).map_err(
            |source_error| ScriptError::Declaration {
                location: source.clone(),
                source: source_error,
            },
        )?;

        let candidates: Vec<_> = self.events.candidates(&declaration).collect();
        if candidates.is_empty() {
            return Err(ScriptError::UnknownEvent {
                location: source,
                line: event_line.to_string(),
            });
        }
        for switch in declaration.switches() {
            let known = BASE_SWITCHES.contains(&switch.name())
                || candidates.iter().any(|h| h.switches().contains(&switch.name()));
            if !known {
                warn!(
                    target: "scripting",
                    "{} uses unknown switch '{}', it will be ignored",
                    declaration,
                    switch.name()
                );
            }
        }

        debug!(target: "scripting", "Loaded script {} for {}", name, declaration);
        self.scripts.push(TriggerScript::new(name, declaration, body));
        Ok(())
    }

    /// Load every script declared in config. Bad scripts are logged and
    /// skipped.
    pub fn load_config_scripts(&mut self, config: &ScriptingConfig) -> LoadReport {
        let mut report = LoadReport::default();
        if !config.enabled {
            info!(target: "scripting", "Scripting disabled, no scripts loaded");
            return report;
        }

        for (index, script) in config.scripts.iter().enumerate() {
            let source = ScriptLocation::new(script.name.clone(), index as u32 + 1);
            match self.load_script(
                &script.name,
                &script.event,
                source,
                ConfigScriptBody {
                    run: script.run.clone(),
                    determine: script.determine.clone(),
                },
            ) {
                Ok(()) => report.loaded += 1,
                Err(e) => {
                    error!(target: "scripting", "Failed to load script: {}", e);
                    report.errors.push(e);
                }
            }
        }

        if report.loaded > 0 {
            info!(target: "scripting", "Loaded {} script(s)", report.loaded);
        }
        report
    }

    /// Drop every loaded script and load `config` again, then fire the
    /// reload event
    pub fn reload(&mut self, config: &ScriptingConfig, world: &dyn World) -> LoadReport {
        let old_count = self.scripts.len();
        debug!(target: "scripting", "Reloading scripts");
        self.scripts.clear();

        let report = self.load_config_scripts(config);
        if old_count > 0 && report.loaded == 0 {
            warn!(
                target: "scripting",
                "Script reload resulted in zero scripts (was {}). Check logs for loading errors.",
                old_count
            );
        }

        let mut event: RuntimeEvent = ScriptsReloadedEvent {
            had_error: !report.errors.is_empty(),
        }
        .into();
        self.fire(&mut event, world);
        report
    }

    /// Run every matching script against `event`, in load order
    pub fn fire(&self, event: &mut RuntimeEvent, world: &dyn World) -> FireReport {
        let mut report = FireReport::default();
        let Some(handler) = self.events.get(event.name()) else {
            warn!(target: "scripting", "No handler registered for event {}", event.name());
            return report;
        };

        for script in &self.scripts {
            let declaration = script.declaration();
            if !handler.could_match(declaration) || !handler.matches(declaration, event, world) {
                continue;
            }
            report.matched += 1;
            debug!(target: "scripting", "Running {} for {}", script.name(), handler.name());

            let values = {
                let scope = ScriptScope {
                    handler,
                    declaration,
                    event,
                    world,
                    dispatcher: self,
                };
                script.body().run(&scope)
            };

            for value in values {
                let determination = Determination::parse(&value);
                match handler.apply_determination(declaration, event, world, &determination) {
                    Ok(true) => report.applied += 1,
                    Ok(false) => {
                        warn!(
                            target: "scripting",
                            "{} determined unknown value '{}' for {}",
                            declaration,
                            value,
                            handler.name()
                        );
                        report.unrecognised += 1;
                    }
                    Err(source) => {
                        let err = ScriptError::Determination {
                            location: declaration.source().clone(),
                            source,
                        };
                        error!(target: "scripting", "Script {} failed: {}", script.name(), err);
                        report.errors.push(err);
                        break;
                    }
                }
            }
        }

        debug!(
            target: "scripting",
            "{} fired: {} matched, {} applied, {} error(s)",
            handler.name(),
            report.matched,
            report.applied,
            report.errors.len()
        );
        report
    }

    /// Execute one command line, e.g. `chat "Hello!" talker:e@4`
    pub fn execute(
        &self,
        line: &str,
        invocation: InvocationContext<'_>,
    ) -> Result<CommandOutcome, CommandError> {
        let mut tokens = split_command_line(line);
        if tokens.is_empty() {
            return Err(CommandError::UnknownCommand(String::new()));
        }
        let name = tokens.remove(0);
        let command = self
            .commands
            .get(&name)
            .ok_or_else(|| CommandError::UnknownCommand(name.clone()))?;

        let ctx = CommandContext::new(invocation, &self.chat, self.action_tx.clone());
        let outcome = command.invoke(&tokens, &ctx);
        match &outcome {
            Ok(CommandOutcome::Executed) => {
                debug!(target: "commands", "Executed {}", name);
            }
            Ok(CommandOutcome::Skipped { reason }) => {
                debug!(target: "commands", "Skipped {}: {}", name, reason);
            }
            Err(e) => {
                error!(target: "commands", "Command {} failed: {}", name, e);
            }
        }
        outcome
    }
}
