//! `narrate [<text>] (targets:<player>|...)`
//!
//! Shows text to players only, with no speaker and no bystanders. Targets
//! default to the linked player.

use tagbridge_objects::EntityId;
use tracing::debug;

use crate::{
    ArgKind, BoundArguments, CommandContext, CommandError, CommandOutcome, CommandRegistration,
    ContextDefault, HostAction, ParameterSpec, RegistrationError, ScriptCommand,
};

pub struct NarrateCommand {
    registration: CommandRegistration,
}

impl NarrateCommand {
    pub fn new() -> Result<Self, RegistrationError> {
        let registration = CommandRegistration::builder("narrate")
            .syntax("narrate [<text>] (targets:<player>|...)")
            .arguments(1, 2)
            .parameter(ParameterSpec::linear("message"))
            .parameter(
                ParameterSpec::prefixed("targets")
                    .kind(ArgKind::Entity)
                    .list()
                    .default_context(ContextDefault::LinkedPlayer),
            )
            .remap("targets", &["target"])
            .build()?;
        Ok(Self { registration })
    }
}

impl ScriptCommand for NarrateCommand {
    fn registration(&self) -> &CommandRegistration {
        &self.registration
    }

    fn execute(
        &self,
        args: &BoundArguments,
        ctx: &CommandContext<'_>,
    ) -> Result<CommandOutcome, CommandError> {
        if !args.contains("targets") {
            return Err(CommandError::Invocation("Missing targets!".to_string()));
        }
        let world = ctx.world();

        let mut targets: Vec<EntityId> = Vec::new();
        for target in args.entities("targets") {
            match target.info(world) {
                Some(info) if info.is_player && info.spawned => targets.push(target.id()),
                Some(info) if info.is_player => {
                    debug!(target: "commands", "Player {} is not online, skipping", target.id());
                }
                _ => {
                    debug!(target: "commands", "Entity {} is not a player, skipping", target.id());
                }
            }
        }
        if targets.is_empty() {
            return Ok(CommandOutcome::Skipped {
                reason: "no online players to narrate to".to_string(),
            });
        }

        ctx.send_action(HostAction::Narrate {
            targets,
            message: args.text("message").unwrap_or_default().to_string(),
        });
        Ok(CommandOutcome::Executed)
    }
}
