//! `chat [<text>] (no_target/targets:<entity>|...) (talkers:<entity>|...) (range:<#.#>)`
//!
//! Makes entities say something out loud. Without `targets:` the linked
//! player is the target, unless `no_target` is given. Without `talkers:` the
//! linked NPC talks. A negative `range:` means the configured bystander
//! range.

use tagbridge_objects::{EntityId, EntityRef};
use tracing::debug;

use crate::{
    ArgKind, BoundArguments, CommandContext, CommandError, CommandOutcome, CommandRegistration,
    HostAction, ParameterSpec, RegistrationError, ScriptCommand,
};

pub struct ChatCommand {
    registration: CommandRegistration,
}

impl ChatCommand {
    pub fn new() -> Result<Self, RegistrationError> {
        let registration = CommandRegistration::builder("chat")
            .syntax("chat [<text>] (no_target/targets:<entity>|...) (talkers:<entity>|...) (range:<#.#>)")
            .arguments(1, 4)
            .parameter(ParameterSpec::linear("message"))
            .parameter(
                ParameterSpec::prefixed("talkers")
                    .kind(ArgKind::Entity)
                    .list()
                    .default_null(),
            )
            .parameter(
                ParameterSpec::prefixed("targets")
                    .kind(ArgKind::Entity)
                    .list()
                    .default_null(),
            )
            .parameter(ParameterSpec::flag("no_target"))
            .parameter(
                ParameterSpec::prefixed("range")
                    .kind(ArgKind::Decimal)
                    .default_text("-1"),
            )
            .remap("targets", &["target", "t"])
            .remap("talkers", &["talker"])
            .remap("range", &["r"])
            .build()?;
        Ok(Self { registration })
    }
}

impl ScriptCommand for ChatCommand {
    fn registration(&self) -> &CommandRegistration {
        &self.registration
    }

    fn execute(
        &self,
        args: &BoundArguments,
        ctx: &CommandContext<'_>,
    ) -> Result<CommandOutcome, CommandError> {
        let message = args.text("message").unwrap_or_default().to_string();
        let world = ctx.world();

        let targets: Vec<EntityId> = if args.contains("targets") {
            args.entities("targets").iter().map(EntityRef::id).collect()
        } else if args.flag("no_target") {
            Vec::new()
        } else {
            let player = ctx
                .linked_player()
                .ok_or_else(|| CommandError::Invocation("Missing targets!".to_string()))?;
            if !EntityRef::new(player).is_spawned(world) {
                debug!(target: "commands", "Player {} is not online, skipping", player);
                return Ok(CommandOutcome::Skipped {
                    reason: "player is not online".to_string(),
                });
            }
            vec![player]
        };

        let talkers: Vec<EntityRef> = if args.contains("talkers") {
            args.entities("talkers")
        } else {
            let npc = ctx
                .linked_npc()
                .ok_or_else(|| CommandError::Invocation("Missing talker!".to_string()))?;
            let talker = EntityRef::new(npc);
            if !talker.is_spawned(world) {
                debug!(target: "commands", "Chat talker {} is not spawned, cannot talk", npc);
                return Ok(CommandOutcome::Skipped {
                    reason: "talker is not spawned".to_string(),
                });
            }
            vec![talker]
        };

        let range = match args.decimal("range") {
            Some(range) if range >= 0.0 => range,
            _ => ctx.chat().bystander_range,
        };

        for talker in talkers {
            if !talker.is_spawned(world) {
                debug!(
                    target: "commands",
                    "Chat talker {} is not spawned, cannot talk",
                    talker.id()
                );
                continue;
            }
            ctx.send_action(HostAction::Speak {
                talker: talker.id(),
                targets: targets.clone(),
                message: message.clone(),
                range,
            });
        }
        Ok(CommandOutcome::Executed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;

    #[test]
    fn test_registration_shape() {
        let chat = ChatCommand::new().unwrap();
        let registration = chat.registration();
        assert_eq!(registration.name(), "chat");
        assert_eq!(registration.required_args(), 1);
        assert_eq!(registration.maximum_args(), 4);
        assert_eq!(
            registration.resolve("t", Role::Prefixed).map(|p| p.name()),
            Some("targets")
        );
        assert_eq!(
            registration.resolve("talker", Role::Prefixed).map(|p| p.name()),
            Some("talkers")
        );
        assert_eq!(
            registration.resolve("r", Role::Prefixed).map(|p| p.name()),
            Some("range")
        );
        assert!(registration.resolve("no_target", Role::Flag).is_some());
    }
}
