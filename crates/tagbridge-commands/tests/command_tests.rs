// Integration tests for the built-in commands

use std::collections::HashMap;

use tagbridge_commands::{
    ChatCommand, ChatConfig, CommandContext, CommandError, CommandOutcome, HostAction,
    InvocationContext, NarrateCommand, ScriptCommand, split_command_line,
};
use tagbridge_objects::{EntityId, EntityInfo, InventoryId, World};
use tokio::sync::mpsc;

const STEVE: EntityId = EntityId(1);
const ALEX_OFFLINE: EntityId = EntityId(2);
const GUARD: EntityId = EntityId(10);
const GHOST: EntityId = EntityId(11);
const BARD: EntityId = EntityId(12);

struct MockWorld {
    entities: HashMap<EntityId, EntityInfo>,
}

impl MockWorld {
    fn new() -> Self {
        Self {
            entities: HashMap::from([
                (STEVE, EntityInfo::player("Steve", true)),
                (ALEX_OFFLINE, EntityInfo::player("Alex", false)),
                (GUARD, EntityInfo::npc("Guard", true)),
                (GHOST, EntityInfo::npc("Ghost", false)),
                (BARD, EntityInfo::npc("Bard", true)),
            ]),
        }
    }
}

impl World for MockWorld {
    fn entity(&self, id: EntityId) -> Option<EntityInfo> {
        self.entities.get(&id).cloned()
    }

    fn inventory_exists(&self, _id: InventoryId) -> bool {
        false
    }

    fn is_material(&self, _material: &str) -> bool {
        false
    }
}

fn run(
    command: &dyn ScriptCommand,
    line: &str,
    invocation: InvocationContext<'_>,
) -> (Result<CommandOutcome, CommandError>, Vec<HostAction>) {
    let chat = ChatConfig {
        bystander_range: 8.0,
    };
    let (action_tx, mut action_rx) = mpsc::unbounded_channel();
    let ctx = CommandContext::new(invocation, &chat, action_tx);
    let result = command.invoke(&split_command_line(line), &ctx);
    drop(ctx);

    let mut actions = Vec::new();
    while let Ok(action) = action_rx.try_recv() {
        actions.push(action);
    }
    (result, actions)
}

#[tokio::test]
async fn test_chat_defaults_to_linked_player_and_npc() {
    let world = MockWorld::new();
    let chat = ChatCommand::new().unwrap();
    let invocation = InvocationContext::new(&world).with_player(STEVE).with_npc(GUARD);

    let (result, actions) = run(&chat, r#""Hello there, traveller!""#, invocation);
    assert_eq!(result.unwrap(), CommandOutcome::Executed);
    assert_eq!(
        actions,
        vec![HostAction::Speak {
            talker: GUARD,
            targets: vec![STEVE],
            message: "Hello there, traveller!".to_string(),
            range: 8.0,
        }]
    );
}

#[tokio::test]
async fn test_chat_explicit_talkers_targets_and_range() {
    let world = MockWorld::new();
    let chat = ChatCommand::new().unwrap();
    let invocation = InvocationContext::new(&world);

    let (result, actions) = run(
        &chat,
        "Welcome talker:e@10|e@11|e@12 t:e@1 r:2.5",
        invocation,
    );
    assert_eq!(result.unwrap(), CommandOutcome::Executed);
    let talkers: Vec<EntityId> = actions
        .iter()
        .map(|action| match action {
            HostAction::Speak {
                talker,
                targets,
                range,
                ..
            } => {
                assert_eq!(targets, &vec![STEVE]);
                assert_eq!(*range, 2.5);
                *talker
            }
            other => panic!("unexpected action {other:?}"),
        })
        .collect();
    // the unspawned ghost is skipped
    assert_eq!(talkers, vec![GUARD, BARD]);
}

#[tokio::test]
async fn test_chat_no_target_speaks_to_nobody() {
    let world = MockWorld::new();
    let chat = ChatCommand::new().unwrap();
    let invocation = InvocationContext::new(&world).with_npc(GUARD);

    let (result, actions) = run(&chat, "Anyone? no_target", invocation);
    assert_eq!(result.unwrap(), CommandOutcome::Executed);
    assert!(matches!(
        &actions[..],
        [HostAction::Speak { targets, message, .. }] if targets.is_empty() && message == "Anyone?"
    ));
}

#[tokio::test]
async fn test_chat_missing_linked_entities_are_errors() {
    let world = MockWorld::new();
    let chat = ChatCommand::new().unwrap();

    let (result, actions) = run(&chat, "Hi", InvocationContext::new(&world).with_npc(GUARD));
    assert!(matches!(result, Err(CommandError::Invocation(ref m)) if m == "Missing targets!"));
    assert!(actions.is_empty());

    let (result, actions) = run(&chat, "Hi", InvocationContext::new(&world).with_player(STEVE));
    assert!(matches!(result, Err(CommandError::Invocation(ref m)) if m == "Missing talker!"));
    assert!(actions.is_empty());
}

#[tokio::test]
async fn test_chat_inactive_linked_entities_are_skipped() {
    let world = MockWorld::new();
    let chat = ChatCommand::new().unwrap();

    let offline = InvocationContext::new(&world)
        .with_player(ALEX_OFFLINE)
        .with_npc(GUARD);
    let (result, actions) = run(&chat, "Hi", offline);
    assert!(matches!(result, Ok(CommandOutcome::Skipped { .. })));
    assert!(actions.is_empty());

    let unspawned = InvocationContext::new(&world)
        .with_player(STEVE)
        .with_npc(GHOST);
    let (result, actions) = run(&chat, "Hi", unspawned);
    assert!(matches!(result, Ok(CommandOutcome::Skipped { .. })));
    assert!(actions.is_empty());
}

#[tokio::test]
async fn test_chat_binding_failures_happen_before_side_effects() {
    let world = MockWorld::new();
    let chat = ChatCommand::new().unwrap();
    let invocation = InvocationContext::new(&world).with_player(STEVE).with_npc(GUARD);

    let (result, actions) = run(&chat, "", invocation);
    assert!(matches!(result, Err(CommandError::Arguments(_))));
    assert!(actions.is_empty());

    let (result, actions) = run(&chat, "Hi range:far", invocation);
    match result {
        Err(CommandError::Arguments(err)) => assert_eq!(err.parameter(), Some("range")),
        other => panic!("expected argument error, got {other:?}"),
    }
    assert!(actions.is_empty());
}

#[tokio::test]
async fn test_narrate_filters_to_online_players() {
    let world = MockWorld::new();
    let narrate = NarrateCommand::new().unwrap();

    let (result, actions) = run(
        &narrate,
        "'You feel watched.' targets:e@1|e@2|e@10",
        InvocationContext::new(&world),
    );
    assert_eq!(result.unwrap(), CommandOutcome::Executed);
    assert_eq!(
        actions,
        vec![HostAction::Narrate {
            targets: vec![STEVE],
            message: "You feel watched.".to_string(),
        }]
    );

    let (result, actions) = run(
        &narrate,
        "Psst",
        InvocationContext::new(&world).with_player(STEVE),
    );
    assert_eq!(result.unwrap(), CommandOutcome::Executed);
    assert_eq!(actions.len(), 1);

    let (result, _) = run(&narrate, "Psst", InvocationContext::new(&world));
    assert!(matches!(result, Err(CommandError::Invocation(_))));
}
