/// Script commands for tagbridge
///
/// Commands declare their parameters once with [`CommandRegistration`]. Each
/// invocation's tokens are bound by [`bind`] before the command body runs,
/// and host side effects leave through the [`HostAction`] channel.
use serde::{Deserialize, Serialize};
use tagbridge_objects::{EntityId, World};
use tokio::sync::mpsc::UnboundedSender;

pub mod binder;
pub mod chat;
pub mod narrate;
pub mod params;
pub mod registration;
pub mod tokens;

pub use binder::{Arg, ArgumentError, BoundArguments, InvocationContext, bind};
pub use chat::ChatCommand;
pub use narrate::NarrateCommand;
pub use params::{ArgKind, Cardinality, ContextDefault, DefaultValue, ParameterSpec, Role};
pub use registration::{CommandRegistration, CommandRegistrationBuilder, RegistrationError};
pub use tokens::split_command_line;

// ============================================================================
// Settings
// ============================================================================

fn default_bystander_range() -> f64 {
    5.0
}

/// Settings for the chat family of commands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Radius in blocks within which bystanders overhear chat, used when a
    /// command does not give its own `range:`
    #[serde(default = "default_bystander_range")]
    pub bystander_range: f64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            bystander_range: default_bystander_range(),
        }
    }
}

// ============================================================================
// Host actions
// ============================================================================

/// Side effects a command asks the host to perform
#[derive(Debug, Clone, PartialEq)]
pub enum HostAction {
    /// `talker` says `message` to `targets`; bystanders within `range` hear it
    Speak {
        talker: EntityId,
        targets: Vec<EntityId>,
        message: String,
        range: f64,
    },
    /// Show `message` to each target player
    Narrate {
        targets: Vec<EntityId>,
        message: String,
    },
}

// ============================================================================
// Command surface
// ============================================================================

/// How an invocation ended when it did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Executed,
    /// A precondition was not met; nothing happened
    Skipped { reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Arguments(#[from] ArgumentError),
    #[error("{0}")]
    Invocation(String),
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
}

/// Context provided to commands while they run
pub struct CommandContext<'a> {
    invocation: InvocationContext<'a>,
    chat: &'a ChatConfig,
    action_tx: UnboundedSender<HostAction>,
}

impl<'a> CommandContext<'a> {
    pub fn new(
        invocation: InvocationContext<'a>,
        chat: &'a ChatConfig,
        action_tx: UnboundedSender<HostAction>,
    ) -> Self {
        Self {
            invocation,
            chat,
            action_tx,
        }
    }

    pub fn invocation(&self) -> &InvocationContext<'a> {
        &self.invocation
    }

    pub fn linked_player(&self) -> Option<EntityId> {
        self.invocation.linked_player
    }

    pub fn linked_npc(&self) -> Option<EntityId> {
        self.invocation.linked_npc
    }

    pub fn world(&self) -> &'a dyn World {
        self.invocation.world
    }

    pub fn chat(&self) -> &ChatConfig {
        self.chat
    }

    /// Queue a host action. A closed channel means the host is shutting
    /// down, so the action is dropped.
    pub fn send_action(&self, action: HostAction) {
        let _ = self.action_tx.send(action);
    }
}

/// A script command
pub trait ScriptCommand: Send + Sync + 'static {
    fn registration(&self) -> &CommandRegistration;

    /// Run with arguments already bound against [`ScriptCommand::registration`]
    fn execute(
        &self,
        args: &BoundArguments,
        ctx: &CommandContext<'_>,
    ) -> Result<CommandOutcome, CommandError>;

    /// Bind `tokens` and run
    fn invoke(
        &self,
        tokens: &[String],
        ctx: &CommandContext<'_>,
    ) -> Result<CommandOutcome, CommandError> {
        let args = bind(self.registration(), tokens, ctx.invocation())?;
        self.execute(&args, ctx)
    }
}
