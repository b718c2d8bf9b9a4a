/// Script event matching for tagbridge
///
/// This crate decides whether a script's trigger declaration applies to a
/// live host event, exposes typed context values to the script, and applies
/// the script's determination back onto the event.
use tagbridge_objects::{ElementTag, EntityId, LocationTag, Value, World};
use tracing::debug;

pub mod declaration;
pub mod determination;
pub mod loot_generate;
pub mod scripts_reloaded;
pub mod switch;

pub use declaration::{ScriptLocation, Switch, TriggerDeclaration};
pub use determination::{Determination, DeterminationError};
pub use loot_generate::{InventoryHolder, LootGenerateEvent, LootGenerateScriptEvent};
pub use scripts_reloaded::{ScriptsReloadedEvent, ScriptsReloadedScriptEvent};
pub use switch::SwitchMatcher;

/// Switches every event understands
pub const BASE_SWITCHES: &[&str] = &["in", "cancelled"];

// ============================================================================
// Errors
// ============================================================================

/// Errors raised while loading a trigger declaration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeclarationError {
    #[error("no event name in '{0}'")]
    MissingEventName(String),
    #[error("switch '{0}' is declared more than once")]
    DuplicateSwitch(String),
    #[error("switch '{name}' has invalid value '{value}'")]
    InvalidSwitch { name: String, value: String },
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

// ============================================================================
// Runtime events
// ============================================================================

/// Host event data, one variant per event kind
#[derive(Debug, Clone)]
pub enum EventKind {
    LootGenerate(LootGenerateEvent),
    ScriptsReloaded(ScriptsReloadedEvent),
}

/// A live occurrence from the host.
///
/// Only valid for the synchronous dispatch call it was created for; nothing
/// in the bridge keeps it afterwards.
#[derive(Debug, Clone)]
pub struct RuntimeEvent {
    kind: EventKind,
    cancelled: bool,
}

impl RuntimeEvent {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            cancelled: false,
        }
    }

    /// Registry name of the handler for this event
    pub fn name(&self) -> &'static str {
        match &self.kind {
            EventKind::LootGenerate(_) => loot_generate::NAME,
            EventKind::ScriptsReloaded(_) => scripts_reloaded::NAME,
        }
    }

    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut EventKind {
        &mut self.kind
    }

    /// World position of the event, for kinds that have one
    pub fn location(&self) -> Option<&LocationTag> {
        match &self.kind {
            EventKind::LootGenerate(event) => event.location(),
            EventKind::ScriptsReloaded(_) => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn set_cancelled(&mut self, cancelled: bool) {
        self.cancelled = cancelled;
    }
}

impl From<LootGenerateEvent> for RuntimeEvent {
    fn from(event: LootGenerateEvent) -> Self {
        Self::new(EventKind::LootGenerate(event))
    }
}

impl From<ScriptsReloadedEvent> for RuntimeEvent {
    fn from(event: ScriptsReloadedEvent) -> Self {
        Self::new(EventKind::ScriptsReloaded(event))
    }
}

// ============================================================================
// Script event handlers
// ============================================================================

/// What an event offers for comparison against a named switch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchSubject {
    /// Compare the switch against this text
    Value(String),
    /// The switch applies to this event but the data it needs is absent
    Missing,
    /// This event does not know the switch
    Unsupported,
}

/// Handler for one kind of host event.
///
/// Handlers are stateless: the live event is passed into every call, so one
/// handler can serve concurrent dispatches on different threads.
pub trait ScriptEvent: Send + Sync + 'static {
    /// Registry name, e.g. "LootGenerates"
    fn name(&self) -> &'static str;

    /// Whether determinations may cancel this event
    fn cancellable(&self) -> bool {
        false
    }

    /// Switches this event understands, besides [`BASE_SWITCHES`]
    fn switches(&self) -> &'static [&'static str] {
        &[]
    }

    /// Cheap pre-filter on the declaration's event name only. Must accept
    /// every declaration that [`ScriptEvent::matches`] could accept.
    fn could_match(&self, path: &TriggerDeclaration) -> bool;

    /// Runtime value for a named switch
    fn switch_subject(&self, event: &RuntimeEvent, name: &str) -> SwitchSubject {
        let _ = (event, name);
        SwitchSubject::Unsupported
    }

    /// Authoritative check. Never accepts a declaration that `could_match`
    /// rejects.
    fn matches(
        &self,
        path: &TriggerDeclaration,
        event: &RuntimeEvent,
        world: &dyn World,
    ) -> bool {
        match_switches(self, path, event, world)
    }

    /// Context value for `name`. Must not mutate anything.
    fn get_context(&self, event: &RuntimeEvent, world: &dyn World, name: &str) -> Option<Value> {
        let _ = world;
        base_context(event, name)
    }

    /// Player the event links to the script, used as the default player of
    /// commands the script runs
    fn linked_player(&self, event: &RuntimeEvent, world: &dyn World) -> Option<EntityId> {
        let _ = (event, world);
        None
    }

    /// Apply a determination. `Ok(false)` means it was not recognised.
    fn apply_determination(
        &self,
        path: &TriggerDeclaration,
        event: &mut RuntimeEvent,
        world: &dyn World,
        determination: &Determination,
    ) -> Result<bool, DeterminationError> {
        let _ = (path, world);
        base_determination(self.cancellable(), event, determination)
    }
}

/// Generic switch evaluation shared by all events.
///
/// Order: the event name, the `in:` area check, then every other switch in
/// declared order, then the structural checks in [`base_matches`]. The first
/// failure wins.
pub fn match_switches<E: ScriptEvent + ?Sized>(
    handler: &E,
    path: &TriggerDeclaration,
    event: &RuntimeEvent,
    world: &dyn World,
) -> bool {
    if !handler.could_match(path) {
        return false;
    }
    if !run_in_check(path, event.location(), world) {
        return false;
    }
    for switch in path.switches() {
        if BASE_SWITCHES.contains(&switch.name()) {
            continue;
        }
        match handler.switch_subject(event, switch.name()) {
            SwitchSubject::Value(value) => {
                if !switch.matches(&value) {
                    debug!(
                        target: "events",
                        "{} rejected by switch {}:{} (was '{}')",
                        path,
                        switch.name(),
                        switch.raw(),
                        value
                    );
                    return false;
                }
            }
            SwitchSubject::Missing => {
                debug!(
                    target: "events",
                    "{} rejected: no value for switch '{}'",
                    path,
                    switch.name()
                );
                return false;
            }
            SwitchSubject::Unsupported => {}
        }
    }
    base_matches(path, event)
}

/// Area scoping for the `in:` switch.
///
/// Events with no location ignore the switch. An area the host does not
/// know is a non-match.
pub fn run_in_check(
    path: &TriggerDeclaration,
    location: Option<&LocationTag>,
    world: &dyn World,
) -> bool {
    let Some(switch) = path.switch("in") else {
        return true;
    };
    let Some(location) = location else {
        return true;
    };
    switch
        .raw()
        .split('|')
        .map(|area| area.trim().to_lowercase())
        .any(|area| match world.area_contains(&area, location) {
            Some(inside) => inside,
            None => {
                debug!(target: "events", "{} names unknown area '{}'", path, area);
                false
            }
        })
}

/// Structural checks shared by every event: cancellation gating
pub fn base_matches(path: &TriggerDeclaration, event: &RuntimeEvent) -> bool {
    if event.is_cancelled() && path.ignore_cancelled() {
        return false;
    }
    if let Some(switch) = path.switch("cancelled") {
        if !switch.matches(&event.is_cancelled().to_string()) {
            return false;
        }
    }
    true
}

/// Context keys shared by every event
pub fn base_context(event: &RuntimeEvent, name: &str) -> Option<Value> {
    match name {
        "cancelled" => Some(ElementTag::from(event.is_cancelled()).into()),
        "event_name" => Some(Value::element(event.name())),
        _ => None,
    }
}

/// Determinations shared by every event.
///
/// The default sentinel is accepted and changes nothing. Cancellable events
/// also accept `cancelled` and `cancelled:<true|false>`.
pub fn base_determination(
    cancellable: bool,
    event: &mut RuntimeEvent,
    determination: &Determination,
) -> Result<bool, DeterminationError> {
    match determination {
        Determination::Default => Ok(true),
        Determination::Tagged { kind, payload } if cancellable && kind == "cancelled" => {
            let cancelled = ElementTag::new(payload.as_str()).as_bool().ok_or_else(|| {
                DeterminationError::InvalidValue {
                    kind: kind.clone(),
                    payload: payload.clone(),
                }
            })?;
            event.set_cancelled(cancelled);
            Ok(true)
        }
        other if cancellable && other.plain_text_lower().as_deref() == Some("cancelled") => {
            event.set_cancelled(true);
            Ok(true)
        }
        _ => Ok(false),
    }
}
