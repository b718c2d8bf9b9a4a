//! Scripted dry runs against a simulated world
//!
//! A scenario file describes the world the host would report (entities,
//! inventories, materials, named areas) and an ordered list of steps: events
//! to fire, reloads, and command lines to execute.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tagbridge_commands::InvocationContext;
use tagbridge_events::{EventKind, InventoryHolder, LootGenerateEvent, RuntimeEvent};
use tagbridge_host::{Dispatcher, ScriptConfig, ScriptingConfig};
use tagbridge_objects::{EntityId, EntityInfo, InventoryId, ItemStack, LocationTag, World};
use tracing::{info, warn};

// ============================================================================
// World
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct EntityEntry {
    pub id: EntityId,
    #[serde(flatten)]
    pub info: EntityInfo,
}

/// Axis-aligned box in one world
#[derive(Debug, Clone, Deserialize)]
pub struct AreaEntry {
    pub name: String,
    pub world: String,
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl AreaEntry {
    fn contains(&self, location: &LocationTag) -> bool {
        let point = [location.x, location.y, location.z];
        self.world == location.world
            && point
                .iter()
                .zip(self.min.iter().zip(self.max.iter()))
                .all(|(p, (lo, hi))| lo <= p && p <= hi)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScenarioWorld {
    pub entities: Vec<EntityEntry>,
    pub inventories: Vec<InventoryId>,
    pub materials: Vec<String>,
    pub areas: Vec<AreaEntry>,
}

impl World for ScenarioWorld {
    fn entity(&self, id: EntityId) -> Option<EntityInfo> {
        self.entities
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.info.clone())
    }

    fn inventory_exists(&self, id: InventoryId) -> bool {
        self.inventories.contains(&id)
    }

    fn is_material(&self, material: &str) -> bool {
        self.materials
            .iter()
            .any(|m| m.eq_ignore_ascii_case(material))
    }

    fn area_contains(&self, area: &str, location: &LocationTag) -> Option<bool> {
        self.areas
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(area))
            .map(|a| a.contains(location))
    }
}

// ============================================================================
// Steps
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Step {
    /// Fire a loot generation event
    Loot {
        #[serde(default)]
        location: Option<LocationTag>,
        #[serde(default)]
        holder: Option<InventoryHolder>,
        #[serde(default)]
        entity: Option<EntityId>,
        #[serde(default)]
        loot: Vec<ItemStack>,
        #[serde(default)]
        cancelled: bool,
    },
    /// Reload all scripts from the config and the scenario
    Reload,
    /// Execute a command line as if a script ran it
    Command {
        line: String,
        #[serde(default)]
        player: Option<EntityId>,
        #[serde(default)]
        npc: Option<EntityId>,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub world: ScenarioWorld,
    /// Scripts loaded after the ones from the config file
    pub scripts: Vec<ScriptConfig>,
    pub steps: Vec<Step>,
}

/// Totals over one scenario run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub events_fired: usize,
    pub scripts_matched: usize,
    pub commands_executed: usize,
    pub failures: usize,
}

impl Scenario {
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse scenario")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("In scenario {}", path.display()))
    }

    /// Config scripts followed by the scenario's own
    pub fn scripting(&self, base: &ScriptingConfig) -> ScriptingConfig {
        let mut scripting = base.clone();
        scripting.scripts.extend(self.scripts.iter().cloned());
        scripting
    }

    /// Run every step in order. Failures are logged and counted, never fatal.
    pub fn run(&self, dispatcher: &mut Dispatcher, base: &ScriptingConfig) -> RunSummary {
        let mut summary = RunSummary::default();
        let scripting = self.scripting(base);

        for (index, step) in self.steps.iter().enumerate() {
            let step_no = index + 1;
            match step {
                Step::Loot {
                    location,
                    holder,
                    entity,
                    loot,
                    cancelled,
                } => {
                    let mut generated = LootGenerateEvent::new(loot.clone());
                    if let Some(location) = location {
                        generated = generated.with_location(location.clone());
                    }
                    if let Some(holder) = holder {
                        generated = generated.with_holder(holder.clone());
                    }
                    if let Some(entity) = entity {
                        generated = generated.with_entity(*entity);
                    }
                    let mut event: RuntimeEvent = generated.into();
                    event.set_cancelled(*cancelled);

                    let report = dispatcher.fire(&mut event, &self.world);
                    summary.events_fired += 1;
                    summary.scripts_matched += report.matched;
                    summary.failures += report.errors.len();
                    for err in &report.errors {
                        warn!("Step {}: {}", step_no, err);
                    }
                    info!(
                        "Step {}: loot is now [{}]{}",
                        step_no,
                        describe_loot(&event),
                        if event.is_cancelled() { " (cancelled)" } else { "" }
                    );
                }
                Step::Reload => {
                    let report = dispatcher.reload(&scripting, &self.world);
                    summary.events_fired += 1;
                    summary.failures += report.errors.len();
                    info!(
                        "Step {}: reloaded {} script(s), {} error(s)",
                        step_no,
                        report.loaded,
                        report.errors.len()
                    );
                }
                Step::Command { line, player, npc } => {
                    let mut invocation = InvocationContext::new(&self.world);
                    if let Some(player) = player {
                        invocation = invocation.with_player(*player);
                    }
                    if let Some(npc) = npc {
                        invocation = invocation.with_npc(*npc);
                    }
                    match dispatcher.execute(line, invocation) {
                        Ok(outcome) => {
                            summary.commands_executed += 1;
                            info!("Step {}: {:?}", step_no, outcome);
                        }
                        Err(e) => {
                            summary.failures += 1;
                            warn!("Step {}: '{}' failed: {}", step_no, line, e);
                        }
                    }
                }
            }
        }

        summary
    }
}

fn describe_loot(event: &RuntimeEvent) -> String {
    match event.kind() {
        EventKind::LootGenerate(generated) => generated
            .loot()
            .iter()
            .map(|stack| format!("{} x{}", stack.material, stack.quantity))
            .collect::<Vec<_>>()
            .join(", "),
        _ => String::new(),
    }
}
