//! `loot generates`
//!
//! Fires when loot is generated somewhere in the world, like a chest being
//! opened for the first time.
//!
//! Switches:
//! - `in:<area>` only when the loot generates inside an area
//! - `for:<type>` only when a certain inventory type receives the loot
//!
//! Cancellable.
//!
//! Context:
//! - `entity` the entity that caused the generation, if any
//! - `inventory` the inventory the loot generates into
//! - `items` list of the items being generated
//!
//! Linked player: the causing entity, when the host knows it as a player.
//!
//! Determinations:
//! - `LOOT:<item>|...` replaces the generated items

use serde::{Deserialize, Serialize};
use tagbridge_objects::{
    EntityId, EntityRef, InventoryId, InventoryRef, ItemRef, ItemStack, ListTag, LocationTag,
    ObjectTag, Value, World,
};
use tracing::debug;

use crate::{
    Determination, DeterminationError, EventKind, RuntimeEvent, ScriptEvent, SwitchSubject,
    TriggerDeclaration, base_context, base_determination,
};

pub const NAME: &str = "LootGenerates";

const LOOT_DETERMINATION: &str = "loot";

/// The container receiving generated loot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryHolder {
    pub inventory: InventoryId,
    /// Host inventory type name, e.g. "CHEST"
    pub inventory_type: String,
}

/// Host data for a loot generation
#[derive(Debug, Clone, Default)]
pub struct LootGenerateEvent {
    location: Option<LocationTag>,
    holder: Option<InventoryHolder>,
    entity: Option<EntityId>,
    loot: Vec<ItemStack>,
}

impl LootGenerateEvent {
    pub fn new(loot: Vec<ItemStack>) -> Self {
        Self {
            loot,
            ..Self::default()
        }
    }

    pub fn with_location(mut self, location: LocationTag) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_holder(mut self, holder: InventoryHolder) -> Self {
        self.holder = Some(holder);
        self
    }

    pub fn with_entity(mut self, entity: EntityId) -> Self {
        self.entity = Some(entity);
        self
    }

    pub fn location(&self) -> Option<&LocationTag> {
        self.location.as_ref()
    }

    pub fn holder(&self) -> Option<&InventoryHolder> {
        self.holder.as_ref()
    }

    pub fn entity(&self) -> Option<EntityId> {
        self.entity
    }

    /// The working loot collection
    pub fn loot(&self) -> &[ItemStack] {
        &self.loot
    }

    pub fn set_loot(&mut self, loot: Vec<ItemStack>) {
        self.loot = loot;
    }
}

/// Handler for [`LootGenerateEvent`]
#[derive(Debug, Default)]
pub struct LootGenerateScriptEvent;

impl LootGenerateScriptEvent {
    fn event<'a>(&self, event: &'a RuntimeEvent) -> Option<&'a LootGenerateEvent> {
        match event.kind() {
            EventKind::LootGenerate(loot) => Some(loot),
            _ => None,
        }
    }
}

impl ScriptEvent for LootGenerateScriptEvent {
    fn name(&self) -> &'static str {
        NAME
    }

    fn cancellable(&self) -> bool {
        true
    }

    fn switches(&self) -> &'static [&'static str] {
        &["for"]
    }

    fn could_match(&self, path: &TriggerDeclaration) -> bool {
        path.event_lower().starts_with("loot generates")
    }

    fn switch_subject(&self, event: &RuntimeEvent, name: &str) -> SwitchSubject {
        let Some(loot) = self.event(event) else {
            return SwitchSubject::Missing;
        };
        match name {
            "for" => match loot.holder() {
                Some(holder) => SwitchSubject::Value(holder.inventory_type.to_lowercase()),
                None => SwitchSubject::Missing,
            },
            _ => SwitchSubject::Unsupported,
        }
    }

    fn get_context(&self, event: &RuntimeEvent, world: &dyn World, name: &str) -> Option<Value> {
        let Some(loot) = self.event(event) else {
            return base_context(event, name);
        };
        match name {
            "inventory" => loot
                .holder()
                .map(|holder| InventoryRef::new(holder.inventory).into_value()),
            "entity" => loot
                .entity()
                .filter(|id| world.entity(*id).is_some())
                .map(|id| EntityRef::new(id).into_value()),
            "items" => {
                let items: Vec<ItemRef> = loot.loot().iter().map(ItemRef::from).collect();
                Some(ListTag::from_objects(&items).into_value())
            }
            _ => base_context(event, name),
        }
    }

    fn linked_player(&self, event: &RuntimeEvent, world: &dyn World) -> Option<EntityId> {
        self.event(event)?
            .entity()
            .filter(|id| world.entity(*id).is_some_and(|info| info.is_player))
    }

    fn apply_determination(
        &self,
        path: &TriggerDeclaration,
        event: &mut RuntimeEvent,
        world: &dyn World,
        determination: &Determination,
    ) -> Result<bool, DeterminationError> {
        if let Determination::Tagged { kind, payload } = determination {
            if kind == LOOT_DETERMINATION {
                let list = ListTag::parse(payload);
                let mut new_loot = Vec::with_capacity(list.len());
                for element in list.iter() {
                    let item = ItemRef::value_of(element, world).map_err(|source| {
                        DeterminationError::MalformedPayload {
                            kind: kind.clone(),
                            element: element.to_string(),
                            source,
                        }
                    })?;
                    new_loot.push(item.into_item_stack());
                }
                if let EventKind::LootGenerate(loot) = event.kind_mut() {
                    debug!(
                        target: "events",
                        "{} replaced loot with {} item(s)",
                        path,
                        new_loot.len()
                    );
                    loot.set_loot(new_loot);
                    return Ok(true);
                }
            }
        }
        base_determination(self.cancellable(), event, determination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScriptLocation;
    use std::collections::HashMap;
    use tagbridge_objects::EntityInfo;

    struct TestWorld;

    impl World for TestWorld {
        fn entity(&self, id: EntityId) -> Option<EntityInfo> {
            match id {
                EntityId(1) => Some(EntityInfo::player("Alex", true)),
                EntityId(2) => Some(EntityInfo::npc("Guard", true)),
                _ => None,
            }
        }

        fn inventory_exists(&self, id: InventoryId) -> bool {
            id == InventoryId(10)
        }

        fn is_material(&self, material: &str) -> bool {
            matches!(material, "diamond" | "stone" | "bread")
        }

        fn area_contains(&self, area: &str, location: &LocationTag) -> Option<bool> {
            let areas: HashMap<&str, (f64, f64)> = HashMap::from([("vault", (0.0, 10.0))]);
            areas
                .get(area)
                .map(|(min, max)| location.x >= *min && location.x <= *max)
        }
    }

    fn declaration(line: &str) -> TriggerDeclaration {
        TriggerDeclaration::parse(line, ScriptLocation::new("loot_test", 3)).unwrap()
    }

    fn chest_event(inventory_type: &str) -> RuntimeEvent {
        LootGenerateEvent::new(vec![ItemStack::new("bread", 2)])
            .with_location(LocationTag::new(5.0, 64.0, 5.0, "world"))
            .with_holder(InventoryHolder {
                inventory: InventoryId(10),
                inventory_type: inventory_type.to_string(),
            })
            .with_entity(EntityId(1))
            .into()
    }

    #[test]
    fn test_could_match_on_prefix() {
        let handler = LootGenerateScriptEvent;
        assert!(handler.could_match(&declaration("on loot generates")));
        assert!(handler.could_match(&declaration("loot generates for:chest")));
        assert!(!handler.could_match(&declaration("on reload scripts")));
    }

    #[test]
    fn test_matches_rejects_other_event_names() {
        let handler = LootGenerateScriptEvent;
        let event = chest_event("CHEST");
        assert!(!handler.matches(&declaration("on reload scripts"), &event, &TestWorld));
        assert!(!handler.matches(&declaration("on player breaks block"), &event, &TestWorld));
        assert!(handler.matches(&declaration("on loot generates"), &event, &TestWorld));
    }

    #[test]
    fn test_for_switch() {
        let handler = LootGenerateScriptEvent;
        let path = declaration("on loot generates for:chest");
        assert!(handler.matches(&path, &chest_event("CHEST"), &TestWorld));
        assert!(!handler.matches(&path, &chest_event("FURNACE"), &TestWorld));
    }

    #[test]
    fn test_for_switch_without_holder_is_non_match() {
        let handler = LootGenerateScriptEvent;
        let event: RuntimeEvent = LootGenerateEvent::new(Vec::new()).into();
        assert!(!handler.matches(&declaration("loot generates for:chest"), &event, &TestWorld));
        assert!(handler.matches(&declaration("loot generates"), &event, &TestWorld));
    }

    #[test]
    fn test_in_switch() {
        let handler = LootGenerateScriptEvent;
        let event = chest_event("CHEST");
        assert!(handler.matches(&declaration("loot generates in:vault"), &event, &TestWorld));
        assert!(!handler.matches(&declaration("loot generates in:nowhere"), &event, &TestWorld));
        let either = declaration("loot generates in:nowhere|vault");
        assert!(handler.matches(&either, &event, &TestWorld));
    }

    #[test]
    fn test_context_keys() {
        let handler = LootGenerateScriptEvent;
        let event = chest_event("CHEST");
        assert_eq!(
            handler.get_context(&event, &TestWorld, "inventory"),
            Some(Value::Inventory(InventoryRef::new(InventoryId(10))))
        );
        assert_eq!(
            handler.get_context(&event, &TestWorld, "entity"),
            Some(Value::Entity(EntityRef::new(EntityId(1))))
        );
        assert_eq!(
            handler
                .get_context(&event, &TestWorld, "items")
                .map(|v| v.identify()),
            Some("i@bread[quantity=2]".to_string())
        );
        assert_eq!(
            handler.get_context(&event, &TestWorld, "cancelled"),
            Some(Value::element("false"))
        );
        assert_eq!(handler.get_context(&event, &TestWorld, "nonsense"), None);
    }

    #[test]
    fn test_entity_context_requires_known_entity() {
        let handler = LootGenerateScriptEvent;
        let event: RuntimeEvent = LootGenerateEvent::new(Vec::new())
            .with_entity(EntityId(99))
            .into();
        assert_eq!(handler.get_context(&event, &TestWorld, "entity"), None);
        assert_eq!(handler.get_context(&event, &TestWorld, "inventory"), None);
    }

    #[test]
    fn test_linked_player_is_the_causing_player() {
        let handler = LootGenerateScriptEvent;
        assert_eq!(handler.linked_player(&chest_event("CHEST"), &TestWorld), Some(EntityId(1)));

        for entity in [EntityId(2), EntityId(99)] {
            let event: RuntimeEvent = LootGenerateEvent::new(Vec::new()).with_entity(entity).into();
            assert_eq!(handler.linked_player(&event, &TestWorld), None);
        }
        let nobody: RuntimeEvent = LootGenerateEvent::new(Vec::new()).into();
        assert_eq!(handler.linked_player(&nobody, &TestWorld), None);
    }

    #[test]
    fn test_loot_determination_replaces_items() {
        let handler = LootGenerateScriptEvent;
        let path = declaration("on loot generates");
        let mut event = chest_event("CHEST");

        let determination = Determination::parse(&Value::element("LOOT:diamond|diamond"));
        let accepted = handler
            .apply_determination(&path, &mut event, &TestWorld, &determination)
            .unwrap();
        assert!(accepted);

        let items = handler.get_context(&event, &TestWorld, "items").unwrap();
        assert_eq!(items.as_list().map(|l| l.len()), Some(2));
        let EventKind::LootGenerate(loot) = event.kind() else {
            panic!("wrong event kind");
        };
        assert_eq!(loot.loot(), &[ItemStack::new("diamond", 1), ItemStack::new("diamond", 1)]);
    }

    #[test]
    fn test_malformed_loot_leaves_event_untouched() {
        let handler = LootGenerateScriptEvent;
        let path = declaration("on loot generates");
        let mut event = chest_event("CHEST");

        let determination = Determination::parse(&Value::element("loot:diamond|unobtainium"));
        let err = handler
            .apply_determination(&path, &mut event, &TestWorld, &determination)
            .unwrap_err();
        assert!(matches!(
            err,
            DeterminationError::MalformedPayload { ref element, .. } if element == "unobtainium"
        ));
        let EventKind::LootGenerate(loot) = event.kind() else {
            panic!("wrong event kind");
        };
        assert_eq!(loot.loot(), &[ItemStack::new("bread", 2)]);
    }

    #[test]
    fn test_cancellation_determinations() {
        let handler = LootGenerateScriptEvent;
        let path = declaration("on loot generates");
        let mut event = chest_event("CHEST");

        let cancel = Determination::parse(&Value::element("cancelled"));
        assert!(handler.apply_determination(&path, &mut event, &TestWorld, &cancel).unwrap());
        assert!(event.is_cancelled());

        let uncancel = Determination::parse(&Value::element("cancelled:false"));
        assert!(handler.apply_determination(&path, &mut event, &TestWorld, &uncancel).unwrap());
        assert!(!event.is_cancelled());

        let unknown = Determination::parse(&Value::element("xp:10"));
        assert!(!handler.apply_determination(&path, &mut event, &TestWorld, &unknown).unwrap());
    }
}
