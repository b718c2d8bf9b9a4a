use serde::{Deserialize, Serialize};
use std::fmt;

use crate::list::strip_prefix_ignore_case;
use crate::{ObjectError, ObjectTag, Value, ValueKind, World};

const PREFIX: &str = "e@";

/// Opaque host handle for an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the host reports about a live entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityInfo {
    /// Entity type name, e.g. "player", "villager"
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub is_player: bool,
    #[serde(default)]
    pub is_npc: bool,
    /// Players: online. Everything else: spawned in the world.
    #[serde(default = "default_spawned")]
    pub spawned: bool,
}

fn default_spawned() -> bool {
    true
}

impl EntityInfo {
    pub fn player(name: impl Into<String>, online: bool) -> Self {
        Self {
            kind: "player".to_string(),
            name: name.into(),
            is_player: true,
            is_npc: false,
            spawned: online,
        }
    }

    pub fn npc(name: impl Into<String>, spawned: bool) -> Self {
        Self {
            kind: "npc".to_string(),
            name: name.into(),
            is_player: false,
            is_npc: true,
            spawned,
        }
    }
}

/// Weak reference to a host entity. Holding one does not keep the entity
/// alive; ask the world for its current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityRef {
    id: EntityId,
}

impl EntityRef {
    pub fn new(id: EntityId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn info(&self, world: &dyn World) -> Option<EntityInfo> {
        world.entity(self.id)
    }

    /// Online for players, spawned for everything else. An entity the host
    /// no longer knows is not spawned.
    pub fn is_spawned(&self, world: &dyn World) -> bool {
        self.info(world).is_some_and(|info| info.spawned)
    }
}

impl From<EntityId> for EntityRef {
    fn from(id: EntityId) -> Self {
        Self::new(id)
    }
}

impl ObjectTag for EntityRef {
    const KIND: ValueKind = ValueKind::Entity;

    fn identify(&self) -> String {
        format!("{PREFIX}{}", self.id)
    }

    fn value_of(text: &str, world: &dyn World) -> Result<Self, ObjectError> {
        let body = strip_prefix_ignore_case(text.trim(), PREFIX).unwrap_or(text.trim());
        let id = body
            .parse::<u64>()
            .map(EntityId)
            .map_err(|_| ObjectError::malformed(ValueKind::Entity, text))?;
        if world.entity(id).is_none() {
            return Err(ObjectError::UnknownEntity(id));
        }
        Ok(Self::new(id))
    }

    fn into_value(self) -> Value {
        Value::Entity(self)
    }

    fn from_value(value: &Value, world: &dyn World) -> Result<Self, ObjectError> {
        match value {
            Value::Entity(entity) => Ok(*entity),
            other => Self::value_of(&other.identify(), world),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockWorld;

    #[test]
    fn test_identify_and_parse() {
        let world = MockWorld::new();
        let entity = EntityRef::new(EntityId(7));
        assert_eq!(entity.identify(), "e@7");
        assert_eq!(EntityRef::value_of("e@7", &world), Ok(entity));
        assert_eq!(EntityRef::value_of("E@7", &world), Ok(entity));
        assert_eq!(EntityRef::value_of("7", &world), Ok(entity));
    }

    #[test]
    fn test_unknown_and_malformed_entities() {
        let world = MockWorld::new();
        assert_eq!(
            EntityRef::value_of("e@99", &world),
            Err(ObjectError::UnknownEntity(EntityId(99)))
        );
        assert!(matches!(
            EntityRef::value_of("e@steve", &world),
            Err(ObjectError::Malformed { kind: ValueKind::Entity, .. })
        ));
    }

    #[test]
    fn test_reference_is_weak() {
        let mut world = MockWorld::new();
        let entity = EntityRef::new(EntityId(7));
        assert!(entity.is_spawned(&world));

        world.entities.clear();
        assert!(!entity.is_spawned(&world));
        assert_eq!(entity.id(), EntityId(7));
    }
}
