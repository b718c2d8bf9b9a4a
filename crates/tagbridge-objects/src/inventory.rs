use serde::{Deserialize, Serialize};
use std::fmt;

use crate::list::strip_prefix_ignore_case;
use crate::{ObjectError, ObjectTag, Value, ValueKind, World};

const PREFIX: &str = "in@";

/// Opaque host handle for an inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InventoryId(pub u64);

impl fmt::Display for InventoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Weak reference to a host inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InventoryRef {
    id: InventoryId,
}

impl InventoryRef {
    pub fn new(id: InventoryId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> InventoryId {
        self.id
    }
}

impl From<InventoryId> for InventoryRef {
    fn from(id: InventoryId) -> Self {
        Self::new(id)
    }
}

impl ObjectTag for InventoryRef {
    const KIND: ValueKind = ValueKind::Inventory;

    fn identify(&self) -> String {
        format!("{PREFIX}{}", self.id)
    }

    fn value_of(text: &str, world: &dyn World) -> Result<Self, ObjectError> {
        let trimmed = text.trim();
        let id = strip_prefix_ignore_case(trimmed, PREFIX)
            .and_then(|body| body.parse::<u64>().ok())
            .map(InventoryId)
            .ok_or_else(|| ObjectError::malformed(ValueKind::Inventory, text))?;
        if !world.inventory_exists(id) {
            return Err(ObjectError::UnknownInventory(id));
        }
        Ok(Self::new(id))
    }

    fn into_value(self) -> Value {
        Value::Inventory(self)
    }

    fn from_value(value: &Value, world: &dyn World) -> Result<Self, ObjectError> {
        match value {
            Value::Inventory(inventory) => Ok(*inventory),
            other => Self::value_of(&other.identify(), world),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockWorld;

    #[test]
    fn test_inventory_requires_prefix_and_existence() {
        let world = MockWorld::new();
        assert_eq!(
            InventoryRef::value_of("in@3", &world),
            Ok(InventoryRef::new(InventoryId(3)))
        );
        assert_eq!(
            InventoryRef::value_of("in@4", &world),
            Err(ObjectError::UnknownInventory(InventoryId(4)))
        );
        assert!(InventoryRef::value_of("3", &world).is_err());
    }
}
