use serde::{Deserialize, Serialize};

use crate::list::strip_prefix_ignore_case;
use crate::{ObjectError, ObjectTag, Value, ValueKind, World};

const PREFIX: &str = "i@";

/// Native host item stack
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemStack {
    pub material: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

impl ItemStack {
    pub fn new(material: impl Into<String>, quantity: u32) -> Self {
        Self {
            material: material.into(),
            quantity,
        }
    }
}

/// Snapshot of an item stack.
///
/// Text form is `i@<material>`, with `[quantity=<n>]` appended when the
/// quantity is not 1. A bare material name also parses. Empty stacks
/// (quantity 0) are valid; hosts hand them out for cleared slots.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemRef {
    stack: ItemStack,
}

impl ItemRef {
    /// Materials are normalized to lower case
    pub fn new(stack: ItemStack) -> Self {
        Self {
            stack: ItemStack {
                material: stack.material.to_lowercase(),
                quantity: stack.quantity,
            },
        }
    }

    pub fn stack(&self) -> &ItemStack {
        &self.stack
    }

    pub fn material(&self) -> &str {
        &self.stack.material
    }

    pub fn quantity(&self) -> u32 {
        self.stack.quantity
    }

    /// Convert into the native host representation
    pub fn into_item_stack(self) -> ItemStack {
        self.stack
    }
}

impl From<ItemStack> for ItemRef {
    fn from(stack: ItemStack) -> Self {
        Self::new(stack)
    }
}

impl From<&ItemStack> for ItemRef {
    fn from(stack: &ItemStack) -> Self {
        Self::new(stack.clone())
    }
}

impl ObjectTag for ItemRef {
    const KIND: ValueKind = ValueKind::Item;

    fn identify(&self) -> String {
        if self.stack.quantity == 1 {
            format!("{PREFIX}{}", self.stack.material)
        } else {
            format!(
                "{PREFIX}{}[quantity={}]",
                self.stack.material, self.stack.quantity
            )
        }
    }

    fn value_of(text: &str, world: &dyn World) -> Result<Self, ObjectError> {
        let trimmed = text.trim();
        let body = strip_prefix_ignore_case(trimmed, PREFIX).unwrap_or(trimmed);

        let (material, quantity) = match body.split_once('[') {
            None => (body, 1),
            Some((material, properties)) => {
                let quantity = properties
                    .strip_suffix(']')
                    .and_then(|p| p.trim().strip_prefix("quantity="))
                    .and_then(|q| q.trim().parse::<u32>().ok())
                    .ok_or_else(|| ObjectError::malformed(ValueKind::Item, text))?;
                (material, quantity)
            }
        };

        let material = material.trim().to_lowercase();
        if material.is_empty() {
            return Err(ObjectError::malformed(ValueKind::Item, text));
        }
        if !world.is_material(&material) {
            return Err(ObjectError::UnknownMaterial(material));
        }
        Ok(Self::new(ItemStack::new(material, quantity)))
    }

    fn into_value(self) -> Value {
        Value::Item(self)
    }

    fn from_value(value: &Value, world: &dyn World) -> Result<Self, ObjectError> {
        match value {
            Value::Item(item) => Ok(item.clone()),
            other => Self::value_of(&other.identify(), world),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockWorld;

    #[test]
    fn test_bare_material_parses() {
        let world = MockWorld::new();
        let item = ItemRef::value_of("Diamond", &world).unwrap();
        assert_eq!(item.material(), "diamond");
        assert_eq!(item.quantity(), 1);
        assert_eq!(item.identify(), "i@diamond");
    }

    #[test]
    fn test_quantity_property() {
        let world = MockWorld::new();
        let item = ItemRef::value_of("i@stone[quantity=12]", &world).unwrap();
        assert_eq!(item.clone().into_item_stack(), ItemStack::new("stone", 12));
        assert_eq!(item.identify(), "i@stone[quantity=12]");
    }

    #[test]
    fn test_rejects_bad_items() {
        let world = MockWorld::new();
        assert_eq!(
            ItemRef::value_of("i@dirt", &world),
            Err(ObjectError::UnknownMaterial("dirt".into()))
        );
        for text in ["i@stone[quantity=-1]", "i@stone[color=red]", "i@", "stone[quantity=2"] {
            assert!(
                matches!(
                    ItemRef::value_of(text, &world),
                    Err(ObjectError::Malformed { kind: ValueKind::Item, .. })
                ),
                "expected malformed: {text}"
            );
        }
    }

    #[test]
    fn test_empty_stack_round_trips() {
        let world = MockWorld::new();
        let empty = ItemRef::from(ItemStack::new("stone", 0));
        assert_eq!(empty.identify(), "i@stone[quantity=0]");
        assert_eq!(ItemRef::value_of(&empty.identify(), &world), Ok(empty));
    }

    #[test]
    fn test_native_conversion_normalizes_material() {
        let item = ItemRef::from(ItemStack::new("GOLDEN_APPLE", 2));
        assert_eq!(item.material(), "golden_apple");
    }
}
