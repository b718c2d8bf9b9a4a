/// Typed tag values for tagbridge
///
/// Every value a script can see or return is one of the variants of [`Value`].
/// Each variant has a canonical text form (`identify`) and a parse function
/// (`value_of`) that reads that form back.
use std::fmt;

pub mod element;
pub mod entity;
pub mod inventory;
pub mod item;
pub mod list;
pub mod location;

pub use element::ElementTag;
pub use entity::{EntityId, EntityInfo, EntityRef};
pub use inventory::{InventoryId, InventoryRef};
pub use item::{ItemRef, ItemStack};
pub use list::ListTag;
pub use location::LocationTag;

// ============================================================================
// Host object model
// ============================================================================

/// Read-only view of the host's object model.
///
/// Used to validate handles and materials while parsing values, and to answer
/// area membership for location scoping.
pub trait World {
    /// Look up a live entity. `None` if the host no longer knows it.
    fn entity(&self, id: EntityId) -> Option<EntityInfo>;

    /// Whether the host has an inventory with this id
    fn inventory_exists(&self, id: InventoryId) -> bool;

    /// Whether `material` (lower-case) names a known item material
    fn is_material(&self, material: &str) -> bool;

    /// Whether `location` lies inside the named area. `None` when the host
    /// has no area with that name.
    fn area_contains(&self, area: &str, location: &LocationTag) -> Option<bool> {
        let _ = (area, location);
        None
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Errors raised while converting text or values into a typed tag
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ObjectError {
    #[error("'{text}' is not a valid {kind}")]
    Malformed { kind: ValueKind, text: String },
    #[error("entity {0} does not exist")]
    UnknownEntity(EntityId),
    #[error("inventory {0} does not exist")]
    UnknownInventory(InventoryId),
    #[error("'{0}' is not a known material")]
    UnknownMaterial(String),
}

impl ObjectError {
    pub(crate) fn malformed(kind: ValueKind, text: impl Into<String>) -> Self {
        ObjectError::Malformed {
            kind,
            text: text.into(),
        }
    }
}

// ============================================================================
// Value
// ============================================================================

/// Discriminant of a [`Value`] variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Element,
    List,
    Entity,
    Item,
    Inventory,
    Location,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Element => "element",
            ValueKind::List => "list",
            ValueKind::Entity => "entity",
            ValueKind::Item => "item",
            ValueKind::Inventory => "inventory",
            ValueKind::Location => "location",
        };
        f.write_str(name)
    }
}

/// A typed tag object.
///
/// Implementors must satisfy `T::value_of(&t.identify(), r) == Ok(t)` for
/// every value they produce.
pub trait ObjectTag: Sized {
    const KIND: ValueKind;

    /// Canonical text form
    fn identify(&self) -> String;

    /// Parse the text form back into a value
    fn value_of(text: &str, world: &dyn World) -> Result<Self, ObjectError>;

    fn into_value(self) -> Value;

    /// Convert any value into this type, going through its text form when
    /// the variant does not already match
    fn from_value(value: &Value, world: &dyn World) -> Result<Self, ObjectError> {
        Self::value_of(&value.identify(), world)
    }
}

/// Snapshot of a script-visible value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Element(ElementTag),
    List(ListTag),
    Entity(EntityRef),
    Item(ItemRef),
    Inventory(InventoryRef),
    Location(LocationTag),
}

impl Value {
    /// Shorthand for a plain element value
    pub fn element(text: impl Into<String>) -> Self {
        Value::Element(ElementTag::new(text))
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Element(_) => ValueKind::Element,
            Value::List(_) => ValueKind::List,
            Value::Entity(_) => ValueKind::Entity,
            Value::Item(_) => ValueKind::Item,
            Value::Inventory(_) => ValueKind::Inventory,
            Value::Location(_) => ValueKind::Location,
        }
    }

    pub fn identify(&self) -> String {
        match self {
            Value::Element(v) => v.identify(),
            Value::List(v) => v.identify(),
            Value::Entity(v) => v.identify(),
            Value::Item(v) => v.identify(),
            Value::Inventory(v) => v.identify(),
            Value::Location(v) => v.identify(),
        }
    }

    /// Parse `text` as the given kind
    pub fn parse(
        kind: ValueKind,
        text: &str,
        world: &dyn World,
    ) -> Result<Value, ObjectError> {
        Ok(match kind {
            ValueKind::Element => ElementTag::value_of(text, world)?.into_value(),
            ValueKind::List => ListTag::value_of(text, world)?.into_value(),
            ValueKind::Entity => EntityRef::value_of(text, world)?.into_value(),
            ValueKind::Item => ItemRef::value_of(text, world)?.into_value(),
            ValueKind::Inventory => InventoryRef::value_of(text, world)?.into_value(),
            ValueKind::Location => LocationTag::value_of(text, world)?.into_value(),
        })
    }

    pub fn as_element(&self) -> Option<&ElementTag> {
        match self {
            Value::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListTag> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identify())
    }
}

impl From<ElementTag> for Value {
    fn from(value: ElementTag) -> Self {
        Value::Element(value)
    }
}

impl From<ListTag> for Value {
    fn from(value: ListTag) -> Self {
        Value::List(value)
    }
}
