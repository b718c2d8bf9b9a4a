use serde::{Deserialize, Serialize};

use crate::list::strip_prefix_ignore_case;
use crate::{ObjectError, ObjectTag, Value, ValueKind, World};

const PREFIX: &str = "l@";

/// A position in a named world. Text form: `l@<x>,<y>,<z>,<world>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationTag {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub world: String,
}

impl LocationTag {
    pub fn new(x: f64, y: f64, z: f64, world: impl Into<String>) -> Self {
        Self {
            x,
            y,
            z,
            world: world.into(),
        }
    }

    /// Distance to another location, `None` across worlds
    pub fn distance(&self, other: &LocationTag) -> Option<f64> {
        if self.world != other.world {
            return None;
        }
        let (dx, dy, dz) = (self.x - other.x, self.y - other.y, self.z - other.z);
        Some((dx * dx + dy * dy + dz * dz).sqrt())
    }
}

impl ObjectTag for LocationTag {
    const KIND: ValueKind = ValueKind::Location;

    fn identify(&self) -> String {
        format!("{PREFIX}{},{},{},{}", self.x, self.y, self.z, self.world)
    }

    fn value_of(text: &str, _world: &dyn World) -> Result<Self, ObjectError> {
        let malformed = || ObjectError::malformed(ValueKind::Location, text);
        let trimmed = text.trim();
        let body = strip_prefix_ignore_case(trimmed, PREFIX).unwrap_or(trimmed);

        let mut parts = body.splitn(4, ',');
        let mut coordinate = || {
            parts
                .next()
                .and_then(|part| part.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite())
        };
        let (Some(x), Some(y), Some(z)) = (coordinate(), coordinate(), coordinate()) else {
            return Err(malformed());
        };
        let world = parts.next().map(str::trim).unwrap_or_default();
        if world.is_empty() {
            return Err(malformed());
        }
        Ok(Self::new(x, y, z, world))
    }

    fn into_value(self) -> Value {
        Value::Location(self)
    }

    fn from_value(value: &Value, world: &dyn World) -> Result<Self, ObjectError> {
        match value {
            Value::Location(location) => Ok(location.clone()),
            other => Self::value_of(&other.identify(), world),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockWorld;

    #[test]
    fn test_parse_location() {
        let world = MockWorld::new();
        let location = LocationTag::value_of("l@10,64.5,-3,world", &world).unwrap();
        assert_eq!(location, LocationTag::new(10.0, 64.5, -3.0, "world"));
        assert_eq!(location.identify(), "l@10,64.5,-3,world");
    }

    #[test]
    fn test_rejects_partial_locations() {
        let world = MockWorld::new();
        assert!(LocationTag::value_of("l@1,2,3", &world).is_err());
        assert!(LocationTag::value_of("l@1,two,3,world", &world).is_err());
    }

    #[test]
    fn test_distance_within_world_only() {
        let a = LocationTag::new(0.0, 0.0, 0.0, "world");
        let b = LocationTag::new(3.0, 4.0, 0.0, "world");
        assert_eq!(a.distance(&b), Some(5.0));
        assert_eq!(a.distance(&LocationTag::new(0.0, 0.0, 0.0, "nether")), None);
    }
}
