//! `reload scripts`
//!
//! Fires after the host reloads its scripts. Has no location, so `in:`
//! is ignored.
//!
//! Switches: `had_error:<true/false>`
//!
//! Context: `had_error` whether any script failed to load

use tagbridge_objects::{ElementTag, Value, World};

use crate::{EventKind, RuntimeEvent, ScriptEvent, SwitchSubject, TriggerDeclaration, base_context};

pub const NAME: &str = "ScriptsReloaded";

#[derive(Debug, Clone, Default)]
pub struct ScriptsReloadedEvent {
    pub had_error: bool,
}

#[derive(Debug, Default)]
pub struct ScriptsReloadedScriptEvent;

impl ScriptEvent for ScriptsReloadedScriptEvent {
    fn name(&self) -> &'static str {
        NAME
    }

    fn switches(&self) -> &'static [&'static str] {
        &["had_error"]
    }

    fn could_match(&self, path: &TriggerDeclaration) -> bool {
        path.event_lower().starts_with("reload scripts")
    }

    fn switch_subject(&self, event: &RuntimeEvent, name: &str) -> SwitchSubject {
        match (event.kind(), name) {
            (EventKind::ScriptsReloaded(reload), "had_error") => {
                SwitchSubject::Value(reload.had_error.to_string())
            }
            (EventKind::ScriptsReloaded(_), _) => SwitchSubject::Unsupported,
            _ => SwitchSubject::Missing,
        }
    }

    fn get_context(&self, event: &RuntimeEvent, _world: &dyn World, name: &str) -> Option<Value> {
        match (event.kind(), name) {
            (EventKind::ScriptsReloaded(reload), "had_error") => {
                Some(ElementTag::from(reload.had_error).into())
            }
            _ => base_context(event, name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Determination, ScriptLocation};
    use tagbridge_objects::{EntityId, EntityInfo, InventoryId};

    struct NoWorld;

    impl World for NoWorld {
        fn entity(&self, _id: EntityId) -> Option<EntityInfo> {
            None
        }

        fn inventory_exists(&self, _id: InventoryId) -> bool {
            false
        }

        fn is_material(&self, _material: &str) -> bool {
            false
        }
    }

    fn declaration(line: &str) -> TriggerDeclaration {
        TriggerDeclaration::parse(line, ScriptLocation::new("reload_test", 1)).unwrap()
    }

    #[test]
    fn test_in_switch_is_ignored_without_location() {
        let handler = ScriptsReloadedScriptEvent;
        let event: RuntimeEvent = ScriptsReloadedEvent { had_error: false }.into();
        assert!(handler.matches(&declaration("on reload scripts in:spawn"), &event, &NoWorld));
    }

    #[test]
    fn test_had_error_switch_and_context() {
        let handler = ScriptsReloadedScriptEvent;
        let event: RuntimeEvent = ScriptsReloadedEvent { had_error: true }.into();
        assert!(handler.matches(&declaration("reload scripts had_error:true"), &event, &NoWorld));
        assert!(!handler.matches(&declaration("reload scripts had_error:false"), &event, &NoWorld));
        assert_eq!(
            handler.get_context(&event, &NoWorld, "had_error"),
            Some(Value::element("true"))
        );
    }

    #[test]
    fn test_not_cancellable() {
        let handler = ScriptsReloadedScriptEvent;
        let mut event: RuntimeEvent = ScriptsReloadedEvent::default().into();
        let path = declaration("on reload scripts");
        let cancel = Determination::parse(&Value::element("cancelled"));
        assert!(!handler.apply_determination(&path, &mut event, &NoWorld, &cancel).unwrap());
        assert!(!event.is_cancelled());
    }
}
