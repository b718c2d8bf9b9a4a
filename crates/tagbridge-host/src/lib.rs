/// Host runtime for the tagbridge script bridge
///
/// Holds the event and command registries, loads trigger scripts, and
/// dispatches live events and command lines to them.
pub mod config;
pub mod dispatcher;
pub mod registry;
pub mod script;

pub use config::{
    BridgeConfig, ConfigLoadError, ConfigSaveError, LoggingConfig, ScriptConfig, ScriptingConfig,
    project_dirs,
};
pub use dispatcher::{Dispatcher, FireReport, LoadReport, ScriptError};
pub use registry::{CommandRegistry, EventRegistry};
pub use script::{
    ConfigScriptBody, ScriptBody, ScriptScope, StaticDeterminations, TriggerScript,
};
