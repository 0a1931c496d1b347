pub mod check;
pub mod delete;
pub mod play;
pub mod slots;

use std::path::Path;

use tale_script::{CompiledScript, DEMO_SCRIPT};
use tale_session::{DirStore, SessionConfig};

/// Load a compiled script, or the bundled demo when no path is given.
fn load_script(path: Option<&Path>) -> Result<CompiledScript, String> {
    let json = match path {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?,
        None => DEMO_SCRIPT.to_string(),
    };
    CompiledScript::from_json(&json).map_err(|e| format!("invalid script: {e}"))
}

/// Load a session config file, or the defaults.
fn load_config(path: Option<&Path>) -> Result<SessionConfig, String> {
    let Some(path) = path else {
        return Ok(SessionConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    SessionConfig::from_json(&json).map_err(|e| format!("invalid config: {e}"))
}

/// Open the save directory.
fn open_saves(dir: &Path) -> Result<DirStore, String> {
    DirStore::open(dir).map_err(|e| format!("cannot open {}: {e}", dir.display()))
}
