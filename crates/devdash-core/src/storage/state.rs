//! Timer state saved between CLI runs.

use std::path::Path;

use crate::error::Result;
use crate::timer::TimerState;

pub fn save_timer_state(path: &Path, state: &TimerState) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_string_pretty(state)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, data)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// `None` when nothing was saved yet.
pub fn load_timer_state(path: &Path) -> Result<Option<TimerState>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&content)?))
}
