use std::{env::var, path::PathBuf};

pub const STORE_FILENAME: &str = ".opencrm.json";

/// `$OPENCRM_STORE`, or `~/.opencrm.json`.
pub fn opencrm_store() -> PathBuf {
    var("OPENCRM_STORE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs::home_dir().unwrap_or("/".into()).join(STORE_FILENAME))
}
