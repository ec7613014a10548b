//! `hostprint types`: list the built-in system host types

use std::sync::Arc;

use crate::settings::SettingsStore;
use crate::system;

pub fn execute() -> anyhow::Result<()> {
    let host = system::system_host(Arc::new(SettingsStore::new()));
    for name in host.type_names() {
        println!("{}", name);
    }
    Ok(())
}
