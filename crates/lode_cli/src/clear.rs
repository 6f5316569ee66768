//! `lode clear`: empty the storage root.

use serde_json::json;

use crate::{project, GlobalArgs};

/// Removes every stored artifact and index snapshot.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let ctx = project::open(project::load(global)?)?;
    let removed = ctx.clear()?;

    if global.json {
        let report = json!({
            "storage_root": ctx.storage_root().display().to_string(),
            "removed": removed,
        });
        println!("{report}");
    } else if !global.quiet {
        println!("removed {removed} files from {}", ctx.storage_root().display());
    }
    Ok(0)
}
