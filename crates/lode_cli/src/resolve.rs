//! `lode resolve`: search-path lookups.

use std::path::PathBuf;

use lode::{LodeContext, Resolution};
use serde::Serialize;

use crate::{project, GlobalArgs, ResolveArgs};

#[derive(Debug, Serialize)]
struct ResolveReport<'a> {
    name: &'a str,
    resolution: Resolution,
}

/// Resolves every name and prints one line per name.
///
/// Returns exit code 0 if every name was found, 1 otherwise.
pub fn run(args: &ResolveArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let mut config = project::load(global)?;
    if !args.path.is_empty() {
        config.search.path = args.path.iter().map(PathBuf::from).collect();
    }
    if !args.ext.is_empty() {
        config.search.extensions = args.ext.clone();
    }
    let ctx = project::open(config)?;

    let reports = resolve_all(&ctx, &args.names);
    print_reports(&reports, global)?;
    Ok(if reports.iter().all(|r| r.resolution.is_found()) {
        0
    } else {
        1
    })
}

fn resolve_all<'a>(ctx: &LodeContext, names: &'a [String]) -> Vec<ResolveReport<'a>> {
    names
        .iter()
        .map(|name| ResolveReport {
            name,
            resolution: ctx.resolve(name),
        })
        .collect()
}

fn print_reports(
    reports: &[ResolveReport<'_>],
    global: &GlobalArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    if global.json {
        println!("{}", serde_json::to_string_pretty(reports)?);
        return Ok(());
    }
    for report in reports {
        match &report.resolution {
            Resolution::Found(path) => println!("{}\t{}", report.name, path.display()),
            Resolution::NotFound if !global.quiet => eprintln!("{}: not found", report.name),
            Resolution::NotFound => {}
        }
    }
    Ok(())
}
