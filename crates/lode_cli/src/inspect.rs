//! `lode inspect`: report what the artifact slot of a source file holds.

use std::path::Path;

use lode::{ArtifactKind, Inspection, SlotState};

use crate::{project, GlobalArgs, InspectArgs, KindArg};

/// Builds the kind whose namespace and option fingerprint the slot is checked
/// against. Inspection never compiles, so the callback only reports that.
fn kind_for(args: &InspectArgs) -> ArtifactKind<std::io::Error> {
    let never = |_: &[u8]| Err(std::io::Error::other("inspect does not compile"));
    let kind = match args.kind {
        KindArg::Code => ArtifactKind::code(never),
        KindArg::Document => ArtifactKind::document(args.format.clone(), never),
    };
    args.flags
        .iter()
        .fold(kind, |kind, flag| kind.with_flag(flag.clone()))
}

/// Prints the slot path, stored header and validity of one source file.
///
/// Returns exit code 0 if the slot would be served, 1 otherwise.
pub fn run(args: &InspectArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let ctx = project::open(project::load(global)?)?;
    let inspection = ctx.inspect(Path::new(&args.file), &kind_for(args))?;

    if global.json {
        println!("{}", serde_json::to_string_pretty(&inspection)?);
    } else {
        print!("{}", render_text(&inspection));
    }

    Ok(match inspection.state {
        SlotState::Fresh { .. } | SlotState::MtimeChanged { .. } => 0,
        _ => 1,
    })
}

fn render_text(inspection: &Inspection) -> String {
    let mut out = format!(
        "source:  {}\nslot:    {}\n",
        inspection.source.display(),
        inspection.slot.display()
    );
    if let Some(header) = &inspection.header {
        out.push_str(&format!(
            "header:  v{} env {:016x} options {:016x}\n\
             source:  {} bytes, mtime {} ns, digest {}\n\
             payload: {} bytes, checksum {}\n",
            header.format_version,
            header.environment,
            header.options,
            header.source.size,
            header.source.mtime_ns,
            header.source_digest,
            header.payload_len,
            header.payload_checksum,
        ));
    }
    let state = match &inspection.state {
        SlotState::Absent => "absent".to_string(),
        SlotState::Corrupt { reason } => format!("corrupt ({reason})"),
        SlotState::Stale { reason } => format!("stale ({reason})"),
        SlotState::MtimeChanged { .. } => "mtime changed (digest check on next load)".to_string(),
        SlotState::Fresh { .. } => "fresh".to_string(),
    };
    out.push_str(&format!("state:   {state}\n"));
    out
}
