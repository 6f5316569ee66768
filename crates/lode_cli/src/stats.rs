//! `lode stats`: counters after a batch of lookups.

use lode::LodeStats;

use crate::{project, GlobalArgs, StatsArgs};

/// Resolves each name once, optionally saves the index, and prints counters.
pub fn run(args: &StatsArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let ctx = project::open(project::load(global)?)?;
    for name in &args.names {
        ctx.resolve(name);
    }
    if args.save_index {
        let saved = ctx.save_index()?;
        log::info!("saved {saved} directory listings");
    }

    let stats = ctx.stats();
    if global.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print!("{}", render_text(&stats));
    }
    Ok(0)
}

fn render_text(stats: &LodeStats) -> String {
    let s = &stats.search;
    let c = &stats.cache;
    format!(
        "search: {} lookups, {} negative hits, {} listings, {} revalidations, {} rebuilds\n\
         cache:  {} hits, {} misses, {} stale, {} revalidated, {} corrupt, {} write failures\n",
        s.lookups,
        s.negative_hits,
        s.listings,
        s.revalidations,
        s.rebuilds,
        c.hits,
        c.misses,
        c.stale,
        c.revalidated,
        c.corrupt,
        c.write_failures,
    )
}
