//! Line-oriented entry point: reads the road-map protocol from standard
//! input, applies it to a fresh [`roadmap_router::RoadMap`], and writes
//! `getRouteDescription` output / `ERROR <n>` diagnostics to standard
//! output/error.

use clap::{crate_version, App};
use std::io::{self, Write};

use roadmap_router::cli;

fn main() -> io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"));

    let _matches = App::new("National Road Map")
        .version(crate_version!())
        .about("Maintains a road map of cities, roads and national routes from a line-oriented stdin protocol")
        .get_matches();

    log::info!("reading road-map protocol from stdin");

    let stdin = io::stdin();
    let stdout = io::stdout();
    let stderr = io::stderr();
    let result = cli::run(stdin.lock(), &mut stdout.lock(), &mut stderr.lock());
    stdout.lock().flush()?;
    result
}
