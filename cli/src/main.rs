use std::error::Error;

use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use floorstat_crossing::{
    ClockRegionGrid, CrossingCounter, CrossingError, PblockGrid, uniform_grid_crossing,
};
use floorstat_device::{Design, PlacedDesign};
use floorstat_pblock::{ReconstructOptions, reconstruct};
use floorstat_utilization::{compute_all_utilization, compute_utilization, utilization_json};
use indicatif::ProgressBar;
use simple_error::bail;
use tracing::info;

fn load_design(m: &ArgMatches) -> Result<Design, Box<dyn Error>> {
    let path = m.get_one::<String>("design").unwrap();
    let design = Design::from_file(path)?;
    info!("loaded {name} on {device}", name = design.name, device = design.device);
    Ok(design)
}

fn print_json(value: &serde_json::Value) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn design_arg() -> Arg {
    Arg::new("design")
        .required(true)
        .value_parser(value_parser!(String))
}

fn main() -> Result<(), Box<dyn Error>> {
    let m = Command::new("floorstat")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::Count),
        )
        .subcommand(
            Command::new("crossing-cr")
                .about("Crossing counts between adjacent clock regions")
                .arg(design_arg())
                .arg(
                    Arg::new("col")
                        .long("col")
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("row")
                        .long("row")
                        .value_parser(value_parser!(usize)),
                ),
        )
        .subcommand(
            Command::new("crossing-pblock")
                .about("Crossing counts between adjacent pblocks of the design's constraints")
                .arg(design_arg())
                .arg(
                    Arg::new("cols")
                        .required(true)
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("rows")
                        .required(true)
                        .value_parser(value_parser!(usize)),
                ),
        )
        .subcommand(
            Command::new("utilization")
                .about("Resource utilization per pblock")
                .arg(design_arg())
                .arg(
                    Arg::new("pblock")
                        .long("pblock")
                        .value_parser(value_parser!(String)),
                ),
        )
        .get_matches();

    let log_level = match m.get_count("verbose") {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    match m.subcommand() {
        Some(("crossing-cr", m)) => {
            let col = m.get_one::<usize>("col").copied();
            let row = m.get_one::<usize>("row").copied();
            let design = load_design(m)?;
            match (col, row) {
                (Some(col), Some(row)) => match uniform_grid_crossing(&design.device, col, row) {
                    Ok(crossing) => {
                        print_json(&serde_json::json!({
                            col.to_string(): { row.to_string(): crossing.to_json() }
                        }))?;
                    }
                    Err(e @ CrossingError::InvalidCoordinate { .. }) => {
                        eprintln!("{e}");
                    }
                    Err(e) => return Err(e.into()),
                },
                (None, None) => {
                    let grid = ClockRegionGrid::new(&design.device);
                    let table = CrossingCounter::new(&grid)
                        .with_progress(ProgressBar::new(0))
                        .run()?;
                    print_json(&table.to_json())?;
                }
                _ => bail!("--col and --row must be given together"),
            }
        }
        Some(("crossing-pblock", m)) => {
            let cols = *m.get_one::<usize>("cols").unwrap();
            let rows = *m.get_one::<usize>("rows").unwrap();
            let design = load_design(m)?;
            let map = reconstruct(
                design.fabric(),
                design.constraint_lines(),
                ReconstructOptions::crossing(),
            )?;
            info!("reconstructed {n} pblocks", n = map.len());
            let grid = PblockGrid::new(map, cols, rows)?;
            let table = CrossingCounter::new(&grid)
                .with_progress(ProgressBar::new(0))
                .run()?;
            print_json(&table.to_json())?;
        }
        Some(("utilization", m)) => {
            let design = load_design(m)?;
            match m.get_one::<String>("pblock") {
                Some(name) => {
                    let util = compute_utilization(&design, name)?;
                    print_json(&serde_json::json!({ name.as_str(): util.to_json() }))?;
                }
                None => {
                    let report = compute_all_utilization(&design)?;
                    if report.is_empty() {
                        bail!("{name} defines no pblocks", name = design.name);
                    }
                    print_json(&utilization_json(&report))?;
                }
            }
        }
        _ => unreachable!(),
    }
    Ok(())
}
