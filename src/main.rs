// SPDX-License-Identifier: Apache-2.0

//! Command-line front-end: maps an AIGER design onto K-input LUTs and
//! prints the mapping report.

use std::path::PathBuf;

use clap::Parser;

use lutmap::cut_engine::{CutEngine, MappingGoal};
use lutmap::load_aiger::load_aiger_from_path;
use lutmap::tech_map::TechMapper;

#[derive(Debug, Parser)]
#[command(name = "lutmap")]
#[command(about = "Map an AIGER and-inverter graph onto K-input LUTs")]
struct Args {
    /// Path to the AIGER design (ASCII `aag` or binary `aig`).
    input: PathBuf,

    /// Number of LUT inputs. Must be at least 2.
    #[arg(default_value_t = 6)]
    k: u32,

    /// Keep at most this many cuts per node (0 = no pruning).
    #[arg(default_value_t = 0)]
    c: u32,

    /// Mapping goal: `a` minimizes LUT count, `d` minimizes depth. Only
    /// the first character is significant.
    #[arg(default_value = "a")]
    mode: String,

    /// Print the parsed design before mapping.
    #[arg(long)]
    dump_aig: bool,

    /// Print every AND node's cut set after mapping.
    #[arg(long)]
    dump_cuts: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let goal = if args.mode.starts_with('d') {
        MappingGoal::MinimizeDelay
    } else {
        MappingGoal::MinimizeArea
    };

    let aig = load_aiger_from_path(&args.input)?;
    if args.dump_aig {
        print!("{}", aig);
    }

    let engine = CutEngine::new(&aig, goal, args.k, args.c)?;
    let mut mapper = TechMapper::new(engine);
    mapper.run()?;
    print!("{}", mapper.report()?);

    if args.dump_cuts {
        print!("{}", mapper.engine());
    }

    Ok(())
}
