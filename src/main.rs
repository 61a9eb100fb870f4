//! Timberchain - Command Line Interface
//!
//! This is the main entry point for the production chain planner.
//! Run with `--help` to see all available options.

use clap::{Parser, Subcommand, ValueEnum};
use std::error::Error;
use std::path::PathBuf;

use timberchain::{
    aggregate::totals,
    chain::{resolve_for_facility, resolve_for_product},
    data::{load_all_data, parse_quantity},
    display::{display_alternatives, display_report, format_totals, format_tree, to_dot},
    models::{Faction, Quantity},
    optimizer::{select_best, Criterion},
    ProductionChain, DEFAULT_RATE,
};

/// Command-line arguments for Timberchain.
#[derive(Parser, Debug)]
#[command(name = "timberchain")]
#[command(author, version, about = "Plan the facilities needed to sustain a production rate in Timberborn", long_about = None)]
struct Args {
    /// Directory holding factions.csv and the faction tables
    #[arg(short, long, default_value = "data")]
    data: PathBuf,

    /// Log resolution steps to stderr
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List factions in catalogue order
    Factions,

    /// List the products a faction can make
    Products {
        faction: String,
    },

    /// Plan the chain sustaining a product rate
    Product {
        faction: String,
        product: String,

        /// Target rate per hour, e.g. "4", "2.5" or "16 + 2/3"
        #[arg(short, long, default_value = DEFAULT_RATE, value_parser = parse_rate)]
        rate: Quantity,

        /// Print every recipe alternative instead of selecting one
        #[arg(long)]
        all: bool,

        /// Selection criteria, in priority order
        #[arg(long, value_delimiter = ',', default_values_t = Criterion::DEFAULT)]
        criteria: Vec<Criterion>,

        #[arg(short, long, value_enum, default_value_t = Format::Report)]
        format: Format,
    },

    /// Plan the chain feeding a number of single-recipe facilities
    Facility {
        faction: String,
        facility: String,

        /// Number of facilities, e.g. "4" or "1 + 1/2"
        #[arg(short, long, default_value = "1", value_parser = parse_rate)]
        count: Quantity,

        /// Selection criteria, in priority order
        #[arg(long, value_delimiter = ',', default_values_t = Criterion::DEFAULT)]
        criteria: Vec<Criterion>,

        #[arg(short, long, value_enum, default_value_t = Format::Report)]
        format: Format,
    },
}

/// Output format for a resolved chain.
#[derive(ValueEnum, Clone, Copy, Debug)]
enum Format {
    /// Tree, totals, raw materials and power summary
    Report,
    /// Indented tree only
    Tree,
    /// Facility totals only
    Totals,
    /// Graphviz DOT source
    Dot,
}

fn parse_rate(value: &str) -> Result<Quantity, String> {
    parse_quantity(value).map_err(|e| format!("invalid quantity '{}': {}", value, e))
}

fn print_chain(faction: &Faction, chain: &ProductionChain, format: Format) {
    match format {
        Format::Report => display_report(faction, chain),
        Format::Tree => print!("{}", format_tree(chain)),
        Format::Totals => println!("{}", format_totals(&totals(chain))),
        Format::Dot => print!("{}", to_dot(chain)),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .with_writer(std::io::stderr)
        .init();

    if !args.data.exists() {
        eprintln!(
            "Error: data directory '{}' not found. Use --data or run from the project root.",
            args.data.display()
        );
        std::process::exit(1);
    }
    let game_data = load_all_data(&args.data)?;

    match args.command {
        Command::Factions => {
            for name in game_data.get_factions() {
                println!("{}", name);
            }
        }
        Command::Products { faction } => {
            for product in game_data.get_products(&faction)? {
                println!("{}", product);
            }
        }
        Command::Product {
            faction,
            product,
            rate,
            all,
            criteria,
            format,
        } => {
            let faction = game_data.get_faction(&faction)?;
            let chains = resolve_for_product(faction, &product, rate)?;
            if all {
                display_alternatives(&chains);
            } else if let Some(best) = select_best(&chains, &criteria) {
                print_chain(faction, &best, format);
            }
        }
        Command::Facility {
            faction,
            facility,
            count,
            criteria,
            format,
        } => {
            let faction = game_data.get_faction(&faction)?;
            let chain = resolve_for_facility(faction, &facility, count)?;
            if let Some(best) = select_best(std::slice::from_ref(&chain), &criteria) {
                print_chain(faction, &best, format);
            }
        }
    }

    Ok(())
}
