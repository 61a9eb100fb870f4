//! # Timberchain
//!
//! A command-line tool and library for planning production chains in Timberborn.
//!
//! Given a faction's catalogue of facilities and recipes, this crate computes
//! which facilities, and exactly how many of each, are needed to sustain a
//! target output rate of a product:
//!
//! - Every quantity is an exact rational, so counts like `16 + 2/3` stay exact
//!   through deep chains
//! - When several recipes produce the same input, every alternative is resolved
//! - A separate selection pass narrows alternatives by workers, power, area or space
//!
//! ## Modules
//!
//! - [`models`] - Catalogue data structures and lookups
//! - [`data`] - CSV catalogue loading and quantity parsing
//! - [`chain`] - Production chain resolution
//! - [`aggregate`] - Totals and cost extraction over chains
//! - [`optimizer`] - Selection of the best chain among alternatives
//! - [`display`] - Text, DOT and node/edge rendering
//! - [`error`] - Resolution errors
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::path::Path;
//! use timberchain::{
//!     aggregate::totals,
//!     chain::resolve_for_product,
//!     data::{load_all_data, parse_quantity},
//!     display::{format_totals, format_tree},
//!     optimizer::{select_best, Criterion},
//! };
//!
//! let game_data = load_all_data(Path::new("data")).unwrap();
//! let folktails = game_data.get_faction("Folktails").unwrap();
//!
//! // Every recipe producing Biofuel, each with its full sub-chain
//! let rate = parse_quantity("16 + 2/3").unwrap();
//! let chains = resolve_for_product(folktails, "Biofuel", rate).unwrap();
//!
//! // Narrow down to one recipe per input, fewest workers first
//! let best = select_best(&chains, &Criterion::DEFAULT).unwrap();
//! println!("{}", format_tree(&best));
//! println!("{}", format_totals(&totals(&best)));
//! ```

pub mod aggregate;
pub mod chain;
pub mod data;
pub mod display;
pub mod error;
pub mod models;
pub mod optimizer;
pub mod wasm;

pub use chain::ProductionChain;
pub use error::ChainError;

/// Rate per hour used when a caller does not ask for one.
pub const DEFAULT_RATE: &str = "16 + 2/3";
