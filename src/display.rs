//! Display and formatting utilities for Timberchain.
//!
//! This module renders resolved chains for people and for external graph
//! tools: an indented text tree, flat totals, Graphviz DOT source and
//! node/edge lists. Quantities stay exact up to this point; floats only
//! appear as `~` approximations next to the exact value.

use std::collections::BTreeMap;
use std::fmt::Write;

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};
use serde::{Serialize, Serializer};

use crate::aggregate::{plants_required, raw_materials, total_power, total_workers, totals};
use crate::chain::ProductionChain;
use crate::models::{Faction, Quantity};

/// Formats a quantity exactly, as an integer, a fraction or a mixed number.
///
/// # Example
///
/// ```
/// use timberchain::display::format_quantity;
/// use timberchain::models::{ratio, whole};
///
/// assert_eq!(format_quantity(&whole(12)), "12");
/// assert_eq!(format_quantity(&ratio(2, 3)), "2/3");
/// assert_eq!(format_quantity(&ratio(50, 3)), "16 + 2/3");
/// ```
pub fn format_quantity(value: &Quantity) -> String {
    if value.is_integer() {
        return value.to_integer().to_string();
    }
    let whole = value.trunc();
    if whole.is_zero() || value.is_negative() {
        return format!("{}/{}", value.numer(), value.denom());
    }
    let fraction = value - &whole;
    format!("{} + {}/{}", whole.to_integer(), fraction.numer(), fraction.denom())
}

/// Floating point approximation for display.
pub fn approximate(value: &Quantity) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

/// Formats a quantity as `exact (~approx)`, omitting the approximation for integers.
pub fn format_with_approx(value: &Quantity) -> String {
    if value.is_integer() {
        format_quantity(value)
    } else {
        format!("{} (~{:.2})", format_quantity(value), approximate(value))
    }
}

/// Renders a chain as an indented tree, one line per node and input slot.
///
/// ```text
/// Bot Assembler (Bot) x 12
///   Circuit Board @ 8/h
///     Circuit Press (Circuit Board) x 4
///   Log @ 3/h (raw material)
/// ```
pub fn format_tree(chain: &ProductionChain) -> String {
    let mut out = String::new();
    write_tree(&mut out, chain, 0);
    out
}

fn write_tree(out: &mut String, chain: &ProductionChain, depth: usize) {
    let indent = "  ".repeat(depth);
    let _ = writeln!(
        out,
        "{}{} ({}) x {}",
        indent,
        chain.facility.name,
        chain.recipe.name,
        format_with_approx(&chain.number_facilities)
    );

    for (product, options) in &chain.inputs {
        let rate = chain.input_rate(product).unwrap_or_else(Quantity::zero);
        if options.len() > 1 {
            let _ = writeln!(
                out,
                "{}  {} @ {}/h, {} alternatives",
                indent,
                product,
                format_quantity(&rate),
                options.len()
            );
        } else {
            let _ = writeln!(out, "{}  {} @ {}/h", indent, product, format_quantity(&rate));
        }
        for option in options {
            write_tree(out, option, depth + 2);
        }
    }
    for (product, rate) in &chain.raw_materials {
        let _ = writeln!(
            out,
            "{}  {} @ {}/h (raw material)",
            indent,
            product,
            format_quantity(rate)
        );
    }
}

/// Renders facility totals, one `name x count (~approx)` line each.
pub fn format_totals(totals: &BTreeMap<String, Quantity>) -> String {
    totals
        .iter()
        .map(|(name, count)| format!("{} x {} (~{:.2})", name, format_quantity(count), approximate(count)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Exact facility count split as `integer + numerator/denominator`.
///
/// Parts that fit an `i64` serialize as JSON numbers, larger ones as
/// decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MixedFraction {
    #[serde(serialize_with = "serialize_integer")]
    pub integer: BigInt,
    #[serde(serialize_with = "serialize_integer")]
    pub numerator: BigInt,
    #[serde(serialize_with = "serialize_integer")]
    pub denominator: BigInt,
}

impl From<&Quantity> for MixedFraction {
    fn from(value: &Quantity) -> Self {
        let whole = value.trunc();
        let fraction = value - &whole;
        MixedFraction {
            integer: whole.to_integer(),
            numerator: fraction.numer().clone(),
            denominator: fraction.denom().clone(),
        }
    }
}

fn serialize_integer<S: Serializer>(value: &BigInt, serializer: S) -> Result<S::Ok, S::Error> {
    match value.to_i64() {
        Some(small) => serializer.serialize_i64(small),
        None => serializer.serialize_str(&value.to_string()),
    }
}

/// A node for external graph tools.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub facility_name: String,
    pub recipe_name: String,
    /// Input slots that have producing subchains
    pub resource_names: Vec<String>,
    pub product_names: Vec<String>,
    pub number_facilities: MixedFraction,
    pub approx_facilities: f64,
}

/// An edge from a node to one of the subchains filling its input slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub resource: String,
}

/// Flattens a chain into nodes and edges.
///
/// Node ids are paths from the root (`/Facility(Recipe)/Input/Facility(Recipe)`),
/// so the same facility reached through different slots gets distinct nodes.
pub fn graph(chain: &ProductionChain) -> (Vec<GraphNode>, Vec<GraphEdge>) {
    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    let mut stack = vec![(String::new(), chain)];

    while let Some((path, chain)) = stack.pop() {
        let node_id = format!("{}/{}({})", path, chain.facility.name, chain.recipe.name);
        for (resource, options) in &chain.inputs {
            let slot_path = format!("{}/{}", node_id, resource);
            for option in options {
                edges.push(GraphEdge {
                    id: format!("{}->{}/{}({})", node_id, resource, option.facility.name, option.recipe.name),
                    source: node_id.clone(),
                    target: format!("{}/{}({})", slot_path, option.facility.name, option.recipe.name),
                    resource: resource.clone(),
                });
                stack.push((slot_path.clone(), option));
            }
        }
        nodes.push(GraphNode {
            id: node_id,
            facility_name: chain.facility.name.clone(),
            recipe_name: chain.recipe.name.clone(),
            resource_names: chain.inputs.keys().cloned().collect(),
            product_names: chain.recipe.output.keys().cloned().collect(),
            number_facilities: MixedFraction::from(&chain.number_facilities),
            approx_facilities: approximate(&chain.number_facilities),
        });
    }

    (nodes, edges)
}

/// Renders a chain as Graphviz DOT source.
///
/// Each node is a rectangle labelled with facility, recipe and count; each
/// input slot is a dashed node that the alternatives filling it point into.
pub fn to_dot(chain: &ProductionChain) -> String {
    let mut out = String::from("digraph {\n\tnode [shape=rectangle]\n");
    let mut stack: Vec<(Option<String>, &ProductionChain)> = vec![(None, chain)];

    while let Some((parent, chain)) = stack.pop() {
        let own = format!("{}({})", chain.facility.name, chain.recipe.name);
        let node_id = match &parent {
            Some(parent) => format!("{}<-{}", parent, own),
            None => own,
        };
        let _ = writeln!(
            out,
            "\t{} [label=<{}<BR/><FONT POINT-SIZE=\"10\">Recipe: {}<BR/>Count: {:.2}<BR/></FONT>>]",
            quote(&node_id),
            escape_html(&chain.facility.name),
            escape_html(&chain.recipe.name),
            approximate(&chain.number_facilities)
        );
        if let Some(parent) = &parent {
            let _ = writeln!(out, "\t{} -> {}", quote(&node_id), quote(parent));
        }
        for (resource, options) in &chain.inputs {
            let slot_id = format!("{}[{}]", node_id, resource);
            let _ = writeln!(out, "\t{} [label={} style=dashed]", quote(&slot_id), quote(resource));
            let _ = writeln!(out, "\t{} -> {}", quote(&slot_id), quote(&node_id));
            for option in options {
                stack.push((Some(slot_id.clone()), option));
            }
        }
    }

    out.push_str("}\n");
    out
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Prints a full report for a selected chain: tree, facility totals, raw
/// materials and the power it draws.
pub fn display_report(faction: &Faction, chain: &ProductionChain) {
    println!();
    println!("[PRODUCTION CHAIN]");
    println!("----------------------------------------------------------------");
    print!("{}", format_tree(chain));

    println!();
    println!("[FACILITY TOTALS]");
    println!("----------------------------------------------------------------");
    println!("{}", format_totals(&totals(chain)));

    let raw = raw_materials(chain);
    if !raw.is_empty() {
        println!();
        println!("[RAW MATERIALS] (per hour)");
        println!("----------------------------------------------------------------");
        println!("{}", format_totals(&raw));
    }

    let power = total_power(chain);
    println!();
    println!("[SUMMARY]");
    println!("----------------------------------------------------------------");
    println!("  Workers:          {}", format_with_approx(&total_workers(chain)));
    println!("  Power:            {}", format_with_approx(&power));
    if power.is_positive() {
        for plant in &faction.power_plants {
            if let Some(count) = plants_required(plant, &power) {
                println!("    {:<16} x {}", plant.name, format_with_approx(&count));
            }
        }
    }
    println!();
}

/// Prints every alternative chain for a product, unselected.
pub fn display_alternatives(chains: &[ProductionChain]) {
    for (i, chain) in chains.iter().enumerate() {
        println!();
        println!("[ALTERNATIVE {}]", i + 1);
        println!("----------------------------------------------------------------");
        print!("{}", format_tree(chain));
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ratio, whole};

    #[test]
    fn formats_quantities() {
        assert_eq!(format_quantity(&whole(0)), "0");
        assert_eq!(format_quantity(&ratio(3, 2)), "1 + 1/2");
        assert_eq!(format_quantity(&ratio(-3, 2)), "-3/2");
        assert_eq!(format_with_approx(&ratio(2, 3)), "2/3 (~0.67)");
        assert_eq!(format_with_approx(&whole(4)), "4");
    }

    #[test]
    fn splits_mixed_fractions() {
        let parts = MixedFraction::from(&ratio(50, 3));
        assert_eq!(
            parts,
            MixedFraction {
                integer: BigInt::from(16),
                numerator: BigInt::from(2),
                denominator: BigInt::from(3)
            }
        );
        let seven = MixedFraction::from(&whole(7));
        assert_eq!(seven.integer, BigInt::from(7));
        assert_eq!(seven.numerator, BigInt::from(0));
        assert_eq!(seven.denominator, BigInt::from(1));
    }

    #[test]
    fn serializes_large_parts_as_strings() {
        let huge = Quantity::new(BigInt::from(3).pow(50), BigInt::from(2));
        let json = serde_json::to_value(MixedFraction::from(&huge)).unwrap();
        assert_eq!(json["integer"], (BigInt::from(3).pow(50) / 2u32).to_string());
        assert_eq!(json["numerator"], 1);
        assert_eq!(json["denominator"], 2);
    }

    #[test]
    fn quotes_dot_identifiers() {
        assert_eq!(quote("a\"b"), "\"a\\\"b\"");
        assert_eq!(escape_html("<Bot & Co>"), "&lt;Bot &amp; Co&gt;");
    }
}
