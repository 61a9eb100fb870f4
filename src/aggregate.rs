//! Aggregation over resolved chains.
//!
//! Two families live here:
//!
//! - Flat sums ([`totals`], [`raw_materials`], [`total_power`],
//!   [`total_workers`]) add up every node reachable through every
//!   alternative. On a tree that still holds several alternatives per input
//!   they over-count, so call them on selected trees.
//! - Cost extractors ([`min_workers`], [`min_power`], [`min_area`],
//!   [`min_space`]) add a node's own cost to, per input slot, the cheapest
//!   alternative for that metric alone. Each metric makes its own choice,
//!   independent of [`crate::optimizer::select_best`].

use std::collections::BTreeMap;

use num_traits::{Signed, Zero};

use crate::chain::ProductionChain;
use crate::models::{whole, Facility, PowerPlant, Quantity};

/// Iterates over every node of the tree, alternatives included.
pub fn nodes<'c, 'a>(chain: &'c ProductionChain<'a>) -> impl Iterator<Item = &'c ProductionChain<'a>> {
    let mut stack = vec![chain];
    std::iter::from_fn(move || {
        let node = stack.pop()?;
        stack.extend(node.inputs.values().flatten());
        Some(node)
    })
}

/// Facility counts keyed by facility name.
///
/// # Example
///
/// ```
/// use std::collections::BTreeMap;
/// use timberchain::aggregate::totals;
/// use timberchain::chain::resolve_for_facility;
/// use timberchain::models::{ratio, whole, Facility, Faction, Recipe};
///
/// let pump = Facility {
///     name: "Water Pump".to_string(),
///     recipes: vec![Recipe {
///         name: "Water".to_string(),
///         output: BTreeMap::from([("Water".to_string(), whole(1))]),
///         requirements: BTreeMap::new(),
///         time: ratio(1, 2),
///     }],
///     workers: 1,
///     power: whole(0),
///     width: 2,
///     depth: 3,
///     height: 2,
/// };
/// let faction = Faction::new("Folktails", vec![pump], vec![]).unwrap();
///
/// let chain = resolve_for_facility(&faction, "Water Pump", ratio(5, 2)).unwrap();
/// assert_eq!(totals(&chain)["Water Pump"], ratio(5, 2));
/// ```
pub fn totals(chain: &ProductionChain) -> BTreeMap<String, Quantity> {
    let mut totals = BTreeMap::new();
    for node in nodes(chain) {
        *totals
            .entry(node.facility.name.clone())
            .or_insert_with(Quantity::zero) += &node.number_facilities;
    }
    totals
}

/// Per-hour rates of raw materials drawn by the tree, keyed by product.
pub fn raw_materials(chain: &ProductionChain) -> BTreeMap<String, Quantity> {
    let mut raw = BTreeMap::new();
    for node in nodes(chain) {
        for (product, rate) in &node.raw_materials {
            *raw.entry(product.clone()).or_insert_with(Quantity::zero) += rate;
        }
    }
    raw
}

/// Power drawn by every facility in the tree.
pub fn total_power(chain: &ProductionChain) -> Quantity {
    nodes(chain)
        .map(|node| &node.facility.power * &node.number_facilities)
        .sum()
}

/// Workers needed by every facility in the tree.
pub fn total_workers(chain: &ProductionChain) -> Quantity {
    nodes(chain)
        .map(|node| workers(node.facility) * &node.number_facilities)
        .sum()
}

/// Number of `plant` instances needed to supply `power`, or `None` if the
/// plant generates nothing.
pub fn plants_required(plant: &PowerPlant, power: &Quantity) -> Option<Quantity> {
    if !plant.power.is_positive() {
        return None;
    }
    Some(power / &plant.power)
}

pub fn min_workers(chain: &ProductionChain) -> Quantity {
    min_cost(chain, &workers)
}

pub fn min_power(chain: &ProductionChain) -> Quantity {
    min_cost(chain, &|facility: &Facility| facility.power.clone())
}

/// Cheapest ground area (width × depth) over the tree.
pub fn min_area(chain: &ProductionChain) -> Quantity {
    min_cost(chain, &|facility: &Facility| whole(i64::from(facility.area())))
}

/// Cheapest volume (area × height) over the tree.
pub fn min_space(chain: &ProductionChain) -> Quantity {
    min_cost(chain, &|facility: &Facility| whole(i64::from(facility.space())))
}

fn workers(facility: &Facility) -> Quantity {
    whole(i64::from(facility.workers))
}

/// Own cost times facility count, plus the cheapest alternative of each input slot.
fn min_cost<F>(chain: &ProductionChain, cost: &F) -> Quantity
where
    F: Fn(&Facility) -> Quantity,
{
    let inputs: Quantity = chain
        .inputs
        .values()
        .map(|options| {
            options
                .iter()
                .map(|option| min_cost(option, cost))
                .min()
                .unwrap_or_else(Quantity::zero)
        })
        .sum();
    cost(chain.facility) * &chain.number_facilities + inputs
}
