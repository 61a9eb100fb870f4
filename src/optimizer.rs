//! Selection of the best chain among recipe alternatives.
//!
//! Selection is greedy and top-down: the cheapest chain is picked from the
//! candidates first, then each of its input slots is narrowed the same way,
//! independently. A parent's choice is never revisited in light of what its
//! children end up costing, so the result is locally rather than globally
//! optimal.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::aggregate::{min_area, min_power, min_space, min_workers};
use crate::chain::ProductionChain;
use crate::models::Quantity;

/// A cost used to rank alternative chains. Lower is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Criterion {
    Workers,
    Power,
    Area,
    Space,
}

impl Criterion {
    /// Workers, then power, then area, then space.
    pub const DEFAULT: [Criterion; 4] = [
        Criterion::Workers,
        Criterion::Power,
        Criterion::Area,
        Criterion::Space,
    ];

    /// Evaluates this cost for a chain.
    pub fn cost(self, chain: &ProductionChain) -> Quantity {
        match self {
            Criterion::Workers => min_workers(chain),
            Criterion::Power => min_power(chain),
            Criterion::Area => min_area(chain),
            Criterion::Space => min_space(chain),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Criterion::Workers => "workers",
            Criterion::Power => "power",
            Criterion::Area => "area",
            Criterion::Space => "space",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Criterion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "workers" => Ok(Criterion::Workers),
            "power" => Ok(Criterion::Power),
            "area" => Ok(Criterion::Area),
            "space" => Ok(Criterion::Space),
            other => Err(format!(
                "unknown criterion '{}', expected one of: workers, power, area, space",
                other
            )),
        }
    }
}

/// Picks the chain with the lexicographically smallest costs, in the order
/// given, then narrows every input slot of the result the same way.
///
/// Ties on every criterion go to the earliest chain. Returns `None` if
/// `chains` is empty.
///
/// # Example
///
/// ```
/// use std::collections::BTreeMap;
/// use timberchain::chain::resolve_for_product;
/// use timberchain::models::{whole, Facility, Faction, Recipe};
/// use timberchain::optimizer::{select_best, Criterion};
///
/// let refinery = |name: &str, workers: u32| Facility {
///     name: name.to_string(),
///     recipes: vec![Recipe {
///         name: format!("Biofuel ({})", name),
///         output: BTreeMap::from([("Biofuel".to_string(), whole(1))]),
///         requirements: BTreeMap::new(),
///         time: whole(1),
///     }],
///     workers,
///     power: whole(0),
///     width: 1,
///     depth: 1,
///     height: 1,
/// };
/// let faction = Faction::new("Folktails", vec![refinery("Big", 3), refinery("Small", 1)], vec![]).unwrap();
///
/// let chains = resolve_for_product(&faction, "Biofuel", whole(2)).unwrap();
/// let best = select_best(&chains, &Criterion::DEFAULT).unwrap();
/// assert_eq!(best.facility.name, "Small");
/// ```
pub fn select_best<'a>(
    chains: &[ProductionChain<'a>],
    criteria: &[Criterion],
) -> Option<ProductionChain<'a>> {
    select_best_by(chains, &|chain: &ProductionChain<'a>| {
        criteria
            .iter()
            .map(|criterion| criterion.cost(chain))
            .collect::<Vec<_>>()
    })
}

/// Like [`select_best`], ranking chains by an arbitrary key.
pub fn select_best_by<'a, K, F>(chains: &[ProductionChain<'a>], key: &F) -> Option<ProductionChain<'a>>
where
    K: Ord,
    F: Fn(&ProductionChain<'a>) -> K,
{
    let best = chains.iter().min_by_key(|chain| key(*chain))?;
    tracing::debug!(
        facility = %best.facility.name,
        recipe = %best.recipe.name,
        candidates = chains.len(),
        "selected chain"
    );

    Some(ProductionChain {
        facility: best.facility,
        recipe: best.recipe,
        product: best.product.clone(),
        number_facilities: best.number_facilities.clone(),
        inputs: best
            .inputs
            .iter()
            .filter_map(|(product, options)| {
                select_best_by(options, key).map(|chosen| (product.clone(), vec![chosen]))
            })
            .collect(),
        raw_materials: best.raw_materials.clone(),
    })
}
