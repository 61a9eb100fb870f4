//! Data models and catalogue queries for Timberchain.
//!
//! This module contains the immutable catalogue the resolver works on:
//! facilities, the recipes they run, power plants, and the factions that
//! partition them. All quantities are exact rationals of unbounded size.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use num_bigint::BigInt;
use num_rational::BigRational;
use serde::Deserialize;

use crate::error::{ChainError, Result};

/// Exact quantity used for amounts, cycle times, power and facility counts.
///
/// Numerators and denominators grow without bound, so deep chains never
/// overflow or lose precision.
pub type Quantity = BigRational;

/// Exact whole quantity.
pub fn whole(value: i64) -> Quantity {
    Quantity::from_integer(BigInt::from(value))
}

/// Exact quantity `numer / denom`, reduced.
///
/// # Panics
///
/// Panics if `denom` is zero.
pub fn ratio(numer: i64, denom: i64) -> Quantity {
    Quantity::new(BigInt::from(numer), BigInt::from(denom))
}

/// A conversion rule run by a facility.
///
/// # Example
///
/// ```
/// use std::collections::BTreeMap;
/// use timberchain::models::{ratio, whole, Recipe};
///
/// let planks = Recipe {
///     name: "Planks".to_string(),
///     output: BTreeMap::from([("Plank".to_string(), whole(1))]),
///     requirements: BTreeMap::from([("Log".to_string(), whole(1))]),
///     time: ratio(13, 10),
/// };
///
/// assert_eq!(planks.throughput_per_hour("Plank"), Some(ratio(10, 13)));
/// assert_eq!(planks.throughput_per_hour("Log"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    /// Recipe name, unique within a faction
    pub name: String,
    /// Amount of each product yielded per cycle
    pub output: BTreeMap<String, Quantity>,
    /// Amount of each input consumed per cycle
    pub requirements: BTreeMap<String, Quantity>,
    /// Cycle time in hours, strictly positive
    pub time: Quantity,
}

impl Recipe {
    /// Returns how many units of `product` one facility yields per hour,
    /// or `None` if this recipe does not output `product`.
    pub fn throughput_per_hour(&self, product: &str) -> Option<Quantity> {
        self.output.get(product).map(|amount| amount / &self.time)
    }

    /// Returns `true` if this recipe outputs `product`.
    pub fn produces(&self, product: &str) -> bool {
        self.output.contains_key(product)
    }
}

/// A production building type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Facility {
    /// Facility name, unique within a faction
    pub name: String,
    /// Recipes this facility can run
    pub recipes: Vec<Recipe>,
    /// Number of workers needed to operate one instance
    pub workers: u32,
    /// Power drawn by one instance
    pub power: Quantity,
    pub width: u32,
    pub depth: u32,
    pub height: u32,
}

impl Facility {
    /// Ground area covered by one instance (width × depth).
    pub fn area(&self) -> u32 {
        self.width * self.depth
    }

    /// Volume occupied by one instance (area × height).
    pub fn space(&self) -> u32 {
        self.area() * self.height
    }
}

/// A building that generates power.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowerPlant {
    pub name: String,
    /// Power generated by one instance
    pub power: Quantity,
}

/// An independent partition of the catalogue.
///
/// Products are plain names. Any number of recipes may output the same
/// product; these are interchangeable alternatives.
#[derive(Debug, Clone)]
pub struct Faction {
    pub name: String,
    pub facilities: Vec<Facility>,
    pub power_plants: Vec<PowerPlant>,
    /// Recipe name -> (facility index, recipe index within that facility)
    recipe_owners: HashMap<String, (usize, usize)>,
}

impl Faction {
    /// Builds a faction and indexes which facility owns each recipe.
    ///
    /// Recipes are identified by name, so names must be unique within the
    /// faction; a clash fails with [`ChainError::DuplicateRecipe`].
    pub fn new(
        name: impl Into<String>,
        facilities: Vec<Facility>,
        power_plants: Vec<PowerPlant>,
    ) -> Result<Self> {
        let mut recipe_owners = HashMap::new();
        for (facility_index, facility) in facilities.iter().enumerate() {
            for (recipe_index, recipe) in facility.recipes.iter().enumerate() {
                if recipe_owners
                    .insert(recipe.name.clone(), (facility_index, recipe_index))
                    .is_some()
                {
                    return Err(ChainError::DuplicateRecipe(recipe.name.clone()));
                }
            }
        }
        Ok(Self {
            name: name.into(),
            facilities,
            power_plants,
            recipe_owners,
        })
    }

    /// Returns every facility with at least one recipe outputting `product`,
    /// in catalogue order. An empty result means `product` is a raw material.
    pub fn facilities_producing(&self, product: &str) -> Vec<&Facility> {
        self.facilities
            .iter()
            .filter(|facility| facility.recipes.iter().any(|r| r.produces(product)))
            .collect()
    }

    /// Returns every recipe outputting `product`, in catalogue order.
    pub fn recipes_producing(&self, product: &str) -> Vec<&Recipe> {
        self.producers(product).into_iter().map(|(_, recipe)| recipe).collect()
    }

    /// Returns every (facility, recipe) pair outputting `product`, in
    /// catalogue order.
    pub fn producers(&self, product: &str) -> Vec<(&Facility, &Recipe)> {
        self.facilities
            .iter()
            .flat_map(|facility| facility.recipes.iter().map(move |recipe| (facility, recipe)))
            .filter(|(_, recipe)| recipe.produces(product))
            .collect()
    }

    /// Looks up a recipe by name, together with the facility running it.
    pub fn recipe_by_name(&self, name: &str) -> Result<(&Facility, &Recipe)> {
        self.recipe_owners
            .get(name)
            .and_then(|&(facility, recipe)| {
                let facility = self.facilities.get(facility)?;
                Some((facility, facility.recipes.get(recipe)?))
            })
            .ok_or_else(|| ChainError::RecipeNotFound(name.to_string()))
    }

    /// Returns the facility owning `recipe`, found through the recipe index.
    ///
    /// Fails with [`ChainError::RecipeNotFound`] if no recipe of this name
    /// belongs to the faction.
    pub fn facility_with_recipe(&self, recipe: &Recipe) -> Result<&Facility> {
        self.recipe_by_name(&recipe.name).map(|(facility, _)| facility)
    }

    /// Looks up a facility by name.
    pub fn facility_by_name(&self, name: &str) -> Result<&Facility> {
        self.facilities
            .iter()
            .find(|facility| facility.name == name)
            .ok_or_else(|| ChainError::FacilityNotFound(name.to_string()))
    }

    /// Looks up a power plant by name.
    pub fn power_plant_by_name(&self, name: &str) -> Option<&PowerPlant> {
        self.power_plants.iter().find(|plant| plant.name == name)
    }

    /// Returns every product output by some recipe of this faction.
    pub fn products(&self) -> BTreeSet<String> {
        self.facilities
            .iter()
            .flat_map(|facility| &facility.recipes)
            .flat_map(|recipe| recipe.output.keys().cloned())
            .collect()
    }
}

/// The whole catalogue: every faction, in load order.
#[derive(Debug, Clone, Default)]
pub struct GameData {
    pub factions: Vec<Faction>,
}

impl GameData {
    pub fn new(factions: Vec<Faction>) -> Self {
        Self { factions }
    }

    /// Returns faction names in catalogue order.
    pub fn get_factions(&self) -> Vec<&str> {
        self.factions.iter().map(|faction| faction.name.as_str()).collect()
    }

    /// Looks up a faction by name.
    pub fn get_faction(&self, name: &str) -> Result<&Faction> {
        self.factions
            .iter()
            .find(|faction| faction.name == name)
            .ok_or_else(|| ChainError::FactionNotFound(name.to_string()))
    }

    /// Returns every product the named faction can produce.
    pub fn get_products(&self, faction: &str) -> Result<BTreeSet<String>> {
        Ok(self.get_faction(faction)?.products())
    }
}

// ============================================================================
// CSV Row Structures
// ============================================================================

/// CSV row structure for `factions.csv`.
#[derive(Debug, Deserialize)]
pub struct FactionRow {
    /// Faction name
    pub name: String,
    /// Directory holding the faction's CSV files, relative to the data root
    pub directory: String,
}

/// CSV row structure for `facilities.csv`.
#[derive(Debug, Deserialize)]
pub struct FacilityRow {
    pub name: String,
    pub workers: u32,
    /// Power draw (rational string)
    pub power: String,
    pub width: u32,
    pub depth: u32,
    pub height: u32,
}

/// CSV row structure for `recipes.csv`.
#[derive(Debug, Deserialize)]
pub struct RecipeRow {
    /// Name of the owning facility
    pub facility: String,
    pub name: String,
    /// `;`-separated `Product:amount` list
    pub products: String,
    /// `;`-separated `Product:amount` list, may be empty
    #[serde(default)]
    pub requirements: String,
    /// Cycle time in hours (rational string)
    pub time: String,
}

/// CSV row structure for `power_plants.csv`.
#[derive(Debug, Deserialize)]
pub struct PowerPlantRow {
    pub name: String,
    /// Power output (rational string)
    pub power: String,
}
