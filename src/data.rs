//! Data loading functionality for Timberchain.
//!
//! This module loads the catalogue from CSV files located in the `data/`
//! directory. `factions.csv` lists the factions in order; each faction has its
//! own directory with facility, recipe and power plant tables. Every numeric
//! cell is parsed into an exact [`Quantity`] here, so malformed numbers are
//! rejected at load time and never reach the resolver.

use csv::ReaderBuilder;
use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::ChainError;
use crate::models::{
    Facility, FacilityRow, Faction, FactionRow, GameData, PowerPlant, PowerPlantRow, Quantity,
    Recipe, RecipeRow,
};

/// Errors raised while loading the catalogue.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// A numeric cell could not be parsed as an exact quantity.
    #[error("malformed number '{value}' at {path}: {reason}")]
    MalformedNumericField {
        path: String,
        value: String,
        reason: QuantityError,
    },

    /// A `Product:amount` list entry is missing its separator or product.
    #[error("malformed entry '{value}' at {path}, expected 'Product:amount'")]
    MalformedList { path: String, value: String },

    /// A recipe cycle time is zero or negative.
    #[error("cycle time must be positive at {path}")]
    NonPositiveTime { path: String },

    /// Two entries of the same kind share a name within a faction.
    #[error("duplicate {kind} '{name}' in faction {faction}")]
    DuplicateName {
        kind: &'static str,
        name: String,
        faction: String,
    },

    /// A recipe row names a facility that does not exist.
    #[error("recipe '{recipe}' refers to unknown facility '{facility}' in faction {faction}")]
    UnknownFacility {
        recipe: String,
        facility: String,
        faction: String,
    },

    /// The assembled faction breaks a catalogue invariant.
    #[error(transparent)]
    Catalogue(#[from] ChainError),

    /// `factions.csv` lists a directory that is not embedded in the binary.
    #[error("no embedded data for faction directory '{0}'")]
    MissingEmbedded(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Reasons a string is not a valid quantity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuantityError {
    #[error("empty value")]
    Empty,
    #[error("zero denominator")]
    ZeroDenominator,
    #[error("not a number")]
    Invalid,
}

/// Parses an exact quantity.
///
/// Accepts an integer (`"3"`), a decimal (`"2.5"`), a fraction (`"2/3"`) or
/// a mixed number of the form `"<integer> + <fraction>"` (`"16 + 2/3"`).
///
/// # Example
///
/// ```
/// use timberchain::data::parse_quantity;
/// use timberchain::models::ratio;
///
/// assert_eq!(parse_quantity("16 + 2/3"), Ok(ratio(50, 3)));
/// assert_eq!(parse_quantity("2.5"), Ok(ratio(5, 2)));
/// assert!(parse_quantity("abc").is_err());
/// ```
pub fn parse_quantity(value: &str) -> Result<Quantity, QuantityError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(QuantityError::Empty);
    }
    match value.split_once('+') {
        Some((integer, fraction)) => {
            let integer = parse_integer(integer.trim())?;
            let fraction = parse_simple(fraction.trim())?;
            Ok(Quantity::from_integer(integer) + fraction)
        }
        None => parse_simple(value),
    }
}

/// Parses an integer, decimal or plain fraction.
fn parse_simple(value: &str) -> Result<Quantity, QuantityError> {
    if value.is_empty() {
        return Err(QuantityError::Empty);
    }
    if let Some((numerator, denominator)) = value.split_once('/') {
        let numerator = parse_integer(numerator.trim())?;
        let denominator = parse_integer(denominator.trim())?;
        if denominator.is_zero() {
            return Err(QuantityError::ZeroDenominator);
        }
        return Ok(Quantity::new(numerator, denominator));
    }
    if let Some((whole, digits)) = value.split_once('.') {
        let (negative, whole) = match whole.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, whole),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(QuantityError::Invalid);
        }
        let whole = if whole.is_empty() {
            BigInt::zero()
        } else {
            parse_integer(whole)?
        };
        let scale = BigInt::from(10u32).pow(u32::try_from(digits.len()).map_err(|_| QuantityError::Invalid)?);
        let numerator = whole * &scale + parse_integer(digits)?;
        let numerator = if negative { -numerator } else { numerator };
        return Ok(Quantity::new(numerator, scale));
    }
    parse_integer(value).map(Quantity::from_integer)
}

/// Parses an optionally negative run of ASCII digits.
fn parse_integer(value: &str) -> Result<BigInt, QuantityError> {
    let digits = value.strip_prefix('-').unwrap_or(value);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(QuantityError::Invalid);
    }
    value.parse().map_err(|_| QuantityError::Invalid)
}

/// Parses a quantity cell, naming the offending field on failure.
fn parse_field(value: &str, path: String) -> Result<Quantity, DataError> {
    parse_quantity(value).map_err(|reason| DataError::MalformedNumericField {
        path,
        value: value.to_string(),
        reason,
    })
}

/// Parses a `;`-separated `Product:amount` list (e.g. `"Log:1;Water:1/2"`).
///
/// Empty entries are skipped, so an empty cell yields an empty map.
fn parse_amounts(list: &str, path: &str) -> Result<BTreeMap<String, Quantity>, DataError> {
    let mut amounts = BTreeMap::new();
    for entry in list.split(';').map(str::trim).filter(|e| !e.is_empty()) {
        let (product, amount) = entry
            .rsplit_once(':')
            .map(|(p, a)| (p.trim(), a))
            .filter(|(p, _)| !p.is_empty())
            .ok_or_else(|| DataError::MalformedList {
                path: path.to_string(),
                value: entry.to_string(),
            })?;
        let amount = parse_field(amount, format!("{}/{}", path, product))?;
        if amounts.insert(product.to_string(), amount).is_some() {
            return Err(DataError::MalformedList {
                path: path.to_string(),
                value: entry.to_string(),
            });
        }
    }
    Ok(amounts)
}

/// Deserializes every row of a CSV table.
fn read_rows<T: DeserializeOwned, R: Read>(reader: R) -> Result<Vec<T>, DataError> {
    let mut rdr = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        rows.push(result?);
    }
    Ok(rows)
}

/// Builds a faction from its parsed CSV rows.
///
/// # Arguments
///
/// * `name` - Faction name, used in error paths
/// * `facility_rows` - Rows of `facilities.csv`
/// * `recipe_rows` - Rows of `recipes.csv`
/// * `plant_rows` - Rows of `power_plants.csv`
///
/// # Returns
///
/// The assembled [`Faction`], or the first validation failure: malformed
/// numbers, duplicate names, recipes for unknown facilities or non-positive
/// cycle times.
pub fn build_faction(
    name: &str,
    facility_rows: Vec<FacilityRow>,
    recipe_rows: Vec<RecipeRow>,
    plant_rows: Vec<PowerPlantRow>,
) -> Result<Faction, DataError> {
    let duplicate = |kind, item: &str| DataError::DuplicateName {
        kind,
        name: item.to_string(),
        faction: name.to_string(),
    };

    let mut facilities: Vec<Facility> = Vec::with_capacity(facility_rows.len());
    for row in facility_rows {
        if facilities.iter().any(|f| f.name == row.name) {
            return Err(duplicate("facility", &row.name));
        }
        let power = parse_field(&row.power, format!("{}/{}/power", name, row.name))?;
        facilities.push(Facility {
            name: row.name,
            recipes: Vec::new(),
            workers: row.workers,
            power,
            width: row.width,
            depth: row.depth,
            height: row.height,
        });
    }

    let mut recipe_names = HashSet::new();
    for row in recipe_rows {
        let path = format!("{}/{}/{}", name, row.facility, row.name);
        if !recipe_names.insert(row.name.clone()) {
            return Err(duplicate("recipe", &row.name));
        }
        let time = parse_field(&row.time, format!("{}/time", path))?;
        if !time.is_positive() {
            return Err(DataError::NonPositiveTime {
                path: format!("{}/time", path),
            });
        }
        let recipe = Recipe {
            output: parse_amounts(&row.products, &format!("{}/products", path))?,
            requirements: parse_amounts(&row.requirements, &format!("{}/requirements", path))?,
            name: row.name,
            time,
        };
        let facility = facilities
            .iter_mut()
            .find(|f| f.name == row.facility)
            .ok_or_else(|| DataError::UnknownFacility {
                recipe: recipe.name.clone(),
                facility: row.facility.clone(),
                faction: name.to_string(),
            })?;
        facility.recipes.push(recipe);
    }

    let mut power_plants: Vec<PowerPlant> = Vec::with_capacity(plant_rows.len());
    for row in plant_rows {
        if power_plants.iter().any(|p| p.name == row.name) {
            return Err(duplicate("power plant", &row.name));
        }
        let power = parse_field(&row.power, format!("{}/{}/power", name, row.name))?;
        power_plants.push(PowerPlant {
            name: row.name,
            power,
        });
    }

    tracing::debug!(
        faction = name,
        facilities = facilities.len(),
        power_plants = power_plants.len(),
        "built faction"
    );
    Ok(Faction::new(name, facilities, power_plants)?)
}

/// Loads one faction from its directory.
///
/// # CSV Format
///
/// - `facilities.csv`: `name, workers, power, width, depth, height`
/// - `recipes.csv`: `facility, name, products, requirements, time`
/// - `power_plants.csv`: `name, power`
pub fn load_faction(faction_dir: &Path, name: &str) -> Result<Faction, DataError> {
    build_faction(
        name,
        read_rows(File::open(faction_dir.join("facilities.csv"))?)?,
        read_rows(File::open(faction_dir.join("recipes.csv"))?)?,
        read_rows(File::open(faction_dir.join("power_plants.csv"))?)?,
    )
}

/// Loads all factions listed in `factions.csv` from the data directory.
///
/// # Arguments
///
/// * `data_dir` - Path to the directory containing `factions.csv`
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use timberchain::data::load_all_data;
///
/// let game_data = load_all_data(Path::new("data")).unwrap();
/// println!("Loaded {} factions", game_data.factions.len());
/// ```
pub fn load_all_data(data_dir: &Path) -> Result<GameData, DataError> {
    let rows: Vec<FactionRow> = read_rows(File::open(data_dir.join("factions.csv"))?)?;

    let mut factions = Vec::with_capacity(rows.len());
    for row in rows {
        if factions.iter().any(|f: &Faction| f.name == row.name) {
            return Err(DataError::DuplicateName {
                kind: "faction",
                name: row.name,
                faction: String::new(),
            });
        }
        factions.push(load_faction(&data_dir.join(&row.directory), &row.name)?);
    }

    tracing::info!(factions = factions.len(), dir = %data_dir.display(), "loaded game data");
    Ok(GameData::new(factions))
}

/// Faction tables compiled into the binary: (directory, facilities, recipes, power plants).
const EMBEDDED_FACTIONS: &[(&str, &str, &str, &str)] = &[
    (
        "folktails",
        include_str!("../data/folktails/facilities.csv"),
        include_str!("../data/folktails/recipes.csv"),
        include_str!("../data/folktails/power_plants.csv"),
    ),
    (
        "iron_teeth",
        include_str!("../data/iron_teeth/facilities.csv"),
        include_str!("../data/iron_teeth/recipes.csv"),
        include_str!("../data/iron_teeth/power_plants.csv"),
    ),
];

/// Loads the catalogue embedded in the binary.
///
/// Used by the WebAssembly bindings, where there is no filesystem.
pub fn load_embedded() -> Result<GameData, DataError> {
    let rows: Vec<FactionRow> = read_rows(include_str!("../data/factions.csv").as_bytes())?;

    let mut factions = Vec::with_capacity(rows.len());
    for row in rows {
        let (_, facilities, recipes, plants) = EMBEDDED_FACTIONS
            .iter()
            .find(|(directory, ..)| *directory == row.directory)
            .ok_or_else(|| DataError::MissingEmbedded(row.directory.clone()))?;
        factions.push(build_faction(
            &row.name,
            read_rows(facilities.as_bytes())?,
            read_rows(recipes.as_bytes())?,
            read_rows(plants.as_bytes())?,
        )?);
    }
    Ok(GameData::new(factions))
}
