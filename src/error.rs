//! Error types for chain resolution and catalogue queries.
//!
//! Catalogue loading has its own error type, [`crate::data::DataError`],
//! since malformed data must be rejected before any resolution happens.

/// Errors reported by catalogue lookups and the chain resolver.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    /// No faction with this name exists in the game data.
    #[error("faction not found: {0}")]
    FactionNotFound(String),

    /// No facility with this name exists in the faction.
    #[error("facility not found: {0}")]
    FacilityNotFound(String),

    /// The recipe is not owned by any facility of the faction.
    #[error("recipe not owned by any facility: {0}")]
    RecipeNotFound(String),

    /// Two recipes of one faction share a name.
    #[error("duplicate recipe name: {0}")]
    DuplicateRecipe(String),

    /// Facility-based resolution needs a facility with exactly one recipe.
    #[error("facility '{facility}' has {} recipes, expected exactly one", recipes.len())]
    AmbiguousRecipe {
        facility: String,
        recipes: Vec<String>,
    },

    /// Nothing in the faction produces the requested product.
    #[error("no recipe produces '{0}'")]
    NoRecipe(String),

    /// The target rate or facility count is not strictly positive.
    #[error("invalid rate: {0}")]
    InvalidRate(String),

    /// The product is required (directly or indirectly) by its own recipe.
    #[error("cyclic dependency on '{product}' via {}", path.join(" -> "))]
    CyclicDependency { product: String, path: Vec<String> },
}

pub type Result<T> = std::result::Result<T, ChainError>;
