//! Production chain resolution.
//!
//! Given a target rate for a product (or a number of facilities running a
//! recipe), the resolver builds a tree of every sub-production needed to
//! sustain it. Each input slot keeps one subtree per recipe able to produce
//! that input; narrowing those alternatives down is left to
//! [`crate::optimizer::select_best`].
//!
//! Resolution walks the recipe graph with an explicit stack rather than host
//! recursion, and fails with [`ChainError::CyclicDependency`] when an input
//! is already being produced further up the active path.

use std::collections::BTreeMap;

use num_traits::Signed;

use crate::error::{ChainError, Result};
use crate::models::{Facility, Faction, Quantity, Recipe};

/// A resolved tree of facilities sustaining a target rate.
///
/// Built fresh by each resolution call and never mutated afterwards, except
/// by selection which produces a new tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductionChain<'a> {
    pub facility: &'a Facility,
    pub recipe: &'a Recipe,
    /// Product this node was resolved for, `None` for a facility-based root
    pub product: Option<String>,
    /// Exact number of facility instances required
    pub number_facilities: Quantity,
    /// Input product -> alternative subchains, one per producing recipe
    pub inputs: BTreeMap<String, Vec<ProductionChain<'a>>>,
    /// Inputs nothing in the faction produces, with their required rate per hour
    pub raw_materials: BTreeMap<String, Quantity>,
}

impl<'a> ProductionChain<'a> {
    /// Rate per hour at which this node yields `product`.
    pub fn output_rate(&self, product: &str) -> Option<Quantity> {
        self.recipe
            .throughput_per_hour(product)
            .map(|throughput| throughput * &self.number_facilities)
    }

    /// Rate per hour at which this node consumes `product`.
    pub fn input_rate(&self, product: &str) -> Option<Quantity> {
        self.recipe
            .requirements
            .get(product)
            .map(|amount| amount * &self.number_facilities / &self.recipe.time)
    }

    /// Alternative subchains for one input slot; empty for raw materials or
    /// products the recipe does not require.
    pub fn alternatives(&self, product: &str) -> &[ProductionChain<'a>] {
        self.inputs.get(product).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns `true` if every input slot in the tree holds exactly one subchain.
    pub fn is_selected(&self) -> bool {
        self.inputs
            .values()
            .all(|options| options.len() == 1 && options.iter().all(ProductionChain::is_selected))
    }

    /// Number of nodes in the tree, counting every alternative.
    pub fn node_count(&self) -> usize {
        1 + self
            .inputs
            .values()
            .flatten()
            .map(ProductionChain::node_count)
            .sum::<usize>()
    }
}

/// Resolves the chain for `facility_count` instances of a single-recipe facility.
///
/// Fails with [`ChainError::AmbiguousRecipe`] when the facility runs anything
/// other than exactly one recipe.
pub fn resolve_for_facility<'a>(
    faction: &'a Faction,
    facility_name: &str,
    facility_count: Quantity,
) -> Result<ProductionChain<'a>> {
    let facility = faction.facility_by_name(facility_name)?;
    match facility.recipes.as_slice() {
        [recipe] => resolve(faction, recipe, facility_count),
        recipes => Err(ChainError::AmbiguousRecipe {
            facility: facility.name.clone(),
            recipes: recipes.iter().map(|r| r.name.clone()).collect(),
        }),
    }
}

/// Resolves one chain per recipe producing `product` at `target_rate` per hour.
///
/// Chains are returned in catalogue order. Fails with
/// [`ChainError::NoRecipe`] if nothing produces `product`.
///
/// # Example
///
/// ```
/// use std::collections::BTreeMap;
/// use timberchain::chain::resolve_for_product;
/// use timberchain::models::{whole, Facility, Faction, Recipe};
///
/// let mill = Facility {
///     name: "Lumber Mill".to_string(),
///     recipes: vec![Recipe {
///         name: "Planks".to_string(),
///         output: BTreeMap::from([("Plank".to_string(), whole(1))]),
///         requirements: BTreeMap::from([("Log".to_string(), whole(1))]),
///         time: whole(2),
///     }],
///     workers: 1,
///     power: whole(50),
///     width: 2,
///     depth: 3,
///     height: 3,
/// };
/// let faction = Faction::new("Folktails", vec![mill], vec![]).unwrap();
///
/// let chains = resolve_for_product(&faction, "Plank", whole(3)).unwrap();
/// assert_eq!(chains.len(), 1);
/// assert_eq!(chains[0].number_facilities, whole(6));
/// assert_eq!(chains[0].raw_materials["Log"], whole(3));
/// ```
pub fn resolve_for_product<'a>(
    faction: &'a Faction,
    product: &str,
    target_rate: Quantity,
) -> Result<Vec<ProductionChain<'a>>> {
    ensure_positive(&target_rate, "target rate")?;
    let producers = faction.producers(product);
    if producers.is_empty() {
        return Err(ChainError::NoRecipe(product.to_string()));
    }

    tracing::info!(
        faction = %faction.name,
        product,
        rate = %target_rate,
        alternatives = producers.len(),
        "resolving product"
    );

    producers
        .into_iter()
        .map(|(facility, recipe)| {
            let throughput = throughput(recipe, product)?;
            resolve_from(faction, facility, recipe, Some(product), &target_rate / throughput)
        })
        .collect()
}

/// Resolves the chain for `number_facilities` instances running `recipe`.
///
/// The recipe is looked up by name in `faction`'s recipe index and the
/// faction's own copy is resolved; an unknown name fails with
/// [`ChainError::RecipeNotFound`].
pub fn resolve<'a>(
    faction: &'a Faction,
    recipe: &Recipe,
    number_facilities: Quantity,
) -> Result<ProductionChain<'a>> {
    ensure_positive(&number_facilities, "facility count")?;
    let (facility, recipe) = faction.recipe_by_name(&recipe.name)?;
    resolve_from(faction, facility, recipe, None, number_facilities)
}

fn ensure_positive(value: &Quantity, what: &str) -> Result<()> {
    if !value.is_positive() {
        return Err(ChainError::InvalidRate(format!("{} must be positive, got {}", what, value)));
    }
    Ok(())
}

fn throughput(recipe: &Recipe, product: &str) -> Result<Quantity> {
    recipe
        .throughput_per_hour(product)
        .ok_or_else(|| ChainError::NoRecipe(product.to_string()))
}

/// What a frame needs next.
enum Step<'a> {
    /// Resolve `facility`/`recipe` for `product` at `rate` per hour.
    Descend {
        facility: &'a Facility,
        recipe: &'a Recipe,
        product: &'a str,
        rate: Quantity,
    },
    /// Every input slot of the frame is resolved.
    Done,
}

/// An input slot whose alternatives are being resolved.
struct Slot<'a> {
    product: &'a str,
    rate: Quantity,
    candidates: std::vec::IntoIter<(&'a Facility, &'a Recipe)>,
    resolved: Vec<ProductionChain<'a>>,
}

/// A node under construction on the resolution stack.
struct Frame<'a> {
    node: ProductionChain<'a>,
    /// Input slots not yet started, with the rate they must supply; popped from the back
    pending: Vec<(&'a str, Quantity)>,
    slot: Option<Slot<'a>>,
}

impl<'a> Frame<'a> {
    fn new(
        facility: &'a Facility,
        recipe: &'a Recipe,
        product: Option<&str>,
        number_facilities: Quantity,
    ) -> Self {
        let pending = recipe
            .requirements
            .iter()
            .rev()
            .map(|(input, amount)| (input.as_str(), amount * &number_facilities / &recipe.time))
            .collect();
        Self {
            node: ProductionChain {
                facility,
                recipe,
                product: product.map(str::to_string),
                number_facilities,
                inputs: BTreeMap::new(),
                raw_materials: BTreeMap::new(),
            },
            pending,
            slot: None,
        }
    }

    fn advance(&mut self, faction: &'a Faction) -> Step<'a> {
        loop {
            if let Some(slot) = self.slot.as_mut() {
                if let Some((facility, recipe)) = slot.candidates.next() {
                    return Step::Descend {
                        facility,
                        recipe,
                        product: slot.product,
                        rate: slot.rate.clone(),
                    };
                }
            }
            if let Some(slot) = self.slot.take() {
                self.node.inputs.insert(slot.product.to_string(), slot.resolved);
            }

            let Some((product, rate)) = self.pending.pop() else {
                return Step::Done;
            };
            let candidates = faction.producers(product);
            if candidates.is_empty() {
                tracing::debug!(product, rate = %rate, "raw material");
                self.node.raw_materials.insert(product.to_string(), rate);
                continue;
            }
            self.slot = Some(Slot {
                product,
                rate,
                candidates: candidates.into_iter(),
                resolved: Vec::new(),
            });
        }
    }

    fn accept(&mut self, child: ProductionChain<'a>) {
        if let Some(slot) = self.slot.as_mut() {
            slot.resolved.push(child);
        }
    }

    fn finish(self) -> ProductionChain<'a> {
        tracing::debug!(
            facility = %self.node.facility.name,
            recipe = %self.node.recipe.name,
            count = %self.node.number_facilities,
            "resolved node"
        );
        self.node
    }
}

/// Depth-first resolution from one root node using an explicit stack.
fn resolve_from<'a>(
    faction: &'a Faction,
    facility: &'a Facility,
    recipe: &'a Recipe,
    product: Option<&str>,
    number_facilities: Quantity,
) -> Result<ProductionChain<'a>> {
    let mut current = Frame::new(facility, recipe, product, number_facilities);
    let mut parents: Vec<Frame<'a>> = Vec::new();

    loop {
        match current.advance(faction) {
            Step::Descend {
                facility,
                recipe,
                product,
                rate,
            } => {
                let on_path = std::iter::once(&current)
                    .chain(parents.iter())
                    .any(|frame| frame.node.recipe.produces(product));
                if on_path {
                    let path = parents
                        .iter()
                        .chain(std::iter::once(&current))
                        .map(|frame| frame.node.recipe.name.clone())
                        .collect();
                    return Err(ChainError::CyclicDependency {
                        product: product.to_string(),
                        path,
                    });
                }

                let child = Frame::new(facility, recipe, Some(product), rate / throughput(recipe, product)?);
                parents.push(std::mem::replace(&mut current, child));
            }
            Step::Done => match parents.pop() {
                Some(mut parent) => {
                    std::mem::swap(&mut parent, &mut current);
                    current.accept(parent.finish());
                }
                None => return Ok(current.finish()),
            },
        }
    }
}
