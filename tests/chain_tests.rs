//! Tests for production chain resolution.

mod common;

use common::{cyclic_faction, facility, frac, q, recipe, test_faction};
use num_bigint::BigInt;
use timberchain::aggregate::raw_materials;
use timberchain::chain::{resolve, resolve_for_facility, resolve_for_product};
use timberchain::models::{Faction, Quantity};
use timberchain::ChainError;

#[test]
fn test_single_path_chain() {
    let faction = test_faction();
    let chains = resolve_for_product(&faction, "Bot", q(4)).unwrap();

    assert_eq!(chains.len(), 1);
    let bot = &chains[0];
    assert_eq!(bot.facility.name, "Bot Assembler");
    assert_eq!(bot.product.as_deref(), Some("Bot"));
    assert_eq!(bot.number_facilities, q(12));
    assert_eq!(bot.input_rate("Circuit Board"), Some(q(8)));

    let boards = bot.alternatives("Circuit Board");
    assert_eq!(boards.len(), 1);
    assert_eq!(boards[0].facility.name, "Circuit Press");
    assert_eq!(boards[0].number_facilities, q(8));
    assert_eq!(boards[0].raw_materials["Copper"], q(8));
    assert!(boards[0].inputs.is_empty());
}

#[test]
fn test_output_rate_matches_target() {
    let faction = test_faction();
    let rate = frac(50, 3);

    for chain in resolve_for_product(&faction, "Biofuel", rate.clone()).unwrap() {
        assert_eq!(chain.output_rate("Biofuel"), Some(rate.clone()));
    }
}

#[test]
fn test_every_alternative_is_resolved_in_order() {
    let faction = test_faction();
    let chains = resolve_for_product(&faction, "Biofuel", frac(50, 3)).unwrap();

    let roots: Vec<&str> = chains.iter().map(|c| c.facility.name.as_str()).collect();
    assert_eq!(roots, vec!["Refinery", "Bioreactor"]);

    let refinery = &chains[0];
    assert_eq!(refinery.number_facilities, frac(5, 3));
    assert_eq!(refinery.input_rate("Carrot"), Some(frac(10, 9)));
    let farm = &refinery.alternatives("Carrot")[0];
    assert_eq!(farm.recipe.name, "Carrots");
    assert_eq!(farm.number_facilities, frac(40, 27));

    let water: Vec<&str> = farm
        .alternatives("Water")
        .iter()
        .map(|c| c.facility.name.as_str())
        .collect();
    assert_eq!(water, vec!["Water Pump", "Large Water Pump"]);
    assert_eq!(farm.alternatives("Water")[0].number_facilities, frac(10, 81));
    assert_eq!(farm.alternatives("Water")[1].number_facilities, frac(5, 81));

    let bioreactor = &chains[1];
    assert_eq!(bioreactor.number_facilities, frac(5, 3));
    assert_eq!(bioreactor.alternatives("Water")[0].number_facilities, frac(5, 9));
    assert_eq!(bioreactor.alternatives("Water")[1].number_facilities, frac(5, 18));
}

#[test]
fn test_children_supply_exactly_what_parents_consume() {
    let faction = test_faction();
    let chains = resolve_for_product(&faction, "Biofuel", q(7)).unwrap();

    let mut stack: Vec<_> = chains.iter().collect();
    while let Some(node) = stack.pop() {
        for (product, options) in &node.inputs {
            for option in options {
                assert_eq!(option.product.as_deref(), Some(product.as_str()));
                assert_eq!(option.output_rate(product), node.input_rate(product));
                stack.push(option);
            }
        }
    }
}

#[test]
fn test_node_count_and_selection_state() {
    let faction = test_faction();
    let chains = resolve_for_product(&faction, "Biofuel", frac(50, 3)).unwrap();

    assert_eq!(chains[0].node_count(), 4);
    assert_eq!(chains[1].node_count(), 3);
    assert!(!chains[0].is_selected());

    let bot = resolve_for_product(&faction, "Bot", q(1)).unwrap();
    assert!(bot[0].is_selected());
}

#[test]
fn test_alternatives_of_unknown_slot_is_empty() {
    let faction = test_faction();
    let chains = resolve_for_product(&faction, "Bot", q(1)).unwrap();

    assert!(chains[0].alternatives("Copper").is_empty());
    assert!(chains[0].alternatives("Water").is_empty());
    assert_eq!(chains[0].input_rate("Water"), None);
}

#[test]
fn test_raw_material_product_has_no_recipe() {
    let faction = test_faction();

    assert_eq!(
        resolve_for_product(&faction, "Copper", q(1)).unwrap_err(),
        ChainError::NoRecipe("Copper".to_string())
    );
    assert_eq!(
        resolve_for_product(&faction, "Unobtainium", q(1)).unwrap_err(),
        ChainError::NoRecipe("Unobtainium".to_string())
    );
}

#[test]
fn test_non_positive_rate_is_rejected() {
    let faction = test_faction();

    assert!(matches!(
        resolve_for_product(&faction, "Bot", q(0)),
        Err(ChainError::InvalidRate(_))
    ));
    assert!(matches!(
        resolve_for_product(&faction, "Bot", frac(-1, 2)),
        Err(ChainError::InvalidRate(_))
    ));
    assert!(matches!(
        resolve_for_facility(&faction, "Circuit Press", q(0)),
        Err(ChainError::InvalidRate(_))
    ));
}

#[test]
fn test_resolve_for_facility() {
    let faction = test_faction();
    let chain = resolve_for_facility(&faction, "Circuit Press", q(2)).unwrap();

    assert_eq!(chain.product, None);
    assert_eq!(chain.number_facilities, q(2));
    assert_eq!(chain.output_rate("Circuit Board"), Some(q(2)));
    assert_eq!(chain.raw_materials["Copper"], q(2));
}

#[test]
fn test_resolve_for_facility_with_several_recipes() {
    let faction = test_faction();

    assert_eq!(
        resolve_for_facility(&faction, "Farmhouse", q(1)).unwrap_err(),
        ChainError::AmbiguousRecipe {
            facility: "Farmhouse".to_string(),
            recipes: vec!["Carrots".to_string(), "Potatoes".to_string()],
        }
    );
    assert_eq!(
        resolve_for_facility(&faction, "Warehouse", q(1)).unwrap_err(),
        ChainError::AmbiguousRecipe {
            facility: "Warehouse".to_string(),
            recipes: vec![],
        }
    );
    assert_eq!(
        resolve_for_facility(&faction, "Castle", q(1)).unwrap_err(),
        ChainError::FacilityNotFound("Castle".to_string())
    );
}

#[test]
fn test_resolve_recipe_directly() {
    let faction = test_faction();
    let potatoes = faction.recipes_producing("Potato")[0].clone();

    let chain = resolve(&faction, &potatoes, q(2)).unwrap();
    assert_eq!(chain.facility.name, "Farmhouse");
    assert_eq!(chain.input_rate("Water"), Some(frac(1, 3)));
    assert_eq!(chain.alternatives("Water").len(), 2);

    let mut renamed = potatoes;
    renamed.name = "Gold Potatoes".to_string();
    assert_eq!(
        resolve(&faction, &renamed, q(1)).unwrap_err(),
        ChainError::RecipeNotFound("Gold Potatoes".to_string())
    );
}

#[test]
fn test_resolve_uses_the_catalogue_copy_of_a_recipe() {
    let faction = test_faction();
    let mut stale = faction.recipes_producing("Potato")[0].clone();
    stale.time = q(100);

    let chain = resolve(&faction, &stale, q(1)).unwrap();
    assert_eq!(chain.recipe.time, q(6));
    assert!(std::ptr::eq(chain.recipe, &chain.facility.recipes[1]));
}

/// Each of `depth` layers makes 7 of its product per hour from 11 of the next.
fn deep_faction(depth: usize) -> Faction {
    let product = |layer: usize| {
        if layer == depth {
            "Ore".to_string()
        } else {
            format!("P{}", layer)
        }
    };
    let facilities = (0..depth)
        .map(|layer| {
            facility(
                &format!("Stage {}", layer),
                1,
                10,
                (1, 1, 1),
                vec![recipe(
                    &format!("Refine {}", layer),
                    &[(product(layer).as_str(), q(7))],
                    &[(product(layer + 1).as_str(), q(11))],
                    q(1),
                )],
            )
        })
        .collect();
    Faction::new("Deep", facilities, vec![]).unwrap()
}

#[test]
fn test_deep_chain_stays_exact() {
    let faction = deep_faction(24);
    let chains = resolve_for_product(&faction, "P0", q(1)).unwrap();

    let mut node = &chains[0];
    for layer in 0..24u32 {
        let expected = Quantity::new(BigInt::from(11).pow(layer), BigInt::from(7).pow(layer + 1));
        assert_eq!(node.number_facilities, expected);
        if layer < 23 {
            node = &node.alternatives(&format!("P{}", layer + 1))[0];
        }
    }

    let ore = Quantity::new(BigInt::from(11).pow(24), BigInt::from(7).pow(24));
    assert_eq!(node.raw_materials["Ore"], ore);
    assert_eq!(raw_materials(&chains[0])["Ore"], ore);
    assert_eq!(chains[0].node_count(), 24);
}

#[test]
fn test_mutual_cycle_is_detected() {
    let faction = cyclic_faction();

    assert_eq!(
        resolve_for_product(&faction, "Compost", q(1)).unwrap_err(),
        ChainError::CyclicDependency {
            product: "Compost".to_string(),
            path: vec!["Composting".to_string(), "Fertilizing".to_string()],
        }
    );
    assert_eq!(
        resolve_for_product(&faction, "Fertilizer", q(1)).unwrap_err(),
        ChainError::CyclicDependency {
            product: "Fertilizer".to_string(),
            path: vec!["Fertilizing".to_string(), "Composting".to_string()],
        }
    );
}

#[test]
fn test_self_cycle_is_detected() {
    let faction = cyclic_faction();

    assert_eq!(
        resolve_for_product(&faction, "Scrap", q(1)).unwrap_err(),
        ChainError::CyclicDependency {
            product: "Scrap".to_string(),
            path: vec!["Recycling".to_string()],
        }
    );
}

#[test]
fn test_error_messages() {
    assert_eq!(
        ChainError::NoRecipe("Copper".to_string()).to_string(),
        "no recipe produces 'Copper'"
    );
    assert_eq!(
        ChainError::CyclicDependency {
            product: "Compost".to_string(),
            path: vec!["Composting".to_string(), "Fertilizing".to_string()],
        }
        .to_string(),
        "cyclic dependency on 'Compost' via Composting -> Fertilizing"
    );
}
