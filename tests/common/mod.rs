//! Shared catalogue builders for integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;

use timberchain::models::{ratio, whole, Facility, Faction, PowerPlant, Quantity, Recipe};

pub fn q(n: i64) -> Quantity {
    whole(n)
}

pub fn frac(numer: i64, denom: i64) -> Quantity {
    ratio(numer, denom)
}

pub fn recipe(
    name: &str,
    output: &[(&str, Quantity)],
    requirements: &[(&str, Quantity)],
    time: Quantity,
) -> Recipe {
    Recipe {
        name: name.to_string(),
        output: output
            .iter()
            .map(|(p, a)| (p.to_string(), a.clone()))
            .collect::<BTreeMap<_, _>>(),
        requirements: requirements
            .iter()
            .map(|(p, a)| (p.to_string(), a.clone()))
            .collect::<BTreeMap<_, _>>(),
        time,
    }
}

pub fn facility(
    name: &str,
    workers: u32,
    power: i64,
    (width, depth, height): (u32, u32, u32),
    recipes: Vec<Recipe>,
) -> Facility {
    Facility {
        name: name.to_string(),
        recipes,
        workers,
        power: q(power),
        width,
        depth,
        height,
    }
}

/// A small faction covering the interesting shapes:
///
/// - `Bot` needs 2 `Circuit Board` per 3-hour cycle; boards need raw `Copper`
/// - `Biofuel` has two alternatives (Refinery from carrots, Bioreactor from water)
/// - `Water` has two alternatives (Water Pump, Large Water Pump)
/// - `Farmhouse` runs two recipes
pub fn test_faction() -> Faction {
    Faction::new(
        "Testers",
        vec![
            facility(
                "Bot Assembler",
                3,
                300,
                (5, 3, 4),
                vec![recipe("Bot Assembly", &[("Bot", q(1))], &[("Circuit Board", q(2))], q(3))],
            ),
            facility(
                "Circuit Press",
                1,
                100,
                (2, 2, 2),
                vec![recipe("Circuit Boards", &[("Circuit Board", q(1))], &[("Copper", q(1))], q(1))],
            ),
            facility(
                "Refinery",
                2,
                200,
                (3, 4, 4),
                vec![recipe(
                    "Biofuel (Carrots)",
                    &[("Biofuel", q(30))],
                    &[("Carrot", q(2))],
                    q(3),
                )],
            ),
            facility(
                "Bioreactor",
                1,
                300,
                (2, 2, 2),
                vec![recipe("Biofuel (Algae)", &[("Biofuel", q(10))], &[("Water", q(1))], q(1))],
            ),
            facility(
                "Farmhouse",
                1,
                0,
                (2, 2, 2),
                vec![
                    recipe("Carrots", &[("Carrot", q(3))], &[("Water", q(1))], q(4)),
                    recipe("Potatoes", &[("Potato", q(3))], &[("Water", q(1))], q(6)),
                ],
            ),
            facility(
                "Water Pump",
                1,
                0,
                (2, 3, 2),
                vec![recipe("Water", &[("Water", q(1))], &[], frac(1, 3))],
            ),
            facility(
                "Large Water Pump",
                2,
                0,
                (3, 3, 3),
                vec![recipe("Water (Large)", &[("Water", q(1))], &[], frac(1, 6))],
            ),
            facility("Warehouse", 0, 0, (3, 3, 3), vec![]),
        ],
        vec![
            PowerPlant {
                name: "Water Wheel".to_string(),
                power: q(50),
            },
            PowerPlant {
                name: "Broken Wheel".to_string(),
                power: q(0),
            },
        ],
    )
    .unwrap()
}

/// Compost and Fertilizer require each other.
pub fn cyclic_faction() -> Faction {
    Faction::new(
        "Cyclers",
        vec![
            facility(
                "Composter",
                1,
                0,
                (1, 1, 1),
                vec![recipe("Composting", &[("Compost", q(1))], &[("Fertilizer", q(1))], q(1))],
            ),
            facility(
                "Fertilizer Plant",
                1,
                0,
                (1, 1, 1),
                vec![recipe("Fertilizing", &[("Fertilizer", q(1))], &[("Compost", q(1))], q(1))],
            ),
            facility(
                "Recycler",
                1,
                0,
                (1, 1, 1),
                vec![recipe("Recycling", &[("Scrap", q(2))], &[("Scrap", q(1))], q(1))],
            ),
        ],
        vec![],
    )
    .unwrap()
}
