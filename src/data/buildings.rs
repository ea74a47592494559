//! Building catalog: footprints, capacities, and construction costs.

use crate::shared::*;

pub fn populate_buildings(catalog: &mut BuildingCatalog) {
    let defs = vec![
        BuildingDef {
            kind: BuildingKind::House,
            width: 4,
            height: 3,
            capacity: 0,
            gold_cost: 2000,
            material_costs: vec![("wood".to_string(), 80), ("stone".to_string(), 40)],
        },
        BuildingDef {
            kind: BuildingKind::Barn,
            width: 3,
            height: 3,
            capacity: 4,
            gold_cost: 1200,
            material_costs: vec![("wood".to_string(), 50), ("stone".to_string(), 30)],
        },
        BuildingDef {
            kind: BuildingKind::Coop,
            width: 3,
            height: 2,
            capacity: 4,
            gold_cost: 800,
            material_costs: vec![("wood".to_string(), 40), ("stone".to_string(), 15)],
        },
        BuildingDef {
            kind: BuildingKind::Silo,
            width: 2,
            height: 2,
            capacity: 0,
            gold_cost: 400,
            material_costs: vec![("stone".to_string(), 40)],
        },
    ];

    for def in defs {
        catalog.defs.insert(def.kind, def);
    }
}
