//! Resource node tables: how many swings, what they cost, what drops.

use crate::shared::*;

pub fn populate_nodes(registry: &mut NodeRegistry) {
    let defs = vec![
        NodeDef {
            kind: NodeKind::Tree,
            toughness: 5,
            energy_cost: 3.0,
            loot: vec![("wood".to_string(), 4)],
        },
        NodeDef {
            kind: NodeKind::Rock,
            toughness: 3,
            energy_cost: 4.0,
            loot: vec![("stone".to_string(), 2)],
        },
        NodeDef {
            kind: NodeKind::OreVein,
            toughness: 6,
            energy_cost: 5.0,
            loot: vec![
                ("stone".to_string(), 1),
                ("copper_ore".to_string(), 2),
                ("iron_ore".to_string(), 1),
            ],
        },
    ];

    for def in defs {
        registry.nodes.insert(def.kind, def);
    }
}
