//! World domain plugin for Willowmere.
//!
//! Responsible for:
//! - The collision predicate every mover consults
//! - Lazy map generation and the session map cache (router submodule)
//! - Edge transitions, building interiors, and dungeon floor changes

use bevy::prelude::*;

use crate::shared::*;

pub mod maps;
pub mod router;

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Playing), router::ensure_initial_map)
            .add_systems(
                Update,
                (
                    router::handle_edge_exit,
                    router::handle_enter_building,
                    router::handle_change_floor,
                )
                    .in_set(SimSet::Actions)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// COLLISION
// ═══════════════════════════════════════════════════════════════════════

/// The one collision predicate: terrain solidity comes from the tile
/// table, crops are layered on top (trees and trellised crops block).
/// Occupant checks — other movers standing on the tile — are the
/// caller's job.
///
/// Out of bounds reads as Wall and is therefore solid.
pub fn is_solid(
    grid: &TileGrid,
    x: i32,
    y: i32,
    crops: Option<(&CropLedger, &CropRegistry)>,
) -> bool {
    if grid.get(x, y).is_solid_terrain() {
        return true;
    }

    if let Some((ledger, registry)) = crops {
        if let Some(crop) = ledger.crops.get(&TilePos::new(x, y)) {
            if let Some(def) = registry.get(&crop.kind) {
                if def.blocks_movement() {
                    return true;
                }
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn trellis_registry() -> CropRegistry {
        let mut crops = HashMap::new();
        crops.insert(
            "bean".to_string(),
            CropDef {
                id: "bean".into(),
                name: "Bean".into(),
                seed_id: "bean_seeds".into(),
                harvest_id: "bean".into(),
                growth_rate: 1.0,
                class: CropClass::Regrow { regrow_stage: 60.0 },
                trellis: true,
                seasons: vec![Season::Spring],
                sell_price: 40,
            },
        );
        crops.insert(
            "turnip".to_string(),
            CropDef {
                id: "turnip".into(),
                name: "Turnip".into(),
                seed_id: "turnip_seeds".into(),
                harvest_id: "turnip".into(),
                growth_rate: 2.0,
                class: CropClass::Single {
                    seed_refund_chance: 0.1,
                },
                trellis: false,
                seasons: vec![Season::Spring],
                sell_price: 35,
            },
        );
        CropRegistry { crops }
    }

    #[test]
    fn test_terrain_solidity_and_bounds() {
        let mut grid = TileGrid::filled(8, 8, TileKind::Grass);
        grid.set(3, 3, TileKind::Water);
        grid.set(4, 4, TileKind::Rock);

        assert!(is_solid(&grid, 3, 3, None));
        assert!(is_solid(&grid, 4, 4, None));
        assert!(is_solid(&grid, -1, 0, None));
        assert!(is_solid(&grid, 8, 0, None));
        assert!(!is_solid(&grid, 0, 0, None));
    }

    #[test]
    fn test_trellis_crop_blocks_but_field_crop_does_not() {
        let grid = TileGrid::filled(8, 8, TileKind::Soil);
        let registry = trellis_registry();
        let mut ledger = CropLedger::default();
        ledger.crops.insert(
            TilePos::new(1, 1),
            Crop {
                kind: "bean".into(),
                stage: 10.0,
                withered: false,
            },
        );
        ledger.crops.insert(
            TilePos::new(2, 2),
            Crop {
                kind: "turnip".into(),
                stage: 10.0,
                withered: false,
            },
        );

        assert!(is_solid(&grid, 1, 1, Some((&ledger, &registry))));
        assert!(!is_solid(&grid, 2, 2, Some((&ledger, &registry))));
    }
}
