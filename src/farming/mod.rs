//! Farming domain — the crop automaton.
//!
//! Crops live in a sparse ledger keyed by tile. Every tick each crop adds
//! its configured growth rate to `stage`; the value is deliberately not
//! clamped at 100, so a crop left in the ground keeps accumulating and
//! stays harvestable. Harvest behavior branches three ways on the crop's
//! class: trees reset and are never deleted, regrowable field crops reset
//! to a mid stage, single-harvest crops are removed and their tile
//! reverts to soil.

use bevy::prelude::*;
use rand::Rng;

use crate::shared::*;

pub struct FarmingPlugin;

impl Plugin for FarmingPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (grow_crops, wither_out_of_season)
                .in_set(SimSet::World)
                .run_if(in_state(GameState::Playing)),
        )
        .add_systems(
            Update,
            (handle_plant, handle_harvest)
                .in_set(SimSet::Actions)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CORE RULES
// ═══════════════════════════════════════════════════════════════════════

/// Insert a stage-0 crop at `pos`. Planting onto an occupied tile is a
/// silent no-op: returns false and changes nothing.
pub fn plant(ledger: &mut CropLedger, crop_id: &str, pos: TilePos) -> bool {
    if ledger.crops.contains_key(&pos) {
        return false;
    }
    ledger.crops.insert(
        pos,
        Crop {
            kind: crop_id.to_string(),
            stage: 0.0,
            withered: false,
        },
    );
    true
}

/// One growth tick for the whole ledger. Withered crops stop growing.
pub fn grow(ledger: &mut CropLedger, registry: &CropRegistry) {
    for crop in ledger.crops.values_mut() {
        if crop.withered {
            continue;
        }
        if let Some(def) = registry.get(&crop.kind) {
            crop.stage += def.growth_rate;
        }
    }
}

/// What harvesting did to the plant itself. The yield item is the same
/// in every case; the difference is what remains in the ground.
#[derive(Debug, Clone, PartialEq)]
pub enum HarvestOutcome {
    /// Plant stays, stage reset (trees and regrowable crops).
    Reset,
    /// Plant removed; `seed_refunded` reports the refund roll, and the
    /// backing tile reverts to soil.
    Removed { seed_refunded: bool },
}

/// Harvest the crop at `pos` if there is one and it is mature. Returns
/// the harvested item id plus what happened to the plant; `None` leaves
/// the ledger untouched (no crop, immature, withered, or unknown kind).
pub fn harvest(
    ledger: &mut CropLedger,
    registry: &CropRegistry,
    grid: &mut TileGrid,
    pos: TilePos,
) -> Option<(ItemId, HarvestOutcome)> {
    let crop = ledger.crops.get(&pos)?;
    if crop.withered || !crop.is_harvestable() {
        return None;
    }
    let def = registry.get(&crop.kind)?.clone();

    let outcome = match def.class {
        CropClass::Tree { regrow_stage } | CropClass::Regrow { regrow_stage } => {
            if let Some(crop) = ledger.crops.get_mut(&pos) {
                crop.stage = regrow_stage;
            }
            HarvestOutcome::Reset
        }
        CropClass::Single { seed_refund_chance } => {
            ledger.crops.remove(&pos);
            grid.set(pos.x, pos.y, TileKind::Soil);
            let seed_refunded = rand::thread_rng().gen_bool(seed_refund_chance as f64);
            HarvestOutcome::Removed { seed_refunded }
        }
    };

    Some((def.harvest_id, outcome))
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

fn grow_crops(
    clock: Res<TimeCycle>,
    mut ledger: ResMut<CropLedger>,
    registry: Res<CropRegistry>,
) {
    if clock.paused {
        return;
    }
    grow(&mut ledger, &registry);
}

/// Season turnover kills crops that don't grow in the new season.
fn wither_out_of_season(
    mut season_reader: EventReader<SeasonChangeEvent>,
    mut ledger: ResMut<CropLedger>,
    registry: Res<CropRegistry>,
) {
    for event in season_reader.read() {
        let mut withered = 0u32;
        for crop in ledger.crops.values_mut() {
            if crop.withered {
                continue;
            }
            if let Some(def) = registry.get(&crop.kind) {
                if !def.seasons.contains(&event.new_season) {
                    crop.withered = true;
                    withered += 1;
                }
            }
        }
        if withered > 0 {
            info!(
                "[Farming] {} crops withered at the turn of {:?}",
                withered, event.new_season
            );
        }
    }
}

/// Plants the selected seed. The dispatcher already checked the tile is
/// soil and the hotbar holds a seed; this system still verifies both so
/// a stale event can't corrupt state.
fn handle_plant(
    mut plant_reader: EventReader<PlantEvent>,
    mut ledger: ResMut<CropLedger>,
    mut inventory: ResMut<Inventory>,
    registry: Res<CropRegistry>,
    player: Res<PlayerState>,
    mut mutated_writer: EventWriter<WorldMutatedEvent>,
) {
    for event in plant_reader.read() {
        let Some(ref seed_id) = player.selected_item else {
            continue;
        };
        let Some(def) = registry.by_seed(seed_id) else {
            continue;
        };
        if !inventory.has(seed_id, 1) {
            continue;
        }
        if plant(&mut ledger, &def.id, event.pos) {
            inventory.try_remove(seed_id, 1);
            info!(
                "[Farming] Planted {} at ({}, {})",
                def.name, event.pos.x, event.pos.y
            );
            mutated_writer.send(WorldMutatedEvent);
        }
    }
}

fn handle_harvest(
    mut harvest_reader: EventReader<HarvestEvent>,
    mut ledger: ResMut<CropLedger>,
    mut registry_maps: ResMut<MapRegistry>,
    registry: Res<CropRegistry>,
    mut inventory: ResMut<Inventory>,
    mut gained_writer: EventWriter<ItemGainedEvent>,
    mut mutated_writer: EventWriter<WorldMutatedEvent>,
) {
    for event in harvest_reader.read() {
        let Some(map) = registry_maps.current_map_mut() else {
            continue;
        };

        // A withered plant yields nothing; interacting clears it.
        if ledger
            .crops
            .get(&event.pos)
            .map(|c| c.withered)
            .unwrap_or(false)
        {
            ledger.crops.remove(&event.pos);
            map.grid.set(event.pos.x, event.pos.y, TileKind::Soil);
            info!(
                "[Farming] Cleared withered crop at ({}, {})",
                event.pos.x, event.pos.y
            );
            mutated_writer.send(WorldMutatedEvent);
            continue;
        }

        let Some((item_id, outcome)) = harvest(&mut ledger, &registry, &mut map.grid, event.pos)
        else {
            continue;
        };

        inventory.try_add(&item_id, 1);
        gained_writer.send(ItemGainedEvent {
            item_id: item_id.clone(),
            quantity: 1,
        });

        if let HarvestOutcome::Removed {
            seed_refunded: true,
        } = outcome
        {
            if let Some(def) = registry.by_harvest(&item_id) {
                inventory.try_add(&def.seed_id, 1);
                gained_writer.send(ItemGainedEvent {
                    item_id: def.seed_id.clone(),
                    quantity: 1,
                });
            }
        }

        info!(
            "[Farming] Harvested {} at ({}, {})",
            item_id, event.pos.x, event.pos.y
        );
        mutated_writer.send(WorldMutatedEvent);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn registry() -> CropRegistry {
        let mut crops = HashMap::new();
        crops.insert(
            "turnip".to_string(),
            CropDef {
                id: "turnip".into(),
                name: "Turnip".into(),
                seed_id: "turnip_seeds".into(),
                harvest_id: "turnip".into(),
                growth_rate: 2.5,
                class: CropClass::Single {
                    seed_refund_chance: 0.0,
                },
                trellis: false,
                seasons: vec![Season::Spring],
                sell_price: 35,
            },
        );
        crops.insert(
            "berry_bush".to_string(),
            CropDef {
                id: "berry_bush".into(),
                name: "Berry Bush".into(),
                seed_id: "berry_sapling".into(),
                harvest_id: "berry".into(),
                growth_rate: 0.5,
                class: CropClass::Regrow { regrow_stage: 60.0 },
                trellis: false,
                seasons: vec![Season::Spring, Season::Summer],
                sell_price: 50,
            },
        );
        crops.insert(
            "apple_tree".to_string(),
            CropDef {
                id: "apple_tree".into(),
                name: "Apple Tree".into(),
                seed_id: "apple_sapling".into(),
                harvest_id: "apple".into(),
                growth_rate: 0.1,
                class: CropClass::Tree { regrow_stage: 80.0 },
                trellis: false,
                seasons: vec![Season::Spring, Season::Summer, Season::Fall],
                sell_price: 80,
            },
        );
        CropRegistry { crops }
    }

    #[test]
    fn test_plant_on_occupied_tile_is_silent_noop() {
        let mut ledger = CropLedger::default();
        let pos = TilePos::new(5, 5);

        assert!(plant(&mut ledger, "turnip", pos));
        ledger.crops.get_mut(&pos).unwrap().stage = 42.0;

        assert!(!plant(&mut ledger, "berry_bush", pos));
        let crop = &ledger.crops[&pos];
        assert_eq!(crop.kind, "turnip");
        assert_eq!(crop.stage, 42.0);
    }

    #[test]
    fn test_growth_reaches_maturity_in_expected_ticks() {
        let reg = registry();
        let mut ledger = CropLedger::default();
        let pos = TilePos::new(0, 0);
        plant(&mut ledger, "turnip", pos);

        // growth_rate 2.5 -> mature at tick 40.
        for _ in 0..39 {
            grow(&mut ledger, &reg);
        }
        assert!(!ledger.crops[&pos].is_harvestable());

        grow(&mut ledger, &reg);
        assert!(ledger.crops[&pos].is_harvestable());
    }

    #[test]
    fn test_stage_accumulates_past_maturity() {
        let reg = registry();
        let mut ledger = CropLedger::default();
        let pos = TilePos::new(0, 0);
        plant(&mut ledger, "turnip", pos);

        for _ in 0..100 {
            grow(&mut ledger, &reg);
        }
        assert!(ledger.crops[&pos].stage > 200.0);
        assert!(ledger.crops[&pos].is_harvestable());
    }

    #[test]
    fn test_harvest_single_removes_and_reverts_to_soil() {
        let reg = registry();
        let mut ledger = CropLedger::default();
        let mut grid = TileGrid::filled(8, 8, TileKind::Soil);
        let pos = TilePos::new(3, 3);
        plant(&mut ledger, "turnip", pos);
        ledger.crops.get_mut(&pos).unwrap().stage = 120.0;

        let (item, outcome) = harvest(&mut ledger, &reg, &mut grid, pos).unwrap();
        assert_eq!(item, "turnip");
        assert!(matches!(outcome, HarvestOutcome::Removed { .. }));
        assert!(!ledger.crops.contains_key(&pos));
        assert_eq!(grid.get(3, 3), TileKind::Soil);
    }

    #[test]
    fn test_harvest_regrow_resets_stage() {
        let reg = registry();
        let mut ledger = CropLedger::default();
        let mut grid = TileGrid::filled(8, 8, TileKind::Soil);
        let pos = TilePos::new(2, 2);
        plant(&mut ledger, "berry_bush", pos);
        ledger.crops.get_mut(&pos).unwrap().stage = 105.0;

        let (item, outcome) = harvest(&mut ledger, &reg, &mut grid, pos).unwrap();
        assert_eq!(item, "berry");
        assert_eq!(outcome, HarvestOutcome::Reset);
        assert_eq!(ledger.crops[&pos].stage, 60.0);
    }

    #[test]
    fn test_harvest_tree_never_deleted() {
        let reg = registry();
        let mut ledger = CropLedger::default();
        let mut grid = TileGrid::filled(8, 8, TileKind::Grass);
        let pos = TilePos::new(1, 1);
        plant(&mut ledger, "apple_tree", pos);
        ledger.crops.get_mut(&pos).unwrap().stage = 150.0;

        for _ in 0..3 {
            ledger.crops.get_mut(&pos).unwrap().stage = 150.0;
            let (item, outcome) = harvest(&mut ledger, &reg, &mut grid, pos).unwrap();
            assert_eq!(item, "apple");
            assert_eq!(outcome, HarvestOutcome::Reset);
            assert!(ledger.crops.contains_key(&pos));
            assert_eq!(ledger.crops[&pos].stage, 80.0);
        }
    }

    #[test]
    fn test_harvest_immature_is_noop() {
        let reg = registry();
        let mut ledger = CropLedger::default();
        let mut grid = TileGrid::filled(8, 8, TileKind::Soil);
        let pos = TilePos::new(4, 4);
        plant(&mut ledger, "turnip", pos);
        ledger.crops.get_mut(&pos).unwrap().stage = 99.0;

        assert!(harvest(&mut ledger, &reg, &mut grid, pos).is_none());
        assert!(ledger.crops.contains_key(&pos));
    }

    #[test]
    fn test_withered_crop_stops_growing_and_wont_harvest() {
        let reg = registry();
        let mut ledger = CropLedger::default();
        let mut grid = TileGrid::filled(8, 8, TileKind::Soil);
        let pos = TilePos::new(6, 6);
        plant(&mut ledger, "turnip", pos);
        {
            let crop = ledger.crops.get_mut(&pos).unwrap();
            crop.stage = 150.0;
            crop.withered = true;
        }

        grow(&mut ledger, &reg);
        assert_eq!(ledger.crops[&pos].stage, 150.0);
        assert!(harvest(&mut ledger, &reg, &mut grid, pos).is_none());
    }
}
