//! Buildings domain — footprint placement and the building registry.
//!
//! A placement is all-or-nothing: every footprint tile must be plain
//! grass with nothing blocking on it, and the full gold + material cost
//! must be affordable before anything is deducted. Stamping the Building
//! tile code over the footprint is what keeps footprints from ever
//! overlapping — a second placement would find non-grass tiles.

use bevy::prelude::*;

use crate::shared::*;

pub struct BuildingsPlugin;

impl Plugin for BuildingsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (handle_place_building, handle_remove_building)
                .in_set(SimSet::Actions)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CORE RULES
// ═══════════════════════════════════════════════════════════════════════

/// Every footprint tile must be non-solid AND specifically grass. A tree
/// crop standing on grass blocks; soil, roads, and water all fail the
/// grass check outright.
pub fn can_place(
    grid: &TileGrid,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    crops: &CropLedger,
    crop_defs: &CropRegistry,
) -> bool {
    for dy in 0..height {
        for dx in 0..width {
            let (tx, ty) = (x + dx, y + dy);
            if grid.get(tx, ty) != TileKind::Grass {
                return false;
            }
            if let Some(crop) = crops.crops.get(&TilePos::new(tx, ty)) {
                match crop_defs.get(&crop.kind) {
                    Some(def) if def.blocks_movement() => return false,
                    _ => {}
                }
            }
        }
    }
    true
}

/// Validate, charge, stamp, record. Returns the new building's id.
pub fn place_building(
    ledger: &mut BuildingLedger,
    def: &BuildingDef,
    grid: &mut TileGrid,
    player: &mut PlayerState,
    inventory: &mut Inventory,
    crops: &CropLedger,
    crop_defs: &CropRegistry,
    x: i32,
    y: i32,
) -> Result<u32, ActionError> {
    if !can_place(grid, x, y, def.width, def.height, crops, crop_defs) {
        return Err(ActionError::InvalidPlacement);
    }

    // Affordability is checked in full before anything is deducted.
    if player.gold < def.gold_cost {
        return Err(ActionError::InsufficientResources);
    }
    for (item_id, quantity) in &def.material_costs {
        if !inventory.has(item_id, *quantity) {
            return Err(ActionError::InsufficientResources);
        }
    }

    player.gold -= def.gold_cost;
    for (item_id, quantity) in &def.material_costs {
        inventory.try_remove(item_id, *quantity);
    }

    grid.fill_rect(x, y, def.width, def.height, TileKind::Building);

    let id = ledger.next_id;
    ledger.next_id += 1;
    ledger.buildings.push(Building {
        id,
        kind: def.kind,
        x,
        y,
        width: def.width,
        height: def.height,
        animals: vec![],
        capacity: def.capacity,
        stored: 0,
    });
    Ok(id)
}

/// Remove the building covering (x, y), reverting its footprint to
/// grass. Returns the removed record, or `None` when no building covers
/// the tile or animals still live there.
pub fn remove_building(
    ledger: &mut BuildingLedger,
    grid: &mut TileGrid,
    x: i32,
    y: i32,
) -> Option<Building> {
    let idx = ledger
        .buildings
        .iter()
        .position(|b| b.contains(x, y) && b.animals.is_empty())?;
    let building = ledger.buildings.remove(idx);
    grid.fill_rect(
        building.x,
        building.y,
        building.width,
        building.height,
        TileKind::Grass,
    );
    Some(building)
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

fn handle_place_building(
    mut place_reader: EventReader<PlaceBuildingEvent>,
    mut ledger: ResMut<BuildingLedger>,
    mut registry: ResMut<MapRegistry>,
    catalog: Res<BuildingCatalog>,
    mut player: ResMut<PlayerState>,
    mut inventory: ResMut<Inventory>,
    crops: Res<CropLedger>,
    crop_defs: Res<CropRegistry>,
    mut feedback_writer: EventWriter<FeedbackEvent>,
    mut mutated_writer: EventWriter<WorldMutatedEvent>,
) {
    for event in place_reader.read() {
        let Some(def) = catalog.get(event.kind) else {
            continue;
        };
        let Some(map) = registry.current_map_mut() else {
            continue;
        };
        match place_building(
            &mut ledger,
            def,
            &mut map.grid,
            &mut player,
            &mut inventory,
            &crops,
            &crop_defs,
            event.x,
            event.y,
        ) {
            Ok(id) => {
                info!(
                    "[Buildings] Placed {:?} #{} at ({}, {})",
                    event.kind, id, event.x, event.y
                );
                feedback_writer.send(FeedbackEvent {
                    message: format!("{:?} built!", event.kind),
                });
                mutated_writer.send(WorldMutatedEvent);
            }
            Err(err) => {
                feedback_writer.send(FeedbackEvent {
                    message: err.message().to_string(),
                });
            }
        }
    }
}

fn handle_remove_building(
    mut remove_reader: EventReader<RemoveBuildingEvent>,
    mut ledger: ResMut<BuildingLedger>,
    mut registry: ResMut<MapRegistry>,
    mut feedback_writer: EventWriter<FeedbackEvent>,
    mut mutated_writer: EventWriter<WorldMutatedEvent>,
) {
    for event in remove_reader.read() {
        let occupied = ledger
            .building_at(event.x, event.y)
            .map(|b| !b.animals.is_empty())
            .unwrap_or(false);
        if occupied {
            feedback_writer.send(FeedbackEvent {
                message: "The animals still live there.".to_string(),
            });
            continue;
        }

        let Some(map) = registry.current_map_mut() else {
            continue;
        };
        if let Some(building) = remove_building(&mut ledger, &mut map.grid, event.x, event.y) {
            info!(
                "[Buildings] Removed {:?} #{} at ({}, {})",
                building.kind, building.id, building.x, building.y
            );
            mutated_writer.send(WorldMutatedEvent);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════
