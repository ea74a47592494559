//! Interaction dispatch — the single "do something here" entry point.
//!
//! Input collaborators send exactly two things: move intents and
//! [`InteractEvent`]s aimed at a tile. Everything else in the command
//! set — plant, harvest, hit a node, enter a building, ride a ladder —
//! is decided here by inspecting what's under the target tile, then
//! handed to the owning domain as its command event.

use bevy::prelude::*;

use crate::shared::*;

pub struct InteractionPlugin;

impl Plugin for InteractionPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            dispatch_interactions
                .in_set(SimSet::Actions)
                .run_if(in_state(GameState::Playing)),
        )
        .add_systems(
            Update,
            log_feedback.run_if(in_state(GameState::Playing)),
        );
    }
}

/// What an interaction at a tile resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Animal(TilePos),
    Harvest(TilePos),
    Plant(TilePos),
    HitNode(TilePos),
    Enter(BuildingKind),
    ChangeFloor(i32),
    Nothing,
}

/// Pure dispatch: inspect the target tile and decide the command.
/// Priority runs overlay-first — a crop on a tile beats the tile itself.
pub fn dispatch(
    map_key: MapKey,
    grid: &TileGrid,
    pos: TilePos,
    crops: &CropLedger,
    crop_defs: &CropRegistry,
    buildings: &BuildingLedger,
    selected_item: Option<&str>,
) -> Command {
    // Inside a barn or coop the stalls take priority.
    if matches!(map_key, MapKey::Interior(_)) {
        if grid.get(pos.x, pos.y) == TileKind::Soil {
            return Command::Animal(pos);
        }
    }

    // Crop overlay: mature or withered plants respond before terrain.
    if map_key == MapKey::Overworld {
        if let Some(crop) = crops.crops.get(&pos) {
            if crop.withered || crop.is_harvestable() {
                return Command::Harvest(pos);
            }
            return Command::Nothing; // still growing
        }
    }

    let tile = grid.get(pos.x, pos.y);

    if tile.node().is_some() {
        return Command::HitNode(pos);
    }

    match tile {
        TileKind::Soil => {
            let is_seed = selected_item
                .map(|id| crop_defs.by_seed(id).is_some())
                .unwrap_or(false);
            if map_key == MapKey::Overworld && is_seed {
                Command::Plant(pos)
            } else {
                Command::Nothing
            }
        }
        TileKind::Building => match buildings.building_at(pos.x, pos.y) {
            Some(building) => Command::Enter(building.kind),
            None => Command::Nothing, // town scenery
        },
        TileKind::LadderDown => {
            let floor = match map_key {
                MapKey::Dungeon(n) => n as i32 + 1,
                _ => 1,
            };
            Command::ChangeFloor(floor)
        }
        TileKind::LadderUp => match map_key {
            MapKey::Dungeon(n) => Command::ChangeFloor(n as i32 - 1),
            _ => Command::Nothing,
        },
        _ => Command::Nothing,
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

#[allow(clippy::too_many_arguments)]
fn dispatch_interactions(
    mut interact_reader: EventReader<InteractEvent>,
    registry: Res<MapRegistry>,
    crops: Res<CropLedger>,
    crop_defs: Res<CropRegistry>,
    buildings: Res<BuildingLedger>,
    player: Res<PlayerState>,
    mut animal_writer: EventWriter<AnimalInteractEvent>,
    mut harvest_writer: EventWriter<HarvestEvent>,
    mut plant_writer: EventWriter<PlantEvent>,
    mut hit_writer: EventWriter<HitResourceEvent>,
    mut enter_writer: EventWriter<EnterBuildingEvent>,
    mut floor_writer: EventWriter<ChangeFloorEvent>,
) {
    for event in interact_reader.read() {
        let Some(map) = registry.current_map() else {
            continue;
        };
        let pos = TilePos::new(event.x, event.y);
        let command = dispatch(
            registry.current,
            &map.grid,
            pos,
            &crops,
            &crop_defs,
            &buildings,
            player.selected_item.as_deref(),
        );

        match command {
            Command::Animal(pos) => {
                animal_writer.send(AnimalInteractEvent { pos });
            }
            Command::Harvest(pos) => {
                harvest_writer.send(HarvestEvent { pos });
            }
            Command::Plant(pos) => {
                plant_writer.send(PlantEvent { pos });
            }
            Command::HitNode(pos) => {
                hit_writer.send(HitResourceEvent { pos });
            }
            Command::Enter(kind) => {
                enter_writer.send(EnterBuildingEvent { kind });
            }
            Command::ChangeFloor(floor) => {
                floor_writer.send(ChangeFloorEvent { floor });
            }
            Command::Nothing => {}
        }
    }
}

/// Feedback lines go to the log here; a UI collaborator would render
/// them as toasts instead.
fn log_feedback(mut feedback_reader: EventReader<FeedbackEvent>) {
    for event in feedback_reader.read() {
        info!("[Feedback] {}", event.message);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════
