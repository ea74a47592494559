//! Map transition router.
//!
//! Maps are generated lazily: the first request for a key builds the
//! instance and caches it in the [`MapRegistry`] for the rest of the
//! session. Asking for a map nobody has visited yet is the normal case,
//! not an error.
//!
//! Three transition styles route through here:
//! - edge exits (walking past a map boundary that has a neighbor)
//! - building doors (overworld building -> its interior)
//! - dungeon ladders (absolute floor number; 0 climbs out)

use bevy::prelude::*;

use crate::shared::*;
use crate::world::maps::{self, ROAD_X0, ROAD_X1};

/// Town's north opening sits four columns left of the overworld road.
const TOWN_ROAD_SHIFT: i32 = 4;

/// Look up a map, generating and caching it on first access.
pub fn get_or_generate(registry: &mut MapRegistry, key: MapKey) -> &MapInstance {
    if let Some(idx) = registry.maps.iter().position(|(k, _)| *k == key) {
        return &registry.maps[idx].1;
    }
    info!("[Router] Generating map {:?}", key);
    registry.maps.push((key, maps::generate_map(key)));
    &registry.maps[registry.maps.len() - 1].1
}

/// Switch the current map and drop the player at `pos`.
fn arrive(
    registry: &mut MapRegistry,
    player: &mut PlayerState,
    key: MapKey,
    pos: TilePos,
    map_writer: &mut EventWriter<MapChangedEvent>,
) {
    registry.current = key;
    player.mover.warp(pos);
    info!("[Router] Entered {:?} at ({}, {})", key, pos.x, pos.y);
    map_writer.send(MapChangedEvent { key });
}

/// Dungeon floor change with bounds policy: zero or below exits to the
/// remembered overworld position; beyond the deepest floor is rejected
/// with no state change.
pub fn change_floor(
    registry: &mut MapRegistry,
    player: &mut PlayerState,
    floor: i32,
) -> Result<MapKey, ActionError> {
    if floor > MAX_DUNGEON_FLOOR as i32 {
        return Err(ActionError::FloorOutOfRange);
    }

    if floor <= 0 {
        get_or_generate(registry, MapKey::Overworld);
        registry.current = MapKey::Overworld;
        player.mover.warp(registry.last_overworld_pos);
        return Ok(MapKey::Overworld);
    }

    // Descending from the surface remembers where we left.
    if !matches!(registry.current, MapKey::Dungeon(_)) {
        registry.last_overworld_pos = player.mover.grid;
    }

    let key = MapKey::Dungeon(floor as u8);
    let spawn = get_or_generate(registry, key).spawn;
    registry.current = key;
    player.mover.warp(spawn);
    Ok(key)
}

// ─── Systems ─────────────────────────────────────────────────────────────────

/// Fresh sessions start on the overworld; loaded sessions already carry a
/// current map in the registry.
pub fn ensure_initial_map(
    mut registry: ResMut<MapRegistry>,
    mut map_writer: EventWriter<MapChangedEvent>,
) {
    if !registry.contains(registry.current) {
        let key = registry.current;
        get_or_generate(&mut registry, key);
        map_writer.send(MapChangedEvent { key });
    }
}

pub fn handle_edge_exit(
    mut edge_reader: EventReader<EdgeExitEvent>,
    mut registry: ResMut<MapRegistry>,
    mut player: ResMut<PlayerState>,
    mut map_writer: EventWriter<MapChangedEvent>,
) {
    for event in edge_reader.read() {
        let pos = player.mover.grid;
        let (target, arrive_at) = match (registry.current, event.dx, event.dy) {
            // Overworld <-> North share the road columns directly.
            (MapKey::Overworld, 0, -1) if (ROAD_X0..=ROAD_X1).contains(&pos.x) => {
                let north = get_or_generate(&mut registry, MapKey::North);
                let y = north.grid.height as i32 - 1;
                (MapKey::North, TilePos::new(pos.x, y))
            }
            (MapKey::North, 0, 1) if (ROAD_X0..=ROAD_X1).contains(&pos.x) => {
                get_or_generate(&mut registry, MapKey::Overworld);
                (MapKey::Overworld, TilePos::new(pos.x, 0))
            }
            // Overworld <-> Town: the town road is shifted left.
            (MapKey::Overworld, 0, 1) if (ROAD_X0..=ROAD_X1).contains(&pos.x) => {
                get_or_generate(&mut registry, MapKey::Town);
                (MapKey::Town, TilePos::new(pos.x - TOWN_ROAD_SHIFT, 0))
            }
            (MapKey::Town, 0, -1)
                if (ROAD_X0 - TOWN_ROAD_SHIFT..=ROAD_X1 - TOWN_ROAD_SHIFT).contains(&pos.x) =>
            {
                let over = get_or_generate(&mut registry, MapKey::Overworld);
                let y = over.grid.height as i32 - 1;
                (MapKey::Overworld, TilePos::new(pos.x + TOWN_ROAD_SHIFT, y))
            }
            // Interior doors open south, back to wherever we entered from.
            (MapKey::Interior(_), 0, 1) => {
                get_or_generate(&mut registry, MapKey::Overworld);
                (MapKey::Overworld, registry.last_overworld_pos)
            }
            // Every other edge is just the end of the world.
            _ => continue,
        };

        if registry.current == MapKey::Overworld {
            registry.last_overworld_pos = pos;
        }
        arrive(&mut registry, &mut player, target, arrive_at, &mut map_writer);
    }
}

pub fn handle_enter_building(
    mut enter_reader: EventReader<EnterBuildingEvent>,
    mut registry: ResMut<MapRegistry>,
    mut player: ResMut<PlayerState>,
    mut map_writer: EventWriter<MapChangedEvent>,
) {
    for event in enter_reader.read() {
        if registry.current == MapKey::Overworld {
            registry.last_overworld_pos = player.mover.grid;
        }
        let key = MapKey::Interior(event.kind);
        let spawn = get_or_generate(&mut registry, key).spawn;
        arrive(&mut registry, &mut player, key, spawn, &mut map_writer);
    }
}

pub fn handle_change_floor(
    mut floor_reader: EventReader<ChangeFloorEvent>,
    mut registry: ResMut<MapRegistry>,
    mut player: ResMut<PlayerState>,
    mut map_writer: EventWriter<MapChangedEvent>,
    mut feedback_writer: EventWriter<FeedbackEvent>,
) {
    for event in floor_reader.read() {
        match change_floor(&mut registry, &mut player, event.floor) {
            Ok(key) => {
                map_writer.send(MapChangedEvent { key });
            }
            Err(err) => {
                warn!("[Router] Floor change to {} rejected", event.floor);
                feedback_writer.send(FeedbackEvent {
                    message: err.message().to_string(),
                });
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_generate_caches_per_session() {
        let mut registry = MapRegistry::default();
        assert!(!registry.contains(MapKey::Town));

        get_or_generate(&mut registry, MapKey::Town);
        assert!(registry.contains(MapKey::Town));

        // Mutate the cached grid, then re-request: the edit must survive.
        registry
            .get_mut(MapKey::Town)
            .unwrap()
            .grid
            .set(5, 5, TileKind::Soil);
        let again = get_or_generate(&mut registry, MapKey::Town);
        assert_eq!(again.grid.get(5, 5), TileKind::Soil);
    }

    #[test]
    fn test_change_floor_descends_and_remembers_surface() {
        let mut registry = MapRegistry::default();
        let mut player = PlayerState::default();
        get_or_generate(&mut registry, MapKey::Overworld);
        player.mover.warp(TilePos::new(35, 4));

        let key = change_floor(&mut registry, &mut player, 1).unwrap();
        assert_eq!(key, MapKey::Dungeon(1));
        assert_eq!(registry.current, MapKey::Dungeon(1));
        assert_eq!(registry.last_overworld_pos, TilePos::new(35, 4));

        // Climbing out restores the pre-entry position.
        let key = change_floor(&mut registry, &mut player, 0).unwrap();
        assert_eq!(key, MapKey::Overworld);
        assert_eq!(player.mover.grid, TilePos::new(35, 4));
    }

    #[test]
    fn test_change_floor_beyond_bottom_is_rejected() {
        let mut registry = MapRegistry::default();
        let mut player = PlayerState::default();
        get_or_generate(&mut registry, MapKey::Overworld);
        change_floor(&mut registry, &mut player, 3).unwrap();
        let pos_before = player.mover.grid;

        let err = change_floor(&mut registry, &mut player, MAX_DUNGEON_FLOOR as i32 + 1);
        assert_eq!(err, Err(ActionError::FloorOutOfRange));
        assert_eq!(registry.current, MapKey::Dungeon(3));
        assert_eq!(player.mover.grid, pos_before);
        assert!(!registry.contains(MapKey::Dungeon(MAX_DUNGEON_FLOOR + 1)));
    }

    #[test]
    fn test_deeper_floor_keeps_shallow_floor_cached() {
        let mut registry = MapRegistry::default();
        let mut player = PlayerState::default();
        get_or_generate(&mut registry, MapKey::Overworld);

        change_floor(&mut registry, &mut player, 1).unwrap();
        change_floor(&mut registry, &mut player, 2).unwrap();
        assert!(registry.contains(MapKey::Dungeon(1)));
        assert!(registry.contains(MapKey::Dungeon(2)));
    }
}
