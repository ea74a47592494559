//! Map generators for every area the router can serve.
//!
//! Generation is procedural-but-simple: fixed layouts with randomized
//! scatter for trees, rocks, ore, and creeps. A map is generated once per
//! session, the first time the player enters it.

use rand::Rng;

use crate::shared::*;

pub const OVERWORLD_W: usize = 40;
pub const OVERWORLD_H: usize = 30;

/// Column range left open on the overworld's north/south edges; North and
/// Town keep the same opening so edge transitions line up.
pub const ROAD_X0: i32 = 18;
pub const ROAD_X1: i32 = 21;

pub fn generate_map(key: MapKey) -> MapInstance {
    match key {
        MapKey::Overworld => generate_overworld(),
        MapKey::North => generate_north(),
        MapKey::Town => generate_town(),
        MapKey::Interior(kind) => generate_interior(kind),
        MapKey::Dungeon(floor) => generate_dungeon_floor(floor),
    }
}

// ---------------------------------------------------------------------------
// Overworld: 40x30. Field at center, pond bottom-right, cave entrance
// top-right, road openings north (to the forest) and south (to town).
// ---------------------------------------------------------------------------
fn generate_overworld() -> MapInstance {
    let mut rng = rand::thread_rng();
    let mut grid = TileGrid::filled(OVERWORLD_W, OVERWORLD_H, TileKind::Grass);
    let w = OVERWORLD_W as i32;
    let h = OVERWORLD_H as i32;

    // Tree line around the border, broken by the road openings.
    for x in 0..w {
        if !(ROAD_X0..=ROAD_X1).contains(&x) {
            grid.set(x, 0, TileKind::Tree);
            grid.set(x, h - 1, TileKind::Tree);
        }
    }
    for y in 0..h {
        grid.set(0, y, TileKind::Tree);
        grid.set(w - 1, y, TileKind::Tree);
    }

    // North-south road through the farm.
    grid.fill_rect(ROAD_X0, 0, ROAD_X1 - ROAD_X0 + 1, h, TileKind::Road);

    // The tillable field.
    grid.fill_rect(5, 8, 12, 10, TileKind::Soil);

    // Pond with a sand shore and a footbridge across it.
    grid.fill_rect(28, 21, 8, 6, TileKind::Sand);
    grid.fill_rect(29, 22, 6, 4, TileKind::Water);
    grid.fill_rect(32, 22, 1, 4, TileKind::Bridge);

    // Cave mouth into the dungeon.
    grid.set(35, 3, TileKind::LadderDown);
    grid.fill_rect(33, 2, 5, 1, TileKind::Rock);

    // Scattered trees and rocks on open grass.
    for _ in 0..24 {
        let x = rng.gen_range(1..w - 1);
        let y = rng.gen_range(1..h - 1);
        if grid.get(x, y) == TileKind::Grass {
            let kind = if rng.gen_bool(0.7) {
                TileKind::Tree
            } else {
                TileKind::Rock
            };
            grid.set(x, y, kind);
        }
    }

    MapInstance {
        grid,
        npcs: vec![],
        creeps: vec![],
        spawn: TilePos::new(16, 12),
    }
}

// ---------------------------------------------------------------------------
// North: 40x24 forest. Dense trees, a clearing, the south edge returns to
// the overworld through the same road columns.
// ---------------------------------------------------------------------------
fn generate_north() -> MapInstance {
    let mut rng = rand::thread_rng();
    let w = 40i32;
    let h = 24i32;
    let mut grid = TileGrid::filled(w as usize, h as usize, TileKind::Grass);

    for x in 0..w {
        grid.set(x, 0, TileKind::Tree);
        if !(ROAD_X0..=ROAD_X1).contains(&x) {
            grid.set(x, h - 1, TileKind::Tree);
        }
    }
    for y in 0..h {
        grid.set(0, y, TileKind::Tree);
        grid.set(w - 1, y, TileKind::Tree);
    }

    grid.fill_rect(ROAD_X0, h - 4, ROAD_X1 - ROAD_X0 + 1, 4, TileKind::Road);

    // Forest proper: heavy tree scatter with some rocks.
    for _ in 0..120 {
        let x = rng.gen_range(1..w - 1);
        let y = rng.gen_range(1..h - 5);
        if grid.get(x, y) == TileKind::Grass {
            let kind = if rng.gen_bool(0.8) {
                TileKind::Tree
            } else {
                TileKind::Rock
            };
            grid.set(x, y, kind);
        }
    }

    // Keep a walkable clearing at the center.
    grid.fill_rect(16, 8, 8, 6, TileKind::Grass);

    MapInstance {
        grid,
        npcs: vec![],
        creeps: vec![],
        spawn: TilePos::new(19, h - 2),
    }
}

// ---------------------------------------------------------------------------
// Town: 32x24. Road grid, building-block houses, a couple of residents.
// North edge returns to the overworld.
// ---------------------------------------------------------------------------
fn generate_town() -> MapInstance {
    let w = 32i32;
    let h = 24i32;
    let mut grid = TileGrid::filled(w as usize, h as usize, TileKind::Grass);

    for x in 0..w {
        if !(ROAD_X0 - 4..=ROAD_X1 - 4).contains(&x) {
            grid.set(x, 0, TileKind::Tree);
        }
        grid.set(x, h - 1, TileKind::Tree);
    }
    for y in 0..h {
        grid.set(0, y, TileKind::Tree);
        grid.set(w - 1, y, TileKind::Tree);
    }

    // Main street down from the north entrance, plus a cross street.
    grid.fill_rect(ROAD_X0 - 4, 0, 4, h, TileKind::Road);
    grid.fill_rect(2, 10, w - 4, 3, TileKind::Road);

    // Houses and shopfronts.
    grid.fill_rect(4, 4, 5, 4, TileKind::Building);
    grid.fill_rect(22, 4, 6, 4, TileKind::Building);
    grid.fill_rect(5, 15, 6, 5, TileKind::Building);
    grid.fill_rect(21, 15, 5, 4, TileKind::Building);

    // Town square.
    grid.fill_rect(12, 14, 6, 5, TileKind::WoodFloor);

    let npcs = vec![
        Npc {
            name: "Marta".to_string(),
            mover: Mover::at(TilePos::new(14, 13)),
        },
        Npc {
            name: "Edwin".to_string(),
            mover: Mover::at(TilePos::new(10, 11)),
        },
        Npc {
            name: "Petra".to_string(),
            mover: Mover::at(TilePos::new(20, 12)),
        },
    ];

    MapInstance {
        grid,
        npcs,
        creeps: vec![],
        spawn: TilePos::new(16, 1),
    }
}

// ---------------------------------------------------------------------------
// Interiors: 12x10 room, wood floor, wall border with a door gap on the
// south edge. Leaving through the gap returns to the overworld.
// ---------------------------------------------------------------------------
fn generate_interior(kind: BuildingKind) -> MapInstance {
    let w = 12i32;
    let h = 10i32;
    let mut grid = TileGrid::filled(w as usize, h as usize, TileKind::WoodFloor);

    for x in 0..w {
        grid.set(x, 0, TileKind::Wall);
        if x != w / 2 {
            grid.set(x, h - 1, TileKind::Wall);
        }
    }
    for y in 0..h {
        grid.set(0, y, TileKind::Wall);
        grid.set(w - 1, y, TileKind::Wall);
    }

    // Barns and coops keep a feeding trough row along the north wall.
    if matches!(kind, BuildingKind::Barn | BuildingKind::Coop) {
        grid.fill_rect(STALL_X0, STALL_ROW, w - 4, 1, TileKind::Soil);
    }

    MapInstance {
        grid,
        npcs: vec![],
        creeps: vec![],
        spawn: TilePos::new(w / 2, h - 2),
    }
}

// ---------------------------------------------------------------------------
// Dungeon floors: 24x24 cavern. Rock/ore density and creep count scale
// with depth. Every floor above the bottom has a ladder further down.
// ---------------------------------------------------------------------------
fn generate_dungeon_floor(floor: u8) -> MapInstance {
    let mut rng = rand::thread_rng();
    let w = 24i32;
    let h = 24i32;
    let mut grid = TileGrid::filled(w as usize, h as usize, TileKind::DungeonFloor);

    for x in 0..w {
        grid.set(x, 0, TileKind::Wall);
        grid.set(x, h - 1, TileKind::Wall);
    }
    for y in 0..h {
        grid.set(0, y, TileKind::Wall);
        grid.set(w - 1, y, TileKind::Wall);
    }

    let spawn = TilePos::new(2, 2);
    grid.set(spawn.x, spawn.y, TileKind::LadderUp);

    // Rocks everywhere, ore veins increasingly common with depth.
    let ore_chance = 0.15 + 0.01 * floor as f64;
    let rock_count = 30 + 2 * floor as i32;
    for _ in 0..rock_count {
        let x = rng.gen_range(1..w - 1);
        let y = rng.gen_range(1..h - 1);
        if grid.get(x, y) == TileKind::DungeonFloor {
            let kind = if rng.gen_bool(ore_chance.min(0.6)) {
                TileKind::OreVein
            } else {
                TileKind::Rock
            };
            grid.set(x, y, kind);
        }
    }

    if floor < MAX_DUNGEON_FLOOR {
        // Place the down-ladder on an open tile away from the spawn.
        loop {
            let x = rng.gen_range(w / 2..w - 1);
            let y = rng.gen_range(h / 2..h - 1);
            if grid.get(x, y) == TileKind::DungeonFloor {
                grid.set(x, y, TileKind::LadderDown);
                break;
            }
        }
    }

    let creep_count = 2 + (floor as usize) / 3;
    let mut creeps = Vec::with_capacity(creep_count);
    for _ in 0..creep_count {
        let x = rng.gen_range(4..w - 2);
        let y = rng.gen_range(4..h - 2);
        if grid.get(x, y) != TileKind::DungeonFloor {
            continue;
        }
        let kind = if rng.gen_bool(0.6) {
            CreepKind::Slime
        } else {
            CreepKind::Bat
        };
        creeps.push(Creep {
            kind,
            mover: Mover::at(TilePos::new(x, y)),
            health: 3 + floor as u32 / 5,
        });
    }

    MapInstance {
        grid,
        npcs: vec![],
        creeps,
        spawn,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overworld_spawn_is_walkable() {
        let map = generate_overworld();
        let s = map.spawn;
        assert!(!map.grid.get(s.x, s.y).is_solid_terrain());
    }

    #[test]
    fn test_overworld_road_openings_line_up_with_north() {
        let over = generate_overworld();
        let north = generate_north();
        for x in ROAD_X0..=ROAD_X1 {
            assert!(!over.grid.get(x, 0).is_solid_terrain());
            assert!(!north.grid.get(x, north.grid.height as i32 - 1).is_solid_terrain());
        }
    }

    #[test]
    fn test_town_has_residents() {
        let town = generate_town();
        assert!(!town.npcs.is_empty());
        for npc in &town.npcs {
            let p = npc.mover.grid;
            assert!(!town.grid.get(p.x, p.y).is_solid_terrain());
        }
    }

    #[test]
    fn test_interior_door_gap_on_south_edge() {
        let interior = generate_interior(BuildingKind::House);
        let h = interior.grid.height as i32;
        let w = interior.grid.width as i32;
        assert_eq!(interior.grid.get(w / 2, h - 1), TileKind::WoodFloor);
        assert_eq!(interior.grid.get(0, h - 1), TileKind::Wall);
    }

    #[test]
    fn test_coop_stalls_sit_on_trough_tiles() {
        let interior = generate_interior(BuildingKind::Coop);
        // Four stalls fill left to right from the first trough tile.
        for i in 0..4 {
            assert_eq!(
                interior.grid.get(STALL_X0 + i, STALL_ROW),
                TileKind::Soil,
                "stall {} is not a trough tile",
                i
            );
        }
    }

    #[test]
    fn test_pond_bridge_crosses_the_water() {
        let over = generate_overworld();
        for y in 22..26 {
            assert_eq!(over.grid.get(32, y), TileKind::Bridge);
            assert!(!over.grid.get(32, y).is_solid_terrain());
        }
        // Water on both sides of the crossing.
        assert_eq!(over.grid.get(31, 23), TileKind::Water);
        assert_eq!(over.grid.get(33, 23), TileKind::Water);
    }

    #[test]
    fn test_dungeon_floor_has_ladders_and_creeps() {
        let floor = generate_dungeon_floor(5);
        assert_eq!(floor.grid.get(2, 2), TileKind::LadderUp);
        assert!(floor
            .grid
            .tiles
            .iter()
            .any(|t| *t == TileKind::LadderDown));
        assert!(!floor.creeps.is_empty());
    }

    #[test]
    fn test_bottom_dungeon_floor_has_no_down_ladder() {
        let floor = generate_dungeon_floor(MAX_DUNGEON_FLOOR);
        assert!(!floor
            .grid
            .tiles
            .iter()
            .any(|t| *t == TileKind::LadderDown));
    }
}
