//! Movement domain — grid-step locomotion for player, NPCs, and creeps.
//!
//! The grid coordinate is authoritative and moves a whole tile at a
//! time; the visual position is cosmetic and converges on the grid cell
//! every frame. Directional input during a step is buffered latest-wins
//! and applied the moment the step completes. Click-to-move is greedy:
//! close the larger axis first, fall back to the other, give up the
//! destination when both are blocked. There is no obstacle search.

use bevy::prelude::*;
use rand::Rng;

use crate::shared::*;
use crate::world::is_solid;

pub struct MovementPlugin;

impl Plugin for MovementPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (read_move_intents, read_click_moves, follow_destination)
                .chain()
                .in_set(SimSet::Actions)
                .run_if(in_state(GameState::Playing)),
        )
        .add_systems(
            Update,
            (tick_player_visual, wander_map_movers)
                .in_set(SimSet::World)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CORE RULES
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResult {
    /// The grid position advanced; the visual is now catching up.
    Stepped,
    /// Mid-step: the intent was buffered (latest wins).
    Buffered,
    /// Destination solid or occupied. Facing still updated.
    Blocked,
}

/// One step attempt, without touching click-to-move state.
fn try_step(mover: &mut Mover, dx: i32, dy: i32, is_blocked: &impl Fn(i32, i32) -> bool) -> MoveResult {
    if let Some(facing) = Facing::from_delta(dx, dy) {
        mover.facing = facing;
    }
    if mover.mid_step {
        mover.buffered = Some((dx, dy));
        return MoveResult::Buffered;
    }
    let target = mover.grid.offset(dx, dy);
    if is_blocked(target.x, target.y) {
        return MoveResult::Blocked;
    }
    mover.grid = target;
    mover.mid_step = true;
    MoveResult::Stepped
}

/// Directional move intent. Cancels any click-to-move destination first.
pub fn attempt_move(
    mover: &mut Mover,
    dx: i32,
    dy: i32,
    is_blocked: &impl Fn(i32, i32) -> bool,
) -> MoveResult {
    mover.destination = None;
    try_step(mover, dx, dy, is_blocked)
}

/// One greedy pathfinding step toward the click destination. Larger axis
/// first, other axis as fallback, cancel when both fail or on arrival.
pub fn path_step(mover: &mut Mover, is_blocked: &impl Fn(i32, i32) -> bool) {
    if mover.mid_step {
        return;
    }
    let Some(dest) = mover.destination else {
        return;
    };

    let dx = dest.x - mover.grid.x;
    let dy = dest.y - mover.grid.y;
    if dx == 0 && dy == 0 {
        mover.destination = None;
        return;
    }

    let (primary, secondary) = if dx.abs() >= dy.abs() {
        ((dx.signum(), 0), (0, dy.signum()))
    } else {
        ((0, dy.signum()), (dx.signum(), 0))
    };

    if try_step(mover, primary.0, primary.1, is_blocked) == MoveResult::Stepped {
        return;
    }
    if secondary != (0, 0)
        && try_step(mover, secondary.0, secondary.1, is_blocked) == MoveResult::Stepped
    {
        return;
    }
    // No step possible; a smarter route is out of scope.
    mover.destination = None;
}

/// Advance the visual toward the grid cell. Returns true on the frame
/// the step completes (visual snapped, mid-step cleared).
pub fn tick_visual(mover: &mut Mover, multiplier: f32, dt: f32) -> bool {
    if !mover.mid_step {
        return false;
    }
    let target = Vec2::new(
        mover.grid.x as f32 * TILE_SIZE,
        mover.grid.y as f32 * TILE_SIZE,
    );
    let delta = target - mover.visual;
    let travel = mover.speed * multiplier * dt;
    if delta.length() <= travel {
        mover.visual = target;
        mover.mid_step = false;
        true
    } else {
        mover.visual += delta.normalize() * travel;
        false
    }
}

/// Another mover already standing on (x, y).
pub fn occupied(map: &MapInstance, x: i32, y: i32) -> bool {
    map.npcs
        .iter()
        .any(|n| n.mover.grid.x == x && n.mover.grid.y == y)
        || map
            .creeps
            .iter()
            .any(|c| c.mover.grid.x == x && c.mover.grid.y == y)
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

fn read_move_intents(
    mut intent_reader: EventReader<MoveIntentEvent>,
    registry: Res<MapRegistry>,
    crops: Res<CropLedger>,
    crop_defs: Res<CropRegistry>,
    mut player: ResMut<PlayerState>,
    mut edge_writer: EventWriter<EdgeExitEvent>,
    mut feedback_writer: EventWriter<FeedbackEvent>,
) {
    for event in intent_reader.read() {
        // An intent is a direction, not a distance: any magnitude is one step.
        let (dx, dy) = (event.dx.signum(), event.dy.signum());
        if dx == 0 && dy == 0 {
            continue;
        }
        let Some(map) = registry.current_map() else {
            continue;
        };
        let crop_layer = (registry.current == MapKey::Overworld).then_some((&*crops, &*crop_defs));
        let blocked =
            |x: i32, y: i32| is_solid(&map.grid, x, y, crop_layer) || occupied(map, x, y);

        let target = player.mover.grid.offset(dx, dy);
        if !map.grid.in_bounds(target.x, target.y) && !player.mover.mid_step {
            // Off the map: the router decides whether this edge leads on.
            if let Some(facing) = Facing::from_delta(dx, dy) {
                player.mover.facing = facing;
            }
            player.mover.destination = None;
            edge_writer.send(EdgeExitEvent { dx, dy });
            continue;
        }

        if attempt_move(&mut player.mover, dx, dy, &blocked) == MoveResult::Blocked {
            feedback_writer.send(FeedbackEvent {
                message: ActionError::BlockedMovement.message().to_string(),
            });
        }
    }
}

fn read_click_moves(mut click_reader: EventReader<ClickMoveEvent>, mut player: ResMut<PlayerState>) {
    for event in click_reader.read() {
        player.mover.destination = Some(event.target);
    }
}

fn follow_destination(
    registry: Res<MapRegistry>,
    crops: Res<CropLedger>,
    crop_defs: Res<CropRegistry>,
    mut player: ResMut<PlayerState>,
) {
    if player.mover.destination.is_none() {
        return;
    }
    let Some(map) = registry.current_map() else {
        return;
    };
    let crop_layer = (registry.current == MapKey::Overworld).then_some((&*crops, &*crop_defs));
    let blocked = |x: i32, y: i32| is_solid(&map.grid, x, y, crop_layer) || occupied(map, x, y);
    path_step(&mut player.mover, &blocked);
}

/// Interpolate the player's visual position; the buffered intent fires
/// the moment a step completes.
fn tick_player_visual(
    time: Res<Time>,
    registry: Res<MapRegistry>,
    crops: Res<CropLedger>,
    crop_defs: Res<CropRegistry>,
    mut player: ResMut<PlayerState>,
) {
    let multiplier = player.speed_buff.map(|b| b.multiplier).unwrap_or(1.0);
    let snapped = tick_visual(&mut player.mover, multiplier, time.delta_secs());
    if !snapped {
        return;
    }
    if let Some((dx, dy)) = player.mover.buffered.take() {
        let Some(map) = registry.current_map() else {
            return;
        };
        let crop_layer = (registry.current == MapKey::Overworld).then_some((&*crops, &*crop_defs));
        let blocked = |x: i32, y: i32| is_solid(&map.grid, x, y, crop_layer) || occupied(map, x, y);
        try_step(&mut player.mover, dx, dy, &blocked);
    }
}

/// NPCs and creeps on the current map drift one random step now and then.
fn wander_map_movers(
    time: Res<Time>,
    mut registry: ResMut<MapRegistry>,
    player: Res<PlayerState>,
) {
    let mut rng = rand::thread_rng();
    let player_pos = player.mover.grid;
    let Some(map) = registry.current_map_mut() else {
        return;
    };

    // Snapshot occupied tiles before handing out steps.
    let mut taken: Vec<TilePos> = map.npcs.iter().map(|n| n.mover.grid).collect();
    taken.extend(map.creeps.iter().map(|c| c.mover.grid));
    taken.push(player_pos);

    let grid = map.grid.clone();
    let dt = time.delta_secs();

    let mut wander_one = |mover: &mut Mover, chance: f64| {
        tick_visual(mover, 1.0, dt);
        if mover.mid_step || !rng.gen_bool(chance) {
            return;
        }
        let (dx, dy) = match rng.gen_range(0..4) {
            0 => (0, -1),
            1 => (0, 1),
            2 => (-1, 0),
            _ => (1, 0),
        };
        let blocked = |x: i32, y: i32| {
            is_solid(&grid, x, y, None) || taken.contains(&TilePos::new(x, y))
        };
        if try_step(mover, dx, dy, &blocked) == MoveResult::Stepped {
            taken.push(mover.grid);
        }
    };

    for npc in map.npcs.iter_mut() {
        wander_one(&mut npc.mover, 0.01);
    }
    for creep in map.creeps.iter_mut() {
        wander_one(&mut creep.mover, 0.03);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════
