//! Gathering domain — chopping, mining, and the durability ledger.
//!
//! Node durability is tracked sparsely: an absent ledger entry means the
//! node is untouched. The first hit materializes the entry at full
//! toughness minus one; the depleting hit removes the entry, grants the
//! loot table in full, and reverts the tile. A swing is a single atomic
//! decrement — there are no partial yields.

use bevy::prelude::*;

use crate::shared::*;

pub struct GatheringPlugin;

impl Plugin for GatheringPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            handle_hit_resource
                .in_set(SimSet::Actions)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CORE RULE
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub enum HitOutcome {
    /// The node survives with this many hits left.
    Weakened { remaining: u32 },
    /// The node is gone; the full loot table is granted exactly once.
    Depleted { loot: Vec<(ItemId, u8)> },
}

/// One swing at the node on `pos`. Energy is charged up front; an
/// unaffordable swing aborts before any state changes.
pub fn hit_resource(
    ledger: &mut ResourceLedger,
    def: &NodeDef,
    clock: &mut TimeCycle,
    grid: &mut TileGrid,
    map: MapKey,
    pos: TilePos,
) -> Result<HitOutcome, ActionError> {
    if !clock.consume_energy(def.energy_cost) {
        return Err(ActionError::InsufficientEnergy);
    }

    let current = ledger.get(map, pos).unwrap_or(def.toughness);
    let remaining = current.saturating_sub(1);

    if remaining == 0 {
        ledger.remove(map, pos);
        grid.set(pos.x, pos.y, TileKind::Grass);
        Ok(HitOutcome::Depleted {
            loot: def.loot.clone(),
        })
    } else {
        ledger.set(map, pos, remaining);
        Ok(HitOutcome::Weakened { remaining })
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEM
// ═══════════════════════════════════════════════════════════════════════

fn handle_hit_resource(
    mut hit_reader: EventReader<HitResourceEvent>,
    mut ledger: ResMut<ResourceLedger>,
    mut registry: ResMut<MapRegistry>,
    nodes: Res<NodeRegistry>,
    mut clock: ResMut<TimeCycle>,
    mut inventory: ResMut<Inventory>,
    mut gained_writer: EventWriter<ItemGainedEvent>,
    mut feedback_writer: EventWriter<FeedbackEvent>,
    mut mutated_writer: EventWriter<WorldMutatedEvent>,
) {
    for event in hit_reader.read() {
        let map_key = registry.current;
        let Some(map) = registry.current_map_mut() else {
            continue;
        };
        let Some(node_kind) = map.grid.get(event.pos.x, event.pos.y).node() else {
            continue;
        };
        let Some(def) = nodes.get(node_kind) else {
            continue;
        };

        match hit_resource(&mut ledger, def, &mut clock, &mut map.grid, map_key, event.pos) {
            Ok(HitOutcome::Depleted { loot }) => {
                info!(
                    "[Gathering] {:?} at ({}, {}) depleted",
                    node_kind, event.pos.x, event.pos.y
                );
                for (item_id, quantity) in loot {
                    inventory.try_add(&item_id, quantity);
                    gained_writer.send(ItemGainedEvent { item_id, quantity });
                }
                mutated_writer.send(WorldMutatedEvent);
            }
            Ok(HitOutcome::Weakened { remaining }) => {
                info!(
                    "[Gathering] Hit {:?} at ({}, {}) — {} left",
                    node_kind, event.pos.x, event.pos.y, remaining
                );
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

// ═══════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn rock_def() -> NodeDef {
        NodeDef {
            kind: NodeKind::Rock,
            toughness: 3,
            energy_cost: 4.0,
            loot: vec![("stone".to_string(), 2)],
        }
    }

    #[test]
    fn test_three_hits_deplete_a_toughness_three_rock() {
        let def = rock_def();
        let mut ledger = ResourceLedger::default();
        let mut clock = TimeCycle::default();
        let mut grid = TileGrid::filled(8, 8, TileKind::Grass);
        grid.set(4, 4, TileKind::Rock);
        let pos = TilePos::new(4, 4);

        let first = hit_resource(&mut ledger, &def, &mut clock, &mut grid, MapKey::Overworld, pos);
        assert_eq!(first, Ok(HitOutcome::Weakened { remaining: 2 }));
        assert_eq!(ledger.get(MapKey::Overworld, pos), Some(2));

        let second = hit_resource(&mut ledger, &def, &mut clock, &mut grid, MapKey::Overworld, pos);
        assert_eq!(second, Ok(HitOutcome::Weakened { remaining: 1 }));

        let third = hit_resource(&mut ledger, &def, &mut clock, &mut grid, MapKey::Overworld, pos);
        assert_eq!(
            third,
            Ok(HitOutcome::Depleted {
                loot: vec![("stone".to_string(), 2)]
            })
        );
        // Entry gone, tile reverted, energy charged for all three swings.
        assert_eq!(ledger.get(MapKey::Overworld, pos), None);
        assert_eq!(grid.get(4, 4), TileKind::Grass);
        assert_eq!(clock.energy, MAX_ENERGY - 12.0);
    }

    #[test]
    fn test_insufficient_energy_aborts_before_any_mutation() {
        let def = rock_def();
        let mut ledger = ResourceLedger::default();
        let mut clock = TimeCycle::default();
        clock.energy = 3.0; // one swing costs 4
        let mut grid = TileGrid::filled(8, 8, TileKind::Grass);
        grid.set(2, 2, TileKind::Rock);
        let pos = TilePos::new(2, 2);

        let result = hit_resource(&mut ledger, &def, &mut clock, &mut grid, MapKey::Overworld, pos);
        assert_eq!(result, Err(ActionError::InsufficientEnergy));
        assert_eq!(ledger.get(MapKey::Overworld, pos), None);
        assert_eq!(grid.get(2, 2), TileKind::Rock);
        assert_eq!(clock.energy, 3.0);
    }

    #[test]
    fn test_partial_damage_persists_per_map() {
        let def = rock_def();
        let mut ledger = ResourceLedger::default();
        let mut clock = TimeCycle::default();
        let mut grid = TileGrid::filled(8, 8, TileKind::Rock);
        let pos = TilePos::new(1, 1);

        hit_resource(&mut ledger, &def, &mut clock, &mut grid, MapKey::Dungeon(2), pos).unwrap();
        assert_eq!(ledger.get(MapKey::Dungeon(2), pos), Some(2));
        // The same coordinates on another floor are untouched.
        assert_eq!(ledger.get(MapKey::Dungeon(3), pos), None);
    }
}
