//! Animals domain — the herd, feeding, and daily produce.
//!
//! The day-end reset reads each animal's fed flag *before* clearing it:
//! an animal that went unfed loses friendship and gains hunger, a fed
//! one warms up and digests. Produce for the new day is decided in the
//! same pass, from the just-ended day's feeding.

use bevy::prelude::*;

use crate::shared::*;

/// Friendship gained per fed day / lost per hungry day.
const FRIENDSHIP_GAIN: i32 = 5;
const FRIENDSHIP_LOSS: i32 = 10;
const FRIENDSHIP_MAX: i32 = 100;

/// Minimum friendship before an animal starts producing.
const PRODUCE_FRIENDSHIP: i32 = 20;

const FEED_ITEM: &str = "hay";
const FEED_ENERGY_COST: f32 = 2.0;

pub struct AnimalsPlugin;

impl Plugin for AnimalsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            on_new_day
                .in_set(SimSet::World)
                .run_if(in_state(GameState::Playing)),
        )
        .add_systems(
            Update,
            (handle_animal_interact, handle_buy_animal)
                .in_set(SimSet::Actions)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CORE RULES
// ═══════════════════════════════════════════════════════════════════════

/// Apply the day-end reset to one animal. The fed flag is evaluated
/// first, then cleared; produce for the new day comes from the same
/// pre-reset reading.
pub fn daily_reset(animal: &mut Animal) {
    let fed = animal.was_fed_today;

    if fed {
        animal.friendship = (animal.friendship + FRIENDSHIP_GAIN).min(FRIENDSHIP_MAX);
        animal.hunger = 0;
    } else {
        animal.friendship -= FRIENDSHIP_LOSS;
        animal.hunger = animal.hunger.saturating_add(1);
    }

    animal.was_fed_today = false;
    animal.produced_today = fed && animal.friendship >= PRODUCE_FRIENDSHIP;
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

fn on_new_day(mut day_reader: EventReader<NewDayEvent>, mut herd: ResMut<Herd>) {
    for event in day_reader.read() {
        for animal in herd.animals.iter_mut() {
            daily_reset(animal);
        }
        let producing = herd.animals.iter().filter(|a| a.produced_today).count();
        info!(
            "[Animals] Day {} reset: {} animals, {} producing",
            event.day_count,
            herd.animals.len(),
            producing
        );
    }
}

/// Stall interaction: collect today's produce if there is any, otherwise
/// offer feed. Both route through the usual energy and inventory gates.
fn handle_animal_interact(
    mut interact_reader: EventReader<AnimalInteractEvent>,
    registry: Res<MapRegistry>,
    mut herd: ResMut<Herd>,
    mut inventory: ResMut<Inventory>,
    mut clock: ResMut<TimeCycle>,
    mut gained_writer: EventWriter<ItemGainedEvent>,
    mut feedback_writer: EventWriter<FeedbackEvent>,
    mut mutated_writer: EventWriter<WorldMutatedEvent>,
) {
    for event in interact_reader.read() {
        let MapKey::Interior(building) = registry.current else {
            continue;
        };
        let Some(animal) = herd
            .animals
            .iter_mut()
            .find(|a| a.home == event.pos && a.kind.home_building() == building)
        else {
            continue;
        };

        if animal.produced_today {
            animal.produced_today = false;
            let product = animal.kind.product().to_string();
            inventory.try_add(&product, 1);
            info!("[Animals] Collected {} from {}", product, animal.name);
            gained_writer.send(ItemGainedEvent {
                item_id: product,
                quantity: 1,
            });
            mutated_writer.send(WorldMutatedEvent);
            continue;
        }

        if animal.was_fed_today {
            feedback_writer.send(FeedbackEvent {
                message: format!("{} is content.", animal.name),
            });
            continue;
        }

        if !inventory.has(FEED_ITEM, 1) {
            feedback_writer.send(FeedbackEvent {
                message: ActionError::InsufficientResources.message().to_string(),
            });
            continue;
        }
        if !clock.consume_energy(FEED_ENERGY_COST) {
            feedback_writer.send(FeedbackEvent {
                message: ActionError::InsufficientEnergy.message().to_string(),
            });
            continue;
        }

        inventory.try_remove(FEED_ITEM, 1);
        animal.was_fed_today = true;
        info!("[Animals] Fed {}", animal.name);
        feedback_writer.send(FeedbackEvent {
            message: format!("{} munches happily.", animal.name),
        });
        mutated_writer.send(WorldMutatedEvent);
    }
}

/// A new animal needs a home building with a free stall and the asking
/// price in gold. The stall tile doubles as the animal's interaction
/// spot inside the interior.
fn handle_buy_animal(
    mut buy_reader: EventReader<BuyAnimalEvent>,
    mut herd: ResMut<Herd>,
    mut buildings: ResMut<BuildingLedger>,
    mut player: ResMut<PlayerState>,
    mut feedback_writer: EventWriter<FeedbackEvent>,
    mut mutated_writer: EventWriter<WorldMutatedEvent>,
) {
    for event in buy_reader.read() {
        let cost = purchase_cost(event.kind);
        let home_kind = event.kind.home_building();

        let Some(building) = buildings
            .buildings
            .iter_mut()
            .find(|b| b.kind == home_kind && (b.animals.len() as u32) < b.capacity)
        else {
            feedback_writer.send(FeedbackEvent {
                message: "No room in the barn or coop.".to_string(),
            });
            continue;
        };
        if player.gold < cost {
            feedback_writer.send(FeedbackEvent {
                message: ActionError::InsufficientResources.message().to_string(),
            });
            continue;
        }

        player.gold -= cost;
        let id = herd.next_id;
        herd.next_id += 1;
        building.animals.push(id);

        // Stalls line up along the trough row of the interior.
        let stall = TilePos::new(STALL_X0 + building.animals.len() as i32 - 1, STALL_ROW);
        let name = format!("{:?} {}", event.kind, id);
        herd.animals.push(Animal {
            id,
            kind: event.kind,
            name: name.clone(),
            home: stall,
            friendship: 10,
            hunger: 0,
            was_fed_today: false,
            produced_today: false,
        });
        info!("[Animals] Bought {} for {}g", name, cost);
        mutated_writer.send(WorldMutatedEvent);
    }
}

pub fn purchase_cost(kind: AnimalKind) -> u32 {
    match kind {
        AnimalKind::Chicken => 800,
        AnimalKind::Cow => 1500,
        AnimalKind::Sheep => 1200,
    }
}

// ═══════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn chicken() -> Animal {
        Animal {
            id: 1,
            kind: AnimalKind::Chicken,
            name: "Hen".into(),
            home: TilePos::new(STALL_X0, STALL_ROW),
            friendship: 30,
            hunger: 0,
            was_fed_today: false,
            produced_today: false,
        }
    }

    #[test]
    fn test_unfed_animal_decays_before_flag_clears() {
        let mut animal = chicken();
        animal.was_fed_today = false;

        daily_reset(&mut animal);

        // The pre-reset flag drove the outcome: decay, not gain.
        assert_eq!(animal.friendship, 30 - FRIENDSHIP_LOSS);
        assert_eq!(animal.hunger, 1);
        assert!(!animal.was_fed_today);
        assert!(!animal.produced_today);
    }

    #[test]
    fn test_fed_animal_gains_and_produces() {
        let mut animal = chicken();
        animal.was_fed_today = true;

        daily_reset(&mut animal);

        assert_eq!(animal.friendship, 30 + FRIENDSHIP_GAIN);
        assert_eq!(animal.hunger, 0);
        assert!(!animal.was_fed_today);
        assert!(animal.produced_today);
    }

    #[test]
    fn test_fed_but_unfriendly_animal_does_not_produce() {
        let mut animal = chicken();
        animal.friendship = 5;
        animal.was_fed_today = true;

        daily_reset(&mut animal);

        assert_eq!(animal.friendship, 10);
        assert!(!animal.produced_today);
    }

    #[test]
    fn test_friendship_caps() {
        let mut animal = chicken();
        animal.friendship = FRIENDSHIP_MAX - 1;
        animal.was_fed_today = true;
        daily_reset(&mut animal);
        assert_eq!(animal.friendship, FRIENDSHIP_MAX);
    }

    #[test]
    fn test_hunger_saturates() {
        let mut animal = chicken();
        animal.hunger = u8::MAX;
        daily_reset(&mut animal);
        assert_eq!(animal.hunger, u8::MAX);
    }

    #[test]
    fn test_products_match_kind() {
        assert_eq!(AnimalKind::Chicken.product(), "egg");
        assert_eq!(AnimalKind::Cow.product(), "milk");
        assert_eq!(AnimalKind::Sheep.product(), "wool");
    }
}
