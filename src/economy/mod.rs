//! Economy domain — the shop counter, cooking, and food.
//!
//! Buying, selling, and cooking all follow the same contract as every
//! other mutation: validate the whole transaction first, then apply it,
//! or fail with no partial deduction.

use bevy::prelude::*;

use crate::shared::*;

pub struct EconomyPlugin;

impl Plugin for EconomyPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (handle_buy, handle_sell, handle_cook, handle_eat)
                .in_set(SimSet::Actions)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CORE RULES
// ═══════════════════════════════════════════════════════════════════════

/// Buy `quantity` of an item the shop carries. The full price must be
/// affordable and the whole quantity must fit the inventory.
pub fn buy(
    player: &mut PlayerState,
    inventory: &mut Inventory,
    items: &ItemRegistry,
    stock: &ShopStock,
    item_id: &str,
    quantity: u8,
) -> Result<(), ActionError> {
    if !stock.carries(item_id) {
        return Err(ActionError::InsufficientResources);
    }
    let Some(def) = items.get(item_id) else {
        return Err(ActionError::InsufficientResources);
    };
    let total = def.buy_price * quantity as u32;
    if player.gold < total {
        return Err(ActionError::InsufficientResources);
    }

    let overflow = inventory.try_add(item_id, quantity);
    if overflow > 0 {
        // Undo: a purchase never half-fits.
        inventory.try_remove(item_id, quantity - overflow);
        return Err(ActionError::InsufficientResources);
    }
    player.gold -= total;
    Ok(())
}

pub fn sell(
    player: &mut PlayerState,
    inventory: &mut Inventory,
    items: &ItemRegistry,
    item_id: &str,
    quantity: u8,
) -> Result<u32, ActionError> {
    let Some(def) = items.get(item_id) else {
        return Err(ActionError::InsufficientResources);
    };
    if !inventory.has(item_id, quantity) {
        return Err(ActionError::InsufficientResources);
    }
    inventory.try_remove(item_id, quantity);
    let earned = def.sell_price * quantity as u32;
    player.gold += earned;
    Ok(earned)
}

/// Cook a recipe: all inputs verified before any are consumed.
pub fn cook(inventory: &mut Inventory, recipe: &Recipe) -> Result<(), ActionError> {
    for (item_id, quantity) in &recipe.inputs {
        if !inventory.has(item_id, *quantity) {
            return Err(ActionError::InsufficientResources);
        }
    }
    for (item_id, quantity) in &recipe.inputs {
        inventory.try_remove(item_id, *quantity);
    }
    inventory.try_add(&recipe.output, 1);
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

fn handle_buy(
    mut buy_reader: EventReader<BuyItemEvent>,
    mut player: ResMut<PlayerState>,
    mut inventory: ResMut<Inventory>,
    items: Res<ItemRegistry>,
    stock: Res<ShopStock>,
    mut feedback_writer: EventWriter<FeedbackEvent>,
    mut mutated_writer: EventWriter<WorldMutatedEvent>,
) {
    for event in buy_reader.read() {
        match buy(
            &mut player,
            &mut inventory,
            &items,
            &stock,
            &event.item_id,
            event.quantity,
        ) {
            Ok(()) => {
                info!(
                    "[Economy] Bought {}x {} ({}g left)",
                    event.quantity, event.item_id, player.gold
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

fn handle_sell(
    mut sell_reader: EventReader<SellItemEvent>,
    mut player: ResMut<PlayerState>,
    mut inventory: ResMut<Inventory>,
    items: Res<ItemRegistry>,
    mut feedback_writer: EventWriter<FeedbackEvent>,
    mut mutated_writer: EventWriter<WorldMutatedEvent>,
) {
    for event in sell_reader.read() {
        match sell(
            &mut player,
            &mut inventory,
            &items,
            &event.item_id,
            event.quantity,
        ) {
            Ok(earned) => {
                info!(
                    "[Economy] Sold {}x {} for {}g",
                    event.quantity, event.item_id, earned
                );
                feedback_writer.send(FeedbackEvent {
                    message: format!("Sold for {}g.", earned),
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

fn handle_cook(
    mut cook_reader: EventReader<CookEvent>,
    mut inventory: ResMut<Inventory>,
    recipes: Res<RecipeBook>,
    mut gained_writer: EventWriter<ItemGainedEvent>,
    mut feedback_writer: EventWriter<FeedbackEvent>,
    mut mutated_writer: EventWriter<WorldMutatedEvent>,
) {
    for event in cook_reader.read() {
        let Some(recipe) = recipes.get(&event.recipe_id) else {
            continue;
        };
        match cook(&mut inventory, recipe) {
            Ok(()) => {
                info!("[Economy] Cooked {}", recipe.name);
                gained_writer.send(ItemGainedEvent {
                    item_id: recipe.output.clone(),
                    quantity: 1,
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

fn handle_eat(
    mut eat_reader: EventReader<EatFoodEvent>,
    mut inventory: ResMut<Inventory>,
    items: Res<ItemRegistry>,
    mut clock: ResMut<TimeCycle>,
    mut player: ResMut<PlayerState>,
    mut feedback_writer: EventWriter<FeedbackEvent>,
) {
    for event in eat_reader.read() {
        let Some(def) = items.get(&event.item_id) else {
            continue;
        };
        let Some(food) = def.food else {
            continue;
        };
        if !inventory.has(&event.item_id, 1) {
            feedback_writer.send(FeedbackEvent {
                message: ActionError::InsufficientResources.message().to_string(),
            });
            continue;
        }

        inventory.try_remove(&event.item_id, 1);
        clock.energy = (clock.energy + food.energy).min(clock.max_energy);
        if let Some((multiplier, remaining_ticks)) = food.speed {
            player.speed_buff = Some(SpeedBuff {
                multiplier,
                remaining_ticks,
            });
        }
        info!("[Economy] Ate {} (+{} energy)", def.name, food.energy);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn items() -> ItemRegistry {
        let mut map = HashMap::new();
        map.insert(
            "turnip_seeds".to_string(),
            ItemDef {
                id: "turnip_seeds".into(),
                name: "Turnip Seeds".into(),
                buy_price: 20,
                sell_price: 10,
                food: None,
            },
        );
        map.insert(
            "turnip".to_string(),
            ItemDef {
                id: "turnip".into(),
                name: "Turnip".into(),
                buy_price: 0,
                sell_price: 35,
                food: Some(FoodEffect {
                    energy: 8.0,
                    speed: None,
                }),
            },
        );
        ItemRegistry { items: map }
    }

    fn stock() -> ShopStock {
        ShopStock {
            items: vec!["turnip_seeds".to_string()],
        }
    }

    #[test]
    fn test_buy_deducts_gold_and_adds_items() {
        let items = items();
        let stock = stock();
        let mut player = PlayerState::default(); // 500g
        let mut inventory = Inventory::default();

        buy(&mut player, &mut inventory, &items, &stock, "turnip_seeds", 5).unwrap();
        assert_eq!(player.gold, 500 - 100);
        assert_eq!(inventory.count("turnip_seeds"), 5);
    }

    #[test]
    fn test_unaffordable_buy_mutates_nothing() {
        let items = items();
        let stock = stock();
        let mut player = PlayerState::default();
        player.gold = 19; // one seed costs 20
        let mut inventory = Inventory::default();

        let result = buy(&mut player, &mut inventory, &items, &stock, "turnip_seeds", 1);
        assert_eq!(result, Err(ActionError::InsufficientResources));
        assert_eq!(player.gold, 19);
        assert_eq!(inventory.count("turnip_seeds"), 0);
    }

    #[test]
    fn test_buy_rejects_items_not_in_stock() {
        let items = items();
        let stock = stock();
        let mut player = PlayerState::default();
        let mut inventory = Inventory::default();

        let result = buy(&mut player, &mut inventory, &items, &stock, "turnip", 1);
        assert_eq!(result, Err(ActionError::InsufficientResources));
        assert_eq!(player.gold, 500);
    }

    #[test]
    fn test_sell_requires_owning_the_goods() {
        let items = items();
        let mut player = PlayerState::default();
        let mut inventory = Inventory::default();
        inventory.try_add("turnip", 2);

        let result = sell(&mut player, &mut inventory, &items, "turnip", 3);
        assert_eq!(result, Err(ActionError::InsufficientResources));
        assert_eq!(inventory.count("turnip"), 2);
        assert_eq!(player.gold, 500);

        let earned = sell(&mut player, &mut inventory, &items, "turnip", 2).unwrap();
        assert_eq!(earned, 70);
        assert_eq!(player.gold, 570);
        assert_eq!(inventory.count("turnip"), 0);
    }

    #[test]
    fn test_cook_validates_all_inputs_before_deducting() {
        let recipe = Recipe {
            id: "soup".into(),
            name: "Turnip Soup".into(),
            inputs: vec![("turnip".to_string(), 2), ("milk".to_string(), 1)],
            output: "turnip_soup".into(),
        };
        let mut inventory = Inventory::default();
        inventory.try_add("turnip", 2); // milk missing

        let result = cook(&mut inventory, &recipe);
        assert_eq!(result, Err(ActionError::InsufficientResources));
        assert_eq!(inventory.count("turnip"), 2);
        assert_eq!(inventory.count("turnip_soup"), 0);

        inventory.try_add("milk", 1);
        cook(&mut inventory, &recipe).unwrap();
        assert_eq!(inventory.count("turnip"), 0);
        assert_eq!(inventory.count("milk"), 0);
        assert_eq!(inventory.count("turnip_soup"), 1);
    }
}
