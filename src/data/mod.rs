//! Data layer — populates all registries at startup.
//!
//! Runs in OnEnter(GameState::Loading), fills every registry from the
//! hard-coded design tables in the submodules, then transitions into
//! Playing. No other domain seeds these resources; everyone else only
//! reads them once the state has advanced past Loading.

mod buildings;
mod crops;
mod items;
mod nodes;
mod recipes;

use bevy::prelude::*;

use crate::shared::*;

pub struct DataPlugin;

impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Loading), load_all_data);
    }
}

fn load_all_data(
    mut item_registry: ResMut<ItemRegistry>,
    mut crop_registry: ResMut<CropRegistry>,
    mut node_registry: ResMut<NodeRegistry>,
    mut building_catalog: ResMut<BuildingCatalog>,
    mut recipe_book: ResMut<RecipeBook>,
    mut shop_stock: ResMut<ShopStock>,
    mut inventory: ResMut<Inventory>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    info!("[Data] Populating registries…");

    items::populate_items(&mut item_registry);
    info!("  Items loaded: {}", item_registry.items.len());

    crops::populate_crops(&mut crop_registry);
    info!("  Crops loaded: {}", crop_registry.crops.len());

    nodes::populate_nodes(&mut node_registry);
    info!("  Node kinds loaded: {}", node_registry.nodes.len());

    buildings::populate_buildings(&mut building_catalog);
    info!("  Building kinds loaded: {}", building_catalog.defs.len());

    recipes::populate_recipes(&mut recipe_book);
    info!("  Recipes loaded: {}", recipe_book.recipes.len());

    items::populate_shop_stock(&mut shop_stock);
    info!("  Shop stock: {} listings", shop_stock.items.len());

    // Starter kit for a fresh game; a loaded save overwrites this.
    inventory.try_add("turnip_seeds", 8);
    inventory.try_add("hay", 10);

    info!("[Data] All registries populated. Transitioning to Playing.");
    next_state.set(GameState::Playing);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_crop_references_known_items() {
        let mut items = ItemRegistry::default();
        let mut crops = CropRegistry::default();
        items::populate_items(&mut items);
        crops::populate_crops(&mut crops);

        for def in crops.crops.values() {
            assert!(
                items.get(&def.seed_id).is_some(),
                "crop {} has unknown seed {}",
                def.id,
                def.seed_id
            );
            assert!(
                items.get(&def.harvest_id).is_some(),
                "crop {} has unknown harvest {}",
                def.id,
                def.harvest_id
            );
        }
    }

    #[test]
    fn test_every_recipe_references_known_items() {
        let mut items = ItemRegistry::default();
        let mut recipes = RecipeBook::default();
        items::populate_items(&mut items);
        recipes::populate_recipes(&mut recipes);

        for recipe in &recipes.recipes {
            assert!(items.get(&recipe.output).is_some());
            for (input, _) in &recipe.inputs {
                assert!(
                    items.get(input).is_some(),
                    "recipe {} has unknown input {}",
                    recipe.id,
                    input
                );
            }
        }
    }

    #[test]
    fn test_shop_stock_is_purchasable() {
        let mut items = ItemRegistry::default();
        let mut stock = ShopStock::default();
        items::populate_items(&mut items);
        items::populate_shop_stock(&mut stock);

        for id in &stock.items {
            let def = items.get(id).expect("stocked item must exist");
            assert!(def.buy_price > 0, "{} has no buy price", id);
        }
    }

    #[test]
    fn test_node_loot_is_known_items() {
        let mut items = ItemRegistry::default();
        let mut nodes = NodeRegistry::default();
        items::populate_items(&mut items);
        nodes::populate_nodes(&mut nodes);

        for def in nodes.nodes.values() {
            assert!(!def.loot.is_empty());
            for (item, _) in &def.loot {
                assert!(items.get(item).is_some());
            }
        }
    }

    #[test]
    fn test_ore_veins_drop_both_ores() {
        let mut nodes = NodeRegistry::default();
        nodes::populate_nodes(&mut nodes);

        let vein = nodes.get(NodeKind::OreVein).unwrap();
        for ore in ["copper_ore", "iron_ore"] {
            assert!(
                vein.loot.iter().any(|(item, _)| item == ore),
                "ore vein drops no {}",
                ore
            );
        }
    }

    #[test]
    fn test_every_tile_node_kind_has_a_def() {
        let mut nodes = NodeRegistry::default();
        nodes::populate_nodes(&mut nodes);
        for kind in [NodeKind::Tree, NodeKind::Rock, NodeKind::OreVein] {
            assert!(nodes.get(kind).is_some());
        }
    }

    #[test]
    fn test_building_material_costs_are_known_items() {
        let mut items = ItemRegistry::default();
        let mut catalog = BuildingCatalog::default();
        items::populate_items(&mut items);
        buildings::populate_buildings(&mut catalog);

        for def in catalog.defs.values() {
            assert!(def.width > 0 && def.height > 0);
            for (item, _) in &def.material_costs {
                assert!(items.get(item).is_some());
            }
        }
    }
}
