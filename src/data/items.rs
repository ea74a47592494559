//! Item definitions and the general store's stock list.

use crate::shared::*;

fn item(id: &str, name: &str, buy_price: u32, sell_price: u32) -> ItemDef {
    ItemDef {
        id: id.to_string(),
        name: name.to_string(),
        buy_price,
        sell_price,
        food: None,
    }
}

fn food(id: &str, name: &str, buy_price: u32, sell_price: u32, effect: FoodEffect) -> ItemDef {
    ItemDef {
        food: Some(effect),
        ..item(id, name, buy_price, sell_price)
    }
}

pub fn populate_items(registry: &mut ItemRegistry) {
    let defs = vec![
        // Seeds and saplings
        item("turnip_seeds", "Turnip Seeds", 20, 10),
        item("potato_seeds", "Potato Seeds", 30, 15),
        item("bean_seeds", "Bean Seeds", 40, 20),
        item("berry_sapling", "Berry Sapling", 120, 60),
        item("apple_sapling", "Apple Sapling", 300, 150),
        // Harvests
        food(
            "turnip",
            "Turnip",
            0,
            35,
            FoodEffect {
                energy: 8.0,
                speed: None,
            },
        ),
        food(
            "potato",
            "Potato",
            0,
            50,
            FoodEffect {
                energy: 12.0,
                speed: None,
            },
        ),
        food(
            "beans",
            "Beans",
            0,
            45,
            FoodEffect {
                energy: 10.0,
                speed: None,
            },
        ),
        food(
            "berry",
            "Berry",
            0,
            50,
            FoodEffect {
                energy: 6.0,
                speed: None,
            },
        ),
        food(
            "apple",
            "Apple",
            0,
            80,
            FoodEffect {
                energy: 15.0,
                speed: None,
            },
        ),
        // Gathered materials
        item("wood", "Wood", 10, 3),
        item("stone", "Stone", 8, 2),
        item("copper_ore", "Copper Ore", 0, 25),
        item("iron_ore", "Iron Ore", 0, 60),
        // Animal care and produce
        item("hay", "Hay", 15, 5),
        food(
            "egg",
            "Egg",
            0,
            40,
            FoodEffect {
                energy: 10.0,
                speed: None,
            },
        ),
        food(
            "milk",
            "Milk",
            0,
            90,
            FoodEffect {
                energy: 15.0,
                speed: None,
            },
        ),
        item("wool", "Wool", 0, 110),
        // Cooked dishes
        food(
            "turnip_soup",
            "Turnip Soup",
            0,
            120,
            FoodEffect {
                energy: 35.0,
                speed: None,
            },
        ),
        food(
            "baked_potato",
            "Baked Potato",
            0,
            140,
            FoodEffect {
                energy: 40.0,
                speed: None,
            },
        ),
        food(
            "trail_snack",
            "Trail Snack",
            0,
            160,
            FoodEffect {
                energy: 20.0,
                speed: Some((1.5, 600)),
            },
        ),
    ];

    for def in defs {
        registry.items.insert(def.id.clone(), def);
    }
}

pub fn populate_shop_stock(stock: &mut ShopStock) {
    stock.items = vec![
        "turnip_seeds".to_string(),
        "potato_seeds".to_string(),
        "bean_seeds".to_string(),
        "berry_sapling".to_string(),
        "apple_sapling".to_string(),
        "hay".to_string(),
        "wood".to_string(),
        "stone".to_string(),
    ];
}
