//! Cooking recipes.

use crate::shared::*;

pub fn populate_recipes(book: &mut RecipeBook) {
    book.recipes = vec![
        Recipe {
            id: "turnip_soup".to_string(),
            name: "Turnip Soup".to_string(),
            inputs: vec![("turnip".to_string(), 2), ("milk".to_string(), 1)],
            output: "turnip_soup".to_string(),
        },
        Recipe {
            id: "baked_potato".to_string(),
            name: "Baked Potato".to_string(),
            inputs: vec![("potato".to_string(), 2), ("egg".to_string(), 1)],
            output: "baked_potato".to_string(),
        },
        Recipe {
            id: "trail_snack".to_string(),
            name: "Trail Snack".to_string(),
            inputs: vec![("berry".to_string(), 3), ("apple".to_string(), 1)],
            output: "trail_snack".to_string(),
        },
    ];
}
