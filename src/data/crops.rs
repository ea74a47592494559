//! Crop definitions. Growth rates are stage-points per simulation tick
//! against the 0..100 maturity scale, so a turnip at 0.17 matures in
//! roughly half an in-game day.

use crate::shared::*;

pub fn populate_crops(registry: &mut CropRegistry) {
    let defs = vec![
        CropDef {
            id: "turnip".to_string(),
            name: "Turnip".to_string(),
            seed_id: "turnip_seeds".to_string(),
            harvest_id: "turnip".to_string(),
            growth_rate: 0.17,
            class: CropClass::Single {
                seed_refund_chance: 0.15,
            },
            trellis: false,
            seasons: vec![Season::Spring, Season::Fall],
            sell_price: 35,
        },
        CropDef {
            id: "potato".to_string(),
            name: "Potato".to_string(),
            seed_id: "potato_seeds".to_string(),
            harvest_id: "potato".to_string(),
            growth_rate: 0.11,
            class: CropClass::Single {
                seed_refund_chance: 0.10,
            },
            trellis: false,
            seasons: vec![Season::Spring],
            sell_price: 50,
        },
        CropDef {
            id: "beans".to_string(),
            name: "Green Beans".to_string(),
            seed_id: "bean_seeds".to_string(),
            harvest_id: "beans".to_string(),
            growth_rate: 0.09,
            class: CropClass::Regrow { regrow_stage: 65.0 },
            trellis: true,
            seasons: vec![Season::Spring, Season::Summer],
            sell_price: 45,
        },
        CropDef {
            id: "berry_bush".to_string(),
            name: "Berry Bush".to_string(),
            seed_id: "berry_sapling".to_string(),
            harvest_id: "berry".to_string(),
            growth_rate: 0.06,
            class: CropClass::Regrow { regrow_stage: 55.0 },
            trellis: false,
            seasons: vec![Season::Summer, Season::Fall],
            sell_price: 50,
        },
        CropDef {
            id: "apple_tree".to_string(),
            name: "Apple Tree".to_string(),
            seed_id: "apple_sapling".to_string(),
            harvest_id: "apple".to_string(),
            growth_rate: 0.02,
            class: CropClass::Tree { regrow_stage: 75.0 },
            trellis: false,
            seasons: vec![Season::Spring, Season::Summer, Season::Fall],
            sell_price: 80,
        },
    ];

    for def in defs {
        registry.crops.insert(def.id.clone(), def);
    }
}
