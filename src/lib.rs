//! Willowmere — a headless world-simulation core.
//!
//! Tile maps, crops, resource nodes, buildings, animals, a day/season
//! clock, grid-step movement, and a JSON persistence gateway, all wired
//! together as Bevy plugins. Rendering, input, audio, and UI are
//! separate collaborators: they talk to this crate through the events
//! in [`shared`] and read its resources.

pub mod animals;
pub mod buildings;
pub mod clock;
pub mod data;
pub mod economy;
pub mod farming;
pub mod gathering;
pub mod interaction;
pub mod movement;
pub mod save;
pub mod shared;
pub mod world;

use bevy::prelude::*;

use shared::*;

/// The whole simulation: state machine, shared resources, the event
/// bus, and every domain plugin. The caller supplies the schedule
/// runner and (for the binary) logging; `MinimalPlugins` plus Bevy's
/// `StatesPlugin` is enough to run it headless.
pub struct WillowmerePlugin;

impl Plugin for WillowmerePlugin {
    fn build(&self, app: &mut App) {
        app
            // Game state
            .init_state::<GameState>()
            // Shared resources
            .init_resource::<TimeCycle>()
            .init_resource::<PlayerState>()
            .init_resource::<Inventory>()
            .init_resource::<CropLedger>()
            .init_resource::<CropRegistry>()
            .init_resource::<ResourceLedger>()
            .init_resource::<NodeRegistry>()
            .init_resource::<BuildingLedger>()
            .init_resource::<BuildingCatalog>()
            .init_resource::<Herd>()
            .init_resource::<MapRegistry>()
            .init_resource::<QuestFlags>()
            .init_resource::<ItemRegistry>()
            .init_resource::<RecipeBook>()
            .init_resource::<ShopStock>()
            // Events
            .add_event::<NewDayEvent>()
            .add_event::<SeasonChangeEvent>()
            .add_event::<MoveIntentEvent>()
            .add_event::<ClickMoveEvent>()
            .add_event::<InteractEvent>()
            .add_event::<MapChangedEvent>()
            .add_event::<EdgeExitEvent>()
            .add_event::<ChangeFloorEvent>()
            .add_event::<EnterBuildingEvent>()
            .add_event::<PlantEvent>()
            .add_event::<HarvestEvent>()
            .add_event::<HitResourceEvent>()
            .add_event::<PlaceBuildingEvent>()
            .add_event::<RemoveBuildingEvent>()
            .add_event::<AnimalInteractEvent>()
            .add_event::<BuyAnimalEvent>()
            .add_event::<BuyItemEvent>()
            .add_event::<SellItemEvent>()
            .add_event::<CookEvent>()
            .add_event::<EatFoodEvent>()
            .add_event::<WorldMutatedEvent>()
            .add_event::<FeedbackEvent>()
            .add_event::<ItemGainedEvent>()
            // Domain plugins
            .add_plugins(clock::ClockPlugin)
            .add_plugins(world::WorldPlugin)
            .add_plugins(farming::FarmingPlugin)
            .add_plugins(gathering::GatheringPlugin)
            .add_plugins(buildings::BuildingsPlugin)
            .add_plugins(animals::AnimalsPlugin)
            .add_plugins(movement::MovementPlugin)
            .add_plugins(interaction::InteractionPlugin)
            .add_plugins(economy::EconomyPlugin)
            .add_plugins(save::SavePlugin)
            // Data loading
            .add_plugins(data::DataPlugin);
    }
}
