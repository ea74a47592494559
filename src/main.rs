use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

use willowmere::WillowmerePlugin;

/// Simulation tick rate. Rendering collaborators run their own clock;
/// this loop is the authoritative one.
const TICK_SECONDS: f64 = 1.0 / 60.0;

fn main() {
    App::new()
        .add_plugins(
            MinimalPlugins
                .set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
                    TICK_SECONDS,
                ))),
        )
        .add_plugins(LogPlugin::default())
        .add_plugins(StatesPlugin)
        .add_plugins(WillowmerePlugin)
        .run();
}
