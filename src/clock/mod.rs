//! Clock domain — the heartbeat of Willowmere.
//!
//! Responsible for:
//! - Advancing the day counter one tick per simulation frame
//! - Rolling over the day: day count, season, weather, energy reset
//! - Sending NewDayEvent and SeasonChangeEvent
//! - Pausing / unpausing time based on GameState
//!
//! Everything a rollover changes is applied *before* the events go out,
//! so same-tick listeners read the already-updated season, weather, and
//! energy.

use bevy::prelude::*;
use rand::Rng;

use crate::shared::*;

pub struct ClockPlugin;

impl Plugin for ClockPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (SimSet::Clock, SimSet::World, SimSet::Actions).chain(),
        )
        .add_systems(OnEnter(GameState::Playing), resume_time)
        .add_systems(OnExit(GameState::Playing), pause_time)
        .add_systems(
            Update,
            (tick_clock, tick_speed_buff)
                .in_set(SimSet::Clock)
                .run_if(in_state(GameState::Playing))
                .run_if(time_not_paused),
        );
    }
}

// ─── Run conditions / state hooks ────────────────────────────────────────────

fn time_not_paused(clock: Res<TimeCycle>) -> bool {
    !clock.paused
}

fn resume_time(mut clock: ResMut<TimeCycle>) {
    clock.paused = false;
    info!(
        "[Clock] Time resumed — {:.1}h Day {} {:?}",
        clock.hour_of_day(),
        clock.day_count,
        clock.season
    );
}

fn pause_time(mut clock: ResMut<TimeCycle>) {
    clock.paused = true;
    info!("[Clock] Time paused");
}

// ─── Tick ────────────────────────────────────────────────────────────────────

/// What a day rollover changed, for the event relay.
pub struct Rollover {
    pub day_count: u32,
    pub season: Season,
    pub weather: Weather,
    pub season_changed: bool,
}

/// Advances the clock by one tick. On rollover the whole transition is
/// applied in place (day count, season, weather, energy) and a summary is
/// returned so the caller can fan out events.
pub fn advance_tick(clock: &mut TimeCycle) -> Option<Rollover> {
    clock.day_time += 1;
    if clock.day_time < clock.day_length {
        return None;
    }

    clock.day_time = 0;
    clock.day_count += 1;

    let old_season = clock.season;
    clock.season = Season::from_index((clock.day_count - 1) / DAYS_PER_SEASON);
    clock.weather = roll_weather(clock.season);
    clock.energy = clock.max_energy;

    Some(Rollover {
        day_count: clock.day_count,
        season: clock.season,
        weather: clock.weather,
        season_changed: clock.season != old_season,
    })
}

fn tick_clock(
    mut clock: ResMut<TimeCycle>,
    mut new_day_writer: EventWriter<NewDayEvent>,
    mut season_writer: EventWriter<SeasonChangeEvent>,
) {
    let Some(rollover) = advance_tick(&mut clock) else {
        return;
    };

    info!(
        "[Clock] New day: Day {} ({:?} {}) — Weather: {:?}",
        rollover.day_count,
        rollover.season,
        clock.day_of_season(),
        rollover.weather
    );

    if rollover.season_changed {
        info!("[Clock] Season changed: {:?}", rollover.season);
        season_writer.send(SeasonChangeEvent {
            new_season: rollover.season,
        });
    }

    new_day_writer.send(NewDayEvent {
        day_count: rollover.day_count,
        season: rollover.season,
        weather: rollover.weather,
    });
}

/// Food speed buffs count down in clock ticks and expire here.
fn tick_speed_buff(mut player: ResMut<PlayerState>) {
    if let Some(ref mut buff) = player.speed_buff {
        buff.remaining_ticks = buff.remaining_ticks.saturating_sub(1);
        if buff.remaining_ticks == 0 {
            player.speed_buff = None;
            info!("[Clock] Speed buff expired");
        }
    }
}

// ─── Weather rolling ─────────────────────────────────────────────────────────

/// Rolls a weather result for the given season using weighted probabilities.
///
/// Spring:  60% Sunny, 30% Rainy, 10% Stormy
/// Summer:  70% Sunny, 20% Rainy, 10% Stormy
/// Fall:    50% Sunny, 35% Rainy, 15% Stormy
/// Winter:  40% Sunny, 10% Rainy, 10% Stormy, 40% Snowy
pub fn roll_weather(season: Season) -> Weather {
    let mut rng = rand::thread_rng();
    let roll: f32 = rng.gen(); // 0.0 ..< 1.0

    match season {
        Season::Spring => {
            if roll < 0.60 {
                Weather::Sunny
            } else if roll < 0.90 {
                Weather::Rainy
            } else {
                Weather::Stormy
            }
        }
        Season::Summer => {
            if roll < 0.70 {
                Weather::Sunny
            } else if roll < 0.90 {
                Weather::Rainy
            } else {
                Weather::Stormy
            }
        }
        Season::Fall => {
            if roll < 0.50 {
                Weather::Sunny
            } else if roll < 0.85 {
                Weather::Rainy
            } else {
                Weather::Stormy
            }
        }
        Season::Winter => {
            if roll < 0.40 {
                Weather::Sunny
            } else if roll < 0.50 {
                Weather::Rainy
            } else if roll < 0.60 {
                Weather::Stormy
            } else {
                Weather::Snowy
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
