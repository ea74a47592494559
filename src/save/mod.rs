//! Persistence gateway — one named save document, JSON on disk.
//!
//! The document is tolerant in both directions: every field carries
//! `#[serde(default)]`, so a document from an older build simply merges
//! onto freshly-defaulted state (missing energy comes back full, missing
//! zoom comes back 1.0, missing facing comes back Down). Loading only
//! fails when the storage read or the parse as a whole fails, and the
//! caller falls back to a fresh game.
//!
//! Writes go to a temp file first and are renamed into place.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::shared::*;

pub const SAVE_VERSION: u32 = 1;

// ═══════════════════════════════════════════════════════════════════════
// EVENTS
// ═══════════════════════════════════════════════════════════════════════

/// Trigger a save of the whole world state.
#[derive(Event, Debug, Clone)]
pub struct SaveRequestEvent;

/// Trigger a load from the store.
#[derive(Event, Debug, Clone)]
pub struct LoadRequestEvent;

#[derive(Event, Debug, Clone)]
pub struct SaveCompleteEvent {
    pub success: bool,
    pub error_message: Option<String>,
}

#[derive(Event, Debug, Clone)]
pub struct LoadCompleteEvent {
    pub success: bool,
    pub error_message: Option<String>,
}

/// Reset everything to a fresh game.
#[derive(Event, Debug, Clone)]
pub struct NewGameEvent;

// ═══════════════════════════════════════════════════════════════════════
// STORE
// ═══════════════════════════════════════════════════════════════════════

/// Where the save document lives. A single named slot with the four
/// primitive operations; the gateway never touches storage any other
/// way.
pub trait SaveStore: Send + Sync + 'static {
    fn exists(&self) -> bool;
    fn read(&self) -> Result<String, String>;
    fn write(&self, contents: &str) -> Result<(), String>;
    fn delete(&self) -> Result<(), String>;
}

/// On-disk store under `saves/` next to the executable.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Default for FileStore {
    fn default() -> Self {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            path: exe_dir.join("saves").join("world.json"),
        }
    }
}

impl SaveStore for FileStore {
    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn read(&self) -> Result<String, String> {
        fs::read_to_string(&self.path)
            .map_err(|e| format!("Read failed for {}: {}", self.path.display(), e))
    }

    fn write(&self, contents: &str) -> Result<(), String> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .map_err(|e| format!("Could not create saves directory: {}", e))?;
        }
        // Temp file then rename, so a crash mid-write never clobbers the
        // previous save.
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, contents)
            .map_err(|e| format!("Write failed for {}: {}", tmp_path.display(), e))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| format!("Rename failed: {}", e))
    }

    fn delete(&self) -> Result<(), String> {
        fs::remove_file(&self.path).map_err(|e| format!("Delete failed: {}", e))
    }
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MemoryStore {
    contents: Mutex<Option<String>>,
}

impl SaveStore for MemoryStore {
    fn exists(&self) -> bool {
        self.contents.lock().map(|c| c.is_some()).unwrap_or(false)
    }

    fn read(&self) -> Result<String, String> {
        self.contents
            .lock()
            .map_err(|_| "store poisoned".to_string())?
            .clone()
            .ok_or_else(|| "no save present".to_string())
    }

    fn write(&self, contents: &str) -> Result<(), String> {
        *self
            .contents
            .lock()
            .map_err(|_| "store poisoned".to_string())? = Some(contents.to_string());
        Ok(())
    }

    fn delete(&self) -> Result<(), String> {
        *self
            .contents
            .lock()
            .map_err(|_| "store poisoned".to_string())? = None;
        Ok(())
    }
}

#[derive(Resource)]
pub struct ActiveStore(pub Box<dyn SaveStore>);

impl Default for ActiveStore {
    fn default() -> Self {
        Self(Box::new(FileStore::default()))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// DOCUMENT
// ═══════════════════════════════════════════════════════════════════════

/// The serialized world. Sparse ledgers with non-string keys are
/// flattened to pair lists, since JSON object keys must be strings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SaveDoc {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub save_timestamp: u64,
    #[serde(default)]
    pub clock: TimeCycle,
    #[serde(default)]
    pub player: PlayerState,
    #[serde(default)]
    pub inventory: Inventory,
    #[serde(default)]
    pub crops: Vec<(TilePos, Crop)>,
    #[serde(default)]
    pub node_durability: Vec<(MapKey, TilePos, u32)>,
    #[serde(default)]
    pub buildings: BuildingLedger,
    #[serde(default)]
    pub herd: Herd,
    #[serde(default)]
    pub maps: MapRegistry,
    #[serde(default)]
    pub quests: QuestFlags,
}

/// Everything the gateway captures and restores, borrowed in one bundle
/// so snapshot and apply stay symmetrical.
pub struct WorldState<'a> {
    pub clock: &'a mut TimeCycle,
    pub player: &'a mut PlayerState,
    pub inventory: &'a mut Inventory,
    pub crops: &'a mut CropLedger,
    pub nodes: &'a mut ResourceLedger,
    pub buildings: &'a mut BuildingLedger,
    pub herd: &'a mut Herd,
    pub maps: &'a mut MapRegistry,
    pub quests: &'a mut QuestFlags,
}

pub fn snapshot(state: &WorldState, timestamp: u64) -> SaveDoc {
    let mut crops: Vec<(TilePos, Crop)> = state
        .crops
        .crops
        .iter()
        .map(|(pos, crop)| (*pos, crop.clone()))
        .collect();
    crops.sort_by_key(|(pos, _)| *pos);

    let mut node_durability: Vec<(MapKey, TilePos, u32)> = state
        .nodes
        .durability
        .iter()
        .map(|((map, pos), hits)| (*map, *pos, *hits))
        .collect();
    node_durability.sort_by_key(|(_, pos, _)| *pos);

    SaveDoc {
        version: SAVE_VERSION,
        save_timestamp: timestamp,
        clock: state.clock.clone(),
        player: state.player.clone(),
        inventory: state.inventory.clone(),
        crops,
        node_durability,
        buildings: state.buildings.clone(),
        herd: state.herd.clone(),
        maps: state.maps.clone(),
        quests: state.quests.clone(),
    }
}

/// Replace the live state with the document's contents. Fields the
/// document never carried came in as defaults, so this is the merge.
pub fn apply(doc: SaveDoc, state: &mut WorldState) {
    *state.clock = doc.clock;
    *state.player = doc.player;
    *state.inventory = doc.inventory;
    state.crops.crops = doc.crops.into_iter().collect();
    state.nodes.durability = doc
        .node_durability
        .into_iter()
        .map(|(map, pos, hits)| ((map, pos), hits))
        .collect();
    *state.buildings = doc.buildings;
    *state.herd = doc.herd;
    *state.maps = doc.maps;
    *state.quests = doc.quests;

    // Visual positions are not persisted; settle every mover onto its
    // grid cell.
    let grid = state.player.mover.grid;
    state.player.mover.warp(grid);
    for (_, map) in state.maps.maps.iter_mut() {
        for npc in map.npcs.iter_mut() {
            let grid = npc.mover.grid;
            npc.mover.warp(grid);
        }
        for creep in map.creeps.iter_mut() {
            let grid = creep.mover.grid;
            creep.mover.warp(grid);
        }
    }
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

#[derive(Resource)]
struct AutosaveTimer(Timer);

impl Default for AutosaveTimer {
    fn default() -> Self {
        Self(Timer::from_seconds(
            AUTOSAVE_INTERVAL_SECS,
            TimerMode::Repeating,
        ))
    }
}

pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ActiveStore>()
            .init_resource::<AutosaveTimer>()
            .add_event::<SaveRequestEvent>()
            .add_event::<LoadRequestEvent>()
            .add_event::<SaveCompleteEvent>()
            .add_event::<LoadCompleteEvent>()
            .add_event::<NewGameEvent>()
            .add_systems(OnEnter(GameState::Playing), request_load_if_present)
            .add_systems(
                Update,
                (
                    autosave_on_interval,
                    autosave_on_mutation,
                    handle_save_request,
                    handle_load_request,
                    handle_new_game,
                )
                    .chain()
                    .run_if(in_state(GameState::Playing).or(in_state(GameState::Paused))),
            );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

/// A previous session's save is picked up automatically when play
/// starts; a missing or broken document just means a fresh game.
fn request_load_if_present(store: Res<ActiveStore>, mut load_writer: EventWriter<LoadRequestEvent>) {
    if store.0.exists() {
        load_writer.send(LoadRequestEvent);
    }
}

fn autosave_on_interval(
    time: Res<Time>,
    mut timer: ResMut<AutosaveTimer>,
    mut save_writer: EventWriter<SaveRequestEvent>,
) {
    if timer.0.tick(time.delta()).just_finished() {
        info!("[Save] Interval autosave");
        save_writer.send(SaveRequestEvent);
    }
}

/// Any state-mutating interaction triggers a save in the same frame. A
/// burst of mutations still writes only once.
fn autosave_on_mutation(
    mut mutated_reader: EventReader<WorldMutatedEvent>,
    mut save_writer: EventWriter<SaveRequestEvent>,
) {
    if mutated_reader.read().next().is_some() {
        mutated_reader.clear();
        save_writer.send(SaveRequestEvent);
    }
}

#[allow(clippy::too_many_arguments)]
fn handle_save_request(
    mut save_reader: EventReader<SaveRequestEvent>,
    mut complete_writer: EventWriter<SaveCompleteEvent>,
    store: Res<ActiveStore>,
    mut clock: ResMut<TimeCycle>,
    mut player: ResMut<PlayerState>,
    mut inventory: ResMut<Inventory>,
    mut crops: ResMut<CropLedger>,
    mut nodes: ResMut<ResourceLedger>,
    mut buildings: ResMut<BuildingLedger>,
    mut herd: ResMut<Herd>,
    mut maps: ResMut<MapRegistry>,
    mut quests: ResMut<QuestFlags>,
) {
    if save_reader.read().next().is_none() {
        return;
    }
    save_reader.clear();

    let state = WorldState {
        clock: &mut clock,
        player: &mut player,
        inventory: &mut inventory,
        crops: &mut crops,
        nodes: &mut nodes,
        buildings: &mut buildings,
        herd: &mut herd,
        maps: &mut maps,
        quests: &mut quests,
    };
    let doc = snapshot(&state, current_timestamp());

    let result = serde_json::to_string_pretty(&doc)
        .map_err(|e| format!("Serialization failed: {}", e))
        .and_then(|json| store.0.write(&json));

    match result {
        Ok(()) => {
            info!("[Save] World saved (day {})", doc.clock.day_count);
            complete_writer.send(SaveCompleteEvent {
                success: true,
                error_message: None,
            });
        }
        Err(e) => {
            warn!("[Save] Save FAILED: {}", e);
            complete_writer.send(SaveCompleteEvent {
                success: false,
                error_message: Some(e),
            });
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn handle_load_request(
    mut load_reader: EventReader<LoadRequestEvent>,
    mut complete_writer: EventWriter<LoadCompleteEvent>,
    mut map_writer: EventWriter<MapChangedEvent>,
    store: Res<ActiveStore>,
    mut clock: ResMut<TimeCycle>,
    mut player: ResMut<PlayerState>,
    mut inventory: ResMut<Inventory>,
    mut crops: ResMut<CropLedger>,
    mut nodes: ResMut<ResourceLedger>,
    mut buildings: ResMut<BuildingLedger>,
    mut herd: ResMut<Herd>,
    mut maps: ResMut<MapRegistry>,
    mut quests: ResMut<QuestFlags>,
) {
    if load_reader.read().next().is_none() {
        return;
    }
    load_reader.clear();

    let parsed = store
        .0
        .read()
        .and_then(|json| {
            serde_json::from_str::<SaveDoc>(&json)
                .map_err(|e| format!("Deserialization failed: {}", e))
        });

    match parsed {
        Ok(doc) => {
            if doc.version != SAVE_VERSION {
                warn!(
                    "[Save] Document version {} (current {}), loading anyway",
                    doc.version, SAVE_VERSION
                );
            }
            let mut state = WorldState {
                clock: &mut clock,
                player: &mut player,
                inventory: &mut inventory,
                crops: &mut crops,
                nodes: &mut nodes,
                buildings: &mut buildings,
                herd: &mut herd,
                maps: &mut maps,
                quests: &mut quests,
            };
            apply(doc, &mut state);
            info!("[Save] World loaded (day {})", clock.day_count);
            map_writer.send(MapChangedEvent {
                key: maps.current,
            });
            complete_writer.send(LoadCompleteEvent {
                success: true,
                error_message: None,
            });
        }
        Err(e) => {
            // Fresh game: the live defaults stay untouched.
            warn!("[Save] Load FAILED, continuing with fresh state: {}", e);
            complete_writer.send(LoadCompleteEvent {
                success: false,
                error_message: Some(e),
            });
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn handle_new_game(
    mut new_game_reader: EventReader<NewGameEvent>,
    mut clock: ResMut<TimeCycle>,
    mut player: ResMut<PlayerState>,
    mut inventory: ResMut<Inventory>,
    mut crops: ResMut<CropLedger>,
    mut nodes: ResMut<ResourceLedger>,
    mut buildings: ResMut<BuildingLedger>,
    mut herd: ResMut<Herd>,
    mut maps: ResMut<MapRegistry>,
    mut quests: ResMut<QuestFlags>,
) {
    if new_game_reader.read().next().is_none() {
        return;
    }
    new_game_reader.clear();

    info!("[Save] New game — resetting world state");
    *clock = TimeCycle::default();
    *player = PlayerState::default();
    *inventory = Inventory::default();
    *crops = CropLedger::default();
    *nodes = ResourceLedger::default();
    *buildings = BuildingLedger::default();
    *herd = Herd::default();
    *maps = MapRegistry::default();
    *quests = QuestFlags::default();
}

// ═══════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        clock: TimeCycle,
        player: PlayerState,
        inventory: Inventory,
        crops: CropLedger,
        nodes: ResourceLedger,
        buildings: BuildingLedger,
        herd: Herd,
        maps: MapRegistry,
        quests: QuestFlags,
    }

    impl Fixture {
        fn fresh() -> Self {
            Self {
                clock: TimeCycle::default(),
                player: PlayerState::default(),
                inventory: Inventory::default(),
                crops: CropLedger::default(),
                nodes: ResourceLedger::default(),
                buildings: BuildingLedger::default(),
                herd: Herd::default(),
                maps: MapRegistry::default(),
                quests: QuestFlags::default(),
            }
        }

        fn state(&mut self) -> WorldState<'_> {
            WorldState {
                clock: &mut self.clock,
                player: &mut self.player,
                inventory: &mut self.inventory,
                crops: &mut self.crops,
                nodes: &mut self.nodes,
                buildings: &mut self.buildings,
                herd: &mut self.herd,
                maps: &mut self.maps,
                quests: &mut self.quests,
            }
        }
    }

    fn populated() -> Fixture {
        let mut f = Fixture::fresh();
        f.clock.day_count = 17;
        f.clock.season = Season::Summer;
        f.clock.energy = 42.5;
        f.player.gold = 1234;
        f.player.mover.warp(TilePos::new(8, 9));
        f.inventory.try_add("wood", 30);
        f.crops.crops.insert(
            TilePos::new(6, 10),
            Crop {
                kind: "turnip".into(),
                stage: 55.0,
                withered: false,
            },
        );
        f.nodes.set(MapKey::Dungeon(2), TilePos::new(3, 3), 1);
        f.nodes.set(MapKey::Overworld, TilePos::new(12, 4), 2);
        f.quests.set("met_marta");
        f
    }

    #[test]
    fn test_round_trip_preserves_everything() {
        let mut original = populated();
        let doc = snapshot(&original.state(), 1234567);
        let json = serde_json::to_string_pretty(&doc).unwrap();

        let parsed: SaveDoc = serde_json::from_str(&json).unwrap();
        let mut restored = Fixture::fresh();
        apply(parsed, &mut restored.state());

        assert_eq!(restored.clock.day_count, 17);
        assert_eq!(restored.clock.season, Season::Summer);
        assert_eq!(restored.clock.energy, 42.5);
        assert_eq!(restored.player.gold, 1234);
        assert_eq!(restored.player.mover.grid, TilePos::new(8, 9));
        assert_eq!(restored.inventory.count("wood"), 30);
        assert_eq!(restored.crops.crops.len(), 1);
        assert_eq!(restored.crops.crops[&TilePos::new(6, 10)].stage, 55.0);
        assert_eq!(
            restored.nodes.get(MapKey::Dungeon(2), TilePos::new(3, 3)),
            Some(1)
        );
        assert_eq!(
            restored.nodes.get(MapKey::Overworld, TilePos::new(12, 4)),
            Some(2)
        );
        assert!(restored.quests.is_set("met_marta"));
    }

    #[test]
    fn test_missing_fields_merge_onto_defaults() {
        // A bare document from some ancient build.
        let json = r#"{ "version": 1, "player": { "gold": 77 } }"#;
        let doc: SaveDoc = serde_json::from_str(json).unwrap();
        let mut restored = Fixture::fresh();
        apply(doc, &mut restored.state());

        assert_eq!(restored.player.gold, 77);
        // Everything absent came back as defaults.
        assert_eq!(restored.clock.energy, MAX_ENERGY);
        assert_eq!(restored.player.zoom, 1.0);
        assert_eq!(restored.player.mover.facing, Facing::Down);
        assert!(restored.crops.crops.is_empty());
    }

    #[test]
    fn test_unparseable_document_is_an_error() {
        let result = serde_json::from_str::<SaveDoc>("{ not json");
        assert!(result.is_err());
    }

    #[test]
    fn test_memory_store_lifecycle() {
        let store = MemoryStore::default();
        assert!(!store.exists());
        assert!(store.read().is_err());

        store.write("{}").unwrap();
        assert!(store.exists());
        assert_eq!(store.read().unwrap(), "{}");

        store.delete().unwrap();
        assert!(!store.exists());
    }

    #[test]
    fn test_generated_maps_survive_the_document() {
        let mut f = populated();
        crate::world::router::get_or_generate(&mut f.maps, MapKey::Dungeon(4));
        f.maps.current = MapKey::Dungeon(4);
        f.maps.last_overworld_pos = TilePos::new(35, 4);

        let doc = snapshot(&f.state(), 0);
        let json = serde_json::to_string(&doc).unwrap();
        let parsed: SaveDoc = serde_json::from_str(&json).unwrap();
        let mut restored = Fixture::fresh();
        apply(parsed, &mut restored.state());

        assert_eq!(restored.maps.current, MapKey::Dungeon(4));
        assert_eq!(restored.maps.last_overworld_pos, TilePos::new(35, 4));
        let original_grid = &f.maps.get(MapKey::Dungeon(4)).unwrap().grid;
        let restored_grid = &restored.maps.get(MapKey::Dungeon(4)).unwrap().grid;
        assert_eq!(original_grid.tiles, restored_grid.tiles);
    }
}
