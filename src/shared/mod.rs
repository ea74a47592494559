//! Shared components, resources, events, and states for Willowmere.
//!
//! This is the type contract. Every domain plugin imports from here.
//! No domain imports from any other domain directly.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE — top-level state machine
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Loading,
    Playing,
    Paused,
}

/// Per-frame ordering: the clock rolls the day over first, then the
/// passive world updates (growth, daily resets) read the already-updated
/// day, then player actions apply.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimSet {
    Clock,
    World,
    Actions,
}

// ═══════════════════════════════════════════════════════════════════════
// TIME CYCLE
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Season {
    #[default]
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    pub fn from_index(idx: u32) -> Self {
        match idx % 4 {
            0 => Season::Spring,
            1 => Season::Summer,
            2 => Season::Fall,
            _ => Season::Winter,
        }
    }

    pub fn index(self) -> u32 {
        match self {
            Season::Spring => 0,
            Season::Summer => 1,
            Season::Fall => 2,
            Season::Winter => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Weather {
    #[default]
    Sunny,
    Rainy,
    Stormy,
    Snowy, // Winter only
}

/// The single forward clock every domain reads each tick.
///
/// `day_time` advances once per simulation tick. On exceeding `day_length`
/// the day rolls over: `day_count` increments, the season is recomputed,
/// weather is redrawn, and energy resets to its maximum.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeCycle {
    pub day_time: u32,
    pub day_length: u32,
    pub day_count: u32,
    pub season: Season,
    pub weather: Weather,
    pub energy: f32,
    pub max_energy: f32,
    pub paused: bool,
}

impl Default for TimeCycle {
    fn default() -> Self {
        Self {
            day_time: 0,
            day_length: DAY_LENGTH_TICKS,
            day_count: 1,
            season: Season::Spring,
            weather: Weather::Sunny,
            energy: MAX_ENERGY,
            max_energy: MAX_ENERGY,
            paused: false,
        }
    }
}

impl TimeCycle {
    /// Day number within the current season, 1-based.
    pub fn day_of_season(&self) -> u32 {
        ((self.day_count - 1) % DAYS_PER_SEASON) + 1
    }

    /// Derived hour-of-day: the day window maps onto a fixed
    /// start-hour/duration rather than a literal 24-hour counter.
    /// 14.5 means 2:30 PM.
    pub fn hour_of_day(&self) -> f32 {
        let fraction = self.day_time as f32 / self.day_length.max(1) as f32;
        DAY_START_HOUR + fraction * DAY_ACTIVE_HOURS
    }

    /// The sole gate for labor actions. Returns false and leaves energy
    /// unchanged when there is not enough; otherwise deducts and returns
    /// true.
    pub fn consume_energy(&mut self, amount: f32) -> bool {
        if self.energy < amount {
            return false;
        }
        self.energy -= amount;
        true
    }
}

// ═══════════════════════════════════════════════════════════════════════
// TILES & GRIDS
// ═══════════════════════════════════════════════════════════════════════

/// Lightweight struct key for the sparse per-tile ledgers. Cheaper than a
/// synthesized "x,y" string and hashable without allocation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Closed set of terrain/object codes. All solidity and resource-node
/// behavior hangs off the single `props()` table below — adding a tile
/// kind touches one table, not N match statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TileKind {
    #[default]
    Grass,
    Soil,
    Road,
    Sand,
    Water,
    WoodFloor,
    Bridge,
    Tree,
    Rock,
    OreVein,
    Building,
    Wall,
    DungeonFloor,
    LadderDown,
    LadderUp,
}

/// Resource node classes — choppable/minable tiles with durability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Tree,
    Rock,
    OreVein,
}

/// Static per-tile-kind behavior. One row per kind.
#[derive(Debug, Clone, Copy)]
pub struct TileProps {
    /// Terrain solidity. Crops and occupants are layered on by callers.
    pub solid: bool,
    /// Set when this tile is a depletable resource node.
    pub node: Option<NodeKind>,
}

impl TileKind {
    pub const fn props(self) -> TileProps {
        match self {
            TileKind::Grass => TileProps { solid: false, node: None },
            TileKind::Soil => TileProps { solid: false, node: None },
            TileKind::Road => TileProps { solid: false, node: None },
            TileKind::Sand => TileProps { solid: false, node: None },
            TileKind::Water => TileProps { solid: true, node: None },
            TileKind::WoodFloor => TileProps { solid: false, node: None },
            TileKind::Bridge => TileProps { solid: false, node: None },
            TileKind::Tree => TileProps { solid: true, node: Some(NodeKind::Tree) },
            TileKind::Rock => TileProps { solid: true, node: Some(NodeKind::Rock) },
            TileKind::OreVein => TileProps { solid: true, node: Some(NodeKind::OreVein) },
            TileKind::Building => TileProps { solid: true, node: None },
            TileKind::Wall => TileProps { solid: true, node: None },
            TileKind::DungeonFloor => TileProps { solid: false, node: None },
            TileKind::LadderDown => TileProps { solid: false, node: None },
            TileKind::LadderUp => TileProps { solid: false, node: None },
        }
    }

    pub const fn is_solid_terrain(self) -> bool {
        self.props().solid
    }

    pub const fn node(self) -> Option<NodeKind> {
        self.props().node
    }
}

/// A named 2-D grid of terrain/object codes, row-major.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TileGrid {
    pub width: usize,
    pub height: usize,
    pub tiles: Vec<TileKind>,
}

impl TileGrid {
    pub fn filled(width: usize, height: usize, kind: TileKind) -> Self {
        Self {
            width,
            height,
            tiles: vec![kind; width * height],
        }
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width as i32 && y < self.height as i32
    }

    /// Out-of-bounds reads as Wall (solid), so edge collision falls out
    /// of the same predicate as interior collision.
    pub fn get(&self, x: i32, y: i32) -> TileKind {
        if self.in_bounds(x, y) {
            self.tiles[y as usize * self.width + x as usize]
        } else {
            TileKind::Wall
        }
    }

    /// Silently clamps to bounds: writes outside the grid are a no-op.
    pub fn set(&mut self, x: i32, y: i32, kind: TileKind) {
        if self.in_bounds(x, y) {
            self.tiles[y as usize * self.width + x as usize] = kind;
        }
    }

    pub fn fill_rect(&mut self, x0: i32, y0: i32, w: i32, h: i32, kind: TileKind) {
        for dy in 0..h {
            for dx in 0..w {
                self.set(x0 + dx, y0 + dy, kind);
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// MAPS & ROUTING
// ═══════════════════════════════════════════════════════════════════════

/// Every map/floor the router can hold. Interiors are keyed by the
/// building kind they belong to; dungeon floors are numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapKey {
    Overworld,
    North,
    Town,
    Interior(BuildingKind),
    Dungeon(u8),
}

impl Default for MapKey {
    fn default() -> Self {
        MapKey::Overworld
    }
}

/// A generated map plus the entity lists that live on it.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MapInstance {
    pub grid: TileGrid,
    pub npcs: Vec<Npc>,
    pub creeps: Vec<Creep>,
    /// Default entry point when arriving without a more specific target.
    pub spawn: TilePos,
}

/// Registry of named maps/floors with their lazily generated instances.
///
/// Generation happens on first entry; the result is cached for the
/// session. Also remembers where the player left the overworld so
/// exiting a dungeon or interior can restore that position.
#[derive(Resource, Debug, Clone, Serialize, Deserialize, Default)]
pub struct MapRegistry {
    pub maps: Vec<(MapKey, MapInstance)>,
    pub current: MapKey,
    pub last_overworld_pos: TilePos,
}

impl MapRegistry {
    pub fn get(&self, key: MapKey) -> Option<&MapInstance> {
        self.maps.iter().find(|(k, _)| *k == key).map(|(_, m)| m)
    }

    pub fn get_mut(&mut self, key: MapKey) -> Option<&mut MapInstance> {
        self.maps
            .iter_mut()
            .find(|(k, _)| *k == key)
            .map(|(_, m)| m)
    }

    pub fn contains(&self, key: MapKey) -> bool {
        self.get(key).is_some()
    }

    pub fn insert(&mut self, key: MapKey, instance: MapInstance) {
        if let Some(existing) = self.get_mut(key) {
            *existing = instance;
        } else {
            self.maps.push((key, instance));
        }
    }

    pub fn current_map(&self) -> Option<&MapInstance> {
        self.get(self.current)
    }

    pub fn current_map_mut(&mut self) -> Option<&mut MapInstance> {
        let key = self.current;
        self.get_mut(key)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// MOVEMENT
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Facing {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl Facing {
    pub fn from_delta(dx: i32, dy: i32) -> Option<Self> {
        match (dx.signum(), dy.signum()) {
            (0, -1) => Some(Facing::Up),
            (0, 1) => Some(Facing::Down),
            (-1, 0) => Some(Facing::Left),
            (1, 0) => Some(Facing::Right),
            _ => None,
        }
    }

    pub fn offset(self) -> (i32, i32) {
        match self {
            Facing::Up => (0, -1),
            Facing::Down => (0, 1),
            Facing::Left => (-1, 0),
            Facing::Right => (1, 0),
        }
    }
}

/// Grid-stepping motion state shared by player, NPCs, and creeps.
///
/// `grid` is the authoritative coordinate used for collision; `visual`
/// is a cosmetic pixel position that converges toward the grid cell's
/// origin every tick and snaps when within one tick's travel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mover {
    pub grid: TilePos,
    /// Cosmetic pixel position. Not persisted; rebuilt from `grid` on
    /// load via [`Mover::warp`].
    #[serde(skip)]
    pub visual: Vec2,
    pub facing: Facing,
    /// True while the visual position is still traveling to `grid`.
    #[serde(skip)]
    pub mid_step: bool,
    /// Latest-wins buffered move intent, applied when the step completes.
    #[serde(skip)]
    pub buffered: Option<(i32, i32)>,
    /// Click-to-move target. Cleared by directional input or a failed
    /// pathfinding step.
    #[serde(skip)]
    pub destination: Option<TilePos>,
    /// Base travel speed, pixels per second.
    pub speed: f32,
}

impl Default for Mover {
    fn default() -> Self {
        Self::at(TilePos::default())
    }
}

impl Mover {
    pub fn at(pos: TilePos) -> Self {
        Self {
            grid: pos,
            visual: Vec2::new(pos.x as f32 * TILE_SIZE, pos.y as f32 * TILE_SIZE),
            facing: Facing::Down,
            mid_step: false,
            buffered: None,
            destination: None,
            speed: BASE_MOVE_SPEED,
        }
    }

    /// Teleport: grid and visual move together, motion state clears.
    pub fn warp(&mut self, pos: TilePos) {
        self.grid = pos;
        self.visual = Vec2::new(pos.x as f32 * TILE_SIZE, pos.y as f32 * TILE_SIZE);
        self.mid_step = false;
        self.buffered = None;
        self.destination = None;
    }
}

/// Temporary movement speed multiplier from food buffs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpeedBuff {
    pub multiplier: f32,
    pub remaining_ticks: u32,
}

// ═══════════════════════════════════════════════════════════════════════
// PLAYER
// ═══════════════════════════════════════════════════════════════════════

#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerState {
    pub mover: Mover,
    pub gold: u32,
    /// Hotbar selection; drives what an interaction on soil plants.
    pub selected_item: Option<ItemId>,
    pub speed_buff: Option<SpeedBuff>,
    pub zoom: f32,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            mover: Mover::at(TilePos::new(16, 12)),
            gold: 500,
            selected_item: None,
            speed_buff: None,
            zoom: 1.0,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// INVENTORY
// ═══════════════════════════════════════════════════════════════════════

/// Unique identifier for every item type. String ids keep the tables
/// data-driven.
pub type ItemId = String;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventorySlot {
    pub item_id: ItemId,
    pub quantity: u8,
}

#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct Inventory {
    pub slots: Vec<Option<InventorySlot>>,
}

impl Default for Inventory {
    fn default() -> Self {
        Self {
            slots: vec![None; INVENTORY_SLOTS],
        }
    }
}

impl Inventory {
    /// Try to add an item. Returns the quantity that couldn't fit.
    pub fn try_add(&mut self, item_id: &str, quantity: u8) -> u8 {
        let mut remaining = quantity;

        // First pass: stack onto existing slots with the same item.
        for slot in self.slots.iter_mut() {
            if remaining == 0 {
                break;
            }
            if let Some(ref mut s) = slot {
                if s.item_id == item_id && s.quantity < MAX_STACK {
                    let space = MAX_STACK - s.quantity;
                    let add = remaining.min(space);
                    s.quantity += add;
                    remaining -= add;
                }
            }
        }

        // Second pass: fill empty slots.
        for slot in self.slots.iter_mut() {
            if remaining == 0 {
                break;
            }
            if slot.is_none() {
                let add = remaining.min(MAX_STACK);
                *slot = Some(InventorySlot {
                    item_id: item_id.to_string(),
                    quantity: add,
                });
                remaining -= add;
            }
        }

        remaining
    }

    /// Remove quantity of an item. Returns how many were actually removed.
    pub fn try_remove(&mut self, item_id: &str, quantity: u8) -> u8 {
        let mut remaining = quantity;
        for slot in self.slots.iter_mut() {
            if remaining == 0 {
                break;
            }
            if let Some(ref mut s) = slot {
                if s.item_id == item_id {
                    let remove = remaining.min(s.quantity);
                    s.quantity -= remove;
                    remaining -= remove;
                    if s.quantity == 0 {
                        *slot = None;
                    }
                }
            }
        }
        quantity - remaining
    }

    pub fn count(&self, item_id: &str) -> u32 {
        self.slots
            .iter()
            .filter_map(|s| s.as_ref())
            .filter(|s| s.item_id == item_id)
            .map(|s| s.quantity as u32)
            .sum()
    }

    pub fn has(&self, item_id: &str, quantity: u8) -> bool {
        self.count(item_id) >= quantity as u32
    }
}

// ═══════════════════════════════════════════════════════════════════════
// ITEMS, RECIPES & SHOP
// ═══════════════════════════════════════════════════════════════════════

/// Eating this item restores energy and may grant a timed speed buff.
#[derive(Debug, Clone, Copy)]
pub struct FoodEffect {
    pub energy: f32,
    /// (multiplier, duration in ticks)
    pub speed: Option<(f32, u32)>,
}

#[derive(Debug, Clone)]
pub struct ItemDef {
    pub id: ItemId,
    pub name: String,
    pub buy_price: u32,
    pub sell_price: u32,
    pub food: Option<FoodEffect>,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct ItemRegistry {
    pub items: HashMap<ItemId, ItemDef>,
}

impl ItemRegistry {
    pub fn get(&self, id: &str) -> Option<&ItemDef> {
        self.items.get(id)
    }
}

#[derive(Debug, Clone)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub inputs: Vec<(ItemId, u8)>,
    pub output: ItemId,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct RecipeBook {
    pub recipes: Vec<Recipe>,
}

impl RecipeBook {
    pub fn get(&self, id: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.id == id)
    }
}

/// What the general store carries. Items not listed can't be bought.
#[derive(Resource, Debug, Clone, Default)]
pub struct ShopStock {
    pub items: Vec<ItemId>,
}

impl ShopStock {
    pub fn carries(&self, id: &str) -> bool {
        self.items.iter().any(|i| i == id)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CROPS
// ═══════════════════════════════════════════════════════════════════════

/// The 3-way harvest policy branch: the crop economy's core tunable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CropClass {
    /// Never deleted; resets to its regrow stage on harvest.
    Tree { regrow_stage: f32 },
    /// Field crop that resets to a configured stage after each harvest.
    Regrow { regrow_stage: f32 },
    /// Deleted on harvest; chance of refunding one seed; the backing
    /// tile reverts to soil.
    Single { seed_refund_chance: f32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropDef {
    pub id: ItemId,
    pub name: String,
    pub seed_id: ItemId,
    pub harvest_id: ItemId,
    /// Growth-stage points added per simulation tick.
    pub growth_rate: f32,
    pub class: CropClass,
    /// Trellised crops block movement even though they are not trees.
    pub trellis: bool,
    pub seasons: Vec<Season>,
    pub sell_price: u32,
}

impl CropDef {
    /// Trees and trellised crops are solid for collision purposes.
    pub fn blocks_movement(&self) -> bool {
        self.trellis || matches!(self.class, CropClass::Tree { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crop {
    pub kind: ItemId,
    /// 0..100 progress; accumulates past 100 until harvested.
    pub stage: f32,
    pub withered: bool,
}

impl Crop {
    pub fn is_harvestable(&self) -> bool {
        self.stage >= MATURE_STAGE
    }
}

/// Sparse crop ledger for the overworld field, keyed by tile.
///
/// Flattened to a pair list by the persistence gateway, same as
/// [`ResourceLedger`].
#[derive(Resource, Debug, Clone, Default)]
pub struct CropLedger {
    pub crops: HashMap<TilePos, Crop>,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct CropRegistry {
    pub crops: HashMap<ItemId, CropDef>,
}

impl CropRegistry {
    pub fn get(&self, id: &str) -> Option<&CropDef> {
        self.crops.get(id)
    }

    pub fn by_seed(&self, seed_id: &str) -> Option<&CropDef> {
        self.crops.values().find(|c| c.seed_id == seed_id)
    }

    pub fn by_harvest(&self, harvest_id: &str) -> Option<&CropDef> {
        self.crops.values().find(|c| c.harvest_id == harvest_id)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// RESOURCE NODES
// ═══════════════════════════════════════════════════════════════════════

/// Static behavior for a resource node class.
#[derive(Debug, Clone)]
pub struct NodeDef {
    pub kind: NodeKind,
    /// Hits required to deplete a fresh node.
    pub toughness: u32,
    /// Energy charged per swing.
    pub energy_cost: f32,
    /// Granted in full, exactly once, on depletion.
    pub loot: Vec<(ItemId, u8)>,
}

/// Per-tile remaining hit counts, keyed by map + position. An absent key
/// means the node is untouched (full toughness). Entries are created
/// lazily on first hit and deleted on depletion.
///
/// Not serialized directly — the persistence gateway flattens it to a
/// pair list because JSON object keys must be strings.
#[derive(Resource, Debug, Clone, Default)]
pub struct ResourceLedger {
    pub durability: HashMap<(MapKey, TilePos), u32>,
}

impl ResourceLedger {
    pub fn get(&self, map: MapKey, pos: TilePos) -> Option<u32> {
        self.durability.get(&(map, pos)).copied()
    }

    pub fn set(&mut self, map: MapKey, pos: TilePos, value: u32) {
        self.durability.insert((map, pos), value);
    }

    pub fn remove(&mut self, map: MapKey, pos: TilePos) {
        self.durability.remove(&(map, pos));
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct NodeRegistry {
    pub nodes: HashMap<NodeKind, NodeDef>,
}

impl NodeRegistry {
    pub fn get(&self, kind: NodeKind) -> Option<&NodeDef> {
        self.nodes.get(&kind)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// BUILDINGS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingKind {
    House,
    Barn,
    Coop,
    Silo,
}

/// Static footprint/capacity/cost per building kind.
#[derive(Debug, Clone)]
pub struct BuildingDef {
    pub kind: BuildingKind,
    pub width: i32,
    pub height: i32,
    pub capacity: u32,
    pub gold_cost: u32,
    pub material_costs: Vec<(ItemId, u8)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    pub id: u32,
    pub kind: BuildingKind,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub animals: Vec<u32>,
    pub capacity: u32,
    pub stored: u32,
}

impl Building {
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// Placed buildings on the overworld. Footprints never overlap — enforced
/// at placement time by requiring every target tile be plain grass.
#[derive(Resource, Debug, Clone, Serialize, Deserialize, Default)]
pub struct BuildingLedger {
    pub buildings: Vec<Building>,
    pub next_id: u32,
}

impl BuildingLedger {
    pub fn building_at(&self, x: i32, y: i32) -> Option<&Building> {
        self.buildings.iter().find(|b| b.contains(x, y))
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct BuildingCatalog {
    pub defs: HashMap<BuildingKind, BuildingDef>,
}

impl BuildingCatalog {
    pub fn get(&self, kind: BuildingKind) -> Option<&BuildingDef> {
        self.defs.get(&kind)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// ANIMALS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimalKind {
    Chicken,
    Cow,
    Sheep,
}

impl AnimalKind {
    pub fn product(self) -> &'static str {
        match self {
            AnimalKind::Chicken => "egg",
            AnimalKind::Cow => "milk",
            AnimalKind::Sheep => "wool",
        }
    }

    /// Which building kind houses this animal.
    pub fn home_building(self) -> BuildingKind {
        match self {
            AnimalKind::Chicken => BuildingKind::Coop,
            AnimalKind::Cow | AnimalKind::Sheep => BuildingKind::Barn,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Animal {
    pub id: u32,
    pub kind: AnimalKind,
    pub name: String,
    pub home: TilePos,
    pub friendship: i32,
    pub hunger: u8,
    pub was_fed_today: bool,
    pub produced_today: bool,
}

#[derive(Resource, Debug, Clone, Serialize, Deserialize, Default)]
pub struct Herd {
    pub animals: Vec<Animal>,
    pub next_id: u32,
}

// ═══════════════════════════════════════════════════════════════════════
// NPCs & CREEPS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Npc {
    pub name: String,
    pub mover: Mover,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CreepKind {
    Slime,
    Bat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Creep {
    pub kind: CreepKind,
    pub mover: Mover,
    pub health: u32,
}

// ═══════════════════════════════════════════════════════════════════════
// QUEST FLAGS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Resource, Debug, Clone, Serialize, Deserialize, Default)]
pub struct QuestFlags {
    pub flags: HashMap<String, bool>,
}

impl QuestFlags {
    pub fn set(&mut self, key: &str) {
        self.flags.insert(key.to_string(), true);
    }

    pub fn is_set(&self, key: &str) -> bool {
        self.flags.get(key).copied().unwrap_or(false)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// ACTION ERRORS — the non-fatal failure taxonomy
// ═══════════════════════════════════════════════════════════════════════

/// Every mutation entry point reports failure through this enum. Nothing
/// here aborts the tick; every failure path leaves world state exactly as
/// it was before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionError {
    /// Footprint occupied or not plain grass.
    InvalidPlacement,
    /// Energy budget too low; action aborted before any side effect.
    InsufficientEnergy,
    /// Building or recipe cost not met.
    InsufficientResources,
    /// Destination solid; position unchanged, facing still updates.
    BlockedMovement,
    /// Requested dungeon floor beyond the maximum.
    FloorOutOfRange,
}

impl ActionError {
    pub fn message(self) -> &'static str {
        match self {
            ActionError::InvalidPlacement => "Can't build there.",
            ActionError::InsufficientEnergy => "Too tired for that.",
            ActionError::InsufficientResources => "Not enough materials.",
            ActionError::BlockedMovement => "The way is blocked.",
            ActionError::FloorOutOfRange => "The shaft goes no deeper.",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS — cross-domain communication
// ═══════════════════════════════════════════════════════════════════════

/// Fired after the clock fully applies a day rollover. Crop growth and
/// animal resets read the already-updated season/weather/energy.
#[derive(Event, Debug, Clone)]
pub struct NewDayEvent {
    pub day_count: u32,
    pub season: Season,
    pub weather: Weather,
}

#[derive(Event, Debug, Clone)]
pub struct SeasonChangeEvent {
    pub new_season: Season,
}

/// Directional move intent from the input collaborator.
#[derive(Event, Debug, Clone)]
pub struct MoveIntentEvent {
    pub dx: i32,
    pub dy: i32,
}

/// Absolute tile-click from the input collaborator; sets a click-to-move
/// destination.
#[derive(Event, Debug, Clone)]
pub struct ClickMoveEvent {
    pub target: TilePos,
}

/// The single "action" trigger aimed at a tile.
#[derive(Event, Debug, Clone)]
pub struct InteractEvent {
    pub x: i32,
    pub y: i32,
}

/// Sent after the current map changes (transition, floor change, load).
#[derive(Event, Debug, Clone)]
pub struct MapChangedEvent {
    pub key: MapKey,
}

/// The player tried to step past the map boundary. The router decides
/// whether that edge leads somewhere; otherwise the move just stays
/// blocked.
#[derive(Event, Debug, Clone)]
pub struct EdgeExitEvent {
    pub dx: i32,
    pub dy: i32,
}

/// Request to move to an absolute dungeon depth. Zero (or below) means
/// "climb out to the overworld".
#[derive(Event, Debug, Clone)]
pub struct ChangeFloorEvent {
    pub floor: i32,
}

/// The player activated a building's door; the router swaps in the
/// interior map.
#[derive(Event, Debug, Clone)]
pub struct EnterBuildingEvent {
    pub kind: BuildingKind,
}

/// Plant the currently selected seed on a soil tile.
#[derive(Event, Debug, Clone)]
pub struct PlantEvent {
    pub pos: TilePos,
}

/// Harvest the mature crop on a tile.
#[derive(Event, Debug, Clone)]
pub struct HarvestEvent {
    pub pos: TilePos,
}

/// Swing at a resource node tile.
#[derive(Event, Debug, Clone)]
pub struct HitResourceEvent {
    pub pos: TilePos,
}

/// Place a building with its top-left corner at (x, y).
#[derive(Event, Debug, Clone)]
pub struct PlaceBuildingEvent {
    pub kind: BuildingKind,
    pub x: i32,
    pub y: i32,
}

/// Demolish the building covering (x, y).
#[derive(Event, Debug, Clone)]
pub struct RemoveBuildingEvent {
    pub x: i32,
    pub y: i32,
}

/// The player activated an animal's stall tile inside a barn or coop.
#[derive(Event, Debug, Clone)]
pub struct AnimalInteractEvent {
    pub pos: TilePos,
}

/// Purchase request from the shop collaborator.
#[derive(Event, Debug, Clone)]
pub struct BuyAnimalEvent {
    pub kind: AnimalKind,
}

#[derive(Event, Debug, Clone)]
pub struct BuyItemEvent {
    pub item_id: ItemId,
    pub quantity: u8,
}

#[derive(Event, Debug, Clone)]
pub struct SellItemEvent {
    pub item_id: ItemId,
    pub quantity: u8,
}

#[derive(Event, Debug, Clone)]
pub struct CookEvent {
    pub recipe_id: String,
}

#[derive(Event, Debug, Clone)]
pub struct EatFoodEvent {
    pub item_id: ItemId,
}

/// Any state-mutating interaction fires this; the persistence gateway
/// listens and writes synchronously.
#[derive(Event, Debug, Clone)]
pub struct WorldMutatedEvent;

/// User-facing feedback line (failure messages, pickups, notices).
#[derive(Event, Debug, Clone)]
pub struct FeedbackEvent {
    pub message: String,
}

#[derive(Event, Debug, Clone)]
pub struct ItemGainedEvent {
    pub item_id: ItemId,
    pub quantity: u8,
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const TILE_SIZE: f32 = 16.0;

/// Simulation ticks per in-game day.
pub const DAY_LENGTH_TICKS: u32 = 1200;
pub const DAYS_PER_SEASON: u32 = 28;
pub const DAY_START_HOUR: f32 = 6.0;
pub const DAY_ACTIVE_HOURS: f32 = 20.0;

pub const MAX_ENERGY: f32 = 100.0;
pub const MATURE_STAGE: f32 = 100.0;

pub const INVENTORY_SLOTS: usize = 36;
pub const MAX_STACK: u8 = 99;

pub const BASE_MOVE_SPEED: f32 = 80.0;

pub const MAX_DUNGEON_FLOOR: u8 = 30;

/// Row of trough tiles inside barn and coop interiors. Stall positions
/// are assigned along this row, so interactions land on trough tiles.
pub const STALL_ROW: i32 = 1;
pub const STALL_X0: i32 = 2;

/// Seconds between interval autosaves while the simulation is active.
pub const AUTOSAVE_INTERVAL_SECS: f32 = 60.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_out_of_bounds_reads_wall() {
        let grid = TileGrid::filled(4, 4, TileKind::Grass);
        assert_eq!(grid.get(-1, 0), TileKind::Wall);
        assert_eq!(grid.get(0, -1), TileKind::Wall);
        assert_eq!(grid.get(4, 0), TileKind::Wall);
        assert_eq!(grid.get(0, 4), TileKind::Wall);
        assert_eq!(grid.get(2, 2), TileKind::Grass);
    }

    #[test]
    fn test_grid_set_out_of_bounds_is_noop() {
        let mut grid = TileGrid::filled(4, 4, TileKind::Grass);
        grid.set(-1, 2, TileKind::Water);
        grid.set(9, 9, TileKind::Water);
        assert!(grid.tiles.iter().all(|t| *t == TileKind::Grass));
    }

    #[test]
    fn test_consume_energy_gate() {
        let mut clock = TimeCycle::default();
        clock.energy = 10.0;

        assert!(!clock.consume_energy(11.0));
        assert_eq!(clock.energy, 10.0);

        assert!(clock.consume_energy(4.0));
        assert_eq!(clock.energy, 6.0);
    }

    #[test]
    fn test_hour_of_day_window() {
        let mut clock = TimeCycle::default();
        clock.day_time = 0;
        assert!((clock.hour_of_day() - DAY_START_HOUR).abs() < 0.001);

        clock.day_time = clock.day_length / 2;
        let expected = DAY_START_HOUR + DAY_ACTIVE_HOURS / 2.0;
        assert!((clock.hour_of_day() - expected).abs() < 0.05);
    }

    #[test]
    fn test_season_from_index_wraps() {
        assert_eq!(Season::from_index(0), Season::Spring);
        assert_eq!(Season::from_index(1), Season::Summer);
        assert_eq!(Season::from_index(2), Season::Fall);
        assert_eq!(Season::from_index(3), Season::Winter);
        assert_eq!(Season::from_index(4), Season::Spring);
    }

    #[test]
    fn test_inventory_stacking() {
        let mut inv = Inventory::default();
        assert_eq!(inv.try_add("wood", 50), 0);
        assert_eq!(inv.try_add("wood", 60), 0);
        assert_eq!(inv.count("wood"), 110);

        // 110 = one full stack of 99 plus 11 in a second slot.
        let stacks: Vec<u8> = inv
            .slots
            .iter()
            .filter_map(|s| s.as_ref())
            .map(|s| s.quantity)
            .collect();
        assert_eq!(stacks, vec![99, 11]);
    }

    #[test]
    fn test_inventory_remove_partial() {
        let mut inv = Inventory::default();
        inv.try_add("stone", 10);
        assert_eq!(inv.try_remove("stone", 15), 10);
        assert_eq!(inv.count("stone"), 0);
    }

    #[test]
    fn test_building_contains() {
        let b = Building {
            id: 1,
            kind: BuildingKind::Barn,
            x: 10,
            y: 10,
            width: 3,
            height: 3,
            animals: vec![],
            capacity: 4,
            stored: 0,
        };
        assert!(b.contains(10, 10));
        assert!(b.contains(12, 12));
        assert!(!b.contains(13, 10));
        assert!(!b.contains(9, 10));
    }

    #[test]
    fn test_crop_harvestable_threshold() {
        let mut crop = Crop {
            kind: "turnip".into(),
            stage: 99.9,
            withered: false,
        };
        assert!(!crop.is_harvestable());
        crop.stage = 100.0;
        assert!(crop.is_harvestable());
        crop.stage = 130.0;
        assert!(crop.is_harvestable());
    }

    #[test]
    fn test_tile_props_solidity() {
        assert!(TileKind::Water.is_solid_terrain());
        assert!(TileKind::Tree.is_solid_terrain());
        assert!(TileKind::OreVein.is_solid_terrain());
        assert!(TileKind::Building.is_solid_terrain());
        assert!(!TileKind::Grass.is_solid_terrain());
        assert!(!TileKind::Soil.is_solid_terrain());
        assert!(!TileKind::Road.is_solid_terrain());
    }

    #[test]
    fn test_node_lookup_through_props() {
        assert_eq!(TileKind::Tree.node(), Some(NodeKind::Tree));
        assert_eq!(TileKind::Rock.node(), Some(NodeKind::Rock));
        assert_eq!(TileKind::OreVein.node(), Some(NodeKind::OreVein));
        assert_eq!(TileKind::Grass.node(), None);
    }

    #[test]
    fn test_resource_ledger_sparse_semantics() {
        let mut ledger = ResourceLedger::default();
        let pos = TilePos::new(3, 4);
        assert_eq!(ledger.get(MapKey::Overworld, pos), None);

        ledger.set(MapKey::Overworld, pos, 2);
        assert_eq!(ledger.get(MapKey::Overworld, pos), Some(2));
        // Same position on a different map is independent.
        assert_eq!(ledger.get(MapKey::Dungeon(1), pos), None);

        ledger.remove(MapKey::Overworld, pos);
        assert_eq!(ledger.get(MapKey::Overworld, pos), None);
    }
}
