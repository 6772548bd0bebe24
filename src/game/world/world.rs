// The world context: registries, map, player, effects and collaborators

use super::collection::{CollectionChange, EntityCollection, Shared};
use super::map::TileMap;
use super::services::{ContainerLookup, EntityLocator, OpenTerrain, Pathfinder, WalkRequestSender};
use crate::core::{Direction, Position, Serial, TileCoord};
use crate::engine::assets::{EntityHandle, Handle, ResourceProvider};
use crate::engine::config::Settings;
use crate::game::effects::{EffectContext, EffectManager, EffectRequest, GameEffect};
use crate::game::mobiles::{
    EquippedItem, Mobile, MovementSpeed, PlayerMobile, StandardMovementSpeed, TickContext,
    WalkContext,
};
use crate::game::objects::{EntityChange, GameObject, House, Item, Layer, Static};
use crate::game::WorldError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Generation reported for the player, who lives outside the collections
const PLAYER_GENERATION: u32 = 0;

/// Observable outcome of `World::process_delta`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorldEvent {
    Items(CollectionChange),
    Mobiles(CollectionChange),
    Changed { serial: Serial, change: EntityChange },
}

/// Read-only view of the registries, used as effect locator and container lookup
struct Registry<'a> {
    items: &'a EntityCollection<Item>,
    mobiles: &'a EntityCollection<Mobile>,
    player: Option<&'a PlayerMobile>,
}

impl EntityLocator for Registry<'_> {
    fn handle_of(&self, serial: Serial) -> Option<EntityHandle> {
        if let Some(player) = self.player.filter(|p| p.serial() == serial) {
            return Some(EntityHandle {
                serial: player.serial(),
                generation: PLAYER_GENERATION,
            });
        }

        if serial.is_mobile() {
            self.mobiles.handle(serial).map(|h| h.erase())
        } else {
            self.items.handle(serial).map(|h| h.erase())
        }
    }

    fn locate(&self, handle: EntityHandle) -> Option<Position> {
        if let Some(player) = self.player.filter(|p| p.serial() == handle.serial) {
            return Some(player.position());
        }

        let located = if handle.serial.is_mobile() {
            self.mobiles
                .resolve(Handle::new(handle.serial, handle.generation))
                .map(|mobile| mobile.read().position())
        } else {
            self.items
                .resolve(Handle::new(handle.serial, handle.generation))
                .map(|item| item.read().entity.position())
        };

        match located {
            Ok(position) => Some(position),
            Err(err @ WorldError::StaleHandle(_)) => {
                log::warn!("effect endpoint: {}", err);
                None
            }
            Err(_) => None,
        }
    }
}

impl ContainerLookup for Registry<'_> {
    fn container_of(&self, item: Serial) -> Option<Serial> {
        self.items
            .get(item)
            .map(|item| item.read_recursive().container())
    }
}

/// Locator used while an item is locked for its own update
struct SelfFirst<'a> {
    serial: Serial,
    position: Position,
    registry: &'a Registry<'a>,
}

impl EntityLocator for SelfFirst<'_> {
    fn handle_of(&self, serial: Serial) -> Option<EntityHandle> {
        self.registry.handle_of(serial)
    }

    fn locate(&self, handle: EntityHandle) -> Option<Position> {
        if handle.serial == self.serial {
            return Some(self.position);
        }
        self.registry.locate(handle)
    }
}

/// Everything the client knows about the game world.
///
/// Owns the item and mobile registries, the local player, the tile map,
/// live effects and the collaborators that movement and effects call out
/// to. A single simulation thread drives `update` and `process_delta`;
/// the registries tolerate concurrent readers.
pub struct World {
    items: EntityCollection<Item>,
    mobiles: EntityCollection<Mobile>,
    player: Option<PlayerMobile>,
    map: TileMap,
    effects: EffectManager,
    houses: HashMap<Serial, House>,
    ticks: u64,
    settings: Settings,
    resources: Box<dyn ResourceProvider>,
    pathfinder: Box<dyn Pathfinder>,
    sender: Box<dyn WalkRequestSender>,
    speed: Box<dyn MovementSpeed>,
}

impl World {
    pub fn new(
        settings: Settings,
        resources: Box<dyn ResourceProvider>,
        sender: Box<dyn WalkRequestSender>,
    ) -> Self {
        Self {
            items: EntityCollection::new(),
            mobiles: EntityCollection::new(),
            player: None,
            map: TileMap::new(0),
            effects: EffectManager::new(),
            houses: HashMap::new(),
            ticks: 0,
            settings,
            resources,
            pathfinder: Box::new(OpenTerrain),
            sender,
            speed: Box::new(StandardMovementSpeed),
        }
    }

    pub fn with_pathfinder(mut self, pathfinder: Box<dyn Pathfinder>) -> Self {
        self.pathfinder = pathfinder;
        self
    }

    pub fn with_movement_speed(mut self, speed: Box<dyn MovementSpeed>) -> Self {
        self.speed = speed;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn items(&self) -> &EntityCollection<Item> {
        &self.items
    }

    pub fn mobiles(&self) -> &EntityCollection<Mobile> {
        &self.mobiles
    }

    pub fn map(&self) -> &TileMap {
        &self.map
    }

    pub fn effects(&self) -> &EffectManager {
        &self.effects
    }

    pub fn house(&self, serial: Serial) -> Option<&House> {
        self.houses.get(&serial)
    }

    pub fn houses(&self) -> impl Iterator<Item = &House> {
        self.houses.values()
    }

    fn registry(&self) -> Registry<'_> {
        Registry {
            items: &self.items,
            mobiles: &self.mobiles,
            player: self.player.as_ref(),
        }
    }

    // ---- player ----

    /// Create the local player and place it on the map
    pub fn set_player(&mut self, serial: Serial, position: Position, direction: Direction) -> &mut PlayerMobile {
        if let Some(mobile) = self.mobiles.remove(serial) {
            let mut mobile = mobile.write();
            detach(&mut self.map, &mut mobile.entity.object, serial);
        }
        if let Some(mut previous) = self.player.take() {
            let previous_serial = previous.serial();
            detach(&mut self.map, &mut previous.mobile.entity.object, previous_serial);
            previous.mobile.dispose();
        }

        let mut player = PlayerMobile::new(serial, self.settings.movement_mode);
        player.mobile.entity.set_position(position);
        player.mobile.entity.set_direction(direction);
        attach(&mut self.map, &mut player.mobile.entity.object, serial, position.tile());
        log::info!("Player {} entered the world at {}", serial, position);

        self.player.insert(player)
    }

    pub fn player(&self) -> Option<&PlayerMobile> {
        self.player.as_ref()
    }

    pub fn player_mut(&mut self) -> Option<&mut PlayerMobile> {
        self.player.as_mut()
    }

    fn is_player(&self, serial: Serial) -> bool {
        self.player.as_ref().is_some_and(|p| p.serial() == serial)
    }

    /// Ask to move the player one step
    pub fn walk(&mut self, direction: Direction, run: bool) -> bool {
        let Some(player) = self.player.as_mut() else {
            return false;
        };

        let mut ctx = WalkContext {
            now: self.ticks,
            pathfinder: self.pathfinder.as_ref(),
            sender: self.sender.as_mut(),
            speed: self.speed.as_ref(),
            animations: self.resources.animations(),
        };
        player.walk(direction, run || self.settings.always_run, &mut ctx)
    }

    pub fn confirm_walk(&mut self, seq: u8) {
        if let Some(player) = self.player.as_mut() {
            player.confirm_walk(seq, self.sender.as_mut());
        }
    }

    pub fn deny_walk(&mut self, seq: u8, direction: Direction, position: Position) {
        if let Some(player) = self.player.as_mut() {
            player.deny_walk(seq, direction, position, self.sender.as_mut());
        }
    }

    // ---- registries ----

    /// Register an item, placing it on the map when it lies on the ground
    pub fn add_item(&mut self, mut item: Item) -> bool {
        let serial = item.serial();
        if self.items.contains(serial) {
            return false;
        }

        item.entity.object.set_map_index(self.map.index());
        if item.on_ground() {
            let coord = item.entity.position().tile();
            attach(&mut self.map, &mut item.entity.object, serial, coord);
        }

        let container = item.container();
        let shared = Arc::new(RwLock::new(item));
        if !self.items.insert_shared(Arc::clone(&shared)) {
            return false;
        }
        self.link_container(serial, container, &shared);
        true
    }

    /// Register a mobile and place it on the map
    pub fn add_mobile(&mut self, mut mobile: Mobile) -> bool {
        let serial = mobile.serial();
        if self.mobiles.contains(serial) || self.is_player(serial) {
            return false;
        }

        mobile.entity.object.set_map_index(self.map.index());
        let coord = mobile.position().tile();
        attach(&mut self.map, &mut mobile.entity.object, serial, coord);
        self.mobiles.add(mobile)
    }

    pub fn item(&self, serial: Serial) -> Option<Shared<Item>> {
        self.items.get(serial)
    }

    pub fn mobile(&self, serial: Serial) -> Option<Shared<Mobile>> {
        self.mobiles.get(serial)
    }

    /// Remove an item, everything inside it and its house
    pub fn remove_item(&mut self, serial: Serial) -> bool {
        let Some(shared) = self.items.remove(serial) else {
            return false;
        };

        let (container, layer) = {
            let mut item = shared.write();
            detach(&mut self.map, &mut item.entity.object, serial);
            item.dispose();
            (item.container(), item.layer())
        };

        self.unlink_container(serial, container);
        if container.is_mobile() && layer != Layer::Invalid {
            self.with_mobile(container, |mobile| {
                mobile.unequip_serial(serial);
            });
        }

        if self.houses.remove(&serial).is_some() {
            log::debug!("House {} removed", serial);
        }

        for child in self.contents_of(serial) {
            self.remove_item(child);
        }
        true
    }

    /// Remove a mobile and the items it holds
    pub fn remove_mobile(&mut self, serial: Serial) -> bool {
        let Some(shared) = self.mobiles.remove(serial) else {
            return false;
        };

        {
            let mut mobile = shared.write();
            detach(&mut self.map, &mut mobile.entity.object, serial);
            mobile.dispose();
        }

        for child in self.contents_of(serial) {
            self.remove_item(child);
        }
        true
    }

    /// Items whose container is `serial`
    fn contents_of(&self, serial: Serial) -> Vec<Serial> {
        self.items
            .values()
            .into_iter()
            .filter_map(|item| {
                let item = item.read();
                (item.container() == serial).then(|| item.serial())
            })
            .collect()
    }

    /// Run `f` on the held-items collection of a container
    fn with_contents<R>(&self, container: Serial, f: impl FnOnce(&EntityCollection<Item>) -> R) -> Option<R> {
        if let Some(player) = self.player.as_ref().filter(|p| p.serial() == container) {
            return Some(f(player.mobile.entity.items()));
        }
        if container.is_mobile() {
            self.mobiles
                .get(container)
                .map(|mobile| f(mobile.read().entity.items()))
        } else if container.is_item() {
            self.items.get(container).map(|item| f(item.read().entity.items()))
        } else {
            None
        }
    }

    fn link_container(&self, serial: Serial, container: Serial, shared: &Shared<Item>) {
        if container == serial {
            return;
        }
        self.with_contents(container, |items| items.insert_shared(Arc::clone(shared)));
    }

    fn unlink_container(&self, serial: Serial, container: Serial) {
        if container == serial {
            return;
        }
        self.with_contents(container, |items| items.remove(serial));
    }

    /// Run `f` on a mobile or the player
    fn with_mobile<R>(&mut self, serial: Serial, f: impl FnOnce(&mut Mobile) -> R) -> Option<R> {
        if let Some(player) = self.player.as_mut().filter(|p| p.serial() == serial) {
            return Some(f(&mut player.mobile));
        }
        self.mobiles.get(serial).map(|mobile| f(&mut mobile.write()))
    }

    /// Move an object to a map cell.
    ///
    /// `None` removes a non-player object from the world; the player only
    /// leaves its cell. Returns false for unknown serials.
    pub fn set_tile(&mut self, serial: Serial, tile: Option<TileCoord>) -> bool {
        match tile {
            Some(coord) => {
                let map = &mut self.map;
                if let Some(player) = self.player.as_mut().filter(|p| p.serial() == serial) {
                    attach(map, &mut player.mobile.entity.object, serial, coord);
                    return true;
                }
                if let Some(mobile) = self.mobiles.get(serial) {
                    attach(map, &mut mobile.write().entity.object, serial, coord);
                    return true;
                }
                if let Some(item) = self.items.get(serial) {
                    attach(map, &mut item.write().entity.object, serial, coord);
                    return true;
                }
                false
            }
            None => {
                if let Some(player) = self.player.as_mut().filter(|p| p.serial() == serial) {
                    detach(&mut self.map, &mut player.mobile.entity.object, serial);
                    return true;
                }
                if serial.is_mobile() {
                    self.remove_mobile(serial)
                } else {
                    self.remove_item(serial)
                }
            }
        }
    }

    /// Put an item in a mobile's equipment slot
    pub fn equip(&mut self, item_serial: Serial, mobile_serial: Serial, layer: Layer) -> Result<(), WorldError> {
        if !self.is_player(mobile_serial) && !self.mobiles.contains(mobile_serial) {
            return Err(WorldError::UnknownEntity(mobile_serial));
        }
        let shared = self
            .items
            .get(item_serial)
            .ok_or(WorldError::UnknownEntity(item_serial))?;

        let (graphic, previous_container) = {
            let mut item = shared.write();
            let previous_container = item.container();
            detach(&mut self.map, &mut item.entity.object, item_serial);
            item.set_container(mobile_serial);
            item.set_layer(layer);
            (item.graphic(), previous_container)
        };

        if previous_container != mobile_serial {
            self.unlink_container(item_serial, previous_container);
            self.link_container(item_serial, mobile_serial, &shared);
        }

        let equipped = EquippedItem::new(item_serial, graphic);
        self.with_mobile(mobile_serial, |mobile| {
            if let Some(previous) = mobile.equip(layer, equipped) {
                log::debug!("{} replaced {} on {:?}", mobile_serial, previous.serial, layer);
            }
        });

        if let Some(player) = self.player.as_mut().filter(|p| p.serial() == mobile_serial) {
            player.update_abilities();
        }
        Ok(())
    }

    /// Outermost holder of an item
    pub fn root_container(&self, serial: Serial) -> Result<Serial, WorldError> {
        let item = self.items.get(serial).ok_or(WorldError::UnknownEntity(serial))?;
        let item = item.read();
        item.root_container(&self.registry())
    }

    /// Toggle the multi layout of an item and keep the house registry in step
    pub fn set_multi(&mut self, serial: Serial, value: bool) -> Result<bool, WorldError> {
        let shared = self.items.get(serial).ok_or(WorldError::UnknownEntity(serial))?;
        let mut item = shared.write();

        let built = item.set_multi(value, self.resources.multis());
        match item.multi() {
            Some(multi) if built => {
                let house = House::from_multi(serial, item.entity.position(), multi);
                log::debug!("House {} with {} components", serial, house.components.len());
                self.houses.insert(serial, house);
            }
            None => {
                self.houses.remove(&serial);
            }
            _ => {}
        }
        Ok(built)
    }

    /// Show floating text above an object for the configured lifetime
    pub fn add_overhead(&mut self, serial: Serial, text: &str, hue: u16) -> bool {
        let expires_at = self.ticks + self.settings.overhead_ttl_ms;
        let max = self.settings.max_overheads;
        let add = |object: &mut GameObject| object.add_overhead(text, hue, expires_at, max);

        if let Some(player) = self.player.as_mut().filter(|p| p.serial() == serial) {
            add(&mut player.mobile.entity.object);
            return true;
        }
        if let Some(mobile) = self.mobiles.get(serial) {
            add(&mut mobile.write().entity.object);
            return true;
        }
        if let Some(item) = self.items.get(serial) {
            add(&mut item.write().entity.object);
            return true;
        }
        false
    }

    // ---- map art ----

    pub fn set_land(&mut self, graphic: u16, position: Position) {
        self.map.set_land(graphic, position);
    }

    pub fn add_static(&mut self, art: Static) {
        self.map.add_static(art);
    }

    // ---- effects ----

    /// Play a server-requested effect
    pub fn spawn_effect(&mut self, request: &EffectRequest) -> bool {
        let registry = Registry {
            items: &self.items,
            mobiles: &self.mobiles,
            player: self.player.as_ref(),
        };
        self.effects.spawn(request, self.ticks, &registry)
    }

    pub fn add_effect(&mut self, effect: GameEffect) {
        self.effects.add(effect);
    }

    // ---- simulation ----

    /// Advance every object to `total_ms`
    pub fn update(&mut self, total_ms: u64, frame_ms: u64) {
        self.ticks = total_ms;

        let tick = TickContext {
            animations: self.resources.animations(),
            speed: self.speed.as_ref(),
            smooth_movement: self.settings.smooth_movement,
        };

        for mobile in self.mobiles.values() {
            mobile.write().update(total_ms, frame_ms, &tick);
        }
        if let Some(player) = self.player.as_mut() {
            player.update(total_ms, frame_ms, &tick);
        }

        let registry = Registry {
            items: &self.items,
            mobiles: &self.mobiles,
            player: self.player.as_ref(),
        };

        let mut promoted = Vec::new();
        for item in self.items.values() {
            let mut item = item.write();
            let locator = SelfFirst {
                serial: item.serial(),
                position: item.entity.position(),
                registry: &registry,
            };
            let effects = EffectContext {
                locator: &locator,
                data: self.resources.effects(),
            };
            promoted.extend(item.update(total_ms, frame_ms, self.resources.animations(), &effects));
        }

        let effects = EffectContext {
            locator: &registry,
            data: self.resources.effects(),
        };
        self.effects.update(total_ms, frame_ms, &effects);

        // Children of finished item effects start on the next tick
        for child in promoted {
            self.effects.add(child);
        }
    }

    /// Flush membership and entity changes, keeping the map in step with positions
    pub fn process_delta(&mut self) -> Vec<WorldEvent> {
        let mut events: Vec<WorldEvent> = Vec::new();
        events.extend(self.items.process_delta().into_iter().map(WorldEvent::Items));
        events.extend(self.mobiles.process_delta().into_iter().map(WorldEvent::Mobiles));

        if let Some(player) = self.player.as_mut() {
            let serial = player.serial();
            player.process_delta();
            let changes = player.mobile.entity.take_changes();
            if changes.contains(&EntityChange::Position) {
                let coord = player.position().tile();
                attach(&mut self.map, &mut player.mobile.entity.object, serial, coord);
            }
            push_changes(&mut events, serial, changes);
        }

        for mobile in self.mobiles.values() {
            let mut mobile = mobile.write();
            let serial = mobile.serial();
            mobile.entity.process_delta();
            let changes = mobile.entity.take_changes();
            if changes.contains(&EntityChange::Position) {
                let coord = mobile.position().tile();
                attach(&mut self.map, &mut mobile.entity.object, serial, coord);
            }
            push_changes(&mut events, serial, changes);
        }

        for item in self.items.values() {
            let mut item = item.write();
            let serial = item.serial();
            item.entity.process_delta();
            let changes = item.entity.take_changes();
            if changes.contains(&EntityChange::Position) || changes.contains(&EntityChange::Ownership) {
                if item.on_ground() {
                    let coord = item.entity.position().tile();
                    attach(&mut self.map, &mut item.entity.object, serial, coord);
                } else {
                    detach(&mut self.map, &mut item.entity.object, serial);
                }
            }
            push_changes(&mut events, serial, changes);
        }

        events
    }

    /// Forget everything, as on logout
    pub fn clear(&mut self) {
        for item in self.items.clear() {
            item.write().dispose();
        }
        for mobile in self.mobiles.clear() {
            mobile.write().dispose();
        }
        if let Some(mut player) = self.player.take() {
            player.mobile.dispose();
        }

        self.map.clear();
        self.effects.clear();
        self.houses.clear();
        log::info!("World cleared");
    }
}

impl EntityLocator for World {
    fn handle_of(&self, serial: Serial) -> Option<EntityHandle> {
        self.registry().handle_of(serial)
    }

    fn locate(&self, handle: EntityHandle) -> Option<Position> {
        self.registry().locate(handle)
    }
}

impl ContainerLookup for World {
    fn container_of(&self, item: Serial) -> Option<Serial> {
        self.registry().container_of(item)
    }
}

/// Move an object onto a cell, leaving its previous one
fn attach(map: &mut TileMap, object: &mut GameObject, serial: Serial, coord: TileCoord) {
    if object.tile() == Some(coord) {
        return;
    }
    if let Some(old) = object.tile() {
        map.remove_entity(old, serial);
    }
    map.insert_entity(coord, serial);
    object.set_tile(Some(coord));
}

/// Take an object off the map without disposing it
fn detach(map: &mut TileMap, object: &mut GameObject, serial: Serial) {
    if let Some(old) = object.tile() {
        map.remove_entity(old, serial);
        object.set_tile(None);
    }
}

fn push_changes(events: &mut Vec<WorldEvent>, serial: Serial, changes: Vec<EntityChange>) {
    events.extend(
        changes
            .into_iter()
            .map(|change| WorldEvent::Changed { serial, change }),
    );
}
