// Identified world objects and change tracking

use super::game_object::GameObject;
use super::item::Item;
use crate::core::{Direction, Position, Serial};
use crate::game::world::{EntityCollection, HasSerial};
use bitflags::bitflags;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

bitflags! {
    /// Categories of state changed since the last `process_delta`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Delta: u16 {
        const APPEARANCE = 1 << 0;
        const POSITION = 1 << 1;
        const ATTRIBUTES = 1 << 2;
        const OWNERSHIP = 1 << 3;
        const HITS = 1 << 4;
        const MANA = 1 << 5;
        const STAMINA = 1 << 6;
        const STATS = 1 << 7;
        const SKILLS = 1 << 8;
        const PROPERTIES = 1 << 9;
    }
}

bitflags! {
    /// Status bits sent by the server
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EntityFlags: u8 {
        const FROZEN = 0x01;
        const FEMALE = 0x02;
        /// Poisoned on old clients, flying on newer ones
        const POISONED = 0x04;
        const FLYING = 0x04;
        const YELLOW_HITS = 0x08;
        const IGNORE_MOBILES = 0x10;
        const MOVABLE = 0x20;
        const WAR_MODE = 0x40;
        const HIDDEN = 0x80;
    }
}

/// Observable change emitted by `process_delta`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityChange {
    Appearance,
    Position,
    Attributes,
    Ownership,
    Hits,
    Mana,
    Stamina,
    Stats,
    Skills,
    Properties,
}

/// Delta bit to change mapping, in emission order
const DELTA_CHANGES: [(Delta, EntityChange); 10] = [
    (Delta::APPEARANCE, EntityChange::Appearance),
    (Delta::POSITION, EntityChange::Position),
    (Delta::ATTRIBUTES, EntityChange::Attributes),
    (Delta::OWNERSHIP, EntityChange::Ownership),
    (Delta::HITS, EntityChange::Hits),
    (Delta::MANA, EntityChange::Mana),
    (Delta::STAMINA, EntityChange::Stamina),
    (Delta::STATS, EntityChange::Stats),
    (Delta::SKILLS, EntityChange::Skills),
    (Delta::PROPERTIES, EntityChange::Properties),
];

/// Server-supplied descriptive line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Localized string id
    pub cliloc: u32,
    /// Arguments substituted into the string
    pub args: String,
}

/// A world object with a serial
#[derive(Debug)]
pub struct Entity {
    pub object: GameObject,
    serial: Serial,
    name: String,
    direction: Direction,
    flags: EntityFlags,
    properties: HashMap<u32, Property>,
    items: EntityCollection<Item>,
    delta: Delta,
    changes: Vec<EntityChange>,
}

impl Entity {
    pub fn new(serial: Serial) -> Self {
        Self {
            object: GameObject::new(0),
            serial,
            name: String::new(),
            direction: Direction::NORTH,
            flags: EntityFlags::empty(),
            properties: HashMap::new(),
            items: EntityCollection::new(),
            delta: Delta::empty(),
            changes: Vec::new(),
        }
    }

    pub fn serial(&self) -> Serial {
        self.serial
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        if self.name != name {
            self.name = name;
            self.delta |= Delta::ATTRIBUTES;
        }
    }

    pub fn position(&self) -> Position {
        self.object.position()
    }

    pub fn set_position(&mut self, position: Position) {
        if self.object.set_position(position) {
            self.delta |= Delta::POSITION;
        }
    }

    pub fn graphic(&self) -> u16 {
        self.object.graphic()
    }

    pub fn set_graphic(&mut self, graphic: u16) {
        if self.object.set_graphic(graphic) {
            self.delta |= Delta::APPEARANCE;
        }
    }

    pub fn hue(&self) -> u16 {
        self.object.hue()
    }

    pub fn set_hue(&mut self, hue: u16) {
        if self.object.set_hue(hue) {
            self.delta |= Delta::APPEARANCE;
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Direction) {
        if self.direction != direction {
            self.direction = direction;
            self.delta |= Delta::POSITION;
        }
    }

    pub fn flags(&self) -> EntityFlags {
        self.flags
    }

    pub fn set_flags(&mut self, flags: EntityFlags) {
        if self.flags != flags {
            self.flags = flags;
            self.delta |= Delta::ATTRIBUTES;
        }
    }

    pub fn has_flag(&self, flag: EntityFlags) -> bool {
        self.flags.contains(flag)
    }

    pub fn property(&self, index: u32) -> Option<&Property> {
        self.properties.get(&index)
    }

    pub fn properties(&self) -> impl Iterator<Item = (&u32, &Property)> {
        self.properties.iter()
    }

    pub fn set_property(&mut self, index: u32, property: Property) {
        if self.properties.get(&index) != Some(&property) {
            self.properties.insert(index, property);
            self.delta |= Delta::PROPERTIES;
        }
    }

    pub fn clear_properties(&mut self) {
        if !self.properties.is_empty() {
            self.properties.clear();
            self.delta |= Delta::PROPERTIES;
        }
    }

    /// Items held by this entity
    pub fn items(&self) -> &EntityCollection<Item> {
        &self.items
    }

    /// Pending change categories
    pub fn delta(&self) -> Delta {
        self.delta
    }

    /// Mark categories changed outside the standard setters
    pub fn add_delta(&mut self, delta: Delta) {
        self.delta |= delta;
    }

    /// Turn the accumulated delta into change events and reset it
    pub fn process_delta(&mut self) {
        if self.delta.is_empty() {
            return;
        }

        for (flag, change) in DELTA_CHANGES {
            if self.delta.contains(flag) {
                self.changes.push(change);
            }
        }

        log::trace!("{} delta {:?}", self.serial, self.delta);
        self.delta = Delta::empty();
    }

    /// Drain the emitted change events
    pub fn take_changes(&mut self) -> Vec<EntityChange> {
        std::mem::take(&mut self.changes)
    }

    pub fn is_disposed(&self) -> bool {
        self.object.is_disposed()
    }

    /// Dispose this entity and every item it holds
    pub fn dispose(&mut self) -> bool {
        if !self.object.dispose() {
            return false;
        }

        for child in self.items.clear() {
            child.write().dispose();
        }
        self.delta = Delta::empty();
        true
    }
}

impl HasSerial for Entity {
    fn serial(&self) -> Serial {
        self.serial
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.serial == other.serial
    }
}

impl Eq for Entity {}

impl Hash for Entity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.serial.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_batches_per_category() {
        let mut entity = Entity::new(Serial(0x4000_0001));
        entity.set_graphic(0x0EED);
        entity.set_graphic(0x0EEE);
        entity.set_hue(0x0030);
        entity.set_position(Position::new(1, 1, 0));
        entity.set_position(Position::new(2, 1, 0));
        entity.set_name("gold");

        entity.process_delta();
        assert_eq!(
            entity.take_changes(),
            vec![
                EntityChange::Appearance,
                EntityChange::Position,
                EntityChange::Attributes
            ]
        );
        assert!(entity.delta().is_empty());

        // Nothing left to report
        entity.process_delta();
        assert!(entity.take_changes().is_empty());
    }

    #[test]
    fn test_unchanged_value_sets_no_delta() {
        let mut entity = Entity::new(Serial(1));
        entity.set_direction(Direction::NORTH);
        entity.set_flags(EntityFlags::empty());
        assert!(entity.delta().is_empty());

        entity.set_flags(EntityFlags::WAR_MODE);
        assert_eq!(entity.delta(), Delta::ATTRIBUTES);
    }

    #[test]
    fn test_properties_delta() {
        let mut entity = Entity::new(Serial(1));
        let property = Property {
            cliloc: 1_050_045,
            args: "a sword".to_string(),
        };
        entity.set_property(0, property.clone());
        assert_eq!(entity.delta(), Delta::PROPERTIES);

        entity.process_delta();
        entity.set_property(0, property);
        assert!(entity.delta().is_empty());
        assert_eq!(entity.property(0).map(|p| p.cliloc), Some(1_050_045));
    }

    #[test]
    fn test_equality_by_serial() {
        let mut a = Entity::new(Serial(9));
        let b = Entity::new(Serial(9));
        a.set_name("renamed");
        assert_eq!(a, b);
        assert_ne!(a, Entity::new(Serial(10)));
    }

    #[test]
    fn test_dispose_disposes_children() {
        let mut bag = Entity::new(Serial(0x4000_0001));
        bag.items().add(Item::new(Serial(0x4000_0002)));
        let child = bag.items().get(Serial(0x4000_0002)).unwrap();

        assert!(bag.dispose());
        assert!(child.read().is_disposed());
        assert!(bag.items().is_empty());
        assert!(!bag.dispose());
    }
}
