// Items: stackables, equipment, containers, corpses, spellbooks, multis

use super::entity::{Delta, Entity};
use super::game_object::{GameObject, View, ViewKind, WorldObject};
use super::multi::Multi;
use crate::core::{Direction, Serial};
use crate::engine::assets::{self, AnimationData, MultiData, MAX_ANIMATIONS_DATA_INDEX_COUNT};
use crate::game::effects::{EffectContext, GameEffect};
use crate::game::error::{WorldError, MAX_CONTAINER_DEPTH};
use crate::game::mobiles::movement::CHARACTER_ANIMATION_DELAY;
use crate::game::world::{ContainerLookup, HasSerial};

/// Equipment slot, also reused as the facing of a corpse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Layer {
    #[default]
    Invalid = 0x00,
    OneHanded = 0x01,
    TwoHanded = 0x02,
    Shoes = 0x03,
    Pants = 0x04,
    Shirt = 0x05,
    Helm = 0x06,
    Gloves = 0x07,
    Ring = 0x08,
    Talisman = 0x09,
    Neck = 0x0A,
    Hair = 0x0B,
    Waist = 0x0C,
    InnerTorso = 0x0D,
    Bracelet = 0x0E,
    Face = 0x0F,
    FacialHair = 0x10,
    MiddleTorso = 0x11,
    Earrings = 0x12,
    Arms = 0x13,
    Cloak = 0x14,
    Backpack = 0x15,
    OuterTorso = 0x16,
    OuterLegs = 0x17,
    InnerLegs = 0x18,
    Mount = 0x19,
    ShopBuy = 0x1A,
    ShopResale = 0x1B,
    ShopSell = 0x1C,
    Bank = 0x1D,
}

/// Number of equipment slots
pub const LAYER_COUNT: usize = Layer::Bank as usize + 1;

const LAYERS: [Layer; LAYER_COUNT] = [
    Layer::Invalid,
    Layer::OneHanded,
    Layer::TwoHanded,
    Layer::Shoes,
    Layer::Pants,
    Layer::Shirt,
    Layer::Helm,
    Layer::Gloves,
    Layer::Ring,
    Layer::Talisman,
    Layer::Neck,
    Layer::Hair,
    Layer::Waist,
    Layer::InnerTorso,
    Layer::Bracelet,
    Layer::Face,
    Layer::FacialHair,
    Layer::MiddleTorso,
    Layer::Earrings,
    Layer::Arms,
    Layer::Cloak,
    Layer::Backpack,
    Layer::OuterTorso,
    Layer::OuterLegs,
    Layer::InnerLegs,
    Layer::Mount,
    Layer::ShopBuy,
    Layer::ShopResale,
    Layer::ShopSell,
    Layer::Bank,
];

impl Layer {
    /// Decode a layer byte, unknown values map to `Invalid`
    pub fn from_raw(raw: u8) -> Self {
        LAYERS.get(raw as usize).copied().unwrap_or(Layer::Invalid)
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Spell school of a spellbook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SpellBookType {
    Magery,
    Necromancy,
    Chivalry,
    Bushido,
    Ninjitsu,
    Spellweaving,
    Mysticism,
    Mastery,
    #[default]
    Unknown,
}

/// Circle of a spell inside a book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SpellCircle {
    First = 0,
    Second,
    Third,
    Fourth,
    Fifth,
    Sixth,
    Seventh,
    Eighth,
}

impl TryFrom<u8> for SpellCircle {
    type Error = WorldError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => SpellCircle::First,
            1 => SpellCircle::Second,
            2 => SpellCircle::Third,
            3 => SpellCircle::Fourth,
            4 => SpellCircle::Fifth,
            5 => SpellCircle::Sixth,
            6 => SpellCircle::Seventh,
            7 => SpellCircle::Eighth,
            _ => return Err(WorldError::InvalidSpellCircle(value)),
        })
    }
}

impl SpellCircle {
    /// Bit holding spell `index` (1-based) of this circle.
    ///
    /// Circles are packed four to a 32-bit word with the first circle in the
    /// highest byte.
    pub fn spell_bit(self, index: u8) -> Result<u32, WorldError> {
        if !(1..=8).contains(&index) {
            return Err(WorldError::InvalidSpellIndex(index));
        }

        let circle = self as u32;
        Ok((3 - circle % 4 + circle / 4 * 4) * 8 + (index as u32 - 1))
    }
}

const COIN_GRAPHICS: std::ops::RangeInclusive<u16> = 0x0EEA..=0x0EF2;
const CORPSE_GRAPHIC: u16 = 0x2006;
const SPELLBOOK_GRAPHICS: [u16; 7] = [0x0E38, 0x0EFA, 0x2252, 0x2253, 0x238C, 0x23A0, 0x2D50];

/// Body used for a mount item with no table entry
const DEFAULT_MOUNT_BODY: u16 = 0x00C8;

/// Mount item graphic to the body animated underneath the rider
const MOUNT_BODIES: [(u16, u16); 48] = [
    (0x3E90, 0x0114),
    (0x3E91, 0x0115),
    (0x3E92, 0x011C),
    (0x3E94, 0x00F3),
    (0x3E95, 0x00A9),
    (0x3E97, 0x00C3),
    (0x3E98, 0x00C2),
    (0x3E9A, 0x00C1),
    (0x3E9B, 0x00C0),
    (0x3E9D, 0x00C0),
    (0x3E9C, 0x00BF),
    (0x3E9E, 0x00BE),
    (0x3EA0, 0x00E2),
    (0x3EA1, 0x00E4),
    (0x3EA2, 0x00CC),
    (0x3EA3, 0x00D2),
    (0x3EA4, 0x00DA),
    (0x3EA5, 0x00DB),
    (0x3EA6, 0x00DC),
    (0x3EA7, 0x0074),
    (0x3EA8, 0x0075),
    (0x3EA9, 0x0072),
    (0x3EAA, 0x0073),
    (0x3EAB, 0x00AA),
    (0x3EAC, 0x00AB),
    (0x3EAD, 0x0084),
    (0x3EAF, 0x0078),
    (0x3EB0, 0x0079),
    (0x3EB1, 0x0077),
    (0x3EB2, 0x0076),
    (0x3EB3, 0x0090),
    (0x3EB4, 0x007A),
    (0x3EB5, 0x00B1),
    (0x3EB6, 0x00B2),
    (0x3EB7, 0x00B3),
    (0x3EB8, 0x00BC),
    (0x3EBA, 0x00BB),
    (0x3EBB, 0x0319),
    (0x3EBC, 0x0317),
    (0x3EBD, 0x031A),
    (0x3EBE, 0x031F),
    (0x3EC3, 0x02D4),
    (0x3EC5, 0x00D5),
    (0x3F3A, 0x00D5),
    (0x3EC6, 0x01B0),
    (0x3EC7, 0x04E6),
    (0x3EC8, 0x04E7),
    (0x3EC9, 0x042D),
];

/// Body animated for a mount item graphic
pub fn mount_body(graphic: u16) -> u16 {
    MOUNT_BODIES
        .iter()
        .find(|(item, _)| *item == graphic)
        .map(|(_, body)| *body)
        .unwrap_or(DEFAULT_MOUNT_BODY)
}

/// A world item
#[derive(Debug)]
pub struct Item {
    pub entity: Entity,
    amount: u16,
    container: Serial,
    layer: Layer,
    /// Corpse only: play the alternate death animation
    pub used_layer: bool,
    multi: Option<Multi>,
    spellbook_bits: u64,
    book_type: SpellBookType,
    effect: Option<Box<GameEffect>>,
    displayed_graphic: Option<u16>,
    ticks: u64,
    last_animation_change_time: u64,
}

impl Item {
    pub fn new(serial: Serial) -> Self {
        Self {
            entity: Entity::new(serial),
            amount: 0,
            container: Serial::INVALID,
            layer: Layer::Invalid,
            used_layer: false,
            multi: None,
            spellbook_bits: 0,
            book_type: SpellBookType::Unknown,
            effect: None,
            displayed_graphic: None,
            ticks: 0,
            last_animation_change_time: 0,
        }
    }

    pub fn serial(&self) -> Serial {
        self.entity.serial()
    }

    pub fn graphic(&self) -> u16 {
        self.entity.graphic()
    }

    pub fn amount(&self) -> u16 {
        self.amount
    }

    pub fn set_amount(&mut self, amount: u16) {
        if self.amount != amount {
            self.amount = amount;
            self.entity.add_delta(Delta::ATTRIBUTES);
        }
    }

    /// Serial of the holding container or mobile, invalid when on the ground
    pub fn container(&self) -> Serial {
        self.container
    }

    pub fn set_container(&mut self, container: Serial) {
        if self.container != container {
            self.container = container;
            self.entity.add_delta(Delta::OWNERSHIP);
        }
    }

    pub fn on_ground(&self) -> bool {
        !self.container.is_valid()
    }

    pub fn layer(&self) -> Layer {
        self.layer
    }

    pub fn set_layer(&mut self, layer: Layer) {
        if self.layer != layer {
            self.layer = layer;
            self.entity.add_delta(Delta::OWNERSHIP);
        }
    }

    pub fn is_coin(&self) -> bool {
        COIN_GRAPHICS.contains(&self.graphic())
    }

    pub fn is_corpse(&self) -> bool {
        self.graphic() == CORPSE_GRAPHIC
    }

    pub fn is_spellbook(&self) -> bool {
        SPELLBOOK_GRAPHICS.contains(&self.graphic())
    }

    /// Graphic actually drawn, coins show a pile by amount
    pub fn displayed_graphic(&self) -> u16 {
        if let Some(graphic) = self.displayed_graphic {
            return graphic;
        }

        let graphic = self.graphic();
        if self.is_coin() {
            if self.amount > 5 {
                return graphic + 2;
            }
            if self.amount > 1 {
                return graphic + 1;
            }
        }
        graphic
    }

    /// Override the drawn graphic
    pub fn set_displayed_graphic(&mut self, graphic: Option<u16>) {
        self.displayed_graphic = graphic;
        self.entity.object.invalidate_view();
    }

    /// Body graphic to animate for this item.
    ///
    /// Mount items map through the mount table; corpses store the dead
    /// body's graphic in their amount.
    pub fn mount_animation(&self) -> u16 {
        if self.layer == Layer::Mount {
            mount_body(self.graphic())
        } else if self.is_corpse() {
            self.amount
        } else {
            self.graphic()
        }
    }

    pub fn book_type(&self) -> SpellBookType {
        self.book_type
    }

    /// Replace the spell contents of a book, ignored for other items
    pub fn fill_spellbook(&mut self, book_type: SpellBookType, bits: u64) -> bool {
        if !self.is_spellbook() {
            return false;
        }

        let changed = self.book_type != book_type || self.spellbook_bits != bits;
        if changed {
            self.book_type = book_type;
            self.spellbook_bits = bits;
            self.entity.add_delta(Delta::ATTRIBUTES);
        }
        changed
    }

    /// Whether the book contains spell `index` (1-based) of `circle` (0-based)
    pub fn has_spell(&self, circle: u8, index: u8) -> Result<bool, WorldError> {
        let bit = SpellCircle::try_from(circle)?.spell_bit(index)?;
        let flag = 1u64 << bit;
        Ok(self.spellbook_bits & flag == flag)
    }

    pub fn is_multi(&self) -> bool {
        self.multi.is_some()
    }

    pub fn multi(&self) -> Option<&Multi> {
        self.multi.as_ref()
    }

    /// Toggle multi mode. Returns true when a component layout was built.
    pub fn set_multi(&mut self, value: bool, data: &dyn MultiData) -> bool {
        if value == self.multi.is_some() {
            return false;
        }

        self.entity.object.invalidate_view();
        if !value {
            self.multi = None;
            return false;
        }

        let blocks = data.multi_blocks(self.graphic());
        self.multi = Some(Multi::build(self.entity.position(), &blocks));
        log::debug!("{} built multi with {} components", self.serial(), blocks.len());
        true
    }

    pub fn effect(&self) -> Option<&GameEffect> {
        self.effect.as_deref()
    }

    /// Attach an effect, disposing the one it replaces
    pub fn set_effect(&mut self, effect: Option<GameEffect>) {
        if let Some(previous) = self.effect.as_mut() {
            previous.dispose();
        }
        self.effect = effect.map(Box::new);
    }

    /// Walk the container chain to the holding mobile or the outermost item.
    ///
    /// A container serial that no longer resolves ends the walk at the
    /// last item found. Chains longer than `MAX_CONTAINER_DEPTH` fail.
    pub fn root_container(&self, lookup: &dyn ContainerLookup) -> Result<Serial, WorldError> {
        let mut current = self.serial();
        let mut container = self.container;

        for _ in 0..MAX_CONTAINER_DEPTH {
            if !container.is_item() {
                return Ok(if container.is_mobile() { container } else { current });
            }

            match lookup.container_of(container) {
                Some(next) => {
                    current = container;
                    container = next;
                }
                None => return Ok(current),
            }
        }

        Err(WorldError::ContainerTooDeep(self.serial()))
    }

    /// Per-tick update: corpse animation or attached effect.
    ///
    /// Returns the children of an attached effect that finished this tick.
    pub fn update(
        &mut self,
        total_ms: u64,
        frame_ms: u64,
        animations: &dyn AnimationData,
        effects: &EffectContext<'_>,
    ) -> Vec<GameEffect> {
        if self.entity.is_disposed() {
            return Vec::new();
        }

        self.ticks = total_ms;
        self.entity.object.update(total_ms, frame_ms);

        if self.is_corpse() {
            self.process_animation(animations);
            return Vec::new();
        }

        let Some(effect) = self.effect.as_mut() else {
            return Vec::new();
        };
        if !effect.is_disposed() {
            effect.update(total_ms, frame_ms, effects);
        }
        if !effect.is_disposed() {
            return Vec::new();
        }

        let children = effect.take_children();
        self.effect = None;
        children
    }

    /// Advance the death animation of a corpse, stopping on the last frame
    pub fn process_animation(&mut self, animations: &dyn AnimationData) {
        if !self.is_corpse() || self.last_animation_change_time >= self.ticks {
            return;
        }

        let frame_index = self.entity.object.anim_index.saturating_add(1);
        let body = self.mount_animation();
        let (direction, _) = Direction::from_raw(self.layer as u8).animation_direction();

        if body < MAX_ANIMATIONS_DATA_INDEX_COUNT {
            let group = assets::die_group(animations, body, self.used_layer);
            if let Some(frame_count) = animations.frame_count(body, group, direction) {
                let last = frame_count.saturating_sub(1).min(i8::MAX as u8) as i8;
                self.entity.object.anim_index = frame_index.min(last);
            }
        }

        self.last_animation_change_time = self.ticks + CHARACTER_ANIMATION_DELAY;
    }

    pub fn is_disposed(&self) -> bool {
        self.entity.is_disposed()
    }

    /// Dispose the item, its contents, layout and effect
    pub fn dispose(&mut self) -> bool {
        if !self.entity.dispose() {
            return false;
        }

        self.multi = None;
        if let Some(mut effect) = self.effect.take() {
            effect.dispose();
        }
        true
    }
}

impl HasSerial for Item {
    fn serial(&self) -> Serial {
        self.entity.serial()
    }
}

impl WorldObject for Item {
    fn object(&self) -> &GameObject {
        &self.entity.object
    }

    fn object_mut(&mut self) -> &mut GameObject {
        &mut self.entity.object
    }

    fn create_view(&self) -> View {
        View {
            kind: if self.is_multi() { ViewKind::Multi } else { ViewKind::Item },
            graphic: self.displayed_graphic(),
            hue: self.entity.hue(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Position;
    use crate::engine::assets::{AnimationGroupsType, AnimationLibrary, MultiBlock};
    use crate::game::effects::{EffectEndpoint, GameEffect};
    use std::cell::Cell;
    use std::collections::HashMap;

    /// Container map that counts lookups
    struct Chain {
        links: HashMap<Serial, Serial>,
        lookups: Cell<usize>,
    }

    impl ContainerLookup for Chain {
        fn container_of(&self, item: Serial) -> Option<Serial> {
            self.lookups.set(self.lookups.get() + 1);
            self.links.get(&item).copied()
        }
    }

    fn item(serial: u32, graphic: u16) -> Item {
        let mut item = Item::new(Serial(serial));
        item.entity.set_graphic(graphic);
        item
    }

    #[test]
    fn test_coin_displayed_graphic() {
        let mut gold = item(0x4000_0001, 0x0EED);
        gold.set_amount(1);
        assert_eq!(gold.displayed_graphic(), 0x0EED);
        gold.set_amount(3);
        assert_eq!(gold.displayed_graphic(), 0x0EEE);
        gold.set_amount(500);
        assert_eq!(gold.displayed_graphic(), 0x0EEF);
    }

    #[test]
    fn test_root_container_reaches_mobile() {
        let mut pouch = item(0x4000_0001, 0x0E79);
        pouch.set_container(Serial(0x4000_0002));
        let chain = Chain {
            links: HashMap::from([
                (Serial(0x4000_0002), Serial(0x4000_0003)),
                (Serial(0x4000_0003), Serial(0x0000_0010)),
            ]),
            lookups: Cell::new(0),
        };

        assert_eq!(pouch.root_container(&chain), Ok(Serial(0x0000_0010)));
        assert_eq!(chain.lookups.get(), 2, "One lookup per enclosing item");
    }

    #[test]
    fn test_root_container_on_ground() {
        let mut pouch = item(0x4000_0001, 0x0E79);
        pouch.set_container(Serial(0x4000_0002));
        let chain = Chain {
            links: HashMap::from([(Serial(0x4000_0002), Serial::INVALID)]),
            lookups: Cell::new(0),
        };
        assert_eq!(pouch.root_container(&chain), Ok(Serial(0x4000_0002)));

        let loose = item(0x4000_0005, 0x0E79);
        assert_eq!(loose.root_container(&chain), Ok(Serial(0x4000_0005)));
    }

    #[test]
    fn test_root_container_cycle_is_bounded() {
        let mut a = item(0x4000_0001, 0x0E79);
        a.set_container(Serial(0x4000_0002));
        let chain = Chain {
            links: HashMap::from([
                (Serial(0x4000_0002), Serial(0x4000_0001)),
                (Serial(0x4000_0001), Serial(0x4000_0002)),
            ]),
            lookups: Cell::new(0),
        };

        assert_eq!(
            a.root_container(&chain),
            Err(WorldError::ContainerTooDeep(Serial(0x4000_0001)))
        );
        assert_eq!(chain.lookups.get(), MAX_CONTAINER_DEPTH);
    }

    #[test]
    fn test_spellbook_bits() {
        let mut book = item(0x4000_0001, 0x0EFA);
        // First circle lives in the highest byte of the low word
        assert!(book.fill_spellbook(SpellBookType::Magery, 1 << 24));
        assert!(!book.fill_spellbook(SpellBookType::Magery, 1 << 24));
        assert_eq!(book.has_spell(0, 1), Ok(true));
        assert_eq!(book.has_spell(0, 2), Ok(false));
        assert_eq!(book.has_spell(8, 1), Err(WorldError::InvalidSpellCircle(8)));
        assert_eq!(book.has_spell(0, 9), Err(WorldError::InvalidSpellIndex(9)));

        let mut sword = item(0x4000_0002, 0x13B9);
        assert!(!sword.fill_spellbook(SpellBookType::Magery, u64::MAX));
    }

    #[test]
    fn test_spell_bit_layout() {
        assert_eq!(SpellCircle::Fourth.spell_bit(1), Ok(0));
        assert_eq!(SpellCircle::First.spell_bit(8), Ok(31));
        assert_eq!(SpellCircle::Fifth.spell_bit(1), Ok(56));
        assert_eq!(SpellCircle::Eighth.spell_bit(1), Ok(32));
    }

    #[test]
    fn test_mount_animation() {
        let mut horse = item(0x4000_0001, 0x3EA2);
        assert_eq!(horse.mount_animation(), 0x3EA2);
        horse.set_layer(Layer::Mount);
        assert_eq!(horse.mount_animation(), 0x00CC);

        let mut unknown = item(0x4000_0002, 0x3FFF);
        unknown.set_layer(Layer::Mount);
        assert_eq!(unknown.mount_animation(), DEFAULT_MOUNT_BODY);

        let mut corpse = item(0x4000_0003, CORPSE_GRAPHIC);
        corpse.set_amount(0x0190);
        assert_eq!(corpse.mount_animation(), 0x0190);
    }

    #[test]
    fn test_corpse_animation_stops_on_last_frame() {
        let library = AnimationLibrary::new()
            .with_body(0x0190, AnimationGroupsType::Human)
            .with_group(0x0190, 21, 3);
        let mut corpse = item(0x4000_0001, CORPSE_GRAPHIC);
        corpse.set_amount(0x0190);
        corpse.set_layer(Layer::from_raw(Direction::SOUTH.raw()));

        for tick in 1..=10u64 {
            corpse.ticks = tick * 100;
            corpse.process_animation(&library);
        }
        assert_eq!(corpse.entity.object.anim_index, 2);
    }

    #[test]
    fn test_set_multi_builds_layout() {
        let library = AnimationLibrary::new().with_multi(
            0x0064,
            vec![
                MultiBlock { graphic: 0x0080, x: -1, y: -2, z: 0, flags: 1 },
                MultiBlock { graphic: 0x0081, x: 3, y: 1, z: 7, flags: 1 },
            ],
        );
        let mut house = item(0x4000_0001, 0x0064);
        house.entity.set_position(Position::new(100, 100, 0));

        assert!(house.set_multi(true, &library));
        let multi = house.multi().unwrap();
        assert_eq!(multi.components.len(), 2);
        assert_eq!((multi.min_x, multi.max_x, multi.min_y, multi.max_y), (-1, 3, -2, 1));
        assert_eq!(multi.components[1].position, Position::new(103, 101, 7));
        assert_eq!(house.create_view().kind, ViewKind::Multi);

        assert!(!house.set_multi(true, &library));
        assert!(!house.set_multi(false, &library));
        assert!(!house.is_multi());
    }

    #[test]
    fn test_replacing_effect_disposes_previous() {
        let mut brazier = item(0x4000_0001, 0x0E31);
        brazier.set_effect(Some(GameEffect::animated(
            0x3709,
            0,
            EffectEndpoint::Fixed(Position::new(1, 1, 0)),
            -1,
            0,
        )));
        brazier.set_effect(None);
        assert!(brazier.effect().is_none());

        brazier.set_effect(Some(GameEffect::animated(
            0x3709,
            0,
            EffectEndpoint::Fixed(Position::new(1, 1, 0)),
            -1,
            0,
        )));
        assert!(brazier.dispose());
        assert!(brazier.effect().is_none());
    }

    struct Nowhere;

    impl crate::game::world::EntityLocator for Nowhere {
        fn handle_of(&self, _serial: Serial) -> Option<crate::engine::assets::EntityHandle> {
            None
        }

        fn locate(&self, _handle: crate::engine::assets::EntityHandle) -> Option<Position> {
            None
        }
    }

    #[test]
    fn test_finished_effect_hands_over_children() {
        let library = AnimationLibrary::new();
        let ctx = EffectContext {
            locator: &Nowhere,
            data: &library,
        };
        let here = EffectEndpoint::Fixed(Position::new(1, 1, 0));
        let mut effect = GameEffect::animated(0x3709, 0, here, 100, 0);
        effect.add_child(GameEffect::animated(0x36CB, 0, here, 400, 0));

        let mut brazier = item(0x4000_0001, 0x0E31);
        brazier.set_effect(Some(effect));

        assert!(brazier.update(50, 50, &library, &ctx).is_empty());
        assert!(brazier.effect().is_some());

        let children = brazier.update(100, 50, &library, &ctx);
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].base_graphic(), 0x36CB);
        assert!(brazier.effect().is_none());
        assert!(brazier.update(150, 50, &library, &ctx).is_empty());
    }

    #[test]
    fn test_layer_from_raw() {
        assert_eq!(Layer::from_raw(0x19), Layer::Mount);
        assert_eq!(Layer::from_raw(0x1D), Layer::Bank);
        assert_eq!(Layer::from_raw(0x40), Layer::Invalid);
        assert_eq!(LAYER_COUNT, 30);
    }
}
