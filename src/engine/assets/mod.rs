// Resource provider interfaces
//
// Animation frame tables, effect frame tables and multi layouts come from
// on-disk art files that this crate does not decode. The simulation only
// talks to these traits; `AnimationLibrary` is an in-memory implementation
// used by the demo binary and the tests.

mod handle;
mod library;

pub use handle::{EntityHandle, Handle};
pub use library::AnimationLibrary;

/// Number of body graphics with indexed animation data
pub const MAX_ANIMATIONS_DATA_INDEX_COUNT: u16 = 2048;

/// Animation flag marking that the declared group type is authoritative
pub const ANIMATION_FLAG_USE_TYPE: u32 = 0x8000_0000;

/// Animation flag enabling the third monster stance on type 0 requests
pub const ANIMATION_FLAG_STANCE: u32 = 0x0000_0001;

/// Body classification declared by the animation data
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum AnimationGroupsType {
    #[default]
    Monster = 0,
    SeaMonster = 1,
    Animal = 2,
    Human = 3,
    Equipment = 4,
    Unknown = 5,
}

/// Animation taxonomy a body uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationGroup {
    Low,
    High,
    People,
}

impl AnimationGroup {
    /// Column of this taxonomy in the group association table
    pub const fn column(self) -> usize {
        match self {
            AnimationGroup::Low => 0,
            AnimationGroup::High => 1,
            AnimationGroup::People => 2,
        }
    }
}

/// Frame table of an animated effect graphic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectAnimation {
    /// Graphic offsets added to the base graphic, one per frame
    pub frames: Vec<i8>,
    /// Milliseconds per frame
    pub interval_ms: u64,
}

/// One component of a multi-tile structure, relative to its anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultiBlock {
    pub graphic: u16,
    pub x: i16,
    pub y: i16,
    pub z: i16,
    pub flags: u32,
}

/// Body animation queries
pub trait AnimationData {
    /// Declared body classification
    fn group_type(&self, graphic: u16) -> AnimationGroupsType;

    /// Raw animation flags of a body
    fn animation_flags(&self, _graphic: u16) -> u32 {
        0
    }

    /// Whether the body has frames for the group at all
    fn animation_exists(&self, graphic: u16, group: u8) -> bool;

    /// Frames stored for one group/direction, `None` when nothing is loaded
    fn frame_count(&self, graphic: u16, group: u8, direction: u8) -> Option<u8>;
}

/// Effect graphic queries
pub trait EffectData {
    /// Frame table of an effect graphic, `None` for static art
    fn effect_animation(&self, graphic: u16) -> Option<EffectAnimation>;
}

/// Multi layout queries
pub trait MultiData {
    /// Components of a multi graphic
    fn multi_blocks(&self, graphic: u16) -> Vec<MultiBlock>;
}

/// Everything the world needs from the art files
pub trait ResourceProvider: Send + Sync {
    fn animations(&self) -> &dyn AnimationData;

    fn effects(&self) -> &dyn EffectData;

    fn multis(&self) -> &dyn MultiData;
}

impl<T> ResourceProvider for T
where
    T: AnimationData + EffectData + MultiData + Send + Sync,
{
    fn animations(&self) -> &dyn AnimationData {
        self
    }

    fn effects(&self) -> &dyn EffectData {
        self
    }

    fn multis(&self) -> &dyn MultiData {
        self
    }
}

/// Taxonomy used by a body graphic
pub fn group_index(data: &dyn AnimationData, graphic: u16) -> AnimationGroup {
    if graphic >= MAX_ANIMATIONS_DATA_INDEX_COUNT {
        return AnimationGroup::High;
    }

    match data.group_type(graphic) {
        AnimationGroupsType::Animal => AnimationGroup::Low,
        AnimationGroupsType::Monster | AnimationGroupsType::SeaMonster => AnimationGroup::High,
        AnimationGroupsType::Human | AnimationGroupsType::Equipment => AnimationGroup::People,
        AnimationGroupsType::Unknown => AnimationGroup::High,
    }
}

/// Death group of a body, `second` selects the alternate pose
pub fn die_group(data: &dyn AnimationData, graphic: u16, second: bool) -> u8 {
    match (group_index(data, graphic), second) {
        (AnimationGroup::Low, false) => 8,
        (AnimationGroup::Low, true) => 12,
        (AnimationGroup::High, false) => 2,
        (AnimationGroup::High, true) => 3,
        (AnimationGroup::People, false) => 21,
        (AnimationGroup::People, true) => 22,
    }
}
