// Base state shared by everything placed in the world

use crate::core::{Position, TileCoord};
use glam::Vec3;
use std::collections::VecDeque;

/// Which renderer a view belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    Item,
    Mobile,
    Static,
    Land,
    Multi,
    Effect,
}

/// Render-side description of an object.
///
/// Created lazily on first access and dropped whenever the graphic or hue
/// changes, so the next access rebuilds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub kind: ViewKind,
    pub graphic: u16,
    pub hue: u16,
}

/// Floating text above an object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextOverhead {
    pub text: String,
    pub hue: u16,
    /// Simulation time at which the text disappears
    pub expires_at: u64,
}

/// Positional and graphic state of a world object
#[derive(Debug, Clone, Default)]
pub struct GameObject {
    position: Position,
    graphic: u16,
    hue: u16,
    /// Current animation frame
    pub anim_index: i8,
    overheads: VecDeque<TextOverhead>,
    tile: Option<TileCoord>,
    map_index: u8,
    disposed: bool,
    view: Option<View>,
    /// Sub-tile pixel offset (x, y) and altitude offset (z) while moving
    pub offset: Vec3,
}

impl GameObject {
    /// Create an object on a map
    pub fn new(map_index: u8) -> Self {
        Self {
            map_index,
            ..Default::default()
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Move the object, returns whether anything changed
    pub fn set_position(&mut self, position: Position) -> bool {
        if self.position == position {
            return false;
        }
        self.position = position;
        true
    }

    pub fn graphic(&self) -> u16 {
        self.graphic
    }

    /// Change the art id, invalidating the view
    pub fn set_graphic(&mut self, graphic: u16) -> bool {
        if self.graphic == graphic {
            return false;
        }
        self.graphic = graphic;
        self.view = None;
        true
    }

    pub fn hue(&self) -> u16 {
        self.hue
    }

    /// Change the tint, invalidating the view
    pub fn set_hue(&mut self, hue: u16) -> bool {
        if self.hue == hue {
            return false;
        }
        self.hue = hue;
        self.view = None;
        true
    }

    /// Map cell currently holding the object
    pub fn tile(&self) -> Option<TileCoord> {
        self.tile
    }

    /// Record the owning cell; the map itself is updated by the world
    pub(crate) fn set_tile(&mut self, tile: Option<TileCoord>) {
        self.tile = tile;
    }

    pub fn map_index(&self) -> u8 {
        self.map_index
    }

    pub fn set_map_index(&mut self, map_index: u8) {
        self.map_index = map_index;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Mark the object as gone, returns false when it already was
    pub fn dispose(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        self.disposed = true;
        self.view = None;
        self.overheads.clear();
        self.offset = Vec3::ZERO;
        true
    }

    /// Cached view, if one was built
    pub fn cached_view(&self) -> Option<&View> {
        self.view.as_ref()
    }

    /// Drop the cached view
    pub fn invalidate_view(&mut self) {
        self.view = None;
    }

    /// Add floating text, evicting the oldest entries above `max`
    pub fn add_overhead(&mut self, text: impl Into<String>, hue: u16, expires_at: u64, max: usize) {
        self.overheads.push_back(TextOverhead {
            text: text.into(),
            hue,
            expires_at,
        });

        while self.overheads.len() > max {
            self.overheads.pop_front();
        }
    }

    pub fn overheads(&self) -> impl Iterator<Item = &TextOverhead> {
        self.overheads.iter()
    }

    /// Per-tick housekeeping: expire overheads
    pub fn update(&mut self, total_ms: u64, _frame_ms: u64) {
        self.overheads.retain(|overhead| overhead.expires_at > total_ms);
    }

    /// Tile distance to another position
    pub fn distance_to(&self, other: &Position) -> u16 {
        self.position.tile_distance(other)
    }
}

/// Anything with a `GameObject` base and a view factory
pub trait WorldObject {
    fn object(&self) -> &GameObject;

    fn object_mut(&mut self) -> &mut GameObject;

    /// Build a fresh view for the current state
    fn create_view(&self) -> View;

    /// Cached view, built on first access
    fn view(&mut self) -> &View {
        let view = match self.object_mut().view.take() {
            Some(view) => view,
            None => self.create_view(),
        };
        self.object_mut().view.insert(view)
    }
}
