// Mobiles: characters and creatures with a step queue and body animation

use super::animation::NO_GROUP;
use super::movement::{
    pixel_offset, MovementSpeed, CHARACTER_ANIMATION_DELAY, PLAYER_WALKING_DELAY, WALKING_DELAY,
};
use super::step::{Step, StepQueue, MAX_STEP_COUNT};
use crate::core::{Direction, Position, Serial};
use crate::engine::assets::{AnimationData, MAX_ANIMATIONS_DATA_INDEX_COUNT};
use crate::game::objects::item::mount_body;
use crate::game::objects::{
    Delta, Entity, EntityFlags, GameObject, Layer, View, ViewKind, WorldObject, LAYER_COUNT,
};
use crate::game::world::HasSerial;
use glam::Vec3;

/// Mount graphic that is really a boat being steered
const BOAT_MOUNT_GRAPHIC: u16 = 0x3E96;

/// Fidget groups a rider hands over to the mount
const MOUNT_FIDGET_GROUPS: [u8; 3] = [5, 6, 34];

/// Server reputation colour of a mobile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Notoriety {
    #[default]
    Unknown = 0,
    Innocent = 1,
    Ally = 2,
    Gray = 3,
    Criminal = 4,
    Enemy = 5,
    Murderer = 6,
    Invulnerable = 7,
}

impl Notoriety {
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Notoriety::Innocent,
            2 => Notoriety::Ally,
            3 => Notoriety::Gray,
            4 => Notoriety::Criminal,
            5 => Notoriety::Enemy,
            6 => Notoriety::Murderer,
            7 => Notoriety::Invulnerable,
            _ => Notoriety::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Race {
    #[default]
    Human = 1,
    Elf = 2,
    Gargoyle = 3,
}

/// Server override of how fast a mobile may move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub enum SpeedMode {
    #[default]
    Normal,
    FastUnmount,
    CantRun,
    FastUnmountAndCantRun,
}

/// Item worn in an equipment slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EquippedItem {
    pub serial: Serial,
    pub graphic: u16,
}

impl EquippedItem {
    pub fn new(serial: Serial, graphic: u16) -> Self {
        Self { serial, graphic }
    }
}

/// Collaborators a mobile needs for one update
pub struct TickContext<'a> {
    pub animations: &'a dyn AnimationData,
    pub speed: &'a dyn MovementSpeed,
    pub smooth_movement: bool,
}

/// A character or creature
#[derive(Debug)]
pub struct Mobile {
    pub entity: Entity,
    hits: u16,
    hits_max: u16,
    mana: u16,
    mana_max: u16,
    stamina: u16,
    stamina_max: u16,
    notoriety: Notoriety,
    race: Race,
    speed_mode: SpeedMode,
    pub renamable: bool,
    dead: bool,
    is_player: bool,
    equipment: [Option<EquippedItem>; LAYER_COUNT],

    pub(super) steps: StepQueue,
    pub(super) last_step_time: u64,
    pub(super) ticks: u64,

    pub(super) animation_group: u8,
    pub(super) animation_interval: u8,
    pub(super) animation_frame_count: u8,
    pub(super) animation_repeat_mode: u8,
    pub(super) animation_repeat: bool,
    pub(super) animation_forward: bool,
    pub(super) animation_from_server: bool,
    pub(super) last_animation_change_time: u64,
}

impl Mobile {
    pub fn new(serial: Serial) -> Self {
        Self {
            entity: Entity::new(serial),
            hits: 0,
            hits_max: 0,
            mana: 0,
            mana_max: 0,
            stamina: 0,
            stamina_max: 0,
            notoriety: Notoriety::Unknown,
            race: Race::Human,
            speed_mode: SpeedMode::Normal,
            renamable: false,
            dead: false,
            is_player: false,
            equipment: [None; LAYER_COUNT],
            steps: StepQueue::new(),
            last_step_time: 0,
            ticks: 0,
            animation_group: NO_GROUP,
            animation_interval: 0,
            animation_frame_count: 0,
            animation_repeat_mode: 1,
            animation_repeat: false,
            animation_forward: false,
            animation_from_server: false,
            last_animation_change_time: 0,
        }
    }

    /// Mobile controlled by the local client
    pub(crate) fn new_player(serial: Serial) -> Self {
        Self {
            is_player: true,
            ..Self::new(serial)
        }
    }

    pub fn serial(&self) -> Serial {
        self.entity.serial()
    }

    pub fn graphic(&self) -> u16 {
        self.entity.graphic()
    }

    pub fn position(&self) -> Position {
        self.entity.position()
    }

    pub fn direction(&self) -> Direction {
        self.entity.direction()
    }

    /// Last committed step was a run
    pub fn is_running(&self) -> bool {
        self.direction().is_running()
    }

    pub fn is_player(&self) -> bool {
        self.is_player
    }

    pub fn hits(&self) -> (u16, u16) {
        (self.hits, self.hits_max)
    }

    pub fn set_hits(&mut self, hits: u16, max: u16) {
        if (self.hits, self.hits_max) != (hits, max) {
            self.hits = hits;
            self.hits_max = max;
            self.entity.add_delta(Delta::HITS);
        }
    }

    pub fn mana(&self) -> (u16, u16) {
        (self.mana, self.mana_max)
    }

    pub fn set_mana(&mut self, mana: u16, max: u16) {
        if (self.mana, self.mana_max) != (mana, max) {
            self.mana = mana;
            self.mana_max = max;
            self.entity.add_delta(Delta::MANA);
        }
    }

    pub fn stamina(&self) -> (u16, u16) {
        (self.stamina, self.stamina_max)
    }

    pub fn set_stamina(&mut self, stamina: u16, max: u16) {
        if (self.stamina, self.stamina_max) != (stamina, max) {
            self.stamina = stamina;
            self.stamina_max = max;
            self.entity.add_delta(Delta::STAMINA);
        }
    }

    pub fn notoriety(&self) -> Notoriety {
        self.notoriety
    }

    pub fn set_notoriety(&mut self, notoriety: Notoriety) {
        if self.notoriety != notoriety {
            self.notoriety = notoriety;
            self.entity.add_delta(Delta::ATTRIBUTES);
            self.entity.object.invalidate_view();
        }
    }

    pub fn race(&self) -> Race {
        self.race
    }

    pub fn set_race(&mut self, race: Race) {
        self.race = race;
    }

    pub fn speed_mode(&self) -> SpeedMode {
        self.speed_mode
    }

    pub fn set_speed_mode(&mut self, speed_mode: SpeedMode) {
        self.speed_mode = speed_mode;
    }

    pub fn set_dead(&mut self, dead: bool) {
        self.dead = dead;
    }

    pub fn is_dead(&self) -> bool {
        matches!(self.graphic(), 0x0192 | 0x0193 | 0x025F | 0x0260 | 0x02B6 | 0x02B7) || self.dead
    }

    pub fn is_human(&self) -> bool {
        matches!(
            self.graphic(),
            0x0190..=0x0193
                | 0x00B7..=0x00BA
                | 0x025D..=0x0260
                | 0x029A
                | 0x029B
                | 0x02B6
                | 0x02B7
                | 0x03DB
                | 0x03DF
                | 0x03E2
                | 0x02E8
                | 0x02E9
        )
    }

    pub fn is_gargoyle(&self) -> bool {
        self.race == Race::Gargoyle || matches!(self.graphic(), 0x029A | 0x029B | 0x02B6 | 0x02B7)
    }

    /// Only gargoyles fly, the same bit means poisoned on other bodies
    pub fn is_flying(&self) -> bool {
        self.is_gargoyle() && self.entity.has_flag(EntityFlags::FLYING)
    }

    pub fn in_war_mode(&self) -> bool {
        self.entity.has_flag(EntityFlags::WAR_MODE)
    }

    pub fn is_hidden(&self) -> bool {
        self.entity.has_flag(EntityFlags::HIDDEN)
    }

    /// Item in an equipment slot
    pub fn equipment(&self, layer: Layer) -> Option<EquippedItem> {
        self.equipment[layer.index()]
    }

    /// Fill a slot, returning what it held before
    pub fn equip(&mut self, layer: Layer, item: EquippedItem) -> Option<EquippedItem> {
        let previous = self.equipment[layer.index()].replace(item);
        self.entity.add_delta(Delta::APPEARANCE);
        self.entity.object.invalidate_view();
        previous
    }

    pub fn unequip(&mut self, layer: Layer) -> Option<EquippedItem> {
        let previous = self.equipment[layer.index()].take();
        if previous.is_some() {
            self.entity.add_delta(Delta::APPEARANCE);
            self.entity.object.invalidate_view();
        }
        previous
    }

    /// Clear whichever slot holds `serial`
    pub fn unequip_serial(&mut self, serial: Serial) -> Option<Layer> {
        let index = self
            .equipment
            .iter()
            .position(|slot| slot.map(|item| item.serial) == Some(serial))?;
        self.equipment[index] = None;
        self.entity.add_delta(Delta::APPEARANCE);
        self.entity.object.invalidate_view();
        Some(Layer::from_raw(index as u8))
    }

    pub fn equipped(&self) -> impl Iterator<Item = (Layer, EquippedItem)> + '_ {
        self.equipment
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.map(|item| (Layer::from_raw(index as u8), item)))
    }

    /// Riding something that is not a boat
    pub fn is_mounted(&self) -> bool {
        self.equipment(Layer::Mount)
            .map(|mount| mount.graphic != BOAT_MOUNT_GRAPHIC)
            .unwrap_or(false)
    }

    /// Moves at mounted speed
    pub fn is_mounted_for_speed(&self) -> bool {
        self.is_mounted()
            || matches!(self.speed_mode, SpeedMode::FastUnmount | SpeedMode::FastUnmountAndCantRun)
            || self.is_flying()
    }

    pub fn is_one_handed(&self) -> bool {
        self.equipment(Layer::OneHanded).is_some()
    }

    pub fn is_two_handed(&self) -> bool {
        self.equipment(Layer::TwoHanded).is_some()
    }

    /// Body graphic used for animation, ghosts use the living body
    pub fn graphic_for_animation(&self) -> u16 {
        match self.graphic() {
            graphic @ (0x0192 | 0x0193) => graphic - 2,
            graphic => graphic,
        }
    }

    /// Facing the body is drawn with: the step in flight, else the mobile's own
    pub fn direction_for_animation(&self) -> Direction {
        self.steps
            .front()
            .map(|step| step.direction.facing())
            .unwrap_or_else(|| self.direction().facing())
    }

    pub fn steps(&self) -> &StepQueue {
        &self.steps
    }

    pub fn is_moving(&self) -> bool {
        !self.steps.is_empty()
    }

    pub fn last_step_time(&self) -> u64 {
        self.last_step_time
    }

    fn walking_delay(&self) -> u64 {
        if self.is_player {
            PLAYER_WALKING_DELAY
        } else {
            WALKING_DELAY
        }
    }

    /// A step finished within the walking window
    pub fn is_walking(&self) -> bool {
        self.ticks
            .checked_sub(self.walking_delay())
            .map(|since| self.last_step_time > since)
            .unwrap_or(false)
    }

    /// Frame cursor holds still between steps of a walk
    fn no_iterate_anim_index(&self) -> bool {
        let recent = self
            .ticks
            .checked_sub(WALKING_DELAY)
            .map(|since| self.last_step_time > since)
            .unwrap_or(false);
        recent && self.steps.is_empty()
    }

    /// Where the mobile will stand once the queue drains
    pub fn end_position(&self) -> (Position, Direction) {
        match self.steps.back() {
            Some(step) => (step.position(), step.direction),
            None => (self.position(), self.direction()),
        }
    }

    /// Queue a move towards a tile.
    ///
    /// A change of facing is queued as a separate turn step ahead of the
    /// move. Returns false, queueing nothing, when the steps do not all fit.
    pub fn enqueue_step(&mut self, x: u16, y: u16, z: i8, direction: Direction, run: bool) -> bool {
        if self.steps.is_full() {
            return false;
        }

        let (end, end_direction) = self.end_position();
        let direction = direction.facing();
        let end_direction = end_direction.facing();

        if end.x == x && end.y == y && end.z == z && end_direction == direction {
            return true;
        }

        let target = Position::new(x, y, z);
        let move_direction = Direction::between(end.x as i32, end.y as i32, x as i32, y as i32);

        let mut pending = Vec::with_capacity(3);
        if !move_direction.is_none() {
            if move_direction != end_direction {
                pending.push(Step::new(end, move_direction.with_running(run)));
            }
            pending.push(Step::new(target, move_direction.with_running(run)));
        }
        if move_direction != direction {
            pending.push(Step::new(target, direction.with_running(run)));
        }

        if self.steps.len() + pending.len() > MAX_STEP_COUNT {
            log::debug!("{} step to {} does not fit the queue", self.serial(), target);
            return false;
        }

        if self.steps.is_empty() {
            if !self.is_walking() {
                self.reset_animation();
            }
            self.last_step_time = self.ticks;
        }

        for step in pending {
            self.steps.push(step);
        }
        true
    }

    /// Snap to a position, dropping queued steps
    pub fn force_position(&mut self, position: Position, direction: Direction) {
        self.clear_steps();
        self.entity.set_position(position);
        self.entity.set_direction(direction);
        self.entity.process_delta();
    }

    pub fn clear_steps(&mut self) {
        self.steps.clear();
        self.entity.object.offset = Vec3::ZERO;
    }

    /// Start an animation group, `NO_GROUP` returns to state-driven groups
    pub fn set_animation(
        &mut self,
        group: u8,
        interval: u8,
        frame_count: u8,
        repeat_mode: u8,
        repeat: bool,
        forward: bool,
    ) {
        self.animation_group = group;
        self.entity.object.anim_index = 0;
        self.animation_interval = interval;
        self.animation_frame_count = frame_count;
        self.animation_repeat_mode = repeat_mode;
        self.animation_repeat = repeat;
        self.animation_forward = forward;
        self.animation_from_server = false;
        self.last_animation_change_time = self.ticks;
    }

    pub(crate) fn reset_animation(&mut self) {
        self.set_animation(NO_GROUP, 0, 0, 0, false, false);
    }

    /// Animation requested by the server with explicit playback settings
    pub fn play_server_animation(
        &mut self,
        group: u8,
        interval: u8,
        frame_count: u8,
        repeat_mode: u8,
        repeat: bool,
        forward: bool,
    ) {
        self.set_animation(group, interval, frame_count, repeat_mode, repeat, forward);
        self.animation_from_server = true;
    }

    /// Typed animation request, resolved through `new_animation_group`
    pub fn play_new_animation(
        &mut self,
        data: &dyn AnimationData,
        kind: u16,
        action: u16,
        mode: u8,
    ) -> Option<u8> {
        let group = self.new_animation_group(data, kind, action, mode);

        self.set_animation(group.unwrap_or(NO_GROUP), 0, 0, 0, false, false);
        self.animation_repeat_mode = 1;
        self.animation_forward = true;
        // Body 0x15 loops its type 1/2 animations
        self.animation_repeat = matches!(kind, 1 | 2) && self.graphic() == 0x0015;
        self.animation_from_server = true;

        group
    }

    pub fn animation_group(&self) -> u8 {
        self.animation_group
    }

    pub fn is_animation_from_server(&self) -> bool {
        self.animation_from_server
    }

    /// Per-tick update
    pub fn update(&mut self, total_ms: u64, frame_ms: u64, ctx: &TickContext<'_>) {
        if self.entity.is_disposed() {
            return;
        }

        self.ticks = total_ms;
        self.entity.object.update(total_ms, frame_ms);
        self.process_animation(ctx);
    }

    /// Advance the step in flight, then the animation frame
    pub fn process_animation(&mut self, ctx: &TickContext<'_>) {
        self.process_steps(ctx);
        self.advance_frame(ctx.animations);
    }

    fn process_steps(&mut self, ctx: &TickContext<'_>) {
        loop {
            let Some(step) = self.steps.front().copied() else {
                self.entity.object.offset = Vec3::ZERO;
                return;
            };

            if self.animation_from_server {
                self.reset_animation();
            }

            let mounted = self.is_mounted_for_speed();
            let max_delay = ctx
                .speed
                .step_delay(step.is_running(), mounted)
                .saturating_sub(if mounted { 1 } else { 15 });
            let delay = self.ticks.saturating_sub(self.last_step_time);
            let position = self.position();

            let turn_only = position.x == step.x && position.y == step.y;
            let mut remove = turn_only || delay >= max_delay;

            if !remove {
                if self.entity.object.offset.truncate() == glam::Vec2::ZERO && !is_adjacent(position, &step) {
                    log::debug!("{} dropping non-adjacent step to {}", self.serial(), step.position());
                    remove = true;
                } else if ctx.smooth_movement {
                    let frames_per_tile = max_delay as f32 / CHARACTER_ANIMATION_DELAY as f32;
                    let frame_offset = delay as f32 / CHARACTER_ANIMATION_DELAY as f32;
                    self.entity.object.offset = pixel_offset(
                        step.direction.index(),
                        frame_offset,
                        frames_per_tile,
                        step.z as i32 - position.z as i32,
                    );
                }
            }

            if !remove {
                return;
            }

            self.entity.set_position(step.position());
            self.entity.set_direction(step.direction);
            self.entity.object.offset = Vec3::ZERO;
            self.steps.pop();

            if turn_only {
                continue;
            }

            self.last_step_time = self.ticks;
            self.entity.process_delta();
            return;
        }
    }

    fn advance_frame(&mut self, data: &dyn AnimationData) {
        if self.last_animation_change_time >= self.ticks || self.no_iterate_anim_index() {
            return;
        }

        let mut frame = self.entity.object.anim_index as i32;
        if self.animation_from_server && !self.animation_forward {
            frame -= 1;
        } else {
            frame += 1;
        }

        let mut id = self.graphic_for_animation();
        let mut group = self.group_for_animation(data, Some(id));

        if let Some(stance) = self.stance_group(group) {
            group = stance;
            self.animation_group = stance;
        }

        if let Some(mount) = self.equipment(Layer::Mount) {
            if MOUNT_FIDGET_GROUPS.contains(&group) {
                id = mount_body(mount.graphic);
                group = self.group_for_animation(data, Some(id));
            }
        }

        let (direction, _) = self.direction_for_animation().animation_direction();
        let mut delay = CHARACTER_ANIMATION_DELAY;

        if id < MAX_ANIMATIONS_DATA_INDEX_COUNT {
            if let Some(loaded) = data.frame_count(id, group, direction) {
                let mut frame_count = loaded as i32;

                if self.animation_from_server {
                    delay += delay * (self.animation_interval as u64 + 1);

                    if self.animation_frame_count == 0 {
                        self.animation_frame_count = loaded;
                    } else {
                        frame_count = self.animation_frame_count as i32;
                    }

                    if self.animation_forward && frame >= frame_count {
                        frame = 0;
                        self.finish_repeat();
                    } else if !self.animation_forward && frame < 0 {
                        frame = (frame_count - 1).max(0);
                        self.finish_repeat();
                    }
                } else if frame >= frame_count {
                    frame = 0;
                }

                self.entity.object.anim_index = frame.clamp(i8::MIN as i32, i8::MAX as i32) as i8;
            }
        }

        self.last_animation_change_time = self.ticks + delay;
    }

    /// One pass of a server animation ended
    fn finish_repeat(&mut self) {
        if self.animation_repeat {
            match self.animation_repeat_mode {
                2 => self.animation_repeat_mode = 1,
                1 => self.reset_animation(),
                _ => {}
            }
        } else {
            self.reset_animation();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.entity.is_disposed()
    }

    pub fn dispose(&mut self) -> bool {
        if !self.entity.dispose() {
            return false;
        }
        self.steps.clear();
        self.equipment = [None; LAYER_COUNT];
        true
    }
}

/// Step lands on a neighbouring tile in its own direction
fn is_adjacent(position: Position, step: &Step) -> bool {
    let (dx, dy) = step.direction.offset();
    position.x as i32 + dx == step.x as i32 && position.y as i32 + dy == step.y as i32
}

impl HasSerial for Mobile {
    fn serial(&self) -> Serial {
        self.entity.serial()
    }
}

impl WorldObject for Mobile {
    fn object(&self) -> &GameObject {
        &self.entity.object
    }

    fn object_mut(&mut self) -> &mut GameObject {
        &mut self.entity.object
    }

    fn create_view(&self) -> View {
        View {
            kind: ViewKind::Mobile,
            graphic: self.graphic(),
            hue: self.entity.hue(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::assets::{AnimationGroupsType, AnimationLibrary, ANIMATION_FLAG_USE_TYPE};
    use crate::game::mobiles::movement::StandardMovementSpeed;
    use approx::assert_relative_eq;

    const HUMAN: u16 = 0x0190;

    fn library() -> AnimationLibrary {
        AnimationLibrary::new()
            .with_body(HUMAN, AnimationGroupsType::Human)
            .with_flags(HUMAN, ANIMATION_FLAG_USE_TYPE)
            .with_groups(HUMAN, &[0, 1, 2, 3, 4, 5, 9, 15, 23, 24, 25], 4)
            .with_body(0x00CC, AnimationGroupsType::Animal)
            .with_groups(0x00CC, &[0, 1, 2, 9], 6)
    }

    fn human_at(x: u16, y: u16) -> Mobile {
        let mut mobile = Mobile::new(Serial(0x10));
        mobile.entity.set_graphic(HUMAN);
        mobile.entity.set_position(Position::new(x, y, 0));
        mobile.entity.set_direction(Direction::NORTH);
        mobile.entity.process_delta();
        mobile.entity.take_changes();
        mobile
    }

    fn tick(mobile: &mut Mobile, data: &AnimationLibrary, total_ms: u64, smooth: bool) {
        let ctx = TickContext {
            animations: data,
            speed: &StandardMovementSpeed,
            smooth_movement: smooth,
        };
        mobile.update(total_ms, 50, &ctx);
    }

    #[test]
    fn test_turn_then_walk_east() {
        let data = library();
        let mut mobile = human_at(100, 100);

        assert!(mobile.enqueue_step(101, 100, 0, Direction::EAST, false));
        let steps: Vec<_> = mobile.steps().iter().copied().collect();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].position(), Position::new(100, 100, 0));
        assert_eq!(steps[0].direction, Direction::EAST);
        assert_eq!(steps[1].position(), Position::new(101, 100, 0));
        assert_eq!(steps[1].direction, Direction::EAST);

        // The turn commits at once, the move waits for its budget
        tick(&mut mobile, &data, 0, true);
        assert_eq!(mobile.direction(), Direction::EAST);
        assert_eq!(mobile.position(), Position::new(100, 100, 0));
        assert_eq!(mobile.steps().len(), 1);

        tick(&mut mobile, &data, 200, true);
        assert!(mobile.entity.object.offset.x > 0.0);
        assert_eq!(mobile.steps().len(), 1);

        tick(&mut mobile, &data, 385, true);
        assert_eq!(mobile.position(), Position::new(101, 100, 0));
        assert!(mobile.steps().is_empty());
        assert_eq!(mobile.entity.object.offset, Vec3::ZERO);
        assert!(mobile.entity.take_changes().contains(&crate::game::objects::EntityChange::Position));
    }

    #[test]
    fn test_enqueue_same_target_is_noop() {
        let mut mobile = human_at(10, 10);
        assert!(mobile.enqueue_step(10, 10, 0, Direction::NORTH, false));
        assert!(mobile.steps().is_empty());
    }

    #[test]
    fn test_enqueue_turn_in_place() {
        let mut mobile = human_at(10, 10);
        assert!(mobile.enqueue_step(10, 10, 0, Direction::WEST, true));
        assert_eq!(mobile.steps().len(), 1);
        let step = mobile.steps().front().copied().unwrap();
        assert_eq!(step.direction.facing(), Direction::WEST);
        assert!(step.is_running());
    }

    #[test]
    fn test_enqueue_rejects_when_full() {
        let mut mobile = human_at(10, 10);
        // Facing north already, every step north is a single move
        for i in 1..=5u16 {
            assert!(mobile.enqueue_step(10, 10 - i, 0, Direction::NORTH, false));
        }
        assert_eq!(mobile.steps().len(), 5);
        assert!(!mobile.enqueue_step(10, 4, 0, Direction::NORTH, false));
        assert_eq!(mobile.steps().len(), 5);
    }

    #[test]
    fn test_turn_and_move_need_room_for_both() {
        let mut mobile = human_at(10, 10);
        for i in 1..=4u16 {
            assert!(mobile.enqueue_step(10, 10 - i, 0, Direction::NORTH, false));
        }

        // Turn east plus the move would make six
        assert!(!mobile.enqueue_step(11, 6, 0, Direction::EAST, false));
        assert_eq!(mobile.steps().len(), 4);
        assert_eq!(mobile.end_position(), (Position::new(10, 6, 0), Direction::NORTH));

        // A turn in place still fits
        assert!(mobile.enqueue_step(10, 6, 0, Direction::EAST, false));
        assert_eq!(mobile.steps().len(), 5);
        assert_eq!(mobile.end_position(), (Position::new(10, 6, 0), Direction::EAST));
    }

    #[test]
    fn test_mounted_run_is_faster() {
        let data = library();
        let mut mobile = human_at(50, 50);
        mobile.equip(Layer::Mount, EquippedItem::new(Serial(0x4000_0001), 0x3EA2));
        mobile.enqueue_step(50, 49, 0, Direction::NORTH, true);

        tick(&mut mobile, &data, 98, false);
        assert_eq!(mobile.position(), Position::new(50, 50, 0));
        tick(&mut mobile, &data, 99, false);
        assert_eq!(mobile.position(), Position::new(50, 49, 0));
    }

    #[test]
    fn test_smooth_movement_off_keeps_zero_offset() {
        let data = library();
        let mut mobile = human_at(50, 50);
        mobile.enqueue_step(50, 49, 0, Direction::NORTH, false);
        tick(&mut mobile, &data, 200, false);
        assert_eq!(mobile.entity.object.offset, Vec3::ZERO);
    }

    #[test]
    fn test_offset_grows_with_elapsed_time() {
        let data = library();
        let mut mobile = human_at(50, 50);
        mobile.enqueue_step(50, 49, 0, Direction::NORTH, false);

        tick(&mut mobile, &data, 80, true);
        let early = mobile.entity.object.offset;
        tick(&mut mobile, &data, 240, true);
        let late = mobile.entity.object.offset;

        // North moves up and to the right on screen
        assert!(late.x > early.x && early.x > 0.0);
        assert!(late.y < early.y && early.y < 0.0);
        assert_relative_eq!(late.x, -late.y);
    }

    #[test]
    fn test_non_adjacent_step_snaps() {
        let data = library();
        let mut mobile = human_at(50, 50);
        mobile.enqueue_step(50, 45, 0, Direction::NORTH, false);
        tick(&mut mobile, &data, 10, true);
        assert_eq!(mobile.position(), Position::new(50, 45, 0));
    }

    #[test]
    fn test_idle_frames_loop() {
        let data = library();
        let mut mobile = human_at(10, 10);

        for step in 1..=6u64 {
            tick(&mut mobile, &data, step * 100, false);
        }
        // Four stand frames, six advances
        assert_eq!(mobile.entity.object.anim_index, 2);
        assert_eq!(mobile.animation_group(), NO_GROUP);
    }

    #[test]
    fn test_server_animation_plays_once() {
        let data = library();
        let mut mobile = human_at(10, 10);
        mobile.ticks = 1000;
        mobile.play_server_animation(9, 0, 0, 1, false, true);

        // Interval 0 doubles the frame delay to 160ms
        for t in [1001, 1162, 1323] {
            tick(&mut mobile, &data, t, false);
            assert!(mobile.is_animation_from_server());
        }
        assert_eq!(mobile.entity.object.anim_index, 3);

        tick(&mut mobile, &data, 1484, false);
        assert!(!mobile.is_animation_from_server());
        assert_eq!(mobile.animation_group(), NO_GROUP);
        assert_eq!(mobile.entity.object.anim_index, 0);
    }

    #[test]
    fn test_server_animation_repeats_once_more() {
        let data = library();
        let mut mobile = human_at(10, 10);
        mobile.ticks = 1000;
        mobile.play_server_animation(9, 0, 0, 2, true, true);

        let mut t = 1001;
        for _ in 0..4 {
            tick(&mut mobile, &data, t, false);
            t += 161;
        }
        // First pass wrapped, one repeat left
        assert!(mobile.is_animation_from_server());
        assert_eq!(mobile.entity.object.anim_index, 0);

        for _ in 0..4 {
            tick(&mut mobile, &data, t, false);
            t += 161;
        }
        assert!(!mobile.is_animation_from_server());
    }

    #[test]
    fn test_reverse_server_animation() {
        let data = library();
        let mut mobile = human_at(10, 10);
        mobile.ticks = 1000;
        mobile.play_server_animation(9, 0, 0, 1, false, false);

        tick(&mut mobile, &data, 1001, false);
        // Wrapped below zero onto the last frame and finished
        assert_eq!(mobile.entity.object.anim_index, 3);
        assert!(!mobile.is_animation_from_server());
    }

    #[test]
    fn test_moving_cancels_server_animation() {
        let data = library();
        let mut mobile = human_at(10, 10);
        mobile.enqueue_step(10, 9, 0, Direction::NORTH, false);
        mobile.play_server_animation(9, 0, 0, 1, false, true);
        tick(&mut mobile, &data, 10, false);
        assert!(!mobile.is_animation_from_server());
    }

    #[test]
    fn test_play_new_animation() {
        let data = library();
        let mut mobile = human_at(10, 10);
        assert_eq!(mobile.play_new_animation(&data, 0, 4, 0), Some(9));
        assert!(mobile.is_animation_from_server());
        assert_eq!(mobile.animation_group(), 9);
    }

    #[test]
    fn test_equipment_slots() {
        let mut mobile = human_at(10, 10);
        let sword = EquippedItem::new(Serial(0x4000_0001), 0x13B9);
        assert!(mobile.equip(Layer::OneHanded, sword).is_none());
        assert!(mobile.is_one_handed());
        assert_eq!(mobile.equipped().count(), 1);
        assert_eq!(mobile.unequip_serial(Serial(0x4000_0001)), Some(Layer::OneHanded));
        assert!(!mobile.is_one_handed());

        mobile.equip(Layer::Mount, EquippedItem::new(Serial(0x4000_0002), BOAT_MOUNT_GRAPHIC));
        assert!(!mobile.is_mounted());
    }

    #[test]
    fn test_stats_deltas() {
        let mut mobile = human_at(10, 10);
        mobile.set_hits(50, 100);
        mobile.set_mana(10, 20);
        mobile.set_stamina(5, 5);
        mobile.set_hits(50, 100);
        assert_eq!(mobile.entity.delta(), Delta::HITS | Delta::MANA | Delta::STAMINA);
    }

    #[test]
    fn test_ghost_animates_living_body() {
        let mut ghost = human_at(1, 1);
        ghost.entity.set_graphic(0x0192);
        assert!(ghost.is_dead());
        assert_eq!(ghost.graphic_for_animation(), 0x0190);
    }
}
