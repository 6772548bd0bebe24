// Local player: predicted walking, stats, skills and weapon abilities

use super::abilities::{abilities_for, AbilityPair};
use super::mobile::{Mobile, SpeedMode, TickContext};
use super::movement::{MovementSpeed, TURN_DELAY};
use super::step::{Step, StepQueue};
use crate::core::{Direction, Position, Serial};
use crate::engine::assets::AnimationData;
use crate::engine::config::MovementMode;
use crate::game::objects::{Delta, GameObject, Layer, View, WorldObject};
use crate::game::world::{HasSerial, Pathfinder, WalkRequestSender, WalkTarget};

/// First walk sequence number; zero is never sent
pub const FIRST_SEQUENCE: u8 = 1;

/// Collaborators needed to issue a walk request
pub struct WalkContext<'a> {
    pub now: u64,
    pub pathfinder: &'a dyn Pathfinder,
    pub sender: &'a mut dyn WalkRequestSender,
    pub speed: &'a dyn MovementSpeed,
    pub animations: &'a dyn AnimationData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SkillLock {
    #[default]
    Up,
    Down,
    Locked,
}

impl SkillLock {
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            1 => SkillLock::Down,
            2 => SkillLock::Locked,
            _ => SkillLock::Up,
        }
    }
}

/// One skill, values in tenths of a point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Skill {
    pub value: u16,
    pub base: u16,
    pub cap: u16,
    pub lock: SkillLock,
}

/// Character sheet numbers sent in the status bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayerStats {
    pub strength: u16,
    pub dexterity: u16,
    pub intelligence: u16,
    pub stat_cap: u16,
    pub gold: u32,
    pub weight: u16,
    pub weight_max: u16,
    pub followers: u8,
    pub followers_max: u8,
    pub physical_resistance: i16,
    pub fire_resistance: i16,
    pub cold_resistance: i16,
    pub poison_resistance: i16,
    pub energy_resistance: i16,
    pub luck: i16,
    pub tithing_points: u32,
}

/// The mobile controlled by this client
#[derive(Debug)]
pub struct PlayerMobile {
    pub mobile: Mobile,
    requested: StepQueue,
    sequence: u8,
    last_step_request_time: u64,
    movement_mode: MovementMode,
    stats: PlayerStats,
    skills: Vec<Skill>,
    abilities: AbilityPair,
}

impl PlayerMobile {
    pub fn new(serial: Serial, movement_mode: MovementMode) -> Self {
        Self {
            mobile: Mobile::new_player(serial),
            requested: StepQueue::new(),
            sequence: FIRST_SEQUENCE,
            last_step_request_time: 0,
            movement_mode,
            stats: PlayerStats::default(),
            skills: Vec::new(),
            abilities: AbilityPair::default(),
        }
    }

    pub fn serial(&self) -> Serial {
        self.mobile.serial()
    }

    pub fn position(&self) -> Position {
        self.mobile.position()
    }

    pub fn direction(&self) -> Direction {
        self.mobile.direction()
    }

    /// Steps sent to the server and not yet confirmed
    pub fn requested_steps(&self) -> &StepQueue {
        &self.requested
    }

    /// Sequence number the next walk request will carry
    pub fn sequence(&self) -> u8 {
        self.sequence
    }

    pub fn movement_mode(&self) -> MovementMode {
        self.movement_mode
    }

    pub fn set_movement_mode(&mut self, movement_mode: MovementMode) {
        self.movement_mode = movement_mode;
    }

    /// Request one step or turn.
    ///
    /// Returns false while the previous request is still cooling down, when
    /// too many requests are unconfirmed, or when the pathfinder refuses the
    /// move and no turn is possible instead.
    pub fn walk(&mut self, direction: Direction, run: bool, ctx: &mut WalkContext<'_>) -> bool {
        if self.last_step_request_time > ctx.now {
            return false;
        }

        if self.requested.is_full() {
            log::debug!("{} walk refused, {} steps unconfirmed", self.serial(), self.requested.len());
            return false;
        }

        let run = run && self.mobile.speed_mode() < SpeedMode::CantRun;
        self.mobile.ticks = self.mobile.ticks.max(ctx.now);

        let (origin, old_direction) = match self.requested.back() {
            Some(step) => (step.position(), step.direction),
            None => self.mobile.end_position(),
        };
        let old_direction = old_direction.facing();
        let direction = direction.facing();

        let mut target = WalkTarget::new(origin, direction);
        let legal = ctx.pathfinder.can_walk(&self.mobile, &mut target);
        let new_direction = target.direction.facing();
        let step_time = ctx.speed.step_delay(run, self.mobile.is_mounted_for_speed());

        let (position, walk_time) = if old_direction == direction {
            if !legal {
                return false;
            }
            if new_direction != direction {
                (origin, TURN_DELAY)
            } else {
                (target.position(), step_time)
            }
        } else {
            if !legal && new_direction == old_direction {
                return false;
            }
            if new_direction == old_direction {
                (target.position(), step_time)
            } else {
                (origin, TURN_DELAY)
            }
        };

        let mut step = Step::new(position, new_direction.with_running(run));
        step.seq = self.sequence;

        if self.movement_mode == MovementMode::AnimateImmediately {
            let mut queued = true;
            for pending in self.requested.iter_mut().filter(|s| !s.anim) {
                queued = self.mobile.enqueue_step(
                    pending.x,
                    pending.y,
                    pending.z,
                    pending.direction,
                    pending.is_running(),
                );
                if !queued {
                    break;
                }
                pending.anim = true;
            }

            // Left un-animated, the step is replayed when confirmed
            step.anim = queued
                && self
                    .mobile
                    .enqueue_step(step.x, step.y, step.z, step.direction, run);
        }

        self.requested.push(step);
        ctx.sender.send_walk_request(step.direction, step.seq);
        log::debug!("{} walk #{} {:?} to {}", self.serial(), step.seq, step.direction, position);

        self.sequence = if self.sequence == u8::MAX {
            FIRST_SEQUENCE
        } else {
            self.sequence + 1
        };
        self.last_step_request_time = ctx.now + walk_time;
        self.mobile.group_for_animation(ctx.animations, None);

        true
    }

    /// Server accepted a walk request
    pub fn confirm_walk(&mut self, seq: u8, sender: &mut dyn WalkRequestSender) {
        let Some(front) = self.requested.front().copied() else {
            log::warn!("{} confirm #{} with nothing pending", self.serial(), seq);
            sender.request_resync();
            return;
        };

        if front.seq != seq {
            log::debug!("{} ignoring confirm #{}, expected #{}", self.serial(), seq, front.seq);
            return;
        }

        self.requested.pop();

        if !front.anim {
            let (_, end_direction) = self.mobile.end_position();
            if front.direction.facing() == end_direction.facing()
                && self.movement_mode == MovementMode::AnimateOnConfirm
            {
                self.movement_mode = MovementMode::AnimateImmediately;
            }

            self.mobile
                .enqueue_step(front.x, front.y, front.z, front.direction, front.is_running());
        }
    }

    /// Server rejected a walk request; roll back to its position
    pub fn deny_walk(
        &mut self,
        seq: u8,
        direction: Direction,
        position: Position,
        sender: &mut dyn WalkRequestSender,
    ) {
        let Some(front) = self.requested.front().copied() else {
            log::warn!("{} deny #{} with nothing pending", self.serial(), seq);
            sender.request_resync();
            return;
        };

        log::warn!("{} walk #{} denied, back to {}", self.serial(), seq, position);
        self.reset_steps();
        self.mobile.force_position(position, direction);

        if front.seq != seq {
            sender.request_resync();
        }
    }

    /// Drop every unconfirmed request and restart the sequence
    pub fn reset_steps(&mut self) {
        self.requested.clear();
        self.sequence = FIRST_SEQUENCE;
        self.last_step_request_time = 0;
    }

    pub fn stats(&self) -> &PlayerStats {
        &self.stats
    }

    pub fn set_stats(&mut self, stats: PlayerStats) {
        if self.stats != stats {
            self.stats = stats;
            self.mobile.entity.add_delta(Delta::STATS);
        }
    }

    pub fn skill(&self, index: usize) -> Option<&Skill> {
        self.skills.get(index)
    }

    pub fn skills(&self) -> &[Skill] {
        &self.skills
    }

    /// Store a skill, growing the table as needed
    pub fn update_skill(&mut self, index: usize, skill: Skill) {
        if index >= self.skills.len() {
            self.skills.resize(index + 1, Skill::default());
        }

        if self.skills[index] != skill {
            self.skills[index] = skill;
            self.mobile.entity.add_delta(Delta::SKILLS);
        }
    }

    /// Change a lock arrow, false for an unknown skill
    pub fn update_skill_lock(&mut self, index: usize, lock: SkillLock) -> bool {
        let Some(skill) = self.skills.get_mut(index) else {
            return false;
        };

        if skill.lock != lock {
            skill.lock = lock;
            self.mobile.entity.add_delta(Delta::SKILLS);
        }
        true
    }

    pub fn abilities(&self) -> AbilityPair {
        self.abilities
    }

    /// Recompute abilities from the weapons in hand
    pub fn update_abilities(&mut self) -> AbilityPair {
        let graphic = |layer| self.mobile.equipment(layer).map(|item| item.graphic);
        self.abilities = abilities_for(graphic(Layer::TwoHanded), graphic(Layer::OneHanded));
        self.abilities
    }

    pub fn update(&mut self, total_ms: u64, frame_ms: u64, ctx: &TickContext<'_>) {
        self.mobile.update(total_ms, frame_ms, ctx);
    }

    pub fn process_delta(&mut self) {
        self.mobile.entity.process_delta();
    }
}

impl HasSerial for PlayerMobile {
    fn serial(&self) -> Serial {
        self.mobile.serial()
    }
}

impl WorldObject for PlayerMobile {
    fn object(&self) -> &GameObject {
        self.mobile.object()
    }

    fn object_mut(&mut self) -> &mut GameObject {
        self.mobile.object_mut()
    }

    fn create_view(&self) -> View {
        self.mobile.create_view()
    }
}
