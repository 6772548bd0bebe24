// Mobiles: animated actors
//
// - Step queue and movement timing
// - Animation group resolution
// - The local player's walk protocol
// - Weapon ability table

pub mod abilities;
pub mod animation;
pub mod mobile;
pub mod movement;
pub mod player;
pub mod step;

pub use abilities::{abilities_for, weapon_abilities, Ability, AbilityPair};
pub use animation::NO_GROUP;
pub use mobile::{EquippedItem, Mobile, Notoriety, Race, SpeedMode, TickContext};
pub use movement::{MovementSpeed, StandardMovementSpeed};
pub use player::{PlayerMobile, PlayerStats, Skill, SkillLock, WalkContext};
pub use step::{Step, StepQueue, MAX_STEP_COUNT};
