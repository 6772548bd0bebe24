// Animation group resolution for mobiles
//
// Bodies use one of three group taxonomies. A requested group is first
// translated through the association table, corrected to a variant the
// body actually has, then overridden by the movement state.

use super::mobile::Mobile;
use crate::engine::assets::{
    self, AnimationData, AnimationGroup, AnimationGroupsType, ANIMATION_FLAG_STANCE,
    ANIMATION_FLAG_USE_TYPE, MAX_ANIMATIONS_DATA_INDEX_COUNT,
};

/// Group id meaning "no explicit group, derive from state"
pub const NO_GROUP: u8 = 0xFF;

/// Groups of animal bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LowAnimationGroup {
    Walk = 0,
    Run,
    Stand,
    Eat,
    Unknown,
    Attack1,
    Attack2,
    Attack3,
    Die1,
    Fidget1,
    Fidget2,
    LieDown,
    Die2,
}

/// Groups of monster bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum HighAnimationGroup {
    Walk = 0,
    Stand,
    Die1,
    Die2,
    Attack1,
    Attack2,
    Attack3,
    Misc1,
    Misc2,
    Misc3,
    Stumble,
    SlapGround,
    Cast,
    GetHit1,
    Misc4,
    GetHit2,
    GetHit3,
    Fidget1,
    Fidget2,
    Fly,
    Land,
    DieInFlight,
}

/// Groups of human and equipment bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PeopleAnimationGroup {
    WalkUnarmed = 0,
    WalkArmed,
    RunUnarmed,
    RunArmed,
    Stand,
    Fidget1,
    Fidget2,
    StandOneHandedAttack,
    StandTwoHandedAttack,
    AttackOneHanded,
    AttackUnarmed1,
    AttackUnarmed2,
    AttackTwoHandedDown,
    AttackTwoHandedWide,
    AttackTwoHandedJab,
    WalkWarMode,
    CastDirected,
    CastArea,
    AttackBow,
    AttackCrossbow,
    GetHit,
    Die1,
    Die2,
    OnMountRideSlow,
    OnMountRideFast,
    OnMountStand,
    OnMountAttack,
    OnMountAttackBow,
    OnMountAttackCrossbow,
    OnMountSlapHorse,
    Turn,
    AttackUnarmedAndWalk,
    EmoteBow,
    EmoteSalute,
    Fidget3,
}

/// Number of people groups covered by the association table
pub const PEOPLE_ANIMATION_COUNT: usize = PeopleAnimationGroup::Fidget3 as usize + 1;

/// Body graphic whose monster groups are shifted by one
const SHIFTED_HIGH_BODY: u16 = 151;

/// War-mode stance pair used by flying gargoyles
const STANCE_GROUPS: [u8; 2] = [64, 65];

/// People group to the equivalent (low, high, people) group
const GROUP_ASSOCIATIONS: [[u8; 3]; PEOPLE_ANIMATION_COUNT] = [
    [0, 0, 0],
    [0, 0, 1],
    [1, 19, 2],
    [1, 19, 3],
    [2, 1, 4],
    [9, 17, 5],
    [10, 18, 6],
    [2, 1, 7],
    [2, 1, 8],
    [3, 6, 9],
    [3, 4, 10],
    [3, 5, 11],
    [3, 6, 12],
    [3, 4, 13],
    [3, 5, 14],
    [0, 0, 15],
    [3, 5, 16],
    [3, 6, 17],
    [3, 4, 18],
    [3, 5, 19],
    [3, 13, 20],
    [8, 2, 21],
    [12, 3, 22],
    [0, 0, 23],
    [1, 19, 24],
    [2, 1, 25],
    [3, 4, 26],
    [3, 5, 27],
    [3, 4, 28],
    [3, 5, 29],
    [3, 1, 30],
    [0, 0, 31],
    [3, 1, 32],
    [3, 1, 33],
    [9, 17, 34],
];

/// Translate a people group into the taxonomy of `group_index`
pub fn associated_group(group: u8, group_index: AnimationGroup) -> u8 {
    GROUP_ASSOCIATIONS
        .get(group as usize)
        .map(|row| row[group_index.column()])
        .unwrap_or(group)
}

/// Collapse a group the body lacks onto a variant, then onto standing
pub fn correct_animation_group(
    data: &dyn AnimationData,
    graphic: u16,
    group_index: AnimationGroup,
    group: u8,
) -> u8 {
    use HighAnimationGroup as High;
    use LowAnimationGroup as Low;

    match group_index {
        AnimationGroup::Low => {
            let group = match group {
                g if g == Low::Die2 as u8 => Low::Die1 as u8,
                g if g == Low::Fidget2 as u8 => Low::Fidget1 as u8,
                g if g == Low::Attack3 as u8 || g == Low::Attack2 as u8 => Low::Attack1 as u8,
                g => g,
            };

            if data.animation_exists(graphic, group) {
                group
            } else {
                Low::Stand as u8
            }
        }
        AnimationGroup::High => {
            let group = match group {
                g if g == High::Die2 as u8 => High::Die1 as u8,
                g if g == High::Fidget2 as u8 => High::Fidget1 as u8,
                g if g == High::Attack3 as u8 || g == High::Attack2 as u8 => High::Attack1 as u8,
                g if g == High::GetHit3 as u8 || g == High::GetHit2 as u8 => High::GetHit1 as u8,
                g if g == High::Misc4 as u8 || g == High::Misc3 as u8 || g == High::Misc2 as u8 => {
                    High::Misc1 as u8
                }
                g if g == High::Fly as u8 => High::Walk as u8,
                g => g,
            };

            if data.animation_exists(graphic, group) {
                group
            } else {
                High::Stand as u8
            }
        }
        AnimationGroup::People => group,
    }
}

/// Ground group ranges of a gargoyle and their in-flight counterpart.
///
/// Group ids are bytes, the rows past 255 never match.
const FLYING_GROUPS: [(u16, u16, u8); 13] = [
    (0, 1, 62),
    (2, 3, 63),
    (4, 4, 64),
    (6, 6, 66),
    (7, 8, 65),
    (9, 11, 71),
    (12, 14, 72),
    (15, 15, 62),
    (20, 20, 77),
    (31, 31, 71),
    (34, 34, 78),
    (200, 259, 75),
    (260, 270, 75),
];

/// Ground group of a gargoyle to its in-flight counterpart
pub fn flying_group(group: u8) -> u8 {
    let group16 = group as u16;
    FLYING_GROUPS
        .iter()
        .find(|(from, to, _)| (*from..=*to).contains(&group16))
        .map(|(_, _, flying)| *flying)
        .unwrap_or(group)
}

impl Mobile {
    /// Group to animate right now.
    ///
    /// `check_graphic` overrides the body being resolved, used for the
    /// mount underneath a rider. May reset `anim_index` when the mobile
    /// falls back to standing.
    pub fn group_for_animation(&mut self, data: &dyn AnimationData, check_graphic: Option<u16>) -> u8 {
        use HighAnimationGroup as High;
        use LowAnimationGroup as Low;
        use PeopleAnimationGroup as People;

        let graphic = check_graphic.unwrap_or_else(|| self.graphic_for_animation());
        if graphic >= MAX_ANIMATIONS_DATA_INDEX_COUNT {
            return 0;
        }

        let group_index = assets::group_index(data, graphic);
        let mut result = self.animation_group;

        if result != NO_GROUP
            && !self.serial().is_virtual()
            && (!self.animation_from_server || check_graphic.is_some())
        {
            result = associated_group(result, group_index);
            if !data.animation_exists(graphic, result) {
                result = correct_animation_group(data, graphic, group_index, result);
            }
        }

        let mut is_walking = self.is_walking();
        let mut is_run = self.entity.direction().is_running();
        if let Some(step) = self.steps.front() {
            is_walking = true;
            is_run = step.is_running();
        }

        match group_index {
            AnimationGroup::Low => {
                if is_walking {
                    result = if is_run { Low::Run as u8 } else { Low::Walk as u8 };
                } else if self.animation_group == NO_GROUP {
                    result = Low::Stand as u8;
                    self.entity.object.anim_index = 0;
                }
            }
            AnimationGroup::High => {
                if is_walking {
                    result = High::Walk as u8;
                    if is_run && data.animation_exists(graphic, High::Fly as u8) {
                        result = High::Fly as u8;
                    }
                } else if self.animation_group == NO_GROUP {
                    result = High::Stand as u8;
                    self.entity.object.anim_index = 0;
                }

                if graphic == SHIFTED_HIGH_BODY {
                    result = result.wrapping_add(1);
                }
            }
            AnimationGroup::People => {
                let mounted = self.is_mounted();
                let one_handed = self.is_one_handed();
                let two_handed = self.is_two_handed();
                let armed = one_handed || two_handed;
                let dead = self.is_dead();
                let war = self.in_war_mode();

                let mut walk = is_walking && !is_run;
                if is_walking && is_run {
                    result = if mounted {
                        People::OnMountRideFast as u8
                    } else if armed {
                        People::RunArmed as u8
                    } else {
                        People::RunUnarmed as u8
                    };

                    if !self.is_human() && !data.animation_exists(graphic, result) {
                        walk = true;
                    }
                }

                if walk {
                    result = if mounted {
                        People::OnMountRideSlow as u8
                    } else if armed && !dead {
                        if war {
                            People::WalkWarMode as u8
                        } else {
                            People::WalkArmed as u8
                        }
                    } else if war && !dead {
                        People::WalkWarMode as u8
                    } else {
                        People::WalkUnarmed as u8
                    };
                } else if !is_walking && self.animation_group == NO_GROUP {
                    result = if mounted {
                        People::OnMountStand as u8
                    } else if war && !dead {
                        if two_handed {
                            People::StandTwoHandedAttack as u8
                        } else {
                            People::StandOneHandedAttack as u8
                        }
                    } else {
                        People::Stand as u8
                    };
                    self.entity.object.anim_index = 0;
                }

                if self.is_gargoyle() && self.is_flying() {
                    result = flying_group(result);
                }
            }
        }

        result
    }

    /// Group for a typed server animation request, `None` when the action
    /// has no form for this body (typically because it is mounted)
    pub fn new_animation_group(
        &self,
        data: &dyn AnimationData,
        kind: u16,
        action: u16,
        mode: u8,
    ) -> Option<u8> {
        use AnimationGroupsType as Type;

        let graphic = self.graphic();
        if graphic >= MAX_ANIMATIONS_DATA_INDEX_COUNT {
            return Some(0);
        }

        let flags = data.animation_flags(graphic);
        let body = if flags & ANIMATION_FLAG_USE_TYPE != 0 {
            data.group_type(graphic)
        } else {
            Type::Monster
        };
        let mounted = self.is_mounted();
        let odd = mode % 2 != 0;
        let unless_mounted = |group: u8| if mounted { NO_GROUP } else { group };

        let group = match kind {
            0 if action > 10 => 0,
            0 => match body {
                Type::Monster => match mode % 4 {
                    1 => 5,
                    2 => 6,
                    3 if flags & ANIMATION_FLAG_STANCE != 0 => 12,
                    _ => 4,
                },
                Type::SeaMonster | Type::Animal => {
                    if odd {
                        6
                    } else {
                        5
                    }
                }
                _ if mounted => match action {
                    0 => 29,
                    1 => 27,
                    2 => 28,
                    _ => 26,
                },
                _ => match action {
                    1 => 18,
                    2 => 19,
                    3 => 11,
                    4 => 9,
                    5 => 10,
                    6 => 12,
                    7 => 13,
                    8 => 14,
                    _ if data.animation_exists(graphic, 31) => 31,
                    _ if odd => 6,
                    _ => 5,
                },
            },
            1 | 2 => match body {
                Type::Monster => {
                    if odd {
                        15
                    } else {
                        16
                    }
                }
                t if t <= Type::Animal => NO_GROUP,
                _ => unless_mounted(30),
            },
            3 => match body {
                Type::Monster => {
                    if odd {
                        2
                    } else {
                        3
                    }
                }
                Type::SeaMonster => 8,
                Type::Animal => {
                    if odd {
                        21
                    } else {
                        22
                    }
                }
                _ => {
                    if odd {
                        8
                    } else {
                        12
                    }
                }
            },
            4 => match body {
                Type::Monster => 10,
                t if t > Type::Animal => unless_mounted(20),
                _ => 7,
            },
            5 => match body {
                Type::Monster | Type::SeaMonster => {
                    if odd {
                        18
                    } else {
                        17
                    }
                }
                Type::Animal => match mode % 3 {
                    1 => 10,
                    2 => 3,
                    _ => 9,
                },
                _ => unless_mounted(if odd { 6 } else { 5 }),
            },
            6 | 14 => match body {
                Type::Monster => 11,
                Type::SeaMonster => 5,
                Type::Animal => 3,
                _ => unless_mounted(34),
            },
            7 => match action {
                _ if mounted => NO_GROUP,
                0 => 32,
                1 => 33,
                _ => 0,
            },
            8 => match body {
                Type::Monster => 11,
                Type::SeaMonster => 3,
                Type::Animal => 9,
                _ => unless_mounted(33),
            },
            9 | 10 => match body {
                Type::Monster => 20,
                _ => NO_GROUP,
            },
            11 => match body {
                Type::Monster => 12,
                Type::SeaMonster => 5,
                _ => unless_mounted(if action == 1 || action == 2 { 17 } else { 16 }),
            },
            _ => 0,
        };

        (group != NO_GROUP).then_some(group)
    }

    /// Stance group pair swapped by war mode
    pub(super) fn stance_group(&self, group: u8) -> Option<u8> {
        STANCE_GROUPS
            .contains(&group)
            .then(|| if self.in_war_mode() { STANCE_GROUPS[1] } else { STANCE_GROUPS[0] })
    }
}
