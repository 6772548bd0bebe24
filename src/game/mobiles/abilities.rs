// Weapon special abilities

use std::collections::HashMap;
use std::sync::OnceLock;

/// Special move granted by a weapon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u16)]
pub enum Ability {
    #[default]
    None = 0,
    ArmorIgnore = 1,
    BleedAttack = 2,
    ConcussionBlow = 3,
    CrushingBlow = 4,
    Disarm = 5,
    Dismount = 6,
    DoubleStrike = 7,
    InfectiousStrike = 8,
    MortalStrike = 9,
    MovingShot = 10,
    ParalyzingBlow = 11,
    ShadowStrike = 12,
    WhirlwindAttack = 13,
    RidingSwipe = 14,
    FrenziedWhirlwind = 15,
    Block = 16,
    DefenseMastery = 17,
    NerveStrike = 18,
    TalonStrike = 19,
    Feint = 20,
    DualWield = 21,
    DoubleShot = 22,
    ArmorPierce = 23,
    Bladeweave = 24,
    ForceArrow = 25,
    LightningArrow = 26,
    PsychicAttack = 27,
    SerpentArrow = 28,
    ForceOfNature = 29,
    InfusedThrow = 30,
    MysticArc = 31,
    Invalid,
}

/// Primary and secondary ability of a weapon
pub type AbilityPair = (Ability, Ability);

/// Weapon graphics (every art variant) and the abilities they grant
const WEAPON_ABILITIES: &[(&[u16], Ability, Ability)] = &[
    (&[0x0901], Ability::MovingShot, Ability::InfusedThrow),
    (&[0x0902], Ability::InfectiousStrike, Ability::ShadowStrike),
    (&[0x0905], Ability::DoubleShot, Ability::MortalStrike),
    (&[0x0906], Ability::CrushingBlow, Ability::Dismount),
    (&[0x090C], Ability::BleedAttack, Ability::MortalStrike),
    (&[0x0DF0, 0x0DF1], Ability::WhirlwindAttack, Ability::ParalyzingBlow),
    (&[0x0DF2, 0x0DF3, 0x0DF4, 0x0DF5], Ability::Dismount, Ability::Disarm),
    (&[0x0E81, 0x0E82], Ability::CrushingBlow, Ability::Disarm),
    (&[0x0E85, 0x0E86], Ability::DoubleShot, Ability::Disarm),
    (&[0x0E87, 0x0E88], Ability::BleedAttack, Ability::Dismount),
    (&[0x0E89, 0x0E8A], Ability::DoubleShot, Ability::ConcussionBlow),
    (&[0x0EC2, 0x0EC3], Ability::BleedAttack, Ability::InfectiousStrike),
    (&[0x0EC4, 0x0EC5], Ability::ShadowStrike, Ability::Disarm),
    (&[0x0F43, 0x0F44], Ability::ArmorIgnore, Ability::Disarm),
    (&[0x0F45, 0x0F46], Ability::BleedAttack, Ability::MortalStrike),
    (&[0x0F47, 0x0F48], Ability::BleedAttack, Ability::ConcussionBlow),
    (&[0x0F49, 0x0F4A], Ability::CrushingBlow, Ability::Dismount),
    (&[0x0F4B, 0x0F4C], Ability::DoubleShot, Ability::WhirlwindAttack),
    (&[0x0F4D, 0x0F4E], Ability::ParalyzingBlow, Ability::Dismount),
    (&[0x0F4F, 0x0F50], Ability::ConcussionBlow, Ability::MortalStrike),
    (&[0x0F51, 0x0F52], Ability::InfectiousStrike, Ability::ShadowStrike),
    (&[0x0F5C, 0x0F5D], Ability::ConcussionBlow, Ability::Disarm),
    (&[0x0F5E, 0x0F5F], Ability::CrushingBlow, Ability::ArmorIgnore),
    (&[0x0F60, 0x0F61], Ability::ArmorIgnore, Ability::ConcussionBlow),
    (&[0x0F62, 0x0F63], Ability::ArmorIgnore, Ability::ParalyzingBlow),
    (&[0x0FB5], Ability::CrushingBlow, Ability::ShadowStrike),
    (&[0x13AF, 0x13B0], Ability::ArmorIgnore, Ability::BleedAttack),
    (&[0x13B1, 0x13B2], Ability::ParalyzingBlow, Ability::MortalStrike),
    (&[0x13B3, 0x13B4], Ability::ShadowStrike, Ability::Dismount),
    (&[0x13B7, 0x13B8], Ability::DoubleShot, Ability::ParalyzingBlow),
    (&[0x13B9, 0x13BA], Ability::ParalyzingBlow, Ability::CrushingBlow),
    (&[0x13FD], Ability::MovingShot, Ability::Dismount),
    (&[0x13E3], Ability::CrushingBlow, Ability::ShadowStrike),
    (&[0x13F6], Ability::InfectiousStrike, Ability::Disarm),
    (&[0x13F8], Ability::ConcussionBlow, Ability::ParalyzingBlow),
    (&[0x13FB], Ability::WhirlwindAttack, Ability::BleedAttack),
    (&[0x13FF], Ability::DoubleShot, Ability::ArmorIgnore),
    (&[0x1401], Ability::ArmorIgnore, Ability::InfectiousStrike),
    (&[0x1402, 0x1403], Ability::ShadowStrike, Ability::MortalStrike),
    (&[0x1404, 0x1405], Ability::BleedAttack, Ability::Disarm),
    (&[0x1406, 0x1407], Ability::CrushingBlow, Ability::BleedAttack),
    (&[0x1438, 0x1439], Ability::WhirlwindAttack, Ability::CrushingBlow),
    (&[0x143A, 0x143B], Ability::CrushingBlow, Ability::ConcussionBlow),
    (&[0x143C, 0x143D], Ability::ArmorIgnore, Ability::MortalStrike),
    (&[0x143E, 0x143F], Ability::WhirlwindAttack, Ability::ConcussionBlow),
    (&[0x1440, 0x1441], Ability::BleedAttack, Ability::ShadowStrike),
    (&[0x1442, 0x1443], Ability::DoubleShot, Ability::ShadowStrike),
    (&[0x26BA], Ability::BleedAttack, Ability::ParalyzingBlow),
    (&[0x26BB], Ability::ParalyzingBlow, Ability::MortalStrike),
    (&[0x26BC], Ability::CrushingBlow, Ability::MortalStrike),
    (&[0x26BD], Ability::ArmorIgnore, Ability::Dismount),
    (&[0x26BE], Ability::ParalyzingBlow, Ability::InfectiousStrike),
    (&[0x26BF], Ability::DoubleShot, Ability::InfectiousStrike),
    (&[0x26C0], Ability::Dismount, Ability::ConcussionBlow),
    (&[0x26C1], Ability::DoubleShot, Ability::MortalStrike),
    (&[0x26C2], Ability::ArmorIgnore, Ability::MovingShot),
    (&[0x26C3], Ability::DoubleShot, Ability::MovingShot),
    (&[0x26C4], Ability::BleedAttack, Ability::ParalyzingBlow),
    (&[0x26C5], Ability::ParalyzingBlow, Ability::MortalStrike),
    (&[0x26C6], Ability::CrushingBlow, Ability::MortalStrike),
    (&[0x26C7], Ability::ArmorIgnore, Ability::Dismount),
    (&[0x26C8], Ability::ParalyzingBlow, Ability::InfectiousStrike),
    (&[0x26C9], Ability::DoubleShot, Ability::InfectiousStrike),
    (&[0x26CA], Ability::Dismount, Ability::ConcussionBlow),
    (&[0x26CB], Ability::DoubleShot, Ability::MortalStrike),
    (&[0x26CC], Ability::ArmorIgnore, Ability::MovingShot),
    (&[0x26CD], Ability::DoubleShot, Ability::MovingShot),
    (&[0x27A2], Ability::CrushingBlow, Ability::RidingSwipe),
    (&[0x27A3], Ability::Feint, Ability::Block),
    (&[0x27A4], Ability::FrenziedWhirlwind, Ability::DoubleShot),
    (&[0x27A5], Ability::ArmorPierce, Ability::DoubleShot),
    (&[0x27A6], Ability::FrenziedWhirlwind, Ability::CrushingBlow),
    (&[0x27A7], Ability::DefenseMastery, Ability::FrenziedWhirlwind),
    (&[0x27A8], Ability::Feint, Ability::NerveStrike),
    (&[0x27A9], Ability::Feint, Ability::DoubleShot),
    (&[0x27AA], Ability::Disarm, Ability::ParalyzingBlow),
    (&[0x27AB], Ability::DualWield, Ability::TalonStrike),
    (&[0x27AD], Ability::WhirlwindAttack, Ability::DefenseMastery),
    (&[0x27AE], Ability::Block, Ability::Feint),
    (&[0x27AF], Ability::Block, Ability::ArmorPierce),
    (&[0x27ED], Ability::CrushingBlow, Ability::RidingSwipe),
    (&[0x27EE], Ability::Feint, Ability::Block),
    (&[0x27EF], Ability::FrenziedWhirlwind, Ability::DoubleShot),
    (&[0x27F0], Ability::ArmorPierce, Ability::DoubleShot),
    (&[0x27F1], Ability::FrenziedWhirlwind, Ability::CrushingBlow),
    (&[0x27F2], Ability::DefenseMastery, Ability::FrenziedWhirlwind),
    (&[0x27F3], Ability::Feint, Ability::NerveStrike),
    (&[0x27F4], Ability::Feint, Ability::DoubleShot),
    (&[0x27F5], Ability::Disarm, Ability::ParalyzingBlow),
    (&[0x27F6], Ability::DualWield, Ability::TalonStrike),
    (&[0x27F8], Ability::WhirlwindAttack, Ability::DefenseMastery),
    (&[0x27F9], Ability::Block, Ability::Feint),
    (&[0x27FA], Ability::Block, Ability::ArmorPierce),
    (&[0x2D1E], Ability::ForceArrow, Ability::SerpentArrow),
    (&[0x2D1F], Ability::LightningArrow, Ability::PsychicAttack),
    (&[0x2D20], Ability::PsychicAttack, Ability::BleedAttack),
    (&[0x2D21], Ability::InfectiousStrike, Ability::ShadowStrike),
    (&[0x2D22], Ability::Feint, Ability::ArmorIgnore),
    (&[0x2D23], Ability::Disarm, Ability::Bladeweave),
    (&[0x2D24], Ability::ConcussionBlow, Ability::CrushingBlow),
    (&[0x2D25], Ability::Block, Ability::ForceOfNature),
    (&[0x2D26], Ability::Disarm, Ability::Bladeweave),
    (&[0x2D27], Ability::WhirlwindAttack, Ability::Bladeweave),
    (&[0x2D28], Ability::Disarm, Ability::CrushingBlow),
    (&[0x2D29], Ability::DefenseMastery, Ability::Bladeweave),
    (&[0x2D2A], Ability::ForceArrow, Ability::SerpentArrow),
    (&[0x2D2B], Ability::LightningArrow, Ability::PsychicAttack),
    (&[0x2D2C], Ability::PsychicAttack, Ability::BleedAttack),
    (&[0x2D2D], Ability::InfectiousStrike, Ability::ShadowStrike),
    (&[0x2D2E], Ability::Feint, Ability::ArmorIgnore),
    (&[0x2D2F], Ability::Disarm, Ability::Bladeweave),
    (&[0x2D30], Ability::ConcussionBlow, Ability::CrushingBlow),
    (&[0x2D31], Ability::Block, Ability::ForceOfNature),
    (&[0x2D32], Ability::Disarm, Ability::Bladeweave),
    (&[0x2D33], Ability::WhirlwindAttack, Ability::Bladeweave),
    (&[0x2D34], Ability::Disarm, Ability::CrushingBlow),
    (&[0x2D35], Ability::DefenseMastery, Ability::Bladeweave),
    (&[0x4067], Ability::MysticArc, Ability::ConcussionBlow),
    (&[0x4068], Ability::DoubleShot, Ability::InfectiousStrike),
    (&[0x406B], Ability::ArmorIgnore, Ability::MortalStrike),
    (&[0x406C], Ability::MovingShot, Ability::InfusedThrow),
    (&[0x406D], Ability::DoubleShot, Ability::Disarm),
    (&[0x406E], Ability::ArmorIgnore, Ability::Disarm),
    (&[0x4072], Ability::BleedAttack, Ability::ParalyzingBlow),
    (&[0x4074], Ability::CrushingBlow, Ability::ConcussionBlow),
    (&[0x4075], Ability::WhirlwindAttack, Ability::Dismount),
    (&[0x4076], Ability::ArmorIgnore, Ability::MortalStrike),
    (&[0x48AE], Ability::BleedAttack, Ability::InfectiousStrike),
    (&[0x48B0], Ability::BleedAttack, Ability::ConcussionBlow),
    (&[0x48B2], Ability::CrushingBlow, Ability::Dismount),
    (&[0x48B4], Ability::ParalyzingBlow, Ability::Dismount),
    (&[0x48B6], Ability::InfectiousStrike, Ability::Disarm),
    (&[0x48B8], Ability::ConcussionBlow, Ability::ParalyzingBlow),
    (&[0x48BA], Ability::DoubleShot, Ability::ArmorIgnore),
    (&[0x48BC], Ability::ArmorIgnore, Ability::InfectiousStrike),
    (&[0x48BE], Ability::BleedAttack, Ability::Disarm),
    (&[0x48CA], Ability::Dismount, Ability::ConcussionBlow),
    (&[0x48C0], Ability::WhirlwindAttack, Ability::CrushingBlow),
    (&[0x48C2], Ability::CrushingBlow, Ability::ConcussionBlow),
    (&[0x48C4], Ability::BleedAttack, Ability::ParalyzingBlow),
    (&[0x48C6], Ability::ParalyzingBlow, Ability::MortalStrike),
    (&[0x48C8], Ability::ParalyzingBlow, Ability::InfectiousStrike),
    (&[0x48CD], Ability::Feint, Ability::Block),
    (&[0x48CE], Ability::DualWield, Ability::TalonStrike),
    (&[0x48D0], Ability::Feint, Ability::DoubleShot),
];

fn ability_table() -> &'static HashMap<u16, AbilityPair> {
    static TABLE: OnceLock<HashMap<u16, AbilityPair>> = OnceLock::new();

    TABLE.get_or_init(|| {
        let mut table = HashMap::with_capacity(WEAPON_ABILITIES.len() * 2);
        for &(graphics, primary, secondary) in WEAPON_ABILITIES {
            for &graphic in graphics {
                table.entry(graphic).or_insert((primary, secondary));
            }
        }
        table
    })
}

/// Abilities granted by a single weapon graphic
pub fn weapon_abilities(graphic: u16) -> Option<AbilityPair> {
    ability_table().get(&graphic).copied()
}

/// Abilities for the equipped weapons.
///
/// The two-handed slot is consulted before the one-handed slot; the first
/// weapon with a table entry decides both abilities.
pub fn abilities_for(two_handed: Option<u16>, one_handed: Option<u16>) -> AbilityPair {
    two_handed
        .into_iter()
        .chain(one_handed)
        .find_map(weapon_abilities)
        .unwrap_or((Ability::None, Ability::None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_variant_maps() {
        assert_eq!(
            weapon_abilities(0x0DF0),
            Some((Ability::WhirlwindAttack, Ability::ParalyzingBlow))
        );
        assert_eq!(weapon_abilities(0x0DF1), weapon_abilities(0x0DF0));
        assert_eq!(weapon_abilities(0x0001), None);
    }

    #[test]
    fn test_two_handed_slot_wins() {
        let pair = abilities_for(Some(0x13FF), Some(0x13B9));
        assert_eq!(pair, (Ability::DoubleShot, Ability::ArmorIgnore));

        let pair = abilities_for(None, Some(0x13B9));
        assert_eq!(pair, (Ability::ParalyzingBlow, Ability::CrushingBlow));
    }

    #[test]
    fn test_unknown_weapon_falls_through() {
        let pair = abilities_for(Some(0x0001), Some(0x0F5E));
        assert_eq!(pair, (Ability::CrushingBlow, Ability::ArmorIgnore));
        assert_eq!(abilities_for(None, None), (Ability::None, Ability::None));
    }
}
