//! Echo sub-stat attributes and their valid roll values.
//!
//! Every echo sub-stat rolls from a small fixed table. The table is used to
//! tell real attribute readings apart from OCR noise: a number next to an
//! attribute name only counts if it is one of that attribute's rolls.

use serde::{Deserialize, Serialize};

/// Crit Rate rolls (%).
const CRIT_RATE_VALUES: &[f64] = &[6.3, 6.9, 7.5, 8.1, 8.7, 9.3, 9.9, 10.5];
/// Crit DMG rolls (%).
const CRIT_DAMAGE_VALUES: &[f64] = &[12.6, 13.8, 15.0, 16.2, 17.4, 18.6, 19.8, 21.0];
/// ATK%, HP% and the four damage bonus rolls share one table (%).
const PERCENT_VALUES: &[f64] = &[6.4, 7.1, 7.9, 8.6, 9.4, 10.1, 10.9, 11.6];
/// DEF% rolls (%).
const DEFENSE_PERCENT_VALUES: &[f64] = &[8.1, 9.0, 10.0, 10.9, 11.8, 12.8, 13.8, 14.7];
/// Energy Regen rolls (%).
const ENERGY_REGEN_VALUES: &[f64] = &[6.8, 7.6, 8.4, 9.2, 10.0, 10.8, 11.6, 12.4];
const ATTACK_FLAT_VALUES: &[f64] = &[30.0, 40.0, 50.0, 60.0];
const DEFENSE_FLAT_VALUES: &[f64] = &[40.0, 50.0, 60.0, 70.0];
const HP_FLAT_VALUES: &[f64] = &[320.0, 360.0, 390.0, 430.0, 470.0, 510.0, 540.0, 580.0];

/// One of the 13 sub-stats an echo can roll.
///
/// Variant order is the display order used by the GUI and by unsorted tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Attribute {
    CritRate,
    CritDamage,
    DefenseFlat,
    DefensePercent,
    HpFlat,
    HpPercent,
    AttackFlat,
    AttackPercent,
    EnergyRegen,
    LiberationDamage,
    SkillDamage,
    BasicAttackDamage,
    HeavyAttackDamage,
}

impl Attribute {
    /// Number of attributes.
    pub const COUNT: usize = 13;

    /// All attributes in display order.
    pub const ALL: [Attribute; Self::COUNT] = [
        Attribute::CritRate,
        Attribute::CritDamage,
        Attribute::DefenseFlat,
        Attribute::DefensePercent,
        Attribute::HpFlat,
        Attribute::HpPercent,
        Attribute::AttackFlat,
        Attribute::AttackPercent,
        Attribute::EnergyRegen,
        Attribute::LiberationDamage,
        Attribute::SkillDamage,
        Attribute::BasicAttackDamage,
        Attribute::HeavyAttackDamage,
    ];

    /// Position in [`Attribute::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// The name as it is printed on the echo panel in game.
    ///
    /// This is the text searched for in OCR output and the key used in the
    /// persisted statistics file.
    pub fn name(self) -> &'static str {
        match self {
            Self::CritRate => "暴击率",
            Self::CritDamage => "暴击伤害",
            Self::DefenseFlat => "固定防御",
            Self::DefensePercent => "百分比防御",
            Self::HpFlat => "固定生命",
            Self::HpPercent => "百分比生命",
            Self::AttackFlat => "固定攻击",
            Self::AttackPercent => "百分比攻击",
            Self::EnergyRegen => "共鸣效率",
            Self::LiberationDamage => "共鸣解放伤害",
            Self::SkillDamage => "共鸣技能伤害",
            Self::BasicAttackDamage => "普攻伤害",
            Self::HeavyAttackDamage => "重击伤害",
        }
    }

    /// Short button label used by the manual counter.
    pub fn label(self) -> &'static str {
        match self {
            Self::CritRate => "暴击率",
            Self::CritDamage => "暴击伤害",
            Self::DefenseFlat => "小防御",
            Self::DefensePercent => "大防御",
            Self::HpFlat => "小生命",
            Self::HpPercent => "大生命",
            Self::AttackFlat => "小攻击",
            Self::AttackPercent => "大攻击",
            Self::EnergyRegen => "共鸣效率",
            Self::LiberationDamage => "共鸣解放",
            Self::SkillDamage => "共鸣技能",
            Self::BasicAttackDamage => "普通攻击",
            Self::HeavyAttackDamage => "重击",
        }
    }

    /// The discrete values this attribute can roll.
    pub fn valid_values(self) -> &'static [f64] {
        match self {
            Self::CritRate => CRIT_RATE_VALUES,
            Self::CritDamage => CRIT_DAMAGE_VALUES,
            Self::DefenseFlat => DEFENSE_FLAT_VALUES,
            Self::DefensePercent => DEFENSE_PERCENT_VALUES,
            Self::HpFlat => HP_FLAT_VALUES,
            Self::AttackFlat => ATTACK_FLAT_VALUES,
            Self::EnergyRegen => ENERGY_REGEN_VALUES,
            Self::HpPercent
            | Self::AttackPercent
            | Self::LiberationDamage
            | Self::SkillDamage
            | Self::BasicAttackDamage
            | Self::HeavyAttackDamage => PERCENT_VALUES,
        }
    }

    /// Returns true if `value` is exactly one of this attribute's rolls.
    pub fn is_valid_value(self, value: f64) -> bool {
        self.valid_values().contains(&value)
    }

    /// Looks up an attribute by its in-game name.
    pub fn from_name(name: &str) -> Option<Attribute> {
        Self::ALL.into_iter().find(|a| a.name() == name)
    }

    /// Looks up an attribute by in-game name or short label.
    pub fn from_name_or_label(text: &str) -> Option<Attribute> {
        Self::from_name(text).or_else(|| Self::ALL.into_iter().find(|a| a.label() == text))
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
