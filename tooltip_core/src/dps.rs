//! Weapon DPS from base stats plus local modifiers.

use crate::config::WeaponDpsSettings;
use crate::graphics::{with_text_scale, Graphics, BACKDROP};
use crate::item::{QualityStats, WeaponStats};
use crate::modifier::ModValue;
use crate::types::{DamageType, FontAlign, RectF, Rgba, Vec2};

/// Quality multiplier floor when treating every weapon as fully upgraded
const FULL_QUALITY_MULTIPLIER: f32 = 1.2;

/// Colors used to pick the accent of the elemental DPS line
#[derive(Debug, Clone, Copy)]
pub struct DamagePalette {
    pub physical: Rgba,
    pub fire: Rgba,
    pub cold: Rgba,
    pub lightning: Rgba,
    pub chaos: Rgba,
    /// Shared color when more than one non-physical type is present
    pub elemental: Rgba,
}

impl DamagePalette {
    pub fn color_of(&self, damage_type: DamageType) -> Rgba {
        match damage_type {
            DamageType::Physical => self.physical,
            DamageType::Fire => self.fire,
            DamageType::Cold => self.cold,
            DamageType::Lightning => self.lightning,
            DamageType::Chaos => self.chaos,
        }
    }
}

impl From<&WeaponDpsSettings> for DamagePalette {
    fn from(settings: &WeaponDpsSettings) -> Self {
        DamagePalette {
            physical: settings.physical_damage_color,
            fire: settings.dmg_fire_color,
            cold: settings.dmg_cold_color,
            lightning: settings.dmg_lightning_color,
            chaos: settings.dmg_chaos_color,
            elemental: settings.elemental_damage_color,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponDps {
    pub physical: f32,
    pub elemental: f32,
    pub total: f32,
    pub attacks_per_second: f32,
    pub quality_multiplier: f32,
    pub color: Rgba,
}

/// What a stat key contributes to the damage sums
enum StatEffect {
    PhysicalPercent,
    AttackSpeedPercent,
    AddedPhysicalMin,
    AddedPhysicalMax,
    Added(DamageType),
}

fn stat_effect(key: &str) -> Option<StatEffect> {
    let effect = match key {
        "physical_damage_+%" | "local_physical_damage_+%" => StatEffect::PhysicalPercent,
        "local_attack_speed_+%" => StatEffect::AttackSpeedPercent,
        "local_minimum_added_physical_damage" => StatEffect::AddedPhysicalMin,
        "local_maximum_added_physical_damage" => StatEffect::AddedPhysicalMax,
        "local_minimum_added_fire_damage"
        | "local_maximum_added_fire_damage"
        | "unique_local_minimum_added_fire_damage_when_in_main_hand"
        | "unique_local_maximum_added_fire_damage_when_in_main_hand" => {
            StatEffect::Added(DamageType::Fire)
        }
        "local_minimum_added_cold_damage"
        | "local_maximum_added_cold_damage"
        | "unique_local_minimum_added_cold_damage_when_in_off_hand"
        | "unique_local_maximum_added_cold_damage_when_in_off_hand" => {
            StatEffect::Added(DamageType::Cold)
        }
        "local_minimum_added_lightning_damage" | "local_maximum_added_lightning_damage" => {
            StatEffect::Added(DamageType::Lightning)
        }
        "local_minimum_added_chaos_damage"
        | "local_maximum_added_chaos_damage"
        | "unique_local_minimum_added_chaos_damage_when_in_off_hand"
        | "unique_local_maximum_added_chaos_damage_when_in_off_hand" => {
            StatEffect::Added(DamageType::Chaos)
        }
        _ => return None,
    };
    Some(effect)
}

fn round2(value: f32) -> f32 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Effective quality multiplier, optionally floored at 20% quality
pub fn quality_multiplier(quality: i32, always_full_quality: bool) -> f32 {
    let multiplier = (quality + 100) as f32 / 100.0;
    if always_full_quality && multiplier < FULL_QUALITY_MULTIPLIER {
        FULL_QUALITY_MULTIPLIER
    } else {
        multiplier
    }
}

/// Compute weapon DPS. Returns `None` without a quality component.
pub fn compute_weapon_dps(
    weapon: &WeaponStats,
    mods: &[ModValue<'_>],
    quality: Option<&QualityStats>,
    always_full_quality: bool,
    palette: &DamagePalette,
) -> Option<WeaponDps> {
    let mut attack_speed = round2(1000.0 / weapon.attack_time.max(1) as f32);
    // min+max sums, indexed by DamageType
    let mut double_dps = [0f32; DamageType::ALL.len()];
    let mut phys_multiplier = 1f32;
    let mut phys_lo = weapon.damage_min;
    let mut phys_hi = weapon.damage_max;

    for m in mods {
        for (stat, value) in m.record.stats.iter().zip(&m.stat_values) {
            if stat.is_inert() {
                continue;
            }
            let Some(effect) = stat_effect(&stat.key) else {
                continue;
            };
            let value = *value;
            match effect {
                StatEffect::PhysicalPercent => phys_multiplier += value as f32 / 100.0,
                StatEffect::AttackSpeedPercent => attack_speed *= (100.0 + value as f32) / 100.0,
                StatEffect::AddedPhysicalMin => phys_lo += value,
                StatEffect::AddedPhysicalMax => phys_hi += value,
                StatEffect::Added(damage_type) => double_dps[damage_type.index()] += value as f32,
            }
        }
    }

    let quality = quality?;
    let quality_multiplier = quality_multiplier(quality.item_quality, always_full_quality);

    let scaled_lo = (phys_lo as f32 * quality_multiplier * phys_multiplier).round_ties_even();
    let scaled_hi = (phys_hi as f32 * quality_multiplier * phys_multiplier).round_ties_even();
    double_dps[DamageType::Physical.index()] = scaled_lo + scaled_hi;

    let attacks_per_second = round2(attack_speed);
    let physical = double_dps[DamageType::Physical.index()] / 2.0 * attacks_per_second;

    let mut elemental = 0f32;
    let mut color = palette.physical;
    let mut seen_elemental = false;
    for damage_type in DamageType::ALL.iter().filter(|t| t.is_elemental()) {
        let sum = double_dps[damage_type.index()];
        elemental += sum / 2.0 * attacks_per_second;
        if sum <= 0.0 {
            continue;
        }
        color = if seen_elemental {
            palette.elemental
        } else {
            palette.color_of(*damage_type)
        };
        seen_elemental = true;
    }

    Some(WeaponDps {
        physical,
        elemental,
        total: physical + elemental,
        attacks_per_second,
        quality_multiplier,
        color,
    })
}

/// Draw the DPS lines right-aligned against the tooltip's top-right corner
pub fn draw_weapon_dps(
    gfx: &mut dyn Graphics,
    tooltip_rect: RectF,
    dps: &WeaponDps,
    settings: &WeaponDpsSettings,
) {
    let scale = settings.dps_text_size;
    let text_position = Vec2::new(tooltip_rect.right() - 8.0, tooltip_rect.top());
    let backdrop_size = Vec2::new(385.0 * scale, 68.0 * scale);
    gfx.draw_image(
        BACKDROP,
        RectF::new(
            text_position.x - backdrop_size.x + 10.0,
            text_position.y - 2.0,
            backdrop_size.x,
            backdrop_size.y,
        ),
        settings.background_color,
    );
    let text_position = text_position.translate(0.0, 4.0);

    with_text_scale(gfx, scale, |gfx| {
        let p_size = if dps.physical > 0.0 {
            gfx.draw_text(
                &format!("pDPS {:.0}", dps.physical),
                text_position,
                settings.text_color,
                FontAlign::RIGHT,
            )
        } else {
            Vec2::ZERO
        };
        let e_size = if dps.elemental > 0.0 {
            gfx.draw_text(
                &format!("eDPS {:.0}", dps.elemental),
                text_position.translate(0.0, p_size.y),
                dps.color,
                FontAlign::RIGHT,
            )
        } else {
            Vec2::ZERO
        };
        if dps.total > 0.0 {
            gfx.draw_text(
                &format!("Total {:.0}", dps.total),
                text_position.translate(0.0, p_size.y + e_size.y),
                Rgba::WHITE,
                FontAlign::RIGHT,
            );
        }
    });
}
