//! Tier inference for modifiers that carry no authoritative tier.
//!
//! A record's tier is its 1-based position among same-group, same-affix-type
//! siblings whose letters-only key matches its own. Numeric suffixes in keys
//! rank records within a group and are ignored for grouping.

use crate::records::ModRecord;
use crate::types::Rgba;
use regex::Regex;
use std::sync::LazyLock;

static TOOLTIP_TIER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r".*T([0-9]+)").unwrap());
static ICON_TIER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Tier:\s([0-9]+)").unwrap());

/// Hue/saturation pair for the tier heat gradient
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatColor {
    pub hue: f64,
    pub saturation: f64,
}

impl HeatColor {
    /// Cyan-white reserved for best and single-tier mods
    pub const BEST: HeatColor = HeatColor {
        hue: 180.0,
        saturation: 0.0,
    };

    /// Green at distance 0, shifting towards red as better tiers were missed
    pub fn from_distance(total_tiers: usize, heat_distance: usize) -> Self {
        if total_tiers == 1 {
            return HeatColor::BEST;
        }
        HeatColor {
            hue: 120.0 - heat_distance.min(3) as f64 * 40.0,
            saturation: 1.0,
        }
    }

    /// Color derived from a known tier alone, used when no sibling data exists
    pub fn from_tier(tier: i32) -> Self {
        if tier == 1 {
            return HeatColor::BEST;
        }
        HeatColor {
            hue: 120.0 - (tier - 1).clamp(0, 3) as f64 * 40.0,
            saturation: 1.0,
        }
    }

    pub fn to_rgba(self) -> Rgba {
        Rgba::from_hsv(self.hue, self.saturation, 1.0)
    }
}

/// Outcome of tier inference for one modifier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierResolution {
    /// 1-based rank, 0 when not applicable or unresolved
    pub tier: i32,
    /// Size of the sibling set, at least 1
    pub total_tiers: usize,
    /// Level-eligible siblings ranked above the match
    pub heat_distance: usize,
    pub heat: HeatColor,
}

impl TierResolution {
    /// Unique, implicit and crafted mods are never tiered
    pub fn not_applicable() -> Self {
        TierResolution {
            tier: 0,
            total_tiers: 1,
            heat_distance: 0,
            heat: HeatColor::BEST,
        }
    }

    pub fn color(&self) -> Rgba {
        self.heat.to_rgba()
    }
}

/// Inputs for [`resolve_tier`]
#[derive(Debug, Clone, Copy)]
pub struct TierQuery<'a> {
    pub record: &'a ModRecord,
    pub item_level: u32,
    /// Records sharing the record's group and affix type, if the dataset has any
    pub siblings: Option<&'a [ModRecord]>,
    /// Tier shown on the rendered tooltip, if one was found
    pub tooltip_tier: Option<i32>,
    /// Unique, implicit or crafted
    pub untiered: bool,
}

/// The letters of a key, dropping digits and punctuation
pub fn letters_only(key: &str) -> String {
    key.chars().filter(|c| c.is_alphabetic()).collect()
}

/// Parse a `T<digits>` tier marker from a tooltip line
pub fn parse_line_tier(text: &str) -> Option<i32> {
    TOOLTIP_TIER
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Parse a `Tier: <digits>` marker from a hover-icon tooltip
pub fn parse_icon_tier(text: &str) -> Option<i32> {
    ICON_TIER
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Resolve a modifier's tier.
///
/// The dataset walk is authoritative; the tooltip tier only fills in when the
/// walk finds no match, and the record's embedded tier label comes last.
pub fn resolve_tier(query: TierQuery<'_>) -> TierResolution {
    let record = query.record;

    if query.untiered {
        return TierResolution::not_applicable();
    }

    let Some(all_tiers) = query.siblings else {
        tracing::warn!(key = %record.key, group = %record.group, affix = ?record.affix_type,
            "no tier records for mod");
        let tier = query.tooltip_tier.filter(|t| *t > 0).unwrap_or(0);
        return TierResolution {
            tier,
            total_tiers: 1,
            heat_distance: 0,
            heat: HeatColor::from_tier(tier),
        };
    };

    let key = letters_only(&record.key);
    let candidates: Vec<&ModRecord> = all_tiers
        .iter()
        .filter(|r| r.key.starts_with(key.as_str()))
        .collect();
    tracing::debug!(group = %record.group, candidates = candidates.len(), "found tier records");

    let mut tier = 0;
    let mut total_tiers = 0;
    let mut heat_distance = 0;
    let mut found = false;

    for sibling in candidates.iter().filter(|r| letters_only(&r.key) == key) {
        total_tiers += 1;

        if sibling.key == record.key && !found {
            tier = total_tiers as i32;
            found = true;
        }

        if !found && sibling.min_level <= query.item_level {
            heat_distance += 1;
        }
    }

    if found {
        tracing::debug!(key = %record.key, tier, "matched tier from sibling records");
    } else if let Some(parsed) = query.tooltip_tier.filter(|t| *t > 0) {
        tier = parsed;
        tracing::debug!(key = %record.key, tier, "using tier shown on tooltip");
    } else if let Some(parsed) = parse_tier_label(&record.tier) {
        tier = parsed;
        total_tiers = candidates.len();
        tracing::debug!(key = %record.key, tier, label = %record.tier, "parsed embedded tier label");
    }

    if tier <= 0 {
        tracing::warn!(key = %record.key, group = %record.group, affix = ?record.affix_type,
            "failed to determine tier");
        tier = 0;
    }

    let heat = if tier == 1 {
        HeatColor::BEST
    } else {
        HeatColor::from_distance(total_tiers, heat_distance)
    };
    TierResolution {
        tier,
        total_tiers: total_tiers.max(1),
        heat_distance,
        heat,
    }
}

fn parse_tier_label(label: &str) -> Option<i32> {
    let digits: String = label.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok().filter(|t| *t > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ModDomain, ModType};

    fn record(key: &str, min_level: u32) -> ModRecord {
        ModRecord {
            key: key.to_string(),
            group: "IncreasedLife".to_string(),
            affix_type: ModType::Prefix,
            domain: ModDomain::Item,
            tier: String::new(),
            min_level,
            name: String::new(),
            stats: Vec::new(),
        }
    }

    fn query<'a>(record: &'a ModRecord, siblings: &'a [ModRecord], item_level: u32) -> TierQuery<'a> {
        TierQuery {
            record,
            item_level,
            siblings: Some(siblings),
            tooltip_tier: None,
            untiered: false,
        }
    }

    fn life_tiers() -> Vec<ModRecord> {
        vec![
            record("IncreasedLife5", 85),
            record("IncreasedLife4", 75),
            record("IncreasedLife3", 65),
            record("IncreasedLife2", 55),
            record("IncreasedLife1", 45),
        ]
    }

    #[test]
    fn test_tier_and_heat_distance() {
        let siblings = life_tiers();
        let res = resolve_tier(query(&siblings[2], &siblings, 75));
        assert_eq!(res.tier, 3);
        assert_eq!(res.total_tiers, 5);
        assert_eq!(res.heat_distance, 1);
        assert_eq!(res.heat.hue, 80.0);
        assert_eq!(res.heat.saturation, 1.0);
    }

    #[test]
    fn test_best_tier_has_zero_distance() {
        let siblings = life_tiers();
        let res = resolve_tier(query(&siblings[0], &siblings, 86));
        assert_eq!(res.tier, 1);
        assert_eq!(res.heat_distance, 0);
        assert_eq!(res.heat, HeatColor::BEST);
    }

    #[test]
    fn test_heat_distance_saturates_at_three() {
        let siblings = life_tiers();
        let res = resolve_tier(query(&siblings[4], &siblings, 100));
        assert_eq!(res.heat_distance, 4);
        assert_eq!(res.heat.hue, 0.0);
    }

    #[test]
    fn test_letters_only_grouping_is_exact() {
        let mut siblings = life_tiers();
        siblings.insert(1, record("IncreasedLifeRegen1", 30));
        siblings.push(record("IncreasedLifeRegen2", 10));
        let res = resolve_tier(query(&siblings[0], &siblings, 86));
        assert_eq!(res.total_tiers, 5);
        let regen = resolve_tier(query(&siblings[1], &siblings, 86));
        assert_eq!(regen.tier, 1);
        assert_eq!(regen.total_tiers, 2);
    }

    #[test]
    fn test_single_tier_group_is_best_color() {
        let siblings = vec![record("Onslaught", 1)];
        let res = resolve_tier(query(&siblings[0], &siblings, 50));
        assert_eq!(res.tier, 1);
        assert_eq!(res.total_tiers, 1);
        assert_eq!(res.heat, HeatColor::BEST);
    }

    #[test]
    fn test_untiered_mods_resolve_to_zero() {
        let siblings = life_tiers();
        let mut q = query(&siblings[1], &siblings, 80);
        q.untiered = true;
        q.tooltip_tier = Some(2);
        let res = resolve_tier(q);
        assert_eq!(res.tier, 0);
        assert_eq!(res.total_tiers, 1);
    }

    #[test]
    fn test_dataset_tier_wins_over_tooltip() {
        let siblings = life_tiers();
        let mut q = query(&siblings[3], &siblings, 80);
        q.tooltip_tier = Some(1);
        assert_eq!(resolve_tier(q).tier, 4);
    }

    #[test]
    fn test_tooltip_tier_used_when_walk_misses() {
        let siblings = life_tiers();
        let stray = record("IncreasedLife9", 1);
        let mut q = query(&stray, &siblings, 80);
        q.tooltip_tier = Some(2);
        let res = resolve_tier(q);
        assert_eq!(res.tier, 2);
        assert_eq!(res.total_tiers, 5);
    }

    #[test]
    fn test_embedded_label_fallback() {
        let siblings = life_tiers();
        let mut stray = record("IncreasedLife9", 1);
        stray.tier = "Tier 4".to_string();
        let res = resolve_tier(query(&stray, &siblings, 80));
        assert_eq!(res.tier, 4);
        assert_eq!(res.total_tiers, 5);
    }

    #[test]
    fn test_unresolved_tier_is_zero() {
        let siblings = life_tiers();
        let stray = record("SomethingElse1", 1);
        let res = resolve_tier(query(&stray, &siblings, 80));
        assert_eq!(res.tier, 0);
        assert_eq!(res.total_tiers, 1);
    }

    #[test]
    fn test_missing_sibling_list_uses_tooltip_tier() {
        let rec = record("IncreasedLife1", 1);
        let res = resolve_tier(TierQuery {
            record: &rec,
            item_level: 80,
            siblings: None,
            tooltip_tier: Some(3),
            untiered: false,
        });
        assert_eq!(res.tier, 3);
        assert_eq!(res.total_tiers, 1);
        assert_eq!(res.heat.hue, 40.0);
    }

    #[test]
    fn test_tier_markers() {
        assert_eq!(parse_line_tier("P T2"), Some(2));
        assert_eq!(parse_line_tier("T1 then T12"), Some(12));
        assert_eq!(parse_line_tier("no tier"), None);
        assert_eq!(parse_icon_tier("Prefix Modifier (Tier: 3)"), Some(3));
        assert_eq!(parse_icon_tier("Tier 3"), None);
    }
}
