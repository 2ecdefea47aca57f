use crate::item::{find_element, ModsComponent, RawMod, TooltipSnapshot};
use crate::records::{ModRecord, ModRecordLookup};
use crate::tier::{parse_icon_tier, parse_line_tier, resolve_tier, TierQuery, TierResolution};
use crate::types::{ModDomain, ModType, Rgba};
use regex::Regex;
use std::sync::LazyLock;

static TAG_MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<rgb\(\d+,\d+,\d+\)>\{([\w ]+)\}").unwrap());

/// A modifier resolved for display
#[derive(Debug, Clone)]
pub struct ModValue<'a> {
    pub record: &'a ModRecord,
    pub affix_type: ModType,
    pub is_implicit: bool,
    pub is_crafted: bool,
    /// User friendly affix name, or the record key
    pub affix_text: String,
    /// Rendered stat text, or the mod name
    pub human_name: String,
    /// Group abbreviation; empty when the group has none
    pub short_name: &'static str,
    pub stat_values: Vec<i32>,
    pub tier: i32,
    pub total_tiers: usize,
    pub tags: Vec<String>,
    /// Heat color of the resolved tier, for hosts that tint their own UI
    pub color: Rgba,
}

impl<'a> ModValue<'a> {
    /// Resolve one raw modifier against the record store
    pub fn build(
        raw: &RawMod,
        records: &'a dyn ModRecordLookup,
        ctx: &BuildContext<'_>,
    ) -> Result<Self, BuildError> {
        tracing::debug!(raw_name = %raw.raw_name, base = %ctx.base_class, "inspecting mod");

        let record = records
            .record(&raw.raw_name)
            .ok_or_else(|| BuildError::UnknownRecord(raw.raw_name.clone()))?;

        let human_name = if raw.display_name.is_empty() {
            raw.name.clone()
        } else {
            raw.display_name.clone()
        };
        let affix_text = if record.name.is_empty() {
            record.key.clone()
        } else {
            record.name.clone()
        };
        let is_crafted = record.domain == ModDomain::Crafted;
        let is_implicit = ctx
            .mods
            .map_or(false, |mods| mods.is_implicit(&raw.raw_name));

        let scraped = ctx
            .tooltip
            .map(|tooltip| scrape_tooltip(tooltip, &human_name, &raw.display_name))
            .unwrap_or_default();
        for tag in &scraped.tags {
            tracing::debug!(tag = %tag, "found tag");
        }

        let resolution = resolve_tier(TierQuery {
            record,
            item_level: ctx.item_level,
            siblings: records.siblings(&record.group, record.affix_type),
            tooltip_tier: scraped.tier,
            untiered: record.affix_type == ModType::Unique || is_implicit || is_crafted,
        });

        let value = ModValue::from_parts(record, raw, resolution, is_implicit, human_name, affix_text, scraped.tags);
        tracing::debug!(
            key = %value.record.key,
            tier = value.tier,
            total_tiers = value.total_tiers,
            color = ?value.color,
            "resolved mod"
        );
        Ok(value)
    }

    fn from_parts(
        record: &'a ModRecord,
        raw: &RawMod,
        resolution: TierResolution,
        is_implicit: bool,
        human_name: String,
        affix_text: String,
        tags: Vec<String>,
    ) -> Self {
        ModValue {
            record,
            affix_type: record.affix_type,
            is_implicit,
            is_crafted: record.domain == ModDomain::Crafted,
            affix_text,
            human_name,
            short_name: short_mod_name(&raw.group),
            stat_values: raw.values.clone(),
            tier: resolution.tier,
            total_tiers: resolution.total_tiers,
            tags,
            color: resolution.color(),
        }
    }

    pub fn could_have_tiers(&self) -> bool {
        self.total_tiers > 1
    }

    /// Tier label shown next to the affix tag. Empty for single-tier groups
    /// and for tiers that could not be resolved.
    pub fn tier_text(&self) -> String {
        if self.could_have_tiers() && self.tier > 0 {
            format!("T{} ", self.tier)
        } else {
            String::new()
        }
    }
}

/// Per-item inputs shared by every modifier on it
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'b> {
    pub item_level: u32,
    pub base_class: &'b str,
    pub mods: Option<&'b ModsComponent>,
    pub tooltip: Option<&'b TooltipSnapshot>,
}

/// Resolve every modifier on an item. Any failure aborts the whole item.
pub fn build_all<'a>(
    mods: &ModsComponent,
    records: &'a dyn ModRecordLookup,
    base_class: &str,
    tooltip: Option<&TooltipSnapshot>,
) -> Result<Vec<ModValue<'a>>, BuildError> {
    if mods.is_incomplete() {
        return Err(BuildError::IncompleteItem);
    }
    let ctx = BuildContext {
        item_level: mods.item_level,
        base_class,
        mods: Some(mods),
        tooltip,
    };
    mods.item_mods
        .iter()
        .map(|raw| ModValue::build(raw, records, &ctx))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// A mod has neither a raw nor a display name yet
    IncompleteItem,
    UnknownRecord(String),
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::IncompleteItem => write!(f, "Item mods are not fully loaded"),
            BuildError::UnknownRecord(key) => write!(f, "No mod record for '{}'", key),
        }
    }
}

impl std::error::Error for BuildError {}

#[derive(Debug, Default)]
struct ScrapedTooltip {
    tier: Option<i32>,
    tags: Vec<String>,
}

/// Pull a displayed tier and tags for one mod out of the tooltip tree.
///
/// The mod line's last sibling holds a `T<n>` marker; the hover icon whose
/// tooltip mentions the mod holds `Tier: <n>` and colored tag markup.
fn scrape_tooltip(tooltip: &TooltipSnapshot, human_name: &str, display_name: &str) -> ScrapedTooltip {
    let mut scraped = ScrapedTooltip::default();

    if !human_name.is_empty() {
        let line = find_element(&tooltip.children, |e| {
            e.text.as_deref().map_or(false, |t| t.contains(human_name))
        });
        if let Some(found) = line {
            let tier_text = found
                .parent
                .and_then(|p| p.children.last())
                .and_then(|last| last.children.first())
                .and_then(|first| first.text.as_deref());
            match tier_text {
                Some(text) => scraped.tier = parse_line_tier(text),
                None => tracing::debug!(mod_text = %human_name, "tooltip line has no tier element"),
            }
        }
    }

    if !display_name.is_empty() {
        let icon = find_element(&tooltip.children, |e| {
            e.is_valid
                && e.tooltip_text
                    .as_deref()
                    .map_or(false, |t| !t.is_empty() && t.contains(display_name))
        });
        if let Some(text) = icon.and_then(|found| found.element.tooltip_text.as_deref()) {
            if scraped.tier.map_or(true, |t| t <= 0) {
                scraped.tier = parse_icon_tier(text);
            }
            scraped.tags.extend(
                TAG_MARKUP
                    .captures_iter(text)
                    .filter_map(|c| c.get(1))
                    .map(|m| m.as_str().to_string()),
            );
        }
    }

    scraped
}

/// Abbreviations for well-known modifier groups
pub fn short_mod_name(group: &str) -> &'static str {
    match group {
        "LocalPhysicalDamagePercent" => "Phys%",
        "LocalIncreasedPhysicalDamagePercentAndAccuracyRating" => "Phys Hybrid",
        "PhysicalDamage" | "LocalPhysicalDamage" => "Flat Phys",
        "FireDamage" | "LocalFireDamage" => "Flat Fire",
        "ColdDamage" | "LocalColdDamage" => "Flat Cold",
        "LightningDamage" | "LocalLightningDamage" => "Flat Light",
        "ChaosDamage" | "LocalChaosDamage" => "Flat Chaos",
        "IncreasedAttackSpeed" | "LocalIncreasedAttackSpeed" => "Atk Speed",
        "IncreasedCastSpeed" => "Cast Speed",
        "CriticalStrikeChanceIncrease" | "LocalCriticalStrikeChance" => "Crit",
        "CriticalStrikeMultiplier" => "Crit Multi",
        "SpellDamage" | "WeaponSpellDamage" => "Spell%",
        "ElementalDamagePercent" => "Ele%",
        "IncreasedLife" => "Life",
        "MaximumLifeIncreasePercent" => "Life%",
        "IncreasedMana" => "Mana",
        "IncreasedEnergyShield" | "LocalEnergyShield" => "ES",
        "LocalEnergyShieldPercent" | "DefencesPercent" => "Def%",
        "MovementVelocity" => "MS",
        "FireResistance" => "Fire Res",
        "ColdResistance" => "Cold Res",
        "LightningResistance" => "Light Res",
        "ChaosResistance" => "Chaos Res",
        "AllResistances" => "All Res",
        "Strength" => "Str",
        "Dexterity" => "Dex",
        "Intelligence" => "Int",
        "AllAttributes" => "All Attr",
        "LifeLeech" | "LifeLeechPermyriad" => "Leech",
        "LifeGainPerTarget" => "LoH",
        "IncreasedAccuracy" => "Acc",
        "GemLevel" | "IncreaseSocketedGemLevel" => "+Gems",
        _ => "",
    }
}
