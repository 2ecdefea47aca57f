//! Compact "P1"/"S2" tier tags drawn beside the native tooltip.

use crate::config::{FastModsAnchor, FastModsStrategy, ItemModsSettings};
use crate::graphics::Graphics;
use crate::item::{ModTextBlocks, TooltipSnapshot};
use crate::modifier::ModValue;
use crate::types::{FontAlign, ModType, RectF, Rgba, Vec2};
use regex::Regex;
use std::sync::LazyLock;

/// Placeholder replacing every number in normalized stat text
const NUMBER_TOKEN: &str = "#";

static MOD_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\{\s*(?:(Master Crafted|Essence)\s+)?(Prefix|Suffix)\s+Modifier\s+"[^"]*"(?:\s*\((Tier|Rank):\s*(\d+)\))?"#,
    )
    .unwrap()
});
static MARKUP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static ROLL_ANNOTATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*\((?:[\d.\s%+\-–]+|[Rr]ank[^)]*|[\d.]+%[^)]*)\)").unwrap()
});
static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// One tag in the compact column
#[derive(Debug, Clone, PartialEq)]
pub struct CompactAnnotation {
    pub label: String,
    pub color: Rgba,
    /// Number of tooltip lines this tag spans
    pub mod_lines: usize,
    pub tags: Vec<String>,
}

impl CompactAnnotation {
    pub fn new(label: impl Into<String>, color: Rgba) -> Self {
        CompactAnnotation {
            label: label.into(),
            color,
            mod_lines: 1,
            tags: Vec::new(),
        }
    }

    fn unknown() -> Self {
        CompactAnnotation::new("?", Rgba::GRAY)
    }

    fn same_display(&self, other: &CompactAnnotation) -> bool {
        self.label == other.label && self.color == other.color
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FastModsError {
    /// The host did not locate the tooltip's mod text
    MissingModText,
    /// Regular lines were found but none could be annotated
    NoRecognizedLines,
}

impl std::fmt::Display for FastModsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FastModsError::MissingModText => write!(f, "Tooltip has no mod text blocks"),
            FastModsError::NoRecognizedLines => write!(f, "No tooltip mod lines were recognized"),
        }
    }
}

impl std::error::Error for FastModsError {}

/// Inputs for one frame of compact annotations
pub struct FastModsContext<'a, 'm> {
    pub mods: &'a [ModValue<'m>],
    pub tooltip: &'a TooltipSnapshot,
}

/// Collapse runs of identical annotations into one multi-line annotation
pub fn collapse_consecutive(annotations: Vec<CompactAnnotation>) -> Vec<CompactAnnotation> {
    let mut collapsed: Vec<CompactAnnotation> = Vec::with_capacity(annotations.len());
    for annotation in annotations {
        match collapsed.last_mut() {
            Some(last) if last.same_display(&annotation) => last.mod_lines += annotation.mod_lines,
            _ => collapsed.push(annotation),
        }
    }
    collapsed
}

/// Derive annotations from resolved tiers
pub fn structured_annotations(
    mods: &[ModValue<'_>],
    settings: &ItemModsSettings,
) -> Vec<CompactAnnotation> {
    let mut ordered: Vec<&ModValue<'_>> = mods
        .iter()
        .filter(|m| m.affix_type.is_affix() && !m.is_implicit)
        .collect();
    ordered.sort_by(|a, b| a.affix_type.cmp(&b.affix_type).then(a.tier.cmp(&b.tier)));

    let annotations = ordered
        .into_iter()
        .map(|m| {
            let (letter, affix_color) = match m.affix_type {
                ModType::Prefix => ("P", settings.prefix_color),
                _ => ("S", settings.suffix_color),
            };
            let color = settings.tier_color(m.tier).unwrap_or(affix_color);
            let label = if m.tier > 0 {
                format!("{letter}{}", m.tier)
            } else {
                format!("{letter}?")
            };
            CompactAnnotation::new(label, color)
        })
        .collect();

    collapse_consecutive(annotations)
}

/// Normalize stat text for matching: markup and roll ranges removed,
/// numbers replaced by a placeholder, leading '+' dropped.
pub fn normalize_stat_text(line: &str) -> String {
    let text = MARKUP.replace_all(line, "");
    let text = text.replace(['{', '}'], "");
    let text = ROLL_ANNOTATION.replace_all(&text, "");
    let text = NUMBER.replace_all(&text, NUMBER_TOKEN);
    let text = WHITESPACE.replace_all(text.trim(), " ");
    text.trim_start_matches('+').trim().to_string()
}

fn header_annotation(line: &str, settings: &ItemModsSettings) -> Option<CompactAnnotation> {
    let caps = MOD_HEADER.captures(line)?;
    let source = caps.get(1).map(|m| m.as_str());
    let (letter, affix_color) = match caps.get(2).map(|m| m.as_str()) {
        Some("Prefix") => ("P", settings.prefix_color),
        _ => ("S", settings.suffix_color),
    };
    let rank_kind = caps.get(3).map(|m| m.as_str());
    let number: Option<i32> = caps.get(4).and_then(|m| m.as_str().parse().ok());

    let annotation = match (source, rank_kind, number) {
        (Some("Master Crafted"), ..) => {
            CompactAnnotation::new(format!("{letter}C"), settings.special_colors.crafted_color)
        }
        (Some("Essence"), ..) => CompactAnnotation::new(format!("{letter}E"), affix_color),
        (_, Some("Rank"), Some(rank)) => CompactAnnotation::new(format!("{letter}R{rank}"), affix_color),
        (_, _, Some(tier)) => CompactAnnotation::new(
            format!("{letter}{tier}"),
            settings.tier_color(tier).unwrap_or(affix_color),
        ),
        _ => CompactAnnotation::new(format!("{letter}?"), affix_color),
    };
    Some(annotation)
}

fn is_markup_line(line: &str) -> bool {
    line.starts_with('{') || line.starts_with('<')
}

/// Map normalized stat text to the annotation of the header above it
pub fn parse_extended_block(
    extended: &str,
    settings: &ItemModsSettings,
) -> Vec<(String, CompactAnnotation)> {
    let mut mapping = Vec::new();
    let mut current: Option<CompactAnnotation> = None;

    for line in extended.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(annotation) = header_annotation(line, settings) {
            current = Some(annotation);
            continue;
        }
        if is_markup_line(line) {
            current = None;
            continue;
        }
        if let Some(annotation) = &current {
            let key = normalize_stat_text(line);
            if !key.is_empty() {
                mapping.push((key, annotation.clone()));
            }
        }
    }

    mapping
}

/// Annotate each regular display line using the extended-block mapping
pub fn annotate_regular_lines(
    regular: &str,
    mapping: &[(String, CompactAnnotation)],
) -> Vec<CompactAnnotation> {
    let annotations = regular
        .lines()
        .map(normalize_stat_text)
        .filter(|line| !line.is_empty())
        .map(|line| {
            mapping
                .iter()
                .find(|(key, _)| line.contains(key.as_str()))
                .map(|(_, annotation)| annotation.clone())
                .unwrap_or_else(CompactAnnotation::unknown)
        })
        .collect();
    collapse_consecutive(annotations)
}

/// Annotations parsed from the tooltip's text blocks
pub fn scrape_annotations(
    blocks: &ModTextBlocks,
    settings: &ItemModsSettings,
) -> Result<Vec<CompactAnnotation>, FastModsError> {
    let mapping = parse_extended_block(&blocks.extended, settings);
    let annotations = annotate_regular_lines(&blocks.regular, &mapping);
    if !annotations.is_empty() && annotations.iter().all(|a| a.label == "?") {
        return Err(FastModsError::NoRecognizedLines);
    }
    Ok(annotations)
}

/// Session cache for the text-scrape strategy
#[derive(Debug, Default)]
struct ScrapeCache {
    tooltip_address: u64,
    regular_region: u64,
    annotations: Vec<CompactAnnotation>,
}

/// Draws the compact annotation column
#[derive(Debug, Default)]
pub struct FastMods {
    cache: Option<ScrapeCache>,
}

impl FastMods {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce this frame's annotations with the configured strategy
    pub fn annotations(
        &mut self,
        ctx: &FastModsContext<'_, '_>,
        settings: &ItemModsSettings,
    ) -> Result<Vec<CompactAnnotation>, FastModsError> {
        match settings.fast_mods_strategy {
            FastModsStrategy::Structured => Ok(structured_annotations(ctx.mods, settings)),
            FastModsStrategy::TextScrape => self.scraped(ctx.tooltip, settings),
        }
    }

    fn scraped(
        &mut self,
        tooltip: &TooltipSnapshot,
        settings: &ItemModsSettings,
    ) -> Result<Vec<CompactAnnotation>, FastModsError> {
        let blocks = tooltip.mod_text.as_ref().ok_or(FastModsError::MissingModText)?;

        if let Some(cache) = &self.cache {
            if cache.tooltip_address == tooltip.address
                && cache.regular_region == blocks.regular_region
            {
                return Ok(cache.annotations.clone());
            }
        }

        tracing::debug!(tooltip = tooltip.address, region = blocks.regular_region, "parsing tooltip mod text");
        self.cache = None;
        let annotations = scrape_annotations(blocks, settings)?;
        self.cache = Some(ScrapeCache {
            tooltip_address: tooltip.address,
            regular_region: blocks.regular_region,
            annotations: annotations.clone(),
        });
        Ok(annotations)
    }

    /// Draw the column; any failure skips it for this frame
    pub fn draw(
        &mut self,
        gfx: &mut dyn Graphics,
        ctx: &FastModsContext<'_, '_>,
        settings: &ItemModsSettings,
    ) {
        match self.annotations(ctx, settings) {
            Ok(annotations) => draw_annotations(gfx, &annotations, ctx.tooltip.rect, settings.fast_mods_anchor),
            Err(e) => tracing::debug!(error = %e, "skipping fast mods"),
        }
    }
}

/// Lay out annotation boxes down the left edge of the tooltip
pub fn draw_annotations(
    gfx: &mut dyn Graphics,
    annotations: &[CompactAnnotation],
    tooltip: RectF,
    anchor: FastModsAnchor,
) {
    let height = gfx.measure_text("P1").y * 1.5;
    let total_lines: usize = annotations.iter().map(|a| a.mod_lines).sum();
    let column_height = height * total_lines as f32;

    let mut draw_pos = Vec2::new(tooltip.left() - 6.0, tooltip.top());
    if anchor == FastModsAnchor::Bottom {
        draw_pos.y = tooltip.bottom() - column_height;
    }

    for (i, annotation) in annotations.iter().enumerate() {
        tracing::debug!(index = i, label = %annotation.label, "drawing fast mod");
        let box_height = height * annotation.mod_lines as f32;
        let text_pos = draw_pos.translate(0.0, box_height / 2.0);
        let mut text_size = gfx.draw_text(&annotation.label, text_pos, annotation.color, FontAlign::RIGHT_CENTER);
        text_size.x += 5.0;

        let rect = RectF::new(draw_pos.x - text_size.x, draw_pos.y, text_size.x + 6.0, box_height);
        gfx.draw_box(rect, Rgba::BLACK);
        gfx.draw_frame(rect, Rgba::GRAY, 1.0);

        draw_pos.y += box_height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::{DrawCall, RecordingGraphics};
    use crate::records::ModRecord;
    use crate::types::ModDomain;

    fn record(affix_type: ModType) -> ModRecord {
        ModRecord {
            key: "Key1".to_string(),
            group: "Key".to_string(),
            affix_type,
            domain: ModDomain::Item,
            tier: String::new(),
            min_level: 1,
            name: String::new(),
            stats: Vec::new(),
        }
    }

    fn value(record: &ModRecord, tier: i32) -> ModValue<'_> {
        ModValue {
            record,
            affix_type: record.affix_type,
            is_implicit: false,
            is_crafted: false,
            affix_text: String::new(),
            human_name: String::new(),
            short_name: "",
            stat_values: Vec::new(),
            tier,
            total_tiers: 5,
            tags: Vec::new(),
            color: Rgba::WHITE,
        }
    }

    const EXTENDED: &str = "\
{ Implicit Modifier — Attack }
+25% to Global Critical Strike Multiplier (20-30)
{ Prefix Modifier \"Merciless\" (Tier: 1) — Damage, Physical, Attack }
175(170-179)% increased Physical Damage
{ Suffix Modifier \"of Celebration\" (Tier: 2) — Attack, Speed }
24(23-25)% increased Attack Speed
{ Prefix Modifier \"Carbonising\" (Tier: 4) — Damage, Elemental, Fire, Attack }
Adds 20(18-24) to 40(36-42) Fire Damage
{ Master Crafted Suffix Modifier \"of Craft\" — Critical }
+14(10-15)% to Critical Strike Chance
<smaller>{Unscalable Value}
+1 to Level of Socketed Gems";

    const REGULAR: &str = "\
175% increased Physical Damage
24% increased Attack Speed
Adds 20 to 40 Fire Damage
+14% to Critical Strike Chance
+1 to Level of Socketed Gems";

    #[test]
    fn test_normalize_stat_text() {
        assert_eq!(normalize_stat_text("+24(23-25)% increased Attack Speed"), "#% increased Attack Speed");
        assert_eq!(normalize_stat_text("+24% increased Attack Speed"), "#% increased Attack Speed");
        assert_eq!(normalize_stat_text("Adds 20(18-24) to 40(36-42) Fire Damage"), "Adds # to # Fire Damage");
        assert_eq!(normalize_stat_text("<augmented>{+1.5}  to  Level"), "# to Level");
    }

    #[test]
    fn test_parse_extended_block() {
        let settings = ItemModsSettings::default();
        let mapping = parse_extended_block(EXTENDED, &settings);
        let labels: Vec<_> = mapping.iter().map(|(_, a)| a.label.as_str()).collect();
        assert_eq!(labels, vec!["P1", "S2", "P4", "SC"]);
        assert_eq!(mapping[0].0, "#% increased Physical Damage");
        assert_eq!(mapping[0].1.color, settings.t1_color);
        assert_eq!(mapping[2].1.color, settings.prefix_color);
    }

    #[test]
    fn test_regular_lines_annotated() {
        let settings = ItemModsSettings::default();
        let blocks = ModTextBlocks {
            extended: EXTENDED.to_string(),
            regular: REGULAR.to_string(),
            regular_region: 9,
        };
        let annotations = scrape_annotations(&blocks, &settings).unwrap();
        let labels: Vec<_> = annotations.iter().map(|a| a.label.as_str()).collect();
        assert_eq!(labels, vec!["P1", "S2", "P4", "SC", "?"]);
        assert_eq!(annotations[4].color, Rgba::GRAY);
    }

    #[test]
    fn test_multi_line_mod_collapses() {
        let settings = ItemModsSettings::default();
        let extended = "{ Prefix Modifier \"Hybrid\" (Tier: 1) }\n\
                        +40% increased Armour\n\
                        +20 to maximum Life";
        let regular = "+40% increased Armour\n+20 to maximum Life";
        let mapping = parse_extended_block(extended, &settings);
        let annotations = annotate_regular_lines(regular, &mapping);
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].mod_lines, 2);
    }

    #[test]
    fn test_plain_line_skips_longer_hybrid_key() {
        let settings = ItemModsSettings::default();
        let extended = "{ Prefix Modifier \"Hybrid\" (Tier: 1) }\n\
                        +40% increased Armour and Energy Shield\n\
                        { Prefix Modifier \"Plain\" (Tier: 5) }\n\
                        +40% increased Armour";
        let mapping = parse_extended_block(extended, &settings);
        assert_eq!(mapping[0].0, "#% increased Armour and Energy Shield");

        let annotations = annotate_regular_lines("40% increased Armour", &mapping);
        let labels: Vec<_> = annotations.iter().map(|a| a.label.as_str()).collect();
        assert_eq!(labels, vec!["P5"]);
    }

    #[test]
    fn test_structured_labels_and_collapse() {
        let settings = ItemModsSettings::default();
        let prefix = record(ModType::Prefix);
        let suffix = record(ModType::Suffix);
        let unique = record(ModType::Unique);
        let mut implicit = value(&prefix, 0);
        implicit.is_implicit = true;
        let mods = vec![
            value(&suffix, 0),
            value(&prefix, 1),
            value(&unique, 0),
            implicit,
            value(&prefix, 1),
            value(&suffix, 5),
        ];
        let annotations = structured_annotations(&mods, &settings);
        let labels: Vec<_> = annotations
            .iter()
            .map(|a| (a.label.as_str(), a.mod_lines))
            .collect();
        assert_eq!(labels, vec![("P1", 2), ("S?", 1), ("S5", 1)]);
        assert_eq!(annotations[0].color, settings.t1_color);
        assert_eq!(annotations[2].color, settings.suffix_color);
    }

    #[test]
    fn test_scrape_is_cached_per_tooltip() {
        let settings = ItemModsSettings {
            fast_mods_strategy: FastModsStrategy::TextScrape,
            ..Default::default()
        };
        let mut tooltip = TooltipSnapshot {
            address: 1,
            mod_text: Some(ModTextBlocks {
                extended: EXTENDED.to_string(),
                regular: REGULAR.to_string(),
                regular_region: 2,
            }),
            ..Default::default()
        };
        let mut fast_mods = FastMods::new();
        let first = fast_mods
            .annotations(&FastModsContext { mods: &[], tooltip: &tooltip }, &settings)
            .unwrap();
        assert_eq!(first.len(), 5);

        // Same identity: the stale text is not re-read
        tooltip.mod_text.as_mut().unwrap().regular = String::from("+1 to Level of Socketed Gems");
        let cached = fast_mods
            .annotations(&FastModsContext { mods: &[], tooltip: &tooltip }, &settings)
            .unwrap();
        assert_eq!(cached, first);

        tooltip.mod_text.as_mut().unwrap().regular = String::from("175% increased Physical Damage");
        tooltip.mod_text.as_mut().unwrap().regular_region = 3;
        let reparsed = fast_mods
            .annotations(&FastModsContext { mods: &[], tooltip: &tooltip }, &settings)
            .unwrap();
        assert_eq!(reparsed.len(), 1);
        assert_eq!(reparsed[0].label, "P1");
    }

    #[test]
    fn test_missing_text_is_an_error() {
        let settings = ItemModsSettings {
            fast_mods_strategy: FastModsStrategy::TextScrape,
            ..Default::default()
        };
        let tooltip = TooltipSnapshot::default();
        let err = FastMods::new()
            .annotations(&FastModsContext { mods: &[], tooltip: &tooltip }, &settings)
            .unwrap_err();
        assert_eq!(err, FastModsError::MissingModText);
    }

    #[test]
    fn test_collapsed_box_is_double_height() {
        let mut twinned = CompactAnnotation::new("P1", Rgba::WHITE);
        twinned.mod_lines = 2;
        let annotations = vec![twinned, CompactAnnotation::new("S3", Rgba::WHITE)];
        let mut gfx = RecordingGraphics::new();
        let tooltip = RectF::new(100.0, 50.0, 300.0, 400.0);
        draw_annotations(&mut gfx, &annotations, tooltip, FastModsAnchor::Top);
        let boxes = gfx.boxes();
        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[0].height, 48.0);
        assert_eq!(boxes[1].height, 24.0);
        assert_eq!(boxes[1].y, 50.0 + 48.0);

        let mut gfx = RecordingGraphics::new();
        draw_annotations(&mut gfx, &annotations, tooltip, FastModsAnchor::Bottom);
        let first = gfx.calls.iter().find_map(|c| match c {
            DrawCall::Box { rect, .. } => Some(*rect),
            _ => None,
        });
        assert_eq!(first.unwrap().y, 450.0 - 72.0);
    }
}
