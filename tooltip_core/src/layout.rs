//! Ordering and vertical text flow for the advanced tooltip body.

use crate::config::ItemModsSettings;
use crate::graphics::Graphics;
use crate::modifier::ModValue;
use crate::types::{FontAlign, ModDomain, ModType, Rgba, Vec2};
use std::cmp::Ordering;

const MARGIN_BOTTOM: f32 = 4.0;
const EPSILON: f32 = 0.001;

/// Tag text and color for an affix type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AffixStyle {
    pub affix_type: ModType,
    pub tag: &'static str,
    /// `None` defers to the configurable prefix/suffix colors
    pub color: Option<Rgba>,
}

const fn style(affix_type: ModType, tag: &'static str, color: Option<Rgba>) -> AffixStyle {
    AffixStyle {
        affix_type,
        tag,
        color,
    }
}

pub static AFFIX_STYLES: &[AffixStyle] = &[
    style(ModType::Prefix, "[P]", None),
    style(ModType::Suffix, "[S]", None),
    style(ModType::Corrupted, "[C]", Some(Rgba::rgb(220, 20, 60))),
    style(ModType::Unique, "[U]", Some(Rgba::rgb(255, 140, 0))),
    style(ModType::Enchantment, "[E]", Some(Rgba::rgb(255, 0, 255))),
    style(ModType::Implicit, "[I]", Some(IMPLICIT_COLOR)),
    style(ModType::Nemesis, "[NEM]", Some(Rgba::rgb(255, 20, 147))),
    style(ModType::BloodLines, "[BLD]", Some(Rgba::rgb(0, 128, 0))),
    style(ModType::Torment, "[TOR]", Some(Rgba::rgb(178, 34, 34))),
    style(ModType::Tempest, "[TEM]", Some(Rgba::rgb(65, 105, 225))),
    style(ModType::Talisman, "[TAL]", Some(Rgba::rgb(218, 165, 32))),
    style(ModType::EssenceMonster, "[ESS]", Some(Rgba::rgb(139, 0, 139))),
    style(ModType::Bestiary, "[BES]", Some(Rgba::rgb(255, 99, 71))),
    style(ModType::DelveArea, "[DEL]", Some(Rgba::rgb(47, 79, 79))),
    style(ModType::SynthesisA, "[SYN]", Some(Rgba::rgb(255, 105, 180))),
    style(ModType::SynthesisGlobals, "[SGS]", Some(Rgba::rgb(186, 85, 211))),
    style(ModType::SynthesisBonus, "[SYB]", Some(Rgba::rgb(100, 149, 237))),
    style(ModType::Blight, "[BLI]", Some(Rgba::rgb(0, 100, 0))),
    style(ModType::BlightTower, "[BLT]", Some(Rgba::rgb(0, 100, 0))),
    style(ModType::MonsterAffliction, "[MAF]", Some(Rgba::rgb(123, 104, 238))),
    style(ModType::FlaskEnchantmentEnkindling, "[FEE]", Some(Rgba::rgb(255, 165, 0))),
    style(ModType::FlaskEnchantmentInstilling, "[FEI]", Some(Rgba::rgb(255, 165, 0))),
    style(ModType::ExpeditionLogbook, "[LOG]", Some(Rgba::rgb(218, 165, 32))),
    style(ModType::ScourgeUpside, "[SCU]", Some(Rgba::rgb(218, 165, 32))),
    style(ModType::ScourgeDownside, "[SCD]", Some(Rgba::rgb(218, 165, 32))),
    style(ModType::ScourgeMap, "[SCM]", Some(Rgba::rgb(218, 165, 32))),
    style(ModType::ExarchImplicit, "[EXI]", Some(Rgba::rgb(255, 69, 0))),
    style(ModType::EaterImplicit, "[EAT]", Some(Rgba::rgb(255, 69, 0))),
    style(ModType::WeaponTree, "[CRU]", Some(Rgba::rgb(254, 114, 53))),
    style(ModType::WeaponTreeRecombined, "[CRC]", Some(Rgba::rgb(254, 114, 53))),
];

const UNKNOWN_STYLE: AffixStyle = style(ModType::Other, "[?]", Some(Rgba::LIGHT_GRAY));
const IMPLICIT_COLOR: Rgba = Rgba::rgba(218, 219, 193, 156);

pub fn affix_style(affix_type: ModType) -> AffixStyle {
    AFFIX_STYLES
        .iter()
        .find(|s| s.affix_type == affix_type)
        .copied()
        .unwrap_or(UNKNOWN_STYLE)
}

/// Tag and color drawn in the leading column for a mod
pub fn affix_tag(item: &ModValue<'_>, settings: &ItemModsSettings) -> (&'static str, Rgba) {
    if item.is_implicit {
        return ("[I]", IMPLICIT_COLOR);
    }
    let style = affix_style(item.affix_type);
    let color = style.color.unwrap_or(match item.affix_type {
        ModType::Suffix => settings.suffix_color,
        _ => settings.prefix_color,
    });
    (style.tag, color)
}

/// Color of a named mod tag
pub fn tag_color(tag: &str) -> Rgba {
    match tag {
        "Fire" => Rgba::rgb(255, 0, 0),
        "Cold" => Rgba::rgb(41, 102, 241),
        "Life" => Rgba::rgb(255, 0, 255),
        "Lightning" => Rgba::rgb(255, 255, 0),
        "Physical" => Rgba::rgb(225, 170, 20),
        "Critical" => Rgba::rgb(168, 220, 26),
        "Mana" => Rgba::rgb(20, 240, 255),
        "Attack" => Rgba::rgb(240, 100, 30),
        "Speed" => Rgba::rgb(0, 255, 192),
        "Caster" => Rgba::rgb(216, 0, 255),
        "Elemental" => Rgba::WHITE,
        "Gem Level" => Rgba::rgb(200, 230, 160),
        _ => Rgba::GRAY,
    }
}

/// Which optional sort keys are active
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortOptions {
    pub by_tier: bool,
    pub by_name: bool,
}

impl From<&ItemModsSettings> for SortOptions {
    fn from(settings: &ItemModsSettings) -> Self {
        SortOptions {
            by_tier: settings.sort_mods_by_tier,
            by_name: settings.sort_mods_by_name,
        }
    }
}

fn affix_priority(affix_type: ModType) -> i32 {
    match affix_type {
        ModType::Corrupted => -1,
        ModType::Unique => 0,
        other => other.ordinal(),
    }
}

/// Total display order; ties keep their original relative order
pub fn compare_mods(a: &ModValue<'_>, b: &ModValue<'_>, options: SortOptions) -> Ordering {
    let mut ord = b
        .is_implicit
        .cmp(&a.is_implicit)
        .then_with(|| affix_priority(a.affix_type).cmp(&affix_priority(b.affix_type)));
    if options.by_tier {
        // Unresolved tiers sort last
        ord = ord.then_with(|| (a.tier <= 0, a.tier).cmp(&(b.tier <= 0, b.tier)));
    }
    if options.by_name {
        ord = ord
            .then_with(|| a.short_name.is_empty().cmp(&b.short_name.is_empty()))
            .then_with(|| a.short_name.cmp(b.short_name));
    }
    ord
}

/// Stable sort into display order
pub fn sort_mods(mods: &mut [ModValue<'_>], options: SortOptions) {
    mods.sort_by(|a, b| compare_mods(a, b, options));
}

/// Draws resolved mods as stacked text runs
pub struct ModLayout<'s> {
    settings: &'s ItemModsSettings,
}

impl<'s> ModLayout<'s> {
    pub fn new(settings: &'s ItemModsSettings) -> Self {
        ModLayout { settings }
    }

    /// Draw every mod with stats from `start`, returning the final cursor
    pub fn draw_mods(&self, gfx: &mut dyn Graphics, mods: &[ModValue<'_>], start: Vec2) -> Vec2 {
        mods.iter()
            .filter(|m| m.record.has_stats())
            .fold(start, |position, item| self.draw_mod(gfx, item, position))
    }

    /// Color of the tier/short-name/full-name runs
    fn affix_text_color(&self, item: &ModValue<'_>) -> Rgba {
        let settings = self.settings;
        if item.record.domain == ModDomain::Crafted {
            return settings.special_colors.crafted_color;
        }
        let base = match item.affix_type {
            ModType::Suffix => settings.suffix_color,
            _ => settings.prefix_color,
        };
        if item.affix_type.is_affix() && item.could_have_tiers() {
            settings.tier_color(item.tier).unwrap_or(base)
        } else {
            base
        }
    }

    /// Draw one mod at `position`; returns where the next mod starts.
    ///
    /// A mod that advanced the cursor gets a bottom margin, one that drew
    /// nothing leaves it untouched.
    pub fn draw_mod(&self, gfx: &mut dyn Graphics, item: &ModValue<'_>, position: Vec2) -> Vec2 {
        let settings = self.settings;
        let origin = position;
        let mut position = position;

        let (affix_tag, tag_color_main) = affix_tag(item, settings);
        let affix_type_width = gfx
            .measure_text(&format!("{affix_tag} "))
            .x
            .max(gfx.measure_text("[P] ").x);
        gfx.draw_text(affix_tag, position, tag_color_main, FontAlign::LEFT);

        if !matches!(item.affix_type, ModType::Unique | ModType::Corrupted) {
            let color = self.affix_text_color(item);
            let column = position.translate(affix_type_width, 0.0);

            let mut tier_size = Vec2::ZERO;
            let tier_text = if item.is_crafted {
                "Crafted ".to_string()
            } else if item.affix_type.is_affix() {
                item.tier_text()
            } else {
                String::new()
            };
            if !tier_text.is_empty() {
                tier_size = gfx.draw_text(&tier_text, column, color, FontAlign::LEFT);
            }

            if settings.show_short_names && !item.short_name.is_empty() {
                let size = gfx.draw_text(
                    item.short_name,
                    column.translate(tier_size.x, 0.0),
                    color,
                    FontAlign::LEFT,
                );
                tier_size.x += size.x;
                tier_size.y = tier_size.y.max(size.y);
            }

            let text_size = if settings.show_mod_names {
                let text = if !item.short_name.is_empty()
                    || (tier_size.x > 0.0 && !item.could_have_tiers())
                {
                    format!(" | \"{}\"", item.affix_text)
                } else {
                    format!("\"{}\"", item.affix_text)
                };
                gfx.draw_text(&text, column.translate(tier_size.x, 0.0), color, FontAlign::LEFT)
            } else {
                Vec2::ZERO
            };
            let header_height = tier_size.y.max(text_size.y);

            let mut tags_size = Vec2::ZERO;
            if settings.show_tags && !item.tags.is_empty() {
                let tags_position = if settings.start_tags_on_same_line {
                    let at = column.translate(tier_size.x + text_size.x, 0.0);
                    tags_size.x += gfx.measure_text(" ").x;
                    at
                } else {
                    column.translate(0.0, header_height)
                };

                for tag in &item.tags {
                    let at = tags_position.translate(tags_size.x, 0.0);
                    tags_size.x += gfx
                        .draw_text(&format!("[{tag}] "), at, tag_color(tag), FontAlign::LEFT)
                        .x;
                }
                tags_size.y = gfx.measure_text(&item.tags[0]).y;

                if !settings.start_tags_on_same_line {
                    position.y += tags_size.y;
                }
            }

            if settings.start_stats_on_same_line {
                position.x += tier_size.x
                    + text_size.x
                    + if settings.start_tags_on_same_line {
                        tags_size.x
                    } else {
                        0.0
                    };
            } else {
                position.y += header_height;
            }
        }

        if !item.human_name.is_empty() {
            let text = if settings.start_stats_on_same_line {
                format!(" {}", item.human_name)
            } else {
                item.human_name.clone()
            };
            let size = gfx.draw_text(
                &text,
                position.translate(affix_type_width, 0.0),
                Rgba::GAINSBORO,
                FontAlign::LEFT,
            );
            position.y += size.y;
        }

        if settings.show_stat_names {
            if let Some(stat) = item.record.first_stat_key() {
                let size = gfx.draw_text(
                    stat,
                    position.translate(affix_type_width, 0.0),
                    Rgba::GRAY,
                    FontAlign::LEFT,
                );
                position.y += size.y;
            }
        }

        if (position.y - origin.y).abs() > EPSILON {
            Vec2::new(origin.x, position.y + MARGIN_BOTTOM)
        } else {
            origin
        }
    }
}
