//! Per-frame hooks driven by the host.

use crate::config::Settings;
use crate::dps::{compute_weapon_dps, draw_weapon_dps, DamagePalette};
use crate::fast_mods::{FastMods, FastModsContext};
use crate::graphics::{with_text_scale, Graphics, BACKDROP_LEFT};
use crate::item::{HostFrame, HoverSnapshot, ItemSnapshot, ModsComponent};
use crate::layout::{sort_mods, ModLayout, SortOptions};
use crate::modifier::{build_all, ModValue};
use crate::records::ModRecordLookup;
use crate::types::{FontAlign, Rarity, RectF, Rgba, Vec2};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Shared, thread-safe record store
pub type SharedRecords = Arc<dyn ModRecordLookup + Send + Sync>;

/// Clipboard provided by the host
pub trait Clipboard: Send + Sync {
    fn set_text(&self, text: &str);
}

/// Hotkey state sampled by the host for this frame
#[derive(Debug, Clone, Copy, Default)]
pub struct HotkeyState {
    pub override_tooltip_held: bool,
    pub dump_mod_names_pressed: bool,
    pub dump_stat_names_pressed: bool,
}

/// The advanced tooltip overlay
pub struct AdvancedTooltip {
    settings: Settings,
    records: SharedRecords,
    fast_mods: FastMods,
    hovered: Option<HoverSnapshot>,
    override_held: bool,
}

impl AdvancedTooltip {
    pub fn new(settings: Settings, records: SharedRecords) -> Self {
        AdvancedTooltip {
            settings,
            records,
            fast_mods: FastMods::new(),
            hovered: None,
            override_held: false,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn hovered(&self) -> Option<&HoverSnapshot> {
        self.hovered.as_ref()
    }

    /// Record the hovered item and start any requested clipboard dumps.
    ///
    /// Dumps run on their own threads; the returned handles may be dropped.
    pub fn tick(
        &mut self,
        frame: HostFrame,
        hotkeys: HotkeyState,
        clipboard: &Arc<dyn Clipboard>,
    ) -> Vec<JoinHandle<()>> {
        self.hovered = frame.hovered.filter(|h| h.item.is_live());
        self.override_held = hotkeys.override_tooltip_held;

        let mut handles = Vec::new();
        let Some(item) = self.hovered.as_ref().map(|h| h.item.clone()) else {
            return handles;
        };

        if hotkeys.dump_stat_names_pressed {
            let records = Arc::clone(&self.records);
            let clipboard = Arc::clone(clipboard);
            let item = item.clone();
            handles.push(std::thread::spawn(move || {
                if let Some(text) = stat_names_dump(&item, records.as_ref()) {
                    clipboard.set_text(&text);
                    tracing::info!("hovered item matching stats copied to clipboard");
                }
            }));
        }
        if hotkeys.dump_mod_names_pressed {
            let clipboard = Arc::clone(clipboard);
            handles.push(std::thread::spawn(move || {
                if let Some(text) = mod_names_dump(&item) {
                    clipboard.set_text(&text);
                    tracing::info!("hovered item mod names copied to clipboard");
                }
            }));
        }

        handles
    }

    /// Draw every enabled overlay element for the hovered item
    pub fn render(&mut self, gfx: &mut dyn Graphics) {
        let Some(hover) = self.hovered.as_ref() else {
            return;
        };
        let Some(tooltip) = hover.tooltip.as_ref() else {
            return;
        };
        let item = &hover.item;
        if !item.is_live() {
            return;
        }
        let Some(mods_component) = item.mods.as_ref() else {
            return;
        };

        let settings = &self.settings;
        let rect = tooltip.rect;
        let header_offset = mods_component.header_offset();
        let override_active = settings
            .item_mods
            .override_tooltip_active(self.override_held);

        let mut mods = match build_all(
            mods_component,
            self.records.as_ref(),
            &item.base_class,
            Some(tooltip),
        ) {
            Ok(mods) => mods,
            Err(e) => {
                tracing::debug!(error = %e, address = item.address, "skipping item");
                return;
            }
        };

        if settings.item_mods.enable_tooltip
            && mods_component.identified
            && mods_component.rarity != Rarity::Normal
        {
            draw_enhanced_tooltip(gfx, settings, &mut mods, rect, header_offset, override_active);
        }

        if settings.item_mods.enable_mod_count {
            draw_mod_count(gfx, settings, &mods, rect);
        }

        if settings.item_level.enable {
            draw_item_level(gfx, settings, mods_component, rect, header_offset);
        }

        if settings.weapon_dps.enable_weapon_dps {
            if let Some(weapon) = &item.weapon {
                let palette = DamagePalette::from(&settings.weapon_dps);
                match compute_weapon_dps(
                    weapon,
                    &mods,
                    item.quality.as_ref(),
                    settings.weapon_dps.always_full_quality,
                    &palette,
                ) {
                    Some(dps) => draw_weapon_dps(gfx, rect, &dps, &settings.weapon_dps),
                    None => tracing::debug!(address = item.address, "weapon has no quality component"),
                }
            }
        }

        // Fast mods would sit on top of the replaced tooltip
        if override_active {
            return;
        }

        if settings.item_mods.enable_fast_mods
            && matches!(mods_component.rarity, Rarity::Magic | Rarity::Rare)
        {
            let ctx = FastModsContext {
                mods: &mods,
                tooltip,
            };
            self.fast_mods.draw(gfx, &ctx, &settings.item_mods);
        }
    }
}

fn draw_enhanced_tooltip(
    gfx: &mut dyn Graphics,
    settings: &Settings,
    mods: &mut [ModValue<'_>],
    rect: RectF,
    header_offset: f32,
    override_active: bool,
) {
    let left = rect.left();
    let (tooltip_top, mod_position) = if override_active {
        let top = rect.top() + header_offset;
        (top, Vec2::new(left + 5.0, top + 34.0))
    } else {
        let top = rect.bottom() + 5.0;
        (top, Vec2::new(left + 5.0, top + 4.0))
    };

    sort_mods(mods, SortOptions::from(&settings.item_mods));
    let end = ModLayout::new(&settings.item_mods).draw_mods(gfx, mods, mod_position);
    let height = end.y - tooltip_top;

    if height > 4.0 {
        let background_height = if override_active {
            height.max(rect.height - header_offset)
        } else {
            height
        };
        gfx.draw_box(
            RectF::new(left, tooltip_top, rect.width, background_height),
            settings.item_mods.background_color,
        );
    }
}

/// Count of tiered prefixes/suffixes at each of the top three tiers
pub fn tier_counts(mods: &[ModValue<'_>]) -> [usize; 3] {
    let mut counts = [0; 3];
    for m in mods {
        if m.could_have_tiers() && m.affix_type.is_affix() && (1..=3).contains(&m.tier) {
            counts[(m.tier - 1) as usize] += 1;
        }
    }
    counts
}

fn draw_mod_count(gfx: &mut dyn Graphics, settings: &Settings, mods: &[ModValue<'_>], rect: RectF) {
    let counts = tier_counts(mods);
    let rows = counts.iter().filter(|c| **c > 0).count();
    if rows == 0 {
        return;
    }

    let item_mods = &settings.item_mods;
    let scale = item_mods.mod_count_size;
    let note_height = gfx.measure_text("T").y * rows as f32 + 5.0;
    let width = gfx.measure_text("T1 x6").x + 10.0;
    let start = rect.top_left();
    let bounds = RectF::new(start.x, start.y, width * scale, note_height * scale);
    gfx.draw_box(bounds, item_mods.background_color);
    gfx.draw_frame(bounds, Rgba::GRAY, 1.0);

    let mut position = start.translate(5.0 * scale, 2.0 * scale);
    with_text_scale(gfx, scale, |gfx| {
        for (i, count) in counts.iter().enumerate() {
            if *count == 0 {
                continue;
            }
            let tier = i as i32 + 1;
            let color = item_mods.tier_color(tier).unwrap_or(Rgba::WHITE);
            position.y += gfx
                .draw_text(&format!("T{tier} x{count}"), position, color, FontAlign::LEFT)
                .y;
        }
    });
}

fn draw_item_level(
    gfx: &mut dyn Graphics,
    settings: &Settings,
    mods_component: &ModsComponent,
    rect: RectF,
    header_offset: f32,
) {
    let text = format!("iLVL: {}", mods_component.item_level);
    let position = Vec2::new(rect.left(), rect.top() + header_offset);
    let scale = settings.item_level.text_size;
    let grow = scale.powf(0.6);
    let backdrop = Vec2::new(385.0 * 0.4 * grow, 68.0 * 0.4 * grow);
    gfx.draw_image(
        BACKDROP_LEFT,
        RectF::new(position.x, position.y, backdrop.x, backdrop.y),
        settings.item_level.background_color,
    );
    let text_color = settings.item_level.text_color;
    with_text_scale(gfx, scale, |gfx| {
        gfx.draw_text(&text, position.translate(5.0, 4.0), text_color, FontAlign::LEFT);
    });
}

/// Raw mod names of the item, one per line
pub fn mod_names_dump(item: &ItemSnapshot) -> Option<String> {
    let mods = item.mods.as_ref()?;
    let text: String = mods
        .item_mods
        .iter()
        .map(|m| format!("{}\n", m.raw_name))
        .collect();
    (!text.is_empty()).then_some(text)
}

/// First stat key of each of the item's mods, one per line
pub fn stat_names_dump(item: &ItemSnapshot, records: &dyn ModRecordLookup) -> Option<String> {
    let mods = item.mods.as_ref()?;
    let text: String = mods
        .item_mods
        .iter()
        .filter_map(|m| records.record(&m.raw_name))
        .filter_map(|r| r.first_stat_key())
        .map(|key| format!("{key}\n"))
        .collect();
    (!text.is_empty()).then_some(text)
}
