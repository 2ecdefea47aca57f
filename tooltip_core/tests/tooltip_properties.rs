use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use std::sync::Arc;
use tooltip_core::config::ItemModsSettings;
use tooltip_core::item::{ModsComponent, RawMod};
use tooltip_core::layout::{sort_mods, ModLayout, SortOptions};
use tooltip_core::modifier::{build_all, ModValue};
use tooltip_core::records::StatEntry;
use tooltip_core::{
    AdvancedTooltip, Clipboard, FrameCapture, Graphics, HotkeyState, ModDomain, ModRecord,
    ModRecordStore, ModType, Rarity, RecordingGraphics, Settings, Vec2,
};

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../data")
}

fn record(key: &str, group: &str, affix_type: ModType, min_level: u32) -> ModRecord {
    ModRecord {
        key: key.to_string(),
        group: group.to_string(),
        affix_type,
        domain: ModDomain::Item,
        tier: String::new(),
        min_level,
        name: format!("{key} affix"),
        stats: vec![StatEntry {
            key: format!("{}_stat", group.to_lowercase()),
            min: 1,
            max: 10,
        }],
    }
}

fn raw(key: &str, group: &str) -> RawMod {
    RawMod {
        raw_name: key.to_string(),
        name: key.to_string(),
        display_name: format!("{key} rolled"),
        group: group.to_string(),
        values: vec![5],
    }
}

fn component(item_mods: Vec<RawMod>) -> ModsComponent {
    ModsComponent {
        rarity: Rarity::Rare,
        item_level: 100,
        identified: true,
        item_mods,
        implicit_mods: Vec::new(),
    }
}

#[test]
fn test_tiers_form_permutation_for_any_dataset_order() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    for _ in 0..50 {
        let count = rng.gen_range(2..=12);
        let mut records: Vec<ModRecord> = (1..=count)
            .map(|i| record(&format!("IncreasedMana{i}"), "IncreasedMana", ModType::Prefix, i * 5))
            .collect();
        records.shuffle(&mut rng);
        let store = ModRecordStore::from_records(records.clone());

        let item_mods: Vec<RawMod> = records.iter().map(|r| raw(&r.key, "IncreasedMana")).collect();
        let mods = component(item_mods);
        let values = build_all(&mods, &store, "Ring", None).unwrap();

        let mut tiers: Vec<i32> = values.iter().map(|v| v.tier).collect();
        tiers.sort_unstable();
        assert_eq!(tiers, (1..=count as i32).collect::<Vec<_>>());
        assert!(values.iter().all(|v| v.total_tiers == count as usize));

        // Dataset order decides the tier
        for (position, value) in values.iter().enumerate() {
            assert_eq!(value.tier, position as i32 + 1);
        }
    }
}

fn mixed_store() -> ModRecordStore {
    ModRecordStore::from_records([
        record("IncreasedLife3", "IncreasedLife", ModType::Prefix, 1),
        record("IncreasedLife2", "IncreasedLife", ModType::Prefix, 1),
        record("IncreasedLife1", "IncreasedLife", ModType::Prefix, 1),
        record("FireResist2", "FireResistance", ModType::Suffix, 1),
        record("FireResist1", "FireResistance", ModType::Suffix, 1),
        record("ColdResist2", "ColdResistance", ModType::Suffix, 1),
        record("ColdResist1", "ColdResistance", ModType::Suffix, 1),
        record("UniqueStrength", "Strength", ModType::Unique, 1),
        record("CorruptedCrit", "CriticalStrikeChance", ModType::Corrupted, 1),
    ])
}

fn random_item(store: &ModRecordStore, rng: &mut ChaCha8Rng) -> ModsComponent {
    let pool = [
        ("IncreasedLife3", "IncreasedLife"),
        ("IncreasedLife2", "IncreasedLife"),
        ("IncreasedLife1", "IncreasedLife"),
        ("FireResist2", "FireResistance"),
        ("FireResist1", "FireResistance"),
        ("ColdResist2", "ColdResistance"),
        ("ColdResist1", "ColdResistance"),
        ("UniqueStrength", "Strength"),
        ("CorruptedCrit", "CriticalStrikeChance"),
    ];
    assert_eq!(store.len(), pool.len());
    let count = rng.gen_range(0..=pool.len());
    let item_mods = pool
        .choose_multiple(rng, count)
        .map(|(key, group)| raw(key, group))
        .collect();
    component(item_mods)
}

fn keys(values: &[ModValue<'_>]) -> Vec<String> {
    values.iter().map(|v| v.record.key.clone()).collect()
}

#[test]
fn test_sort_is_idempotent() {
    let store = mixed_store();
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let all_options = [
        SortOptions::default(),
        SortOptions { by_tier: true, by_name: false },
        SortOptions { by_tier: false, by_name: true },
        SortOptions { by_tier: true, by_name: true },
    ];

    for _ in 0..40 {
        let mods = random_item(&store, &mut rng);
        for options in all_options {
            let mut values = build_all(&mods, &store, "Helmet", None).unwrap();
            sort_mods(&mut values, options);
            let once = keys(&values);
            sort_mods(&mut values, options);
            assert_eq!(keys(&values), once);

            // Corrupted before unique before prefixes before suffixes
            let priorities: Vec<i32> = values
                .iter()
                .map(|v| match v.affix_type {
                    ModType::Corrupted => -1,
                    ModType::Unique => 0,
                    other => other.ordinal(),
                })
                .collect();
            assert!(priorities.windows(2).all(|w| w[0] <= w[1]));
        }
    }
}

#[test]
fn test_layout_height_grows_with_mods() {
    let store = mixed_store();
    let settings = Settings::default();
    let layout = ModLayout::new(&settings.item_mods);
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    for _ in 0..20 {
        let mods = random_item(&store, &mut rng);
        let values = build_all(&mods, &store, "Gloves", None).unwrap();

        let mut last = 0.0;
        for n in 0..=values.len() {
            let mut gfx = RecordingGraphics::new();
            let end = layout.draw_mods(&mut gfx, &values[..n], Vec2::ZERO);
            assert!(end.y >= last, "height shrank at {n} mods");
            last = end.y;
        }
    }
}

const TAGS: [&str; 5] = ["Life", "Defences", "Fire", "Elemental", "Resistance"];

type Toggle = fn(&mut ItemModsSettings, bool);

fn random_layout_settings(rng: &mut ChaCha8Rng) -> ItemModsSettings {
    ItemModsSettings {
        show_short_names: rng.gen(),
        show_mod_names: rng.gen(),
        show_tags: rng.gen(),
        show_stat_names: rng.gen(),
        ..Default::default()
    }
}

#[test]
fn test_enabling_a_field_never_lowers_height() {
    let store = mixed_store();
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let toggles: [(&str, Toggle); 4] = [
        ("show_stat_names", |s: &mut ItemModsSettings, on: bool| s.show_stat_names = on),
        ("show_tags", |s: &mut ItemModsSettings, on: bool| s.show_tags = on),
        ("show_short_names", |s: &mut ItemModsSettings, on: bool| s.show_short_names = on),
        ("show_mod_names", |s: &mut ItemModsSettings, on: bool| s.show_mod_names = on),
    ];

    for _ in 0..30 {
        let mods = random_item(&store, &mut rng);
        let mut values = build_all(&mods, &store, "Boots", None).unwrap();
        for value in &mut values {
            let count = rng.gen_range(1..=3);
            value.tags = TAGS
                .choose_multiple(&mut rng, count)
                .map(|tag| tag.to_string())
                .collect();
        }
        let base = random_layout_settings(&mut rng);

        for stats_same_line in [false, true] {
            for tags_same_line in [false, true] {
                for (name, toggle) in toggles {
                    let mut off = ItemModsSettings {
                        start_stats_on_same_line: stats_same_line,
                        start_tags_on_same_line: tags_same_line,
                        ..base.clone()
                    };
                    toggle(&mut off, false);
                    let mut on = off.clone();
                    toggle(&mut on, true);

                    let mut gfx = RecordingGraphics::new();
                    let off_end = ModLayout::new(&off).draw_mods(&mut gfx, &values, Vec2::ZERO);
                    let on_end = ModLayout::new(&on).draw_mods(&mut gfx, &values, Vec2::ZERO);
                    assert!(
                        on_end.y >= off_end.y,
                        "{name} lowered height (stats same line: {stats_same_line}, tags same line: {tags_same_line})"
                    );
                }
            }
        }
    }
}

struct NullClipboard;

impl Clipboard for NullClipboard {
    fn set_text(&self, _text: &str) {}
}

#[test]
fn test_demo_capture_renders() {
    let data = data_dir();
    let store = ModRecordStore::load_from_dir(&data.join("mods")).unwrap();
    assert!(!store.is_empty());
    let capture = FrameCapture::load_from_file(&data.join("captures/demo.json")).unwrap();
    assert!(!capture.frames.is_empty());

    let mut settings = Settings::default();
    settings.item_mods.enable_fast_mods = true;
    let mut overlay = AdvancedTooltip::new(settings, Arc::new(store));
    let clipboard: Arc<dyn Clipboard> = Arc::new(NullClipboard);

    for index in 0..capture.frames.len() {
        overlay.tick(capture.host_frame(index), HotkeyState::default(), &clipboard);
        let mut gfx = RecordingGraphics::new();
        overlay.render(&mut gfx);
        assert!(
            gfx.texts().iter().any(|t| t.starts_with("iLVL: ")),
            "frame {index} drew no item level"
        );
        assert_eq!(gfx.text_scale(), 1.0);
    }
}
