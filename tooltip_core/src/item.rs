//! Plain-value snapshots of host state, copied at the start of each frame.

use crate::types::{Rarity, RectF};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

/// Everything the host exposes for one frame
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostFrame {
    /// The item under the cursor, if any
    #[serde(default)]
    pub hovered: Option<HoverSnapshot>,
}

/// A hovered inventory icon together with its native tooltip
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoverSnapshot {
    pub item: ItemSnapshot,
    /// Absent while the game shows no tooltip for the icon
    #[serde(default)]
    pub tooltip: Option<TooltipSnapshot>,
}

/// A hovered item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSnapshot {
    /// Stable identity of the entity; zero means no entity
    pub address: u64,
    #[serde(default = "default_true")]
    pub is_valid: bool,
    /// Base item class, e.g. "Two Hand Sword"
    #[serde(default)]
    pub base_class: String,
    /// Absent when the entity has no mods component
    #[serde(default)]
    pub mods: Option<ModsComponent>,
    #[serde(default)]
    pub weapon: Option<WeaponStats>,
    #[serde(default)]
    pub quality: Option<QualityStats>,
}

fn default_true() -> bool {
    true
}

impl ItemSnapshot {
    pub fn is_live(&self) -> bool {
        self.address != 0 && self.is_valid
    }
}

/// The item's modifier component
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModsComponent {
    #[serde(default)]
    pub rarity: Rarity,
    #[serde(default)]
    pub item_level: u32,
    #[serde(default)]
    pub identified: bool,
    /// All modifiers on the item, implicits included
    #[serde(default)]
    pub item_mods: Vec<RawMod>,
    /// The implicit subset of `item_mods`
    #[serde(default)]
    pub implicit_mods: Vec<RawMod>,
}

impl ModsComponent {
    pub fn is_implicit(&self, raw_name: &str) -> bool {
        self.implicit_mods.iter().any(|m| m.raw_name == raw_name)
    }

    /// A mod with neither a raw nor a display name means the item is still loading
    pub fn is_incomplete(&self) -> bool {
        self.item_mods
            .iter()
            .any(|m| m.raw_name.is_empty() && m.name.is_empty())
    }

    /// Vertical offset from the tooltip top to the first line below its header
    pub fn header_offset(&self) -> f32 {
        match self.rarity {
            Rarity::Rare | Rarity::Unique if self.identified => 80.0,
            _ => 50.0,
        }
    }
}

/// One modifier instance as rolled on the item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMod {
    /// Record identifier
    pub raw_name: String,
    #[serde(default)]
    pub name: String,
    /// Rendered stat text, e.g. "+35 to maximum Life"
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub group: String,
    /// Rolled values, aligned with the record's stats
    #[serde(default)]
    pub values: Vec<i32>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WeaponStats {
    pub damage_min: i32,
    pub damage_max: i32,
    /// Milliseconds per attack
    pub attack_time: i32,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct QualityStats {
    pub item_quality: i32,
}

/// The native tooltip window
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TooltipSnapshot {
    /// Stable identity of the tooltip element
    #[serde(default)]
    pub address: u64,
    pub rect: RectF,
    /// Child element tree
    #[serde(default)]
    pub children: Vec<UiElement>,
    /// Raw description text of the mod area, when the host located it
    #[serde(default)]
    pub mod_text: Option<ModTextBlocks>,
}

/// The two text renderings of the tooltip's modifier area
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModTextBlocks {
    /// Verbose text with tier headers and roll ranges
    pub extended: String,
    /// Plain display lines as shown to the player
    pub regular: String,
    /// Identity of the element the regular lines were read from
    #[serde(default)]
    pub regular_region: u64,
}

/// A UI element copied out of the host tree
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiElement {
    #[serde(default)]
    pub id: u64,
    #[serde(default = "default_true")]
    pub is_valid: bool,
    #[serde(default)]
    pub text: Option<String>,
    /// Text of the hover tooltip attached to this element
    #[serde(default)]
    pub tooltip_text: Option<String>,
    #[serde(default)]
    pub children: Vec<UiElement>,
}

impl UiElement {
    pub fn with_text(text: impl Into<String>) -> Self {
        UiElement {
            text: Some(text.into()),
            is_valid: true,
            ..Default::default()
        }
    }
}

/// A matched element and its parent, if it has one
#[derive(Debug, Clone, Copy)]
pub struct FoundElement<'a> {
    pub element: &'a UiElement,
    pub parent: Option<&'a UiElement>,
}

/// Breadth-first search over an element forest.
///
/// Elements sharing an `id` (other than 0) are only visited once.
pub fn find_elements<'a>(
    roots: &'a [UiElement],
    mut predicate: impl FnMut(&UiElement) -> bool,
) -> Vec<FoundElement<'a>> {
    let mut queue: VecDeque<FoundElement<'a>> = roots
        .iter()
        .map(|element| FoundElement {
            element,
            parent: None,
        })
        .collect();
    let mut visited = HashSet::new();
    let mut found = Vec::new();

    while let Some(next) = queue.pop_front() {
        if next.element.id != 0 && !visited.insert(next.element.id) {
            continue;
        }
        if predicate(next.element) {
            found.push(next);
        }
        queue.extend(next.element.children.iter().map(|child| FoundElement {
            element: child,
            parent: Some(next.element),
        }));
    }

    found
}

/// First element matching the predicate, breadth-first
pub fn find_element<'a>(
    roots: &'a [UiElement],
    predicate: impl FnMut(&UiElement) -> bool,
) -> Option<FoundElement<'a>> {
    find_elements(roots, predicate).into_iter().next()
}
