use serde::{Deserialize, Serialize};

/// An 8-bit RGBA color. Serialized as `[r, g, b, a]` so settings files stay flat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 4]", into = "[u8; 4]")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const GRAY: Rgba = Rgba::rgb(128, 128, 128);
    pub const LIGHT_GRAY: Rgba = Rgba::rgb(211, 211, 211);
    pub const GAINSBORO: Rgba = Rgba::rgb(220, 220, 220);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Rgba { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Rgba { r, g, b, a }
    }

    /// Convert HSV (hue in degrees, saturation and value in 0..=1) to an opaque color.
    pub fn from_hsv(hue: f64, saturation: f64, value: f64) -> Self {
        let hue = hue.rem_euclid(360.0);
        let c = value * saturation;
        let h = hue / 60.0;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = value - c;
        let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Rgba::rgb(channel(r), channel(g), channel(b))
    }
}

impl From<[u8; 4]> for Rgba {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Rgba { r, g, b, a }
    }
}

impl From<Rgba> for [u8; 4] {
    fn from(c: Rgba) -> Self {
        [c.r, c.g, c.b, c.a]
    }
}

/// Screen-space point or size
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Vec2 { x, y }
    }

    pub fn translate(self, dx: f32, dy: f32) -> Self {
        Vec2::new(self.x + dx, self.y + dy)
    }
}

impl std::ops::Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// Axis-aligned rectangle in screen space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RectF {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl RectF {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        RectF {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_corners(top_left: Vec2, bottom_right: Vec2) -> Self {
        RectF::new(
            top_left.x,
            top_left.y,
            bottom_right.x - top_left.x,
            bottom_right.y - top_left.y,
        )
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn top_left(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Horizontal and vertical anchoring for drawn text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FontAlign {
    pub horizontal: HAlign,
    pub vertical_center: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl FontAlign {
    pub const LEFT: FontAlign = FontAlign {
        horizontal: HAlign::Left,
        vertical_center: false,
    };
    pub const CENTER: FontAlign = FontAlign {
        horizontal: HAlign::Center,
        vertical_center: false,
    };
    pub const RIGHT: FontAlign = FontAlign {
        horizontal: HAlign::Right,
        vertical_center: false,
    };
    pub const RIGHT_CENTER: FontAlign = FontAlign {
        horizontal: HAlign::Right,
        vertical_center: true,
    };
}

/// Item rarity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    #[default]
    Normal,
    Magic,
    Rare,
    Unique,
}

/// Modifier generation type as stored in the game data.
///
/// Discriminants follow the game's own numbering; display sorting relies on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModType {
    Prefix = 1,
    Suffix = 2,
    Unique = 3,
    Nemesis = 4,
    Corrupted = 5,
    BloodLines = 6,
    Torment = 7,
    Tempest = 8,
    Talisman = 9,
    Enchantment = 10,
    EssenceMonster = 11,
    Bestiary = 13,
    DelveArea = 14,
    SynthesisA = 15,
    SynthesisGlobals = 16,
    SynthesisBonus = 17,
    Blight = 18,
    BlightTower = 19,
    MonsterAffliction = 20,
    FlaskEnchantmentEnkindling = 21,
    FlaskEnchantmentInstilling = 22,
    ExpeditionLogbook = 23,
    ScourgeUpside = 24,
    ScourgeDownside = 25,
    ScourgeMap = 26,
    Implicit = 27,
    ExarchImplicit = 28,
    EaterImplicit = 29,
    WeaponTree = 31,
    WeaponTreeRecombined = 32,
    #[serde(other)]
    Other = 255,
}

impl ModType {
    pub fn is_affix(&self) -> bool {
        matches!(self, ModType::Prefix | ModType::Suffix)
    }

    pub fn ordinal(&self) -> i32 {
        *self as i32
    }
}

/// Source category of a modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModDomain {
    #[default]
    Item,
    Flask,
    Monster,
    Chest,
    Area,
    Crafted,
    Jewel,
    Atlas,
    Misc,
    AbyssJewel,
    Veiled,
    #[serde(other)]
    Other,
}

/// Damage categories accumulated for weapon DPS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DamageType {
    Physical,
    Fire,
    Cold,
    Lightning,
    Chaos,
}

impl DamageType {
    pub const ALL: [DamageType; 5] = [
        DamageType::Physical,
        DamageType::Fire,
        DamageType::Cold,
        DamageType::Lightning,
        DamageType::Chaos,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn is_elemental(&self) -> bool {
        !matches!(self, DamageType::Physical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsv_primary_hues() {
        assert_eq!(Rgba::from_hsv(0.0, 1.0, 1.0), Rgba::rgb(255, 0, 0));
        assert_eq!(Rgba::from_hsv(120.0, 1.0, 1.0), Rgba::rgb(0, 255, 0));
        assert_eq!(Rgba::from_hsv(180.0, 1.0, 1.0), Rgba::rgb(0, 255, 255));
        assert_eq!(Rgba::from_hsv(180.0, 0.0, 1.0), Rgba::WHITE);
    }

    #[test]
    fn test_color_serializes_as_array() {
        let json = serde_json::to_string(&Rgba::rgba(1, 2, 3, 4)).unwrap();
        assert_eq!(json, "[1,2,3,4]");
        let back: Rgba = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Rgba::rgba(1, 2, 3, 4));
    }

    #[test]
    fn test_unknown_mod_type_falls_back() {
        let t: ModType = serde_json::from_str("\"ritual\"").unwrap();
        assert_eq!(t, ModType::Other);
        assert!(ModType::Corrupted.ordinal() > ModType::Unique.ordinal());
    }
}
