//! Drawing surface provided by the host.

use crate::types::{FontAlign, RectF, Rgba, Vec2};

/// Image drawn behind the weapon DPS block
pub const BACKDROP: &str = "backdrop.png";
/// Image drawn behind the item level label
pub const BACKDROP_LEFT: &str = "backdrop_left.png";

/// Immediate-mode drawing primitives.
///
/// Sizes returned by `measure_text` and `draw_text` already include the
/// current text scale.
pub trait Graphics {
    fn measure_text(&self, text: &str) -> Vec2;

    /// Draw text anchored at `position` and return its size
    fn draw_text(&mut self, text: &str, position: Vec2, color: Rgba, align: FontAlign) -> Vec2;

    fn draw_box(&mut self, rect: RectF, color: Rgba);

    fn draw_frame(&mut self, rect: RectF, color: Rgba, thickness: f32);

    fn draw_image(&mut self, name: &str, rect: RectF, tint: Rgba);

    fn text_scale(&self) -> f32;

    fn set_text_scale(&mut self, scale: f32);
}

/// Run `f` with a temporary text scale, restoring the previous one after
pub fn with_text_scale<G, R>(gfx: &mut G, scale: f32, f: impl FnOnce(&mut G) -> R) -> R
where
    G: Graphics + ?Sized,
{
    let old = gfx.text_scale();
    gfx.set_text_scale(scale);
    let result = f(gfx);
    gfx.set_text_scale(old);
    result
}

/// A recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Text {
        text: String,
        position: Vec2,
        color: Rgba,
        align: FontAlign,
    },
    Box {
        rect: RectF,
        color: Rgba,
    },
    Frame {
        rect: RectF,
        color: Rgba,
    },
    Image {
        name: String,
        rect: RectF,
        tint: Rgba,
    },
}

/// Fixed-metrics surface that records every call; each character is
/// `char_width` wide and every line `line_height` tall.
#[derive(Debug, Clone)]
pub struct RecordingGraphics {
    pub char_width: f32,
    pub line_height: f32,
    pub scale: f32,
    pub calls: Vec<DrawCall>,
}

impl Default for RecordingGraphics {
    fn default() -> Self {
        RecordingGraphics {
            char_width: 8.0,
            line_height: 16.0,
            scale: 1.0,
            calls: Vec::new(),
        }
    }
}

impl RecordingGraphics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every text string drawn, in order
    pub fn texts(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn boxes(&self) -> Vec<RectF> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Box { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect()
    }
}

impl Graphics for RecordingGraphics {
    fn measure_text(&self, text: &str) -> Vec2 {
        if text.is_empty() {
            return Vec2::ZERO;
        }
        Vec2::new(
            text.chars().count() as f32 * self.char_width * self.scale,
            self.line_height * self.scale,
        )
    }

    fn draw_text(&mut self, text: &str, position: Vec2, color: Rgba, align: FontAlign) -> Vec2 {
        self.calls.push(DrawCall::Text {
            text: text.to_string(),
            position,
            color,
            align,
        });
        self.measure_text(text)
    }

    fn draw_box(&mut self, rect: RectF, color: Rgba) {
        self.calls.push(DrawCall::Box { rect, color });
    }

    fn draw_frame(&mut self, rect: RectF, color: Rgba, _thickness: f32) {
        self.calls.push(DrawCall::Frame { rect, color });
    }

    fn draw_image(&mut self, name: &str, rect: RectF, tint: Rgba) {
        self.calls.push(DrawCall::Image {
            name: name.to_string(),
            rect,
            tint,
        });
    }

    fn text_scale(&self) -> f32 {
        self.scale
    }

    fn set_text_scale(&mut self, scale: f32) {
        self.scale = scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_is_restored() {
        let mut gfx = RecordingGraphics::new();
        let size = with_text_scale(&mut gfx, 2.0, |g| g.measure_text("ab"));
        assert_eq!(size, Vec2::new(32.0, 32.0));
        assert_eq!(gfx.text_scale(), 1.0);
    }
}
