use crate::item::{HostFrame, HoverSnapshot};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A recorded sequence of hover snapshots, replayable as host frames
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameCapture {
    #[serde(default)]
    pub description: String,
    pub frames: Vec<HoverSnapshot>,
}

impl FrameCapture {
    pub fn new() -> Self {
        FrameCapture::default()
    }

    pub fn add(&mut self, frame: HoverSnapshot) {
        self.frames.push(frame);
    }

    /// The host frame for capture entry `index`, with nothing hovered past the end
    pub fn host_frame(&self, index: usize) -> HostFrame {
        HostFrame {
            hovered: self.frames.get(index).cloned(),
        }
    }

    /// Export to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Import from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn save_to_file(&self, path: &Path) -> std::io::Result<()> {
        let json = self
            .to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }

    pub fn load_from_file(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}
