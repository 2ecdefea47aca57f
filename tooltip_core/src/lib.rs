pub mod capture;
pub mod config;
pub mod dps;
pub mod fast_mods;
pub mod graphics;
pub mod item;
pub mod layout;
pub mod modifier;
pub mod overlay;
pub mod records;
pub mod tier;
pub mod types;

pub use capture::FrameCapture;
pub use config::{ConfigError, Settings};
pub use graphics::{Graphics, RecordingGraphics};
pub use item::{HostFrame, HoverSnapshot, ItemSnapshot};
pub use modifier::{build_all, BuildError, ModValue};
pub use overlay::{AdvancedTooltip, Clipboard, HotkeyState, SharedRecords};
pub use records::{ModRecord, ModRecordLookup, ModRecordStore};
pub use types::*;
