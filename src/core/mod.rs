//! Platform-agnostic core module - shared between WASM dashboard and CLI

pub mod alarm;
pub mod brush;
pub mod bubble;
pub mod engine;
pub mod error;
pub mod events;
pub mod layout;
pub mod parser;
pub mod render;
pub mod scale;
pub mod store;
pub mod timers;
pub mod viewport;
pub mod window;

pub use alarm::{AlarmState, SILENCE_OPTIONS_MIN};
pub use engine::Engine;
pub use error::{DataError, FeedError};
pub use events::{AlarmKind, EngineEvent, FeedBatch, FeedMessage};
pub use parser::parse_feed;
pub use render::{clock_label, GeometryBatch, RefLineKind};
pub use store::{Sample, SampleStore, SeriesTag, Treatment};
pub use viewport::ViewportMode;
pub use window::{Millis, TimeWindow, FOCUS_SPAN, HOUR_MS, MINUTE_MS};
