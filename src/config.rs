//! Application-level configuration: UI timing constants and the embedded
//! model configuration.

use clean_air_classrooms::ModelConfig;
use log::warn;
use once_cell::sync::Lazy;

// UI timing
pub const ANIMATION_DURATION_MS: f64 = 420.0;
pub const FRAME_INTERVAL_MS: u32 = 16;
pub const COUNTDOWN_TICK_MS: u32 = 1000;

/// The externally supplied model, parsed once. `None` disables the whole
/// feature and the app renders nothing.
pub static MODEL: Lazy<Option<ModelConfig>> = Lazy::new(|| {
    match ModelConfig::from_json(include_str!("model.json")) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            warn!("{}", e);
            None
        }
    }
});
