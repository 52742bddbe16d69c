//! Platform-agnostic wall clock
//!
//! The engine works in epoch milliseconds so that feed timestamps and timer
//! deadlines share one axis.

use crate::core::Millis;

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
pub fn now_millis() -> Millis {
    js_sys::Date::now() as Millis
}

#[cfg(not(all(target_arch = "wasm32", feature = "wasm")))]
pub fn now_millis() -> Millis {
    chrono::Utc::now().timestamp_millis()
}
