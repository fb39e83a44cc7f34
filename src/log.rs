//! Console logging that works both in the browser and in native test runs.

/// Log an informational message.
pub fn info(msg: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::log_1(&msg.into());
    #[cfg(not(target_arch = "wasm32"))]
    eprintln!("[info] {msg}");
}

/// Log a warning. Recoverable problems only (table misses, stale saves).
pub fn warn(msg: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&msg.into());
    #[cfg(not(target_arch = "wasm32"))]
    eprintln!("[warn] {msg}");
}

/// Log an error. Used for startup failures that prevent the game from running.
pub fn error(msg: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::error_1(&msg.into());
    #[cfg(not(target_arch = "wasm32"))]
    eprintln!("[error] {msg}");
}
