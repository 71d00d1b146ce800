// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod classifier;
pub mod config;
pub mod logging;
pub mod matching;
pub mod picker;
pub mod runtime;
pub mod session;
pub mod util;
pub mod words;
