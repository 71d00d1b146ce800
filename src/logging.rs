use env_logger::{Builder, Env, Target};
use std::fs::{self, OpenOptions};
use std::path::Path;

/// Sends log output to `path`; the terminal belongs to the game screen.
/// Level comes from `RUST_LOG`, defaulting to `info`.
pub fn init(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    // a second init (tests, embedding) keeps the first logger
    let _ = Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_secs()
        .try_init();
    Ok(())
}
