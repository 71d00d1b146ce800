/// Formats whole seconds as a `MM:SS` countdown clock.
pub fn format_clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
