use crate::utils::config::{PERIOD_NANOS, REPORT_SCHEMA_VERSION};

/// Shorten a name to `max_width` characters, ending in "..."
pub fn truncate_name(name: &str, max_width: usize) -> String {
    if name.chars().count() <= max_width {
        return name.to_string();
    }
    let keep = max_width.saturating_sub(3);
    let mut short: String = name.chars().take(keep).collect();
    short.push_str("...");
    short
}

/// Display version information
pub fn display_version() {
    println!("torch2pprof v{}", env!("CARGO_PKG_VERSION"));
    println!("Analysis report schema: v{}", REPORT_SCHEMA_VERSION);
    println!("Profile period: {} ns (nominal)", PERIOD_NANOS);
    println!();
    println!("Converts PyTorch profiler traces to pprof call profiles.");
}
