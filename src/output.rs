//! # Terminal Output
//!
//! Controls how the CLI decorates what it prints. Colors and emoji are used
//! only when the terminal can show them and the user has not opted out.
//!
//! Sources consulted, in order:
//! - `--color=never|always|auto`
//! - `NO_COLOR` (any value disables, see https://no-color.org/)
//! - `CLICOLOR=0` disables, `CLICOLOR_FORCE=1` forces
//! - `TERM=dumb` disables
//! - TTY detection through `console`
//!
//! ```rust,ignore
//! use distpack::output::{emoji, OutputConfig};
//!
//! let out = OutputConfig::from_env_and_flag("auto");
//! println!("{} Packaging...", emoji(&out, "📦", "[BUILD]"));
//! ```

use std::env;

/// Output decoration settings
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emoji may be printed.
    pub use_color: bool,
}

impl OutputConfig {
    /// Combine the `--color` flag with the environment.
    ///
    /// `always` and `never` win over everything else; any other value
    /// falls back to detection.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect(),
        };
        Self { use_color }
    }

    fn detect() -> bool {
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }
        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }
        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }
        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }
        console::Term::stdout().features().colors_supported()
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Pick `emoji_str` when decorations are enabled, `plain` otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// Human-readable byte count (`512B`, `1.5K`, `3.2M`).
pub fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    match size {
        s if s >= GB => format!("{:.1}G", s as f64 / GB as f64),
        s if s >= MB => format!("{:.1}M", s as f64 / MB as f64),
        s if s >= KB => format!("{:.1}K", s as f64 / KB as f64),
        s => format!("{}B", s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_flags() {
        assert!(OutputConfig::from_env_and_flag("always").use_color);
        assert!(OutputConfig::from_env_and_flag("ALWAYS").use_color);
        assert!(!OutputConfig::from_env_and_flag("never").use_color);
    }

    #[test]
    fn test_emoji_helper() {
        let colored = OutputConfig { use_color: true };
        let plain = OutputConfig { use_color: false };
        assert_eq!(emoji(&colored, "📦", "[BUILD]"), "📦");
        assert_eq!(emoji(&plain, "📦", "[BUILD]"), "[BUILD]");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0B");
        assert_eq!(format_size(1023), "1023B");
        assert_eq!(format_size(1536), "1.5K");
        assert_eq!(format_size(1048576), "1.0M");
        assert_eq!(format_size(1073741824), "1.0G");
    }
}
