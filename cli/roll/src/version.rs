//! Build version information.
//!
//! Commit, build date and compiler are injected at build time through the
//! `AWS_ROLL_COMMIT`, `AWS_ROLL_BUILD_DATE` and `AWS_ROLL_RUSTC` environment
//! variables and fall back to `unknown`.

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const COMMIT: &str = or_unknown(option_env!("AWS_ROLL_COMMIT"));

pub const BUILD_DATE: &str = or_unknown(option_env!("AWS_ROLL_BUILD_DATE"));

pub const RUSTC: &str = or_unknown(option_env!("AWS_ROLL_RUSTC"));

const fn or_unknown(value: Option<&'static str>) -> &'static str {
    match value {
        Some(value) => value,
        None => "unknown",
    }
}

/// `<version>-<commit>`.
pub fn short() -> String {
    render_short(VERSION, COMMIT)
}

/// Multi-line version block printed by `--version`.
pub fn detailed() -> String {
    render_detailed(VERSION, COMMIT, BUILD_DATE, RUSTC)
}

fn render_short(version: &str, commit: &str) -> String {
    format!("{version}-{commit}")
}

fn render_detailed(version: &str, commit: &str, build_date: &str, rustc: &str) -> String {
    format!("aws-roll {version}\nCommit:\t\t{commit}\nBuild date:\t{build_date}\nRust:\t\t{rustc}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short() {
        assert_eq!(render_short("1.2.3", "abc123"), "1.2.3-abc123");
        assert!(short().starts_with(VERSION));
    }

    #[test]
    fn test_detailed() {
        let rendered = render_detailed("1.2.3", "testing", "today", "rustc 1.85.0");
        assert_eq!(
            rendered,
            "aws-roll 1.2.3\nCommit:\t\ttesting\nBuild date:\ttoday\nRust:\t\trustc 1.85.0"
        );
    }

    #[test]
    fn test_or_unknown() {
        assert_eq!(or_unknown(None), "unknown");
        assert_eq!(or_unknown(Some("abc")), "abc");
    }
}
