//! Path handling for /attach

use std::path::PathBuf;

/// Expand a leading `~` to the home directory
pub fn resolve_path(input: &str) -> PathBuf {
    let input = input.trim().trim_matches('"');
    if let Some(rest) = input.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_and_quoted() {
        assert_eq!(resolve_path("a/b.txt"), PathBuf::from("a/b.txt"));
        assert_eq!(resolve_path("\"my file.png\""), PathBuf::from("my file.png"));
    }

    #[test]
    fn test_home_expansion() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(resolve_path("~/x.md"), home.join("x.md"));
        }
    }
}
