//! Wallpaper id extraction from playlist item paths.

use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::expect_used)]
static WORKSHOP_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"431960[/\\]([0-9]+)[/\\]").expect("workshop id pattern is valid"));

/// Returns the workshop ids referenced by `items`, in order.
///
/// Items outside the Wallpaper Engine workshop directory are skipped.
#[must_use]
pub fn extract_wallpaper_ids<S: AsRef<str>>(items: &[S]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| WORKSHOP_ID.captures(item.as_ref()))
        .filter_map(|captures| captures.get(1))
        .map(|id| id.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unix_path() {
        assert_eq!(
            extract_wallpaper_ids(&["/home/u/.steam/steamapps/workshop/content/431960/123456/project.json"]),
            vec!["123456"]
        );
    }

    #[test]
    fn test_windows_path() {
        assert_eq!(extract_wallpaper_ids(&[r"C:\steam\431960\987\scene.pkg"]), vec!["987"]);
    }

    #[test]
    fn test_non_workshop_paths_are_skipped() {
        assert!(extract_wallpaper_ids(&["/random/path"]).is_empty());
        assert!(extract_wallpaper_ids(&["/content/431960/123"]).is_empty());
    }

    #[test]
    fn test_order_is_kept() {
        let items = ["x/431960/2/a", "nothing", "x/431960/1/b"];
        assert_eq!(extract_wallpaper_ids(&items), vec!["2", "1"]);
    }
}
