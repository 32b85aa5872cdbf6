//! Session username inference from a host-provided location.
//!
//! Hosts that know where they are running from (a working directory, a
//! document path, a URL path) can derive the OS username from it and pass
//! it to the redactor explicitly instead of relying on per-text inference.

use once_cell::sync::Lazy;
use regex::Regex;

static WINDOWS_HOME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[Cc]:\\[Uu]sers\\([^\\/]+)").expect("Invalid regex pattern"));

static UNIX_HOME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/(?:Users|home)/([^\\/]+)").expect("Invalid regex pattern"));

/// Infer the session username from a location string.
///
/// Windows `C:\Users\<name>` is checked before `/Users/<name>` and
/// `/home/<name>`. Returns `None` when no home directory is present.
#[must_use]
pub fn username_from_location(location: &str) -> Option<String> {
    [&*WINDOWS_HOME, &*UNIX_HOME]
        .into_iter()
        .find_map(|re| re.captures(location))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_location() {
        assert_eq!(
            username_from_location(r"C:\Users\Grace\Projects\app"),
            Some("Grace".to_string())
        );
        assert_eq!(
            username_from_location(r"c:\users\grace"),
            Some("grace".to_string())
        );
    }

    #[test]
    fn test_windows_forward_slash_falls_back_to_unix_style() {
        assert_eq!(
            username_from_location("C:/Users/grace/app"),
            Some("grace".to_string())
        );
    }

    #[test]
    fn test_unix_locations() {
        assert_eq!(
            username_from_location("/Users/heidi/Library"),
            Some("heidi".to_string())
        );
        assert_eq!(
            username_from_location("/home/ivan/src"),
            Some("ivan".to_string())
        );
    }

    #[test]
    fn test_windows_takes_precedence() {
        assert_eq!(
            username_from_location(r"/home/ivan and C:\Users\judy\x"),
            Some("judy".to_string())
        );
    }

    #[test]
    fn test_no_home_directory() {
        assert_eq!(username_from_location(""), None);
        assert_eq!(username_from_location("/opt/tools/bin"), None);
        assert_eq!(username_from_location("/home/"), None);
    }
}
