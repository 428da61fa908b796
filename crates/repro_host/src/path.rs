//! Virtual path canonicalization.

/// Root every relative virtual path resolves against
pub const PROJECT_ROOT: &str = "/project/";

/// Prefix of paths served from the real library directory
pub const LIB_ROOT: &str = "/libs/";

/// Canonical form of a virtual path
///
/// Resolves against [`PROJECT_ROOT`], turns backslashes into forward slashes,
/// and collapses `.` and `..` segments. Case is preserved.
#[must_use]
pub fn canonicalize(path: &str) -> String {
    let normalized = path.replace('\\', "/");
    let joined = if normalized.starts_with('/') {
        normalized
    } else {
        format!("{}{}", PROJECT_ROOT, normalized)
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    format!("/{}", segments.join("/"))
}

/// Check if a path falls under [`LIB_ROOT`]
#[must_use]
pub fn is_library_path(path: &str) -> bool {
    path.replace('\\', "/").starts_with(LIB_ROOT)
}

/// Final path segment
#[must_use]
pub fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_relative() {
        assert_eq!(canonicalize("a.ts"), "/project/a.ts");
        assert_eq!(canonicalize("./src/b.ts"), "/project/src/b.ts");
    }

    #[test]
    fn test_canonicalize_backslashes() {
        assert_eq!(canonicalize("src\\c.ts"), "/project/src/c.ts");
    }

    #[test]
    fn test_canonicalize_parent_segments() {
        assert_eq!(canonicalize("src/../a.ts"), "/project/a.ts");
        assert_eq!(canonicalize("/project/x/./y/../z.ts"), "/project/x/z.ts");
    }

    #[test]
    fn test_canonicalize_case_sensitive() {
        assert_ne!(canonicalize("A.ts"), canonicalize("a.ts"));
    }

    #[test]
    fn test_library_path() {
        assert!(is_library_path("/libs/lib.d.ts"));
        assert!(is_library_path("\\libs\\lib.d.ts"));
        assert!(!is_library_path("/project/libs/lib.d.ts"));
        assert_eq!(basename("/libs/lib.es5.d.ts"), "lib.es5.d.ts");
    }

    proptest::proptest! {
        #[test]
        fn prop_canonicalize_idempotent(path in "[a-zA-Z0-9_./\\\\]{0,40}") {
            let once = canonicalize(&path);
            let twice = canonicalize(&once);
            proptest::prop_assert_eq!(once, twice);
        }
    }
}
