//! Logical path helpers
//!
//! Logical paths use `/` separators, have no leading or trailing separator and
//! never contain `.` or `..` components once normalized. The root is `""`.

use unicode_normalization::UnicodeNormalization;

/// Normalize a caller-supplied path.
///
/// `\` becomes `/`, empty and `.` components are dropped and `..` removes the
/// previous component (never climbing above the root). Case is preserved.
pub fn normalize(path: &str) -> String {
    let mut components: Vec<&str> = Vec::new();

    for component in path.split(['/', '\\']) {
        match component {
            "" | "." => {}
            ".." => {
                components.pop();
            }
            other => components.push(other),
        }
    }

    components.join("/")
}

/// Split a normalized path into `(directory, basename)`
pub fn split_dir(path: &str) -> (&str, &str) {
    path.rsplit_once('/').unwrap_or(("", path))
}

/// Join a directory and a name ("" is the root)
pub fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}

/// Extension of a file name, without the dot
pub fn find_ext(name: &str) -> Option<&str> {
    name.rsplit_once('.').map(|(_, ext)| ext)
}

/// Case-folded key used by the path cache: NFC composed, ASCII lower-cased
pub fn fold_case(path: &str) -> String {
    let mut folded: String = path.nfc().collect();
    folded.make_ascii_lowercase();
    folded
}

/// Whether `candidate` names the file requested as `wanted`: either exactly, or
/// `wanted` followed by an extension.
pub fn matches_basename(candidate: &str, wanted: &str) -> bool {
    candidate
        .strip_prefix(wanted)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
}
