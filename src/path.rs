//! Platform-neutral path helpers. No I/O is performed here.
//!
//! All paths are handled as strings with `/` as the canonical separator;
//! `\` is accepted on input and converted.

use once_cell::sync::Lazy;
use regex::Regex;

static DRIVE_ROOT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z]:(/|$)").unwrap());
static DRIVE_ROOTED_DIR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]:/.+$").unwrap());

/// Returns the root prefix (`/`, `C:/` or empty) and the remainder.
fn split_root(path: &str) -> (String, &str) {
    if let Some(m) = DRIVE_ROOT.find(path) {
        let drive = &path[..2];
        return (format!("{drive}/"), &path[m.end()..]);
    }
    if let Some(rest) = path.strip_prefix('/') {
        return ("/".to_string(), rest);
    }
    (String::new(), path)
}

/// Collapse `.` and `..` segments and convert separators to `/`.
///
/// Trailing separators are dropped. A relative path that collapses to
/// nothing becomes `.`; `..` never climbs above an absolute root.
pub fn normalize(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let (root, rest) = split_root(&unified);
    let mut parts: Vec<&str> = Vec::new();
    for seg in rest.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|p| *p != "..") {
                    parts.pop();
                } else if root.is_empty() {
                    parts.push("..");
                }
            }
            s => parts.push(s),
        }
    }
    let joined = parts.join("/");
    if root.is_empty() {
        if joined.is_empty() {
            ".".to_string()
        } else {
            joined
        }
    } else {
        format!("{root}{joined}")
    }
}

/// True for `/`-rooted and drive-letter rooted paths.
pub fn is_absolute(path: &str) -> bool {
    path.starts_with('/') || path.starts_with('\\') || DRIVE_ROOT.is_match(path)
}

/// Join `path` under `base` without doubling the separator.
pub fn join(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}

/// Remove `basepath` from the front of `path`.
///
/// An empty `basepath` returns `path` unchanged. A path equal to the base
/// path yields `.`.
pub fn strip_basepath(path: &str, basepath: &str) -> String {
    if basepath.is_empty() {
        return path.to_string();
    }
    let stripped = path.strip_prefix(basepath).unwrap_or(path);
    let stripped = stripped.trim_start_matches('/');
    if stripped.is_empty() {
        ".".to_string()
    } else {
        stripped.to_string()
    }
}

/// Heuristic used by [`find_common_base_path`]: the last segment carries
/// an extension-like `.` with something on both sides of it.
fn looks_like_file(path: &str) -> bool {
    let last = path.rsplit(['/', '\\']).next().unwrap_or(path);
    if last == "." || last == ".." {
        return false;
    }
    match last.rfind('.') {
        Some(idx) => idx + 1 < last.len() && path.len() > last.len() - idx,
        None => false,
    }
}

fn dirname(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let trimmed = unified.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) => "/".to_string(),
        Some(idx) => trimmed[..idx].to_string(),
        None => ".".to_string(),
    }
}

/// Longest common directory of `paths`, always ending with `/`.
///
/// Relative results are prefixed with `./`; two absolute paths that share
/// nothing but the root collapse to `/`. An empty input yields an empty
/// string.
pub fn find_common_base_path<S: AsRef<str>>(paths: &[S]) -> String {
    if paths.is_empty() {
        return String::new();
    }
    let normalized: Vec<String> = paths
        .iter()
        .map(|p| {
            let p = p.as_ref();
            let dir = if looks_like_file(p) {
                dirname(p)
            } else {
                p.to_string()
            };
            normalize(&dir.replace('\\', "/"))
        })
        .collect();

    let split: Vec<Vec<&str>> = normalized.iter().map(|p| p.split('/').collect()).collect();
    let first = &split[0];
    let mut common: Vec<&str> = Vec::new();
    for (idx, seg) in first.iter().enumerate() {
        if split[1..].iter().all(|other| other.get(idx) == Some(seg)) {
            common.push(seg);
        } else {
            break;
        }
    }

    if common.len() == 1 && common[0].is_empty() && normalized[0].starts_with('/') {
        return "/".to_string();
    }

    let mut result = common.join("/");
    if !result.ends_with('/') {
        result.push('/');
    }
    if !result.starts_with('/') && !DRIVE_ROOTED_DIR.is_match(&result) {
        result = format!("./{result}");
    }
    result
}
