//! Prefix handling
//!
//! Keys in a bucket are flat strings; "/" is the only folder boundary.
//! These helpers turn prefixes into display names and breadcrumb trails.

use crate::error::{Error, Result};

/// Delimiter used for every listing
pub const DELIMITER: &str = "/";

/// Label of the first breadcrumb, which always points at the root prefix
pub const HOME_CRUMB: &str = "home";

/// Normalize a configured root folder into a root prefix
///
/// Leading slashes are dropped and a trailing slash is added, so `"docs"`,
/// `"/docs"` and `"docs/"` all become `"docs/"`. An empty or all-slash value
/// means root access and yields the empty prefix.
pub fn normalize_root(root_folder: Option<&str>) -> String {
    let trimmed = root_folder.unwrap_or_default().trim().trim_start_matches('/');
    if trimmed.trim_end_matches('/').is_empty() {
        return String::new();
    }
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    }
}

/// Turn a user-typed folder path into a full prefix under `base`
///
/// `"img"` under `"docs/"` becomes `"docs/img/"`. An empty path returns `base`.
pub fn child_prefix(base: &str, path: &str) -> Result<String> {
    let path = path.trim_matches('/');
    if path.is_empty() {
        return Ok(base.to_string());
    }
    if path.split('/').any(|segment| segment.is_empty()) {
        return Err(Error::InvalidPath(format!(
            "'{path}' contains an empty path segment"
        )));
    }
    Ok(format!("{base}{path}/"))
}

/// Strip `base` from `key`, returning the key unchanged when it does not start with it
pub fn relative_to<'a>(key: &'a str, base: &str) -> &'a str {
    key.strip_prefix(base).unwrap_or(key)
}

/// Breadcrumb labels for `current` relative to `root`
///
/// The first label is always [`HOME_CRUMB`]; the rest are the folder segments
/// between `root` and `current`.
pub fn breadcrumb_parts(root: &str, current: &str) -> Vec<String> {
    let mut parts = vec![HOME_CRUMB.to_string()];
    parts.extend(
        relative_to(current, root)
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string),
    );
    parts
}

/// Full prefix addressed by breadcrumb `index`
///
/// Breadcrumb 0 is `root`; breadcrumb `i` is `root` followed by the first `i`
/// folder segments.
pub fn breadcrumb_prefix(root: &str, parts: &[String], index: usize) -> Result<String> {
    if index >= parts.len() {
        return Err(Error::InvalidPath(format!(
            "breadcrumb {index} out of range (0..{})",
            parts.len()
        )));
    }
    if index == 0 {
        return Ok(root.to_string());
    }
    Ok(format!("{root}{}/", parts[1..=index].join("/")))
}
