// src/version.rs

//! Dotted-numeric version comparison
//!
//! Catalog versions are opaque strings. The only place they are compared is
//! when reporting that a dependency's catalog entry is older than the
//! minimum version declared on the edge. Comparison splits on `.` and `-`;
//! numeric segments compare numerically, anything else lexically, and a
//! missing trailing segment counts as `0` (so `1.0` == `1.0.0`).

use std::cmp::Ordering;

/// Compare two version strings segment by segment
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let left: Vec<&str> = split(a);
    let right: Vec<&str> = split(b);
    let len = left.len().max(right.len());

    for i in 0..len {
        let ord = compare_segment(left.get(i).copied(), right.get(i).copied());
        if ord != Ordering::Equal {
            return ord;
        }
    }

    Ordering::Equal
}

/// True if `actual` is at least `minimum`; an empty minimum is always satisfied
pub fn satisfies_minimum(actual: &str, minimum: &str) -> bool {
    minimum.trim().is_empty() || compare_versions(actual, minimum) != Ordering::Less
}

fn split(version: &str) -> Vec<&str> {
    version
        .trim()
        .split(['.', '-'])
        .filter(|s| !s.is_empty())
        .collect()
}

fn compare_segment(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => match (x.parse::<u64>(), y.parse::<u64>()) {
            (Ok(nx), Ok(ny)) => nx.cmp(&ny),
            // A release number sorts after a qualifier such as "beta"
            (Ok(_), Err(_)) => Ordering::Greater,
            (Err(_), Ok(_)) => Ordering::Less,
            (Err(_), Err(_)) => x.cmp(y),
        },
        (Some(x), None) => missing_against(x).reverse(),
        (None, Some(y)) => missing_against(y),
        (None, None) => Ordering::Equal,
    }
}

/// Ordering of an absent segment relative to `present`
fn missing_against(present: &str) -> Ordering {
    match present.parse::<u64>() {
        Ok(0) => Ordering::Equal,
        Ok(_) => Ordering::Less,
        // "1.0" is newer than "1.0-SNAPSHOT"
        Err(_) => Ordering::Greater,
    }
}
