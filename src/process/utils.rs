use once_cell::sync::Lazy;
use regex::Regex;

static YEAR_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{2})\s*$").expect("year suffix regex should compile"));

/// Collapse whitespace runs (including `&nbsp;`) into one space and trim.
pub fn normalize_ws(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Last two digits of a cohort label, e.g. `"UG 2019-22"` → `Some("22")`.
pub fn year_suffix(cohort: &str) -> Option<&str> {
    YEAR_SUFFIX
        .captures(cohort)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Byte index where the trailing `n` characters of `s` begin, or `None` if
/// `s` has `n` characters or fewer.
pub fn tail_start(s: &str, n: usize) -> Option<usize> {
    if n == 0 {
        return Some(s.len());
    }
    let (idx, _) = s.char_indices().rev().nth(n - 1)?;
    if idx == 0 {
        None
    } else {
        Some(idx)
    }
}
