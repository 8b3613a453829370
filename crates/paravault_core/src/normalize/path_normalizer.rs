//! Folder suggestion → canonical PARA path.
//!
//! # Responsibility
//! - Map free-form, possibly numbered or Korean category names onto the five
//!   canonical roots.
//! - Collapse duplicated category echoes (`02_Areas/Areas`).
//!
//! # Invariants
//! - Never fails; blank input maps to `00_Inbox`.
//! - Root rules are evaluated in `ParaRoot::ALL` order and only the first
//!   match at the start of the suggestion is rewritten.
//! - The output never contains two consecutive case-insensitively equal
//!   segments.

use crate::model::canonical_path::{CanonicalPath, ParaRoot};
use once_cell::sync::Lazy;
use regex::Regex;

/// Anchored root-detection rule.
struct RootRule {
    root: ParaRoot,
    pattern: Regex,
}

/// Unanchored keyword used when no root rule matched.
struct KeywordRule {
    root: ParaRoot,
    keyword: &'static str,
    leading: Regex,
}

static ROOT_RULES: Lazy<Vec<RootRule>> = Lazy::new(|| {
    ParaRoot::ALL
        .into_iter()
        .map(|root| RootRule {
            root,
            pattern: Regex::new(root_pattern(root)).expect("valid root rule regex"),
        })
        .collect()
});

static KEYWORD_RULES: Lazy<Vec<KeywordRule>> = Lazy::new(|| {
    [
        (ParaRoot::Projects, "project"),
        (ParaRoot::Areas, "area"),
        (ParaRoot::Resources, "resource"),
        (ParaRoot::Archives, "archive"),
    ]
    .into_iter()
    .map(|(root, keyword)| KeywordRule {
        root,
        keyword,
        leading: Regex::new(&format!("(?i)^{keyword}s?")).expect("valid keyword regex"),
    })
    .collect()
});

static NUMERIC_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+_").expect("valid numeric prefix regex"));

/// Root-detection pattern per canonical root.
///
/// Each accepts an optional `0`-padded numeric prefix with optional
/// underscore, followed by the English (singular or plural) or Korean
/// category keyword. `99_Archive` is a legacy alias for the archive root.
fn root_pattern(root: ParaRoot) -> &'static str {
    match root {
        ParaRoot::Inbox => r"(?i)^(?:0?0_?)?(?:inbox|인박스)",
        ParaRoot::Projects => r"(?i)^(?:0?1_?)?(?:projects?|프로젝트)",
        ParaRoot::Areas => r"(?i)^(?:0?2_?)?(?:areas?|영역)",
        ParaRoot::Resources => r"(?i)^(?:0?3_?)?(?:resources?|자료)",
        ParaRoot::Archives => r"(?i)^(?:(?:0?4_?)?(?:archives?|보관)|99_?archives?)",
    }
}

/// Reduces a raw classifier folder suggestion to a canonical path.
///
/// Steps:
/// 1. Blank input → `00_Inbox`.
/// 2. First matching root rule rewrites the matched prefix only.
/// 3. Otherwise, unless the input is already numbered, a category keyword
///    found anywhere promotes the whole suggestion under that root.
/// 4. Split on `/`, trim, drop empty and relative segments.
/// 5. Drop segments equal to their predecessor or echoing a root predecessor.
pub fn normalize(raw: Option<&str>) -> CanonicalPath {
    let raw = match raw.map(str::trim) {
        Some(value) if !value.is_empty() => value,
        _ => return CanonicalPath::inbox(),
    };

    let expanded = apply_root_rules(raw)
        .or_else(|| apply_keyword_fallback(raw))
        .unwrap_or_else(|| raw.to_string());

    CanonicalPath::from_segments(dedup_segments(&expanded))
}

fn apply_root_rules(raw: &str) -> Option<String> {
    ROOT_RULES.iter().find_map(|rule| {
        rule.pattern
            .find(raw)
            .map(|matched| format!("{}{}", rule.root.folder_name(), &raw[matched.end()..]))
    })
}

fn apply_keyword_fallback(raw: &str) -> Option<String> {
    if NUMERIC_PREFIX_RE.is_match(raw) {
        return None;
    }

    let lowered = raw.to_lowercase();
    let rule = KEYWORD_RULES
        .iter()
        .find(|rule| lowered.contains(rule.keyword))?;
    let target = rule.root.folder_name();

    if let Some(matched) = rule.leading.find(raw) {
        return Some(format!("{target}{}", &raw[matched.end()..]));
    }
    if raw.starts_with(target) {
        return Some(raw.to_string());
    }
    Some(format!("{target}/{}", raw.trim_start_matches('/')))
}

fn dedup_segments(path: &str) -> Vec<String> {
    let unified = path.replace('\\', "/");
    let mut kept: Vec<String> = Vec::new();

    for segment in unified.split('/') {
        let segment = segment.trim();
        if segment.is_empty() || segment == "." || segment == ".." {
            continue;
        }
        if let Some(previous) = kept.last() {
            let previous_lower = previous.to_lowercase();
            let segment_lower = segment.to_lowercase();
            if previous_lower == segment_lower {
                continue;
            }
            // `02_Areas/Areas`, `01_Projects/project`
            if ParaRoot::from_folder_name(previous).is_some()
                && previous_lower.contains(&segment_lower)
            {
                continue;
            }
        }
        kept.push(segment.to_string());
    }

    kept
}
