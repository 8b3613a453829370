//! Markdown body rewrites applied before a note lands in the vault.
//!
//! # Responsibility
//! - Escape inline `#tags` that are not on the trusted allow-list.
//! - Rebase `Files/` image links to the note's folder depth.
//! - Prepend the classifier frontmatter.
//!
//! # Invariants
//! - Heading lines are never rewritten.
//! - Escaping is idempotent: a `#` preceded by `\` is already escaped.
//! - Rebasing with depth `0` returns the input unchanged.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::BTreeSet;

/// Tags kept as real tags when no other allow-list is configured.
pub const DEFAULT_TRUSTED_TAGS: &[&str] = &[
    "raw",
    "code",
    "distilled",
    "final",
    "vp",
    "family",
    "reference",
    "checklist",
    "it",
    "distill",
    "unreal",
    "disguise",
];

static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#{1,6}\s").expect("valid heading regex"));
static INLINE_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"#([A-Za-z0-9_\x{AC00}-\x{D7A3}]+)").expect("valid inline tag regex")
});
static ASSET_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[(.*?)\]\(Files/(.*?)\)").expect("valid asset link regex"));

/// Stateless body rewriter configured with a trusted tag set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentTransformer {
    trusted_tags: BTreeSet<String>,
}

impl Default for ContentTransformer {
    fn default() -> Self {
        Self::new(DEFAULT_TRUSTED_TAGS.iter().copied())
    }
}

impl ContentTransformer {
    /// Creates a transformer; tag names are matched case-insensitively.
    pub fn new<I, S>(trusted_tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            trusted_tags: trusted_tags
                .into_iter()
                .map(|tag| tag.as_ref().trim().to_lowercase())
                .filter(|tag| !tag.is_empty())
                .collect(),
        }
    }

    /// Produces the final vault content for a note.
    ///
    /// `depth` is the separator count of the note's canonical folder.
    pub fn transform(&self, content: &str, frontmatter: &str, depth: usize) -> String {
        let escaped = self.escape_untrusted_tags(content);
        let rebased = rebase_asset_links(&escaped, depth);
        format!("{frontmatter}\n\n{rebased}")
    }

    /// Backslash-escapes inline tags whose name is not trusted.
    pub fn escape_untrusted_tags(&self, content: &str) -> String {
        content
            .split('\n')
            .map(|line| {
                if HEADING_RE.is_match(line) {
                    line.to_string()
                } else {
                    self.escape_line(line)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn escape_line(&self, line: &str) -> String {
        let mut out = String::with_capacity(line.len() + 4);
        let mut last = 0;

        for caps in INLINE_TAG_RE.captures_iter(line) {
            let (Some(whole), Some(body)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if !starts_tag(&line[..whole.start()]) {
                continue;
            }
            if self.trusted_tags.contains(&body.as_str().to_lowercase()) {
                continue;
            }
            out.push_str(&line[last..whole.start()]);
            out.push('\\');
            out.push_str(whole.as_str());
            last = whole.end();
        }

        out.push_str(&line[last..]);
        out
    }
}

/// A `#` starts a tag only after a non-word, non-escape character.
fn starts_tag(before: &str) -> bool {
    match before.chars().next_back() {
        None => true,
        Some(c) => c != '\\' && c != '_' && !c.is_alphanumeric(),
    }
}

/// Prefixes every `![caption](Files/...)` target with `depth` x `../`.
pub fn rebase_asset_links(content: &str, depth: usize) -> String {
    if depth == 0 {
        return content.to_string();
    }
    let prefix = "../".repeat(depth);
    ASSET_LINK_RE
        .replace_all(content, |caps: &Captures<'_>| {
            format!("![{}]({prefix}Files/{})", &caps[1], &caps[2])
        })
        .into_owned()
}
