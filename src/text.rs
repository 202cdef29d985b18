//! Slugs, reading time, excerpts and dates.
//!
//! DESIGN
//! ======
//! Pure functions shared by the editor and the view models. Post content is
//! HTML produced by a rich-text editor, so anything that measures or previews
//! it first strips markup.

use time::OffsetDateTime;
use time::macros::format_description;

/// Average reading speed used for the reading-time estimate.
pub const WORDS_PER_MINUTE: usize = 200;

/// Number of characters kept in a card excerpt before the ellipsis.
pub const EXCERPT_CHARS: usize = 100;

/// Derive a URL slug from a post title or a typed slug.
///
/// Trims, lower-cases and collapses every run of characters that are not
/// ASCII alphanumerics into a single `-`. Runs at either edge become edge
/// hyphens, so `"What is Rust?"` gives `"what-is-rust-"`. Applied again on
/// every keystroke in the slug field; the rule is idempotent.
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut in_run = false;
    for ch in title.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            in_run = false;
        } else if !in_run {
            slug.push('-');
            in_run = true;
        }
    }
    slug
}

/// Remove markup tags, keeping the text between them.
///
/// Tags are replaced with a space so adjacent block elements do not glue
/// words together; runs of whitespace are left for callers to collapse.
#[must_use]
pub fn strip_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

/// Count whitespace-separated words in plain text.
#[must_use]
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Minutes needed to read `html` at [`WORDS_PER_MINUTE`], rounded up, minimum one.
#[must_use]
pub fn reading_minutes(html: &str) -> usize {
    word_count(&strip_html(html)).div_ceil(WORDS_PER_MINUTE).max(1)
}

/// Reading-time label such as `"2 min read"`.
#[must_use]
pub fn reading_time(html: &str) -> String {
    format!("{} min read", reading_minutes(html))
}

/// Plain-text preview of `html` for post cards.
#[must_use]
pub fn excerpt(html: &str) -> String {
    let plain = strip_html(html).split_whitespace().collect::<Vec<_>>().join(" ");
    if plain.chars().count() > EXCERPT_CHARS {
        let cut = plain.chars().take(EXCERPT_CHARS).collect::<String>();
        format!("{cut}...")
    } else {
        plain
    }
}

/// Long-form date such as `"January 5, 2024"`.
#[must_use]
pub fn format_date(at: OffsetDateTime) -> String {
    let format = format_description!("[month repr:long] [day padding:none], [year]");
    at.format(&format).unwrap_or_default()
}

#[cfg(test)]
#[path = "text_test.rs"]
mod tests;
