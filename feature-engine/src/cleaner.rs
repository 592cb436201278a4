use once_cell::sync::Lazy;
use regex::Regex;

static MARKDOWN_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(\s*(http[s]?://[^)]+)\s*\)").expect("markdown url pattern is valid")
});

static BARE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"http\S+").expect("bare url pattern is valid"));

/// Strips markdown links, bare URLs, emphasis/bracket markup and `&nbsp;`
/// from a raw comment body. Newlines become spaces; other whitespace is
/// left as-is.
pub fn clean_comment(raw_comment: &str) -> String {
    let without_markdown = MARKDOWN_URL
        .replace_all(raw_comment, " ")
        .replace('*', "")
        .replace("&nbsp;", "")
        .replace(['[', ']', '(', ')'], " ");

    BARE_URL
        .replace_all(&without_markdown, " ")
        .replace('\n', " ")
}
