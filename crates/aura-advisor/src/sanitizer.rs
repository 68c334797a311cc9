//! Markup stripping for model output shown in plain-text UI.

use std::sync::LazyLock;

use regex::Regex;

/// Leading `#`..`######` heading markers.
static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*#{1,6}[ \t]+").expect("HEADING_RE regex should compile")
});

static BOLD_STAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("BOLD_STAR_RE regex should compile"));

static BOLD_UNDERSCORE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__(.+?)__").expect("BOLD_UNDERSCORE_RE regex should compile"));

/// `*text*` where the text does not start with whitespace, so `* item`
/// list markers and `2 * 3` survive.
static ITALIC_STAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*([^\s*][^*\n]*?)\*").expect("ITALIC_STAR_RE regex should compile")
});

/// `_text_` on word boundaries only, so `snake_case_names` survive.
static ITALIC_UNDERSCORE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b_([^_\n]+)_\b").expect("ITALIC_UNDERSCORE_RE regex should compile")
});

/// Fenced block with an optional language tag on the opening line.
static CODE_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```(?:[A-Za-z0-9_+-]*\n)?((?s).*?)```").expect("CODE_BLOCK_RE regex should compile")
});

static INLINE_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`\n]+)`").expect("INLINE_CODE_RE regex should compile"));

static LIST_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([ \t]*)[-*][ \t]+").expect("LIST_MARKER_RE regex should compile")
});

static EXTRA_NEWLINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("EXTRA_NEWLINES_RE regex should compile"));

/// Glyph that replaces `-` / `*` list markers.
pub const BULLET: &str = "•";

/// Upper bound on passes; each pass only removes markup, so real input
/// settles in two or three.
const MAX_PASSES: usize = 8;

/// Strip markdown from model output.
///
/// Applied in order: headings, bold, italic, fenced code, inline code, list
/// markers, blank-line collapse, trim. The pass repeats until the text stops
/// changing, so unwrapping one construct cannot leave another behind.
pub fn sanitize(raw: &str) -> String {
    let mut current = sanitize_pass(raw);
    for _ in 1..MAX_PASSES {
        let next = sanitize_pass(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn sanitize_pass(text: &str) -> String {
    let text = HEADING_RE.replace_all(text, "");
    // Bold before italic: `**x**` must not be read as two italics.
    let text = BOLD_STAR_RE.replace_all(&text, "$1");
    let text = BOLD_UNDERSCORE_RE.replace_all(&text, "$1");
    let text = ITALIC_STAR_RE.replace_all(&text, "$1");
    let text = ITALIC_UNDERSCORE_RE.replace_all(&text, "$1");
    let text = CODE_BLOCK_RE.replace_all(&text, "$1");
    let text = INLINE_CODE_RE.replace_all(&text, "$1");
    let text = LIST_MARKER_RE.replace_all(&text, format!("${{1}}{BULLET} ").as_str());
    let text = EXTRA_NEWLINES_RE.replace_all(&text, "\n\n");
    text.trim().to_string()
}
