use std::sync::LazyLock;

use regex::Regex;

static NON_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("valid regex"));
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static DASH_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").expect("valid regex"));

/// Fallback stem for keywords that sanitize to nothing.
const EMPTY_STEM: &str = "place";

/// Turn a search keyword into a filesystem-safe file stem.
///
/// Transliterates to ASCII, lowercases, drops anything that is not a word
/// character, whitespace or `-`, then joins words with single dashes. The
/// result is always ASCII, and applying it twice gives the same result as
/// applying it once.
#[must_use]
pub fn sanitize_keyword(keyword: &str) -> String {
    let folded = deunicode::deunicode(keyword).to_lowercase();
    let stripped = NON_WORD_RE.replace_all(&folded, "");
    let dashed = WHITESPACE_RE.replace_all(stripped.trim(), "-");
    let collapsed = DASH_RUN_RE.replace_all(&dashed, "-").into_owned();
    if collapsed.is_empty() {
        EMPTY_STEM.to_string()
    } else {
        collapsed
    }
}
