use std::sync::LazyLock;

use itertools::Itertools;
use regex_lite::Regex;
use rustc_hash::FxHashSet;

static GIBBERISH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z0-9+/=]{100,}\b").expect("Invalid gibberish pattern"));
static EXCESS_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("Invalid newline pattern"));

const MIN_LINE_LENGTH: usize = 5;

fn starts_with_list_marker(line: &str) -> bool {
    if line.starts_with('*') || line.starts_with('-') {
        return true;
    }
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    digits > 0 && line[digits..].starts_with('.')
}

fn is_repetitive(line: &str) -> bool {
    line.chars().count() > 10 && line.chars().collect::<FxHashSet<_>>().len() < 3
}

/// Drops noisy lines from converted Markdown.
///
/// Fenced code blocks are exempt from the gibberish and short-line filters.
pub fn clean_markdown(markdown: &str) -> String {
    let mut in_code_block = false;

    let kept = markdown
        .split('\n')
        .filter(|line| {
            let stripped = line.trim();
            if stripped.starts_with("```") {
                in_code_block = !in_code_block;
                return true;
            }

            if !in_code_block {
                if GIBBERISH.is_match(line) {
                    return false;
                }
                if !stripped.is_empty()
                    && stripped.chars().count() < MIN_LINE_LENGTH
                    && !starts_with_list_marker(stripped)
                {
                    return false;
                }
            }

            !is_repetitive(stripped)
        })
        .join("\n");

    EXCESS_NEWLINES
        .replace_all(&kept, "\n\n")
        .trim()
        .to_string()
}
