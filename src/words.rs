use crate::error::{Error, Result};
use crate::layout::WeightedWord;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{L}\p{N}][\p{L}\p{N}'\-]*").unwrap());

/// Parse a flat JSON object of word -> count. Zero counts are dropped.
pub fn parse_word_counts(json: &str) -> Result<Vec<WeightedWord>> {
    let counts: BTreeMap<String, u32> = serde_json::from_str(json)?;
    Ok(counts
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(text, count)| WeightedWord::new(text, count))
        .collect())
}

/// Count word occurrences in free text, case-insensitively. Words are runs
/// of letters, digits, apostrophes and hyphens; tokens shorter than
/// `min_len` characters are ignored.
pub fn count_words(text: &str, min_len: usize) -> Vec<WeightedWord> {
    let mut counts: HashMap<String, u32> = HashMap::new();
    let mut order: Vec<String> = Vec::new();
    for token in WORD_RE.find_iter(text) {
        let word = token.as_str().trim_end_matches(['\'', '-']).to_lowercase();
        if word.chars().count() < min_len {
            continue;
        }
        let count = counts.entry(word.clone()).or_insert(0);
        if *count == 0 {
            order.push(word);
        }
        *count += 1;
    }
    order
        .into_iter()
        .map(|word| {
            let count = counts.get(&word).copied().unwrap_or(0);
            WeightedWord::new(word, count)
        })
        .collect()
}

/// Load a word list: `.json` files hold counts, anything else is counted as
/// plain text.
pub fn load_words(path: &Path) -> Result<Vec<WeightedWord>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| Error::Words(format!("{}: {e}", path.display())))?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if is_json {
        parse_word_counts(&contents)
    } else {
        Ok(count_words(&contents, 1))
    }
}
