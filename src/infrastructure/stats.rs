use crate::domain::document::TextStats;

/// Counts whitespace-separated words. Empty and all-whitespace text has none.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Counts characters, whitespace included.
///
/// The unit is the UTF-16 code unit, the length editors and browsers report:
/// `"é"` counts once, an astral character such as `"😀"` counts twice.
pub fn character_count(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Counts characters after dropping every whitespace character, in the same
/// unit as [`character_count`].
pub fn character_count_no_spaces(text: &str) -> usize {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .map(char::len_utf16)
        .sum()
}

pub fn text_stats(text: &str) -> TextStats {
    TextStats {
        words: word_count(text),
        characters: character_count(text),
        characters_no_spaces: character_count_no_spaces(text),
    }
}
