// @module: Romanization filtering

use log::debug;

use super::Word;
use crate::language::RomanizationAlphabet;

/// Remove duplicate transliterations
///
/// A word written entirely in `alphabet` is dropped when the word right
/// before it in the unfiltered sequence has the same parent. Everything else
/// keeps its order.
pub fn filter_romanizations(words: Vec<Word>, alphabet: RomanizationAlphabet) -> Vec<Word> {
    let duplicates: Vec<bool> = words
        .iter()
        .enumerate()
        .map(|(i, word)| {
            i > 0 && words[i - 1].parent == word.parent && alphabet.is_romanization(&word.surface)
        })
        .collect();

    words
        .into_iter()
        .zip(duplicates)
        .filter_map(|(word, duplicate)| {
            if duplicate {
                debug!("Filtered romanization '{}' of '{}'", word.surface, word.parent);
                None
            } else {
                Some(word)
            }
        })
        .collect()
}
