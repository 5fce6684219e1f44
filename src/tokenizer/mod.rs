/*!
 * Tokenization of lyric lines into dictionary-annotated words.
 *
 * - `segment`: the word-boundary strategies
 * - `romanization`: duplicate transliteration filtering
 */

use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::language::{LanguageDefinition, WordBoundaryRule};

pub mod romanization;
pub mod segment;

pub use romanization::filter_romanizations;
pub use segment::Segment;

/// One word of a lyric line, ready for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    /// Text as it appears in the line
    pub surface: String,

    /// Canonical dictionary key
    pub parent: String,

    /// Whether the word can be shown as a picture
    pub representable: bool,

    /// Grammatical type
    #[serde(rename = "type")]
    pub word_type: Option<String>,

    /// Tense or aspect marker
    pub time: Option<String>,
}

/// Splits lines of one language into annotated words
#[derive(Debug, Clone)]
pub struct Tokenizer {
    language: Arc<LanguageDefinition>,
}

impl Tokenizer {
    pub fn new(language: Arc<LanguageDefinition>) -> Self {
        Self { language }
    }

    pub fn language(&self) -> &Arc<LanguageDefinition> {
        &self.language
    }

    /// Tokenize one line in reading order
    ///
    /// `filter_romanizations` is the user preference; it only takes effect
    /// for languages that declare a romanization alphabet with filtering on.
    pub fn tokenize(&self, line: &str, filter_romanizations: bool) -> Vec<Word> {
        if line.trim().is_empty() {
            return Vec::new();
        }

        // one view of the tables for the whole line, even if a dictionary is swapped meanwhile
        let dictionaries = self.language.dictionaries().snapshot();
        let alphabet = self.language.romanization();

        let segments = match self.language.word_boundary_rule() {
            WordBoundaryRule::Whitespace => segment::by_whitespace(line, &dictionaries),
            WordBoundaryRule::DictionaryLongestMatch => segment::by_longest_match(line, &dictionaries, alphabet),
            WordBoundaryRule::CharacterClass => segment::by_character_class(line, &dictionaries, alphabet),
        };

        let words: Vec<Word> = segments
            .into_iter()
            .map(|segment| {
                let metadata = dictionaries.lookup(&segment.parent);
                Word {
                    representable: metadata.is_some_and(|m| m.representable),
                    word_type: metadata.and_then(|m| m.word_type.clone()),
                    time: metadata.and_then(|m| m.time.clone()),
                    surface: segment.surface,
                    parent: segment.parent,
                }
            })
            .collect();

        match alphabet {
            Some(alphabet) if filter_romanizations && self.language.romanization_filter_enabled() => {
                let before = words.len();
                let filtered = romanization::filter_romanizations(words, alphabet);
                if filtered.len() != before {
                    debug!("Removed {} romanized duplicates", before - filtered.len());
                }
                filtered
            }
            _ => words,
        }
    }
}
