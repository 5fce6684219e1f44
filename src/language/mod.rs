/*!
 * Language definitions.
 *
 * A definition carries everything the tokenizer needs to know about a
 * language: how words are delimited, which alphabet its romanizations are
 * written in, and the ordered set of dictionaries registered for it.
 */

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::dictionary::{Dictionary, WordMetadata};
use crate::errors::ConfigurationError;
use crate::language_utils;

/// How a language's text is split into candidate words
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordBoundaryRule {
    /// Words are separated by whitespace
    Whitespace,
    /// Maximal runs of one script class form a word
    CharacterClass,
    /// Greedy longest match over dictionary forms
    DictionaryLongestMatch,
}

impl fmt::Display for WordBoundaryRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WordBoundaryRule::Whitespace => write!(f, "whitespace"),
            WordBoundaryRule::CharacterClass => write!(f, "character-class"),
            WordBoundaryRule::DictionaryLongestMatch => write!(f, "dictionary-longest-match"),
        }
    }
}

/// Alphabet phonetic transliterations of a language are written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RomanizationAlphabet {
    /// Latin letters including accented and macron forms (Hepburn "ō")
    Latin,
}

impl RomanizationAlphabet {
    /// Whether `c` is a letter of this alphabet
    pub fn contains(&self, c: char) -> bool {
        match self {
            RomanizationAlphabet::Latin => {
                c.is_ascii_alphabetic()
                    || (c.is_alphabetic()
                        && matches!(c, '\u{00C0}'..='\u{024F}' | '\u{1E00}'..='\u{1EFF}'))
            }
        }
    }

    /// Whether `c` may appear inside a romanized word (`kon'nichiwa`, `ai-shiteru`)
    pub fn continues_word(&self, c: char) -> bool {
        self.contains(c) || c == '\'' || c == '-'
    }

    /// Whether `token` is written entirely in this alphabet
    pub fn is_romanization(&self, token: &str) -> bool {
        token.chars().any(|c| self.contains(c)) && token.chars().all(|c| self.continues_word(c))
    }
}

/// Ordered set of dictionaries owned by one language
///
/// Search order is registration order. Replacing a dictionary swaps its
/// `Arc` in place under the write lock.
#[derive(Default)]
pub struct DictionarySet {
    tables: RwLock<Vec<Arc<Dictionary>>>,
}

impl DictionarySet {
    /// Install a fully built dictionary; returns `true` if one was replaced
    pub fn install(&self, dictionary: Dictionary) -> bool {
        let dictionary = Arc::new(dictionary);
        let mut tables = self.tables.write();

        match tables.iter_mut().find(|table| table.name() == dictionary.name()) {
            Some(slot) => {
                *slot = dictionary;
                true
            }
            None => {
                tables.push(dictionary);
                false
            }
        }
    }

    /// Consistent view of the current tables
    pub fn snapshot(&self) -> DictionarySnapshot {
        DictionarySnapshot {
            tables: self.tables.read().clone(),
        }
    }

    /// First match for `parent` in registration order
    pub fn lookup(&self, parent: &str) -> Option<WordMetadata> {
        self.tables
            .read()
            .iter()
            .find_map(|table| table.get(parent))
            .cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.tables.read().iter().map(|t| t.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.tables.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.read().is_empty()
    }
}

/// Dictionaries of a language frozen for one tokenization pass
#[derive(Clone, Default)]
pub struct DictionarySnapshot {
    tables: Vec<Arc<Dictionary>>,
}

impl DictionarySnapshot {
    /// First match for `parent` in registration order
    pub fn lookup(&self, parent: &str) -> Option<&WordMetadata> {
        self.tables.iter().find_map(|table| table.get(parent))
    }

    /// Parent of an exact surface form
    pub fn parent_of(&self, form: &str) -> Option<&str> {
        self.tables.iter().find_map(|table| table.parent_of(form))
    }

    /// Parent of a form, retrying in lowercase
    pub fn resolve_form(&self, form: &str) -> Option<&str> {
        self.parent_of(form).or_else(|| {
            let lowered = form.to_lowercase();
            if lowered == form {
                None
            } else {
                self.parent_of(&lowered)
            }
        })
    }

    /// Longest registered form starting at `chars[0]`
    ///
    /// Returns the match length in characters and its parent.
    pub fn longest_form_at(&self, chars: &[char]) -> Option<(usize, &str)> {
        let longest = self.max_form_chars().min(chars.len());
        let mut candidate = String::with_capacity(longest * 4);

        for len in (1..=longest).rev() {
            candidate.clear();
            candidate.extend(&chars[..len]);
            if let Some(parent) = self.parent_of(&candidate) {
                return Some((len, parent));
            }
        }
        None
    }

    pub fn max_form_chars(&self) -> usize {
        self.tables.iter().map(|t| t.max_form_chars()).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Rules and lexical knowledge for one language
pub struct LanguageDefinition {
    tag: String,
    display_locale: String,
    word_boundary_rule: WordBoundaryRule,
    romanization: Option<RomanizationAlphabet>,
    romanization_filter_enabled: bool,
    dictionaries: DictionarySet,
}

impl LanguageDefinition {
    /// New definition; the tag is normalized (`jpn` and `ja-JP` become `ja`)
    pub fn new(tag: &str, display_locale: &str, word_boundary_rule: WordBoundaryRule) -> Result<Self, ConfigurationError> {
        let tag = language_utils::normalize_tag(tag)?;
        Ok(Self::with_tag(tag, display_locale, word_boundary_rule))
    }

    fn with_tag(tag: String, display_locale: &str, word_boundary_rule: WordBoundaryRule) -> Self {
        Self {
            tag,
            display_locale: display_locale.to_string(),
            word_boundary_rule,
            romanization: None,
            romanization_filter_enabled: false,
            dictionaries: DictionarySet::default(),
        }
    }

    /// Declare the romanization alphabet and enable filtering
    pub fn with_romanization(mut self, alphabet: RomanizationAlphabet) -> Self {
        self.romanization = Some(alphabet);
        self.romanization_filter_enabled = true;
        self
    }

    /// Turn romanization filtering on or off for this language
    pub fn with_romanization_filter(mut self, enabled: bool) -> Self {
        self.romanization_filter_enabled = enabled && self.romanization.is_some();
        self
    }

    pub fn english() -> Self {
        Self::with_tag("en".to_string(), "en-US", WordBoundaryRule::Whitespace)
    }

    pub fn portuguese() -> Self {
        Self::with_tag("pt".to_string(), "pt-BR", WordBoundaryRule::Whitespace)
    }

    pub fn japanese() -> Self {
        Self::with_tag("ja".to_string(), "ja-JP", WordBoundaryRule::DictionaryLongestMatch)
            .with_romanization(RomanizationAlphabet::Latin)
    }

    /// Definitions available without any registration
    pub fn builtin() -> Vec<Self> {
        vec![Self::english(), Self::portuguese(), Self::japanese()]
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn display_locale(&self) -> &str {
        &self.display_locale
    }

    /// English name of the language, e.g. "Japanese"
    pub fn display_name(&self) -> String {
        language_utils::language_display_name(&self.tag).unwrap_or_else(|_| self.tag.clone())
    }

    pub fn word_boundary_rule(&self) -> WordBoundaryRule {
        self.word_boundary_rule
    }

    pub fn romanization(&self) -> Option<RomanizationAlphabet> {
        self.romanization
    }

    pub fn romanization_filter_enabled(&self) -> bool {
        self.romanization_filter_enabled
    }

    pub fn dictionaries(&self) -> &DictionarySet {
        &self.dictionaries
    }
}

impl fmt::Debug for LanguageDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LanguageDefinition")
            .field("tag", &self.tag)
            .field("display_locale", &self.display_locale)
            .field("word_boundary_rule", &self.word_boundary_rule)
            .field("romanization", &self.romanization)
            .field("romanization_filter_enabled", &self.romanization_filter_enabled)
            .field("dictionaries", &self.dictionaries.names())
            .finish()
    }
}
