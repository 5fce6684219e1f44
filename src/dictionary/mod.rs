/*!
 * Word-metadata dictionaries.
 *
 * A dictionary maps a canonical lemma (the "parent") to the metadata shown
 * next to a word: whether it has a picture, its grammatical type and its
 * tense/aspect marker. It also indexes every registered surface form of a
 * parent (inflections, romanizations) so the tokenizer can find the parent
 * of what it reads.
 *
 * - `source`: parsing of raw dictionary sources
 * - `registry`: per-language registration and lookup
 */

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use log::debug;
use serde::{Deserialize, Serialize};

pub mod registry;
pub mod source;

pub use registry::DictionaryRegistry;
pub use source::parse_dictionary;

/// Metadata attached to a parent key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordMetadata {
    /// Grammatical type, e.g. "verb"
    #[serde(rename = "type", default)]
    pub word_type: Option<String>,

    /// Tense or aspect marker, e.g. "past"
    #[serde(default)]
    pub time: Option<String>,

    /// Whether the word can be shown as a picture
    #[serde(default)]
    pub representable: bool,
}

/// One named table of word metadata for one language
#[derive(Debug, Clone)]
pub struct Dictionary {
    name: String,
    language_tag: String,
    entries: HashMap<String, WordMetadata>,
    forms: HashMap<String, String>,
    max_form_chars: usize,
}

impl Dictionary {
    pub fn new(name: &str, language_tag: &str) -> Self {
        Self {
            name: name.to_string(),
            language_tag: language_tag.to_string(),
            entries: HashMap::new(),
            forms: HashMap::new(),
            max_form_chars: 0,
        }
    }

    /// Add a parent with its metadata and surface variants
    ///
    /// Returns `false` without touching the table when the parent is already
    /// present. A variant already claimed by another parent keeps its first
    /// owner.
    pub fn insert(&mut self, parent: &str, metadata: WordMetadata, variants: &[String]) -> bool {
        match self.entries.entry(parent.to_string()) {
            Entry::Occupied(_) => return false,
            Entry::Vacant(slot) => {
                slot.insert(metadata);
            }
        }

        self.add_form(parent, parent);
        for variant in variants {
            let variant = variant.trim();
            if !variant.is_empty() {
                self.add_form(variant, parent);
            }
        }
        true
    }

    fn add_form(&mut self, form: &str, parent: &str) {
        match self.forms.entry(form.to_string()) {
            Entry::Occupied(existing) => {
                if existing.get() != parent {
                    debug!(
                        "Form '{}' in '{}' already belongs to '{}', ignoring it for '{}'",
                        form,
                        self.name,
                        existing.get(),
                        parent
                    );
                }
            }
            Entry::Vacant(slot) => {
                self.max_form_chars = self.max_form_chars.max(form.chars().count());
                slot.insert(parent.to_string());
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn language_tag(&self) -> &str {
        &self.language_tag
    }

    /// Metadata for a parent key
    pub fn get(&self, parent: &str) -> Option<&WordMetadata> {
        self.entries.get(parent)
    }

    /// Parent of a surface form
    pub fn parent_of(&self, form: &str) -> Option<&str> {
        self.forms.get(form).map(String::as_str)
    }

    /// Length in characters of the longest registered form
    pub fn max_form_chars(&self) -> usize {
        self.max_form_chars
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome of one dictionary registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryLoadReport {
    /// Name the dictionary was installed under
    pub dictionary: String,
    /// Canonical language tag
    pub language: String,
    /// Entries installed
    pub entries: usize,
    /// Records skipped as malformed or duplicate
    pub skipped: usize,
    /// Whether a previous table of the same name was replaced
    pub replaced: bool,
}
