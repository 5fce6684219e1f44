/*!
 * Per-language dictionary registration and lookup.
 *
 * Registration may happen while a session is already playing, for example
 * when a supplemental dictionary arrives late. A new table is always fully
 * parsed before it is published with a single pointer swap, so a reader sees
 * either the old table or the new one, never a partially filled one.
 */

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info};
use parking_lot::RwLock;

use super::{parse_dictionary, DictionaryLoadReport, WordMetadata};
use crate::errors::ConfigurationError;
use crate::language::LanguageDefinition;
use crate::language_utils;

/// Registry of language definitions and their dictionaries
pub struct DictionaryRegistry {
    languages: RwLock<HashMap<String, Arc<LanguageDefinition>>>,
}

impl DictionaryRegistry {
    /// Registry without any language
    pub fn new() -> Self {
        Self {
            languages: RwLock::new(HashMap::new()),
        }
    }

    /// Registry with the built-in English, Portuguese and Japanese definitions
    pub fn with_builtin_languages() -> Self {
        let registry = Self::new();
        for definition in LanguageDefinition::builtin() {
            registry.register_language(definition);
        }
        registry
    }

    /// Add a language definition, replacing any definition with the same tag
    ///
    /// Sessions holding the replaced definition keep using it; dictionaries
    /// registered on it are not carried over.
    pub fn register_language(&self, definition: LanguageDefinition) -> Arc<LanguageDefinition> {
        let definition = Arc::new(definition);
        let previous = self
            .languages
            .write()
            .insert(definition.tag().to_string(), Arc::clone(&definition));

        if previous.is_some() {
            info!("Replaced language definition '{}'", definition.tag());
        } else {
            debug!("Registered language definition '{}'", definition.tag());
        }
        definition
    }

    /// Language definition for a tag in any accepted spelling
    pub fn language(&self, tag: &str) -> Result<Arc<LanguageDefinition>, ConfigurationError> {
        let key = language_utils::normalize_tag(tag)?;
        self.languages
            .read()
            .get(&key)
            .cloned()
            .ok_or(ConfigurationError::UnknownLanguage(key))
    }

    /// Tags of all registered languages, sorted
    pub fn languages(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.languages.read().keys().cloned().collect();
        tags.sort();
        tags
    }

    /// Parse `raw_source` and install it as `dictionary_name` for a language
    ///
    /// A table previously registered under the same name is replaced as a
    /// whole and keeps its place in the search order.
    pub fn register_dictionary(
        &self,
        language_tag: &str,
        dictionary_name: &str,
        raw_source: &str,
    ) -> Result<DictionaryLoadReport, ConfigurationError> {
        let language = self.language(language_tag)?;

        // parse outside of any lock
        let (dictionary, skipped) = parse_dictionary(dictionary_name, language.tag(), raw_source);
        let entries = dictionary.len();
        let replaced = language.dictionaries().install(dictionary);

        info!(
            "{} dictionary '{}' for '{}': {} entries, {} skipped",
            if replaced { "Replaced" } else { "Registered" },
            dictionary_name,
            language.tag(),
            entries,
            skipped
        );

        Ok(DictionaryLoadReport {
            dictionary: dictionary_name.to_string(),
            language: language.tag().to_string(),
            entries,
            skipped,
            replaced,
        })
    }

    /// Metadata for `parent_key`, first registered dictionary wins
    pub fn lookup(&self, language_tag: &str, parent_key: &str) -> Result<Option<WordMetadata>, ConfigurationError> {
        let language = self.language(language_tag)?;
        Ok(language.dictionaries().lookup(parent_key))
    }
}

impl Default for DictionaryRegistry {
    fn default() -> Self {
        Self::with_builtin_languages()
    }
}
