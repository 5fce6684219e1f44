/*!
 * Tests for line tokenization
 */

use std::sync::Arc;

use lyrilex::dictionary::DictionaryRegistry;
use lyrilex::language::{LanguageDefinition, RomanizationAlphabet, WordBoundaryRule};
use lyrilex::tokenizer::{Tokenizer, Word};

use crate::common;

fn tokenizer_for(registry: &DictionaryRegistry, tag: &str) -> Tokenizer {
    Tokenizer::new(registry.language(tag).unwrap())
}

fn surfaces(words: &[Word]) -> Vec<&str> {
    words.iter().map(|w| w.surface.as_str()).collect()
}

fn parents(words: &[Word]) -> Vec<&str> {
    words.iter().map(|w| w.parent.as_str()).collect()
}

fn japanese_registry() -> DictionaryRegistry {
    let registry = DictionaryRegistry::with_builtin_languages();
    registry
        .register_dictionary("ja", "kanji", common::SAMPLE_JA_DICTIONARY)
        .unwrap();
    registry
}

/// Test that inflected forms map to their dictionary parent
#[test]
fn test_tokenize_withInflectedEnglish_shouldUseParent() {
    let registry = DictionaryRegistry::with_builtin_languages();
    registry
        .register_dictionary("en", "basic", common::SAMPLE_EN_DICTIONARY)
        .unwrap();
    let tokenizer = tokenizer_for(&registry, "en");

    let words = tokenizer.tokenize("run running", true);

    assert_eq!(surfaces(&words), vec!["run", "running"]);
    assert_eq!(parents(&words), vec!["run", "run"]);
    assert!(words.iter().all(|w| w.representable));
    assert_eq!(words[1].word_type.as_deref(), Some("verb"));
}

/// Test that punctuation stays on the surface but not in the parent
#[test]
fn test_tokenize_withPunctuation_shouldKeepSurfaceVerbatim() {
    let registry = DictionaryRegistry::with_builtin_languages();
    registry
        .register_dictionary("en", "basic", common::SAMPLE_EN_DICTIONARY)
        .unwrap();
    let tokenizer = tokenizer_for(&registry, "en");

    let words = tokenizer.tokenize("Hello, world!", true);

    assert_eq!(surfaces(&words), vec!["Hello,", "world!"]);
    assert_eq!(parents(&words), vec!["hello", "world"]);
    assert_eq!(words[0].word_type.as_deref(), Some("interjection"));
    assert_eq!(words.iter().map(|w| w.surface.as_str()).collect::<Vec<_>>().join(" "), "Hello, world!");
}

/// Test that words missing from every dictionary are still returned
#[test]
fn test_tokenize_withUnknownWords_shouldReturnBareWords() {
    let registry = DictionaryRegistry::with_builtin_languages();
    let tokenizer = tokenizer_for(&registry, "pt");

    let words = tokenizer.tokenize("Eu vou amanhã", true);

    assert_eq!(surfaces(&words), vec!["Eu", "vou", "amanhã"]);
    assert_eq!(parents(&words), vec!["Eu", "vou", "amanhã"]);
    assert!(words.iter().all(|w| !w.representable && w.word_type.is_none() && w.time.is_none()));
}

/// Test that empty and whitespace-only lines give no words
#[test]
fn test_tokenize_withBlankLine_shouldReturnEmpty() {
    let registry = japanese_registry();
    for tag in ["en", "pt", "ja"] {
        let tokenizer = tokenizer_for(&registry, tag);
        assert!(tokenizer.tokenize("", true).is_empty());
        assert!(tokenizer.tokenize("   \t ", true).is_empty());
    }
}

/// Test longest-match segmentation of unspaced Japanese
#[test]
fn test_tokenize_withJapanese_shouldSegmentByLongestMatch() {
    let registry = japanese_registry();
    let tokenizer = tokenizer_for(&registry, "ja");

    let words = tokenizer.tokenize("夢を見る", true);

    assert_eq!(surfaces(&words), vec!["夢", "を", "見る"]);
    assert_eq!(words[0].word_type.as_deref(), Some("noun"));
    assert_eq!(words[1].word_type.as_deref(), Some("particle"));
    assert!(words[2].representable);
}

/// Test that inflected surface forms resolve through the forms index
#[test]
fn test_tokenize_withJapaneseVariant_shouldResolveParent() {
    let registry = japanese_registry();
    let tokenizer = tokenizer_for(&registry, "ja");

    let words = tokenizer.tokenize("夢を見た", true);

    assert_eq!(surfaces(&words), vec!["夢", "を", "見た"]);
    assert_eq!(words[2].parent, "見る");
}

/// Test that unmatched characters become single-character words
#[test]
fn test_tokenize_withoutDictionary_shouldFallBackToCharacters() {
    let registry = DictionaryRegistry::with_builtin_languages();
    let tokenizer = tokenizer_for(&registry, "ja");

    let words = tokenizer.tokenize("空へ", true);

    assert_eq!(surfaces(&words), vec!["空", "へ"]);
    assert_eq!(parents(&words), vec!["空", "へ"]);
}

/// Test romanization filtering of a transliteration following its word
#[test]
fn test_tokenize_withRomanizationAfterWord_shouldFilterIt() {
    let registry = japanese_registry();
    let tokenizer = tokenizer_for(&registry, "ja");

    let filtered = tokenizer.tokenize("夢 yume を", true);
    assert_eq!(surfaces(&filtered), vec!["夢", "を"]);

    let unfiltered = tokenizer.tokenize("夢 yume を", false);
    assert_eq!(surfaces(&unfiltered), vec!["夢", "yume", "を"]);
    assert_eq!(unfiltered[1].parent, "夢");
}

/// Test that a romanization not next to its word is kept
#[test]
fn test_tokenize_withDistantRomanization_shouldKeepIt() {
    let registry = japanese_registry();
    let tokenizer = tokenizer_for(&registry, "ja");

    let words = tokenizer.tokenize("夢を見る yume", true);

    assert_eq!(surfaces(&words), vec!["夢", "を", "見る", "yume"]);
    assert_eq!(words[3].parent, "夢");
}

/// Test that filtering never applies to languages without the flag
#[test]
fn test_tokenize_withFilterDisabledLanguage_shouldKeepEverything() {
    let registry = DictionaryRegistry::with_builtin_languages();
    registry
        .register_dictionary("en", "basic", common::SAMPLE_EN_DICTIONARY)
        .unwrap();
    let tokenizer = tokenizer_for(&registry, "en");

    let words = tokenizer.tokenize("run runs", true);

    assert_eq!(surfaces(&words), vec!["run", "runs"]);
}

/// Test script-class segmentation
#[test]
fn test_tokenize_withCharacterClassRule_shouldSplitOnScriptChanges() {
    let definition = LanguageDefinition::new("ja", "ja-JP", WordBoundaryRule::CharacterClass)
        .unwrap()
        .with_romanization(RomanizationAlphabet::Latin);
    let tokenizer = Tokenizer::new(Arc::new(definition));

    let words = tokenizer.tokenize("東京タワーへ行く! Tokyo", true);

    assert_eq!(surfaces(&words), vec!["東京", "タワー", "へ", "行", "く", "!", "Tokyo"]);
}

/// Test that a dictionary registered later is used by an existing tokenizer
#[test]
fn test_tokenize_afterLateRegistration_shouldSeeNewDictionary() {
    let registry = DictionaryRegistry::with_builtin_languages();
    let tokenizer = tokenizer_for(&registry, "ja");

    let before = tokenizer.tokenize("見る", true);
    assert_eq!(surfaces(&before), vec!["見", "る"]);

    registry
        .register_dictionary("ja", "kanji", common::SAMPLE_JA_DICTIONARY)
        .unwrap();

    let after = tokenizer.tokenize("見る", true);
    assert_eq!(surfaces(&after), vec!["見る"]);
    assert!(after[0].representable);
}

/// Test that words serialize with the `type` field name
#[test]
fn test_word_serialization_shouldUseTypeField() {
    let registry = japanese_registry();
    let tokenizer = tokenizer_for(&registry, "ja");

    let words = tokenizer.tokenize("夢", true);
    let json = serde_json::to_value(&words[0]).unwrap();

    assert_eq!(json["type"], "noun");
    assert_eq!(json["parent"], "夢");
    assert_eq!(json["representable"], true);
}
