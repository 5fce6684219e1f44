use isolang::Language;

use crate::errors::ConfigurationError;

/// Language tag utilities
///
/// Lyrics and dictionaries arrive tagged with whatever the upstream service
/// used (`ja`, `jpn`, `ja-JP`, `JA`...). Everything inside the engine is keyed
/// by one canonical form: ISO 639-1 when the language has one, ISO 639-2/T
/// otherwise.
/// Kind of ISO code a tag was written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageCodeType {
    /// ISO 639-1 (2-letter) code
    Part1,
    /// ISO 639-2/T (3-letter) code
    Part2T,
    /// ISO 639-2/B (3-letter) code
    Part2B,
}

/// ISO 639-2/B codes that differ from their 639-2/T counterpart
fn part2b_to_part2t(code: &str) -> Option<&'static str> {
    match code {
        "fre" => Some("fra"),
        "ger" => Some("deu"),
        "dut" => Some("nld"),
        "gre" => Some("ell"),
        "chi" => Some("zho"),
        "cze" => Some("ces"),
        "ice" => Some("isl"),
        "alb" => Some("sqi"),
        "arm" => Some("hye"),
        "baq" => Some("eus"),
        "bur" => Some("mya"),
        "per" => Some("fas"),
        "geo" => Some("kat"),
        "may" => Some("msa"),
        "mac" => Some("mkd"),
        "rum" => Some("ron"),
        "slo" => Some("slk"),
        "wel" => Some("cym"),
        _ => None,
    }
}

/// Drop a region or script subtag (`ja-JP`, `pt_BR`, `zh-Hant`) and lowercase
fn primary_subtag(tag: &str) -> String {
    tag.trim()
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

fn resolve(tag: &str) -> Option<Language> {
    let code = primary_subtag(tag);
    match code.len() {
        2 => Language::from_639_1(&code),
        3 => {
            let part2t = part2b_to_part2t(&code).unwrap_or(&code);
            Language::from_639_3(part2t)
        }
        _ => None,
    }
}

/// Classify a language code
pub fn validate_language_code(tag: &str) -> Result<LanguageCodeType, ConfigurationError> {
    let code = primary_subtag(tag);

    if code.len() == 2 && Language::from_639_1(&code).is_some() {
        return Ok(LanguageCodeType::Part1);
    }
    if code.len() == 3 {
        if Language::from_639_3(&code).is_some() {
            return Ok(LanguageCodeType::Part2T);
        }
        if part2b_to_part2t(&code).is_some() {
            return Ok(LanguageCodeType::Part2B);
        }
    }

    Err(ConfigurationError::InvalidLanguageTag(tag.to_string()))
}

/// Normalize a tag to the canonical key used by the registry
///
/// `jpn`, `JA` and `ja-JP` all become `ja`; a language without a 2-letter
/// code keeps its ISO 639-2/T code.
pub fn normalize_tag(tag: &str) -> Result<String, ConfigurationError> {
    let lang = resolve(tag).ok_or_else(|| ConfigurationError::InvalidLanguageTag(tag.to_string()))?;

    Ok(match lang.to_639_1() {
        Some(part1) => part1.to_string(),
        None => lang.to_639_3().to_string(),
    })
}

/// Check if two language tags represent the same language
pub fn language_codes_match(tag1: &str, tag2: &str) -> bool {
    match (resolve(tag1), resolve(tag2)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Display name of a language, capitalized the way the language picker shows it
///
/// `ja` gives `Japanese`, `pt` gives `Portuguese`.
pub fn language_display_name(tag: &str) -> Result<String, ConfigurationError> {
    let lang = resolve(tag).ok_or_else(|| ConfigurationError::InvalidLanguageTag(tag.to_string()))?;
    Ok(capitalize(lang.to_name()))
}

/// Uppercase the first character and lowercase the rest
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
