/*!
 * Dictionary source parsing.
 *
 * Two layouts are accepted:
 *
 * - a JSON array of records
 *   `{"parent": "夢", "words": ["yume"], "type": "noun", "time": null, "representable": true}`
 * - a tab-separated table, one record per line:
 *   `parent<TAB>type<TAB>time<TAB>representable[<TAB>variant,variant]`
 *   where empty fields mean "absent" and `#` starts a comment line
 *
 * Malformed records are skipped with a warning and counted.
 */

use log::warn;
use serde::Deserialize;
use serde_json::Value;

use super::{Dictionary, WordMetadata};
use crate::errors::DictionaryError;

#[derive(Debug, Deserialize)]
struct DictionaryRecord {
    parent: String,

    #[serde(default)]
    words: Vec<String>,

    #[serde(rename = "type", default)]
    word_type: Option<String>,

    #[serde(default)]
    time: Option<String>,

    #[serde(default)]
    representable: bool,
}

/// Parse a raw dictionary source
///
/// Returns the dictionary and the number of skipped records.
pub fn parse_dictionary(name: &str, language_tag: &str, raw: &str) -> (Dictionary, usize) {
    let mut dictionary = Dictionary::new(name, language_tag);
    let trimmed = raw.trim_start();

    let skipped = if trimmed.starts_with('[') || trimmed.starts_with('{') {
        parse_json_records(&mut dictionary, raw)
    } else {
        parse_table(&mut dictionary, raw)
    };

    (dictionary, skipped)
}

fn skip(dictionary: &Dictionary, record: usize, reason: impl Into<String>) {
    let error = DictionaryError::MalformedRecord {
        dictionary: dictionary.name().to_string(),
        record,
        reason: reason.into(),
    };
    warn!("{}", error);
}

fn non_empty(field: &str) -> Option<String> {
    let field = field.trim();
    if field.is_empty() {
        None
    } else {
        Some(field.to_string())
    }
}

fn install(dictionary: &mut Dictionary, record: usize, parent: &str, metadata: WordMetadata, variants: &[String]) -> bool {
    let parent = parent.trim();
    if parent.is_empty() {
        skip(dictionary, record, "empty parent");
        return false;
    }
    if !dictionary.insert(parent, metadata, variants) {
        skip(dictionary, record, format!("duplicate parent '{}'", parent));
        return false;
    }
    true
}

fn parse_json_records(dictionary: &mut Dictionary, raw: &str) -> usize {
    let records = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(records)) => records,
        Ok(_) => {
            skip(dictionary, 1, "expected a JSON array of records");
            return 1;
        }
        Err(e) => {
            skip(dictionary, 1, format!("invalid JSON: {}", e));
            return 1;
        }
    };

    let mut skipped = 0;
    for (index, value) in records.into_iter().enumerate() {
        let record_number = index + 1;
        let record: DictionaryRecord = match serde_json::from_value(value) {
            Ok(record) => record,
            Err(e) => {
                skip(dictionary, record_number, e.to_string());
                skipped += 1;
                continue;
            }
        };

        let metadata = WordMetadata {
            word_type: record.word_type.as_deref().and_then(non_empty),
            time: record.time.as_deref().and_then(non_empty),
            representable: record.representable,
        };
        if !install(dictionary, record_number, &record.parent, metadata, &record.words) {
            skipped += 1;
        }
    }

    skipped
}

fn parse_flag(field: &str) -> Option<bool> {
    match field.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" | "" => Some(false),
        _ => None,
    }
}

fn parse_table(dictionary: &mut Dictionary, raw: &str) -> usize {
    let mut skipped = 0;

    for (index, line) in raw.lines().enumerate() {
        let line_number = index + 1;
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 4 {
            skip(dictionary, line_number, format!("expected at least 4 fields, found {}", fields.len()));
            skipped += 1;
            continue;
        }

        let Some(representable) = parse_flag(fields[3]) else {
            skip(dictionary, line_number, format!("invalid representable flag '{}'", fields[3].trim()));
            skipped += 1;
            continue;
        };

        let variants: Vec<String> = fields
            .get(4)
            .map(|list| list.split(',').filter_map(non_empty).collect())
            .unwrap_or_default();

        let metadata = WordMetadata {
            word_type: non_empty(fields[1]),
            time: non_empty(fields[2]),
            representable,
        };
        if !install(dictionary, line_number, fields[0], metadata, &variants) {
            skipped += 1;
        }
    }

    skipped
}
