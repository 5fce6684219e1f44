/*!
 * Segmentation of a line into surface tokens with their parent keys.
 */

use crate::language::{DictionarySnapshot, RomanizationAlphabet};

/// A surface token and the key it is looked up under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub surface: String,
    pub parent: String,
}

impl Segment {
    fn new(surface: String, parent: String) -> Self {
        Self { surface, parent }
    }

    /// Segment whose parent is the registered owner of the surface, or itself
    fn resolved(surface: String, dictionaries: &DictionarySnapshot) -> Self {
        let parent = dictionaries
            .resolve_form(&surface)
            .map(str::to_string)
            .unwrap_or_else(|| surface.clone());
        Self::new(surface, parent)
    }
}

/// Script class used by character-class segmentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptClass {
    Han,
    Hiragana,
    Katakana,
    Romanized,
    Digit,
    Other,
}

impl ScriptClass {
    pub fn of(c: char, alphabet: Option<RomanizationAlphabet>) -> Self {
        match c {
            '\u{3040}'..='\u{309F}' => ScriptClass::Hiragana,
            '\u{30A0}'..='\u{30FF}' | '\u{31F0}'..='\u{31FF}' | '\u{FF66}'..='\u{FF9F}' => ScriptClass::Katakana,
            '\u{4E00}'..='\u{9FFF}' | '\u{3400}'..='\u{4DBF}' | '\u{F900}'..='\u{FAFF}' | '\u{3005}' => ScriptClass::Han,
            _ if c.is_numeric() => ScriptClass::Digit,
            _ if alphabet.is_some_and(|a| a.continues_word(c)) => ScriptClass::Romanized,
            _ if alphabet.is_none() && c.is_alphabetic() => ScriptClass::Romanized,
            _ => ScriptClass::Other,
        }
    }
}

/// Split on whitespace; surfaces are kept verbatim
///
/// The parent is the piece without surrounding punctuation, mapped through
/// the registered forms when one matches.
pub fn by_whitespace(line: &str, dictionaries: &DictionarySnapshot) -> Vec<Segment> {
    line.split_whitespace()
        .map(|piece| {
            let core = piece.trim_matches(|c: char| !c.is_alphanumeric());
            let key = if core.is_empty() { piece } else { core };
            let parent = dictionaries
                .resolve_form(key)
                .map(str::to_string)
                .unwrap_or_else(|| key.to_string());
            Segment::new(piece.to_string(), parent)
        })
        .collect()
}

/// Greedy longest match over the registered forms
///
/// Whitespace only separates. A run of romanization letters is kept whole.
/// A character with no match becomes a token of its own.
pub fn by_longest_match(
    line: &str,
    dictionaries: &DictionarySnapshot,
    alphabet: Option<RomanizationAlphabet>,
) -> Vec<Segment> {
    let chars: Vec<char> = line.chars().collect();
    let mut segments = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let c = chars[pos];
        if c.is_whitespace() {
            pos += 1;
            continue;
        }

        if let Some(alphabet) = alphabet.filter(|a| a.contains(c)) {
            let end = run_end(&chars, pos, |c| alphabet.continues_word(c));
            let surface: String = chars[pos..end].iter().collect();
            segments.push(Segment::resolved(surface, dictionaries));
            pos = end;
            continue;
        }

        match dictionaries.longest_form_at(&chars[pos..]) {
            Some((len, parent)) => {
                let surface: String = chars[pos..pos + len].iter().collect();
                segments.push(Segment::new(surface, parent.to_string()));
                pos += len;
            }
            None => {
                segments.push(Segment::new(c.to_string(), c.to_string()));
                pos += 1;
            }
        }
    }

    segments
}

/// Maximal runs of one script class; punctuation stands alone
pub fn by_character_class(
    line: &str,
    dictionaries: &DictionarySnapshot,
    alphabet: Option<RomanizationAlphabet>,
) -> Vec<Segment> {
    let chars: Vec<char> = line.chars().collect();
    let mut segments = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let c = chars[pos];
        if c.is_whitespace() {
            pos += 1;
            continue;
        }

        let class = ScriptClass::of(c, alphabet);
        let end = if class == ScriptClass::Other {
            pos + 1
        } else {
            run_end(&chars, pos, |next| !next.is_whitespace() && ScriptClass::of(next, alphabet) == class)
        };

        let surface: String = chars[pos..end].iter().collect();
        segments.push(Segment::resolved(surface, dictionaries));
        pos = end;
    }

    segments
}

fn run_end(chars: &[char], start: usize, continues: impl Fn(char) -> bool) -> usize {
    chars[start..]
        .iter()
        .position(|c| !continues(*c))
        .map_or(chars.len(), |offset| start + offset)
}
