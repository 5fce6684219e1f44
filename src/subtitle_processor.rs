use std::collections::HashMap;
use std::fmt;

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::SubtitleError;
use crate::timeline::{Cue, CueTimeline};

// @module: Lyric payload parsing

// @const: LRC line with one or more leading time stamps
static LRC_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^((?:\[\d+:\d+(?:[.:]\d+)?\])+)(.*)$").unwrap()
});

// @const: Single LRC time stamp
static LRC_TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[(\d+):(\d+)(?:[.:](\d+))?\]").unwrap()
});

// @const: LRC metadata tag such as [ar:Artist] or [offset:+250]
static LRC_METADATA_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[([A-Za-z#]+):([^\]]*)\]$").unwrap()
});

// @const: Inline markup inside cue text (<i>, <c.color>, <00:00:01.000>)
static INLINE_TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<[^>]*>").unwrap()
});

/// Shape of a lyric payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    /// WebVTT cue blocks
    WebVtt,
    /// SubRip cue blocks
    Srt,
    /// Line-timed LRC
    Lrc,
    /// No recognizable time codes
    PlainText,
}

impl fmt::Display for PayloadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadFormat::WebVtt => write!(f, "webvtt"),
            PayloadFormat::Srt => write!(f, "srt"),
            PayloadFormat::Lrc => write!(f, "lrc"),
            PayloadFormat::PlainText => write!(f, "plain"),
        }
    }
}

/// Result of parsing one payload
#[derive(Debug, Clone)]
pub struct ParsedLyrics {
    /// Sorted, non-overlapping cues; may be empty
    pub timeline: CueTimeline,

    /// Detected payload shape
    pub format: PayloadFormat,

    /// Entries dropped because they could not be parsed or collided
    pub skipped: usize,

    /// LRC header tags (`ar`, `ti`, `al`...), lowercase keys
    pub metadata: HashMap<String, String>,
}

impl ParsedLyrics {
    /// Whether synchronized display is possible
    pub fn is_synchronized(&self) -> bool {
        !self.timeline.is_empty()
    }
}

/// Parse a raw lyric payload into a cue timeline
///
/// Never fails: malformed entries are logged and skipped, and a payload
/// without time codes yields an empty timeline.
pub fn parse_payload(content: &str) -> ParsedLyrics {
    let content = content.strip_prefix('\u{FEFF}').unwrap_or(content);
    let format = detect_format(content);

    let (cues, mut skipped, metadata) = match format {
        PayloadFormat::WebVtt | PayloadFormat::Srt => {
            let (cues, skipped) = parse_cue_blocks(content);
            (cues, skipped, HashMap::new())
        }
        PayloadFormat::Lrc => parse_lrc(content),
        PayloadFormat::PlainText => {
            debug!("Payload has no time codes, no synchronized lyrics available");
            (Vec::new(), 0, HashMap::new())
        }
    };

    let (timeline, dropped) = CueTimeline::build(cues);
    skipped += dropped;

    if skipped > 0 {
        warn!("Skipped {} malformed or duplicate {} entries", skipped, format);
    }
    debug!("Parsed {} cues from {} payload", timeline.len(), format);

    ParsedLyrics {
        timeline,
        format,
        skipped,
        metadata,
    }
}

/// Guess the payload shape from its content
pub fn detect_format(content: &str) -> PayloadFormat {
    let first_line = content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default();

    if first_line.starts_with("WEBVTT") {
        return PayloadFormat::WebVtt;
    }

    if let Some(timing) = content.lines().find(|line| line.contains("-->")) {
        // SubRip separates milliseconds with a comma
        let start = timing.split("-->").next().unwrap_or_default();
        return if start.contains(',') {
            PayloadFormat::Srt
        } else {
            PayloadFormat::WebVtt
        };
    }

    if content.lines().any(|line| LRC_LINE_REGEX.is_match(line.trim())) {
        return PayloadFormat::Lrc;
    }

    PayloadFormat::PlainText
}

/// Parse a time stamp to milliseconds
///
/// Accepts `hh:mm:ss.fff`, `mm:ss.fff`, a comma instead of the dot, and a
/// fraction of one to three digits (`.5` is 500 ms, `.25` is 250 ms).
pub fn parse_timestamp(timestamp: &str) -> Result<u64, SubtitleError> {
    let malformed = |reason: &str| SubtitleError::MalformedTimestamp {
        timestamp: timestamp.to_string(),
        reason: reason.to_string(),
    };

    let (clock, fraction) = match timestamp.trim().split_once(['.', ',']) {
        Some((clock, fraction)) => (clock, Some(fraction)),
        None => (timestamp.trim(), None),
    };

    let parts: Vec<&str> = clock.split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(malformed("expected [hh:]mm:ss"));
    }

    let mut numbers = Vec::with_capacity(parts.len());
    for part in &parts {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed("non-numeric component"));
        }
        let value: u64 = part.parse().map_err(|_| malformed("component out of range"))?;
        numbers.push(value);
    }

    let (hours, minutes, seconds) = match numbers.as_slice() {
        [m, s] => (0, *m, *s),
        [h, m, s] => {
            if *m >= 60 {
                return Err(malformed("minutes must be below 60"));
            }
            (*h, *m, *s)
        }
        _ => return Err(malformed("expected [hh:]mm:ss")),
    };
    if seconds >= 60 {
        return Err(malformed("seconds must be below 60"));
    }

    let millis = match fraction {
        None => 0,
        Some(digits) => {
            if digits.is_empty() || digits.len() > 3 || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed("fraction must be 1 to 3 digits"));
            }
            let value: u64 = digits.parse().map_err(|_| malformed("bad fraction"))?;
            value * 10u64.pow(3 - digits.len() as u32)
        }
    };

    hours
        .checked_mul(3_600_000)
        .and_then(|ms| ms.checked_add(minutes.checked_mul(60_000)?))
        .and_then(|ms| ms.checked_add(seconds * 1_000 + millis))
        .ok_or_else(|| malformed("out of range"))
}

/// Format milliseconds as `hh:mm:ss.mmm`
pub fn format_timestamp(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
}

/// Strip inline markup and common entities from one line of cue text
fn clean_cue_text(line: &str) -> String {
    let stripped = INLINE_TAG_REGEX.replace_all(line, "");
    stripped
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse the `start --> end [settings]` line of a cue block
fn parse_timing_line(line: &str, line_number: usize) -> Result<(u64, u64), SubtitleError> {
    let malformed = |reason: String| SubtitleError::MalformedPayload {
        line: line_number,
        reason,
    };

    let (start, rest) = line
        .split_once("-->")
        .ok_or_else(|| malformed("missing '-->'".to_string()))?;
    // cue settings may follow the end time
    let end = rest.split_whitespace().next().unwrap_or_default();

    let start_ms = parse_timestamp(start).map_err(|e| malformed(e.to_string()))?;
    let end_ms = parse_timestamp(end).map_err(|e| malformed(e.to_string()))?;

    if end_ms <= start_ms {
        return Err(malformed(format!(
            "end time {} <= start time {}",
            end_ms, start_ms
        )));
    }

    Ok((start_ms, end_ms))
}

/// Parse WebVTT or SubRip content into cues
///
/// Blocks are separated by blank lines. The timing line is the first or
/// second line of a block (the optional line before it is an SRT index or a
/// VTT cue identifier); everything after it is cue text.
fn parse_cue_blocks(content: &str) -> (Vec<Cue>, usize) {
    let lines: Vec<&str> = content.lines().collect();
    let mut cues = Vec::new();
    let mut skipped = 0;
    let mut i = 0;

    while i < lines.len() {
        if lines[i].trim().is_empty() {
            i += 1;
            continue;
        }

        let block_start = i;
        while i < lines.len() && !lines[i].trim().is_empty() {
            i += 1;
        }
        let block: Vec<&str> = lines[block_start..i].iter().map(|l| l.trim()).collect();

        let head = block[0];
        if head.starts_with("WEBVTT")
            || head.starts_with("NOTE")
            || head == "STYLE"
            || head == "REGION"
        {
            continue;
        }

        let Some(timing_pos) = block.iter().take(2).position(|l| l.contains("-->")) else {
            warn!(
                "Unexpected text at line {} outside of a cue: {}",
                block_start + 1,
                head
            );
            skipped += 1;
            continue;
        };

        let line_number = block_start + timing_pos + 1;
        match parse_timing_line(block[timing_pos], line_number) {
            Ok((start_ms, end_ms)) => {
                let text = block[timing_pos + 1..]
                    .iter()
                    .map(|l| clean_cue_text(l))
                    .filter(|l| !l.is_empty())
                    .collect::<Vec<_>>()
                    .join("\n");
                cues.push(Cue::new(start_ms, Some(end_ms), text));
            }
            Err(e) => {
                warn!("Skipping cue: {}", e);
                skipped += 1;
            }
        }
    }

    (cues, skipped)
}

/// Parse LRC content into open-ended cues
fn parse_lrc(content: &str) -> (Vec<Cue>, usize, HashMap<String, String>) {
    let mut stamped: Vec<(u64, String)> = Vec::new();
    let mut metadata = HashMap::new();
    let mut skipped = 0;
    let mut offset_ms: i64 = 0;

    for (line_index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = LRC_METADATA_REGEX.captures(line) {
            let key = caps[1].to_lowercase();
            let value = caps[2].trim().to_string();
            if key == "offset" {
                match value.parse::<i64>() {
                    Ok(offset) => offset_ms = offset,
                    Err(_) => warn!("Ignoring invalid LRC offset '{}'", value),
                }
            }
            metadata.insert(key, value);
            continue;
        }

        let Some(caps) = LRC_LINE_REGEX.captures(line) else {
            warn!("Unexpected text at line {} without a time stamp: {}", line_index + 1, line);
            skipped += 1;
            continue;
        };

        let text = clean_cue_text(caps.get(2).map_or("", |m| m.as_str()));
        let stamps = caps.get(1).map_or("", |m| m.as_str());

        for ts in LRC_TIMESTAMP_REGEX.captures_iter(stamps) {
            let token = match ts.get(3) {
                Some(fraction) => format!("{}:{}.{}", &ts[1], &ts[2], fraction.as_str()),
                None => format!("{}:{}", &ts[1], &ts[2]),
            };
            match parse_timestamp(&token) {
                Ok(ms) => stamped.push((ms, text.clone())),
                Err(e) => {
                    warn!("Skipping LRC stamp at line {}: {}", line_index + 1, e);
                    skipped += 1;
                }
            }
        }
    }

    // a positive offset makes the lyrics appear earlier
    let cues = stamped
        .into_iter()
        .map(|(ms, text)| {
            let shifted = match offset_ms {
                o if o >= 0 => ms.saturating_sub(o.unsigned_abs()),
                o => ms.saturating_add(o.unsigned_abs()),
            };
            Cue::new(shifted, None, text)
        })
        .collect();

    (cues, skipped, metadata)
}
