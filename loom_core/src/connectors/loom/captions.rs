//! WebVTT caption files to plain prose.

const CUE_TIMING_ARROW: &str = "-->";
const HEADER_KEYWORD: &str = "WEBVTT";
const BYTE_ORDER_MARK: char = '\u{feff}';

/// Flatten a WebVTT payload into a single line of text.
///
/// Cue text lines are kept in file order, trimmed and joined with single
/// spaces. Header lines, cue timings, numeric cue ids and blank lines are
/// dropped. Repeated cue text is kept as-is. A leading byte order mark is
/// ignored.
pub fn vtt_to_text(payload: &str) -> String {
    let payload = payload.strip_prefix(BYTE_ORDER_MARK).unwrap_or(payload);
    let mut transcript = String::with_capacity(payload.len());

    for line in payload.lines() {
        if is_cue_metadata(line) {
            continue;
        }
        transcript.push_str(line.trim());
        transcript.push(' ');
    }

    transcript.trim_end().to_string()
}

fn is_cue_metadata(line: &str) -> bool {
    line.contains(CUE_TIMING_ARROW)
        || line.trim().is_empty()
        || is_cue_number(line)
        || line.starts_with(HEADER_KEYWORD)
}

fn is_cue_number(line: &str) -> bool {
    !line.is_empty() && line.bytes().all(|b| b.is_ascii_digit())
}
