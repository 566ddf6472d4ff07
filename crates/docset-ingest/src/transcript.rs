//! Merging raw speech-recognition segments into readable time blocks.

use tracing::debug;

use docset_core::types::TranscriptSegment;

/// A coherent block of transcript text covering `start..end` seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeBlock {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

/// Walk segments in order, accumulating into blocks. A new block starts
/// when the silence gap since the last non-empty segment reaches
/// `gap_secs`, when the block's elapsed duration reaches `max_secs`, or
/// when its accumulated character count would exceed `max_chars`.
///
/// Segments with empty text are skipped entirely and do not take part in
/// gap measurement. Block text concatenates segment texts with single
/// spaces.
pub fn merge_segments(
    segments: &[TranscriptSegment],
    max_secs: f64,
    max_chars: usize,
    gap_secs: f64,
) -> Vec<TimeBlock> {
    debug!(segments = segments.len(), "merging transcript segments");
    let mut blocks: Vec<TimeBlock> = Vec::new();
    let mut cur: Vec<&str> = Vec::new();
    let mut block_start: Option<f64> = None;
    let mut last_end: Option<f64> = None;
    let mut cur_chars = 0usize;

    for seg in segments {
        let text = seg.text.trim();
        if text.is_empty() {
            continue;
        }
        if block_start.is_none() {
            block_start = Some(seg.start);
        }

        let gap = last_end.map_or(0.0, |e| seg.start - e);
        let too_long = block_start.is_some_and(|t0| seg.end - t0 >= max_secs);
        let too_big = cur_chars + text.chars().count() >= max_chars;
        if gap >= gap_secs || too_long || too_big {
            if !cur.is_empty() {
                blocks.push(TimeBlock {
                    text: cur.join(" ").trim().to_string(),
                    start: block_start.unwrap_or(seg.start),
                    end: last_end.unwrap_or(seg.start),
                });
            }
            cur.clear();
            block_start = Some(seg.start);
            cur_chars = 0;
        }

        cur.push(text);
        cur_chars += text.chars().count() + 1;
        last_end = Some(seg.end);
    }

    if !cur.is_empty() {
        blocks.push(TimeBlock {
            text: cur.join(" ").trim().to_string(),
            start: block_start.unwrap_or(0.0),
            end: last_end.unwrap_or(0.0),
        });
    }

    debug!(blocks = blocks.len(), "transcript blocks produced");
    blocks
}

/// Seconds (truncated) rendered as `HH:MM:SS`.
pub fn format_hhmmss(secs: f64) -> String {
    let total = secs.max(0.0) as u64;
    let (h, rem) = (total / 3600, total % 3600);
    let (m, s) = (rem / 60, rem % 60);
    format!("{:02}:{:02}:{:02}", h, m, s)
}

/// The human-readable range locator carried on transcript chunks.
pub fn timecode(start: f64, end: f64) -> String {
    format!("{}-{}", format_hhmmss(start), format_hhmmss(end))
}
