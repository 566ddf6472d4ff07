//! Text canonicalization applied to every extracted unit before chunking.

/// Normalize whitespace, line endings, hyphenation breaks and bullet
/// markers. Pure and idempotent: `normalize(normalize(x)) == normalize(x)`.
///
/// Lossy by design: the output is for indexing, not for reproducing the
/// source byte-for-byte.
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let s = text.replace("\r\n", "\n").replace('\r', "\n");
    // A hyphen immediately before a line break merges with the next line.
    let s = s.replace("-\n", "");
    let s = collapse_blank_lines(&s);

    let mut out = String::with_capacity(s.len());
    for (i, line) in s.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&normalize_line(line));
    }
    out.trim().to_string()
}

/// 3+ consecutive newlines become exactly two (one blank line).
fn collapse_blank_lines(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut run = 0usize;
    for ch in s.chars() {
        if ch == '\n' {
            run += 1;
            if run <= 2 {
                out.push('\n');
            }
        } else {
            run = 0;
            out.push(ch);
        }
    }
    out
}

/// Strip leading bullet glyphs and collapse horizontal whitespace runs.
fn normalize_line(line: &str) -> String {
    let stripped = line.trim_start_matches(['•', '▪', '-']);
    // Only treat it as a bullet when glyphs were actually removed; the
    // following whitespace goes with them.
    let rest = if stripped.len() != line.len() {
        stripped.trim_start()
    } else {
        line
    };

    let mut out = String::with_capacity(rest.len());
    let mut in_space = false;
    for ch in rest.chars() {
        if ch == ' ' || ch == '\t' {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            in_space = false;
            out.push(ch);
        }
    }
    out
}
