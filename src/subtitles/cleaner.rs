/// Convert SRT subtitle content into plain text, one line per subtitle block.
///
/// Index lines, timestamp lines and `<...>` markup are dropped, whitespace is
/// collapsed and blocks left empty are omitted.
pub fn clean_srt_to_text(srt_content: &str) -> String {
    split_blocks(srt_content.trim())
        .into_iter()
        .filter_map(|block| clean_block(&block))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split on blank lines; lines holding only whitespace count as blank.
fn split_blocks(content: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();

    for line in content.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }

    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

fn clean_block(block: &[&str]) -> Option<String> {
    let mut lines = block;

    if lines.first().is_some_and(|line| is_index_line(line)) {
        lines = &lines[1..];
    }

    if lines.first().is_some_and(|line| is_timestamp_line(line)) {
        lines = &lines[1..];
    }

    let joined = lines.join(" ");
    let text = collapse_whitespace(&strip_tags(&joined));

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn is_index_line(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty() && line.chars().all(|c| c.is_ascii_digit())
}

/// Matches a line starting with `HH:MM:SS,mmm`.
fn is_timestamp_line(line: &str) -> bool {
    let bytes = line.trim_start().as_bytes();
    const SHAPE: &[u8] = b"00:00:00,000";

    bytes.len() >= SHAPE.len()
        && SHAPE.iter().zip(bytes).all(|(shape, actual)| match shape {
            b'0' => actual.is_ascii_digit(),
            sep => actual == sep,
        })
}

/// Remove `<...>` tags. A `<` without a closing `>` (or an empty `<>`) is kept.
fn strip_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        match after.find('>') {
            Some(close) if close > 0 => rest = &after[close + 1..],
            _ => {
                out.push('<');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
