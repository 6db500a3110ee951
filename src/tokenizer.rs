//! Turns raw SWIFT message text into an ordered field list.
//!
//! Only block 4 of a block-delimited message (`{1:...}{2:...}{4: ... -}`) is
//! parsed as field data; other blocks are skipped, not validated. Ingestion
//! is deliberately lenient: a malformed tag-like line is a continuation, not
//! an error, and tokenization itself never fails.

/// One occurrence of a tag in a message. Multi-line values keep their lines
/// joined with `\n`; message order and duplicates are preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedField {
    pub tag: String,
    pub value: String,
    /// 0-based index among occurrences of the same tag.
    pub occurrence_index: usize,
    /// 1-based first and last line of the field within the parsed block.
    pub line_range: (usize, usize),
}

/// Scan the message text and return its fields in original order.
pub fn tokenize(raw: &str) -> Vec<ParsedField> {
    let body = block4_body(raw);

    let mut fields: Vec<ParsedField> = Vec::new();
    let mut counts: std::collections::HashMap<String, usize> = std::collections::HashMap::new();

    for (index, line) in body.split('\n').enumerate() {
        let line = line.trim_end_matches('\r');
        let line_no = index + 1;

        if line.trim() == "-}" {
            break;
        }

        match field_start(line) {
            Some((tag, rest)) => {
                let occurrence_index = *counts
                    .entry(tag.to_string())
                    .and_modify(|n| *n += 1)
                    .or_insert(0);
                fields.push(ParsedField {
                    tag: tag.to_string(),
                    value: rest.to_string(),
                    occurrence_index,
                    line_range: (line_no, line_no),
                });
            }
            None => {
                // Continuation line; text before the first tag is dropped.
                if let Some(current) = fields.last_mut() {
                    current.value.push('\n');
                    current.value.push_str(line);
                    current.line_range.1 = line_no;
                }
            }
        }
    }

    fields
}

/// A field-start line is `:NN:` or `:NNL:` — two digits plus an optional
/// uppercase letter. Anything else, including a three-digit tag, is treated
/// as continuation text.
fn field_start(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix(':')?;
    let bytes = rest.as_bytes();
    if bytes.len() < 3 || !bytes[0].is_ascii_digit() || !bytes[1].is_ascii_digit() {
        return None;
    }
    let tag_len = if bytes[2] == b':' {
        2
    } else if bytes[2].is_ascii_uppercase() && bytes.get(3) == Some(&b':') {
        3
    } else {
        return None;
    };
    Some((&rest[..tag_len], &rest[tag_len + 1..]))
}

/// Extract block 4's body. Without block delimiters the whole text is field
/// data; with an unterminated block 4 the entire remainder is its content.
fn block4_body(raw: &str) -> &str {
    match raw.find("{4:") {
        Some(start) => {
            let body = &raw[start + 3..];
            match body.find("-}") {
                Some(end) => &body[..end],
                None => body,
            }
        }
        None => raw,
    }
}

/// Build message text from tag/value pairs. Inverse of [`tokenize`] for
/// values without embedded tag-like line starts.
pub fn build_message(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(tag, value)| format!(":{tag}:{value}"))
        .collect::<Vec<_>>()
        .join("\n")
}
