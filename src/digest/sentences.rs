const TERMINATORS: [char; 3] = ['.', '!', '?'];
const CLOSERS: [char; 6] = ['"', '\'', ')', ']', '\u{201D}', '\u{2019}'];

pub fn normalize_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn char_len(input: &str) -> usize {
    input.chars().count()
}

fn flush(out: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
    current.clear();
}

/// Split `text` into sentence-like units.
///
/// A sentence ends at `.`, `!` or `?` (plus any trailing closing quotes or
/// brackets) when the next character is whitespace or the end of input.
/// Whitespace runs collapse to one space and terminators stay attached, so
/// joining the output with `" "` and splitting again is a fixed point.
pub fn split_sentences(text: &str) -> Vec<String> {
    let normalized = normalize_whitespace(text);
    let mut out = Vec::new();
    let mut current = String::new();
    let mut chars = normalized.chars().peekable();

    while let Some(ch) = chars.next() {
        current.push(ch);
        if !TERMINATORS.contains(&ch) {
            continue;
        }
        while let Some(&next) = chars.peek() {
            if TERMINATORS.contains(&next) || CLOSERS.contains(&next) {
                current.push(next);
                chars.next();
            } else {
                break;
            }
        }
        if matches!(chars.peek(), None | Some(' ')) {
            flush(&mut out, &mut current);
        }
    }
    flush(&mut out, &mut current);

    out
}
