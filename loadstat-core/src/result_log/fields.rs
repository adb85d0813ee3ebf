//! Field splitting for one result log line.
//!
//! A `"` toggles the quoted state wherever it appears in a field and is not
//! part of the value; commas inside a quoted section do not split. Inside a
//! quoted section `""` stands for one literal quote. A quote left without a
//! partner at the end of the line is kept as a literal character.

struct Scan {
    fields: Vec<String>,
    /// Byte offset of the quote still open at end of line.
    open_at: Option<usize>,
}

fn scan(line: &str, literal_at: Option<usize>) -> Scan {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut open_at = None;
    let mut chars = line.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '"' if Some(pos) == literal_at => field.push('"'),
            '"' if open_at.is_some() => {
                if chars.peek().is_some_and(|&(_, next)| next == '"') {
                    chars.next();
                    field.push('"');
                } else {
                    open_at = None;
                }
            }
            '"' => open_at = Some(pos),
            ',' if open_at.is_none() => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }

    fields.push(field);
    Scan { fields, open_at }
}

pub(super) fn split_fields(line: &str) -> Vec<String> {
    let first = scan(line, None);
    match first.open_at {
        None => first.fields,
        Some(pos) => scan(line, Some(pos)).fields,
    }
}
