use std::borrow::Cow;

/// Splits one line of the CSV export into its fields.
///
/// Some exporters wrap the whole row in a single quoted field and double every
/// inner quote (`"Title,""https://x"",""Date"""`). Such rows are unwrapped
/// before splitting, so both shapes yield `["Title", "https://x", "Date"]`.
pub fn split_record(line: &str) -> Vec<String> {
    let line = unwrap_row_quotes(line);

    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);

    fields
}

/// Index of the header field matching `name`, ignoring case and surrounding whitespace.
pub fn column_index(header: &str, name: &str) -> Option<usize> {
    let wanted = name.trim();
    split_record(header)
        .iter()
        .position(|field| field.trim().eq_ignore_ascii_case(wanted))
}

fn unwrap_row_quotes(line: &str) -> Cow<'_, str> {
    let inner = match line
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        Some(inner) => inner,
        None => return Cow::Borrowed(line),
    };

    // Only a row-level wrap if every inner quote is doubled.
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '"' && chars.next() != Some('"') {
            return Cow::Borrowed(line);
        }
    }

    Cow::Owned(inner.replace("\"\"", "\""))
}
