//! Minimal CSV encoding for export endpoints.
//!
//! RFC 4180 rules: fields containing a comma, quote, or newline are wrapped
//! in quotes with embedded quotes doubled. Rows join with `\n` to match what
//! spreadsheet importers expect from the export endpoints.

/// Escape a single CSV field.
pub fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Encode one row from its raw field values.
pub fn encode_row<I, S>(fields: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    fields
        .into_iter()
        .map(|f| escape_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Build a full document from a header row and data rows.
pub fn encode_document(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut out = Vec::with_capacity(rows.len() + 1);
    out.push(encode_row(header.iter().copied()));
    for row in rows {
        out.push(encode_row(row.iter().map(String::as_str)));
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_field_unquoted() {
        assert_eq!(escape_field("hello"), "hello");
    }

    #[test]
    fn test_comma_forces_quotes() {
        assert_eq!(escape_field("Doe, Jane"), "\"Doe, Jane\"");
    }

    #[test]
    fn test_embedded_quotes_doubled() {
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_newline_forces_quotes() {
        assert_eq!(escape_field("line1\nline2"), "\"line1\nline2\"");
    }

    #[test]
    fn test_encode_row() {
        assert_eq!(
            encode_row(["a", "b,c", "d\"e"]),
            "a,\"b,c\",\"d\"\"e\""
        );
    }

    #[test]
    fn test_encode_document() {
        let doc = encode_document(
            &["Name", "Email"],
            &[
                vec!["Jane".to_string(), "jane@example.com".to_string()],
                vec!["Doe, John".to_string(), String::new()],
            ],
        );
        assert_eq!(doc, "Name,Email\nJane,jane@example.com\n\"Doe, John\",");
    }
}
