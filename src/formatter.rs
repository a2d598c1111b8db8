use crate::models::Participant;

fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, '@' | '.' | '_' | '-')
}

fn first_chars(text: &str, n: usize) -> String {
    text.chars().take(n).collect()
}

/// Two-letter badge for a participant, e.g. `"alice@example.com"` -> `"AE"`.
pub fn initials_of(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut parts = text.split(is_separator).filter(|part| !part.is_empty());
    let initials = match (parts.next(), parts.next()) {
        (None, _) => first_chars(text, 2),
        (Some(only), None) => first_chars(only, 2),
        (Some(first), Some(second)) => {
            let mut out = first_chars(first, 1);
            out.push_str(&first_chars(second, 1));
            out
        }
    };
    initials.to_uppercase()
}

/// Text shown for a participant: name, then email, then the raw JSON.
pub fn display_text_of(participant: &Participant) -> String {
    match participant {
        Participant::Identifier(text) => text.clone(),
        Participant::Record(record) => record
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or_else(|| record.email.as_deref().filter(|email| !email.is_empty()))
            .map(str::to_owned)
            .unwrap_or_else(|| serde_json::to_string(record).unwrap_or_default()),
        Participant::Other(value) => value.to_string(),
    }
}
