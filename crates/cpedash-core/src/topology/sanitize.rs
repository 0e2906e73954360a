// ── Report sanitizer ──
//
// The mesh daemon dumps its topology as a Python-style literal: single
// quoted strings, `None`/`True`/`False`. This rewrites it into strict
// JSON without touching the contents of string literals.

/// Vendor label for WPA personal security, normalized for the UI.
const PASS_PHRASE: &str = "Pass-phrase";
const WPAPSK: &str = "WPAPSK";

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    Single,
    Double,
}

/// Convert a Python-literal report into JSON text.
///
/// Already-valid JSON passes through unchanged (apart from the
/// `Pass-phrase` relabel).
pub fn sanitize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + raw.len() / 8);
    let mut state = State::Code;
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            State::Code => match c {
                '\'' => {
                    out.push('"');
                    state = State::Single;
                }
                '"' => {
                    out.push('"');
                    state = State::Double;
                }
                c if c.is_ascii_alphabetic() || c == '_' => {
                    let mut word = String::from(c);
                    while let Some(&next) = chars.peek() {
                        if next.is_ascii_alphanumeric() || next == '_' {
                            word.push(next);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    out.push_str(match word.as_str() {
                        "None" => "null",
                        "True" => "true",
                        "False" => "false",
                        other => other,
                    });
                }
                c => out.push(c),
            },
            State::Single => match c {
                '\\' => match chars.next() {
                    // `\'` needs no escape inside a JSON string.
                    Some('\'') => out.push('\''),
                    Some(escaped) => {
                        out.push('\\');
                        out.push(escaped);
                    }
                    None => out.push_str("\\\\"),
                },
                '"' => out.push_str("\\\""),
                '\'' => {
                    out.push('"');
                    state = State::Code;
                }
                c => out.push(c),
            },
            State::Double => match c {
                '\\' => {
                    out.push('\\');
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => {
                    out.push('"');
                    state = State::Code;
                }
                c => out.push(c),
            },
        }
    }

    out.replace(PASS_PHRASE, WPAPSK)
}
