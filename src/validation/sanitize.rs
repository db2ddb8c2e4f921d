//! HTML tag stripping for admin-entered text.

/// Remove anything that looks like an HTML tag and trim the result.
///
/// A `<` only opens a tag when followed by a letter, `/` or `!`, so text such
/// as `precio < 100` survives untouched.
pub fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_tag = false;

    while let Some(c) = chars.next() {
        if in_tag {
            if c == '>' {
                in_tag = false;
            }
            continue;
        }
        if c == '<' {
            if let Some(next) = chars.peek() {
                if next.is_ascii_alphabetic() || *next == '/' || *next == '!' {
                    in_tag = true;
                    continue;
                }
            }
        }
        out.push(c);
    }

    out.trim().to_string()
}

/// Strip tags from an optional field; blank results become `None`.
pub fn strip_tags_opt(input: Option<String>) -> Option<String> {
    input.map(|s| strip_tags(&s)).filter(|s| !s.is_empty())
}
