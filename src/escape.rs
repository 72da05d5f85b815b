use std::fmt::Display;

/// Make arbitrary text safe to place into HTML markup.
///
/// The value is stringified first, so numbers and other displayable values
/// are accepted as-is. Escape raw text exactly once: the output is not a
/// fixed point, `&` in it would be escaped again.
pub fn escape_html(value: impl Display) -> String {
    let input = value.to_string();
    let mut output = String::with_capacity(input.len());
    for ch in input.chars() {
        match entity_for(ch) {
            Some(entity) => output.push_str(entity),
            None => output.push(ch),
        }
    }
    output
}

const fn entity_for(ch: char) -> Option<&'static str> {
    Some(match ch {
        '&' => "&amp;",
        '<' => "&lt;",
        '>' => "&gt;",
        '"' => "&quot;",
        '\'' => "&#39;",
        '/' => "&#x2F;",
        '`' => "&#x60;",
        '=' => "&#x3D;",
        _ => return None,
    })
}
