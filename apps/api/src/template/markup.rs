//! Text-to-markup helpers shared by the skeletons.

/// Escapes the characters that would otherwise be read as markup.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escapes free text and turns each line break into `<br>`.
pub fn multiline(s: &str) -> String {
    html_escape(s)
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\n', "<br>")
}

/// One `<li>` per item, in input order. Empty input yields an empty string
/// so the caller's container is still emitted.
pub fn list_items(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("<li>{}</li>", html_escape(item)))
        .collect()
}
