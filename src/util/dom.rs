//! Markup helpers for container content.

/// Escape text for use inside element content or a quoted attribute
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Make serialized JSON safe to embed in an inline `<script>` block
pub fn escape_script_json(json: &str) -> String {
    json.replace("</", "<\\/")
}
