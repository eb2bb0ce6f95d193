//! Small HTML building helpers. Every value that comes from the database is
//! passed through [`escape`] before it is written into markup.

use crate::models::profile::non_empty;

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
    out
}

/// A complete document with `body` inside.
pub fn document(title: &str, css: &str, body: &str) -> String {
    let mut html = String::from("<!DOCTYPE html>\n<html lang=\"es\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape(title)));
    html.push_str(&format!("<style>{css}</style>\n"));
    html.push_str("</head>\n<body>\n");
    html.push_str(body);
    html.push_str("\n</body>\n</html>\n");
    html
}

/// `<p><strong>label:</strong> value</p>`, or nothing when the value is blank.
pub fn field(label: &str, value: Option<&str>) -> String {
    match non_empty(value) {
        Some(value) => format!(
            "<p class=\"field\"><strong>{}:</strong> {}</p>\n",
            escape(label),
            escape(value)
        ),
        None => String::new(),
    }
}

/// Escaped text with line breaks kept.
pub fn multiline(text: &str) -> String {
    escape(text.trim()).replace('\n', "<br>\n")
}

pub fn nav(links: &[(&str, &str)]) -> String {
    let mut html = String::from("<nav>\n");
    for (href, label) in links {
        html.push_str(&format!("<a href=\"{}\">{}</a>\n", escape(href), escape(label)));
    }
    html.push_str("</nav>\n");
    html
}
