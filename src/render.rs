//! Plain-text to HTML conversion for the alternative part of the message.
//!
//! Text is not escaped: whatever the model wrote lands in the HTML verbatim.

use regex::Regex;

use std::sync::LazyLock;

static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{2,}").expect("paragraph break pattern is valid"));

pub fn body_to_html(body: &str) -> String {
    PARAGRAPH_BREAK
        .split(body)
        .map(|paragraph| {
            let lines: Vec<&str> = paragraph.split('\n').map(str::trim_end).collect();
            format!("<p>{}</p>", lines.join("<br/>"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
