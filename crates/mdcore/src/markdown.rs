use comrak::{markdown_to_html, ComrakOptions};
use lazy_static::lazy_static;
use regex::Regex;

use crate::sanitize::sanitize_html;

lazy_static! {
    static ref ATX_HEADING: Regex = Regex::new(r"(?m)^ {0,3}#{1,6}[ \t]+(.+?)(?:[ \t]+#+)?[ \t]*$")
        .expect("Invalid ATX_HEADING regex pattern");
}

/// Turns markdown into HTML. Never fails: malformed input still produces
/// best-effort output.
pub trait Renderer {
    fn render(&self, markdown: &str) -> String;
}

/// GFM renderer backed by comrak, sanitising its output unless told not to.
#[derive(Debug, Clone)]
pub struct ComrakRenderer {
    sanitize: bool,
}

impl ComrakRenderer {
    pub fn new() -> Self {
        Self { sanitize: true }
    }

    pub fn with_sanitize(mut self, sanitize: bool) -> Self {
        self.sanitize = sanitize;
        self
    }

    pub fn sanitizes(&self) -> bool {
        self.sanitize
    }
}

impl Default for ComrakRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for ComrakRenderer {
    fn render(&self, markdown: &str) -> String {
        let html = to_html(markdown);
        log::trace!("Rendered {} bytes of markdown", markdown.len());
        if self.sanitize {
            sanitize_html(&html)
        } else {
            html
        }
    }
}

pub fn to_html(src: &str) -> String {
    let opt = create_comrak_options();
    markdown_to_html(src, &opt)
}

fn create_comrak_options() -> ComrakOptions<'static> {
    let mut opt = ComrakOptions::default();

    // Extension options
    opt.extension.strikethrough = true;
    opt.extension.table = true;
    opt.extension.autolink = true;
    opt.extension.tasklist = true;
    opt.extension.footnotes = true;

    // Parse options
    opt.parse.smart = true;

    // Raw HTML in the source is escaped, never passed through
    opt.render.unsafe_ = false;
    opt.render.escape = true;

    opt
}

/// Text of the first ATX heading, used as the exported document's title.
pub fn document_title(markdown: &str) -> Option<String> {
    ATX_HEADING
        .captures(markdown)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|title| !title.is_empty())
}
