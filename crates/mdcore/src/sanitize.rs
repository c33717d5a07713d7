use ammonia::Builder;

pub fn sanitize_html(html: &str) -> String {
    create_secure_sanitizer().clean(html).to_string()
}

/// Escape plain text for use inside an HTML element or attribute value.
pub fn escape_text(text: &str) -> String {
    ammonia::clean_text(text)
}

fn create_secure_sanitizer() -> Builder<'static> {
    // ammonia's defaults plus the disabled checkboxes of GFM task lists
    let mut builder = Builder::default();
    builder
        .add_tags(&["input"])
        .add_tag_attributes("input", &["type", "checked", "disabled"]);
    builder
}
