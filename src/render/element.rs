use std::collections::BTreeMap;

/// Snapshot of one element as returned by a [`RenderSession`](super::RenderSession) query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementHandle {
    tag: String,
    text: String,
    attributes: BTreeMap<String, String>,
    inner_html: String,
}

impl ElementHandle {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_inner_html(mut self, inner_html: impl Into<String>) -> Self {
        self.inner_html = inner_html.into();
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Rendered text, trimmed
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn inner_html(&self) -> &str {
        &self.inner_html
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_is_trimmed() {
        let element = ElementHandle::new("a").with_text("  Headline \n");
        assert_eq!(element.text(), "Headline");
    }

    #[test]
    fn test_missing_attribute() {
        let element = ElementHandle::new("a").with_attribute("href", "https://example.com");
        assert_eq!(element.attribute("href"), Some("https://example.com"));
        assert_eq!(element.attribute("datetime"), None);
    }
}
