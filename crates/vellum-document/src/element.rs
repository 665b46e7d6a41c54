use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A detached element tree, built before insertion into a document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    /// A new element with a lowercased tag name.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attrs: BTreeMap::new(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Set an attribute only when a value is present.
    pub fn attr_opt(self, name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(v) => self.attr(name, v),
            None => self,
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    pub fn is(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    /// Wrap this element in a new parent.
    pub fn wrap(self, parent: Element) -> Element {
        parent.child(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder() {
        let el = Element::new("VIDEO")
            .attr("controls", "true")
            .attr_opt("width", Some("320"))
            .attr_opt("height", None::<String>)
            .child(Element::new("source").attr("src", "blob:1"));
        assert_eq!(el.tag, "video");
        assert!(el.is("video"));
        assert_eq!(el.get_attr("width"), Some("320"));
        assert!(!el.has_attr("height"));
        assert_eq!(el.children.len(), 1);
    }

    #[test]
    fn wrap_nests_inside_parent() {
        let wrapped = Element::new("audio").wrap(Element::new("p").attr("fsid", "x"));
        assert!(wrapped.is("p"));
        assert!(wrapped.children[0].is("audio"));
    }
}
