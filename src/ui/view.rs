//! Pure view tree.
//!
//! Every render function in the dashboard returns a [`Node`] instead of
//! writing into a live document. The tree can be serialized to HTML/SVG with
//! [`Node::to_html`] or inspected directly in tests.

use std::fmt::Write;

/// Tags that never have children and serialize as `<tag .../>`.
const SELF_CLOSING: &[&str] = &[
    "br", "hr", "img", "input", "meta", "rect", "line", "stop", "animate", "path", "circle",
];

/// A node in the rendered view.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    /// Several sibling nodes without a wrapping element.
    Fragment(Vec<Node>),
}

/// An element with ordered attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

/// Shorthand for [`Element::new`].
pub fn el(tag: &str) -> Element {
    Element::new(tag)
}

/// Shorthand for a text node.
pub fn text(s: impl Into<String>) -> Node {
    Node::Text(s.into())
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Set an attribute, replacing any previous value.
    pub fn attr(mut self, name: &str, value: impl ToString) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn set_attr(&mut self, name: &str, value: impl ToString) {
        let value = value.to_string();
        match self.attrs.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    pub fn class(self, class: &str) -> Self {
        self.attr("class", class)
    }

    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn children<I, N>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        self.children.extend(nodes.into_iter().map(Into::into));
        self
    }

    /// Append a text child.
    pub fn text(self, s: impl Into<String>) -> Self {
        self.child(Node::Text(s.into()))
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.get_attr("class")
            .is_some_and(|c| c.split_whitespace().any(|c| c == class))
    }
}

impl From<Element> for Node {
    fn from(e: Element) -> Self {
        Node::Element(e)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::Text(s.to_string())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::Text(s)
    }
}

impl Node {
    /// Serialize to an HTML/SVG string. Text and attribute values are escaped.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Node::Text(s) => out.push_str(&escape(s)),
            Node::Fragment(nodes) => nodes.iter().for_each(|n| n.write_html(out)),
            Node::Element(e) => {
                let _ = write!(out, "<{}", e.tag);
                for (k, v) in &e.attrs {
                    let _ = write!(out, " {}=\"{}\"", k, escape(v));
                }
                if e.children.is_empty() && SELF_CLOSING.contains(&e.tag.as_str()) {
                    out.push_str("/>");
                    return;
                }
                out.push('>');
                for child in &e.children {
                    child.write_html(out);
                }
                let _ = write!(out, "</{}>", e.tag);
            }
        }
    }

    /// Concatenated text of this subtree, like the DOM's `textContent`.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(s) => out.push_str(s),
            Node::Fragment(nodes) => nodes.iter().for_each(|n| n.collect_text(out)),
            Node::Element(e) => e.children.iter().for_each(|n| n.collect_text(out)),
        }
    }

    /// All elements in document order matching `pred`.
    pub fn find_all<F>(&self, pred: F) -> Vec<&Element>
    where
        F: Fn(&Element) -> bool,
    {
        let mut found = Vec::new();
        self.walk(&pred, &mut found);
        found
    }

    fn walk<'a, F>(&'a self, pred: &F, found: &mut Vec<&'a Element>)
    where
        F: Fn(&Element) -> bool,
    {
        match self {
            Node::Text(_) => {}
            Node::Fragment(nodes) => nodes.iter().for_each(|n| n.walk(pred, found)),
            Node::Element(e) => {
                if pred(e) {
                    found.push(e);
                }
                e.children.iter().for_each(|n| n.walk(pred, found));
            }
        }
    }

    /// Visit every element in document order, allowing edits in place.
    pub fn for_each_element_mut<F>(&mut self, f: &mut F)
    where
        F: FnMut(&mut Element),
    {
        match self {
            Node::Text(_) => {}
            Node::Fragment(nodes) => nodes.iter_mut().for_each(|n| n.for_each_element_mut(f)),
            Node::Element(e) => {
                f(e);
                e.children.iter_mut().for_each(|n| n.for_each_element_mut(f));
            }
        }
    }

    pub fn find_by_class(&self, class: &str) -> Vec<&Element> {
        self.find_all(|e| e.has_class(class))
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        self.find_all(|e| e.get_attr("id") == Some(id))
            .into_iter()
            .next()
    }
}

/// Escape text for use in HTML content and double-quoted attributes.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
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

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_nested_elements_with_escaping() {
        let node: Node = el("div")
            .class("card")
            .attr("title", "a \"quoted\" <b>")
            .child(el("strong").text("R&D"))
            .child(el("br"))
            .into();
        assert_eq!(
            node.to_html(),
            "<div class=\"card\" title=\"a &quot;quoted&quot; &lt;b&gt;\"><strong>R&amp;D</strong><br/></div>"
        );
    }

    #[test]
    fn empty_non_void_element_keeps_closing_tag() {
        let node: Node = el("div").id("x").into();
        assert_eq!(node.to_html(), "<div id=\"x\"></div>");
    }

    #[test]
    fn attr_replaces_existing_value() {
        let e = el("rect").attr("opacity", 1).attr("opacity", 0.8);
        assert_eq!(e.get_attr("opacity"), Some("0.8"));
        assert_eq!(e.attrs.len(), 1);
    }

    #[test]
    fn text_content_and_queries() {
        let node: Node = el("ul")
            .child(el("li").class("item first").text("a"))
            .child(el("li").class("item").text("b"))
            .into();
        assert_eq!(node.text_content(), "ab");
        assert_eq!(node.find_by_class("item").len(), 2);
        assert_eq!(node.find_by_class("first").len(), 1);
        assert!(node.find_by_id("missing").is_none());
    }

    #[test]
    fn mutable_walk_reaches_nested_elements() {
        let mut node = Node::Fragment(vec![
            el("g").child(el("rect").class("bar")).into(),
            el("rect").class("bar").into(),
        ]);
        node.for_each_element_mut(&mut |e| {
            if e.has_class("bar") {
                e.set_attr("opacity", 0.5);
            }
        });
        let dimmed = node.find_all(|e| e.get_attr("opacity") == Some("0.5"));
        assert_eq!(dimmed.len(), 2);
    }
}
