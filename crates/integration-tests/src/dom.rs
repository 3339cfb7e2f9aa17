//! Arena DOM.
//!
//! Nodes live in one `Vec` and are addressed by [`NodeId`]. Replacing an
//! element's children detaches the old nodes without freeing them, so a stale
//! handle stays valid but is no longer [connected](Dom::is_connected), the
//! way a removed element behaves in a browser.
//!
//! The parser understands what the storefront pages use: elements with
//! quoted, unquoted and bare attributes, void elements, comments, a doctype,
//! raw `<script>`/`<style>` bodies, and character references in text and
//! attribute values.

use thiserror::Error;

/// Markup the parser cannot read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unclosed {0}")]
    Unclosed(&'static str),
}

/// Handle to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeKind {
    Document,
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone)]
struct ElementData {
    tag: String,
    attrs: Vec<(String, String)>,
    /// Current value of a form control, once it differs from the markup.
    value: Option<String>,
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

/// An in-memory document.
#[derive(Debug, Clone)]
pub struct Dom {
    nodes: Vec<Node>,
}

impl Default for Dom {
    fn default() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Document,
            }],
        }
    }
}

impl Dom {
    /// Parse a whole document.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` on an unterminated tag, comment or raw-text body.
    pub fn parse(html: &str) -> Result<Self, ParseError> {
        let mut dom = Self::default();
        let root = dom.root();
        dom.parse_into(root, html)?;
        Ok(dom)
    }

    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.node(id)?.kind {
            NodeKind::Element(element) => Some(element),
            NodeKind::Document | NodeKind::Text(_) => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes.get_mut(id.0)?.kind {
            NodeKind::Element(element) => Some(element),
            NodeKind::Document | NodeKind::Text(_) => None,
        }
    }

    fn append(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            kind,
        });
        if let Some(parent) = self.nodes.get_mut(parent.0) {
            parent.children.push(id);
        }
        id
    }

    fn detach_children(&mut self, id: NodeId) {
        let children = self
            .nodes
            .get_mut(id.0)
            .map(|node| std::mem::take(&mut node.children))
            .unwrap_or_default();
        for child in children {
            if let Some(child) = self.nodes.get_mut(child.0) {
                child.parent = None;
            }
        }
    }

    /// Lowercase tag name of an element.
    #[must_use]
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|element| element.tag.as_str())
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }

    /// Whether the node is still attached to the document.
    #[must_use]
    pub fn is_connected(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == self.root() {
                return true;
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Descendant elements of `id`, in document order.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            if self.element(next).is_some() {
                out.push(next);
            }
            stack.extend(self.children(next).iter().rev());
        }
        out
    }

    /// First element in the document with the given `id` attribute.
    #[must_use]
    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .find(|&node| self.attribute(node, "id") == Some(id))
    }

    /// Elements in the document carrying `class`.
    #[must_use]
    pub fn by_class(&self, class: &str) -> Vec<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|&node| self.has_class(node, class))
            .collect()
    }

    /// First element in the document with the given tag.
    #[must_use]
    pub fn by_tag(&self, tag: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .find(|&node| self.tag(node) == Some(tag))
    }

    #[must_use]
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?
            .attrs
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        let Some(element) = self.element_mut(id) else {
            return;
        };
        match element.attrs.iter_mut().find(|(attr, _)| attr == name) {
            Some((_, current)) => value.clone_into(current),
            None => element.attrs.push((name.to_string(), value.to_string())),
        }
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) {
        if let Some(element) = self.element_mut(id) {
            element.attrs.retain(|(attr, _)| attr != name);
        }
    }

    #[must_use]
    pub fn classes(&self, id: NodeId) -> Vec<String> {
        self.attribute(id, "class")
            .map(|classes| classes.split_ascii_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attribute(id, "class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == class))
    }

    fn set_classes(&mut self, id: NodeId, classes: &[String]) {
        self.set_attribute(id, "class", &classes.join(" "));
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        let mut classes = self.classes(id);
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
            self.set_classes(id, &classes);
        }
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        let mut classes = self.classes(id);
        let before = classes.len();
        classes.retain(|c| c != class);
        if classes.len() != before {
            self.set_classes(id, &classes);
        }
    }

    pub fn toggle_class(&mut self, id: NodeId, class: &str) {
        if self.has_class(id, class) {
            self.remove_class(id, class);
        } else {
            self.add_class(id, class);
        }
    }

    /// Whether an element matches a simple selector: `tag`, `.class` or
    /// `#id`.
    #[must_use]
    pub fn matches(&self, id: NodeId, selector: &str) -> bool {
        if let Some(class) = selector.strip_prefix('.') {
            self.has_class(id, class)
        } else if let Some(element_id) = selector.strip_prefix('#') {
            self.attribute(id, "id") == Some(element_id)
        } else {
            self.tag(id)
                .is_some_and(|tag| tag.eq_ignore_ascii_case(selector))
        }
    }

    /// The element or its nearest ancestor carrying `class`.
    #[must_use]
    pub fn closest(&self, id: NodeId, class: &str) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            if self.has_class(node, class) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    /// First descendant of `scope` matching `selector`.
    #[must_use]
    pub fn query(&self, scope: NodeId, selector: &str) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|&node| self.matches(node, selector))
    }

    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        match self.node(id).map(|node| &node.kind) {
            Some(NodeKind::Text(text)) => text.clone(),
            Some(NodeKind::Document | NodeKind::Element(_)) => self
                .children(id)
                .iter()
                .map(|&child| self.text_content(child))
                .collect(),
            None => String::new(),
        }
    }

    pub fn set_text_content(&mut self, id: NodeId, text: &str) {
        if self.element(id).is_none() {
            return;
        }
        self.detach_children(id);
        if !text.is_empty() {
            self.append(id, NodeKind::Text(text.to_string()));
        }
    }

    /// Replace an element's children with parsed markup.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the markup cannot be read; the element is then
    /// left empty.
    pub fn set_inner_html(&mut self, id: NodeId, html: &str) -> Result<(), ParseError> {
        if self.element(id).is_none() {
            return Ok(());
        }
        self.detach_children(id);
        let result = self.parse_into(id, html);
        if result.is_err() {
            self.detach_children(id);
        }
        result
    }

    /// Current value of a form control.
    #[must_use]
    pub fn value(&self, id: NodeId) -> String {
        let Some(element) = self.element(id) else {
            return String::new();
        };
        if let Some(value) = &element.value {
            return value.clone();
        }

        match element.tag.as_str() {
            "textarea" => self.text_content(id),
            "select" => self
                .selected_option(id)
                .map(|option| self.option_value(option))
                .unwrap_or_default(),
            "option" => self.option_value(id),
            _ => self.attribute(id, "value").unwrap_or_default().to_string(),
        }
    }

    /// Type into a form control.
    pub fn set_value(&mut self, id: NodeId, value: &str) {
        if let Some(element) = self.element_mut(id) {
            element.value = Some(value.to_string());
        }
    }

    /// Restore the markup values of every control inside `form`.
    pub fn reset_form(&mut self, form: NodeId) {
        for node in self.descendants(form) {
            if let Some(element) = self.element_mut(node) {
                element.value = None;
            }
        }
    }

    fn selected_option(&self, select: NodeId) -> Option<NodeId> {
        let options: Vec<NodeId> = self
            .descendants(select)
            .into_iter()
            .filter(|&node| self.tag(node) == Some("option"))
            .collect();
        options
            .iter()
            .copied()
            .find(|&option| self.attribute(option, "selected").is_some())
            .or_else(|| options.first().copied())
    }

    fn option_value(&self, option: NodeId) -> String {
        self.attribute(option, "value")
            .map_or_else(|| self.text_content(option).trim().to_string(), str::to_string)
    }

    /// Name/value pairs `form` would submit, in document order.
    #[must_use]
    pub fn form_entries(&self, form: NodeId) -> Vec<(String, String)> {
        let mut entries = Vec::new();
        for node in self.descendants(form) {
            let Some(name) = self.attribute(node, "name").filter(|name| !name.is_empty()) else {
                continue;
            };
            if self.attribute(node, "disabled").is_some() {
                continue;
            }

            let value = match self.tag(node) {
                Some("input") => {
                    let kind = self
                        .attribute(node, "type")
                        .unwrap_or("text")
                        .to_ascii_lowercase();
                    match kind.as_str() {
                        "submit" | "button" | "reset" | "image" | "file" => continue,
                        "checkbox" | "radio" => {
                            if self.attribute(node, "checked").is_none() {
                                continue;
                            }
                            self.attribute(node, "value").unwrap_or("on").to_string()
                        }
                        _ => self.value(node),
                    }
                }
                Some("textarea" | "select") => self.value(node),
                _ => continue,
            };
            entries.push((name.to_string(), value));
        }
        entries
    }

    fn parse_into(&mut self, parent: NodeId, html: &str) -> Result<(), ParseError> {
        let mut stack = vec![parent];
        let mut rest = html;

        while !rest.is_empty() {
            let current = stack.last().copied().unwrap_or(parent);

            if let Some(after) = rest.strip_prefix("<!--") {
                let end = after.find("-->").ok_or(ParseError::Unclosed("comment"))?;
                rest = after.get(end + 3..).unwrap_or_default();
            } else if let Some(after) = rest.strip_prefix("<!") {
                let end = after.find('>').ok_or(ParseError::Unclosed("declaration"))?;
                rest = after.get(end + 1..).unwrap_or_default();
            } else if let Some(after) = rest.strip_prefix("</") {
                let end = after.find('>').ok_or(ParseError::Unclosed("end tag"))?;
                let tag = after.get(..end).unwrap_or_default().trim().to_ascii_lowercase();
                rest = after.get(end + 1..).unwrap_or_default();
                if let Some(open) = stack
                    .iter()
                    .skip(1)
                    .rposition(|&node| self.tag(node) == Some(tag.as_str()))
                {
                    stack.truncate(open + 1);
                }
            } else if starts_tag(rest) {
                let start = parse_start_tag(rest)?;
                rest = start.rest;
                let raw_text = RAW_TEXT_TAGS.contains(&start.tag.as_str());
                let void = VOID_TAGS.contains(&start.tag.as_str());
                let tag = start.tag.clone();
                let node = self.append(
                    current,
                    NodeKind::Element(ElementData {
                        tag: start.tag,
                        attrs: start.attrs,
                        value: None,
                    }),
                );

                if raw_text {
                    let close = format!("</{tag}");
                    let end = rest
                        .to_ascii_lowercase()
                        .find(&close)
                        .ok_or(ParseError::Unclosed("raw text element"))?;
                    let body = rest.get(..end).unwrap_or_default();
                    if !body.is_empty() {
                        self.append(node, NodeKind::Text(body.to_string()));
                    }
                    let after = rest.get(end..).unwrap_or_default();
                    let close_end = after.find('>').ok_or(ParseError::Unclosed("end tag"))?;
                    rest = after.get(close_end + 1..).unwrap_or_default();
                } else if !start.self_closing && !void {
                    stack.push(node);
                }
            } else {
                let end = rest
                    .char_indices()
                    .skip(1)
                    .find(|&(i, c)| c == '<' && starts_tag_or_markup(rest.get(i..).unwrap_or_default()))
                    .map_or(rest.len(), |(i, _)| i);
                let text = rest.get(..end).unwrap_or_default();
                self.append(current, NodeKind::Text(decode_entities(text)));
                rest = rest.get(end..).unwrap_or_default();
            }
        }

        Ok(())
    }
}

fn starts_tag(input: &str) -> bool {
    let mut chars = input.chars();
    chars.next() == Some('<') && chars.next().is_some_and(|c| c.is_ascii_alphabetic())
}

fn starts_tag_or_markup(input: &str) -> bool {
    starts_tag(input) || input.starts_with("</") || input.starts_with("<!")
}

struct StartTag<'a> {
    tag: String,
    attrs: Vec<(String, String)>,
    self_closing: bool,
    rest: &'a str,
}

fn parse_start_tag(input: &str) -> Result<StartTag<'_>, ParseError> {
    let mut rest = input.get(1..).unwrap_or_default();
    let name_len = rest
        .find(|c: char| c.is_ascii_whitespace() || c == '>' || c == '/')
        .unwrap_or(rest.len());
    let tag = rest.get(..name_len).unwrap_or_default().to_ascii_lowercase();
    rest = rest.get(name_len..).unwrap_or_default();
    let mut attrs: Vec<(String, String)> = Vec::new();

    loop {
        rest = rest.trim_start();
        if let Some(after) = rest.strip_prefix("/>") {
            return Ok(StartTag {
                tag,
                attrs,
                self_closing: true,
                rest: after,
            });
        }
        if let Some(after) = rest.strip_prefix('>') {
            return Ok(StartTag {
                tag,
                attrs,
                self_closing: false,
                rest: after,
            });
        }
        if rest.is_empty() {
            return Err(ParseError::Unclosed("start tag"));
        }
        if let Some(after) = rest.strip_prefix('/') {
            rest = after;
            continue;
        }

        let name_len = rest
            .find(|c: char| c.is_ascii_whitespace() || matches!(c, '=' | '>' | '/'))
            .unwrap_or(rest.len());
        let name = rest.get(..name_len).unwrap_or_default().to_ascii_lowercase();
        rest = rest.get(name_len..).unwrap_or_default().trim_start();

        let value = if let Some(after) = rest.strip_prefix('=') {
            let after = after.trim_start();
            let (raw, remaining) = if let Some(quoted) = after.strip_prefix('"') {
                let end = quoted
                    .find('"')
                    .ok_or(ParseError::Unclosed("attribute value"))?;
                (quoted.get(..end), quoted.get(end + 1..))
            } else if let Some(quoted) = after.strip_prefix('\'') {
                let end = quoted
                    .find('\'')
                    .ok_or(ParseError::Unclosed("attribute value"))?;
                (quoted.get(..end), quoted.get(end + 1..))
            } else {
                let end = after
                    .find(|c: char| c.is_ascii_whitespace() || c == '>')
                    .unwrap_or(after.len());
                (after.get(..end), after.get(end..))
            };
            rest = remaining.unwrap_or_default();
            decode_entities(raw.unwrap_or_default())
        } else {
            String::new()
        };

        // The first occurrence of an attribute wins.
        if !name.is_empty() && !attrs.iter().any(|(existing, _)| *existing == name) {
            attrs.push((name, value));
        }
    }
}

/// Decode character references (`&amp;`, `&#39;`, `&#x20AC;`, ...).
/// Unknown references are kept as written.
#[must_use]
pub fn decode_entities(src: &str) -> String {
    if !src.contains('&') {
        return src.to_string();
    }

    let mut out = String::with_capacity(src.len());
    let mut rest = src;
    while let Some(start) = rest.find('&') {
        out.push_str(rest.get(..start).unwrap_or_default());
        let candidate = rest.get(start + 1..).unwrap_or_default();
        let decoded = candidate
            .find(';')
            .filter(|&end| end <= 10)
            .and_then(|end| decode_reference(candidate.get(..end)?).map(|c| (c, end)));

        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = candidate.get(end + 1..).unwrap_or_default();
            }
            None => {
                out.push('&');
                rest = candidate;
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_reference(name: &str) -> Option<char> {
    if let Some(number) = name.strip_prefix('#') {
        let code = match number.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => number.parse().ok()?,
        };
        return char::from_u32(code);
    }

    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        "euro" => Some('€'),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_elements() {
        let dom = Dom::parse(
            r#"<!DOCTYPE html><body class="page-cart"><div id="a"><p class='x y'>Hi <b>there</b></p></div></body>"#,
        )
        .unwrap();

        let a = dom.by_id("a").unwrap();
        assert_eq!(dom.tag(a), Some("div"));
        assert_eq!(dom.text_content(a), "Hi there");
        assert_eq!(dom.by_class("y").len(), 1);
        assert!(dom.has_class(dom.by_tag("body").unwrap(), "page-cart"));
    }

    #[test]
    fn test_void_and_unquoted_attributes() {
        let dom = Dom::parse(r"<div><img src=img/a.jpg alt=A><span data-x>t</span></div>").unwrap();
        let img = dom.by_tag("img").unwrap();
        assert_eq!(dom.attribute(img, "src"), Some("img/a.jpg"));
        assert!(dom.children(img).is_empty());

        let span = dom.by_tag("span").unwrap();
        assert_eq!(dom.attribute(span, "data-x"), Some(""));
        assert_eq!(dom.parent(span), dom.parent(img));
    }

    #[test]
    fn test_entities_are_decoded() {
        let dom = Dom::parse(r#"<p title="a&quot;b">&lt;b&gt;X&lt;/b&gt; &amp; 12,50&nbsp;&#8364; &unknown;</p>"#)
            .unwrap();
        let p = dom.by_tag("p").unwrap();
        assert_eq!(dom.attribute(p, "title"), Some("a\"b"));
        assert_eq!(dom.text_content(p), "<b>X</b> & 12,50\u{a0}€ &unknown;");
    }

    #[test]
    fn test_script_body_is_raw_text() {
        let dom = Dom::parse(r#"<script id="cfg">{"a": "<b>"}</script><p>after</p>"#).unwrap();
        assert_eq!(dom.text_content(dom.by_id("cfg").unwrap()), r#"{"a": "<b>"}"#);
        assert!(dom.by_tag("b").is_none());
        assert!(dom.by_tag("p").is_some());
    }

    #[test]
    fn test_set_inner_html_detaches_old_children() {
        let mut dom = Dom::parse(r#"<div id="rows"><button class="remove">x</button></div>"#).unwrap();
        let rows = dom.by_id("rows").unwrap();
        let old = dom.by_class("remove")[0];

        dom.set_inner_html(rows, r#"<button class="remove">y</button>"#).unwrap();

        assert!(!dom.is_connected(old));
        let fresh = dom.by_class("remove");
        assert_eq!(fresh.len(), 1);
        assert_ne!(fresh[0], old);
        assert!(dom.is_connected(fresh[0]));
    }

    #[test]
    fn test_class_list_operations() {
        let mut dom = Dom::parse(r#"<ul id="nav" class="menu"></ul>"#).unwrap();
        let nav = dom.by_id("nav").unwrap();

        dom.toggle_class(nav, "open");
        assert_eq!(dom.attribute(nav, "class"), Some("menu open"));
        dom.toggle_class(nav, "open");
        assert_eq!(dom.attribute(nav, "class"), Some("menu"));
        dom.add_class(nav, "menu");
        assert_eq!(dom.classes(nav), vec!["menu".to_string()]);
    }

    #[test]
    fn test_form_entries_and_reset() {
        let mut dom = Dom::parse(
            r#"<form id="f">
                <input name="name" value="Ada">
                <input name="skip" disabled value="x">
                <input type="checkbox" name="news" checked>
                <input type="checkbox" name="terms">
                <textarea name="address">1 rue</textarea>
                <select name="delivery"><option value="std">Standard</option><option value="exp" selected>Express</option></select>
                <button type="submit">Go</button>
            </form>"#,
        )
        .unwrap();
        let form = dom.by_id("f").unwrap();
        let name = dom.by_tag("input").unwrap();

        dom.set_value(name, "Grace");
        assert_eq!(
            dom.form_entries(form),
            vec![
                ("name".to_string(), "Grace".to_string()),
                ("news".to_string(), "on".to_string()),
                ("address".to_string(), "1 rue".to_string()),
                ("delivery".to_string(), "exp".to_string()),
            ]
        );

        dom.reset_form(form);
        assert_eq!(dom.value(name), "Ada");
    }

    #[test]
    fn test_unclosed_markup_is_an_error() {
        assert_eq!(
            Dom::parse("<div").unwrap_err(),
            ParseError::Unclosed("start tag")
        );
        assert_eq!(
            Dom::parse("<!-- open").unwrap_err(),
            ParseError::Unclosed("comment")
        );
    }

    #[test]
    fn test_stray_less_than_is_text() {
        let dom = Dom::parse("<p>1 < 2</p>").unwrap();
        assert_eq!(dom.text_content(dom.by_tag("p").unwrap()), "1 < 2");
    }
}
