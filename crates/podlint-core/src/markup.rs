//! Markup parsing: raw configuration text into a generic element tree.
//!
//! The tree is owned and detached from the parser so it can outlive the
//! source text and be built by hand in tests. Nodes produced by
//! [`MarkupParser::parse`] always carry their position; nodes built with
//! [`MarkupElement::new`] do not.

use crate::types::TextPosition;

/// A single `name="value"` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupAttribute {
    /// Attribute name (local part, no namespace).
    pub name: String,
    /// Unescaped attribute value.
    pub value: String,
}

/// A markup element with its attributes and child elements.
///
/// Text and comment nodes are not retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupElement {
    /// Tag name (local part, no namespace).
    pub name: String,
    /// Attributes in document order.
    pub attributes: Vec<MarkupAttribute>,
    /// Child elements in document order.
    pub children: Vec<MarkupElement>,
    /// Position of the opening tag, if the parser retained it.
    pub position: Option<TextPosition>,
}

impl MarkupElement {
    /// Creates an element with no attributes, children or position.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            position: None,
        }
    }

    /// Adds an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(MarkupAttribute {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Adds a child element.
    #[must_use]
    pub fn with_child(mut self, child: MarkupElement) -> Self {
        self.children.push(child);
        self
    }

    /// Sets the position of this element.
    #[must_use]
    pub fn at(mut self, position: TextPosition) -> Self {
        self.position = Some(position);
        self
    }

    /// Looks up an attribute value by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }
}

/// The document could not be read or is not well-formed markup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    /// Line reported by the parser (1-indexed).
    pub line: usize,
    /// Column reported by the parser (1-indexed).
    pub column: usize,
    /// Parser message.
    pub message: String,
}

impl ParseError {
    /// Returns the reported position.
    #[must_use]
    pub fn position(&self) -> TextPosition {
        TextPosition::new(self.line, self.column)
    }
}

/// Parses configuration markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupParser;

impl MarkupParser {
    /// Parses `text` into an element tree rooted at the document element.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] at the parser's reported position if the
    /// text is not well-formed. Empty text is malformed; callers that treat
    /// empty documents as "use defaults" must check before calling.
    pub fn parse(text: &str) -> Result<MarkupElement, ParseError> {
        let doc = roxmltree::Document::parse(text).map_err(|e| {
            let pos = e.pos();
            ParseError {
                line: pos.row as usize,
                column: pos.col as usize,
                message: e.to_string(),
            }
        })?;

        Ok(convert(doc.root_element()))
    }
}

fn convert(node: roxmltree::Node<'_, '_>) -> MarkupElement {
    let pos = node.document().text_pos_at(node.range().start);

    MarkupElement {
        name: node.tag_name().name().to_string(),
        attributes: node
            .attributes()
            .map(|a| MarkupAttribute {
                name: a.name().to_string(),
                value: a.value().to_string(),
            })
            .collect(),
        children: node
            .children()
            .filter(roxmltree::Node::is_element)
            .map(convert)
            .collect(),
        position: Some(TextPosition::new(pos.row as usize, pos.col as usize)),
    }
}
