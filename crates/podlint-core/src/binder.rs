//! Binding of a markup tree onto typed configuration nodes.
//!
//! Binding happens in two steps. [`bind_element`] checks a [`MarkupElement`]
//! against an [`ElementSchema`] and converts every attribute to its declared
//! [`FieldKind`], producing a [`BoundElement`]. A [`FromBound`] impl then maps
//! the bound element one-to-one onto a typed node.
//!
//! Sections may appear at most once per parent; a second occurrence is a
//! [`BindError::DuplicateElement`] at its own position.
//!
//! Errors carry the offending node's position only when the markup node
//! retained one. A missing child has no node to point at and never carries a
//! position; callers fall back to `(0, 0)` in that case.

use crate::markup::MarkupElement;
use crate::schema::{ElementSchema, FieldKind};
use crate::types::{Severity, TextPosition};
use std::collections::BTreeMap;

/// Schema mismatch found while binding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    /// The document element has the wrong name.
    #[error("expected root element <{expected}>, found <{found}>")]
    UnexpectedRoot {
        /// Expected root name.
        expected: &'static str,
        /// Name found in the document.
        found: String,
        /// Position of the root element.
        position: Option<TextPosition>,
    },

    /// A child element is not declared for its parent.
    #[error("unknown element <{element}> inside <{parent}>")]
    UnknownElement {
        /// Parent element name.
        parent: &'static str,
        /// Offending element name.
        element: String,
        /// Position of the offending element.
        position: Option<TextPosition>,
    },

    /// A single-occurrence element appears again under the same parent.
    #[error("duplicate element <{element}> inside <{parent}>")]
    DuplicateElement {
        /// Parent element name.
        parent: &'static str,
        /// Repeated element name.
        element: &'static str,
        /// Position of the repeated occurrence.
        position: Option<TextPosition>,
    },

    /// An attribute is not declared for its element.
    #[error("unknown attribute `{attribute}` on <{element}>")]
    UnknownAttribute {
        /// Element name.
        element: &'static str,
        /// Offending attribute name.
        attribute: String,
        /// Position of the element carrying the attribute.
        position: Option<TextPosition>,
    },

    /// An attribute value does not convert to its declared kind.
    #[error("attribute `{attribute}` on <{element}> expects {expected}, found \"{value}\"")]
    InvalidValue {
        /// Element name.
        element: &'static str,
        /// Attribute name.
        attribute: &'static str,
        /// Literal value found in markup.
        value: String,
        /// Declared kind.
        expected: FieldKind,
        /// Position of the element carrying the attribute.
        position: Option<TextPosition>,
    },

    /// A required attribute is absent.
    #[error("<{element}> is missing required attribute `{attribute}`")]
    MissingAttribute {
        /// Element name.
        element: &'static str,
        /// Missing attribute name.
        attribute: &'static str,
        /// Position of the element.
        position: Option<TextPosition>,
    },

    /// A required child element is absent.
    #[error("<{element}> is missing required child <{child}>")]
    MissingChild {
        /// Parent element name.
        element: &'static str,
        /// Missing child name.
        child: &'static str,
    },
}

impl BindError {
    /// Position of the offending node, when one was retained.
    #[must_use]
    pub fn position(&self) -> Option<TextPosition> {
        match self {
            Self::UnexpectedRoot { position, .. }
            | Self::UnknownElement { position, .. }
            | Self::DuplicateElement { position, .. }
            | Self::UnknownAttribute { position, .. }
            | Self::InvalidValue { position, .. }
            | Self::MissingAttribute { position, .. } => *position,
            Self::MissingChild { .. } => None,
        }
    }
}

/// An attribute value converted to its declared kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundValue {
    /// [`FieldKind::Text`]
    Text(String),
    /// [`FieldKind::Integer`]
    Integer(i64),
    /// [`FieldKind::Boolean`]
    Boolean(bool),
    /// [`FieldKind::Severity`]
    Severity(Severity),
}

/// A markup element that passed schema checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundElement {
    /// Schema name of the element.
    pub name: &'static str,
    /// Converted attribute values keyed by schema attribute name.
    pub values: BTreeMap<&'static str, BoundValue>,
    /// Bound children in document order.
    pub children: Vec<BoundElement>,
    /// Position of the source markup node.
    pub position: Option<TextPosition>,
}

impl BoundElement {
    /// Returns a text attribute.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(BoundValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Returns an integer attribute.
    #[must_use]
    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(BoundValue::Integer(n)) => Some(*n),
            _ => None,
        }
    }

    /// Returns a boolean attribute.
    #[must_use]
    pub fn boolean(&self, name: &str) -> Option<bool> {
        match self.values.get(name) {
            Some(BoundValue::Boolean(b)) => Some(*b),
            _ => None,
        }
    }

    /// Returns a severity attribute.
    #[must_use]
    pub fn severity(&self, name: &str) -> Option<Severity> {
        match self.values.get(name) {
            Some(BoundValue::Severity(s)) => Some(*s),
            _ => None,
        }
    }

    /// Iterates over children with the given name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a BoundElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Returns the first child with the given name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&BoundElement> {
        self.children.iter().find(|c| c.name == name)
    }
}

/// A typed node built from a bound element.
pub trait FromBound: Sized {
    /// Schema the node is bound against.
    fn schema() -> &'static ElementSchema;

    /// Maps a bound element onto the typed node.
    ///
    /// The element has already been checked against [`Self::schema`], so
    /// this conversion is infallible.
    fn from_bound(element: &BoundElement) -> Self;
}

/// Binds a document element as a typed root node.
///
/// # Errors
///
/// Returns the first [`BindError`] in document order.
pub fn bind<T: FromBound>(root: &MarkupElement) -> Result<T, BindError> {
    let bound = bind_element(root, T::schema())?;
    Ok(T::from_bound(&bound))
}

/// Checks a document element against `schema` and converts its values.
///
/// # Errors
///
/// Returns the first [`BindError`] in document order.
pub fn bind_element(
    root: &MarkupElement,
    schema: &'static ElementSchema,
) -> Result<BoundElement, BindError> {
    if root.name != schema.name {
        return Err(BindError::UnexpectedRoot {
            expected: schema.name,
            found: root.name.clone(),
            position: root.position,
        });
    }
    bind_node(root, schema)
}

fn bind_node(
    element: &MarkupElement,
    schema: &'static ElementSchema,
) -> Result<BoundElement, BindError> {
    let mut values = BTreeMap::new();

    for attr in &element.attributes {
        let Some(decl) = schema.attribute(&attr.name) else {
            return Err(BindError::UnknownAttribute {
                element: schema.name,
                attribute: attr.name.clone(),
                position: element.position,
            });
        };
        let value = convert(&attr.value, decl.kind).ok_or_else(|| BindError::InvalidValue {
            element: schema.name,
            attribute: decl.name,
            value: attr.value.clone(),
            expected: decl.kind,
            position: element.position,
        })?;
        values.insert(decl.name, value);
    }

    if let Some(missing) = schema
        .attributes
        .iter()
        .find(|decl| decl.required && !values.contains_key(decl.name))
    {
        return Err(BindError::MissingAttribute {
            element: schema.name,
            attribute: missing.name,
            position: element.position,
        });
    }

    let mut children: Vec<BoundElement> = Vec::with_capacity(element.children.len());
    for child in &element.children {
        let Some(child_schema) = schema.child(&child.name) else {
            return Err(BindError::UnknownElement {
                parent: schema.name,
                element: child.name.clone(),
                position: child.position,
            });
        };
        if !child_schema.repeatable && children.iter().any(|c| c.name == child_schema.name) {
            return Err(BindError::DuplicateElement {
                parent: schema.name,
                element: child_schema.name,
                position: child.position,
            });
        }
        children.push(bind_node(child, child_schema)?);
    }

    if let Some(missing) = schema
        .required_children
        .iter()
        .find(|name| !children.iter().any(|c| c.name == **name))
    {
        return Err(BindError::MissingChild {
            element: schema.name,
            child: *missing,
        });
    }

    Ok(BoundElement {
        name: schema.name,
        values,
        children,
        position: element.position,
    })
}

fn convert(raw: &str, kind: FieldKind) -> Option<BoundValue> {
    match kind {
        FieldKind::Text => Some(BoundValue::Text(raw.to_string())),
        FieldKind::Integer => raw.trim().parse().ok().map(BoundValue::Integer),
        FieldKind::Boolean => match raw.trim() {
            "true" => Some(BoundValue::Boolean(true)),
            "false" => Some(BoundValue::Boolean(false)),
            _ => None,
        },
        FieldKind::Severity => Severity::parse(raw.trim()).map(BoundValue::Severity),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::MarkupParser;
    use crate::schema::{AttributeSchema, CONFIG};

    static SECTION: ElementSchema = ElementSchema {
        name: "Section",
        attributes: &[AttributeSchema::optional("id", FieldKind::Text)],
        children: &[],
        required_children: &[],
        repeatable: true,
    };

    static STRICT_ROOT: ElementSchema = ElementSchema {
        name: "root",
        attributes: &[],
        children: &[&SECTION],
        required_children: &["Section"],
        repeatable: false,
    };

    fn bind_text(text: &str) -> Result<BoundElement, BindError> {
        bind_element(&MarkupParser::parse(text).unwrap(), &CONFIG)
    }

    #[test]
    fn binds_values_by_kind() {
        let bound = bind_text(
            r#"<config failOn="warning">
  <Analyzer parallelism="4"><Exclude pattern="**/gen/**"/></Analyzer>
  <UnusedFunction enabled="false"/>
</config>"#,
        )
        .unwrap();

        assert_eq!(bound.severity("failOn"), Some(Severity::Warning));
        let analyzer = bound.child("Analyzer").unwrap();
        assert_eq!(analyzer.integer("parallelism"), Some(4));
        assert_eq!(
            analyzer.child("Exclude").and_then(|e| e.text("pattern")),
            Some("**/gen/**")
        );
        assert_eq!(
            bound.child("UnusedFunction").and_then(|u| u.boolean("enabled")),
            Some(false)
        );
    }

    #[test]
    fn wrong_root_is_positioned() {
        let err = bind_text("<settings/>").unwrap_err();
        assert!(matches!(err, BindError::UnexpectedRoot { .. }));
        assert_eq!(err.position(), Some(TextPosition::new(1, 1)));
    }

    #[test]
    fn unknown_element_points_at_the_element() {
        let err = bind_text("<config>\n  <Bogus/>\n</config>").unwrap_err();
        assert_eq!(
            err,
            BindError::UnknownElement {
                parent: "config",
                element: "Bogus".to_string(),
                position: Some(TextPosition::new(2, 3)),
            }
        );
    }

    #[test]
    fn unknown_attribute() {
        let err = bind_text(r#"<config><LongLine max="3"/></config>"#).unwrap_err();
        assert!(matches!(
            err,
            BindError::UnknownAttribute { ref attribute, .. } if attribute == "max"
        ));
    }

    #[test]
    fn invalid_integer_names_attribute_and_literal() {
        let err = bind_text(r#"<config><Analyzer parallelism="lots"/></config>"#).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("parallelism"));
        assert!(message.contains("\"lots\""));
        assert!(message.contains("an integer"));
        assert_eq!(err.position(), Some(TextPosition::new(1, 9)));
    }

    #[test]
    fn invalid_boolean_and_severity() {
        assert!(matches!(
            bind_text(r#"<config><LongLine enabled="yes"/></config>"#),
            Err(BindError::InvalidValue {
                expected: FieldKind::Boolean,
                ..
            })
        ));
        assert!(matches!(
            bind_text(r#"<config failOn="info"/>"#),
            Err(BindError::InvalidValue {
                expected: FieldKind::Severity,
                ..
            })
        ));
    }

    #[test]
    fn missing_required_attribute() {
        let err = bind_text("<config><UnusedFunction><Exclude/></UnusedFunction></config>")
            .unwrap_err();
        assert!(matches!(
            err,
            BindError::MissingAttribute {
                attribute: "name",
                ..
            }
        ));
        assert!(err.position().is_some());
    }

    #[test]
    fn missing_child_has_no_position() {
        let root = MarkupParser::parse("<root/>").unwrap();
        let err = bind_element(&root, &STRICT_ROOT).unwrap_err();
        assert_eq!(
            err,
            BindError::MissingChild {
                element: "root",
                child: "Section",
            }
        );
        assert_eq!(err.position(), None);

        let ok = MarkupParser::parse(r#"<root><Section id="a"/></root>"#).unwrap();
        assert!(bind_element(&ok, &STRICT_ROOT).is_ok());
    }

    #[test]
    fn unpositioned_nodes_produce_unpositioned_errors() {
        let root = MarkupElement::new("config").with_child(MarkupElement::new("Nope"));
        let err = bind_element(&root, &CONFIG).unwrap_err();
        assert_eq!(err.position(), None);
    }

    #[test]
    fn repeated_section_points_at_second_occurrence() {
        let err = bind_text(
            "<config>\n  <LongLine maxLineLength=\"80\"/>\n  <LongLine maxLineLength=\"b\"/>\n</config>",
        )
        .unwrap_err();
        assert_eq!(
            err,
            BindError::DuplicateElement {
                parent: "config",
                element: "LongLine",
                position: Some(TextPosition::new(3, 3)),
            }
        );
    }

    #[test]
    fn repeatable_children_bind_every_occurrence() {
        let bound = bind_text(
            r#"<config><Analyzer><Exclude pattern="a"/><Exclude pattern="b"/></Analyzer></config>"#,
        )
        .unwrap();
        let analyzer = bound.child("Analyzer").unwrap();
        assert_eq!(analyzer.children_named("Exclude").count(), 2);
    }

    #[test]
    fn errors_inside_first_occurrence_come_before_the_duplicate() {
        let err = bind_text(r#"<config><UnusedFunction enabled="x"/><UnusedFunction/></config>"#)
            .unwrap_err();
        assert!(matches!(err, BindError::InvalidValue { .. }));
    }

    #[test]
    fn first_error_in_document_order_wins() {
        let err = bind_text(r#"<config><A/><LongLine enabled="x"/></config>"#).unwrap_err();
        assert!(matches!(err, BindError::UnknownElement { .. }));
    }
}
