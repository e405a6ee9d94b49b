//! Declarative element/attribute schema for configuration documents.
//!
//! A schema names, for every element, which attributes it accepts (and the
//! kind each value converts to) and which child elements may appear below it.
//! The [`binder`](crate::binder) walks a markup tree against a schema; the
//! typed nodes in [`config`](crate::config) each point at their schema entry.

use std::fmt;

/// Declared type of an attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Kept verbatim.
    Text,
    /// Signed 64-bit integer.
    Integer,
    /// `true` or `false`.
    Boolean,
    /// `error` or `warning`.
    Severity,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Integer => write!(f, "an integer"),
            Self::Boolean => write!(f, "a boolean (true, false)"),
            Self::Severity => write!(f, "a severity (error, warning)"),
        }
    }
}

/// Schema entry for one attribute.
#[derive(Debug, Clone, Copy)]
pub struct AttributeSchema {
    /// Attribute name as written in markup.
    pub name: &'static str,
    /// Value kind the attribute converts to.
    pub kind: FieldKind,
    /// Whether binding fails when the attribute is absent.
    pub required: bool,
}

impl AttributeSchema {
    /// An optional attribute.
    #[must_use]
    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }

    /// A required attribute.
    #[must_use]
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }
}

/// Schema entry for one element.
#[derive(Debug)]
pub struct ElementSchema {
    /// Tag name as written in markup.
    pub name: &'static str,
    /// Accepted attributes.
    pub attributes: &'static [AttributeSchema],
    /// Accepted child elements.
    pub children: &'static [&'static ElementSchema],
    /// Names of children that must appear at least once.
    pub required_children: &'static [&'static str],
    /// Whether the element may appear more than once under its parent.
    pub repeatable: bool,
}

impl ElementSchema {
    /// Looks up an accepted attribute.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeSchema> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Looks up an accepted child element.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&'static ElementSchema> {
        self.children.iter().copied().find(|c| c.name == name)
    }
}

const RULE_ATTRIBUTES: [AttributeSchema; 2] = [
    AttributeSchema::optional("enabled", FieldKind::Boolean),
    AttributeSchema::optional("severity", FieldKind::Severity),
];

/// `<Analyzer><Exclude pattern="..."/></Analyzer>`
pub static ANALYZER_EXCLUDE: ElementSchema = ElementSchema {
    name: "Exclude",
    attributes: &[AttributeSchema::required("pattern", FieldKind::Text)],
    children: &[],
    required_children: &[],
    repeatable: true,
};

/// `<Analyzer parallelism="4">`
pub static ANALYZER: ElementSchema = ElementSchema {
    name: "Analyzer",
    attributes: &[AttributeSchema::optional("parallelism", FieldKind::Integer)],
    children: &[&ANALYZER_EXCLUDE],
    required_children: &[],
    repeatable: false,
};

/// `<LongLine maxLineLength="120" tabWidth="4"/>`
///
/// Both bounds are kept as text; the validator reports unparsable values
/// with their position instead of failing the whole load.
pub static LONG_LINE: ElementSchema = ElementSchema {
    name: "LongLine",
    attributes: &[
        RULE_ATTRIBUTES[0],
        RULE_ATTRIBUTES[1],
        AttributeSchema::optional("maxLineLength", FieldKind::Text),
        AttributeSchema::optional("tabWidth", FieldKind::Text),
    ],
    children: &[],
    required_children: &[],
    repeatable: false,
};

/// `<UnusedFunction><Exclude name="main"/></UnusedFunction>`
pub static UNUSED_FUNCTION_EXCLUDE: ElementSchema = ElementSchema {
    name: "Exclude",
    attributes: &[AttributeSchema::required("name", FieldKind::Text)],
    children: &[],
    required_children: &[],
    repeatable: true,
};

/// `<UnusedFunction includePublic="false">`
pub static UNUSED_FUNCTION: ElementSchema = ElementSchema {
    name: "UnusedFunction",
    attributes: &[
        RULE_ATTRIBUTES[0],
        RULE_ATTRIBUTES[1],
        AttributeSchema::optional("includePublic", FieldKind::Boolean),
    ],
    children: &[&UNUSED_FUNCTION_EXCLUDE],
    required_children: &[],
    repeatable: false,
};

/// Root `<config failOn="error">` element.
pub static CONFIG: ElementSchema = ElementSchema {
    name: "config",
    attributes: &[AttributeSchema::optional("failOn", FieldKind::Severity)],
    children: &[&ANALYZER, &LONG_LINE, &UNUSED_FUNCTION],
    required_children: &[],
    repeatable: false,
};
