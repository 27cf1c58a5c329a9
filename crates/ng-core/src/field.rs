//! Node fields: typed, serializable data-entry units attached to a node.
//!
//! Every field implements [`Field`]. Deserialization goes through a
//! [`FieldRegistry`] that maps the serialized `type` tag to a constructor.
//! The registry is an explicit value handed to whoever deserializes; there
//! is no ambient global table.

use crate::error::FieldError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// Current value of a field. Buttons have none.
pub type FieldValue = Value;

// ─── Record ──────────────────────────────────────────────────────────────

/// Serialized field definition:
/// `{ type, label, key?, inline, default?, ...type-specific }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRecord {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default)]
    pub inline: bool,
    /// Type-specific options (`default`, `min`, `options`, `placeholder`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FieldRecord {
    pub fn new(kind: &str, label: &str) -> Self {
        Self {
            kind: kind.to_string(),
            label: label.to_string(),
            key: None,
            inline: false,
            extra: Map::new(),
        }
    }

    pub fn with_key(mut self, key: &str) -> Self {
        self.key = Some(key.to_string());
        self
    }

    pub fn inline(mut self) -> Self {
        self.inline = true;
        self
    }

    /// Set a type-specific option.
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(name.to_string(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.extra.get(name).filter(|v| !v.is_null())
    }

    /// The initial value: `default`, falling back to `value`.
    pub fn initial(&self) -> Option<&Value> {
        self.get("default").or_else(|| self.get("value"))
    }
}

// ─── Shared base ─────────────────────────────────────────────────────────

/// Label, key, and layout flag common to every field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldBase {
    pub label: String,
    pub key: Option<String>,
    pub inline: bool,
}

impl FieldBase {
    /// A keyed base; the key is derived from the label.
    pub fn keyed(label: &str) -> Self {
        Self {
            label: label.to_string(),
            key: Some(derive_key(label)),
            inline: false,
        }
    }

    /// A base that never carries a key (buttons).
    pub fn unkeyed(label: &str) -> Self {
        Self {
            label: label.to_string(),
            key: None,
            inline: false,
        }
    }

    pub fn from_record(record: &FieldRecord, keyed: bool) -> Self {
        let key = if keyed {
            Some(record.key.clone().unwrap_or_else(|| derive_key(&record.label)))
        } else {
            None
        };
        Self {
            label: record.label.clone(),
            key,
            inline: record.inline,
        }
    }

    /// Start a record for `kind` carrying this base.
    pub fn record(&self, kind: &str) -> FieldRecord {
        FieldRecord {
            kind: kind.to_string(),
            label: self.label.clone(),
            key: self.key.clone(),
            inline: self.inline,
            extra: Map::new(),
        }
    }

    pub fn invalid(&self, expected: &'static str) -> FieldError {
        FieldError::InvalidValue {
            key: self.key.clone().unwrap_or_else(|| self.label.clone()),
            expected,
        }
    }
}

/// Default key for a label: lower-cased, whitespace runs replaced by `_`.
pub fn derive_key(label: &str) -> String {
    let mut key = String::with_capacity(label.len());
    let mut in_space = false;
    for ch in label.chars() {
        if ch.is_whitespace() {
            if !in_space {
                key.push('_');
            }
            in_space = true;
        } else {
            key.extend(ch.to_lowercase());
            in_space = false;
        }
    }
    key
}

// ─── Rendered control ────────────────────────────────────────────────────

/// What a field looks like on screen: a row with an optional label and
/// one control.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldControl {
    pub label: String,
    pub inline: bool,
    pub widget: Widget,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Widget {
    Text {
        value: String,
        placeholder: String,
        maxlength: Option<usize>,
    },
    Number {
        value: f64,
        min: Option<f64>,
        max: Option<f64>,
        /// `None` means any step.
        step: Option<f64>,
    },
    Checkbox {
        checked: bool,
    },
    Color {
        value: String,
    },
    Select {
        options: Vec<String>,
        value: String,
    },
    Button {
        label: String,
    },
}

impl Widget {
    /// Short text shown inside the control by a canvas renderer.
    pub fn display_text(&self) -> String {
        match self {
            Widget::Text {
                value, placeholder, ..
            } => {
                if value.is_empty() {
                    placeholder.clone()
                } else {
                    value.clone()
                }
            }
            Widget::Number { value, .. } => value.to_string(),
            Widget::Checkbox { checked } => (if *checked { "[x]" } else { "[ ]" }).to_string(),
            Widget::Color { value } => value.clone(),
            Widget::Select { value, .. } => format!("{value} ▾"),
            Widget::Button { label } => label.clone(),
        }
    }
}

// ─── Trait ───────────────────────────────────────────────────────────────

/// The capability set every field variant provides.
pub trait Field: fmt::Debug {
    /// Serialized `type` tag.
    fn kind(&self) -> &'static str;

    fn base(&self) -> &FieldBase;

    fn label(&self) -> &str {
        &self.base().label
    }

    /// Key in the owning node's data map. `None` for value-less fields.
    fn key(&self) -> Option<&str> {
        self.base().key.as_deref()
    }

    fn inline(&self) -> bool {
        self.base().inline
    }

    fn value(&self) -> Option<FieldValue>;

    fn set_value(&mut self, value: &FieldValue) -> Result<(), FieldError>;

    fn render(&self) -> FieldControl;

    fn to_record(&self) -> FieldRecord;

    /// Host-defined action fired when the field is clicked.
    fn action(&self) -> Option<&str> {
        None
    }
}

// ─── Registry ────────────────────────────────────────────────────────────

pub type FieldCtor = fn(&FieldRecord) -> Result<Box<dyn Field>, FieldError>;

/// Maps a serialized `type` tag to the constructor of its field variant.
#[derive(Clone, Default)]
pub struct FieldRegistry {
    ctors: HashMap<String, FieldCtor>,
}

impl FieldRegistry {
    /// An empty registry. Most callers want [`FieldRegistry::with_builtins`].
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding text, integer, decimal, checkbox, color, select,
    /// and button.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::fields::register_builtins(&mut registry);
        registry
    }

    /// Register (or replace) the constructor for `tag`.
    pub fn register(&mut self, tag: &str, ctor: FieldCtor) {
        self.ctors.insert(tag.to_string(), ctor);
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.ctors.contains_key(tag)
    }

    /// Construct a field from its record.
    ///
    /// # Errors
    /// `FieldError::UnknownType` if the tag was never registered, or the
    /// variant's own validation error.
    pub fn build(&self, record: &FieldRecord) -> Result<Box<dyn Field>, FieldError> {
        let ctor = self
            .ctors
            .get(&record.kind)
            .ok_or_else(|| FieldError::UnknownType(record.kind.clone()))?;
        ctor(record)
    }

    pub fn build_all(&self, records: &[FieldRecord]) -> Result<Vec<Box<dyn Field>>, FieldError> {
        records.iter().map(|r| self.build(r)).collect()
    }
}

impl fmt::Debug for FieldRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&str> = self.ctors.keys().map(String::as_str).collect();
        tags.sort_unstable();
        f.debug_struct("FieldRegistry").field("types", &tags).finish()
    }
}
