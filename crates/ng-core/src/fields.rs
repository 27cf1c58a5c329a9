//! Built-in field variants.

use crate::error::FieldError;
use crate::field::{Field, FieldBase, FieldControl, FieldRecord, FieldRegistry, FieldValue, Widget};
use serde_json::Value;

pub(crate) fn register_builtins(registry: &mut FieldRegistry) {
    registry.register(TextField::TYPE, |r| Ok(Box::new(TextField::from_record(r)?)));
    registry.register(IntegerField::TYPE, |r| {
        Ok(Box::new(IntegerField::from_record(r)?))
    });
    registry.register(DecimalField::TYPE, |r| {
        Ok(Box::new(DecimalField::from_record(r)?))
    });
    registry.register(CheckboxField::TYPE, |r| {
        Ok(Box::new(CheckboxField::from_record(r)?))
    });
    registry.register(ColorField::TYPE, |r| Ok(Box::new(ColorField::from_record(r)?)));
    registry.register(SelectField::TYPE, |r| {
        Ok(Box::new(SelectField::from_record(r)?))
    });
    registry.register(ButtonField::TYPE, |r| {
        Ok(Box::new(ButtonField::from_record(r)))
    });
}

/// Read a number from a JSON number or a numeric string (form inputs
/// report strings).
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn opt_number(record: &FieldRecord, name: &str, kind: &'static str) -> Result<Option<f64>, FieldError> {
    match record.get(name) {
        None => Ok(None),
        Some(v) => as_number(v).map(Some).ok_or_else(|| FieldError::Malformed {
            kind,
            reason: format!("`{name}` must be a number"),
        }),
    }
}

fn opt_string(record: &FieldRecord, name: &str) -> Option<String> {
    record.get(name).and_then(Value::as_str).map(str::to_string)
}

fn clamp_opt(v: f64, min: Option<f64>, max: Option<f64>) -> f64 {
    let v = min.map_or(v, |m| v.max(m));
    max.map_or(v, |m| v.min(m))
}

// ─── Text ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct TextField {
    pub base: FieldBase,
    pub default: String,
    pub placeholder: String,
    pub maxlength: Option<usize>,
    value: String,
}

impl TextField {
    pub const TYPE: &'static str = "text";

    pub fn new(label: &str) -> Self {
        Self {
            base: FieldBase::keyed(label),
            default: String::new(),
            placeholder: String::new(),
            maxlength: None,
            value: String::new(),
        }
    }

    pub fn with_default(mut self, default: &str) -> Self {
        self.default = default.to_string();
        self.value = self.truncate(default);
        self
    }

    pub fn from_record(record: &FieldRecord) -> Result<Self, FieldError> {
        let maxlength = opt_number(record, "maxlength", Self::TYPE)?.map(|n| n.max(0.0) as usize);
        let default = match record.initial() {
            None => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };
        let mut field = Self {
            base: FieldBase::from_record(record, true),
            default: default.clone(),
            placeholder: opt_string(record, "placeholder").unwrap_or_default(),
            maxlength,
            value: String::new(),
        };
        field.value = field.truncate(&default);
        Ok(field)
    }

    fn truncate(&self, s: &str) -> String {
        match self.maxlength {
            Some(max) => s.chars().take(max).collect(),
            None => s.to_string(),
        }
    }
}

impl Field for TextField {
    fn kind(&self) -> &'static str {
        Self::TYPE
    }

    fn base(&self) -> &FieldBase {
        &self.base
    }

    fn value(&self) -> Option<FieldValue> {
        Some(Value::String(self.value.clone()))
    }

    fn set_value(&mut self, value: &FieldValue) -> Result<(), FieldError> {
        match value {
            Value::String(s) => {
                self.value = self.truncate(s);
                Ok(())
            }
            _ => Err(self.base.invalid("a string")),
        }
    }

    fn render(&self) -> FieldControl {
        FieldControl {
            label: self.base.label.clone(),
            inline: self.base.inline,
            widget: Widget::Text {
                value: self.value.clone(),
                placeholder: self.placeholder.clone(),
                maxlength: self.maxlength,
            },
        }
    }

    fn to_record(&self) -> FieldRecord {
        let mut rec = self.base.record(Self::TYPE);
        if !self.placeholder.is_empty() {
            rec = rec.with("placeholder", self.placeholder.as_str());
        }
        if let Some(max) = self.maxlength {
            rec = rec.with("maxlength", max as u64);
        }
        rec.with("default", self.default.as_str())
            .with("value", self.value.as_str())
    }
}

// ─── Integer ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct IntegerField {
    pub base: FieldBase,
    pub default: i64,
    pub min: Option<i64>,
    pub max: Option<i64>,
    value: i64,
}

impl IntegerField {
    pub const TYPE: &'static str = "integer";

    pub fn new(label: &str) -> Self {
        Self {
            base: FieldBase::keyed(label),
            default: 0,
            min: None,
            max: None,
            value: 0,
        }
    }

    pub fn with_range(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.min = min;
        self.max = max;
        self.value = self.coerce(self.value as f64);
        self
    }

    pub fn with_default(mut self, default: i64) -> Self {
        self.default = default;
        self.value = self.coerce(default as f64);
        self
    }

    pub fn from_record(record: &FieldRecord) -> Result<Self, FieldError> {
        let min = opt_number(record, "min", Self::TYPE)?.map(|n| n.round() as i64);
        let max = opt_number(record, "max", Self::TYPE)?.map(|n| n.round() as i64);
        let default = match record.initial() {
            None => 0,
            Some(v) => as_number(v)
                .ok_or_else(|| FieldError::Malformed {
                    kind: Self::TYPE,
                    reason: "`default` must be a number".to_string(),
                })?
                .round() as i64,
        };
        let mut field = Self {
            base: FieldBase::from_record(record, true),
            default,
            min,
            max,
            value: 0,
        };
        field.value = field.coerce(default as f64);
        Ok(field)
    }

    fn coerce(&self, v: f64) -> i64 {
        clamp_opt(
            v.round(),
            self.min.map(|m| m as f64),
            self.max.map(|m| m as f64),
        ) as i64
    }
}

impl Field for IntegerField {
    fn kind(&self) -> &'static str {
        Self::TYPE
    }

    fn base(&self) -> &FieldBase {
        &self.base
    }

    fn value(&self) -> Option<FieldValue> {
        Some(Value::from(self.value))
    }

    fn set_value(&mut self, value: &FieldValue) -> Result<(), FieldError> {
        let n = as_number(value).ok_or_else(|| self.base.invalid("an integer"))?;
        self.value = self.coerce(n);
        Ok(())
    }

    fn render(&self) -> FieldControl {
        FieldControl {
            label: self.base.label.clone(),
            inline: self.base.inline,
            widget: Widget::Number {
                value: self.value as f64,
                min: self.min.map(|m| m as f64),
                max: self.max.map(|m| m as f64),
                step: Some(1.0),
            },
        }
    }

    fn to_record(&self) -> FieldRecord {
        let mut rec = self.base.record(Self::TYPE);
        if let Some(min) = self.min {
            rec = rec.with("min", min);
        }
        if let Some(max) = self.max {
            rec = rec.with("max", max);
        }
        rec.with("default", self.default).with("value", self.value)
    }
}

// ─── Decimal ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct DecimalField {
    pub base: FieldBase,
    pub default: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// `None` serializes as the absence of `step` ("any").
    pub step: Option<f64>,
    value: f64,
}

impl DecimalField {
    pub const TYPE: &'static str = "decimal";

    pub fn new(label: &str) -> Self {
        Self {
            base: FieldBase::keyed(label),
            default: 0.0,
            min: None,
            max: None,
            step: None,
            value: 0.0,
        }
    }

    pub fn with_default(mut self, default: f64) -> Self {
        self.default = default;
        self.value = clamp_opt(default, self.min, self.max);
        self
    }

    pub fn from_record(record: &FieldRecord) -> Result<Self, FieldError> {
        let min = opt_number(record, "min", Self::TYPE)?;
        let max = opt_number(record, "max", Self::TYPE)?;
        // "any" (or any non-number) means unconstrained.
        let step = record.get("step").and_then(as_number);
        let default = match record.initial() {
            None => 0.0,
            Some(v) => as_number(v).ok_or_else(|| FieldError::Malformed {
                kind: Self::TYPE,
                reason: "`default` must be a number".to_string(),
            })?,
        };
        Ok(Self {
            base: FieldBase::from_record(record, true),
            default,
            min,
            max,
            step,
            value: clamp_opt(default, min, max),
        })
    }
}

impl Field for DecimalField {
    fn kind(&self) -> &'static str {
        Self::TYPE
    }

    fn base(&self) -> &FieldBase {
        &self.base
    }

    fn value(&self) -> Option<FieldValue> {
        Some(Value::from(self.value))
    }

    fn set_value(&mut self, value: &FieldValue) -> Result<(), FieldError> {
        let n = as_number(value)
            .filter(|n| n.is_finite())
            .ok_or_else(|| self.base.invalid("a number"))?;
        self.value = clamp_opt(n, self.min, self.max);
        Ok(())
    }

    fn render(&self) -> FieldControl {
        FieldControl {
            label: self.base.label.clone(),
            inline: self.base.inline,
            widget: Widget::Number {
                value: self.value,
                min: self.min,
                max: self.max,
                step: self.step,
            },
        }
    }

    fn to_record(&self) -> FieldRecord {
        let mut rec = self.base.record(Self::TYPE);
        if let Some(min) = self.min {
            rec = rec.with("min", min);
        }
        if let Some(max) = self.max {
            rec = rec.with("max", max);
        }
        if let Some(step) = self.step {
            rec = rec.with("step", step);
        }
        rec.with("default", self.default).with("value", self.value)
    }
}

// ─── Checkbox ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct CheckboxField {
    pub base: FieldBase,
    pub default: bool,
    value: bool,
}

impl CheckboxField {
    pub const TYPE: &'static str = "checkbox";

    pub fn new(label: &str) -> Self {
        Self {
            base: FieldBase::keyed(label),
            default: false,
            value: false,
        }
    }

    pub fn with_default(mut self, default: bool) -> Self {
        self.default = default;
        self.value = default;
        self
    }

    pub fn from_record(record: &FieldRecord) -> Result<Self, FieldError> {
        let default = match record.initial() {
            None => false,
            Some(Value::Bool(b)) => *b,
            Some(_) => {
                return Err(FieldError::Malformed {
                    kind: Self::TYPE,
                    reason: "`default` must be a boolean".to_string(),
                });
            }
        };
        Ok(Self {
            base: FieldBase::from_record(record, true),
            default,
            value: default,
        })
    }
}

impl Field for CheckboxField {
    fn kind(&self) -> &'static str {
        Self::TYPE
    }

    fn base(&self) -> &FieldBase {
        &self.base
    }

    fn value(&self) -> Option<FieldValue> {
        Some(Value::Bool(self.value))
    }

    fn set_value(&mut self, value: &FieldValue) -> Result<(), FieldError> {
        self.value = value.as_bool().ok_or_else(|| self.base.invalid("a boolean"))?;
        Ok(())
    }

    fn render(&self) -> FieldControl {
        FieldControl {
            label: self.base.label.clone(),
            inline: self.base.inline,
            widget: Widget::Checkbox {
                checked: self.value,
            },
        }
    }

    fn to_record(&self) -> FieldRecord {
        self.base
            .record(Self::TYPE)
            .with("default", self.default)
            .with("value", self.value)
    }
}

// ─── Color ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ColorField {
    pub base: FieldBase,
    pub default: String,
    value: String,
}

/// `#RGB`, `#RGBA`, `#RRGGBB`, or `#RRGGBBAA`.
fn is_hex_color(s: &str) -> bool {
    s.strip_prefix('#').is_some_and(|hex| {
        matches!(hex.len(), 3 | 4 | 6 | 8) && hex.bytes().all(|b| b.is_ascii_hexdigit())
    })
}

impl ColorField {
    pub const TYPE: &'static str = "color";
    pub const DEFAULT: &'static str = "#ffffffff";

    pub fn new(label: &str) -> Self {
        Self {
            base: FieldBase::keyed(label),
            default: Self::DEFAULT.to_string(),
            value: Self::DEFAULT.to_string(),
        }
    }

    pub fn from_record(record: &FieldRecord) -> Result<Self, FieldError> {
        let default = match record.initial() {
            None => Self::DEFAULT.to_string(),
            Some(Value::String(s)) if is_hex_color(s) => s.clone(),
            Some(_) => {
                return Err(FieldError::Malformed {
                    kind: Self::TYPE,
                    reason: "`default` must be a hex color".to_string(),
                });
            }
        };
        Ok(Self {
            base: FieldBase::from_record(record, true),
            value: default.clone(),
            default,
        })
    }
}

impl Field for ColorField {
    fn kind(&self) -> &'static str {
        Self::TYPE
    }

    fn base(&self) -> &FieldBase {
        &self.base
    }

    fn value(&self) -> Option<FieldValue> {
        Some(Value::String(self.value.clone()))
    }

    fn set_value(&mut self, value: &FieldValue) -> Result<(), FieldError> {
        match value.as_str() {
            Some(s) if is_hex_color(s) => {
                self.value = s.to_string();
                Ok(())
            }
            _ => Err(self.base.invalid("a hex color")),
        }
    }

    fn render(&self) -> FieldControl {
        FieldControl {
            label: self.base.label.clone(),
            inline: self.base.inline,
            widget: Widget::Color {
                value: self.value.clone(),
            },
        }
    }

    fn to_record(&self) -> FieldRecord {
        self.base
            .record(Self::TYPE)
            .with("default", self.default.as_str())
            .with("value", self.value.as_str())
    }
}

// ─── Select ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SelectField {
    pub base: FieldBase,
    pub options: Vec<String>,
    pub default: String,
    value: String,
}

impl SelectField {
    pub const TYPE: &'static str = "select";

    pub fn new(label: &str, options: &[&str]) -> Self {
        let options: Vec<String> = options.iter().map(|s| s.to_string()).collect();
        let default = options.first().cloned().unwrap_or_default();
        Self {
            base: FieldBase::keyed(label),
            options,
            value: default.clone(),
            default,
        }
    }

    pub fn from_record(record: &FieldRecord) -> Result<Self, FieldError> {
        let options = match record.get("options") {
            None => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
            Some(_) => {
                return Err(FieldError::Malformed {
                    kind: Self::TYPE,
                    reason: "`options` must be an array".to_string(),
                });
            }
        };
        // A default outside the options falls back to the first option.
        let default = record
            .initial()
            .and_then(Value::as_str)
            .filter(|d| options.is_empty() || options.iter().any(|o| o == d))
            .map(str::to_string)
            .or_else(|| options.first().cloned())
            .unwrap_or_default();
        Ok(Self {
            base: FieldBase::from_record(record, true),
            options,
            value: default.clone(),
            default,
        })
    }
}

impl Field for SelectField {
    fn kind(&self) -> &'static str {
        Self::TYPE
    }

    fn base(&self) -> &FieldBase {
        &self.base
    }

    fn value(&self) -> Option<FieldValue> {
        Some(Value::String(self.value.clone()))
    }

    fn set_value(&mut self, value: &FieldValue) -> Result<(), FieldError> {
        match value.as_str() {
            Some(s) if self.options.is_empty() || self.options.iter().any(|o| o == s) => {
                self.value = s.to_string();
                Ok(())
            }
            _ => Err(self.base.invalid("one of the select options")),
        }
    }

    fn render(&self) -> FieldControl {
        FieldControl {
            label: self.base.label.clone(),
            inline: self.base.inline,
            widget: Widget::Select {
                options: self.options.clone(),
                value: self.value.clone(),
            },
        }
    }

    fn to_record(&self) -> FieldRecord {
        self.base
            .record(Self::TYPE)
            .with("options", self.options.clone())
            .with("default", self.default.as_str())
            .with("value", self.value.as_str())
    }
}

// ─── Button ──────────────────────────────────────────────────────────────

/// A clickable control with no value. Never appears in a node's data map.
#[derive(Debug, Clone)]
pub struct ButtonField {
    pub base: FieldBase,
    /// Host action name; not serialized.
    pub on_click: Option<String>,
}

impl ButtonField {
    pub const TYPE: &'static str = "button";

    pub fn new(label: &str) -> Self {
        Self {
            base: FieldBase::unkeyed(label),
            on_click: None,
        }
    }

    pub fn with_action(mut self, action: &str) -> Self {
        self.on_click = Some(action.to_string());
        self
    }

    pub fn from_record(record: &FieldRecord) -> Self {
        Self {
            base: FieldBase::from_record(record, false),
            on_click: None,
        }
    }
}

impl Field for ButtonField {
    fn kind(&self) -> &'static str {
        Self::TYPE
    }

    fn base(&self) -> &FieldBase {
        &self.base
    }

    fn value(&self) -> Option<FieldValue> {
        None
    }

    fn set_value(&mut self, _value: &FieldValue) -> Result<(), FieldError> {
        Ok(())
    }

    fn render(&self) -> FieldControl {
        FieldControl {
            label: String::new(),
            inline: self.base.inline,
            widget: Widget::Button {
                label: self.base.label.clone(),
            },
        }
    }

    fn to_record(&self) -> FieldRecord {
        self.base.record(Self::TYPE)
    }

    fn action(&self) -> Option<&str> {
        self.on_click.as_deref()
    }
}
