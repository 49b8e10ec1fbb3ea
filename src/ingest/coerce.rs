//! Field coercion - raw CSV text to typed SQL values
//!
//! Coercion is decided by column name, not by inspecting the value or the
//! declared schema. Fields that fail to parse are replaced by the fallback
//! configured for their kind.

use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

/// Columns parsed as integers
pub const INTEGER_FIELDS: &[&str] = &["id", "customer_id", "product_id", "order_id", "quantity", "stock"];

/// Columns parsed as floating point
pub const DECIMAL_FIELDS: &[&str] = &["price", "unit_price", "total_amount", "amount"];

/// How a column is coerced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Decimal,
    Text,
}

impl FieldKind {
    pub fn for_column(name: &str) -> Self {
        if INTEGER_FIELDS.contains(&name) {
            FieldKind::Integer
        } else if DECIMAL_FIELDS.contains(&name) {
            FieldKind::Decimal
        } else {
            FieldKind::Text
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Integer => "integer",
            FieldKind::Decimal => "decimal",
            FieldKind::Text => "text",
        }
    }
}

/// Value stored when a numeric field fails to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fallback {
    Null,
    Zero,
}

impl Fallback {
    fn value(&self, kind: FieldKind) -> Value {
        match (self, kind) {
            (Fallback::Null, _) => Value::Null,
            (Fallback::Zero, FieldKind::Decimal) => Value::Real(0.0),
            (Fallback::Zero, _) => Value::Integer(0),
        }
    }
}

impl std::fmt::Display for Fallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Fallback::Null => write!(f, "null"),
            Fallback::Zero => write!(f, "zero"),
        }
    }
}

/// Per-kind fallback policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoercionPolicy {
    pub integer_fallback: Fallback,
    pub decimal_fallback: Fallback,
}

impl Default for CoercionPolicy {
    /// Integers fall back to NULL and decimals to zero
    fn default() -> Self {
        Self {
            integer_fallback: Fallback::Null,
            decimal_fallback: Fallback::Zero,
        }
    }
}

impl CoercionPolicy {
    pub fn fallback_for(&self, kind: FieldKind) -> Fallback {
        match kind {
            FieldKind::Decimal => self.decimal_fallback,
            _ => self.integer_fallback,
        }
    }
}

/// Result of coercing one field
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced {
    Parsed(Value),
    /// The raw text did not parse; carries the substituted value
    Substituted(Value),
}

impl Coerced {
    pub fn into_value(self) -> Value {
        match self {
            Coerced::Parsed(v) | Coerced::Substituted(v) => v,
        }
    }

    pub fn is_substituted(&self) -> bool {
        matches!(self, Coerced::Substituted(_))
    }
}

/// Coerce a raw field according to its kind
pub fn coerce_field(kind: FieldKind, raw: &str, policy: &CoercionPolicy) -> Coerced {
    match kind {
        FieldKind::Text => Coerced::Parsed(Value::Text(raw.to_string())),
        FieldKind::Integer => match raw.trim().parse::<i64>() {
            Ok(n) => Coerced::Parsed(Value::Integer(n)),
            Err(_) => Coerced::Substituted(policy.integer_fallback.value(kind)),
        },
        FieldKind::Decimal => match raw.trim().parse::<f64>() {
            Ok(n) => Coerced::Parsed(Value::Real(n)),
            Err(_) => Coerced::Substituted(policy.decimal_fallback.value(kind)),
        },
    }
}
