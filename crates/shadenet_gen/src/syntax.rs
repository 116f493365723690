// SPDX-License-Identifier: MIT OR Apache-2.0
//! Target-language syntax tables used during emission.

use shadenet_graph::{Value, ValueType};

/// Per-target formatting rules for types, literals, and built-in inputs
///
/// Backends implement this instead of overriding the traversal driver;
/// all target quirks that matter during node emission live here.
pub(crate) trait Syntax {
    /// Name of a value type in the target language
    fn type_name(&self, ty: ValueType) -> &'static str;

    /// Decimal digits for float literals
    fn float_digits(&self) -> usize;

    /// Expression reading a geometric source category, if the target has one
    fn geometric_expr(&self, category: &str) -> Option<&'static str>;

    /// Format a float literal
    fn float(&self, v: f32) -> String {
        format!("{v:.prec$}", prec = self.float_digits())
    }

    /// Format a literal value
    fn literal(&self, value: &Value) -> String {
        match value {
            Value::Boolean(v) => v.to_string(),
            Value::Integer(v) => v.to_string(),
            Value::Float(v) => self.float(*v),
            Value::String(v) => format!("\"{v}\""),
            Value::Vector2(_)
            | Value::Vector3(_)
            | Value::Vector4(_)
            | Value::Color3(_)
            | Value::Color4(_) => {
                let components = value.numeric_components().unwrap_or_default();
                let list = components
                    .iter()
                    .map(|c| self.float(*c))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{}({})", self.type_name(value.value_type()), list)
            }
        }
    }

    /// Wrap an expression in a constructor cast to the given type
    fn cast(&self, ty: ValueType, expr: &str) -> String {
        format!("{}({})", self.type_name(ty), expr)
    }
}

/// Adapt an expression of one type to an input of another
///
/// Assumes the pair already passed the coercion rules; identical target
/// type names pass through unchanged, everything else gets an explicit
/// constructor so no conversion is silent in the emitted source.
pub(crate) fn coerce(syntax: &dyn Syntax, expr: String, from: ValueType, to: ValueType) -> String {
    if from == to || syntax.type_name(from) == syntax.type_name(to) {
        expr
    } else {
        syntax.cast(to, &expr)
    }
}
