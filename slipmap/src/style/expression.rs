//! Filter expressions and zoom-interpolated stop functions.
//!
//! The filter language is a small JSON-shaped tree: a bare literal
//! evaluates to itself, and a list's first element names the operator.
//! Supported operators: `all` (conjunction), `in` (property-value
//! membership, or sub-expression disjunction when the first operand is not
//! a property name), `==`/`!=` (loose equality over evaluated operands) and
//! `has`/`!has` (property presence). Anything else is a configuration
//! error: styles using unsupported forms should fail loudly, not filter
//! silently.

use super::error::StyleError;
use crate::tile::{TagValue, VectorFeature, VectorLayer};
use serde::{Deserialize, Serialize};

/// A filter expression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Expression {
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<Expression>),
}

/// Evaluation context: the tile layer and feature a filter runs against.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterContext<'a> {
    pub layer: Option<&'a VectorLayer>,
    pub feature: Option<&'a VectorFeature>,
}

impl<'a> FilterContext<'a> {
    /// Context for one feature of a layer.
    pub fn new(layer: &'a VectorLayer, feature: &'a VectorFeature) -> Self {
        Self {
            layer: Some(layer),
            feature: Some(feature),
        }
    }

    /// Look up a feature property, `Undefined` when context or key is
    /// missing.
    fn property(&self, key: &str) -> EvalValue {
        match (self.layer, self.feature) {
            (Some(layer), Some(feature)) => layer
                .feature_property(feature, key)
                .map(EvalValue::from)
                .unwrap_or(EvalValue::Undefined),
            _ => EvalValue::Undefined,
        }
    }
}

/// Result of evaluating an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalValue {
    Undefined,
    Bool(bool),
    Number(f64),
    String(String),
}

impl EvalValue {
    /// Truthiness, for filter predicates and `all`/`in` operands.
    pub fn is_truthy(&self) -> bool {
        match self {
            EvalValue::Undefined => false,
            EvalValue::Bool(b) => *b,
            EvalValue::Number(n) => *n != 0.0 && !n.is_nan(),
            EvalValue::String(s) => !s.is_empty(),
        }
    }

    /// Loose equality: same-type comparison first, then numeric coercion
    /// (numeric strings parse, booleans become 0/1). `Undefined` equals
    /// only `Undefined`.
    pub fn loose_eq(&self, other: &EvalValue) -> bool {
        match (self, other) {
            (EvalValue::Undefined, EvalValue::Undefined) => true,
            (EvalValue::Undefined, _) | (_, EvalValue::Undefined) => false,
            (EvalValue::Bool(a), EvalValue::Bool(b)) => a == b,
            (EvalValue::Number(a), EvalValue::Number(b)) => a == b,
            (EvalValue::String(a), EvalValue::String(b)) => a == b,
            (a, b) => match (a.as_number(), b.as_number()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            EvalValue::Undefined => None,
            EvalValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            EvalValue::Number(n) => Some(*n),
            EvalValue::String(s) => s.trim().parse().ok(),
        }
    }
}

impl From<&TagValue> for EvalValue {
    fn from(value: &TagValue) -> Self {
        match value {
            TagValue::Bool(b) => EvalValue::Bool(*b),
            TagValue::Int(i) => EvalValue::Number(*i as f64),
            TagValue::Float(f) => EvalValue::Number(*f),
            TagValue::String(s) => EvalValue::String(s.clone()),
        }
    }
}

/// Evaluate an expression against a layer/feature context.
pub fn evaluate(expression: &Expression, context: FilterContext<'_>) -> Result<EvalValue, StyleError> {
    let operands = match expression {
        Expression::Bool(b) => return Ok(EvalValue::Bool(*b)),
        Expression::Number(n) => return Ok(EvalValue::Number(*n)),
        Expression::String(s) => return Ok(EvalValue::String(s.clone())),
        Expression::List(operands) => operands,
    };

    let operator = match operands.first() {
        Some(Expression::String(op)) => op.as_str(),
        _ => {
            return Err(StyleError::InvalidExpression(
                "expression list must start with an operator name".to_string(),
            ))
        }
    };
    let rest = &operands[1..];

    match operator {
        "all" => {
            for operand in rest {
                if !evaluate(operand, context)?.is_truthy() {
                    return Ok(EvalValue::Bool(false));
                }
            }
            Ok(EvalValue::Bool(true))
        }
        "in" => match rest.first() {
            // First form: property-value membership against literals.
            Some(Expression::String(key)) => {
                let value = context.property(key);
                if value == EvalValue::Undefined {
                    return Ok(EvalValue::Bool(false));
                }
                for member in &rest[1..] {
                    if evaluate(member, context)? == value {
                        return Ok(EvalValue::Bool(true));
                    }
                }
                Ok(EvalValue::Bool(false))
            }
            // Second form: disjunction over the operands.
            Some(_) => {
                for operand in rest {
                    if evaluate(operand, context)?.is_truthy() {
                        return Ok(EvalValue::Bool(true));
                    }
                }
                Ok(EvalValue::Bool(false))
            }
            None => Ok(EvalValue::Bool(false)),
        },
        "==" | "!=" => {
            let (left, right) = match rest {
                [left, right] => (left, right),
                _ => {
                    return Err(StyleError::InvalidExpression(format!(
                        "'{operator}' takes exactly two operands"
                    )))
                }
            };
            let equal = evaluate(left, context)?.loose_eq(&evaluate(right, context)?);
            Ok(EvalValue::Bool(if operator == "==" { equal } else { !equal }))
        }
        "has" | "!has" => match rest.first() {
            Some(Expression::String(key)) => {
                let present = context.property(key) != EvalValue::Undefined;
                Ok(EvalValue::Bool(if operator == "has" {
                    present
                } else {
                    !present
                }))
            }
            _ => Err(StyleError::InvalidExpression(format!(
                "'{operator}' takes a property name"
            ))),
        },
        other => Err(StyleError::UnsupportedExpression(other.to_string())),
    }
}

/// A piecewise-linear interpolation of a style value across zoom levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopsFunction {
    pub stops: Vec<(f64, f64)>,
}

impl StopsFunction {
    /// Interpolated value at `input`.
    ///
    /// Clamps to the first output below the range and the last output
    /// above it; a single stop is a constant. An empty stop list returns
    /// the input unchanged.
    pub fn resolve(&self, input: f64) -> f64 {
        stops(input, &self.stops)
    }
}

/// Interpolate `input` over a stop list. See [`StopsFunction::resolve`].
pub fn stops(input: f64, stops: &[(f64, f64)]) -> f64 {
    let (first, rest) = match stops.split_first() {
        Some(split) => split,
        None => return input,
    };
    if input <= first.0 || rest.is_empty() {
        return first.1;
    }
    let mut low = *first;
    for high in rest {
        if input <= high.0 {
            let t = (input - low.0) / (high.0 - low.0);
            return low.1 + t * (high.1 - low.1);
        }
        low = *high;
    }
    low.1
}
