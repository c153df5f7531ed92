//! Condition expression language used by collection filters.
//!
//! Expressions such as `user.age >= 30 and user.active == true` are parsed
//! once into a [`ConditionNode`] tree and then evaluated against many bound
//! values. Operands are kept as unparsed text in the tree and resolved at
//! evaluation time, so the same tree can be reused for every candidate.
//!
//! The grammar has no precedence and no parentheses:
//!
//! ```text
//! expr       := expr ' and ' expr | expr ' or ' expr | comparison | simple
//! comparison := operand operator operand   (>=, <=, !=, ==, >, <, =)
//! simple     := operand
//! ```
//!
//! `and` is split before `or` on every recursive step, always at the first
//! occurrence, so `a or b and c` parses as `(a or b) and c`.
//!
//! Neither parsing nor evaluation can fail. Text that matches no operator is a
//! [`ConditionNode::Simple`] node, unresolvable property paths are null, and
//! incomparable values compare false.

use crate::value::{parse_number, Value};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Comparison operators, serialized as their symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOperator {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=")]
    Le,
}

/// Operator symbols in scan order. Two-character operators come first so
/// `>=` is never split as `>`; a lone `=` is an alias for `==`.
const OPERATORS: [(&str, ComparisonOperator); 7] = [
    (">=", ComparisonOperator::Ge),
    ("<=", ComparisonOperator::Le),
    ("!=", ComparisonOperator::Ne),
    ("==", ComparisonOperator::Eq),
    (">", ComparisonOperator::Gt),
    ("<", ComparisonOperator::Lt),
    ("=", ComparisonOperator::Eq),
];

impl ComparisonOperator {
    /// Canonical symbol of the operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOperator::Eq => "==",
            ComparisonOperator::Ne => "!=",
            ComparisonOperator::Gt => ">",
            ComparisonOperator::Lt => "<",
            ComparisonOperator::Ge => ">=",
            ComparisonOperator::Le => "<=",
        }
    }

    /// Look up an operator by symbol, normalizing `=` to `==`.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        OPERATORS
            .iter()
            .find(|(s, _)| *s == symbol)
            .map(|(_, op)| *op)
    }

    /// Apply the operator to two resolved operands.
    ///
    /// Equality is strict: values of different kinds are never equal, so
    /// `1 == "1"` and `1 == 1.0` are both false. Ordering goes through
    /// [`Value::compare`]; incomparable operands yield false.
    pub fn apply(self, left: &Value, right: &Value) -> bool {
        match self {
            ComparisonOperator::Eq => left == right,
            ComparisonOperator::Ne => left != right,
            ComparisonOperator::Gt => left.compare(right) == Some(Ordering::Greater),
            ComparisonOperator::Lt => left.compare(right) == Some(Ordering::Less),
            ComparisonOperator::Ge => matches!(
                left.compare(right),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            ComparisonOperator::Le => {
                matches!(left.compare(right), Some(Ordering::Less | Ordering::Equal))
            }
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed condition expression.
///
/// Serializes with a `type` tag, e.g.
/// `{"type": "comparison", "left": "n", "operator": ">=", "right": "3"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConditionNode {
    And {
        left: Box<ConditionNode>,
        right: Box<ConditionNode>,
    },
    Or {
        left: Box<ConditionNode>,
        right: Box<ConditionNode>,
    },
    Comparison {
        left: String,
        operator: ComparisonOperator,
        right: String,
    },
    Simple {
        expression: String,
    },
}

impl ConditionNode {
    /// Parse an expression. See [`parse_condition`].
    pub fn parse(expression: &str) -> Self {
        parse_condition(expression)
    }

    /// Evaluate against a bound value. See [`evaluate_condition`].
    pub fn evaluate(&self, bound_name: &str, bound_value: &Value) -> bool {
        evaluate_condition(self, bound_name, bound_value)
    }
}

/// Parse a condition expression into a [`ConditionNode`] tree.
pub fn parse_condition(expression: &str) -> ConditionNode {
    let expression = expression.trim();

    if let Some((left, right)) = expression.split_once(" and ") {
        return ConditionNode::And {
            left: Box::new(parse_condition(left)),
            right: Box::new(parse_condition(right)),
        };
    }

    if let Some((left, right)) = expression.split_once(" or ") {
        return ConditionNode::Or {
            left: Box::new(parse_condition(left)),
            right: Box::new(parse_condition(right)),
        };
    }

    for (symbol, operator) in OPERATORS {
        if let Some((left, right)) = expression.split_once(symbol) {
            return ConditionNode::Comparison {
                left: left.trim().to_string(),
                operator,
                right: right.trim().to_string(),
            };
        }
    }

    ConditionNode::Simple {
        expression: expression.to_string(),
    }
}

/// Evaluate a parsed condition with `bound_value` available as `bound_name`.
pub fn evaluate_condition(node: &ConditionNode, bound_name: &str, bound_value: &Value) -> bool {
    match node {
        ConditionNode::And { left, right } => {
            let l = evaluate_condition(left, bound_name, bound_value);
            let r = evaluate_condition(right, bound_name, bound_value);
            l && r
        }
        ConditionNode::Or { left, right } => {
            let l = evaluate_condition(left, bound_name, bound_value);
            let r = evaluate_condition(right, bound_name, bound_value);
            l || r
        }
        ConditionNode::Comparison {
            left,
            operator,
            right,
        } => {
            let l = resolve_value(left, bound_name, bound_value);
            let r = resolve_value(right, bound_name, bound_value);
            operator.apply(&l, &r)
        }
        ConditionNode::Simple { expression } => {
            resolve_value(expression, bound_name, bound_value).is_truthy()
        }
    }
}

/// Resolve an operand to a value. The first matching rule wins:
///
/// 1. the bound name itself resolves to the bound value;
/// 2. `<bound>.<path>` resolves to a property of the bound value, or null;
/// 3. numeric literals resolve to integers (no `.`) or floats;
/// 4. `true` / `false`, case-insensitive;
/// 5. `null`, case-insensitive;
/// 6. text wrapped in matching `"` or `'` resolves to the inner text;
/// 7. anything else resolves to the trimmed text as a string.
pub fn resolve_value(expression: &str, bound_name: &str, bound_value: &Value) -> Value {
    let expression = expression.trim();

    if expression == bound_name {
        return bound_value.clone();
    }

    if let Some(path) = expression
        .strip_prefix(bound_name)
        .and_then(|rest| rest.strip_prefix('.'))
    {
        return bound_value.lookup_path(path).cloned().unwrap_or_default();
    }

    if let Some(number) = parse_number(expression) {
        return number;
    }

    if expression.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if expression.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if expression.eq_ignore_ascii_case("null") {
        return Value::Null;
    }

    if let Some(inner) = unquote(expression) {
        return Value::String(inner.to_string());
    }

    Value::String(expression.to_string())
}

fn unquote(text: &str) -> Option<&str> {
    ['"', '\''].into_iter().find_map(|quote| {
        text.strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
    })
}

#[cfg(test)]
#[path = "condition_test.rs"]
mod tests;
