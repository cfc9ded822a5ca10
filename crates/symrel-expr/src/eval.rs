//! Tree-walking evaluation of predicate expressions.
//!
//! Semantics:
//!
//! - `==` / `!=` compare structurally; values of different types are
//!   simply unequal.
//! - `<` `<=` `>` `>=` order Int/Int numerically and Str/Str
//!   lexicographically; anything else is a type error.
//! - `+` adds two Ints, or concatenates when either side is a Str.
//! - `!` `&&` `||` use truthiness (false, zero, empty string, and null
//!   are falsy) and always produce a Bool.

use std::cmp::Ordering;
use std::fmt;

use crate::ast::{BinaryOp, Expr};
use crate::error::EvalError;

/// A runtime value produced by a predicate.
///
/// Predicates usually return [`Value::Bool`], but authors may return any
/// value; the untyped result is passed through to the caller unchanged.
/// Serializes untagged, so a Bool is a JSON boolean and so on.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
}

impl Value {
    pub fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(value) => *value,
            Value::Int(value) => *value != 0,
            Value::Str(value) => !value.is_empty(),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Str(_) => "string",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(value) => write!(f, "{value}"),
            Value::Int(value) => write!(f, "{value}"),
            Value::Str(value) => f.write_str(value),
        }
    }
}

/// Evaluate an expression with `tokenA` and `tokenB` bound.
pub fn eval(expr: &Expr, token_a: &str, token_b: &str) -> Result<Value, EvalError> {
    match expr {
        Expr::Null => Ok(Value::Null),
        Expr::Bool(value) => Ok(Value::Bool(*value)),
        Expr::Int(value) => Ok(Value::Int(*value)),
        Expr::Str(value) => Ok(Value::Str(value.clone())),
        Expr::Ident(name) => match name.as_str() {
            "tokenA" => Ok(Value::Str(token_a.to_string())),
            "tokenB" => Ok(Value::Str(token_b.to_string())),
            other => Err(EvalError::UnknownIdentifier(other.to_string())),
        },
        Expr::Not(inner) => {
            let value = eval(inner, token_a, token_b)?;
            Ok(Value::Bool(!value.truthy()))
        }
        Expr::Binary { op, lhs, rhs } => {
            let lhs = eval(lhs, token_a, token_b)?;
            let rhs = eval(rhs, token_a, token_b)?;
            apply_binary(*op, lhs, rhs)
        }
        Expr::Call { name, args } => {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(eval(arg, token_a, token_b)?);
            }
            call_builtin(name, values)
        }
    }
}

fn apply_binary(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, EvalError> {
    match op {
        BinaryOp::Or => Ok(Value::Bool(lhs.truthy() || rhs.truthy())),
        BinaryOp::And => Ok(Value::Bool(lhs.truthy() && rhs.truthy())),
        BinaryOp::Eq => Ok(Value::Bool(lhs == rhs)),
        BinaryOp::Ne => Ok(Value::Bool(lhs != rhs)),
        BinaryOp::Lt => ordered(lhs, rhs).map(|ord| Value::Bool(ord == Ordering::Less)),
        BinaryOp::Le => ordered(lhs, rhs).map(|ord| Value::Bool(ord != Ordering::Greater)),
        BinaryOp::Gt => ordered(lhs, rhs).map(|ord| Value::Bool(ord == Ordering::Greater)),
        BinaryOp::Ge => ordered(lhs, rhs).map(|ord| Value::Bool(ord != Ordering::Less)),
        BinaryOp::Add => add(lhs, rhs),
    }
}

fn ordered(lhs: Value, rhs: Value) -> Result<Ordering, EvalError> {
    match (&lhs, &rhs) {
        (Value::Int(a), Value::Int(b)) => Ok(a.cmp(b)),
        (Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
        _ => Err(EvalError::TypeMismatch(format!(
            "cannot order {} against {}",
            lhs.type_name(),
            rhs.type_name()
        ))),
    }
}

fn add(lhs: Value, rhs: Value) -> Result<Value, EvalError> {
    match (&lhs, &rhs) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_add(*b))),
        (Value::Str(_), _) | (_, Value::Str(_)) => Ok(Value::Str(format!("{lhs}{rhs}"))),
        _ => Err(EvalError::TypeMismatch(format!(
            "cannot add {} and {}",
            lhs.type_name(),
            rhs.type_name()
        ))),
    }
}

fn call_builtin(name: &str, args: Vec<Value>) -> Result<Value, EvalError> {
    match name {
        "contains" => {
            let [haystack, needle] = two_strings(name, args)?;
            Ok(Value::Bool(haystack.contains(&needle)))
        }
        "starts_with" => {
            let [subject, prefix] = two_strings(name, args)?;
            Ok(Value::Bool(subject.starts_with(&prefix)))
        }
        "ends_with" => {
            let [subject, suffix] = two_strings(name, args)?;
            Ok(Value::Bool(subject.ends_with(&suffix)))
        }
        "len" => {
            let subject = one_string(name, args)?;
            Ok(Value::Int(subject.chars().count() as i64))
        }
        "lower" => {
            let subject = one_string(name, args)?;
            Ok(Value::Str(subject.to_lowercase()))
        }
        "upper" => {
            let subject = one_string(name, args)?;
            Ok(Value::Str(subject.to_uppercase()))
        }
        other => Err(EvalError::UnknownFunction(other.to_string())),
    }
}

fn one_string(name: &str, args: Vec<Value>) -> Result<String, EvalError> {
    let [value]: [Value; 1] = args.try_into().map_err(|args: Vec<Value>| EvalError::Arity {
        name: name.to_string(),
        expected: 1,
        got: args.len(),
    })?;
    into_string(name, value)
}

fn two_strings(name: &str, args: Vec<Value>) -> Result<[String; 2], EvalError> {
    let [first, second]: [Value; 2] =
        args.try_into().map_err(|args: Vec<Value>| EvalError::Arity {
            name: name.to_string(),
            expected: 2,
            got: args.len(),
        })?;
    Ok([into_string(name, first)?, into_string(name, second)?])
}

fn into_string(name: &str, value: Value) -> Result<String, EvalError> {
    match value {
        Value::Str(value) => Ok(value),
        other => Err(EvalError::TypeMismatch(format!(
            "`{name}` expects string arguments, got {}",
            other.type_name()
        ))),
    }
}
