//! Expression evaluation.

use std::io::Write;

use crate::ast::{BinOp, Expression};
use crate::error::RuntimeError;
use crate::executor::Interpreter;
use crate::state::ExecutionState;
use crate::value::Value;

impl Interpreter<'_> {
    /// Evaluates `expr` against the variables in `state`.
    ///
    /// Only `print` has an observable effect; every other expression is pure
    /// with respect to the state.
    pub fn eval(&mut self, expr: &Expression, state: &ExecutionState) -> Result<Value, RuntimeError> {
        match expr {
            Expression::Identifier(name) => match state.get_var(name) {
                Some(value) => Ok(value),
                None => match name.as_str() {
                    "true" => Ok(Value::Bool(true)),
                    "false" => Ok(Value::Bool(false)),
                    _ => Err(RuntimeError::UndefinedVariable(name.clone())),
                },
            },
            Expression::String(s) => Ok(Value::String(s.clone())),
            Expression::Number(n) => Ok(Value::Number(*n)),
            Expression::Bool(b) => Ok(Value::Bool(*b)),
            Expression::Semver(v) => Ok(Value::String(v.to_string())),
            Expression::Array(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval(item, state)?);
                }
                Ok(Value::Array(values))
            }
            Expression::Call { name, args } => self.call(name, args, state),
            Expression::Binary { op, left, right } => {
                let left = self.eval(left, state)?;
                let right = self.eval(right, state)?;
                binary(*op, &left, &right)
            }
        }
    }

    fn call(&mut self, name: &str, args: &[Expression], state: &ExecutionState) -> Result<Value, RuntimeError> {
        match name {
            "len" => {
                if args.len() != 1 {
                    return Err(RuntimeError::Type(format!(
                        "len: expected 1 argument, got {}",
                        args.len()
                    )));
                }
                match self.eval(&args[0], state)? {
                    Value::String(s) => Ok(Value::Number(s.chars().count() as f64)),
                    Value::Array(items) => Ok(Value::Number(items.len() as f64)),
                    other => Err(RuntimeError::Type(format!(
                        "len: expected string or array, got {}",
                        other.type_name()
                    ))),
                }
            }
            "print" => {
                let mut parts = Vec::with_capacity(args.len());
                for arg in args {
                    parts.push(self.eval(arg, state)?.to_string());
                }
                writeln!(self.out, "{}", parts.join(" "))?;
                Ok(Value::Nil)
            }
            other => Err(RuntimeError::UnsupportedFunction(other.to_string())),
        }
    }
}

fn binary(op: BinOp, left: &Value, right: &Value) -> Result<Value, RuntimeError> {
    match op {
        BinOp::Eq => Ok(Value::Bool(left.loose_eq(right))),
        BinOp::NotEq => Ok(Value::Bool(!left.loose_eq(right))),
        BinOp::Lt | BinOp::LtEq | BinOp::Gt | BinOp::GtEq => {
            let (a, b) = numbers(op, left, right)?;
            let result = match op {
                BinOp::Lt => a < b,
                BinOp::LtEq => a <= b,
                BinOp::Gt => a > b,
                _ => a >= b,
            };
            Ok(Value::Bool(result))
        }
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div => {
            let (a, b) = numbers(op, left, right)?;
            let result = match op {
                BinOp::Add => a + b,
                BinOp::Sub => a - b,
                BinOp::Mul => a * b,
                _ => {
                    if b == 0.0 {
                        return Err(RuntimeError::DivisionByZero);
                    }
                    a / b
                }
            };
            Ok(Value::Number(result))
        }
        BinOp::And | BinOp::Or => match (left.as_bool(), right.as_bool()) {
            (Some(a), Some(b)) => Ok(Value::Bool(if op == BinOp::And { a && b } else { a || b })),
            _ => Err(RuntimeError::Type(format!(
                "'{}' requires boolean operands, got {} and {}",
                op,
                left.type_name(),
                right.type_name()
            ))),
        },
    }
}

fn numbers(op: BinOp, left: &Value, right: &Value) -> Result<(f64, f64), RuntimeError> {
    match (left.as_number(), right.as_number()) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(RuntimeError::Type(format!(
            "'{}' requires numeric operands, got {} and {}",
            op,
            left.type_name(),
            right.type_name()
        ))),
    }
}
