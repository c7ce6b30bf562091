//! Expression tree evaluation and arithmetic semantics
//!
//! Integers stay integers under `+ - * // % **` (checked for overflow);
//! `/` always produces a float. Booleans take part in arithmetic as
//! 0 and 1.

use super::functions::lookup;
use super::parser::{BinOp, CmpOp, Expr};
use crate::core::types::EvalValue;
use std::cmp::Ordering;
use std::f64::consts;

pub type EvalResult = Result<EvalValue, String>;

enum Num {
    Int(i64),
    Float(f64),
}

fn num(value: EvalValue) -> Num {
    match value {
        EvalValue::Bool(b) => Num::Int(b as i64),
        EvalValue::Int(i) => Num::Int(i),
        EvalValue::Float(x) => Num::Float(x),
    }
}

pub fn as_f64(value: EvalValue) -> f64 {
    match value {
        EvalValue::Bool(b) => b as i64 as f64,
        EvalValue::Int(i) => i as f64,
        EvalValue::Float(x) => x,
    }
}

pub fn truthy(value: EvalValue) -> bool {
    match value {
        EvalValue::Bool(b) => b,
        EvalValue::Int(i) => i != 0,
        EvalValue::Float(x) => x != 0.0,
    }
}

fn overflow() -> String {
    "integer overflow".to_string()
}

fn zero_division() -> String {
    "division by zero".to_string()
}

pub fn binary(op: BinOp, left: EvalValue, right: EvalValue) -> EvalResult {
    match (op, num(left), num(right)) {
        (BinOp::Add, Num::Int(a), Num::Int(b)) => {
            a.checked_add(b).map(EvalValue::Int).ok_or_else(overflow)
        }
        (BinOp::Sub, Num::Int(a), Num::Int(b)) => {
            a.checked_sub(b).map(EvalValue::Int).ok_or_else(overflow)
        }
        (BinOp::Mul, Num::Int(a), Num::Int(b)) => {
            a.checked_mul(b).map(EvalValue::Int).ok_or_else(overflow)
        }
        (BinOp::FloorDiv, Num::Int(a), Num::Int(b)) => int_floor_div(a, b).map(EvalValue::Int),
        (BinOp::Mod, Num::Int(a), Num::Int(b)) => int_floor_mod(a, b).map(EvalValue::Int),
        (BinOp::Pow, Num::Int(a), Num::Int(b)) if b >= 0 => {
            let exp = u32::try_from(b).map_err(|_| overflow())?;
            a.checked_pow(exp).map(EvalValue::Int).ok_or_else(overflow)
        }
        _ => float_binary(op, as_f64(left), as_f64(right)),
    }
}

fn int_floor_div(a: i64, b: i64) -> Result<i64, String> {
    if b == 0 {
        return Err(zero_division());
    }
    let q = a.checked_div(b).ok_or_else(overflow)?;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        Ok(q - 1)
    } else {
        Ok(q)
    }
}

fn int_floor_mod(a: i64, b: i64) -> Result<i64, String> {
    if b == 0 {
        return Err(zero_division());
    }
    let r = a.checked_rem(b).unwrap_or(0);
    if r != 0 && ((r < 0) != (b < 0)) {
        Ok(r + b)
    } else {
        Ok(r)
    }
}

fn float_binary(op: BinOp, a: f64, b: f64) -> EvalResult {
    let value = match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div => {
            if b == 0.0 {
                return Err(zero_division());
            }
            a / b
        }
        BinOp::FloorDiv => {
            if b == 0.0 {
                return Err(zero_division());
            }
            (a / b).floor()
        }
        BinOp::Mod => {
            if b == 0.0 {
                return Err(zero_division());
            }
            let r = a % b;
            if r != 0.0 && ((r < 0.0) != (b < 0.0)) {
                r + b
            } else {
                r
            }
        }
        BinOp::Pow => {
            if a == 0.0 && b < 0.0 {
                return Err("zero cannot be raised to a negative power".to_string());
            }
            let p = a.powf(b);
            if p.is_nan() {
                return Err("math domain error".to_string());
            }
            p
        }
    };
    Ok(EvalValue::Float(value))
}

pub fn negate(value: EvalValue) -> EvalResult {
    match num(value) {
        Num::Int(i) => i.checked_neg().map(EvalValue::Int).ok_or_else(overflow),
        Num::Float(x) => Ok(EvalValue::Float(-x)),
    }
}

pub fn positive(value: EvalValue) -> EvalValue {
    match num(value) {
        Num::Int(i) => EvalValue::Int(i),
        Num::Float(x) => EvalValue::Float(x),
    }
}

pub fn compare_values(left: EvalValue, right: EvalValue) -> Option<Ordering> {
    match (num(left), num(right)) {
        (Num::Int(a), Num::Int(b)) => Some(a.cmp(&b)),
        _ => as_f64(left).partial_cmp(&as_f64(right)),
    }
}

fn compare(op: CmpOp, left: EvalValue, right: EvalValue) -> bool {
    let ordering = compare_values(left, right);
    match op {
        CmpOp::Eq => ordering == Some(Ordering::Equal),
        CmpOp::Ne => ordering != Some(Ordering::Equal),
        CmpOp::Lt => ordering == Some(Ordering::Less),
        CmpOp::Le => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        CmpOp::Gt => ordering == Some(Ordering::Greater),
        CmpOp::Ge => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
    }
}

fn constant(name: &str) -> Option<EvalValue> {
    match name {
        "pi" => Some(EvalValue::Float(consts::PI)),
        "e" => Some(EvalValue::Float(consts::E)),
        "tau" => Some(EvalValue::Float(consts::TAU)),
        "inf" => Some(EvalValue::Float(f64::INFINITY)),
        _ => None,
    }
}

pub fn evaluate(expr: &Expr) -> EvalResult {
    match expr {
        Expr::Literal(value) => Ok(*value),
        Expr::Name(name) => constant(name).ok_or_else(|| {
            if lookup(name).is_some() {
                format!("function '{name}' must be called with arguments")
            } else {
                format!("name '{name}' is not defined")
            }
        }),
        Expr::Neg(inner) => negate(evaluate(inner)?),
        Expr::Pos(inner) => Ok(positive(evaluate(inner)?)),
        Expr::Not(inner) => Ok(EvalValue::Bool(!truthy(evaluate(inner)?))),
        Expr::Binary(op, left, right) => binary(*op, evaluate(left)?, evaluate(right)?),
        Expr::Compare(first, chain) => {
            let mut left = evaluate(first)?;
            for (op, next) in chain {
                let right = evaluate(next)?;
                if !compare(*op, left, right) {
                    return Ok(EvalValue::Bool(false));
                }
                left = right;
            }
            Ok(EvalValue::Bool(true))
        }
        Expr::And(left, right) => {
            let l = evaluate(left)?;
            if truthy(l) {
                evaluate(right)
            } else {
                Ok(l)
            }
        }
        Expr::Or(left, right) => {
            let l = evaluate(left)?;
            if truthy(l) {
                Ok(l)
            } else {
                evaluate(right)
            }
        }
        Expr::Call(name, args) => {
            let function = lookup(name).ok_or_else(|| format!("function '{name}' is not allowed"))?;
            let values = args.iter().map(evaluate).collect::<Result<Vec<_>, _>>()?;
            function.call(&values)
        }
    }
}
