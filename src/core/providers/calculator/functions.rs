//! Allowed calculator functions and their help text

use super::eval::{as_f64, binary, compare_values, EvalResult};
use super::parser::BinOp;
use crate::core::types::EvalValue;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy)]
pub enum Arity {
    Exact(usize),
    Range(usize, usize),
    AtLeast(usize),
}

impl Arity {
    fn accepts(&self, n: usize) -> bool {
        match *self {
            Arity::Exact(k) => n == k,
            Arity::Range(lo, hi) => (lo..=hi).contains(&n),
            Arity::AtLeast(lo) => n >= lo,
        }
    }

    fn describe(&self) -> String {
        match *self {
            Arity::Exact(1) => "exactly 1 argument".to_string(),
            Arity::Exact(k) => format!("exactly {k} arguments"),
            Arity::Range(lo, hi) => format!("{lo} to {hi} arguments"),
            Arity::AtLeast(1) => "at least 1 argument".to_string(),
            Arity::AtLeast(lo) => format!("at least {lo} arguments"),
        }
    }
}

pub struct Function {
    pub name: &'static str,
    pub signature: &'static str,
    pub summary: &'static str,
    pub arity: Arity,
    apply: fn(&[EvalValue]) -> EvalResult,
}

impl Function {
    pub fn call(&self, args: &[EvalValue]) -> EvalResult {
        if !self.arity.accepts(args.len()) {
            return Err(format!(
                "{}() takes {} ({} given)",
                self.name,
                self.arity.describe(),
                args.len()
            ));
        }
        (self.apply)(args)
    }

    pub fn help(&self) -> String {
        format!("{}\n\n{}", self.signature, self.summary)
    }
}

macro_rules! function {
    ($name:literal, $sig:literal, $summary:literal, $arity:expr, $apply:expr $(,)?) => {
        Function {
            name: $name,
            signature: $sig,
            summary: $summary,
            arity: $arity,
            apply: $apply,
        }
    };
}

pub static FUNCTIONS: &[Function] = &[
    function!("abs", "abs(x)", "Return the absolute value of x.", Arity::Exact(1), f_abs),
    function!(
        "add",
        "add(a, b)",
        "Return a + b.",
        Arity::Exact(2),
        |a| binary(BinOp::Add, a[0], a[1]),
    ),
    function!(
        "subtract",
        "subtract(a, b)",
        "Return a - b.",
        Arity::Exact(2),
        |a| binary(BinOp::Sub, a[0], a[1]),
    ),
    function!(
        "multiply",
        "multiply(a, b)",
        "Return a * b.",
        Arity::Exact(2),
        |a| binary(BinOp::Mul, a[0], a[1]),
    ),
    function!(
        "divide",
        "divide(a, b)",
        "Return a / b as a float.",
        Arity::Exact(2),
        |a| binary(BinOp::Div, a[0], a[1]),
    ),
    function!(
        "mod",
        "mod(a, b)",
        "Return the remainder of a divided by b, with the sign of b.",
        Arity::Exact(2),
        |a| binary(BinOp::Mod, a[0], a[1]),
    ),
    function!(
        "power",
        "power(base, exponent)",
        "Return base raised to exponent.",
        Arity::Exact(2),
        |a| binary(BinOp::Pow, a[0], a[1]),
    ),
    function!(
        "sqrt",
        "sqrt(x)",
        "Return the square root of x. x must be non-negative.",
        Arity::Exact(1),
        f_sqrt,
    ),
    function!(
        "cbrt",
        "cbrt(x)",
        "Return the cube root of x.",
        Arity::Exact(1),
        |a| float(as_f64(a[0]).cbrt()),
    ),
    function!(
        "exp",
        "exp(x)",
        "Return e raised to the power x.",
        Arity::Exact(1),
        |a| float(as_f64(a[0]).exp()),
    ),
    function!(
        "log",
        "log(x, base=e)",
        "Return the logarithm of x to the given base (natural log when base is omitted).",
        Arity::Range(1, 2),
        f_log,
    ),
    function!(
        "ln",
        "ln(x)",
        "Return the natural logarithm of x.",
        Arity::Exact(1),
        |a| positive_domain(a[0]).and_then(|x| float(x.ln())),
    ),
    function!(
        "log10",
        "log10(x)",
        "Return the base-10 logarithm of x.",
        Arity::Exact(1),
        |a| positive_domain(a[0]).and_then(|x| float(x.log10())),
    ),
    function!(
        "log2",
        "log2(x)",
        "Return the base-2 logarithm of x.",
        Arity::Exact(1),
        |a| positive_domain(a[0]).and_then(|x| float(x.log2())),
    ),
    function!(
        "sin",
        "sin(x)",
        "Return the sine of x (radians).",
        Arity::Exact(1),
        |a| float(as_f64(a[0]).sin()),
    ),
    function!(
        "cos",
        "cos(x)",
        "Return the cosine of x (radians).",
        Arity::Exact(1),
        |a| float(as_f64(a[0]).cos()),
    ),
    function!(
        "tan",
        "tan(x)",
        "Return the tangent of x (radians).",
        Arity::Exact(1),
        |a| float(as_f64(a[0]).tan()),
    ),
    function!(
        "asin",
        "asin(x)",
        "Return the arc sine of x in radians. x must be in [-1, 1].",
        Arity::Exact(1),
        |a| unit_domain(a[0]).and_then(|x| float(x.asin())),
    ),
    function!(
        "acos",
        "acos(x)",
        "Return the arc cosine of x in radians. x must be in [-1, 1].",
        Arity::Exact(1),
        |a| unit_domain(a[0]).and_then(|x| float(x.acos())),
    ),
    function!(
        "atan",
        "atan(x)",
        "Return the arc tangent of x in radians.",
        Arity::Exact(1),
        |a| float(as_f64(a[0]).atan()),
    ),
    function!(
        "atan2",
        "atan2(y, x)",
        "Return atan(y / x) in radians, using the signs of both to pick the quadrant.",
        Arity::Exact(2),
        |a| float(as_f64(a[0]).atan2(as_f64(a[1]))),
    ),
    function!(
        "degrees",
        "degrees(x)",
        "Convert angle x from radians to degrees.",
        Arity::Exact(1),
        |a| float(as_f64(a[0]).to_degrees()),
    ),
    function!(
        "radians",
        "radians(x)",
        "Convert angle x from degrees to radians.",
        Arity::Exact(1),
        |a| float(as_f64(a[0]).to_radians()),
    ),
    function!(
        "floor",
        "floor(x)",
        "Return the largest integer less than or equal to x.",
        Arity::Exact(1),
        |a| to_int(a[0], f64::floor),
    ),
    function!(
        "ceil",
        "ceil(x)",
        "Return the smallest integer greater than or equal to x.",
        Arity::Exact(1),
        |a| to_int(a[0], f64::ceil),
    ),
    function!(
        "trunc",
        "trunc(x)",
        "Return x with the fractional part removed, as an integer.",
        Arity::Exact(1),
        |a| to_int(a[0], f64::trunc),
    ),
    function!(
        "round",
        "round(x, ndigits=None)",
        "Round x to ndigits places, halves to even; an integer when ndigits is omitted.",
        Arity::Range(1, 2),
        f_round,
    ),
    function!(
        "min",
        "min(x1, x2, ...)",
        "Return the smallest argument.",
        Arity::AtLeast(1),
        |a| pick(a, Ordering::Less),
    ),
    function!(
        "max",
        "max(x1, x2, ...)",
        "Return the largest argument.",
        Arity::AtLeast(1),
        |a| pick(a, Ordering::Greater),
    ),
    function!(
        "sum",
        "sum(x1, x2, ...)",
        "Return the sum of the arguments (0 when called without arguments).",
        Arity::AtLeast(0),
        f_sum,
    ),
    function!(
        "average",
        "average(x1, x2, ...)",
        "Return the arithmetic mean of the arguments.",
        Arity::AtLeast(1),
        f_average,
    ),
    function!(
        "median",
        "median(x1, x2, ...)",
        "Return the median; the mean of the two middle values for an even count.",
        Arity::AtLeast(1),
        f_median,
    ),
    function!(
        "factorial",
        "factorial(n)",
        "Return n! for a non-negative integer n.",
        Arity::Exact(1),
        f_factorial,
    ),
    function!(
        "gcd",
        "gcd(a, b, ...)",
        "Return the greatest common divisor of the integer arguments.",
        Arity::AtLeast(1),
        f_gcd,
    ),
    function!(
        "lcm",
        "lcm(a, b, ...)",
        "Return the least common multiple of the integer arguments.",
        Arity::AtLeast(1),
        f_lcm,
    ),
    function!(
        "hypot",
        "hypot(x1, x2, ...)",
        "Return the Euclidean norm, sqrt(sum(x**2 for each argument)).",
        Arity::AtLeast(1),
        |a| float(a.iter().map(|v| as_f64(*v).powi(2)).sum::<f64>().sqrt()),
    ),
];

pub fn lookup(name: &str) -> Option<&'static Function> {
    FUNCTIONS.iter().find(|f| f.name == name)
}

fn float(x: f64) -> EvalResult {
    if x.is_nan() {
        Err("math domain error".to_string())
    } else {
        Ok(EvalValue::Float(x))
    }
}

fn positive_domain(value: EvalValue) -> Result<f64, String> {
    let x = as_f64(value);
    if x <= 0.0 {
        Err("math domain error".to_string())
    } else {
        Ok(x)
    }
}

fn unit_domain(value: EvalValue) -> Result<f64, String> {
    let x = as_f64(value);
    if !(-1.0..=1.0).contains(&x) {
        Err("math domain error".to_string())
    } else {
        Ok(x)
    }
}

fn integer_arg(name: &str, value: EvalValue) -> Result<i64, String> {
    match value {
        EvalValue::Int(i) => Ok(i),
        EvalValue::Bool(b) => Ok(b as i64),
        EvalValue::Float(_) => Err(format!("{name}() only accepts integral values")),
    }
}

fn to_int(value: EvalValue, op: fn(f64) -> f64) -> EvalResult {
    match value {
        EvalValue::Int(i) => Ok(EvalValue::Int(i)),
        EvalValue::Bool(b) => Ok(EvalValue::Int(b as i64)),
        EvalValue::Float(x) => {
            let r = op(x);
            if !r.is_finite() || r.abs() >= 9.2e18 {
                Err("cannot convert float to integer".to_string())
            } else {
                Ok(EvalValue::Int(r as i64))
            }
        }
    }
}

fn f_abs(args: &[EvalValue]) -> EvalResult {
    match args[0] {
        EvalValue::Float(x) => Ok(EvalValue::Float(x.abs())),
        other => {
            let i = integer_arg("abs", other)?;
            i.checked_abs()
                .map(EvalValue::Int)
                .ok_or_else(|| "integer overflow".to_string())
        }
    }
}

fn f_sqrt(args: &[EvalValue]) -> EvalResult {
    let x = as_f64(args[0]);
    if x < 0.0 {
        return Err("math domain error".to_string());
    }
    float(x.sqrt())
}

fn f_log(args: &[EvalValue]) -> EvalResult {
    let x = positive_domain(args[0])?;
    match args.get(1) {
        None => float(x.ln()),
        Some(base) => {
            let base = positive_domain(*base)?;
            if base == 1.0 {
                return Err("division by zero".to_string());
            }
            float(x.ln() / base.ln())
        }
    }
}

fn f_round(args: &[EvalValue]) -> EvalResult {
    let digits = match args.get(1) {
        None => return to_int(args[0], f64::round_ties_even),
        Some(d) => integer_arg("round", *d)?,
    };
    match args[0] {
        EvalValue::Float(x) => {
            let digits = digits.clamp(-308, 308) as i32;
            let scale = 10f64.powi(digits);
            let scaled = x * scale;
            if !scaled.is_finite() {
                return Ok(EvalValue::Float(x));
            }
            float(scaled.round_ties_even() / scale)
        }
        other => {
            let i = integer_arg("round", other)?;
            if digits >= 0 {
                return Ok(EvalValue::Int(i));
            }
            let factor = 10i64
                .checked_pow(u32::try_from(-digits).map_err(|_| "integer overflow".to_string())?)
                .ok_or_else(|| "integer overflow".to_string())?;
            let rounded = (i as f64 / factor as f64).round_ties_even() as i64;
            rounded
                .checked_mul(factor)
                .map(EvalValue::Int)
                .ok_or_else(|| "integer overflow".to_string())
        }
    }
}

fn pick(args: &[EvalValue], wanted: Ordering) -> EvalResult {
    let mut best = args[0];
    for &candidate in &args[1..] {
        match compare_values(candidate, best) {
            Some(ordering) if ordering == wanted => best = candidate,
            None => return Err("cannot compare NaN".to_string()),
            _ => {}
        }
    }
    Ok(best)
}

fn f_sum(args: &[EvalValue]) -> EvalResult {
    args.iter()
        .try_fold(EvalValue::Int(0), |acc, v| binary(BinOp::Add, acc, *v))
}

fn f_average(args: &[EvalValue]) -> EvalResult {
    let total: f64 = args.iter().map(|v| as_f64(*v)).sum();
    float(total / args.len() as f64)
}

fn f_median(args: &[EvalValue]) -> EvalResult {
    let mut sorted = args.to_vec();
    sorted.sort_by(|a, b| compare_values(*a, *b).unwrap_or(Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Ok(sorted[mid])
    } else {
        float((as_f64(sorted[mid - 1]) + as_f64(sorted[mid])) / 2.0)
    }
}

fn f_factorial(args: &[EvalValue]) -> EvalResult {
    let n = integer_arg("factorial", args[0])?;
    if n < 0 {
        return Err("factorial() not defined for negative values".to_string());
    }
    (1..=n)
        .try_fold(1i64, |acc, k| acc.checked_mul(k))
        .map(EvalValue::Int)
        .ok_or_else(|| "integer overflow".to_string())
}

fn gcd(mut a: i64, mut b: i64) -> i64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a.abs()
}

fn f_gcd(args: &[EvalValue]) -> EvalResult {
    let mut acc = 0i64;
    for v in args {
        let i = integer_arg("gcd", *v)?;
        if i == i64::MIN {
            return Err("integer overflow".to_string());
        }
        acc = gcd(acc, i);
    }
    Ok(EvalValue::Int(acc))
}

fn f_lcm(args: &[EvalValue]) -> EvalResult {
    let mut acc = 1i64;
    for v in args {
        let i = integer_arg("lcm", *v)?;
        if i == 0 {
            return Ok(EvalValue::Int(0));
        }
        if i == i64::MIN {
            return Err("integer overflow".to_string());
        }
        let g = gcd(acc, i);
        acc = (acc / g)
            .checked_mul(i.abs())
            .ok_or_else(|| "integer overflow".to_string())?;
    }
    Ok(EvalValue::Int(acc))
}
