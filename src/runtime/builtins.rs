//! Builtin globals and methods available to template expressions.
//!
//! Globals: `Math`, `Object`, `JSON`, `Array`, the `String`, `Number` and
//! `Boolean` conversions, `parseInt`, `parseFloat`, `isNaN`,
//! `encodeURIComponent`, `NaN` and `Infinity`. Methods are dispatched on
//! the receiver type; unknown names fall through to property lookup.

use std::sync::{Arc, LazyLock};

use rustc_hash::FxHashMap;
use serde::Serialize;

use super::errors::{EvalError, EvalResult};
use super::eval::{Evaluator, strict_equals};
use crate::value::{Function, Object, Value, format_number};

/// Longest string a builtin may produce, in characters.
pub(crate) const MAX_STRING_LENGTH: usize = (1 << 29) - 24;

static GLOBALS: LazyLock<FxHashMap<&'static str, Value>> = LazyLock::new(globals);

/// Looks up a builtin global by name.
pub(crate) fn global(name: &str) -> Option<Value> {
    GLOBALS.get(name).cloned()
}

fn native(f: fn(&[Value]) -> EvalResult<Value>) -> Value {
    Value::function(f)
}

fn globals() -> FxHashMap<&'static str, Value> {
    let mut globals = FxHashMap::default();

    globals.insert(
        "Math",
        Value::object([
            ("floor", native(|args| Ok(math(args, f64::floor)))),
            ("ceil", native(|args| Ok(math(args, f64::ceil)))),
            ("round", native(|args| Ok(math(args, |n| (n + 0.5).floor())))),
            ("abs", native(|args| Ok(math(args, f64::abs)))),
            ("sqrt", native(|args| Ok(math(args, f64::sqrt)))),
            ("trunc", native(|args| Ok(math(args, f64::trunc)))),
            (
                "pow",
                native(|args| Ok(Value::Number(arg(args, 0).to_number().powf(arg(args, 1).to_number())))),
            ),
            ("min", native(|args| Ok(fold_numbers(args, f64::INFINITY, f64::min)))),
            ("max", native(|args| Ok(fold_numbers(args, f64::NEG_INFINITY, f64::max)))),
            ("PI", Value::Number(std::f64::consts::PI)),
        ]),
    );

    globals.insert(
        "Object",
        Value::object([
            (
                "keys",
                native(|args| Ok(Value::array(entries(&arg(args, 0)).into_iter().map(|(k, _)| k)))),
            ),
            (
                "values",
                native(|args| Ok(Value::array(entries(&arg(args, 0)).into_iter().map(|(_, v)| v)))),
            ),
            (
                "entries",
                native(|args| {
                    Ok(Value::array(
                        entries(&arg(args, 0))
                            .into_iter()
                            .map(|(k, v)| Value::array([Value::from(k), v])),
                    ))
                }),
            ),
        ]),
    );

    globals.insert("JSON", Value::object([("stringify", native(stringify))]));
    globals.insert(
        "Array",
        Value::object([(
            "isArray",
            native(|args| Ok(Value::Bool(matches!(arg(args, 0), Value::Array(_))))),
        )]),
    );

    globals.insert(
        "String",
        native(|args| {
            Ok(match args.first() {
                Some(value) => Value::from(value.to_text()),
                None => Value::from(""),
            })
        }),
    );
    globals.insert(
        "Number",
        native(|args| Ok(Value::Number(args.first().map_or(0.0, Value::to_number)))),
    );
    globals.insert(
        "Boolean",
        native(|args| Ok(Value::Bool(arg(args, 0).is_truthy()))),
    );
    globals.insert("parseInt", native(parse_int));
    globals.insert("parseFloat", native(parse_float));
    globals.insert(
        "isNaN",
        native(|args| Ok(Value::Bool(arg(args, 0).to_number().is_nan()))),
    );
    globals.insert("encodeURIComponent", native(encode_uri_component));
    globals.insert("NaN", Value::Number(f64::NAN));
    globals.insert("Infinity", Value::Number(f64::INFINITY));

    globals
}

/// Calls a builtin method on `receiver`. `None` when there is no such method.
pub(crate) fn call_method(
    eval: &mut Evaluator,
    receiver: &Value,
    name: &str,
    args: &[Value],
) -> EvalResult<Option<Value>> {
    match receiver {
        Value::String(s) => string_method(eval, s, name, args),
        Value::Array(items) => array_method(eval, items, name, args),
        Value::Number(n) => number_method(*n, name, args),
        Value::Object(map) => Ok(object_method(map, name, args)),
        Value::Bool(_) | Value::Function(_) if name == "toString" => {
            Ok(Some(Value::from(receiver.to_text())))
        }
        _ => Ok(None),
    }
}

fn string_method(
    eval: &mut Evaluator,
    s: &str,
    name: &str,
    args: &[Value],
) -> EvalResult<Option<Value>> {
    let text = |i: usize| arg(args, i).to_text();

    let result = match name {
        "toUpperCase" => Value::from(s.to_uppercase()),
        "toLowerCase" => Value::from(s.to_lowercase()),
        "trim" => Value::from(s.trim()),
        "trimStart" => Value::from(s.trim_start()),
        "trimEnd" => Value::from(s.trim_end()),
        "includes" => Value::Bool(s.contains(text(0).as_str())),
        "startsWith" => Value::Bool(s.starts_with(text(0).as_str())),
        "endsWith" => Value::Bool(s.ends_with(text(0).as_str())),
        "indexOf" => Value::Number(
            s.find(text(0).as_str())
                .map_or(-1.0, |byte| s[..byte].chars().count() as f64),
        ),
        "lastIndexOf" => Value::Number(
            s.rfind(text(0).as_str())
                .map_or(-1.0, |byte| s[..byte].chars().count() as f64),
        ),
        "slice" => {
            let chars: Vec<char> = s.chars().collect();
            let (start, end) = slice_bounds(args, chars.len());
            Value::from(chars[start..end].iter().collect::<String>())
        }
        "substring" => {
            let chars: Vec<char> = s.chars().collect();
            let len = chars.len();
            let clamp = |value: Value, default: usize| {
                if value.is_undefined() {
                    default
                } else {
                    integer(&value, 0).clamp(0, len as i64) as usize
                }
            };
            let a = clamp(arg(args, 0), 0);
            let b = clamp(arg(args, 1), len);
            let (start, end) = if a > b { (b, a) } else { (a, b) };
            Value::from(chars[start..end].iter().collect::<String>())
        }
        "split" => split(s, args),
        "replace" => replace(eval, s, args, false)?,
        "replaceAll" => replace(eval, s, args, true)?,
        "repeat" => {
            let count = arg(args, 0).to_number();
            if count < 0.0 || count.is_infinite() {
                return Err(EvalError::invalid_argument("repeat", "invalid count value"));
            }
            let count = if count.is_nan() { 0 } else { count as usize };
            let length = s.chars().count().checked_mul(count);
            if length.is_none_or(|length| length > MAX_STRING_LENGTH) {
                return Err(EvalError::invalid_argument("repeat", "invalid string length"));
            }
            Value::from(s.repeat(count))
        }
        "padStart" => pad(s, args, true)?,
        "padEnd" => pad(s, args, false)?,
        "charAt" => {
            let index = integer(&arg(args, 0), 0);
            let c = usize::try_from(index).ok().and_then(|i| s.chars().nth(i));
            Value::from(c.map(String::from).unwrap_or_default())
        }
        "at" => {
            let len = s.chars().count();
            let index = integer(&arg(args, 0), 0);
            let index = if index < 0 { index + len as i64 } else { index };
            match usize::try_from(index).ok().and_then(|i| s.chars().nth(i)) {
                Some(c) => Value::from(c.to_string()),
                None => Value::Undefined,
            }
        }
        "concat" => {
            let mut out = s.to_string();
            for value in args {
                out.push_str(&value.to_text());
            }
            Value::from(out)
        }
        "toString" | "valueOf" => Value::from(s),
        _ => return Ok(None),
    };
    Ok(Some(result))
}

fn array_method(
    eval: &mut Evaluator,
    items: &Arc<Vec<Value>>,
    name: &str,
    args: &[Value],
) -> EvalResult<Option<Value>> {
    let array = Value::Array(Arc::clone(items));
    let call = |eval: &mut Evaluator, f: &Function, i: usize, item: &Value| {
        eval.call(f, &[item.clone(), Value::from(i), array.clone()])
    };

    let result = match name {
        "map" => {
            let f = callback(args, name)?;
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                out.push(call(eval, f, i, item)?);
            }
            Value::from(out)
        }
        "filter" => {
            let f = callback(args, name)?;
            let mut out = Vec::new();
            for (i, item) in items.iter().enumerate() {
                if call(eval, f, i, item)?.is_truthy() {
                    out.push(item.clone());
                }
            }
            Value::from(out)
        }
        "find" | "findIndex" => {
            let f = callback(args, name)?;
            let mut found = None;
            for (i, item) in items.iter().enumerate() {
                if call(eval, f, i, item)?.is_truthy() {
                    found = Some(i);
                    break;
                }
            }
            match (name, found) {
                ("find", Some(i)) => items[i].clone(),
                ("find", None) => Value::Undefined,
                (_, Some(i)) => Value::from(i),
                (_, None) => Value::Number(-1.0),
            }
        }
        "some" => {
            let f = callback(args, name)?;
            let mut any = false;
            for (i, item) in items.iter().enumerate() {
                if call(eval, f, i, item)?.is_truthy() {
                    any = true;
                    break;
                }
            }
            Value::Bool(any)
        }
        "every" => {
            let f = callback(args, name)?;
            let mut all = true;
            for (i, item) in items.iter().enumerate() {
                if !call(eval, f, i, item)?.is_truthy() {
                    all = false;
                    break;
                }
            }
            Value::Bool(all)
        }
        "forEach" => {
            let f = callback(args, name)?;
            for (i, item) in items.iter().enumerate() {
                call(eval, f, i, item)?;
            }
            Value::Undefined
        }
        "reduce" => {
            let f = callback(args, name)?;
            let mut entries = items.iter().enumerate();
            let mut acc = match args.get(1) {
                Some(initial) => initial.clone(),
                None => match entries.next() {
                    Some((_, first)) => first.clone(),
                    None => {
                        return Err(EvalError::invalid_argument(
                            "reduce",
                            "empty array with no initial value",
                        ));
                    }
                },
            };
            for (i, item) in entries {
                acc = eval.call(f, &[acc, item.clone(), Value::from(i), array.clone()])?;
            }
            acc
        }
        "includes" => {
            let needle = arg(args, 0);
            Value::Bool(items.iter().any(|item| same_value_zero(item, &needle)))
        }
        "indexOf" => {
            let needle = arg(args, 0);
            items
                .iter()
                .position(|item| strict_equals(item, &needle))
                .map_or(Value::Number(-1.0), Value::from)
        }
        "join" => {
            let separator = match arg(args, 0) {
                Value::Undefined => ",".to_string(),
                other => other.to_text(),
            };
            let parts: Vec<String> = items
                .iter()
                .map(|item| if item.is_nullish() { String::new() } else { item.to_text() })
                .collect();
            Value::from(parts.join(&separator))
        }
        "slice" => {
            let (start, end) = slice_bounds(args, items.len());
            Value::from(items[start..end].to_vec())
        }
        "concat" => {
            let mut out = items.to_vec();
            for value in args {
                match value {
                    Value::Array(more) => out.extend(more.iter().cloned()),
                    other => out.push(other.clone()),
                }
            }
            Value::from(out)
        }
        "reverse" => Value::from(items.iter().rev().cloned().collect::<Vec<_>>()),
        "flat" => {
            let mut out = Vec::with_capacity(items.len());
            for item in items.iter() {
                match item {
                    Value::Array(inner) => out.extend(inner.iter().cloned()),
                    other => out.push(other.clone()),
                }
            }
            Value::from(out)
        }
        "at" => {
            let index = integer(&arg(args, 0), 0);
            let index = if index < 0 { index + items.len() as i64 } else { index };
            usize::try_from(index)
                .ok()
                .and_then(|i| items.get(i))
                .cloned()
                .unwrap_or_default()
        }
        "toString" => Value::from(array.to_text()),
        _ => return Ok(None),
    };
    Ok(Some(result))
}

fn number_method(n: f64, name: &str, args: &[Value]) -> EvalResult<Option<Value>> {
    let result = match name {
        "toFixed" => {
            let digits = integer(&arg(args, 0), 0);
            if !(0..=100).contains(&digits) {
                return Err(EvalError::invalid_argument(
                    "toFixed",
                    "digits must be between 0 and 100",
                ));
            }
            Value::from(to_fixed(n, digits as usize))
        }
        "toString" => {
            let radix = integer(&arg(args, 0), 10);
            if !(2..=36).contains(&radix) {
                return Err(EvalError::invalid_argument(
                    "toString",
                    "radix must be between 2 and 36",
                ));
            }
            Value::from(to_radix(n, radix as u32))
        }
        "valueOf" => Value::Number(n),
        _ => return Ok(None),
    };
    Ok(Some(result))
}

fn object_method(map: &Object, name: &str, args: &[Value]) -> Option<Value> {
    match name {
        "hasOwnProperty" => Some(Value::Bool(map.contains_key(&arg(args, 0).to_text()))),
        "toString" => Some(Value::from("[object Object]")),
        _ => None,
    }
}

fn arg(args: &[Value], i: usize) -> Value {
    args.get(i).cloned().unwrap_or_default()
}

fn callback<'a>(args: &'a [Value], method: &str) -> EvalResult<&'a Function> {
    match args.first() {
        Some(Value::Function(f)) => Ok(f),
        Some(other) => Err(EvalError::invalid_argument(
            method,
            format!("{} is not a function", other.type_of()),
        )),
        None => Err(EvalError::invalid_argument(method, "missing callback")),
    }
}

/// Integer conversion with `default` for an omitted argument.
fn integer(value: &Value, default: i64) -> i64 {
    if value.is_undefined() {
        return default;
    }
    let n = value.to_number();
    if n.is_nan() { 0 } else { n.trunc() as i64 }
}

/// Resolves a possibly negative index against `len`.
fn relative(index: i64, len: usize) -> usize {
    let len = len as i64;
    let index = if index < 0 { (len + index).max(0) } else { index.min(len) };
    index as usize
}

fn slice_bounds(args: &[Value], len: usize) -> (usize, usize) {
    let start = relative(integer(&arg(args, 0), 0), len);
    let end = relative(integer(&arg(args, 1), len as i64), len);
    (start, end.max(start))
}

fn math(args: &[Value], f: fn(f64) -> f64) -> Value {
    Value::Number(f(arg(args, 0).to_number()))
}

fn fold_numbers(args: &[Value], init: f64, f: fn(f64, f64) -> f64) -> Value {
    let mut acc = init;
    for value in args {
        let n = value.to_number();
        if n.is_nan() {
            return Value::Number(f64::NAN);
        }
        acc = f(acc, n);
    }
    Value::Number(acc)
}

fn same_value_zero(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) if x.is_nan() && y.is_nan() => true,
        _ => strict_equals(a, b),
    }
}

/// Enumerable `[key, value]` pairs, as `for ... in` sees them.
pub(crate) fn entries(value: &Value) -> Vec<(String, Value)> {
    match value {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v.clone()))
            .collect(),
        Value::String(s) => s
            .chars()
            .enumerate()
            .map(|(i, c)| (i.to_string(), Value::from(c.to_string())))
            .collect(),
        _ => Vec::new(),
    }
}

fn split(s: &str, args: &[Value]) -> Value {
    let limit = match arg(args, 1) {
        Value::Undefined => usize::MAX,
        other => other.to_number() as usize,
    };
    let parts: Vec<Value> = match arg(args, 0) {
        Value::Undefined => vec![Value::from(s)],
        separator => {
            let separator = separator.to_text();
            if separator.is_empty() {
                s.chars().map(|c| Value::from(c.to_string())).collect()
            } else {
                s.split(separator.as_str()).map(Value::from).collect()
            }
        }
    };
    Value::from(parts.into_iter().take(limit).collect::<Vec<_>>())
}

fn replace(eval: &mut Evaluator, s: &str, args: &[Value], all: bool) -> EvalResult<Value> {
    let pattern = arg(args, 0).to_text();
    let replacement = arg(args, 1);
    let limit = if all { usize::MAX } else { 1 };

    let starts: Vec<usize> = if pattern.is_empty() {
        s.char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(s.len()))
            .take(limit)
            .collect()
    } else {
        s.match_indices(pattern.as_str())
            .map(|(i, _)| i)
            .take(limit)
            .collect()
    };

    let mut out = String::with_capacity(s.len());
    let mut last = 0;
    for start in starts {
        out.push_str(&s[last..start]);
        let replaced = match &replacement {
            Value::Function(f) => eval
                .call(
                    f,
                    &[
                        Value::from(pattern.as_str()),
                        Value::from(s[..start].chars().count()),
                        Value::from(s),
                    ],
                )?
                .to_text(),
            other => other.to_text(),
        };
        out.push_str(&replaced);
        last = start + pattern.len();
    }
    out.push_str(&s[last..]);
    Ok(Value::from(out))
}

fn pad(s: &str, args: &[Value], at_start: bool) -> EvalResult<Value> {
    let target = integer(&arg(args, 0), 0).max(0) as usize;
    let fill = match arg(args, 1) {
        Value::Undefined => " ".to_string(),
        other => other.to_text(),
    };
    let len = s.chars().count();
    if target <= len || fill.is_empty() {
        return Ok(Value::from(s));
    }
    if target > MAX_STRING_LENGTH {
        let method = if at_start { "padStart" } else { "padEnd" };
        return Err(EvalError::invalid_argument(method, "invalid string length"));
    }
    let padding: String = fill.chars().cycle().take(target - len).collect();
    Ok(if at_start {
        Value::from(padding + s)
    } else {
        Value::from(format!("{}{}", s, padding))
    })
}

/// `Number.prototype.toFixed`, rounding halves away from zero.
fn to_fixed(n: f64, digits: usize) -> String {
    if !n.is_finite() {
        return format_number(n);
    }
    let factor = 10f64.powi(digits as i32);
    let scaled = n.abs() * factor;
    if scaled >= 1e21 {
        return format!("{:.*}", digits, n);
    }
    let rounded = (scaled + 0.5).floor() / factor;
    let text = format!("{:.*}", digits, rounded);
    if n < 0.0 && rounded != 0.0 {
        format!("-{}", text)
    } else {
        text
    }
}

fn to_radix(n: f64, radix: u32) -> String {
    if radix == 10 || !n.is_finite() || n.fract() != 0.0 || n.abs() >= 9.0e15 {
        return format_number(n);
    }
    let mut magnitude = n.abs() as u64;
    if magnitude == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while magnitude > 0 {
        let digit = (magnitude % u64::from(radix)) as u32;
        digits.push(std::char::from_digit(digit, radix).unwrap_or('0'));
        magnitude /= u64::from(radix);
    }
    if n < 0.0 {
        digits.push('-');
    }
    digits.iter().rev().collect()
}

fn stringify(args: &[Value]) -> EvalResult<Value> {
    let value = arg(args, 0);
    if matches!(value, Value::Undefined | Value::Function(_)) {
        return Ok(Value::Undefined);
    }
    let indent = match arg(args, 2) {
        Value::Number(n) if n >= 1.0 => " ".repeat(n.min(10.0) as usize),
        Value::String(s) => s.chars().take(10).collect(),
        _ => String::new(),
    };

    let json = value.to_json();
    if indent.is_empty() {
        return serde_json::to_string(&json)
            .map(Value::from)
            .map_err(EvalError::host);
    }

    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    json.serialize(&mut serializer).map_err(EvalError::host)?;
    String::from_utf8(out)
        .map(Value::from)
        .map_err(EvalError::host)
}

fn parse_int(args: &[Value]) -> EvalResult<Value> {
    let text = arg(args, 0).to_text();
    let trimmed = text.trim_start();
    let (negative, mut digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let mut radix = match arg(args, 1) {
        Value::Undefined => 0,
        other => other.to_number() as u32,
    };
    if (radix == 0 || radix == 16)
        && let Some(rest) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X"))
    {
        digits = rest;
        radix = 16;
    }
    if radix == 0 {
        radix = 10;
    }
    if !(2..=36).contains(&radix) {
        return Ok(Value::Number(f64::NAN));
    }

    let mut result = None;
    for c in digits.chars() {
        let Some(digit) = c.to_digit(radix) else {
            break;
        };
        result = Some(result.unwrap_or(0.0) * f64::from(radix) + f64::from(digit));
    }
    Ok(Value::Number(match result {
        Some(n) if negative => -n,
        Some(n) => n,
        None => f64::NAN,
    }))
}

fn parse_float(args: &[Value]) -> EvalResult<Value> {
    let text = arg(args, 0).to_text();
    let trimmed = text.trim_start();
    for (prefix, value) in [
        ("Infinity", f64::INFINITY),
        ("+Infinity", f64::INFINITY),
        ("-Infinity", f64::NEG_INFINITY),
    ] {
        if trimmed.starts_with(prefix) {
            return Ok(Value::Number(value));
        }
    }

    let candidate: String = trimmed
        .chars()
        .take_while(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
        .collect();
    let parsed = (1..=candidate.len())
        .rev()
        .find_map(|end| candidate[..end].parse::<f64>().ok());
    Ok(Value::Number(parsed.unwrap_or(f64::NAN)))
}

fn encode_uri_component(args: &[Value]) -> EvalResult<Value> {
    let text = arg(args, 0).to_text();
    let mut out = String::with_capacity(text.len());
    for byte in text.bytes() {
        if byte.is_ascii_alphanumeric() || b"-_.!~*'()".contains(&byte) {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    Ok(Value::from(out))
}
