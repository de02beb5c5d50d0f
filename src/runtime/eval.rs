//! Expression evaluator.
//!
//! Walks the expression tree with JavaScript's loose semantics for the
//! supported operators. Function literals become closures over the scope
//! they were evaluated in.

use std::cmp::Ordering;
use std::sync::Arc;

use super::builtins;
use super::errors::{EvalError, EvalResult};
use super::scope::{Frame, Scope};
use crate::compiler::ast::{
    BinaryOp, Element, Expr, FunctionBody, Lit, Prop, PropKey, Stmt, TemplatePart, UnaryOp,
};
use crate::value::{Closure, Function, Object, Value, format_number};

/// Nested closure calls allowed before evaluation gives up.
pub const MAX_CALL_DEPTH: usize = 100;

/// Evaluates `expr` against `scope`.
pub(crate) fn evaluate(expr: &Expr, scope: &dyn Scope) -> EvalResult<Value> {
    Evaluator::default().eval(expr, scope)
}

/// Tracks closure call depth across one evaluation.
#[derive(Debug, Default)]
pub(crate) struct Evaluator {
    depth: usize,
}

impl Evaluator {
    pub(crate) fn eval(&mut self, expr: &Expr, scope: &dyn Scope) -> EvalResult<Value> {
        match expr {
            Expr::Lit(lit) => Ok(literal(lit)),
            Expr::Ident(name) => Ok(scope
                .lookup(name)
                .or_else(|| builtins::global(name))
                .unwrap_or_default()),
            Expr::Template(parts) => {
                let mut out = String::new();
                for part in parts {
                    match part {
                        TemplatePart::Text(text) => out.push_str(text),
                        TemplatePart::Expr(expr) => out.push_str(&self.eval(expr, scope)?.to_text()),
                    }
                }
                Ok(Value::from(out))
            }
            Expr::Array(elements) => Ok(Value::from(self.elements(elements, scope)?)),
            Expr::Object(props) => self.object(props, scope),
            Expr::Member {
                object,
                property,
                optional,
            } => {
                let target = self.eval(object, scope)?;
                if *optional && target.is_nullish() {
                    return Ok(Value::Undefined);
                }
                get_property(&target, property)
            }
            Expr::Index {
                object,
                index,
                optional,
            } => {
                let target = self.eval(object, scope)?;
                if *optional && target.is_nullish() {
                    return Ok(Value::Undefined);
                }
                let key = property_key(&self.eval(index, scope)?);
                get_property(&target, &key)
            }
            Expr::Call {
                callee,
                args,
                optional,
            } => self.call_expr(callee, args, *optional, scope),
            Expr::Unary { op, operand } => {
                let value = self.eval(operand, scope)?;
                Ok(match op {
                    UnaryOp::Not => Value::Bool(!value.is_truthy()),
                    UnaryOp::Minus => Value::Number(-value.to_number()),
                    UnaryOp::Plus => Value::Number(value.to_number()),
                    UnaryOp::TypeOf => Value::from(value.type_of()),
                })
            }
            Expr::Binary { op, left, right } => self.binary(*op, left, right, scope),
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => {
                if self.eval(test, scope)?.is_truthy() {
                    self.eval(consequent, scope)
                } else {
                    self.eval(alternate, scope)
                }
            }
            Expr::Function(lit) => Ok(Value::Function(Function::Closure(Arc::new(Closure {
                lit: Arc::clone(lit),
                env: scope.capture(),
            })))),
        }
    }

    /// Calls `function` with `args`.
    pub(crate) fn call(&mut self, function: &Function, args: &[Value]) -> EvalResult<Value> {
        match function {
            Function::Native(f) => f(args),
            Function::Closure(closure) => {
                if self.depth >= MAX_CALL_DEPTH {
                    return Err(EvalError::CallDepth {
                        limit: MAX_CALL_DEPTH,
                    });
                }
                self.depth += 1;
                let result = self.run_closure(closure, args);
                self.depth -= 1;
                result
            }
        }
    }

    fn run_closure(&mut self, closure: &Closure, args: &[Value]) -> EvalResult<Value> {
        let mut frame = Frame::new(Arc::clone(&closure.env));
        for (i, param) in closure.lit.params.iter().enumerate() {
            frame.bind(param, args.get(i).cloned().unwrap_or_default());
        }

        let statements = match &closure.lit.body {
            FunctionBody::Expr(expr) => return self.eval(expr, &frame),
            FunctionBody::Block(statements) => statements,
        };

        for statement in statements {
            match statement {
                Stmt::Declare { name, init } => {
                    let value = match init {
                        Some(init) => self.eval(init, &frame)?,
                        None => Value::Undefined,
                    };
                    frame.bind(name, value);
                }
                Stmt::Expr(expr) => {
                    self.eval(expr, &frame)?;
                }
                Stmt::Return(expr) => {
                    return match expr {
                        Some(expr) => self.eval(expr, &frame),
                        None => Ok(Value::Undefined),
                    };
                }
            }
        }
        Ok(Value::Undefined)
    }

    fn call_expr(
        &mut self,
        callee: &Expr,
        args: &[Element],
        optional: bool,
        scope: &dyn Scope,
    ) -> EvalResult<Value> {
        let Expr::Member {
            object,
            property,
            optional: optional_member,
        } = callee
        else {
            let function = self.eval(callee, scope)?;
            if optional && function.is_nullish() {
                return Ok(Value::Undefined);
            }
            let args = self.elements(args, scope)?;
            return self.call_value(&function, &args, callee);
        };

        let receiver = self.eval(object, scope)?;
        if *optional_member && receiver.is_nullish() {
            return Ok(Value::Undefined);
        }
        let own = match &receiver {
            Value::Object(map) => map.get(property.as_str()).cloned(),
            _ => None,
        };
        let args = self.elements(args, scope)?;

        if let Some(function) = own.filter(|f| !(optional && f.is_nullish())) {
            return self.call_value(&function, &args, callee);
        }
        if let Some(result) = builtins::call_method(self, &receiver, property, &args)? {
            return Ok(result);
        }

        let function = get_property(&receiver, property)?;
        if optional && function.is_nullish() {
            return Ok(Value::Undefined);
        }
        self.call_value(&function, &args, callee)
    }

    fn call_value(&mut self, function: &Value, args: &[Value], callee: &Expr) -> EvalResult<Value> {
        match function {
            Value::Function(function) => self.call(function, args),
            _ => Err(EvalError::NotCallable {
                callee: describe(callee),
            }),
        }
    }

    fn elements(&mut self, elements: &[Element], scope: &dyn Scope) -> EvalResult<Vec<Value>> {
        let mut values = Vec::with_capacity(elements.len());
        for element in elements {
            match element {
                Element::Item(expr) => values.push(self.eval(expr, scope)?),
                Element::Spread(expr) => match self.eval(expr, scope)? {
                    Value::Array(items) => values.extend(items.iter().cloned()),
                    Value::String(s) => values.extend(s.chars().map(|c| Value::from(c.to_string()))),
                    Value::Undefined | Value::Null => {
                        return Err(EvalError::NotIterable {
                            target: "undefined or null",
                        });
                    }
                    other => {
                        return Err(EvalError::NotIterable {
                            target: other.type_of(),
                        });
                    }
                },
            }
        }
        Ok(values)
    }

    fn object(&mut self, props: &[Prop], scope: &dyn Scope) -> EvalResult<Value> {
        let mut map = Object::with_capacity(props.len());
        for prop in props {
            match prop {
                Prop::KeyValue(key, value) => {
                    let key = match key {
                        PropKey::Named(name) => name.clone(),
                        PropKey::Computed(expr) => property_key(&self.eval(expr, scope)?),
                    };
                    let value = self.eval(value, scope)?;
                    map.insert(key, value);
                }
                Prop::Shorthand(name) => {
                    let value = self.eval(&Expr::Ident(name.clone()), scope)?;
                    map.insert(name.clone(), value);
                }
                Prop::Spread(expr) => match self.eval(expr, scope)? {
                    Value::Object(other) => {
                        map.extend(other.iter().map(|(k, v)| (k.clone(), v.clone())));
                    }
                    Value::Array(items) => {
                        for (i, item) in items.iter().enumerate() {
                            map.insert(i.to_string(), item.clone());
                        }
                    }
                    _ => {}
                },
            }
        }
        Ok(Value::from(map))
    }

    fn binary(
        &mut self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        scope: &dyn Scope,
    ) -> EvalResult<Value> {
        let left = self.eval(left, scope)?;
        let pick_left = match op {
            BinaryOp::And => Some(!left.is_truthy()),
            BinaryOp::Or => Some(left.is_truthy()),
            BinaryOp::NullishCoalesce => Some(!left.is_nullish()),
            _ => None,
        };
        match pick_left {
            Some(true) => Ok(left),
            Some(false) => self.eval(right, scope),
            None => {
                let right = self.eval(right, scope)?;
                apply_binary(op, &left, &right)
            }
        }
    }
}

fn literal(lit: &Lit) -> Value {
    match lit {
        Lit::Number(n) => Value::Number(*n),
        Lit::Str(s) => Value::String(Arc::clone(s)),
        Lit::Bool(b) => Value::Bool(*b),
        Lit::Null => Value::Null,
        Lit::Undefined => Value::Undefined,
    }
}

/// Applies an operator to two evaluated operands.
pub(crate) fn apply_binary(op: BinaryOp, left: &Value, right: &Value) -> EvalResult<Value> {
    let number = |f: fn(f64, f64) -> f64| Value::Number(f(left.to_number(), right.to_number()));
    let ordering = compare(left, right);

    Ok(match op {
        BinaryOp::Add => add(left, right),
        BinaryOp::Sub => number(|a, b| a - b),
        BinaryOp::Mul => number(|a, b| a * b),
        BinaryOp::Div => number(|a, b| a / b),
        BinaryOp::Mod => number(|a, b| a % b),
        BinaryOp::Exp => number(f64::powf),
        BinaryOp::EqEq => Value::Bool(loose_equals(left, right)),
        BinaryOp::NotEq => Value::Bool(!loose_equals(left, right)),
        BinaryOp::EqEqEq => Value::Bool(strict_equals(left, right)),
        BinaryOp::NotEqEq => Value::Bool(!strict_equals(left, right)),
        BinaryOp::Lt => Value::Bool(ordering == Some(Ordering::Less)),
        BinaryOp::Le => Value::Bool(matches!(ordering, Some(Ordering::Less | Ordering::Equal))),
        BinaryOp::Gt => Value::Bool(ordering == Some(Ordering::Greater)),
        BinaryOp::Ge => Value::Bool(matches!(
            ordering,
            Some(Ordering::Greater | Ordering::Equal)
        )),
        BinaryOp::And => pick(!left.is_truthy(), left, right),
        BinaryOp::Or => pick(left.is_truthy(), left, right),
        BinaryOp::NullishCoalesce => pick(!left.is_nullish(), left, right),
        BinaryOp::In => Value::Bool(contains_key(left, right)?),
    })
}

fn pick(take_left: bool, left: &Value, right: &Value) -> Value {
    if take_left { left.clone() } else { right.clone() }
}

fn add(left: &Value, right: &Value) -> Value {
    let concatenates = |v: &Value| {
        matches!(
            v,
            Value::String(_) | Value::Array(_) | Value::Object(_) | Value::Function(_)
        )
    };
    if concatenates(left) || concatenates(right) {
        let mut text = left.to_text();
        text.push_str(&right.to_text());
        Value::from(text)
    } else {
        Value::Number(left.to_number() + right.to_number())
    }
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => left.to_number().partial_cmp(&right.to_number()),
    }
}

fn contains_key(key: &Value, target: &Value) -> EvalResult<bool> {
    let key = property_key(key);
    match target {
        Value::Object(map) => Ok(map.contains_key(&key)),
        Value::Array(items) => Ok(key == "length" || key.parse::<usize>().is_ok_and(|i| i < items.len())),
        other => Err(EvalError::InvalidIn {
            key,
            target: other.to_text(),
        }),
    }
}

/// `===`: no coercion, arrays and objects compare by identity.
pub(crate) fn strict_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => Arc::ptr_eq(a, b),
        (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
        (Value::Function(a), Value::Function(b)) => a.same(b),
        _ => false,
    }
}

/// `==`: `null` equals `undefined`, numbers, strings and booleans coerce.
pub(crate) fn loose_equals(left: &Value, right: &Value) -> bool {
    use Value::*;

    match (left, right) {
        (Undefined | Null, Undefined | Null) => true,
        (Undefined | Null, _) | (_, Undefined | Null) => false,
        (Bool(b), _) => loose_equals(&Number(f64::from(u8::from(*b))), right),
        (_, Bool(b)) => loose_equals(left, &Number(f64::from(u8::from(*b)))),
        (Number(a), String(_)) => *a == right.to_number(),
        (String(_), Number(b)) => left.to_number() == *b,
        (Array(_) | Object(_) | Function(_), String(_) | Number(_)) => {
            loose_equals(&Value::from(left.to_text()), right)
        }
        (String(_) | Number(_), Array(_) | Object(_) | Function(_)) => {
            loose_equals(left, &Value::from(right.to_text()))
        }
        _ => strict_equals(left, right),
    }
}

/// The property name a computed key refers to.
pub(crate) fn property_key(key: &Value) -> String {
    match key {
        Value::Number(n) => format_number(*n),
        Value::String(s) => s.to_string(),
        other => other.to_text(),
    }
}

/// Reads `key` from `target`. Reading from `undefined` or `null` fails.
pub(crate) fn get_property(target: &Value, key: &str) -> EvalResult<Value> {
    match target {
        Value::Undefined | Value::Null => Err(EvalError::PropertyOfNullish {
            property: key.to_string(),
            target: if target.is_undefined() { "undefined" } else { "null" },
        }),
        Value::Object(map) => Ok(map.get(key).cloned().unwrap_or_default()),
        Value::Array(items) => Ok(match key {
            "length" => Value::from(items.len()),
            _ => key
                .parse::<usize>()
                .ok()
                .and_then(|i| items.get(i))
                .cloned()
                .unwrap_or_default(),
        }),
        Value::String(s) => Ok(match key {
            "length" => Value::from(s.chars().count()),
            _ => key
                .parse::<usize>()
                .ok()
                .and_then(|i| s.chars().nth(i))
                .map(|c| Value::from(c.to_string()))
                .unwrap_or_default(),
        }),
        _ => Ok(Value::Undefined),
    }
}

/// Readable name of a callee for error messages.
fn describe(expr: &Expr) -> String {
    match expr {
        Expr::Ident(name) => name.clone(),
        Expr::Member {
            object, property, ..
        } => format!("{}.{}", describe(object), property),
        Expr::Index { object, .. } => format!("{}[...]", describe(object)),
        Expr::Call { callee, .. } => format!("{}(...)", describe(callee)),
        Expr::Lit(lit) => literal(lit).to_text(),
        _ => "expression".to_string(),
    }
}
