//! Function registry and builtin functions available inside templates.
//!
//! `and` and `or` are not registered here: the executor evaluates them
//! itself so their arguments short-circuit.

use std::cmp::Ordering;

use indexmap::IndexMap;

use super::Value;

/// Result of a template function. The message is wrapped into a render error
/// naming the function.
pub type FuncResult = std::result::Result<Value, String>;

pub type Function = fn(&[Value]) -> FuncResult;

/// Named functions callable from templates.
#[derive(Clone)]
pub struct FuncMap {
    funcs: IndexMap<String, Function>,
}

impl std::fmt::Debug for FuncMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.funcs.keys()).finish()
    }
}

impl FuncMap {
    /// A map holding the builtin functions only.
    pub fn new() -> Self {
        let mut map = Self { funcs: IndexMap::new() };
        map.insert("not", not);
        map.insert("len", len);
        map.insert("index", index);
        map.insert("eq", eq);
        map.insert("ne", ne);
        map.insert("lt", lt);
        map.insert("le", le);
        map.insert("gt", gt);
        map.insert("ge", ge);
        map.insert("print", print);
        map.insert("printf", printf);
        map.insert("println", println);
        map
    }

    /// Registers `func` under `name`, replacing any previous entry.
    pub fn insert(&mut self, name: impl Into<String>, func: Function) -> &mut Self {
        self.funcs.insert(name.into(), func);
        self
    }

    pub fn get(&self, name: &str) -> Option<Function> {
        self.funcs.get(name).copied()
    }
}

impl Default for FuncMap {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn arity(args: &[Value], want: usize) -> Result<(), String> {
    if args.len() == want {
        Ok(())
    } else {
        Err(format!("wrong number of args: want {want} got {}", args.len()))
    }
}

fn not(args: &[Value]) -> FuncResult {
    arity(args, 1)?;
    Ok(Value::Bool(!args[0].is_true()))
}

fn len(args: &[Value]) -> FuncResult {
    arity(args, 1)?;
    let n = match &args[0] {
        Value::Str(s) => s.len(),
        Value::List(items) => items.len(),
        Value::Map(map) => map.len(),
        other => return Err(format!("len of type {}", other.type_name())),
    };
    Ok(Value::Int(n as i64))
}

fn index(args: &[Value]) -> FuncResult {
    let Some((item, indices)) = args.split_first() else {
        return Err("wrong number of args: want at least 1 got 0".to_string());
    };
    let mut item = item.clone();
    for idx in indices {
        item = match (&item, idx) {
            (Value::List(items), Value::Int(i)) => usize::try_from(*i)
                .ok()
                .and_then(|i| items.get(i))
                .cloned()
                .ok_or_else(|| format!("index out of range: {i}"))?,
            (Value::Str(s), Value::Int(i)) => usize::try_from(*i)
                .ok()
                .and_then(|i| s.as_bytes().get(i))
                .map(|b| Value::Int(i64::from(*b)))
                .ok_or_else(|| format!("index out of range: {i}"))?,
            (Value::Map(map), Value::Str(key)) => map.get(key).cloned().unwrap_or(Value::Nil),
            (Value::Nil, _) => return Err("index of untyped nil".to_string()),
            (Value::List(_) | Value::Str(_), other) | (Value::Map(_), other) => {
                return Err(format!("cannot index with type {}", other.type_name()))
            }
            (other, _) => return Err(format!("can't index item of type {}", other.type_name())),
        };
    }
    Ok(item)
}

/// Orders two basic values; numbers compare across int and float.
fn compare(a: &Value, b: &Value) -> Result<Option<Ordering>, String> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(Some(x.cmp(y))),
        (Value::Int(x), Value::Float(y)) => Ok((*x as f64).partial_cmp(y)),
        (Value::Float(x), Value::Int(y)) => Ok(x.partial_cmp(&(*y as f64))),
        (Value::Float(x), Value::Float(y)) => Ok(x.partial_cmp(y)),
        (Value::Str(x), Value::Str(y)) => Ok(Some(x.cmp(y))),
        (Value::Bool(x), Value::Bool(y)) => Ok(Some(x.cmp(y))),
        (Value::Time(x), Value::Time(y)) => Ok(Some(x.cmp(y))),
        (Value::Nil, Value::Nil) => Ok(Some(Ordering::Equal)),
        (Value::List(_) | Value::Map(_), _) | (_, Value::List(_) | Value::Map(_)) => {
            Err("non-comparable type".to_string())
        }
        _ => Err("incompatible types for comparison".to_string()),
    }
}

fn eq(args: &[Value]) -> FuncResult {
    let Some((first, rest)) = args.split_first() else {
        return Err("missing argument for comparison".to_string());
    };
    if rest.is_empty() {
        return Err("missing argument for comparison".to_string());
    }
    for other in rest {
        if compare(first, other)? == Some(Ordering::Equal) {
            return Ok(Value::Bool(true));
        }
    }
    Ok(Value::Bool(false))
}

fn ne(args: &[Value]) -> FuncResult {
    arity(args, 2)?;
    Ok(Value::Bool(compare(&args[0], &args[1])? != Some(Ordering::Equal)))
}

fn ordered(args: &[Value], accept: fn(Ordering) -> bool) -> FuncResult {
    arity(args, 2)?;
    if matches!(args[0], Value::Bool(_)) || matches!(args[1], Value::Bool(_)) {
        return Err("invalid type for comparison".to_string());
    }
    Ok(Value::Bool(compare(&args[0], &args[1])?.is_some_and(accept)))
}

fn lt(args: &[Value]) -> FuncResult {
    ordered(args, Ordering::is_lt)
}

fn le(args: &[Value]) -> FuncResult {
    ordered(args, Ordering::is_le)
}

fn gt(args: &[Value]) -> FuncResult {
    ordered(args, Ordering::is_gt)
}

fn ge(args: &[Value]) -> FuncResult {
    ordered(args, Ordering::is_ge)
}

/// Concatenates operands, adding a space between two operands when neither
/// is a string.
fn print(args: &[Value]) -> FuncResult {
    let mut out = String::new();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 && !matches!(arg, Value::Str(_)) && !matches!(args[i - 1], Value::Str(_)) {
            out.push(' ');
        }
        out.push_str(&arg.to_string());
    }
    Ok(Value::Str(out))
}

fn println(args: &[Value]) -> FuncResult {
    let mut out = args.iter().map(Value::to_string).collect::<Vec<_>>().join(" ");
    out.push('\n');
    Ok(Value::Str(out))
}

fn printf(args: &[Value]) -> FuncResult {
    let Some((Value::Str(format), rest)) = args.split_first() else {
        return Err("printf expects a format string".to_string());
    };
    Ok(Value::Str(sprintf(format, rest)))
}

#[derive(Default)]
struct Spec {
    minus: bool,
    plus: bool,
    zero: bool,
    width: Option<usize>,
    precision: Option<usize>,
}

/// Formats `args` according to `format`, supporting the `%v %s %d %f %q %t
/// %x %X %c %%` verbs with width, precision and the `-`, `+`, `0` flags.
pub fn sprintf(format: &str, args: &[Value]) -> String {
    let mut out = String::new();
    let mut chars = format.chars().peekable();
    let mut args = args.iter();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let mut spec = Spec::default();
        while let Some(&flag) = chars.peek() {
            match flag {
                '-' => spec.minus = true,
                '+' => spec.plus = true,
                '0' => spec.zero = true,
                ' ' | '#' => {}
                _ => break,
            }
            chars.next();
        }
        spec.width = take_digits(&mut chars);
        if chars.peek() == Some(&'.') {
            chars.next();
            spec.precision = Some(take_digits(&mut chars).unwrap_or(0));
        }
        let Some(verb) = chars.next() else {
            out.push_str("%!(NOVERB)");
            break;
        };
        if verb == '%' {
            out.push('%');
            continue;
        }
        let Some(arg) = args.next() else {
            out.push_str(&format!("%!{verb}(MISSING)"));
            continue;
        };
        let body = format_verb(verb, &spec, arg);
        out.push_str(&pad(body, &spec, matches!(arg, Value::Int(_) | Value::Float(_))));
    }

    let extra: Vec<String> = args.map(|a| format!("{}={a}", a.type_name())).collect();
    if !extra.is_empty() {
        out.push_str(&format!("%!(EXTRA {})", extra.join(", ")));
    }
    out
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<usize> {
    let mut digits = String::new();
    while let Some(&d) = chars.peek() {
        if !d.is_ascii_digit() {
            break;
        }
        digits.push(d);
        chars.next();
    }
    digits.parse().ok()
}

fn format_verb(verb: char, spec: &Spec, arg: &Value) -> String {
    let signed = |s: String, negative: bool| if spec.plus && !negative { format!("+{s}") } else { s };
    match (verb, arg) {
        ('v' | 's', Value::Str(s)) => match spec.precision {
            Some(p) => s.chars().take(p).collect(),
            None => s.clone(),
        },
        ('v', Value::Int(i)) | ('d', Value::Int(i)) => signed(i.to_string(), *i < 0),
        ('v', Value::Float(x)) => signed(arg.to_string(), *x < 0.0),
        ('v', _) => arg.to_string(),
        ('f' | 'F', Value::Float(x)) => signed(format!("{:.*}", spec.precision.unwrap_or(6), x), *x < 0.0),
        ('f' | 'F', Value::Int(i)) => {
            signed(format!("{:.*}", spec.precision.unwrap_or(6), *i as f64), *i < 0)
        }
        ('q', Value::Str(s)) => format!("{s:?}"),
        ('t', Value::Bool(b)) => b.to_string(),
        ('x', Value::Int(i)) => format!("{i:x}"),
        ('X', Value::Int(i)) => format!("{i:X}"),
        ('x', Value::Str(s)) => s.bytes().map(|b| format!("{b:02x}")).collect(),
        ('X', Value::Str(s)) => s.bytes().map(|b| format!("{b:02X}")).collect(),
        ('c', Value::Int(i)) => u32::try_from(*i)
            .ok()
            .and_then(char::from_u32)
            .map_or_else(|| "\u{FFFD}".to_string(), String::from),
        _ => format!("%!{verb}({}={arg})", arg.type_name()),
    }
}

fn pad(body: String, spec: &Spec, numeric: bool) -> String {
    let Some(width) = spec.width else {
        return body;
    };
    let len = body.chars().count();
    if len >= width {
        return body;
    }
    let fill = width - len;
    if spec.minus {
        format!("{body}{}", " ".repeat(fill))
    } else if spec.zero && numeric {
        let (sign, digits) = match body.strip_prefix(['-', '+']) {
            Some(digits) => (&body[..1], digits),
            None => ("", body.as_str()),
        };
        format!("{sign}{}{digits}", "0".repeat(fill))
    } else {
        format!("{}{body}", " ".repeat(fill))
    }
}
