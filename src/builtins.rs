//! The primitive library: a fixed registry of host-implemented functions
//! pre-populated into the root environment.
//!
//! Every primitive receives the interpreter handle (for the `print` sink
//! and for re-entering the evaluator from the higher-order functions) plus
//! the already-evaluated argument slice. Arity is validated uniformly
//! before the function runs, so implementations may index their arguments
//! directly.

use std::fmt;
use std::rc::Rc;

use crate::Error;
use crate::evaluator::{Env, Interp};
use crate::value::{self, MapData, Value, key_text};

/// Argument-count policy for a callable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
    Range(usize, usize),
    Any,
}

impl Arity {
    /// Check an argument count, reporting the uniform
    /// "wrong number of arguments" error on mismatch.
    pub(crate) fn validate(&self, name: &str, got: usize) -> Result<(), Error> {
        let ok = match self {
            Arity::Exact(n) => got == *n,
            Arity::AtLeast(n) => got >= *n,
            Arity::Range(lo, hi) => (*lo..=*hi).contains(&got),
            Arity::Any => true,
        };
        if ok {
            Ok(())
        } else {
            Err(Error::arity(name, *self, got))
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "exactly {n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
            Arity::Range(lo, hi) => write!(f, "between {lo} and {hi}"),
            Arity::Any => write!(f, "any number of"),
        }
    }
}

/// Canonical primitive signature: evaluated arguments in, value out.
pub type PrimitiveFn = fn(&mut Interp, &[Value]) -> Result<Value, Error>;

/// One entry in the primitive registry.
pub struct Builtin {
    pub name: &'static str,
    pub arity: Arity,
    pub func: PrimitiveFn,
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#<primitive:{}>", self.name)
    }
}

/// Pre-populate an environment with every primitive.
pub(crate) fn install(env: &Env) {
    for builtin in BUILTINS {
        env.define(builtin.name, Value::Primitive(builtin));
    }
}

//
// Argument helpers
//

fn expect_num(name: &str, value: &Value) -> Result<f64, Error> {
    match value {
        Value::Num(n) => Ok(*n),
        other => Err(Error::TypeError(format!(
            "{name} expects numbers, got {}",
            other.type_name()
        ))),
    }
}

fn expect_seq<'v>(name: &str, value: &'v Value) -> Result<&'v [Value], Error> {
    match value {
        Value::List(items) | Value::Vector(items) => Ok(items),
        other => Err(Error::TypeError(format!(
            "{name} expects a list or vector, got {}",
            other.type_name()
        ))),
    }
}

fn expect_map<'v>(name: &str, value: &'v Value) -> Result<&'v MapData, Error> {
    match value {
        Value::Map(map) => Ok(map),
        other => Err(Error::TypeError(format!(
            "{name} expects a map, got {}",
            other.type_name()
        ))),
    }
}

//
// Arithmetic
//

fn prim_add(_: &mut Interp, args: &[Value]) -> Result<Value, Error> {
    let mut sum = 0.0;
    for arg in args {
        sum += expect_num("+", arg)?;
    }
    Ok(Value::Num(sum))
}

fn prim_sub(_: &mut Interp, args: &[Value]) -> Result<Value, Error> {
    let first = expect_num("-", &args[0])?;
    if args.len() == 1 {
        return Ok(Value::Num(-first));
    }
    let mut result = first;
    for arg in &args[1..] {
        result -= expect_num("-", arg)?;
    }
    Ok(Value::Num(result))
}

fn prim_mul(_: &mut Interp, args: &[Value]) -> Result<Value, Error> {
    let mut product = 1.0;
    for arg in args {
        product *= expect_num("*", arg)?;
    }
    Ok(Value::Num(product))
}

/// Division never produces IEEE infinities: a zero divisor is an error.
/// With a single argument, `/` is the reciprocal.
fn prim_div(_: &mut Interp, args: &[Value]) -> Result<Value, Error> {
    let first = expect_num("/", &args[0])?;
    if args.len() == 1 {
        if first == 0.0 {
            return Err(Error::RuntimeError("division by zero".into()));
        }
        return Ok(Value::Num(1.0 / first));
    }
    let mut result = first;
    for arg in &args[1..] {
        let divisor = expect_num("/", arg)?;
        if divisor == 0.0 {
            return Err(Error::RuntimeError("division by zero".into()));
        }
        result /= divisor;
    }
    Ok(Value::Num(result))
}

/// Binary modulo, mirroring the host remainder operator: the result takes
/// the sign of the dividend, so `(% -7 3)` is -1.
fn prim_mod(_: &mut Interp, args: &[Value]) -> Result<Value, Error> {
    let a = expect_num("%", &args[0])?;
    let b = expect_num("%", &args[1])?;
    if b == 0.0 {
        return Err(Error::RuntimeError("division by zero".into()));
    }
    Ok(Value::Num(a % b))
}

//
// Comparison
//

/// `=` is structural: recursive over collections, order-insensitive for
/// maps, textual for keywords vs strings.
fn prim_eq(_: &mut Interp, args: &[Value]) -> Result<Value, Error> {
    Ok(Value::Bool(args[0] == args[1]))
}

macro_rules! numeric_comparison {
    ($fn_name:ident, $op:tt, $name:expr) => {
        fn $fn_name(_: &mut Interp, args: &[Value]) -> Result<Value, Error> {
            let a = expect_num($name, &args[0])?;
            let b = expect_num($name, &args[1])?;
            Ok(Value::Bool(a $op b))
        }
    };
}

numeric_comparison!(prim_lt, <, "<");
numeric_comparison!(prim_gt, >, ">");
numeric_comparison!(prim_le, <=, "<=");
numeric_comparison!(prim_ge, >=, ">=");

//
// List operations
//

fn prim_cons(_: &mut Interp, args: &[Value]) -> Result<Value, Error> {
    match &args[1] {
        Value::List(tail) => {
            let mut items = Vec::with_capacity(tail.len() + 1);
            items.push(args[0].clone());
            items.extend(tail.iter().cloned());
            Ok(value::list(items))
        }
        other => Err(Error::TypeError(format!(
            "cons expects a list as its second argument, got {}",
            other.type_name()
        ))),
    }
}

fn prim_car(_: &mut Interp, args: &[Value]) -> Result<Value, Error> {
    match &args[0] {
        Value::List(items) => match items.first() {
            Some(first) => Ok(first.clone()),
            None => Err(Error::RuntimeError("car of empty list".into())),
        },
        other => Err(Error::TypeError(format!(
            "car expects a list, got {}",
            other.type_name()
        ))),
    }
}

/// The cdr of the empty list is the empty list.
fn prim_cdr(_: &mut Interp, args: &[Value]) -> Result<Value, Error> {
    match &args[0] {
        Value::List(items) => Ok(value::list(items.iter().skip(1).cloned().collect())),
        other => Err(Error::TypeError(format!(
            "cdr expects a list, got {}",
            other.type_name()
        ))),
    }
}

fn prim_list(_: &mut Interp, args: &[Value]) -> Result<Value, Error> {
    Ok(value::list(args.to_vec()))
}

//
// Vector operations
//

fn prim_vec(_: &mut Interp, args: &[Value]) -> Result<Value, Error> {
    match &args[0] {
        Value::List(items) => Ok(value::vector(items.as_ref().clone())),
        Value::Vector(_) => Ok(args[0].clone()),
        other => Err(Error::TypeError(format!(
            "vec expects a list or vector, got {}",
            other.type_name()
        ))),
    }
}

fn prim_nth(_: &mut Interp, args: &[Value]) -> Result<Value, Error> {
    let items = expect_seq("nth", &args[0])?;
    let index = expect_num("nth", &args[1])?;
    if index.fract() != 0.0 {
        return Err(Error::TypeError("nth expects an integer index".into()));
    }
    if index < 0.0 || index as usize >= items.len() {
        return Err(Error::RuntimeError(format!(
            "nth index {index} out of bounds for length {}",
            items.len()
        )));
    }
    Ok(items[index as usize].clone())
}

fn prim_length(_: &mut Interp, args: &[Value]) -> Result<Value, Error> {
    let len = match &args[0] {
        Value::List(items) | Value::Vector(items) => items.len(),
        Value::Str(s) | Value::Keyword(s) => s.chars().count(),
        Value::Map(map) => map.len(),
        other => {
            return Err(Error::TypeError(format!(
                "length expects a list, vector, string or map, got {}",
                other.type_name()
            )));
        }
    };
    Ok(Value::Num(len as f64))
}

//
// Map operations
//

fn prim_get(_: &mut Interp, args: &[Value]) -> Result<Value, Error> {
    let map = expect_map("get", &args[0])?;
    let Some(key) = key_text(&args[1]) else {
        return Err(Error::TypeError(
            "map keys must be strings or keywords".into(),
        ));
    };
    Ok(map.get(key).cloned().unwrap_or(Value::Nil))
}

/// Functional update: returns a new map with the given key/value pairs
/// inserted; the original is untouched. Accepts one or more pairs.
fn prim_assoc(_: &mut Interp, args: &[Value]) -> Result<Value, Error> {
    if (args.len() - 1) % 2 != 0 {
        return Err(Error::arity("assoc", Arity::AtLeast(3), args.len()));
    }
    let mut updated = expect_map("assoc", &args[0])?.clone();
    for pair in args[1..].chunks_exact(2) {
        if key_text(&pair[0]).is_none() {
            return Err(Error::TypeError(
                "map keys must be strings or keywords".into(),
            ));
        }
        updated.insert(pair[0].clone(), pair[1].clone());
    }
    Ok(Value::Map(Rc::new(updated)))
}

//
// Higher-order functions. These re-enter the evaluator through the
// interpreter handle and accept any callable and any sequence; the result
// is always a list, whatever the input's outer shape.
//

fn prim_map(interp: &mut Interp, args: &[Value]) -> Result<Value, Error> {
    let items = expect_seq("map", &args[1])?;
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        out.push(interp.apply(&args[0], vec![item.clone()])?);
    }
    Ok(value::list(out))
}

fn prim_filter(interp: &mut Interp, args: &[Value]) -> Result<Value, Error> {
    let items = expect_seq("filter", &args[1])?;
    let mut out = Vec::new();
    for item in items {
        if interp.apply(&args[0], vec![item.clone()])?.is_truthy() {
            out.push(item.clone());
        }
    }
    Ok(value::list(out))
}

/// `(reduce f coll)` folds the sequence using its first element as the
/// seed; `(reduce f init coll)` starts from the given value.
fn prim_reduce(interp: &mut Interp, args: &[Value]) -> Result<Value, Error> {
    let (mut acc, rest) = match args {
        [_, coll] => {
            let items = expect_seq("reduce", coll)?;
            match items.split_first() {
                Some((first, rest)) => (first.clone(), rest),
                None => {
                    return Err(Error::RuntimeError(
                        "reduce of an empty sequence with no initial value".into(),
                    ));
                }
            }
        }
        [_, init, coll] => (init.clone(), expect_seq("reduce", coll)?),
        _ => unreachable!("arity checked by the registry"),
    };
    for item in rest {
        acc = interp.apply(&args[0], vec![acc, item.clone()])?;
    }
    Ok(acc)
}

//
// I/O and strings
//

/// Write each argument through the host print sink, separated by single
/// spaces. Strings print their raw text.
fn prim_print(interp: &mut Interp, args: &[Value]) -> Result<Value, Error> {
    let parts: Vec<String> = args.iter().map(Value::to_display_string).collect();
    interp.emit_print(&parts.join(" "));
    Ok(Value::Nil)
}

fn prim_str(_: &mut Interp, args: &[Value]) -> Result<Value, Error> {
    let mut out = String::new();
    for arg in args {
        out.push_str(&arg.to_display_string());
    }
    Ok(Value::Str(out))
}

//
// Predicates and introspection
//

macro_rules! type_predicate {
    ($fn_name:ident, $pattern:pat) => {
        fn $fn_name(_: &mut Interp, args: &[Value]) -> Result<Value, Error> {
            Ok(Value::Bool(matches!(&args[0], $pattern)))
        }
    };
}

type_predicate!(prim_is_list, Value::List(_));
type_predicate!(prim_is_vector, Value::Vector(_));
type_predicate!(prim_is_map, Value::Map(_));
type_predicate!(prim_is_fn, Value::Closure(_) | Value::Primitive(_));
type_predicate!(prim_is_nil, Value::Nil);
type_predicate!(prim_is_number, Value::Num(_));
type_predicate!(prim_is_string, Value::Str(_) | Value::Keyword(_));
type_predicate!(prim_is_true, Value::Bool(true));
type_predicate!(prim_is_false, Value::Bool(false));

fn prim_type_of(_: &mut Interp, args: &[Value]) -> Result<Value, Error> {
    Ok(Value::Str(args[0].type_name().into()))
}

/// The full primitive registry, installed into every root environment.
static BUILTINS: &[Builtin] = &[
    // Arithmetic
    Builtin { name: "+", arity: Arity::Any, func: prim_add },
    Builtin { name: "-", arity: Arity::AtLeast(1), func: prim_sub },
    Builtin { name: "*", arity: Arity::Any, func: prim_mul },
    Builtin { name: "/", arity: Arity::AtLeast(1), func: prim_div },
    Builtin { name: "%", arity: Arity::Exact(2), func: prim_mod },
    // Comparison
    Builtin { name: "=", arity: Arity::Exact(2), func: prim_eq },
    Builtin { name: "<", arity: Arity::Exact(2), func: prim_lt },
    Builtin { name: ">", arity: Arity::Exact(2), func: prim_gt },
    Builtin { name: "<=", arity: Arity::Exact(2), func: prim_le },
    Builtin { name: ">=", arity: Arity::Exact(2), func: prim_ge },
    // List operations
    Builtin { name: "cons", arity: Arity::Exact(2), func: prim_cons },
    Builtin { name: "car", arity: Arity::Exact(1), func: prim_car },
    Builtin { name: "cdr", arity: Arity::Exact(1), func: prim_cdr },
    Builtin { name: "list", arity: Arity::Any, func: prim_list },
    // Vector operations
    Builtin { name: "vec", arity: Arity::Exact(1), func: prim_vec },
    Builtin { name: "nth", arity: Arity::Exact(2), func: prim_nth },
    Builtin { name: "length", arity: Arity::Exact(1), func: prim_length },
    // Map operations
    Builtin { name: "get", arity: Arity::Exact(2), func: prim_get },
    Builtin { name: "assoc", arity: Arity::AtLeast(3), func: prim_assoc },
    // Higher-order functions
    Builtin { name: "map", arity: Arity::Exact(2), func: prim_map },
    Builtin { name: "filter", arity: Arity::Exact(2), func: prim_filter },
    Builtin { name: "reduce", arity: Arity::Range(2, 3), func: prim_reduce },
    // I/O and strings
    Builtin { name: "print", arity: Arity::Any, func: prim_print },
    Builtin { name: "str", arity: Arity::Any, func: prim_str },
    // Predicates and introspection
    Builtin { name: "list?", arity: Arity::Exact(1), func: prim_is_list },
    Builtin { name: "vector?", arity: Arity::Exact(1), func: prim_is_vector },
    Builtin { name: "map?", arity: Arity::Exact(1), func: prim_is_map },
    Builtin { name: "fn?", arity: Arity::Exact(1), func: prim_is_fn },
    Builtin { name: "nil?", arity: Arity::Exact(1), func: prim_is_nil },
    Builtin { name: "number?", arity: Arity::Exact(1), func: prim_is_number },
    Builtin { name: "string?", arity: Arity::Exact(1), func: prim_is_string },
    Builtin { name: "true?", arity: Arity::Exact(1), func: prim_is_true },
    Builtin { name: "false?", arity: Arity::Exact(1), func: prim_is_false },
    Builtin { name: "type-of", arity: Arity::Exact(1), func: prim_type_of },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn val<T: Into<Value>>(v: T) -> Value {
        v.into()
    }

    fn kw(name: &str) -> Value {
        Value::Keyword(name.into())
    }

    fn builtin(name: &str) -> &'static Builtin {
        BUILTINS
            .iter()
            .find(|b| b.name == name)
            .unwrap_or_else(|| panic!("builtin {name} not registered"))
    }

    /// Invoke a primitive through the registry with arity validation, the
    /// same path the evaluator takes.
    fn call(name: &str, args: &[Value]) -> Result<Value, Error> {
        let mut interp = Interp::new();
        let b = builtin(name);
        b.arity.validate(b.name, args.len())?;
        (b.func)(&mut interp, args)
    }

    #[test]
    fn test_primitive_table() {
        // (name, args, expected; None means any error)
        let cases: Vec<(&str, Vec<Value>, Option<Value>)> = vec![
            // Arithmetic identities and folds
            ("+", vec![], Some(val(0))),
            ("+", vec![val(5)], Some(val(5))),
            ("+", vec![val(1), val(2), val(3)], Some(val(6))),
            ("-", vec![val(4)], Some(val(-4))),
            ("-", vec![val(10), val(3), val(2)], Some(val(5))),
            ("-", vec![], None),
            ("*", vec![], Some(val(1))),
            ("*", vec![val(2), val(3), val(4)], Some(val(24))),
            ("/", vec![val(2)], Some(val(0.5))),
            ("/", vec![val(10), val(4)], Some(val(2.5))),
            ("/", vec![val(1), val(0)], None),
            ("/", vec![val(0)], None),
            ("%", vec![val(7), val(3)], Some(val(1))),
            ("%", vec![val(-7), val(3)], Some(val(-1))),
            ("%", vec![val(1), val(0)], None),
            ("+", vec![val(1), val("x")], None),
            // Comparison
            ("=", vec![val(1), val(1)], Some(val(true))),
            ("=", vec![val("a"), kw("a")], Some(val(true))),
            ("=", vec![val([1, 2]), val([1, 2])], Some(val(true))),
            ("=", vec![val(1), val("1")], Some(val(false))),
            ("<", vec![val(1), val(2)], Some(val(true))),
            (">", vec![val(1), val(2)], Some(val(false))),
            ("<=", vec![val(2), val(2)], Some(val(true))),
            (">=", vec![val(1), val(2)], Some(val(false))),
            ("<", vec![val(1)], None),
            ("<", vec![val(1), val("x")], None),
            // Lists
            ("cons", vec![val(0), val([1, 2])], Some(val([0, 1, 2]))),
            ("cons", vec![val(0), value::list(vec![])], Some(val([0]))),
            ("cons", vec![val(0), val(1)], None),
            ("car", vec![val([1, 2, 3])], Some(val(1))),
            ("car", vec![value::list(vec![])], None),
            ("car", vec![val("s")], None),
            ("cdr", vec![val([1, 2, 3])], Some(val([2, 3]))),
            ("cdr", vec![val([1])], Some(value::list(vec![]))),
            // cdr of the empty list is the empty list
            ("cdr", vec![value::list(vec![])], Some(value::list(vec![]))),
            ("list", vec![], Some(value::list(vec![]))),
            ("list", vec![val(1), val("a")], Some(Value::List(Rc::new(vec![
                val(1),
                val("a"),
            ])))),
            // Vectors
            ("vec", vec![val([1, 2])], Some(value::vector(vec![val(1), val(2)]))),
            (
                "vec",
                vec![value::vector(vec![val(1)])],
                Some(value::vector(vec![val(1)])),
            ),
            ("vec", vec![val(1)], None),
            ("nth", vec![value::vector(vec![val(10), val(20)]), val(1)], Some(val(20))),
            ("nth", vec![val([10, 20]), val(0)], Some(val(10))),
            ("nth", vec![val([10]), val(3)], None),
            ("nth", vec![val([10]), val(-1)], None),
            ("nth", vec![val([10]), val(0.5)], None),
            ("length", vec![val([1, 2, 3])], Some(val(3))),
            ("length", vec![val("abc")], Some(val(3))),
            ("length", vec![val(1)], None),
            // Strings
            ("str", vec![], Some(val(""))),
            ("str", vec![val("a"), val(1), val(true)], Some(val("a1true"))),
            ("str", vec![kw("k")], Some(val(":k"))),
            // Predicates
            ("list?", vec![val([1])], Some(val(true))),
            ("list?", vec![value::vector(vec![])], Some(val(false))),
            ("vector?", vec![value::vector(vec![])], Some(val(true))),
            ("nil?", vec![Value::Nil], Some(val(true))),
            ("nil?", vec![val(false)], Some(val(false))),
            ("number?", vec![val(3)], Some(val(true))),
            ("string?", vec![val("s")], Some(val(true))),
            ("string?", vec![kw("s")], Some(val(true))),
            ("true?", vec![val(true)], Some(val(true))),
            ("true?", vec![val(1)], Some(val(false))),
            ("false?", vec![val(false)], Some(val(true))),
            ("type-of", vec![Value::Nil], Some(val("nil"))),
            ("type-of", vec![val(1)], Some(val("number"))),
            ("type-of", vec![val(true)], Some(val("boolean"))),
            ("type-of", vec![val("s")], Some(val("string"))),
            ("type-of", vec![kw("s")], Some(val("string"))),
            ("type-of", vec![val([1])], Some(val("list"))),
            ("type-of", vec![value::vector(vec![])], Some(val("vector"))),
            // Arity failures go through the shared validator
            ("car", vec![], None),
            ("nth", vec![val([1])], None),
            ("type-of", vec![val(1), val(2)], None),
        ];

        for (i, (name, args, expected)) in cases.iter().enumerate() {
            let result = call(name, args);
            match (result, expected) {
                (Ok(actual), Some(expected_val)) => {
                    assert_eq!(
                        &actual,
                        expected_val,
                        "case #{}: ({name} {args:?})",
                        i + 1
                    );
                }
                (Err(_), None) => {}
                (Ok(actual), None) => panic!(
                    "case #{}: expected error for ({name} {args:?}), got {actual:?}",
                    i + 1
                ),
                (Err(err), Some(expected_val)) => panic!(
                    "case #{}: expected {expected_val:?} for ({name} {args:?}), got error '{err}'",
                    i + 1
                ),
            }
        }
    }

    #[test]
    fn test_map_primitives() {
        let map = Value::Map(Rc::new(MapData::from_pairs(vec![
            (kw("a"), val(1)),
            (kw("b"), val(2)),
        ])));

        assert_eq!(call("get", &[map.clone(), kw("a")]), Ok(val(1)));
        assert_eq!(call("get", &[map.clone(), val("a")]), Ok(val(1)));
        assert_eq!(call("get", &[map.clone(), kw("zzz")]), Ok(Value::Nil));
        assert!(call("get", &[val(1), kw("a")]).is_err());
        assert!(call("get", &[map.clone(), val(1)]).is_err());
        assert_eq!(call("map?", std::slice::from_ref(&map)), Ok(val(true)));
        assert_eq!(call("length", std::slice::from_ref(&map)), Ok(val(2)));
        assert_eq!(call("type-of", std::slice::from_ref(&map)), Ok(val("map")));

        // assoc is functional and supports multiple pairs
        let updated = call("assoc", &[map.clone(), kw("a"), val(9), kw("c"), val(3)])
            .expect("assoc failed");
        assert_eq!(call("get", &[updated.clone(), kw("a")]), Ok(val(9)));
        assert_eq!(call("get", &[updated.clone(), kw("c")]), Ok(val(3)));
        assert_eq!(call("get", &[map.clone(), kw("a")]), Ok(val(1)));
        assert_eq!(call("length", &[updated]), Ok(val(3)));

        // odd key/value tail is an arity error
        assert!(call("assoc", &[map, kw("a"), val(1), kw("b")]).is_err());
    }

    #[test]
    fn test_higher_order_primitives_with_builtin_callables() {
        let plus = Value::Primitive(builtin("+"));
        let coll = val([1, 2, 3, 4]);

        assert_eq!(
            call("reduce", &[plus.clone(), coll.clone()]),
            Ok(val(10))
        );
        assert_eq!(
            call("reduce", &[plus.clone(), val(100), coll.clone()]),
            Ok(val(110))
        );
        assert!(call("reduce", &[plus.clone(), value::list(vec![])]).is_err());
        assert_eq!(
            call("reduce", &[plus.clone(), val(5), value::list(vec![])]),
            Ok(val(5))
        );

        let is_num = Value::Primitive(builtin("number?"));
        assert_eq!(
            call("filter", &[is_num.clone(), val(vec![val(1), val("x"), val(2)])]),
            Ok(val([1, 2]))
        );
        assert_eq!(
            call("map", &[Value::Primitive(builtin("type-of")), val([1, 2])]),
            Ok(val(["number", "number"]))
        );
        // map over a vector yields a list
        assert_eq!(
            call("map", &[is_num, value::vector(vec![val(1)])]),
            Ok(val([true]))
        );
        assert!(call("map", &[plus, val(1)]).is_err());
    }

    #[test]
    fn test_print_goes_through_the_sink() {
        let captured = Rc::new(RefCell::new(Vec::<String>::new()));
        let mut interp = Interp::new();
        let sink_lines = captured.clone();
        interp.set_print_sink(move |line| sink_lines.borrow_mut().push(line.to_owned()));

        let b = builtin("print");
        (b.func)(&mut interp, &[val(1), val("two"), kw("three")]).expect("print failed");
        (b.func)(&mut interp, &[]).expect("print failed");

        assert_eq!(*captured.borrow(), vec!["1 two :three".to_owned(), String::new()]);
    }
}
