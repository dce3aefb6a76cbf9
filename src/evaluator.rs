//! The tree-walking evaluator: environments, special forms, application,
//! and the quote/quasiquote machinery.
//!
//! Evaluation dispatches once per expression variant. List forms resolve
//! their head with this precedence: reserved special form, then user macro
//! (expand and re-evaluate), then an ordinary callable value from the
//! environment.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::{Expr, ExprKind, Lit};
use crate::builtins::{self, Arity};
use crate::macros::MacroTable;
use crate::value::{self, Closure, MapData, Value, key_text};
use crate::{Error, MAX_MACRO_DEPTH};

/// Reserved special form names, recognised before macro and environment
/// lookup. The macro expander also treats these as never-renamed.
pub(crate) const SPECIAL_FORMS: &[&str] =
    &["def", "defn", "fn", "let", "if", "do", "quote", "defmacro"];

pub(crate) fn is_special_form(name: &str) -> bool {
    SPECIAL_FORMS.contains(&name)
}

/// A lexical scope: bindings plus an optional parent link. Environments
/// are shared by reference among the closures captured inside them, so a
/// closure extends the lifetime of its defining scope.
pub struct Env {
    bindings: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Env>>,
}

impl Env {
    fn new(parent: Option<Rc<Env>>) -> Rc<Env> {
        Rc::new(Env {
            bindings: RefCell::new(HashMap::new()),
            parent,
        })
    }

    pub(crate) fn root() -> Rc<Env> {
        Env::new(None)
    }

    pub(crate) fn child(parent: &Rc<Env>) -> Rc<Env> {
        Env::new(Some(parent.clone()))
    }

    pub(crate) fn define(&self, name: impl Into<String>, value: Value) {
        self.bindings.borrow_mut().insert(name.into(), value);
    }

    /// Walk the parent chain until a binding is found.
    pub(crate) fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|parent| parent.get(name))
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.bindings.borrow().contains_key(name)
            || self.parent.as_ref().is_some_and(|parent| parent.contains(name))
    }
}

/// One interpreter instance: the root environment (pre-loaded with
/// primitives), the macro table, the gensym counter, and the host print
/// sink. Instances share no state and are not thread-safe.
pub struct Interp {
    root: Rc<Env>,
    macros: MacroTable,
    gensyms: u64,
    macro_depth: usize,
    sink: Option<Box<dyn FnMut(&str)>>,
}

impl Default for Interp {
    fn default() -> Self {
        Self::new()
    }
}

impl Interp {
    pub fn new() -> Self {
        let root = Env::root();
        builtins::install(&root);
        Interp {
            root,
            macros: MacroTable::default(),
            gensyms: 0,
            macro_depth: 0,
            sink: None,
        }
    }

    /// Install a callback that receives each `print` line. Without one,
    /// `print` writes to standard output.
    pub fn set_print_sink(&mut self, sink: impl FnMut(&str) + 'static) {
        self.sink = Some(Box::new(sink));
    }

    pub fn clear_print_sink(&mut self) {
        self.sink = None;
    }

    pub(crate) fn emit_print(&mut self, text: &str) {
        match &mut self.sink {
            Some(sink) => sink(text),
            None => println!("{text}"),
        }
    }

    pub(crate) fn root(&self) -> &Rc<Env> {
        &self.root
    }

    pub(crate) fn macros(&self) -> &MacroTable {
        &self.macros
    }

    /// Mint a fresh identifier for macro hygiene. The counter is global to
    /// the interpreter so names never collide across expansions.
    pub(crate) fn gensym(&mut self, base: &str) -> String {
        self.gensyms += 1;
        format!("{base}__gen{}", self.gensyms)
    }

    /// All root bindings sorted by name, for host tooling such as the REPL
    /// environment listing.
    pub fn root_bindings(&self) -> Vec<(String, Value)> {
        let mut items: Vec<(String, Value)> = self
            .root
            .bindings
            .borrow()
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        items.sort_by(|a, b| a.0.cmp(&b.0));
        items
    }

    /// Evaluate a top-level expression against the root environment.
    pub fn eval(&mut self, expr: &Expr) -> Result<Value, Error> {
        let root = self.root.clone();
        self.eval_in(expr, &root)
    }

    pub(crate) fn eval_in(&mut self, expr: &Expr, env: &Rc<Env>) -> Result<Value, Error> {
        match &expr.kind {
            ExprKind::Literal(lit) => Ok(lit_value(lit)),
            ExprKind::Symbol(name) => env
                .get(name)
                .ok_or_else(|| Error::UnboundSymbol(name.clone())),
            ExprKind::Vector(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.eval_in(item, env)?);
                }
                Ok(value::vector(out))
            }
            ExprKind::Map(pairs) => {
                let mut map = MapData::new();
                for (key_expr, value_expr) in pairs {
                    let key = self.eval_in(key_expr, env)?;
                    if key_text(&key).is_none() {
                        return Err(Error::TypeError(
                            "map keys must be strings or keywords".into(),
                        ));
                    }
                    let value = self.eval_in(value_expr, env)?;
                    map.insert(key, value);
                }
                Ok(Value::Map(Rc::new(map)))
            }
            ExprKind::Quote(inner) => quote_expr(inner),
            ExprKind::Quasiquote(inner) => self.eval_quasiquote(inner, env),
            ExprKind::Unquote(_) => Err(Error::MacroError(
                "unquote used outside of a quasiquote".into(),
            )),
            ExprKind::Splice(_) => Err(Error::MacroError(
                "splice used outside of a quasiquote".into(),
            )),
            ExprKind::List(items) => self.eval_list(items, env),
        }
    }

    fn eval_list(&mut self, items: &[Expr], env: &Rc<Env>) -> Result<Value, Error> {
        let Some((head, args)) = items.split_first() else {
            return Ok(value::list(Vec::new()));
        };

        if let Some(name) = head.symbol_name() {
            match name {
                "def" => return self.eval_def(args, env),
                "defn" => return self.eval_defn(args, env),
                "fn" => return self.eval_fn(args, env),
                "let" => return self.eval_let(args, env),
                "if" => return self.eval_if(args, env),
                "do" => return self.eval_do(args, env),
                "quote" => return self.eval_quote_form(args),
                "defmacro" => return self.eval_defmacro(args),
                _ => {}
            }

            if let Some(def) = self.macros.get(name) {
                if self.macro_depth >= MAX_MACRO_DEPTH {
                    return Err(Error::MacroError("macro expansion too deep".into()));
                }
                let def = def.clone();
                let expansion = self.expand_macro(&def, args)?;
                self.macro_depth += 1;
                let result = self.eval_in(&expansion, env);
                self.macro_depth -= 1;
                return result;
            }

            let callee = env
                .get(name)
                .ok_or_else(|| Error::UnboundSymbol(name.to_owned()))?;
            let argv = self.eval_args(args, env)?;
            return self.apply(&callee, argv);
        }

        let callee = self.eval_in(head, env)?;
        let argv = self.eval_args(args, env)?;
        self.apply(&callee, argv)
    }

    /// Evaluate argument expressions left to right in the caller's
    /// environment.
    fn eval_args(&mut self, args: &[Expr], env: &Rc<Env>) -> Result<Vec<Value>, Error> {
        args.iter().map(|arg| self.eval_in(arg, env)).collect()
    }

    /// Apply a callable to already-evaluated arguments. Keywords are
    /// self-applying map accessors: `(:k m)` is `(get m :k)`.
    pub(crate) fn apply(&mut self, callee: &Value, args: Vec<Value>) -> Result<Value, Error> {
        match callee {
            Value::Primitive(builtin) => {
                builtin.arity.validate(builtin.name, args.len())?;
                (builtin.func)(self, &args)
            }
            Value::Closure(closure) => {
                if closure.params.len() != args.len() {
                    let name = closure.name.clone().unwrap_or_else(|| "fn".to_owned());
                    return Err(Error::arity(
                        name,
                        Arity::Exact(closure.params.len()),
                        args.len(),
                    ));
                }
                let frame = Env::child(&closure.env);
                for (param, arg) in closure.params.iter().zip(args) {
                    frame.define(param.clone(), arg);
                }
                let mut result = Value::Nil;
                for expr in &closure.body {
                    result = self.eval_in(expr, &frame)?;
                }
                Ok(result)
            }
            Value::Keyword(name) => {
                Arity::Exact(1).validate(&format!(":{name}"), args.len())?;
                match &args[0] {
                    Value::Map(map) => Ok(map.get(name).cloned().unwrap_or(Value::Nil)),
                    other => Err(Error::TypeError(format!(
                        "keyword lookup expects a map, got {}",
                        other.type_name()
                    ))),
                }
            }
            other => Err(Error::TypeError(format!(
                "cannot apply non-function value: {other}"
            ))),
        }
    }

    fn eval_def(&mut self, args: &[Expr], env: &Rc<Env>) -> Result<Value, Error> {
        let [name_expr, value_expr] = args else {
            return Err(Error::arity("def", Arity::Exact(2), args.len()));
        };
        let Some(name) = name_expr.symbol_name() else {
            return Err(Error::TypeError("def requires a symbol name".into()));
        };
        let value = self.eval_in(value_expr, env)?;
        // definitions always land in the root environment (top-level
        // semantics), wherever the form appears
        self.root.define(name, value);
        Ok(Value::Nil)
    }

    fn eval_defn(&mut self, args: &[Expr], env: &Rc<Env>) -> Result<Value, Error> {
        let [name_expr, params_expr, body @ ..] = args else {
            return Err(Error::arity("defn", Arity::AtLeast(2), args.len()));
        };
        let Some(name) = name_expr.symbol_name() else {
            return Err(Error::TypeError("defn requires a symbol name".into()));
        };
        let closure = make_closure(Some(name.to_owned()), params_expr, body, env)?;
        self.root.define(name, closure);
        Ok(Value::Nil)
    }

    fn eval_fn(&mut self, args: &[Expr], env: &Rc<Env>) -> Result<Value, Error> {
        let [params_expr, body @ ..] = args else {
            return Err(Error::arity("fn", Arity::AtLeast(1), args.len()));
        };
        make_closure(None, params_expr, body, env)
    }

    fn eval_let(&mut self, args: &[Expr], env: &Rc<Env>) -> Result<Value, Error> {
        let [bindings_expr, body @ ..] = args else {
            return Err(Error::arity("let", Arity::AtLeast(1), args.len()));
        };
        let ExprKind::Vector(bindings) = &bindings_expr.kind else {
            return Err(Error::TypeError("let requires a binding vector".into()));
        };
        if bindings.len() % 2 != 0 {
            return Err(Error::TypeError(
                "let binding vector requires an even number of forms".into(),
            ));
        }
        let frame = Env::child(env);
        for pair in bindings.chunks_exact(2) {
            let Some(name) = pair[0].symbol_name() else {
                return Err(Error::TypeError("let binding targets must be symbols".into()));
            };
            // sequential: each init expression sees the previous bindings
            let value = self.eval_in(&pair[1], &frame)?;
            frame.define(name, value);
        }
        let mut result = Value::Nil;
        for expr in body {
            result = self.eval_in(expr, &frame)?;
        }
        Ok(result)
    }

    fn eval_if(&mut self, args: &[Expr], env: &Rc<Env>) -> Result<Value, Error> {
        match args {
            [cond, then_branch] => {
                if self.eval_in(cond, env)?.is_truthy() {
                    self.eval_in(then_branch, env)
                } else {
                    Ok(Value::Nil)
                }
            }
            [cond, then_branch, else_branch] => {
                if self.eval_in(cond, env)?.is_truthy() {
                    self.eval_in(then_branch, env)
                } else {
                    self.eval_in(else_branch, env)
                }
            }
            _ => Err(Error::arity("if", Arity::Range(2, 3), args.len())),
        }
    }

    fn eval_do(&mut self, args: &[Expr], env: &Rc<Env>) -> Result<Value, Error> {
        let mut result = Value::Nil;
        for expr in args {
            result = self.eval_in(expr, env)?;
        }
        Ok(result)
    }

    fn eval_quote_form(&mut self, args: &[Expr]) -> Result<Value, Error> {
        match args {
            [inner] => quote_expr(inner),
            _ => Err(Error::arity("quote", Arity::Exact(1), args.len())),
        }
    }

    fn eval_defmacro(&mut self, args: &[Expr]) -> Result<Value, Error> {
        let [name_expr, params_expr, body @ ..] = args else {
            return Err(Error::arity("defmacro", Arity::AtLeast(2), args.len()));
        };
        let Some(name) = name_expr.symbol_name() else {
            return Err(Error::MacroError("defmacro requires a symbol name".into()));
        };
        let ExprKind::Vector(param_items) = &params_expr.kind else {
            return Err(Error::MacroError(
                "defmacro requires a parameter vector".into(),
            ));
        };
        let mut params = Vec::with_capacity(param_items.len());
        for item in param_items {
            let Some(param) = item.symbol_name() else {
                return Err(Error::MacroError("macro parameters must be symbols".into()));
            };
            params.push(param.to_owned());
        }
        self.macros
            .define(name.to_owned(), params, body.to_vec());
        Ok(Value::Nil)
    }

    /// Structural quotation with escapes: unquote holes are evaluated in
    /// the current environment, splice holes flatten one level into the
    /// enclosing sequence. Quasiquoting is one level deep; a nested
    /// quasiquote re-quotes its contents literally.
    fn eval_quasiquote(&mut self, expr: &Expr, env: &Rc<Env>) -> Result<Value, Error> {
        match &expr.kind {
            ExprKind::Unquote(inner) => self.eval_in(inner, env),
            ExprKind::Splice(_) => Err(Error::MacroError(
                "splice must appear inside a sequence".into(),
            )),
            ExprKind::List(items) => Ok(value::list(self.quasiquote_items(items, env)?)),
            ExprKind::Vector(items) => Ok(value::vector(self.quasiquote_items(items, env)?)),
            ExprKind::Map(pairs) => {
                let mut map = MapData::new();
                for (key_expr, value_expr) in pairs {
                    let key = self.eval_quasiquote(key_expr, env)?;
                    if key_text(&key).is_none() {
                        return Err(Error::TypeError(
                            "map keys must be strings or keywords".into(),
                        ));
                    }
                    let value = self.eval_quasiquote(value_expr, env)?;
                    map.insert(key, value);
                }
                Ok(Value::Map(Rc::new(map)))
            }
            ExprKind::Quote(inner) | ExprKind::Quasiquote(inner) => quote_expr(inner),
            ExprKind::Literal(_) | ExprKind::Symbol(_) => quote_expr(expr),
        }
    }

    fn quasiquote_items(&mut self, items: &[Expr], env: &Rc<Env>) -> Result<Vec<Value>, Error> {
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            if let ExprKind::Splice(inner) = &item.kind {
                match self.eval_in(inner, env)? {
                    Value::List(elems) | Value::Vector(elems) => {
                        out.extend(elems.iter().cloned());
                    }
                    other => {
                        return Err(Error::MacroError(format!(
                            "cannot splice non-sequence value: {other}"
                        )));
                    }
                }
            } else {
                out.push(self.eval_quasiquote(item, env)?);
            }
        }
        Ok(out)
    }
}

pub(crate) fn lit_value(lit: &Lit) -> Value {
    match lit {
        Lit::Num(n) => Value::Num(*n),
        Lit::Str(s) => Value::Str(s.clone()),
        Lit::Bool(b) => Value::Bool(*b),
        Lit::Keyword(name) => Value::Keyword(name.clone()),
        Lit::Nil => Value::Nil,
    }
}

/// Convert an expression into a data value without evaluation. Quoted
/// symbols surface as strings; nested reader markers convert recursively.
pub(crate) fn quote_expr(expr: &Expr) -> Result<Value, Error> {
    match &expr.kind {
        ExprKind::Literal(lit) => Ok(lit_value(lit)),
        ExprKind::Symbol(name) => Ok(Value::Str(name.clone())),
        ExprKind::List(items) => Ok(value::list(
            items.iter().map(quote_expr).collect::<Result<_, _>>()?,
        )),
        ExprKind::Vector(items) => Ok(value::vector(
            items.iter().map(quote_expr).collect::<Result<_, _>>()?,
        )),
        ExprKind::Map(pairs) => {
            let mut map = MapData::new();
            for (key_expr, value_expr) in pairs {
                let key = quote_expr(key_expr)?;
                if key_text(&key).is_none() {
                    return Err(Error::TypeError(
                        "map keys must be strings or keywords".into(),
                    ));
                }
                map.insert(key, quote_expr(value_expr)?);
            }
            Ok(Value::Map(Rc::new(map)))
        }
        ExprKind::Quote(inner)
        | ExprKind::Quasiquote(inner)
        | ExprKind::Unquote(inner)
        | ExprKind::Splice(inner) => quote_expr(inner),
    }
}

fn make_closure(
    name: Option<String>,
    params_expr: &Expr,
    body: &[Expr],
    env: &Rc<Env>,
) -> Result<Value, Error> {
    let params = match &params_expr.kind {
        ExprKind::Vector(items) => {
            let mut names = Vec::with_capacity(items.len());
            for item in items {
                let Some(param) = item.symbol_name() else {
                    return Err(Error::TypeError("fn parameters must be symbols".into()));
                };
                if names.iter().any(|existing| existing == param) {
                    return Err(Error::TypeError(format!(
                        "duplicate parameter name: {param}"
                    )));
                }
                names.push(param.to_owned());
            }
            names
        }
        // (fn x body) takes a single parameter named x
        ExprKind::Symbol(param) => vec![param.clone()],
        _ => {
            return Err(Error::TypeError(
                "fn parameters must be a vector of symbols".into(),
            ));
        }
    };
    Ok(Value::Closure(Rc::new(Closure {
        name,
        params,
        body: body.to_vec(),
        env: env.clone(),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;

    fn val<T: Into<Value>>(v: T) -> Value {
        v.into()
    }

    fn kw(name: &str) -> Value {
        Value::Keyword(name.into())
    }

    /// Test result variants for the data-driven evaluator tests.
    enum TestResult {
        Evals(Value),
        SpecificError(&'static str),
        AnyError,
    }
    use TestResult::*;

    fn success<T: Into<Value>>(v: T) -> TestResult {
        Evals(v.into())
    }

    /// A setup form that defines something and returns nil.
    macro_rules! setup {
        ($src:expr) => {
            ($src, Evals(Value::Nil))
        };
    }

    /// Parse and evaluate every form, yielding the last value.
    fn eval_all(interp: &mut Interp, source: &str) -> Result<Value, Error> {
        let exprs = parse_source(source)?;
        let mut last = Value::Nil;
        for expr in &exprs {
            last = interp.eval(expr)?;
        }
        Ok(last)
    }

    fn check(interp: &mut Interp, source: &str, expected: &TestResult, id: &str) {
        match (eval_all(interp, source), expected) {
            (Ok(actual), Evals(expected_val)) => {
                assert_eq!(&actual, expected_val, "{id}: input {source:?}");
            }
            (Err(_), AnyError) => {}
            (Err(err), SpecificError(needle)) => {
                let message = err.to_string();
                assert!(
                    message.contains(needle),
                    "{id}: error {message:?} should contain {needle:?} for {source:?}"
                );
            }
            (Ok(actual), AnyError | SpecificError(_)) => {
                panic!("{id}: expected an error, got {actual:?} for {source:?}")
            }
            (Err(err), Evals(expected_val)) => {
                panic!("{id}: expected {expected_val:?}, got error '{err}' for {source:?}")
            }
        }
    }

    /// Each case runs in a fresh interpreter.
    fn run_cases(cases: Vec<(&str, TestResult)>) {
        for (i, (source, expected)) in cases.iter().enumerate() {
            let mut interp = Interp::new();
            check(&mut interp, source, expected, &format!("case #{}", i + 1));
        }
    }

    /// A group of cases sharing one interpreter, for `def`-dependent flows.
    struct SharedEnv(Vec<(&'static str, TestResult)>);

    fn run_shared(groups: Vec<SharedEnv>) {
        for (g, SharedEnv(cases)) in groups.into_iter().enumerate() {
            let mut interp = Interp::new();
            for (i, (source, expected)) in cases.iter().enumerate() {
                let id = format!("group #{} case #{}", g + 1, i + 1);
                check(&mut interp, source, expected, &id);
            }
        }
    }

    #[test]
    fn test_self_evaluating_and_lookup() {
        run_cases(vec![
            ("42", success(42)),
            ("-2.5", success(-2.5)),
            ("0x10", success(16)),
            ("true", success(true)),
            ("false", success(false)),
            ("nil", Evals(Value::Nil)),
            ("\"hello\"", success("hello")),
            (":kw", Evals(kw("kw"))),
            ("[1 2 3]", Evals(value::vector(vec![val(1), val(2), val(3)]))),
            ("()", Evals(value::list(vec![]))),
            // undefined symbols
            ("undefined-var", SpecificError("undefined symbol: undefined-var")),
            ("(bogus 1)", SpecificError("undefined symbol: bogus")),
        ]);
    }

    #[test]
    fn test_arithmetic_and_comparison() {
        run_cases(vec![
            ("(+ 1 2 3)", success(6)),
            ("(+)", success(0)),
            ("(+ 5)", success(5)),
            ("(- 10 3 2)", success(5)),
            ("(- 4)", success(-4)),
            ("(* 2 3 4)", success(24)),
            ("(*)", success(1)),
            ("(/ 10 4)", success(2.5)),
            ("(/ 2)", success(0.5)),
            ("(% 7 3)", success(1)),
            ("(% -7 3)", success(-1)),
            ("(+ (* 2 3) (- 8 2))", success(12)),
            ("(= 1 1)", success(true)),
            ("(= 1 2)", success(false)),
            ("(= \"a\" \"a\")", success(true)),
            ("(= :a \"a\")", success(true)),
            ("(= (list 1 2) (list 1 2))", success(true)),
            ("(= [1 2] (list 1 2))", success(false)),
            ("(= {:a 1 :b 2} {:b 2 :a 1})", success(true)),
            ("(< 1 2)", success(true)),
            ("(> 1 2)", success(false)),
            ("(<= 2 2)", success(true)),
            ("(>= 1 2)", success(false)),
            // errors
            ("(+ 1 \"x\")", SpecificError("type error")),
            ("(< 1 \"x\")", SpecificError("type error")),
            ("(/ 1 0)", SpecificError("division by zero")),
            ("(% 1 0)", SpecificError("division by zero")),
            ("(- )", SpecificError("wrong number of arguments to -")),
            ("(< 1)", SpecificError("wrong number of arguments to <")),
        ]);
    }

    #[test]
    fn test_if_truthiness() {
        run_cases(vec![
            ("(if true 1 2)", success(1)),
            ("(if false 1 2)", success(2)),
            ("(if nil 1 2)", success(2)),
            // everything except false and nil is truthy
            ("(if 0 1 2)", success(1)),
            ("(if \"\" 1 2)", success(1)),
            ("(if () 1 2)", success(1)),
            ("(if [] 1 2)", success(1)),
            ("(if (= 1 1) \"yes\" \"no\")", success("yes")),
            // missing else branch yields nil
            ("(if false 1)", Evals(Value::Nil)),
            ("(if true)", SpecificError("wrong number of arguments to if")),
        ]);
    }

    #[test]
    fn test_let_do_and_scoping() {
        run_cases(vec![
            ("(let [x 1] x)", success(1)),
            ("(let [x 1 y 2] (+ x y))", success(3)),
            // bindings are sequential: each init sees the previous ones
            ("(let [x 1 y (+ x 1)] (* x y))", success(2)),
            ("(let [x 1] (let [x 2] x))", success(2)),
            ("(let [x 1] (let [y 2] x))", success(1)),
            ("(let [x 1])", Evals(Value::Nil)),
            ("(do 1 2 3)", success(3)),
            ("(do)", Evals(Value::Nil)),
            ("(let [x 1 y] x)", SpecificError("even number of forms")),
            ("(let (x 1) x)", SpecificError("binding vector")),
            ("(let [1 2] 3)", SpecificError("symbols")),
        ]);
    }

    #[test]
    fn test_functions_and_closures() {
        run_shared(vec![
            SharedEnv(vec![
                setup!("(def x 42)"),
                ("x", success(42)),
                ("(+ x 8)", success(50)),
                setup!("(def x 100)"),
                ("x", success(100)),
            ]),
            SharedEnv(vec![
                ("((fn [x y] (+ x y)) 3 4)", success(7)),
                ("((fn [] 9))", success(9)),
                // single-symbol parameter list takes one argument
                ("((fn x (* x 2)) 21)", success(42)),
            ]),
            SharedEnv(vec![
                setup!("(defn square [x] (* x x))"),
                ("(square 5)", success(25)),
                ("(square)", SpecificError("wrong number of arguments to square")),
                ("(square 1 2)", SpecificError("wrong number of arguments to square")),
            ]),
            // recursion works: defn installs in the root before the body runs
            SharedEnv(vec![
                setup!("(defn fact [n] (if (= n 0) 1 (* n (fact (- n 1)))))"),
                ("(fact 5)", success(120)),
                ("(fact 0)", success(1)),
            ]),
            SharedEnv(vec![
                setup!("(defn is-even [n] (if (= n 0) true (is-odd (- n 1))))"),
                setup!("(defn is-odd [n] (if (= n 0) false (is-even (- n 1))))"),
                ("(is-even 10)", success(true)),
                ("(is-odd 7)", success(true)),
            ]),
            // closure capture survives the binding site returning
            SharedEnv(vec![
                setup!("(def mk (fn [n] (fn [x] (+ x n))))"),
                setup!("(def add5 (mk 5))"),
                setup!("(def add7 (mk 7))"),
                ("(add5 10)", success(15)),
                ("(add7 10)", success(17)),
            ]),
            // parameter shadowing is lexical, independent of call site
            SharedEnv(vec![
                setup!("(def x 1)"),
                setup!("(defn f [x] (+ x 10))"),
                ("(f 5)", success(15)),
                ("x", success(1)),
                ("(f x)", success(11)),
            ]),
            // def inside a function still installs at the root
            SharedEnv(vec![
                setup!("(defn install [v] (def installed v))"),
                ("(do (install 33) installed)", success(33)),
            ]),
            // higher-order functions
            SharedEnv(vec![
                setup!("(defn twice [f x] (f (f x)))"),
                setup!("(defn inc [x] (+ x 1))"),
                ("(twice inc 5)", success(7)),
                ("((if true + *) 2 3)", success(5)),
                ("((if false + *) 2 3)", success(6)),
            ]),
            // zero-body closures return nil
            SharedEnv(vec![("((fn [x]) 1)", Evals(Value::Nil))]),
        ]);

        run_cases(vec![
            ("(fn [x x] x)", SpecificError("duplicate parameter name")),
            ("(fn [1] 2)", SpecificError("symbols")),
            ("(fn \"ps\" 2)", SpecificError("vector of symbols")),
            ("(1 2 3)", SpecificError("cannot apply non-function")),
            ("(\"s\")", SpecificError("cannot apply non-function")),
        ]);
    }

    #[test]
    fn test_maps_vectors_keywords() {
        run_shared(vec![SharedEnv(vec![
            setup!("(def p {:name \"Alice\" :age 30})"),
            ("(:name p)", success("Alice")),
            ("(get p :age)", success(30)),
            ("(get p \"age\")", success(30)),
            ("(get p :missing)", Evals(Value::Nil)),
            ("(:missing p)", Evals(Value::Nil)),
            ("(length p)", success(2)),
            ("(get (assoc p :age 31) :age)", success(31)),
            // assoc is functional: the original is untouched
            ("(get p :age)", success(30)),
        ])]);

        run_cases(vec![
            ("{(str \"a\" \"b\") 1}", Evals(Value::Map(Rc::new(MapData::from_pairs(
                vec![(val("ab"), val(1))],
            ))))),
            ("{1 2}", SpecificError("map keys must be strings or keywords")),
            ("(:k 42)", SpecificError("keyword lookup expects a map")),
            ("(:k)", SpecificError("wrong number of arguments to :k")),
            ("(nth [10 20 30] 1)", success(20)),
            ("(nth (list 10 20) 0)", success(10)),
            ("(nth [1] 5)", SpecificError("out of bounds")),
            ("(vec (list 1 2))", Evals(value::vector(vec![val(1), val(2)]))),
            ("(length [1 2 3])", success(3)),
            ("(length \"abcd\")", success(4)),
        ]);
    }

    #[test]
    fn test_quote_forms() {
        run_cases(vec![
            ("'x", success("x")),
            ("(quote x)", success("x")),
            ("'42", success(42)),
            ("'\"s\"", success("s")),
            ("':kw", Evals(kw("kw"))),
            ("'(1 2 3)", success([1, 2, 3])),
            // quoted symbols surface as strings
            ("'(+ 1 2)", Evals(value::list(vec![val("+"), val(1), val(2)]))),
            ("'[a b]", Evals(value::vector(vec![val("a"), val("b")]))),
            ("'{:k v}", Evals(Value::Map(Rc::new(MapData::from_pairs(vec![(
                kw("k"),
                val("v"),
            )]))))),
            // nested quotes convert recursively
            ("''x", success("x")),
        ]);
    }

    #[test]
    fn test_quasiquote_and_splice() {
        run_shared(vec![SharedEnv(vec![
            setup!("(def x 5)"),
            setup!("(def xs (list 1 2 3))"),
            ("`x", success("x")),
            ("`~x", success(5)),
            ("`(a ~x b)", Evals(value::list(vec![val("a"), val(5), val("b")]))),
            ("`(~x ~@xs)", Evals(value::list(vec![val(5), val(1), val(2), val(3)]))),
            ("`[~@xs 9]", Evals(value::vector(vec![val(1), val(2), val(3), val(9)]))),
            ("`(a ~@[7 8])", Evals(value::list(vec![val("a"), val(7), val(8)]))),
            ("`(+ 1 ~(+ 2 3))", Evals(value::list(vec![val("+"), val(1), val(5)]))),
            ("`(a ~@x)", SpecificError("cannot splice non-sequence")),
            ("~x", SpecificError("unquote used outside")),
            ("~@xs", SpecificError("splice used outside")),
        ])]);
    }
}
