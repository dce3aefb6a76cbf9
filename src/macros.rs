//! User-defined macros: the macro table and the hygienic expander.
//!
//! A macro is an expression-to-expression transformer. When the evaluator
//! meets a list whose head names a macro, the macro's body — typically a
//! quasiquote template — is transcribed with the unevaluated argument
//! expressions substituted into its unquote holes, and the result replaces
//! the call form.
//!
//! Hygiene: identifiers the template introduces itself (not substituted
//! from an argument, not a special form, not a macro name, not bound in
//! the root environment at expansion time) are renamed to fresh
//! `name__gen<n>` identifiers, so macro internals cannot capture or be
//! captured by bindings at the call site. A trailing `#` marks an
//! identifier as always-fresh; every occurrence of the same hashed name
//! within one expansion shares the generated name.

use std::collections::HashMap;

use crate::Error;
use crate::ast::{Expr, ExprKind, Lit};
use crate::builtins::Arity;
use crate::evaluator::{Interp, is_special_form};

/// A macro definition: parameter names and body expressions. Stored apart
/// from the value environment; macros are not values.
#[derive(Clone)]
pub struct MacroDef {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Expr>,
}

/// Name-keyed macro registry, consulted by the evaluator before treating a
/// list head as a call.
#[derive(Default)]
pub struct MacroTable {
    defs: HashMap<String, MacroDef>,
}

impl MacroTable {
    pub(crate) fn define(&mut self, name: String, params: Vec<String>, body: Vec<Expr>) {
        self.defs.insert(
            name.clone(),
            MacroDef { name, params, body },
        );
    }

    pub(crate) fn get(&self, name: &str) -> Option<&MacroDef> {
        self.defs.get(name)
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.defs.contains_key(name)
    }
}

impl Interp {
    /// Expand one macro call: bind the unevaluated argument expressions to
    /// the parameters, transcribe the body, and return the expansion for
    /// the evaluator to run in the caller's environment.
    pub(crate) fn expand_macro(&mut self, def: &MacroDef, args: &[Expr]) -> Result<Expr, Error> {
        if args.len() != def.params.len() {
            return Err(Error::arity(
                def.name.clone(),
                Arity::Exact(def.params.len()),
                args.len(),
            ));
        }
        let bindings: HashMap<&str, &Expr> = def
            .params
            .iter()
            .map(String::as_str)
            .zip(args)
            .collect();
        let mut tx = Transcriber {
            interp: self,
            bindings,
            renames: HashMap::new(),
        };
        let mut expansion = Expr::synthetic(ExprKind::Literal(Lit::Nil));
        for expr in &def.body {
            expansion = tx.transcribe(expr)?;
        }
        Ok(expansion)
    }
}

/// One expansion in flight. `renames` is per-expansion so repeated
/// occurrences of an introduced identifier map to the same fresh name,
/// while the counter behind `Interp::gensym` is interpreter-global so
/// separate expansions never collide.
struct Transcriber<'i, 'e> {
    interp: &'i mut Interp,
    bindings: HashMap<&'e str, &'e Expr>,
    renames: HashMap<String, String>,
}

impl Transcriber<'_, '_> {
    /// Transcribe a macro body expression. Bare parameter references
    /// substitute their argument expression; a quasiquote becomes the
    /// template of the expansion.
    fn transcribe(&mut self, expr: &Expr) -> Result<Expr, Error> {
        match &expr.kind {
            ExprKind::Symbol(name) => match self.bindings.get(name.as_str()) {
                Some(arg) => Ok((*arg).clone()),
                None => Ok(Expr::synthetic(ExprKind::Symbol(self.rename(name)))),
            },
            ExprKind::Literal(_) | ExprKind::Quote(_) => Ok(expr.clone()),
            ExprKind::Quasiquote(template) => self.template(template),
            ExprKind::Unquote(_) => Err(Error::MacroError(
                "unquote used outside of a quasiquote".into(),
            )),
            ExprKind::Splice(_) => Err(Error::MacroError(
                "splice used outside of a quasiquote".into(),
            )),
            ExprKind::List(items) => Ok(Expr::synthetic(ExprKind::List(
                self.transcribe_all(items)?,
            ))),
            ExprKind::Vector(items) => Ok(Expr::synthetic(ExprKind::Vector(
                self.transcribe_all(items)?,
            ))),
            ExprKind::Map(pairs) => {
                let mut out = Vec::with_capacity(pairs.len());
                for (k, v) in pairs {
                    out.push((self.transcribe(k)?, self.transcribe(v)?));
                }
                Ok(Expr::synthetic(ExprKind::Map(out)))
            }
        }
    }

    fn transcribe_all(&mut self, items: &[Expr]) -> Result<Vec<Expr>, Error> {
        items.iter().map(|item| self.transcribe(item)).collect()
    }

    /// Walk a quasiquote template. Unquote holes substitute argument
    /// expressions verbatim; template symbols are subject to hygiene
    /// renaming; quoted data and nested quasiquotes pass through
    /// untouched (quasiquoting is one level deep).
    fn template(&mut self, expr: &Expr) -> Result<Expr, Error> {
        match &expr.kind {
            ExprKind::Unquote(inner) => Ok(self.substitute(inner)),
            ExprKind::Splice(_) => Err(Error::MacroError(
                "splice must appear inside a sequence".into(),
            )),
            ExprKind::Symbol(name) => Ok(Expr::synthetic(ExprKind::Symbol(self.rename(name)))),
            ExprKind::Literal(_) | ExprKind::Quote(_) | ExprKind::Quasiquote(_) => Ok(expr.clone()),
            ExprKind::List(items) => Ok(Expr::synthetic(ExprKind::List(
                self.template_items(items)?,
            ))),
            ExprKind::Vector(items) => Ok(Expr::synthetic(ExprKind::Vector(
                self.template_items(items)?,
            ))),
            ExprKind::Map(pairs) => {
                let mut out = Vec::with_capacity(pairs.len());
                for (k, v) in pairs {
                    out.push((self.template(k)?, self.template(v)?));
                }
                Ok(Expr::synthetic(ExprKind::Map(out)))
            }
        }
    }

    fn template_items(&mut self, items: &[Expr]) -> Result<Vec<Expr>, Error> {
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            if let ExprKind::Splice(inner) = &item.kind {
                let resolved = self.substitute(inner);
                match resolved.kind {
                    ExprKind::List(elems) | ExprKind::Vector(elems) => out.extend(elems),
                    _ => {
                        return Err(Error::MacroError(format!(
                            "cannot splice non-sequence form: {resolved}"
                        )));
                    }
                }
            } else {
                out.push(self.template(item)?);
            }
        }
        Ok(out)
    }

    /// Replace parameter references with their argument expressions, with
    /// no hygiene renaming: everything here came from the call site.
    /// Quoted data is left untouched.
    fn substitute(&self, expr: &Expr) -> Expr {
        match &expr.kind {
            ExprKind::Symbol(name) => match self.bindings.get(name.as_str()) {
                Some(arg) => (*arg).clone(),
                None => expr.clone(),
            },
            ExprKind::Literal(_) | ExprKind::Quote(_) => expr.clone(),
            ExprKind::List(items) => Expr::synthetic(ExprKind::List(
                items.iter().map(|item| self.substitute(item)).collect(),
            )),
            ExprKind::Vector(items) => Expr::synthetic(ExprKind::Vector(
                items.iter().map(|item| self.substitute(item)).collect(),
            )),
            ExprKind::Map(pairs) => Expr::synthetic(ExprKind::Map(
                pairs
                    .iter()
                    .map(|(k, v)| (self.substitute(k), self.substitute(v)))
                    .collect(),
            )),
            ExprKind::Quasiquote(inner) => {
                Expr::synthetic(ExprKind::Quasiquote(Box::new(self.substitute(inner))))
            }
            ExprKind::Unquote(inner) => {
                Expr::synthetic(ExprKind::Unquote(Box::new(self.substitute(inner))))
            }
            ExprKind::Splice(inner) => {
                Expr::synthetic(ExprKind::Splice(Box::new(self.substitute(inner))))
            }
        }
    }

    /// Hygiene renaming for a template-introduced identifier. Names with a
    /// trailing `#` are always freshened; otherwise special forms, macro
    /// names, and anything bound in the root environment keep their name.
    fn rename(&mut self, name: &str) -> String {
        let base = match name.strip_suffix('#') {
            Some(base) => base,
            None => {
                if is_special_form(name)
                    || self.interp.macros().contains(name)
                    || self.interp.root().contains(name)
                {
                    return name.to_owned();
                }
                name
            }
        };
        if let Some(existing) = self.renames.get(name) {
            return existing.clone();
        }
        let fresh = self.interp.gensym(base);
        self.renames.insert(name.to_owned(), fresh.clone());
        fresh
    }
}
