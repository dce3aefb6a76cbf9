//! Host adapter: drives the whole pipeline for an embedding front-end.
//!
//! `run` lexes, parses and evaluates a source program and returns an
//! ordered list of [`OutputLine`] records. A lex or parse failure yields a
//! single `error` line and nothing is evaluated. Otherwise each top-level
//! expression contributes at most one line — an `error` if it raised
//! (later forms still run, REPL-style), a `value` line unless the result
//! is nil — and a final `time` line reports how many expressions executed
//! and the elapsed wall time.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use crate::evaluator::Interp;
use crate::lexer::tokenize;
use crate::parser::parse_program;
use crate::value::Value;
use crate::{Error, ParseErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "lowercase"))]
pub enum OutputKind {
    Value,
    Error,
    Info,
    Time,
}

/// One line of host-visible output.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct OutputLine {
    pub kind: OutputKind,
    pub text: String,
}

impl OutputLine {
    fn new(kind: OutputKind, text: impl Into<String>) -> Self {
        OutputLine {
            kind,
            text: text.into(),
        }
    }
}

/// Host-facing knobs for a run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunConfig {
    /// Capture `print` output as `info` lines in the result, interleaved
    /// before each expression's own line, instead of sending it to the
    /// print sink. Overrides any installed sink for the duration of the
    /// run.
    pub capture_print: bool,
}

/// A persistent interpreter plus run configuration. Definitions survive
/// across `run` calls, so a host can feed a session incrementally.
pub struct Runner {
    interp: Interp,
    config: RunConfig,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner {
    pub fn new() -> Self {
        Runner::with_config(RunConfig::default())
    }

    pub fn with_config(config: RunConfig) -> Self {
        Runner {
            interp: Interp::new(),
            config,
        }
    }

    /// Install the host print sink. Without one, `print` writes to
    /// standard output.
    pub fn set_print_sink(&mut self, sink: impl FnMut(&str) + 'static) {
        self.interp.set_print_sink(sink);
    }

    pub fn run(&mut self, source: &str) -> Vec<OutputLine> {
        let tokens = tokenize(source);
        let (exprs, errors) = parse_program(&tokens);
        if let Some(first) = errors.into_iter().next() {
            let error = if first.kind == ParseErrorKind::InvalidToken {
                Error::LexError(first)
            } else {
                Error::ParseError(first)
            };
            return vec![OutputLine::new(OutputKind::Error, error.to_string())];
        }

        let captured = Rc::new(RefCell::new(Vec::<String>::new()));
        if self.config.capture_print {
            let buffer = captured.clone();
            self.interp
                .set_print_sink(move |line| buffer.borrow_mut().push(line.to_owned()));
        }

        let start = Instant::now();
        let mut lines = Vec::new();
        let mut executed = 0usize;
        for expr in &exprs {
            let result = self.interp.eval(expr);
            executed += 1;
            for text in captured.borrow_mut().drain(..) {
                lines.push(OutputLine::new(OutputKind::Info, text));
            }
            match result {
                // nil results are suppressed at the top level
                Ok(Value::Nil) => {}
                Ok(value) => {
                    lines.push(OutputLine::new(OutputKind::Value, value.to_display_string()));
                }
                Err(error) => lines.push(OutputLine::new(OutputKind::Error, error.to_string())),
            }
        }
        if self.config.capture_print {
            self.interp.clear_print_sink();
        }
        lines.push(OutputLine::new(
            OutputKind::Time,
            format!(
                "{executed} expressions in {} ms",
                start.elapsed().as_millis()
            ),
        ));
        lines
    }

    /// Run and serialize the output list as JSON for the front-end.
    #[cfg(feature = "json")]
    pub fn run_to_json(&mut self, source: &str) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.run(source))
    }
}

/// One-shot convenience entry point over a fresh interpreter.
pub fn run(source: &str) -> Vec<OutputLine> {
    Runner::new().run(source)
}

pub fn run_with_config(source: &str, config: RunConfig) -> Vec<OutputLine> {
    Runner::with_config(config).run(source)
}
