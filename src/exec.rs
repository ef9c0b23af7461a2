//! Execution context and entry point.
//!
//! A [`Context`] owns the process-wide pieces (predefined globals, the
//! arithmetic core, the probe log); a [`RootScope`] owns one program's
//! bindings and is reused across REPL inputs. [`Context::execute_code`]
//! runs the full pipeline and converts any escaped control-flow signal
//! into its BREAK-class diagnostic.

use std::collections::HashMap;

use crate::error::{self, Cursor, Diagnostic};
use crate::input::InputStream;
use crate::parser::parse_source;
use crate::probe::Probe;

pub mod builtins;
pub mod closure;
pub mod decimal;
pub mod eval;
pub mod iv;
pub mod scope;
pub mod value;

use decimal::Arith;
use eval::{Executor, Signal};
use scope::RootScope;
use value::Value;

pub struct Context {
    pub(crate) globals: HashMap<String, Value>,
    pub(crate) arith: Arith,
    pub(crate) probe: Probe,
}

impl Context {
    pub fn new() -> Self {
        Self {
            globals: builtins::predefined_values(),
            arith: Arith::default(),
            probe: Probe::new(),
        }
    }

    pub fn probe(&self) -> &Probe {
        &self.probe
    }

    /// Execute a source stream against the given root scope and yield the
    /// last evaluated value. Scope bindings survive the call, so a REPL
    /// can feed successive inputs through one scope.
    pub fn execute_code(
        &mut self,
        input: InputStream,
        scope: &mut RootScope,
    ) -> Result<Value, Diagnostic> {
        let (program, lexer) = parse_source(input)?;
        scope.init(lexer.file(), lexer.line_table().clone());

        let result = {
            let mut executor = Executor::new(self, scope);
            executor.eval_program(&program)
        };

        match result {
            Ok(()) => Ok(scope.last_value().clone()),
            Err(signal) => {
                let mut diag = match signal {
                    Signal::Failure(diag) => diag,
                    Signal::Return(_) => error::return_break_error(),
                    Signal::Continue => error::continue_break_error(),
                    Signal::Break => error::break_break_error(),
                };
                complete_runtime_cursor(scope, &mut diag);
                Err(diag)
            }
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

/// Runtime diagnostics carry no cursor of their own; complete them from
/// the root scope's current line so every surfaced error shows context.
fn complete_runtime_cursor(scope: &RootScope, diag: &mut Diagnostic) {
    if diag.cursor().is_some() {
        return;
    }
    let line = scope.current_line();
    diag.set_cursor(Cursor {
        file: scope.file().to_string(),
        line_num: line,
        col_num: 0,
        text: scope.line_table().line_text(line),
    });
}
