//! Scope chain.
//!
//! The Root scope persists for a whole session (the REPL reuses one across
//! inputs) and additionally carries the lexical bookkeeping used to finish
//! diagnostics: file name, current executing line, line table and the
//! last evaluated value. Function, while and iterate constructs push
//! frames onto the evaluator's stack; plain blocks share their enclosing
//! scope.

use std::collections::HashMap;
use std::rc::Rc;

use crate::lexer::line::LineTable;

use super::closure::ClassRef;
use super::value::Value;

#[derive(Debug, Clone)]
pub struct Symbol {
    pub value: Value,
    pub is_const: bool,
}

/// The one scope a program (or REPL session) hangs off.
pub struct RootScope {
    pub(crate) symbols: HashMap<String, Symbol>,
    pub(crate) class_refs: HashMap<String, Rc<ClassRef>>,
    file: String,
    current_line: usize,
    line_table: LineTable,
    last_value: Value,
}

impl RootScope {
    pub fn new() -> Self {
        Self {
            symbols: HashMap::new(),
            class_refs: HashMap::new(),
            file: String::new(),
            current_line: 0,
            line_table: LineTable::new(),
            last_value: Value::Null,
        }
    }

    /// Rebind the scope to a freshly parsed source. Symbols and class
    /// references survive so REPL bindings persist between prompts.
    pub fn init(&mut self, file: &str, line_table: LineTable) {
        self.file = file.to_string();
        self.current_line = 0;
        self.line_table = line_table;
        self.last_value = Value::Null;
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn current_line(&self) -> usize {
        self.current_line
    }

    pub fn set_current_line(&mut self, line: usize) {
        self.current_line = line;
    }

    pub fn line_table(&self) -> &LineTable {
        &self.line_table
    }

    pub fn last_value(&self) -> &Value {
        &self.last_value
    }

    pub fn set_last_value(&mut self, value: Value) {
        self.last_value = value;
    }

    /// Direct symbol write, bypassing redeclaration checks. Used to seed
    /// scopes from the host (REPL, tests).
    pub fn set_symbol(&mut self, name: &str, value: Value, is_const: bool) {
        self.symbols
            .insert(name.to_string(), Symbol { value, is_const });
    }

    pub fn get_symbol(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }
}

impl Default for RootScope {
    fn default() -> Self {
        Self::new()
    }
}

/// Frame kinds pushed by the evaluator. Branch blocks and `令：` blocks do
/// not push frames; their bindings land in the enclosing scope.
#[derive(Debug)]
pub enum FrameKind {
    Function {
        /// implicit receiver for `其 …` and unqualified method calls
        target_this: Option<Value>,
        /// value of the last expression statement in the body
        return_value: Value,
    },
    While,
    Iterate {
        current_index: Value,
        current_value: Value,
    },
}

#[derive(Debug)]
pub struct ScopeFrame {
    pub kind: FrameKind,
    pub symbols: HashMap<String, Symbol>,
}

impl ScopeFrame {
    pub fn function(target_this: Option<Value>) -> Self {
        Self {
            kind: FrameKind::Function {
                target_this,
                return_value: Value::Null,
            },
            symbols: HashMap::new(),
        }
    }

    pub fn while_loop() -> Self {
        Self {
            kind: FrameKind::While,
            symbols: HashMap::new(),
        }
    }

    pub fn iterate() -> Self {
        Self {
            kind: FrameKind::Iterate {
                current_index: Value::Null,
                current_value: Value::Null,
            },
            symbols: HashMap::new(),
        }
    }
}
