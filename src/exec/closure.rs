//! Closure and class execution references.
//!
//! A [`ClosureRef`] wraps what it takes to run a function body: either a
//! user-defined AST block with its parameter list, or a native executor.
//! A [`ClassRef`] is the immutable class record user objects point at:
//! property initializers, constructor ids, getters and methods.

use std::collections::HashMap;
use std::rc::Rc;

use crate::parser::ast::{BlockStmt, ClassDeclareStmt, Expression, FunctionDeclareStmt};

use super::eval::{EvalResult, Executor};
use super::value::Value;

pub type NativeExecutor = fn(&mut Executor<'_>, &[Value]) -> EvalResult<Value>;

#[derive(Debug)]
pub enum ClosureKind {
    User {
        params: Vec<String>,
        body: Rc<BlockStmt>,
    },
    Native(NativeExecutor),
}

#[derive(Debug)]
pub struct ClosureRef {
    pub name: String,
    pub kind: ClosureKind,
}

impl ClosureRef {
    pub fn from_function(node: &FunctionDeclareStmt) -> Rc<Self> {
        Rc::new(Self {
            name: node.name.clone(),
            kind: ClosureKind::User {
                params: node.params.clone(),
                body: Rc::new(node.body.clone()),
            },
        })
    }

    pub fn from_block(name: &str, params: Vec<String>, body: BlockStmt) -> Rc<Self> {
        Rc::new(Self {
            name: name.to_string(),
            kind: ClosureKind::User {
                params,
                body: Rc::new(body),
            },
        })
    }

    pub fn native(name: &str, executor: NativeExecutor) -> Rc<Self> {
        Rc::new(Self {
            name: name.to_string(),
            kind: ClosureKind::Native(executor),
        })
    }
}

/// Immutable class record built from a `定义` statement.
#[derive(Debug)]
pub struct ClassRef {
    pub name: String,
    /// property name → initializer expression, in declaration order
    pub properties: Vec<(String, Expression)>,
    /// property names the constructor parameters overwrite, in order
    pub constructor_ids: Vec<String>,
    pub getters: HashMap<String, Rc<ClosureRef>>,
    pub methods: HashMap<String, Rc<ClosureRef>>,
}

impl ClassRef {
    pub fn from_declare(node: &ClassDeclareStmt) -> Rc<Self> {
        let properties = node
            .properties
            .iter()
            .map(|prop| (prop.name.clone(), prop.init.clone()))
            .collect();

        let mut getters = HashMap::new();
        for getter in &node.getters {
            getters.insert(
                getter.name.clone(),
                ClosureRef::from_block(&getter.name, Vec::new(), getter.body.clone()),
            );
        }

        let mut methods = HashMap::new();
        for method in &node.methods {
            methods.insert(method.name.clone(), ClosureRef::from_function(method));
        }

        Rc::new(Self {
            name: node.name.clone(),
            properties,
            constructor_ids: node.constructor_ids.clone(),
            getters,
            methods,
        })
    }

    pub fn find_getter(&self, name: &str) -> Option<Rc<ClosureRef>> {
        self.getters.get(name).cloned()
    }

    pub fn find_method(&self, name: &str) -> Option<Rc<ClosureRef>> {
        self.methods.get(name).cloned()
    }
}
