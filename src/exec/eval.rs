//! Tree-walking evaluation.
//!
//! Statement evaluation returns `Result<(), Signal>` where the error side
//! carries either a diagnostic or a control-flow signal; loops absorb
//! continue/break and function calls absorb return. Blocks evaluated as
//! the root block (and function bodies) run in two passes so declarations
//! hoist.

use std::rc::Rc;

use crate::error::{self, Diagnostic};
use crate::parser::ast::{
    BlockStmt, BranchStmt, ClassDeclareStmt, ExprBody, Expression, FunctionDeclareStmt,
    IterateStmt, LogicOp, MemberAccess, MemberExpr, MemberRoot, Program, Statement,
    VarAssignPair, VarDeclareStmt, WhileLoopStmt,
};

use super::closure::{ClassRef, ClosureKind, ClosureRef};
use super::decimal::Decimal;
use super::iv::Intermediary;
use super::scope::{FrameKind, RootScope, ScopeFrame, Symbol};
use super::value::{self, CompareVerb, Value};
use super::Context;

/// Result-or-signal channel for all evaluation. Loops own continue/break,
/// calls own return; anything else unwinds to the execution boundary.
#[derive(Debug)]
pub enum Signal {
    Failure(Diagnostic),
    Return(Value),
    Continue,
    Break,
}

impl From<Diagnostic> for Signal {
    fn from(diag: Diagnostic) -> Self {
        Signal::Failure(diag)
    }
}

pub type EvalResult<T> = Result<T, Signal>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HoistMode {
    /// functions and classes bind before the main pass
    Root,
    /// function bodies hoist nested functions only
    FunctionBody,
    None,
}

pub struct Executor<'a> {
    pub ctx: &'a mut Context,
    pub root: &'a mut RootScope,
    frames: Vec<ScopeFrame>,
}

impl<'a> Executor<'a> {
    pub fn new(ctx: &'a mut Context, root: &'a mut RootScope) -> Self {
        Self {
            ctx,
            root,
            frames: Vec::new(),
        }
    }

    pub fn eval_program(&mut self, program: &Program) -> EvalResult<()> {
        self.eval_block(&program.content, HoistMode::Root)
    }

    fn eval_block(&mut self, block: &BlockStmt, mode: HoistMode) -> EvalResult<()> {
        match mode {
            HoistMode::Root => {
                for stmt in &block.children {
                    match stmt {
                        Statement::FunctionDeclare(func) => self.bind_function(func)?,
                        Statement::ClassDeclare(class) => self.bind_class(class)?,
                        _ => {}
                    }
                }
                for stmt in &block.children {
                    if matches!(
                        stmt,
                        Statement::FunctionDeclare(_) | Statement::ClassDeclare(_)
                    ) {
                        continue;
                    }
                    self.eval_statement(stmt)?;
                }
            }
            HoistMode::FunctionBody => {
                for stmt in &block.children {
                    if let Statement::FunctionDeclare(func) = stmt {
                        self.bind_function(func)?;
                    }
                }
                for stmt in &block.children {
                    if matches!(stmt, Statement::FunctionDeclare(_)) {
                        continue;
                    }
                    self.eval_statement(stmt)?;
                }
            }
            HoistMode::None => {
                for stmt in &block.children {
                    self.eval_statement(stmt)?;
                }
            }
        }
        Ok(())
    }

    fn eval_statement(&mut self, stmt: &Statement) -> EvalResult<()> {
        match stmt {
            Statement::Empty => Ok(()),
            Statement::VarDeclare(decl) => {
                self.root.set_current_line(decl.line);
                self.eval_var_declare(decl)?;
                self.reset_last_value();
                Ok(())
            }
            Statement::While(stmt) => {
                self.root.set_current_line(stmt.line);
                self.eval_while(stmt)?;
                self.reset_last_value();
                Ok(())
            }
            Statement::Branch(stmt) => {
                self.root.set_current_line(stmt.line);
                self.eval_branch(stmt)?;
                self.reset_last_value();
                Ok(())
            }
            Statement::Iterate(stmt) => {
                self.root.set_current_line(stmt.line);
                self.eval_iterate(stmt)?;
                self.reset_last_value();
                Ok(())
            }
            Statement::FunctionDeclare(func) => {
                self.root.set_current_line(func.line);
                self.bind_function(func)?;
                self.reset_last_value();
                Ok(())
            }
            Statement::ClassDeclare(class) => {
                self.root.set_current_line(class.line);
                if !self.frames.is_empty() {
                    return Err(error::class_on_non_root().into());
                }
                self.bind_class(class)?;
                self.reset_last_value();
                Ok(())
            }
            Statement::Return(ret) => {
                self.root.set_current_line(ret.line);
                let value = self.eval_expression(&ret.expr)?;
                Err(Signal::Return(value))
            }
            Statement::Expr(expr) => {
                let value = self.eval_expression(expr)?;
                // the nearest function keeps it as the fallback return
                // value, the root as the REPL echo value
                let function_frame = self
                    .frames
                    .iter()
                    .rposition(|frame| matches!(frame.kind, FrameKind::Function { .. }));
                match function_frame {
                    Some(idx) => {
                        if let FrameKind::Function { return_value, .. } =
                            &mut self.frames[idx].kind
                        {
                            *return_value = value;
                        }
                    }
                    None => self.root.set_last_value(value),
                }
                Ok(())
            }
        }
    }

    fn reset_last_value(&mut self) {
        self.root.set_last_value(Value::Null);
    }

    //// declarations

    fn bind_function(&mut self, func: &FunctionDeclareStmt) -> EvalResult<()> {
        let closure = ClosureRef::from_function(func);
        self.bind_value(&func.name, Value::Function(closure), false)
    }

    fn bind_class(&mut self, class: &ClassDeclareStmt) -> EvalResult<()> {
        if self.root.class_refs.contains_key(&class.name) {
            return Err(error::name_redeclared(&class.name).into());
        }
        self.root
            .class_refs
            .insert(class.name.clone(), ClassRef::from_declare(class));
        Ok(())
    }

    fn eval_var_declare(&mut self, decl: &VarDeclareStmt) -> EvalResult<()> {
        for pair in &decl.pairs {
            match pair {
                VarAssignPair::Assign {
                    names,
                    expr,
                    is_const,
                } => {
                    let value = self.eval_expression(expr)?;
                    for name in names {
                        self.bind_value(name, value::duplicate(&value), *is_const)?;
                    }
                }
                VarAssignPair::ObjNew {
                    names,
                    class,
                    params,
                } => {
                    let class_ref = self
                        .root
                        .class_refs
                        .get(class)
                        .cloned()
                        .ok_or_else(|| Signal::from(error::name_not_defined(class)))?;
                    let args = self.eval_expressions(params)?;
                    for name in names {
                        let object = self.construct_object(&class_ref, &args)?;
                        self.bind_value(name, object, false)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Build a class instance: evaluate property initializers in a fresh
    /// function scope, then let constructor parameters overwrite the
    /// properties named by the constructor id list, in declared order.
    fn construct_object(
        &mut self,
        class_ref: &Rc<ClassRef>,
        params: &[Value],
    ) -> EvalResult<Value> {
        self.frames.push(ScopeFrame::function(None));
        let result = self.construct_object_inner(class_ref, params);
        self.frames.pop();
        result
    }

    fn construct_object_inner(
        &mut self,
        class_ref: &Rc<ClassRef>,
        params: &[Value],
    ) -> EvalResult<Value> {
        let mut props = indexmap::IndexMap::new();
        for (name, init) in &class_ref.properties {
            let value = self.eval_expression(init)?;
            props.insert(name.clone(), value);
        }
        if params.len() != class_ref.constructor_ids.len() {
            return Err(
                error::mismatch_param_length(class_ref.constructor_ids.len(), params.len())
                    .into(),
            );
        }
        for (idx, param) in params.iter().enumerate() {
            props.insert(class_ref.constructor_ids[idx].clone(), param.clone());
        }
        Ok(Value::new_object(Rc::clone(class_ref), props))
    }

    //// control flow

    fn eval_while(&mut self, stmt: &WhileLoopStmt) -> EvalResult<()> {
        self.frames.push(ScopeFrame::while_loop());
        let result = self.run_while(stmt);
        self.frames.pop();
        result
    }

    fn run_while(&mut self, stmt: &WhileLoopStmt) -> EvalResult<()> {
        loop {
            let condition = self.eval_expression(&stmt.condition)?;
            let Some(keep_going) = condition.as_bool() else {
                return Err(error::invalid_expr_type(&["bool"]).into());
            };
            if !keep_going {
                return Ok(());
            }
            // every pass gets a fresh binding set, so 令 in the body does
            // not collide with the previous iteration
            if let Some(frame) = self.frames.last_mut() {
                frame.symbols.clear();
            }
            match self.eval_block(&stmt.body, HoistMode::None) {
                Ok(()) => {}
                Err(Signal::Continue) => continue,
                Err(Signal::Break) => return Ok(()),
                Err(other) => return Err(other),
            }
        }
    }

    fn eval_branch(&mut self, stmt: &BranchStmt) -> EvalResult<()> {
        let condition = self.eval_expression(&stmt.if_expr)?;
        let Some(truthy) = condition.as_bool() else {
            return Err(error::invalid_expr_type(&["bool"]).into());
        };
        if truthy {
            return self.eval_block(&stmt.if_block, HoistMode::None);
        }
        for (idx, other_expr) in stmt.other_exprs.iter().enumerate() {
            let other = self.eval_expression(other_expr)?;
            let Some(hit) = other.as_bool() else {
                return Err(error::invalid_expr_type(&["bool"]).into());
            };
            if hit {
                return self.eval_block(&stmt.other_blocks[idx], HoistMode::None);
            }
        }
        if let Some(else_block) = &stmt.else_block {
            return self.eval_block(else_block, HoistMode::None);
        }
        Ok(())
    }

    fn eval_iterate(&mut self, stmt: &IterateStmt) -> EvalResult<()> {
        if stmt.names.len() > 2 {
            return Err(error::most_params_error(2).into());
        }
        // the target evaluates in the enclosing scope
        let target = self.eval_expression(&stmt.target)?;

        self.frames.push(ScopeFrame::iterate());
        let result = self.run_iterate(stmt, target);
        self.frames.pop();
        result
    }

    fn run_iterate(&mut self, stmt: &IterateStmt, target: Value) -> EvalResult<()> {
        let pairs: Vec<(Value, Value)> = match &target {
            Value::Array(items) => items
                .borrow()
                .iter()
                .enumerate()
                .map(|(idx, value)| {
                    (
                        Value::Decimal(Decimal::from_int(idx as i64, 0)),
                        value.clone(),
                    )
                })
                .collect(),
            Value::HashMap(map) => map
                .borrow()
                .iter()
                .map(|(key, value)| (Value::Str(key.clone()), value.clone()))
                .collect(),
            _ => return Err(error::invalid_expr_type(&["array", "hashmap"]).into()),
        };

        for (key, value) in pairs {
            // fresh bindings per pass; the current pair also lands in the
            // frame itself for 此之索引 / 此之值
            if let Some(frame) = self.frames.last_mut() {
                frame.symbols.clear();
                if let FrameKind::Iterate {
                    current_index,
                    current_value,
                } = &mut frame.kind
                {
                    *current_index = key.clone();
                    *current_value = value.clone();
                }
            }
            match stmt.names.len() {
                1 => self.bind_value(&stmt.names[0], value.clone(), false)?,
                2 => {
                    self.bind_value(&stmt.names[0], key, false)?;
                    self.bind_value(&stmt.names[1], value.clone(), false)?;
                }
                _ => {}
            }
            match self.eval_block(&stmt.body, HoistMode::None) {
                Ok(()) => {}
                Err(Signal::Continue) => continue,
                Err(Signal::Break) => return Ok(()),
                Err(other) => return Err(other),
            }
        }
        Ok(())
    }

    //// expressions

    pub fn eval_expression(&mut self, expr: &Expression) -> EvalResult<Value> {
        self.root.set_current_line(expr.line);
        match &expr.body {
            ExprBody::Number(literal) => Ok(Value::Decimal(Decimal::parse(literal)?)),
            ExprBody::Str(text) => Ok(Value::Str(text.clone())),
            ExprBody::Id(name) => self.get_value(name),
            ExprBody::Array(items) => {
                let values = self.eval_expressions(items)?;
                Ok(Value::new_array(values))
            }
            ExprBody::HashMap(pairs) => {
                let mut entries = Vec::with_capacity(pairs.len());
                for (key_expr, value_expr) in pairs {
                    let key = self.eval_expression(key_expr)?;
                    let Value::Str(key) = key else {
                        return Err(error::invalid_expr_type(&["string"]).into());
                    };
                    let value = self.eval_expression(value_expr)?;
                    entries.push((key, value));
                }
                Ok(Value::new_hashmap(entries))
            }
            ExprBody::FuncCall { name, params } => self.eval_function_call(name, params),
            ExprBody::Logic { op, left, right } => match op {
                LogicOp::And | LogicOp::Or => self.eval_logic_combiner(*op, left, right),
                _ => self.eval_logic_comparator(*op, left, right),
            },
            ExprBody::VarAssign { target, value } => self.eval_var_assign(target, value),
            ExprBody::Member(member) => {
                let iv = self.build_member_iv(member)?;
                iv.reduce(self, None)
            }
        }
    }

    fn eval_expressions(&mut self, exprs: &[Expression]) -> EvalResult<Vec<Value>> {
        let mut values = Vec::with_capacity(exprs.len());
        for expr in exprs {
            values.push(self.eval_expression(expr)?);
        }
        Ok(values)
    }

    /// Call resolution: a set receiver's methods win over names in the
    /// scope chain; the chain includes built-ins through the globals.
    fn eval_function_call(&mut self, name: &str, params: &[Expression]) -> EvalResult<Value> {
        let mut closure: Option<Rc<ClosureRef>> = None;
        if let Some(Value::Object(object)) = self.top_function_this() {
            if let Some(method) = object.borrow().class.find_method(name) {
                closure = Some(method);
            }
        }
        let closure = match closure {
            Some(closure) => closure,
            None => match self.get_value(name)? {
                Value::Function(closure) => closure,
                _ => return Err(error::invalid_func_variable(name).into()),
            },
        };

        let args = self.eval_expressions(params)?;
        self.exec_closure(&closure, args, None)
    }

    /// Run a closure in a fresh function scope. An unset receiver is
    /// inherited from the calling function scope.
    pub fn exec_closure(
        &mut self,
        closure: &Rc<ClosureRef>,
        args: Vec<Value>,
        target_this: Option<Value>,
    ) -> EvalResult<Value> {
        let resolved_this = target_this.or_else(|| self.top_function_this());
        self.frames.push(ScopeFrame::function(resolved_this));
        let result = self.run_closure(closure, args);
        self.frames.pop();
        result
    }

    fn run_closure(&mut self, closure: &Rc<ClosureRef>, args: Vec<Value>) -> EvalResult<Value> {
        match &closure.kind {
            ClosureKind::Native(executor) => executor(self, &args),
            ClosureKind::User { params, body } => {
                // surplus arguments are an arity error; omitted trailing
                // parameters bind as null
                if args.len() > params.len() {
                    return Err(error::mismatch_param_length(params.len(), args.len()).into());
                }
                let mut args = args.into_iter();
                for param in params {
                    let arg = args.next().unwrap_or(Value::Null);
                    self.bind_value(param, arg, false)?;
                }
                match self.eval_block(body, HoistMode::FunctionBody) {
                    Ok(()) => Ok(self.top_function_return_value()),
                    Err(Signal::Return(value)) => Ok(value),
                    Err(other) => Err(other),
                }
            }
        }
    }

    fn eval_logic_combiner(
        &mut self,
        op: LogicOp,
        left: &Expression,
        right: &Expression,
    ) -> EvalResult<Value> {
        let left = self.eval_expression(left)?;
        let Some(left) = left.as_bool() else {
            return Err(error::invalid_expr_type(&["bool"]).into());
        };
        // short-circuit before touching the right side
        if op == LogicOp::And && !left {
            return Ok(Value::Bool(false));
        }
        if op == LogicOp::Or && left {
            return Ok(Value::Bool(true));
        }
        let right = self.eval_expression(right)?;
        let Some(right) = right.as_bool() else {
            return Err(error::invalid_expr_type(&["bool"]).into());
        };
        Ok(Value::Bool(match op {
            LogicOp::And => left && right,
            _ => left || right,
        }))
    }

    fn eval_logic_comparator(
        &mut self,
        op: LogicOp,
        left: &Expression,
        right: &Expression,
    ) -> EvalResult<Value> {
        let left = self.eval_expression(left)?;
        let right = self.eval_expression(right)?;

        let result = match op {
            LogicOp::Eq => value::compare_values(&left, &right, CompareVerb::Eq)?,
            LogicOp::Neq => !value::compare_values(&left, &right, CompareVerb::Eq)?,
            LogicOp::Gt => value::compare_values(&left, &right, CompareVerb::Gt)?,
            LogicOp::Lt => value::compare_values(&left, &right, CompareVerb::Lt)?,
            LogicOp::Gte => {
                value::compare_values(&left, &right, CompareVerb::Gt)?
                    || value::compare_values(&left, &right, CompareVerb::Eq)?
            }
            LogicOp::Lte => {
                value::compare_values(&left, &right, CompareVerb::Lt)?
                    || value::compare_values(&left, &right, CompareVerb::Eq)?
            }
            _ => return Err(error::unexpected_case("比较类型", &format!("{op:?}")).into()),
        };
        Ok(Value::Bool(result))
    }

    fn eval_var_assign(
        &mut self,
        target: &Expression,
        value: &Expression,
    ) -> EvalResult<Value> {
        let value = self.eval_expression(value)?;
        match &target.body {
            ExprBody::Id(name) => {
                self.set_value(name, value.clone())?;
                Ok(value)
            }
            ExprBody::Member(member) => {
                let iv = self.build_member_iv(member)?;
                iv.reduce(self, Some(value))
            }
            _ => Err(error::expr_must_type_id().into()),
        }
    }

    /// Compile a member expression into its reducible intermediary.
    fn build_member_iv(&mut self, member: &MemberExpr) -> EvalResult<Intermediary> {
        match &member.root {
            MemberRoot::ThisScope => match &member.access {
                MemberAccess::Id(name) => Ok(Intermediary::ScopeMember {
                    member: name.clone(),
                }),
                MemberAccess::MethodCall { name, params } => {
                    let params = self.eval_expressions(params)?;
                    Ok(Intermediary::ScopeMethod {
                        name: name.clone(),
                        params,
                    })
                }
                MemberAccess::Index(_) => {
                    Err(error::unexpected_case("子项类型", "index").into())
                }
            },
            MemberRoot::ThisProp => match &member.access {
                MemberAccess::Id(name) => Ok(Intermediary::PropMember {
                    member: name.clone(),
                }),
                _ => Err(error::unexpected_case("子项类型", "method").into()),
            },
            MemberRoot::Expr(root_expr) => {
                let root = self.eval_expression(root_expr)?;
                match &member.access {
                    MemberAccess::Id(name) => Ok(Intermediary::Member {
                        root,
                        member: name.clone(),
                    }),
                    MemberAccess::MethodCall { name, params } => {
                        let params = self.eval_expressions(params)?;
                        Ok(Intermediary::Method {
                            root,
                            name: name.clone(),
                            params,
                        })
                    }
                    MemberAccess::Index(index_expr) => {
                        let index = self.eval_expression(index_expr)?;
                        match &root {
                            Value::Array(list) => {
                                let Value::Decimal(index) = index else {
                                    return Err(error::invalid_expr_type(&["integer"]).into());
                                };
                                Ok(Intermediary::ArrayIndex {
                                    list: Rc::clone(list),
                                    index,
                                })
                            }
                            Value::HashMap(map) => {
                                let key = match index {
                                    Value::Decimal(decimal) if decimal.is_integer() => {
                                        decimal.to_string()
                                    }
                                    Value::Str(text) => text,
                                    _ => {
                                        return Err(error::invalid_expr_type(&[
                                            "integer", "string",
                                        ])
                                        .into())
                                    }
                                };
                                Ok(Intermediary::HashMapIndex {
                                    map: Rc::clone(map),
                                    key,
                                })
                            }
                            _ => Err(error::invalid_expr_type(&["array", "hashmap"]).into()),
                        }
                    }
                }
            }
        }
    }

    //// scope access

    pub(crate) fn top_frame_kind(&self) -> Option<&FrameKind> {
        self.frames.last().map(|frame| &frame.kind)
    }

    /// Receiver of the innermost scope, when that scope is a function
    /// scope with one set.
    pub(crate) fn top_function_this(&self) -> Option<Value> {
        match self.frames.last() {
            Some(ScopeFrame {
                kind: FrameKind::Function { target_this, .. },
                ..
            }) => target_this.clone(),
            _ => None,
        }
    }

    fn top_function_return_value(&self) -> Value {
        match self.frames.last() {
            Some(ScopeFrame {
                kind: FrameKind::Function { return_value, .. },
                ..
            }) => return_value.clone(),
            _ => Value::Null,
        }
    }

    /// Name lookup: globals first, then the frame stack inside out, then
    /// the root symbols.
    pub(crate) fn get_value(&self, name: &str) -> EvalResult<Value> {
        if let Some(value) = self.ctx.globals.get(name) {
            return Ok(value.clone());
        }
        for frame in self.frames.iter().rev() {
            if let Some(symbol) = frame.symbols.get(name) {
                return Ok(symbol.value.clone());
            }
        }
        if let Some(symbol) = self.root.get_symbol(name) {
            return Ok(symbol.value.clone());
        }
        Err(error::name_not_defined(name).into())
    }

    /// Assignment writes in place in whichever scope holds the binding.
    pub(crate) fn set_value(&mut self, name: &str, value: Value) -> EvalResult<()> {
        if self.ctx.globals.contains_key(name) {
            return Err(error::name_redeclared(name).into());
        }
        for frame in self.frames.iter_mut().rev() {
            if let Some(symbol) = frame.symbols.get_mut(name) {
                if symbol.is_const {
                    return Err(error::assign_to_constant().into());
                }
                symbol.value = value;
                return Ok(());
            }
        }
        if let Some(symbol) = self.root.symbols.get_mut(name) {
            if symbol.is_const {
                return Err(error::assign_to_constant().into());
            }
            symbol.value = value;
            return Ok(());
        }
        Err(error::name_not_defined(name).into())
    }

    /// Declaration binds into the current (innermost) scope only.
    pub(crate) fn bind_value(
        &mut self,
        name: &str,
        value: Value,
        is_const: bool,
    ) -> EvalResult<()> {
        if self.ctx.globals.contains_key(name) {
            return Err(error::name_redeclared(name).into());
        }
        let symbols = match self.frames.last_mut() {
            Some(frame) => &mut frame.symbols,
            None => &mut self.root.symbols,
        };
        if symbols.contains_key(name) {
            return Err(error::name_redeclared(name).into());
        }
        symbols.insert(name.to_string(), Symbol { value, is_const });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_failure_code<T: std::fmt::Debug>(result: EvalResult<T>, code: u16) {
        match result {
            Err(Signal::Failure(diag)) => assert_eq!(diag.code(), code),
            other => panic!("expected diagnostic {code:#06x}, got {other:?}"),
        }
    }

    #[test]
    fn lookup_walks_frames_before_root() {
        let mut ctx = Context::new();
        let mut root = RootScope::new();
        root.set_symbol("甲", Value::Str("根".to_string()), false);

        let mut exec = Executor::new(&mut ctx, &mut root);
        exec.frames.push(ScopeFrame::while_loop());
        exec.bind_value("甲", Value::Str("内".to_string()), false)
            .expect("shadowing bind");

        assert_eq!(exec.get_value("甲").expect("lookup").display_string(), "「内」");
        exec.frames.pop();
        assert_eq!(exec.get_value("甲").expect("lookup").display_string(), "「根」");
    }

    #[test]
    fn assignment_writes_into_the_holding_scope() {
        let mut ctx = Context::new();
        let mut root = RootScope::new();
        root.set_symbol("计数", Value::Decimal(Decimal::from_int(1, 0)), false);

        let mut exec = Executor::new(&mut ctx, &mut root);
        exec.frames.push(ScopeFrame::function(None));
        exec.set_value("计数", Value::Decimal(Decimal::from_int(2, 0)))
            .expect("write through frame");
        exec.frames.pop();
        drop(exec);

        assert_eq!(
            root.get_symbol("计数").expect("symbol").value.display_string(),
            "2"
        );
    }

    #[test]
    fn constants_and_globals_are_protected() {
        let mut ctx = Context::new();
        let mut root = RootScope::new();
        root.set_symbol("率", Value::Decimal(Decimal::from_int(3, 0)), true);

        let mut exec = Executor::new(&mut ctx, &mut root);
        assert_failure_code(
            exec.set_value("率", Value::Decimal(Decimal::from_int(4, 0))),
            0x2503,
        );
        assert_failure_code(exec.bind_value("真", Value::Null, false), 0x2502);
        assert_failure_code(exec.set_value("未定", Value::Null), 0x2501);
    }

    #[test]
    fn function_frames_inherit_the_receiver() {
        let mut ctx = Context::new();
        let mut root = RootScope::new();
        let mut exec = Executor::new(&mut ctx, &mut root);

        let receiver = Value::Str("己".to_string());
        exec.frames.push(ScopeFrame::function(Some(receiver)));
        // an unset receiver resolves from the calling function scope
        let inherited = None.or_else(|| exec.top_function_this());
        exec.frames.push(ScopeFrame::function(inherited));

        assert_eq!(
            exec.top_function_this().expect("receiver").display_string(),
            "「己」"
        );
    }
}
