//! Predefined global names seeded into every execution context. All of
//! them are constants; user code redeclaring one is an error.

use std::collections::HashMap;

use crate::error;
use crate::exec::closure::ClosureRef;
use crate::exec::decimal::Decimal;
use crate::exec::eval::{EvalResult, Executor};
use crate::exec::value::Value;

pub fn predefined_values() -> HashMap<String, Value> {
    let mut globals = HashMap::new();
    globals.insert("真".to_string(), Value::Bool(true));
    globals.insert("假".to_string(), Value::Bool(false));
    globals.insert("空".to_string(), Value::Null);
    globals.insert(
        "显示".to_string(),
        Value::Function(ClosureRef::native("显示", display_executor)),
    );
    for name in ["X+Y", "求和"] {
        globals.insert(
            name.to_string(),
            Value::Function(ClosureRef::native("X+Y", add_executor)),
        );
    }
    for name in ["X-Y", "求差"] {
        globals.insert(
            name.to_string(),
            Value::Function(ClosureRef::native("X-Y", sub_executor)),
        );
    }
    for name in ["X*Y", "求积"] {
        globals.insert(
            name.to_string(),
            Value::Function(ClosureRef::native("X*Y", mul_executor)),
        );
    }
    for name in ["X/Y", "求商"] {
        globals.insert(
            name.to_string(),
            Value::Function(ClosureRef::native("X/Y", div_executor)),
        );
    }
    globals.insert(
        "__probe".to_string(),
        Value::Function(ClosureRef::native("__probe", probe_executor)),
    );
    globals
}

/// （显示：A，B，C） — space-joined print; strings print their raw text.
fn display_executor(_exec: &mut Executor<'_>, params: &[Value]) -> EvalResult<Value> {
    let items: Vec<String> = params
        .iter()
        .map(|param| match param {
            Value::Str(text) => text.clone(),
            other => other.display_string(),
        })
        .collect();
    println!("{}", items.join(" "));
    Ok(Value::Null)
}

fn collect_decimals(params: &[Value]) -> EvalResult<Vec<Decimal>> {
    if params.is_empty() {
        return Err(error::least_params_error(1).into());
    }
    let mut decimals = Vec::with_capacity(params.len());
    for param in params {
        match param {
            Value::Decimal(decimal) => decimals.push(decimal.clone()),
            _ => return Err(error::invalid_param_type(&["decimal"]).into()),
        }
    }
    Ok(decimals)
}

pub(crate) fn fold_add(exec: &mut Executor<'_>, params: &[Value]) -> EvalResult<Value> {
    let decimals = collect_decimals(params)?;
    let mut result = decimals[0].clone();
    for item in &decimals[1..] {
        result = exec.ctx.arith.add(&result, item);
    }
    Ok(Value::Decimal(result))
}

pub(crate) fn fold_sub(exec: &mut Executor<'_>, params: &[Value]) -> EvalResult<Value> {
    let decimals = collect_decimals(params)?;
    let mut result = decimals[0].clone();
    for item in &decimals[1..] {
        result = exec.ctx.arith.sub(&result, item);
    }
    Ok(Value::Decimal(result))
}

pub(crate) fn fold_mul(exec: &mut Executor<'_>, params: &[Value]) -> EvalResult<Value> {
    let decimals = collect_decimals(params)?;
    let mut result = decimals[0].clone();
    for item in &decimals[1..] {
        result = exec.ctx.arith.mul(&result, item);
    }
    Ok(Value::Decimal(result))
}

pub(crate) fn fold_div(exec: &mut Executor<'_>, params: &[Value]) -> EvalResult<Value> {
    let decimals = collect_decimals(params)?;
    let mut result = decimals[0].clone();
    for item in &decimals[1..] {
        result = exec.ctx.arith.div(&result, item)?;
    }
    Ok(Value::Decimal(result))
}

fn add_executor(exec: &mut Executor<'_>, params: &[Value]) -> EvalResult<Value> {
    fold_add(exec, params)
}

fn sub_executor(exec: &mut Executor<'_>, params: &[Value]) -> EvalResult<Value> {
    fold_sub(exec, params)
}

fn mul_executor(exec: &mut Executor<'_>, params: &[Value]) -> EvalResult<Value> {
    fold_mul(exec, params)
}

fn div_executor(exec: &mut Executor<'_>, params: &[Value]) -> EvalResult<Value> {
    fold_div(exec, params)
}

/// （__probe：「标签」，值） — record the value under the tag and pass it
/// through unchanged.
fn probe_executor(exec: &mut Executor<'_>, params: &[Value]) -> EvalResult<Value> {
    if params.len() != 2 {
        return Err(error::exact_params_error(2).into());
    }
    let Value::Str(tag) = &params[0] else {
        return Err(error::invalid_param_type(&["string"]).into());
    };
    exec.ctx.probe.add_log(tag, &params[1]);
    Ok(params[1].clone())
}
