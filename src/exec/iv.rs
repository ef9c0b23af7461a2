//! Member-expression intermediaries.
//!
//! Every member expression compiles to one of these forms before it is
//! reduced. Reduction direction depends on assignment context: with an
//! `input` value the intermediary writes, without one it reads. Getters
//! run on reads only.

use crate::error;
use crate::exec::builtins;
use crate::exec::decimal::Decimal;
use crate::exec::eval::{EvalResult, Executor, Signal};
use crate::exec::scope::FrameKind;
use crate::exec::value::{ArrayRef, HashMapRef, Value};

pub enum Intermediary {
    /// `ARRAY#IDX`
    ArrayIndex { list: ArrayRef, index: Decimal },
    /// `MAP#KEY`
    HashMapIndex { map: HashMapRef, key: String },
    /// `EXPR 之 NAME`
    Member { root: Value, member: String },
    /// `EXPR 之（NAME：…）`
    Method {
        root: Value,
        name: String,
        params: Vec<Value>,
    },
    /// `此之 NAME`
    ScopeMember { member: String },
    /// `此之（NAME：…）`
    ScopeMethod { name: String, params: Vec<Value> },
    /// `其 NAME`
    PropMember { member: String },
}

impl Intermediary {
    /// Reduce to a value. `input` present means this intermediary is the
    /// assignment target and must write instead of read.
    pub fn reduce(self, exec: &mut Executor<'_>, input: Option<Value>) -> EvalResult<Value> {
        match self {
            Intermediary::ArrayIndex { list, index } => {
                let idx = index
                    .as_integer()
                    .map_err(|_| Signal::from(error::invalid_expr_type(&["integer"])))?;
                if idx < 0 || idx as usize >= list.borrow().len() {
                    return Err(error::index_out_of_range().into());
                }
                let idx = idx as usize;
                match input {
                    Some(value) => {
                        list.borrow_mut()[idx] = value.clone();
                        Ok(value)
                    }
                    None => Ok(list.borrow()[idx].clone()),
                }
            }
            Intermediary::HashMapIndex { map, key } => {
                if !map.borrow().contains_key(&key) {
                    return Err(error::index_key_not_found(&key).into());
                }
                match input {
                    Some(value) => {
                        map.borrow_mut().insert(key, value.clone());
                        Ok(value)
                    }
                    None => Ok(map.borrow()[&key].clone()),
                }
            }
            Intermediary::Member { root, member } => reduce_member(exec, &root, &member, input),
            Intermediary::Method { root, name, params } => {
                if input.is_some() {
                    return Err(error::invalid_assignment_target().into());
                }
                let method = match &root {
                    Value::Object(object) => object.borrow().class.find_method(&name),
                    _ => None,
                };
                let Some(method) = method else {
                    return Err(error::method_not_found(&name).into());
                };
                exec.exec_closure(&method, params, Some(root))
            }
            Intermediary::ScopeMember { member } => match exec.top_frame_kind() {
                Some(FrameKind::Iterate {
                    current_index,
                    current_value,
                }) => match member.as_str() {
                    "索引" => Ok(current_index.clone()),
                    "值" => Ok(current_value.clone()),
                    _ => Err(error::property_not_found(&member).into()),
                },
                _ => Ok(Value::Null),
            },
            Intermediary::ScopeMethod { name, params: _ } => match exec.top_frame_kind() {
                Some(FrameKind::While) | Some(FrameKind::Iterate { .. }) => {
                    match name.as_str() {
                        "结束" => Err(Signal::Break),
                        "继续" => Err(Signal::Continue),
                        _ => Err(error::method_not_found(&name).into()),
                    }
                }
                _ => Ok(Value::Null),
            },
            Intermediary::PropMember { member } => {
                let Some(this) = exec.top_function_this() else {
                    return Err(error::unexpected_case("目标对象", &member).into());
                };
                reduce_member(exec, &this, &member, input)
            }
        }
    }
}

/// Property access on any value: getters first (read-only), then plain
/// properties. Primitive kinds expose their built-in getters here.
fn reduce_member(
    exec: &mut Executor<'_>,
    root: &Value,
    member: &str,
    input: Option<Value>,
) -> EvalResult<Value> {
    match root {
        Value::Object(object) => {
            let getter = object.borrow().class.find_getter(member);
            if let Some(getter) = getter {
                if input.is_some() {
                    return Err(error::invalid_assignment_target().into());
                }
                return exec.exec_closure(&getter, Vec::new(), Some(root.clone()));
            }
            if let Some(value) = input {
                if !object.borrow().props.contains_key(member) {
                    return Err(error::property_not_found(member).into());
                }
                object
                    .borrow_mut()
                    .props
                    .insert(member.to_string(), value.clone());
                return Ok(value);
            }
            object
                .borrow()
                .props
                .get(member)
                .cloned()
                .ok_or_else(|| error::property_not_found(member).into())
        }
        Value::Decimal(decimal) => {
            if member != "文本" {
                return Err(error::property_not_found(member).into());
            }
            if input.is_some() {
                return Err(error::invalid_assignment_target().into());
            }
            Ok(Value::Str(decimal.to_string()))
        }
        Value::Array(items) => {
            if input.is_some() {
                return Err(error::invalid_assignment_target().into());
            }
            let snapshot: Vec<Value> = items.borrow().clone();
            match member {
                "和" => builtins::fold_add(exec, &snapshot),
                "差" => builtins::fold_sub(exec, &snapshot),
                "积" => builtins::fold_mul(exec, &snapshot),
                "商" => builtins::fold_div(exec, &snapshot),
                "首" => Ok(snapshot.first().cloned().unwrap_or(Value::Null)),
                "尾" => Ok(snapshot.last().cloned().unwrap_or(Value::Null)),
                "数目" => Ok(Value::Decimal(Decimal::from_int(snapshot.len() as i64, 0))),
                _ => Err(error::property_not_found(member).into()),
            }
        }
        _ => Err(error::property_not_found(member).into()),
    }
}
