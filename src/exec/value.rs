//! Runtime values.
//!
//! A [`Value`] is a tagged sum over the language's eight kinds. Containers
//! (array, hashmap, object) are shared behind `Rc<RefCell<…>>` so that
//! assignment through a member intermediary is observable to every holder;
//! [`duplicate`] performs the deep copy applied on variable declaration.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::{self, Diagnostic};
use crate::exec::closure::{ClassRef, ClosureRef};
use crate::exec::decimal::Decimal;

pub type ArrayRef = Rc<RefCell<Vec<Value>>>;
pub type HashMapRef = Rc<RefCell<IndexMap<String, Value>>>;
pub type ObjectRef = Rc<RefCell<ObjectInstance>>;

/// A user-defined class instance: class reference plus property map.
#[derive(Debug, Clone)]
pub struct ObjectInstance {
    pub class: Rc<ClassRef>,
    pub props: IndexMap<String, Value>,
}

#[derive(Debug, Clone)]
pub enum Value {
    Decimal(Decimal),
    Str(String),
    Bool(bool),
    Null,
    Array(ArrayRef),
    HashMap(HashMapRef),
    Function(Rc<ClosureRef>),
    Object(ObjectRef),
}

impl Value {
    pub fn new_array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn new_hashmap(pairs: Vec<(String, Value)>) -> Self {
        let mut map = IndexMap::new();
        for (key, value) in pairs {
            map.insert(key, value);
        }
        Value::HashMap(Rc::new(RefCell::new(map)))
    }

    pub fn new_object(class: Rc<ClassRef>, props: IndexMap<String, Value>) -> Self {
        Value::Object(Rc::new(RefCell::new(ObjectInstance { class, props })))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Decimal(_) => "decimal",
            Value::Str(_) => "string",
            Value::Bool(_) => "bool",
            Value::Null => "null",
            Value::Array(_) => "array",
            Value::HashMap(_) => "hashmap",
            Value::Function(_) => "function",
            Value::Object(_) => "object",
        }
    }

    /// Canonical display string, mirroring source syntax for collections.
    pub fn display_string(&self) -> String {
        match self {
            Value::Decimal(decimal) => decimal.to_string(),
            Value::Str(text) => format!("「{}」", text),
            Value::Bool(true) => "真".to_string(),
            Value::Bool(false) => "假".to_string(),
            Value::Null => "空".to_string(),
            Value::Array(items) => {
                let parts: Vec<String> = items
                    .borrow()
                    .iter()
                    .map(Value::display_string)
                    .collect();
                format!("【{}】", parts.join("，"))
            }
            Value::HashMap(map) => {
                let parts: Vec<String> = map
                    .borrow()
                    .iter()
                    .map(|(key, value)| format!("{} == {}", key, value.display_string()))
                    .collect();
                format!("【{}】", parts.join("，"))
            }
            Value::Function(closure) => format!("方法： {}", closure.name),
            Value::Object(_) => "[Object]".to_string(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<&Decimal> {
        match self {
            Value::Decimal(value) => Some(value),
            _ => None,
        }
    }
}

/// Deep copy applied on variable declaration: decimals, strings, bools,
/// arrays, hashmaps and objects copy; functions and null are shared.
pub fn duplicate(value: &Value) -> Value {
    match value {
        Value::Decimal(decimal) => Value::Decimal(decimal.clone()),
        Value::Str(text) => Value::Str(text.clone()),
        Value::Bool(flag) => Value::Bool(*flag),
        Value::Null => Value::Null,
        Value::Function(closure) => Value::Function(Rc::clone(closure)),
        Value::Array(items) => {
            let copied: Vec<Value> = items.borrow().iter().map(duplicate).collect();
            Value::new_array(copied)
        }
        Value::HashMap(map) => {
            let copied: Vec<(String, Value)> = map
                .borrow()
                .iter()
                .map(|(key, value)| (key.clone(), duplicate(value)))
                .collect();
            Value::new_hashmap(copied)
        }
        Value::Object(object) => {
            let instance = object.borrow();
            let props: IndexMap<String, Value> = instance
                .props
                .iter()
                .map(|(key, value)| (key.clone(), duplicate(value)))
                .collect();
            Value::new_object(Rc::clone(&instance.class), props)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareVerb {
    Eq,
    Lt,
    Gt,
}

const COMPARABLE_TYPES: [&str; 5] = ["decimal", "string", "bool", "array", "hashmap"];

/// Structural comparison. Eq pairs any two values of the same kind
/// (element-wise for collections; a kind mismatch is simply non-equal);
/// Lt/Gt are defined for decimals only.
pub fn compare_values(
    left: &Value,
    right: &Value,
    verb: CompareVerb,
) -> Result<bool, Diagnostic> {
    match left {
        Value::Null => Ok(matches!(right, Value::Null)),
        Value::Decimal(vl) => {
            if let Value::Decimal(vr) = right {
                let ordering = vl.cmp_value(vr);
                return Ok(match verb {
                    CompareVerb::Eq => ordering == std::cmp::Ordering::Equal,
                    CompareVerb::Lt => ordering == std::cmp::Ordering::Less,
                    CompareVerb::Gt => ordering == std::cmp::Ordering::Greater,
                });
            }
            if verb == CompareVerb::Eq {
                return Ok(false);
            }
            Err(error::invalid_compare_r_type(&["decimal"]))
        }
        Value::Str(vl) => {
            if verb != CompareVerb::Eq {
                return Err(error::invalid_compare_l_type(&COMPARABLE_TYPES));
            }
            match right {
                Value::Str(vr) => Ok(vl == vr),
                _ => Ok(false),
            }
        }
        Value::Bool(vl) => {
            if verb != CompareVerb::Eq {
                return Err(error::invalid_compare_l_type(&COMPARABLE_TYPES));
            }
            match right {
                Value::Bool(vr) => Ok(vl == vr),
                _ => Ok(false),
            }
        }
        Value::Array(vl) => {
            if verb != CompareVerb::Eq {
                return Err(error::invalid_compare_l_type(&COMPARABLE_TYPES));
            }
            let Value::Array(vr) = right else {
                return Ok(false);
            };
            let left_items = vl.borrow();
            let right_items = vr.borrow();
            if left_items.len() != right_items.len() {
                return Ok(false);
            }
            for (a, b) in left_items.iter().zip(right_items.iter()) {
                if !compare_values(a, b, CompareVerb::Eq)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Value::HashMap(vl) => {
            if verb != CompareVerb::Eq {
                return Err(error::invalid_compare_l_type(&COMPARABLE_TYPES));
            }
            let Value::HashMap(vr) = right else {
                return Ok(false);
            };
            let left_map = vl.borrow();
            let right_map = vr.borrow();
            if left_map.len() != right_map.len() {
                return Ok(false);
            }
            for (key, a) in left_map.iter() {
                let Some(b) = right_map.get(key) else {
                    return Ok(false);
                };
                if !compare_values(a, b, CompareVerb::Eq)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        _ => Err(error::invalid_compare_l_type(&COMPARABLE_TYPES)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(value: i64, exp: i32) -> Value {
        Value::Decimal(Decimal::from_int(value, exp))
    }

    #[test]
    fn displays_values_in_source_syntax() {
        assert_eq!(dec(1234, -3).display_string(), "1.234");
        assert_eq!(Value::Str("这是「一个」测试".to_string()).display_string(), "「这是「一个」测试」");
        assert_eq!(Value::Bool(false).display_string(), "假");
        assert_eq!(Value::Null.display_string(), "空");
        let array = Value::new_array(vec![
            Value::Bool(true),
            Value::Str("哈哈哈哈".to_string()),
            dec(1234, -3),
        ]);
        assert_eq!(array.display_string(), "【真，「哈哈哈哈」，1.234】");
        let map = Value::new_hashmap(vec![
            ("猪".to_string(), dec(100, 2)),
            (
                "锅".to_string(),
                Value::new_hashmap(vec![("SH".to_string(), Value::Bool(true))]),
            ),
        ]);
        assert_eq!(map.display_string(), "【猪 == 10000，锅 == 【SH == 真】】");
    }

    #[test]
    fn duplicate_deep_copies_containers() {
        let inner = Value::new_array(vec![dec(1, 0)]);
        let outer = Value::new_array(vec![inner.clone(), Value::Str("甲".to_string())]);
        let copy = duplicate(&outer);

        // mutating the original leaves the copy untouched
        if let Value::Array(items) = &outer {
            items.borrow_mut().push(dec(9, 0));
        }
        if let Value::Array(items) = &inner {
            items.borrow_mut().push(dec(8, 0));
        }
        assert_eq!(copy.display_string(), "【【1】，「甲」】");
    }

    #[test]
    fn duplicate_is_idempotent() {
        let value = Value::new_hashmap(vec![
            ("甲".to_string(), dec(25, -1)),
            ("乙".to_string(), Value::new_array(vec![Value::Bool(true)])),
        ]);
        let once = duplicate(&value);
        let twice = duplicate(&once);
        assert!(compare_values(&once, &twice, CompareVerb::Eq).expect("comparable"));
    }

    #[test]
    fn equality_is_structural_and_kind_strict() {
        assert!(compare_values(&dec(10, 0), &dec(100, -1), CompareVerb::Eq).expect("cmp"));
        // a number never equals its textual form
        assert!(!compare_values(&dec(2, 0), &Value::Str("2".to_string()), CompareVerb::Eq)
            .expect("cmp"));
        let a = Value::new_array(vec![dec(1, 0), dec(2, 0)]);
        let b = Value::new_array(vec![dec(1, 0), dec(2, 0)]);
        let c = Value::new_array(vec![dec(1, 0), dec(3, 0)]);
        assert!(compare_values(&a, &b, CompareVerb::Eq).expect("cmp"));
        assert!(!compare_values(&a, &c, CompareVerb::Eq).expect("cmp"));
        // element kind mismatch is non-equal, not an error
        let d = Value::new_array(vec![dec(1, 0), Value::Str("2".to_string())]);
        assert!(!compare_values(&a, &d, CompareVerb::Eq).expect("cmp"));
    }

    #[test]
    fn ordering_requires_decimals() {
        assert!(compare_values(&dec(1, 0), &dec(2, 0), CompareVerb::Lt).expect("cmp"));
        let err = compare_values(
            &Value::Str("甲".to_string()),
            &Value::Str("乙".to_string()),
            CompareVerb::Lt,
        )
        .expect_err("expected type error");
        assert_eq!(err.code(), 0x2304);
    }

    #[test]
    fn hashmap_keys_keep_insertion_order() {
        let map = Value::new_hashmap(vec![
            ("a".to_string(), dec(1, 0)),
            ("b".to_string(), dec(2, 0)),
            ("c".to_string(), dec(3, 0)),
        ]);
        if let Value::HashMap(inner) = &map {
            let keys: Vec<String> = inner.borrow().keys().cloned().collect();
            assert_eq!(keys, vec!["a", "b", "c"]);
        } else {
            unreachable!();
        }
    }
}
