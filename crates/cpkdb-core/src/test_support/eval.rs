use crate::{
    db::query::predicate::{
        ast::{CompareOp, ComparePredicate, Predicate},
        path::{FieldPath, PathTarget},
    },
    value::Value,
};
use std::{cmp::Ordering, collections::BTreeMap};

/// Stored row, keyed by field name.
pub(crate) type Row = BTreeMap<String, Value>;

/// Reference evaluation of a rewritten predicate against one row.
///
/// Only root-level fields and tuple membership are understood; anything
/// else (key aliases, relation hops) evaluates to false.
pub(crate) fn eval(predicate: &Predicate, row: &Row) -> bool {
    match predicate {
        Predicate::True => true,
        Predicate::False => false,
        Predicate::And(children) => children.iter().all(|c| eval(c, row)),
        Predicate::Or(children) => children.iter().any(|c| eval(c, row)),
        Predicate::Not(inner) => !eval(inner, row),
        Predicate::Compare(cmp) => eval_compare(cmp, row),
        Predicate::IsNull { path } => lookup(path, row).is_none_or(Value::is_null),
    }
}

fn lookup<'r>(path: &FieldPath, row: &'r Row) -> Option<&'r Value> {
    match path.target() {
        PathTarget::Field(name) if path.relations().is_empty() => row.get(name),
        _ => None,
    }
}

fn eval_compare(cmp: &ComparePredicate, row: &Row) -> bool {
    if let (CompareOp::In, PathTarget::Combined(names)) = (cmp.op, cmp.path.target()) {
        let tuple: Vec<Value> = names
            .iter()
            .map(|name| row.get(name).cloned().unwrap_or(Value::Null))
            .collect();
        if tuple.iter().any(Value::is_null) {
            return false;
        }
        return cmp
            .value
            .as_list()
            .unwrap_or_default()
            .iter()
            .any(|candidate| candidate.as_list() == Some(tuple.as_slice()));
    }

    let Some(actual) = lookup(&cmp.path, row).filter(|v| !v.is_null()) else {
        return false;
    };
    let expected = &cmp.value;

    match cmp.op {
        CompareOp::Eq => scalar_eq(actual, expected),
        CompareOp::Ne => !scalar_eq(actual, expected),
        CompareOp::Lt => actual.partial_cmp_scalar(expected) == Some(Ordering::Less),
        CompareOp::Lte => matches!(
            actual.partial_cmp_scalar(expected),
            Some(Ordering::Less | Ordering::Equal)
        ),
        CompareOp::Gt => actual.partial_cmp_scalar(expected) == Some(Ordering::Greater),
        CompareOp::Gte => matches!(
            actual.partial_cmp_scalar(expected),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        CompareOp::In => members(expected).iter().any(|v| scalar_eq(actual, v)),
        CompareOp::NotIn => !members(expected).iter().any(|v| scalar_eq(actual, v)),
        CompareOp::Contains => text_op(actual, expected, |a, b| a.contains(b)),
        CompareOp::StartsWith => text_op(actual, expected, |a, b| a.starts_with(b)),
        CompareOp::EndsWith => text_op(actual, expected, |a, b| a.ends_with(b)),
    }
}

fn scalar_eq(a: &Value, b: &Value) -> bool {
    a == b || a.partial_cmp_scalar(b) == Some(Ordering::Equal)
}

fn members(value: &Value) -> &[Value] {
    value.as_list().unwrap_or_else(|| std::slice::from_ref(value))
}

fn text_op(actual: &Value, expected: &Value, f: impl Fn(&str, &str) -> bool) -> bool {
    match (actual.as_text(), expected.as_text()) {
        (Some(a), Some(b)) => f(a, b),
        _ => false,
    }
}
