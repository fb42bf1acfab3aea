use crate::{db::query::predicate::path::FieldPath, value::Value};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::ops::{BitAnd, BitOr};

///
/// Predicate AST
///
/// Schema-agnostic representation of query predicates. Key references
/// (`pk`, ad-hoc column groups, relation hops) are kept symbolic here and
/// only resolved by the rewrite pass.
///

///
/// CompareOp
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
pub enum CompareOp {
    #[display("eq")]
    Eq,
    #[display("ne")]
    Ne,
    #[display("lt")]
    Lt,
    #[display("lte")]
    Lte,
    #[display("gt")]
    Gt,
    #[display("gte")]
    Gte,
    #[display("in")]
    In,
    #[display("not_in")]
    NotIn,
    #[display("contains")]
    Contains,
    #[display("starts_with")]
    StartsWith,
    #[display("ends_with")]
    EndsWith,
}

///
/// ComparePredicate
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ComparePredicate {
    pub path: FieldPath,
    pub op: CompareOp,
    pub value: Value,
}

impl ComparePredicate {
    #[must_use]
    pub fn new(path: impl Into<FieldPath>, op: CompareOp, value: impl Into<Value>) -> Self {
        Self {
            path: path.into(),
            op,
            value: value.into(),
        }
    }
}

///
/// Predicate
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Predicate {
    True,
    False,
    And(Vec<Self>),
    Or(Vec<Self>),
    Not(Box<Self>),
    Compare(ComparePredicate),
    IsNull { path: FieldPath },
}

impl Predicate {
    #[must_use]
    pub const fn and(preds: Vec<Self>) -> Self {
        Self::And(preds)
    }

    #[must_use]
    pub const fn or(preds: Vec<Self>) -> Self {
        Self::Or(preds)
    }

    #[expect(clippy::should_implement_trait)]
    #[must_use]
    pub fn not(pred: Self) -> Self {
        Self::Not(Box::new(pred))
    }

    #[must_use]
    pub fn compare(path: impl Into<FieldPath>, op: CompareOp, value: impl Into<Value>) -> Self {
        Self::Compare(ComparePredicate::new(path, op, value))
    }

    #[must_use]
    pub fn eq(path: impl Into<FieldPath>, value: impl Into<Value>) -> Self {
        Self::compare(path, CompareOp::Eq, value)
    }

    #[must_use]
    pub fn ne(path: impl Into<FieldPath>, value: impl Into<Value>) -> Self {
        Self::compare(path, CompareOp::Ne, value)
    }

    #[must_use]
    pub fn lt(path: impl Into<FieldPath>, value: impl Into<Value>) -> Self {
        Self::compare(path, CompareOp::Lt, value)
    }

    #[must_use]
    pub fn lte(path: impl Into<FieldPath>, value: impl Into<Value>) -> Self {
        Self::compare(path, CompareOp::Lte, value)
    }

    #[must_use]
    pub fn gt(path: impl Into<FieldPath>, value: impl Into<Value>) -> Self {
        Self::compare(path, CompareOp::Gt, value)
    }

    #[must_use]
    pub fn gte(path: impl Into<FieldPath>, value: impl Into<Value>) -> Self {
        Self::compare(path, CompareOp::Gte, value)
    }

    #[must_use]
    pub fn in_(path: impl Into<FieldPath>, values: Vec<Value>) -> Self {
        Self::compare(path, CompareOp::In, Value::List(values))
    }

    #[must_use]
    pub fn not_in(path: impl Into<FieldPath>, values: Vec<Value>) -> Self {
        Self::compare(path, CompareOp::NotIn, Value::List(values))
    }

    #[must_use]
    pub fn is_null(path: impl Into<FieldPath>) -> Self {
        Self::IsNull { path: path.into() }
    }
}

impl BitAnd for Predicate {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::And(vec![self, rhs])
    }
}

impl BitOr for Predicate {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::Or(vec![self, rhs])
    }
}
