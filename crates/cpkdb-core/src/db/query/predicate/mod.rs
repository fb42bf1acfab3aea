pub mod ast;
pub mod path;
pub mod rewrite;


pub use ast::{CompareOp, ComparePredicate, Predicate};
pub use path::{FieldPath, PathTarget};
pub use rewrite::{expand_tuple_in, rewrite_predicate};
