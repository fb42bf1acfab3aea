use crate::{
    db::query::{
        context::RewriteContext,
        predicate::{
            ast::{CompareOp, ComparePredicate, Predicate},
            path::{FieldPath, PathTarget},
        },
    },
    error::{CompositeKeyError, InternalError},
    key::KeyRef,
    model::field::EntityFieldModel,
    obs::sink::{MetricsEvent, record},
    value::Value,
};

///
/// Rewrite key references in a predicate into plain column predicates.
///
/// Rules, applied leaf by leaf:
/// - single-column key references become the underlying field, any operator
/// - `eq` on a multi-column key becomes an AND of per-constituent `eq`
/// - `in` on a root multi-column key becomes one tuple `in` over the
///   constituents; behind a relation it is rejected whenever the target key
///   is multi-column, even when every relation hop is single-column
/// - every other operator on a multi-column key is rejected
///
/// `And`/`Or`/`Not` structure and child order are preserved exactly; the
/// pass never flattens or reorders. Errors surface before anything is
/// executed.
///
pub fn rewrite_predicate(
    ctx: &RewriteContext<'_>,
    predicate: &Predicate,
) -> Result<Predicate, InternalError> {
    let mut rewriter = Rewriter { ctx, rewritten: 0 };
    let out = rewriter.rewrite(predicate)?;

    if rewriter.rewritten > 0 {
        record(MetricsEvent::PredicateRewritten {
            entity_path: ctx.entity().path(),
            leaves_rewritten: rewriter.rewritten,
        });
    }

    Ok(out)
}

struct Rewriter<'c, 'a> {
    ctx: &'c RewriteContext<'a>,
    rewritten: u64,
}

impl Rewriter<'_, '_> {
    fn rewrite(&mut self, predicate: &Predicate) -> Result<Predicate, InternalError> {
        match predicate {
            Predicate::True => Ok(Predicate::True),
            Predicate::False => Ok(Predicate::False),

            Predicate::And(children) => Ok(Predicate::And(self.rewrite_all(children)?)),
            Predicate::Or(children) => Ok(Predicate::Or(self.rewrite_all(children)?)),
            Predicate::Not(inner) => Ok(Predicate::not(self.rewrite(inner)?)),

            Predicate::Compare(cmp) => self.rewrite_compare(cmp),
            Predicate::IsNull { path } => self.rewrite_is_null(path),
        }
    }

    fn rewrite_all(&mut self, children: &[Predicate]) -> Result<Vec<Predicate>, InternalError> {
        children.iter().map(|child| self.rewrite(child)).collect()
    }

    fn rewrite_compare(&mut self, cmp: &ComparePredicate) -> Result<Predicate, InternalError> {
        let Some(key) = self.ctx.resolve(&cmp.path)? else {
            return Ok(Predicate::Compare(cmp.clone()));
        };
        let relations = cmp.path.relations();
        let separator = self.ctx.separator();

        let out = match (&key, cmp.op) {
            (KeyRef::Field(field), op) => Predicate::Compare(ComparePredicate {
                path: field_path(relations, field),
                op,
                value: cmp.value.clone(),
            }),

            (KeyRef::Composite(_), CompareOp::Eq) => {
                let values = key.split_value(&cmp.value, separator)?;
                Predicate::And(
                    key.fields()
                        .iter()
                        .zip(values)
                        .map(|(field, value)| Predicate::eq(field_path(relations, field), value))
                        .collect(),
                )
            }

            (KeyRef::Composite(_), CompareOp::In) if relations.is_empty() => {
                let operands = match &cmp.value {
                    Value::List(items) => items.as_slice(),
                    single => std::slice::from_ref(single),
                };
                let tuples = operands
                    .iter()
                    .map(|operand| key.split_value(operand, separator).map(Value::List))
                    .collect::<Result<Vec<_>, _>>()?;

                Predicate::Compare(ComparePredicate {
                    path: FieldPath::new(
                        Vec::new(),
                        PathTarget::Combined(key.fields().iter().map(|f| f.name.to_string()).collect()),
                    ),
                    op: CompareOp::In,
                    value: Value::List(tuples),
                })
            }

            (KeyRef::Composite(_), op) => {
                return Err(self.reject(&cmp.path, &op.to_string()));
            }
        };

        self.rewritten += 1;

        Ok(out)
    }

    fn rewrite_is_null(&mut self, path: &FieldPath) -> Result<Predicate, InternalError> {
        match self.ctx.resolve(path)? {
            None => Ok(Predicate::IsNull { path: path.clone() }),
            Some(KeyRef::Field(field)) => {
                self.rewritten += 1;
                Ok(Predicate::IsNull {
                    path: field_path(path.relations(), field),
                })
            }
            Some(KeyRef::Composite(_)) => Err(self.reject(path, "is_null")),
        }
    }

    fn reject(&self, path: &FieldPath, op: &str) -> InternalError {
        let entity_path = self.ctx.entity().path();
        let path = self.ctx.registry().format_path(path);
        tracing::warn!(entity = entity_path, path = %path, op, "cpkdb.lookup_rejected");
        record(MetricsEvent::LookupRejected { entity_path });

        CompositeKeyError::UnsupportedLookup {
            path,
            op: op.to_string(),
        }
        .into()
    }
}

fn field_path(relations: &[String], field: &EntityFieldModel) -> FieldPath {
    FieldPath::new(relations.to_vec(), PathTarget::Field(field.name.to_string()))
}

///
/// Expand tuple membership into its boolean form.
///
/// `(a, b) IN ((1, 2), (3, 4))` becomes `(a = 1 AND b = 2) OR (a = 3 AND b = 4)`.
/// For backends without row-value comparison. Everything else is copied.
///
#[must_use]
pub fn expand_tuple_in(predicate: &Predicate) -> Predicate {
    match predicate {
        Predicate::And(children) => Predicate::And(children.iter().map(expand_tuple_in).collect()),
        Predicate::Or(children) => Predicate::Or(children.iter().map(expand_tuple_in).collect()),
        Predicate::Not(inner) => Predicate::not(expand_tuple_in(inner)),

        Predicate::Compare(ComparePredicate {
            path,
            op: CompareOp::In,
            value: Value::List(tuples),
        }) => match path.target() {
            PathTarget::Combined(names) => Predicate::Or(
                tuples
                    .iter()
                    .map(|tuple| {
                        let values = tuple.as_list().unwrap_or_default();
                        Predicate::And(
                            names
                                .iter()
                                .zip(values)
                                .map(|(name, value)| {
                                    Predicate::eq(
                                        path.with_target(PathTarget::Field(name.clone())),
                                        value.clone(),
                                    )
                                })
                                .collect(),
                        )
                    })
                    .collect(),
            ),
            _ => predicate.clone(),
        },

        other => other.clone(),
    }
}
