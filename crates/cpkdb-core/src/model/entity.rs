use crate::model::field::EntityFieldModel;

///
/// EntityModel
/// Minimal, declared runtime model for one entity.
///

#[derive(Debug)]
pub struct EntityModel {
    /// Fully-qualified Rust type path (for dispatch and diagnostics).
    pub path: &'static str,
    /// Stable external name.
    pub entity_name: &'static str,
    /// Ordered field list; primary-key order follows declaration order.
    pub fields: &'static [EntityFieldModel],
}

impl EntityModel {
    /// Resolve a field by name, falling back to its storage column.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static EntityFieldModel> {
        let fields: &'static [EntityFieldModel] = self.fields;

        fields
            .iter()
            .find(|f| f.name == name)
            .or_else(|| fields.iter().find(|f| f.column_name() == name))
    }

    /// Primary-key constituents in declaration order.
    pub fn primary_keys(&self) -> impl Iterator<Item = &'static EntityFieldModel> {
        let fields: &'static [EntityFieldModel] = self.fields;

        fields.iter().filter(|f| f.primary_key)
    }
}
