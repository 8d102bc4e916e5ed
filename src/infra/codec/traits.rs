//! Traits exposed by the codec engine. They decouple the source of field
//! values (a plain map, a decoded packet) from the injection logic.
use crate::core::FieldValue;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

//==================================================================================FIELD_ACCESS
/// Lets the engine read field values by id without knowing the container.
///
/// ```rust
/// use korri_codec::core::{FieldMap, FieldValue};
/// use korri_codec::infra::codec::traits::FieldAccess;
///
/// let mut values = FieldMap::new();
/// values.insert("heading".into(), FieldValue::F64(0.5789));
/// assert_eq!(values.field("heading"), Some(&FieldValue::F64(0.5789)));
/// assert_eq!(values.field("deviation"), None);
/// ```
pub trait FieldAccess {
    /// Value supplied for field `id`, `None` when absent.
    fn field(&self, id: &str) -> Option<&FieldValue>;
}

impl FieldAccess for BTreeMap<String, FieldValue> {
    fn field(&self, id: &str) -> Option<&FieldValue> {
        self.get(id)
    }
}

impl<S: BuildHasher> FieldAccess for HashMap<String, FieldValue, S> {
    fn field(&self, id: &str) -> Option<&FieldValue> {
        self.get(id)
    }
}

impl FieldAccess for [(&str, FieldValue)] {
    fn field(&self, id: &str) -> Option<&FieldValue> {
        self.iter()
            .find(|(name, _)| *name == id)
            .map(|(_, value)| value)
    }
}
