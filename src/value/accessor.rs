//! Stored values of a document, keyed by slot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::document::field::FieldType;

/// One encoded value, ready to hand to the index engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredValue {
    /// Numeric slot the value lives under.
    pub slot: u32,
    /// Encoded bytes.
    pub bytes: Vec<u8>,
    /// Type tag used to pick the decoder, `None` for the generic string form.
    pub field_type: Option<FieldType>,
}

/// The encoded values of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueSet {
    values: BTreeMap<u32, Vec<u8>>,
}

impl ValueSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a stored value, replacing whatever was in its slot.
    pub fn insert(&mut self, value: StoredValue) -> Option<Vec<u8>> {
        self.values.insert(value.slot, value.bytes)
    }

    /// Raw bytes of a slot.
    pub fn get(&self, slot: u32) -> Option<&[u8]> {
        self.values.get(&slot).map(Vec::as_slice)
    }

    /// Remove a slot, returning its bytes.
    pub fn remove(&mut self, slot: u32) -> Option<Vec<u8>> {
        self.values.remove(&slot)
    }

    pub fn contains(&self, slot: u32) -> bool {
        self.values.contains_key(&slot)
    }

    /// Iterate over `(slot, bytes)` in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[u8])> {
        self.values.iter().map(|(slot, bytes)| (*slot, bytes.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_slot() {
        let mut values = ValueSet::new();
        values.insert(StoredValue {
            slot: 3,
            bytes: b"a".to_vec(),
            field_type: None,
        });
        let previous = values.insert(StoredValue {
            slot: 3,
            bytes: b"b".to_vec(),
            field_type: Some(FieldType::Text),
        });

        assert_eq!(previous, Some(b"a".to_vec()));
        assert_eq!(values.get(3), Some(&b"b"[..]));
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut values = ValueSet::new();
        for slot in [9, 1, 5] {
            values.insert(StoredValue {
                slot,
                bytes: vec![slot as u8],
                field_type: None,
            });
        }
        let slots: Vec<u32> = values.iter().map(|(slot, _)| slot).collect();
        assert_eq!(slots, vec![1, 5, 9]);

        assert_eq!(values.remove(5), Some(vec![5]));
        assert!(!values.contains(5));
        assert_eq!(values.get(5), None);

        values.clear();
        assert!(values.is_empty());
    }
}
