use serde::{Deserialize, Serialize};

use super::quantity::Quantity;

/// A named stock record.
///
/// `name` is the unique key within a snapshot. Field order here is the
/// canonical serialization order used for content hashing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub unit: String,
    pub quantity: Quantity,
}

impl Item {
    pub fn new(name: impl Into<String>, unit: impl Into<String>, quantity: Quantity) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            quantity,
        }
    }
}

/// Sort items into canonical order (ascending by name, byte-wise).
pub fn sort_canonical(items: &mut [Item]) {
    items.sort_by(|a, b| a.name.cmp(&b.name));
}

/// Whether a slice is already in canonical order.
pub fn is_canonical(items: &[Item]) -> bool {
    items.windows(2).all(|pair| pair[0].name <= pair[1].name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_canonical_is_bytewise() {
        let mut items = vec![
            Item::new("beta", "kg", Quantity::from_units(1)),
            Item::new("Alpha", "kg", Quantity::from_units(1)),
            Item::new("alpha", "kg", Quantity::from_units(1)),
        ];
        sort_canonical(&mut items);
        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "alpha", "beta"]);
        assert!(is_canonical(&items));
    }
}
