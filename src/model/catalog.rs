use std::collections::HashMap;

use super::condition::{Condition, IdValue, MatZone, MaterialId, ZoneId};

/// Number of generated `Material-*` condition types.
pub const MATERIAL_COUNT: i32 = 36;

const MATERIAL_LETTERS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Returns the single-character tag of a material: `0`-`9`, `A`-`Z` for ids
/// 0 through 35 and `?` for anything else (including undefined).
#[must_use]
pub fn material_letter(material: MaterialId) -> char {
    usize::try_from(material.0)
        .ok()
        .and_then(|i| MATERIAL_LETTERS.get(i))
        .map_or('?', |&b| char::from(b))
}

/// A condition physical type known to the exporter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionType {
    pub name: String,
    pub type_id: u32,
}

/// The set of boundary and volume condition types the exporter understands.
///
/// Built once and shared by reference. Every material `m` gets a generated
/// type named `Material-<letter>` with type id `m + 1`, valid both as a
/// boundary (domain) and a volume (block) condition.
#[derive(Debug, Clone)]
pub struct ConditionCatalog {
    types: Vec<ConditionType>,
    by_name: HashMap<String, u32>,
}

impl Default for ConditionCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ConditionCatalog {
    /// Creates the catalog with all generated material types.
    #[must_use]
    pub fn new() -> Self {
        let mut types = Vec::with_capacity(MATERIAL_LETTERS.len());
        let mut by_name = HashMap::with_capacity(MATERIAL_LETTERS.len());
        for m in 0..MATERIAL_COUNT {
            let name = format!("Material-{}", material_letter(MaterialId(m)));
            let type_id = m.unsigned_abs() + 1;
            by_name.insert(name.clone(), type_id);
            types.push(ConditionType { name, type_id });
        }
        Self { types, by_name }
    }

    /// All known condition types, in type id order.
    #[must_use]
    pub fn types(&self) -> &[ConditionType] {
        &self.types
    }

    /// Looks up the type id of a physical type name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<u32> {
        self.by_name.get(name).copied()
    }

    /// Returns the physical type name of a type id.
    #[must_use]
    pub fn name(&self, type_id: u32) -> Option<&str> {
        self.types
            .iter()
            .find(|t| t.type_id == type_id)
            .map(|t| t.name.as_str())
    }

    /// The `|`-separated list of generated type names. None of them inflate.
    #[must_use]
    pub fn shadow_types(&self) -> String {
        self.types
            .iter()
            .map(|t| t.name.as_str())
            .collect::<Vec<_>>()
            .join("|")
    }

    /// Resolves a condition into its `(material, zone)` pair.
    ///
    /// The unspecified type (`0`) resolves to undefined material and zone.
    #[must_use]
    pub fn resolve(&self, condition: &Condition) -> MatZone {
        if condition.type_id == 0 {
            return MatZone::UNDEFINED;
        }
        let material = i32::try_from(condition.type_id - 1).map_or(MaterialId::UNDEFINED, MaterialId);
        MatZone {
            material,
            zone: ZoneId(condition.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_cover_digits_and_alphabet() {
        assert_eq!(material_letter(MaterialId(0)), '0');
        assert_eq!(material_letter(MaterialId(9)), '9');
        assert_eq!(material_letter(MaterialId(10)), 'A');
        assert_eq!(material_letter(MaterialId(35)), 'Z');
        assert_eq!(material_letter(MaterialId(36)), '?');
        assert_eq!(material_letter(MaterialId::UNDEFINED), '?');
    }

    #[test]
    fn generated_types() {
        let catalog = ConditionCatalog::new();
        assert_eq!(catalog.types().len(), 36);
        assert_eq!(catalog.lookup("Material-0"), Some(1));
        assert_eq!(catalog.lookup("Material-C"), Some(13));
        assert_eq!(catalog.lookup("Wall"), None);
        assert_eq!(catalog.name(36), Some("Material-Z"));
        assert!(catalog.shadow_types().starts_with("Material-0|Material-1|"));
        assert!(catalog.shadow_types().ends_with("|Material-Z"));
    }

    #[test]
    fn resolve_condition() {
        let catalog = ConditionCatalog::new();
        assert_eq!(catalog.resolve(&Condition::new(3, 5)), MatZone::new(2, 5));
        assert_eq!(catalog.resolve(&Condition::UNSPECIFIED), MatZone::UNDEFINED);
    }
}
