use std::fmt;

/// A signed id with a distinguished "not yet set" value.
pub trait IdValue: Copy + Ord + fmt::Debug {
    /// The value denoting an id that has not been set.
    const UNDEFINED: Self;

    /// Returns `true` unless this is [`IdValue::UNDEFINED`].
    fn is_defined(self) -> bool {
        self != Self::UNDEFINED
    }
}

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub i32);

        impl IdValue for $name {
            const UNDEFINED: Self = Self(-1);
        }

        impl Default for $name {
            fn default() -> Self {
                Self::UNDEFINED
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

id_type! {
    /// Material classification tag.
    MaterialId
}

id_type! {
    /// Zone classification tag. Zones disambiguate regions sharing a material.
    ZoneId
}

/// A boundary or volume condition attached to a domain or block.
///
/// `type_id` selects the physical type from the
/// [`ConditionCatalog`](super::ConditionCatalog); `0` means the entity is
/// unspecified. `id` is the user id of the condition and carries the zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Condition {
    pub type_id: u32,
    pub id: i32,
}

impl Condition {
    /// The "Unspecified" condition.
    pub const UNSPECIFIED: Self = Self { type_id: 0, id: 0 };

    #[must_use]
    pub fn new(type_id: u32, id: i32) -> Self {
        Self { type_id, id }
    }
}

/// A resolved `(material, zone)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatZone {
    pub material: MaterialId,
    pub zone: ZoneId,
}

impl MatZone {
    pub const UNDEFINED: Self = Self {
        material: MaterialId::UNDEFINED,
        zone: ZoneId::UNDEFINED,
    };

    #[must_use]
    pub fn new(material: i32, zone: i32) -> Self {
        Self {
            material: MaterialId(material),
            zone: ZoneId(zone),
        }
    }

    /// Returns `true` when both the material and the zone are defined.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.material.is_defined() && self.zone.is_defined()
    }
}
