use crate::model::IdValue;

/// Reduces a sequence of candidate ids to one id plus a conflict flag.
///
/// The highest offered id wins. The conflict flag becomes `true` as soon as
/// two distinct defined ids have been offered and is never cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagedId<T: IdValue> {
    id: T,
    had_conflict: bool,
}

impl<T: IdValue> Default for ManagedId<T> {
    fn default() -> Self {
        Self {
            id: T::UNDEFINED,
            had_conflict: false,
        }
    }
}

impl<T: IdValue> ManagedId<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one candidate id into the accumulator.
    pub fn offer(&mut self, id: T) {
        if !id.is_defined() || id == self.id {
            return;
        }
        if !self.id.is_defined() {
            self.id = id;
            return;
        }
        self.had_conflict = true;
        if id > self.id {
            self.id = id;
        }
    }

    /// The current id, possibly [`IdValue::UNDEFINED`].
    #[must_use]
    pub fn id(&self) -> T {
        self.id
    }

    #[must_use]
    pub fn had_conflict(&self) -> bool {
        self.had_conflict
    }

    /// Returns `true` once a defined id has been offered.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.id.is_defined()
    }

    /// The current id and the conflict flag, or `None` while unset.
    #[must_use]
    pub fn resolve(&self) -> Option<(T, bool)> {
        self.is_set().then_some((self.id, self.had_conflict))
    }
}
