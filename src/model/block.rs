use super::condition::Condition;

slotmap::new_key_type! {
    /// Unique identifier for a block in a grid model.
    pub struct BlockId;
}

/// A 2D mesh region; owner of a volume condition.
#[derive(Debug, Clone, Default)]
pub struct BlockData {
    pub name: String,
    /// Volume condition, `None` when the block is unspecified.
    pub condition: Option<Condition>,
}

impl BlockData {
    /// Creates a new block.
    #[must_use]
    pub fn new(name: impl Into<String>, condition: Option<Condition>) -> Self {
        Self {
            name: name.into(),
            condition,
        }
    }
}
