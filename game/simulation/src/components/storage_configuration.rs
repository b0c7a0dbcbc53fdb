use assets::{Category, DefNameId};

#[derive(Copy, Clone, Eq, PartialEq, Debug, Ord, PartialOrd)]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

/// One rule governing what a storage container wants and how urgently,
/// feeding [`crate::goal::producers::StorageGoalSystem`].
#[derive(Clone, Debug, PartialEq)]
pub struct StorageRule {
    /// `None` means "any item of `category`"
    pub def_name: Option<DefNameId>,
    pub category: Category,
    pub priority: Priority,
    pub min_amount: u32,
    pub max_amount: u32,
}

impl StorageRule {
    pub fn matches(&self, def_name: DefNameId, category: Category) -> bool {
        match self.def_name {
            Some(want) => want == def_name,
            None => self.category == category,
        }
    }
}

/// Attached to a storage container entity, listing what it should stock.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StorageConfiguration {
    pub rules: Vec<StorageRule>,
}
