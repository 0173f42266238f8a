// Category and level gate for admin pages

use crate::rank::{Category, Level};
use serde::{Deserialize, Serialize};

/// What a protected page demands of the current user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRequirement {
    pub category: Category,
    pub level: Level,
}

impl AccessRequirement {
    pub fn new(category: Category, level: Level) -> Self {
        Self { category, level }
    }

    /// Anything a logged-in user may see.
    pub fn any() -> Self {
        Self::new(Category::Both, Level::BOTTOM)
    }

    /// The category must match (or the requirement is `Both`) and the user's
    /// level must reach the required one.
    pub fn permits(&self, category: Category, level: Level) -> bool {
        let category_ok = self.category == Category::Both || self.category == category;
        category_ok && level >= self.level
    }
}
