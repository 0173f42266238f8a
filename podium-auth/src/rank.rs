// Admin categories and levels

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

/// Administrative category.
///
/// `Both` is the wildcard: as a user category it grants nothing extra, as a
/// requirement it accepts any user. Stored and transmitted as its numeric
/// code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Both,
    Devel,
    Manage,
}

impl Category {
    pub fn code(&self) -> u8 {
        match self {
            Category::Both => 0,
            Category::Devel => 1,
            Category::Manage => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Category::Both),
            1 => Some(Category::Devel),
            2 => Some(Category::Manage),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Both => "both",
            Category::Devel => "devel",
            Category::Manage => "manage",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = u8::deserialize(deserializer)?;
        Category::from_code(code)
            .ok_or_else(|| de::Error::custom(format!("invalid category code {code}")))
    }
}

/// Administrative level, 0 through 5. Higher outranks lower.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Level(u8);

impl Level {
    pub const BOTTOM: Level = Level(0);
    pub const OPERATOR: Level = Level(1);
    pub const EDITOR: Level = Level(2);
    pub const MANAGER: Level = Level(3);
    pub const DIRECTOR: Level = Level(4);
    pub const MASTER: Level = Level(5);

    /// Build a level, clamped to [`MASTER`](Self::MASTER).
    pub fn new(value: u8) -> Self {
        Level(value.min(Self::MASTER.0))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_codes() {
        for category in [Category::Both, Category::Devel, Category::Manage] {
            assert_eq!(Category::from_code(category.code()), Some(category));
        }
        assert_eq!(Category::from_code(7), None);
    }

    #[test]
    fn test_category_serializes_as_number() {
        let json = serde_json::to_string(&Category::Manage).unwrap();
        assert_eq!(json, "2");
        let parsed: Category = serde_json::from_str("1").unwrap();
        assert_eq!(parsed, Category::Devel);
        assert!(serde_json::from_str::<Category>("9").is_err());
    }

    #[test]
    fn test_level_ordering_and_clamp() {
        assert!(Level::MASTER > Level::MANAGER);
        assert!(Level::BOTTOM < Level::OPERATOR);
        assert_eq!(Level::new(200), Level::MASTER);
        assert_eq!(Level::new(3), Level::MANAGER);
    }
}
