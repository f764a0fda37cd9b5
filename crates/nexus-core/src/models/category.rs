//! Category model

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Icons a category may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoryIcon {
    Folder,
    Gamepad2,
    Briefcase,
    User,
    ShoppingCart,
    Heart,
    Star,
    Book,
    Music,
    Home,
    Code,
    Plane,
    Dumbbell,
}

impl CategoryIcon {
    pub const ALL: [Self; 13] = [
        Self::Folder,
        Self::Gamepad2,
        Self::Briefcase,
        Self::User,
        Self::ShoppingCart,
        Self::Heart,
        Self::Star,
        Self::Book,
        Self::Music,
        Self::Home,
        Self::Code,
        Self::Plane,
        Self::Dumbbell,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Folder => "Folder",
            Self::Gamepad2 => "Gamepad2",
            Self::Briefcase => "Briefcase",
            Self::User => "User",
            Self::ShoppingCart => "ShoppingCart",
            Self::Heart => "Heart",
            Self::Star => "Star",
            Self::Book => "Book",
            Self::Music => "Music",
            Self::Home => "Home",
            Self::Code => "Code",
            Self::Plane => "Plane",
            Self::Dumbbell => "Dumbbell",
        }
    }
}

impl fmt::Display for CategoryIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for CategoryIcon {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|icon| icon.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidInput(format!("Unknown category icon: {s}")))
    }
}

/// Color tokens a category may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryColor {
    Purple,
    Blue,
    Green,
    Red,
    Orange,
    Yellow,
    Pink,
    Cyan,
}

impl CategoryColor {
    pub const ALL: [Self; 8] = [
        Self::Purple,
        Self::Blue,
        Self::Green,
        Self::Red,
        Self::Orange,
        Self::Yellow,
        Self::Pink,
        Self::Cyan,
    ];

    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Purple => "purple",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Red => "red",
            Self::Orange => "orange",
            Self::Yellow => "yellow",
            Self::Pink => "pink",
            Self::Cyan => "cyan",
        }
    }
}

impl fmt::Display for CategoryColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.token())
    }
}

impl FromStr for CategoryColor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|color| color.token().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidInput(format!("Unknown category color: {s}")))
    }
}

/// A user-defined category notes are filed under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub id: String,
    pub label: String,
    pub icon: CategoryIcon,
    pub color: CategoryColor,
}

impl CategoryConfig {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        icon: CategoryIcon,
        color: CategoryColor,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            icon,
            color,
        }
    }
}

/// Built-in categories used until the user defines their own
#[must_use]
pub fn default_categories() -> Vec<CategoryConfig> {
    vec![
        CategoryConfig::new("gaming", "Gaming", CategoryIcon::Gamepad2, CategoryColor::Purple),
        CategoryConfig::new("work", "Work", CategoryIcon::Briefcase, CategoryColor::Blue),
        CategoryConfig::new("personal", "Personal", CategoryIcon::User, CategoryColor::Green),
    ]
}

/// Validate a category collection before it is saved
///
/// Requires at least one category, unique slug ids and non-empty labels.
/// Icons and colors are already closed enums at this point.
pub fn validate_categories(categories: &[CategoryConfig]) -> Result<()> {
    if categories.is_empty() {
        return Err(Error::InvalidInput(
            "At least one category is required".to_string(),
        ));
    }

    let slug = Regex::new(r"^[a-z0-9][a-z0-9_-]*$").expect("Invalid regex");
    let mut seen = HashSet::new();
    for category in categories {
        if !slug.is_match(&category.id) {
            return Err(Error::InvalidInput(format!(
                "Category id '{}' must be a lowercase slug",
                category.id
            )));
        }
        if !seen.insert(category.id.as_str()) {
            return Err(Error::InvalidInput(format!(
                "Duplicate category id '{}'",
                category.id
            )));
        }
        if category.label.trim().is_empty() {
            return Err(Error::InvalidInput(format!(
                "Category '{}' needs a label",
                category.id
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_categories_are_valid() {
        assert!(validate_categories(&default_categories()).is_ok());
    }

    #[test]
    fn rejects_empty_duplicate_and_unlabeled() {
        assert!(validate_categories(&[]).is_err());

        let mut duplicated = default_categories();
        duplicated.push(duplicated[0].clone());
        assert!(validate_categories(&duplicated).is_err());

        let unlabeled = vec![CategoryConfig::new(
            "misc",
            "  ",
            CategoryIcon::Star,
            CategoryColor::Red,
        )];
        assert!(validate_categories(&unlabeled).is_err());

        let bad_id = vec![CategoryConfig::new(
            "Not A Slug",
            "Misc",
            CategoryIcon::Star,
            CategoryColor::Red,
        )];
        assert!(validate_categories(&bad_id).is_err());
    }

    #[test]
    fn unknown_tokens_fail_to_deserialize() {
        let json = r#"{"id":"x","label":"X","icon":"Rocket","color":"blue"}"#;
        assert!(serde_json::from_str::<CategoryConfig>(json).is_err());

        let json = r#"{"id":"x","label":"X","icon":"Star","color":"magenta"}"#;
        assert!(serde_json::from_str::<CategoryConfig>(json).is_err());
    }

    #[test]
    fn user_created_category_deserializes() {
        // Shape written for categories added through the category manager
        let json = r#"[
            {"id": "cat_1733000000000", "label": "Nueva", "icon": "Folder", "color": "blue"}
        ]"#;
        let categories: Vec<CategoryConfig> = serde_json::from_str(json).unwrap();

        assert_eq!(categories[0].icon, CategoryIcon::Folder);
        assert!(validate_categories(&categories).is_ok());
    }

    #[test]
    fn tokens_parse_case_insensitively() {
        assert_eq!("gamepad2".parse::<CategoryIcon>().unwrap(), CategoryIcon::Gamepad2);
        assert_eq!("Cyan".parse::<CategoryColor>().unwrap(), CategoryColor::Cyan);
        assert!("teal".parse::<CategoryColor>().is_err());
    }
}
