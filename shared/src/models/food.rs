//! Food Model

use serde::{Deserialize, Serialize};

/// Menu item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Food {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Unit price in currency unit
    pub price: i64,
    pub is_active: bool,
}

impl Food {
    /// Menu picker match: exact category ignoring case, name containing
    /// `search` ignoring case. `None` matches every category.
    pub fn matches(&self, category: Option<&str>, search: &str) -> bool {
        let in_category = match category {
            None => true,
            Some(wanted) => self
                .category
                .as_deref()
                .is_some_and(|c| c.to_lowercase() == wanted.to_lowercase()),
        };
        in_category && self.name.to_lowercase().contains(&search.to_lowercase())
    }
}

/// Foods shown by the menu picker, in list order
pub fn filter_foods<'a>(foods: &'a [Food], category: Option<&str>, search: &str) -> Vec<&'a Food> {
    foods.iter().filter(|f| f.matches(category, search)).collect()
}

/// Create food payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodCreate {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: i64,
    pub is_active: bool,
}

/// Update food payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FoodUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Body of `PUT foods/{id}/status`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FoodStatusUpdate {
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn food(id: i64, name: &str, category: Option<&str>) -> Food {
        Food {
            id,
            name: name.to_string(),
            description: None,
            category: category.map(str::to_string),
            price: 10_000,
            is_active: true,
        }
    }

    #[test]
    fn test_filter_by_category_and_name() {
        let menu = vec![
            food(1, "Nasi Goreng", Some("Main")),
            food(2, "Es Teh", Some("drink")),
            food(3, "Es Jeruk", Some("Drink")),
            food(4, "Kerupuk", None),
        ];

        let ids = |found: Vec<&Food>| found.iter().map(|f| f.id).collect::<Vec<_>>();
        assert_eq!(ids(filter_foods(&menu, None, "")), vec![1, 2, 3, 4]);
        assert_eq!(ids(filter_foods(&menu, Some("DRINK"), "")), vec![2, 3]);
        assert_eq!(ids(filter_foods(&menu, Some("Drink"), "jeruk")), vec![3]);
        assert_eq!(ids(filter_foods(&menu, None, "ES")), vec![2, 3]);
        // Uncategorised food only shows without a category filter.
        assert!(filter_foods(&menu, Some("Snack"), "kerupuk").is_empty());
    }

    #[test]
    fn test_food_omits_absent_optionals() {
        let json = serde_json::to_value(food(1, "Nasi Goreng", None)).unwrap();
        assert!(json.get("category").is_none());
        assert!(json.get("description").is_none());
    }
}
