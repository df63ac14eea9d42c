use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Restaurant as returned inside the grouped menu listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
}

/// Orderable menu entry (a product)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub is_available: bool,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
}

impl MenuItem {
    /// Comma separated ingredient names, or `N/A` when none are listed.
    pub fn ingredient_list(&self) -> String {
        if self.ingredients.is_empty() {
            return "N/A".to_string();
        }
        self.ingredients
            .iter()
            .map(|i| i.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// One restaurant with its menus (GET /menu/grouping/by/restaurant)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantMenus {
    pub restaurant_dto: Restaurant,
    #[serde(default)]
    pub menu_dtos: Vec<MenuItem>,
}

/// Look up a menu item by id across all restaurants.
pub fn find_menu_item(restaurants: &[RestaurantMenus], product_id: i64) -> Option<&MenuItem> {
    restaurants
        .iter()
        .flat_map(|r| r.menu_dtos.iter())
        .find(|item| item.id == product_id)
}
