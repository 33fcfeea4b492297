use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::ServiceError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ItemKind {
    Product,
    Wip,
}

/// A stock-keeping item: either a raw product or a WIP item.
///
/// Storage keeps this as two nullable columns; every conversion from those
/// columns goes through [`ItemRef::from_columns`], which rejects rows with
/// both or neither set.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ItemRef {
    Product(String),
    Wip(String),
}

impl ItemRef {
    pub fn product(id: impl Into<String>) -> Self {
        ItemRef::Product(id.into())
    }

    pub fn wip(id: impl Into<String>) -> Self {
        ItemRef::Wip(id.into())
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            ItemRef::Product(_) => ItemKind::Product,
            ItemRef::Wip(_) => ItemKind::Wip,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            ItemRef::Product(id) | ItemRef::Wip(id) => id,
        }
    }

    pub fn from_columns(product_id: Option<&str>, wip_item_id: Option<&str>) -> Result<Self, ServiceError> {
        match (non_empty(product_id), non_empty(wip_item_id)) {
            (Some(p), None) => Ok(ItemRef::Product(p.to_string())),
            (None, Some(w)) => Ok(ItemRef::Wip(w.to_string())),
            (None, None) => Err(ServiceError::ValidationError(
                "Either a product or a WIP item must be given".to_string(),
            )),
            (Some(_), Some(_)) => Err(ServiceError::ValidationError(
                "Only one of product or WIP item may be given".to_string(),
            )),
        }
    }

    /// Splits into `(product_id, wip_item_id)` column values.
    pub fn into_columns(self) -> (Option<String>, Option<String>) {
        match self {
            ItemRef::Product(id) => (Some(id), None),
            ItemRef::Wip(id) => (None, Some(id)),
        }
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id())
    }
}

/// Something that has a recipe: a menu or a WIP item.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum RecipeOwner {
    Menu(String),
    Wip(String),
}

impl RecipeOwner {
    pub fn id(&self) -> &str {
        match self {
            RecipeOwner::Menu(id) | RecipeOwner::Wip(id) => id,
        }
    }

    pub fn from_columns(menu_id: Option<&str>, wip_item_id: Option<&str>) -> Result<Self, ServiceError> {
        match (non_empty(menu_id), non_empty(wip_item_id)) {
            (Some(m), None) => Ok(RecipeOwner::Menu(m.to_string())),
            (None, Some(w)) => Ok(RecipeOwner::Wip(w.to_string())),
            (None, None) => Err(ServiceError::ValidationError(
                "Recipe line has no owner".to_string(),
            )),
            (Some(_), Some(_)) => Err(ServiceError::ValidationError(
                "Recipe line cannot belong to both a menu and a WIP item".to_string(),
            )),
        }
    }

    /// Splits into `(menu_id, wip_item_id)` column values.
    pub fn into_columns(self) -> (Option<String>, Option<String>) {
        match self {
            RecipeOwner::Menu(id) => (Some(id), None),
            RecipeOwner::Wip(id) => (None, Some(id)),
        }
    }
}

impl fmt::Display for RecipeOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecipeOwner::Menu(id) => write!(f, "menu:{}", id),
            RecipeOwner::Wip(id) => write!(f, "wip:{}", id),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_column_must_be_set() {
        assert_eq!(
            ItemRef::from_columns(Some("I010"), None).unwrap(),
            ItemRef::product("I010")
        );
        assert_eq!(
            ItemRef::from_columns(None, Some("W002")).unwrap(),
            ItemRef::wip("W002")
        );
        assert!(ItemRef::from_columns(None, None).is_err());
        assert!(ItemRef::from_columns(Some("I010"), Some("W002")).is_err());
        assert!(ItemRef::from_columns(Some("  "), None).is_err());
    }

    #[test]
    fn serializes_as_tagged_value() {
        let json = serde_json::to_value(ItemRef::wip("W002")).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "wip", "id": "W002"}));
    }

    #[test]
    fn owner_columns() {
        let owner = RecipeOwner::from_columns(None, Some("W002")).unwrap();
        assert_eq!(owner, RecipeOwner::Wip("W002".into()));
        assert_eq!(owner.into_columns(), (None, Some("W002".to_string())));
    }
}
