//! In-memory item store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of `POST /api/items`
#[derive(Debug, Default, Deserialize)]
pub struct NewItem {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body of `PUT /api/items/:id`; absent fields are left unchanged
#[derive(Debug, Default, Deserialize)]
pub struct ItemPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

fn validate_name(name: &str) -> Result<String, ApiError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ApiError::Validation("Name is required".to_string()));
    }
    Ok(trimmed.to_string())
}

/// Items in insertion order
#[derive(Debug, Default)]
pub struct ItemStore {
    items: RwLock<Vec<Item>>,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn list(&self) -> Vec<Item> {
        self.items.read().await.clone()
    }

    pub async fn get(&self, id: &str) -> Result<Item, ApiError> {
        self.items
            .read()
            .await
            .iter()
            .find(|item| item.id == id)
            .cloned()
            .ok_or(ApiError::ItemNotFound)
    }

    pub async fn create(&self, input: NewItem) -> Result<Item, ApiError> {
        let name = validate_name(input.name.as_deref().unwrap_or_default())?;
        let item = Item {
            id: Uuid::new_v4().to_string(),
            name,
            description: input.description,
            created_at: Utc::now(),
            updated_at: None,
        };
        self.items.write().await.push(item.clone());
        Ok(item)
    }

    pub async fn update(&self, id: &str, patch: ItemPatch) -> Result<Item, ApiError> {
        let name = patch.name.as_deref().map(validate_name).transpose()?;

        let mut items = self.items.write().await;
        let item = items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(ApiError::ItemNotFound)?;

        if let Some(name) = name {
            item.name = name;
        }
        if patch.description.is_some() {
            item.description = patch.description;
        }
        item.updated_at = Some(Utc::now());
        Ok(item.clone())
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|item| item.id != id);
        if items.len() == before {
            return Err(ApiError::ItemNotFound);
        }
        Ok(())
    }
}
