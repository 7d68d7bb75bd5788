use std::fmt;

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message returned to clients when a required field is missing.
pub const MISSING_FIELDS_MESSAGE: &str = "Name and description are required";

/// Store-assigned identifier of an item, rendered as a plain string in JSON.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        ItemId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<ObjectId> for ItemId {
    fn from(oid: ObjectId) -> Self {
        ItemId(oid.to_hex())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An item as returned by `GET /items`.
///
/// `createdAt` is optional on read: documents written by other tools may not carry it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Item {
    #[serde(rename = "_id")]
    pub id: ItemId,
    pub name: String,
    pub description: String,
    #[serde(
        rename = "createdAt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{}", MISSING_FIELDS_MESSAGE)]
    MissingFields,
}

/// A validated insert payload. Only obtainable through [`NewItem::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    name: String,
    description: String,
}

impl NewItem {
    /// Checks presence of both fields. Empty strings count as absent.
    pub fn validate(
        name: Option<String>,
        description: Option<String>,
    ) -> Result<Self, ValidationError> {
        match (name, description) {
            (Some(name), Some(description)) if !name.is_empty() && !description.is_empty() => {
                Ok(NewItem { name, description })
            }
            _ => Err(ValidationError::MissingFields),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Turns the payload into a stored item once the store has picked an id and timestamp.
    pub fn into_item(self, id: ItemId, created_at: DateTime<Utc>) -> Item {
        Item {
            id,
            name: self.name,
            description: self.description,
            created_at: Some(created_at),
        }
    }
}

/// The fixed sample set inserted by bootstrap seeding.
pub fn sample_items() -> Vec<NewItem> {
    (1..=3)
        .map(|i| NewItem {
            name: format!("Item {}", i),
            description: format!("This is item {}", i),
        })
        .collect()
}
