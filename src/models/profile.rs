use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ClientError, Result};

/// Public profile of a user. `id` is the auth identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    pub last_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_path: Option<String>,
}

impl Profile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.last_name).trim().to_string()
    }
}

/// Row written once, right after registration.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewProfile {
    pub id: Uuid,
    pub name: String,
    pub last_name: String,
}

impl NewProfile {
    pub fn new(id: Uuid, name: &str, last_name: &str) -> Result<Self> {
        let (name, last_name) = (name.trim(), last_name.trim());
        if name.is_empty() || last_name.is_empty() {
            return Err(ClientError::validation("name and last name are required"));
        }
        Ok(Self {
            id,
            name: name.to_string(),
            last_name: last_name.to_string(),
        })
    }
}

/// Columns a user may change on their own profile. Unset fields are left alone.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.image_path.is_none()
    }
}
