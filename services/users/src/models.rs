//! User entity and the payloads exchanged over the wire

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// First name applied when a creation request omits it
pub const DEFAULT_FIRST_NAME: &str = "John";

/// Last name applied when a creation request omits it
pub const DEFAULT_LAST_NAME: &str = "Doe";

/// User entity as held by the repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEntity {
    pub id: Uuid,
    pub login: String,
    pub first_name: String,
    pub last_name: String,
    pub games_played: u32,
    /// Game the user currently takes part in; never checked for existence
    pub current_game_id: Option<Uuid>,
}

impl UserEntity {
    /// Empty record at the given identity
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            login: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            games_played: 0,
            current_game_id: None,
        }
    }

    /// Record without an identity yet; the repository assigns one on insert
    pub fn unsaved(login: impl Into<String>, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            ..Self::new(Uuid::nil())
        }
    }

    /// "{last} {first}", as shown to clients
    pub fn full_name(&self) -> String {
        format!("{} {}", self.last_name, self.first_name)
    }
}

/// User representation returned to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: Uuid,
    pub login: String,
    pub full_name: String,
    pub games_played: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_game_id: Option<Uuid>,
}

impl From<&UserEntity> for UserDto {
    fn from(user: &UserEntity) -> Self {
        Self {
            id: user.id,
            login: user.login.clone(),
            full_name: user.full_name(),
            games_played: user.games_played,
            current_game_id: user.current_game_id,
        }
    }
}

/// Request body for user creation
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserToPostDto {
    pub login: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl UserToPostDto {
    /// Build the entity to insert, filling in the default names
    pub fn into_entity(self) -> UserEntity {
        UserEntity::unsaved(
            self.login.unwrap_or_default(),
            self.first_name.unwrap_or_else(|| DEFAULT_FIRST_NAME.to_string()),
            self.last_name.unwrap_or_else(|| DEFAULT_LAST_NAME.to_string()),
        )
    }
}

/// Request body for full replacement, and the editable projection of a user
/// that patch documents are applied to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdateDto {
    pub login: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl UserUpdateDto {
    /// Editable projection of a stored user
    pub fn from_entity(user: &UserEntity) -> Self {
        Self {
            login: Some(user.login.clone()),
            first_name: Some(user.first_name.clone()),
            last_name: Some(user.last_name.clone()),
        }
    }

    /// Replacement record at `id`; fields outside the projection start over
    pub fn into_entity(self, id: Uuid) -> UserEntity {
        let mut user = UserEntity::new(id);
        self.apply_to(&mut user);
        user
    }

    /// Copy the projected fields onto an existing record
    pub fn apply_to(self, user: &mut UserEntity) {
        user.login = self.login.unwrap_or_default();
        user.first_name = self.first_name.unwrap_or_default();
        user.last_name = self.last_name.unwrap_or_default();
    }
}
