use serde::{Deserialize, Serialize};

use crate::models::{EmoticonSize, User};

// -- JWT Claims --

/// JWT claims shared between parlor-api token issuance and the auth
/// middleware. Canonical definition lives here in parlor-types to
/// eliminate duplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: i64,
    pub username: String,
    pub token: String,
}

// -- Rooms --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateRoomRequest {
    pub name: String,
    pub allowed_users: Vec<String>,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendMessageRequest {
    pub text: String,
}

// -- Emoticons --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddEmoticonRequest {
    pub name: String,
    pub url: String,
    pub size: EmoticonSize,
    pub animated: bool,
    pub category: String,
}

// -- Files --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UploadFileRequest {
    pub filename: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BumpVersionRequest {
    pub url: String,
    pub edited_by: Vec<String>,
}
