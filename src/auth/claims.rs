use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session token payload. Identity fields are copied from the user at sign-in
/// and never re-read from the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: Uuid,               // user ID
    pub name: Option<String>,
    pub email: String,
    pub picture: Option<String>, // profile image URL
    pub iat: usize,              // issued at (unix timestamp)
    pub exp: usize,              // expires at (unix timestamp)
    pub iss: String,
    pub aud: String,
}
