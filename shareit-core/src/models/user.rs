use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewUser {
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub name: String,
    #[validate(email)]
    pub email: String,
}

/// Partial update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UserPatch {
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
}

impl User {
    pub fn apply(&mut self, patch: UserPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
    }
}
