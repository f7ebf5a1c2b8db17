use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::Item;

/// A user asking for something nobody has listed yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRequest {
    pub id: i64,
    pub description: String,
    pub requester_id: i64,
    pub created: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RequestDraft {
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct NewItemRequest {
    pub description: String,
    pub requester_id: i64,
    pub created: NaiveDateTime,
}

/// A request together with the items other users listed in answer to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRequestView {
    pub request: ItemRequest,
    pub items: Vec<Item>,
}
