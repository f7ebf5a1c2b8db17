use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub text: String,
    pub item_id: i64,
    pub author_id: i64,
    pub created: NaiveDateTime,
}

/// Comment body as submitted by the author.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CommentDraft {
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub text: String,
    pub item_id: i64,
    pub author_id: i64,
    pub created: NaiveDateTime,
}

/// A comment as shown next to an item: author resolved to a display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentView {
    pub id: i64,
    pub text: String,
    pub author_name: String,
    pub created: NaiveDateTime,
}
