use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A tag attached to images through the `image_tags` join table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Tag {
    pub id: i32,
    pub name: String,
}
