use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::NewMatch;

/// Request to record a "like" swipe on a stylist
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateMatchRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "stylist_id", rename = "stylistId")]
    pub stylist_id: String,
}

impl From<CreateMatchRequest> for NewMatch {
    fn from(req: CreateMatchRequest) -> Self {
        NewMatch {
            user_id: req.user_id,
            stylist_id: req.stylist_id,
        }
    }
}
