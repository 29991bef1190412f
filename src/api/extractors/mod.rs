//! Custom request extractors.

mod current_user;
mod validated_json;

pub use current_user::AdminUser;
pub use validated_json::ValidatedJson;
