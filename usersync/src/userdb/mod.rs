mod errors;
mod types;
mod user;

pub use errors::UserError;
pub use types::{DeleteOutcome, User};
pub use user::UserStore;

pub async fn init() -> Result<(), UserError> {
    UserStore::init().await
}
