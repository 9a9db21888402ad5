use crate::userdb::{User, UserError, UserStore};

use super::errors::CoordinationError;

/// Login-time upsert: find-or-create a user by email
///
/// The candidate is whatever the identity provider reported for this login.
/// If a user with the candidate's email already exists, only its `updated_at`
/// stamp is refreshed; candidate profile fields are not merged into the
/// stored row. If no user exists, one is created from the candidate with a
/// store-assigned id.
///
/// Two concurrent logins with the same new email may both pass the existence
/// check; the store's unique index arbitrates, and the loser surfaces as
/// [`CoordinationError::EmailConflict`].
pub async fn login_user(candidate: User) -> Result<User, CoordinationError> {
    // Validate before touching the store
    let Some(email) = candidate
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
    else {
        return Err(CoordinationError::EmailRequired.log());
    };

    match UserStore::find_by_email(email).await? {
        Some(existing) => {
            // Known user: refresh the last-login stamp, nothing else
            tracing::debug!("Login for existing user {}", existing.id);
            let user = UserStore::update_user(existing).await?;
            Ok(user)
        }
        None => {
            // New user: the id is forced to the sentinel regardless of what
            // the caller sent
            let new_user = User::new(
                candidate.external_user_id,
                Some(email.to_string()),
                candidate.name,
                candidate.tenant_id,
            );

            match UserStore::add_user(new_user).await {
                Ok(user) => {
                    tracing::info!("Created user {} on first login", user.id);
                    Ok(user)
                }
                Err(UserError::DuplicateEmail(_)) => {
                    // Lost the creation race between lookup and insert
                    Err(CoordinationError::EmailConflict.log())
                }
                Err(err) => Err(err.into()),
            }
        }
    }
}
