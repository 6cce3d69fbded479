use super::Collection;
use crate::models::User;

/// Emails are unique regardless of case.
pub async fn find_by_email(users: &Collection<User>, email: &str) -> Option<User> {
    let email = email.trim();
    users
        .find(|user| user.email.eq_ignore_ascii_case(email))
        .await
}

pub async fn exists(users: &Collection<User>, email: &str) -> bool {
    find_by_email(users, email).await.is_some()
}
