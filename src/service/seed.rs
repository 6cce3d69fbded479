use chrono::Utc;
use log::info;
use uuid::Uuid;

use super::crypto;
use crate::{
    db::Store,
    errors::AppError,
    models::{Condominium, Role, User},
};

pub const DEMO_ADMIN_EMAIL: &str = "admin@condo.local";
pub const DEMO_ADMIN_PASSWORD: &str = "admin123";
pub const DEMO_RESOURCES: [&str; 3] = ["Churrasqueira", "Salão de Festas", "Piscina"];

/// Seeds one condominium and an admin, but only into an empty store.
/// Returns whether anything was written.
pub async fn seed_demo_data(store: &Store) -> Result<bool, AppError> {
    if !store.users.is_empty().await {
        return Ok(false);
    }
    let condo = store
        .condominiums
        .insert(Condominium {
            id: Uuid::new_v4(),
            name: "Residencial Jardim das Acácias".to_string(),
            address: "Rua das Palmeiras, 250".to_string(),
            resources: DEMO_RESOURCES.iter().map(|r| r.to_string()).collect(),
            syndic_id: None,
        })
        .await?;
    store
        .users
        .insert(User {
            id: Uuid::new_v4(),
            name: "Administrador".to_string(),
            email: DEMO_ADMIN_EMAIL.to_string(),
            role: Role::Admin,
            condominium_id: Some(condo.id),
            unit: None,
            password_hash: crypto::get_sha3_256_hash(DEMO_ADMIN_PASSWORD),
            created_at: Utc::now(),
        })
        .await?;
    info!("seeded demo condominium {}", condo.id);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[tokio::test]
    async fn seeds_once() {
        let store = Store::in_memory().await.unwrap();
        assert!(seed_demo_data(&store).await.unwrap());
        assert!(!seed_demo_data(&store).await.unwrap());
        assert_eq!(store.condominiums.len().await, 1);
        assert!(db::user::exists(&store.users, "ADMIN@condo.local").await);
    }
}
