use super::OrderService;
use crate::error::AppError;
use crate::model::{NewUser, Order, Page, User, UserPatch};
use crate::store::Store;

pub struct UserService;

impl UserService {
    pub async fn list(store: &dyn Store, page: Page) -> Result<Vec<User>, AppError> {
        store.list_users(page).await
    }

    pub async fn get(store: &dyn Store, id: i64) -> Result<User, AppError> {
        store
            .get_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {}", id)))
    }

    pub async fn create(store: &dyn Store, input: &NewUser) -> Result<User, AppError> {
        Self::ensure_email_free(store, &input.email, None).await?;
        let user = store.insert_user(input).await?;
        tracing::info!(user_id = user.id, "user created");
        Ok(user)
    }

    /// Partial update; fields absent from the patch keep their value.
    pub async fn update(store: &dyn Store, id: i64, patch: &UserPatch) -> Result<User, AppError> {
        Self::get(store, id).await?;
        if let Some(email) = &patch.email {
            Self::ensure_email_free(store, email, Some(id)).await?;
        }
        store
            .update_user(id, patch)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {}", id)))
    }

    /// Deletes the user together with their orders.
    pub async fn delete(store: &dyn Store, id: i64) -> Result<(), AppError> {
        if !store.delete_user(id).await? {
            return Err(AppError::NotFound(format!("user {}", id)));
        }
        tracing::info!(user_id = id, "user deleted");
        Ok(())
    }

    pub async fn orders(store: &dyn Store, id: i64) -> Result<Vec<Order>, AppError> {
        Self::get(store, id).await?;
        let records = store.orders_for_user(id).await?;
        OrderService::with_products(store, records).await
    }

    async fn ensure_email_free(store: &dyn Store, email: &str, owner: Option<i64>) -> Result<(), AppError> {
        match store.find_user_by_email(email).await? {
            Some(existing) if Some(existing.id) != owner => {
                Err(AppError::Conflict(format!("email '{}' already in use", email)))
            }
            _ => Ok(()),
        }
    }
}
