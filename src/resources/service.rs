use std::{sync::Arc, time::Duration};

use tracing::{debug, info};
use validator::Validate;

use super::{OwnedStore, Resource};
use crate::{
    db::with_deadline,
    error::{AppError, AppResult},
};

/// Validation plus owner-scoped access for one resource kind.
pub struct ResourceService<R: Resource> {
    store: Arc<dyn OwnedStore<R>>,
    deadline: Duration,
}

impl<R: Resource> Clone for ResourceService<R> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            deadline: self.deadline,
        }
    }
}

impl<R: Resource> ResourceService<R> {
    pub fn new(store: Arc<dyn OwnedStore<R>>, deadline: Duration) -> Self {
        Self { store, deadline }
    }

    pub async fn create(&self, owner: i64, input: R::Create) -> AppResult<i64> {
        input.validate()?;
        let id = with_deadline(self.deadline, self.store.create(owner, &input)).await?;
        info!(resource = R::NOUN, id, owner, "created");
        Ok(id)
    }

    pub async fn list(&self, owner: i64) -> AppResult<Vec<R>> {
        with_deadline(self.deadline, self.store.list(owner, R::LIST_LIMIT)).await
    }

    pub async fn get(&self, owner: i64, id: i64) -> AppResult<R> {
        with_deadline(self.deadline, self.store.get(owner, id))
            .await?
            .ok_or_else(|| self.not_found())
    }

    /// Empty patches are rejected before the store is consulted, so the
    /// answer is 400 whether or not the row exists.
    pub async fn update(&self, owner: i64, id: i64, patch: R::Patch) -> AppResult<()> {
        patch.validate()?;
        if R::patch_values(&patch).is_empty() {
            return Err(AppError::validation("no fields to update"));
        }
        let found = with_deadline(self.deadline, self.store.update(owner, id, &patch)).await?;
        if !found {
            debug!(resource = R::NOUN, id, owner, "update matched no row");
            return Err(self.not_found());
        }
        Ok(())
    }

    pub async fn delete(&self, owner: i64, id: i64) -> AppResult<()> {
        let found = with_deadline(self.deadline, self.store.delete(owner, id)).await?;
        if !found {
            return Err(self.not_found());
        }
        info!(resource = R::NOUN, id, owner, "deleted");
        Ok(())
    }

    fn not_found(&self) -> AppError {
        AppError::not_found(format!("{} not found", R::NOUN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::products::{
        dto::{CreateProductRequest, UpdateProductRequest},
        repo_types::Product,
    };
    use crate::places::{dto::PlaceInput, repo_types::Place};
    use crate::resources::MemoryOwnedStore;

    fn service() -> ResourceService<Product> {
        ResourceService::new(
            Arc::new(MemoryOwnedStore::<Product>::default()),
            Duration::from_secs(1),
        )
    }

    fn widget(price: i64) -> CreateProductRequest {
        CreateProductRequest {
            name: "Widget".into(),
            price,
        }
    }

    #[tokio::test]
    async fn rows_are_invisible_to_other_owners() {
        let svc = service();
        let id = svc.create(1, widget(100)).await.unwrap();

        assert_eq!(svc.get(1, id).await.unwrap().price, 100);
        let err = svc.get(2, id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref m) if m == "product not found"));
        assert!(svc.list(2).await.unwrap().is_empty());

        let patch = UpdateProductRequest {
            name: None,
            price: Some(5),
        };
        assert!(matches!(
            svc.update(2, id, patch).await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(matches!(svc.delete(2, id).await.unwrap_err(), AppError::NotFound(_)));

        // still intact for the owner
        assert_eq!(svc.get(1, id).await.unwrap().price, 100);
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let svc = service();
        let a = svc.create(1, widget(1)).await.unwrap();
        let b = svc.create(1, widget(2)).await.unwrap();
        let ids: Vec<i64> = svc.list(1).await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![b, a]);
    }

    #[tokio::test]
    async fn product_list_stops_at_fifty() {
        let svc = service();
        let mut last = 0;
        for price in 0..51 {
            last = svc.create(1, widget(price)).await.unwrap();
        }
        let items = svc.list(1).await.unwrap();
        assert_eq!(items.len(), 50);
        assert_eq!(items[0].id, last);
        assert!(items.windows(2).all(|w| w[0].id > w[1].id));
    }

    #[tokio::test]
    async fn place_list_stops_at_one_hundred() {
        let svc = ResourceService::<Place>::new(
            Arc::new(MemoryOwnedStore::<Place>::default()),
            Duration::from_secs(1),
        );
        let mut first = 0;
        let mut last = 0;
        for i in 0..101 {
            let id = svc.create(1, PlaceInput::default()).await.unwrap();
            if i == 0 {
                first = id;
            }
            last = id;
        }
        let items = svc.list(1).await.unwrap();
        assert_eq!(items.len(), 100);
        assert_eq!(items[0].id, last);
        assert!(items.iter().all(|p| p.id != first));
    }

    #[tokio::test]
    async fn empty_patch_is_rejected_even_for_missing_rows() {
        let svc = service();
        let patch = UpdateProductRequest {
            name: None,
            price: None,
        };
        let err = svc.update(1, 999, patch).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "no fields to update"));
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_the_store() {
        let svc = service();
        let err = svc.create(1, widget(-1)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(svc.list(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let svc = service();
        let id = svc.create(1, widget(10)).await.unwrap();
        svc.delete(1, id).await.unwrap();
        assert!(matches!(svc.get(1, id).await.unwrap_err(), AppError::NotFound(_)));
        assert!(matches!(svc.delete(1, id).await.unwrap_err(), AppError::NotFound(_)));
    }
}
