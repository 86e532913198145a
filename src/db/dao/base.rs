use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, FromQueryResult, IntoActiveModel,
    PaginatorTrait, PrimaryKeyTrait, QueryOrder, QuerySelect, Select,
};
use serde::Serialize;
use uuid::Uuid;

use super::base_traits::{
    HasCreatedAtColumn, HasIdActiveModel, HasIdColumn, TimestampedActiveModel,
};
use super::error::{DaoLayerError, DaoResult};

/// One page of a listing. `page` is the page actually served, which may be
/// lower than the one requested when the request ran past the end.
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
    pub pages: u64,
}

impl<T> PaginatedResponse<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResponse<U> {
        PaginatedResponse {
            data: self.data.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total: self.total,
            pages: self.pages,
        }
    }
}

/// Number of pages for `total` rows, never less than one.
pub fn page_count(total: u64, page_size: u64) -> u64 {
    total.div_ceil(page_size).max(1)
}

#[async_trait::async_trait]
pub trait DaoBase: Clone + Send + Sync + Sized
where
    <Self::Entity as EntityTrait>::Model: FromQueryResult
        + IntoActiveModel<<Self::Entity as EntityTrait>::ActiveModel>
        + Send
        + Sync
        + 'static,
    <Self::Entity as EntityTrait>::ActiveModel:
        ActiveModelTrait<Entity = Self::Entity> + HasIdActiveModel + TimestampedActiveModel + Send,
    <<Self::Entity as EntityTrait>::PrimaryKey as PrimaryKeyTrait>::ValueType:
        From<Uuid> + Send + Sync,
    Self::Entity: HasCreatedAtColumn + HasIdColumn,
{
    type Entity: EntityTrait + Send + Sync;
    const MAX_PAGE_SIZE: u64 = 100;

    fn new(db: &DatabaseConnection) -> Self;

    fn db(&self) -> &DatabaseConnection;

    async fn create(
        &self,
        data: impl IntoActiveModel<<Self::Entity as EntityTrait>::ActiveModel> + Send,
    ) -> DaoResult<<Self::Entity as EntityTrait>::Model> {
        let now = Utc::now().fixed_offset();
        let mut active = data.into_active_model();
        // v7 ids sort by creation time, which keeps listings stable on ties.
        active.set_id(Uuid::now_v7());
        active.set_created_at(now);
        active.set_updated_at(now);
        active.insert(self.db()).await.map_err(DaoLayerError::Db)
    }

    async fn find_by_id(&self, id: Uuid) -> DaoResult<<Self::Entity as EntityTrait>::Model> {
        let model = Self::Entity::find_by_id(id)
            .one(self.db())
            .await
            .map_err(DaoLayerError::Db)?;

        model.ok_or(DaoLayerError::NotFound {
            entity: std::any::type_name::<Self::Entity>(),
            id,
        })
    }

    /// Newest-first page of the rows `apply` selects. Out-of-range pages are
    /// clamped to the last page instead of failing.
    async fn find(
        &self,
        page: u64,
        page_size: u64,
        apply: impl FnOnce(Select<Self::Entity>) -> Select<Self::Entity> + Send,
    ) -> DaoResult<PaginatedResponse<<Self::Entity as EntityTrait>::Model>> {
        if page_size == 0 || page_size > Self::MAX_PAGE_SIZE {
            return Err(DaoLayerError::InvalidPagination { page, page_size });
        }

        let query = apply(Self::Entity::find());
        let total = query
            .clone()
            .count(self.db())
            .await
            .map_err(DaoLayerError::Db)?;
        let pages = page_count(total, page_size);
        let page = page.clamp(1, pages);

        let data = query
            .order_by_desc(Self::Entity::created_at_column())
            .order_by_desc(Self::Entity::id_column())
            .limit(page_size)
            .offset((page - 1).saturating_mul(page_size))
            .all(self.db())
            .await
            .map_err(DaoLayerError::Db)?;

        Ok(PaginatedResponse {
            data,
            page,
            page_size,
            total,
            pages,
        })
    }

    async fn update<F>(&self, id: Uuid, apply: F) -> DaoResult<<Self::Entity as EntityTrait>::Model>
    where
        F: for<'a> FnOnce(&'a mut <Self::Entity as EntityTrait>::ActiveModel) + Send,
    {
        let model = self.find_by_id(id).await?;

        let mut active = model.into_active_model();
        apply(&mut active);
        active.set_updated_at(Utc::now().fixed_offset());

        active.update(self.db()).await.map_err(DaoLayerError::Db)
    }

    async fn delete(&self, id: Uuid) -> DaoResult<Uuid> {
        let result = Self::Entity::delete_by_id(id)
            .exec(self.db())
            .await
            .map_err(DaoLayerError::Db)?;

        if result.rows_affected == 0 {
            return Err(DaoLayerError::NotFound {
                entity: std::any::type_name::<Self::Entity>(),
                id,
            });
        }

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::{PaginatedResponse, page_count};

    #[test]
    fn page_count_is_at_least_one() {
        assert_eq!(page_count(0, 9), 1);
        assert_eq!(page_count(9, 9), 1);
        assert_eq!(page_count(12, 9), 2);
        assert_eq!(page_count(19, 9), 3);
    }

    #[test]
    fn map_keeps_paging_metadata() {
        let page = PaginatedResponse {
            data: vec![1, 2, 3],
            page: 2,
            page_size: 3,
            total: 6,
            pages: 2,
        };

        let mapped = page.map(|n| n * 10);

        assert_eq!(mapped.data, vec![10, 20, 30]);
        assert_eq!((mapped.page, mapped.pages, mapped.total), (2, 2, 6));
    }
}
