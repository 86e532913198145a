use sea_orm::sea_query::{Expr, ExprTrait, Func, LikeExpr};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, Select,
};
use uuid::Uuid;

use super::{DaoBase, DaoLayerError, DaoResult, PaginatedResponse};
use crate::db::entities::car;
use crate::db::entities::prelude::Car;

const LIKE_ESCAPE: char = '\\';

#[derive(Clone)]
pub struct CarDao {
    db: DatabaseConnection,
}

impl DaoBase for CarDao {
    type Entity = Car;

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarFields {
    pub brand: String,
    pub car_model: String,
    pub motor: String,
}

/// Substring alternatives per field. Alternatives within a field are OR-ed;
/// fields, and the owner scope, are AND-ed. An empty list means no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CarFilter {
    pub owner: Option<Uuid>,
    pub brand: Vec<String>,
    pub motor: Vec<String>,
}

impl CarFilter {
    /// `None` when nothing constrains the listing.
    pub fn condition(&self) -> Option<Condition> {
        let clauses: Vec<Condition> = [
            self.owner
                .map(|owner| Condition::all().add(car::Column::UserId.eq(owner))),
            any_contains(car::Column::Brand, &self.brand),
            any_contains(car::Column::Motor, &self.motor),
        ]
        .into_iter()
        .flatten()
        .collect();

        if clauses.is_empty() {
            return None;
        }
        Some(clauses.into_iter().fold(Condition::all(), Condition::add))
    }

    pub fn apply(&self, query: Select<Car>) -> Select<Car> {
        match self.condition() {
            Some(condition) => query.filter(condition),
            None => query,
        }
    }
}

fn any_contains(column: car::Column, alternatives: &[String]) -> Option<Condition> {
    if alternatives.is_empty() {
        return None;
    }
    let condition = alternatives.iter().fold(Condition::any(), |any, alternative| {
        any.add(
            Expr::expr(Func::lower(Expr::col(column)))
                .like(LikeExpr::new(contains_pattern(alternative)).escape(LIKE_ESCAPE)),
        )
    });
    Some(condition)
}

fn contains_pattern(alternative: &str) -> String {
    let mut pattern = String::with_capacity(alternative.len() + 2);
    pattern.push('%');
    for c in alternative.to_lowercase().chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

impl CarDao {
    pub async fn create_car(&self, owner: &Uuid, fields: CarFields) -> DaoResult<car::Model> {
        let model = car::ActiveModel {
            user_id: Set(*owner),
            brand: Set(fields.brand),
            car_model: Set(fields.car_model),
            motor: Set(fields.motor),
            ..Default::default()
        };
        self.create(model).await
    }

    pub async fn list_cars(
        &self,
        filter: &CarFilter,
        page: u64,
        page_size: u64,
    ) -> DaoResult<PaginatedResponse<car::Model>> {
        let filter = filter.clone();
        self.find(page, page_size, move |query| filter.apply(query))
            .await
    }

    /// `owner = None` looks the car up across all users.
    pub async fn find_car(&self, id: &Uuid, owner: Option<&Uuid>) -> DaoResult<Option<car::Model>> {
        let mut query = Car::find_by_id(*id);
        if let Some(owner) = owner {
            query = query.filter(car::Column::UserId.eq(*owner));
        }
        query.one(&self.db).await.map_err(DaoLayerError::Db)
    }

    pub async fn update_car(
        &self,
        id: &Uuid,
        owner: &Uuid,
        fields: CarFields,
    ) -> DaoResult<Option<car::Model>> {
        let Some(_) = self.find_car(id, Some(owner)).await? else {
            return Ok(None);
        };
        let model = self
            .update(*id, move |active| {
                active.brand = Set(fields.brand);
                active.car_model = Set(fields.car_model);
                active.motor = Set(fields.motor);
            })
            .await?;
        Ok(Some(model))
    }

    pub async fn delete_car(&self, id: &Uuid, owner: Option<&Uuid>) -> DaoResult<bool> {
        let Some(_) = self.find_car(id, owner).await? else {
            return Ok(false);
        };
        self.delete(*id).await?;
        Ok(true)
    }
}
