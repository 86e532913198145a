use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Serialize;
use uuid::Uuid;

use super::car_filter::{CarListQuery, parse_alternatives, parse_page, parse_page_size};
use super::forms::{CAR_FIELDS, CarForm, trimmed};
use crate::{
    config::CarsConfig,
    db::dao::{CarDao, CarFields, CarFilter, PaginatedResponse},
    db::entities::car,
    error::AppError,
    validation::validate_fields,
};

pub const OWNED_CAR_NOT_FOUND: &str =
    "Car note with the given car id and user id does not exist";
pub const CAR_NOT_FOUND: &str = "Car note with the given car id does not exist";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CarRecord {
    pub id: Uuid,
    pub user: Uuid,
    pub brand: String,
    pub model: String,
    pub motor: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTimeWithTimeZone,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTimeWithTimeZone,
}

impl From<car::Model> for CarRecord {
    fn from(model: car::Model) -> Self {
        Self {
            id: model.id,
            user: model.user_id,
            brand: model.brand,
            model: model.car_model,
            motor: model.motor,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CarListResponse {
    pub count: u64,
    pub pages: u64,
    pub page: u64,
    pub page_size: u64,
    pub data: Vec<CarRecord>,
}

impl From<PaginatedResponse<car::Model>> for CarListResponse {
    fn from(page: PaginatedResponse<car::Model>) -> Self {
        let page = page.map(CarRecord::from);
        Self {
            count: page.total,
            pages: page.pages,
            page: page.page,
            page_size: page.page_size,
            data: page.data,
        }
    }
}

/// Who a car operation is evaluated for. Owners only ever see their own rows.
#[derive(Debug, Clone, Copy)]
pub enum CarScope {
    Owner(Uuid),
    All,
}

impl CarScope {
    fn owner(&self) -> Option<Uuid> {
        match self {
            CarScope::Owner(owner) => Some(*owner),
            CarScope::All => None,
        }
    }

    fn not_found(&self) -> AppError {
        match self {
            CarScope::Owner(_) => AppError::not_found(OWNED_CAR_NOT_FOUND),
            CarScope::All => AppError::not_found(CAR_NOT_FOUND),
        }
    }

    /// Path ids that are not uuids can't name any row.
    fn parse_id(&self, raw: &str) -> Result<Uuid, AppError> {
        Uuid::parse_str(raw.trim()).map_err(|_| self.not_found())
    }
}

#[derive(Clone)]
pub struct CarService {
    car_dao: CarDao,
    page_size: u64,
    max_page_size: u64,
}

impl CarService {
    pub fn new(car_dao: CarDao, cfg: &CarsConfig) -> Self {
        Self {
            car_dao,
            page_size: cfg.page_size,
            max_page_size: cfg.max_page_size,
        }
    }

    pub async fn list(
        &self,
        scope: CarScope,
        query: &CarListQuery,
    ) -> Result<CarListResponse, AppError> {
        let filter = CarFilter {
            owner: scope.owner(),
            brand: parse_alternatives(query.brand.as_deref()),
            motor: parse_alternatives(query.motor.as_deref()),
        };
        let page = parse_page(query.page.as_deref());
        let page_size =
            parse_page_size(query.page_size.as_deref(), self.page_size, self.max_page_size);

        let response = self.car_dao.list_cars(&filter, page, page_size).await?;
        Ok(response.into())
    }

    pub async fn create(&self, owner: Uuid, form: &CarForm) -> Result<CarRecord, AppError> {
        let fields = Self::validated_fields(form)?;
        let model = self.car_dao.create_car(&owner, fields).await?;
        tracing::debug!(car_id = %model.id, user_id = %owner, "car note created");
        Ok(model.into())
    }

    pub async fn get(&self, scope: CarScope, raw_id: &str) -> Result<CarRecord, AppError> {
        let id = scope.parse_id(raw_id)?;
        let owner = scope.owner();
        self.car_dao
            .find_car(&id, owner.as_ref())
            .await?
            .map(CarRecord::from)
            .ok_or_else(|| scope.not_found())
    }

    /// Owner-only: admins can read and delete other users' cars but never edit them.
    pub async fn update(&self, owner: Uuid, raw_id: &str, form: &CarForm) -> Result<(), AppError> {
        let scope = CarScope::Owner(owner);
        let id = scope.parse_id(raw_id)?;
        // A missing row wins over a malformed body.
        if self.car_dao.find_car(&id, Some(&owner)).await?.is_none() {
            return Err(scope.not_found());
        }
        let fields = Self::validated_fields(form)?;

        self.car_dao
            .update_car(&id, &owner, fields)
            .await?
            .map(|_| ())
            .ok_or_else(|| scope.not_found())
    }

    pub async fn delete(&self, scope: CarScope, raw_id: &str) -> Result<(), AppError> {
        let id = scope.parse_id(raw_id)?;
        let owner = scope.owner();
        if self.car_dao.delete_car(&id, owner.as_ref()).await? {
            Ok(())
        } else {
            Err(scope.not_found())
        }
    }

    fn validated_fields(form: &CarForm) -> Result<CarFields, AppError> {
        validate_fields(CAR_FIELDS, form).into_result()?;
        Ok(CarFields {
            brand: trimmed(&form.brand),
            car_model: trimmed(&form.model),
            motor: trimmed(&form.motor),
        })
    }
}
