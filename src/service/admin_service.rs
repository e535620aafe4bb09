//! Admin user management and data oversight.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::info;

use crate::dto::admin_dto::AdminStatistics;
use crate::model::guest_data::GuestData;
use crate::model::toll_data::TollData;
use crate::model::user::{User, UserRole};
use crate::repository::guest_data_repo::GuestDataRepository;
use crate::repository::toll_data_repo::{TollDataRepository, TollRecordFilter};
use crate::repository::user_repo::UserRepository;
use crate::util::error::ServiceError;

pub struct AdminService {
    user_repo: Arc<dyn UserRepository>,
    toll_repo: Arc<dyn TollDataRepository>,
    guest_repo: Arc<dyn GuestDataRepository>,
}

impl AdminService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        toll_repo: Arc<dyn TollDataRepository>,
        guest_repo: Arc<dyn GuestDataRepository>,
    ) -> Self {
        AdminService {
            user_repo,
            toll_repo,
            guest_repo,
        }
    }

    pub async fn list_users(
        &self,
        search: Option<&str>,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<User>, u64), ServiceError> {
        Ok(self.user_repo.list(search, page, limit).await?)
    }

    /// Deletes an account. Admins cannot delete themselves or other admins.
    #[tracing::instrument(skip(self, requester), fields(admin = %requester.username, target = %id))]
    pub async fn delete_user(&self, requester: &User, id: &str) -> Result<(), ServiceError> {
        let oid = bson::oid::ObjectId::parse_str(id)
            .map_err(|_| ServiceError::NotFound("User not found".to_string()))?;
        let target = self
            .user_repo
            .find_by_id(&oid)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;

        if requester.id == target.id {
            return Err(ServiceError::InvalidInput(
                "You cannot delete your own account".to_string(),
            ));
        }
        if target.role == UserRole::Admin {
            return Err(ServiceError::InvalidInput(
                "Cannot delete admin users".to_string(),
            ));
        }

        self.user_repo.delete(oid).await?;
        info!("User deleted by admin");
        Ok(())
    }

    /// Operators plus the distinct set of plazas they cover, for dropdowns.
    pub async fn toll_operators(&self) -> Result<(Vec<User>, Vec<String>), ServiceError> {
        let operators = self.user_repo.list_toll_operators().await?;
        let mut plazas: Vec<String> = operators
            .iter()
            .filter_map(|op| op.toll_plaza.clone())
            .filter(|p| !p.is_empty())
            .collect();
        plazas.sort();
        plazas.dedup();
        Ok((operators, plazas))
    }

    pub async fn toll_data(
        &self,
        toll_plaza: Option<String>,
        search: Option<String>,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<TollData>, u64), ServiceError> {
        let filter = TollRecordFilter {
            search,
            toll_plaza,
            page,
            limit,
            ..Default::default()
        };
        Ok(self.toll_repo.search(&filter).await?)
    }

    pub async fn guest_data(
        &self,
        search: Option<&str>,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<GuestData>, u64), ServiceError> {
        Ok(self.guest_repo.list(search, page, limit).await?)
    }

    /// Operational overview: account and record totals, 30-day activity and
    /// the verdict distribution across toll records.
    #[tracing::instrument(skip(self))]
    pub async fn statistics(&self) -> Result<AdminStatistics, ServiceError> {
        let total_users = self.user_repo.count_by_role(UserRole::TollOperator).await?;
        let total_toll_data = self.toll_repo.count().await?;
        let total_guest_data = self.guest_repo.count().await?;

        let thirty_days_ago = bson::DateTime::from_chrono(Utc::now() - Duration::days(30));
        let recent_toll_data = self.toll_repo.count_since(thirty_days_ago).await?;
        let recent_guest_data = self.guest_repo.count_since(thirty_days_ago).await?;

        let status_distribution = self.toll_repo.status_counts().await?;

        Ok(AdminStatistics {
            total_users,
            total_toll_data,
            total_guest_data,
            recent_toll_data,
            recent_guest_data,
            status_distribution,
        })
    }
}
