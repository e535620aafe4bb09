use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use futures::stream::StreamExt;
use mongodb::options::{FindOptions, IndexOptions};
use mongodb::IndexModel;
use tracing::{error, info};

use crate::model::user::{User, UserRole};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: User) -> RepositoryResult<User>;
    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>>;
    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<User>>;
    async fn update_last_login(&self, id: ObjectId, at: bson::DateTime) -> RepositoryResult<()>;
    async fn update_password(&self, id: ObjectId, password_hash: &str) -> RepositoryResult<()>;
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()>;
    /// Paginated listing, newest first, optionally filtered by a
    /// case-insensitive search over username, role and toll plaza.
    /// Returns the page of users plus the total match count.
    async fn list(
        &self,
        search: Option<&str>,
        page: u32,
        limit: u32,
    ) -> RepositoryResult<(Vec<User>, u64)>;
    async fn list_toll_operators(&self) -> RepositoryResult<Vec<User>>;
    async fn count_by_role(&self, role: UserRole) -> RepositoryResult<u64>;
}

pub struct MongoUserRepository {
    collection: mongodb::Collection<User>,
}

impl MongoUserRepository {
    pub async fn new(db: &mongodb::Database) -> Result<Self, mongodb::error::Error> {
        let collection = db.collection::<User>("users");
        let unique_username = IndexModel::builder()
            .keys(doc! { "username": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        collection.create_index(unique_username, None).await?;
        Ok(MongoUserRepository { collection })
    }

    fn search_filter(search: Option<&str>) -> bson::Document {
        match search {
            Some(s) if !s.is_empty() => doc! {
                "$or": [
                    { "username": { "$regex": s, "$options": "i" } },
                    { "role": { "$regex": s, "$options": "i" } },
                    { "tollPlaza": { "$regex": s, "$options": "i" } },
                ]
            },
            _ => doc! {},
        }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[tracing::instrument(skip(self, user), fields(username = %user.username))]
    async fn insert(&self, mut user: User) -> RepositoryResult<User> {
        user.id = Some(ObjectId::new());
        let now = bson::DateTime::now();
        user.created_at = Some(now);
        user.updated_at = Some(now);
        match self.collection.insert_one(user.clone(), None).await {
            Ok(_) => {
                info!("User created successfully");
                Ok(user)
            }
            Err(e) => {
                error!("Failed to insert user: {}", e);
                Err(RepositoryError::from(e))
            }
        }
    }

    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        let filter = doc! { "username": username };
        let user = self
            .collection
            .find_one(filter, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to find user: {}", e)))?;
        Ok(user)
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<User>> {
        let filter = doc! { "_id": id };
        let user = self
            .collection
            .find_one(filter, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to find user by id: {}", e)))?;
        Ok(user)
    }

    async fn update_last_login(&self, id: ObjectId, at: bson::DateTime) -> RepositoryResult<()> {
        let update = doc! { "$set": { "lastLogin": at, "updatedAt": bson::DateTime::now() } };
        self.collection
            .update_one(doc! { "_id": id }, update, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to update last login: {}", e)))?;
        Ok(())
    }

    #[tracing::instrument(skip(self, password_hash), fields(id = %id))]
    async fn update_password(&self, id: ObjectId, password_hash: &str) -> RepositoryResult<()> {
        let update = doc! {
            "$set": { "passwordHash": password_hash, "updatedAt": bson::DateTime::now() }
        };
        let result = self
            .collection
            .update_one(doc! { "_id": id }, update, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to update password: {}", e)))?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!(
                "No user found for ID: {}",
                id
            )));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to delete user: {}", e)))?;
        if result.deleted_count == 0 {
            error!("No user found to delete for ID: {}", id);
            return Err(RepositoryError::not_found(format!(
                "No user found to delete for ID: {}",
                id
            )));
        }
        info!("User deleted successfully");
        Ok(())
    }

    async fn list(
        &self,
        search: Option<&str>,
        page: u32,
        limit: u32,
    ) -> RepositoryResult<(Vec<User>, u64)> {
        let filter = Self::search_filter(search);
        let total = self
            .collection
            .count_documents(filter.clone(), None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to count users: {}", e)))?;

        let skip = (page.max(1) - 1) as u64 * limit as u64;
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .skip(skip)
            .limit(limit as i64)
            .build();
        let mut cursor = self
            .collection
            .find(filter, options)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to list users: {}", e)))?;

        let mut users = Vec::new();
        while let Some(user) = cursor.next().await {
            match user {
                Ok(u) => users.push(u),
                Err(e) => {
                    error!("Failed to deserialize user: {}", e);
                    return Err(RepositoryError::serialization(format!(
                        "Failed to deserialize user: {}",
                        e
                    )));
                }
            }
        }
        Ok((users, total))
    }

    async fn list_toll_operators(&self) -> RepositoryResult<Vec<User>> {
        let options = FindOptions::builder()
            .sort(doc! { "tollPlaza": 1 })
            .build();
        let mut cursor = self
            .collection
            .find(doc! { "role": UserRole::TollOperator.as_str() }, options)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to list operators: {}", e)))?;
        let mut operators = Vec::new();
        while let Some(user) = cursor.next().await {
            operators.push(user.map_err(|e| {
                RepositoryError::serialization(format!("Failed to deserialize user: {}", e))
            })?);
        }
        Ok(operators)
    }

    async fn count_by_role(&self, role: UserRole) -> RepositoryResult<u64> {
        let count = self
            .collection
            .count_documents(doc! { "role": role.as_str() }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to count users: {}", e)))?;
        Ok(count)
    }
}
