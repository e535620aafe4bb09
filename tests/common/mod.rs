//! Shared test fixtures: in-memory repositories, a scriptable classifier and
//! router builders mirroring the production wiring.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use bson::oid::ObjectId;

use toh_backend::config::JwtConfig;
use toh_backend::middlewares::auth_middleware::AuthState;
use toh_backend::model::analysis::ImageAnalysis;
use toh_backend::model::feedback::{Feedback, FeedbackPriority, FeedbackStatus};
use toh_backend::model::guest_data::GuestData;
use toh_backend::model::toll_data::TollData;
use toh_backend::model::user::{User, UserRole};
use toh_backend::repository::feedback_repo::{FeedbackFilter, FeedbackRepository};
use toh_backend::repository::guest_data_repo::{GuestDataRepository, GuestRecordFilter};
use toh_backend::repository::repository_error::{RepositoryError, RepositoryResult};
use toh_backend::repository::toll_data_repo::{TollDataRepository, TollRecordFilter};
use toh_backend::repository::user_repo::UserRepository;
use toh_backend::repository::{DailyTrendEntry, StatusCounts};
use toh_backend::router::admin_router::admin_router;
use toh_backend::router::auth_router::auth_router;
use toh_backend::router::data_router::data_router;
use toh_backend::router::feedback_router::feedback_router;
use toh_backend::router::upload_router::upload_router;
use toh_backend::service::admin_service::AdminService;
use toh_backend::service::auth_service::AuthService;
use toh_backend::service::data_service::DataService;
use toh_backend::service::feedback_service::FeedbackService;
use toh_backend::service::upload_service::UploadService;
use toh_backend::util::classifier::{ClassifierError, TireClassifier};
use toh_backend::util::jwt::{JwtTokenUtils, JwtTokenUtilsImpl};
use toh_backend::util::password::{PasswordUtils, PasswordUtilsImpl};

#[derive(Default)]
pub struct InMemoryUserRepo {
    pub users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepo {
    async fn insert(&self, mut user: User) -> RepositoryResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.username == user.username) {
            return Err(RepositoryError::already_exists("Username already exists"));
        }
        user.id = Some(ObjectId::new());
        let now = bson::DateTime::now();
        user.created_at = Some(now);
        user.updated_at = Some(now);
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == Some(*id))
            .cloned())
    }

    async fn update_last_login(&self, id: ObjectId, at: bson::DateTime) -> RepositoryResult<()> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == Some(id)) {
            user.last_login = Some(at);
        }
        Ok(())
    }

    async fn update_password(&self, id: ObjectId, password_hash: &str) -> RepositoryResult<()> {
        let mut users = self.users.lock().unwrap();
        match users.iter_mut().find(|u| u.id == Some(id)) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                Ok(())
            }
            None => Err(RepositoryError::not_found("No user found")),
        }
    }

    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != Some(id));
        if users.len() == before {
            return Err(RepositoryError::not_found("No user found to delete"));
        }
        Ok(())
    }

    async fn list(
        &self,
        search: Option<&str>,
        page: u32,
        limit: u32,
    ) -> RepositoryResult<(Vec<User>, u64)> {
        let users = self.users.lock().unwrap();
        let needle = search.unwrap_or("").to_lowercase();
        let matching: Vec<User> = users
            .iter()
            .filter(|u| {
                needle.is_empty()
                    || u.username.to_lowercase().contains(&needle)
                    || u.role.as_str().contains(&needle)
                    || u.toll_plaza
                        .as_deref()
                        .map(|p| p.to_lowercase().contains(&needle))
                        .unwrap_or(false)
            })
            .cloned()
            .collect();
        let total = matching.len() as u64;
        let skip = ((page.max(1) - 1) * limit) as usize;
        let paged = matching
            .into_iter()
            .skip(skip)
            .take(limit as usize)
            .collect();
        Ok((paged, total))
    }

    async fn list_toll_operators(&self) -> RepositoryResult<Vec<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.role == UserRole::TollOperator)
            .cloned()
            .collect())
    }

    async fn count_by_role(&self, role: UserRole) -> RepositoryResult<u64> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.role == role)
            .count() as u64)
    }
}

fn status_counts_of(statuses: impl Iterator<Item = &'static str>) -> StatusCounts {
    let mut groups = HashMap::new();
    for status in statuses {
        *groups.entry(status.to_string()).or_insert(0u64) += 1;
    }
    StatusCounts::from_grouped(&groups)
}

#[derive(Default)]
pub struct InMemoryTollRepo {
    pub records: Mutex<Vec<TollData>>,
}

#[async_trait]
impl TollDataRepository for InMemoryTollRepo {
    async fn insert(&self, mut record: TollData) -> RepositoryResult<TollData> {
        record.id = Some(ObjectId::new());
        let now = bson::DateTime::now();
        record.created_at = Some(now);
        record.updated_at = Some(now);
        self.records.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<TollData>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == Some(*id))
            .cloned())
    }

    async fn search(&self, filter: &TollRecordFilter) -> RepositoryResult<(Vec<TollData>, u64)> {
        let records = self.records.lock().unwrap();
        let needle = filter
            .search
            .as_deref()
            .unwrap_or("")
            .to_lowercase();
        let mut matching: Vec<TollData> = records
            .iter()
            .filter(|r| {
                (needle.is_empty()
                    || r.vehicle_number.to_lowercase().contains(&needle)
                    || r.user_mobile_number.contains(&needle))
                    && filter
                        .status
                        .as_deref()
                        .map(|s| s.is_empty() || r.overall_status.as_str() == s)
                        .unwrap_or(true)
                    && filter
                        .toll_plaza
                        .as_deref()
                        .map(|p| p.is_empty() || r.toll_plaza == p)
                        .unwrap_or(true)
                    && filter
                        .from
                        .map(|from| r.created_at.map(|c| c >= from).unwrap_or(false))
                        .unwrap_or(true)
                    && filter
                        .to
                        .map(|to| r.created_at.map(|c| c <= to).unwrap_or(false))
                        .unwrap_or(true)
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = matching.len() as u64;
        let skip = ((filter.page.max(1) - 1) * filter.limit) as usize;
        let mut paged: Vec<TollData> = matching
            .into_iter()
            .skip(skip)
            .take(filter.limit as usize)
            .collect();
        if !filter.include_images {
            for record in &mut paged {
                for image in &mut record.images {
                    image.base64 = None;
                }
            }
        }
        Ok((paged, total))
    }

    async fn count(&self) -> RepositoryResult<u64> {
        Ok(self.records.lock().unwrap().len() as u64)
    }

    async fn count_since(&self, since: bson::DateTime) -> RepositoryResult<u64> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.created_at.map(|c| c >= since).unwrap_or(false))
            .count() as u64)
    }

    async fn status_counts(&self) -> RepositoryResult<StatusCounts> {
        let records = self.records.lock().unwrap();
        Ok(status_counts_of(
            records.iter().map(|r| r.overall_status.as_str()),
        ))
    }

    async fn recent_danger(
        &self,
        since: bson::DateTime,
        limit: i64,
    ) -> RepositoryResult<Vec<TollData>> {
        let records = self.records.lock().unwrap();
        let mut matching: Vec<TollData> = records
            .iter()
            .filter(|r| {
                r.overall_status.as_str() == "danger"
                    && r.created_at.map(|c| c >= since).unwrap_or(false)
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matching.truncate(limit as usize);
        Ok(matching)
    }

    async fn daily_trend(&self, since: bson::DateTime) -> RepositoryResult<Vec<DailyTrendEntry>> {
        let records = self.records.lock().unwrap();
        let mut buckets: HashMap<String, DailyTrendEntry> = HashMap::new();
        for record in records.iter() {
            let created = match record.created_at {
                Some(c) if c >= since => c,
                _ => continue,
            };
            let date = created.to_chrono().format("%Y-%m-%d").to_string();
            let entry = buckets.entry(date.clone()).or_insert(DailyTrendEntry {
                date,
                count: 0,
                safe: 0,
                warning: 0,
                danger: 0,
            });
            entry.count += 1;
            match record.overall_status.as_str() {
                "safe" => entry.safe += 1,
                "warning" => entry.warning += 1,
                "danger" => entry.danger += 1,
                _ => {}
            }
        }
        let mut trend: Vec<DailyTrendEntry> = buckets.into_values().collect();
        trend.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(trend)
    }
}

#[derive(Default)]
pub struct InMemoryGuestRepo {
    pub records: Mutex<Vec<GuestData>>,
}

#[async_trait]
impl GuestDataRepository for InMemoryGuestRepo {
    async fn insert(&self, mut record: GuestData) -> RepositoryResult<GuestData> {
        record.id = Some(ObjectId::new());
        let now = bson::DateTime::now();
        record.created_at = Some(now);
        record.updated_at = Some(now);
        self.records.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<GuestData>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == Some(*id))
            .cloned())
    }

    async fn find_by_vehicle(
        &self,
        filter: &GuestRecordFilter,
    ) -> RepositoryResult<(Vec<GuestData>, u64)> {
        let records = self.records.lock().unwrap();
        let mut matching: Vec<GuestData> = records
            .iter()
            .filter(|r| {
                r.vehicle_number == filter.vehicle_number
                    && r.user_mobile_number == filter.mobile_number
                    && filter
                        .from
                        .map(|from| r.created_at.map(|c| c >= from).unwrap_or(false))
                        .unwrap_or(true)
                    && filter
                        .to
                        .map(|to| r.created_at.map(|c| c <= to).unwrap_or(false))
                        .unwrap_or(true)
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = matching.len() as u64;
        let skip = ((filter.page.max(1) - 1) * filter.limit) as usize;
        let mut paged: Vec<GuestData> = matching
            .into_iter()
            .skip(skip)
            .take(filter.limit as usize)
            .collect();
        if !filter.include_images {
            for record in &mut paged {
                for image in &mut record.images {
                    image.base64 = None;
                }
            }
        }
        Ok((paged, total))
    }

    async fn list(
        &self,
        search: Option<&str>,
        page: u32,
        limit: u32,
    ) -> RepositoryResult<(Vec<GuestData>, u64)> {
        let records = self.records.lock().unwrap();
        let needle = search.unwrap_or("").to_lowercase();
        let mut matching: Vec<GuestData> = records
            .iter()
            .filter(|r| {
                needle.is_empty()
                    || r.vehicle_number.to_lowercase().contains(&needle)
                    || r.user_mobile_number.contains(&needle)
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = matching.len() as u64;
        let skip = ((page.max(1) - 1) * limit) as usize;
        let mut paged: Vec<GuestData> = matching
            .into_iter()
            .skip(skip)
            .take(limit as usize)
            .collect();
        for record in &mut paged {
            for image in &mut record.images {
                image.base64 = None;
            }
        }
        Ok((paged, total))
    }

    async fn count(&self) -> RepositoryResult<u64> {
        Ok(self.records.lock().unwrap().len() as u64)
    }

    async fn count_since(&self, since: bson::DateTime) -> RepositoryResult<u64> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.created_at.map(|c| c >= since).unwrap_or(false))
            .count() as u64)
    }

    async fn status_counts(&self) -> RepositoryResult<StatusCounts> {
        let records = self.records.lock().unwrap();
        Ok(status_counts_of(
            records.iter().map(|r| r.overall_status.as_str()),
        ))
    }
}

#[derive(Default)]
pub struct InMemoryFeedbackRepo {
    pub items: Mutex<Vec<Feedback>>,
}

#[async_trait]
impl FeedbackRepository for InMemoryFeedbackRepo {
    async fn insert(&self, mut feedback: Feedback) -> RepositoryResult<Feedback> {
        feedback.id = Some(ObjectId::new());
        let now = bson::DateTime::now();
        feedback.created_at = Some(now);
        feedback.updated_at = Some(now);
        self.items.lock().unwrap().push(feedback.clone());
        Ok(feedback)
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<Feedback>> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .find(|f| f.id == Some(*id))
            .cloned())
    }

    async fn update_triage(
        &self,
        id: ObjectId,
        status: Option<FeedbackStatus>,
        priority: Option<FeedbackPriority>,
    ) -> RepositoryResult<Feedback> {
        let mut items = self.items.lock().unwrap();
        let item = items
            .iter_mut()
            .find(|f| f.id == Some(id))
            .ok_or_else(|| RepositoryError::not_found("No feedback found"))?;
        if let Some(status) = status {
            item.status = status;
        }
        if let Some(priority) = priority {
            item.priority = priority;
        }
        item.updated_at = Some(bson::DateTime::now());
        Ok(item.clone())
    }

    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let mut items = self.items.lock().unwrap();
        let before = items.len();
        items.retain(|f| f.id != Some(id));
        if items.len() == before {
            return Err(RepositoryError::not_found("No feedback found to delete"));
        }
        Ok(())
    }

    async fn list(&self, filter: &FeedbackFilter) -> RepositoryResult<(Vec<Feedback>, u64)> {
        let items = self.items.lock().unwrap();
        let matching: Vec<Feedback> = items
            .iter()
            .filter(|f| {
                filter.status.map(|s| f.status == s).unwrap_or(true)
                    && filter.priority.map(|p| f.priority == p).unwrap_or(true)
                    && filter
                        .search
                        .as_deref()
                        .map(|term| {
                            // Case-insensitive match over name, email and
                            // feedback text, like the Mongo regex filter.
                            let term = term.to_lowercase();
                            f.name.to_lowercase().contains(&term)
                                || f.email.to_lowercase().contains(&term)
                                || f.feedback.to_lowercase().contains(&term)
                        })
                        .unwrap_or(true)
            })
            .cloned()
            .collect();
        let total = matching.len() as u64;
        let skip = ((filter.page.max(1) - 1) * filter.limit) as usize;
        let paged = matching
            .into_iter()
            .skip(skip)
            .take(filter.limit as usize)
            .collect();
        Ok((paged, total))
    }

    async fn status_counts(&self) -> RepositoryResult<HashMap<String, u64>> {
        let items = self.items.lock().unwrap();
        let mut groups = HashMap::new();
        for item in items.iter() {
            let key = match item.status {
                FeedbackStatus::Pending => "pending",
                FeedbackStatus::Reviewed => "reviewed",
                FeedbackStatus::Resolved => "resolved",
            };
            *groups.entry(key.to_string()).or_insert(0u64) += 1;
        }
        Ok(groups)
    }
}

/// Classifier double. Returns the scripted results, cycling if there are
/// fewer results than images, or fails outright when scripted to.
pub struct MockClassifier {
    pub results: Vec<ImageAnalysis>,
    pub fail: bool,
}

#[async_trait]
impl TireClassifier for MockClassifier {
    async fn classify(&self, images: &[Vec<u8>]) -> Result<Vec<ImageAnalysis>, ClassifierError> {
        if self.fail {
            return Err(ClassifierError::Transport("connection refused".to_string()));
        }
        Ok(images
            .iter()
            .enumerate()
            .map(|(i, _)| self.results[i % self.results.len()].clone())
            .collect())
    }
}

/// All the shared state of one test application instance.
pub struct TestApp {
    pub router: Router,
    pub user_repo: Arc<InMemoryUserRepo>,
    pub toll_repo: Arc<InMemoryTollRepo>,
    pub guest_repo: Arc<InMemoryGuestRepo>,
    pub feedback_repo: Arc<InMemoryFeedbackRepo>,
    pub jwt_utils: Arc<JwtTokenUtilsImpl>,
}

impl TestApp {
    pub fn new(classifier: MockClassifier) -> Self {
        let user_repo = Arc::new(InMemoryUserRepo::default());
        let toll_repo = Arc::new(InMemoryTollRepo::default());
        let guest_repo = Arc::new(InMemoryGuestRepo::default());
        let feedback_repo = Arc::new(InMemoryFeedbackRepo::default());
        let jwt_utils = Arc::new(JwtTokenUtilsImpl::new(JwtConfig::default()));

        let auth_service = Arc::new(AuthService::new(user_repo.clone(), jwt_utils.clone()));
        let upload_service = Arc::new(UploadService::new(
            toll_repo.clone(),
            guest_repo.clone(),
            Arc::new(classifier),
        ));
        let data_service = Arc::new(DataService::new(toll_repo.clone(), guest_repo.clone()));
        let feedback_service = Arc::new(FeedbackService::new(feedback_repo.clone()));
        let admin_service = Arc::new(AdminService::new(
            user_repo.clone(),
            toll_repo.clone(),
            guest_repo.clone(),
        ));

        let auth_state = Arc::new(AuthState {
            jwt_utils: jwt_utils.clone(),
            user_repo: user_repo.clone(),
        });

        let router = Router::new()
            .merge(auth_router(auth_service, auth_state.clone()))
            .merge(upload_router(upload_service, auth_state.clone()))
            .merge(data_router(data_service, auth_state.clone()))
            .merge(feedback_router(feedback_service, auth_state.clone()))
            .merge(admin_router(admin_service, auth_state));

        TestApp {
            router,
            user_repo,
            toll_repo,
            guest_repo,
            feedback_repo,
            jwt_utils,
        }
    }

    /// Inserts a user with the given credentials and returns it with a valid
    /// bearer token.
    pub async fn seed_user(
        &self,
        username: &str,
        password: &str,
        role: UserRole,
        toll_plaza: Option<&str>,
    ) -> (User, String) {
        let user = User {
            id: None,
            username: username.to_string(),
            password_hash: PasswordUtilsImpl::hash_password(password).unwrap(),
            role,
            toll_plaza: toll_plaza.map(str::to_string),
            is_active: true,
            last_login: None,
            created_at: None,
            updated_at: None,
        };
        let user = self.user_repo.insert(user).await.unwrap();
        let token = self
            .jwt_utils
            .generate_access_token(&user.id.unwrap().to_hex(), &user.username, user.role)
            .unwrap();
        (user, token)
    }
}

#[allow(dead_code)]
pub fn normal_classifier() -> MockClassifier {
    MockClassifier {
        results: vec![ImageAnalysis {
            prediction: toh_backend::model::analysis::Prediction::Normal,
            confidence: 0.97,
        }],
        fail: false,
    }
}

#[allow(dead_code)]
pub fn failing_classifier() -> MockClassifier {
    MockClassifier {
        results: Vec::new(),
        fail: true,
    }
}
