use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::json;
use tracing::{error, info, warn};

use crate::config::app_conf::AppConfig;
use crate::config::{AdminUserConfig, ClassifierConfig, JwtConfig, MongoConfig};
use crate::middlewares::auth_middleware::AuthState;
use crate::model::user::{User, UserRole};
use crate::repository::feedback_repo::MongoFeedbackRepository;
use crate::repository::guest_data_repo::MongoGuestDataRepository;
use crate::repository::toll_data_repo::MongoTollDataRepository;
use crate::repository::user_repo::{MongoUserRepository, UserRepository};
use crate::router::admin_router::admin_router;
use crate::router::auth_router::auth_router;
use crate::router::data_router::data_router;
use crate::router::feedback_router::feedback_router;
use crate::router::upload_router::upload_router;
use crate::service::admin_service::AdminService;
use crate::service::auth_service::AuthService;
use crate::service::data_service::DataService;
use crate::service::feedback_service::FeedbackService;
use crate::service::upload_service::UploadService;
use crate::util::classifier::HttpTireClassifier;
use crate::util::jwt::JwtTokenUtilsImpl;
use crate::util::password::{PasswordUtils, PasswordUtilsImpl};

pub struct App {
    config: AppConfig,
    router: Router,
    user_repo: Arc<dyn UserRepository>,
}

impl App {
    pub async fn new() -> Self {
        let config = AppConfig::from_env();
        let jwt_config = JwtConfig::from_env().expect("JWT config error");
        let mongo_config = MongoConfig::from_env().expect("Mongo config error");
        let classifier_config = ClassifierConfig::from_env().expect("Classifier config error");

        let db = mongo_config.connect().await.expect("MongoDB connection error");
        info!("Connected to MongoDB database {}", db.name());

        let user_repo: Arc<dyn UserRepository> = Arc::new(
            MongoUserRepository::new(&db)
                .await
                .expect("User repository error"),
        );
        let toll_repo = Arc::new(
            MongoTollDataRepository::new(&db)
                .await
                .expect("Toll data repository error"),
        );
        let guest_repo = Arc::new(
            MongoGuestDataRepository::new(&db)
                .await
                .expect("Guest data repository error"),
        );
        let feedback_repo = Arc::new(
            MongoFeedbackRepository::new(&db)
                .await
                .expect("Feedback repository error"),
        );

        let classifier =
            Arc::new(HttpTireClassifier::new(classifier_config).expect("Classifier client error"));
        let jwt_utils = Arc::new(JwtTokenUtilsImpl::new(jwt_config));

        let auth_service = Arc::new(AuthService::new(user_repo.clone(), jwt_utils.clone()));
        let upload_service = Arc::new(UploadService::new(
            toll_repo.clone(),
            guest_repo.clone(),
            classifier,
        ));
        let data_service = Arc::new(DataService::new(toll_repo.clone(), guest_repo.clone()));
        let feedback_service = Arc::new(FeedbackService::new(feedback_repo));
        let admin_service = Arc::new(AdminService::new(
            user_repo.clone(),
            toll_repo,
            guest_repo,
        ));

        let auth_state = Arc::new(AuthState {
            jwt_utils,
            user_repo: user_repo.clone(),
        });

        let router = Router::new()
            .merge(auth_router(auth_service, auth_state.clone()))
            .merge(upload_router(upload_service, auth_state.clone()))
            .merge(data_router(data_service, auth_state.clone()))
            .merge(feedback_router(feedback_service, auth_state.clone()))
            .merge(admin_router(admin_service, auth_state))
            .route(
                "/api/health",
                get(|| async {
                    Json(json!({ "status": "OK", "message": "Tire inspection API is running" }))
                }),
            );

        let app = App {
            config,
            router,
            user_repo,
        };
        app.create_first_admin_user().await;
        app
    }

    /// Creates the bootstrap admin account on first startup. Skipped when the
    /// credentials are not configured or the account already exists.
    async fn create_first_admin_user(&self) {
        let admin_conf = match AdminUserConfig::from_env() {
            Ok(c) => c,
            Err(e) => {
                warn!("Admin user config not loaded: {e}");
                return;
            }
        };

        match self.user_repo.find_by_username(&admin_conf.username).await {
            Ok(Some(_)) => {
                info!("Admin user already exists, skipping creation.");
                return;
            }
            Ok(None) => {}
            Err(e) => {
                error!("Failed to check for existing admin user: {e}");
                return;
            }
        }

        let password_hash = match PasswordUtilsImpl::hash_password(&admin_conf.password) {
            Ok(h) => h,
            Err(e) => {
                error!("Failed to hash admin password: {e}");
                return;
            }
        };
        let admin = User {
            id: None,
            username: admin_conf.username.clone(),
            password_hash,
            role: UserRole::Admin,
            toll_plaza: None,
            is_active: true,
            last_login: None,
            created_at: None,
            updated_at: None,
        };
        match self.user_repo.insert(admin).await {
            Ok(_) => info!("Bootstrap admin user created"),
            Err(e) => error!("Failed to create bootstrap admin user: {e}"),
        }
    }

    pub async fn start(self) {
        let addr = SocketAddr::new(
            self.config.host.parse().expect("Invalid host"),
            self.config.port,
        );
        info!("🚀 Server running at http://{}", addr);
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .expect("Failed to bind address");
        axum::serve(listener, self.router)
            .await
            .expect("Failed to start server");
    }
}
