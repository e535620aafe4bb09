use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use crate::handler::data_handler::{
    guest_records_handler, public_statistics_handler, record_handler, statistics_handler,
    toll_record_images_handler, toll_records_handler,
};
use crate::middlewares::auth_middleware::{require_auth, AuthState};
use crate::service::data_service::DataService;

pub fn data_router(service: Arc<DataService>, auth_state: Arc<AuthState>) -> Router {
    let public = Router::new()
        .route("/api/data/public-statistics", get(public_statistics_handler))
        .route("/api/data/guest-records", get(guest_records_handler))
        .route("/api/data/record/{id}", get(record_handler));

    let authed = Router::new()
        .route("/api/data/statistics", get(statistics_handler))
        .route("/api/data/toll-records", get(toll_records_handler))
        .route(
            "/api/data/toll-record-images/{id}",
            get(toll_record_images_handler),
        )
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth));

    public.merge(authed).with_state(service)
}
