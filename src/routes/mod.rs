pub mod auth;
pub mod profile;
pub mod posts;
pub mod listings;
pub mod mentorship;

use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::auth::middleware::require_auth;
use crate::AppState;

pub fn create_routes(app_state: AppState) -> Router<AppState> {
    let public_routes = Router::new()
        .route("/health", get(api_health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login));

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/profile", get(profile::get_profile).post(profile::update_profile))
        .route("/profile/follow", post(profile::follow))
        .route("/profile/unfollow", post(profile::unfollow))
        .route("/profile/:user_id", get(profile::get_other_profile))
        .route("/credits", get(profile::get_credits))
        .route("/posts", get(posts::get_posts).post(posts::create_post))
        .route("/posts/top", get(posts::get_top_posts))
        .route("/posts/followed", get(posts::get_followed_posts))
        .route("/posts/user/:user_id", get(posts::get_user_posts))
        .route("/posts/:post_id", get(posts::get_post).delete(posts::delete_post))
        .route(
            "/posts/:post_id/vote",
            post(posts::cast_vote).delete(posts::remove_vote),
        )
        .route("/posts/:post_id/votes", get(posts::get_votes))
        .route(
            "/posts/:post_id/comments",
            get(posts::get_comments).post(posts::add_comment),
        )
        .route(
            "/scholarships",
            get(listings::get_scholarships).post(listings::create_scholarship),
        )
        .route("/scholarships/filter", get(listings::filter_scholarships))
        .route("/scholarships/mine", get(listings::my_scholarships))
        .route(
            "/scholarships/:listing_id",
            get(listings::get_scholarship)
                .put(listings::update_scholarship)
                .delete(listings::delete_scholarship),
        )
        .route(
            "/internships",
            get(listings::get_internships).post(listings::create_internship),
        )
        .route("/internships/filter", get(listings::filter_internships))
        .route("/internships/mine", get(listings::my_internships))
        .route(
            "/internships/:listing_id",
            get(listings::get_internship)
                .put(listings::update_internship)
                .delete(listings::delete_internship),
        )
        .route("/mentors", get(mentorship::get_available_mentors))
        .route("/mentors/availability", post(mentorship::set_availability))
        .route("/mentorship/book", post(mentorship::book_session))
        .route("/mentorship/requests", get(mentorship::mentor_requests))
        .route("/mentorship/sessions", get(mentorship::mentee_sessions))
        .route("/mentorship/:session_id/review", post(mentorship::review_session))
        .route(
            "/mentorship/:session_id/complete",
            post(mentorship::complete_session),
        )
        .route_layer(middleware::from_fn_with_state(app_state, require_auth));

    Router::new().nest("/api/v1", public_routes.merge(protected_routes))
}

async fn api_health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "finlit_marketplace",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
