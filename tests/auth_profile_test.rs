// Registration, login and profile management against the in-memory store.

mod common;

use common::{seed_user, test_state};
use finlit_marketplace::models::user::{CreateUserRequest, UpdateProfileRequest};
use finlit_marketplace::AppError;

fn registration(username: &str) -> CreateUserRequest {
    CreateUserRequest {
        username: username.to_string(),
        email: format!("{}@example.com", username),
        password: "hunter2hunter2".to_string(),
        name: Some("Test User".to_string()),
        bio: None,
    }
}

#[tokio::test]
async fn registration_seeds_initial_credits_and_login_round_trips() {
    let (state, store) = test_state();

    let user = state
        .user_service
        .register(registration("alice"), &state.auth_service)
        .await
        .unwrap();

    assert_eq!(user.username, "alice");
    let stored = store
        .users
        .lock()
        .unwrap()
        .get(&user.user_id)
        .cloned()
        .unwrap();
    assert_eq!(stored.credits, 1000);
    // The raw password never lands in the store.
    assert_ne!(stored.password_hash, "hunter2hunter2");

    let (logged_in, token) = state
        .user_service
        .authenticate("alice@example.com", "hunter2hunter2", &state.auth_service)
        .await
        .unwrap();
    assert_eq!(logged_in.user_id, user.user_id);

    let claims = state.auth_service.verify_token(&token).unwrap();
    assert_eq!(claims.sub, user.user_id);
    assert_eq!(claims.username, "alice");
}

#[tokio::test]
async fn registration_validation_and_duplicates() {
    let (state, _store) = test_state();

    state
        .user_service
        .register(registration("alice"), &state.auth_service)
        .await
        .unwrap();

    // Same username again.
    let err = state
        .user_service
        .register(registration("alice"), &state.auth_service)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    // Same email behind a fresh username.
    let mut request = registration("alice2");
    request.email = "alice@example.com".to_string();
    let err = state
        .user_service
        .register(request, &state.auth_service)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let mut request = registration("bob");
    request.password = "short".to_string();
    let err = state
        .user_service
        .register(request, &state.auth_service)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let mut request = registration("carol");
    request.email = "not-an-email".to_string();
    let err = state
        .user_service
        .register(request, &state.auth_service)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
}

#[tokio::test]
async fn wrong_credentials_are_indistinguishable() {
    let (state, _store) = test_state();

    state
        .user_service
        .register(registration("alice"), &state.auth_service)
        .await
        .unwrap();

    let wrong_password = state
        .user_service
        .authenticate("alice@example.com", "incorrect-pass", &state.auth_service)
        .await
        .unwrap_err();
    let wrong_email = state
        .user_service
        .authenticate("nobody@example.com", "hunter2hunter2", &state.auth_service)
        .await
        .unwrap_err();

    assert_eq!(wrong_password.to_string(), wrong_email.to_string());
}

#[tokio::test]
async fn profile_updates_keep_absent_fields() {
    let (state, store) = test_state();
    let user = seed_user(&store, "alice", 1000);

    state
        .user_service
        .update_profile(
            user.user_id,
            UpdateProfileRequest {
                name: Some("Alice A.".to_string()),
                bio: Some("Saving up".to_string()),
                profile_picture: None,
                school: Some("State University".to_string()),
                company: None,
                role: None,
            },
        )
        .await
        .unwrap();

    let updated = state
        .user_service
        .update_profile(
            user.user_id,
            UpdateProfileRequest {
                name: None,
                bio: Some("Debt free".to_string()),
                profile_picture: None,
                school: None,
                company: None,
                role: None,
            },
        )
        .await
        .unwrap();

    // Only bio changed on the second update.
    assert_eq!(updated.name.as_deref(), Some("Alice A."));
    assert_eq!(updated.bio.as_deref(), Some("Debt free"));
    assert_eq!(updated.school.as_deref(), Some("State University"));
}

#[tokio::test]
async fn own_profile_reports_credits_and_followings() {
    let (state, store) = test_state();
    let alice = seed_user(&store, "alice", 1000);
    let bob = seed_user(&store, "bob", 1000);

    state
        .user_service
        .follow(alice.user_id, bob.user_id)
        .await
        .unwrap();

    let profile = state.user_service.own_profile(alice.user_id).await.unwrap();
    assert_eq!(profile.credits, 1000);
    assert_eq!(profile.followings, vec!["bob".to_string()]);

    // The public view of bob carries no credit balance field at all.
    let (public, followings) = state
        .user_service
        .public_profile(bob.user_id)
        .await
        .unwrap();
    assert_eq!(public.username, "bob");
    assert!(followings.is_empty());
}
