//! Client, session and cache behaviour against the stub backend

mod common;

use casino_desk::{
    api::client::SESSION_EXPIRED_MESSAGE, run_mutation, ApiError, BonusCategory, BonusKind, BonusType, NewBonus,
    Notice, NoticeLevel,
};
use common::TestContext;

fn new_bonus(name: &str) -> NewBonus {
    NewBonus {
        name: name.to_string(),
        geo: "PL".to_string(),
        kind: BonusKind::Deposit,
        bonus_type: BonusType::Combo,
        category: BonusCategory::Casino,
        min_deposit: Some(10.0),
        max_bonus: None,
        max_cashout: None,
        wager: Some(40.0),
        currency: Some("PLN".to_string()),
        freespins: Some(100),
        valid_days: None,
        promo_code: None,
        notes: None,
    }
}

#[tokio::test]
async fn test_bearer_token_and_request_id_sent() {
    let ctx = TestContext::new("good-token").await;

    let casinos = ctx.api.list_casinos().await.unwrap();
    assert_eq!(casinos.len(), 1);
    assert_eq!(casinos[0].name, "Lucky Star");

    let request = ctx.state.last_request();
    assert_eq!(request.path, "/api/casinos");
    assert_eq!(request.authorization.as_deref(), Some("Bearer good-token"));
    let request_id = request.request_id.expect("x-request-id header missing");
    assert!(uuid::Uuid::parse_str(&request_id).is_ok());
}

#[tokio::test]
async fn test_unauthorized_ends_session() {
    let ctx = TestContext::new("expired").await;
    let token_file = ctx.token_dir.path().join("token");
    assert!(token_file.exists());

    let result = ctx.api.get_casino(7).await;

    assert!(matches!(result, Err(ApiError::Unauthorized)));
    assert!(!ctx.api.client().session().is_authenticated());
    assert!(!token_file.exists());
    assert_eq!(ctx.notifier.notices(), vec![Notice::warning(SESSION_EXPIRED_MESSAGE)]);
}

#[tokio::test]
async fn test_unauthorized_mutation_adds_no_second_notice() {
    let ctx = TestContext::new("expired").await;

    let result = run_mutation(ctx.notifier.as_ref(), "Promo deleted", ctx.api.delete_promo(3)).await;

    assert!(matches!(result, Err(ApiError::Unauthorized)));
    assert_eq!(ctx.notifier.notices().len(), 1);
}

#[tokio::test]
async fn test_concurrent_identical_queries_share_one_request() {
    let ctx = TestContext::new("good-token").await;

    let (first, second) = tokio::join!(ctx.api.list_bonuses(7), ctx.api.list_bonuses(7));
    assert_eq!(first.unwrap(), second.unwrap());
    assert_eq!(ctx.state.hits("GET", "/api/casinos/7/bonuses"), 1);

    // served from cache afterwards
    let third = ctx.api.list_bonuses(7).await.unwrap();
    assert_eq!(third.len(), 2);
    assert_eq!(ctx.state.hits("GET", "/api/casinos/7/bonuses"), 1);
}

#[tokio::test]
async fn test_mutation_invalidates_cached_list() {
    let ctx = TestContext::new("good-token").await;

    assert_eq!(ctx.api.list_bonuses(7).await.unwrap().len(), 2);

    let created = run_mutation(ctx.notifier.as_ref(), "Bonus created", ctx.api.create_bonus(7, &new_bonus("Reload")))
        .await
        .unwrap();
    assert_eq!(created.name, "Reload");
    assert_eq!(created.casino_id, 7);

    let bonuses = ctx.api.list_bonuses(7).await.unwrap();
    assert_eq!(bonuses.len(), 3);
    assert!(bonuses.iter().any(|b| b.name == "Reload"));
    assert_eq!(ctx.state.hits("GET", "/api/casinos/7/bonuses"), 2);
    assert_eq!(ctx.notifier.notices(), vec![Notice::success("Bonus created")]);
}

#[tokio::test]
async fn test_backend_validation_errors_are_per_field_without_notice() {
    let ctx = TestContext::new("good-token").await;

    let result = run_mutation(ctx.notifier.as_ref(), "Bonus created", ctx.api.create_bonus(7, &new_bonus("Duplicate"))).await;

    match result {
        Err(ApiError::Validation { fields, .. }) => {
            assert_eq!(fields["name"], vec!["Name already exists".to_string()]);
        }
        other => panic!("expected validation error, got {:?}", other),
    }
    assert!(ctx.notifier.notices().is_empty());
}

#[tokio::test]
async fn test_client_side_validation_skips_request() {
    let ctx = TestContext::new("good-token").await;

    let result = ctx.api.create_bonus(7, &new_bonus("  ")).await;

    assert!(matches!(result, Err(ApiError::Validation { .. })));
    assert_eq!(ctx.state.hits("POST", "/api/casinos/7/bonuses"), 0);
}

#[tokio::test]
async fn test_backend_message_becomes_error_notice() {
    let ctx = TestContext::new("good-token").await;

    let result = run_mutation(ctx.notifier.as_ref(), "Promo deleted", ctx.api.delete_promo(3)).await;

    assert!(matches!(result, Err(ApiError::Http { status: 409, .. })));
    let notices = ctx.notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].message, "Promo is locked");
}

#[tokio::test]
async fn test_not_found_is_not_cached() {
    let ctx = TestContext::new("good-token").await;

    assert!(matches!(ctx.api.get_casino(99).await, Err(ApiError::Http { status: 404, .. })));
    assert!(ctx.api.get_casino(99).await.is_err());
    assert_eq!(ctx.state.hits("GET", "/api/casinos/99"), 2);
}

#[tokio::test]
async fn test_logout_clears_cache() {
    let ctx = TestContext::new("good-token").await;

    ctx.api.get_casino(7).await.unwrap();
    ctx.api.logout();
    ctx.api.login("good-token").unwrap();
    ctx.api.get_casino(7).await.unwrap();

    assert_eq!(ctx.state.hits("GET", "/api/casinos/7"), 2);
}

#[tokio::test]
async fn test_forced_logout_clears_cache() {
    let ctx = TestContext::new("good-token").await;
    ctx.api.get_casino(7).await.unwrap();

    // backend revokes the token
    ctx.api.client().session().login("expired").unwrap();
    let result = ctx.api.delete_promo(3).await;
    assert!(matches!(result, Err(ApiError::Unauthorized)));
    assert!(!ctx.api.client().session().is_authenticated());

    ctx.api.get_casino(7).await.unwrap();
    assert_eq!(ctx.state.hits("GET", "/api/casinos/7"), 2);
}
