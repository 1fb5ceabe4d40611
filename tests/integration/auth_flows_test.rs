//! Authentication flow properties
//!
//! Login, registration, logout, and the optimistic profile contract,
//! end to end against the mock backend.

mod common;

use pixdia_backend::mock::{MockOp, MockOutcome};
use pixdia_backend::{ProfileLevel, ProfilePatch, ProfileStatus, RecordStore};
use pixdia_session::{AccessDecision, AuthError, Gate};

use common::{platform, settled_within, wait_for, MARIA_EMAIL, MARIA_PASSWORD};

// AF-I01: wrong credentials leave state unchanged and return the localized
// message; correct credentials eventually authenticate
#[tokio::test]
async fn test_login_round_trip() {
    let tp = platform();
    tp.backend.seed_user("Maria", MARIA_EMAIL, MARIA_PASSWORD);

    tp.client.bootstrap().await;
    let before = settled_within(&tp.client, 1000).await;

    let err = tp.client.login(MARIA_EMAIL, "senha-errada").await.unwrap_err();
    assert_eq!(err.to_string(), "E-mail ou senha incorretos.");
    assert_eq!(tp.client.snapshot(), before);

    tp.client.login(MARIA_EMAIL, MARIA_PASSWORD).await.unwrap();
    let snapshot = wait_for(&tp.client, 1000, |s| s.is_authenticated()).await;

    assert_eq!(snapshot.profile.as_ref().unwrap().name, "Maria");
    assert!(!snapshot.is_admin);
    assert_eq!(Gate::SignedIn.evaluate(&snapshot), AccessDecision::Granted);
    assert_eq!(Gate::Admin.evaluate(&snapshot), AccessDecision::Denied);
}

// AF-I02: logout clears everything even when the remote call fails
#[tokio::test]
async fn test_logout_clears_state_despite_remote_failure() {
    let tp = platform();
    tp.backend.seed_user("Maria", MARIA_EMAIL, MARIA_PASSWORD);
    tp.backend.restore_session_for(MARIA_EMAIL);

    tp.client.bootstrap().await;
    let snapshot = settled_within(&tp.client, 1000).await;
    assert!(snapshot.is_authenticated());

    tp.backend
        .behavior()
        .set_outcome(MockOp::SignOut, MockOutcome::Fail);

    tp.client.logout().await;
    let snapshot = tp.client.snapshot();

    assert!(snapshot.user.is_none());
    assert!(snapshot.profile.is_none());
    assert!(!snapshot.is_admin);
    assert!(!snapshot.loading);
}

// AF-I03: logout from an already signed-out state is harmless
#[tokio::test]
async fn test_logout_is_idempotent() {
    let tp = platform();

    tp.client.bootstrap().await;
    settled_within(&tp.client, 1000).await;

    tp.client.logout().await;
    tp.client.logout().await;

    let snapshot = tp.client.snapshot();
    assert!(!snapshot.is_authenticated());
    assert!(!snapshot.loading);
}

// AF-I04: registration with confirmation pending does not authenticate
#[tokio::test]
async fn test_register_confirmation_pending() {
    let tp = platform();
    tp.backend.require_confirmation(true);

    tp.client.bootstrap().await;
    settled_within(&tp.client, 1000).await;

    tp.client
        .register("Maria", MARIA_EMAIL, MARIA_PASSWORD)
        .await
        .unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    assert!(!tp.client.snapshot().is_authenticated());
}

// AF-I05: registration with auto-confirm signs in through the event stream
// and resolves the default profile
#[tokio::test]
async fn test_register_auto_confirm_authenticates() {
    let tp = platform();

    tp.client.bootstrap().await;
    settled_within(&tp.client, 1000).await;

    tp.client
        .register("Maria", MARIA_EMAIL, MARIA_PASSWORD)
        .await
        .unwrap();

    let snapshot = wait_for(&tp.client, 1000, |s| s.is_authenticated()).await;
    let profile = snapshot.profile.unwrap();
    assert_eq!(profile.name, "Maria");
    assert_eq!(profile.level, ProfileLevel::Iniciante);
    assert_eq!(profile.progress, 0);
    assert_eq!(profile.status, ProfileStatus::Active);
}

// AF-I06: duplicate registration surfaces the provider message verbatim
#[tokio::test]
async fn test_register_duplicate_passes_provider_message() {
    let tp = platform();
    tp.backend.seed_user("Maria", MARIA_EMAIL, MARIA_PASSWORD);

    let err = tp
        .client
        .register("Maria", MARIA_EMAIL, MARIA_PASSWORD)
        .await
        .unwrap_err();

    assert_eq!(err, AuthError::Provider("User already registered".to_string()));
    assert_eq!(err.to_string(), "User already registered");
}

// AF-I07: profile updates write through and merge optimistically
#[tokio::test]
async fn test_update_profile_writes_through() {
    let tp = platform();
    let user = tp.backend.seed_user("Maria", MARIA_EMAIL, MARIA_PASSWORD);
    tp.backend.restore_session_for(MARIA_EMAIL);

    tp.client.bootstrap().await;
    settled_within(&tp.client, 1000).await;

    tp.client
        .update_profile(ProfilePatch::default().with_name("Maria Silva"))
        .await;

    // Local cache merged immediately.
    assert_eq!(tp.client.snapshot().profile.unwrap().name, "Maria Silva");

    // And the record store saw the write.
    let stored = tp.backend.fetch_profile(user.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Maria Silva");
}

// AF-I08: refresh_profile picks up administrator-side changes
#[tokio::test]
async fn test_refresh_profile_after_admin_change() {
    let tp = platform();
    let user = tp.backend.seed_user("Maria", MARIA_EMAIL, MARIA_PASSWORD);
    tp.backend.restore_session_for(MARIA_EMAIL);

    tp.client.bootstrap().await;
    settled_within(&tp.client, 1000).await;

    // An administrator promotes the member out of band.
    let mut promoted = tp.backend.fetch_profile(user.id).await.unwrap().unwrap();
    promoted.level = ProfileLevel::Avancado;
    promoted.progress = 90;
    tp.backend.set_profile(user.id, promoted.clone());

    tp.client.refresh_profile().await;
    assert_eq!(tp.client.snapshot().profile.unwrap(), promoted);
}

// AF-I09: route gates track the published snapshot across a session
#[tokio::test]
async fn test_gates_follow_session_lifecycle() {
    let tp = platform();
    let user = tp.backend.seed_user("Maria", MARIA_EMAIL, MARIA_PASSWORD);
    tp.backend.grant_admin(user.id);

    // Before bootstrap settles, guards must hold.
    assert_eq!(
        Gate::SignedIn.evaluate(&tp.client.snapshot()),
        AccessDecision::Pending
    );

    tp.client.bootstrap().await;
    let snapshot = settled_within(&tp.client, 1000).await;
    assert_eq!(Gate::SignedIn.evaluate(&snapshot), AccessDecision::Denied);

    tp.client.login(MARIA_EMAIL, MARIA_PASSWORD).await.unwrap();
    let snapshot = wait_for(&tp.client, 1000, |s| s.is_authenticated()).await;
    assert_eq!(Gate::Admin.evaluate(&snapshot), AccessDecision::Granted);

    tp.client.logout().await;
    let snapshot = tp.client.snapshot();
    assert_eq!(Gate::SignedIn.evaluate(&snapshot), AccessDecision::Denied);
}
