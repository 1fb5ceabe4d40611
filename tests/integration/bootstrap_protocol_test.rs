//! Bootstrap protocol properties
//!
//! Exercises the dual-trigger startup, the last-writer-wins attempt
//! discipline, the capability timeout, forced sign-out on a corrupt
//! session, and the teardown guard.

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use pixdia_backend::mock::{MockOp, MockOutcome};
use pixdia_backend::{AuthEvent, ProfilePatch};

use common::{
    platform, platform_with_timeout, settled_within, wait_for, MARIA_EMAIL, MARIA_PASSWORD,
};

// BP-I01: both startup triggers race and settle into one consistent
// authenticated snapshot
#[tokio::test]
async fn test_dual_trigger_startup_is_consistent() {
    let tp = platform();
    let user = tp.backend.seed_user("Maria", MARIA_EMAIL, MARIA_PASSWORD);
    tp.backend.grant_admin(user.id);
    tp.backend.restore_session_for(MARIA_EMAIL);

    tp.client.bootstrap().await;
    let snapshot = settled_within(&tp.client, 1000).await;

    assert!(snapshot.is_authenticated());
    assert_eq!(snapshot.user.as_ref().unwrap().id, user.id);
    assert_eq!(snapshot.profile.as_ref().unwrap().name, "Maria");
    assert!(snapshot.is_admin);

    // The explicit check and the eager event both ran the loading routine;
    // whichever finished last owns the state and both agree on it.
    assert_eq!(tp.client.snapshot(), snapshot);
}

// BP-I02: the chronologically-last pushed event determines final state
#[tokio::test]
async fn test_last_event_wins_in_sequence() {
    let tp = platform();
    tp.backend.seed_user("Maria", MARIA_EMAIL, MARIA_PASSWORD);

    tp.client.bootstrap().await;
    settled_within(&tp.client, 1000).await;

    let session = tp.backend.make_session(MARIA_EMAIL);
    tp.backend.push_change(AuthEvent::SignedIn, Some(session));
    wait_for(&tp.client, 1000, |s| s.is_authenticated()).await;

    tp.backend.push_change(AuthEvent::SignedOut, None);
    let snapshot = wait_for(&tp.client, 1000, |s| !s.is_authenticated()).await;

    assert!(snapshot.user.is_none());
    assert!(snapshot.profile.is_none());
    assert!(!snapshot.is_admin);
}

// BP-I03: a token refresh re-resolves the same identity without flicker
#[tokio::test]
async fn test_token_refresh_keeps_identity() {
    let tp = platform();
    let user = tp.backend.seed_user("Maria", MARIA_EMAIL, MARIA_PASSWORD);
    tp.backend.restore_session_for(MARIA_EMAIL);

    tp.client.bootstrap().await;
    settled_within(&tp.client, 1000).await;

    let refreshed = tp.backend.make_session(MARIA_EMAIL);
    tp.backend.push_change(AuthEvent::TokenRefreshed, Some(refreshed));

    // Allow the refresh attempt to run to completion.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let snapshot = tp.client.snapshot();
    assert_eq!(snapshot.user.as_ref().unwrap().id, user.id);
    assert_eq!(snapshot.profile.as_ref().unwrap().name, "Maria");
}

// BP-I04: an in-flight identity load (started t=0, resolving t≈300ms) must
// not overwrite a sign-out that started later and settled first
#[tokio::test]
async fn test_slow_earlier_attempt_cannot_resurrect_session() {
    let tp = platform_with_timeout(Duration::from_secs(2));
    tp.backend.seed_user("Maria", MARIA_EMAIL, MARIA_PASSWORD);
    let client = Arc::new(tp.client);

    client.bootstrap().await;
    settled_within(&client, 1000).await;

    // Attempt A: sign-in whose capability fetches take 300ms.
    tp.backend.behavior().set_delay_ms(MockOp::FetchProfile, 300);
    tp.backend.behavior().set_delay_ms(MockOp::HasRole, 300);
    let session = tp.backend.make_session(MARIA_EMAIL);
    tp.backend.push_change(AuthEvent::SignedIn, Some(session));

    // Attempt B: logout starts while A is still loading and settles at once.
    tokio::time::sleep(Duration::from_millis(50)).await;
    client.logout().await;
    assert!(!client.snapshot().is_authenticated());

    // A resolves well after B; its result must be discarded, not applied.
    for _ in 0..8 {
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(
            !client.snapshot().is_authenticated(),
            "stale sign-in overwrote a later sign-out"
        );
    }
}

// BP-I05: with overlapping identity loads, the later-started one owns the
// final state even when the earlier one is still in flight
#[tokio::test]
async fn test_later_started_identity_wins_overlap() {
    let tp = platform_with_timeout(Duration::from_secs(2));
    tp.backend.seed_user("Maria", MARIA_EMAIL, MARIA_PASSWORD);
    let bia = tp.backend.seed_user("Bia", "bia@exemplo.com", "outra-senha");
    tp.backend.restore_session_for(MARIA_EMAIL);

    // The restored-session load is slow on both trigger paths.
    tp.backend.behavior().set_delay_ms(MockOp::FetchProfile, 300);
    tp.backend.behavior().set_delay_ms(MockOp::HasRole, 300);

    let client = Arc::new(tp.client);
    let boot = {
        let client = Arc::clone(&client);
        tokio::spawn(async move { client.bootstrap().await })
    };

    // While the Maria attempts are in flight, the provider reports a
    // different identity (cross-tab login switch) that resolves fast.
    tokio::time::sleep(Duration::from_millis(50)).await;
    tp.backend.behavior().set_delay_ms(MockOp::FetchProfile, 0);
    tp.backend.behavior().set_delay_ms(MockOp::HasRole, 0);
    let switched = tp.backend.make_session("bia@exemplo.com");
    tp.backend.push_change(AuthEvent::SignedIn, Some(switched));

    boot.await.expect("bootstrap task panicked");

    // Give every in-flight attempt time to resolve, then the last-started
    // identity must own the state.
    tokio::time::sleep(Duration::from_millis(500)).await;
    let snapshot = wait_for(&client, 1000, |s| !s.loading).await;
    assert_eq!(snapshot.user.as_ref().unwrap().id, bia.id);
    assert_eq!(snapshot.profile.as_ref().unwrap().name, "Bia");
}

// BP-I06: capability fetches past the timeout degrade to defaults instead
// of blocking the UI
#[tokio::test]
async fn test_capability_timeout_degrades_to_defaults() {
    let tp = platform_with_timeout(Duration::from_millis(150));
    let user = tp.backend.seed_user("Maria", MARIA_EMAIL, MARIA_PASSWORD);
    tp.backend.grant_admin(user.id);
    tp.backend.restore_session_for(MARIA_EMAIL);

    tp.backend
        .behavior()
        .set_outcome(MockOp::FetchProfile, MockOutcome::Hang);
    tp.backend
        .behavior()
        .set_outcome(MockOp::HasRole, MockOutcome::Hang);

    let started = Instant::now();
    tp.client.bootstrap().await;
    let snapshot = settled_within(&tp.client, 2000).await;

    assert!(
        started.elapsed() < Duration::from_millis(600),
        "loading cleared late"
    );
    assert!(snapshot.is_authenticated(), "session survives a degraded fetch");
    assert!(snapshot.profile.is_none());
    assert!(!snapshot.is_admin);

    // A later manual refresh recovers the profile.
    tp.backend.behavior().reset();
    tp.client.refresh_profile().await;
    assert_eq!(tp.client.snapshot().profile.unwrap().name, "Maria");
}

// BP-I07: capability fetch errors degrade silently, user stays signed in
#[tokio::test]
async fn test_capability_errors_degrade_to_defaults() {
    let tp = platform();
    let user = tp.backend.seed_user("Maria", MARIA_EMAIL, MARIA_PASSWORD);
    tp.backend.grant_admin(user.id);
    tp.backend.restore_session_for(MARIA_EMAIL);

    tp.backend
        .behavior()
        .set_outcome(MockOp::FetchProfile, MockOutcome::Fail);
    tp.backend
        .behavior()
        .set_outcome(MockOp::HasRole, MockOutcome::Fail);

    tp.client.bootstrap().await;
    let snapshot = settled_within(&tp.client, 1000).await;

    assert!(snapshot.is_authenticated());
    assert!(snapshot.profile.is_none());
    assert!(!snapshot.is_admin);
}

// BP-I08: a corrupt restored session forces sign-out and never leaves the
// state stuck in loading
#[tokio::test]
async fn test_corrupt_session_forces_sign_out() {
    let tp = platform();
    tp.backend.seed_user("Maria", MARIA_EMAIL, MARIA_PASSWORD);
    tp.backend.restore_session_for(MARIA_EMAIL);
    tp.backend
        .behavior()
        .set_outcome(MockOp::CurrentSession, MockOutcome::Fail);

    tp.client.bootstrap().await;
    let snapshot = settled_within(&tp.client, 1000).await;

    assert!(!snapshot.is_authenticated());
    assert!(snapshot.profile.is_none());
    assert!(!snapshot.is_admin);
    assert!(tp.backend.recorded_calls().contains(&MockOp::SignOut));
}

// BP-I09: a write resolving after teardown does not mutate the snapshot
#[tokio::test]
async fn test_write_after_teardown_is_dropped() {
    let tp = platform();
    tp.backend.seed_user("Maria", MARIA_EMAIL, MARIA_PASSWORD);
    tp.backend.restore_session_for(MARIA_EMAIL);

    tp.client.bootstrap().await;
    settled_within(&tp.client, 1000).await;

    tp.backend.behavior().set_delay_ms(MockOp::UpdateProfile, 200);

    let client = Arc::new(tp.client);
    let writer = Arc::clone(&client);
    let in_flight = tokio::spawn(async move {
        writer
            .update_profile(ProfilePatch::default().with_name("Maria Silva"))
            .await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    client.close();

    in_flight.await.expect("update task panicked");
    assert_eq!(client.snapshot().profile.unwrap().name, "Maria");
}

// BP-I10: events arriving after teardown are not applied
#[tokio::test]
async fn test_event_after_teardown_is_dropped() {
    let tp = platform();
    tp.backend.seed_user("Maria", MARIA_EMAIL, MARIA_PASSWORD);

    tp.client.bootstrap().await;
    let before = settled_within(&tp.client, 1000).await;
    assert!(!before.is_authenticated());

    tp.client.close();

    let session = tp.backend.make_session(MARIA_EMAIL);
    tp.backend.push_change(AuthEvent::SignedIn, Some(session));
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(tp.client.snapshot(), before);
}

// BP-I11: a signed-out bootstrap runs no capability fetches
#[tokio::test]
async fn test_signed_out_bootstrap_skips_capability_fetches() {
    let tp = platform();

    tp.client.bootstrap().await;
    settled_within(&tp.client, 1000).await;

    let calls = tp.backend.recorded_calls();
    assert!(!calls.contains(&MockOp::FetchProfile));
    assert!(!calls.contains(&MockOp::HasRole));
}
