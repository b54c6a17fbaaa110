//! The full link lifecycle against the LMDB store.

use std::sync::Arc;

use senatus_nullables::{NullGameClient, NullRandom};
use senatus_store::AccountStore;
use senatus_store_lmdb::environment::DEFAULT_MAP_SIZE;
use senatus_store_lmdb::LmdbEnvironment;
use senatus_types::{ExternalAccountId, PlatformUserId};
use senatus_verification::{AccountStatus, AdminSet, UnlinkOutcome, VerificationEngine, VerifyOutcome};

#[tokio::test]
async fn verify_survives_reopen_and_unlinks() {
    let dir = tempfile::tempdir().unwrap();
    let game = Arc::new(NullGameClient::new());
    game.add_user("159", "", None, None);
    let user = PlatformUserId::new("42");
    let external = ExternalAccountId::new("159");

    let code = {
        let env = LmdbEnvironment::open(dir.path(), DEFAULT_MAP_SIZE).unwrap();
        let engine = VerificationEngine::new(
            Arc::new(env.account_store()),
            game.clone(),
            Arc::new(NullRandom::default()),
            AdminSet::default(),
        );
        match engine.request_verification(&user, &external).await.unwrap() {
            VerifyOutcome::CodeIssued { code, .. } => code,
            other => panic!("expected a code, got {other:?}"),
        }
    };

    game.set_bio("159", &format!("verify: {code}"));

    let env = LmdbEnvironment::open(dir.path(), DEFAULT_MAP_SIZE).unwrap();
    let store = Arc::new(env.account_store());
    let engine = VerificationEngine::new(
        store.clone(),
        game.clone(),
        Arc::new(NullRandom::default()),
        AdminSet::default(),
    );
    let outcome = engine.request_verification(&user, &external).await.unwrap();
    assert!(matches!(outcome, VerifyOutcome::VerifiedNow(_)));
    assert!(matches!(engine.status(&user).unwrap(), AccountStatus::Verified(_)));
    assert_eq!(store.iter_verified_accounts().unwrap().len(), 1);

    let removed = engine.unlink_platform_user(&user, &user).await.unwrap();
    assert!(matches!(removed, UnlinkOutcome::Removed(_)));
    assert_eq!(store.account_count().unwrap(), 0);
}
