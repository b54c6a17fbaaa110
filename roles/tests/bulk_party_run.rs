//! Bulk party reconciliation across a community.

use std::sync::Arc;

use senatus_nullables::{NullGameClient, NullPlatform, NullStore};
use senatus_roles::{BulkReport, RoleReconciler};
use senatus_types::{CommunityId, ExternalAccountId, InternalId, LinkedAccount, PlatformUserId};

fn verified(n: u32) -> LinkedAccount {
    let mut account = LinkedAccount::new(
        InternalId::new(format!("1000000{n}")),
        PlatformUserId::new(format!("u{n}")),
        ExternalAccountId::new(format!("{n}")),
    );
    account.verified = true;
    account
}

#[tokio::test]
async fn five_accounts_one_without_party() {
    let store = Arc::new(NullStore::new());
    let game = Arc::new(NullGameClient::new());
    let platform = Arc::new(NullPlatform::new());
    platform.add_community("g", 50);
    game.add_party("1", "Red", "#aa0000");
    game.add_party("2", "Blue", "#0000aa");

    let accounts: Vec<_> = (1..=5).map(verified).collect();
    for (i, account) in accounts.iter().enumerate() {
        platform.add_member("g", account.platform_user_id.as_str());
        let party = match i {
            0 | 1 => Some("1"),
            2 | 3 => Some("2"),
            _ => None,
        };
        game.add_user(account.external_account_id.as_str(), "", party, None);
    }

    let reconciler = RoleReconciler::new(store, game.clone(), platform.clone());
    let community = CommunityId::new("g");
    let report = reconciler.reconcile_parties(&community, &accounts).await;
    assert_eq!(
        report,
        BulkReport {
            processed: 5,
            assigned: 4,
            unchanged: 0,
            skipped: 1
        }
    );
    assert_eq!(platform.created_role_count(), 2);

    let again = reconciler.reconcile_parties(&community, &accounts).await;
    assert_eq!(again.unchanged, 4);
    assert_eq!(again.skipped, 1);
}

#[tokio::test]
async fn bulk_run_continues_past_failures() {
    let store = Arc::new(NullStore::new());
    let game = Arc::new(NullGameClient::new());
    let platform = Arc::new(NullPlatform::new());
    platform.add_community("g", 50);
    game.add_party("1", "Red", "#aa0000");

    let accounts: Vec<_> = (1..=3).map(verified).collect();
    // u1 has no game record, u2 left the community, u3 is fine
    game.add_user("2", "", Some("1"), None);
    game.add_user("3", "", Some("1"), None);
    platform.add_member("g", "u3");

    let reconciler = RoleReconciler::new(store, game, platform.clone());
    let report = reconciler
        .reconcile_parties(&CommunityId::new("g"), &accounts)
        .await;
    assert_eq!(report.processed, 3);
    assert_eq!(report.assigned, 1);
    assert_eq!(report.skipped, 2);
    assert_eq!(platform.roles_of("g", "u3").len(), 1);
}
