//! End-to-end command flows against the nullable collaborators.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveTime;
use senatus_bot::commands::{ALREADY_BROADCASTING, GENERIC_FAILURE, PERMISSION_DENIED};
use senatus_bot::{
    BroadcastRegistry, Command, CommandHandler, HandlerSettings, Invocation, ShutdownController,
};
use senatus_game::GameState;
use senatus_nullables::{NullGameClient, NullPlatform, NullRandom, NullStore};
use senatus_roles::RoleReconciler;
use senatus_store::AccountStore;
use senatus_types::{ChannelId, CommunityId, ExternalAccountId, PlatformUserId, RoleId};
use senatus_verification::{AdminSet, VerificationEngine};

struct Bot {
    store: Arc<NullStore>,
    game: Arc<NullGameClient>,
    platform: Arc<NullPlatform>,
    handler: CommandHandler,
    shutdown: Arc<ShutdownController>,
}

fn bot(revoke_roles_on_unlink: bool) -> Bot {
    let store = Arc::new(NullStore::new());
    let game = Arc::new(NullGameClient::new());
    let platform = Arc::new(NullPlatform::new());
    platform.add_community("g", 100);
    for user in ["alice", "bob", "admin"] {
        platform.add_member("g", user);
    }
    game.add_party("7", "Liberty Party", "#e67e22");
    game.add_user("159", "", Some("7"), Some("Senator"));

    let engine = Arc::new(VerificationEngine::new(
        store.clone(),
        game.clone(),
        Arc::new(NullRandom::default()),
        AdminSet::new(["admin"]),
    ));
    let reconciler = Arc::new(RoleReconciler::new(
        store.clone(),
        game.clone(),
        platform.clone(),
    ));
    let shutdown = Arc::new(ShutdownController::new());
    let handler = CommandHandler::new(
        engine,
        reconciler,
        game.clone(),
        platform.clone(),
        Arc::new(BroadcastRegistry::new()),
        shutdown.clone(),
        HandlerSettings {
            game_name: "DemocracyOnline".into(),
            revoke_roles_on_unlink,
            broadcast_at: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        },
    );
    Bot {
        store,
        game,
        platform,
        handler,
        shutdown,
    }
}

fn invoke(user: &str, command: Command) -> Invocation {
    Invocation {
        community: CommunityId::new("g"),
        channel: ChannelId::new("general"),
        invoker: PlatformUserId::new(user),
        invoker_name: format!("{user}#0001"),
        command,
    }
}

fn verify(id: &str) -> Command {
    Command::Verify {
        external_id: ExternalAccountId::new(id),
    }
}

#[tokio::test]
async fn verify_flow_issues_code_then_verifies_and_assigns_roles() {
    let b = bot(false);

    let first = b.handler.handle(&invoke("alice", verify("159"))).await;
    assert!(first.text.contains("`1111111111`"), "{}", first.text);
    let pending = b
        .store
        .get_account_by_platform(&PlatformUserId::new("alice"))
        .unwrap()
        .unwrap();
    assert_eq!(pending.pending_code.unwrap().as_str(), "1111111111");

    b.game.set_bio("159", "hello 1111111111");
    let second = b.handler.handle(&invoke("alice", verify("159"))).await;
    assert!(second.text.contains("successfully verified"), "{}", second.text);
    assert!(second.text.contains("alice#0001"));

    let party = b.platform.role_named("g", "Liberty Party").unwrap();
    let senator = b.platform.role_named("g", "Senator").unwrap();
    let held = b.platform.roles_of("g", "alice");
    assert!(held.contains(&party.id));
    assert!(held.contains(&senator.id));

    let third = b.handler.handle(&invoke("alice", verify("159"))).await;
    assert_eq!(third.text, "Your DemocracyOnline account is already verified.");
}

#[tokio::test]
async fn verify_unknown_game_user() {
    let b = bot(false);
    let reply = b.handler.handle(&invoke("alice", verify("404"))).await;
    assert!(reply.text.starts_with("Could not find a DemocracyOnline user"));
    assert_eq!(b.store.mutation_count(), 0);
}

#[tokio::test]
async fn store_failure_gets_generic_reply() {
    let b = bot(false);
    b.store.set_fail_writes(true);
    let reply = b.handler.handle(&invoke("alice", verify("159"))).await;
    assert_eq!(reply.text, GENERIC_FAILURE);
}

#[tokio::test]
async fn whoami_states() {
    let b = bot(false);
    let reply = b.handler.handle(&invoke("alice", Command::WhoAmI)).await;
    assert!(reply.text.starts_with("You have not linked"));

    b.handler.handle(&invoke("alice", verify("159"))).await;
    let reply = b.handler.handle(&invoke("alice", Command::WhoAmI)).await;
    assert!(reply.text.contains("not verified yet"));

    b.game.set_bio("159", "1111111111");
    b.handler.handle(&invoke("alice", verify("159"))).await;
    let reply = b.handler.handle(&invoke("alice", Command::WhoAmI)).await;
    let embed = reply.embed.expect("verified whoami has an embed");
    assert_eq!(embed.fields[0].value, "user159");
    assert_eq!(embed.fields[1].value, "159");
}

#[tokio::test]
async fn forceverify_creates_verified_record_for_admin_only() {
    let b = bot(false);
    let command = Command::ForceVerify {
        user: PlatformUserId::new("bob"),
        external_id: ExternalAccountId::new("159"),
    };

    let denied = b.handler.handle(&invoke("alice", command.clone())).await;
    assert_eq!(denied.text, PERMISSION_DENIED);

    let ok = b.handler.handle(&invoke("admin", command)).await;
    assert!(ok.text.contains("<@bob>"));
    let record = b
        .store
        .get_account_by_platform(&PlatformUserId::new("bob"))
        .unwrap()
        .unwrap();
    assert!(record.verified);
    assert!(record.pending_code.is_none());
    assert_eq!(b.platform.roles_of("g", "bob").len(), 2);
}

#[tokio::test]
async fn deletelink_self_other_and_revocation() {
    let b = bot(true);
    let admin = "admin";
    for user in ["alice", "bob"] {
        b.handler
            .handle(&invoke(
                admin,
                Command::ForceVerify {
                    user: PlatformUserId::new(user),
                    external_id: ExternalAccountId::new("159"),
                },
            ))
            .await;
    }

    let denied = b
        .handler
        .handle(&invoke(
            "alice",
            Command::DeleteLink {
                target: Some(PlatformUserId::new("bob")),
            },
        ))
        .await;
    assert_eq!(denied.text, PERMISSION_DENIED);

    let own = b
        .handler
        .handle(&invoke("alice", Command::DeleteLink { target: None }))
        .await;
    assert!(own.text.starts_with("Your link"));
    assert!(b.platform.roles_of("g", "alice").is_empty());

    let other = b
        .handler
        .handle(&invoke(
            admin,
            Command::DeleteLink {
                target: Some(PlatformUserId::new("bob")),
            },
        ))
        .await;
    assert!(other.text.contains("<@bob>"));

    let again = b
        .handler
        .handle(&invoke("alice", Command::DeleteLink { target: None }))
        .await;
    assert_eq!(again.text, "You do not have a linked DemocracyOnline account.");
}

#[tokio::test]
async fn deletelink_keeps_roles_by_default() {
    let b = bot(false);
    b.handler
        .handle(&invoke(
            "admin",
            Command::ForceVerify {
                user: PlatformUserId::new("alice"),
                external_id: ExternalAccountId::new("159"),
            },
        ))
        .await;
    b.handler
        .handle(&invoke("alice", Command::DeleteLink { target: None }))
        .await;
    assert_eq!(b.platform.roles_of("g", "alice").len(), 2);
}

#[tokio::test]
async fn bulk_commands_report_counts() {
    let b = bot(false);
    for user in ["alice", "bob"] {
        b.handler
            .handle(&invoke(
                "admin",
                Command::ForceVerify {
                    user: PlatformUserId::new(user),
                    external_id: ExternalAccountId::new("159"),
                },
            ))
            .await;
    }
    let reply = b
        .handler
        .handle(&invoke("alice", Command::ProcessPartyRoles))
        .await;
    assert_eq!(
        reply.text,
        "Party roles processed: 2 processed, 0 assigned, 2 unchanged, 0 skipped."
    );
    let reply = b.handler.handle(&invoke("alice", Command::ProcessJobRoles)).await;
    assert!(reply.text.starts_with("Job roles processed: 2 processed"));
}

#[tokio::test]
async fn gameupdate_posts_immediately_and_refuses_duplicates() {
    let b = bot(false);
    b.game.set_game_state(GameState {
        president_status: "Presidential elections have concluded.".into(),
        senate_status: "Senate elections are currently ongoing!".into(),
        president_bills: vec![],
        senate_bills: vec!["#1 - Budget".into()],
        house_bills: vec![],
    });
    let command = Command::GameUpdate {
        ping_role: Some(RoleId::new("99")),
        ping_on_first_run: false,
    };

    let denied = b.handler.handle(&invoke("alice", command.clone())).await;
    assert_eq!(denied.text, PERMISSION_DENIED);

    let started = b.handler.handle(&invoke("admin", command.clone())).await;
    assert!(started.text.contains("12:00 UTC"), "{}", started.text);
    assert!(b
        .handler
        .broadcasts()
        .is_running(&CommunityId::new("g"), &ChannelId::new("general")));
    let again = b.handler.handle(&invoke("admin", command)).await;
    assert_eq!(again.text, ALREADY_BROADCASTING);
    assert_eq!(b.handler.broadcasts().active(), 1);

    tokio::time::sleep(Duration::from_millis(50)).await;
    let sent = b.platform.sent_messages();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, ChannelId::new("general"));
    // first post does not ping unless asked to
    assert!(sent[0].1.ping_roles.is_empty());
    assert_eq!(sent[0].1.embeds[0].fields[3].value, "#1 - Budget");

    b.shutdown.shutdown();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(b.handler.broadcasts().active(), 0);
}
