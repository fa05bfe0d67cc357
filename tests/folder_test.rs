//! Integration tests for folder lifecycle and ownership rules.

mod helpers;

use trainhub::{ErrorKind, Permission, RemoteAuthority};

use helpers::TestHub;

#[tokio::test]
async fn test_only_athletes_can_own_folders() {
    let hub = TestHub::new();
    let coach = hub.seed_coach("Sam Coach", "sam@example.com");

    // A coach ID is structurally an owner candidate, but the directory
    // role check refuses it.
    let err = hub
        .manager
        .create_folder("Sprint drills", coach.into_uuid().into())
        .await
        .expect_err("coach-owned folder must be refused");
    assert_eq!(err.kind, ErrorKind::Unauthorized);
}

#[tokio::test]
async fn test_folder_name_must_not_be_blank() {
    let hub = TestHub::new();
    let athlete = hub.seed_athlete("Jane Doe", "jane@example.com");

    let err = hub
        .manager
        .create_folder("   ", athlete)
        .await
        .expect_err("blank name must be refused");
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_rename_and_delete() {
    let hub = TestHub::new();
    let athlete = hub.seed_athlete("Jane Doe", "jane@example.com");

    let folder_id = hub
        .manager
        .create_folder("Sprint drills", athlete)
        .await
        .expect("create folder");

    hub.manager
        .rename_folder(folder_id, "Hill repeats")
        .await
        .expect("rename");
    let folder = hub
        .manager
        .get_folder(folder_id)
        .await
        .expect("fetch")
        .expect("folder exists");
    assert_eq!(folder.name, "Hill repeats");

    hub.manager.delete_folder(folder_id).await.expect("delete");
    assert!(hub
        .manager
        .get_folder(folder_id)
        .await
        .expect("fetch")
        .is_none());
    assert!(hub.replica.get_folder(folder_id).is_none());
}

#[tokio::test]
async fn test_profile_and_membership_version_independently() {
    let hub = TestHub::new();
    let athlete = hub.seed_athlete("Jane Doe", "jane@example.com");
    let coach = hub.seed_coach("Sam Coach", "sam@example.com");

    let folder_id = hub
        .manager
        .create_folder("Sprint drills", athlete)
        .await
        .expect("create folder");

    let record = hub.replica.get_folder_record(folder_id).expect("record");
    assert_eq!(record.version.profile, 1);
    assert_eq!(record.version.membership, 1);

    // A rename touches only the profile group.
    hub.manager
        .rename_folder(folder_id, "Hill repeats")
        .await
        .expect("rename");
    let record = hub.replica.get_folder_record(folder_id).expect("record");
    assert_eq!(record.version.profile, 2);
    assert_eq!(record.version.membership, 1);

    // An acceptance touches only the membership group, so the earlier
    // rename survives concurrent sharing activity.
    let invitation_id = hub
        .manager
        .invite_coach(folder_id, "sam@example.com", "Sam", Permission::full())
        .await
        .expect("invite");
    hub.manager
        .accept_invitation(invitation_id, coach)
        .await
        .expect("accept");
    let record = hub.replica.get_folder_record(folder_id).expect("record");
    assert_eq!(record.version.profile, 2);
    assert_eq!(record.version.membership, 2);
    assert_eq!(record.folder.name, "Hill repeats");
    assert!(record.folder.is_member(coach));
}

#[tokio::test]
async fn test_replica_mirrors_authority_assigned_versions() {
    let hub = TestHub::new();
    let athlete = hub.seed_athlete("Jane Doe", "jane@example.com");
    let coach = hub.seed_coach("Sam Coach", "sam@example.com");

    let folder_id = hub
        .manager
        .create_folder("Sprint drills", athlete)
        .await
        .expect("create folder");
    hub.manager
        .rename_folder(folder_id, "Hill repeats")
        .await
        .expect("rename");
    let invitation_id = hub
        .manager
        .invite_coach(folder_id, "sam@example.com", "Sam", Permission::full())
        .await
        .expect("invite");
    hub.manager
        .accept_invitation(invitation_id, coach)
        .await
        .expect("accept");

    // After every mutation the mirrored version is the one the
    // authority actually assigned, not a locally guessed counter.
    let stored = hub
        .authority
        .fetch_folder(folder_id)
        .await
        .expect("fetch")
        .expect("folder exists");
    let record = hub.replica.get_folder_record(folder_id).expect("record");
    assert_eq!(record.version, stored.version);
    assert_eq!(record.folder.name, stored.record.name);
}
