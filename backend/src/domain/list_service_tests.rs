//! Tests for the list membership policy service.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;

use super::*;
use crate::domain::ports::{MockGroupRepository, MockListRepository, MockUserDirectory};

fn admin_email() -> EmailAddress {
    EmailAddress::new("admin@admin.com").expect("valid email")
}

fn service(
    lists: MockListRepository,
    groups: MockGroupRepository,
    users: MockUserDirectory,
) -> ListService<MockListRepository, MockGroupRepository, MockUserDirectory> {
    ListService::new(
        Arc::new(lists),
        Arc::new(groups),
        Arc::new(users),
        admin_email(),
    )
}

fn groceries(creator: UserId, members: &[UserId]) -> List {
    List {
        id: ListId::random(),
        list_name: ListName::new("Groceries").expect("valid"),
        icon: "cart".to_owned(),
        color: "#4caf50".to_owned(),
        location: None,
        creator_id: creator,
        members: members.iter().copied().collect(),
        linked_group_id: None,
        status: ListStatus::Active,
        created_at: Utc::now(),
    }
}

fn user_doc(email: &str) -> User {
    User::new(
        UserId::random(),
        EmailAddress::new(email).expect("valid email"),
        DisplayName::new("Someone").expect("valid name"),
        Utc::now(),
    )
}

fn new_list(share: ListShare) -> NewList {
    NewList {
        list_name: "Groceries".to_owned(),
        icon: "cart".to_owned(),
        color: "#4caf50".to_owned(),
        location: None,
        share,
    }
}

#[tokio::test]
async fn create_list_defaults_members_to_the_creator() {
    let creator = UserId::random();
    let mut lists = MockListRepository::new();
    lists
        .expect_insert()
        .withf(move |list| {
            list.creator_id == creator
                && list.members == BTreeSet::from([creator])
                && list.linked_group_id.is_none()
        })
        .times(1)
        .return_once(|_| Ok(()));

    let service = service(lists, MockGroupRepository::new(), MockUserDirectory::new());
    let created = service
        .create_list(&creator, new_list(ListShare::Private))
        .await
        .expect("create succeeds");
    assert_eq!(created.status, ListStatus::Active);
}

#[tokio::test]
async fn create_list_rejects_a_name_that_trims_to_nothing() {
    let service = service(
        MockListRepository::new(),
        MockGroupRepository::new(),
        MockUserDirectory::new(),
    );
    let request = NewList {
        list_name: "   ".to_owned(),
        ..new_list(ListShare::Private)
    };

    let error = service
        .create_list(&UserId::random(), request)
        .await
        .expect_err("empty name");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn create_list_with_group_snapshots_its_members_and_links() {
    let creator = UserId::random();
    let member = UserId::random();
    let group = Group {
        id: GroupId::random(),
        group_name: GroupName::new("Household").expect("valid"),
        owner_id: member,
        member_uids: BTreeSet::from([member]),
        created_at: Utc::now(),
    };
    let group_id = group.id;

    let mut groups = MockGroupRepository::new();
    groups
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(group)));
    let mut lists = MockListRepository::new();
    lists
        .expect_insert()
        .withf(move |list| {
            list.members == BTreeSet::from([creator, member])
                && list.linked_group_id == Some(group_id)
        })
        .times(1)
        .return_once(|_| Ok(()));

    let service = service(lists, groups, MockUserDirectory::new());
    service
        .create_list(&creator, new_list(ListShare::WithGroup(group_id)))
        .await
        .expect("create succeeds");
}

#[tokio::test]
async fn create_list_with_unknown_group_is_not_found() {
    let mut groups = MockGroupRepository::new();
    groups
        .expect_find_by_id()
        .times(1)
        .return_once(|_| Ok(None));

    let service = service(MockListRepository::new(), groups, MockUserDirectory::new());
    let error = service
        .create_list(
            &UserId::random(),
            new_list(ListShare::WithGroup(GroupId::random())),
        )
        .await
        .expect_err("unknown group");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn add_member_requires_the_acting_user_to_be_a_member() {
    let creator = UserId::random();
    let outsider = UserId::random();
    let list = groceries(creator, &[creator]);
    let list_id = list.id;

    let mut lists = MockListRepository::new();
    lists
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(list)));

    let service = service(lists, MockGroupRepository::new(), MockUserDirectory::new());
    let error = service
        .add_member(&outsider, &list_id, &UserId::random())
        .await
        .expect_err("outsider");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn share_by_email_with_yourself_is_a_conflict() {
    let creator = UserId::random();
    let mut acting_doc = user_doc("alice@example.com");
    acting_doc.id = creator;
    let list = groceries(creator, &[creator]);
    let list_id = list.id;

    let mut lists = MockListRepository::new();
    lists
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(list)));
    let mut users = MockUserDirectory::new();
    users
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(acting_doc)));

    let service = service(lists, MockGroupRepository::new(), users);
    let error = service
        .add_member_by_email(&creator, &list_id, "Alice@Example.COM")
        .await
        .expect_err("self share");
    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn share_by_email_with_the_admin_is_forbidden() {
    let creator = UserId::random();
    let mut acting_doc = user_doc("alice@example.com");
    acting_doc.id = creator;
    let list = groceries(creator, &[creator]);
    let list_id = list.id;

    let mut lists = MockListRepository::new();
    lists
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(list)));
    let mut users = MockUserDirectory::new();
    users
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(acting_doc)));

    let service = service(lists, MockGroupRepository::new(), users);
    let error = service
        .add_member_by_email(&creator, &list_id, "admin@admin.com")
        .await
        .expect_err("admin share");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn share_by_email_reports_unknown_and_deleted_users_as_not_found() {
    for deleted in [false, true] {
        let creator = UserId::random();
        let mut acting_doc = user_doc("alice@example.com");
        acting_doc.id = creator;
        let list = groceries(creator, &[creator]);
        let list_id = list.id;

        let mut lists = MockListRepository::new();
        lists
            .expect_find_by_id()
            .times(1)
            .return_once(move |_| Ok(Some(list)));
        let mut users = MockUserDirectory::new();
        users
            .expect_find_by_id()
            .times(1)
            .return_once(move |_| Ok(Some(acting_doc)));
        users.expect_find_by_email().times(1).return_once(move |_| {
            if deleted {
                let mut doc = user_doc("bob@example.com");
                doc.deleted = true;
                Ok(Some(doc))
            } else {
                Ok(None)
            }
        });

        let service = service(lists, MockGroupRepository::new(), users);
        let error = service
            .add_member_by_email(&creator, &list_id, "bob@example.com")
            .await
            .expect_err("no target");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }
}

#[tokio::test]
async fn share_by_email_with_an_existing_member_is_a_conflict() {
    let creator = UserId::random();
    let target = user_doc("bob@example.com");
    let mut acting_doc = user_doc("alice@example.com");
    acting_doc.id = creator;
    let list = groceries(creator, &[creator, target.id]);
    let list_id = list.id;

    let mut lists = MockListRepository::new();
    lists
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(list)));
    let mut users = MockUserDirectory::new();
    users
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(acting_doc)));
    users
        .expect_find_by_email()
        .times(1)
        .return_once(move |_| Ok(Some(target)));

    let service = service(lists, MockGroupRepository::new(), users);
    let error = service
        .add_member_by_email(&creator, &list_id, "bob@example.com")
        .await
        .expect_err("already a member");
    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn share_by_email_unions_the_resolved_user_in() {
    let creator = UserId::random();
    let target = user_doc("bob@example.com");
    let target_id = target.id;
    let mut acting_doc = user_doc("alice@example.com");
    acting_doc.id = creator;
    let list = groceries(creator, &[creator]);
    let list_id = list.id;

    let mut lists = MockListRepository::new();
    lists
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(list)));
    lists
        .expect_add_member()
        .withf(move |id, member| *id == list_id && *member == target_id)
        .times(1)
        .return_once(|_, _| Ok(()));
    let mut users = MockUserDirectory::new();
    users
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(acting_doc)));
    users
        .expect_find_by_email()
        .times(1)
        .return_once(move |_| Ok(Some(target)));

    let service = service(lists, MockGroupRepository::new(), users);
    let shared_with = service
        .add_member_by_email(&creator, &list_id, "bob@example.com")
        .await
        .expect("share succeeds");
    assert_eq!(shared_with.id, target_id);
}

#[tokio::test]
async fn removing_the_creator_is_always_forbidden() {
    let creator = UserId::random();
    let other = UserId::random();
    let list = groceries(creator, &[creator, other]);
    let list_id = list.id;

    let mut lists = MockListRepository::new();
    lists
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(list)));
    // No expect_remove_member: the mutation must never happen.

    let service = service(lists, MockGroupRepository::new(), MockUserDirectory::new());
    let error = service
        .remove_member(&other, &list_id, &creator)
        .await
        .expect_err("creator removal");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn removing_a_group_backed_member_is_forbidden_with_guidance() {
    let creator = UserId::random();
    let group_member = UserId::random();
    let group = Group {
        id: GroupId::random(),
        group_name: GroupName::new("Household").expect("valid"),
        owner_id: group_member,
        member_uids: BTreeSet::from([group_member]),
        created_at: Utc::now(),
    };
    let mut list = groceries(creator, &[creator, group_member]);
    list.linked_group_id = Some(group.id);
    let list_id = list.id;

    let mut lists = MockListRepository::new();
    lists
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(list)));
    let mut groups = MockGroupRepository::new();
    groups
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(group)));

    let service = service(lists, groups, MockUserDirectory::new());
    let error = service
        .remove_member(&creator, &list_id, &group_member)
        .await
        .expect_err("group-backed member");
    assert_eq!(error.code(), ErrorCode::Forbidden);
    assert!(error.message().contains("unlink"));
}

#[tokio::test]
async fn a_dangling_group_link_does_not_block_removal() {
    let creator = UserId::random();
    let member = UserId::random();
    let mut list = groceries(creator, &[creator, member]);
    list.linked_group_id = Some(GroupId::random());
    let list_id = list.id;

    let mut lists = MockListRepository::new();
    lists
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(list)));
    lists
        .expect_remove_member()
        .times(1)
        .return_once(|_, _| Ok(()));
    let mut groups = MockGroupRepository::new();
    // The linked group was deleted; the lookup comes back empty.
    groups
        .expect_find_by_id()
        .times(1)
        .return_once(|_| Ok(None));

    let service = service(lists, groups, MockUserDirectory::new());
    service
        .remove_member(&creator, &list_id, &member)
        .await
        .expect("removal proceeds");
}

#[tokio::test]
async fn removal_may_leave_the_creator_alone() {
    let creator = UserId::random();
    let member = UserId::random();
    let list = groceries(creator, &[creator, member]);
    let list_id = list.id;

    let mut lists = MockListRepository::new();
    lists
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(list)));
    lists
        .expect_remove_member()
        .withf(move |id, removed| *id == list_id && *removed == member)
        .times(1)
        .return_once(|_, _| Ok(()));

    let service = service(lists, MockGroupRepository::new(), MockUserDirectory::new());
    service
        .remove_member(&creator, &list_id, &member)
        .await
        .expect("removal succeeds");
}

#[tokio::test]
async fn rename_rejects_an_empty_replacement_name() {
    let creator = UserId::random();
    let list = groceries(creator, &[creator]);
    let list_id = list.id;

    let mut lists = MockListRepository::new();
    lists
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(list)));

    let service = service(lists, MockGroupRepository::new(), MockUserDirectory::new());
    let request = ListPatchRequest {
        list_name: Some("  ".to_owned()),
        ..ListPatchRequest::default()
    };
    let error = service
        .rename_or_recolor(&creator, &list_id, request)
        .await
        .expect_err("empty name");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn an_empty_patch_is_a_no_op_success() {
    let creator = UserId::random();
    let list = groceries(creator, &[creator]);
    let list_id = list.id;

    let mut lists = MockListRepository::new();
    lists
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(list)));
    // No expect_apply_patch: nothing to write.

    let service = service(lists, MockGroupRepository::new(), MockUserDirectory::new());
    service
        .rename_or_recolor(&creator, &list_id, ListPatchRequest::default())
        .await
        .expect("no-op succeeds");
}

#[tokio::test]
async fn archiving_an_archived_list_still_succeeds() {
    let creator = UserId::random();
    let mut list = groceries(creator, &[creator]);
    list.status = ListStatus::Archived;
    let list_id = list.id;

    let mut lists = MockListRepository::new();
    lists
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(list)));
    lists
        .expect_set_status()
        .withf(|_, status| status.is_archived())
        .times(1)
        .return_once(|_, _| Ok(()));

    let service = service(lists, MockGroupRepository::new(), MockUserDirectory::new());
    service
        .archive(&creator, &list_id)
        .await
        .expect("idempotent archive");
}

#[tokio::test]
async fn only_the_creator_can_delete_a_list() {
    let creator = UserId::random();
    let member = UserId::random();
    let list = groceries(creator, &[creator, member]);
    let list_id = list.id;

    let mut lists = MockListRepository::new();
    lists
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(list)));

    let service = service(lists, MockGroupRepository::new(), MockUserDirectory::new());
    let error = service
        .delete_list(&member, &list_id)
        .await
        .expect_err("non-creator");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn delete_list_runs_the_cascade_batch() {
    let creator = UserId::random();
    let list = groceries(creator, &[creator]);
    let list_id = list.id;

    let mut lists = MockListRepository::new();
    lists
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(list)));
    lists
        .expect_delete_with_items()
        .withf(move |id| *id == list_id)
        .times(1)
        .return_once(|_| Ok(()));

    let service = service(lists, MockGroupRepository::new(), MockUserDirectory::new());
    service
        .delete_list(&creator, &list_id)
        .await
        .expect("delete succeeds");
}
