/// Integration tests for the store layer
///
/// Requires a running PostgreSQL database (see tests/common/mod.rs).
mod common;

use common::{create_project, create_user, date, test_pool};

use taskgrid_core::directory::{Directory, VerifiedIdentity};
use taskgrid_core::error::StoreError;
use taskgrid_core::models::membership::{ProjectMember, ProjectRole};
use taskgrid_core::models::task::{CreateTask, TaskPriority, TaskStatus};
use taskgrid_core::models::team::{CreateTeam, TeamRole};
use taskgrid_core::stores::{comments, projects, tasks, teams};
use uuid::Uuid;

#[tokio::test]
async fn test_project_create_adds_owner_membership() {
    let Some(pool) = test_pool().await else { return };

    let owner = create_user(&pool, "owner").await;
    let project = create_project(&pool, owner.id, "Launch").await;

    assert_eq!(project.name, "Launch");
    assert_eq!(project.owner_id, owner.id);

    let membership = ProjectMember::find(&pool, project.id, owner.id)
        .await
        .expect("query failed")
        .expect("owner membership should exist");

    assert_eq!(membership.role, ProjectRole::Owner);
}

#[tokio::test]
async fn test_outsider_is_denied_project_and_task_access() {
    let Some(pool) = test_pool().await else { return };

    let owner = create_user(&pool, "owner").await;
    let outsider = create_user(&pool, "outsider").await;
    let project = create_project(&pool, owner.id, "Private").await;

    let task = tasks::create(
        &pool,
        CreateTask {
            title: "Secret work".to_string(),
            description: None,
            project_id: project.id,
            assignee_id: None,
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            start_date: None,
            end_date: None,
            estimated_hours: None,
            dependencies: vec![],
        },
        owner.id,
    )
    .await
    .expect("owner can create tasks");

    assert!(matches!(
        projects::get(&pool, project.id, outsider.id).await,
        Err(StoreError::AccessDenied(_))
    ));
    assert!(matches!(
        tasks::get(&pool, task.id, outsider.id).await,
        Err(StoreError::AccessDenied(_))
    ));
    assert!(matches!(
        comments::list(&pool, task.id, outsider.id, 50).await,
        Err(StoreError::AccessDenied(_))
    ));
}

#[tokio::test]
async fn test_team_association_grants_project_access() {
    let Some(pool) = test_pool().await else { return };

    let owner = create_user(&pool, "owner").await;
    let teammate = create_user(&pool, "teammate").await;
    let project = create_project(&pool, owner.id, "Shared").await;

    let team = teams::create(
        &pool,
        CreateTeam {
            name: "Platform".to_string(),
            description: None,
            created_by: owner.id,
        },
    )
    .await
    .expect("team creation");

    teams::add_member(&pool, team.id, teammate.id, TeamRole::Member, owner.id)
        .await
        .expect("owner can add members");

    // Not yet associated: denied.
    assert!(projects::get(&pool, project.id, teammate.id).await.is_err());

    teams::add_to_project(&pool, team.id, project.id, owner.id)
        .await
        .expect("project owner can associate teams");

    // Associated: visible.
    let seen = projects::get(&pool, project.id, teammate.id)
        .await
        .expect("team member sees the project");
    assert_eq!(seen.id, project.id);

    let listed = projects::list_for_user_including_teams(&pool, teammate.id)
        .await
        .expect("listing");
    assert!(listed.iter().any(|p| p.id == project.id));
}

#[tokio::test]
async fn test_only_owner_deletes_project() {
    let Some(pool) = test_pool().await else { return };

    let owner = create_user(&pool, "owner").await;
    let member = create_user(&pool, "member").await;
    let project = create_project(&pool, owner.id, "Doomed").await;

    projects::add_member(&pool, project.id, member.id, ProjectRole::Admin, owner.id)
        .await
        .expect("add admin member");

    assert!(matches!(
        projects::delete(&pool, project.id, member.id).await,
        Err(StoreError::PermissionDenied(_))
    ));

    projects::delete(&pool, project.id, owner.id)
        .await
        .expect("owner deletes");
}

#[tokio::test]
async fn test_concurrent_provisioning_is_idempotent() {
    let Some(pool) = test_pool().await else { return };

    let directory = Directory::new(pool.clone());
    let identity = VerifiedIdentity {
        subject: format!("race-{}", Uuid::new_v4()),
        email: "race@example.com".to_string(),
        name: Some("Race Test".to_string()),
    };

    let (a, b) = tokio::join!(
        directory.get_or_create(identity.clone()),
        directory.get_or_create(identity.clone())
    );

    let a = a.expect("first call succeeds");
    let b = b.expect("second call succeeds");

    assert_eq!(a.id, b.id, "both calls must resolve the same record");

    // And a third, after the cache entry was evicted.
    let c = directory.get_or_create(identity).await.expect("third call");
    assert_eq!(a.id, c.id);
}

#[tokio::test]
async fn test_comment_mutation_is_author_only_and_trimmed() {
    let Some(pool) = test_pool().await else { return };

    let owner = create_user(&pool, "owner").await;
    let member = create_user(&pool, "member").await;
    let project = create_project(&pool, owner.id, "Discussion").await;

    projects::add_member(&pool, project.id, member.id, ProjectRole::Member, owner.id)
        .await
        .expect("add member");

    let task = tasks::create(
        &pool,
        CreateTask {
            title: "Talk about it".to_string(),
            description: None,
            project_id: project.id,
            assignee_id: None,
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            start_date: None,
            end_date: None,
            estimated_hours: None,
            dependencies: vec![],
        },
        owner.id,
    )
    .await
    .expect("task");

    let comment = comments::create(&pool, task.id, "  hello there  ", member.id)
        .await
        .expect("member comments");
    assert_eq!(comment.content, "hello there");

    // Non-author cannot edit or delete.
    assert!(matches!(
        comments::update(&pool, comment.id, "edited", owner.id).await,
        Err(StoreError::PermissionDenied(_))
    ));
    assert!(matches!(
        comments::delete(&pool, comment.id, owner.id).await,
        Err(StoreError::PermissionDenied(_))
    ));

    // Author can.
    let edited = comments::update(&pool, comment.id, "  edited  ", member.id)
        .await
        .expect("author edits");
    assert_eq!(edited.content, "edited");

    comments::delete(&pool, comment.id, member.id)
        .await
        .expect("author deletes");
}

#[tokio::test]
async fn test_comment_list_truncated_reports_has_more() {
    let Some(pool) = test_pool().await else { return };

    let owner = create_user(&pool, "owner").await;
    let project = create_project(&pool, owner.id, "Busy").await;

    let task = tasks::create(
        &pool,
        CreateTask {
            title: "Popular task".to_string(),
            description: None,
            project_id: project.id,
            assignee_id: None,
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            start_date: None,
            end_date: None,
            estimated_hours: None,
            dependencies: vec![],
        },
        owner.id,
    )
    .await
    .expect("task");

    for i in 0..3 {
        comments::create(&pool, task.id, &format!("comment {}", i), owner.id)
            .await
            .expect("comment");
    }

    let page = comments::list_truncated(&pool, task.id, owner.id, 2)
        .await
        .expect("truncated list");
    assert_eq!(page.comments.len(), 2);
    assert!(page.has_more);

    let full = comments::list_truncated(&pool, task.id, owner.id, 10)
        .await
        .expect("truncated list");
    assert_eq!(full.comments.len(), 3);
    assert!(!full.has_more);
}

#[tokio::test]
async fn test_last_owner_cannot_be_removed_or_demoted() {
    let Some(pool) = test_pool().await else { return };

    let founder = create_user(&pool, "founder").await;
    let member = create_user(&pool, "member").await;

    let team = teams::create(
        &pool,
        CreateTeam {
            name: "Core".to_string(),
            description: None,
            created_by: founder.id,
        },
    )
    .await
    .expect("team");

    teams::add_member(&pool, team.id, member.id, TeamRole::Member, founder.id)
        .await
        .expect("add member");

    let removal = teams::remove_member(&pool, team.id, founder.id, founder.id).await;
    match removal {
        Err(StoreError::PermissionDenied(msg)) => {
            assert!(msg.contains("last owner"), "unexpected message: {}", msg)
        }
        other => panic!("expected PermissionDenied, got {:?}", other.err()),
    }

    assert!(matches!(
        teams::update_member_role(&pool, team.id, founder.id, TeamRole::Member, founder.id).await,
        Err(StoreError::PermissionDenied(_))
    ));

    // With a second owner, the original can step down.
    teams::update_member_role(&pool, team.id, member.id, TeamRole::Owner, founder.id)
        .await
        .expect("promote second owner");
    teams::remove_member(&pool, team.id, founder.id, founder.id)
        .await
        .expect("no longer the last owner");
}

#[tokio::test]
async fn test_member_can_remove_themself_without_role() {
    let Some(pool) = test_pool().await else { return };

    let founder = create_user(&pool, "founder").await;
    let member = create_user(&pool, "member").await;

    let team = teams::create(
        &pool,
        CreateTeam {
            name: "Drifters".to_string(),
            description: None,
            created_by: founder.id,
        },
    )
    .await
    .expect("team");

    teams::add_member(&pool, team.id, member.id, TeamRole::Member, founder.id)
        .await
        .expect("add member");

    // A plain member cannot remove someone else...
    assert!(matches!(
        teams::remove_member(&pool, team.id, founder.id, member.id).await,
        Err(StoreError::PermissionDenied(_))
    ));

    // ...but can leave.
    teams::remove_member(&pool, team.id, member.id, member.id)
        .await
        .expect("self-removal");
}

#[tokio::test]
async fn test_team_deletion_cleans_up_memberships_and_associations() {
    let Some(pool) = test_pool().await else { return };

    let founder = create_user(&pool, "founder").await;
    let project = create_project(&pool, founder.id, "Hosting").await;

    let team = teams::create(
        &pool,
        CreateTeam {
            name: "Ephemeral".to_string(),
            description: None,
            created_by: founder.id,
        },
    )
    .await
    .expect("team");

    teams::add_to_project(&pool, team.id, project.id, founder.id)
        .await
        .expect("associate");

    teams::delete(&pool, team.id, founder.id)
        .await
        .expect("delete team");

    assert!(matches!(
        teams::get(&pool, team.id).await,
        Err(StoreError::NotFound(_))
    ));
    assert!(teams::list_for_user(&pool, founder.id)
        .await
        .expect("listing")
        .iter()
        .all(|t| t.id != team.id));
}

#[tokio::test]
async fn test_task_partial_update_leaves_absent_fields() {
    let Some(pool) = test_pool().await else { return };

    let owner = create_user(&pool, "owner").await;
    let project = create_project(&pool, owner.id, "Patchwork").await;

    let task = tasks::create(
        &pool,
        CreateTask {
            title: "Original".to_string(),
            description: Some("keep me".to_string()),
            project_id: project.id,
            assignee_id: None,
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            start_date: Some(date(2024, 5, 1)),
            end_date: Some(date(2024, 5, 10)),
            estimated_hours: Some(16.0),
            dependencies: vec![],
        },
        owner.id,
    )
    .await
    .expect("task");

    let patched = tasks::update(
        &pool,
        task.id,
        taskgrid_core::models::task::UpdateTask {
            title: Some("Renamed".to_string()),
            ..Default::default()
        },
        owner.id,
    )
    .await
    .expect("patch");

    assert_eq!(patched.title, "Renamed");
    assert_eq!(patched.description.as_deref(), Some("keep me"));
    assert_eq!(patched.estimated_hours, Some(16.0));

    // Explicit clear via nested option.
    let cleared = tasks::update(
        &pool,
        task.id,
        taskgrid_core::models::task::UpdateTask {
            description: Some(None),
            ..Default::default()
        },
        owner.id,
    )
    .await
    .expect("clear");

    assert_eq!(cleared.description, None);
    assert_eq!(cleared.title, "Renamed");
}
