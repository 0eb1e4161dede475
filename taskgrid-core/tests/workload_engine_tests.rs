/// Integration tests for the workload engine and timeline validation
///
/// Requires a running PostgreSQL database (see tests/common/mod.rs).
mod common;

use common::{create_project, create_user, date, test_pool};

use taskgrid_core::error::StoreError;
use taskgrid_core::models::task::{CreateTask, TaskPriority, TaskStatus};
use taskgrid_core::models::workload::AllocateWorkload;
use taskgrid_core::stores::tasks;
use taskgrid_core::workload::distribution::DistributionStrategy;
use taskgrid_core::workload::engine::{AssignmentOptions, WorkloadEngine};
use taskgrid_core::workload::timeline;
use uuid::Uuid;

#[tokio::test]
async fn test_allocate_then_summarize_round_trip() {
    let Some(pool) = test_pool().await else { return };

    let owner = create_user(&pool, "owner").await;
    let project = create_project(&pool, owner.id, "Budget").await;
    let engine = WorkloadEngine::new(pool.clone());

    let task_id = Uuid::new_v4();
    for (day, hours) in [(1, 4.0), (2, 6.0), (3, 8.0)] {
        engine
            .allocate(AllocateWorkload {
                user_id: owner.id,
                project_id: project.id,
                task_id,
                entry_date: date(2024, 6, day),
                allocated_hours: Some(hours),
                actual_hours: None,
            })
            .await
            .expect("allocate");
    }

    let summary = engine
        .summarize_user(owner.id, date(2024, 6, 1), date(2024, 6, 3))
        .await
        .expect("summarize");

    assert_eq!(summary.user_name, owner.name);
    assert!((summary.total_allocated_hours - 18.0).abs() < 1e-9);
    assert_eq!(summary.projects.len(), 1);
    assert_eq!(summary.projects[0].project_id, project.id);
    assert_eq!(summary.projects[0].project_name, project.name);
}

#[tokio::test]
async fn test_allocate_defaults_to_eight_hours_and_upserts() {
    let Some(pool) = test_pool().await else { return };

    let owner = create_user(&pool, "owner").await;
    let project = create_project(&pool, owner.id, "Defaults").await;
    let engine = WorkloadEngine::new(pool.clone());

    let task_id = Uuid::new_v4();
    let entry = engine
        .allocate(AllocateWorkload {
            user_id: owner.id,
            project_id: project.id,
            task_id,
            entry_date: date(2024, 6, 10),
            allocated_hours: None,
            actual_hours: None,
        })
        .await
        .expect("allocate");
    assert_eq!(entry.allocated_hours, 8.0);

    // Same (user, task, date) overwrites instead of stacking.
    let replaced = engine
        .allocate(AllocateWorkload {
            user_id: owner.id,
            project_id: project.id,
            task_id,
            entry_date: date(2024, 6, 10),
            allocated_hours: Some(3.0),
            actual_hours: None,
        })
        .await
        .expect("re-allocate");
    assert_eq!(replaced.id, entry.id);
    assert_eq!(replaced.allocated_hours, 3.0);

    let summary = engine
        .summarize_user(owner.id, date(2024, 6, 10), date(2024, 6, 10))
        .await
        .expect("summarize");
    assert!((summary.total_allocated_hours - 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_assign_with_even_allocation_spreads_forty_hours() {
    let Some(pool) = test_pool().await else { return };

    let owner = create_user(&pool, "owner").await;
    let worker = create_user(&pool, "worker").await;
    let project = create_project(&pool, owner.id, "Sprint").await;
    let engine = WorkloadEngine::new(pool.clone());

    // Monday to Friday, 40 estimated hours.
    let task = tasks::create(
        &pool,
        CreateTask {
            title: "Big feature".to_string(),
            description: None,
            project_id: project.id,
            assignee_id: None,
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            start_date: Some(date(2024, 7, 1)),
            end_date: Some(date(2024, 7, 5)),
            estimated_hours: Some(40.0),
            dependencies: vec![],
        },
        owner.id,
    )
    .await
    .expect("task");

    let result = engine
        .assign_with_allocation(
            task.id,
            worker.id,
            owner.id,
            AssignmentOptions {
                strategy: Some(DistributionStrategy::Even),
                custom_distribution: None,
                auto_allocate: true,
            },
        )
        .await
        .expect("assign");

    assert_eq!(result.task.assignee_id, Some(worker.id));
    assert_eq!(result.entries.len(), 5);
    for entry in &result.entries {
        assert_eq!(entry.user_id, worker.id);
        assert_eq!(entry.task_id, task.id);
        assert!((entry.allocated_hours - 8.0).abs() < 1e-9);
    }

    let summary = engine
        .summarize_user(worker.id, date(2024, 7, 1), date(2024, 7, 5))
        .await
        .expect("summarize");
    assert!((summary.total_allocated_hours - 40.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_assign_without_schedule_skips_allocation() {
    let Some(pool) = test_pool().await else { return };

    let owner = create_user(&pool, "owner").await;
    let worker = create_user(&pool, "worker").await;
    let project = create_project(&pool, owner.id, "Loose").await;
    let engine = WorkloadEngine::new(pool.clone());

    let task = tasks::create(
        &pool,
        CreateTask {
            title: "Unscheduled".to_string(),
            description: None,
            project_id: project.id,
            assignee_id: None,
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            start_date: None,
            end_date: None,
            estimated_hours: Some(40.0),
            dependencies: vec![],
        },
        owner.id,
    )
    .await
    .expect("task");

    let result = engine
        .assign_with_allocation(
            task.id,
            worker.id,
            owner.id,
            AssignmentOptions {
                strategy: None,
                custom_distribution: None,
                auto_allocate: true,
            },
        )
        .await
        .expect("assign");

    assert_eq!(result.task.assignee_id, Some(worker.id));
    assert!(result.entries.is_empty());
}

#[tokio::test]
async fn test_capacity_info_flags_over_allocation() {
    let Some(pool) = test_pool().await else { return };

    let owner = create_user(&pool, "owner").await;
    let project = create_project(&pool, owner.id, "Crunch").await;
    let engine = WorkloadEngine::new(pool.clone());

    // One week = 40h capacity; 46h allocated = 115% > 110%.
    let start = date(2024, 8, 5);
    for offset in 0..7 {
        engine
            .allocate(AllocateWorkload {
                user_id: owner.id,
                project_id: project.id,
                task_id: Uuid::new_v4(),
                entry_date: start + chrono::Duration::days(offset),
                allocated_hours: Some(if offset == 0 { 10.0 } else { 6.0 }),
                actual_hours: None,
            })
            .await
            .expect("allocate");
    }

    let info = engine
        .capacity_info(owner.id, start, date(2024, 8, 11))
        .await
        .expect("capacity");

    assert!((info.total_capacity_hours - 40.0).abs() < 1e-9);
    assert!((info.allocated_hours - 46.0).abs() < 1e-9);
    assert_eq!(info.available_hours, 0.0);
    assert!(info.is_over_allocated);
}

#[tokio::test]
async fn test_capacity_info_for_unknown_user_is_zeroed() {
    let Some(pool) = test_pool().await else { return };

    let engine = WorkloadEngine::new(pool.clone());

    let info = engine
        .capacity_info(Uuid::new_v4(), date(2024, 8, 5), date(2024, 8, 11))
        .await
        .expect("capacity never errors on unknown users");

    assert_eq!(info.user_name, "Unknown User");
    assert_eq!(info.total_capacity_hours, 0.0);
    assert_eq!(info.allocated_hours, 0.0);
    assert!(!info.is_over_allocated);
}

#[tokio::test]
async fn test_suggestions_rank_idle_candidate_first() {
    let Some(pool) = test_pool().await else { return };

    let owner = create_user(&pool, "owner").await;
    let busy = create_user(&pool, "busy").await;
    let idle = create_user(&pool, "idle").await;
    let project = create_project(&pool, owner.id, "Staffing").await;
    let engine = WorkloadEngine::new(pool.clone());

    let start = date(2024, 9, 2);
    let end = date(2024, 9, 6);

    // Load one candidate up over the span.
    for offset in 0..5 {
        engine
            .allocate(AllocateWorkload {
                user_id: busy.id,
                project_id: project.id,
                task_id: Uuid::new_v4(),
                entry_date: start + chrono::Duration::days(offset),
                allocated_hours: Some(8.0),
                actual_hours: None,
            })
            .await
            .expect("allocate");
    }

    let task = tasks::create(
        &pool,
        CreateTask {
            title: "Needs an owner".to_string(),
            description: None,
            project_id: project.id,
            assignee_id: None,
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            start_date: Some(start),
            end_date: Some(end),
            estimated_hours: Some(20.0),
            dependencies: vec![],
        },
        owner.id,
    )
    .await
    .expect("task");

    let suggestions = engine
        .suggest_assignees(task.id, owner.id, &[busy.id, idle.id])
        .await
        .expect("suggestions");

    assert_eq!(suggestions.len(), 2);
    assert_eq!(suggestions[0].user_id, idle.id);
    assert!(suggestions[0].score > suggestions[1].score);
}

#[tokio::test]
async fn test_suggestions_without_schedule_are_neutral_and_name_sorted() {
    let Some(pool) = test_pool().await else { return };

    let owner = create_user(&pool, "owner").await;
    let zed = create_user(&pool, "zed").await;
    let amy = create_user(&pool, "amy").await;
    let project = create_project(&pool, owner.id, "Unplanned").await;
    let engine = WorkloadEngine::new(pool.clone());

    let task = tasks::create(
        &pool,
        CreateTask {
            title: "No dates yet".to_string(),
            description: None,
            project_id: project.id,
            assignee_id: None,
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            start_date: None,
            end_date: None,
            estimated_hours: Some(20.0),
            dependencies: vec![],
        },
        owner.id,
    )
    .await
    .expect("task");

    let suggestions = engine
        .suggest_assignees(task.id, owner.id, &[zed.id, amy.id])
        .await
        .expect("suggestions");

    assert_eq!(suggestions.len(), 2);
    assert_eq!(suggestions[0].user_id, amy.id, "sorted by name");
    assert!(suggestions.iter().all(|s| (s.score - 0.5).abs() < 1e-9));
}

#[tokio::test]
async fn test_preview_impact_projects_estimate_on_top() {
    let Some(pool) = test_pool().await else { return };

    let owner = create_user(&pool, "owner").await;
    let worker = create_user(&pool, "worker").await;
    let project = create_project(&pool, owner.id, "Forecast").await;
    let engine = WorkloadEngine::new(pool.clone());

    let start = date(2024, 10, 7);
    let end = date(2024, 10, 13);

    engine
        .allocate(AllocateWorkload {
            user_id: worker.id,
            project_id: project.id,
            task_id: Uuid::new_v4(),
            entry_date: start,
            allocated_hours: Some(20.0),
            actual_hours: None,
        })
        .await
        .expect("allocate");

    let task = tasks::create(
        &pool,
        CreateTask {
            title: "Heavy lift".to_string(),
            description: None,
            project_id: project.id,
            assignee_id: None,
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            start_date: Some(start),
            end_date: Some(end),
            estimated_hours: Some(30.0),
            dependencies: vec![],
        },
        owner.id,
    )
    .await
    .expect("task");

    let impact = engine
        .preview_impact(task.id, worker.id, owner.id)
        .await
        .expect("impact");

    assert!((impact.current_allocated_hours - 20.0).abs() < 1e-9);
    assert!((impact.projected_allocated_hours - 50.0).abs() < 1e-9);
    assert!((impact.capacity_hours - 40.0).abs() < 1e-9);
    // 50/40 = 125% > 110%.
    assert!(impact.is_over_allocated);
}

#[tokio::test]
async fn test_timeline_move_rejected_before_dependency_end() {
    let Some(pool) = test_pool().await else { return };

    let owner = create_user(&pool, "owner").await;
    let project = create_project(&pool, owner.id, "Schedule").await;

    let dep = tasks::create(
        &pool,
        CreateTask {
            title: "Foundation".to_string(),
            description: None,
            project_id: project.id,
            assignee_id: None,
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            start_date: Some(date(2024, 11, 4)),
            end_date: Some(date(2024, 11, 8)),
            estimated_hours: None,
            dependencies: vec![],
        },
        owner.id,
    )
    .await
    .expect("dependency task");

    let task = tasks::create(
        &pool,
        CreateTask {
            title: "Walls".to_string(),
            description: None,
            project_id: project.id,
            assignee_id: None,
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            start_date: Some(date(2024, 11, 11)),
            end_date: Some(date(2024, 11, 15)),
            estimated_hours: None,
            dependencies: vec![dep.id],
        },
        owner.id,
    )
    .await
    .expect("dependent task");

    // Earlier than the dependency's end: rejected.
    let moved = timeline::reschedule(&pool, task.id, date(2024, 11, 6), owner.id).await;
    match moved {
        Err(StoreError::Validation(msg)) => {
            assert!(msg.contains("would violate task dependencies"))
        }
        other => panic!("expected Validation error, got {:?}", other.err()),
    }

    // On or after the dependency's end: allowed, duration preserved.
    let moved = timeline::reschedule(&pool, task.id, date(2024, 11, 8), owner.id)
        .await
        .expect("move after dependency end");
    assert_eq!(moved.start_date, Some(date(2024, 11, 8)));
    assert_eq!(moved.end_date, Some(date(2024, 11, 12)));
}

#[tokio::test]
async fn test_timeline_move_skips_deleted_dependencies() {
    let Some(pool) = test_pool().await else { return };

    let owner = create_user(&pool, "owner").await;
    let project = create_project(&pool, owner.id, "Ghosts").await;

    let task = tasks::create(
        &pool,
        CreateTask {
            title: "Refers to nothing".to_string(),
            description: None,
            project_id: project.id,
            assignee_id: None,
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            start_date: Some(date(2024, 11, 11)),
            end_date: Some(date(2024, 11, 15)),
            estimated_hours: None,
            dependencies: vec![Uuid::new_v4()],
        },
        owner.id,
    )
    .await
    .expect("task");

    // The dependency id resolves to nothing: treated as satisfied.
    timeline::reschedule(&pool, task.id, date(2024, 11, 4), owner.id)
        .await
        .expect("unresolvable dependencies are skipped");
}
