/// Workload engine: allocation, summaries, capacity, and assignment scoring
///
/// Composes the task store, the user directory records, and the workload
/// entries into the read models the planning surface needs. Summaries
/// degrade instead of failing: an unresolvable user yields a zeroed
/// summary with the "Unknown User" sentinel, and name enrichment misses
/// are logged and replaced with sentinels.
use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::cmp::Ordering;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::StoreResult;
use crate::models::project::Project;
use crate::models::task::Task;
use crate::models::user::User;
use crate::models::workload::{AllocateWorkload, WorkloadEntry};
use crate::stores::tasks;
use crate::workload::capacity::{self, DEFAULT_DAILY_HOURS};
use crate::workload::distribution::{distribute_hours, DistributionStrategy};

/// Sentinel name for unresolvable users
const UNKNOWN_USER: &str = "Unknown User";

/// Sentinel name for unresolvable projects
const UNKNOWN_PROJECT: &str = "Unknown Project";

/// Rolling window for the per-project distribution view, in days
const DISTRIBUTION_WINDOW_DAYS: i64 = 30;

/// Per-project slice of a user's workload summary
#[derive(Debug, Clone, Serialize)]
pub struct ProjectAllocation {
    /// Project id
    pub project_id: Uuid,

    /// Project display name ("Unknown Project" when unresolvable)
    pub project_name: String,

    /// Allocated hours in range
    pub allocated_hours: f64,

    /// Reported actual hours in range
    pub actual_hours: f64,
}

/// A user's workload over a date range, grouped by project
#[derive(Debug, Clone, Serialize)]
pub struct UserWorkloadSummary {
    /// User id
    pub user_id: Uuid,

    /// User display name ("Unknown User" when unresolvable)
    pub user_name: String,

    /// Range start (inclusive)
    pub start_date: NaiveDate,

    /// Range end (inclusive)
    pub end_date: NaiveDate,

    /// Total allocated hours across projects
    pub total_allocated_hours: f64,

    /// Total reported actual hours across projects
    pub total_actual_hours: f64,

    /// Per-project breakdown, highest allocation first
    pub projects: Vec<ProjectAllocation>,
}

/// Per-member slice of a project's workload summary
#[derive(Debug, Clone, Serialize)]
pub struct MemberAllocation {
    /// User id
    pub user_id: Uuid,

    /// User display name
    pub user_name: String,

    /// Allocated hours in range
    pub allocated_hours: f64,

    /// Reported actual hours in range
    pub actual_hours: f64,
}

/// A project's workload over a date range, grouped by user
#[derive(Debug, Clone, Serialize)]
pub struct TeamWorkloadSummary {
    /// Project id
    pub project_id: Uuid,

    /// Range start (inclusive)
    pub start_date: NaiveDate,

    /// Range end (inclusive)
    pub end_date: NaiveDate,

    /// Total allocated hours across members
    pub total_allocated_hours: f64,

    /// Per-member breakdown, highest allocation first
    pub members: Vec<MemberAllocation>,
}

/// One project's share of a user's rolling 30-day load
#[derive(Debug, Clone, Serialize)]
pub struct ProjectDistribution {
    /// Project id
    pub project_id: Uuid,

    /// Project display name
    pub project_name: String,

    /// Allocated hours in the window
    pub allocated_hours: f64,

    /// Allocated hours as a percentage of the window's 40h/week capacity
    pub percent_of_capacity: f64,
}

/// Capacity and utilization for a user over a date range
#[derive(Debug, Clone, Serialize)]
pub struct CapacityInfo {
    /// User id
    pub user_id: Uuid,

    /// User display name ("Unknown User" when unresolvable)
    pub user_name: String,

    /// Range start (inclusive)
    pub start_date: NaiveDate,

    /// Range end (inclusive)
    pub end_date: NaiveDate,

    /// Prorated capacity: (days / 7) × 40
    pub total_capacity_hours: f64,

    /// Allocated hours in range
    pub allocated_hours: f64,

    /// max(0, capacity − allocated)
    pub available_hours: f64,

    /// allocated / capacity (0 when capacity is 0)
    pub utilization: f64,

    /// True strictly above 110% utilization
    pub is_over_allocated: bool,
}

/// Candidate ranking entry for assignment suggestions
#[derive(Debug, Clone, Serialize)]
pub struct AssigneeSuggestion {
    /// Candidate user id
    pub user_id: Uuid,

    /// Candidate display name
    pub user_name: String,

    /// Utilization over the task's span
    pub utilization: f64,

    /// 1 − utilization
    pub availability: f64,

    /// 0.6 × availability + 0.4 × balance
    pub score: f64,
}

/// Current vs. projected workload for a would-be assignment
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentImpact {
    /// Candidate user id
    pub user_id: Uuid,

    /// Task being assigned
    pub task_id: Uuid,

    /// Allocated hours over the span today
    pub current_allocated_hours: f64,

    /// Allocated hours if the task's estimate lands on the user
    pub projected_allocated_hours: f64,

    /// Prorated capacity over the span
    pub capacity_hours: f64,

    /// Utilization today
    pub current_utilization: f64,

    /// Utilization after assignment
    pub projected_utilization: f64,

    /// True when projected utilization exceeds 110% of capacity
    pub is_over_allocated: bool,
}

/// Options controlling `assign_with_allocation`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssignmentOptions {
    /// Distribution strategy (defaults to Even)
    pub strategy: Option<DistributionStrategy>,

    /// Per-day hours for the Custom strategy
    pub custom_distribution: Option<Vec<f64>>,

    /// Whether to synthesize workload entries over the task's span
    #[serde(default)]
    pub auto_allocate: bool,
}

/// Result of an assignment with optional auto-allocation
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentResult {
    /// The reassigned task
    pub task: Task,

    /// Workload entries created by auto-allocation (empty when skipped)
    pub entries: Vec<WorkloadEntry>,
}

/// Workload engine service
pub struct WorkloadEngine {
    db: PgPool,
}

impl WorkloadEngine {
    /// Creates a new workload engine
    pub fn new(db: PgPool) -> Self {
        WorkloadEngine { db }
    }

    /// Summarizes a user's workload over a date range, grouped by project
    ///
    /// An unresolvable user yields a zeroed summary, not an error.
    pub async fn summarize_user(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<UserWorkloadSummary> {
        let user_name = match User::find_by_id(&self.db, user_id).await {
            Ok(Some(user)) => user.name,
            Ok(None) => {
                warn!(user_id = %user_id, "Summarizing workload for unknown user");
                return Ok(UserWorkloadSummary {
                    user_id,
                    user_name: UNKNOWN_USER.to_string(),
                    start_date: start,
                    end_date: end,
                    total_allocated_hours: 0.0,
                    total_actual_hours: 0.0,
                    projects: Vec::new(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let rows = WorkloadEntry::sum_by_project(&self.db, user_id, start, end).await?;

        let mut projects = Vec::with_capacity(rows.len());
        let mut total_allocated = 0.0;
        let mut total_actual = 0.0;

        for row in rows {
            total_allocated += row.allocated_hours;
            total_actual += row.actual_hours;

            let project_name = match Project::find_by_id(&self.db, row.project_id).await {
                Ok(Some(project)) => project.name,
                Ok(None) => {
                    warn!(project_id = %row.project_id, "Workload references missing project");
                    UNKNOWN_PROJECT.to_string()
                }
                Err(e) => {
                    warn!(project_id = %row.project_id, error = %e, "Failed to resolve project name");
                    UNKNOWN_PROJECT.to_string()
                }
            };

            projects.push(ProjectAllocation {
                project_id: row.project_id,
                project_name,
                allocated_hours: row.allocated_hours,
                actual_hours: row.actual_hours,
            });
        }

        Ok(UserWorkloadSummary {
            user_id,
            user_name,
            start_date: start,
            end_date: end,
            total_allocated_hours: total_allocated,
            total_actual_hours: total_actual,
            projects,
        })
    }

    /// Summarizes a project's workload over a date range, grouped by user
    pub async fn summarize_team(
        &self,
        project_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<TeamWorkloadSummary> {
        let rows = WorkloadEntry::sum_by_user(&self.db, project_id, start, end).await?;

        let mut members = Vec::with_capacity(rows.len());
        let mut total_allocated = 0.0;

        for row in rows {
            total_allocated += row.allocated_hours;

            let user_name = match User::find_by_id(&self.db, row.user_id).await {
                Ok(Some(user)) => user.name,
                Ok(None) => {
                    warn!(user_id = %row.user_id, "Workload references missing user");
                    UNKNOWN_USER.to_string()
                }
                Err(e) => {
                    warn!(user_id = %row.user_id, error = %e, "Failed to resolve member name");
                    UNKNOWN_USER.to_string()
                }
            };

            members.push(MemberAllocation {
                user_id: row.user_id,
                user_name,
                allocated_hours: row.allocated_hours,
                actual_hours: row.actual_hours,
            });
        }

        Ok(TeamWorkloadSummary {
            project_id,
            start_date: start,
            end_date: end,
            total_allocated_hours: total_allocated,
            members,
        })
    }

    /// Upserts a workload entry, defaulting to a full 8-hour day
    pub async fn allocate(&self, data: AllocateWorkload) -> StoreResult<WorkloadEntry> {
        let hours = data.allocated_hours.unwrap_or(DEFAULT_DAILY_HOURS);

        Ok(WorkloadEntry::upsert(&self.db, data, hours).await?)
    }

    /// Rolling 30-day per-project load as a percentage of capacity
    pub async fn distribution(&self, user_id: Uuid) -> StoreResult<Vec<ProjectDistribution>> {
        let end = Utc::now().date_naive();
        let start = end - Duration::days(DISTRIBUTION_WINDOW_DAYS - 1);
        let window_capacity = capacity::capacity_for_days(DISTRIBUTION_WINDOW_DAYS);

        let rows = WorkloadEntry::sum_by_project(&self.db, user_id, start, end).await?;

        let mut distribution = Vec::with_capacity(rows.len());

        for row in rows {
            let project_name = match Project::find_by_id(&self.db, row.project_id).await {
                Ok(Some(project)) => project.name,
                _ => UNKNOWN_PROJECT.to_string(),
            };

            distribution.push(ProjectDistribution {
                project_id: row.project_id,
                project_name,
                allocated_hours: row.allocated_hours,
                percent_of_capacity: row.allocated_hours / window_capacity * 100.0,
            });
        }

        Ok(distribution)
    }

    /// Capacity and utilization over a date range
    ///
    /// An unresolvable user yields a zero-filled "Unknown User" record, not
    /// an error.
    pub async fn capacity_info(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<CapacityInfo> {
        let user_name = match User::find_by_id(&self.db, user_id).await {
            Ok(Some(user)) => user.name,
            Ok(None) => {
                warn!(user_id = %user_id, "Capacity lookup for unknown user");
                return Ok(CapacityInfo {
                    user_id,
                    user_name: UNKNOWN_USER.to_string(),
                    start_date: start,
                    end_date: end,
                    total_capacity_hours: 0.0,
                    allocated_hours: 0.0,
                    available_hours: 0.0,
                    utilization: 0.0,
                    is_over_allocated: false,
                });
            }
            Err(e) => return Err(e.into()),
        };

        let capacity_hours = capacity::capacity_for_days(capacity::span_days(start, end));
        let allocated = WorkloadEntry::total_allocated(&self.db, user_id, start, end).await?;
        let utilization = capacity::utilization(allocated, capacity_hours);

        Ok(CapacityInfo {
            user_id,
            user_name,
            start_date: start,
            end_date: end,
            total_capacity_hours: capacity_hours,
            allocated_hours: allocated,
            available_hours: (capacity_hours - allocated).max(0.0),
            utilization,
            is_over_allocated: capacity::is_over_allocated(utilization),
        })
    }

    /// Reassigns a task and optionally spreads its estimate over its span
    ///
    /// Auto-allocation runs only when the task carries an estimate and a
    /// complete schedule; it writes one entry per calendar day, split by the
    /// chosen strategy.
    pub async fn assign_with_allocation(
        &self,
        task_id: Uuid,
        assignee_id: Uuid,
        requester_id: Uuid,
        options: AssignmentOptions,
    ) -> StoreResult<AssignmentResult> {
        // Access is the task store's call, not ours.
        tasks::get(&self.db, task_id, requester_id).await?;

        let task = Task::update_assignee(&self.db, task_id, Some(assignee_id))
            .await?
            .ok_or(crate::error::StoreError::NotFound("Task"))?;

        let mut entries = Vec::new();

        if options.auto_allocate {
            if let (Some(estimated), Some(start), Some(end)) =
                (task.estimated_hours, task.start_date, task.end_date)
            {
                let days = capacity::span_days(start, end);

                if days > 0 {
                    let strategy = options.strategy.unwrap_or(DistributionStrategy::Even);
                    let per_day = distribute_hours(
                        estimated,
                        days as usize,
                        strategy,
                        options.custom_distribution.as_deref(),
                    );

                    for (offset, hours) in per_day.into_iter().enumerate() {
                        let entry = self
                            .allocate(AllocateWorkload {
                                user_id: assignee_id,
                                project_id: task.project_id,
                                task_id: task.id,
                                entry_date: start + Duration::days(offset as i64),
                                allocated_hours: Some(hours),
                                actual_hours: None,
                            })
                            .await?;

                        entries.push(entry);
                    }

                    info!(
                        task_id = %task.id,
                        assignee_id = %assignee_id,
                        strategy = strategy.as_str(),
                        days = days,
                        "Auto-allocated task estimate across span"
                    );
                }
            }
        }

        Ok(AssignmentResult { task, entries })
    }

    /// Ranks candidate assignees for a task by capacity over its span
    ///
    /// Falls back to a neutral-score list (sorted by name) when the task
    /// lacks a complete schedule.
    pub async fn suggest_assignees(
        &self,
        task_id: Uuid,
        requester_id: Uuid,
        candidate_ids: &[Uuid],
    ) -> StoreResult<Vec<AssigneeSuggestion>> {
        let task = tasks::get(&self.db, task_id, requester_id).await?;

        let span = match (task.start_date, task.end_date) {
            (Some(start), Some(end)) if end >= start => Some((start, end)),
            _ => None,
        };

        let mut suggestions = Vec::with_capacity(candidate_ids.len());

        for &user_id in candidate_ids {
            let user_name = match User::find_by_id(&self.db, user_id).await {
                Ok(Some(user)) => user.name,
                Ok(None) => {
                    warn!(user_id = %user_id, "Suggestion candidate not found");
                    UNKNOWN_USER.to_string()
                }
                Err(e) => {
                    warn!(user_id = %user_id, error = %e, "Failed to resolve candidate");
                    UNKNOWN_USER.to_string()
                }
            };

            let suggestion = match span {
                Some((start, end)) => {
                    let capacity_hours =
                        capacity::capacity_for_days(capacity::span_days(start, end));
                    let allocated =
                        WorkloadEntry::total_allocated(&self.db, user_id, start, end).await?;
                    let utilization = capacity::utilization(allocated, capacity_hours);

                    AssigneeSuggestion {
                        user_id,
                        user_name,
                        utilization,
                        availability: capacity::availability(utilization),
                        score: capacity::recommendation_score(utilization),
                    }
                }
                // No schedule to score against: everyone is a neutral 0.5.
                None => AssigneeSuggestion {
                    user_id,
                    user_name,
                    utilization: 0.0,
                    availability: 0.5,
                    score: 0.5,
                },
            };

            suggestions.push(suggestion);
        }

        if span.is_some() {
            suggestions.sort_by(|a, b| {
                b.score
                    .partial_cmp(&a.score)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| a.user_name.cmp(&b.user_name))
            });
        } else {
            suggestions.sort_by(|a, b| a.user_name.cmp(&b.user_name));
        }

        Ok(suggestions)
    }

    /// Previews the workload impact of assigning a task to a user
    ///
    /// Zeroed when the task lacks an estimate or a complete schedule.
    pub async fn preview_impact(
        &self,
        task_id: Uuid,
        assignee_id: Uuid,
        requester_id: Uuid,
    ) -> StoreResult<AssignmentImpact> {
        let task = tasks::get(&self.db, task_id, requester_id).await?;

        let (estimated, start, end) = match (task.estimated_hours, task.start_date, task.end_date)
        {
            (Some(estimated), Some(start), Some(end)) if end >= start => (estimated, start, end),
            _ => {
                return Ok(AssignmentImpact {
                    user_id: assignee_id,
                    task_id,
                    current_allocated_hours: 0.0,
                    projected_allocated_hours: 0.0,
                    capacity_hours: 0.0,
                    current_utilization: 0.0,
                    projected_utilization: 0.0,
                    is_over_allocated: false,
                });
            }
        };

        let capacity_hours = capacity::capacity_for_days(capacity::span_days(start, end));
        let current = WorkloadEntry::total_allocated(&self.db, assignee_id, start, end).await?;
        let projected = current + estimated;

        let current_utilization = capacity::utilization(current, capacity_hours);
        let projected_utilization = capacity::utilization(projected, capacity_hours);

        Ok(AssignmentImpact {
            user_id: assignee_id,
            task_id,
            current_allocated_hours: current,
            projected_allocated_hours: projected,
            capacity_hours,
            current_utilization,
            projected_utilization,
            is_over_allocated: capacity::is_over_allocated(projected_utilization),
        })
    }
}
