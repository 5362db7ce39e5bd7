//! Application services.
//!
//! Each service depends only on the domain ports, so the whole pipeline runs
//! against in-memory fakes in tests.

pub mod achievement_classifier;
pub mod activity_paginator;
pub mod aggregation;
pub mod identity_resolver;
pub mod member_sync;
pub mod role_reconciler;
pub mod scheduler;

pub use achievement_classifier::AchievementClassifier;
pub use activity_paginator::{ActivityPages, ActivityPaginator, PaginationOutcome};
pub use aggregation::AggregationEngine;
pub use identity_resolver::IdentityResolver;
pub use member_sync::{MemberOutcome, MemberSyncService};
pub use role_reconciler::{merge_decisions, ReconcileReport, RoleReconciler};
pub use scheduler::{PassReport, ReconciliationScheduler, SchedulerHandle, SchedulerStatus};
