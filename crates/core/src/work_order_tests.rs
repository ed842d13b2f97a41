// SPDX-License-Identifier: MIT

use super::*;

fn src() -> WorkspaceSource {
    WorkspaceSource::Local { path: "/tmp/ws".into() }
}

#[test]
fn rejects_short_prompt() {
    let err = WorkOrder::new(
        "too short",
        src(),
        "default",
        3,
        3600,
        "inline",
        crate::policy::SecurityPolicy::default(),
        Utc::now(),
    )
    .unwrap_err();
    assert!(matches!(err, WorkOrderValidationError::PromptTooShort(_)));
}

#[test]
fn rejects_out_of_range_iterations() {
    let err = WorkOrder::new(
        "a sufficiently long prompt",
        src(),
        "default",
        0,
        3600,
        "inline",
        crate::policy::SecurityPolicy::default(),
        Utc::now(),
    )
    .unwrap_err();
    assert!(matches!(err, WorkOrderValidationError::MaxIterationsOutOfRange(0)));
}

#[test]
fn rejects_out_of_range_wall_clock() {
    let err = WorkOrder::new(
        "a sufficiently long prompt",
        src(),
        "default",
        3,
        30,
        "inline",
        crate::policy::SecurityPolicy::default(),
        Utc::now(),
    )
    .unwrap_err();
    assert!(matches!(err, WorkOrderValidationError::MaxWallClockOutOfRange(30)));
}

#[test]
fn accepts_valid_order_and_starts_queued() {
    let wo = WorkOrder::new(
        "a sufficiently long prompt",
        src(),
        "default",
        3,
        3600,
        "inline",
        crate::policy::SecurityPolicy::default(),
        Utc::now(),
    )
    .unwrap();
    assert_eq!(wo.status, WorkOrderStatus::Queued);
    assert!(wo.completed_at.is_none());
}

#[test]
fn status_advances_monotonically() {
    let mut wo = WorkOrder::new(
        "a sufficiently long prompt",
        src(),
        "default",
        3,
        3600,
        "inline",
        crate::policy::SecurityPolicy::default(),
        Utc::now(),
    )
    .unwrap();
    wo.advance_status(WorkOrderStatus::Running, Utc::now()).unwrap();
    wo.advance_status(WorkOrderStatus::Succeeded, Utc::now()).unwrap();
    assert!(wo.completed_at.is_some());
}

#[test]
fn terminal_status_is_permanent() {
    let mut wo = WorkOrder::new(
        "a sufficiently long prompt",
        src(),
        "default",
        3,
        3600,
        "inline",
        crate::policy::SecurityPolicy::default(),
        Utc::now(),
    )
    .unwrap();
    wo.advance_status(WorkOrderStatus::Running, Utc::now()).unwrap();
    wo.advance_status(WorkOrderStatus::Failed, Utc::now()).unwrap();
    let err = wo.advance_status(WorkOrderStatus::Running, Utc::now()).unwrap_err();
    assert!(matches!(err, WorkOrderValidationError::IllegalStatusAdvance { .. }));
}
