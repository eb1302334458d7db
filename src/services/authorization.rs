//! Ownership-chain authorization.
//!
//! Every read or write is decided here from the acting user and the already
//! resolved owners of the target (see `repositories::ownership`). Decisions are
//! plain values: a route-level ownership mismatch is a [`Decision::Deny`]
//! (403), while a bad payload behind an allowed route is a
//! [`Decision::Invalid`] (400). Handlers must run [`authorize`] before any
//! payload check so that an outsider never learns more than "forbidden".

use crate::db::models::User;
use crate::services::errors::{FieldErrors, GradingError};

pub(crate) const FORBIDDEN: &str = "You do not have permission to perform this action.";

#[derive(Debug, Clone, Copy)]
pub(crate) struct Actor<'a> {
    pub(crate) id: &'a str,
    pub(crate) is_examinator: bool,
}

impl<'a> From<&'a User> for Actor<'a> {
    fn from(user: &'a User) -> Self {
        Self { id: &user.id, is_examinator: user.is_examinator }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operation {
    List,
    Retrieve,
    Create,
    Update,
    Delete,
    /// Setting the awarded points of an answer.
    Grade,
}

impl Operation {
    pub(crate) fn is_read(self) -> bool {
        matches!(self, Self::List | Self::Retrieve)
    }
}

/// The target of an operation with its ownership chain resolved to user ids.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Target<'a> {
    /// `/exam-sheets` itself.
    SheetCollection,
    ExamSheet { owner_id: &'a str },
    /// Tasks reached through `/exam-sheets/{id}/tasks`.
    SheetTask { sheet_owner_id: &'a str },
    /// `/exams` itself.
    ExamCollection,
    Exam { candidate_id: &'a str, sheet_owner_id: &'a str },
    /// Tasks reached through `/exams/{id}/tasks`.
    ExamTask { candidate_id: &'a str },
    Answer { candidate_id: &'a str, sheet_owner_id: &'a str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Decision {
    Allow,
    Deny(&'static str),
    Invalid(FieldErrors),
}

impl Decision {
    fn allow_if(condition: bool) -> Self {
        if condition {
            Self::Allow
        } else {
            Self::Deny(FORBIDDEN)
        }
    }

    pub(crate) fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    pub(crate) fn into_result(self) -> Result<(), GradingError> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny(reason) => Err(GradingError::Denied(reason)),
            Self::Invalid(errors) => Err(GradingError::Invalid(errors)),
        }
    }
}

pub(crate) fn authorize(actor: Actor<'_>, operation: Operation, target: Target<'_>) -> Decision {
    let is = |user_id: &str| actor.id == user_id;

    match target {
        Target::SheetCollection => Decision::allow_if(
            actor.is_examinator && matches!(operation, Operation::List | Operation::Create),
        ),
        Target::ExamSheet { owner_id } => Decision::allow_if(
            actor.is_examinator && is(owner_id) && operation != Operation::Grade,
        ),
        Target::SheetTask { sheet_owner_id } => Decision::allow_if(
            actor.is_examinator && is(sheet_owner_id) && operation != Operation::Grade,
        ),
        Target::ExamCollection => match operation {
            Operation::List => Decision::Allow,
            Operation::Create => Decision::allow_if(!actor.is_examinator),
            _ => Decision::Deny(FORBIDDEN),
        },
        Target::Exam { candidate_id, sheet_owner_id } => match operation {
            Operation::List | Operation::Retrieve => {
                Decision::allow_if(is(candidate_id) || is(sheet_owner_id))
            }
            Operation::Delete => Decision::allow_if(is(sheet_owner_id)),
            _ => Decision::Deny(FORBIDDEN),
        },
        // Read-only mirror of the sheet's tasks; authoring happens on the
        // sheet route only.
        Target::ExamTask { candidate_id } => {
            Decision::allow_if(operation.is_read() && is(candidate_id))
        }
        Target::Answer { candidate_id, sheet_owner_id } => match operation {
            Operation::List | Operation::Retrieve => {
                Decision::allow_if(is(candidate_id) || is(sheet_owner_id))
            }
            Operation::Create | Operation::Update | Operation::Delete => {
                Decision::allow_if(is(candidate_id))
            }
            Operation::Grade => Decision::allow_if(is(sheet_owner_id)),
        },
    }
}

/// A task payload may name its sheet, but only the sheet of the route it was
/// sent to. Anything else is a malformed reference rather than a permission
/// problem, because the route-level ownership check already passed.
pub(crate) fn check_task_sheet_reference(
    route_sheet_id: &str,
    submitted_sheet_id: Option<&str>,
) -> Decision {
    match submitted_sheet_id {
        None => Decision::Allow,
        Some(submitted) if submitted == route_sheet_id => Decision::Allow,
        Some(_) => Decision::Invalid(FieldErrors::single(
            "exam_sheet",
            "Invalid exam sheet reference: it must be the exam sheet addressed by this route.",
        )),
    }
}

/// An answer can only answer a task of the sheet its exam instantiates.
pub(crate) fn check_answer_task_reference(
    exam_sheet_id: &str,
    task_sheet_id: Option<&str>,
) -> Decision {
    match task_sheet_id {
        Some(sheet_id) if sheet_id == exam_sheet_id => Decision::Allow,
        _ => Decision::Invalid(FieldErrors::single(
            "task",
            "Invalid task reference: the task does not belong to this exam's sheet.",
        )),
    }
}

pub(crate) fn check_assigned_points(assigned_points: i32, task_max_points: i32) -> Decision {
    if assigned_points < 0 {
        return Decision::Invalid(FieldErrors::single(
            "assigned_points",
            "Ensure this value is greater than or equal to 0.",
        ));
    }
    if assigned_points > task_max_points {
        return Decision::Invalid(FieldErrors::single(
            "assigned_points",
            format!("Ensure this value is less than or equal to {task_max_points}."),
        ));
    }
    Decision::Allow
}

/// Lowering a task's maximum below points already awarded on it would leave
/// answers violating their own bound.
pub(crate) fn check_task_max_points_floor(
    new_max_points: i32,
    highest_assigned: Option<i32>,
) -> Decision {
    match highest_assigned {
        Some(highest) if new_max_points < highest => Decision::Invalid(FieldErrors::single(
            "max_points",
            format!("Ensure this value is at least {highest}; answers already hold that many points."),
        )),
        _ => Decision::Allow,
    }
}
