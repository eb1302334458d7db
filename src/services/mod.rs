pub(crate) mod aggregates;
pub(crate) mod authorization;
pub(crate) mod errors;
pub(crate) mod grading;
