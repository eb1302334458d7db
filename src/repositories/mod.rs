pub(crate) mod answers;
pub(crate) mod exam_sheets;
pub(crate) mod exams;
pub(crate) mod health;
pub(crate) mod ownership;
pub(crate) mod tasks;
pub(crate) mod users;
