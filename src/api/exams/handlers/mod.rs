mod answers;
mod exams;
mod tasks;

pub(super) use answers::{create_answer, delete_answer, get_answer, list_answers, update_answer};
pub(super) use exams::{delete_exam, exam_consistency, get_exam, list_exams, start_exam};
pub(super) use tasks::{
    get_exam_task, list_exam_tasks, reject_exam_task_item_write, reject_exam_task_write,
};
