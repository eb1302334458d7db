mod sheets;
mod tasks;

pub(super) use sheets::{
    create_sheet, delete_sheet, get_sheet, list_sheets, sheet_consistency, update_sheet,
};
pub(super) use tasks::{create_task, delete_task, get_task, list_tasks, update_task};
