pub mod calendar_grid;
pub mod models;
pub mod task_index;
