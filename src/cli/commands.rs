use crate::domain::models::parse_due_date;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "studyplan",
    about = concat!("studyplan v", env!("CARGO_PKG_VERSION"), " - study planner calendar dashboard"),
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace holding config/ and logs/ (defaults to the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub workspace: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the month grid with task markers
    Month(MonthArgs),
    /// List the tasks due on a date
    Day(DayArgs),
    /// Create a task
    Add(AddArgs),
    /// Mark a task completed
    Complete(TaskIdArgs),
    /// Delete a task
    Delete(TaskIdArgs),
    /// Show level, XP, streak and badge
    Profile,
    /// Stream motivational messages until Ctrl-C
    Watch,
}

#[derive(Debug, Args)]
pub struct MonthArgs {
    #[arg(long, requires = "month")]
    pub year: Option<i32>,

    #[arg(long, requires = "year", value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,
}

#[derive(Debug, Args)]
pub struct DayArgs {
    /// Date as YYYY-MM-DD
    #[arg(value_parser = parse_due_date)]
    pub date: NaiveDate,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    #[arg(long)]
    pub title: String,

    #[arg(long)]
    pub description: Option<String>,

    /// Due date as YYYY-MM-DD
    #[arg(long)]
    pub due: String,
}

#[derive(Debug, Args)]
pub struct TaskIdArgs {
    pub id: String,
}
