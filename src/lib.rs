//! Study planner calendar dashboard.
//!
//! A headless core ([`application::dashboard::CalendarDashboard`]) keeps a
//! date-keyed task index in step with a remote task store and renders a
//! 42-cell month grid through a [`application::view::DashboardView`]. The
//! `studyplan` binary drives it from the terminal.

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;

#[cfg(test)]
mod test_support;
