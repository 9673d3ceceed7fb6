pub mod bootstrap;
pub mod dashboard;
pub mod motivation_poller;
pub mod view;
