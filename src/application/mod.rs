pub mod bootstrap;
pub mod commands;
pub mod persistence;
pub mod planner;
pub mod rollover;
