pub mod calendar;
pub mod day_view;
pub mod models;
pub mod reorder;
pub mod text;
