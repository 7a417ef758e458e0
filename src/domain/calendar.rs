use crate::domain::models::DayOfWeek;
use chrono::{Datelike, Duration, Local, NaiveDateTime};
use std::sync::Arc;

pub type NowProvider = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

pub fn system_now_provider() -> NowProvider {
    Arc::new(|| Local::now().naive_local())
}

#[derive(Clone)]
pub struct Calendar {
    now_provider: NowProvider,
}

impl Default for Calendar {
    fn default() -> Self {
        Self::new(system_now_provider())
    }
}

impl std::fmt::Debug for Calendar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Calendar").field("now", &self.now()).finish()
    }
}

impl Calendar {
    pub fn new(now_provider: NowProvider) -> Self {
        Self { now_provider }
    }

    pub fn now(&self) -> NaiveDateTime {
        (self.now_provider)()
    }

    pub fn current_day(&self) -> DayOfWeek {
        self.now().weekday().into()
    }

    pub fn current_date(&self) -> String {
        format_date(self.now())
    }

    pub fn yesterday(&self) -> DayOfWeek {
        (self.now() - Duration::days(1)).weekday().into()
    }

    pub fn now_millis(&self) -> i64 {
        self.now().and_utc().timestamp_millis()
    }
}

/// `YYYY-M-D` without zero padding.
pub fn format_date(value: NaiveDateTime) -> String {
    format!("{}-{}-{}", value.year(), value.month(), value.day())
}
