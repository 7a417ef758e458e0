use crate::domain::text::to_title_case;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("unknown task type: {0}")]
    UnknownTaskKind(String),
    #[error("unknown day of week: {0}")]
    UnknownDay(String),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
            Self::Sunday => "Sunday",
        }
    }

    pub fn next(self) -> Self {
        let index = Self::ALL
            .iter()
            .position(|candidate| *candidate == self)
            .unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    pub fn is_weekend(self) -> bool {
        matches!(self, Self::Saturday | Self::Sunday)
    }
}

impl From<chrono::Weekday> for DayOfWeek {
    fn from(weekday: chrono::Weekday) -> Self {
        match weekday {
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
            chrono::Weekday::Sun => Self::Sunday,
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayOfWeek {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "monday" | "mon" => Ok(Self::Monday),
            "tuesday" | "tue" => Ok(Self::Tuesday),
            "wednesday" | "wed" => Ok(Self::Wednesday),
            "thursday" | "thu" => Ok(Self::Thursday),
            "friday" | "fri" => Ok(Self::Friday),
            "saturday" | "sat" => Ok(Self::Saturday),
            "sunday" | "sun" => Ok(Self::Sunday),
            _ => Err(DomainError::UnknownDay(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Daily,
    Weekly,
    Media,
    Custom,
}

impl TaskKind {
    pub const ALL: [TaskKind; 4] = [
        TaskKind::Daily,
        TaskKind::Weekly,
        TaskKind::Media,
        TaskKind::Custom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Media => "media",
            Self::Custom => "custom",
        }
    }

    pub fn id_prefix(self) -> char {
        match self {
            Self::Daily => 'd',
            Self::Weekly => 'w',
            Self::Media => 'm',
            Self::Custom => 'c',
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "media" => Ok(Self::Media),
            "custom" => Ok(Self::Custom),
            _ => Err(DomainError::UnknownTaskKind(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<DayOfWeek>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_weekends: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl Task {
    pub fn qualifies_for(&self, day: DayOfWeek) -> bool {
        match self.kind {
            TaskKind::Daily => !(self.skip_weekends.unwrap_or(false) && day.is_weekend()),
            TaskKind::Weekly | TaskKind::Media => self.day == Some(day),
            TaskKind::Custom => self.day == Some(day) && !self.completed,
        }
    }

    pub fn completed_entry(&self) -> CompletedEntry {
        CompletedEntry {
            id: self.id.clone(),
            text: self.text.clone(),
            kind: self.kind,
        }
    }

    pub fn validate(&self, expected: TaskKind) -> Result<(), String> {
        validate_non_empty(&self.id, "task.id")?;
        if self.kind != expected {
            return Err(format!(
                "task {} has type {} but is stored with {} tasks",
                self.id, self.kind, expected
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletedEntry {
    pub id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: TaskKind,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct CompletedLog {
    days: BTreeMap<DayOfWeek, Vec<CompletedEntry>>,
}

impl CompletedLog {
    pub fn entries(&self, day: DayOfWeek) -> &[CompletedEntry] {
        self.days.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_day(&self, day: DayOfWeek) -> bool {
        self.days.contains_key(&day)
    }

    pub fn append(&mut self, day: DayOfWeek, entry: CompletedEntry) {
        self.days.entry(day).or_default().push(entry);
    }

    pub fn clear(&mut self, day: DayOfWeek) -> bool {
        self.days.remove(&day).is_some()
    }

    pub fn completed_ids(&self, day: DayOfWeek) -> HashSet<&str> {
        self.entries(day)
            .iter()
            .map(|entry| entry.id.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reminder {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ThemePreference {
    #[default]
    Dark,
    Light,
}

impl ThemePreference {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn parse_stored(raw: &str) -> Option<Self> {
        if let Ok(parsed) = serde_json::from_str::<ThemePreference>(raw) {
            return Some(parsed);
        }
        match raw.trim() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskCollections {
    pub daily: Vec<Task>,
    pub weekly: Vec<Task>,
    pub media: Vec<Task>,
    pub custom: Vec<Task>,
}

impl TaskCollections {
    pub fn with_defaults() -> Self {
        Self {
            daily: default_daily_tasks(),
            weekly: default_weekly_tasks(),
            media: default_media_tasks(),
            custom: Vec::new(),
        }
    }

    pub fn get(&self, kind: TaskKind) -> &[Task] {
        match kind {
            TaskKind::Daily => &self.daily,
            TaskKind::Weekly => &self.weekly,
            TaskKind::Media => &self.media,
            TaskKind::Custom => &self.custom,
        }
    }

    pub fn get_mut(&mut self, kind: TaskKind) -> &mut Vec<Task> {
        match kind {
            TaskKind::Daily => &mut self.daily,
            TaskKind::Weekly => &mut self.weekly,
            TaskKind::Media => &mut self.media,
            TaskKind::Custom => &mut self.custom,
        }
    }
}

fn builtin(id: &str, text: &str, kind: TaskKind, day: Option<DayOfWeek>) -> Task {
    Task {
        id: id.to_string(),
        text: to_title_case(text),
        completed: false,
        kind,
        day,
        skip_weekends: None,
        date: None,
    }
}

pub fn default_daily_tasks() -> Vec<Task> {
    let mut tasks = [
        "Coffee",
        "Shower",
        "Pack Lunch",
        "Work",
        "LUNCH",
        "Walk Mel",
        "STUDY",
        "Prepare lunch",
        "READ",
        "PRACTICE 30 MIN",
        "WORKOUT",
    ]
    .iter()
    .enumerate()
    .map(|(index, text)| builtin(&format!("daily_{}", index + 1), text, TaskKind::Daily, None))
    .collect::<Vec<_>>();
    tasks[3].skip_weekends = Some(true);
    tasks
}

pub fn default_weekly_tasks() -> Vec<Task> {
    vec![
        builtin("weekly_1", "Clean room", TaskKind::Weekly, Some(DayOfWeek::Sunday)),
        builtin("weekly_2", "Shave", TaskKind::Weekly, Some(DayOfWeek::Sunday)),
    ]
}

pub fn default_media_tasks() -> Vec<Task> {
    [
        ("Family Guy Ep", DayOfWeek::Monday),
        ("The Studio Ep", DayOfWeek::Wednesday),
        ("Windbreaker Ep", DayOfWeek::Thursday),
        ("Rock is a Modesty Ep", DayOfWeek::Thursday),
        ("Fire Force Ep", DayOfWeek::Friday),
        ("Lazarus Ep", DayOfWeek::Sunday),
        ("TLOU Ep", DayOfWeek::Sunday),
    ]
    .iter()
    .enumerate()
    .map(|(index, (text, day))| {
        builtin(&format!("media_{}", index + 1), text, TaskKind::Media, Some(*day))
    })
    .collect()
}

fn validate_non_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field_name} must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_custom(id: &str, day: DayOfWeek) -> Task {
        Task {
            id: id.to_string(),
            text: "Call Mom".to_string(),
            completed: false,
            kind: TaskKind::Custom,
            day: Some(day),
            skip_weekends: None,
            date: Some("2026-2-16".to_string()),
        }
    }

    #[test]
    fn next_day_wraps_sunday_to_monday() {
        assert_eq!(DayOfWeek::Monday.next(), DayOfWeek::Tuesday);
        assert_eq!(DayOfWeek::Sunday.next(), DayOfWeek::Monday);
    }

    #[test]
    fn weekend_covers_saturday_and_sunday_only() {
        let weekend = DayOfWeek::ALL
            .iter()
            .filter(|day| day.is_weekend())
            .copied()
            .collect::<Vec<_>>();
        assert_eq!(weekend, vec![DayOfWeek::Saturday, DayOfWeek::Sunday]);
    }

    #[test]
    fn parse_day_and_kind_accept_loose_input() {
        assert_eq!(" tuesday ".parse::<DayOfWeek>(), Ok(DayOfWeek::Tuesday));
        assert_eq!("SAT".parse::<DayOfWeek>(), Ok(DayOfWeek::Saturday));
        assert_eq!("Media".parse::<TaskKind>(), Ok(TaskKind::Media));
        assert!(matches!(
            "someday".parse::<DayOfWeek>(),
            Err(DomainError::UnknownDay(_))
        ));
        assert!(matches!(
            "chores".parse::<TaskKind>(),
            Err(DomainError::UnknownTaskKind(_))
        ));
    }

    #[test]
    fn task_uses_stored_field_names() {
        let mut task = default_daily_tasks()[3].clone();
        task.completed = false;
        let value = serde_json::to_value(&task).expect("serialize task");
        assert_eq!(
            value,
            serde_json::json!({
                "id": "daily_4",
                "text": "Work",
                "completed": false,
                "type": "daily",
                "skipWeekends": true
            })
        );

        let custom: Task = serde_json::from_str(
            r#"{"id":"c1","text":"Call Mom","type":"custom","day":"Friday","date":"2026-2-20"}"#,
        )
        .expect("deserialize custom task");
        assert_eq!(custom.day, Some(DayOfWeek::Friday));
        assert!(!custom.completed);
    }

    #[test]
    fn completed_log_keys_by_weekday_name() {
        let mut log = CompletedLog::default();
        log.append(DayOfWeek::Monday, sample_custom("c1", DayOfWeek::Monday).completed_entry());
        let value = serde_json::to_value(&log).expect("serialize log");
        assert_eq!(
            value,
            serde_json::json!({"Monday": [{"id": "c1", "text": "Call Mom", "type": "custom"}]})
        );

        let parsed: CompletedLog = serde_json::from_value(value).expect("deserialize log");
        assert_eq!(parsed, log);
        assert!(parsed.completed_ids(DayOfWeek::Monday).contains("c1"));
        assert!(parsed.entries(DayOfWeek::Tuesday).is_empty());
    }

    #[test]
    fn clear_reports_whether_day_existed() {
        let mut log = CompletedLog::default();
        assert!(!log.clear(DayOfWeek::Friday));
        log.append(DayOfWeek::Friday, sample_custom("c2", DayOfWeek::Friday).completed_entry());
        assert!(log.clear(DayOfWeek::Friday));
        assert!(!log.contains_day(DayOfWeek::Friday));
    }

    #[test]
    fn qualifies_for_applies_per_type_rules() {
        let work = default_daily_tasks()[3].clone();
        assert!(work.qualifies_for(DayOfWeek::Friday));
        assert!(!work.qualifies_for(DayOfWeek::Saturday));

        let mut custom = sample_custom("c3", DayOfWeek::Monday);
        assert!(custom.qualifies_for(DayOfWeek::Monday));
        assert!(!custom.qualifies_for(DayOfWeek::Tuesday));
        custom.completed = true;
        assert!(!custom.qualifies_for(DayOfWeek::Monday));
    }

    #[test]
    fn validate_rejects_mismatched_collection() {
        let task = sample_custom("c4", DayOfWeek::Monday);
        assert!(task.validate(TaskKind::Custom).is_ok());
        assert!(task.validate(TaskKind::Daily).is_err());
    }

    #[test]
    fn theme_parses_json_and_bare_word() {
        assert_eq!(ThemePreference::parse_stored("\"light\""), Some(ThemePreference::Light));
        assert_eq!(ThemePreference::parse_stored("dark"), Some(ThemePreference::Dark));
        assert_eq!(ThemePreference::parse_stored("sepia"), None);
        assert_eq!(ThemePreference::Dark.toggled(), ThemePreference::Light);
    }

    #[test]
    fn builtin_defaults_are_title_cased() {
        let media = default_media_tasks();
        assert_eq!(media.len(), 7);
        assert_eq!(media[3].text, "Rock Is A Modesty Ep");
        assert_eq!(media[6].text, "Tlou Ep");
        assert_eq!(default_daily_tasks()[9].text, "Practice 30 Min");
        assert_eq!(default_weekly_tasks()[0].day, Some(DayOfWeek::Sunday));
    }
}
