use chrono::{Datelike, Month, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

const TITLE_REQUIRED: &str = "Title is required";
const DUE_DATE_REQUIRED: &str = "Due date is required";
const DUE_DATE_INVALID: &str = "Due date must be a valid date (YYYY-MM-DD)";
const XP_PER_LEVEL: u32 = 100;

/// Server-assigned task identifier. The backend sends integers, but the
/// dashboard only ever compares ids for equality, so the value is kept opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawTaskId")]
pub struct TaskId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTaskId {
    Number(i64),
    Text(String),
}

impl From<RawTaskId> for TaskId {
    fn from(raw: RawTaskId) -> Self {
        match raw {
            RawTaskId::Number(value) => Self(value.to_string()),
            RawTaskId::Text(value) => Self(value.trim().to_string()),
        }
    }
}

impl TaskId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<i64> for TaskId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    Pending,
    Completed,
    Other(String),
}

impl TaskStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Other(value) => value,
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl From<String> for TaskStatus {
    fn from(value: String) -> Self {
        let normalized = value.trim();
        if normalized.eq_ignore_ascii_case("pending") {
            Self::Pending
        } else if normalized.eq_ignore_ascii_case("completed") {
            Self::Completed
        } else {
            Self::Other(normalized.to_string())
        }
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical `YYYY-MM-DD` key of a calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateKey(String);

impl DateKey {
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.format(DATE_KEY_FORMAT).to_string())
    }

    /// Normalizes a date-only value or a timestamp into the key of its calendar day.
    pub fn parse(raw: &str) -> Result<Self, String> {
        parse_due_date(raw).map(Self::from_date)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parses the date component of a due date, discarding any time-of-day.
pub fn parse_due_date(raw: &str) -> Result<NaiveDate, String> {
    let trimmed = raw.trim();
    let date_part = trimmed
        .split(['T', ' '])
        .next()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| "due date must not be empty".to_string())?;
    NaiveDate::parse_from_str(date_part, DATE_KEY_FORMAT)
        .map_err(|_| format!("invalid due date '{trimmed}', expected YYYY-MM-DD"))
}

mod due_date_format {
    use super::{parse_due_date, DATE_KEY_FORMAT};
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(DATE_KEY_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_due_date(&raw).map_err(serde::de::Error::custom)
    }
}

/// The backend stores a missing description as an empty string.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty()))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub description: Option<String>,
    #[serde(with = "due_date_format")]
    pub due_date: NaiveDate,
    #[serde(default)]
    pub status: TaskStatus,
}

impl Task {
    pub fn validate(&self) -> Result<(), String> {
        validate_non_empty(self.id.as_str(), "task.id")?;
        validate_non_empty(&self.title, "task.title")?;
        Ok(())
    }

    pub fn date_key(&self) -> DateKey {
        DateKey::from_date(self.due_date)
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Completion is offered only for tasks due today or earlier.
    pub fn can_complete_on(&self, today: NaiveDate) -> bool {
        !self.is_completed() && self.due_date <= today
    }
}

/// Task form exactly as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTaskForm {
    pub title: String,
    pub description: String,
    pub due_date: String,
}

impl NewTaskForm {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        due_date: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            due_date: due_date.into(),
        }
    }

    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            due_date: DateKey::from_date(date).as_str().to_string(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<CreateTaskRequest, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let title = self.title.trim();
        if title.is_empty() {
            errors.title = Some(TITLE_REQUIRED.to_string());
        }

        let due_date = self.due_date.trim();
        let parsed_due_date = if due_date.is_empty() {
            errors.due_date = Some(DUE_DATE_REQUIRED.to_string());
            None
        } else {
            match parse_due_date(due_date) {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.due_date = Some(DUE_DATE_INVALID.to_string());
                    None
                }
            }
        };

        match parsed_due_date {
            Some(due_date) if errors.is_empty() => Ok(CreateTaskRequest {
                title: title.to_string(),
                description: Some(self.description.trim())
                    .filter(|value| !value.is_empty())
                    .map(ToOwned::to_owned),
                due_date,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    pub title: Option<String>,
    pub due_date: Option<String>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.due_date.is_none()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages = [self.title.as_deref(), self.due_date.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>();
        f.write_str(&messages.join("; "))
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(with = "due_date_format")]
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GamificationSummary {
    pub level: u32,
    pub xp: u32,
    pub xp_for_next_level: u32,
    pub level_progress: f64,
    pub streak: u32,
    #[serde(default)]
    pub total_days_logged: u32,
}

impl GamificationSummary {
    /// Derives the level fields from raw XP, 100 XP per level.
    pub fn from_xp(xp: u32, streak: u32, total_days_logged: u32) -> Self {
        let per_level = u64::from(XP_PER_LEVEL);
        let level = u64::from(xp) / per_level + 1;
        let xp_for_next_level = level * per_level - u64::from(xp);
        Self {
            level: u32::try_from(level).unwrap_or(u32::MAX),
            xp,
            xp_for_next_level: u32::try_from(xp_for_next_level).unwrap_or(XP_PER_LEVEL),
            level_progress: f64::from(xp % XP_PER_LEVEL) * 100.0 / f64::from(XP_PER_LEVEL),
            streak,
            total_days_logged,
        }
    }

    pub fn progress_percent(&self) -> u8 {
        self.level_progress.clamp(0.0, 100.0).round() as u8
    }

    pub fn achievement(&self) -> Achievement {
        Achievement::classify(self.streak, self.level)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Achievement {
    StreakMaster,
    ConsistencyKing,
    WeekWarrior,
    EliteScholar,
    RisingStar,
    DedicatedLearner,
    Beginner,
}

impl Achievement {
    /// Streak thresholds win over level thresholds.
    pub fn classify(streak: u32, level: u32) -> Self {
        match (streak, level) {
            (30.., _) => Self::StreakMaster,
            (14.., _) => Self::ConsistencyKing,
            (7.., _) => Self::WeekWarrior,
            (_, 10..) => Self::EliteScholar,
            (_, 5..) => Self::RisingStar,
            (_, 3..) => Self::DedicatedLearner,
            _ => Self::Beginner,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::StreakMaster => "Streak Master",
            Self::ConsistencyKing => "Consistency King",
            Self::WeekWarrior => "Week Warrior",
            Self::EliteScholar => "Elite Scholar",
            Self::RisingStar => "Rising Star",
            Self::DedicatedLearner => "Dedicated Learner",
            Self::Beginner => "Beginner",
        }
    }
}

impl fmt::Display for Achievement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// English name of a month number; `None` outside 1..=12.
pub fn month_name(month: u32) -> Option<&'static str> {
    u8::try_from(month)
        .ok()
        .and_then(|month| Month::try_from(month).ok())
        .map(|month| month.name())
}

/// Long human form of a date, e.g. `April 1, 2024`.
pub fn format_long_date(date: NaiveDate) -> String {
    match month_name(date.month()) {
        Some(name) => format!("{name} {}, {}", date.day(), date.year()),
        None => date.format(DATE_KEY_FORMAT).to_string(),
    }
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
    use proptest::prelude::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    fn sample_task() -> Task {
        Task {
            id: TaskId::from(7),
            title: "Revise linear algebra".to_string(),
            description: Some("chapters 3-4".to_string()),
            due_date: date(2024, 3, 5),
            status: TaskStatus::Pending,
        }
    }

    #[test]
    fn date_key_strips_time_of_day() {
        let from_timestamp = DateKey::parse("2024-03-05T00:00:00Z").expect("timestamp key");
        let from_date = DateKey::parse("2024-03-05").expect("date key");
        assert_eq!(from_timestamp, from_date);
        assert_eq!(from_date.as_str(), "2024-03-05");
        assert_eq!(
            DateKey::parse("2024-03-05T23:59:59+09:00").expect("offset key").as_str(),
            "2024-03-05"
        );
    }

    #[test]
    fn date_key_rejects_garbage() {
        assert!(DateKey::parse("").is_err());
        assert!(DateKey::parse("tomorrow").is_err());
        assert!(DateKey::parse("2024-02-30").is_err());
    }

    #[test]
    fn task_deserializes_backend_payload() {
        let payload = r#"{
            "id": 12,
            "title": "Read paper",
            "description": null,
            "due_date": "2024-03-05T10:30:00",
            "status": "completed"
        }"#;
        let task: Task = serde_json::from_str(payload).expect("deserialize task");
        assert_eq!(task.id, TaskId::from(12));
        assert_eq!(task.description, None);
        assert_eq!(task.due_date, date(2024, 3, 5));
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.date_key().as_str(), "2024-03-05");
    }

    #[test]
    fn unknown_status_is_preserved() {
        let payload = r#"{"id":"a-1","title":"x","due_date":"2024-03-05","status":"archived"}"#;
        let task: Task = serde_json::from_str(payload).expect("deserialize task");
        assert_eq!(task.status, TaskStatus::Other("archived".to_string()));
        assert_eq!(task.status.as_str(), "archived");
    }

    #[test]
    fn missing_status_defaults_to_pending() {
        let payload = r#"{"id":1,"title":"x","due_date":"2024-03-05"}"#;
        let task: Task = serde_json::from_str(payload).expect("deserialize task");
        assert_eq!(task.status, TaskStatus::Pending);
    }

    #[test]
    fn malformed_due_date_fails_deserialization() {
        let payload = r#"{"id":1,"title":"x","due_date":"05/03/2024"}"#;
        assert!(serde_json::from_str::<Task>(payload).is_err());
    }

    #[test]
    fn complete_action_only_for_due_tasks() {
        let task = sample_task();
        assert!(task.can_complete_on(date(2024, 3, 5)));
        assert!(task.can_complete_on(date(2024, 3, 9)));
        assert!(!task.can_complete_on(date(2024, 3, 4)));

        let mut done = sample_task();
        done.status = TaskStatus::Completed;
        assert!(!done.can_complete_on(date(2024, 3, 9)));
    }

    #[test]
    fn task_validate_rejects_empty_title() {
        let mut task = sample_task();
        task.title = "   ".to_string();
        assert!(task.validate().is_err());
    }

    #[test]
    fn form_validation_reports_every_missing_field() {
        let errors = NewTaskForm::new("  ", "", "").validate().expect_err("invalid form");
        assert_eq!(errors.title.as_deref(), Some(TITLE_REQUIRED));
        assert_eq!(errors.due_date.as_deref(), Some(DUE_DATE_REQUIRED));

        let errors = NewTaskForm::new("Essay", "", "next week")
            .validate()
            .expect_err("invalid date");
        assert_eq!(errors.title, None);
        assert_eq!(errors.due_date.as_deref(), Some(DUE_DATE_INVALID));
    }

    #[test]
    fn form_validation_trims_and_drops_blank_description() {
        let request = NewTaskForm::new("  Essay draft ", "   ", "2024-04-02")
            .validate()
            .expect("valid form");
        assert_eq!(request.title, "Essay draft");
        assert_eq!(request.description, None);
        assert_eq!(request.due_date, date(2024, 4, 2));

        let body = serde_json::to_value(&request).expect("serialize request");
        assert_eq!(
            body,
            serde_json::json!({"title": "Essay draft", "due_date": "2024-04-02"})
        );
    }

    #[test]
    fn summary_from_xp_matches_level_math() {
        let summary = GamificationSummary::from_xp(250, 4, 9);
        assert_eq!(summary.level, 3);
        assert_eq!(summary.xp_for_next_level, 50);
        assert_eq!(summary.progress_percent(), 50);

        let fresh = GamificationSummary::from_xp(0, 0, 0);
        assert_eq!(fresh.level, 1);
        assert_eq!(fresh.xp_for_next_level, 100);
        assert_eq!(fresh.progress_percent(), 0);
    }

    #[test]
    fn summary_from_xp_saturates_at_the_top_of_the_range() {
        let summary = GamificationSummary::from_xp(u32::MAX, 0, 0);
        assert_eq!(summary.level, u32::MAX / 100 + 1);
        assert_eq!(summary.xp_for_next_level, 5);
        assert_eq!(summary.progress_percent(), 95);

        let edge = GamificationSummary::from_xp(4_294_967_200, 0, 0);
        assert_eq!(edge.xp_for_next_level, 100);
    }

    #[test]
    fn blank_description_deserializes_as_none() {
        let payload = r#"{"id":3,"title":"x","description":"  ","due_date":"2024-03-05"}"#;
        let task: Task = serde_json::from_str(payload).expect("deserialize task");
        assert_eq!(task.description, None);

        let payload = r#"{"id":4,"title":"x","description":" notes ","due_date":"2024-03-05"}"#;
        let task: Task = serde_json::from_str(payload).expect("deserialize task");
        assert_eq!(task.description.as_deref(), Some("notes"));
    }

    #[test]
    fn achievement_thresholds_check_streak_before_level() {
        assert_eq!(Achievement::classify(30, 1), Achievement::StreakMaster);
        assert_eq!(Achievement::classify(14, 12), Achievement::ConsistencyKing);
        assert_eq!(Achievement::classify(7, 20), Achievement::WeekWarrior);
        assert_eq!(Achievement::classify(6, 10), Achievement::EliteScholar);
        assert_eq!(Achievement::classify(0, 5), Achievement::RisingStar);
        assert_eq!(Achievement::classify(2, 3), Achievement::DedicatedLearner);
        assert_eq!(Achievement::classify(6, 2), Achievement::Beginner);
        assert_eq!(Achievement::WeekWarrior.label(), "Week Warrior");
    }

    #[test]
    fn format_long_date_uses_month_names() {
        assert_eq!(format_long_date(date(2024, 4, 1)), "April 1, 2024");
        assert_eq!(month_name(12), Some("December"));
        assert_eq!(month_name(1), Some("January"));
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);
    }

    proptest! {
        #[test]
        fn date_key_is_identical_for_date_and_timestamp(
            year in 1970i32..2200i32,
            month in 1u32..=12u32,
            day in 1u32..=28u32,
            hour in 0u32..24u32,
            minute in 0u32..60u32
        ) {
            let date_only = format!("{year:04}-{month:02}-{day:02}");
            let timestamp = format!("{date_only}T{hour:02}:{minute:02}:00Z");
            let left = DateKey::parse(&date_only).expect("date only");
            let right = DateKey::parse(&timestamp).expect("timestamp");
            prop_assert_eq!(left.as_str(), date_only.as_str());
            prop_assert_eq!(left, right);
        }
    }
}
