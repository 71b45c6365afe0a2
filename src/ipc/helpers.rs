use chrono::NaiveDate;
use serde_json::Value;

use crate::ipc::error::{err, ok};
use crate::timetable::{SlotTime, Weekday};

pub struct HandlerErr {
    pub code: &'static str,
    pub message: String,
    pub details: Option<Value>,
}

impl HandlerErr {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_params(message: impl Into<String>) -> Self {
        Self::new("bad_params", message)
    }

    pub fn response(self, id: &str) -> Value {
        err(id, self.code, self.message, self.details)
    }
}

pub fn respond(id: &str, result: Result<Value, HandlerErr>) -> Value {
    match result {
        Ok(result) => ok(id, result),
        Err(error) => error.response(id),
    }
}

pub fn get_optional_str(params: &Value, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn get_required_str(params: &Value, key: &str) -> Result<String, HandlerErr> {
    get_optional_str(params, key).ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

pub fn get_day(params: &Value, key: &str) -> Result<Weekday, HandlerErr> {
    let raw = get_required_str(params, key)?;
    Weekday::parse(&raw)
        .ok_or_else(|| HandlerErr::bad_params(format!("{} must be Monday..Friday", key)))
}

pub fn get_start_time(params: &Value, key: &str) -> Result<SlotTime, HandlerErr> {
    let raw = get_required_str(params, key)?;
    SlotTime::parse_start(&raw).ok_or_else(|| {
        HandlerErr::bad_params(format!(
            "{} must be one of 09:00, 10:30, 12:00, 14:00, 15:30",
            key
        ))
    })
}

pub fn get_optional_end_time(params: &Value, key: &str) -> Result<Option<SlotTime>, HandlerErr> {
    let Some(raw) = get_optional_str(params, key) else {
        return Ok(None);
    };
    SlotTime::parse(&raw)
        .map(Some)
        .ok_or_else(|| HandlerErr::bad_params(format!("{} is not a slot boundary", key)))
}

/// `YYYY-MM-DD`; today (local time) when absent.
pub fn get_date_or_today(params: &Value, key: &str) -> Result<NaiveDate, HandlerErr> {
    match get_optional_str(params, key) {
        Some(raw) => parse_date(&raw),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, HandlerErr> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| HandlerErr::bad_params("date must be YYYY-MM-DD"))
}
