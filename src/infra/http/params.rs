//! Merged request parameters.
//!
//! The query string is read first and the body (JSON object or urlencoded
//! form) is laid over it, so body values win on key collision. Values are
//! normalised to trimmed strings; empty strings and nulls count as absent.

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
};
use serde_json::{Number, Value};

use crate::application::error::AppError;
use crate::application::pagination::{MAX_PAGE_SIZE, PageRequest};

pub const MALFORMED_BODY_MESSAGE: &str = "请求参数格式错误";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Text(String),
    List(Vec<String>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamBag {
    values: HashMap<String, ParamValue>,
}

impl ParamBag {
    pub fn from_query(query: &str) -> Self {
        let mut bag = Self::default();
        bag.overlay(collect_pairs(query.as_bytes()));
        bag
    }

    /// Lay `other` over this bag; keys present in `other` replace ours.
    pub fn overlay(&mut self, other: ParamBag) {
        self.values.extend(other.values);
    }

    pub fn from_json(value: Value) -> Result<Self, AppError> {
        let Value::Object(map) = value else {
            return Err(AppError::validation(MALFORMED_BODY_MESSAGE));
        };
        let mut bag = Self::default();
        for (key, value) in map {
            if let Some(value) = normalize_json(value) {
                bag.values.insert(key, value);
            }
        }
        Ok(bag)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            self.values
                .insert(key.into(), ParamValue::Text(trimmed.to_string()));
        }
    }

    /// Scalar value of `key`; for a list the first element.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.values.get(key)? {
            ParamValue::Text(value) => Some(value.clone()),
            ParamValue::List(items) => items.first().cloned(),
        }
    }

    pub fn require(&self, key: &str, message: &str) -> Result<String, AppError> {
        self.text(key).ok_or_else(|| AppError::validation(message))
    }

    /// List value of `key`; a scalar becomes a one-element list.
    pub fn list(&self, key: &str) -> Vec<String> {
        match self.values.get(key) {
            Some(ParamValue::List(items)) => items.clone(),
            Some(ParamValue::Text(value)) => vec![value.clone()],
            None => Vec::new(),
        }
    }

    /// Parse a present value, reporting `message` when it does not parse.
    pub fn number<T: std::str::FromStr>(
        &self,
        key: &str,
        message: &str,
    ) -> Result<Option<T>, AppError> {
        self.text(key)
            .map(|raw| raw.parse::<T>().map_err(|_| AppError::validation(message)))
            .transpose()
    }

    /// 1-indexed page; missing, non-numeric and values below one yield 1.
    pub fn page(&self) -> u32 {
        self.text("page")
            .and_then(|raw| raw.parse::<i64>().ok())
            .filter(|page| *page >= 1)
            .map(|page| page.min(i64::from(u32::MAX)) as u32)
            .unwrap_or(1)
    }

    /// Page size; missing, non-numeric and values below one yield `default`.
    pub fn row(&self, default: u32) -> u32 {
        self.text("row")
            .and_then(|raw| raw.parse::<i64>().ok())
            .filter(|row| *row >= 1)
            .map(|row| row.min(i64::from(MAX_PAGE_SIZE)) as u32)
            .unwrap_or(default)
            .min(MAX_PAGE_SIZE)
    }

    pub fn page_request(&self, default_row: u32) -> PageRequest {
        PageRequest::new(self.page(), self.row(default_row))
    }
}

fn collect_pairs(input: &[u8]) -> ParamBag {
    let mut values: HashMap<String, ParamValue> = HashMap::new();
    for (key, value) in url::form_urlencoded::parse(input) {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        let key = key.trim_end_matches("[]").to_string();
        match values.remove(&key) {
            None => {
                values.insert(key, ParamValue::Text(value.to_string()));
            }
            Some(ParamValue::Text(first)) => {
                values.insert(key, ParamValue::List(vec![first, value.to_string()]));
            }
            Some(ParamValue::List(mut items)) => {
                items.push(value.to_string());
                values.insert(key, ParamValue::List(items));
            }
        }
    }
    ParamBag { values }
}

fn scalar(value: Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(text) => text.trim().to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number_text(&number),
        other => other.to_string(),
    };
    (!text.is_empty()).then_some(text)
}

/// Integral floats such as `2.0` read as `2`, so numeric accessors accept them.
fn number_text(number: &Number) -> String {
    match number.as_f64() {
        Some(float) if number.is_f64() && float.fract() == 0.0 && float.abs() < 1e15 => {
            format!("{float:.0}")
        }
        _ => number.to_string(),
    }
}

fn normalize_json(value: Value) -> Option<ParamValue> {
    match value {
        Value::Array(items) => Some(ParamValue::List(
            items.into_iter().filter_map(scalar).collect(),
        )),
        other => scalar(other).map(ParamValue::Text),
    }
}

impl<S> FromRequest<S> for ParamBag
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut bag = request
            .uri()
            .query()
            .map(ParamBag::from_query)
            .unwrap_or_default();
        let content_type = request
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let body = Bytes::from_request(request, state)
            .await
            .map_err(|_| AppError::validation(MALFORMED_BODY_MESSAGE))?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(bag);
        }

        let overlay = if content_type.starts_with("application/x-www-form-urlencoded") {
            collect_pairs(&body)
        } else {
            let value: Value = serde_json::from_slice(&body)
                .map_err(|_| AppError::validation(MALFORMED_BODY_MESSAGE))?;
            ParamBag::from_json(value)?
        };
        bag.overlay(overlay);
        Ok(bag)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn body_wins_over_query() {
        let mut bag = ParamBag::from_query("page=2&title=query&communityId=COMM_001");
        bag.overlay(ParamBag::from_json(json!({"title": "body", "row": 5})).expect("object"));
        assert_eq!(bag.text("title").as_deref(), Some("body"));
        assert_eq!(bag.text("communityId").as_deref(), Some("COMM_001"));
        assert_eq!(bag.page(), 2);
        assert_eq!(bag.row(10), 5);
    }

    #[test]
    fn integral_floats_read_as_integers() {
        let bag =
            ParamBag::from_json(json!({"page": 2.0, "row": 5, "score": 4.5})).expect("object");
        assert_eq!(bag.text("page").as_deref(), Some("2"));
        assert_eq!(bag.page(), 2);
        assert_eq!(bag.row(10), 5);
        assert_eq!(bag.text("score").as_deref(), Some("4.5"));
    }

    #[test]
    fn blanks_and_nulls_are_absent() {
        let bag = ParamBag::from_json(json!({"a": "  ", "b": null, "c": " x "})).expect("object");
        assert_eq!(bag.text("a"), None);
        assert_eq!(bag.text("b"), None);
        assert_eq!(bag.text("c").as_deref(), Some("x"));
        assert!(bag.require("a", "a不能为空").is_err());
    }

    #[test]
    fn paging_defaults_and_caps() {
        let bag = ParamBag::from_query("page=-3&row=abc");
        assert_eq!(bag.page(), 1);
        assert_eq!(bag.row(10), 10);

        let bag = ParamBag::from_query("page=zz&row=500");
        assert_eq!(bag.page(), 1);
        assert_eq!(bag.row(10), 100);

        let bag = ParamBag::from_query("row=0");
        assert_eq!(bag.row(50), 50);
    }

    #[test]
    fn arrays_survive_as_lists() {
        let bag = ParamBag::from_json(json!({"images": ["/a.jpg", "", "/b.jpg"], "score": 5}))
            .expect("object");
        assert_eq!(bag.list("images"), ["/a.jpg", "/b.jpg"]);
        assert_eq!(bag.text("score").as_deref(), Some("5"));

        let bag = ParamBag::from_query("photos[]=/1.jpg&photos[]=/2.jpg&videos=/v.mp4");
        assert_eq!(bag.list("photos"), ["/1.jpg", "/2.jpg"]);
        assert_eq!(bag.list("videos"), ["/v.mp4"]);
        assert!(bag.list("missing").is_empty());
    }

    #[test]
    fn non_object_json_is_rejected() {
        assert!(ParamBag::from_json(json!([1, 2])).is_err());
    }

    #[test]
    fn number_reports_parse_failures() {
        let bag = ParamBag::from_query("score=high&count=3");
        assert!(bag.number::<u8>("score", "评分格式错误").is_err());
        assert_eq!(bag.number::<u8>("count", "x").expect("parse"), Some(3));
        assert_eq!(bag.number::<u8>("absent", "x").expect("absent"), None);
    }
}
