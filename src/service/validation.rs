//! Request validation: JSON bodies to typed inputs, with errors collected per field.

use crate::model::{NewOrder, NewProduct, NewUser, OrderPatch, ProductPatch, UserPatch};
use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

pub const USER_NAME_MAX: usize = 120;
pub const EMAIL_MAX: usize = 255;
pub const ADDRESS_MAX: usize = 255;
pub const PRODUCT_NAME_MAX: usize = 200;

/// Field name to messages. Serializes as a plain JSON object.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{} {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
            .expect("email pattern is valid")
    })
}

pub fn is_valid_email(s: &str) -> bool {
    email_regex().is_match(s)
}

/// Reads fields out of one request body, recording every problem it finds.
struct FieldReader<'a> {
    body: &'a Map<String, Value>,
    errors: ValidationErrors,
}

impl<'a> FieldReader<'a> {
    fn new(body: &'a Map<String, Value>) -> Self {
        FieldReader {
            body,
            errors: ValidationErrors::default(),
        }
    }

    /// None when absent. Null counts as absent for non-nullable fields.
    fn present(&self, field: &str) -> Option<&'a Value> {
        self.body.get(field).filter(|v| !v.is_null())
    }

    fn required<T>(&mut self, field: &str, read: impl FnOnce(&mut Self, &'a Value) -> Option<T>) -> Option<T> {
        match self.present(field) {
            Some(v) => read(self, v),
            None => {
                self.errors.add(field, "is required");
                None
            }
        }
    }

    fn optional<T>(&mut self, field: &str, read: impl FnOnce(&mut Self, &'a Value) -> Option<T>) -> Option<T> {
        let v = self.present(field)?;
        read(self, v)
    }

    /// Some(None) when the field is explicitly null.
    fn nullable<T>(
        &mut self,
        field: &str,
        read: impl FnOnce(&mut Self, &'a Value) -> Option<T>,
    ) -> Option<Option<T>> {
        match self.body.get(field) {
            None => None,
            Some(Value::Null) => Some(None),
            Some(v) => read(self, v).map(Some),
        }
    }

    fn text(&mut self, field: &str, v: &Value, non_empty: bool, max: usize) -> Option<String> {
        let Some(s) = v.as_str() else {
            self.errors.add(field, "must be a string");
            return None;
        };
        let s = s.trim();
        if non_empty && s.is_empty() {
            self.errors.add(field, "must not be empty");
            return None;
        }
        if s.chars().count() > max {
            self.errors.add(field, format!("must be at most {} characters", max));
            return None;
        }
        Some(s.to_string())
    }

    /// Optional free text where blank means absent.
    fn blank_as_none(&mut self, field: &str, v: &Value, max: usize) -> Option<Option<String>> {
        let s = self.text(field, v, false, max)?;
        Some(if s.is_empty() { None } else { Some(s) })
    }

    fn email(&mut self, field: &str, v: &Value) -> Option<String> {
        let s = self.text(field, v, true, EMAIL_MAX)?;
        if !is_valid_email(&s) {
            self.errors.add(field, "must be a valid email");
            return None;
        }
        Some(s)
    }

    fn price(&mut self, field: &str, v: &Value) -> Option<f64> {
        let n = match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        let Some(n) = n.filter(|n| n.is_finite()) else {
            self.errors.add(field, "must be numeric");
            return None;
        };
        if n < 0.0 {
            self.errors.add(field, "cannot be negative");
            return None;
        }
        Some(n)
    }

    fn id(&mut self, field: &str, v: &Value) -> Option<i64> {
        let n = match v {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        match n {
            Some(n) if n > 0 => Some(n),
            _ => {
                self.errors.add(field, "must be a positive integer id");
                None
            }
        }
    }

    fn timestamp(&mut self, field: &str, v: &Value) -> Option<DateTime<Utc>> {
        let parsed = v.as_str().and_then(parse_timestamp);
        if parsed.is_none() {
            self.errors
                .add(field, "must be an RFC 3339 timestamp or 'YYYY-MM-DD HH:MM:SS'");
        }
        parsed
    }
}

/// RFC 3339, or `YYYY-MM-DD HH:MM:SS` taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

pub struct RequestValidator;

impl RequestValidator {
    pub fn new_user(body: &Map<String, Value>) -> Result<NewUser, ValidationErrors> {
        let mut r = FieldReader::new(body);
        let name = r.required("name", |r, v| r.text("name", v, true, USER_NAME_MAX));
        let email = r.required("email", |r, v| r.email("email", v));
        let address = r
            .optional("address", |r, v| r.blank_as_none("address", v, ADDRESS_MAX))
            .flatten();
        match (name, email) {
            (Some(name), Some(email)) => r.errors.finish(|| NewUser { name, email, address }),
            _ => Err(r.errors),
        }
    }

    /// Validate only the fields present in body (for PUT/PATCH).
    pub fn user_patch(body: &Map<String, Value>) -> Result<UserPatch, ValidationErrors> {
        let mut r = FieldReader::new(body);
        let patch = UserPatch {
            name: r.optional("name", |r, v| r.text("name", v, true, USER_NAME_MAX)),
            email: r.optional("email", |r, v| r.email("email", v)),
            address: r
                .nullable("address", |r, v| r.blank_as_none("address", v, ADDRESS_MAX))
                .map(Option::flatten),
        };
        r.errors.finish(|| patch)
    }

    pub fn new_product(body: &Map<String, Value>) -> Result<NewProduct, ValidationErrors> {
        let mut r = FieldReader::new(body);
        let name = r.required("name", |r, v| r.text("name", v, true, PRODUCT_NAME_MAX));
        let price = r.required("price", |r, v| r.price("price", v));
        match (name, price) {
            (Some(name), Some(price)) => r.errors.finish(|| NewProduct { name, price }),
            _ => Err(r.errors),
        }
    }

    pub fn product_patch(body: &Map<String, Value>) -> Result<ProductPatch, ValidationErrors> {
        let mut r = FieldReader::new(body);
        let patch = ProductPatch {
            name: r.optional("name", |r, v| r.text("name", v, true, PRODUCT_NAME_MAX)),
            price: r.optional("price", |r, v| r.price("price", v)),
        };
        r.errors.finish(|| patch)
    }

    /// Shape only. Whether `user_id` names a real user is checked by the order service.
    pub fn new_order(body: &Map<String, Value>) -> Result<NewOrder, ValidationErrors> {
        let mut r = FieldReader::new(body);
        let user_id = r.required("user_id", |r, v| r.id("user_id", v));
        let order_date = r.optional("order_date", |r, v| r.timestamp("order_date", v));
        match user_id {
            Some(user_id) => r.errors.finish(|| NewOrder { user_id, order_date }),
            None => Err(r.errors),
        }
    }

    pub fn order_patch(body: &Map<String, Value>) -> Result<OrderPatch, ValidationErrors> {
        let mut r = FieldReader::new(body);
        let patch = OrderPatch {
            user_id: r.optional("user_id", |r, v| r.id("user_id", v)),
            order_date: r.optional("order_date", |r, v| r.timestamp("order_date", v)),
        };
        r.errors.finish(|| patch)
    }
}
