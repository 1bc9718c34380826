use rust_decimal::Decimal;
use serde::Deserialize;
use time::{macros::format_description, Date};

use crate::error::AppError;
use crate::store::ExpenseFields;

/// Body of POST /expenses and PUT /expenses/:id.
#[derive(Debug, Default, Deserialize)]
pub struct ExpenseInput {
    pub amount: Option<Decimal>, // number or decimal string
    pub description: Option<String>,
    pub category: Option<String>,
    pub date: Option<String>,
}

impl ExpenseInput {
    pub fn validate(self) -> Result<ExpenseFields, AppError> {
        let amount = self
            .amount
            .ok_or_else(|| AppError::Validation("amount is required".into()))?;
        let raw_date = self
            .date
            .ok_or_else(|| AppError::Validation("date is required".into()))?;
        let date = parse_date(raw_date.trim())
            .ok_or_else(|| AppError::Validation(format!("invalid date {raw_date:?}, expected YYYY-MM-DD")))?;

        Ok(ExpenseFields {
            amount,
            description: self.description,
            category: self.category,
            date,
        })
    }
}

/// `YYYY-MM-DD`, or the date part of an RFC 3339 timestamp.
fn parse_date(raw: &str) -> Option<Date> {
    let format = format_description!("[year]-[month]-[day]");
    if let Ok(date) = Date::parse(raw, &format) {
        return Some(date);
    }
    match raw.split_once('T') {
        Some((day, _)) => Date::parse(day, &format).ok(),
        None => None,
    }
}
