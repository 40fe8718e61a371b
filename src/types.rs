use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::StatementParseError;
use crate::extract::{RawRow, StatementDate, parse_amount, parse_card_header};

/// One purchase line of a statement, tagged with the card it was made on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    pub date: StatementDate,
    pub description: String,
    pub amount: Decimal,
    /// `None` when the row came before any card section header.
    pub card_suffix: Option<String>,
}

impl TryFrom<&RawRow> for PurchaseRecord {
    type Error = StatementParseError;

    fn try_from(row: &RawRow) -> Result<Self, Self::Error> {
        let field_count = row.fields.len();
        let [date, description, amount, ..] = row.fields.as_slice() else {
            return Err(StatementParseError::ParseFailed(format!(
                "expected 3 or 4 fields, found {field_count}"
            )));
        };
        if field_count > 4 {
            return Err(StatementParseError::ParseFailed(format!(
                "expected 3 or 4 fields, found {field_count}"
            )));
        }

        if description.is_empty()
            || description.parse::<StatementDate>().is_ok()
            || parse_card_header(description).is_some()
        {
            return Err(StatementParseError::ParseFailed(format!(
                "not a description: {description:?}"
            )));
        }

        Ok(PurchaseRecord {
            date: date.parse()?,
            description: description.clone(),
            amount: parse_amount(amount)?,
            card_suffix: row.card_suffix.clone(),
        })
    }
}
