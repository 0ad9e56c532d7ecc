use thiserror::Error;

/// The message is part of the response text clients match on; keep it verbatim.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Parameter must '{raw}' be an Integer")]
pub struct ParseOperandError {
    pub raw: String,
}

pub fn parse_operand(raw: &str) -> Result<i64, ParseOperandError> {
    raw.parse::<i64>().map_err(|_| ParseOperandError {
        raw: raw.to_string(),
    })
}
