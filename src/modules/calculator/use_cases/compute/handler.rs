use crate::modules::calculator::core::operand::{ParseOperandError, parse_operand};
use crate::modules::calculator::core::operation::{ArithmeticError, Operation};
use crate::modules::calculator::use_cases::record_operation::handler::OperationRecorder;
use crate::shared::core::narration::Narration;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComputeError {
    #[error(transparent)]
    Parse(#[from] ParseOperandError),

    #[error(transparent)]
    Arithmetic(#[from] ArithmeticError),
}

pub struct ComputeHandler {
    recorder: Arc<OperationRecorder>,
}

impl ComputeHandler {
    pub fn new(recorder: Arc<OperationRecorder>) -> Self {
        Self { recorder }
    }

    /// Parses both operands, computes, records and renders the result. A store
    /// failure is narrated by the recorder and does not hide the result line.
    pub async fn handle(
        &self,
        operation: Operation,
        raw_a: &str,
        raw_b: &str,
        out: &mut Narration,
    ) -> Result<i64, ComputeError> {
        let result = match Self::evaluate(operation, raw_a, raw_b) {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(?operation, error = %err, "rejected calculation");
                out.line(err.to_string());
                return Err(err);
            }
        };

        let _ = self.recorder.record(result, out).await;

        out.line(format!("The {} result is: {result}", operation.noun()));
        Ok(result)
    }

    fn evaluate(operation: Operation, raw_a: &str, raw_b: &str) -> Result<i64, ComputeError> {
        let a = parse_operand(raw_a)?;
        let b = parse_operand(raw_b)?;
        Ok(operation.apply(a, b)?)
    }
}
