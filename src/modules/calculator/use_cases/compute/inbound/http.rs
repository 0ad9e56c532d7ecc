use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::Uri;
use percent_encoding::percent_decode_str;

use crate::modules::calculator::core::operation::Operation;
use crate::shared::core::narration::Narration;
use crate::shell::state::AppState;

type Operands = Result<Path<(String, String)>, PathRejection>;

/// Falls back to the last two path segments, decoded lossily, when the
/// captures are not valid UTF-8. The parse step then narrates them.
fn operands(extracted: Operands, uri: &Uri) -> (String, String) {
    match extracted {
        Ok(Path(pair)) => pair,
        Err(rejection) => {
            tracing::debug!(error = %rejection, uri = %uri, "operands taken from the raw path");
            let mut segments = uri
                .path()
                .rsplit('/')
                .map(|segment| percent_decode_str(segment).decode_utf8_lossy().into_owned());
            let val_b = segments.next().unwrap_or_default();
            let val_a = segments.next().unwrap_or_default();
            (val_a, val_b)
        }
    }
}

async fn handle(
    state: AppState,
    operation: Operation,
    (val_a, val_b): (String, String),
) -> Narration {
    let mut out = Narration::new();
    let _ = state.compute.handle(operation, &val_a, &val_b, &mut out).await;
    out
}

pub async fn sum(State(state): State<AppState>, uri: Uri, extracted: Operands) -> Narration {
    handle(state, Operation::Sum, operands(extracted, &uri)).await
}

pub async fn subtract(State(state): State<AppState>, uri: Uri, extracted: Operands) -> Narration {
    handle(state, Operation::Subtract, operands(extracted, &uri)).await
}

pub async fn multiply(State(state): State<AppState>, uri: Uri, extracted: Operands) -> Narration {
    handle(state, Operation::Multiply, operands(extracted, &uri)).await
}

pub async fn divide(State(state): State<AppState>, uri: Uri, extracted: Operands) -> Narration {
    handle(state, Operation::Divide, operands(extracted, &uri)).await
}
