use axum::extract::State;

use crate::shared::core::narration::Narration;
use crate::shell::state::AppState;

pub async fn handle(State(state): State<AppState>) -> Narration {
    let mut out = Narration::new();
    let _ = state.history.handle(&mut out).await;
    out
}
