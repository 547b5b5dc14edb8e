//! Notification polling endpoint

use axum::{extract::State, routing::get, Json, Router};

use crate::dto::NotificationDto;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_notifications))
}

/// GET /notifications - live banners in display order
pub async fn get_notifications(State(state): State<AppState>) -> Json<Vec<NotificationDto>> {
    let notifications = state
        .notifications()
        .current()
        .into_iter()
        .map(|n| NotificationDto {
            id: n.id,
            kind: match n.kind {
                crate::notify::NotificationKind::Error => "error".to_string(),
                crate::notify::NotificationKind::Success => "success".to_string(),
                crate::notify::NotificationKind::Pending => "pending".to_string(),
            },
            message: n.message,
            tx_hash: n.tx_hash,
        })
        .collect();

    Json(notifications)
}
