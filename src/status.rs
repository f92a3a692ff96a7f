//! Tri-state train status derivation.

use crate::models::{Schedule, StatusCode, TrainStatus};

/// Cancellation wins over everything; delay only counts when positive.
/// A cancelled schedule reports 0 delay minutes since the delay is not
/// meaningful for display.
pub fn derive_status(schedule: &Schedule) -> TrainStatus {
    if schedule.is_cancelled {
        TrainStatus {
            code: StatusCode::Cancelled,
            delay_minutes: 0,
        }
    } else if schedule.delay_minutes > 0 {
        TrainStatus {
            code: StatusCode::Delayed,
            delay_minutes: schedule.delay_minutes,
        }
    } else {
        TrainStatus {
            code: StatusCode::OnTime,
            delay_minutes: 0,
        }
    }
}

/// French board label for a status, as painted on the physical displays.
pub fn display_label(status: &TrainStatus) -> String {
    match status.code {
        StatusCode::OnTime => "à l'heure".to_string(),
        StatusCode::Delayed => format!("Retardé + {} min", status.delay_minutes),
        StatusCode::Cancelled => "Supprimé".to_string(),
    }
}
