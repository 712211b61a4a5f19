use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use snafu::{OptionExt, ResultExt};
use tracing::instrument;

use super::auth::CurrentUser;
use super::error::*;
use super::state::App;
use crate::model::{Interval, ProgressView, VideoId, WatchKey, WatchRecord};
use crate::service::progress_manager::Report;

/// Body of `POST /api/progress/:video_id`. Every field is optional here so that a missing one is
/// reported as a validation error instead of a generic parse failure.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportProgress {
    pub video_id: Option<String>,
    pub interval: Option<Interval>,
    pub video_duration: Option<f64>,
}

impl ReportProgress {
    pub fn validate(self, video_id: &VideoId) -> Result<Report, ApiError> {
        if let Some(body_id) = &self.video_id {
            let body_id = body_id.parse::<VideoId>().context(InvalidVideoIdSnafu)?;
            if &body_id != video_id {
                return ValidationSnafu {
                    message: format!("body videoId `{body_id}` does not match the path `{video_id}`"),
                }
                .fail();
            }
        }

        let interval = self
            .interval
            .context(ValidationSnafu {
                message: "missing required field `interval`",
            })?
            .validate()
            .context(InvalidReportedIntervalSnafu)?;

        let video_duration = self.video_duration.context(ValidationSnafu {
            message: "missing required field `videoDuration`",
        })?;

        if !(video_duration.is_finite() && video_duration > 0.0) {
            return ValidationSnafu {
                message: format!("`videoDuration` must be a positive number, got {video_duration}"),
            }
            .fail();
        }

        Ok(Report::new(interval, video_duration))
    }
}

fn parse_video_id(raw: &str) -> Result<VideoId, ApiError> {
    raw.parse::<VideoId>().context(InvalidVideoIdSnafu)
}

#[instrument(skip(app))]
pub async fn show(
    State(app): State<App>, CurrentUser(user): CurrentUser, Path(video_id): Path<String>,
) -> Result<Json<ProgressView>, ApiError> {
    let key = WatchKey::new(user, parse_video_id(&video_id)?);
    let record = app.progress(&key).await.context(ProgressSnafu)?;

    Ok(Json(record.into()))
}

#[instrument(skip(app, payload))]
pub async fn report(
    State(app): State<App>, CurrentUser(user): CurrentUser, Path(video_id): Path<String>,
    payload: Result<Json<ReportProgress>, JsonRejection>,
) -> Result<Json<WatchRecord>, ApiError> {
    let video_id = parse_video_id(&video_id)?;

    let Json(payload) = payload.map_err(|rejection| {
        ValidationSnafu {
            message: rejection.body_text(),
        }
        .build()
    })?;

    let report = payload.validate(&video_id)?;
    let record = app
        .report(WatchKey::new(user, video_id), report)
        .await
        .context(ProgressSnafu)?;

    Ok(Json(record))
}
