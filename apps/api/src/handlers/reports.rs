use axum::Json;
use axum::extract::{Extension, Multipart, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use chrono::NaiveDate;

use smartsales_application::{AudioClip, ReportQuery};
use smartsales_core::{ActorContext, AppError};
use smartsales_domain::{ReportFormat, ReportType};

use crate::dto::{
    GenerateReportRequest, GeneratedReportResponse, PromptPreviewResponse, PromptRequest,
    ReportHistoryResponse, ReportResponse, StructuredReportResponse, VoiceTextRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

use super::parse_optional;

mod audio;
mod generation;
mod history;

pub use audio::generate_from_audio_handler;
pub use generation::{
    generate_dynamic_handler, generate_from_voice_text_handler, generate_structured_handler,
    preview_prompt_handler,
};
pub use history::{
    delete_report_handler, download_report_handler, get_report_handler, list_reports_handler,
    report_history_handler,
};
