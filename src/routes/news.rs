use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, State,
    },
    response::Html,
    routing::post,
    Router,
};
use tracing::{error, info};

use super::ui::render_page;
use crate::models::{AppState, ImageUpload, Submission};
use crate::types::{SubmissionError, SubmissionResult};

pub const SUCCESS_MESSAGE: &str = "✅ News added successfully!";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/add", post(add_news))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .with_state(state)
}

/// POST /add. Outcomes are reported in the rendered page; the status is
/// always 200.
async fn add_news(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Html<String> {
    let outcome = match multipart {
        Ok(mut multipart) => match read_submission(&mut multipart).await {
            Ok(submission) => {
                info!(slug = %submission.slug, has_image = submission.image.is_some(), "News submission received");
                state.submitter.submit(submission).await
            }
            Err(e) => Err(e),
        },
        Err(rejection) => Err(SubmissionError::InvalidForm(rejection.body_text())),
    };

    let message = match outcome {
        Ok(_) => SUCCESS_MESSAGE.to_string(),
        Err(e) => {
            error!(error = %e, "News submission failed");
            format!("❌ Error: {e}")
        }
    };

    render_page(&state, Some(message.as_str())).await
}

fn form_error(e: MultipartError) -> SubmissionError {
    SubmissionError::InvalidForm(e.body_text())
}

async fn read_submission(multipart: &mut Multipart) -> SubmissionResult<Submission> {
    let mut submission = Submission::default();

    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "slug" => submission.slug = field.text().await.map_err(form_error)?,
            "title" => submission.title = field.text().await.map_err(form_error)?,
            "source_url" => submission.source_url = field.text().await.map_err(form_error)?,
            "description" => submission.description = field.text().await.map_err(form_error)?,
            "image" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .map(str::to_string)
                    .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string());
                let bytes = field.bytes().await.map_err(form_error)?;

                // An untouched file input still sends an empty, unnamed part.
                if !(file_name.is_empty() && bytes.is_empty()) {
                    submission.image = Some(ImageUpload {
                        file_name,
                        content_type,
                        bytes,
                    });
                }
            }
            _ => {}
        }
    }

    Ok(submission)
}
