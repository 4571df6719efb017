//! Course certificates and their public share links.

use axum::extract::State;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthLearner;
use crate::errors::AppError;
use crate::extract::ApiPath;
use crate::models::certificate::{CertificateRow, ShareLink, SharedCertificate};
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /certificates
pub async fn handle_certificates(
    State(state): State<AppState>,
    AuthLearner(learner_id): AuthLearner,
) -> Result<ApiResponse<Vec<CertificateRow>>, AppError> {
    let certificates = sqlx::query_as::<_, CertificateRow>(
        r#"
        SELECT c.id AS certificate_id, c.course_id, co.title AS course_title,
               c.title, c.issued_at, c.share_token, c.shared_at
        FROM certificates c
        JOIN courses co ON co.id = c.course_id
        WHERE c.learner_id = $1
        ORDER BY c.issued_at DESC, c.id DESC
        "#,
    )
    .bind(learner_id)
    .fetch_all(&state.db)
    .await?;

    Ok(ApiResponse::ok("Certificates", certificates))
}

/// POST /certificates/:id/share
///
/// The token is minted on the first share and returned unchanged afterwards.
pub async fn handle_share_certificate(
    State(state): State<AppState>,
    AuthLearner(learner_id): AuthLearner,
    ApiPath(certificate_id): ApiPath<i64>,
) -> Result<ApiResponse<ShareLink>, AppError> {
    let link = sqlx::query_as::<_, ShareLink>(
        r#"
        UPDATE certificates
        SET share_token = COALESCE(share_token, $3),
            shared_at = COALESCE(shared_at, NOW())
        WHERE id = $1 AND learner_id = $2
        RETURNING id AS certificate_id, share_token
        "#,
    )
    .bind(certificate_id)
    .bind(learner_id)
    .bind(Uuid::new_v4())
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound("Certificate not found".to_string()))?;

    info!("Learner {learner_id} shared certificate {certificate_id}");
    Ok(ApiResponse::ok("Certificate shared", link))
}

/// GET /shared/certificates/:token
///
/// Public: anyone holding the link may view the certificate.
pub async fn handle_shared_certificate(
    State(state): State<AppState>,
    ApiPath(token): ApiPath<Uuid>,
) -> Result<ApiResponse<SharedCertificate>, AppError> {
    let certificate = sqlx::query_as::<_, SharedCertificate>(
        r#"
        SELECT c.title, co.title AS course_title, c.issued_at
        FROM certificates c
        JOIN courses co ON co.id = c.course_id
        WHERE c.share_token = $1
        "#,
    )
    .bind(token)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound("Certificate not found".to_string()))?;

    Ok(ApiResponse::ok("Shared certificate", certificate))
}
