//! Key-authenticated client endpoints.
//!
//! All handlers here run behind the access guard; the authenticated key
//! record arrives via request extensions.

use axum::{
    Extension, Json,
    extract::{Multipart, Query, State},
};

use crate::{
    error::AppError,
    models::{
        api_key::{ApiKey, BindEmailRequest},
        extraction::ExtractionResult,
        offer::{MarketFilters, MarketSummary},
    },
    services::{config_store, extraction, market},
    state::AppState,
};

/// Return the caller's own key record.
///
/// # Endpoint
///
/// `GET /me`
pub async fn me(Extension(key): Extension<ApiKey>) -> Json<ApiKey> {
    Json(key)
}

/// Bind a marketplace account email to the caller's key.
///
/// # Endpoint
///
/// `POST /bind-email`
///
/// Binding is one-shot from the client side: a key that already carries an
/// email is rejected with 400, and only an admin can change it afterwards.
pub async fn bind_email(
    State(state): State<AppState>,
    Extension(key): Extension<ApiKey>,
    Json(request): Json<BindEmailRequest>,
) -> Result<Json<ApiKey>, AppError> {
    if key.eldorado_email.is_some() {
        return Err(AppError::EmailAlreadyBound);
    }

    let updated = sqlx::query_as::<_, ApiKey>(
        r#"
        UPDATE api_keys
        SET eldorado_email = $1
        WHERE id = $2
        RETURNING id, key_value, user_identifier, eldorado_email, expiry_date,
                  created_at, last_used_at, usage_count, status
        "#,
    )
    .bind(&request.eldorado_email)
    .bind(key.id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(updated))
}

/// Analyze an uploaded item screenshot with the vision model.
///
/// # Endpoint
///
/// `POST /analyze` (multipart, field `file`)
///
/// # Response
///
/// - **Success (200 OK)**: the extraction result; on a provider failure this
///   is the degraded fallback record with its `error` field set, never a
///   5xx
/// - **Error (400)**: the upload is missing or not declared as an image
/// - **Error (500)**: no vision model credential configured
pub async fn analyze_image(
    State(state): State<AppState>,
    Extension(_key): Extension<ApiKey>,
    mut multipart: Multipart,
) -> Result<Json<ExtractionResult>, AppError> {
    // Pull the uploaded file out of the multipart body
    let mut image = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidRequest(e.to_string()))?
    {
        if field.name() == Some("file") {
            let content_type = field.content_type().unwrap_or_default();
            if !content_type.starts_with("image/") {
                return Err(AppError::InvalidRequest(
                    "File must be an image".to_string(),
                ));
            }
            image = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidRequest(e.to_string()))?,
            );
            break;
        }
    }

    let image =
        image.ok_or_else(|| AppError::InvalidRequest("Missing file upload".to_string()))?;

    let llm_key = config_store::get(&state.db, config_store::LLM_API_KEY)
        .await?
        .filter(|v| !v.is_empty())
        .ok_or(AppError::LlmNotConfigured)?;

    let result = extraction::analyze_image(
        &state.http,
        &state.config.llm_base_url,
        &state.config.llm_model,
        &image,
        &llm_key,
    )
    .await;

    Ok(Json(result))
}

/// Current market prices for a filter set.
///
/// # Endpoint
///
/// `GET /market?ms_rate&mutations&category&item_name`
///
/// Forwards the present filters to the scraper service and aggregates the
/// result. Always 200: upstream failures yield an empty summary with the
/// `error` field set.
pub async fn market_prices(
    State(state): State<AppState>,
    Extension(_key): Extension<ApiKey>,
    Query(filters): Query<MarketFilters>,
) -> Json<MarketSummary> {
    Json(market::fetch_market_prices(&state.http, &state.config.scraper_url, &filters).await)
}
