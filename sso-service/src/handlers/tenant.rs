use service_core::{
    axum::{extract::State, http::StatusCode, response::IntoResponse, Json},
    error::AppError,
};

use crate::{
    dtos::auth::{RegisterTenantRequest, RegisterTenantResponse},
    utils::ValidatedJson,
    AppState,
};

/// Register a tenant and its signing secret
pub async fn register_tenant(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterTenantRequest>,
) -> Result<impl IntoResponse, AppError> {
    let res = register_tenant_impl(&state, req).await?;
    Ok((StatusCode::CREATED, Json(res)))
}

pub async fn register_tenant_impl(
    state: &AppState,
    req: RegisterTenantRequest,
) -> Result<RegisterTenantResponse, AppError> {
    let tenant_id = state
        .auth_service
        .register_tenant(&req.name, &req.secret)
        .await?;

    Ok(RegisterTenantResponse {
        tenant_id: tenant_id.to_string(),
    })
}
