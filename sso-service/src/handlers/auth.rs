use service_core::{
    axum::{extract::State, http::StatusCode, response::IntoResponse, Json},
    error::AppError,
};

use crate::{
    dtos::auth::{
        parse_id, IsAdminRequest, IsAdminResponse, LoginRequest, LoginResponse, RegisterRequest,
        RegisterResponse,
    },
    utils::{Password, ValidatedJson},
    AppState,
};

/// Login with email, password and tenant
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let res = login_impl(&state, req).await?;
    Ok((StatusCode::OK, Json(res)))
}

pub async fn login_impl(state: &AppState, req: LoginRequest) -> Result<LoginResponse, AppError> {
    let tenant_id = parse_id(&req.tenant_id)?;

    let token = state
        .auth_service
        .login(&req.email, Password::new(req.password), tenant_id)
        .await?;

    Ok(LoginResponse { token })
}

/// Register a user inside an existing tenant
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let res = register_impl(&state, req).await?;
    Ok((StatusCode::CREATED, Json(res)))
}

pub async fn register_impl(
    state: &AppState,
    req: RegisterRequest,
) -> Result<RegisterResponse, AppError> {
    let tenant_id = parse_id(&req.tenant_id)?;

    let user_id = state
        .auth_service
        .register_user(&req.email, Password::new(req.password), tenant_id)
        .await?;

    Ok(RegisterResponse {
        user_id: user_id.to_string(),
    })
}

/// Report whether a user holds the administrator flag
pub async fn is_admin(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<IsAdminRequest>,
) -> Result<impl IntoResponse, AppError> {
    let res = is_admin_impl(&state, req).await?;
    Ok((StatusCode::OK, Json(res)))
}

pub async fn is_admin_impl(
    state: &AppState,
    req: IsAdminRequest,
) -> Result<IsAdminResponse, AppError> {
    let user_id = parse_id(&req.user_id)?;
    let is_admin = state.auth_service.is_admin(user_id).await?;
    Ok(IsAdminResponse { is_admin })
}
