//! gRPC implementation of the Auth service.

use service_core::error::AppError;
use service_core::grpc::{GrpcResult, IntoStatus};
use tonic::{Request, Response, Status};
use validator::Validate;

use crate::dtos::auth as dto;
use crate::grpc::proto::auth::{
    auth_server::Auth, IsAdminRequest, IsAdminResponse, LoginRequest, LoginResponse,
    RegisterRequest, RegisterResponse, RegisterTenantRequest, RegisterTenantResponse,
};
use crate::handlers::{auth as auth_handler, tenant as tenant_handler};
use crate::AppState;

/// gRPC Auth implementation. Shares request validation and handler logic
/// with the JSON gateway.
pub struct AuthServiceImpl {
    state: AppState,
}

impl AuthServiceImpl {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

fn validate<T: Validate>(req: &T) -> Result<(), Status> {
    req.validate()
        .map_err(|e| AppError::ValidationError(e).into_status())
}

#[tonic::async_trait]
impl Auth for AuthServiceImpl {
    async fn register(
        &self,
        request: Request<RegisterRequest>,
    ) -> GrpcResult<RegisterResponse> {
        let req = request.into_inner();

        let handler_req = dto::RegisterRequest {
            email: req.email,
            password: req.password,
            tenant_id: req.tenant_id,
        };
        validate(&handler_req)?;

        let result = auth_handler::register_impl(&self.state, handler_req)
            .await
            .map_err(|e| e.into_status())?;

        Ok(Response::new(RegisterResponse {
            user_id: result.user_id,
        }))
    }

    async fn login(
        &self,
        request: Request<LoginRequest>,
    ) -> GrpcResult<LoginResponse> {
        let req = request.into_inner();

        let handler_req = dto::LoginRequest {
            email: req.email,
            password: req.password,
            tenant_id: req.tenant_id,
        };
        validate(&handler_req)?;

        let result = auth_handler::login_impl(&self.state, handler_req)
            .await
            .map_err(|e| e.into_status())?;

        Ok(Response::new(LoginResponse {
            token: result.token,
        }))
    }

    async fn is_admin(
        &self,
        request: Request<IsAdminRequest>,
    ) -> GrpcResult<IsAdminResponse> {
        let req = request.into_inner();

        let handler_req = dto::IsAdminRequest {
            user_id: req.user_id,
        };
        validate(&handler_req)?;

        let result = auth_handler::is_admin_impl(&self.state, handler_req)
            .await
            .map_err(|e| e.into_status())?;

        Ok(Response::new(IsAdminResponse {
            is_admin: result.is_admin,
        }))
    }

    async fn register_tenant(
        &self,
        request: Request<RegisterTenantRequest>,
    ) -> GrpcResult<RegisterTenantResponse> {
        let req = request.into_inner();

        let handler_req = dto::RegisterTenantRequest {
            name: req.name,
            secret: req.secret,
        };
        validate(&handler_req)?;

        let result = tenant_handler::register_tenant_impl(&self.state, handler_req)
            .await
            .map_err(|e| e.into_status())?;

        Ok(Response::new(RegisterTenantResponse {
            tenant_id: result.tenant_id,
        }))
    }
}
