//! Service catalog handlers.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::AppState;
use crate::config::MAX_SERVICE_IMAGES;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::middleware::context::ClientContext;
use crate::models::{ServiceListParams, ServiceListResponse, ServiceResponse};
use crate::services::catalog::{self, ServiceForm};
use crate::services::uploads::ImageUpload;

/// Drain a multipart body into a [`ServiceForm`]. Unknown fields are ignored.
async fn read_form(mut multipart: Multipart) -> AppResult<ServiceForm> {
    let mut form = ServiceForm::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "images" => {
                if form.images.len() == MAX_SERVICE_IMAGES {
                    return Err(AppError::Validation(format!(
                        "At most {MAX_SERVICE_IMAGES} images are allowed"
                    )));
                }
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                form.images.push(ImageUpload {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            "name" => form.name = Some(field.text().await?),
            "category" => form.category = Some(field.text().await?),
            "description" => form.description = Some(field.text().await?),
            "duration" => form.duration = Some(field.text().await?),
            "pricing" => form.pricing = Some(field.text().await?),
            _ => {}
        }
    }
    Ok(form)
}

/// `POST /admin/services`: multipart create with optional images.
pub async fn create_service_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    ClientContext(context): ClientContext,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<(StatusCode, Json<ServiceResponse>)> {
    // Role check before reading the body.
    actor.require_catalog_manager()?;
    let form = read_form(multipart?).await?;
    let service = catalog::create_service(&state, &actor, form, context).await?;
    Ok((
        StatusCode::CREATED,
        Json(ServiceResponse {
            success: true,
            message: Some("Service created successfully".into()),
            data: service,
        }),
    ))
}

/// `GET /services?category=`
pub async fn list_services_handler(
    State(state): State<AppState>,
    Query(params): Query<ServiceListParams>,
) -> AppResult<Json<ServiceListResponse>> {
    let services = catalog::list_services(state.catalog.as_ref(), params.category.as_deref()).await?;
    Ok(Json(ServiceListResponse {
        success: true,
        count: services.len(),
        data: services,
    }))
}

/// `GET /services/{id}`
pub async fn get_service_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ServiceResponse>> {
    let service = catalog::get_service(state.catalog.as_ref(), &id).await?;
    Ok(Json(ServiceResponse {
        success: true,
        message: None,
        data: service,
    }))
}

/// `DELETE /admin/services/{id}`
pub async fn delete_service_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ClientContext(context): ClientContext,
) -> AppResult<StatusCode> {
    catalog::delete_service(&state, &actor, &id, context).await?;
    Ok(StatusCode::NO_CONTENT)
}
