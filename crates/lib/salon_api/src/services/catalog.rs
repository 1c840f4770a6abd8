//! Service catalog: create, browse and delete salon services.

use serde_json::json;
use tracing::info;

use salon_core::models::audit::{AuditAction, NewAuditEntry, RequestContext};
use salon_core::models::service::{NewService, PricingTier, Service};
use salon_core::store::ServiceCatalog;

use crate::AppState;
use crate::config::MAX_SERVICE_IMAGES;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::services::audit;
use crate::services::uploads::{self, ImageUpload};

/// Fields collected from a multipart create request.
#[derive(Debug, Clone, Default)]
pub struct ServiceForm {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub duration: Option<String>,
    /// JSON array of `{title, price}`.
    pub pricing: Option<String>,
    pub images: Vec<ImageUpload>,
}

fn required(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Parse the pricing field. Absent or blank means no tiers.
pub fn parse_pricing(raw: Option<&str>) -> AppResult<Vec<PricingTier>> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(Vec::new());
    };
    let tiers: Vec<PricingTier> = serde_json::from_str(raw)
        .map_err(|_| AppError::Validation("Invalid pricing format".into()))?;
    if tiers.iter().any(|t| !t.price.is_finite() || t.price < 0.0) {
        return Err(AppError::Validation("Pricing values must be non-negative".into()));
    }
    if tiers.iter().any(|t| t.title.trim().is_empty()) {
        return Err(AppError::Validation("Pricing titles must not be empty".into()));
    }
    Ok(tiers)
}

pub async fn create_service(
    state: &AppState,
    actor: &AuthenticatedUser,
    form: ServiceForm,
    context: RequestContext,
) -> AppResult<Service> {
    actor.require_catalog_manager()?;

    let (Some(name), Some(category), Some(description), Some(duration)) = (
        required(form.name.as_deref()),
        required(form.category.as_deref()),
        required(form.description.as_deref()),
        required(form.duration.as_deref()),
    ) else {
        return Err(AppError::Validation("All required fields must be filled".into()));
    };
    let pricing = parse_pricing(form.pricing.as_deref())?;

    if form.images.len() > MAX_SERVICE_IMAGES {
        return Err(AppError::Validation(format!(
            "At most {MAX_SERVICE_IMAGES} images are allowed"
        )));
    }
    let upload_dir = &state.config.upload_dir;
    let images =
        uploads::save_images(upload_dir, &form.images, state.config.max_upload_bytes).await?;

    let inserted = state
        .catalog
        .insert(NewService {
            name,
            category,
            description,
            duration,
            pricing,
            images: images.clone(),
        })
        .await;
    let service = match inserted {
        Ok(service) => service,
        Err(e) => {
            uploads::remove_images(upload_dir, &images).await;
            return Err(e.into());
        }
    };

    info!(actor = %actor.user_id, service_id = %service.id, images = service.images.len(), "service created");

    audit::record(
        state.audit.as_ref(),
        NewAuditEntry {
            action: AuditAction::AdminCreatedService,
            actor_admin_id: actor.user_id,
            target_id: Some(service.id),
            metadata: json!({
                "name": service.name,
                "category": service.category,
                "images": service.images.len(),
            }),
            context,
        },
    )
    .await;

    Ok(service)
}

pub async fn list_services(
    catalog: &dyn ServiceCatalog,
    category: Option<&str>,
) -> AppResult<Vec<Service>> {
    let category = category.map(str::trim).filter(|c| !c.is_empty());
    Ok(catalog.list(category).await?)
}

pub async fn get_service(catalog: &dyn ServiceCatalog, id: &str) -> AppResult<Service> {
    let not_found = || AppError::NotFound("Service not found".into());
    let id = salon_core::uuid::parse_id(id).ok_or_else(not_found)?;
    catalog.get(id).await?.ok_or_else(not_found)
}

/// Delete a service and, best-effort, its stored images.
pub async fn delete_service(
    state: &AppState,
    actor: &AuthenticatedUser,
    id: &str,
    context: RequestContext,
) -> AppResult<()> {
    actor.require_catalog_manager()?;

    let not_found = || AppError::NotFound("Service not found".into());
    let id = salon_core::uuid::parse_id(id).ok_or_else(not_found)?;
    let removed = state.catalog.delete(id).await?.ok_or_else(not_found)?;

    uploads::remove_images(&state.config.upload_dir, &removed.images).await;
    info!(actor = %actor.user_id, service_id = %removed.id, "service deleted");

    audit::record(
        state.audit.as_ref(),
        NewAuditEntry {
            action: AuditAction::AdminDeletedService,
            actor_admin_id: actor.user_id,
            target_id: Some(removed.id),
            metadata: json!({ "name": removed.name, "category": removed.category }),
            context,
        },
    )
    .await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pricing_absent_or_blank_is_empty() {
        assert!(parse_pricing(None).unwrap().is_empty());
        assert!(parse_pricing(Some("  ")).unwrap().is_empty());
    }

    #[test]
    fn pricing_parses_tiers() {
        let tiers = parse_pricing(Some(r#"[{"title":"Short","price":25},{"title":"Long","price":40.5}]"#))
            .unwrap();
        assert_eq!(tiers.len(), 2);
        assert_eq!(tiers[1].price, 40.5);
    }

    #[test]
    fn pricing_rejects_bad_input() {
        for raw in [
            "not json",
            r#"{"title":"x","price":1}"#,
            r#"[{"title":"x","price":-1}]"#,
            r#"[{"title":" ","price":1}]"#,
        ] {
            assert!(
                matches!(parse_pricing(Some(raw)), Err(AppError::Validation(_))),
                "{raw}"
            );
        }
    }
}
