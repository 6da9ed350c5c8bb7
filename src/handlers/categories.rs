use axum::{
    extract::{Path, Query, State},
    Extension,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::models::{Category, TransactionKind};
use crate::db::queries;
use crate::error::AppError;
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::validation;
use crate::AppState;

const DEFAULT_COLOR: &str = "#000000";

#[derive(Debug, Serialize)]
pub struct CategoryDto {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub color: String,
}

impl From<Category> for CategoryDto {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            kind: category.kind,
            color: category.color,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryPayload {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub color: Option<String>,
}

fn parse_kind(field: &'static str, value: &str) -> Result<TransactionKind, AppError> {
    TransactionKind::parse(value).ok_or_else(|| {
        AppError::Validation(format!("{field}: must be one of: income, expense"))
    })
}

pub async fn create_category(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    AppJson(payload): AppJson<CreateCategoryPayload>,
) -> Result<ApiResponse, AppError> {
    let name = payload.name.trim();
    validation::validate_required("name", name)?;
    validation::validate_max_len("name", name, validation::NAME_MAX_LEN)?;

    let kind = parse_kind("type", &payload.kind)?;

    let color = match payload.color {
        Some(color) => {
            validation::validate_color("color", &color)?;
            color
        }
        None => DEFAULT_COLOR.to_string(),
    };

    if queries::find_category_by_name(&state.db, user_id, name, kind)
        .await?
        .is_some()
    {
        return Err(AppError::Validation(
            "Category already exists with this name".to_string(),
        ));
    }

    let category = Category::new(user_id, name.to_string(), kind, color);
    let created = queries::insert_category(&state.db, &category)
        .await
        .map_err(|err| {
            if queries::is_unique_violation(&err) {
                AppError::Validation("Category already exists with this name".to_string())
            } else {
                err.into()
            }
        })?;

    Ok(ApiResponse::created(
        "Category created successfully",
        serde_json::json!({ "category": CategoryDto::from(created) }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct ListCategoriesParams {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

pub async fn list_categories(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Query(params): Query<ListCategoriesParams>,
) -> Result<ApiResponse, AppError> {
    // Unrecognized kind tokens do not constrain the listing.
    let kind = params.kind.as_deref().and_then(TransactionKind::parse);

    let categories = queries::list_active_categories(&state.db, user_id, kind).await?;
    let categories: Vec<CategoryDto> = categories.into_iter().map(CategoryDto::from).collect();

    Ok(ApiResponse::ok(
        "Categories retrieved successfully",
        serde_json::json!({ "categories": categories }),
    ))
}

/// Name and color only; the kind of a category is immutable, so a stray
/// `type` field in the payload is ignored.
#[derive(Debug, Deserialize)]
pub struct UpdateCategoryPayload {
    pub name: Option<String>,
    pub color: Option<String>,
}

pub async fn update_category(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateCategoryPayload>,
) -> Result<ApiResponse, AppError> {
    let id = super::parse_uuid("id", &id)?;
    let mut category = queries::get_category(&state.db, user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        validation::validate_required("name", &name)?;
        validation::validate_max_len("name", &name, validation::NAME_MAX_LEN)?;
        category.name = name;
    }

    if let Some(color) = payload.color {
        validation::validate_color("color", &color)?;
        category.color = color;
    }

    let updated = queries::update_category(&state.db, &category)
        .await
        .map_err(|err| {
            if queries::is_unique_violation(&err) {
                AppError::Validation("Category already exists with this name".to_string())
            } else {
                err.into()
            }
        })?;

    Ok(ApiResponse::ok(
        "Category updated successfully",
        serde_json::json!({ "category": CategoryDto::from(updated) }),
    ))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<ApiResponse, AppError> {
    let id = super::parse_uuid("id", &id)?;
    let deleted = queries::deactivate_category(&state.db, user_id, id).await?;
    if !deleted {
        return Err(AppError::NotFound("Category not found".to_string()));
    }

    Ok(ApiResponse::ok(
        "Category deleted successfully",
        serde_json::Value::Null,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_payload_has_no_kind_field() {
        // A client sending `type` on update gets a silent no-op; only name
        // and color are accepted.
        let payload: UpdateCategoryPayload =
            serde_json::from_str(r##"{"color": "#123456", "type": "income"}"##).unwrap();

        assert_eq!(payload.color.as_deref(), Some("#123456"));
        assert!(payload.name.is_none());
    }

    #[test]
    fn kind_tokens_parse_or_reject() {
        assert!(parse_kind("type", "income").is_ok());
        assert!(parse_kind("type", "expense").is_ok());

        let err = parse_kind("type", "transfer").unwrap_err();
        assert!(err.to_string().contains("income, expense"));
    }
}
