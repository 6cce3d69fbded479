use actix_web::{delete, get, patch, web, HttpResponse};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    dto::ListQuery,
    errors::AppError,
    service::{self, auth::UserAuthData, AppState},
};

#[get("")]
pub async fn get_all(
    query: web::Query<ListQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let users =
        service::user::get_all(state.get_ref(), &query.owner(), query.page(), query.limit()).await;
    Ok(HttpResponse::Ok().json(users))
}

#[get("/{id}")]
pub async fn get_by_id(
    id: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user = service::user::get_by_id(state.get_ref(), id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

#[patch("/{id}")]
pub async fn update(
    id: web::Path<Uuid>,
    patch: web::Json<Value>,
    caller: UserAuthData,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user =
        service::user::update(state.get_ref(), &caller, id.into_inner(), patch.into_inner())
            .await?;
    Ok(HttpResponse::Ok().json(user))
}

#[delete("/{id}")]
pub async fn delete(
    id: web::Path<Uuid>,
    caller: UserAuthData,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    service::user::delete(state.get_ref(), &caller, id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(get_all)
        .service(get_by_id)
        .service(update)
        .service(delete);
}
