use actix_web::{post, web, HttpResponse};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    dto::{ListQuery, VoteDto},
    errors::AppError,
    models::{Bill, CondoDocument, MarketplaceItem, Poll, SupportTicket, Visitor},
    service::{self, auth::UserAuthData, records::Record, AppState},
};

pub async fn list<T: Record>(
    query: web::Query<ListQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let page = service::records::list::<T>(
        state.get_ref(),
        &query.owner(),
        query.page(),
        query.limit(),
    )
    .await;
    Ok(HttpResponse::Ok().json(page))
}

pub async fn get_by_id<T: Record>(
    id: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let record = service::records::get_by_id::<T>(state.get_ref(), id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(record))
}

pub async fn create<T: Record>(
    payload: web::Json<Value>,
    caller: UserAuthData,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let record =
        service::records::create::<T>(state.get_ref(), &caller, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(record))
}

pub async fn update<T: Record>(
    id: web::Path<Uuid>,
    patch: web::Json<Value>,
    caller: UserAuthData,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let record = service::records::update::<T>(
        state.get_ref(),
        &caller,
        id.into_inner(),
        patch.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(record))
}

pub async fn delete<T: Record>(
    id: web::Path<Uuid>,
    caller: UserAuthData,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    service::records::delete::<T>(state.get_ref(), &caller, id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[post("/polls/{id}/vote")]
pub async fn vote(
    id: web::Path<Uuid>,
    dto: web::Json<VoteDto>,
    caller: UserAuthData,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let poll =
        service::records::vote(state.get_ref(), &caller, id.into_inner(), dto.option_index).await?;
    Ok(HttpResponse::Ok().json(poll))
}

/// `GET|POST {path}` and `GET|PATCH|DELETE {path}/{id}` for one record type.
pub fn crud_routes<T: Record>(cfg: &mut web::ServiceConfig, path: &str) {
    cfg.service(
        web::resource(path)
            .route(web::get().to(list::<T>))
            .route(web::post().to(create::<T>)),
    )
    .service(
        web::resource(format!("{path}/{{id}}"))
            .route(web::get().to(get_by_id::<T>))
            .route(web::patch().to(update::<T>))
            .route(web::delete().to(delete::<T>)),
    );
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(vote);
    crud_routes::<Bill>(cfg, "/bills");
    crud_routes::<Visitor>(cfg, "/visitors");
    crud_routes::<MarketplaceItem>(cfg, "/marketplace");
    crud_routes::<Poll>(cfg, "/polls");
    crud_routes::<SupportTicket>(cfg, "/tickets");
    crud_routes::<CondoDocument>(cfg, "/documents");
}
