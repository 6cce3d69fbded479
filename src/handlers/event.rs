use actix_web::{delete, get, post, put, web, HttpResponse};
use uuid::Uuid;

use crate::{
    dto::{EventListQuery, NewEventDto, UpdateEventStatusDto},
    errors::AppError,
    service::{self, auth::UserAuthData, AppState},
};

#[get("")]
pub async fn get_all(
    query: web::Query<EventListQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let paging = query.list_query();
    let events =
        service::event::list(state.get_ref(), &query.filter(), paging.page(), paging.limit())
            .await;
    Ok(HttpResponse::Ok().json(events))
}

#[post("")]
pub async fn create(
    new_event_dto: web::Json<NewEventDto>,
    user_auth_data: UserAuthData,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let event =
        service::event::create(state.get_ref(), &user_auth_data, new_event_dto.into_inner())
            .await?;
    Ok(HttpResponse::Created().json(event))
}

#[get("/{id}")]
pub async fn get_by_id(
    id: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let event = service::event::get_by_id(state.get_ref(), id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(event))
}

#[put("/{id}/status")]
pub async fn update_status(
    id: web::Path<Uuid>,
    dto: web::Json<UpdateEventStatusDto>,
    user_auth_data: UserAuthData,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let event = service::event::set_status(
        state.get_ref(),
        &user_auth_data,
        id.into_inner(),
        dto.status,
    )
    .await?;
    Ok(HttpResponse::Ok().json(event))
}

#[delete("/{id}")]
pub async fn delete(
    id: web::Path<Uuid>,
    user_auth_data: UserAuthData,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    service::event::delete(state.get_ref(), &user_auth_data, id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(get_all)
        .service(create)
        .service(get_by_id)
        .service(update_status)
        .service(delete);
}
