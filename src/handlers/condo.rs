use actix_web::{get, web, HttpResponse};
use uuid::Uuid;

use super::records::crud_routes;
use crate::{
    db::event::EventFilter,
    dto::ListQuery,
    errors::AppError,
    models::Condominium,
    service::{self, AppState},
};

#[get("/{id}/events")]
pub async fn events(
    id: web::Path<Uuid>,
    query: web::Query<ListQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let condominium_id = id.into_inner();
    service::records::get_by_id::<Condominium>(state.get_ref(), condominium_id).await?;
    let filter = EventFilter::for_condominium(condominium_id);
    let page = service::event::list(state.get_ref(), &filter, query.page(), query.limit()).await;
    Ok(HttpResponse::Ok().json(page))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(events);
    crud_routes::<Condominium>(cfg, "");
}
