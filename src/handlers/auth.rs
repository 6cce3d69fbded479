use actix_web::{post, web, HttpMessage, HttpRequest, HttpResponse};
use log::info;

use crate::{
    dto::{LoginUserRequest, NewUserDto},
    errors::AppError,
    service::{self, auth::UserAuthData, AppState},
};

#[post("/login")]
pub async fn login(
    dto: web::Json<LoginUserRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let response = service::user::login(state.get_ref(), dto.into_inner()).await?;
    info!("RESPONSE /AUTH/LOGIN: {}", response.user.id);
    Ok(HttpResponse::Ok().json(response))
}

#[post("/register")]
pub async fn register(
    req: HttpRequest,
    dto: web::Json<NewUserDto>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let caller = req.extensions().get::<UserAuthData>().cloned();
    let user = service::user::create(state.get_ref(), dto.into_inner(), caller.as_ref()).await?;
    Ok(HttpResponse::Created().json(user))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(login).service(register);
}
