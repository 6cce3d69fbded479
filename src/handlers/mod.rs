pub mod auth;
pub mod condo;
pub mod event;
pub mod records;
pub mod user;

use actix_web::web;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/auth").configure(auth::init_routes))
        .service(web::scope("/users").configure(user::init_routes))
        .service(web::scope("/condominiums").configure(condo::init_routes))
        .service(web::scope("/events").configure(event::init_routes))
        .configure(records::init_routes);
}
