//! Condominium management backend: bookings of shared resources with
//! conflict detection, plus the owner-scoped records around them (bills,
//! visitors, polls, tickets, documents and a marketplace) kept in a
//! snapshot-backed in-process store.

pub mod client;
pub mod config;
pub mod db;
pub mod dto;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod service;

use actix_web::{
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web, App, Error,
};

use service::{auth::AuthMiddleware, log::LoggerMiddleware, AppState};

/// The full application, shared by the binary and the HTTP tests.
pub fn build_app(
    state: AppState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = Error,
        InitError = (),
    >,
> {
    let jwt = state.jwt.clone();
    App::new()
        .app_data(web::Data::new(state))
        .wrap(AuthMiddleware { jwt })
        .wrap(LoggerMiddleware)
        .configure(handlers::config)
}
