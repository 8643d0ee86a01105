use actix_web::web;

use crate::handlers;

pub mod operations;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(handlers::operations::health))
        .service(web::scope("/api/v1").configure(operations::configure));
}
