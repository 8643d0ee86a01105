use actix_web::web;

use crate::handlers::operations;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/operations")
            .route("", web::get().to(operations::list_operations))
            .route("", web::post().to(operations::execute_batch))
            .route("/{name}", web::post().to(operations::execute_operation)),
    );
}
