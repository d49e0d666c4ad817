pub mod agent_info;
pub mod jobs;

use actix_web::web;

use crate::errors::ApiError;

/// JSON extractor config that reports bad bodies as `InvalidInput`
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        log::debug!("[API] Rejected JSON body: {}", err);
        ApiError::InvalidInput(format!("Invalid input data: {}", err)).into()
    })
}

/// Query extractor config that reports bad query strings as `InvalidInput`
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        ApiError::InvalidInput(format!("Invalid query parameters: {}", err)).into()
    })
}
