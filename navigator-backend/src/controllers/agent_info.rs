use actix_web::{web, HttpResponse, Responder};
use serde_json::{json, Map, Value};

use crate::models::{ServiceType, ROADMAP_TIMELINES};

/// Version from Cargo.toml, available at compile time
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(root)));
    cfg.service(web::resource("/input_schema").route(web::get().to(input_schema)));
    cfg.service(web::resource("/availability").route(web::get().to(availability)));
}

async fn root() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "message": "Cardano Career Navigator AI Agent",
        "version": VERSION,
        "services": ServiceType::names(),
        "status": "active"
    }))
}

async fn input_schema() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "type": "object",
        "properties": {
            "type": {
                "type": "string",
                "enum": ServiceType::names(),
                "description": "Type of service requested"
            },
            "user_address": {
                "type": "string",
                "description": "Cardano wallet address for analysis"
            },
            "timeline": {
                "type": "string",
                "enum": ROADMAP_TIMELINES,
                "description": "Timeline for roadmap service (optional for other services)"
            }
        },
        "required": ["type", "user_address"]
    }))
}

async fn availability() -> impl Responder {
    let services: Map<String, Value> = ServiceType::all()
        .into_iter()
        .map(|service| {
            (
                service.to_string(),
                json!({
                    "price": service.price(),
                    "estimated_time": service.estimated_time()
                }),
            )
        })
        .collect();

    HttpResponse::Ok().json(json!({
        "available": true,
        "status": "ready",
        "services": services
    }))
}
