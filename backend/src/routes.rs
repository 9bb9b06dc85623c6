use actix_multipart::Multipart;
use actix_web::{web, Error, HttpResponse};
use futures::{StreamExt, TryStreamExt};
use log::{error, info, warn};
use shared::{ClassesResponse, ErrorResponse, HealthResponse, ServiceInfo};
use std::io::Write;
use uuid::Uuid;

use crate::diagnosis::service::DiagnosisService;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(home)))
        .service(web::resource("/health").route(web::get().to(health_check)))
        .service(web::resource("/classes").route(web::get().to(get_classes)))
        .service(web::resource("/api/predict").route(web::post().to(predict_disease)));
}

async fn home(service: web::Data<DiagnosisService>) -> HttpResponse {
    HttpResponse::Ok().json(ServiceInfo {
        message: "Tomato Disease Detection API".into(),
        status: "Running".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        classes: service.class_count(),
        model_accuracy: service.model_accuracy().into(),
        endpoint: "POST /api/predict".into(),
    })
}

async fn health_check(service: web::Data<DiagnosisService>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".into(),
        model_loaded: true,
        classes_loaded: service.class_count(),
        backend: service.backend_name().into(),
    })
}

async fn get_classes(service: web::Data<DiagnosisService>) -> HttpResponse {
    HttpResponse::Ok().json(ClassesResponse {
        total_classes: service.class_count(),
        classes: service.class_labels().to_vec(),
    })
}

async fn predict_disease(
    service: web::Data<DiagnosisService>,
    mut payload: Multipart,
) -> Result<HttpResponse, Error> {
    let request_id = Uuid::new_v4();
    let mut image_data = Vec::new();

    while let Ok(Some(mut field)) = payload.try_next().await {
        while let Some(chunk) = field.next().await {
            let data = chunk?;
            image_data.write_all(&data)?;
        }
        if !image_data.is_empty() {
            break;
        }
    }

    if image_data.is_empty() {
        warn!("[{}] Request carried no image data", request_id);
        return Ok(HttpResponse::BadRequest().json(ErrorResponse::new("No image uploaded")));
    }

    let image = match image::load_from_memory(&image_data) {
        Ok(image) => image,
        Err(e) => {
            warn!("[{}] Failed to decode upload: {}", request_id, e);
            return Ok(HttpResponse::BadRequest()
                .json(ErrorResponse::new(format!("Invalid image file: {}", e))));
        }
    };

    let pipeline = service.clone();
    let result = web::block(move || pipeline.diagnose(&image)).await?;

    match result {
        Ok(mut response) => {
            info!(
                "[{}] {} ({:.2}%) risk {}",
                request_id, response.predicted_class, response.confidence, response.risk_level
            );
            response.timestamp = Some(chrono::Utc::now().to_rfc3339());
            Ok(HttpResponse::Ok().json(response))
        }
        Err(e) if e.is_client_error() => {
            warn!("[{}] Image rejected: {}", request_id, e);
            Ok(HttpResponse::BadRequest().json(ErrorResponse::new(e.to_string())))
        }
        Err(e) => {
            error!("[{}] {}", request_id, e);
            Ok(HttpResponse::InternalServerError().json(ErrorResponse::new(e.to_string())))
        }
    }
}
