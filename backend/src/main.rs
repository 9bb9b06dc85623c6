use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use backend::config::{AppConfig, PipelineConfig};
use backend::diagnosis::knowledge_base::DiseaseKnowledgeBase;
use backend::diagnosis::service::DiagnosisService;
use backend::inference::labels::ClassLabels;
use backend::inference::model::load_classifier;
use backend::routes::configure_routes;
use std::env;

fn startup_error(message: String) -> std::io::Error {
    log::error!("{}", message);
    std::io::Error::new(std::io::ErrorKind::Other, message)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    if let Ok(current_dir) = env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    }

    let config = AppConfig::from_env()
        .map_err(|e| startup_error(format!("Invalid configuration: {}", e)))?;
    let pipeline_config = PipelineConfig::load(config.pipeline_config_path.as_deref())
        .map_err(|e| startup_error(format!("Failed to load pipeline config: {}", e)))?;

    let labels = ClassLabels::load(&config.class_names_path)
        .map_err(|e| startup_error(format!("Failed to load class names: {}", e)))?;
    log::info!("Loaded {} classes", labels.len());

    let knowledge_base = DiseaseKnowledgeBase::load(config.disease_db_path.as_deref())
        .map_err(|e| startup_error(format!("Failed to load disease table: {}", e)))?;
    log::info!("Loaded {} disease records", knowledge_base.len());

    let classifier = load_classifier(config.model_backend, &config.model_path)
        .map_err(|e| startup_error(format!("Model loading failed: {}", e)))?;
    log::info!(
        "Model {} loaded with the {} backend",
        config.model_path.display(),
        classifier.name()
    );

    let service = web::Data::new(DiagnosisService::new(
        classifier,
        labels,
        knowledge_base,
        pipeline_config,
    ));

    let bind_address = config.bind_address();
    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(service.clone())
            .configure(configure_routes)
    })
    .bind(&bind_address)?
    .run()
    .await
}
