use actix_files::Files;
use actix_multipart::Multipart;
use actix_web::{web, Error, HttpResponse};
use futures::{StreamExt, TryStreamExt};
use log::{debug, error, info, warn};
use shared::{ErrorResponse, HealthResponse, InfoResponse, PredictResponse, SupportedFormat};
use std::path::PathBuf;

use crate::classifier::validator::MAX_FILE_BYTES;
use crate::classifier::Classifier;
use crate::storage::upload_store::UploadStore;

const UPLOAD_FIELD: &str = "img";

pub fn configure_routes(cfg: &mut web::ServiceConfig, static_dir: PathBuf, upload_dir: PathBuf) {
    cfg.service(web::resource("/api/predict").route(web::post().to(predict)))
        .service(
            web::resource("/predict")
                .route(web::post().to(predict))
                .route(web::get().to(redirect_home)),
        )
        .service(web::resource("/health").route(web::get().to(health_check)))
        .service(web::resource("/info").route(web::get().to(app_info)))
        .service(Files::new("/uploads", upload_dir))
        .service(Files::new("/static", static_dir.clone()))
        .service(Files::new("/", static_dir).index_file("index.html"));
}

struct Upload {
    file_name: String,
    image_data: Vec<u8>,
}

enum UploadOutcome {
    Received(Upload),
    Missing,
    TooLarge,
    Malformed,
}

async fn read_upload(payload: &mut Multipart) -> Result<UploadOutcome, Error> {
    let mut upload = None;

    loop {
        let mut field = match payload.try_next().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!("Unreadable multipart body: {}", e);
                return Ok(UploadOutcome::Malformed);
            }
        };

        if field.name() != Some(UPLOAD_FIELD) {
            while let Some(chunk) = field.next().await {
                chunk?;
            }
            continue;
        }

        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .unwrap_or_default()
            .to_string();

        let mut image_data = Vec::new();
        while let Some(chunk) = field.next().await {
            let data = match chunk {
                Ok(data) => data,
                Err(e) => {
                    warn!("Upload field cut short: {}", e);
                    return Ok(UploadOutcome::Malformed);
                }
            };
            if (image_data.len() + data.len()) as u64 > MAX_FILE_BYTES {
                return Ok(UploadOutcome::TooLarge);
            }
            image_data.extend_from_slice(&data);
        }
        upload = Some(Upload {
            file_name,
            image_data,
        });
    }

    Ok(upload.map_or(UploadOutcome::Missing, UploadOutcome::Received))
}

async fn predict(
    classifier: web::Data<Classifier>,
    store: web::Data<UploadStore>,
    mut payload: Multipart,
) -> Result<HttpResponse, Error> {
    let upload = match read_upload(&mut payload).await? {
        UploadOutcome::Received(upload) => upload,
        UploadOutcome::Missing => {
            return Ok(HttpResponse::BadRequest().json(ErrorResponse::new("No file uploaded")));
        }
        UploadOutcome::TooLarge => {
            warn!("Upload rejected: larger than {} bytes", MAX_FILE_BYTES);
            return Ok(HttpResponse::PayloadTooLarge().json(ErrorResponse::new("File too large")));
        }
        UploadOutcome::Malformed => {
            return Ok(HttpResponse::BadRequest().json(ErrorResponse::new("Malformed multipart body")));
        }
    };

    if upload.file_name.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ErrorResponse::new("No file selected")));
    }
    if !UploadStore::allowed_file(&upload.file_name) {
        warn!("Upload rejected: invalid file type {}", upload.file_name);
        return Ok(HttpResponse::BadRequest().json(ErrorResponse::new("Invalid file type")));
    }

    let original_name = upload.file_name.clone();
    let store = store.into_inner();
    let saving = store.clone();
    let saved = web::block(move || saving.save(&upload.image_data, &upload.file_name)).await;
    let (stored_name, path) = match saved {
        Ok(Ok(saved)) => saved,
        Ok(Err(e)) => {
            error!("Failed to store upload {}: {}", original_name, e);
            return Ok(HttpResponse::InternalServerError().json(ErrorResponse::new("Analysis failed")));
        }
        Err(e) => {
            error!("Blocking pool error while storing {}: {}", original_name, e);
            return Ok(HttpResponse::InternalServerError().json(ErrorResponse::new("Analysis failed")));
        }
    };

    let classifier = *classifier.get_ref();
    let name_for_model = original_name.clone();
    let prediction = match web::block(move || classifier.predict_path(&path, &name_for_model)).await {
        Ok(prediction) => prediction,
        Err(e) => {
            error!("Blocking pool error while predicting {}: {}", original_name, e);
            return Ok(HttpResponse::InternalServerError().json(ErrorResponse::new("Analysis failed")));
        }
    };

    if !prediction.is_success() {
        info!("Analysis failed for {}: {}", original_name, prediction.raw_label);
        let rejected = stored_name.clone();
        match web::block(move || store.remove(&rejected)).await {
            Ok(Ok(())) => debug!("Removed rejected upload {}", stored_name),
            Ok(Err(e)) => warn!("Failed to remove rejected upload {}: {}", stored_name, e),
            Err(e) => warn!("Blocking pool error while removing {}: {}", stored_name, e),
        }
        return Ok(HttpResponse::UnprocessableEntity().json(ErrorResponse {
            error: prediction.raw_label.clone(),
            success: false,
            prediction: Some(prediction.display_label),
            original_prediction: Some(prediction.raw_label),
        }));
    }

    let confidence = classifier.confidence(&prediction.raw_label).unwrap_or_default();
    Ok(HttpResponse::Ok().json(PredictResponse {
        success: true,
        prediction: prediction.display_label,
        original_prediction: prediction.raw_label,
        image_url: format!("/uploads/{}", stored_name),
        confidence,
        signature: prediction.signature.map(Into::into),
    }))
}

async fn redirect_home() -> HttpResponse {
    HttpResponse::Found()
        .append_header(("Location", "/"))
        .finish()
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

async fn app_info(classifier: web::Data<Classifier>) -> HttpResponse {
    HttpResponse::Ok().json(InfoResponse {
        name: "Plant Disease Prediction API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        description: "Plant disease detection and diagnosis from leaf images".to_string(),
        supported_formats: SupportedFormat::extensions(),
        max_file_size: format!("{}MB", MAX_FILE_BYTES / (1024 * 1024)),
        signature_strategy: classifier.strategy(),
    })
}
