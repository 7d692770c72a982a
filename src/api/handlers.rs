use actix_web::{web, HttpResponse, Responder};
use tracing::{debug, error, info, instrument, warn};

use crate::api::models::{AnalyzeRequest, AnalyzeResponse, ErrorResponse, HealthStatus, InvalidResponse};
use crate::api::processor::UrlAnalyzer;
use crate::data_classifier::Verdict;

const HOME_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>PhishScan</title>
</head>
<body>
  <h1>PhishScan URL classifier</h1>
  <p>Classifies URLs as safe or malicious.</p>
  <ul>
    <li><code>POST /analyze_url</code> with <code>{"url": "https://example.com"}</code></li>
    <li><code>GET /health</code></li>
  </ul>
</body>
</html>
"#;

/// Landing page listing the available endpoints
pub async fn home() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(HOME_PAGE)
}

/// HTTP handler for URL classification
///
/// The body is parsed leniently: anything without a non-empty string `url`
/// is answered with "No URL provided" rather than an extractor error.
///
/// # Arguments
/// * `body` - Raw request body, expected to be `{"url": "..."}`
/// * `analyzer` - Shared classification pipeline
///
/// # Returns
/// * HTTP response with the verdict, or error information
#[instrument(skip(body, analyzer))]
pub async fn analyze_url(body: web::Bytes, analyzer: web::Data<UrlAnalyzer>) -> impl Responder {
    let Some(url) = AnalyzeRequest::url_from_body(&body) else {
        warn!("Rejected request without a usable URL ({} byte body)", body.len());
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "No URL provided".to_string(),
        });
    };

    match analyzer.analyze(&url).await {
        Ok(result) if result.verdict == Verdict::Invalid => {
            debug!("Answering invalid URL for {}", url);
            HttpResponse::BadRequest().json(InvalidResponse {
                result: result.verdict.message().to_string(),
            })
        }
        Ok(result) => {
            info!("Classified {} as {}", url, result.verdict);
            HttpResponse::Ok().json(AnalyzeResponse {
                url: result.resolved_url,
                result: result.verdict.message().to_string(),
            })
        }
        Err(e) => {
            error!("Classification failed for {}: {}", url, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: format!("Classification failed: {}", e),
            })
        }
    }
}

/// Health check endpoint for monitoring service status
#[instrument(skip(analyzer))]
pub async fn health_check(analyzer: web::Data<UrlAnalyzer>) -> impl Responder {
    debug!("Processing health check request");

    HttpResponse::Ok().json(HealthStatus {
        status: "healthy".to_string(),
        trusted_domains: analyzer.policy().trusted_domains().len(),
        shorteners: analyzer.resolver().config().shorteners.len(),
    })
}
