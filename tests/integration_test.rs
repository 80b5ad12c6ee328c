use axum::body::Body;
use axum::http::{Request, StatusCode};
use clap::Parser;
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use receipt_scan::config::{Args, Config};
use receipt_scan::preprocessing::steps::deskew::detect_skew_angle;
use receipt_scan::server::{router, AppState};
use receipt_scan::{Locale, ReceiptScanner, ScanError, TextRecognizer};
use serde_json::Value;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const BOUNDARY: &str = "receipt-scan-test-boundary";

/// Recognizer that always returns the same lines
struct CannedRecognizer(Vec<&'static str>);

impl TextRecognizer for CannedRecognizer {
    fn name(&self) -> &'static str {
        "canned"
    }

    fn description(&self) -> &'static str {
        "Returns a fixed receipt"
    }

    fn recognize(&self, _image: &GrayImage) -> Result<Vec<String>, ScanError> {
        Ok(self.0.iter().map(|s| s.to_string()).collect())
    }

    fn supported_languages(&self) -> Vec<String> {
        vec!["spa".to_string()]
    }
}

/// Recognizer standing in for an engine that crashed or ran out of memory
struct FailingRecognizer;

impl TextRecognizer for FailingRecognizer {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn description(&self) -> &'static str {
        "Always fails"
    }

    fn recognize(&self, _image: &GrayImage) -> Result<Vec<String>, ScanError> {
        Err(ScanError::RecognitionUnavailable(
            "out of memory".to_string(),
        ))
    }

    fn supported_languages(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Recognizer slower than any reasonable timeout
struct StalledRecognizer;

impl TextRecognizer for StalledRecognizer {
    fn name(&self) -> &'static str {
        "stalled"
    }

    fn description(&self) -> &'static str {
        "Sleeps past the recognition timeout"
    }

    fn recognize(&self, _image: &GrayImage) -> Result<Vec<String>, ScanError> {
        std::thread::sleep(Duration::from_secs(2));
        Ok(Vec::new())
    }

    fn supported_languages(&self) -> Vec<String> {
        Vec::new()
    }
}

fn receipt_lines() -> CannedRecognizer {
    CannedRecognizer(vec![
        "SUPERMERCADO EL SOL",
        "NIF B-12345678",
        "Leche Entera 1L",
        "Pan de Molde",
        "Leche Entera 1L",
        "8412345678901",
        "TOTAL: 23,45€",
        "TARJETA VISA",
        "Gracias por su compra",
    ])
}

/// Receipt-like photo: dark text bars on light paper, rotated by `degrees`
fn skewed_receipt(degrees: f32) -> RgbImage {
    let (sin_a, cos_a) = degrees.to_radians().sin_cos();
    RgbImage::from_fn(400, 300, |x, y| {
        let dx = x as f32 - 200.0;
        let dy = y as f32 - 150.0;
        let u = dx * cos_a + dy * sin_a;
        let v = -dx * sin_a + dy * cos_a;
        let in_bar = u.abs() <= 120.0 && v.abs() <= 70.0 && (v + 70.0) % 28.0 < 12.0;
        if in_bar {
            Rgb([25, 20, 30])
        } else {
            Rgb([238, 232, 225])
        }
    })
}

fn encode_png(image: DynamicImage) -> Vec<u8> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .expect("Failed to encode PNG");
    buf
}

fn test_config(extra: &[&str]) -> Config {
    let mut argv = vec!["receipt-scan-server"];
    argv.extend_from_slice(extra);
    Config::from(Args::parse_from(argv))
}

fn app(recognizer: Arc<dyn TextRecognizer>, config: Config) -> axum::Router {
    let scanner = ReceiptScanner::new(recognizer, config.vocabulary);
    router(AppState::new(scanner, config))
}

fn multipart_request(field: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"receipt.png\"\r\nContent-Type: image/png\r\n\r\n",
            BOUNDARY, field
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/scan")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Failed to parse response")
}

#[test]
fn test_rotated_receipt_is_straightened() {
    let scanner = ReceiptScanner::new(Arc::new(receipt_lines()), Locale::Es);
    let png = encode_png(DynamicImage::ImageRgb8(skewed_receipt(10.0)));

    let outcome = scanner.scan(&png).unwrap();

    assert!(outcome.preprocessing.rotated);
    assert!(
        (outcome.preprocessing.skew_degrees - 10.0).abs() < 0.5,
        "Detected {} degrees",
        outcome.preprocessing.skew_degrees
    );

    let residual = detect_skew_angle(&outcome.preprocessing.image);
    assert!(residual.abs() < 0.5, "Residual skew {} degrees", residual);
}

#[test]
fn test_scan_returns_items_in_order() {
    let scanner = ReceiptScanner::new(Arc::new(receipt_lines()), Locale::Es);
    let png = encode_png(DynamicImage::ImageRgb8(skewed_receipt(0.0)));

    let outcome = scanner.scan(&png).unwrap();

    assert_eq!(
        outcome.candidates,
        [
            "SUPERMERCADO EL SOL",
            "Leche Entera 1L",
            "Pan de Molde",
            "Leche Entera 1L"
        ]
    );
    assert_eq!(outcome.lines.len(), 9);
    assert_eq!(outcome.dropped.len(), 5);
    assert!(!outcome.preprocessing.rotated);
}

#[test]
fn test_output_never_below_size_floor() {
    let scanner = ReceiptScanner::new(Arc::new(receipt_lines()), Locale::Es);

    for (width, height) in [(40, 90), (120, 20), (399, 100), (450, 60), (500, 400)] {
        let img = GrayImage::from_pixel(width, height, Luma([220]));
        let outcome = scanner
            .scan(&encode_png(DynamicImage::ImageLuma8(img)))
            .unwrap();
        let (w, h) = (outcome.preprocessing.width, outcome.preprocessing.height);

        assert!(w >= 400 && h >= 100, "{}x{} -> {}x{}", width, height, w, h);
        assert!(w >= width && h >= height, "{}x{} shrank", width, height);
    }
}

#[test]
fn test_scans_run_in_parallel() {
    let scanner = ReceiptScanner::new(Arc::new(receipt_lines()), Locale::Es);
    let png = encode_png(DynamicImage::ImageRgb8(skewed_receipt(4.0)));

    let results: Vec<Vec<String>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| scanner.scan(&png).unwrap().candidates))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = app(Arc::new(receipt_lines()), test_config(&[]));

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert!(!body["version"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_info_endpoint() {
    let app = app(Arc::new(receipt_lines()), test_config(&["--vocabulary", "en"]));

    let response = app
        .oneshot(Request::get("/info").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["engine"], "canned");
    assert_eq!(body["vocabulary"], "en");
    assert_eq!(body["supported_languages"][0], "spa");
    assert_eq!(body["max_file_size_bytes"], 52428800);
}

#[tokio::test]
async fn test_scan_endpoint() {
    let app = app(Arc::new(receipt_lines()), test_config(&[]));
    let png = encode_png(DynamicImage::ImageRgb8(skewed_receipt(10.0)));

    let response = app.oneshot(multipart_request("file", &png)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["engine"], "canned");
    assert_eq!(body["candidates"][1], "Leche Entera 1L");
    assert_eq!(body["candidates"].as_array().unwrap().len(), 4);
    assert_eq!(body["rotated"], true);
    assert_eq!(body["width"], 400);
    assert_eq!(body["height"], 300);
    assert_eq!(body["steps"].as_array().unwrap().len(), 6);

    let reasons: Vec<&str> = body["dropped"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["reason"].as_str().unwrap())
        .collect();
    assert_eq!(
        reasons,
        [
            "barcode_like",
            "pure_numeric",
            "boilerplate",
            "boilerplate",
            "boilerplate"
        ]
    );
}

#[tokio::test]
async fn test_scan_without_file_is_rejected() {
    let app = app(Arc::new(receipt_lines()), test_config(&[]));

    let response = app
        .oneshot(multipart_request("attachment", b"irrelevant"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], "MISSING_FILE");
}

#[tokio::test]
async fn test_undecodable_image_is_rejected() {
    let app = app(Arc::new(receipt_lines()), test_config(&[]));

    let response = app
        .oneshot(multipart_request("file", b"this is not an image"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json_body(response).await["code"], "INVALID_IMAGE");
}

#[tokio::test]
async fn test_recognition_failure_returns_503() {
    let app = app(Arc::new(FailingRecognizer), test_config(&[]));
    let png = encode_png(DynamicImage::ImageRgb8(skewed_receipt(0.0)));

    let response = app.oneshot(multipart_request("file", &png)).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(response).await["code"], "RECOGNITION_UNAVAILABLE");
}

#[tokio::test]
async fn test_recognition_timeout_returns_503() {
    let app = app(
        Arc::new(StalledRecognizer),
        test_config(&["--recognition-timeout-secs", "1"]),
    );
    let png = encode_png(DynamicImage::ImageLuma8(GrayImage::from_pixel(
        50,
        50,
        Luma([200]),
    )));

    let response = app.oneshot(multipart_request("file", &png)).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("timed out"));
}
