//! Contract Invariant Tests
//!
//! These tests verify the non-negotiable guarantees.

use std::io::Cursor;
use std::path::Path;

use artifice_core::{
    encoding,
    hashing::{self, HashAlgorithm, HashVerifyRequest, OutputEncoding},
    password::{self, PasswordGenerateRequest, ZxcvbnEstimator},
    qr::{
        scan::{self, QrScanRequest},
        ColorMaskConfig, ColorMaskType, ImageSize, ModuleDrawerConfig, ModuleDrawerType, OutputFormat, QrPipeline,
        QrRenderRequest, RqrrDetector, ScratchDir,
    },
    HexColor,
};

fn create_pipeline() -> (tempfile::TempDir, QrPipeline) {
    let tmp = tempfile::tempdir().unwrap();
    let scratch = ScratchDir::create(tmp.path().join("scratch")).unwrap();
    (tmp, QrPipeline::new(scratch))
}

fn scratch_entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

fn logo_base64() -> String {
    let img = image::RgbaImage::from_pixel(16, 16, image::Rgba([220, 40, 40, 255]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    format!("data:image/png;base64,{}", encoding::encode(buf.get_ref()))
}

#[test]
fn invariant_styling_requires_styled_mode() {
    let (_tmp, pipeline) = create_pipeline();

    let request = QrRenderRequest {
        color_mask: Some(ColorMaskConfig::default()),
        embedded_image: Some(logo_base64()),
        ..QrRenderRequest::new("https://example.com")
    };

    let err = pipeline.generate(&request).unwrap_err();
    assert_eq!(err.code(), "styled_image_required");
    assert_eq!(err.status(), 400);
    // Rejected before anything was staged
    assert_eq!(scratch_entries(pipeline.scratch().path()), 0);
}

#[test]
fn invariant_final_size_png_only() {
    let (_tmp, pipeline) = create_pipeline();

    for format in [OutputFormat::Svg, OutputFormat::SvgPath, OutputFormat::SvgFragment, OutputFormat::Ascii] {
        let request = QrRenderRequest {
            output_format: format,
            final_size: Some(300),
            ..QrRenderRequest::new("https://example.com")
        };
        let err = pipeline.generate(&request).unwrap_err();
        assert_eq!(err.code(), "final_size_png_only");
    }
}

#[test]
fn invariant_image_mask_rejects_black_back() {
    let (_tmp, pipeline) = create_pipeline();

    // The pattern is garbage; the color check must win regardless
    let request = QrRenderRequest {
        use_styled_image: true,
        color_mask: Some(ColorMaskConfig {
            kind: ColorMaskType::Image,
            back_color: Some(HexColor::parse("#000000").unwrap()),
            color_mask_image: Some("not an image".to_string()),
            ..Default::default()
        }),
        ..QrRenderRequest::new("https://example.com")
    };

    let err = pipeline.generate(&request).unwrap_err();
    assert_eq!(err.code(), "invalid_color_combination");
}

#[test]
fn invariant_raster_output_has_size() {
    let (_tmp, pipeline) = create_pipeline();

    let request: QrRenderRequest =
        serde_json::from_str(r#"{"data": "https://example.com", "error_correction": "M"}"#).unwrap();
    let output = pipeline.generate(&request).unwrap();

    assert_eq!(output.format, OutputFormat::Png);
    let size = output.size.expect("raster output reports its size");
    assert!(!output.image.is_empty());

    let png = encoding::decode_payload(&output.image).unwrap();
    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!(ImageSize { width: decoded.width(), height: decoded.height() }, size);
}

#[test]
fn invariant_vector_output_has_no_size() {
    let (_tmp, pipeline) = create_pipeline();

    let request = QrRenderRequest {
        output_format: OutputFormat::Svg,
        ..QrRenderRequest::new("https://example.com")
    };
    let output = pipeline.generate(&request).unwrap();

    assert!(output.size.is_none());
    assert!(output.image.starts_with("<?xml"));
    assert!(output.image.contains("<svg"));
    assert!(output.image.trim_end().ends_with("</svg>"));

    let json = serde_json::to_value(&output).unwrap();
    assert!(json["size"].is_null());
    assert_eq!(json["format"], "svg");
}

#[test]
fn invariant_unset_eye_drawer_keeps_square_finders() {
    let (_tmp, pipeline) = create_pipeline();

    let request = QrRenderRequest {
        use_styled_image: true,
        border: 0,
        box_size: 20,
        module_drawer: Some(ModuleDrawerConfig {
            kind: ModuleDrawerType::Circle,
            ..Default::default()
        }),
        ..QrRenderRequest::new("https://example.com")
    };

    let output = pipeline.generate(&request).unwrap();
    let png = encoding::decode_payload(&output.image).unwrap();
    let decoded = image::load_from_memory(&png).unwrap().to_rgb8();
    // Top-left corner of the top-left finder module
    assert_eq!(decoded.get_pixel(0, 0).0, [0, 0, 0]);
}

#[test]
fn invariant_scratch_released_after_render() {
    let (_tmp, pipeline) = create_pipeline();

    let request = QrRenderRequest {
        use_styled_image: true,
        error_correction: artifice_core::qr::ErrorCorrection::H,
        module_drawer: Some(ModuleDrawerConfig {
            kind: ModuleDrawerType::Rounded,
            ..Default::default()
        }),
        embedded_image: Some(logo_base64()),
        ..QrRenderRequest::new("https://example.com")
    };

    let output = pipeline.generate(&request).unwrap();
    assert!(output.size.is_some());
    assert_eq!(scratch_entries(pipeline.scratch().path()), 0);
}

#[test]
fn invariant_scratch_released_on_failure() {
    let (_tmp, pipeline) = create_pipeline();

    let request = QrRenderRequest {
        use_styled_image: true,
        embedded_image: Some("bm90IGFuIGltYWdl".to_string()),
        ..QrRenderRequest::new("https://example.com")
    };

    let err = pipeline.generate(&request).unwrap_err();
    assert_eq!(err.code(), "invalid_embedded_image");
    assert_eq!(scratch_entries(pipeline.scratch().path()), 0);
}

#[test]
fn invariant_generated_code_scans_back() {
    let (_tmp, pipeline) = create_pipeline();

    let output = pipeline.generate(&QrRenderRequest::new("https://example.com")).unwrap();
    let response = scan::scan(
        &QrScanRequest { image: output.image, auto_resize: true },
        &RqrrDetector,
    )
    .unwrap();

    assert!(response.success);
    assert_eq!(response.codes, vec!["https://example.com"]);
    assert_eq!(response.count, 1);
}

#[test]
fn invariant_hash_verify_round_trip() {
    for algorithm in HashAlgorithm::ALL {
        for encoding in [OutputEncoding::Hex, OutputEncoding::Base64] {
            for key in [None, Some("secret")] {
                let hash = hashing::generate_hash(b"payload", algorithm, encoding, key).unwrap();
                // Idempotent
                assert_eq!(hash, hashing::generate_hash(b"payload", algorithm, encoding, key).unwrap());

                let request = HashVerifyRequest {
                    data: "payload".to_string(),
                    expected_hash: hash,
                    algorithm: Some(algorithm.name().to_string()),
                    output_format: None,
                    hmac_key: key.map(str::to_string),
                };
                let verdict = hashing::verify(&request).unwrap();
                assert!(verdict.valid, "{algorithm} {encoding:?} key={key:?}");
            }
        }
    }
}

#[test]
fn invariant_password_charset_respected() {
    let request = PasswordGenerateRequest {
        length: 40,
        include_lowercase: false,
        include_symbols: false,
        ..Default::default()
    };
    let response = password::generate(&request, &ZxcvbnEstimator).unwrap();
    assert_eq!(response.password.chars().count(), 40);
    assert!(response
        .password
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
}

#[cfg(feature = "test-hooks")]
#[test]
fn invariant_generate_calls_validate() {
    use artifice_core::qr::pipeline::get_validation_call_count;

    let (_tmp, pipeline) = create_pipeline();
    let before = get_validation_call_count();
    pipeline.generate(&QrRenderRequest::new("hooked")).unwrap();
    assert!(get_validation_call_count() > before);
}
