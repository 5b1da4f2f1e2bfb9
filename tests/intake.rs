use uploadcropper::{
    error::{UploadError, DROP_IMAGE_MESSAGE},
    intake::{probe, validate, FileCandidate, SelectionSource},
    AssetClass,
};

mod common;
use common::{jpeg_candidate, png_candidate, POLICY};

fn text_candidate() -> FileCandidate {
    FileCandidate {
        name: "notes.txt".to_string(),
        mime: "text/plain".to_string(),
        bytes: b"hello".to_vec(),
    }
}

#[test]
fn accepts_allowed_image_types() {
    let rules = POLICY.rules_for(AssetClass::Avatar);
    validate(&jpeg_candidate("me.jpg", 100, 100), rules, SelectionSource::Browse).unwrap();
    validate(&png_candidate("me.png", 100, 100), rules, SelectionSource::Drop).unwrap();
}

#[test]
fn rejects_disallowed_mime_type() {
    let rules = POLICY.rules_for(AssetClass::Avatar);
    let err = validate(&text_candidate(), rules, SelectionSource::Browse).unwrap_err();
    match err {
        UploadError::Validation(message) => assert!(message.contains("text/plain")),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn dropped_non_image_gets_the_drop_message() {
    let rules = POLICY.rules_for(AssetClass::Logo);
    let err = validate(&text_candidate(), rules, SelectionSource::Drop).unwrap_err();
    match err {
        UploadError::DragRejected(message) => assert_eq!(message, DROP_IMAGE_MESSAGE),
        other => panic!("expected drag rejection, got {other:?}"),
    }
}

#[test]
fn document_class_is_not_image_only() {
    // Documents accept PDFs, so a dropped non-image is a plain validation
    // failure there, not a drag rejection.
    let rules = POLICY.rules_for(AssetClass::Document);
    let err = validate(&text_candidate(), rules, SelectionSource::Drop).unwrap_err();
    assert!(matches!(err, UploadError::Validation(_)));

    let pdf = FileCandidate {
        name: "contract.pdf".to_string(),
        mime: "application/pdf".to_string(),
        bytes: vec![0u8; 100],
    };
    validate(&pdf, rules, SelectionSource::Browse).unwrap();
}

#[test]
fn rejects_oversized_files() {
    let rules = POLICY.rules_for(AssetClass::Avatar);
    let mut candidate = jpeg_candidate("huge.jpg", 10, 10);
    candidate.bytes = vec![0u8; (rules.max_bytes + 1) as usize];
    let err = validate(&candidate, rules, SelectionSource::Browse).unwrap_err();
    match err {
        UploadError::Validation(message) => assert!(message.contains("too large")),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn probe_reports_actual_dimensions() {
    let image = probe(&jpeg_candidate("photo.jpg", 320, 200)).unwrap();
    assert_eq!((image.width(), image.height()), (320, 200));
}

#[test]
fn probe_rejects_files_lying_about_their_type() {
    let candidate = FileCandidate {
        name: "fake.png".to_string(),
        mime: "image/png".to_string(),
        bytes: b"not a png at all".to_vec(),
    };
    assert!(matches!(probe(&candidate), Err(UploadError::Decode(_))));
}
