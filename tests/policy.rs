use uploadcropper::{
    policy::OutputFormat,
    AssetClass, UploadError, UploadPolicy,
};

#[test]
fn default_policy_matches_asset_classes() {
    let policy = UploadPolicy::default();

    let avatar = policy.rules_for(AssetClass::Avatar);
    assert!(avatar.crop);
    assert_eq!(avatar.crop_aspect, Some(1.0));
    assert!(avatar.allows_mime("image/jpeg"));
    assert!(!avatar.allows_mime("application/pdf"));

    let logo = policy.rules_for(AssetClass::Logo);
    assert!(logo.crop);
    assert_eq!(logo.crop_aspect, None);
    assert_eq!(logo.format, OutputFormat::Png);

    let document = policy.rules_for(AssetClass::Document);
    assert!(!document.crop);
    assert!(document.allows_mime("application/pdf"));
    assert!(document.max_bytes > avatar.max_bytes);
}

#[test]
fn mime_matching_is_case_insensitive() {
    let policy = UploadPolicy::default();
    assert!(policy.rules_for(AssetClass::Avatar).allows_mime("IMAGE/JPEG"));
}

#[test]
fn policy_deserializes_from_json() {
    let json = r#"{
        "avatar": {
            "allowed_mime": ["image/png"],
            "max_bytes": 1048576,
            "max_dimension": 512,
            "quality": 70,
            "format": "webp",
            "crop": true,
            "crop_aspect": 1.0
        }
    }"#;
    let policy = UploadPolicy::from_json(json).unwrap();
    let avatar = policy.rules_for(AssetClass::Avatar);
    assert_eq!(avatar.max_dimension, 512);
    assert_eq!(avatar.format, OutputFormat::Webp);
    assert!(!avatar.allows_mime("image/jpeg"));
    // Classes omitted from the JSON keep their defaults.
    assert!(policy.rules_for(AssetClass::Document).allows_mime("application/pdf"));
}

#[test]
fn malformed_policy_is_a_policy_error() {
    let err = UploadPolicy::from_json("{ not json").unwrap_err();
    assert!(matches!(err, UploadError::Policy(_)));

    let err = UploadPolicy::from_json(r#"{"avatar": {"max_bytes": "lots"}}"#).unwrap_err();
    assert!(matches!(err, UploadError::Policy(_)));
}

#[test]
fn output_format_extensions_match_expectations() {
    assert_eq!(OutputFormat::Jpg.extension(), "jpg");
    assert_eq!(OutputFormat::Png.extension(), "png");
    assert_eq!(OutputFormat::Webp.extension(), "webp");
}
