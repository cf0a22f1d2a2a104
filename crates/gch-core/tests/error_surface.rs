use gch_core::{ErrorInfo, GchError};

#[test]
fn display_includes_code_context_and_hint() {
    let err = GchError::NotBuilt(
        ErrorInfo::new("store-missing", "key not found in store")
            .with_context("key", "ordinary/oddedge/gra5_4.g6")
            .with_hint("build the corresponding artefact first"),
    );
    let rendered = err.to_string();
    assert!(rendered.contains("not built"));
    assert!(rendered.contains("store-missing"));
    assert!(rendered.contains("ordinary/oddedge/gra5_4.g6"));
    assert!(rendered.contains("build the corresponding artefact first"));
    assert!(err.is_not_built());
    assert_eq!(err.info().code, "store-missing");
}

#[test]
fn errors_serialize_with_a_family_tag() {
    let err = GchError::Format(ErrorInfo::new("matrix-parse", "missing terminator line"));
    let json = serde_json::to_string(&err).unwrap();
    assert!(json.contains("\"family\":\"Format\""));
    let back: GchError = serde_json::from_str(&json).unwrap();
    assert_eq!(back, err);
    assert!(!back.is_not_built());
}
