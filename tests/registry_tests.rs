//! Integration tests for code registration, classification and catalogs.

use std::io::{self, Write};

use faultline::code::{global, CatalogError, UNKNOWN_CODE};
use faultline::{
    is_code, must_register, parse_coder, register, with_code, wrap, CodeCatalog, CodeRegistry,
    Coder, Error, RegistryError,
};
use tempfile::NamedTempFile;

fn write_catalog(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("create temp catalog");
    file.write_all(contents.as_bytes()).expect("write catalog");
    file
}

// ============================================================================
// Process-wide registry
// ============================================================================

#[test]
fn test_parse_coder_after_register() {
    register(Coder::new(100105, 404, "Order not found")).unwrap();

    let coder = parse_coder(Some(&Error::coded(100105, "order 9 missing"))).unwrap();
    assert_eq!(coder.code(), 100105);
    assert_eq!(coder.http_status(), 404);
    assert_eq!(coder.message(), "Order not found");
}

#[test]
fn test_parse_coder_on_generic_error_is_unknown() {
    let generic = io::Error::new(io::ErrorKind::Other, "socket closed");
    assert_eq!(parse_coder(Some(&generic)).unwrap().code(), UNKNOWN_CODE);
    assert_eq!(parse_coder(Some(&Error::new("x"))).unwrap().code(), UNKNOWN_CODE);
    assert!(parse_coder(None::<&Error>).is_none());
}

#[test]
fn test_register_overwrites_existing_code() {
    register(Coder::new(100106, 400, "first")).unwrap();
    let previous = register(Coder::new(100106, 409, "second")).unwrap();

    assert_eq!(previous.map(|coder| coder.http_status()), Some(400));
    assert_eq!(global().lookup(100106).message(), "second");
}

#[test]
fn test_reserved_codes_are_rejected() {
    for code in [0, 1, 42, 100] {
        assert_eq!(
            register(Coder::new(code, 500, "mine")),
            Err(RegistryError::Reserved(code))
        );
    }
    assert!(register(Coder::new(101, 500, "first free code")).is_ok());
}

#[test]
#[should_panic(expected = "reserved")]
fn test_must_register_reserved_panics() {
    must_register(Coder::new(3, 500, "mine"));
}

#[test]
#[should_panic(expected = "already registered")]
fn test_must_register_duplicate_panics() {
    must_register(Coder::new(100107, 500, "once"));
    must_register(Coder::new(100107, 500, "twice"));
}

// ============================================================================
// Private registries
// ============================================================================

#[test]
fn test_private_registry_is_isolated() {
    let registry = CodeRegistry::new();
    registry.register(Coder::new(100108, 418, "Teapot")).unwrap();

    assert!(registry.contains(100108));
    assert!(!global().contains(100108));
    assert_eq!(
        registry.parse_coder(Some(&Error::coded(100108, "x"))).unwrap().http_status(),
        418
    );
}

#[test]
fn test_coders_are_sorted_by_code() {
    let registry = CodeRegistry::new();
    registry.register(Coder::new(100300, 500, "c")).unwrap();
    registry.register(Coder::new(100200, 500, "b")).unwrap();

    let codes: Vec<i32> = registry.coders().iter().map(Coder::code).collect();
    assert_eq!(codes, vec![UNKNOWN_CODE, 100200, 100300]);
}

#[test]
fn test_is_code_sees_nested_classifications() {
    let inner = Error::coded(100109, "inner");
    let outer = with_code(Some(inner), 100110, "outer").unwrap();
    assert!(is_code(&outer, 100110));
    assert!(is_code(&outer, 100109));

    let wrapped = wrap(Some(outer), "context").unwrap();
    assert!(is_code(&wrapped, 100110));
    assert!(!is_code(&wrapped, 100111));
}

// ============================================================================
// Catalog files
// ============================================================================

#[test]
fn test_load_catalog_file() {
    let file = write_catalog(
        r#"
        [codes.invoice_missing]
        code = 100400
        status = 404
        message = "Invoice not found"

        [codes.invoice_locked]
        code = 100401
        status = 423
        "#,
    );

    let catalog = CodeCatalog::load(file.path()).unwrap();
    assert!(!catalog.strict);
    assert_eq!(catalog.len(), 2);

    let registry = CodeRegistry::new();
    assert_eq!(registry.load_catalog(&catalog).unwrap(), 2);
    assert_eq!(registry.lookup(100400).message(), "Invoice not found");
    assert_eq!(registry.lookup(100401).http_status(), 423);
    assert_eq!(registry.lookup(100401).message(), "");
}

#[test]
fn test_strict_catalog_reports_duplicate() {
    let file = write_catalog(
        r#"
        strict = true

        [codes.archived_invoice]
        code = 100403
        status = 410

        [codes.dup]
        code = 100402
        "#,
    );
    let registry = CodeRegistry::new();
    registry.register(Coder::new(100402, 500, "existing")).unwrap();

    let catalog = CodeCatalog::load(file.path()).unwrap();
    let err = registry.load_catalog(&catalog).unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Registry {
            source: RegistryError::Duplicate(100402),
            ..
        }
    ));
    assert_eq!(registry.lookup(100402).message(), "existing");
    assert!(!registry.contains(100403));
}

#[test]
fn test_malformed_catalog_is_parse_error() {
    let file = write_catalog("[codes.broken]\ncode = \"not a number\"\n");
    let err = CodeCatalog::load(file.path()).unwrap_err();
    assert!(matches!(err, CatalogError::Parse(_)));
}

#[test]
fn test_missing_catalog_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = CodeCatalog::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, CatalogError::FileNotFound(_)));
}
