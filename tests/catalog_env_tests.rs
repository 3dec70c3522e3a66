//! Environment overrides for catalogs.
//!
//! Kept in its own test binary: the override variable would otherwise leak
//! into every catalog loaded by tests running in the same process.

use std::io::Write;

use faultline::{CodeCatalog, CodeRegistry};

#[test]
fn test_environment_overrides_catalog_values() {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("create temp catalog");
    file.write_all(
        br#"
        [codes.gateway_timeout]
        code = 100500
        status = 504
        message = "Upstream timed out"
        "#,
    )
    .expect("write catalog");

    std::env::set_var("FAULTLINE__CODES__GATEWAY_TIMEOUT__STATUS", "503");
    let catalog = CodeCatalog::load(file.path());
    std::env::remove_var("FAULTLINE__CODES__GATEWAY_TIMEOUT__STATUS");

    let catalog = catalog.unwrap();
    let registry = CodeRegistry::new();
    registry.load_catalog(&catalog).unwrap();

    let coder = registry.lookup(100500);
    assert_eq!(coder.http_status(), 503);
    assert_eq!(coder.message(), "Upstream timed out");
}
