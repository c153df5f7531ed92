use super::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_inline_source_is_inline() {
    let registry = InlineTemplateRegistry::new();
    registry.register("card", "body");
    let source: SharedSource = Arc::new(registry);
    assert!(source.as_inline().is_some());
    assert_eq!(source.load("card").unwrap(), "body");
}

#[test]
fn test_directory_source_loads_with_extensions() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("widgets")).unwrap();
    fs::write(temp.path().join("plain"), "no extension").unwrap();
    fs::write(temp.path().join("widgets/card.liquid"), "liquid card").unwrap();
    fs::write(temp.path().join("footer.html"), "<footer/>").unwrap();

    let source = DirectorySource::new(temp.path());
    assert!(source.as_inline().is_none());
    assert_eq!(source.load("plain").unwrap(), "no extension");
    assert_eq!(source.load("widgets/card").unwrap(), "liquid card");
    assert_eq!(source.load("footer").unwrap(), "<footer/>");
}

#[test]
fn test_directory_source_skips_directory_candidates() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("card")).unwrap();
    fs::write(temp.path().join("card/inner.html"), "inner").unwrap();
    fs::write(temp.path().join("card.liquid"), "card body").unwrap();

    let source = DirectorySource::new(temp.path());
    assert_eq!(source.load("card").unwrap(), "card body");
    assert_eq!(source.load("card/inner").unwrap(), "inner");
}

#[test]
fn test_directory_source_only_directory_is_not_found() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("card")).unwrap();

    let source = DirectorySource::new(temp.path());
    assert!(matches!(
        source.load("card"),
        Err(TemplateError::NotFound { .. })
    ));
}

#[test]
fn test_directory_source_missing_template() {
    let temp = TempDir::new().unwrap();
    let source = DirectorySource::new(temp.path());
    assert!(matches!(
        source.load("missing"),
        Err(TemplateError::NotFound { .. })
    ));
}
