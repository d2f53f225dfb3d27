//! 从 TOML 清单构建容器

use keyed_container::{Container, ContainerError, ManifestLoader};
use std::collections::HashMap;
use std::fs;
use tempfile::TempDir;

const MANIFEST: &str = r#"
shared_by_default = true

[parameters]
"db.url" = "postgres://localhost/app"
"db.pool" = 8

[aliases]
database = "db.url"
primary = "database"
pool = "db.pool"

[shared]
pool = false
"#;

fn load(content: &str) -> Container {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("container.toml");
    fs::write(&path, content).unwrap();

    let manifest = ManifestLoader::with_env(HashMap::new())
        .load(&path.to_string_lossy())
        .unwrap();
    Container::with_config(manifest.into_config()).unwrap()
}

#[test]
fn test_parameters_resolve_through_aliases() {
    let container = load(MANIFEST);

    let url = container.get_as::<toml::Value>("primary").unwrap();
    assert_eq!(url.as_str(), Some("postgres://localhost/app"));

    let pool = container.get_as::<toml::Value>("pool").unwrap();
    assert_eq!(pool.as_integer(), Some(8));
}

#[test]
fn test_unshared_alias_is_not_cached() {
    let container = load(MANIFEST);

    container.get("pool").unwrap();
    container.get("primary").unwrap();

    let keys = container.keys();
    assert!(!keys.contains(&"pool".to_string()));
    assert!(keys.contains(&"primary".to_string()));
}

#[test]
fn test_manifest_aliases_are_resolved() {
    let container = load(MANIFEST);

    assert_eq!(
        container.aliases(),
        vec![
            ("database".to_string(), "db.url".to_string()),
            ("pool".to_string(), "db.pool".to_string()),
            ("primary".to_string(), "db.url".to_string()),
        ]
    );
    assert!(container.has("primary"));
}

#[test]
fn test_cyclic_manifest_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cyclic.toml");
    fs::write(&path, "[aliases]\na = \"b\"\nb = \"c\"\nc = \"a\"\n").unwrap();

    let manifest = ManifestLoader::with_env(HashMap::new())
        .load(&path.to_string_lossy())
        .unwrap();
    let err = Container::with_config(manifest.into_config()).unwrap_err();
    assert!(matches!(err, ContainerError::CyclicAlias { .. }));
}
