use super::*;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "bunnywear_{name}_{}_{}",
        std::process::id(),
        SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

#[test]
fn normalize_strips_leading_slash_and_dots() {
    assert_eq!(normalize_rel_path("/items/hat.png").unwrap(), "items/hat.png");
    assert_eq!(normalize_rel_path("./a//b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("a\\b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("/a/b.png?v=2").unwrap(), "a/b.png");
}

#[test]
fn normalize_rejects_traversal_remote_and_empty() {
    assert!(normalize_rel_path("../x.png").is_err());
    assert!(normalize_rel_path("a/../../x.png").is_err());
    assert!(normalize_rel_path("https://cdn.example/x.png").is_err());
    assert!(normalize_rel_path("/").is_err());
    assert!(normalize_rel_path("").is_err());
}

#[test]
fn missing_paths_are_none_not_errors() {
    let tmp = temp_dir("fsio_missing");
    assert!(read_optional(&tmp.join("nope.png")).unwrap().is_none());
    assert!(modified_optional(&tmp.join("nope.png")).unwrap().is_none());
    assert!(read_dir_optional(&tmp).unwrap().is_none());
    assert!(!is_file(&tmp));
}

#[test]
fn write_creates_parents_and_overwrites() {
    let tmp = temp_dir("fsio_write");
    let path = tmp.join("a").join("b").join("c.bin");

    write_creating_dirs(&path, b"one").unwrap();
    write_creating_dirs(&path, b"two").unwrap();

    assert_eq!(read_optional(&path).unwrap().unwrap(), b"two");
    assert!(modified_optional(&path).unwrap().is_some());
    assert!(modified_optional(&tmp.join("a")).unwrap().is_none());

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn resolve_public_joins_under_root() {
    let root = Path::new("/srv/public");
    assert_eq!(
        resolve_public(root, "/items/hat.png").unwrap(),
        root.join("items/hat.png")
    );
}

#[test]
fn key_file_name_keeps_keys_distinct() {
    assert_eq!(key_file_name("b_hat?red", "png"), "b_hat%3Fred.png");
    assert_ne!(key_file_name("b_hat?red", "png"), key_file_name("b_hat?blue", "png"));
    assert_ne!(key_file_name("b_a/b", "png"), key_file_name("b_a//b", "png"));
    assert_ne!(key_file_name("b_a b", "png"), key_file_name("b_a+b", "png"));
    assert!(!key_file_name("b_a/../c", "png").contains('/'));
}
