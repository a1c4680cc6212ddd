mod common;

use std::{env, fs, io::Write, path::PathBuf, process};

use common::class_image;
use cortado::jvm::class_loader::{
    ClassPath, ClassRegistry, Error,
    class_paths::{DirectoryClassPath, JarClassPath},
};
use zip::{ZipWriter, write::SimpleFileOptions};

struct Scratch(PathBuf);

impl Scratch {
    fn new(label: &str) -> Self {
        let dir = env::temp_dir().join(format!("cortado-{label}-{}", process::id()));
        fs::create_dir_all(&dir).unwrap();
        Self(dir)
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

#[test]
fn directory_class_path_serves_loose_class_files() {
    let scratch = Scratch::new("dir");
    fs::create_dir_all(scratch.0.join("org/sample")).unwrap();
    fs::write(
        scratch.0.join("org/sample/Thing.class"),
        class_image("org/sample/Thing", &[]),
    )
    .unwrap();

    let mut class_path = DirectoryClassPath::new(&scratch.0);
    let class = class_path.find_class("org/sample/Thing").unwrap();
    assert_eq!(class.binary_name(), Ok("org/sample/Thing"));

    assert!(matches!(
        class_path.find_class("org/sample/Other"),
        Err(Error::ArchiveMemberMissing(_))
    ));
}

#[test]
fn jar_class_path_serves_archive_members() {
    let scratch = Scratch::new("jar");
    let jar_path = scratch.0.join("classes.jar");
    let mut writer = ZipWriter::new(fs::File::create(&jar_path).unwrap());
    writer
        .start_file("Sample.class", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(&class_image("Sample", &[])).unwrap();
    writer.finish().unwrap();

    let mut class_path = JarClassPath::open(&jar_path).unwrap();
    assert_eq!(class_path.path(), jar_path.as_path());
    let class = class_path.find_class("Sample").unwrap();
    assert_eq!(class.binary_name(), Ok("Sample"));

    assert!(matches!(
        class_path.find_class("Missing"),
        Err(Error::ArchiveMemberMissing(name)) if name == "Missing.class"
    ));

    let mut registry = ClassRegistry::new([JarClassPath::open(&jar_path).unwrap()]);
    assert!(registry.load_class("Sample").is_ok());
}

#[test]
fn opening_a_missing_archive_fails_eagerly() {
    let scratch = Scratch::new("missing");
    let result = JarClassPath::open(scratch.0.join("absent.jar"));
    assert!(matches!(result, Err(Error::ArchiveOpenFailed { .. })));
}

#[test]
fn opening_a_non_archive_fails_eagerly() {
    let scratch = Scratch::new("nonzip");
    let path = scratch.0.join("not-a.jar");
    fs::write(&path, b"plain text").unwrap();
    assert!(matches!(
        JarClassPath::open(&path),
        Err(Error::ArchiveOpenFailed { .. })
    ));
}
