mod common;

use common::*;
use filterspec::query::{Compiler, MemorySource, Segment};
use filterspec::{CompilerConfig, logger};
use std::io::Write;

#[test]
fn config_loads_from_toml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "max_group_depth = 4\nmax_page_size = 2\nparallel_sets = true").unwrap();
    let cfg = CompilerConfig::load(file.path()).unwrap();
    assert_eq!(cfg.max_group_depth, 4);
    assert_eq!(cfg.max_page_size, Some(2));
    assert!(cfg.parallel_sets);
    assert_eq!(cfg.max_in_values, filterspec::config::DEFAULT_MAX_IN_VALUES);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let e = CompilerConfig::load(&dir.path().join("absent.toml")).unwrap_err();
    assert_eq!(e.code(), "Io");
}

#[test]
fn page_size_is_clamped_by_config() {
    let schema = employee_schema();
    let rows = employees();
    let cfg = CompilerConfig { max_page_size: Some(3), ..CompilerConfig::default() };
    let compiled = Compiler::with_config(&schema, cfg).compile_segment(&Segment::new().paged(1, 100)).unwrap();
    let result = compiled.execute(&MemorySource::new(&rows)).unwrap();
    assert_eq!(result.page_size, 3);
    assert_eq!(result.len(), 3);
    assert_eq!(result.page_count, 2);
}

#[test]
fn log_config_builds_into_a_directory() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = logger::build_config(Some(dir.path()), Some("debug"), Some(2), true).unwrap();
    assert_eq!(cfg.root().level(), log::LevelFilter::Debug);
    assert!(cfg.loggers().iter().any(|l| l.name() == logger::DEV_TARGET));
    assert!(dir.path().join("filterspec.log").exists());
}
