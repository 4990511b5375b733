//! Integration tests for fixture generation and file output.

use splatdump::dump::DumpFile;
use splatdump::scene::{self, Fixture, SceneConfig, FIELD_NAMES};
use splatdump::{ElementType, Error, Value};

use tempfile::{tempdir, NamedTempFile};

#[test]
fn test_generate_eight_splats() {
    let temp = NamedTempFile::new().expect("Failed to create temp file");
    let stats = Fixture::generate(8, &SceneConfig::default())
        .write(temp.path())
        .expect("Failed to write fixture");
    assert_eq!(stats.num_values, 30);
    assert_eq!(stats.splats, 8);

    let values = DumpFile::open(temp.path())
        .expect("Failed to open fixture")
        .read_all()
        .expect("Failed to read fixture");
    assert_eq!(values.len(), 30);

    // W, H
    for v in &values[..2] {
        assert_eq!(v.element_type(), ElementType::Int64);
        assert!(v.is_scalar());
    }
    assert_eq!(values[0].as_scalar::<i64>(), Some(800));
    assert_eq!(values[1].as_scalar::<i64>(), Some(600));

    // camera scalars
    let expected = [800.0f32, 800.0, 400.0, 300.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, -5.0];
    for (i, want) in expected.iter().enumerate() {
        assert_eq!(values[2 + i].as_scalar::<f32>(), Some(*want), "{}", FIELD_NAMES[2 + i]);
    }

    // per-splat columns
    for (name, v) in FIELD_NAMES[13..27].iter().zip(&values[13..27]) {
        assert_eq!(v.element_type(), ElementType::Float32, "{}", name);
        assert_eq!(v.shape(), &[8], "{}", name);
    }
    for v in &values[27..] {
        assert_eq!(v.shape(), &[8, 15]);
        assert!(v.as_slice::<f32>().unwrap().iter().all(|&s| s == 0.0));
    }

    for v in &values[24..27] {
        assert!(v.as_slice::<f32>().unwrap().iter().all(|c| (0.0..=1.0).contains(c)));
    }
    let x = values[13].as_slice::<f32>().unwrap();
    let r = values[24].as_slice::<f32>().unwrap();
    for (x, r) in x.iter().zip(r) {
        assert_eq!(*r, (x + 1.0) / 2.0);
    }
}

#[test]
fn test_fixture_read_roundtrip() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("scene.in");
    let config = SceneConfig {
        width: 1280,
        height: 720,
        opacity: 0.25,
        ..Default::default()
    };
    let fixture = Fixture::generate(100, &config);
    fixture.clone().write(&path).expect("Failed to write fixture");

    let back = Fixture::read(&path).expect("Failed to read fixture");
    assert_eq!(back, fixture);
    assert_eq!(back.camera.cx, 640.0);
    assert!(back.cloud.opacities.iter().all(|&o| o == 0.25));
}

#[test]
fn test_write_is_deterministic() {
    let dir = tempdir().expect("Failed to create temp dir");
    let a = dir.path().join("a.in");
    let b = dir.path().join("b.in");
    Fixture::generate(1000, &SceneConfig::default()).write(&a).unwrap();
    Fixture::generate(1000, &SceneConfig::default()).write(&b).unwrap();
    assert_eq!(std::fs::read(&a).unwrap(), std::fs::read(&b).unwrap());
}

#[test]
fn test_failed_write_leaves_no_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("broken.in");
    let mut fixture = Fixture::generate(8, &SceneConfig::default());
    fixture.cloud.sh[1].truncate(3);

    let err = fixture.write(&path).unwrap_err();
    assert!(matches!(err, Error::InvalidStructure(_)));
    assert!(!path.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_zero_splats() {
    let temp = NamedTempFile::new().expect("Failed to create temp file");
    Fixture::generate(0, &SceneConfig::default()).write(temp.path()).unwrap();
    let back = Fixture::read(temp.path()).unwrap();
    assert!(back.is_empty());
    assert_eq!(back.cloud.sh_coeffs, 15);
}

#[test]
fn test_read_rejects_foreign_dump() {
    let temp = NamedTempFile::new().expect("Failed to create temp file");
    splatdump::dump::write_file(temp.path(), &[Value::scalar(1i64)]).unwrap();
    assert!(matches!(Fixture::read(temp.path()), Err(Error::InvalidStructure(_))));
}

#[test]
fn test_scene_config_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let config_path = dir.path().join("scene.json");
    std::fs::write(&config_path, r#"{ "extent": 2.0, "translation": [0.0, 0.0, -10.0] }"#).unwrap();

    let config = SceneConfig::load(&config_path).expect("Failed to load config");
    let fixture = Fixture::generate(27, &config);
    assert_eq!(fixture.camera.translation.z, -10.0);
    let (min, max) = fixture.cloud.bounds().unwrap();
    assert_eq!(min.x, -2.0);
    assert_eq!(max.z, 2.0);
}

#[test]
fn test_suite_layout() {
    let dir = tempdir().expect("Failed to create temp dir");
    let stats = scene::generate_suite(dir.path(), &[3000, 1000], &SceneConfig::default())
        .expect("Failed to generate suite");
    let names: Vec<_> = stats
        .iter()
        .map(|s| s.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["3k.in", "1k.in"]);

    let big = Fixture::read(dir.path().join("3k.in")).unwrap();
    assert_eq!(big, Fixture::generate(3000, &SceneConfig::default()));
}

#[test]
fn test_view_block_camera() {
    let dir = tempdir().expect("Failed to create temp dir");
    let config_path = dir.path().join("view.json");
    std::fs::write(&config_path, r#"{ "view": { "yaw": -90.0, "pitch": 20.0, "fov": 60.0 } }"#).unwrap();

    let config = SceneConfig::load(&config_path).expect("Failed to load config");
    let path = dir.path().join("view.in");
    Fixture::generate(8, &config).write(&path).expect("Failed to write fixture");

    let back = Fixture::read(&path).expect("Failed to read fixture");
    assert!((back.camera.rotation.length() - 1.0).abs() < 1e-5);
    assert_eq!(back.camera.cx, 400.0);
    let expected_fx = 800.0 / (2.0 * 30f32.to_radians().tan());
    assert!((back.camera.fx - expected_fx).abs() < 1e-3);
}
