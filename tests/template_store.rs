#![cfg(feature = "image-io")]

use image::{GrayImage, RgbImage, RgbaImage};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tempfile::TempDir;
use tracematch::{Matcher, PixelView, ReloadReport, SearchRegion, TemplateStore, TraceMatchError};

fn write_rgb(dir: &Path, name: &str, width: u32, height: u32, seed: u8) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        let v = (x as u8).wrapping_mul(31) ^ (y as u8).wrapping_mul(17) ^ seed;
        image::Rgb([v, v.wrapping_add(seed), 255 - v])
    });
    img.save(dir.join(name)).unwrap();
}

#[test]
fn reload_decodes_supported_files_and_skips_the_rest() {
    let dir = TempDir::new().unwrap();
    write_rgb(dir.path(), "Diary.png", 6, 4, 1);
    write_rgb(dir.path(), "ball.bmp", 3, 3, 2);
    GrayImage::from_pixel(5, 2, image::Luma([90])).save(dir.path().join("gray.png")).unwrap();
    RgbaImage::from_pixel(2, 2, image::Rgba([1, 2, 3, 4]))
        .save(dir.path().join("alpha.png"))
        .unwrap();
    fs::write(dir.path().join("broken.png"), b"definitely not a png").unwrap();
    fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    write_rgb(&dir.path().join("nested"), "deep.png", 2, 2, 3);

    let store = TemplateStore::new();
    let report = store.reload(&[dir.path()]);
    assert_eq!(report, ReloadReport { loaded: 4, skipped: 1 });
    assert_eq!(
        store.names(),
        vec!["Diary.png", "alpha.png", "ball.bmp", "gray.png"]
    );
    assert!(matches!(
        store.get("deep.png"),
        Err(TraceMatchError::TemplateNotFound { .. })
    ));

    let gray = store.get("gray.png").unwrap();
    assert_eq!(gray.view().pixel(4, 1, 2), Some(90));
    let alpha = store.get("alpha.png").unwrap();
    assert_eq!(alpha.view().row(0).unwrap(), &[1, 2, 3, 1, 2, 3]);
}

#[test]
fn lookups_ignore_case_and_keep_original_name() {
    let dir = TempDir::new().unwrap();
    write_rgb(dir.path(), "Check1.PNG", 4, 4, 5);

    let store = TemplateStore::new();
    store.reload(&[dir.path()]);
    for name in ["check1.png", "CHECK1.PNG", "Check1.PNG"] {
        let record = store.get(name).unwrap();
        assert_eq!(record.name(), "Check1.PNG");
        assert_eq!((record.width(), record.height()), (4, 4));
    }
}

#[test]
fn later_directory_overrides_earlier() {
    let base = TempDir::new().unwrap();
    let overlay = TempDir::new().unwrap();
    write_rgb(base.path(), "ok.png", 4, 4, 1);
    write_rgb(base.path(), "only_base.png", 2, 2, 1);
    write_rgb(overlay.path(), "OK.png", 7, 5, 9);

    let store = TemplateStore::new();
    let report = store.reload(&[base.path(), overlay.path()]);
    assert_eq!(report.loaded, 3);
    assert_eq!(store.len(), 2);

    let ok = store.get("ok.png").unwrap();
    assert_eq!((ok.width(), ok.height()), (7, 5));
    assert_eq!(ok.name(), "OK.png");
    assert!(store.get("only_base.png").is_ok());
    assert_eq!(
        store.directories(),
        vec![base.path().to_path_buf(), overlay.path().to_path_buf()]
    );
}

#[test]
fn missing_directory_is_skipped_without_failing() {
    let dir = TempDir::new().unwrap();
    write_rgb(dir.path(), "a.png", 2, 2, 1);
    let missing = dir.path().join("does-not-exist");

    let store = TemplateStore::new();
    let report = store.reload(&[missing.as_path(), dir.path()]);
    assert_eq!(report, ReloadReport { loaded: 1, skipped: 0 });
    assert!(store.get("a.png").is_ok());
}

#[test]
fn reload_replaces_previous_contents() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    write_rgb(first.path(), "old.png", 2, 2, 1);
    write_rgb(second.path(), "new.png", 3, 3, 2);

    let store = TemplateStore::new();
    store.reload(&[first.path()]);
    let held = store.get("old.png").unwrap();

    store.reload(&[second.path()]);
    assert_eq!(store.names(), vec!["new.png"]);
    assert!(store.get("old.png").is_err());
    // Records handed out before the reload stay valid.
    assert_eq!(held.width(), 2);
}

#[test]
fn resolve_falls_back_to_disk_without_caching() {
    let dir = TempDir::new().unwrap();
    write_rgb(dir.path(), "cached.png", 2, 2, 1);

    let store = TemplateStore::new();
    store.reload(&[dir.path()]);
    write_rgb(dir.path(), "late.png", 5, 3, 4);

    assert!(store.get("late.png").is_err());
    let late = store.resolve("late.png").unwrap();
    assert_eq!((late.width(), late.height()), (5, 3));
    assert_eq!(store.len(), 1);
    assert!(store.get("late.png").is_err());

    assert!(matches!(
        store.resolve("../cached.png"),
        Err(TraceMatchError::TemplateNotFound { .. })
    ));
    assert!(matches!(
        store.resolve("absent.png"),
        Err(TraceMatchError::TemplateNotFound { .. })
    ));
}

#[test]
fn resolve_fallback_ignores_case() {
    let dir = TempDir::new().unwrap();
    let store = TemplateStore::new();
    store.reload(&[dir.path()]);
    write_rgb(dir.path(), "Late.png", 4, 3, 6);

    for name in ["Late.png", "late.png", "LATE.PNG"] {
        let record = store.resolve(name).unwrap();
        assert_eq!(record.name(), "Late.png");
        assert_eq!((record.width(), record.height()), (4, 3));
    }
    assert!(store.is_empty());
}

#[test]
fn resolve_prefers_later_directory() {
    let base = TempDir::new().unwrap();
    let overlay = TempDir::new().unwrap();
    let store = TemplateStore::new();
    store.reload(&[base.path(), overlay.path()]);

    write_rgb(base.path(), "x.png", 2, 2, 1);
    write_rgb(overlay.path(), "x.png", 4, 2, 1);
    let record = store.resolve("x.png").unwrap();
    assert_eq!(record.width(), 4);
}

#[test]
fn matcher_finds_template_loaded_from_disk() {
    let dir = TempDir::new().unwrap();
    let capture = RgbImage::from_fn(40, 30, |x, y| {
        let v = ((x * 7) ^ (y * 13) ^ (x * y)) as u8;
        image::Rgb([v, v.wrapping_mul(3), 200u8.wrapping_sub(v)])
    });
    let patch = image::imageops::crop_imm(&capture, 17, 9, 8, 6).to_image();
    patch.save(dir.path().join("patch.png")).unwrap();

    let store = TemplateStore::new();
    store.reload(&[dir.path()]);
    let source = PixelView::from_slice(capture.as_raw(), 40, 30, 3).unwrap();
    let result = Matcher::new(&store)
        .find(source, "Patch.png", 0.95, SearchRegion::default())
        .unwrap();
    assert!(result.success);
    assert_eq!((result.x, result.y), (17, 9));
}

#[test]
fn readers_never_observe_a_partial_reload() {
    let a = TempDir::new().unwrap();
    let b = TempDir::new().unwrap();
    for i in 0..6 {
        write_rgb(a.path(), &format!("t{i}.png"), 3, 3, i);
        write_rgb(b.path(), &format!("t{i}.png"), 5, 5, i);
    }

    let store = TemplateStore::new();
    store.reload(&[a.path()]);
    let done = AtomicBool::new(false);

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                while !done.load(Ordering::Relaxed) {
                    assert_eq!(store.len(), 6);
                    for i in 0..6 {
                        let record = store.get(&format!("t{i}.png")).unwrap();
                        assert!(matches!(record.width(), 3 | 5));
                    }
                }
            });
        }
        for round in 0..10 {
            let dir = if round % 2 == 0 { b.path() } else { a.path() };
            assert_eq!(store.reload(&[dir]).loaded, 6);
        }
        done.store(true, Ordering::Relaxed);
    });
}
