use std::fs;
use std::path::Path;

use drawing::document::TraceDocument;
use drawing::{BezierPath, BlendMode, DrawError, Drawing, DrawingConfig, SaveOptions};

fn traced_pages(drawing: &Drawing, dir: &Path) -> Vec<Vec<String>> {
    let path = dir.join("trace.pdf");
    drawing.save_image(&path, &SaveOptions::new()).unwrap();
    let text = fs::read_to_string(path).unwrap();
    let mut pages = Vec::new();
    for line in text.lines() {
        if line.starts_with("page ") {
            pages.push(Vec::new());
        } else if let Some(page) = pages.last_mut() {
            page.push(line.to_string());
        }
    }
    pages
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn three_pages() -> Drawing {
    let d = Drawing::new(TraceDocument::new());
    for _ in 0..3 {
        d.new_page(200.0, 200.0).unwrap();
        d.rect(50.0, 50.0, 100.0, 100.0).unwrap();
    }
    d
}

#[test]
fn multipage_file_counts() {
    for (ext, expected) in [
        ("png", vec!["test_0.png", "test_1.png", "test_2.png"]),
        ("jpg", vec!["test_0.jpg", "test_1.jpg", "test_2.jpg"]),
        ("svg", vec!["test_0.svg", "test_1.svg", "test_2.svg"]),
        ("pdf", vec!["test.pdf"]),
        ("mp4", vec!["test.mp4"]),
    ] {
        let dir = tempfile::tempdir().unwrap();
        let d = three_pages();
        d.save_image(dir.path().join(format!("test.{}", ext)), &SaveOptions::new())
            .unwrap();
        assert_eq!(file_names(dir.path()), expected, "extension {}", ext);
    }
}

#[test]
fn single_page_writes_exact_path() {
    let dir = tempfile::tempdir().unwrap();
    let d = Drawing::new(TraceDocument::new());
    d.rect(0.0, 0.0, 1.0, 1.0).unwrap();
    d.save_image(dir.path().join("one.png"), &SaveOptions::new())
        .unwrap();
    assert_eq!(file_names(dir.path()), vec!["one.png"]);
}

#[test]
fn save_errors() {
    let dir = tempfile::tempdir().unwrap();
    let d = Drawing::new(TraceDocument::new());
    let err = d
        .save_image(dir.path().join("x.png"), &SaveOptions::new())
        .unwrap_err();
    assert!(matches!(err, DrawError::NoPages));

    d.rect(0.0, 0.0, 1.0, 1.0).unwrap();
    let err = d
        .save_image(dir.path().join("x.doc"), &SaveOptions::new())
        .unwrap_err();
    assert!(matches!(err, DrawError::UnsupportedFormat(_)));
}

#[test]
fn drawing_after_save_opens_a_new_page() {
    let dir = tempfile::tempdir().unwrap();
    let d = Drawing::new(TraceDocument::new());
    d.size(30.0, 30.0).unwrap();
    d.save_image(dir.path().join("first.pdf"), &SaveOptions::new())
        .unwrap();
    d.oval(0.0, 0.0, 5.0, 5.0).unwrap();
    let pages = traced_pages(&d, dir.path());
    assert_eq!(pages.len(), 2);
    assert_eq!(d.width(), Some(1000.0));
}

#[test]
fn delegate_survives_new_page() {
    let d = Drawing::new(TraceDocument::new());
    d.size(100.0, 100.0).unwrap();
    let fill = d.fill_delegate();
    fill.call(0.5);
    assert_eq!(d.graphics_state().fill_paint().color(), (255, 128, 128, 128));
    d.new_page(100.0, 100.0).unwrap();
    fill.call(1.0);
    assert_eq!(d.graphics_state().fill_paint().color(), (255, 255, 255, 255));
}

#[test]
fn generic_delegate() {
    let d = Drawing::new(TraceDocument::new());
    let width = d.delegate(drawing::GraphicsState::stroke_width);
    d.saved_state(|d| {
        width.call(3.0);
        assert_eq!(d.graphics_state().stroke_paint().stroke_width(), 3.0);
        Ok(())
    })
    .unwrap();
    assert_eq!(d.graphics_state().stroke_paint().stroke_width(), 1.0);
}

#[test]
fn fill_then_stroke() {
    let dir = tempfile::tempdir().unwrap();
    let d = Drawing::with_config(
        Box::new(TraceDocument::new()),
        DrawingConfig {
            flip_canvas: false,
            ..Default::default()
        },
    );
    d.stroke((1.0, 0.0, 0.0));
    d.stroke_width(2.0);
    d.line((0.0, 0.0), (10.0, 10.0)).unwrap();
    d.fill(());
    d.rect(0.0, 0.0, 4.0, 4.0).unwrap();
    d.stroke(());
    d.rect(0.0, 0.0, 5.0, 5.0).unwrap();
    let pages = traced_pages(&d, dir.path());
    assert_eq!(
        pages[0],
        vec![
            "line 0 0 10 10 fill #FF000000",
            "line 0 0 10 10 stroke 2 #FFFF0000",
            "rect 0 0 4 4 stroke 2 #FFFF0000",
        ]
    );
}

#[test]
fn transparent_paint_draws_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let d = Drawing::new(TraceDocument::new());
    d.size(10.0, 10.0).unwrap();
    d.fill((0.0, 0.0));
    d.rect(0.0, 0.0, 1.0, 1.0).unwrap();
    let pages = traced_pages(&d, dir.path());
    assert_eq!(pages[0], vec!["translate 0 10", "scale 1 -1"]);
}

#[test]
fn polygon_matches_manual_path() {
    let dir_a = tempfile::tempdir().unwrap();
    let dir_b = tempfile::tempdir().unwrap();

    let a = Drawing::new(TraceDocument::new());
    a.polygon([0.0, 0.0], [[0.0, 100.0], [100.0, 0.0]], true)
        .unwrap();

    let b = Drawing::new(TraceDocument::new());
    let mut path = BezierPath::new();
    path.move_to((0.0, 0.0));
    path.line_to((0.0, 100.0)).unwrap();
    path.line_to((100.0, 0.0)).unwrap();
    path.close_path();
    b.draw_path(&path).unwrap();

    assert_eq!(traced_pages(&a, dir_a.path()), traced_pages(&b, dir_b.path()));
}

#[test]
fn pivoted_transforms() {
    let dir = tempfile::tempdir().unwrap();
    let d = Drawing::with_config(
        Box::new(TraceDocument::new()),
        DrawingConfig {
            flip_canvas: false,
            ..Default::default()
        },
    );
    d.rotate(30.0, (0.0, 0.0)).unwrap();
    d.scale(2.0, 2.0, (50.0, 50.0)).unwrap();
    d.skew(90.0, 0.0, (0.0, 0.0)).unwrap();
    d.transform([1.0, 0.0, 0.0, 1.0, 7.0, 8.0], (1.0, 2.0))
        .unwrap();
    let pages = traced_pages(&d, dir.path());
    assert_eq!(
        pages[0],
        vec![
            "rotate 30".to_string(),
            "translate 50 50".to_string(),
            "scale 2 2".to_string(),
            "translate -50 -50".to_string(),
            format!("skew {} 0", std::f64::consts::FRAC_PI_2),
            "translate 1 2".to_string(),
            "concat 1 0 0 1 7 8".to_string(),
            "translate -1 -2".to_string(),
        ]
    );
}

#[test]
fn empty_text_is_a_no_op() {
    let d = Drawing::new(TraceDocument::new());
    d.text("", (10.0, 10.0), None).unwrap();
    assert_eq!(d.width(), None);
}

#[test]
fn image_placement() {
    let dir = tempfile::tempdir().unwrap();
    let png = dir.path().join("img.png");
    image::RgbaImage::new(4, 3).save(&png).unwrap();

    let d = Drawing::new(TraceDocument::new());
    d.size(100.0, 100.0).unwrap();
    d.image(&png, (10.0, 20.0), 0.5).unwrap();
    d.blend_mode(BlendMode::Multiply);
    d.image(&png, (0.0, 0.0), 1.0).unwrap();

    let out = tempfile::tempdir().unwrap();
    let pages = traced_pages(&d, out.path());
    assert_eq!(
        pages[0],
        vec![
            "translate 0 100",
            "scale 1 -1",
            "save",
            "translate 10 23",
            "scale 1 -1",
            "image 4x3 at 0 0 alpha 128",
            "restore",
            "save",
            "translate 0 3",
            "scale 1 -1",
            "image 4x3 at 0 0 multiply",
            "restore",
        ]
    );
    assert_eq!(d.image_cache().decode_count(), 1);
}

#[test]
fn shared_image_cache() {
    let dir = tempfile::tempdir().unwrap();
    let png = dir.path().join("img.png");
    image::RgbaImage::new(2, 2).save(&png).unwrap();

    let cache = std::rc::Rc::new(drawing::image_cache::ImageCache::new(8));
    for _ in 0..2 {
        let d = Drawing::with_config(
            Box::new(TraceDocument::new()),
            DrawingConfig {
                image_cache: Some(cache.clone()),
                ..Default::default()
            },
        );
        d.image(&png, (0.0, 0.0), 1.0).unwrap();
    }
    assert_eq!(cache.decode_count(), 1);
}
