use std::fs;
use std::path::Path;

use cairo_render::video::{ffmpeg_has_encoder, DEFAULT_CODEC};
use cairo_render::{new_drawing, new_drawing_with_config};
use drawing::{BezierPath, Drawing, DrawingConfig, SaveOptions, TextAlign};
use image::{Rgba, RgbaImage};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
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
    let d = new_drawing();
    for _ in 0..3 {
        d.new_page(200.0, 200.0).unwrap();
        d.rect(50.0, 50.0, 100.0, 100.0).unwrap();
    }
    d
}

fn render_png(d: &Drawing, dir: &Path, name: &str) -> RgbaImage {
    let path = dir.join(name);
    d.save_image(&path, &SaveOptions::new()).unwrap();
    image::open(&path).unwrap().to_rgba8()
}

#[test]
fn multipage_outputs() {
    init();
    let mut cases = vec![
        ("png", vec!["test_0.png", "test_1.png", "test_2.png"]),
        ("jpg", vec!["test_0.jpg", "test_1.jpg", "test_2.jpg"]),
        ("svg", vec!["test_0.svg", "test_1.svg", "test_2.svg"]),
        ("pdf", vec!["test.pdf"]),
    ];
    if ffmpeg_has_encoder(DEFAULT_CODEC) {
        cases.push(("mp4", vec!["test.mp4"]));
    } else {
        eprintln!("ffmpeg with libx264 not found, skipping mp4 output");
    }
    for (ext, expected) in cases {
        let dir = tempfile::tempdir().unwrap();
        let d = three_pages();
        d.save_image(dir.path().join(format!("test.{}", ext)), &SaveOptions::new())
            .unwrap();
        assert_eq!(file_names(dir.path()), expected, "extension {}", ext);
    }
}

#[test]
fn mp4_codec_changes_output() {
    init();
    if !(ffmpeg_has_encoder(DEFAULT_CODEC) && ffmpeg_has_encoder("mpeg4")) {
        eprintln!("ffmpeg with libx264 and mpeg4 not found, skipping");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let d = three_pages();
    let default = dir.path().join("test.mp4");
    let mpeg4 = dir.path().join("test2.mp4");
    d.save_image(&default, &SaveOptions::new()).unwrap();
    d.save_image(&mpeg4, &SaveOptions::new().codec("mpeg4"))
        .unwrap();
    assert_eq!(file_names(dir.path()), vec!["test.mp4", "test2.mp4"]);
    let default_len = fs::metadata(default).unwrap().len();
    let mpeg4_len = fs::metadata(mpeg4).unwrap().len();
    assert!(
        mpeg4_len > default_len,
        "mpeg4 {} <= default {}",
        mpeg4_len,
        default_len
    );
}

#[test]
fn polygon_renders_like_manual_path() {
    let dir = tempfile::tempdir().unwrap();
    let a = new_drawing();
    a.size(120.0, 120.0).unwrap();
    a.polygon([0.0, 0.0], [[0.0, 100.0], [100.0, 0.0]], true)
        .unwrap();

    let b = new_drawing();
    b.size(120.0, 120.0).unwrap();
    let mut path = BezierPath::new();
    path.move_to((0.0, 0.0));
    path.line_to((0.0, 100.0)).unwrap();
    path.line_to((100.0, 0.0)).unwrap();
    path.close_path();
    b.draw_path(&path).unwrap();

    let image_a = render_png(&a, dir.path(), "a.png");
    let image_b = render_png(&b, dir.path(), "b.png");
    assert_eq!(image_a, image_b);
    // bottom left corner is inside the triangle
    assert_eq!(image_a.get_pixel(5, 114), &Rgba([0, 0, 0, 255]));
    assert_eq!(image_a.get_pixel(110, 5), &Rgba([0, 0, 0, 0]));
}

#[test]
fn origin_is_bottom_left() {
    let dir = tempfile::tempdir().unwrap();
    let d = new_drawing();
    d.size(100.0, 100.0).unwrap();
    d.fill(0.5);
    d.rect(0.0, 0.0, 10.0, 10.0).unwrap();
    let image = render_png(&d, dir.path(), "flip.png");
    assert_eq!(image.dimensions(), (100, 100));
    assert_eq!(image.get_pixel(5, 95), &Rgba([128, 128, 128, 255]));
    assert_eq!(image.get_pixel(5, 5), &Rgba([0, 0, 0, 0]));
}

#[test]
fn unflipped_origin_is_top_left() {
    let dir = tempfile::tempdir().unwrap();
    let d = new_drawing_with_config(DrawingConfig {
        flip_canvas: false,
        ..Default::default()
    });
    d.size(100.0, 100.0).unwrap();
    d.rect(0.0, 0.0, 10.0, 10.0).unwrap();
    let image = render_png(&d, dir.path(), "noflip.png");
    assert_eq!(image.get_pixel(5, 5), &Rgba([0, 0, 0, 255]));
    assert_eq!(image.get_pixel(5, 95), &Rgba([0, 0, 0, 0]));
}

#[test]
fn saved_state_restores_transform() {
    let dir = tempfile::tempdir().unwrap();
    let d = new_drawing();
    d.size(100.0, 100.0).unwrap();
    d.saved_state(|d| {
        d.translate(50.0, 50.0)?;
        d.fill((1.0, 0.0, 0.0));
        d.rect(0.0, 0.0, 10.0, 10.0)
    })
    .unwrap();
    d.rect(0.0, 0.0, 10.0, 10.0).unwrap();
    let image = render_png(&d, dir.path(), "state.png");
    assert_eq!(image.get_pixel(55, 45), &Rgba([255, 0, 0, 255]));
    assert_eq!(image.get_pixel(5, 95), &Rgba([0, 0, 0, 255]));
}

#[test]
fn stroke_only_outline() {
    let dir = tempfile::tempdir().unwrap();
    let d = new_drawing();
    d.size(100.0, 100.0).unwrap();
    d.fill(());
    d.stroke((0.0, 0.0, 1.0));
    d.stroke_width(10.0);
    d.rect(20.0, 20.0, 60.0, 60.0).unwrap();
    let image = render_png(&d, dir.path(), "stroke.png");
    assert_eq!(image.get_pixel(20, 50), &Rgba([0, 0, 255, 255]));
    assert_eq!(image.get_pixel(50, 50), &Rgba([0, 0, 0, 0]));
}

#[test]
fn jpeg_is_composited_over_white() {
    let dir = tempfile::tempdir().unwrap();
    let d = new_drawing();
    d.size(40.0, 40.0).unwrap();
    d.rect(0.0, 0.0, 20.0, 40.0).unwrap();
    let path = dir.path().join("white.jpg");
    d.save_image(&path, &SaveOptions::new()).unwrap();
    let image = image::open(&path).unwrap().to_rgb8();
    let background = image.get_pixel(35, 20);
    assert!(background.0.iter().all(|c| *c > 240), "{:?}", background);
    let ink = image.get_pixel(5, 20);
    assert!(ink.0.iter().all(|c| *c < 15), "{:?}", ink);
}

#[test]
fn image_is_placed_by_its_bottom_left() {
    let dir = tempfile::tempdir().unwrap();
    let png = dir.path().join("red.png");
    RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255]))
        .save(&png)
        .unwrap();

    let d = new_drawing();
    d.size(50.0, 50.0).unwrap();
    d.image(&png, (0.0, 0.0), 1.0).unwrap();
    d.image(&png, (30.0, 30.0), 0.5).unwrap();
    let image = render_png(&d, dir.path(), "out.png");
    assert_eq!(image.get_pixel(5, 45), &Rgba([255, 0, 0, 255]));
    assert_eq!(image.get_pixel(5, 5), &Rgba([0, 0, 0, 0]));
    let translucent = image.get_pixel(35, 15);
    assert_eq!(translucent.0[0], 255);
    assert!((127..=129).contains(&translucent.0[3]), "{:?}", translucent);
}

#[test]
fn empty_text_draws_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let d = new_drawing();
    d.size(50.0, 50.0).unwrap();
    d.text("", (10.0, 10.0), None).unwrap();
    let image = render_png(&d, dir.path(), "empty.png");
    assert!(image.pixels().all(|p| p.0[3] == 0));
}

#[test]
fn text_uses_the_system_font() {
    init();
    let dir = tempfile::tempdir().unwrap();
    let d = new_drawing();
    d.size(200.0, 100.0).unwrap();
    d.font_size(40.0);
    let (width, spacing) = d.text_size("Hello").unwrap();
    if width == 0.0 {
        eprintln!("no system font, skipping");
        assert_eq!(spacing, 48.0);
        return;
    }
    assert!(spacing > 0.0);
    d.text("Hello", (100.0, 30.0), Some(TextAlign::Center)).unwrap();
    let image = render_png(&d, dir.path(), "text.png");
    let inked = image.pixels().filter(|p| p.0[3] > 0).count();
    assert!(inked > 50, "only {} pixels inked", inked);
}

#[test]
fn new_page_inside_saved_state_keeps_going() {
    let dir = tempfile::tempdir().unwrap();
    let d = new_drawing();
    d.size(30.0, 30.0).unwrap();
    d.saved_state(|d| {
        d.translate(10.0, 10.0)?;
        d.new_page(30.0, 30.0)?;
        d.rect(0.0, 0.0, 5.0, 5.0)
    })
    .unwrap();
    assert_eq!(d.state_depth(), 0);
    d.save_image(dir.path().join("pages.png"), &SaveOptions::new())
        .unwrap();
    assert_eq!(file_names(dir.path()), vec!["pages_0.png", "pages_1.png"]);
}
