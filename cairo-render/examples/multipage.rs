use cairo_render::new_drawing;
use drawing::{SaveOptions, TextAlign};

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        println!("Usage: multipage [output.png|.pdf|.svg|.mp4]");
        return;
    }
    let path = &args[1];

    let db = new_drawing();
    let fill = db.fill_delegate();
    for i in 0..3 {
        if let Err(e) = draw_page(&db, &fill, i) {
            eprintln!("page {} failed: {}", i, e);
            return;
        }
    }
    match db.save_image(path, &SaveOptions::new()) {
        Ok(()) => println!("saved {}", path),
        Err(e) => eprintln!("save failed: {}", e),
    }
}

fn draw_page(
    db: &drawing::Drawing,
    fill: &drawing::Delegate<drawing::ColorArgs>,
    i: usize,
) -> drawing::Result<()> {
    db.new_page(200.0, 200.0)?;
    fill.call((i as f64 / 3.0, 0.2, 0.6));
    db.saved_state(|db| {
        db.rotate(15.0 * i as f64, (100.0, 100.0))?;
        db.rect(50.0, 50.0, 100.0, 100.0)
    })?;
    db.fill(1.0);
    db.font_size(24.0);
    db.text(&format!("page {}", i), (100.0, 20.0), Some(TextAlign::Center))
}
