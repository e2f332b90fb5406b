use std::fs;

use visualizer::config::Settings;
use visualizer::run_headless;

#[test]
fn headless_run_writes_a_png_of_the_viewport() {
    let path = std::env::temp_dir().join(format!("visualizer-headless-{}.png", std::process::id()));

    let mut settings = Settings {
        grid_width: 80,
        grid_height: 45,
        headless_output: Some(path.clone()),
        headless_frames: 2,
        ..Default::default()
    };
    settings.viewport.width = 120;
    settings.viewport.height = 90;

    run_headless(&settings).expect("headless run succeeds");

    let image = image::open(&path).expect("png was written").into_rgba8();
    assert_eq!(image.dimensions(), (120, 90));
    assert!(image.pixels().any(|pixel| pixel[1] > 0));

    fs::remove_file(&path).expect("cleanup");
}

#[test]
fn settings_file_round_trips_through_toml() {
    let settings = Settings::default();
    let source = toml::to_string(&settings).expect("serializable");

    assert_eq!(Settings::from_toml(&source).expect("parsable"), settings);
}
