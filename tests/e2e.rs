use std::fs;
use std::path::PathBuf;

use pixelstack::io::{parse_ppm, read_image, read_state};
use pixelstack::script::Session;
use pixelstack::{Image, Layer, Modifier, Pixel};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("pixelstack_e2e_{}", name))
}

fn uniform(width: u32, height: u32, r: u8, g: u8, b: u8) -> Image {
    let mut pixels = Vec::new();
    for y in 0..height {
        for x in 0..width {
            pixels.push(Pixel::from_rgb(x, y, r, g, b));
        }
    }
    Image::new(pixels, width, height, 255).unwrap()
}

#[test]
fn scripted_session_processes_and_exports() {
    let input = temp_path("input.ppm");
    let export = temp_path("blend.ppm");
    let state = temp_path("state.txt");

    // A 4x4 uniform grey source image, written as plain PPM by hand.
    let mut body = String::from("P3\n4\n4\n255\n");
    for _ in 0..16 {
        body.push_str("100 100 100 ");
    }
    fs::write(&input, body).unwrap();

    let script = format!(
        "load image {}\n\
          create checkerboard 4 4 2\n\
          set 2\n\
          toggle 2\n\
          apply sepia\n\
          save state {}\n\
          export {}\n\
          exit\n",
        input.display(),
        state.display(),
        export.display(),
    );

    let mut session = Session::new(Vec::new());
    session.run(script.as_bytes()).unwrap();
    assert!(!session.is_running());

    // Layer 2 (the sepia'd checkerboard) is hidden, so the blend is just the
    // untouched grey source layer.
    let blended = read_image(&export).unwrap();
    assert_eq!((blended.width(), blended.height()), (4, 4));
    for p in blended.pixels() {
        assert_eq!(p.color(), (100, 100, 100));
    }

    // The state file restores both images with their visibility flags.
    let restored = read_state(&state).unwrap();
    assert_eq!(restored.count(), 2);
    assert_eq!(restored.visibility(), &[true, false]);

    for path in [&input, &export, &state] {
        let _ = fs::remove_file(path);
    }
}

#[test]
fn modifier_pipeline_keeps_the_stack_consistent() {
    let mut layer = Layer::new();
    layer.add_layer(uniform(8, 8, 100, 100, 100)).unwrap();
    layer.add_layer(uniform(8, 8, 0, 100, 100)).unwrap();

    layer.apply_to_current(&Modifier::blur()).unwrap();
    layer
        .apply_to_current(&Modifier::mosaic_seeded(5, 77).unwrap())
        .unwrap();
    layer.alter_layer(&Modifier::downscale(4, 4), 4, 4).unwrap();

    let props = layer.props().unwrap();
    assert_eq!((props.width, props.height), (4, 4));
    for image in layer.images() {
        assert_eq!((image.width(), image.height()), (4, 4));
        assert_eq!(image.pixels().len(), 16);
    }

    let blended = layer.blend().unwrap();
    assert_eq!(blended.pixels().len(), 16);
}

#[test]
fn exported_ppm_reimports_identically() {
    let path = temp_path("roundtrip.ppm");
    let mut layer = Layer::new();
    layer.add_layer(uniform(3, 3, 100, 100, 100)).unwrap();
    layer.add_layer(uniform(3, 3, 0, 100, 100)).unwrap();

    let blended = layer.blend().unwrap();
    pixelstack::io::write_image(&path, &blended).unwrap();

    let reloaded = read_image(&path).unwrap();
    for p in reloaded.pixels() {
        assert_eq!(p.color(), (50, 100, 100));
    }

    // The on-disk text is the image's own serialized form behind a P3 line.
    let raw = fs::read_to_string(&path).unwrap();
    assert_eq!(parse_ppm(&raw).unwrap().pixels(), blended.pixels());
    let _ = fs::remove_file(&path);
}
