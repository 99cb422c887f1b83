use blind_watermark as wm;
mod util;
use util::textured_carrier;

#[test]
fn test_attack_jpeg() {
    // ================ Start of embedding section. ================
    let config = wm::Config::default();
    let encoder = wm::Encoder::new(wm::Strategy::Dct, config.clone());
    let marked = encoder
        .embed(
            textured_carrier(10, 256, 256, 1),
            &wm::Payload::Text("X123456789".to_owned()),
        )
        .unwrap();
    // ================ End of embedding section. ================

    // ================ Start of attack section. ================
    let compressed = wm::io::encode_jpeg(&marked, 90).unwrap();
    let attacked = wm::io::decode(&compressed, wm::Depth::Gray).unwrap();
    assert_ne!(attacked, marked);
    // ================ End of attack section. ================

    // ================ Start of extraction section. ================
    let decoder = wm::Decoder::new(wm::Strategy::Dct, config);
    assert_eq!(decoder.decode_text(&attacked).unwrap(), "X123456789");
    // ================ End of extraction section. ================
}

#[test]
fn test_attack_jpeg_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("marked.jpg");

    let encoder = wm::Encoder::new(wm::Strategy::Dct, wm::Config::default());
    let marked = encoder
        .embed(
            textured_carrier(11, 128, 128, 1),
            &wm::Payload::Text("jpeg".to_owned()),
        )
        .unwrap();
    // Written with the default quality.
    wm::io::write(&path, &marked).unwrap();

    let attacked = wm::io::read(&path, wm::Depth::Gray).unwrap();
    let decoder = wm::Decoder::new(wm::Strategy::Dct, wm::Config::default());
    assert_eq!(decoder.decode_text(&attacked).unwrap(), "jpeg");
}

#[test]
fn test_attack_flatten_to_gray() {
    // Every color channel carries the pattern and the DCT is linear, so the luma of the
    // channels still holds it.
    let encoder = wm::Encoder::new(wm::Strategy::Dct, wm::Config::default());
    let marked = encoder
        .embed(
            textured_carrier(12, 192, 192, 3),
            &wm::Payload::Text("flat".to_owned()),
        )
        .unwrap();
    assert_eq!(marked.channels(), 3);

    let gray = wm::PixelGrid::from_image(marked.into_image(), wm::Depth::Gray);
    assert_eq!(gray.channels(), 1);
    let decoder = wm::Decoder::new(wm::Strategy::Dct, wm::Config::default());
    assert_eq!(decoder.decode_text(&gray).unwrap(), "flat");
}

#[test]
fn test_alpha_channel_untouched() {
    let mut carrier = textured_carrier(13, 64, 64, 4);
    for row in 0..64 {
        for col in 0..64 {
            carrier.set(row, col, 3, (row * 4) as u8);
        }
    }
    let encoder = wm::Encoder::new(wm::Strategy::Dct, wm::Config::default());
    let marked = encoder
        .embed(carrier.clone(), &wm::Payload::Text("a".to_owned()))
        .unwrap();
    for row in 0..64 {
        for col in 0..64 {
            assert_eq!(marked.get(row, col, 3), carrier.get(row, col, 3));
        }
    }
    let decoder = wm::Decoder::new(wm::Strategy::Dct, wm::Config::default());
    assert_eq!(decoder.decode_text(&marked).unwrap(), "a");
}

#[test]
fn test_hardening_interleave_exact() {
    let encoder = wm::Encoder::new(wm::Strategy::Dct, wm::Config::default());
    let marked = encoder
        .embed(
            textured_carrier(14, 240, 240, 1),
            &wm::Payload::Text("scrambled".to_owned()),
        )
        .unwrap();

    let hardening = wm::Hardening::new(
        vec![
            wm::Step::Interleave(wm::Interleave::Eight),
            wm::Step::Interleave(wm::Interleave::Nine),
            wm::Step::Interleave(wm::Interleave::Four),
        ],
        240,
    );
    let mut grid = marked.clone();
    let record = hardening.apply(&mut grid).unwrap();
    assert_ne!(grid, marked);

    // Through a lossless file.
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hardened.png");
    wm::io::write(&path, &grid).unwrap();
    let mut grid = wm::io::read(&path, wm::Depth::Gray).unwrap();

    record.undo(&mut grid).unwrap();
    assert_eq!(grid, marked);
    let decoder = wm::Decoder::new(wm::Strategy::Dct, wm::Config::default());
    assert_eq!(decoder.decode_text(&grid).unwrap(), "scrambled");
}

#[test]
fn test_hardening_interleave_jpeg() {
    // ================ Start of embedding section. ================
    let config = wm::Config::default();
    let payload = wm::Payload::Image(util::square_watermark(24, 6));
    let encoder = wm::Encoder::new(wm::Strategy::Dct, config.clone());
    let carrier = textured_carrier(17, 256, 256, 1);
    let expected =
        wm::payload::to_pattern(&payload, encoder.layout(&carrier), config.threshold).unwrap();
    let marked = encoder.embed(carrier, &payload).unwrap();

    let hardening = wm::Hardening::new(
        vec![
            wm::Step::Interleave(wm::Interleave::Eight),
            wm::Step::Interleave(wm::Interleave::Nine),
            wm::Step::Interleave(wm::Interleave::Eight),
        ],
        config.threshold,
    );
    let mut grid = marked;
    let record = hardening.apply(&mut grid).unwrap();
    // ================ End of embedding section. ================

    // ================ Start of attack section. ================
    let compressed = wm::io::encode_jpeg(&grid, 95).unwrap();
    let mut attacked = wm::io::decode(&compressed, wm::Depth::Gray).unwrap();
    // ================ End of attack section. ================

    // ================ Start of extraction section. ================
    record.undo(&mut attacked).unwrap();
    let decoder = wm::Decoder::new(wm::Strategy::Dct, config);
    let extracted = decoder.extract(&attacked).unwrap();
    let errors = extracted.differences(&expected);
    assert!(
        errors * 100 <= expected.len(),
        "{errors} of {} bits flipped",
        expected.len()
    );
    // ================ End of extraction section. ================
}

#[test]
fn test_hardening_spread_with_bias() {
    let config = wm::Config::default();
    let encoder = wm::Encoder::new(wm::Strategy::Dct, config.clone());
    let marked = encoder
        .embed(
            textured_carrier(15, 240, 240, 1),
            &wm::Payload::Text("biased".to_owned()),
        )
        .unwrap();

    let mut grid = marked.clone();
    let record = wm::Hardening::spread(config.threshold)
        .apply(&mut grid)
        .unwrap();
    record.undo(&mut grid).unwrap();

    // The bias is only approximately undone.
    for (a, b) in grid.data().iter().zip(marked.data().iter()) {
        assert!((*a as i32 - *b as i32).abs() <= 2);
    }
    let decoder = wm::Decoder::new(wm::Strategy::Dct, config);
    assert_eq!(decoder.decode_text(&grid).unwrap(), "biased");
}

#[test]
fn test_hardening_rejects_resized() {
    let mut grid = textured_carrier(16, 90, 90, 1);
    let record = wm::Hardening::spread(240).apply(&mut grid).unwrap();

    let mut resized = textured_carrier(16, 90, 91, 1);
    assert!(matches!(
        record.undo(&mut resized),
        Err(wm::Error::DimensionMismatch { .. })
    ));

    let map = wm::ScrambleMap::new(90, 90, wm::Interleave::Nine).unwrap();
    assert!(matches!(
        map.apply(&mut resized),
        Err(wm::Error::DimensionMismatch { .. })
    ));
}
