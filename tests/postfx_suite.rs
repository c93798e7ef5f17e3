use ring_visualizer::visual::{NOISE_COLOR, PostFx, apply_post_fx};

fn patterned(w: usize, h: usize) -> Vec<u8> {
    let mut buf = vec![0u8; w * h * 4];
    for (i, px) in buf.chunks_exact_mut(4).enumerate() {
        px[0] = ((i * 13) % 256) as u8;
        px[1] = ((i * 29 + 7) % 256) as u8;
        px[2] = ((i * 53 + 101) % 256) as u8;
        px[3] = 255;
    }
    buf
}

fn fx(f: impl FnOnce(&mut PostFx)) -> PostFx {
    let mut v = PostFx::default();
    f(&mut v);
    v
}

// ── Invert ──────────────────────────────────────────────────────────────────

#[test]
fn invert_twice_restores_the_frame() {
    let w = 16;
    let h = 12;
    let original = patterned(w, h);
    let mut buf = original.clone();
    let mut rng = fastrand::Rng::with_seed(0);

    let invert = fx(|f| f.invert = true);
    apply_post_fx(&invert, &mut buf, w, &mut rng);
    assert_ne!(buf, original, "one inversion must change the frame");
    apply_post_fx(&invert, &mut buf, w, &mut rng);
    assert_eq!(buf, original, "double inversion must be the identity");
}

#[test]
fn invert_leaves_alpha_alone() {
    let w = 4;
    let mut buf = patterned(w, 4);
    let mut rng = fastrand::Rng::with_seed(0);
    apply_post_fx(&fx(|f| f.invert = true), &mut buf, w, &mut rng);
    for px in buf.chunks_exact(4) {
        assert_eq!(px[3], 255);
    }
}

// ── Grayscale ───────────────────────────────────────────────────────────────

#[test]
fn grayscale_is_idempotent() {
    let w = 16;
    let h = 12;
    let mut once = patterned(w, h);
    let mut rng = fastrand::Rng::with_seed(0);
    let gray = fx(|f| f.grayscale = true);

    apply_post_fx(&gray, &mut once, w, &mut rng);
    let mut twice = once.clone();
    apply_post_fx(&gray, &mut twice, w, &mut rng);
    assert_eq!(once, twice, "grayscale of a gray frame must not move");
}

#[test]
fn grayscale_equalizes_channels() {
    let w = 8;
    let mut buf = patterned(w, 8);
    let mut rng = fastrand::Rng::with_seed(0);
    apply_post_fx(&fx(|f| f.grayscale = true), &mut buf, w, &mut rng);
    for px in buf.chunks_exact(4) {
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
    }
}

// ── Threshold ───────────────────────────────────────────────────────────────

#[test]
fn threshold_is_binary_black_or_white() {
    let w = 16;
    let mut buf = patterned(w, 16);
    let mut rng = fastrand::Rng::with_seed(0);
    apply_post_fx(&fx(|f| f.threshold = true), &mut buf, w, &mut rng);

    let mut saw_black = false;
    let mut saw_white = false;
    for px in buf.chunks_exact(4) {
        assert!(px[0] == px[1] && px[1] == px[2]);
        match px[0] {
            0 => saw_black = true,
            255 => saw_white = true,
            other => panic!("threshold produced mid value {other}"),
        }
    }
    assert!(saw_black && saw_white, "pattern should straddle the cutoff");
}

#[test]
fn threshold_cutoff_sits_near_125() {
    let w = 1;
    let mut rng = fastrand::Rng::with_seed(0);
    let thr = fx(|f| f.threshold = true);

    // Gray 127: luma clearly above the 125 cutoff -> white.
    let mut buf = vec![127, 127, 127, 255];
    apply_post_fx(&thr, &mut buf, w, &mut rng);
    assert_eq!(&buf[..3], &[255, 255, 255]);

    // Gray 123: luma clearly below -> black.
    let mut buf = vec![123, 123, 123, 255];
    apply_post_fx(&thr, &mut buf, w, &mut rng);
    assert_eq!(&buf[..3], &[0, 0, 0]);
}

// ── Noise ───────────────────────────────────────────────────────────────────

#[test]
fn noise_flecks_about_a_quarter_of_the_pixels() {
    let w = 64;
    let h = 64;
    let mut buf = vec![0u8; w * h * 4];
    for px in buf.chunks_exact_mut(4) {
        px[3] = 255;
    }
    let mut rng = fastrand::Rng::with_seed(1234);
    apply_post_fx(&fx(|f| f.noise = true), &mut buf, w, &mut rng);

    let flecks = buf
        .chunks_exact(4)
        .filter(|px| px[0] == NOISE_COLOR.r && px[1] == NOISE_COLOR.g && px[2] == NOISE_COLOR.b)
        .count();
    let rate = flecks as f32 / (w * h) as f32;
    assert!(
        (0.18..0.32).contains(&rate),
        "noise rate {rate} far from the expected 0.25"
    );
}

#[test]
fn noise_is_deterministic_under_a_seed() {
    let w = 32;
    let run = || {
        let mut buf = vec![10u8; w * w * 4];
        let mut rng = fastrand::Rng::with_seed(7);
        apply_post_fx(&fx(|f| f.noise = true), &mut buf, w, &mut rng);
        buf
    };
    assert_eq!(run(), run());
}

// ── Emboss ──────────────────────────────────────────────────────────────────

#[test]
fn emboss_matches_hand_computed_fixture() {
    // 2x2 frame, red channel carries the signal.
    let mut buf = vec![
        100, 0, 0, 255, //
        50, 0, 0, 255, //
        25, 0, 0, 255, //
        10, 0, 0, 255,
    ];
    let mut rng = fastrand::Rng::with_seed(0);
    apply_post_fx(&fx(|f| f.emboss = true), &mut buf, 2, &mut rng);

    // First pixel: 127 + 2*100 - 50 - 25 = 252; zero channels settle at 127.
    // Second pixel: 127 + 2*50 - 25 - 10 = 192.
    // Bottom row has no row below, so its color bytes collapse to 0.
    assert_eq!(
        buf,
        vec![
            252, 127, 127, 255, //
            192, 127, 127, 255, //
            0, 0, 0, 255, //
            0, 0, 0, 255,
        ]
    );
}

#[test]
fn emboss_single_column_wraps_flat_index_into_next_row() {
    // Width 1: the "right" neighbor is the pixel on the next row.
    let mut buf = vec![
        10, 20, 30, 255, //
        40, 50, 60, 255,
    ];
    let mut rng = fastrand::Rng::with_seed(0);
    apply_post_fx(&fx(|f| f.emboss = true), &mut buf, 1, &mut rng);

    // Top pixel reads the same byte twice: 127 + 2c - n - n.
    assert_eq!(
        buf,
        vec![
            67, 67, 67, 255, //
            0, 0, 0, 255,
        ]
    );
}

#[test]
fn emboss_flat_field_settles_at_mid_gray() {
    let w = 4;
    let h = 4;
    let mut buf = vec![0u8; w * h * 4];
    for px in buf.chunks_exact_mut(4) {
        px[0] = 80;
        px[1] = 80;
        px[2] = 80;
        px[3] = 255;
    }
    let mut rng = fastrand::Rng::with_seed(0);
    apply_post_fx(&fx(|f| f.emboss = true), &mut buf, w, &mut rng);

    // 127 + 2v - v - v = 127 wherever both neighbors exist; the bottom row
    // reads past the end and collapses to 0.
    for (i, px) in buf.chunks_exact(4).enumerate() {
        let y = i / w;
        let x = i % w;
        if y < h - 1 {
            assert_eq!(&px[..3], &[127, 127, 127], "pixel ({x},{y})");
        } else {
            assert_eq!(&px[..3], &[0, 0, 0], "pixel ({x},{y})");
        }
        assert_eq!(px[3], 255);
    }
}
