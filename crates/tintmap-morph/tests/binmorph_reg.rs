//! Binary morphology regression test
//!
//! Tests dilation, erosion, opening, closing and skeletonization on a
//! synthetic outlined grid.
//!
//! Run with:
//! ```
//! cargo test -p tintmap-morph --test binmorph_reg
//! ```

use tintmap_core::WallMask;
use tintmap_morph::{close_disk, dilate_disk, erode_disk, open_disk, zhang_suen};
use tintmap_test::{RegParams, fixtures};

fn grid_mask() -> WallMask {
    let raster = fixtures::outlined_grid(4, 3, 12, 3).expect("fixture");
    WallMask::from_fn(raster.width(), raster.height(), |x, y| {
        raster.rgb(x, y).is_some_and(|c| c.max_channel() < 128)
    })
    .expect("mask")
}

fn is_subset(a: &WallMask, b: &WallMask) -> bool {
    a.data().iter().zip(b.data()).all(|(x, y)| *x <= *y)
}

#[test]
fn binmorph_reg() {
    let mut rp = RegParams::new("binmorph");

    let mask = grid_mask();
    let orig_count = mask.count_walls();
    eprintln!("Image size: {}x{}", mask.width(), mask.height());
    eprintln!("Original wall pixels: {}", orig_count);
    rp.write_mask(&mask).expect("write");

    for radius in [1u32, 2, 3] {
        eprintln!("  Testing radius {}", radius);
        let dilated = dilate_disk(&mask, radius).expect("dilate");
        let eroded = erode_disk(&mask, radius).expect("erode");
        let opened = open_disk(&mask, radius).expect("open");
        let closed = close_disk(&mask, radius).expect("close");

        rp.compare_true(is_subset(&mask, &dilated), "dilation is extensive");
        rp.compare_true(is_subset(&eroded, &mask), "erosion is anti-extensive");
        rp.compare_true(is_subset(&opened, &mask), "opening is anti-extensive");
        rp.compare_true(is_subset(&mask, &closed), "closing is extensive");

        // idempotence of open and close
        let opened2 = open_disk(&opened, radius).expect("open");
        let closed2 = close_disk(&closed, radius).expect("close");
        rp.compare_masks(&opened, &opened2);
        rp.compare_masks(&closed, &closed2);
    }

    // closing only adds walls in the concave cell corners
    let closed = close_disk(&mask, 1).expect("close");
    let added = closed.count_walls() - orig_count;
    eprintln!("  Radius-1 closing added {} pixels", added);
    rp.compare_values(4.0 * 12.0, added as f64, 0.0);

    eprintln!("  Testing skeletonization");
    let skeleton = zhang_suen(&mask).expect("thin");
    rp.write_mask(&skeleton).expect("write");
    rp.compare_true(is_subset(&skeleton, &mask), "skeleton lies inside the strokes");
    rp.compare_true(
        skeleton.count_walls() * 2 < orig_count,
        "skeleton is much thinner than the strokes",
    );
    let again = zhang_suen(&skeleton).expect("thin");
    rp.compare_masks(&skeleton, &again);

    assert!(rp.cleanup(), "binmorph regression test failed");
}
