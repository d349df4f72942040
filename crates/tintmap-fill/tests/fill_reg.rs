//! Fill engine regression test
//!
//! Exercises fill and erase on labeled line art, undo closure at the
//! history capacity, the one-shot completion event, safe mode, and the
//! saved-progress format.
//!
//! Run with:
//! ```
//! cargo test -p tintmap-fill --test fill_reg
//! ```

use std::sync::Arc;
use tintmap_core::config::FillSettings;
use tintmap_core::{LabelMap, RasterImage, RegionColorMap, Rgb, WallMask};
use tintmap_fill::{ClickOutcome, FillEngine, ProgressSnapshot, Tool};
use tintmap_region::label_regions;
use tintmap_test::{RegParams, fixtures};

const RED: Rgb = Rgb::new(255, 0, 0);

fn grid_engine(settings: FillSettings) -> (FillEngine, RasterImage) {
    let raster = fixtures::outlined_grid(5, 4, 9, 2).expect("grid");
    let mask = WallMask::from_fn(raster.width(), raster.height(), |x, y| {
        raster.rgb(x, y).is_some_and(|c| c.max_channel() < 128)
    })
    .expect("mask");
    let labels = label_regions(&mask).expect("labels");
    let engine =
        FillEngine::new(Arc::new(labels), Arc::new(mask), settings, 30).expect("engine");
    (engine, raster)
}

/// Center pixel of grid cell `(col, row)`
fn cell_center(col: u32, row: u32) -> (u32, u32) {
    (2 + 11 * col + 4, 2 + 11 * row + 4)
}

/// 30×50 map: rows 0..40 are one 30-pixel region each, rows 40..50 hold a
/// single-pixel region at x = 0 and walls elsewhere.
fn completion_engine() -> FillEngine {
    let (w, h) = (30u32, 50u32);
    let mut labels = vec![0u32; (w * h) as usize];
    for y in 0..h {
        for x in 0..w {
            if y < 40 || x == 0 {
                labels[(y * w + x) as usize] = y + 1;
            }
        }
    }
    let mask = WallMask::from_fn(w, h, |x, y| y >= 40 && x != 0).expect("mask");
    let labels = LabelMap::from_vec(w, h, labels).expect("labels");
    FillEngine::new(
        Arc::new(labels),
        Arc::new(mask),
        FillSettings::default(),
        30,
    )
    .expect("engine")
}

#[test]
fn fill_reg() {
    let mut rp = RegParams::new("fill");

    // --- Fill and erase on the plus fixture ---
    let mask = fixtures::plus_mask().expect("plus");
    let labels = label_regions(&mask).expect("labels");
    let mut engine = FillEngine::new(
        Arc::new(labels.clone()),
        Arc::new(mask),
        FillSettings::default(),
        1,
    )
    .expect("engine");
    let outcome = engine.click_pixel(2, 0, Tool::Fill(RED));
    rp.compare_true(
        matches!(outcome, ClickOutcome::Applied { region_id: 2, .. }),
        "fill lands on region 2",
    );
    rp.compare_true(engine.colors().get(2) == Some(RED), "region 2 is red");
    engine.click_pixel(3, 0, Tool::Erase);
    rp.compare_true(engine.colors().is_empty(), "erase empties the map");
    rp.compare_labels(&labels, engine.labels());

    // --- Undo closure at the default history capacity ---
    let (mut engine, _) = grid_engine(FillSettings::default());
    let steps = FillSettings::default().max_undo_steps - 1;
    for i in 0..steps as u32 {
        let (x, y) = cell_center(i % 5, i / 5);
        engine.click_pixel(x, y, Tool::Fill(Rgb::new(10 * i as u8, 0, 200)));
    }
    rp.compare_values(steps as f64, engine.colored_count() as f64, 0.0);
    let mut undone = 0;
    while engine.undo() {
        undone += 1;
    }
    rp.compare_values(steps as f64, undone as f64, 0.0);
    rp.compare_true(engine.colors().is_empty(), "undo returns to the start");
    rp.compare_true(engine.timelapse().is_empty(), "undo unwinds the timelapse");

    // --- Completion fires once ---
    let mut engine = completion_engine();
    rp.compare_values(40.0, engine.progress().1 as f64, 0.0);
    let mut fired = 0;
    for y in 0..38 {
        if let ClickOutcome::Applied {
            completion: Some(_),
            ..
        } = engine.click_pixel(5, y, Tool::Fill(RED))
        {
            fired += 1;
        }
    }
    // exactly 95% is not enough
    rp.compare_values(0.0, fired as f64, 0.0);
    for y in 40..50 {
        engine.click_pixel(0, y, Tool::Fill(RED));
    }
    rp.compare_true(!engine.is_complete(), "small regions do not count");
    match engine.click_pixel(5, 38, Tool::Fill(RED)) {
        ClickOutcome::Applied {
            completion: Some(event),
            ..
        } => {
            rp.compare_values(39.0, event.colored as f64, 0.0);
            rp.compare_values(40.0, event.qualifying as f64, 0.0);
            rp.compare_values(49.0, event.timelapse.len() as f64, 0.0);
            rp.write_raster(&event.composite).expect("write");
        }
        _ => {
            rp.compare_true(false, "39th fill fires completion");
        }
    }
    // refill an already colored region
    let again = engine.click_pixel(5, 0, Tool::Fill(Rgb::new(0, 0, 255)));
    rp.compare_true(
        matches!(again, ClickOutcome::Applied { completion: None, .. }),
        "completion does not fire twice",
    );

    // --- Safe mode ---
    let settings = FillSettings {
        safe_mode_tolerance: Some(60),
        ..Default::default()
    };
    let (engine, raster) = grid_engine(settings);
    let (x, y) = cell_center(0, 0);
    let reference = raster.clone().with_pixel(x, y, Rgb::new(200, 40, 40));
    let mut engine = engine.with_reference(Arc::new(reference)).expect("reference");
    let rejected = engine.click_pixel(x, y, Tool::Fill(Rgb::new(0, 0, 255)));
    rp.compare_true(
        matches!(rejected, ClickOutcome::Rejected { .. }),
        "distant color rejected",
    );
    rp.compare_true(engine.colors().is_empty(), "rejection leaves no trace");
    let accepted = engine.click_pixel(x, y, Tool::Fill(Rgb::new(220, 30, 30)));
    rp.compare_true(
        matches!(accepted, ClickOutcome::Applied { region_id: 1, .. }),
        "close color accepted",
    );

    // --- Saved progress round trip ---
    let snapshot = engine.snapshot();
    let json = serde_json::to_string(&snapshot).expect("serialize");
    rp.compare_true(json.contains("\"regionId\":1"), "frames use camelCase");
    let back: ProgressSnapshot = serde_json::from_str(&json).expect("deserialize");
    rp.compare_true(back == snapshot, "snapshot survives JSON");

    let (mut resumed, _) = grid_engine(FillSettings::default());
    resumed.restore(back).expect("restore");
    rp.compare_true(resumed.colors() == engine.colors(), "colors restored");
    let mut expected = RegionColorMap::new();
    expected.set(1, Rgb::new(220, 30, 30));
    rp.compare_true(resumed.replay_frames().last() == Some(&expected), "replay");
    rp.write_raster(&resumed.composite().expect("composite"))
        .expect("write");

    assert!(rp.cleanup(), "fill regression test failed");
}
