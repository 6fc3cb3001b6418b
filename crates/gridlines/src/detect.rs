//! End-to-end helpers: image file in, grid image and report out.

use std::path::Path;
use std::time::Instant;

use gridlines_core::SampleGrid;
use gridlines_detect::{
    Axis, GridDetectConfig, GridDetectError, GridDetectReport, GridDetectionResult, GridDetector,
    GridIoError,
};
use log::info;

use crate::codec::{load_sample_grid, save_sample_grid, CodecError};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced by the end-to-end helpers.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error("{path}: {source}")]
    Codec {
        path: String,
        #[source]
        source: CodecError,
    },

    #[error(transparent)]
    Detect(#[from] GridDetectError),

    #[error(transparent)]
    Io(#[from] GridIoError),
}

fn codec_err(path: &Path) -> impl FnOnce(CodecError) -> DetectError + '_ {
    move |source| DetectError::Codec {
        path: path.display().to_string(),
        source,
    }
}

fn elapsed_ms(since: Instant) -> u64 {
    since.elapsed().as_millis() as u64
}

/// Decode `path` and run `detector` on it.
pub fn detect_file(
    path: impl AsRef<Path>,
    detector: &GridDetector,
) -> Result<(SampleGrid, GridDetectionResult), DetectError> {
    let path = path.as_ref();
    let image = load_sample_grid(path).map_err(codec_err(path))?;
    let result = detector.detect(&image)?;
    Ok((image, result))
}

/// Run a configured detection: decode, detect, write every requested output.
///
/// The returned report carries stage timings. When `report_path` is set the
/// report is written even if a stage fails, with the failure in `error`.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip(cfg), fields(image = %cfg.image_path)))]
pub fn run(cfg: &GridDetectConfig) -> Result<GridDetectReport, DetectError> {
    let started = Instant::now();
    let mut report = GridDetectReport::new(&cfg.image_path, 0, 0, 0);
    let outcome = run_stages(cfg, &mut report);
    report.timings_ms.total = elapsed_ms(started);

    if let Err(err) = &outcome {
        report.set_error(err);
    }
    if let Some(path) = &cfg.report_path {
        report.write_json(path)?;
        info!("wrote report to {path}");
    }
    outcome.map(|()| report)
}

fn run_stages(cfg: &GridDetectConfig, report: &mut GridDetectReport) -> Result<(), DetectError> {
    let detector = cfg.build_detector()?;

    let t = Instant::now();
    let input = Path::new(&cfg.image_path);
    let image = load_sample_grid(input).map_err(codec_err(input))?;
    report.width = image.width();
    report.height = image.height();
    report.channels = image.channels();
    report.timings_ms.load_image = elapsed_ms(t);

    let t = Instant::now();
    let grey = detector.prepare(&image)?;
    let (mask, threshold) = detector.binarize(&grey);
    let mut result = detector.detect_from_mask(&mask);
    result.threshold = Some(threshold);
    report.timings_ms.detect = elapsed_ms(t);
    report.set_detection(&result);

    let t = Instant::now();
    let overlay = result.render(Some(&image), &cfg.overlay)?;
    let output = cfg.output_path();
    save_sample_grid(&overlay, &output).map_err(codec_err(&output))?;
    info!("wrote grid to {}", output.display());

    if let Some(path) = &cfg.mask_path {
        let path = Path::new(path);
        save_sample_grid(mask.as_grid(), path).map_err(codec_err(path))?;
    }
    for axis in Axis::ALL {
        if let Some(path) = cfg.axis_path(axis) {
            let lines = result.render_axis(axis, &cfg.overlay)?;
            save_sample_grid(&lines, &path).map_err(codec_err(&path))?;
        }
    }
    report.timings_ms.render = elapsed_ms(t);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ruled(w: usize, h: usize, pitch: usize) -> SampleGrid {
        SampleGrid::from_fn(w, h, 1, |x, y, _| {
            if x % pitch == pitch / 2 || y % pitch == pitch / 2 {
                0.1
            } else {
                0.9
            }
        })
        .unwrap()
    }

    #[test]
    fn detect_file_decodes_and_detects() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paper.png");
        save_sample_grid(&ruled(80, 60, 20), &path).unwrap();

        let detector = GridDetector::new(Default::default()).unwrap();
        let (image, result) = detect_file(&path, &detector).unwrap();
        assert_eq!((image.width(), image.height()), (80, 60));
        assert_eq!(result.vertical.canonical.len(), 4);
        assert_eq!(result.horizontal.canonical.len(), 3);
    }

    #[test]
    fn run_writes_all_outputs_and_report() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("paper.png");
        save_sample_grid(&ruled(80, 60, 20), &input).unwrap();

        let at = |name: &str| dir.path().join(name).display().to_string();
        let cfg = GridDetectConfig {
            image_path: at("paper.png"),
            output_path: Some(at("out/grid.png")),
            mask_path: Some(at("out/mask.png")),
            axes_path: Some(at("out/{axis}.png")),
            report_path: Some(at("out/report.json")),
            ..GridDetectConfig::default()
        };
        let report = run(&cfg).unwrap();
        assert_eq!((report.width, report.height, report.channels), (80, 60, 1));
        assert!(report.error.is_none());
        assert!(report.spacing.as_ref().and_then(|s| s.period()).is_some());

        for name in ["grid.png", "mask.png", "vertical.png", "horizontal.png", "report.json"] {
            assert!(dir.path().join("out").join(name).is_file(), "{name}");
        }
        let on_disk = GridDetectReport::load_json(at("out/report.json")).unwrap();
        assert_eq!(on_disk.vertical.unwrap().detected, 4);
    }

    #[test]
    fn failed_run_still_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let report_path = dir.path().join("report.json");
        let cfg = GridDetectConfig {
            image_path: dir.path().join("missing.png").display().to_string(),
            report_path: Some(report_path.display().to_string()),
            ..GridDetectConfig::default()
        };
        let err = run(&cfg).unwrap_err();
        assert!(matches!(err, DetectError::Codec { .. }));

        let report = GridDetectReport::load_json(&report_path).unwrap();
        assert!(report.error.unwrap().contains("missing.png"));
        assert!(report.vertical.is_none());
    }
}
