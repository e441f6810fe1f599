//! Step pipeline: configured transforms applied to files.
//!
//! A [`Step`] is one transform with its parameters, deserialized from the
//! `[[steps]]` array of `pixmend.toml` or built by the CLI from flags.
//! [`apply_steps`] threads a buffer through a list of them;
//! [`process_file`] wraps that in decode and encode; [`process_batch`] does
//! it for many files in parallel.
//!
//! ## Batch Output Structure
//!
//! ```text
//! out/
//! ├── report.json          # BatchReport: what was written, what failed
//! ├── cover.png
//! └── travel/
//!     └── tokyo.png        # Relative paths mirror the input directory
//! ```
//!
//! ## Parallel Processing
//!
//! Files are processed in parallel using [rayon](https://docs.rs/rayon).
//! A failing file is recorded in the report and does not stop the others.

use crate::config::PixmendConfig;
use crate::imaging::color::validate_threshold;
use crate::imaging::{
    CodecError, ImageCodec, Margins, PixelBuffer, Rectangle, ResizeQuality, Rotation,
    TransformError, calculations, convert_to_grayscale, crop_by_percentage_margins, crop_margins,
    flip, invert_colors, is_supported_image, replace_color, resize, rotate,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Image codec failed: {0}")]
    Codec(#[from] CodecError),
    #[error("Step {index} ({label}) failed: {source}")]
    Step {
        index: usize,
        label: String,
        source: TransformError,
    },
    #[error("Failed to scan {path}: {message}")]
    Scan { path: PathBuf, message: String },
    #[error("Output {output} is already written for {claimed_by}")]
    OutputCollision { output: PathBuf, claimed_by: PathBuf },
}

/// One transform and its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case", deny_unknown_fields)]
pub enum Step {
    /// Zero on one axis keeps the aspect ratio.
    Resize {
        #[serde(default)]
        width: i32,
        #[serde(default)]
        height: i32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        quality: Option<ResizeQuality>,
    },
    Flip {
        #[serde(default)]
        horizontal: bool,
        #[serde(default)]
        vertical: bool,
    },
    /// Clockwise, in degrees.
    Rotate { degrees: i32 },
    /// Margins in pixels, or in percent of the matching dimension when `percent` is set.
    Crop {
        #[serde(default)]
        top: i32,
        #[serde(default)]
        right: i32,
        #[serde(default)]
        bottom: i32,
        #[serde(default)]
        left: i32,
        #[serde(default)]
        percent: bool,
    },
    /// Keep only the given rectangle.
    Extract {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
    Invert {},
    Grayscale {},
    ReplaceColor {
        from: crate::imaging::Color,
        to: crate::imaging::Color,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        threshold: Option<i32>,
    },
}

impl Step {
    /// Short human-readable description, e.g. `resize 800x0`.
    pub fn label(&self) -> String {
        match self {
            Step::Resize {
                width,
                height,
                quality,
            } => match quality {
                Some(q) => format!("resize {width}x{height} ({})", quality_name(*q)),
                None => format!("resize {width}x{height}"),
            },
            Step::Flip {
                horizontal,
                vertical,
            } => match (*horizontal, *vertical) {
                (true, true) => "flip both".to_string(),
                (true, false) => "flip horizontal".to_string(),
                (false, true) => "flip vertical".to_string(),
                (false, false) => "flip none".to_string(),
            },
            Step::Rotate { degrees } => format!("rotate {degrees}"),
            Step::Crop {
                top,
                right,
                bottom,
                left,
                percent,
            } => {
                let unit = if *percent { "%" } else { "px" };
                format!("crop {top}/{right}/{bottom}/{left}{unit}")
            }
            Step::Extract {
                x,
                y,
                width,
                height,
            } => format!("extract {width}x{height}+{x}+{y}"),
            Step::Invert {} => "invert".to_string(),
            Step::Grayscale {} => "grayscale".to_string(),
            Step::ReplaceColor {
                from,
                to,
                threshold,
            } => match threshold {
                Some(t) => format!("replace-color {from} -> {to} (±{t})"),
                None => format!("replace-color {from} -> {to}"),
            },
        }
    }

    /// Checks that do not depend on the image the step is applied to.
    ///
    /// Size-dependent checks (crop larger than the image, rectangle out of
    /// bounds) happen when the step runs.
    pub fn validate(&self) -> Result<(), TransformError> {
        match self {
            Step::Resize { width, height, .. } => {
                // Against a 1x1 source only the sign and both-zero checks can fail.
                calculations::resolve_target_dimensions((1, 1), (*width, *height)).map(|_| ())
            }
            Step::Rotate { degrees } => Rotation::from_degrees(*degrees).map(|_| ()),
            Step::Crop {
                top,
                right,
                bottom,
                left,
                percent,
            } => {
                let margins = Margins::new(*top, *right, *bottom, *left);
                if *percent {
                    margins.validate_percentages()
                } else {
                    margins.validate_pixels(u32::MAX, u32::MAX)
                }
            }
            Step::Extract { width, height, .. } if *width < 0 || *height < 0 => {
                Err(TransformError::invalid(format!(
                    "Extract size cannot be negative - got {width}x{height}"
                )))
            }
            Step::ReplaceColor {
                threshold: Some(t), ..
            } => validate_threshold(*t).map(|_| ()),
            _ => Ok(()),
        }
    }
}

fn quality_name(quality: ResizeQuality) -> &'static str {
    match quality {
        ResizeQuality::Fast => "fast",
        ResizeQuality::HighQuality => "high",
    }
}

/// Values steps fall back on when they leave a parameter out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepDefaults {
    pub quality: ResizeQuality,
    pub threshold: i32,
}

impl StepDefaults {
    pub fn from_config(config: &PixmendConfig) -> Self {
        Self {
            quality: config.resize.quality,
            threshold: config.colors.threshold,
        }
    }
}

/// Keep an owned result, or signal that the input should be reused.
fn owned(result: Cow<'_, PixelBuffer>) -> Option<PixelBuffer> {
    match result {
        Cow::Borrowed(_) => None,
        Cow::Owned(buffer) => Some(buffer),
    }
}

/// Apply one step. No-op resizes and flips hand the input back without copying.
pub fn apply_step(
    buffer: PixelBuffer,
    step: &Step,
    defaults: &StepDefaults,
) -> Result<PixelBuffer, TransformError> {
    let replaced = match step {
        Step::Resize {
            width,
            height,
            quality,
        } => owned(resize(
            &buffer,
            *width,
            *height,
            quality.unwrap_or(defaults.quality),
        )?),
        Step::Flip {
            horizontal,
            vertical,
        } => owned(flip(&buffer, *horizontal, *vertical)),
        Step::Rotate { degrees } => Some(rotate(&buffer, Rotation::from_degrees(*degrees)?)),
        Step::Crop {
            top,
            right,
            bottom,
            left,
            percent: false,
        } => Some(crop_margins(&buffer, &Margins::new(*top, *right, *bottom, *left))?),
        Step::Crop {
            top,
            right,
            bottom,
            left,
            percent: true,
        } => Some(crop_by_percentage_margins(
            &buffer,
            &Margins::new(*top, *right, *bottom, *left),
        )?),
        Step::Extract {
            x,
            y,
            width,
            height,
        } => Some(buffer.sub_image(&Rectangle::new(*x, *y, *width, *height))?),
        Step::Invert {} => Some(invert_colors(&buffer)),
        Step::Grayscale {} => Some(convert_to_grayscale(&buffer)),
        Step::ReplaceColor {
            from,
            to,
            threshold,
        } => Some(replace_color(
            &buffer,
            *from,
            *to,
            threshold.unwrap_or(defaults.threshold),
        )?),
    };
    Ok(replaced.unwrap_or(buffer))
}

/// Apply `steps` in order. The error names the first step that failed.
pub fn apply_steps(
    buffer: PixelBuffer,
    steps: &[Step],
    defaults: &StepDefaults,
) -> Result<PixelBuffer, PipelineError> {
    steps
        .iter()
        .enumerate()
        .try_fold(buffer, |current, (index, step)| {
            debug!(
                index,
                step = %step.label(),
                width = current.width(),
                height = current.height(),
                "Applying step"
            );
            apply_step(current, step, defaults).map_err(|source| PipelineError::Step {
                index,
                label: step.label(),
                source,
            })
        })
}

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub source_dimensions: (u32, u32),
    pub output_dimensions: (u32, u32),
    pub steps: usize,
}

/// Decode `input`, apply `steps`, encode to `output`.
pub fn process_file(
    codec: &impl ImageCodec,
    input: &Path,
    output: &Path,
    steps: &[Step],
    defaults: &StepDefaults,
) -> Result<FileReport, PipelineError> {
    let source = codec.decode(input)?;
    let source_dimensions = source.dimensions();
    let result = apply_steps(source, steps, defaults)?;
    codec.encode(&result, output)?;

    info!(
        input = %input.display(),
        output = %output.display(),
        from = ?source_dimensions,
        to = ?result.dimensions(),
        "Processed image"
    );
    Ok(FileReport {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        source_dimensions,
        output_dimensions: result.dimensions(),
        steps: steps.len(),
    })
}

/// Every decodable image under `root`, sorted by path. Hidden entries are skipped.
pub fn collect_inputs(root: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    let mut inputs = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));
    for entry in walker {
        let entry = entry.map_err(|e| PipelineError::Scan {
            path: root.to_path_buf(),
            message: e.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if is_supported_image(entry.path()) {
            inputs.push(entry.into_path());
        } else {
            warn!(path = %entry.path().display(), "Skipping file with unsupported extension");
        }
    }
    inputs.sort();
    Ok(inputs)
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|s| s.starts_with('.'))
}

/// Where the output for `input` goes: same relative path under `out_dir`,
/// extension replaced by `format`.
pub fn output_path_for(input: &Path, input_root: &Path, out_dir: &Path, format: &str) -> PathBuf {
    let relative = match input.strip_prefix(input_root) {
        Ok(rel) if !rel.as_os_str().is_empty() => rel,
        _ => input.file_name().map(Path::new).unwrap_or(input),
    };
    out_dir.join(relative).with_extension(format.to_ascii_lowercase())
}

/// Output path for each input, in input order.
///
/// Inputs that differ only by extension (`a.png`, `a.jpg`) map to the same
/// output. The first one keeps it; later ones get
/// [`PipelineError::OutputCollision`] and are never processed.
fn plan_outputs(
    inputs: &[PathBuf],
    input_root: &Path,
    out_dir: &Path,
    format: &str,
) -> Vec<Result<PathBuf, PipelineError>> {
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();
    inputs
        .iter()
        .map(|input| {
            match claimed.entry(output_path_for(input, input_root, out_dir, format)) {
                Entry::Occupied(slot) => Err(PipelineError::OutputCollision {
                    output: slot.key().clone(),
                    claimed_by: slot.get().to_path_buf(),
                }),
                Entry::Vacant(slot) => {
                    let output = slot.key().clone();
                    slot.insert(input);
                    Ok(output)
                }
            }
        })
        .collect()
}

/// Progress events sent to the CLI printer while a batch runs.
///
/// Files finish in whatever order the workers get to them; `index` is the
/// file's 1-based position in the sorted input list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    Started {
        total: usize,
        threads: usize,
    },
    FileProcessed {
        index: usize,
        total: usize,
        report: FileReport,
    },
    FileFailed {
        index: usize,
        total: usize,
        input: PathBuf,
        error: String,
    },
}

/// A file the batch could not process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedFile {
    pub input: PathBuf,
    pub error: String,
}

/// Outcome of a batch run, written as `report.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub processed: Vec<FileReport>,
    pub failed: Vec<FailedFile>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Apply the configured steps to every input, in parallel.
///
/// Outputs mirror each input's path relative to `input_root` under
/// `out_dir`, with the extension from `[output] format`. Per-file failures,
/// including inputs whose output another input already claimed, are
/// collected in the report; only failing to create `out_dir` aborts.
pub fn process_batch(
    codec: &impl ImageCodec,
    inputs: &[PathBuf],
    input_root: &Path,
    out_dir: &Path,
    config: &PixmendConfig,
    events: Option<Sender<ProcessEvent>>,
) -> Result<BatchReport, PipelineError> {
    std::fs::create_dir_all(out_dir)?;
    let defaults = StepDefaults::from_config(config);
    let total = inputs.len();

    if let Some(tx) = &events {
        tx.send(ProcessEvent::Started {
            total,
            threads: rayon::current_num_threads(),
        })
        .ok();
    }

    let planned = plan_outputs(inputs, input_root, out_dir, &config.output.format);
    let outcomes: Vec<Result<FileReport, FailedFile>> = inputs
        .par_iter()
        .zip(planned)
        .enumerate()
        .map(|(position, (input, planned))| {
            let result = planned.and_then(|output| {
                if let Some(parent) = output.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                process_file(codec, input, &output, &config.steps, &defaults)
            });

            let index = position + 1;
            match result {
                Ok(report) => {
                    if let Some(tx) = &events {
                        tx.send(ProcessEvent::FileProcessed {
                            index,
                            total,
                            report: report.clone(),
                        })
                        .ok();
                    }
                    Ok(report)
                }
                Err(e) => {
                    warn!(input = %input.display(), error = %e, "Failed to process image");
                    if let Some(tx) = &events {
                        tx.send(ProcessEvent::FileFailed {
                            index,
                            total,
                            input: input.clone(),
                            error: e.to_string(),
                        })
                        .ok();
                    }
                    Err(FailedFile {
                        input: input.clone(),
                        error: e.to_string(),
                    })
                }
            }
        })
        .collect();

    let mut report = BatchReport::default();
    for outcome in outcomes {
        match outcome {
            Ok(file) => report.processed.push(file),
            Err(failed) => report.failed.push(failed),
        }
    }
    Ok(report)
}

/// Write `report` as pretty JSON to `out_dir/report.json`, returning the path.
pub fn write_report(report: &BatchReport, out_dir: &Path) -> Result<PathBuf, PipelineError> {
    let path = out_dir.join("report.json");
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(&path, json)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::codec::tests::{MockCodec, RecordedOp};
    use crate::imaging::{Color, Dimensions, FileCodec, Transparency};
    use crate::test_helpers::{gradient_buffer, opaque_gradient_buffer, solid_buffer, write_test_png};
    use tempfile::TempDir;

    fn defaults() -> StepDefaults {
        StepDefaults::default()
    }

    // =========================================================================
    // Step parsing and validation
    // =========================================================================

    #[test]
    fn step_parses_from_toml() {
        let step: Step = toml::from_str("op = \"crop\"\ntop = 10\npercent = true\n").unwrap();
        assert_eq!(
            step,
            Step::Crop {
                top: 10,
                right: 0,
                bottom: 0,
                left: 0,
                percent: true
            }
        );
    }

    #[test]
    fn step_serializes_with_op_tag() {
        let json = serde_json::to_value(Step::Rotate { degrees: 90 }).unwrap();
        assert_eq!(json, serde_json::json!({"op": "rotate", "degrees": 90}));

        let json = serde_json::to_value(Step::Invert {}).unwrap();
        assert_eq!(json, serde_json::json!({"op": "invert"}));
    }

    #[test]
    fn validate_catches_bad_parameters_early() {
        assert!(Step::Rotate { degrees: 45 }.validate().is_err());
        assert!(Step::Rotate { degrees: -90 }.validate().is_ok());
        assert!(
            Step::Resize {
                width: 0,
                height: 0,
                quality: None
            }
            .validate()
            .is_err()
        );
        assert!(
            Step::Resize {
                width: -3,
                height: 10,
                quality: None
            }
            .validate()
            .is_err()
        );
        assert!(
            Step::Crop {
                top: 51,
                right: 0,
                bottom: 50,
                left: 0,
                percent: true
            }
            .validate()
            .is_err()
        );
        assert!(
            Step::Crop {
                top: 500,
                right: 0,
                bottom: 500,
                left: 0,
                percent: false
            }
            .validate()
            .is_ok()
        );
        assert!(
            Step::ReplaceColor {
                from: Color::BLACK,
                to: Color::WHITE,
                threshold: Some(256)
            }
            .validate()
            .is_err()
        );
        assert!(
            Step::Extract {
                x: 0,
                y: 0,
                width: -1,
                height: 1
            }
            .validate()
            .is_err()
        );
    }

    #[test]
    fn labels_are_readable() {
        assert_eq!(
            Step::Resize {
                width: 800,
                height: 0,
                quality: Some(ResizeQuality::Fast)
            }
            .label(),
            "resize 800x0 (fast)"
        );
        assert_eq!(
            Step::Crop {
                top: 1,
                right: 2,
                bottom: 3,
                left: 4,
                percent: true
            }
            .label(),
            "crop 1/2/3/4%"
        );
        assert_eq!(
            Step::Extract {
                x: 5,
                y: 6,
                width: 10,
                height: 20
            }
            .label(),
            "extract 10x20+5+6"
        );
    }

    // =========================================================================
    // apply_step / apply_steps
    // =========================================================================

    #[test]
    fn resize_uses_default_quality_when_unset() {
        let src = opaque_gradient_buffer(8, 8);
        let step = Step::Resize {
            width: 4,
            height: 4,
            quality: None,
        };
        let fast = StepDefaults {
            quality: ResizeQuality::Fast,
            threshold: 0,
        };
        let out = apply_step(src.clone(), &step, &fast).unwrap();
        assert_eq!(out, crate::imaging::instant_resize(&src, 4, 4).unwrap());
    }

    #[test]
    fn no_op_steps_return_input() {
        let src = gradient_buffer(5, 3);
        let same = apply_step(
            src.clone(),
            &Step::Flip {
                horizontal: false,
                vertical: false,
            },
            &defaults(),
        )
        .unwrap();
        assert_eq!(same, src);

        let same = apply_step(
            src.clone(),
            &Step::Resize {
                width: 5,
                height: 0,
                quality: None,
            },
            &defaults(),
        )
        .unwrap();
        assert_eq!(same, src);
    }

    #[test]
    fn replace_color_uses_default_threshold() {
        let src = solid_buffer(2, 2, Color::rgb(250, 0, 0), Transparency::Opaque);
        let step = Step::ReplaceColor {
            from: Color::rgb(255, 0, 0),
            to: Color::rgb(0, 255, 0),
            threshold: None,
        };

        let exact = apply_step(src.clone(), &step, &defaults()).unwrap();
        assert_eq!(exact, src);

        let loose = StepDefaults {
            quality: ResizeQuality::Fast,
            threshold: 10,
        };
        let out = apply_step(src, &step, &loose).unwrap();
        assert!(out.colors().all(|c| c == Color::rgb(0, 255, 0)));
    }

    #[test]
    fn steps_run_in_order() {
        let src = gradient_buffer(6, 4);
        let steps = vec![
            Step::Rotate { degrees: 90 },
            Step::Crop {
                top: 1,
                right: 0,
                bottom: 1,
                left: 0,
                percent: false,
            },
            Step::Invert {},
        ];
        let out = apply_steps(src.clone(), &steps, &defaults()).unwrap();

        let expected = crate::imaging::rotate_by_90_degrees(&src);
        let expected = crate::imaging::crop(&expected, 1, 0, 1, 0).unwrap();
        let expected = invert_colors(&expected);
        assert_eq!(out.dimensions(), (4, 4));
        assert_eq!(out, expected);
    }

    #[test]
    fn failing_step_is_named() {
        let src = gradient_buffer(10, 10);
        let steps = vec![
            Step::Grayscale {},
            Step::Crop {
                top: 6,
                right: 0,
                bottom: 6,
                left: 0,
                percent: false,
            },
        ];
        let err = apply_steps(src, &steps, &defaults()).unwrap_err();
        match err {
            PipelineError::Step { index, label, source } => {
                assert_eq!(index, 1);
                assert_eq!(label, "crop 6/0/6/0px");
                assert!(source.to_string().contains("height"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn extract_out_of_bounds_fails() {
        let src = gradient_buffer(4, 4);
        let step = Step::Extract {
            x: 2,
            y: 2,
            width: 3,
            height: 1,
        };
        assert!(apply_step(src, &step, &defaults()).is_err());
    }

    // =========================================================================
    // process_file (mock codec)
    // =========================================================================

    #[test]
    fn process_file_decodes_applies_and_encodes() {
        let codec = MockCodec::with_image("/in/a.png", opaque_gradient_buffer(100, 100));
        let steps = vec![Step::Resize {
            width: 0,
            height: 50,
            quality: Some(ResizeQuality::Fast),
        }];

        let report = process_file(
            &codec,
            Path::new("/in/a.png"),
            Path::new("/out/a.png"),
            &steps,
            &defaults(),
        )
        .unwrap();

        assert_eq!(report.source_dimensions, (100, 100));
        assert_eq!(report.output_dimensions, (50, 50));
        assert_eq!(report.steps, 1);
        assert_eq!(
            codec.get_operations(),
            vec![
                RecordedOp::Decode("/in/a.png".into()),
                RecordedOp::Encode {
                    path: "/out/a.png".into(),
                    width: 50,
                    height: 50
                },
            ]
        );
    }

    #[test]
    fn process_file_missing_input_is_codec_error() {
        let codec = MockCodec::new();
        let err = process_file(
            &codec,
            Path::new("/in/missing.png"),
            Path::new("/out/x.png"),
            &[],
            &defaults(),
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Codec(_)));
        assert!(codec.written("/out/x.png").is_none());
    }

    // =========================================================================
    // Input discovery and output paths
    // =========================================================================

    #[test]
    fn collect_inputs_finds_images_recursively() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        std::fs::create_dir_all(root.join("nested")).unwrap();
        std::fs::create_dir_all(root.join(".hidden")).unwrap();
        write_test_png(&root.join("b.png"), 2, 2);
        write_test_png(&root.join("nested/a.PNG"), 2, 2);
        write_test_png(&root.join(".hidden/c.png"), 2, 2);
        std::fs::write(root.join("notes.txt"), "x").unwrap();

        let inputs = collect_inputs(root).unwrap();
        assert_eq!(inputs, vec![root.join("b.png"), root.join("nested/a.PNG")]);
    }

    #[test]
    fn collect_inputs_missing_dir_errors() {
        let result = collect_inputs(Path::new("/nonexistent/pixmend/input"));
        assert!(matches!(result, Err(PipelineError::Scan { .. })));
    }

    #[test]
    fn output_path_mirrors_relative_path() {
        let out = output_path_for(
            Path::new("/photos/travel/tokyo.JPG"),
            Path::new("/photos"),
            Path::new("/out"),
            "png",
        );
        assert_eq!(out, PathBuf::from("/out/travel/tokyo.png"));
    }

    #[test]
    fn output_path_for_single_file_root() {
        let out = output_path_for(
            Path::new("/photos/cover.jpg"),
            Path::new("/photos/cover.jpg"),
            Path::new("/out"),
            "WEBP",
        );
        assert_eq!(out, PathBuf::from("/out/cover.webp"));
    }

    // =========================================================================
    // process_batch
    // =========================================================================

    #[test]
    fn batch_processes_all_and_reports_failures() {
        let tmp = TempDir::new().unwrap();
        let out_dir = tmp.path().join("out");
        let codec = MockCodec::with_image("/in/one.png", gradient_buffer(8, 8));
        codec
            .images
            .lock()
            .unwrap()
            .insert(PathBuf::from("/in/sub/two.png"), gradient_buffer(4, 2));

        let mut config = PixmendConfig::default();
        config.steps = vec![Step::Rotate { degrees: 90 }];
        let inputs = vec![
            PathBuf::from("/in/one.png"),
            PathBuf::from("/in/sub/two.png"),
            PathBuf::from("/in/missing.png"),
        ];

        let (tx, rx) = std::sync::mpsc::channel();
        let report =
            process_batch(&codec, &inputs, Path::new("/in"), &out_dir, &config, Some(tx)).unwrap();

        assert_eq!(report.processed.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert!(!report.is_success());
        assert_eq!(report.failed[0].input, PathBuf::from("/in/missing.png"));

        let two = codec.written(out_dir.join("sub/two.png")).unwrap();
        assert_eq!(two.dimensions(), (2, 4));
        assert!(out_dir.join("sub").is_dir());

        let events: Vec<ProcessEvent> = rx.iter().collect();
        assert_eq!(events.len(), 4);
        assert!(matches!(events[0], ProcessEvent::Started { total: 3, .. }));
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, ProcessEvent::FileFailed { index: 3, .. }))
                .count(),
            1
        );
    }

    #[test]
    fn batch_fails_inputs_whose_output_is_taken() {
        let tmp = TempDir::new().unwrap();
        let out_dir = tmp.path().join("out");
        let codec = MockCodec::with_image("/in/a.jpg", gradient_buffer(6, 3));
        codec
            .images
            .lock()
            .unwrap()
            .insert(PathBuf::from("/in/a.png"), gradient_buffer(2, 2));

        let inputs = vec![PathBuf::from("/in/a.jpg"), PathBuf::from("/in/a.png")];
        let report = process_batch(
            &codec,
            &inputs,
            Path::new("/in"),
            &out_dir,
            &PixmendConfig::default(),
            None,
        )
        .unwrap();

        assert_eq!(report.processed.len(), 1);
        assert_eq!(report.processed[0].input, PathBuf::from("/in/a.jpg"));
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].input, PathBuf::from("/in/a.png"));
        assert!(report.failed[0].error.contains("a.jpg"), "{}", report.failed[0].error);

        // Only the first claimant was decoded and written.
        assert_eq!(codec.written(out_dir.join("a.png")).unwrap().dimensions(), (6, 3));
        let encodes = codec
            .get_operations()
            .into_iter()
            .filter(|op| matches!(op, RecordedOp::Encode { .. }))
            .count();
        assert_eq!(encodes, 1);
    }

    #[test]
    fn plan_outputs_keeps_distinct_paths() {
        let inputs = vec![
            PathBuf::from("/in/a.png"),
            PathBuf::from("/in/sub/a.png"),
            PathBuf::from("/in/b.tif"),
        ];
        let planned = plan_outputs(&inputs, Path::new("/in"), Path::new("/out"), "png");
        let outputs: Vec<PathBuf> = planned.into_iter().map(|p| p.unwrap()).collect();
        assert_eq!(
            outputs,
            vec![
                PathBuf::from("/out/a.png"),
                PathBuf::from("/out/sub/a.png"),
                PathBuf::from("/out/b.png"),
            ]
        );
    }

    #[test]
    fn batch_writes_real_files_and_report() {
        let tmp = TempDir::new().unwrap();
        let in_dir = tmp.path().join("in");
        let out_dir = tmp.path().join("out");
        std::fs::create_dir_all(&in_dir).unwrap();
        write_test_png(&in_dir.join("a.png"), 40, 20);
        write_test_png(&in_dir.join("b.jpg"), 10, 10);

        let mut config = PixmendConfig::default();
        config.output.format = "png".into();
        config.steps = vec![Step::Resize {
            width: 20,
            height: 0,
            quality: None,
        }];

        let inputs = collect_inputs(&in_dir).unwrap();
        let report =
            process_batch(&FileCodec::new(), &inputs, &in_dir, &out_dir, &config, None).unwrap();
        assert!(report.is_success(), "{:?}", report.failed);

        let codec = FileCodec::new();
        assert_eq!(
            codec.identify(&out_dir.join("a.png")).unwrap(),
            Dimensions { width: 20, height: 10 }
        );
        assert_eq!(
            codec.identify(&out_dir.join("b.png")).unwrap(),
            Dimensions { width: 20, height: 20 }
        );

        let path = write_report(&report, &out_dir).unwrap();
        let parsed: BatchReport =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(parsed, report);
    }
}
