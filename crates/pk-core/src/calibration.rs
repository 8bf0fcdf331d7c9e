//! Pixel-to-centimeter calibration for a product side.
//!
//! The operator draws a line over a feature of known physical length
//! (two clicks, constrained to the dominant axis so the line is exactly
//! horizontal or vertical), then types the real distance in cm. From that
//! single measurement we derive `pixels_per_cm` and can report the
//! physical size of every print area. Only one measurement line is active
//! at a time; confirming a new one replaces the old.

use crate::coords::{ImageTransform, Point};
use crate::model::{MeasurementData, MeasurementLine, PrintArea};

/// Observable calibration state, driven by clicks and text input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationState {
    /// No valid measurement yet.
    Uncalibrated,
    /// First click placed, waiting for the second.
    DrawingLine { start: Point },
    /// Line complete, waiting for the operator to type the distance.
    PendingDistance { start: Point, end: Point },
    /// A valid pixels-per-cm scale exists.
    Calibrated,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Pending {
    Line { start: Point },
    Distance { start: Point, end: Point },
}

/// Calibration session for one side. Wraps the persisted
/// [`MeasurementData`] plus the in-progress line, if any.
#[derive(Debug, Clone, Default)]
pub struct Calibration {
    data: MeasurementData,
    pending: Option<Pending>,
}

/// Snap the second endpoint of a measurement line to the dominant axis of
/// the drag, so measurements are exactly horizontal or vertical.
pub fn constrain_to_axis(start: Point, current: Point) -> Point {
    let dx = (current.x - start.x).abs();
    let dy = (current.y - start.y).abs();
    if dx >= dy {
        Point::new(current.x, start.y)
    } else {
        Point::new(start.x, current.y)
    }
}

impl Calibration {
    /// Resume from persisted measurement data (or start fresh).
    pub fn from_data(data: Option<MeasurementData>) -> Self {
        Self {
            data: data.unwrap_or_default(),
            pending: None,
        }
    }

    pub fn state(&self) -> CalibrationState {
        match self.pending {
            Some(Pending::Line { start }) => CalibrationState::DrawingLine { start },
            Some(Pending::Distance { start, end }) => CalibrationState::PendingDistance { start, end },
            None if self.is_calibrated() => CalibrationState::Calibrated,
            None => CalibrationState::Uncalibrated,
        }
    }

    pub fn is_calibrated(&self) -> bool {
        self.data.has_valid_measurement && self.data.pixels_per_cm.is_some()
    }

    pub fn pixels_per_cm(&self) -> Option<f32> {
        if self.data.has_valid_measurement {
            self.data.pixels_per_cm
        } else {
            None
        }
    }

    pub fn data(&self) -> &MeasurementData {
        &self.data
    }

    /// Register a measure-tool click. The first click anchors the line;
    /// the second (axis-constrained) completes it and moves to the
    /// pending-distance state.
    pub fn click(&mut self, p: Point) {
        match self.pending {
            None | Some(Pending::Distance { .. }) => {
                self.pending = Some(Pending::Line { start: p });
            }
            Some(Pending::Line { start }) => {
                let end = constrain_to_axis(start, p);
                if start.distance_to(end) <= f32::EPSILON {
                    log::debug!("ignoring zero-length measurement line");
                    return;
                }
                self.pending = Some(Pending::Distance { start, end });
            }
        }
    }

    /// Preview endpoint for the line currently being drawn, constrained to
    /// the dominant axis of the cursor position.
    pub fn preview_end(&self, cursor: Point) -> Option<Point> {
        match self.pending {
            Some(Pending::Line { start }) => Some(constrain_to_axis(start, cursor)),
            _ => None,
        }
    }

    /// Confirm the pending line with the distance the operator typed.
    ///
    /// Rejects anything that does not parse as a positive cm value and
    /// leaves all state unchanged so the operator can correct the input.
    /// On success the active measurement line is replaced, `pixels_per_cm`
    /// is recomputed, and every area's physical size is rederived from its
    /// *pixel* geometry on the current image transform, which makes
    /// recalibration idempotent. Returns the number of areas updated.
    pub fn confirm(
        &mut self,
        input: &str,
        areas: &mut [PrintArea],
        transform: &ImageTransform,
    ) -> Option<usize> {
        let Some(Pending::Distance { start, end }) = self.pending else {
            log::debug!("measurement confirm with no pending line");
            return None;
        };
        let real_distance = match input.trim().parse::<f32>() {
            Ok(v) if v > 0.0 && v.is_finite() => v,
            _ => {
                log::warn!("rejected measurement distance {input:?}");
                return None;
            }
        };

        let pixel_distance = start.distance_to(end);
        let pixels_per_cm = pixel_distance / real_distance;

        self.data.measurement_lines = vec![MeasurementLine {
            start,
            end,
            real_distance,
        }];
        self.data.pixels_per_cm = Some(pixels_per_cm);
        self.data.has_valid_measurement = true;
        self.pending = None;

        let updated = recalculate_real_sizes(areas, pixels_per_cm, transform);
        log::info!("calibrated at {pixels_per_cm:.2} px/cm, {updated} area(s) recalculated");
        Some(updated)
    }

    /// Abort the in-progress line (Escape). Falls back to `Calibrated` or
    /// `Uncalibrated` depending on whether a prior measurement exists.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

/// Rederive `real_width`/`real_height` for every area from its pixel
/// footprint on the scaled image. Returns how many areas were touched.
pub fn recalculate_real_sizes(
    areas: &mut [PrintArea],
    pixels_per_cm: f32,
    transform: &ImageTransform,
) -> usize {
    if pixels_per_cm <= 0.0 {
        return 0;
    }
    for area in areas.iter_mut() {
        let rel = area.geometry.to_relative();
        let px_width = (rel.width / 100.0) * transform.width;
        let px_height = (rel.height / 100.0) * transform.height;
        area.real_width = Some(px_width / pixels_per_cm);
        area.real_height = Some(px_height / pixels_per_cm);
    }
    areas.len()
}
