//! Travelling wave on a cable disturbed by nearby inductors.
//!
//! The base wave `A·sin(2π f x − φ)` is sampled along the cable (the x axis,
//! `y = 0`). A magnetic inductor scales the wave near it by
//! `1 + I·exp(−(d/r)²)`; an electric inductor adds its own wave
//! `A₂·exp(−3d)·sin(2π f₂ x − φ)`, where `d` is the distance from the
//! inductor to the cable point.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, ensure_positive, Result, SimError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouplingMode {
    Magnetic,
    Electric,
    Both,
}

impl CouplingMode {
    pub fn magnetic(&self) -> bool {
        matches!(self, CouplingMode::Magnetic | CouplingMode::Both)
    }

    pub fn electric(&self) -> bool {
        matches!(self, CouplingMode::Electric | CouplingMode::Both)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MagneticInductor {
    pub x: f64,
    pub y: f64,
    pub intensity: f64,
    pub radius: f64,
}

impl Default for MagneticInductor {
    fn default() -> Self {
        MagneticInductor { x: 3.0, y: 0.0, intensity: 1.0, radius: 2.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElectricInductor {
    pub x: f64,
    pub y: f64,
    pub amplitude: f64,
    pub frequency: f64,
}

impl Default for ElectricInductor {
    fn default() -> Self {
        ElectricInductor { x: 7.0, y: 0.0, amplitude: 1.0, frequency: 1.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub amplitude: f64,
    pub frequency: f64,
    pub mode: CouplingMode,
    pub magnetic: MagneticInductor,
    pub electric: ElectricInductor,
    /// Cable extent along x.
    pub span: (f64, f64),
    pub points: usize,
}

impl Default for FieldConfig {
    fn default() -> Self {
        FieldConfig {
            amplitude: 1.0,
            frequency: 1.0,
            mode: CouplingMode::Magnetic,
            magnetic: MagneticInductor::default(),
            electric: ElectricInductor::default(),
            span: (0.0, 10.0),
            points: 1000,
        }
    }
}

impl FieldConfig {
    /// `points` evenly spaced positions covering `span`, both ends included.
    pub fn positions(&self) -> Vec<f64> {
        let (start, end) = self.span;
        match self.points {
            0 => Vec::new(),
            1 => vec![start],
            n => {
                let step = (end - start) / (n - 1) as f64;
                (0..n).map(|i| start + step * i as f64).collect()
            }
        }
    }

    fn validate(&self) -> Result<()> {
        ensure_non_negative("wave amplitude", self.amplitude)?;
        ensure_non_negative("wave frequency", self.frequency)?;
        if self.points == 0 {
            return Err(SimError::InvalidParameter { name: "cable points", value: 0.0 });
        }
        if self.mode.magnetic() {
            ensure_non_negative("magnetic intensity", self.magnetic.intensity)?;
            ensure_positive("magnetic radius", self.magnetic.radius)?;
        }
        if self.mode.electric() {
            ensure_non_negative("electric amplitude", self.electric.amplitude)?;
            ensure_non_negative("electric frequency", self.electric.frequency)?;
        }
        Ok(())
    }
}

/// Wave displacement along the cable for one phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldFrame {
    pub phase: f64,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl FieldFrame {
    /// Largest absolute displacement.
    pub fn peak(&self) -> f64 {
        self.y.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()))
    }
}

/// Displacement at each position in `x` for phase `phase`.
pub fn simulate_field(config: &FieldConfig, x: &[f64], phase: f64) -> Result<Vec<f64>> {
    config.validate()?;

    let field = x
        .iter()
        .map(|&xi| {
            let mut y = config.amplitude * (TAU * config.frequency * xi - phase).sin();
            if config.mode.magnetic() {
                let m = &config.magnetic;
                let d = (xi - m.x).hypot(m.y);
                y *= 1.0 + m.intensity * (-(d / m.radius).powi(2)).exp();
            }
            if config.mode.electric() {
                let e = &config.electric;
                let d = (xi - e.x).hypot(e.y);
                y += e.amplitude * (-3.0 * d).exp() * (TAU * e.frequency * xi - phase).sin();
            }
            y
        })
        .collect();
    Ok(field)
}

/// Samples the whole cable at `phase`.
pub fn frame(config: &FieldConfig, phase: f64) -> Result<FieldFrame> {
    let x = config.positions();
    let y = simulate_field(config, &x, phase)?;
    Ok(FieldFrame { phase, x, y })
}

/// Endless sequence of phases `start + k·step`. Timing between frames is up
/// to the caller.
#[derive(Debug, Clone)]
pub struct PhaseSweep {
    start: f64,
    step: f64,
    k: u64,
}

impl PhaseSweep {
    pub fn new(start: f64, step: f64) -> Self {
        PhaseSweep { start, step, k: 0 }
    }

    /// Back to `start`.
    pub fn reset(&mut self) {
        self.k = 0;
    }

    /// Phase the next call to `next` will return.
    pub fn current(&self) -> f64 {
        self.start + self.step * self.k as f64
    }
}

impl Iterator for PhaseSweep {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let phase = self.current();
        self.k += 1;
        Some(phase)
    }
}
