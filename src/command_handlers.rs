use std::error::Error;
use std::thread;
use std::time::Duration;

use clap::ArgMatches;
use colored::Colorize;
use slog::info;

use filter_sim::analysis::{frequency_response, SnrImprovement};
use filter_sim::coupling::{self, CouplingMode, FieldConfig, PhaseSweep};
use filter_sim::filter::{design, BandRequest, CutoffSource, FilterRequest};
use filter_sim::models::{NoiseKind, SimulationConfig, WaveformShape};
use filter_sim::pipeline;
use filter_sim::utils;

const DEFAULT_BAND: (f64, f64) = (15.0, 35.0);

pub fn simulate(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let logger = utils::get_logger();
    let config = load_config(matches)?;

    let mut rng = utils::make_rng(matches.get_one::<u64>("seed").copied());
    let report = pipeline::simulate(&config, &logger, &mut rng)?;

    if let Some(path) = matches.get_one::<String>("output") {
        utils::write_json(&report, path)?;
        info!(logger, "report written"; "path" => path.as_str());
    }

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let summary = &report.summary;
    println!(
        "{}",
        format!(
            "{} Butterworth, order {}, cutoff {}",
            summary.family, summary.order, summary.cutoff
        )
        .green()
    );
    if let Some(tau) = summary.time_constant_s {
        println!("\tTime constant: {:.4} ms", tau * 1000.0);
    }
    if let Some(hint) = summary.suggested_cutoff_hz {
        println!("\tSuggested cutoff: {:.2} Hz", hint);
    }
    println!(
        "\tAttenuation at {:.1} Hz: {:.1} dB (|H| = {:.4}, zero-phase {:.4})",
        config.noise.frequency,
        summary.noise_attenuation_db,
        summary.noise_ratio,
        summary.noise_ratio_zero_phase
    );
    match summary.snr_improvement {
        SnrImprovement::Infinite => println!("\tSNR improvement: {}", "∞ dB".green()),
        SnrImprovement::Finite(db) if !db.is_finite() => {
            println!("\tSNR improvement: {}", format!("{} dB", db).yellow())
        }
        snr => println!("\tSNR improvement: {}", snr),
    }

    let window = report.display_window();
    if let Some((hz, mag)) = window.input_spectrum.peak() {
        println!("\tInput spectral peak: {:.2} Hz ({:.1})", hz, mag);
    }
    if let Some((hz, mag)) = window.filtered_spectrum.peak() {
        println!("\tFiltered spectral peak: {:.2} Hz ({:.1})", hz, mag);
    }

    if let Some(&n) = matches.get_one::<usize>("preview") {
        let preview = report.preview(n);
        println!("\n{:>10} {:>10} {:>10} {:>10}", "t (s)", "clean", "noisy", "filtered");
        for i in 0..preview.time.len() {
            println!(
                "{:>10.4} {:>10.4} {:>10.4} {:>10.4}",
                preview.time[i], preview.clean[i], preview.composite[i], preview.filtered[i]
            );
        }
    }
    Ok(())
}

pub fn response(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let mut config = SimulationConfig::from_env();
    apply_sampling_args(matches, &mut config);
    apply_filter_args(matches, &mut config.filter);

    let spec = config.filter.resolve(config.sample_rate)?;
    let coeffs = design(&spec)?;
    let response = frequency_response(&coeffs, config.sample_rate, config.response_points)?;

    let low = matches.get_one::<f64>("from").copied().unwrap_or(config.display_band.0);
    let high = matches.get_one::<f64>("to").copied().unwrap_or(config.display_band.1);
    let every = matches.get_one::<usize>("every").copied().unwrap_or(1).max(1);

    println!(
        "{}",
        format!(
            "{} Butterworth, order {}, cutoff {}",
            spec.band.name(),
            spec.order,
            spec.cutoff_summary()
        )
        .green()
    );
    println!("b = {:?}", coeffs.b());
    println!("a = {:?}", coeffs.a());

    // Phase is unwrapped over the whole response before windowing.
    let magnitude = response.magnitude_db();
    let phase = response.phase_degrees();
    println!("\n{:>10} {:>12} {:>12}", "f (Hz)", "|H| (dB)", "phase (deg)");
    for (i, &(f, _)) in response.points.iter().enumerate().step_by(every) {
        if f < low || f > high {
            continue;
        }
        println!("{:>10.3} {:>12.3} {:>12.2}", f, magnitude[i], phase[i]);
    }
    Ok(())
}

pub fn animate(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let mode = match matches.get_one::<String>("mode").map(String::as_str) {
        Some("electric") => CouplingMode::Electric,
        Some("both") => CouplingMode::Both,
        _ => CouplingMode::Magnetic,
    };
    let config = FieldConfig {
        mode,
        amplitude: matches.get_one::<f64>("amplitude").copied().unwrap_or(1.0),
        frequency: matches.get_one::<f64>("frequency").copied().unwrap_or(1.0),
        ..FieldConfig::default()
    };
    let frames = matches.get_one::<usize>("frames").copied().unwrap_or(10);
    let speed = matches.get_one::<f64>("speed").copied().unwrap_or(0.05);
    let delay = Duration::from_millis(matches.get_one::<u64>("delay-ms").copied().unwrap_or(50));
    let as_json = matches.get_flag("json");

    for (k, phase) in PhaseSweep::new(0.0, speed).take(frames).enumerate() {
        let frame = coupling::frame(&config, phase)?;
        if as_json {
            println!("{}", serde_json::to_string(&frame)?);
        } else {
            println!("frame {:>3}  phase {:>6.3} rad  peak {:.3}", k, frame.phase, frame.peak());
        }
        if k + 1 < frames {
            thread::sleep(delay);
        }
    }
    Ok(())
}

/// Config file (or defaults plus environment) with command-line overrides on top.
fn load_config(matches: &ArgMatches) -> Result<SimulationConfig, Box<dyn Error>> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => SimulationConfig::from_json_file(path)?,
        None => SimulationConfig::from_env(),
    };

    if let Some(shape) = matches.get_one::<String>("waveform") {
        config.waveform.shape = match shape.as_str() {
            "square" => WaveformShape::Square,
            "sawtooth" => WaveformShape::Sawtooth,
            _ => WaveformShape::Sine,
        };
    }
    if let Some(&amplitude) = matches.get_one::<f64>("amplitude") {
        config.waveform.amplitude = amplitude;
    }
    if let Some(&frequency) = matches.get_one::<f64>("frequency") {
        config.waveform.frequency = frequency;
    }
    if let Some(&phase) = matches.get_one::<f64>("phase") {
        config.waveform.phase = phase;
    }

    if let Some(kind) = matches.get_one::<String>("noise") {
        let half_width = matches.get_one::<f64>("noise-width").copied().unwrap_or(5.0);
        config.noise.kind = match kind.as_str() {
            "random-phase" => NoiseKind::RandomPhaseTone,
            "white" => NoiseKind::White,
            "band-limited" => NoiseKind::BandLimited { half_width },
            _ => NoiseKind::FixedTone,
        };
    }
    if let Some(&amplitude) = matches.get_one::<f64>("noise-amplitude") {
        config.noise.amplitude = amplitude;
    }
    if let Some(&frequency) = matches.get_one::<f64>("noise-frequency") {
        config.noise.frequency = frequency;
    }

    apply_filter_args(matches, &mut config.filter);
    apply_sampling_args(matches, &mut config);
    Ok(config)
}

fn apply_sampling_args(matches: &ArgMatches, config: &mut SimulationConfig) {
    if let Some(&rate) = matches.get_one::<f64>("sample-rate") {
        config.sample_rate = rate;
    }
    if let Some(&duration) = matches.get_one::<f64>("duration") {
        config.duration = duration;
    }
    if let Some(&points) = matches.get_one::<usize>("points") {
        config.response_points = points;
    }
}

fn apply_filter_args(matches: &ArgMatches, request: &mut FilterRequest) {
    let current_cutoff = match request.band {
        BandRequest::LowPass { cutoff } | BandRequest::HighPass { cutoff } => cutoff,
        BandRequest::BandPass { .. } => CutoffSource::Direct { hz: 30.0 },
    };
    let cutoff = if let (Some(&resistance), Some(&capacitance)) = (
        matches.get_one::<f64>("resistance"),
        matches.get_one::<f64>("capacitance"),
    ) {
        CutoffSource::Rc { resistance, capacitance }
    } else if let Some(&tau) = matches.get_one::<f64>("tau") {
        CutoffSource::TimeConstant { tau }
    } else if let Some(&hz) = matches.get_one::<f64>("cutoff") {
        CutoffSource::Direct { hz }
    } else {
        current_cutoff
    };

    let (low_hz, high_hz) = match request.band {
        BandRequest::BandPass { low_hz, high_hz } => (low_hz, high_hz),
        _ => DEFAULT_BAND,
    };
    let low_hz = matches.get_one::<f64>("low").copied().unwrap_or(low_hz);
    let high_hz = matches.get_one::<f64>("high").copied().unwrap_or(high_hz);

    let family = matches
        .get_one::<String>("filter")
        .map(String::as_str)
        .unwrap_or(match request.band {
            BandRequest::LowPass { .. } => "low-pass",
            BandRequest::HighPass { .. } => "high-pass",
            BandRequest::BandPass { .. } => "band-pass",
        });
    request.band = match family {
        "high-pass" => BandRequest::HighPass { cutoff },
        "band-pass" => BandRequest::BandPass { low_hz, high_hz },
        _ => BandRequest::LowPass { cutoff },
    };
    if let Some(&order) = matches.get_one::<usize>("order") {
        request.order = order;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulate_command;

    fn parse(args: &[&str]) -> ArgMatches {
        simulate_command().get_matches_from(args)
    }

    #[test]
    fn test_flags_override_defaults() {
        let matches = parse(&[
            "simulate", "--waveform", "square", "--noise", "band-limited", "--noise-width", "3",
            "--filter", "high-pass", "--cutoff", "40", "--order", "2", "--duration", "1",
        ]);
        let config = load_config(&matches).unwrap();
        assert_eq!(config.waveform.shape, WaveformShape::Square);
        assert_eq!(config.noise.kind, NoiseKind::BandLimited { half_width: 3.0 });
        assert_eq!(config.filter, FilterRequest::high_pass(CutoffSource::Direct { hz: 40.0 }, 2));
        assert_eq!(config.duration, 1.0);
    }

    #[test]
    fn test_rc_cutoff_flags() {
        let matches = parse(&["simulate", "--resistance", "1000", "--capacitance", "0.00001"]);
        let config = load_config(&matches).unwrap();
        assert_eq!(
            config.filter.band,
            BandRequest::LowPass {
                cutoff: CutoffSource::Rc { resistance: 1000.0, capacitance: 1e-5 }
            }
        );
    }

    #[test]
    fn test_band_pass_defaults_to_reference_band() {
        let matches = parse(&["simulate", "--filter", "band-pass", "--order", "2"]);
        let config = load_config(&matches).unwrap();
        assert_eq!(config.filter, FilterRequest::band_pass(15.0, 35.0, 2));
    }

    #[test]
    fn test_simulate_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("report.json");
        let path_arg = path.to_string_lossy().into_owned();
        let matches = parse(&[
            "simulate", "--seed", "3", "--noise", "white", "--output", &path_arg, "--json",
        ]);
        simulate(&matches).unwrap();
        assert!(path.exists());
    }
}
