use std::env;
use std::process;

use clap::{value_parser, Arg, ArgAction, Command};
use colored::Colorize;

use filter_sim::utils;

mod command_handlers;

const USAGE: &str = "Expected 'simulate', 'response', or 'animate' subcommands";

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        println!("{}", USAGE);
        process::exit(1);
    }

    // The subcommand name stands in for the binary name when clap parses.
    let result = match args[1].as_str() {
        "simulate" => {
            let matches = simulate_command().get_matches_from(&args[1..]);
            command_handlers::simulate(&matches)
        }
        "response" => {
            let matches = response_command().get_matches_from(&args[1..]);
            command_handlers::response(&matches)
        }
        "animate" => {
            let matches = animate_command().get_matches_from(&args[1..]);
            command_handlers::animate(&matches)
        }
        _ => {
            println!("{}", USAGE);
            process::exit(1);
        }
    };

    if let Err(e) = result {
        let logger = utils::get_logger();
        utils::error_context(&logger, &format!("{} failed", args[1]), e.as_ref());
        println!("{}", format!("Error: {}", e).red());
        process::exit(1);
    }
}

fn simulate_command() -> Command {
    Command::new("simulate")
        .about("Run the generate, mix, filter and analyze pipeline")
        .arg(
            Arg::new("config")
                .long("config")
                .help("JSON file with a full or partial simulation config"),
        )
        .arg(
            Arg::new("waveform")
                .long("waveform")
                .value_parser(["sine", "square", "sawtooth"])
                .help("Shape of the clean signal"),
        )
        .arg(
            Arg::new("amplitude")
                .long("amplitude")
                .value_parser(value_parser!(f64))
                .help("Clean signal amplitude"),
        )
        .arg(
            Arg::new("frequency")
                .long("frequency")
                .value_parser(value_parser!(f64))
                .help("Clean signal frequency in Hz"),
        )
        .arg(
            Arg::new("phase")
                .long("phase")
                .value_parser(value_parser!(f64))
                .allow_hyphen_values(true)
                .help("Clean signal phase offset in radians"),
        )
        .arg(
            Arg::new("noise")
                .long("noise")
                .value_parser(["fixed", "random-phase", "white", "band-limited"])
                .help("Interference model"),
        )
        .arg(
            Arg::new("noise-amplitude")
                .long("noise-amplitude")
                .value_parser(value_parser!(f64))
                .help("Interference amplitude"),
        )
        .arg(
            Arg::new("noise-frequency")
                .long("noise-frequency")
                .value_parser(value_parser!(f64))
                .help("Interference frequency (band centre for band-limited noise) in Hz"),
        )
        .arg(
            Arg::new("noise-width")
                .long("noise-width")
                .value_parser(value_parser!(f64))
                .default_value("5")
                .help("Half width of the band-limited noise band in Hz"),
        )
        .args(filter_args())
        .args(sampling_args())
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_parser(value_parser!(u64))
                .help("Seed for reproducible noise"),
        )
        .arg(
            Arg::new("preview")
                .long("preview")
                .value_parser(value_parser!(usize))
                .help("Number of leading samples to print"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Print the full report as JSON"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Write the full report as JSON to this file"),
        )
}

fn response_command() -> Command {
    Command::new("response")
        .about("Print the magnitude and phase response of a filter design")
        .args(filter_args())
        .args(sampling_args())
        .arg(
            Arg::new("from")
                .long("from")
                .value_parser(value_parser!(f64))
                .help("Lowest frequency to print in Hz"),
        )
        .arg(
            Arg::new("to")
                .long("to")
                .value_parser(value_parser!(f64))
                .help("Highest frequency to print in Hz"),
        )
        .arg(
            Arg::new("every")
                .long("every")
                .value_parser(value_parser!(usize))
                .default_value("16")
                .help("Print every n-th response sample"),
        )
}

fn animate_command() -> Command {
    Command::new("animate")
        .about("Animate a wave on a cable coupled to nearby inductors")
        .arg(
            Arg::new("mode")
                .long("mode")
                .value_parser(["magnetic", "electric", "both"])
                .default_value("magnetic")
                .help("Which inductors are active"),
        )
        .arg(
            Arg::new("amplitude")
                .long("amplitude")
                .value_parser(value_parser!(f64))
                .default_value("1")
                .help("Base wave amplitude"),
        )
        .arg(
            Arg::new("frequency")
                .long("frequency")
                .value_parser(value_parser!(f64))
                .default_value("1")
                .help("Base wave spatial frequency"),
        )
        .arg(
            Arg::new("frames")
                .long("frames")
                .value_parser(value_parser!(usize))
                .default_value("10")
                .help("Number of frames"),
        )
        .arg(
            Arg::new("speed")
                .long("speed")
                .value_parser(value_parser!(f64))
                .default_value("0.05")
                .help("Phase increment per frame in radians"),
        )
        .arg(
            Arg::new("delay-ms")
                .long("delay-ms")
                .value_parser(value_parser!(u64))
                .default_value("50")
                .help("Pause between frames in milliseconds"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Print every frame as a JSON line"),
        )
}

fn filter_args() -> Vec<Arg> {
    vec![
        Arg::new("filter")
            .long("filter")
            .value_parser(["low-pass", "high-pass", "band-pass"])
            .help("Filter family"),
        Arg::new("order")
            .long("order")
            .value_parser(value_parser!(usize))
            .help("Butterworth prototype order (1-10)"),
        Arg::new("cutoff")
            .long("cutoff")
            .value_parser(value_parser!(f64))
            .help("Cutoff frequency in Hz"),
        Arg::new("resistance")
            .long("resistance")
            .value_parser(value_parser!(f64))
            .requires("capacitance")
            .conflicts_with_all(["cutoff", "tau"])
            .help("RC cutoff: resistance in ohms"),
        Arg::new("capacitance")
            .long("capacitance")
            .value_parser(value_parser!(f64))
            .requires("resistance")
            .help("RC cutoff: capacitance in farads"),
        Arg::new("tau")
            .long("tau")
            .value_parser(value_parser!(f64))
            .conflicts_with("cutoff")
            .help("Cutoff from a time constant in seconds"),
        Arg::new("low")
            .long("low")
            .value_parser(value_parser!(f64))
            .help("Band-pass lower edge in Hz"),
        Arg::new("high")
            .long("high")
            .value_parser(value_parser!(f64))
            .help("Band-pass upper edge in Hz"),
    ]
}

fn sampling_args() -> Vec<Arg> {
    vec![
        Arg::new("sample-rate")
            .long("sample-rate")
            .value_parser(value_parser!(f64))
            .help("Sample rate in Hz"),
        Arg::new("duration")
            .long("duration")
            .value_parser(value_parser!(f64))
            .help("Signal duration in seconds"),
        Arg::new("points")
            .long("points")
            .value_parser(value_parser!(usize))
            .help("Frequency response sample count"),
    ]
}
