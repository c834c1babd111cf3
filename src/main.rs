use anyhow::Result;
use clap::{Arg, Command};

use netpulse::commands;

fn main() -> Result<()> {
    netpulse::init_logging();

    let matches = Command::new("netpulse")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Live network health monitor")
        .subcommand(
            Command::new("watch")
                .about("Sample latency, packet loss, and bandwidth in a live dashboard")
                .arg(
                    Arg::new("host")
                        .short('H')
                        .long("host")
                        .value_name("HOST")
                        .help("Reference host to ping (IPv4 address or hostname)")
                        .default_value("8.8.8.8"),
                )
                .arg(
                    Arg::new("interface")
                        .short('i')
                        .long("interface")
                        .value_name("NAME")
                        .help("Count bandwidth on this interface only (default: all non-loopback)"),
                )
                .arg(
                    Arg::new("interval")
                        .short('n')
                        .long("interval")
                        .value_name("MS")
                        .help("Tick interval in milliseconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("2000"),
                )
                .arg(
                    Arg::new("timeout")
                        .long("timeout")
                        .value_name("MS")
                        .help("Latency probe timeout in milliseconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("2000"),
                )
                .arg(
                    Arg::new("window")
                        .short('w')
                        .long("window")
                        .value_name("SAMPLES")
                        .help("Number of samples kept in the rolling window")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("50"),
                )
                .arg(
                    Arg::new("latency-threshold")
                        .long("latency-threshold")
                        .value_name("MS")
                        .help("Alert when round-trip latency exceeds this")
                        .value_parser(clap::value_parser!(f64))
                        .default_value("100"),
                )
                .arg(
                    Arg::new("loss-threshold")
                        .long("loss-threshold")
                        .value_name("FRACTION")
                        .help("Alert when per-tick packet loss reaches this fraction")
                        .value_parser(clap::value_parser!(f64))
                        .default_value("0.1"),
                )
                .arg(
                    Arg::new("bandwidth-threshold")
                        .long("bandwidth-threshold")
                        .value_name("BYTES_PER_SEC")
                        .help("Alert when upload or download exceeds this rate")
                        .value_parser(clap::value_parser!(f64))
                        .default_value("1000000"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Stream one JSON sample per tick instead of the dashboard")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("watch", sub_matches)) => commands::watch(sub_matches),
        _ => {
            println!("Usage: netpulse watch [OPTIONS]  (see netpulse watch --help)");
            Ok(())
        }
    }
}
