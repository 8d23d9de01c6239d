//! Telemetry example
//!
//! Connects to a Brocade NOS / SLX switch and prints facts, environment,
//! interfaces and the ARP, MAC and VLAN tables.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example telemetry -- --host sw0 --user admin --password secret
//! ```
//!
//! Firmware without the environment commands:
//! ```bash
//! cargo run --example telemetry -- --host sw0 --user admin --password secret --platform brocade_nos_basic
//! ```

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use brocli::{DriverBuilder, HostKeyVerification, Platform};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    println!("=== brocli Telemetry Example ===\n");
    println!("Connecting to {}:{} ({})...", args.host, args.port, args.platform);

    let mut builder = DriverBuilder::new(&args.host)
        .port(args.port)
        .username(&args.user)
        .platform(args.platform)
        .timeout(Duration::from_secs(args.timeout))
        .host_key_verification(HostKeyVerification::AcceptNew);

    if let Some(password) = &args.password {
        builder = builder.password(password);
    } else if let Some(key_path) = &args.key {
        builder = builder.private_key(key_path);
    } else {
        eprintln!("Error: Must provide either --password or --key");
        std::process::exit(1);
    }

    let mut driver = builder.build()?;
    driver.open().await?;
    println!("Connected!\n");

    let facts = driver.get_facts().await?;
    println!("--- Facts ---");
    println!("{}", serde_json::to_string_pretty(&facts)?);

    let environment = driver.get_environment().await?;
    println!("\n--- Environment ---");
    println!("CPU load: {:.2}%", environment.cpu_load);
    for (id, fan) in &environment.fans {
        println!("Fan {id}: {}", if fan.status { "ok" } else { "FAULT" });
    }
    for (id, psu) in &environment.power {
        println!("PSU {id}: {}", if psu.status { "ok" } else { "FAULT" });
    }
    for (id, sensor) in &environment.temperature {
        println!("Temp {id}: {:.1} alert={}", sensor.temperature, sensor.is_alert);
    }

    println!("\n--- Interfaces ---");
    for (name, interface) in driver.get_interfaces().await? {
        println!(
            "{:<32} {:<16} enabled={:<5} up={}",
            name,
            interface.ip_address.as_deref().unwrap_or("-"),
            interface.is_enabled,
            interface.is_up
        );
    }

    println!("\n--- ARP ---");
    for entry in driver.get_arp_table().await? {
        println!("{:<16} {} {:<12} {:>8.0}s", entry.ip, entry.mac, entry.interface, entry.age);
    }

    println!("\n--- MAC table ---");
    for entry in driver.get_mac_table().await? {
        println!(
            "vlan {:<5} {} {:<12} static={}",
            entry.vlan_id, entry.mac, entry.interface, entry.is_static
        );
    }

    println!("\n--- VLANs ---");
    for vlan in driver.get_vlan_table().await? {
        println!("{:<5} {}", vlan.vlan_id, vlan.name);
    }

    driver.close().await?;
    println!("\nDisconnected.");
    Ok(())
}

struct Args {
    host: String,
    port: u16,
    user: String,
    password: Option<String>,
    key: Option<PathBuf>,
    platform: Platform,
    timeout: u64,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut host = "localhost".to_string();
        let mut port = 22u16;
        let mut user = env::var("USER").unwrap_or_else(|_| "admin".to_string());
        let mut password = None;
        let mut key = None;
        let mut platform = Platform::BrocadeNos;
        let mut timeout = 60u64;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--host" | "-h" => {
                    i += 1;
                    if i < args.len() {
                        host = args[i].clone();
                    }
                }
                "--port" | "-p" => {
                    i += 1;
                    if i < args.len() {
                        port = args[i].parse().unwrap_or(22);
                    }
                }
                "--user" | "-u" => {
                    i += 1;
                    if i < args.len() {
                        user = args[i].clone();
                    }
                }
                "--password" | "-P" => {
                    i += 1;
                    if i < args.len() {
                        password = Some(args[i].clone());
                    }
                }
                "--key" | "-k" => {
                    i += 1;
                    if i < args.len() {
                        key = Some(PathBuf::from(&args[i]));
                    }
                }
                "--platform" => {
                    i += 1;
                    if i < args.len() {
                        platform = args[i].parse().unwrap_or_else(|e| {
                            eprintln!("Error: {e}");
                            std::process::exit(1);
                        });
                    }
                }
                "--timeout" | "-t" => {
                    i += 1;
                    if i < args.len() {
                        timeout = args[i].parse().unwrap_or(60);
                    }
                }
                "--help" => {
                    Self::print_help();
                    std::process::exit(0);
                }
                _ => {}
            }
            i += 1;
        }

        Self {
            host,
            port,
            user,
            password,
            key,
            platform,
            timeout,
        }
    }

    fn print_help() {
        println!("brocli telemetry example");
        println!();
        println!("USAGE:");
        println!("    cargo run --example telemetry -- [OPTIONS]");
        println!();
        println!("OPTIONS:");
        println!("    -h, --host <HOST>        Switch address [default: localhost]");
        println!("    -p, --port <PORT>        SSH port [default: 22]");
        println!("    -u, --user <USER>        Username [default: $USER]");
        println!("    -P, --password <PASS>    Password");
        println!("    -k, --key <PATH>         Private key file");
        println!("        --platform <NAME>    brocade_nos | brocade_nos_basic [default: brocade_nos]");
        println!("    -t, --timeout <SECS>     Timeout in seconds [default: 60]");
        println!("        --help               Print help");
    }
}
