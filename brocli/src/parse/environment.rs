//! Environment sensors and CPU load.
//!
//! A sensor the device cannot report is modelled as data, not as an error:
//! its map holds a single [`UNSUPPORTED_SENSOR`] entry carrying placeholder
//! values. Callers must not read presence of an entry as real hardware data.

use std::sync::LazyLock;

use indexmap::IndexMap;
use log::warn;
use regex::Regex;
use serde::Serialize;

use super::{TableLayout, data_lines};

/// Key of the placeholder entry for a sensor with no data.
pub const UNSUPPORTED_SENSOR: &str = "invalid";

static FAN_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Fan (.*) is (.*),.*$").unwrap());

static POWER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Power Supply #(.*) is (.*)$").unwrap());

static CPU_ONE_MINUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"One minute: (\d+\.\d+); Five").unwrap());

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FanStatus {
    pub status: bool,
}

impl FanStatus {
    pub fn unsupported() -> Self {
        Self { status: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerStatus {
    pub status: bool,
    /// Watts drawn, -1 when unknown.
    pub output: f64,
    /// Rated watts, -1 when unknown.
    pub capacity: f64,
}

impl PowerStatus {
    pub fn unsupported() -> Self {
        Self {
            status: true,
            output: -1.0,
            capacity: -1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureStatus {
    /// Degrees, -1 when unknown.
    pub temperature: f64,
    pub is_alert: bool,
    pub is_critical: bool,
}

impl TemperatureStatus {
    pub fn unsupported() -> Self {
        Self {
            temperature: -1.0,
            is_alert: false,
            is_critical: false,
        }
    }
}

/// Snapshot of the device's sensors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Environment {
    /// One minute CPU load in percent.
    pub cpu_load: f64,
    pub fans: IndexMap<String, FanStatus>,
    pub power: IndexMap<String, PowerStatus>,
    pub temperature: IndexMap<String, TemperatureStatus>,
}

impl Environment {
    /// A snapshot where every sensor is the placeholder entry.
    pub fn unsupported(cpu_load: f64) -> Self {
        Self {
            cpu_load,
            fans: unsupported_map(FanStatus::unsupported()),
            power: unsupported_map(PowerStatus::unsupported()),
            temperature: unsupported_map(TemperatureStatus::unsupported()),
        }
    }
}

/// Replace an empty sensor map with the placeholder entry.
pub(crate) fn or_unsupported<T>(map: IndexMap<String, T>, placeholder: T) -> IndexMap<String, T> {
    if map.is_empty() {
        unsupported_map(placeholder)
    } else {
        map
    }
}

fn unsupported_map<T>(placeholder: T) -> IndexMap<String, T> {
    IndexMap::from([(UNSUPPORTED_SENSOR.to_string(), placeholder)])
}

/// Parse `show environment fan`. Lines that are not fan lines are ignored.
pub fn parse_fans(text: &str, layout: &TableLayout) -> IndexMap<String, FanStatus> {
    data_lines(text, layout)
        .into_iter()
        .filter_map(|line| FAN_LINE.captures(line))
        .map(|caps| {
            let status = FanStatus {
                status: &caps[2] == "Ok",
            };
            (caps[1].to_string(), status)
        })
        .collect()
}

/// Parse `show environment power`.
///
/// The CLI reports state only, so output and capacity are always unknown.
pub fn parse_power(text: &str, layout: &TableLayout) -> IndexMap<String, PowerStatus> {
    data_lines(text, layout)
        .into_iter()
        .filter_map(|line| POWER_LINE.captures(line))
        .map(|caps| {
            let status = PowerStatus {
                status: &caps[2] == "OK",
                ..PowerStatus::unsupported()
            };
            (caps[1].to_string(), status)
        })
        .collect()
}

/// Parse `show environment temp`.
///
/// Sensor rows are `id status value unit`; rows of any other shape are
/// ignored.
pub fn parse_temperature(text: &str, layout: &TableLayout) -> IndexMap<String, TemperatureStatus> {
    let mut sensors = IndexMap::new();
    for line in data_lines(text, layout) {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let [id, status, value, _unit] = tokens[..] else {
            continue;
        };

        let temperature = value.parse::<f64>().unwrap_or_else(|_| {
            warn!("Unable to read temperature {:?} of sensor {}, using -1", value, id);
            -1.0
        });
        let alarm = status != "Ok";
        sensors.insert(
            id.to_string(),
            TemperatureStatus {
                temperature,
                is_alert: alarm,
                is_critical: alarm,
            },
        );
    }
    sensors
}

/// Read the one minute load from `show process cpu`, 0 when absent.
pub fn parse_cpu_load(text: &str) -> f64 {
    let mut lines = text.trim().lines();
    while let Some(line) = lines.next() {
        if line.contains("Realtime Statistics") {
            return lines
                .next()
                .and_then(|next| CPU_ONE_MINUTE.captures(next))
                .and_then(|caps| caps[1].parse().ok())
                .unwrap_or(0.0);
        }
    }
    0.0
}
