//! Metric extractors: pure text-to-value functions
//!
//! One extractor per health dimension. Each takes raw command output and
//! returns `Option` — "no match" is a value, never an error. Extractors
//! are order-insensitive and idempotent, which keeps them independently
//! unit-testable.
//!
//! The command strings here are part of the wire contract with the
//! device CLI; changing one requires updating its extractor pattern.

use std::sync::LazyLock;

use regex::Regex;

use crate::record::{InterfaceState, InterfaceSummary, round1};

/// Source of the uptime string
pub const SHOW_VERSION: &str = "show version";

/// Source of the interface table
pub const SHOW_IP_INTERFACE_BRIEF: &str = "show ip interface brief";

/// Candidate commands for the CPU metric, tried in order until one
/// output matches (different firmware exposes the counter under
/// different commands)
pub const CPU_COMMANDS: &[&str] = &[
    "show processes cpu",
    "show memory statistics",
    "show processes memory",
];

/// Candidate commands for the memory metric — the same list as CPU;
/// the two metrics match different patterns in the same outputs
pub const MEMORY_COMMANDS: &[&str] = CPU_COMMANDS;

/// Candidate commands for the temperature metric, tried in order
pub const TEMPERATURE_COMMANDS: &[&str] = &["show environment", "show environment temperature"];

static UPTIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\S+ uptime is (.+)$").expect("UPTIME_RE is a valid regex pattern")
});

static CPU_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"CPU utilization for five seconds: (\d+)%")
        .expect("CPU_RE is a valid regex pattern")
});

static MEMORY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Total: (\d+), Used: (\d+)").expect("MEMORY_RE is a valid regex pattern")
});

static TEMPERATURE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+) Celsius").expect("TEMPERATURE_RE is a valid regex pattern"));

static INTERFACE_ROW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\S+)\s+(\S+)\s+\S+\s+\S+\s+(\S+)\s+(\S+)")
        .expect("INTERFACE_ROW_RE is a valid regex pattern")
});

static ACTIVE_INTERFACE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<interface>\S+)\s+\S+\s+YES\s+NVRAM\s+up\s+up\s*$")
        .expect("ACTIVE_INTERFACE_RE is a valid regex pattern")
});

/// Interface names containing any of these are logical constructs, not
/// physical health signals, and are excluded from the table
const SKIP_INTERFACE_NAMES: &[&str] = &["vlan", "loopback", "null"];

/// Extracts the device uptime from `show version` output.
///
/// Matches the first `<token> uptime is <text>` line and returns the
/// trimmed free text.
#[must_use]
pub fn uptime(output: &str) -> Option<String> {
    UPTIME_RE
        .captures(output)
        .map(|caps| caps[1].trim().to_string())
}

/// Extracts the five-second CPU utilization percentage
#[must_use]
pub fn cpu_percent(output: &str) -> Option<u8> {
    CPU_RE.captures(output).and_then(|caps| caps[1].parse().ok())
}

/// Extracts memory usage as `round(used/total × 100, 1)`.
///
/// Returns `None` when the pattern is absent or total is zero.
#[must_use]
pub fn memory_percent(output: &str) -> Option<f64> {
    let caps = MEMORY_RE.captures(output)?;
    let total: u64 = caps[1].parse().ok()?;
    let used: u64 = caps[2].parse().ok()?;
    if total == 0 {
        return None;
    }
    Some(round1(used as f64 / total as f64 * 100.0))
}

/// Extracts the device temperature, formatted as `"<n>°C"`
#[must_use]
pub fn temperature(output: &str) -> Option<String> {
    TEMPERATURE_RE
        .captures(output)
        .map(|caps| format!("{}°C", &caps[1]))
}

/// Parses a `show ip interface brief` table into per-interface states
/// and summary counts.
///
/// Column-positional: name, IP, then status and protocol from the last
/// two matched columns. The header row and logical interfaces (vlan,
/// loopback, null — case-insensitive) are skipped and do not count. A
/// row is "up" only when both status and protocol equal "up".
#[must_use]
pub fn interface_table(output: &str) -> (Vec<InterfaceState>, InterfaceSummary) {
    let mut interfaces = Vec::new();
    let mut up_count = 0usize;

    for line in output.lines() {
        let Some(caps) = INTERFACE_ROW_RE.captures(line.trim()) else {
            continue;
        };
        let name = &caps[1];
        if name.eq_ignore_ascii_case("interface") {
            continue;
        }
        let lower = name.to_lowercase();
        if SKIP_INTERFACE_NAMES.iter().any(|skip| lower.contains(skip)) {
            continue;
        }

        let status = &caps[3];
        let protocol = &caps[4];
        let up = status == "up" && protocol == "up";
        if up {
            up_count += 1;
        }
        interfaces.push(InterfaceState {
            name: name.to_string(),
            ip: caps[2].to_string(),
            status: status.to_string(),
            protocol: protocol.to_string(),
            up,
        });
    }

    let summary = InterfaceSummary {
        total: interfaces.len(),
        up: up_count,
        down: interfaces.len() - up_count,
    };
    (interfaces, summary)
}

/// Returns the names of interfaces that are administratively enabled,
/// saved to NVRAM, and up/up — the strict selection used when pushing
/// configuration changes.
#[must_use]
pub fn active_interfaces(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| ACTIVE_INTERFACE_RE.captures(line.trim()))
        .map(|caps| caps["interface"].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHOW_VERSION_OUTPUT: &str = "\
Cisco IOS Software, C2900 Software (C2900-UNIVERSALK9-M), Version 15.7(3)M2
Technical Support: http://www.cisco.com/techsupport

Router uptime is 3 weeks, 2 days, 1 hour, 15 minutes
System returned to ROM by power-on
";

    const INTERFACE_BRIEF_OUTPUT: &str = "\
Interface                  IP-Address      OK? Method Status                Protocol
GigabitEthernet0/0         172.31.42.4     YES NVRAM  up                    up
GigabitEthernet0/1         10.42.1.1       YES NVRAM  up                    up
GigabitEthernet0/2         unassigned      YES NVRAM  administratively down down
Loopback0                  1.1.1.1         YES NVRAM  up                    up
Vlan99                     172.31.42.3     YES NVRAM  up                    up
Null0                      unassigned      YES unset  up                    up
";

    #[test]
    fn test_uptime_found() {
        assert_eq!(
            uptime(SHOW_VERSION_OUTPUT).as_deref(),
            Some("3 weeks, 2 days, 1 hour, 15 minutes")
        );
    }

    #[test]
    fn test_uptime_trims_carriage_return() {
        let output = "Switch uptime is 5 days, 3 hours\r\nSystem image file is flash:...\r\n";
        assert_eq!(uptime(output).as_deref(), Some("5 days, 3 hours"));
    }

    #[test]
    fn test_uptime_not_found() {
        assert!(uptime("no uptime line here").is_none());
    }

    #[test]
    fn test_cpu_percent() {
        let output = "CPU utilization for five seconds: 7%/0%; one minute: 5%; five minutes: 4%";
        assert_eq!(cpu_percent(output), Some(7));
        assert!(cpu_percent("Total: 100, Used: 42").is_none());
    }

    #[test]
    fn test_memory_percent_exact() {
        assert_eq!(memory_percent("Total: 100, Used: 42"), Some(42.0));
    }

    #[test]
    fn test_memory_percent_rounds_to_one_decimal() {
        // 1/3 of memory used → 33.3, not 33.333...
        assert_eq!(memory_percent("Total: 3, Used: 1"), Some(33.3));
    }

    #[test]
    fn test_memory_percent_zero_total() {
        assert!(memory_percent("Total: 0, Used: 0").is_none());
    }

    #[test]
    fn test_temperature_formats_degrees() {
        let output = "System Temperature Value: 42 Celsius (ok)";
        assert_eq!(temperature(output).as_deref(), Some("42°C"));
        assert!(temperature("no sensors present").is_none());
    }

    #[test]
    fn test_interface_table_skips_logical_and_header_rows() {
        let (interfaces, summary) = interface_table(INTERFACE_BRIEF_OUTPUT);

        let names: Vec<&str> = interfaces.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(
            names,
            ["GigabitEthernet0/0", "GigabitEthernet0/1", "GigabitEthernet0/2"]
        );
        assert_eq!(summary.total, 3);
        assert_eq!(summary.up, 2);
        assert_eq!(summary.down, 1);
    }

    #[test]
    fn test_interface_table_up_requires_both_columns() {
        let (interfaces, _) = interface_table(INTERFACE_BRIEF_OUTPUT);
        assert!(interfaces[0].up);
        assert_eq!(interfaces[0].ip, "172.31.42.4");
        // Multi-word admin-down status degrades to its first column
        // token; the row still counts as down.
        assert!(!interfaces[2].up);
        assert_eq!(interfaces[2].protocol, "down");
    }

    #[test]
    fn test_interface_table_empty_output() {
        let (interfaces, summary) = interface_table("");
        assert!(interfaces.is_empty());
        assert_eq!(summary, InterfaceSummary::default());
    }

    #[test]
    fn test_active_interfaces_strict_match() {
        let active = active_interfaces(INTERFACE_BRIEF_OUTPUT);
        // Only full-line YES NVRAM up up rows qualify; Null0 is YES
        // unset and the admin-down row fails the up/up anchor.
        assert_eq!(
            active,
            ["GigabitEthernet0/0", "GigabitEthernet0/1", "Loopback0", "Vlan99"]
        );
    }

    #[test]
    fn test_active_interfaces_none() {
        assert!(active_interfaces("nothing useful").is_empty());
    }

    #[test]
    fn test_probe_command_literals() {
        assert_eq!(
            CPU_COMMANDS,
            ["show processes cpu", "show memory statistics", "show processes memory"]
        );
        assert_eq!(MEMORY_COMMANDS, CPU_COMMANDS);
        assert_eq!(
            TEMPERATURE_COMMANDS,
            ["show environment", "show environment temperature"]
        );
        assert_eq!(SHOW_VERSION, "show version");
        assert_eq!(SHOW_IP_INTERFACE_BRIEF, "show ip interface brief");
    }

    mod properties {
        use super::super::*;
        use proptest::prelude::*;

        proptest! {
            // Extractors are pure functions of their input text: the
            // same input always yields the same output, and arbitrary
            // input never panics.
            #[test]
            fn extractors_are_idempotent(input in ".{0,400}") {
                prop_assert_eq!(uptime(&input), uptime(&input));
                prop_assert_eq!(cpu_percent(&input), cpu_percent(&input));
                prop_assert_eq!(memory_percent(&input), memory_percent(&input));
                prop_assert_eq!(temperature(&input), temperature(&input));
                prop_assert_eq!(interface_table(&input), interface_table(&input));
                prop_assert_eq!(active_interfaces(&input), active_interfaces(&input));
            }
        }
    }
}
