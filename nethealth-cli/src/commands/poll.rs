//! Fleet poll command.

use std::path::Path;

use nethealth_core::{
    DeviceHealthRecord, FleetCollector, HealthReport, SshGateway, SummaryStats,
};

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::util::{create_runtime, load_registry, load_settings};

/// Poll command handler
pub fn cmd_poll(
    registry_path: &Path,
    settings_path: Option<&Path>,
    format: OutputFormat,
) -> Result<(), CliError> {
    let registry = load_registry(registry_path)?;
    let settings = load_settings(settings_path)?;
    let runtime = create_runtime()?;

    let collector = FleetCollector::from_settings(&settings);
    let gateway = SshGateway::new();
    let snapshot = runtime.block_on(collector.collect(&registry, &gateway));

    let report = HealthReport::from_snapshot(&snapshot);
    match format {
        OutputFormat::Json => {
            let body = serde_json::to_string_pretty(&report)
                .map_err(|e| CliError::Export(e.to_string()))?;
            println!("{body}");
        }
        OutputFormat::Table => {
            for record in report.devices.values() {
                print_device_line(record);
            }
            println!();
            print_summary(&report.summary);
        }
    }

    Ok(())
}

/// Print one device's poll outcome with colors
pub fn print_device_line(record: &DeviceHealthRecord) {
    const GREEN: &str = "\x1b[32m";
    const RED: &str = "\x1b[31m";
    const YELLOW: &str = "\x1b[33m";
    const CYAN: &str = "\x1b[36m";
    const RESET: &str = "\x1b[0m";
    const BOLD: &str = "\x1b[1m";

    if record.is_online() {
        print!("{GREEN}{BOLD}✓{RESET} {}", record.device_name);
        if let Some(latency) = record.response_time {
            print!(" {CYAN}({latency:.1}ms){RESET}");
        }
        print!(" [{}]", record.kind);
        print!(" up {}", record.uptime);
        print!(
            " cpu {} mem {} if {}/{}",
            record.cpu_usage,
            record.memory_usage,
            record.interface_summary.up,
            record.interface_summary.total
        );
        println!();
    } else {
        print!("{RED}{BOLD}✗{RESET} {}", record.device_name);
        if let Some(ref error) = record.error {
            print!(" {YELLOW}- {error}{RESET}");
        }
        println!();
    }
}

/// Print the fleet summary footer
fn print_summary(summary: &SummaryStats) {
    const GREEN: &str = "\x1b[32m";
    const RED: &str = "\x1b[31m";
    const RESET: &str = "\x1b[0m";
    const BOLD: &str = "\x1b[1m";

    println!("{BOLD}Fleet Summary:{RESET}");
    println!("  Total:   {}", summary.total_devices);
    if summary.online_devices > 0 {
        println!("  {GREEN}Online:  {}{RESET}", summary.online_devices);
    } else {
        println!("  Online:  {}", summary.online_devices);
    }
    if summary.offline_devices > 0 {
        println!("  {RED}Offline: {}{RESET}", summary.offline_devices);
    } else {
        println!("  Offline: {}", summary.offline_devices);
    }
    println!("  Health:  {:.1}%", summary.health_percentage);
}
