//! Build script for ammos-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates table.toml at compile time and generates the baked-in
//!   TableConfig constant

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

fn main() {
    setup_linker();
    generate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate table.toml and generate table_config.rs
fn generate_config() {
    // Re-run if table.toml changes
    println!("cargo:rerun-if-changed=table.toml");

    let config_path = Path::new("table.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: table.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a table.toml configuration file with      ║\n\
            ║  the mechanical constants of your table build. Please create     ║\n\
            ║  one in the ammos-firmware directory.                            ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => panic!("Failed to read table.toml: {}", e),
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in table.toml                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let steps_per_theta_rev = require_int(&config, "mechanics", "steps_per_theta_rev");
    let rho_travel_steps = require_int(&config, "mechanics", "rho_travel_steps");
    let coupling_ratio = require_float(&config, "mechanics", "coupling_ratio");
    let interpolation_step = require_float(&config, "motion", "interpolation_step");
    let max_step_rate = require_int(&config, "motion", "max_step_rate");
    let tick_hz = require_int(&config, "motion", "tick_hz");
    let homing_step_rate = require_int(&config, "homing", "homing_step_rate");
    let homing_overshoot = require_float(&config, "homing", "homing_overshoot");
    let homing_budget_factor = require_float(&config, "homing", "homing_budget_factor");

    let mut errors = Vec::new();
    if steps_per_theta_rev <= 0 {
        errors.push("[mechanics] steps_per_theta_rev must be positive".to_string());
    }
    if rho_travel_steps <= 0 {
        errors.push("[mechanics] rho_travel_steps must be positive".to_string());
    }
    if coupling_ratio <= 0.0 {
        errors.push("[mechanics] coupling_ratio must be positive".to_string());
    }
    if interpolation_step <= 0.0 {
        errors.push("[motion] interpolation_step must be positive".to_string());
    }
    if max_step_rate <= 0 {
        errors.push("[motion] max_step_rate must be positive".to_string());
    }
    if tick_hz <= 0 || tick_hz > 10_000 {
        errors.push("[motion] tick_hz must be 1-10000".to_string());
    }
    if homing_step_rate <= 0 {
        errors.push("[homing] homing_step_rate must be positive".to_string());
    }
    if !(0.0..1.0).contains(&homing_overshoot) {
        errors.push("[homing] homing_overshoot must be in [0, 1)".to_string());
    }
    if homing_budget_factor < 1.0 {
        errors.push("[homing] homing_budget_factor must be >= 1.0".to_string());
    }

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid table configuration                              ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    // Emit the baked-in config constant
    let generated = format!(
        "/// Table configuration generated from table.toml\n\
         pub const TABLE_CONFIG: ammos_core::config::TableConfig =\n\
         \x20   ammos_core::config::TableConfig {{\n\
         \x20       steps_per_theta_rev: {steps_per_theta_rev},\n\
         \x20       rho_travel_steps: {rho_travel_steps},\n\
         \x20       coupling_ratio: {coupling_ratio:?},\n\
         \x20       interpolation_step: {interpolation_step:?},\n\
         \x20       max_step_rate: {max_step_rate},\n\
         \x20       tick_hz: {tick_hz},\n\
         \x20       homing_step_rate: {homing_step_rate},\n\
         \x20       homing_overshoot: {homing_overshoot:?},\n\
         \x20       homing_budget_factor: {homing_budget_factor:?},\n\
         \x20   }};\n"
    );

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::write(out_dir.join("table_config.rs"), generated).unwrap();
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fetch a required integer key from a section
fn require_int(config: &toml::Value, section: &str, key: &str) -> i64 {
    match config.get(section).and_then(|s| s.get(key)) {
        Some(toml::Value::Integer(v)) => *v,
        Some(_) => panic!("[{}] {} must be an integer", section, key),
        None => panic!("[{}] missing required key '{}'", section, key),
    }
}

/// Fetch a required float key from a section (integers are accepted)
fn require_float(config: &toml::Value, section: &str, key: &str) -> f64 {
    match config.get(section).and_then(|s| s.get(key)) {
        Some(toml::Value::Float(v)) => *v,
        Some(toml::Value::Integer(v)) => *v as f64,
        Some(_) => panic!("[{}] {} must be a number", section, key),
        None => panic!("[{}] missing required key '{}'", section, key),
    }
}
