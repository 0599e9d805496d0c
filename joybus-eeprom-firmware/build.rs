//! Build script for joybus-eeprom-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates eeprom.toml and turns it into constants

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Longest flush delay accepted, in milliseconds
const MAX_FLUSH_IDLE_MS: i64 = 60_000;

/// Settings read from eeprom.toml
struct EepromConfig {
    variant: &'static str,
    persist: bool,
    flush_idle_ms: u64,
}

fn main() {
    setup_linker();
    let config = validate_config();
    generate_config(&config);
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

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate eeprom.toml at compile time
fn validate_config() -> EepromConfig {
    println!("cargo:rerun-if-changed=eeprom.toml");

    let config_path = Path::new("eeprom.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: eeprom.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires an eeprom.toml configuration file in     ║\n\
            ║  the joybus-eeprom-firmware directory.                           ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read eeprom.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in eeprom.toml                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();

    let variant = match config.get("eeprom").and_then(|e| e.get("type")) {
        Some(toml::Value::String(s)) if s == "4k" => "Eeprom4k",
        Some(toml::Value::String(s)) if s == "16k" => "Eeprom16k",
        Some(other) => {
            errors.push(format!("[eeprom] type must be \"4k\" or \"16k\", got {}", other));
            "Eeprom4k"
        }
        None => {
            errors.push("Missing [eeprom] type".to_string());
            "Eeprom4k"
        }
    };

    let persistence = config.get("persistence");

    let persist = match persistence.and_then(|p| p.get("enabled")) {
        Some(toml::Value::Boolean(b)) => *b,
        Some(other) => {
            errors.push(format!("[persistence] enabled must be a boolean, got {}", other));
            false
        }
        None => true,
    };

    let flush_idle_ms = match persistence.and_then(|p| p.get("flush_idle_ms")) {
        Some(toml::Value::Integer(ms)) if (1..=MAX_FLUSH_IDLE_MS).contains(ms) => *ms as u64,
        Some(other) => {
            errors.push(format!(
                "[persistence] flush_idle_ms must be 1..={}, got {}",
                MAX_FLUSH_IDLE_MS, other
            ));
            500
        }
        None => 500,
    };

    if !errors.is_empty() {
        let error_list = errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n");
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: eeprom.toml validation failed                            ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            error_list
        );
    }

    println!("cargo:warning=eeprom.toml validated successfully");

    EepromConfig {
        variant,
        persist,
        flush_idle_ms,
    }
}

/// Write the validated settings as Rust constants into OUT_DIR
fn generate_config(config: &EepromConfig) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let mut f = File::create(out_dir.join("config.rs")).unwrap();
    writeln!(
        f,
        "pub const EEPROM_TYPE: EepromType = EepromType::{};",
        config.variant
    )
    .unwrap();
    writeln!(f, "pub const PERSIST: bool = {};", config.persist).unwrap();
    writeln!(f, "pub const FLUSH_IDLE_MS: u64 = {};", config.flush_idle_ms).unwrap();
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
