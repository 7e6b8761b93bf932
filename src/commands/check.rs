//! Check command implementation.
//!
//! Verifies that the counter sources can be read and parsed and that the
//! effective configuration is valid.

use anyhow::{bail, Result};

use crate::config::{validate_effective_config, Config};
use crate::system::{read_cpu_ticks, read_page_cache};

/// Validates counter sources and configuration.
pub fn command_check(config: &Config) -> Result<()> {
    println!("🔍 mmapbench-live - System Check");
    println!("================================");

    let proc_root = config.proc_root();
    let mut all_ok = true;

    println!("\n📁 Checking {}/stat...", proc_root.display());
    match read_cpu_ticks(&proc_root) {
        Ok(cores) => println!("   ✅ {} CPU cores found", cores.len()),
        Err(e) => {
            println!("   ❌ {}", e);
            all_ok = false;
        }
    }

    println!("\n💾 Checking {}/meminfo...", proc_root.display());
    match read_page_cache(&proc_root) {
        Ok(reading) => println!(
            "   ✅ Page cache {:.1}% ({:.2} GB of {:.2} GB)",
            reading.cache_pct, reading.cache_gb, reading.total_gb
        ),
        Err(e) => {
            println!("   ❌ {}", e);
            all_ok = false;
        }
    }

    println!("\n⚙️  Checking configuration...");
    match validate_effective_config(config) {
        Ok(()) => println!("   ✅ Configuration is valid"),
        Err(e) => {
            println!("   ❌ Configuration invalid: {}", e);
            all_ok = false;
        }
    }

    if let Some(path) = &config.input_file {
        println!("\n📄 Checking input file...");
        if path.is_file() {
            println!("   ✅ {} exists", path.display());
        } else {
            println!("   ❌ {} not found", path.display());
            all_ok = false;
        }
    }

    println!("\n📋 Summary:");
    if all_ok {
        println!("   ✅ All checks passed - ready to serve");
        Ok(())
    } else {
        println!("   ❌ Some checks failed - please review the output above");
        bail!("system check failed")
    }
}
