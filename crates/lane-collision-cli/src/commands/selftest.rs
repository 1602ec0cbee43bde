use lane_collision::selftest::run_selftest;

use super::{print_json, LaunchTarget, OutputFormat};

pub fn run(seed: u64, target: &LaunchTarget) -> Result<(), Box<dyn std::error::Error>> {
    let report = run_selftest(target.size, target.backend, seed)?;

    match target.format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => {
            for v in &report.violations {
                println!("{v}");
            }
            println!(
                "\n{} lanes ({}), seed {}: {} checks, {} error(s), {} warning(s)",
                report.group_size,
                report.backend,
                report.seed,
                report.checks,
                report.error_count(),
                report.warning_count()
            );
        }
    }

    if report.passed() {
        Ok(())
    } else {
        Err(format!("Self-test failed with {} error(s)", report.error_count()).into())
    }
}
