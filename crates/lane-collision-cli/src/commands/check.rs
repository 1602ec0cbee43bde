use lane_collision::check_duplicates;
use serde::Serialize;

use super::{print_json, LaunchTarget, OutputFormat};

#[derive(Serialize)]
struct CheckReport<'a> {
    group_size: usize,
    backend: &'a str,
    values: &'a [i64],
    has_collision: bool,
    lane_views: Vec<bool>,
}

pub fn run(values: &[i64], target: &LaunchTarget) -> Result<(), Box<dyn std::error::Error>> {
    let lane_views = check_duplicates(values, target.size, target.backend)?;
    let has_collision = lane_views.iter().any(|&d| d);

    match target.format {
        OutputFormat::Json => print_json(&CheckReport {
            group_size: target.size.lanes(),
            backend: target.backend.name(),
            values,
            has_collision,
            lane_views,
        })?,
        OutputFormat::Text => {
            println!(
                "{} values on {} lanes ({})",
                values.len(),
                target.size,
                target.backend
            );
            println!("collision: {}", if has_collision { "yes" } else { "no" });
        }
    }

    Ok(())
}
