use std::path::Path;

use lane_collision::compare::SortOrder;
use lane_collision::config::parse_config;
use lane_collision::{check_duplicates, collision_mask, sort_lanes, LaneMask};
use serde::Serialize;

use super::{mask_lanes, print_json, OutputFormat};

#[derive(Serialize)]
struct RunReport<'a> {
    group_size: usize,
    backend: &'a str,
    order: SortOrder,
    values: &'a [i64],
    sorted: Vec<i64>,
    has_collision: bool,
    mask: LaneMask,
    flagged_lanes: Vec<usize>,
}

pub fn run(path: &Path, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let config = parse_config(path)?;
    let (size, backend) = (config.group_size, config.backend);

    let sorted = sort_lanes(&config.values, size, backend, config.order)?;
    let has_collision = check_duplicates(&config.values, size, backend)?
        .into_iter()
        .any(|d| d);
    let mask = collision_mask(&config.values, size, backend)?;

    match format {
        OutputFormat::Json => print_json(&RunReport {
            group_size: size.lanes(),
            backend: backend.name(),
            order: config.order,
            values: &config.values,
            sorted,
            has_collision,
            mask,
            flagged_lanes: mask_lanes(mask),
        })?,
        OutputFormat::Text => {
            println!(
                "{}: {} values on {size} lanes ({backend})",
                path.display(),
                config.values.len()
            );
            let line: Vec<String> = sorted.iter().map(ToString::to_string).collect();
            println!("sorted:    {}", line.join(" "));
            println!("collision: {}", if has_collision { "yes" } else { "no" });
            println!("mask:      {mask:#x}");
        }
    }

    Ok(())
}
