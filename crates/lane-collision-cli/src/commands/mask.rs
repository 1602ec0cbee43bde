use lane_collision::collision_mask;
use lane_collision::oracle::expand_mask;
use serde::Serialize;

use super::{mask_lanes, print_json, LaunchTarget, OutputFormat};

#[derive(Serialize)]
struct MaskReport<'a> {
    group_size: usize,
    backend: &'a str,
    values: &'a [i64],
    mask: String,
    flagged_lanes: Vec<usize>,
    expanded: String,
}

pub fn run(values: &[i64], target: &LaunchTarget) -> Result<(), Box<dyn std::error::Error>> {
    let mask = collision_mask(values, target.size, target.backend)?;
    let expanded = expand_mask(mask);

    match target.format {
        OutputFormat::Json => print_json(&MaskReport {
            group_size: target.size.lanes(),
            backend: target.backend.name(),
            values,
            mask: format!("{mask:#x}"),
            flagged_lanes: mask_lanes(mask),
            expanded: format!("{expanded:#x}"),
        })?,
        OutputFormat::Text => {
            println!("mask:     {mask:#x}");
            println!("lanes:    {:?}", mask_lanes(mask));
            println!("expanded: {expanded:#x}");
        }
    }

    Ok(())
}
