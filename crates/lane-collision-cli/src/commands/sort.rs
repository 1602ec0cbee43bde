use lane_collision::compare::SortOrder;
use lane_collision::sort_lanes;
use serde::Serialize;

use super::{print_json, LaunchTarget, OutputFormat};

#[derive(Serialize)]
struct SortReport<'a> {
    group_size: usize,
    backend: &'a str,
    order: SortOrder,
    sorted: Vec<i64>,
}

pub fn run(
    values: &[i64],
    descending: bool,
    target: &LaunchTarget,
) -> Result<(), Box<dyn std::error::Error>> {
    let order = if descending {
        SortOrder::Descending
    } else {
        SortOrder::Ascending
    };
    let sorted = sort_lanes(values, target.size, target.backend, order)?;

    match target.format {
        OutputFormat::Json => print_json(&SortReport {
            group_size: target.size.lanes(),
            backend: target.backend.name(),
            order,
            sorted,
        })?,
        OutputFormat::Text => {
            let line: Vec<String> = sorted.iter().map(ToString::to_string).collect();
            println!("{}", line.join(" "));
        }
    }

    Ok(())
}
