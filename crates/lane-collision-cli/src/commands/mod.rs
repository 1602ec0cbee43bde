pub mod check;
pub mod mask;
pub mod ptx;
pub mod run;
pub mod selftest;
pub mod sort;

use lane_collision::{Backend, GroupSize, LaneError, LaneMask};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown format '{other}', expected 'text' or 'json'")),
        }
    }
}

/// Validated group, backend and output format for one invocation.
#[derive(Debug, Clone, Copy)]
pub struct LaunchTarget {
    pub size: GroupSize,
    pub backend: Backend,
    pub format: OutputFormat,
}

impl LaunchTarget {
    pub fn parse(
        group_size: usize,
        backend: &str,
        format: &str,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let size = GroupSize::new(group_size)?;
        let backend: Backend = backend.parse()?;
        if backend == Backend::Ptx {
            return Err(LaneError::BackendUnavailable(backend.name().to_string()).into());
        }
        Ok(Self {
            size,
            backend,
            format: OutputFormat::from_str(format)?,
        })
    }
}

/// Lane ids of the set bits, lowest first.
pub fn mask_lanes(mask: LaneMask) -> Vec<usize> {
    (0..LaneMask::BITS as usize)
        .filter(|&lane| (mask >> lane) & 1 == 1)
        .collect()
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
