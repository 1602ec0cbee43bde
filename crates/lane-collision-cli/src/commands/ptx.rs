use std::path::Path;

use lane_collision::kernels::bitonic::bitonic_sort_ptx;
use lane_collision::kernels::collision::collision_ptx;
use lane_collision::kernels::collision_mask::collision_mask_ptx;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PtxKernel {
    Sort,
    Collision,
    Mask,
}

impl PtxKernel {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s {
            "sort" => Ok(Self::Sort),
            "collision" => Ok(Self::Collision),
            "mask" => Ok(Self::Mask),
            other => Err(format!(
                "unknown kernel '{other}', expected 'sort', 'collision', or 'mask'"
            )),
        }
    }

    pub fn source(self) -> String {
        match self {
            Self::Sort => bitonic_sort_ptx(),
            Self::Collision => collision_ptx(),
            Self::Mask => collision_mask_ptx(),
        }
    }
}

pub fn run(kernel: PtxKernel, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let source = kernel.source();
    match output {
        Some(path) => {
            std::fs::write(path, &source)?;
            println!("Wrote {}", path.display());
        }
        None => print!("{source}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_from_str() {
        assert_eq!(PtxKernel::from_str("sort").unwrap(), PtxKernel::Sort);
        assert!(PtxKernel::from_str("scan").is_err());
    }

    #[test]
    fn each_kernel_has_its_entry() {
        assert!(PtxKernel::Sort.source().contains(".entry warp_bitonic_sort_kernel"));
        assert!(PtxKernel::Collision.source().contains(".entry warp_has_collision_kernel"));
        assert!(PtxKernel::Mask.source().contains(".entry warp_collision_mask_kernel"));
    }

    #[test]
    fn writes_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mask.ptx");
        run(PtxKernel::Mask, Some(&path)).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with(".version"));
    }
}
