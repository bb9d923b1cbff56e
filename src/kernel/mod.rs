//! Kernel functions over dense feature matrices

pub mod distance;
pub mod linear;
pub mod rbf;
pub mod traits;

pub use self::distance::*;
pub use self::linear::*;
pub use self::rbf::*;
pub use self::traits::*;

use crate::core::{KernelSpec, Result};

/// Instantiate the kernel described by `spec`
pub fn kernel_for(spec: &KernelSpec) -> Result<Box<dyn Kernel>> {
    Ok(match *spec {
        KernelSpec::Linear => Box::new(LinearKernel::new()),
        KernelSpec::Rbf { gamma } => Box::new(RBFKernel::try_new(gamma)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_for_round_trips_spec() {
        for spec in [KernelSpec::Linear, KernelSpec::Rbf { gamma: 0.25 }] {
            assert_eq!(kernel_for(&spec).unwrap().spec(), spec);
        }
        assert!(kernel_for(&KernelSpec::Rbf { gamma: -1.0 }).is_err());
    }
}
