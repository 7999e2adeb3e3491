//! Symmetric and triangular level-3 kernels: SYMM, SYRK and TRMM.
//!
//! Every family comes in the same optimisation levels (see [`Variant`]):
//! a sequential reference loop, a loop unrolled by [`UNROLL`], four-lane
//! vector batches and a combination of the two. The optimised variants fan
//! out over [`rayon`] and must agree with the reference up to the rounding of
//! reordered sums.
//!
//! Matrices are row-major. Triangular operands are [`LowerTriangular`], which
//! cannot read above its diagonal.
//!
//! ```
//! use symkern::{init_symm, symm, Variant};
//!
//! let mut expected = init_symm(6, 5).unwrap();
//! let mut ops = expected.clone();
//! symm::run(Variant::Reference, &mut expected);
//! symm::run(Variant::Combined, &mut ops);
//! assert!(symkern::utils::approx_eq_slices(
//!     ops.c().as_slice(),
//!     expected.c().as_slice(),
//!     1e-9,
//! ));
//! ```

pub mod error;
pub mod harness;
pub mod init;
pub mod matrix;
pub mod parallel;
pub mod simd;
pub mod symm;
pub mod syrk;
pub mod trmm;
pub mod utils;
pub mod variant;

pub use error::{KernelError, Result};
pub use harness::{Family, HarnessConfig, TrialMode};
pub use init::{init_symm, init_syrk, init_trmm};
pub use matrix::{Diag, LowerTriangular, Matrix, SENTINEL};
pub use symm::SymmOperands;
pub use syrk::SyrkOperands;
pub use trmm::TrmmOperands;
pub use variant::Variant;

/// Unrolling factor of the reduction loops.
pub const UNROLL: usize = 4;

/// Columns per parallel work item in SYMM and TRMM. A multiple of
/// [`simd::LANE_COUNT`].
pub const PANEL_COLS: usize = 64;

/// Timed invocations per variant.
pub const DEFAULT_TRIALS: usize = 20;
