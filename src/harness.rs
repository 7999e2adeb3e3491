//! Timing harness shared by the `symm`, `syrk` and `trmm` binaries.
//!
//! A run warms every variant up once, then times `trials` invocations of each
//! variant with a monotonic clock and reports the total per variant.

use std::fmt;
use std::time::{Duration, Instant};

use crate::error::{usage_error, KernelError, Result};
use crate::init::{init_symm, init_syrk, init_trmm};
use crate::matrix::Matrix;
use crate::symm::{self, SymmOperands};
use crate::syrk::{self, SyrkOperands};
use crate::trmm::{self, TrmmOperands};
use crate::variant::Variant;
use crate::DEFAULT_TRIALS;

/// Values per line in [`format_matrix`].
pub const VALUES_PER_LINE: usize = 20;

/// The three kernel families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Symm,
    Syrk,
    Trmm,
}

impl Family {
    pub fn name(self) -> &'static str {
        match self {
            Family::Symm => "symm",
            Family::Syrk => "syrk",
            Family::Trmm => "trmm",
        }
    }

    /// Variants reported for this family, in report order.
    pub fn variants(self) -> &'static [Variant] {
        match self {
            Family::Syrk => &Variant::SYRK,
            Family::Symm | Family::Trmm => &Variant::COMMON,
        }
    }
}

/// What the operands look like at the start of each timed trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialMode {
    /// Operands are restored from a pristine copy before every warm-up and
    /// trial. The restore is not timed.
    Fresh,
    /// One operand set is mutated by every warm-up and trial of every
    /// variant, so later trials start from already updated values.
    Accumulate,
}

/// Run-time settings of one harness invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    pub m: usize,
    pub n: usize,
    pub trials: usize,
    pub trial_mode: TrialMode,
    pub print_result: bool,
}

impl HarnessConfig {
    pub fn new(m: usize, n: usize) -> Self {
        Self {
            m,
            n,
            trials: DEFAULT_TRIALS,
            trial_mode: TrialMode::Fresh,
            print_result: false,
        }
    }

    /// Parses `m n [--fresh|--accumulate] [--trials N] [--print]`, program
    /// name excluded.
    ///
    /// # Errors
    ///
    /// Returns a usage error for a wrong positional count, an unknown flag, or
    /// a dimension or trial count that is not a positive integer.
    pub fn from_args<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut positional = Vec::new();
        let mut trials = DEFAULT_TRIALS;
        let mut trial_mode = TrialMode::Fresh;
        let mut print_result = false;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_ref() {
                "--fresh" => trial_mode = TrialMode::Fresh,
                "--accumulate" => trial_mode = TrialMode::Accumulate,
                "--print" => print_result = true,
                "--trials" => {
                    let value = args
                        .next()
                        .ok_or_else(|| usage_error("--trials needs a value"))?;
                    trials = parse_positive("trials", value.as_ref())?;
                }
                flag if flag.starts_with("--") => {
                    return Err(usage_error(format!("unknown option '{flag}'")));
                }
                value => positional.push(value.to_string()),
            }
        }

        let [m, n] = positional.as_slice() else {
            return Err(usage_error(format!(
                "expected 2 positional arguments `m n`, got {}",
                positional.len()
            )));
        };

        Ok(Self {
            m: parse_positive("m", m)?,
            n: parse_positive("n", n)?,
            trials,
            trial_mode,
            print_result,
        })
    }
}

fn parse_positive(name: &str, value: &str) -> Result<usize> {
    match value.parse::<usize>() {
        Ok(0) | Err(_) => Err(usage_error(format!(
            "{name} must be a positive integer, got '{value}'"
        ))),
        Ok(v) => Ok(v),
    }
}

/// Operand bundles the harness can time.
pub trait Workload: Clone {
    fn run(&mut self, variant: Variant);

    /// The matrix the kernels update in place.
    fn result(&self) -> &Matrix;
}

impl Workload for SymmOperands {
    fn run(&mut self, variant: Variant) {
        symm::run(variant, self)
    }

    fn result(&self) -> &Matrix {
        self.c()
    }
}

impl Workload for SyrkOperands {
    fn run(&mut self, variant: Variant) {
        syrk::run(variant, self)
    }

    fn result(&self) -> &Matrix {
        self.c()
    }
}

impl Workload for TrmmOperands {
    fn run(&mut self, variant: Variant) {
        trmm::run(variant, self)
    }

    fn result(&self) -> &Matrix {
        self.b()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    pub variant: Variant,
    /// Total over all trials.
    pub elapsed: Duration,
}

/// Per-variant timings, printed one `<label> time: <seconds>` line each.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    pub timings: Vec<Timing>,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for timing in &self.timings {
            let label = format!("{} time:", timing.variant.label());
            writeln!(f, "{:<18}{:.6}", label, timing.elapsed.as_secs_f64())?;
        }
        Ok(())
    }
}

/// Warms up and times every variant in `variants` on `operands`.
///
/// Returns the report together with the operands as the last timed trial
/// left them.
pub fn benchmark<W: Workload>(
    operands: &W,
    variants: &[Variant],
    trials: usize,
    mode: TrialMode,
) -> (Report, W) {
    let mut state = operands.clone();

    for &variant in variants {
        if mode == TrialMode::Fresh {
            state.clone_from(operands);
        }
        state.run(variant);
    }
    log::debug!("warm-up done for {} variant(s)", variants.len());

    let mut report = Report::default();
    for &variant in variants {
        let mut elapsed = Duration::ZERO;
        for _ in 0..trials {
            if mode == TrialMode::Fresh {
                state.clone_from(operands);
            }
            let start = Instant::now();
            state.run(variant);
            elapsed += start.elapsed();
        }
        log::debug!("{variant}: {trials} trial(s) in {:?}", elapsed);
        report.timings.push(Timing { variant, elapsed });
    }

    (report, state)
}

/// Formats `matrix` row-major, `{:.2}` per value, [`VALUES_PER_LINE`] values
/// per line.
pub fn format_matrix(matrix: &Matrix) -> String {
    let mut out = String::new();
    for (idx, value) in matrix.as_slice().iter().enumerate() {
        if idx > 0 {
            out.push(if idx % VALUES_PER_LINE == 0 { '\n' } else { ' ' });
        }
        out.push_str(&format!("{value:.2}"));
    }
    out
}

fn run_family<W: Workload>(operands: W, family: Family, config: &HarnessConfig) -> String {
    let (report, state) = benchmark(
        &operands,
        family.variants(),
        config.trials,
        config.trial_mode,
    );
    let mut out = report.to_string();
    if config.print_result {
        out.push_str(&format_matrix(state.result()));
        out.push('\n');
    }
    out
}

/// Initializes the operands of `family` from `config`, runs the benchmark and
/// returns the text to print.
pub fn run(family: Family, config: &HarnessConfig) -> Result<String> {
    log::info!(
        "{} m={} n={} trials={} mode={:?} started {}",
        family.name(),
        config.m,
        config.n,
        config.trials,
        config.trial_mode,
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    let out = match family {
        Family::Symm => run_family(init_symm(config.m, config.n)?, family, config),
        Family::Syrk => run_family(init_syrk(config.m, config.n)?, family, config),
        Family::Trmm => run_family(init_trmm(config.m, config.n)?, family, config),
    };
    Ok(out)
}

/// Entry point of the binaries. `args` excludes the program name; the return
/// value is the process exit status.
pub fn main_with_args<I, S>(family: Family, args: I) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let result = HarnessConfig::from_args(args).and_then(|config| run(family, &config));
    match result {
        Ok(out) => {
            print!("{out}");
            0
        }
        Err(err @ KernelError::UsageError { .. }) => {
            log::warn!("{err}");
            eprintln!("{err}");
            eprintln!(
                "Usage: {} m n [--fresh|--accumulate] [--trials N] [--print]",
                family.name()
            );
            1
        }
        Err(err) => {
            log::error!("{err}");
            eprintln!("{err}");
            2
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_args_defaults() {
        let config = HarnessConfig::from_args(["8", "5"]).unwrap();
        assert_eq!(config, HarnessConfig::new(8, 5));
        assert_eq!(config.trials, 20);
        assert_eq!(config.trial_mode, TrialMode::Fresh);
    }

    #[test]
    fn test_from_args_flags() {
        let config =
            HarnessConfig::from_args(["--accumulate", "3", "--trials", "2", "4", "--print"])
                .unwrap();
        assert_eq!((config.m, config.n), (3, 4));
        assert_eq!(config.trials, 2);
        assert_eq!(config.trial_mode, TrialMode::Accumulate);
        assert!(config.print_result);
    }

    #[test]
    fn test_from_args_usage_errors() {
        for args in [
            vec!["3"],
            vec!["3", "4", "5"],
            vec!["x", "4"],
            vec!["0", "4"],
            vec!["-2", "4"],
            vec!["3", "4", "--trials"],
            vec!["3", "4", "--trials", "0"],
            vec!["3", "4", "--bogus"],
        ] {
            let err = HarnessConfig::from_args(&args).unwrap_err();
            assert!(
                matches!(err, KernelError::UsageError { .. }),
                "{args:?} gave {err}"
            );
        }
    }

    #[test]
    fn test_report_lines() {
        let report = Report {
            timings: vec![
                Timing {
                    variant: Variant::Reference,
                    elapsed: Duration::from_millis(1500),
                },
                Timing {
                    variant: Variant::CombinedSimple,
                    elapsed: Duration::from_micros(250),
                },
            ],
        };
        assert_eq!(
            report.to_string(),
            "naive time:       1.500000\ncomb_simple time: 0.000250\n"
        );
    }

    #[test]
    fn test_format_matrix_wraps() {
        let m = Matrix::from_fn(3, 9, |i, j| (i * 9 + j) as f64);
        let text = format_matrix(&m);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].split(' ').count(), 20);
        assert!(lines[1].starts_with("20.00 21.00"));
    }

    #[test]
    fn test_benchmark_reports_every_variant() {
        let ops = init_syrk(6, 5).unwrap();
        let (report, _) = benchmark(&ops, Family::Syrk.variants(), 2, TrialMode::Fresh);
        let labels: Vec<_> = report.timings.iter().map(|t| t.variant.label()).collect();
        assert_eq!(
            labels,
            ["naive", "unrolled", "vectorized", "comb_simple", "combined"]
        );
    }

    #[test]
    fn test_fresh_trials_leave_single_application_result() {
        let ops = init_trmm(5, 6).unwrap();
        let (_, state) = benchmark(&ops, &[Variant::Reference], 3, TrialMode::Fresh);
        let mut once = ops.clone();
        once.run(Variant::Reference);
        assert_eq!(state.result(), once.result());

        let (_, accumulated) = benchmark(&ops, &[Variant::Reference], 3, TrialMode::Accumulate);
        assert_ne!(accumulated.result(), once.result());
    }

    #[test]
    fn test_main_with_args_exit_codes() {
        assert_eq!(main_with_args(Family::Symm, ["4"]), 1);
        assert_eq!(main_with_args(Family::Trmm, ["2", "3", "--trials", "1"]), 0);
    }
}
