//! # Financial LPPLS Analysis
//!
//! Rigorous log-periodic power law singularity (LPPLS) analysis for
//! detecting speculative-bubble signatures in financial time series and
//! estimating the critical time at which the regime is predicted to end.
//!
//! The model describes accelerating, oscillating log-price growth
//! culminating at a critical time `tc`:
//!
//! ```text
//! ln p(t) = a + (tc-t)^m * (b + c1 cos(w ln(tc-t)) + c2 sin(w ln(tc-t)))
//! ```
//!
//! For fixed (tc, m, w) the amplitudes solve an ordinary least-squares
//! problem, so the fitting engine couples a bounded local search over the
//! three nonlinear parameters to an analytic linear solve, restarted from
//! many random initial guesses. A combinatorial family of trailing windows
//! ("nested fits") is fitted in parallel, and the fraction of windows per
//! end date that pass the acceptance filter forms the confidence
//! indicator, the system's core analytic output.
//!
//! ## Key Features
//!
//! - **Split optimization**: analytic linear sub-solve inside a bounded
//!   Nelder-Mead search, restarted for global coverage
//! - **Acceptance filtering**: configurable damping, oscillation-count and
//!   parameter-band checks separating credible signals from noise
//! - **Nested-fit ensemble**: shrinking/sliding window grid dispatched
//!   across a fixed-size worker pool
//! - **Confidence indicators**: per-end-date bubble and anti-bubble
//!   confidence in [0, 1]
//! - **Reproducibility**: explicit master seed with deterministic
//!   per-attempt seed derivation, identical results sequential or parallel
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lppls_finance::{LpplsAnalyzer, ObservationSeries};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Strictly increasing time ordinals and natural-log prices,
//!     // already cleaned and de-duplicated by the data layer.
//!     let times: Vec<f64> = (0..500).map(|i| i as f64).collect();
//!     let log_prices: Vec<f64> = times.iter().map(|t| 4.6 + 0.002 * t).collect();
//!
//!     let series = ObservationSeries::from_rows(times, log_prices)?;
//!     let analyzer = LpplsAnalyzer::new(series);
//!
//!     let fit = analyzer.fit(25)?;
//!     println!(
//!         "tc = {:.1}, m = {:.3}, w = {:.2}, damping = {:.2}",
//!         fit.tc, fit.m, fit.w, fit.damping
//!     );
//!
//!     let ensemble = analyzer.compute_nested_fits(&Default::default())?;
//!     let confidence = analyzer.derive_confidence(&ensemble);
//!     for point in confidence.points() {
//!         println!(
//!             "t = {:>6.0}  up = {:.2}  down = {:.2}",
//!             point.t_end, point.confidence_up, point.confidence_down
//!         );
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The crate is organized around [`LpplsAnalyzer`], which owns one
//! validated [`ObservationSeries`] and an immutable [`LpplsConfig`] and
//! orchestrates the lower layers: the pure model and linear solver, the
//! restart search, the window scheduler and the confidence aggregator.
//! Each layer is usable directly for specialized applications.
//!
//! Data acquisition, reporting and plotting are deliberately out of scope:
//! the crate consumes a pre-cleaned two-row series and produces plain
//! result structures for presentation layers to format.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod acceptance;
pub mod analyzer;
pub mod config;
pub mod confidence;
pub mod errors;
pub mod fit;
pub mod generators;
pub mod linear_solver;
pub mod math_utils;
pub mod model;
pub mod observations;
pub mod optimizer;
pub mod results;
pub mod rng;
pub mod search;
pub mod windows;

// Re-exports for convenience - main public API
pub use acceptance::{FilterConfig, RegimeDirection};
pub use analyzer::LpplsAnalyzer;
pub use config::{LpplsConfig, NestedFitConfig, DEFAULT_MAX_SEARCHES};
pub use errors::{LpplsAnalysisError, LpplsResult};
pub use fit::{damping_indicator, oscillation_count, FitRunner};
pub use generators::{generate_lppls_series, LpplsSeriesConfig};
pub use linear_solver::{residual_sum_of_squares, solve_linear};
pub use model::{basis_row, lppls_value, LinearParams, NonlinearParams};
pub use observations::{ObservationSeries, ObservationWindow, MIN_OBSERVATIONS};
pub use optimizer::{nelder_mead, NelderMeadOptions, ParamBox, SimplexOutcome};
pub use results::{ConfidencePoint, ConfidenceSeries, FitResult, NestedFitResult};
pub use rng::FitRng;
pub use search::{run_search, SearchAttempt, SearchBounds};
pub use windows::{compute_nested_fits, WindowGrid};
