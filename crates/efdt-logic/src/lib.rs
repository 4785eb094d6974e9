//! Pure site-analysis logic for E-FDT.
//!
//! This crate contains everything about an analysis that is independent
//! of a UI, a network, or a file system. Functions take plain data and
//! return results, so the whole pipeline is unit-testable and the same run
//! always reproduces the same sites and scores. The one outside capability,
//! narrative insight text, is injected through [`insight::InsightProvider`].
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`audit`] | Append-only hash-chained milestone log and its verifier |
//! | [`carbon`] | CO₂ totals, verified credits, market value range |
//! | [`cities`] | Reference table of 20 Indian cities |
//! | [`climate`] | Warming scenarios, per-site viability, recommendation |
//! | [`compliance`] | Green-building frameworks, criteria, grade |
//! | [`config`] | Analysis configuration, validation and name resolution |
//! | [`digest`] | 32-bit string digest used for seeding and chain hashes |
//! | [`engagement`] | Per-site community engagement scores |
//! | [`error`] | Analysis error type |
//! | [`export`] | CSV / JSON exports and rupee formatting |
//! | [`financial`] | Five-year cost, revenue, ROI and payback projection |
//! | [`impact`] | Equity and gentrification summary of the top sites |
//! | [`insight`] | Insight provider seam and prompt summary |
//! | [`numeric`] | Rounding and averaging helpers |
//! | [`sdg`] | Alignment with six Sustainable Development Goals |
//! | [`sequence`] | Seeded linear congruential draw sequence |
//! | [`session`] | Orchestrator: runs the pipeline, owns the audit log |
//! | [`site`] | Synthetic site generation, suitability scoring, ranking |

pub mod audit;
pub mod carbon;
pub mod cities;
pub mod climate;
pub mod compliance;
pub mod config;
pub mod digest;
pub mod engagement;
pub mod error;
pub mod export;
pub mod financial;
pub mod impact;
pub mod insight;
pub mod numeric;
pub mod sdg;
pub mod sequence;
pub mod session;
pub mod site;
