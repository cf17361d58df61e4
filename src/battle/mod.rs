//! Battle resolution: the board, the damage calculator and the cast
//! orchestrator.

pub mod board;
pub mod calc;
pub mod cast;

pub use board::Board;
pub use calc::{
    compute_victim_outcome, critical_chance, round_half_up, AugmentMark, CastComputation,
    LayerRef, SubEffectOutcome, VictimOutcome,
};
pub use cast::apply_cast;
