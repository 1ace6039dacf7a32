//! Engine status bitmask.
//!
//! Purpose
//! - Errors are values: a triangulation run reports the first failure class it
//!   detects as a single composite status and never panics on bad input.
//!
//! Layout
//! - Bit 0 is the generic error bit; each higher bit is one failure category.
//!   Published `ERR_*` constants combine the two, so a non-OK status compares
//!   equal to exactly one of them.

use bitflags::bitflags;

bitflags! {
    /// Result status of a triangulation run (or of a dynamic operation).
    #[derive(Default)]
    pub struct Status: u32 {
        /// Generic error bit; set in every `ERR_*` constant.
        const ERROR = 1 << 0;

        // Category bits (one per failure class).
        const ARGS_INVALID = 1 << 1;
        const POSITIONS_LENGTH = 1 << 2;
        const POSITION_UNDEFINED = 1 << 3;
        const POSITIONS_DUPLICATES = 1 << 4;
        const CONSTRAINTS_LENGTH = 1 << 5;
        const CONSTRAINT_OUT_OF_RANGE = 1 << 6;
        const CONSTRAINT_SELF_LOOP = 1 << 7;
        const CONSTRAINT_COLLINEAR_POINT = 1 << 8;
        const CONSTRAINTS_DUPLICATE = 1 << 9;
        const CONSTRAINTS_INTERSECT = 1 << 10;
        const HOLE_UNDEFINED = 1 << 11;
        const IGNORE_MASK_LENGTH = 1 << 12;
        const DELAUNAY_DEGENERATE = 1 << 13;
        const SLOAN_ITERS = 1 << 14;
        const REFINEMENT_UNSUPPORTED = 1 << 15;

        // Composite statuses as reported on the output object.
        const ERR_ARGS_INVALID =
            Self::ERROR.bits | Self::ARGS_INVALID.bits;
        const ERR_INPUT_POSITIONS_LENGTH =
            Self::ERROR.bits | Self::POSITIONS_LENGTH.bits;
        const ERR_INPUT_POSITION_UNDEFINED =
            Self::ERROR.bits | Self::POSITION_UNDEFINED.bits;
        const ERR_INPUT_POSITIONS_DUPLICATES =
            Self::ERROR.bits | Self::POSITIONS_DUPLICATES.bits;
        const ERR_INPUT_CONSTRAINTS_LENGTH =
            Self::ERROR.bits | Self::CONSTRAINTS_LENGTH.bits;
        const ERR_INPUT_CONSTRAINTS_OUT_OF_RANGE =
            Self::ERROR.bits | Self::CONSTRAINT_OUT_OF_RANGE.bits;
        const ERR_INPUT_CONSTRAINTS_SELF_LOOP =
            Self::ERROR.bits | Self::CONSTRAINT_SELF_LOOP.bits;
        const ERR_INPUT_CONSTRAINTS_COLLINEAR_POINT =
            Self::ERROR.bits | Self::CONSTRAINT_COLLINEAR_POINT.bits;
        const ERR_INPUT_CONSTRAINTS_DUPLICATES =
            Self::ERROR.bits | Self::CONSTRAINTS_DUPLICATE.bits;
        const ERR_INPUT_CONSTRAINTS_INTERSECT =
            Self::ERROR.bits | Self::CONSTRAINTS_INTERSECT.bits;
        const ERR_INPUT_HOLE_UNDEFINED =
            Self::ERROR.bits | Self::HOLE_UNDEFINED.bits;
        const ERR_INPUT_IGNORE_MASK_LENGTH =
            Self::ERROR.bits | Self::IGNORE_MASK_LENGTH.bits;
        const ERR_DELAUNAY_DUPLICATES_OR_COLLINEAR =
            Self::ERROR.bits | Self::DELAUNAY_DEGENERATE.bits;
        const ERR_SLOAN_ITERS_EXCEEDED =
            Self::ERROR.bits | Self::SLOAN_ITERS.bits;
        const ERR_REFINEMENT_UNSUPPORTED =
            Self::ERROR.bits | Self::REFINEMENT_UNSUPPORTED.bits;
    }
}

impl Status {
    /// The all-clear status.
    pub const OK: Status = Status::empty();

    #[inline]
    pub fn is_ok(self) -> bool {
        !self.contains(Status::ERROR)
    }

    #[inline]
    pub fn is_err(self) -> bool {
        self.contains(Status::ERROR)
    }
}
