use crate::{error::Error, shift::ShiftChargeRule};

/// Default fragment m/z tolerance
pub const DEFAULT_FRAGMENT_TOLERANCE: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Configuration {
    pub fragment_tolerance: f64,
    pub allow_shift: bool,
    pub shift_charges: ShiftChargeRule,
}

impl Configuration {
    /// Creates a new configuration.
    ///
    /// Arguments:
    /// * `fragment_tolerance` - Fragment m/z tolerance, must be finite and non-negative.
    /// * `allow_shift` - Whether candidate peaks are shifted by the precursor mass difference.
    ///
    pub fn new(fragment_tolerance: f64, allow_shift: bool) -> Result<Self, Error> {
        if !fragment_tolerance.is_finite() || fragment_tolerance < 0.0 {
            return Err(Error::InvalidFragmentTolerance(fragment_tolerance));
        }

        Ok(Self {
            fragment_tolerance,
            allow_shift,
            shift_charges: ShiftChargeRule::default(),
        })
    }

    pub fn with_shift_charges(mut self, shift_charges: ShiftChargeRule) -> Self {
        self.shift_charges = shift_charges;
        self
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            fragment_tolerance: DEFAULT_FRAGMENT_TOLERANCE,
            allow_shift: true,
            shift_charges: ShiftChargeRule::default(),
        }
    }
}
