use ndarray::Array1;
use rustyms::Element::H as Hydrogen;

/// Electron rest mass in Dalton (CODATA 2018)
const ELECTRON_MASS: f64 = 0.000_548_579_909_065;

/// Converts mass to charge ratio (Thompson) to the neutral mass in Dalton
///
/// # Arguments
/// * `mz` - Mass to charge ratio (Thompson)
/// * `charge` - Charge
///
pub fn mass_to_charge_to_dalton(mz: f64, charge: usize) -> f64 {
    let charge = charge as f64;
    let hydrogen = Hydrogen
        .mass(None)
        .map(|mass| mass.value)
        .unwrap_or(1.007_825_032_23);
    let proton = hydrogen - ELECTRON_MASS;
    mz * charge - proton * charge
}

/// Returns the first index whose m/z is smaller than its predecessor's, if any.
///
/// # Arguments
/// * `mz` - The m/z values to check.
///
pub fn first_unsorted_index(mz: &Array1<f64>) -> Option<usize> {
    mz.windows(2)
        .into_iter()
        .position(|pair| pair[1] < pair[0])
        .map(|position| position + 1)
}
