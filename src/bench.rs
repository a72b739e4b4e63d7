//! Bench arithmetic: serial dilution plans and population doublings.
//!
//! ```text
//! initial cells/ml = count per square / 4 * 10^6
//! final cells/ml   = colonies per plate * 10          (100 ul plated)
//! factor           = initial / final / 1000
//! culture          = 1000 / factor ul, water to 1000 ul
//! ```
//! followed by three 100 ul into 900 ul steps, each a further 10x.
//!
use std::fmt;
use serde::Serialize;
use crate::common::{LabseqError, Result};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DilutionPlan {
    pub initial_cells_per_ml: f64,
    pub final_cells_per_ml: f64,
    pub dilution_factor: f64,
    /// Culture volume of the first step, in ul.
    pub culture_volume_ul: f64,
    pub water_volume_ul: f64,
    pub serial_steps: u32,
    pub step_transfer_ul: f64,
    pub step_diluent_ul: f64,
    pub plating_volume_ul: f64,
}

/// Plan for reaching `colonies_per_plate` from a hemocytometer count
/// (average cells per 1/16 square).
pub fn dilution_plan(count_per_square: f64, colonies_per_plate: f64) -> Result<DilutionPlan> {
    if !(count_per_square > 0.0 && colonies_per_plate > 0.0) {
        return Err(LabseqError::InvalidParameter(format!(
            "cell count and colonies per plate must be positive (got {count_per_square}, {colonies_per_plate})"
        )));
    }
    let initial = count_per_square / 4.0 * 1e6;
    let final_cells = colonies_per_plate * 10.0;
    let factor = initial / final_cells / 1000.0;
    let culture = 1000.0 / factor;
    if culture > 1000.0 {
        return Err(LabseqError::InvalidParameter(format!(
            "culture is too dilute: first step would need {culture:.1} ul of culture in 1000 ul"
        )));
    }
    Ok(DilutionPlan {
        initial_cells_per_ml: initial,
        final_cells_per_ml: final_cells,
        dilution_factor: factor,
        culture_volume_ul: culture,
        water_volume_ul: 1000.0 - culture,
        serial_steps: 3,
        step_transfer_ul: 100.0,
        step_diluent_ul: 900.0,
        plating_volume_ul: 100.0,
    })
}

impl fmt::Display for DilutionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Dilute {:.2} ul of cell culture with {:.2} ul ddH2O,",
            self.culture_volume_ul, self.water_volume_ul
        )?;
        writeln!(
            f,
            "then {} steps of {} ul diluted culture into {} ul ddH2O.",
            self.serial_steps, self.step_transfer_ul, self.step_diluent_ul
        )?;
        write!(f, "Plate {} ul of the final dilution per plate.", self.plating_volume_ul)
    }
}

/// Doublings from `initial` cells to `final_per_ml * volume` cells: whole
/// halvings of the final population plus the fractional remainder.
pub fn population_doublings(initial: f64, final_per_ml: f64, volume: f64) -> Result<f64> {
    if !(initial > 0.0 && final_per_ml >= 0.0 && volume >= 0.0) {
        return Err(LabseqError::InvalidParameter(format!(
            "initial population must be positive and final values non-negative (got {initial}, {final_per_ml}, {volume})"
        )));
    }
    let mut size = final_per_ml * volume;
    let mut doublings = 0.0;
    while size > initial {
        if size < initial * 2.0 {
            doublings += (size - initial) / initial;
            break;
        }
        size /= 2.0;
        doublings += 1.0;
    }
    log::debug!("{initial} -> {} cells: {doublings} doublings", final_per_ml * volume);
    Ok(doublings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_arithmetic() {
        let plan = dilution_plan(20.0, 100.0).unwrap();
        assert_eq!(plan.initial_cells_per_ml, 5e6);
        assert_eq!(plan.final_cells_per_ml, 1000.0);
        assert!((plan.dilution_factor - 5.0).abs() < 1e-9);
        assert!((plan.culture_volume_ul - 200.0).abs() < 1e-9);
        assert!((plan.water_volume_ul - 800.0).abs() < 1e-9);
        assert!(plan.to_string().contains("200.00 ul of cell culture"));
    }

    #[test]
    fn plan_rejects_bad_input() {
        assert!(dilution_plan(0.0, 100.0).is_err());
        assert!(dilution_plan(20.0, -1.0).is_err());
        assert!(dilution_plan(f64::NAN, 1.0).is_err());
        // 0.4 cells per square cannot reach 1000 colonies
        assert!(dilution_plan(0.4, 1000.0).is_err());
    }

    #[test]
    fn doublings() {
        assert_eq!(population_doublings(1.0, 8.0, 1.0).unwrap(), 3.0);
        assert_eq!(population_doublings(1e5, 3e4, 10.0).unwrap(), 1.5);
        assert_eq!(population_doublings(100.0, 1.0, 50.0).unwrap(), 0.0);
        assert!(population_doublings(0.0, 1.0, 1.0).is_err());
    }
}
