// variance.rs

use crate::error::PlotError;
use crate::tables::EigenValues;

// Fractions are rounded to this many decimals before being shown as percentages.
const FRACTION_DIGITS: i32 = 3;

/// Share of total variance carried by PC1 and PC2, as rounded fractions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct VarianceExplained {
    pub(crate) pc1: f64,
    pub(crate) pc2: f64,
}

impl VarianceExplained {
    pub(crate) fn pc1_label(&self) -> String {
        axis_label(1, self.pc1)
    }

    pub(crate) fn pc2_label(&self) -> String {
        axis_label(2, self.pc2)
    }
}

fn axis_label(component: usize, fraction: f64) -> String {
    format!("PC{}: {:.1}%", component, fraction * 100.0)
}

pub(crate) fn round_to(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale).round() / scale
}

/// Rounded fraction of the total for every declared component.
///
/// The denominator is the sum of all eigenvalues, not just the first two.
pub(crate) fn component_fractions(eigenvalues: &EigenValues) -> Result<Vec<f64>, PlotError> {
    let values = eigenvalues.as_slice();
    let total: f64 = values.iter().sum();
    if total == 0.0 {
        return Err(PlotError::DivisionByZero);
    }
    Ok(values
        .iter()
        .map(|value| round_to(value / total, FRACTION_DIGITS))
        .collect())
}

pub(crate) fn variance_explained(eigenvalues: &EigenValues) -> Result<VarianceExplained, PlotError> {
    let fractions = component_fractions(eigenvalues)?;
    Ok(VarianceExplained {
        pc1: fractions[0],
        pc2: fractions[1],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eigenvalues(values: &[f64]) -> EigenValues {
        EigenValues::new(values.to_vec()).unwrap()
    }

    #[test]
    fn labels_two_component_split() {
        let variance = variance_explained(&eigenvalues(&[4.0, 1.0])).unwrap();
        assert_eq!(variance.pc1_label(), "PC1: 80.0%");
        assert_eq!(variance.pc2_label(), "PC2: 20.0%");
    }

    #[test]
    fn divides_by_all_components() {
        let variance = variance_explained(&eigenvalues(&[4.0, 1.0, 3.0, 2.0])).unwrap();
        assert_eq!(variance.pc1, 0.4);
        assert_eq!(variance.pc2, 0.1);
        assert_eq!(variance.pc1_label(), "PC1: 40.0%");
    }

    #[test]
    fn rounds_to_three_decimals() {
        // 1 / 3 -> 0.333, 2 / 3 -> 0.667
        let variance = variance_explained(&eigenvalues(&[1.0, 2.0])).unwrap();
        assert_eq!(variance.pc1, 0.333);
        assert_eq!(variance.pc2, 0.667);
        assert_eq!(variance.pc1_label(), "PC1: 33.3%");
        assert_eq!(variance.pc2_label(), "PC2: 66.7%");
    }

    #[test]
    fn fractions_of_non_negative_values_stay_within_total() {
        let values = [5.1, 2.7, 1.3, 0.6, 0.3];
        let fractions = component_fractions(&eigenvalues(&values)).unwrap();
        let sum: f64 = fractions.iter().sum();
        let tolerance = 0.0005 * values.len() as f64;
        assert!(sum <= 1.0 + tolerance);
        assert!((sum - 1.0).abs() <= tolerance);
    }

    #[test]
    fn zero_total_is_an_error() {
        assert!(matches!(
            variance_explained(&eigenvalues(&[0.0, 0.0, 0.0])),
            Err(PlotError::DivisionByZero)
        ));
    }
}
