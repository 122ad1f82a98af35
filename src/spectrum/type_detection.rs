//! Heuristic detection of whether a spectrum is profile or centroided, used
//! when the source file does not declare the representation and as a
//! fallback for formats that declare it unreliably.

use super::scan::SpectrumType;

/// Minimum number of data points before the shape heuristics are meaningful.
const MIN_POINTS: usize = 5;

/// Minimum number of samples on the base peak's flanks for it to count as a
/// continuously sampled curve.
const MIN_FLANK_RUN: usize = 3;

/// The base peak of a profile spectrum is narrow relative to the whole scan.
const MAX_PEAK_SPAN_FRACTION: f64 = 0.01;

/// Auto-detect the spectrum type of raw m/z and intensity buffers.
///
/// Profile data is a densely sampled curve: it carries baseline samples of
/// zero intensity, and the most intense peak rises and falls over several
/// adjacent samples spanning a tiny slice of the scanned m/z range. Centroid
/// data has neither property, its neighbors are unrelated peaks. Sparse
/// spectra below [`MIN_POINTS`] are treated as centroided.
pub fn detect_spectrum_type(mzs: &[f64], intensities: &[f32]) -> SpectrumType {
    debug_assert_eq!(mzs.len(), intensities.len());
    let size = mzs.len();
    if size < MIN_POINTS {
        return SpectrumType::Centroided;
    }

    if intensities.iter().any(|intensity| *intensity == 0.0) {
        return SpectrumType::Profile;
    }

    let scan_span = mzs[size - 1] - mzs[0];
    if scan_span <= 0.0 {
        return SpectrumType::Centroided;
    }

    let mut top = 0;
    for (index, intensity) in intensities.iter().enumerate() {
        if *intensity > intensities[top] {
            top = index;
        }
    }

    // Walk outward from the base peak while the signal keeps falling away
    let mut left = top;
    while left > 0 && intensities[left - 1] < intensities[left] {
        left -= 1;
    }
    let mut right = top;
    while right + 1 < size && intensities[right + 1] < intensities[right] {
        right += 1;
    }

    let run = right - left + 1;
    let peak_span = mzs[right] - mzs[left];
    if run >= MIN_FLANK_RUN && peak_span < scan_span * MAX_PEAK_SPAN_FRACTION {
        SpectrumType::Profile
    } else {
        SpectrumType::Centroided
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sparse_spectra_are_centroided() {
        assert_eq!(
            detect_spectrum_type(&[100.0, 200.0], &[5.0, 9.0]),
            SpectrumType::Centroided
        );
        assert_eq!(detect_spectrum_type(&[], &[]), SpectrumType::Centroided);
    }

    #[test]
    fn baseline_zeroes_mean_profile() {
        let mzs = [100.0, 100.01, 100.02, 100.03, 100.04, 100.05];
        let intensities = [0.0, 2.0, 9.0, 3.0, 0.0, 0.0];
        assert_eq!(detect_spectrum_type(&mzs, &intensities), SpectrumType::Profile);
    }

    #[test]
    fn sampled_curve_is_profile() {
        // A narrow bump sampled at 0.01 m/z steps inside a 100 m/z wide scan
        let mzs = [100.0, 100.01, 100.02, 100.03, 100.04, 200.0];
        let intensities = [2.0, 8.0, 20.0, 7.0, 3.0, 6.0];
        assert_eq!(detect_spectrum_type(&mzs, &intensities), SpectrumType::Profile);
    }

    #[test]
    fn unrelated_neighbors_are_centroided() {
        // Peaks spread evenly across the scan, no local curve shape
        let mzs = [100.0, 150.0, 200.0, 250.0, 300.0, 350.0];
        let intensities = [4.0, 90.0, 12.0, 35.0, 8.0, 20.0];
        assert_eq!(
            detect_spectrum_type(&mzs, &intensities),
            SpectrumType::Centroided
        );
    }
}
