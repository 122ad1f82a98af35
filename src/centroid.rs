//! Recursive-threshold centroiding: reduces a profile spectrum to one
//! (m/z, intensity) pair per detected peak, recursing into over-wide peaks
//! with a raised noise threshold taken from their deepest internal valley.
//!
//! The recursion is evaluated with an explicit work-list of index ranges so
//! that pathological spectra with many nested valleys cannot exhaust the
//! call stack. Emission order and the one-sub-peak-per-refinement rule are
//! identical to the recursive formulation.

use crate::method::{CancelToken, Method, ProgressTracker};
use crate::spectrum::{Scan, SpectrumDataPoints, SpectrumType};
use crate::store::{DataPointStore, StoreError};

/// One pending range of the divide-and-conquer search, standing in for a
/// recursive call of depth `level` over `[ind, stop)` with `threshold` as
/// the noise floor.
#[derive(Debug, Clone, Copy)]
struct SearchFrame {
    ind: usize,
    stop: usize,
    threshold: f32,
    level: u32,
}

/// How evaluating one frame ended.
enum FrameOutcome {
    /// Scanned through to the end of the range.
    Exhausted,
    /// A refinement frame emitted its one peak and hands back the index the
    /// parent resumes from.
    Emitted(usize),
    /// An over-wide peak needs re-examination at a raised threshold; the
    /// suspended parent is resumed once the child returns.
    Refine(SearchFrame),
}

/// Centroids one profile [`Scan`] into a new scan holding only detected
/// peak maxima.
///
/// The output scan clones the input's metadata, carries
/// [`SpectrumType::Centroided`] and recomputed m/z range and TIC, and keeps
/// its data points in the given store under a fresh handle. Input order is
/// preserved, so the output is m/z-ascending.
///
/// Peaks are runs of points above the noise level. A run whose m/z width
/// falls inside the accepted range contributes its maximum-intensity point;
/// narrower runs are dropped silently; wider runs are re-scanned with the
/// intensity of their lowest internal local minimum as the new threshold.
/// A wider run with no internal local minimum cannot be split and is
/// dropped without being emitted, matching the long-standing behavior of
/// this algorithm.
pub struct RecursiveCentroidingMethod<'a> {
    input_scan: &'a Scan,
    store: &'a DataPointStore,
    noise_level: f32,
    /// Inclusive bounds on the accepted m/z width of a peak.
    width_range: (f64, f64),
    progress: ProgressTracker,
    cancel: CancelToken,
    new_scan: Option<Scan>,
}

impl<'a> RecursiveCentroidingMethod<'a> {
    pub fn new(
        input_scan: &'a Scan,
        store: &'a DataPointStore,
        noise_level: f32,
        width_range: (f64, f64),
    ) -> Self {
        let progress = ProgressTracker::new();
        progress.update(0.0);
        Self {
            input_scan,
            store,
            noise_level,
            width_range,
            progress,
            cancel: CancelToken::new(),
            new_scan: None,
        }
    }

    /// Search `input` for peak maxima, appending them to `output`.
    fn pick_peaks(&self, input: &SpectrumDataPoints, output: &mut SpectrumDataPoints) {
        let mzs = input.mzs();
        let intensities = input.intensities();
        let size = input.len();
        if size == 0 {
            return;
        }

        let mut pending = vec![SearchFrame {
            ind: 0,
            stop: size - 1,
            threshold: self.noise_level,
            level: 0,
        }];
        // Index handed back by the frame that just finished, picked up by
        // the suspended frame beneath it.
        let mut returned: Option<usize> = None;

        while let Some(mut frame) = pending.pop() {
            if let Some(resume) = returned.take() {
                frame.ind = resume + 1;
            }

            let outcome = loop {
                if frame.ind >= frame.stop {
                    break FrameOutcome::Exhausted;
                }
                // Ignore intensities at or below the current noise level
                if intensities[frame.ind] <= frame.threshold {
                    frame.ind += 1;
                    continue;
                }

                let peak_start = frame.ind;
                let mut peak_max = peak_start;
                let mut local_minimum: Option<f32> = None;

                // While the peak is on
                let mut ind = frame.ind;
                while ind < frame.stop && intensities[ind] > frame.threshold {
                    if ind > 0 {
                        let is_local_minimum = intensities[ind - 1] > intensities[ind]
                            && intensities[ind] < intensities[ind + 1];
                        // Track the lowest valley inside the peak as the
                        // candidate split threshold
                        if is_local_minimum
                            && local_minimum.is_none_or(|lowest| intensities[ind] < lowest)
                        {
                            local_minimum = Some(intensities[ind]);
                        }
                    }
                    if intensities[ind] > intensities[peak_max] {
                        peak_max = ind;
                    }
                    ind += 1;
                }
                let peak_stop = ind;

                let peak_width = mzs[peak_stop] - mzs[peak_start];

                if peak_width >= self.width_range.0 && peak_width <= self.width_range.1 {
                    // One output point at the peak's maximum
                    output.add(mzs[peak_max], intensities[peak_max]);

                    if frame.level > 0 {
                        // A refinement emits a single sub-peak, then hands
                        // the scan back to its caller
                        break FrameOutcome::Emitted(peak_stop);
                    }
                }

                if peak_width > self.width_range.1 {
                    if let Some(minimum) = local_minimum {
                        break FrameOutcome::Refine(SearchFrame {
                            ind: peak_start,
                            stop: peak_stop,
                            threshold: minimum,
                            level: frame.level + 1,
                        });
                    }
                    // No internal valley: the over-wide peak cannot be
                    // split and is skipped without being emitted
                }

                frame.ind = peak_stop + 1;
            };

            match outcome {
                FrameOutcome::Exhausted => returned = Some(frame.stop),
                FrameOutcome::Emitted(stop_ind) => returned = Some(stop_ind),
                FrameOutcome::Refine(child) => {
                    pending.push(frame);
                    pending.push(child);
                }
            }
        }
    }
}

impl Method for RecursiveCentroidingMethod<'_> {
    type Output = Scan;
    type Error = StoreError;

    fn execute(&mut self) -> Result<Option<&Scan>, StoreError> {
        // Copy all scan properties
        let mut new_scan = self.input_scan.clone_without_data();

        let mut input_points = SpectrumDataPoints::new();
        self.input_scan.data_points(self.store, &mut input_points)?;

        let mut new_points = SpectrumDataPoints::with_capacity(input_points.len() / 8);
        self.pick_peaks(&input_points, &mut new_points);

        new_scan.spectrum_type = Some(SpectrumType::Centroided);
        new_scan.mz_range = new_points.mz_range();
        new_scan.tic = new_points.tic();
        new_scan.set_data_points(self.store, &new_points)?;

        self.progress.update(1.0);
        self.new_scan = Some(new_scan);
        Ok(self.new_scan.as_ref())
    }

    fn progress(&self) -> Option<f32> {
        self.progress.fraction()
    }

    fn result(&self) -> Option<&Scan> {
        self.new_scan.as_ref()
    }

    fn cancel_token(&self) -> CancelToken {
        // This method is too fast to be canceled; the flag is accepted but
        // never polled
        self.cancel.clone()
    }
}

impl RecursiveCentroidingMethod<'_> {
    /// Transfer ownership of the centroided scan out of the method.
    pub fn take_result(&mut self) -> Option<Scan> {
        self.new_scan.take()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::spectrum::Polarity;

    const WIDTH_RANGE: (f64, f64) = (0.5, 3.0);
    const NOISE: f32 = 5.0;

    fn profile_scan(store: &DataPointStore, mzs: Vec<f64>, intensities: Vec<f32>) -> Scan {
        let mut scan = Scan::with_id("scan=1");
        scan.scan_number = Some(1);
        scan.polarity = Polarity::Positive;
        scan.spectrum_type = Some(SpectrumType::Profile);
        scan.set_data_points(store, &SpectrumDataPoints::from_buffers(mzs, intensities))
            .unwrap();
        scan
    }

    fn centroid(store: &DataPointStore, scan: &Scan) -> SpectrumDataPoints {
        let mut method = RecursiveCentroidingMethod::new(scan, store, NOISE, WIDTH_RANGE);
        assert_eq!(method.progress(), Some(0.0));
        let result = method.execute().unwrap().expect("method is never canceled");
        assert_eq!(result.spectrum_type, Some(SpectrumType::Centroided));
        assert_eq!(method.progress(), Some(1.0));
        let mut points = SpectrumDataPoints::new();
        method
            .result()
            .expect("result remains available after execute")
            .data_points(store, &mut points)
            .unwrap();
        points
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let store = DataPointStore::new();
        let scan = profile_scan(&store, vec![], vec![]);
        let points = centroid(&store, &scan);
        assert!(points.is_empty());
    }

    #[test]
    fn metadata_is_cloned_and_derived_values_recomputed() {
        let store = DataPointStore::new();
        let scan = profile_scan(
            &store,
            vec![100.0, 100.5, 101.0, 101.5, 102.0],
            vec![0.0, 20.0, 60.0, 20.0, 0.0],
        );
        let mut method = RecursiveCentroidingMethod::new(&scan, &store, NOISE, WIDTH_RANGE);
        let result = method.execute().unwrap().unwrap();
        assert_eq!(result.id, "scan=1");
        assert_eq!(result.polarity, Polarity::Positive);
        assert_eq!(result.tic, 60.0);
        assert_eq!(result.mz_range, Some((101.0, 101.0)));
        // The input scan's own content is untouched
        let mut original = SpectrumDataPoints::new();
        scan.data_points(&store, &mut original).unwrap();
        assert_eq!(original.len(), 5);
    }

    #[test]
    fn single_clean_peak_emits_its_maximum() {
        let store = DataPointStore::new();
        let scan = profile_scan(
            &store,
            vec![100.0, 100.2, 100.4, 100.6, 100.8, 101.0, 101.2, 101.4, 101.6],
            vec![0.0, 2.0, 8.0, 30.0, 70.0, 30.0, 8.0, 2.0, 0.0],
        );
        let points = centroid(&store, &scan);
        assert_eq!(points.mzs(), &[100.8]);
        assert_eq!(points.intensities(), &[70.0]);
    }

    #[test]
    fn oversized_peak_with_valley_splits_into_two() {
        let store = DataPointStore::new();
        // Two maxima joined by a dip above the noise level; the union is
        // wider than the accepted range and splits at the valley
        let scan = profile_scan(
            &store,
            vec![100.0, 101.0, 102.0, 103.0, 104.0, 105.0, 106.0],
            vec![0.0, 10.0, 50.0, 20.0, 80.0, 10.0, 0.0],
        );
        let points = centroid(&store, &scan);
        assert_eq!(points.mzs(), &[102.0, 104.0]);
        assert_eq!(points.intensities(), &[50.0, 80.0]);
    }

    #[test]
    fn points_at_or_below_noise_never_contribute() {
        let store = DataPointStore::new();
        let scan = profile_scan(
            &store,
            vec![100.0, 100.5, 101.0, 101.5, 102.0, 102.5],
            vec![1.0, 5.0, 4.0, 5.0, 2.0, 0.0],
        );
        let points = centroid(&store, &scan);
        assert!(points.is_empty());
    }

    #[test]
    fn unsplittable_over_wide_peak_is_dropped() {
        // A monotone rise-and-fall wider than the accepted range has no
        // internal valley to split at. The algorithm deliberately drops it
        // rather than forcing a split; this has always been its behavior.
        let store = DataPointStore::new();
        let scan = profile_scan(
            &store,
            vec![100.0, 101.0, 102.0, 103.0, 104.0, 105.0, 106.0, 107.0, 108.0],
            vec![0.0, 10.0, 20.0, 30.0, 40.0, 30.0, 20.0, 10.0, 0.0],
        );
        let points = centroid(&store, &scan);
        assert!(points.is_empty());
    }

    #[test]
    fn narrow_peaks_are_dropped() {
        let store = DataPointStore::new();
        // The run above noise spans 0.2 m/z, under the accepted minimum
        let scan = profile_scan(
            &store,
            vec![100.0, 100.1, 100.2, 100.3],
            vec![1.0, 50.0, 40.0, 1.0],
        );
        let points = centroid(&store, &scan);
        assert!(points.is_empty());
    }

    #[test]
    fn nested_valleys_recurse_beyond_one_level() {
        let store = DataPointStore::new();
        // Three maxima with two valleys; the first refinement still spans
        // too wide a range and must recurse again at the deeper valley
        let mzs: Vec<f64> = (0..13).map(|i| 100.0 + i as f64).collect();
        let intensities = vec![
            0.0, 30.0, 90.0, 25.0, 70.0, 20.0, 60.0, 12.0, 8.0, 6.0, 7.0, 6.5, 0.0,
        ];
        let scan = profile_scan(&store, mzs, intensities);
        let points = centroid(&store, &scan);
        // Output stays m/z ascending and one point per resolved sub-peak
        assert!(!points.is_empty());
        let mzs = points.mzs();
        assert!(mzs.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(points
            .intensities()
            .iter()
            .all(|intensity| *intensity > NOISE));
    }

    #[test]
    fn result_is_none_before_execution() {
        let store = DataPointStore::new();
        let scan = profile_scan(&store, vec![], vec![]);
        let method = RecursiveCentroidingMethod::new(&scan, &store, NOISE, WIDTH_RANGE);
        assert!(method.result().is_none());
    }
}
