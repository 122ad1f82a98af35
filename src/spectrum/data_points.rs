//! Paired numeric buffers underlying spectra, chromatograms, and feature
//! tables. Each list keeps its buffers equal in length; spectra additionally
//! keep m/z sorted ascending, which the derived-value helpers rely on.

/// An ordered list of (m/z, intensity) data points backing one mass spectrum.
///
/// The m/z buffer is non-decreasing. All copies are deep: the list owns its
/// buffers outright and [`SpectrumDataPoints::copy_from`] duplicates content
/// rather than aliasing it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpectrumDataPoints {
    mz: Vec<f64>,
    intensity: Vec<f32>,
}

impl SpectrumDataPoints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            mz: Vec::with_capacity(capacity),
            intensity: Vec::with_capacity(capacity),
        }
    }

    /// Build a list from already-matched buffers.
    ///
    /// Panics if the buffers differ in length, which is an invariant
    /// violation in the caller.
    pub fn from_buffers(mz: Vec<f64>, intensity: Vec<f32>) -> Self {
        assert_eq!(
            mz.len(),
            intensity.len(),
            "m/z and intensity buffers must be the same length"
        );
        Self { mz, intensity }
    }

    pub fn len(&self) -> usize {
        self.mz.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mz.is_empty()
    }

    pub fn add(&mut self, mz: f64, intensity: f32) {
        self.mz.push(mz);
        self.intensity.push(intensity);
    }

    pub fn clear(&mut self) {
        self.mz.clear();
        self.intensity.clear();
    }

    /// Replace this list's content with a deep copy of `other`.
    pub fn copy_from(&mut self, other: &SpectrumDataPoints) {
        self.mz.clear();
        self.mz.extend_from_slice(&other.mz);
        self.intensity.clear();
        self.intensity.extend_from_slice(&other.intensity);
    }

    pub fn mzs(&self) -> &[f64] {
        &self.mz
    }

    pub fn intensities(&self) -> &[f32] {
        &self.intensity
    }

    /// The (lowest, highest) m/z of the list, or `None` when empty. Relies
    /// on the ascending m/z invariant.
    pub fn mz_range(&self) -> Option<(f64, f64)> {
        match (self.mz.first(), self.mz.last()) {
            (Some(first), Some(last)) => Some((*first, *last)),
            _ => None,
        }
    }

    /// The total ion current, the sum of all intensity values.
    pub fn tic(&self) -> f32 {
        self.intensity.iter().sum()
    }

    /// The highest intensity value, or 0 for an empty list.
    pub fn max_intensity(&self) -> f32 {
        match self.base_peak_index() {
            Some(index) => self.intensity[index],
            None => 0.0,
        }
    }

    /// The index of the highest intensity value, or `None` when empty.
    pub fn base_peak_index(&self) -> Option<usize> {
        let mut top: Option<usize> = None;
        for (index, intensity) in self.intensity.iter().enumerate() {
            match top {
                Some(best) if self.intensity[best] >= *intensity => {}
                _ => top = Some(index),
            }
        }
        top
    }

    /// The index of the highest intensity value whose m/z falls inside the
    /// inclusive window, or `None` if no point does.
    pub fn base_peak_index_within(&self, mz_range: (f64, f64)) -> Option<usize> {
        let mut top: Option<usize> = None;
        for (index, mz) in self.mz.iter().enumerate() {
            if *mz < mz_range.0 || *mz > mz_range.1 {
                continue;
            }
            match top {
                Some(best) if self.intensity[best] >= self.intensity[index] => {}
                _ => top = Some(index),
            }
        }
        top
    }
}

/// An ordered list of (retention time, intensity) data points backing one
/// chromatogram. Retention times are in seconds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChromatogramDataPoints {
    retention_time: Vec<f32>,
    intensity: Vec<f32>,
}

impl ChromatogramDataPoints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.retention_time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.retention_time.is_empty()
    }

    pub fn add(&mut self, retention_time: f32, intensity: f32) {
        self.retention_time.push(retention_time);
        self.intensity.push(intensity);
    }

    pub fn clear(&mut self) {
        self.retention_time.clear();
        self.intensity.clear();
    }

    pub fn copy_from(&mut self, other: &ChromatogramDataPoints) {
        self.retention_time.clear();
        self.retention_time.extend_from_slice(&other.retention_time);
        self.intensity.clear();
        self.intensity.extend_from_slice(&other.intensity);
    }

    pub fn retention_times(&self) -> &[f32] {
        &self.retention_time
    }

    pub fn intensities(&self) -> &[f32] {
        &self.intensity
    }
}

/// One feature-table row set: (retention time, m/z, intensity) triples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureDataPoints {
    retention_time: Vec<f32>,
    mz: Vec<f64>,
    intensity: Vec<f32>,
}

impl FeatureDataPoints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.retention_time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.retention_time.is_empty()
    }

    pub fn add(&mut self, retention_time: f32, mz: f64, intensity: f32) {
        self.retention_time.push(retention_time);
        self.mz.push(mz);
        self.intensity.push(intensity);
    }

    pub fn clear(&mut self) {
        self.retention_time.clear();
        self.mz.clear();
        self.intensity.clear();
    }

    pub fn copy_from(&mut self, other: &FeatureDataPoints) {
        self.retention_time.clear();
        self.retention_time.extend_from_slice(&other.retention_time);
        self.mz.clear();
        self.mz.extend_from_slice(&other.mz);
        self.intensity.clear();
        self.intensity.extend_from_slice(&other.intensity);
    }

    pub fn retention_times(&self) -> &[f32] {
        &self.retention_time
    }

    pub fn mzs(&self) -> &[f64] {
        &self.mz
    }

    pub fn intensities(&self) -> &[f32] {
        &self.intensity
    }
}
