//! Live square boundary.

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BoundaryError {
    #[error("boundary size must be a finite, non-negative number (got {0})")]
    InvalidSize(f64),
    #[error("boundary center must be finite")]
    InvalidCenter,
}

/// Axis-aligned square centered on `(center_x, center_z)` with side `size`.
///
/// No clamping to configured limits happens here; the scheduler owns that.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Boundary {
    center_x: f64,
    center_z: f64,
    size: f64,
}

impl Boundary {
    pub fn new(center: (f64, f64), size: f64) -> Result<Self, BoundaryError> {
        let mut boundary = Self {
            center_x: 0.0,
            center_z: 0.0,
            size: 0.0,
        };
        boundary.set_center(center.0, center.1)?;
        boundary.set_size(size)?;
        Ok(boundary)
    }

    pub fn set_center(&mut self, x: f64, z: f64) -> Result<(), BoundaryError> {
        if !x.is_finite() || !z.is_finite() {
            return Err(BoundaryError::InvalidCenter);
        }
        self.center_x = x;
        self.center_z = z;
        Ok(())
    }

    pub fn set_size(&mut self, size: f64) -> Result<(), BoundaryError> {
        if !size.is_finite() || size < 0.0 {
            return Err(BoundaryError::InvalidSize(size));
        }
        self.size = size;
        Ok(())
    }

    #[must_use]
    pub fn size(&self) -> f64 {
        self.size
    }

    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (self.center_x, self.center_z)
    }

    #[must_use]
    pub fn half_extent(&self) -> f64 {
        self.size / 2.0
    }

    /// Inclusive on the edge.
    #[must_use]
    pub fn contains(&self, x: f64, z: f64) -> bool {
        let half = self.half_extent();
        (x - self.center_x).abs() <= half && (z - self.center_z).abs() <= half
    }

    /// Pull `(x, z)` one unit inside the edge on each axis independently.
    #[must_use]
    pub fn clamp_inside(&self, x: f64, z: f64) -> (f64, f64) {
        let half = self.half_extent();
        let clamp = |value: f64, center: f64| {
            let low = center - half + 1.0;
            let high = center + half - 1.0;
            low.max(high.min(value))
        };
        (clamp(x, self.center_x), clamp(z, self.center_z))
    }
}
