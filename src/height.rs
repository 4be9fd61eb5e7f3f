use crate::types::Value;

/// Default emboss height for a fully protruding sample, in application units.
pub const DEFAULT_MAX_HEIGHT: Value = 3.0;

/// A pluggable grayscale-to-height policy.
///
/// Maps one normalized grayscale sample (0 = black, 1 = white) to a
/// protrusion height above the base plate. Implementations must be pure:
/// the geometry pipeline may call them once per pixel, in any order,
/// from any thread.
///
/// Any `Fn(Value) -> Value + Send + Sync` closure is a policy, so arbitrary
/// artistic mappings (thresholds, gamma curves) plug in without touching
/// the plate construction:
///
/// ```rust
/// use bevy_relief_wrap::height::HeightPolicy;
///
/// let gamma = |g: f32| 3.0 * g.powf(2.2);
/// assert_eq!(gamma.height(1.0), 3.0);
/// ```
pub trait HeightPolicy: Send + Sync {
    /// Converts one grayscale sample into an emboss height.
    ///
    /// Total over all real inputs; the result is only physically meaningful
    /// for samples in `[0, 1]`.
    fn height(&self, gray: Value) -> Value;
}

impl<F> HeightPolicy for F
where
    F: Fn(Value) -> Value + Send + Sync,
{
    fn height(&self, gray: Value) -> Value {
        self(gray)
    }
}

/// The two built-in emboss profiles.
///
/// Both are linear in the sample value; they differ only in which end of the
/// grayscale range protrudes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EmbossProfile {
    /// `h = max_height - max_height * gray` — dark pixels protrude most.
    ///
    /// Black (`gray = 0`) maps to `max_height`, white (`gray = 1`) to zero.
    Invert {
        /// Height of a pure black sample.
        max_height: Value,
    },
    /// `h = max_height * gray` — light pixels protrude most.
    Direct {
        /// Height of a pure white sample.
        max_height: Value,
    },
}

impl Default for EmbossProfile {
    fn default() -> Self {
        Self::Invert {
            max_height: DEFAULT_MAX_HEIGHT,
        }
    }
}

impl HeightPolicy for EmbossProfile {
    fn height(&self, gray: Value) -> Value {
        match *self {
            Self::Invert { max_height } => max_height - max_height * gray,
            Self::Direct { max_height } => max_height * gray,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invert_profile_endpoints() {
        let profile = EmbossProfile::default();
        assert_eq!(profile.height(0.0), 3.0);
        assert_eq!(profile.height(1.0), 0.0);
        assert_eq!(profile.height(0.5), 1.5);
    }

    #[test]
    fn invert_profile_is_linear() {
        let profile = EmbossProfile::default();
        for (a, b) in [(0.0, 1.0), (0.2, 0.7), (0.9, 0.1)] {
            let lhs = profile.height(a) - profile.height(b);
            let rhs = -3.0 * (a - b);
            assert!((lhs - rhs).abs() < 1e-5);
        }
    }

    #[test]
    fn invert_profile_is_non_increasing() {
        let profile = EmbossProfile::default();
        let mut prev = profile.height(0.0);
        for i in 1..=10 {
            let h = profile.height(i as Value / 10.0);
            assert!(h <= prev);
            prev = h;
        }
    }

    #[test]
    fn direct_profile() {
        let profile = EmbossProfile::Direct { max_height: 3.0 };
        assert_eq!(profile.height(0.0), 0.0);
        assert_eq!(profile.height(1.0), 3.0);
        assert!((profile.height(0.25) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn boxed_policies_plug_in() {
        use crate::types::CompiledHeight;

        let boxed: Box<CompiledHeight> = Box::new(|g| 3.0 - 3.0 * g);
        assert_eq!(boxed.height(0.5), 1.5);
    }

    #[test]
    fn closures_are_policies() {
        let threshold = |g: Value| if g < 0.5 { 3.0 } else { 0.0 };
        assert_eq!(threshold.height(0.2), 3.0);
        assert_eq!(threshold.height(0.8), 0.0);
    }
}
