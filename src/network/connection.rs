//! Tubes between network nodes and the flux feedback that shapes them.
//!
//! A connection behaves like a conductance `D/L` in the flow system. After
//! every pressure solve its flux is recomputed and its conductivity adapts:
//!
//! ```text
//! Q  = D/L * (p_start - p_end)
//! D' = D + w * (f(|Q|) - alpha * D)
//! ```
//!
//! where `f` is one of the three [`FeedbackLaw`]s.

use super::types::NodeId;

/// Default sensitivity exponent `alpha` (decay factor in the update).
pub const DEFAULT_ALPHA: f64 = 1.0;

/// Default saturation constant for [`FeedbackLaw::TypeTwo`].
pub const DEFAULT_SATURATION: f64 = 15.0;

/// Default adaptation weight.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Flux response used to reinforce a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum FeedbackLaw {
    /// `|Q|^mue`
    #[default]
    TypeOne,
    /// `(1 + k)|Q|^mue / (1 + k|Q|^mue)`
    TypeTwo,
    /// `|Q|^mue / (1 + |Q|^mue)`
    TypeThree,
}

impl FeedbackLaw {
    /// Growth term for the given flux.
    ///
    /// Only the magnitude of the flux matters; its sign is a direction.
    /// Every variant yields 0 for zero flux.
    pub fn growth(&self, flux: f64, mue: f64, saturation: f64) -> f64 {
        let q = flux.abs().powf(mue);
        match self {
            FeedbackLaw::TypeOne => q,
            FeedbackLaw::TypeTwo => ((1.0 + saturation) * q) / (1.0 + saturation * q),
            FeedbackLaw::TypeThree => q / (1.0 + q),
        }
    }

    /// Look up a law by its number (1, 2 or 3).
    pub fn from_index(index: u32) -> Option<Self> {
        match index {
            1 => Some(FeedbackLaw::TypeOne),
            2 => Some(FeedbackLaw::TypeTwo),
            3 => Some(FeedbackLaw::TypeThree),
            _ => None,
        }
    }
}

/// An edge between two nodes with length, conductivity and flux.
#[derive(Debug, Clone)]
pub struct Connection {
    /// Optional label (e.g. from a network description)
    pub name: Option<String>,
    start: NodeId,
    end: NodeId,
    length: f64,
    conductivity: f64,
    /// Conductivity before the most recent update
    former_conductivity: f64,
    flux: f64,
    alpha: f64,
    saturation: f64,
    weight: f64,
    law: FeedbackLaw,
}

impl Connection {
    /// Create a connection from `start` to `end`.
    ///
    /// The length must be positive; this is checked when the connection is
    /// handed to a [`Network`](super::Network).
    pub fn new(start: NodeId, end: NodeId, length: f64, conductivity: f64) -> Self {
        Self {
            name: None,
            start,
            end,
            length,
            conductivity,
            former_conductivity: conductivity,
            flux: 0.0,
            alpha: DEFAULT_ALPHA,
            saturation: DEFAULT_SATURATION,
            weight: DEFAULT_WEIGHT,
            law: FeedbackLaw::default(),
        }
    }

    /// Set the feedback law.
    pub fn with_law(mut self, law: FeedbackLaw) -> Self {
        self.law = law;
        self
    }

    /// Set the decay factor `alpha`.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set the saturation constant used by [`FeedbackLaw::TypeTwo`].
    pub fn with_saturation(mut self, saturation: f64) -> Self {
        self.saturation = saturation;
        self
    }

    /// Set the adaptation weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Set a label.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn start(&self) -> NodeId {
        self.start
    }

    pub fn end(&self) -> NodeId {
        self.end
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn conductivity(&self) -> f64 {
        self.conductivity
    }

    pub fn set_conductivity(&mut self, conductivity: f64) {
        self.conductivity = conductivity;
    }

    pub fn former_conductivity(&self) -> f64 {
        self.former_conductivity
    }

    pub fn flux(&self) -> f64 {
        self.flux
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha;
    }

    pub fn saturation(&self) -> f64 {
        self.saturation
    }

    pub fn set_saturation(&mut self, saturation: f64) {
        self.saturation = saturation;
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }

    pub fn law(&self) -> FeedbackLaw {
        self.law
    }

    pub fn set_law(&mut self, law: FeedbackLaw) {
        self.law = law;
    }

    /// Conductivity divided by length, the weight of this connection in the
    /// flow-conservation matrix.
    pub fn dl_fraction(&self) -> f64 {
        self.conductivity / self.length
    }

    /// Recompute the flux from fresh endpoint pressures, then adapt the
    /// conductivity.
    ///
    /// Both pressures must come from the current iteration's solve.
    pub fn update_flux_and_conductivity(
        &mut self,
        start_pressure: f64,
        end_pressure: f64,
        mue: f64,
    ) {
        self.flux = self.dl_fraction() * (start_pressure - end_pressure);

        self.former_conductivity = self.conductivity;
        let growth = self.law.growth(self.flux, mue, self.saturation);
        self.conductivity += self.weight * (growth - self.alpha * self.conductivity);
    }

    /// Conductivity change caused by the most recent update.
    pub fn conductivity_change(&self) -> f64 {
        self.conductivity - self.former_conductivity
    }

    /// True if the most recent update moved the conductivity across
    /// `threshold`, in either direction.
    pub fn score_changed_threshold(&self, threshold: f64) -> bool {
        (self.former_conductivity > threshold && self.conductivity < threshold)
            || (self.former_conductivity < threshold && self.conductivity > threshold)
    }

    /// True if the most recent update took a finite conductivity to
    /// infinity or NaN.
    pub fn became_non_finite(&self) -> bool {
        self.former_conductivity.is_finite() && !self.conductivity.is_finite()
    }

    /// Short description, e.g. `Connection from 1 to 4`.
    pub fn description(&self) -> String {
        format!("Connection from {} to {}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn connection(length: f64, conductivity: f64) -> Connection {
        Connection::new(NodeId(0), NodeId(1), length, conductivity)
    }

    #[test]
    fn test_dl_fraction() {
        let c = connection(2.0, 0.8);
        assert_relative_eq!(c.dl_fraction(), 0.4);
    }

    #[test]
    fn test_zero_flux_gives_zero_growth() {
        for law in [FeedbackLaw::TypeOne, FeedbackLaw::TypeTwo, FeedbackLaw::TypeThree] {
            assert_eq!(law.growth(0.0, 1.2, DEFAULT_SATURATION), 0.0);
        }
    }

    #[test]
    fn test_growth_ignores_flux_sign() {
        for law in [FeedbackLaw::TypeOne, FeedbackLaw::TypeTwo, FeedbackLaw::TypeThree] {
            assert_relative_eq!(law.growth(-0.7, 1.2, 15.0), law.growth(0.7, 1.2, 15.0));
        }
    }

    #[test]
    fn test_saturating_laws() {
        // Type two reaches 1 at unit flux and stays below 1 + 1/k asymptotically
        assert_relative_eq!(FeedbackLaw::TypeTwo.growth(1.0, 1.2, 15.0), 1.0);
        assert!(FeedbackLaw::TypeTwo.growth(1e6, 1.2, 15.0) < 16.0 / 15.0);

        assert_relative_eq!(FeedbackLaw::TypeThree.growth(1.0, 1.2, 15.0), 0.5);
        assert!(FeedbackLaw::TypeThree.growth(1e6, 1.2, 15.0) < 1.0);
    }

    #[test]
    fn test_update_with_zero_flux_decays() {
        let mut c = connection(1.0, 0.8).with_alpha(0.5).with_weight(0.5);
        c.update_flux_and_conductivity(3.0, 3.0, 1.2);

        assert_eq!(c.flux(), 0.0);
        // D + w * (0 - alpha * D) = 0.8 - 0.5 * 0.4
        assert_relative_eq!(c.conductivity(), 0.6);
        assert_relative_eq!(c.conductivity_change(), -0.2);
    }

    #[test]
    fn test_update_type_one() {
        let mut c = connection(2.0, 0.8);
        c.update_flux_and_conductivity(0.0, -2.5, 1.2);

        // Q = 0.4 * 2.5 = 1, f = 1, D = 0.8 + (1 - 0.8)
        assert_relative_eq!(c.flux(), 1.0);
        assert_relative_eq!(c.conductivity(), 1.0);
        assert_relative_eq!(c.former_conductivity(), 0.8);
    }

    #[test]
    fn test_threshold_crossing() {
        let mut c = connection(1.0, 0.002);
        c.update_flux_and_conductivity(0.0, 0.0, 1.2);
        assert_eq!(c.conductivity(), 0.0);
        assert!(c.score_changed_threshold(0.001));
        assert!(!c.score_changed_threshold(0.01));

        // Former 0.0, current 0.0: nothing crossed
        c.update_flux_and_conductivity(0.0, 0.0, 1.2);
        assert!(!c.score_changed_threshold(0.001));
    }

    #[test]
    fn test_overflow_reported_once() {
        let mut c = connection(1.0, 1e300);
        c.update_flux_and_conductivity(0.0, -1e300, 1.2);
        assert!(c.conductivity().is_infinite());
        assert!(c.became_non_finite());

        c.update_flux_and_conductivity(0.0, -1.0, 1.2);
        assert!(!c.conductivity().is_finite());
        assert!(!c.became_non_finite());
    }

    #[test]
    fn test_law_from_index() {
        assert_eq!(FeedbackLaw::from_index(2), Some(FeedbackLaw::TypeTwo));
        assert_eq!(FeedbackLaw::from_index(4), None);
    }
}
