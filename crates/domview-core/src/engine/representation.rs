use super::config::Thresholds;
use super::session::{Representation, RenderSession, SessionError};
use crate::core::selection::SelectionExpr;
use crate::core::utils::identifiers::{ALPHA_CARBON, BACKBONE_NITROGEN};
use std::fmt;
use tracing::{debug, warn};

/// The three nested contexts a domain is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextLevel {
    /// The whole deposited structure.
    Full,
    /// The chains containing the domain.
    Chain,
    /// The domain itself, plus any assembly partners.
    Domain,
}

impl fmt::Display for ContextLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextLevel::Full => f.write_str("structure"),
            ContextLevel::Chain => f.write_str("chain"),
            ContextLevel::Domain => f.write_str("domain"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepresentationMode {
    Cartoon,
    Ribbon,
    /// Translucent density surface for structures too large for per-atom geometry.
    Volumetric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepresentationDecision {
    pub mode: RepresentationMode,
    /// Ribbons are traced through Cα atoms only.
    pub trace_backbone_only: bool,
}

impl RepresentationDecision {
    /// The backbone representation shown for this decision. Volumetric views only
    /// arise for structures already past the ribbon limit.
    pub fn backbone(&self) -> Representation {
        match self.mode {
            RepresentationMode::Cartoon => Representation::Cartoon,
            RepresentationMode::Ribbon | RepresentationMode::Volumetric => Representation::Ribbon,
        }
    }

    pub fn is_volumetric(&self) -> bool {
        self.mode == RepresentationMode::Volumetric
    }
}

/// Atom population and backbone completeness of one context level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BackboneStats {
    pub atom_count: usize,
    pub ca_count: usize,
    /// Backbone nitrogens covalently bonded to one of the level's Cα atoms.
    pub bonded_n_count: usize,
}

impl BackboneStats {
    /// Bonded N per Cα, or `None` without any Cα.
    pub fn ratio(&self) -> Option<f64> {
        (self.ca_count > 0).then(|| self.bonded_n_count as f64 / self.ca_count as f64)
    }

    pub fn collect<S: RenderSession>(
        session: &S,
        level: &SelectionExpr,
    ) -> Result<Self, SessionError> {
        let ca = level.clone() & SelectionExpr::atom_names(&[ALPHA_CARBON]);
        let bonded_n = SelectionExpr::atom_names(&[BACKBONE_NITROGEN]) & ca.clone().bound_to();
        Ok(Self {
            atom_count: session.count_atoms(level)?,
            ca_count: session.count_atoms(&ca)?,
            bonded_n_count: session.count_atoms(&bonded_n)?,
        })
    }
}

/// Chooses how a context level is drawn.
///
/// Structures lacking most backbone nitrogens (Cα-only models) get a Cα trace ribbon;
/// levels with too many atoms fall back to ribbons, and the whole-structure view of
/// very large structures becomes volumetric.
pub fn select(
    stats: &BackboneStats,
    level: ContextLevel,
    whole_atom_count: usize,
    thresholds: &Thresholds,
) -> RepresentationDecision {
    let mut decision = match stats.ratio() {
        None => {
            warn!("No CA atoms found at the {} level; drawing a traced ribbon.", level);
            RepresentationDecision {
                mode: RepresentationMode::Ribbon,
                trace_backbone_only: true,
            }
        }
        Some(ratio) if ratio < thresholds.min_backbone_ratio => RepresentationDecision {
            mode: RepresentationMode::Ribbon,
            trace_backbone_only: true,
        },
        Some(_) => RepresentationDecision {
            mode: RepresentationMode::Cartoon,
            trace_backbone_only: false,
        },
    };

    if stats.atom_count > thresholds.ribbon_atom_limit {
        decision.mode = RepresentationMode::Ribbon;
    }
    if level == ContextLevel::Full && whole_atom_count > thresholds.volumetric_atom_limit {
        decision.mode = RepresentationMode::Volumetric;
    }

    debug!(
        "Representation at {} level: {:?} (trace only: {}, atoms: {}, CA: {}, bonded N: {}).",
        level,
        decision.mode,
        decision.trace_backbone_only,
        stats.atom_count,
        stats.ca_count,
        stats.bonded_n_count
    );
    decision
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(atom_count: usize, ca_count: usize, bonded_n_count: usize) -> BackboneStats {
        BackboneStats {
            atom_count,
            ca_count,
            bonded_n_count,
        }
    }

    #[test]
    fn sparse_backbone_is_traced_as_ribbon() {
        let decision = select(&stats(500, 100, 20), ContextLevel::Domain, 500, &Thresholds::default());
        assert_eq!(decision.mode, RepresentationMode::Ribbon);
        assert!(decision.trace_backbone_only);
        assert_eq!(decision.backbone(), Representation::Ribbon);
    }

    #[test]
    fn complete_backbone_is_cartoon() {
        let decision = select(&stats(500, 100, 50), ContextLevel::Chain, 500, &Thresholds::default());
        assert_eq!(decision.mode, RepresentationMode::Cartoon);
        assert!(!decision.trace_backbone_only);
        assert_eq!(decision.backbone(), Representation::Cartoon);
    }

    #[test]
    fn large_levels_fall_back_to_ribbon_keeping_trace_flag() {
        let decision = select(
            &stats(150_000, 10_000, 10_000),
            ContextLevel::Chain,
            150_000,
            &Thresholds::default(),
        );
        assert_eq!(decision.mode, RepresentationMode::Ribbon);
        assert!(!decision.trace_backbone_only);
    }

    #[test]
    fn only_the_full_level_becomes_volumetric() {
        let huge = stats(600_000, 40_000, 40_000);
        let full = select(&huge, ContextLevel::Full, 600_000, &Thresholds::default());
        assert_eq!(full.mode, RepresentationMode::Volumetric);
        assert_eq!(full.backbone(), Representation::Ribbon);

        let chain = select(&stats(50_000, 4_000, 4_000), ContextLevel::Chain, 600_000, &Thresholds::default());
        assert_eq!(chain.mode, RepresentationMode::Cartoon);
    }

    #[test]
    fn zero_ca_uses_safe_default() {
        let decision = select(&stats(12, 0, 0), ContextLevel::Domain, 12, &Thresholds::default());
        assert_eq!(decision.mode, RepresentationMode::Ribbon);
        assert!(decision.trace_backbone_only);
        assert_eq!(stats(12, 0, 0).ratio(), None);
    }

    #[test]
    fn thresholds_are_configurable() {
        let strict = Thresholds {
            ribbon_atom_limit: 100,
            volumetric_atom_limit: 200,
            min_backbone_ratio: 0.9,
        };
        let decision = select(&stats(150, 10, 8), ContextLevel::Full, 150, &strict);
        assert_eq!(decision.mode, RepresentationMode::Ribbon);
        assert!(decision.trace_backbone_only);
        let full = select(&stats(250, 10, 10), ContextLevel::Full, 250, &strict);
        assert!(full.is_volumetric());
    }
}
