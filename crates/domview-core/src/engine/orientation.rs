use super::error::EngineError;
use super::session::{Axis, RenderSession};
use crate::core::selection::SelectionExpr;
use crate::core::utils::identifiers::ALPHA_CARBON;
use nalgebra::{Matrix3, Point3};
use tracing::{debug, info, warn};

const FLIP_DEGREES: f64 = 180.0;

/// Mean view-space depth of `points` under `rotation`, or `None` for no points.
///
/// Larger values are closer to the viewer.
pub fn mean_view_depth(rotation: &Matrix3<f64>, points: &[Point3<f64>]) -> Option<f64> {
    if points.is_empty() {
        return None;
    }
    let axis = rotation.row(2).transpose();
    let sum: f64 = points.iter().map(|p| axis.dot(&p.coords)).sum();
    Some(sum / points.len() as f64)
}

/// Whether a half turn about the vertical axis brings `front` in front of `back`.
///
/// # Errors
///
/// Returns [`EngineError::EmptySelection`] if `front` has no points.
pub fn needs_flip(
    rotation: &Matrix3<f64>,
    front: &[Point3<f64>],
    back: &[Point3<f64>],
    front_name: &str,
) -> Result<bool, EngineError> {
    let front_depth = mean_view_depth(rotation, front).ok_or_else(|| EngineError::EmptySelection {
        name: front_name.to_string(),
    })?;
    let Some(back_depth) = mean_view_depth(rotation, back) else {
        warn!("Reference selection is empty; keeping the current view.");
        return Ok(false);
    };
    debug!(
        "Mean view depth: front {:.3}, back {:.3}.",
        front_depth, back_depth
    );
    Ok(front_depth < back_depth)
}

/// Turns the camera so the Cα atoms of `front` face the viewer relative to those of
/// `back`. Returns whether a turn was issued.
///
/// # Errors
///
/// Returns [`EngineError::EmptySelection`] without turning if `front` has no Cα atoms.
pub fn face_viewer<S: RenderSession>(
    session: &mut S,
    front: &SelectionExpr,
    back: &SelectionExpr,
) -> Result<bool, EngineError> {
    let markers = SelectionExpr::atom_names(&[ALPHA_CARBON]);
    let front_points = session.atom_positions(&(front.clone() & markers.clone()))?;
    let back_points = session.atom_positions(&(back.clone() & markers))?;

    let flip = needs_flip(
        &session.view_rotation(),
        &front_points,
        &back_points,
        &front.to_string(),
    )?;
    if flip {
        info!("Domain faces away from the viewer; turning the view by 180 degrees.");
        session.turn(Axis::Y, FLIP_DEGREES)?;
    }
    Ok(flip)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::format::StructureFormat;
    use crate::engine::scripted::PymolScriptSession;
    use std::fmt::Write as _;
    use std::fs;

    fn at_depth(z: f64) -> Point3<f64> {
        Point3::new(1.0, -2.0, z)
    }

    #[test]
    fn front_behind_back_requires_flip() {
        let identity = Matrix3::identity();
        assert!(needs_flip(&identity, &[at_depth(-5.0)], &[at_depth(0.0), at_depth(2.0)], "dom").unwrap());
    }

    #[test]
    fn front_ahead_or_level_needs_no_flip() {
        let identity = Matrix3::identity();
        assert!(!needs_flip(&identity, &[at_depth(3.0)], &[at_depth(0.0)], "dom").unwrap());
        assert!(!needs_flip(&identity, &[at_depth(1.0)], &[at_depth(1.0)], "dom").unwrap());
    }

    #[test]
    fn depth_uses_third_row_of_rotation() {
        // Half turn about y maps z to -z.
        let half_turn = Matrix3::new(-1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, -1.0);
        assert_eq!(mean_view_depth(&half_turn, &[at_depth(4.0), at_depth(2.0)]), Some(-3.0));
        assert!(!needs_flip(&half_turn, &[at_depth(-5.0)], &[at_depth(0.0)], "dom").unwrap());
    }

    #[test]
    fn empty_front_is_an_error() {
        let result = needs_flip(&Matrix3::identity(), &[], &[at_depth(0.0)], "dom");
        assert!(matches!(result, Err(EngineError::EmptySelection { name }) if name == "dom"));
    }

    #[test]
    fn empty_back_keeps_view() {
        assert!(!needs_flip(&Matrix3::identity(), &[at_depth(-1.0)], &[], "dom").unwrap());
    }

    // Chain A Cα atoms at depth `a_depth`, chain B Cα atoms at `b_depth`, one every 3.8 Å along x.
    fn two_chain_session(dir: &tempfile::TempDir, a_depth: f64, b_depth: f64) -> PymolScriptSession {
        let mut text = String::new();
        let mut serial = 0;
        for (chain, z) in [("A", a_depth), ("B", b_depth)] {
            for resi in 1..=5 {
                serial += 1;
                writeln!(
                    text,
                    "ATOM  {:>5}  CA  ALA {}{:>4}    {:>8.3}{:>8.3}{:>8.3}  1.00 20.00           C",
                    serial,
                    chain,
                    resi,
                    3.8 * resi as f64,
                    0.0,
                    z
                )
                .unwrap();
            }
        }
        writeln!(text, "END").unwrap();
        let path = dir.path().join("2two.pdb");
        fs::write(&path, text).unwrap();

        let mut session = PymolScriptSession::new();
        session.load_structure(&path, StructureFormat::Pdb, "2two").unwrap();
        session
    }

    fn turn_count(session: &PymolScriptSession) -> usize {
        session
            .commands()
            .iter()
            .filter(|c| c.as_str() == "turn y, 180")
            .count()
    }

    #[test]
    fn domain_behind_the_structure_is_turned_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = two_chain_session(&dir, -6.0, 6.0);
        let domain = SelectionExpr::chain("A");
        let whole = SelectionExpr::object("2two");

        assert!(face_viewer(&mut session, &domain, &whole).unwrap());
        assert_eq!(turn_count(&session), 1);

        // After the half turn the domain is in front, so asking again changes nothing.
        assert!(!face_viewer(&mut session, &domain, &whole).unwrap());
        assert_eq!(turn_count(&session), 1);
    }

    #[test]
    fn domain_in_front_of_the_structure_is_not_turned() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = two_chain_session(&dir, 6.0, -6.0);
        let flipped = face_viewer(
            &mut session,
            &SelectionExpr::chain("A"),
            &SelectionExpr::object("2two"),
        )
        .unwrap();
        assert!(!flipped);
        assert_eq!(turn_count(&session), 0);
    }

    #[test]
    fn empty_domain_reports_error_and_keeps_view() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = two_chain_session(&dir, -6.0, 6.0);
        let result = face_viewer(
            &mut session,
            &SelectionExpr::chain("Z"),
            &SelectionExpr::object("2two"),
        );
        assert!(matches!(result, Err(EngineError::EmptySelection { .. })));
        assert_eq!(turn_count(&session), 0);
        assert_eq!(session.view_rotation(), Matrix3::identity());
    }
}
