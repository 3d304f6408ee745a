use crate::core::color::ColorValue;
use crate::core::io::format::StructureFormat;
use crate::core::ligands::{self, LigandClass};
use crate::core::models::residue::ResidueNumber;
use crate::core::ranges::{LigandRef, RangeSpec};
use crate::core::selection::SelectionExpr;
use crate::engine::config::RenderConfig;
use crate::engine::error::EngineError;
use crate::engine::orientation;
use crate::engine::progress::{Progress, ProgressReporter, Stage};
use crate::engine::rainbow::{self, ColorAssignment};
use crate::engine::representation::{self, BackboneStats, ContextLevel, RepresentationDecision};
use crate::engine::session::{RenderOption, RenderSession, Representation};
use std::path::PathBuf;
use tracing::{debug, error, info, instrument, warn};

/// Name of the renderer selection holding the domain.
pub const DOMAIN_SELECTION: &str = "dom";
const LIGAND_SHELL_SELECTION: &str = "inter";

const BACKGROUND: &str = "white";
const BASE_COLOR: &str = "grey80";
const LIGAND_CARBON_COLOR: &str = "grey70";
const HIGHLIGHT_COLOR: &str = "red";

/// Everything needed to image one domain.
#[derive(Debug, Clone)]
pub struct DomainRequest {
    /// Domain identifier; prefixes every output file.
    pub uid: String,
    pub structure_path: PathBuf,
    pub format: StructureFormat,
    /// Scene object name, normally the structure code.
    pub object: String,
    pub range: RangeSpec,
    pub ligands: Vec<LigandRef>,
    /// Ranges of other domains of the same assembly, drawn with the domain.
    pub assembly_partners: Vec<RangeSpec>,
}

impl DomainRequest {
    pub fn new(
        uid: impl Into<String>,
        structure_path: impl Into<PathBuf>,
        format: StructureFormat,
        object: impl Into<String>,
        range: RangeSpec,
    ) -> Self {
        Self {
            uid: uid.into(),
            structure_path: structure_path.into(),
            format,
            object: object.into(),
            range,
            ligands: Vec::new(),
            assembly_partners: Vec::new(),
        }
    }

    pub fn with_ligands(mut self, ligands: Vec<LigandRef>) -> Self {
        self.ligands = ligands;
        self
    }

    pub fn with_assembly_partners(mut self, partners: Vec<RangeSpec>) -> Self {
        self.assembly_partners = partners;
        self
    }
}

/// The prepared scene: structure loaded, domain selected and rainbow-colored.
#[derive(Debug, Clone)]
pub struct DomainScene {
    pub uid: String,
    pub object: String,
    pub range: RangeSpec,
    /// The named domain selection.
    pub domain: SelectionExpr,
    pub chains: Vec<String>,
    pub colors: ColorAssignment,
    pub whole_atom_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LigandDescriptor {
    pub chain: String,
    pub residue: ResidueNumber,
    pub residue_name: String,
    pub class: LigandClass,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LigandDepiction {
    pub ligands: Vec<LigandDescriptor>,
    pub spheres: SelectionExpr,
    pub sticks: SelectionExpr,
}

impl LigandDepiction {
    /// All depicted ligands, for inclusion in zoom targets.
    pub fn focus(&self) -> SelectionExpr {
        SelectionExpr::union(self.sticks.clone(), self.spheres.clone())
    }
}

/// Result of rendering one context level.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextOutcome {
    pub level: ContextLevel,
    pub decision: RepresentationDecision,
    pub images: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DomainImages {
    pub images: Vec<PathBuf>,
    pub assembly_file: Option<PathBuf>,
    pub decisions: Vec<(ContextLevel, RepresentationDecision)>,
}

/// The session and settings shared by all stages.
pub struct ImageContext<'a, S: RenderSession> {
    pub session: &'a mut S,
    pub config: &'a RenderConfig,
    pub reporter: &'a ProgressReporter<'a>,
}

impl<'a, S: RenderSession> ImageContext<'a, S> {
    pub fn new(
        session: &'a mut S,
        config: &'a RenderConfig,
        reporter: &'a ProgressReporter<'a>,
    ) -> Self {
        Self {
            session,
            config,
            reporter,
        }
    }

    /// Exports the thumbnail and the full-size image named after `stem`.
    fn export_images(&mut self, stem: &str) -> Result<Vec<PathBuf>, EngineError> {
        let images = self.config.images;
        let thumbnail = self.config.output_dir.join(format!("{}_thumb.png", stem));
        let full = self.config.output_dir.join(format!("{}.png", stem));

        self.session
            .export_png(&thumbnail, images.thumbnail, images.ray)?;
        self.session.export_png(&full, images.full, images.ray)?;

        for path in [&thumbnail, &full] {
            self.reporter.report(Progress::ImageExported { path: path.clone() });
        }
        Ok(vec![thumbnail, full])
    }

    fn decide(
        &mut self,
        level: ContextLevel,
        target: &SelectionExpr,
        whole_atom_count: usize,
    ) -> Result<RepresentationDecision, EngineError> {
        let stats = BackboneStats::collect(&*self.session, target)?;
        let decision = representation::select(
            &stats,
            level,
            whole_atom_count,
            &self.config.thresholds,
        );
        if decision.trace_backbone_only {
            self.session
                .set_option(RenderOption::RibbonTraceAtoms(true))?;
        }
        Ok(decision)
    }
}

#[instrument(skip_all, name = "domain_images_workflow", fields(uid = %request.uid))]
pub fn run<S: RenderSession>(
    session: &mut S,
    request: &DomainRequest,
    config: &RenderConfig,
    reporter: &ProgressReporter,
) -> Result<DomainImages, EngineError> {
    reporter.report(Progress::WorkflowStart {
        total_stages: Stage::COUNT,
    });
    let mut ctx = ImageContext::new(session, config, reporter);

    let scene = prepare_scene(&mut ctx, request)?;
    let ligands = depict_ligands(&mut ctx, &scene, &request.ligands)?;
    let full = render_structure_context(&mut ctx, &scene)?;
    let chain = render_chain_context(&mut ctx, &scene, &ligands, &full)?;
    let (domain, assembly_file) =
        render_domain_context(&mut ctx, &scene, &ligands, &chain, &request.assembly_partners)?;

    let mut images = Vec::new();
    let mut decisions = Vec::new();
    for outcome in [full, chain, domain] {
        decisions.push((outcome.level, outcome.decision));
        images.extend(outcome.images);
    }

    reporter.report(Progress::WorkflowFinish);
    info!(
        "Workflow complete. Exported {} image(s){}.",
        images.len(),
        if assembly_file.is_some() {
            " and assembly coordinates"
        } else {
            ""
        }
    );
    Ok(DomainImages {
        images,
        assembly_file,
        decisions,
    })
}

/// Sets renderer defaults, loads the structure, and selects and colors the domain.
pub fn prepare_scene<S: RenderSession>(
    ctx: &mut ImageContext<S>,
    request: &DomainRequest,
) -> Result<DomainScene, EngineError> {
    ctx.reporter.report(Progress::StageStart {
        stage: Stage::PrepareScene,
    });
    let session = &mut *ctx.session;

    for option in [
        RenderOption::IgnoreCase(false),
        RenderOption::RetainOrder(true),
        RenderOption::CartoonSmoothLoops(false),
        RenderOption::CartoonSideChainHelper(true),
        RenderOption::SphereScale(0.5),
    ] {
        session.set_option(option)?;
    }
    session.set_background(&ColorValue::named(BACKGROUND))?;

    session.load_structure(&request.structure_path, request.format, &request.object)?;
    session.color(&ColorValue::named(BASE_COLOR), &SelectionExpr::All)?;
    session.hide(Representation::Everything, &SelectionExpr::All)?;

    let domain_atoms =
        session.define_selection(DOMAIN_SELECTION, &SelectionExpr::from_segments(&request.range))?;
    if domain_atoms == 0 {
        warn!("Domain range '{}' matches no atoms.", request.range);
    }
    let colors = rainbow::apply(session, &request.range)?;
    let whole_atom_count = session.count_atoms(&SelectionExpr::All)?;

    info!(
        "Scene ready: {} atoms in structure, {} in domain, {} residue(s) colored.",
        whole_atom_count,
        domain_atoms,
        colors.len()
    );
    ctx.reporter.report(Progress::StageFinish);

    Ok(DomainScene {
        uid: request.uid.clone(),
        object: request.object.clone(),
        range: request.range.clone(),
        domain: SelectionExpr::named(DOMAIN_SELECTION),
        chains: request.range.chains(),
        colors,
        whole_atom_count,
    })
}

/// Shows single-atom ligands as spheres with their coordinating side chains, and
/// other ligands as sticks. Carbons are grey, other elements use element colors.
pub fn depict_ligands<S: RenderSession>(
    ctx: &mut ImageContext<S>,
    scene: &DomainScene,
    ligand_refs: &[LigandRef],
) -> Result<LigandDepiction, EngineError> {
    ctx.reporter.report(Progress::StageStart {
        stage: Stage::DepictLigands,
    });
    let session = &mut *ctx.session;

    let mut descriptors = Vec::new();
    let mut sphere_parts = Vec::new();
    let mut stick_parts = Vec::new();
    for ligand in ligand_refs {
        let expr = SelectionExpr::ligand(ligand);
        let Some(residue_name) = session.residue_names(&expr)?.pop() else {
            warn!("Ligand {} not found in the structure; skipping.", ligand);
            continue;
        };
        let class = ligands::classify(&residue_name);
        debug!("Ligand {} ({}) is {}.", ligand, residue_name, class);
        match class {
            LigandClass::Atomic => sphere_parts.push(expr),
            LigandClass::Polyatomic => stick_parts.push(expr),
        }
        descriptors.push(LigandDescriptor {
            chain: ligand.chain.clone(),
            residue: ligand.residue,
            residue_name,
            class,
        });
    }

    let spheres = SelectionExpr::any_of(sphere_parts);
    let sticks = SelectionExpr::any_of(stick_parts);
    let element_colors = ColorValue::ByElement;
    let carbon = SelectionExpr::elements(&["C"]);
    let no_proline = !SelectionExpr::residue_names(&["PRO"]);

    if !spheres.is_none() {
        session.show(Representation::Spheres, &spheres)?;
        session.color(&element_colors, &spheres)?;

        let shell = (!SelectionExpr::atom_names(&["C", "O", "H", "CA", "N"]) & scene.domain.clone())
            .within(ctx.config.ligand_shell_radius, spheres.clone())
            .by_residue();
        let shell_atoms = session.define_selection(LIGAND_SHELL_SELECTION, &shell)?;
        debug!("{} atom(s) coordinate the atomic ligands.", shell_atoms);

        let inter = SelectionExpr::named(LIGAND_SHELL_SELECTION);
        let side_chains = !(SelectionExpr::atom_names(&["C", "O", "H", "CA"])
            | (SelectionExpr::atom_names(&["N"]) & no_proline.clone()));
        session.color(
            &element_colors,
            &(!carbon.clone() & inter.clone() & side_chains.clone()),
        )?;
        session.color(
            &ColorValue::named(LIGAND_CARBON_COLOR),
            &(carbon.clone() & inter.clone() & side_chains),
        )?;
        let shown = inter
            & !(SelectionExpr::atom_names(&["C", "O", "H"])
                | (SelectionExpr::atom_names(&["N"]) & no_proline));
        session.show(Representation::Sticks, &shown)?;
    }

    if !sticks.is_none() {
        session.show(Representation::Sticks, &sticks)?;
        session.color(&element_colors, &(!carbon.clone() & sticks.clone()))?;
        session.color(
            &ColorValue::named(LIGAND_CARBON_COLOR),
            &(carbon & sticks.clone()),
        )?;
    }

    ctx.reporter.report(Progress::StageFinish);
    Ok(LigandDepiction {
        ligands: descriptors,
        spheres,
        sticks,
    })
}

/// Disulfide-bonded cysteines of the domain, reduced to CA, CB and SG.
fn disulfide_sticks(domain: &SelectionExpr) -> SelectionExpr {
    let sulfur = domain.clone()
        & SelectionExpr::residue_names(&["CYS", "CYX"])
        & SelectionExpr::atom_names(&["SG"]);
    (sulfur.clone() & sulfur.bound_to()).by_residue() & SelectionExpr::atom_names(&["CA", "CB", "SG"])
}

/// Renders the whole structure with the domain highlighted.
///
/// Very large structures are drawn as a translucent density surface, turned so the
/// domain faces the viewer.
pub fn render_structure_context<S: RenderSession>(
    ctx: &mut ImageContext<S>,
    scene: &DomainScene,
) -> Result<ContextOutcome, EngineError> {
    ctx.reporter.report(Progress::StageStart {
        stage: Stage::StructureContext,
    });
    let all = SelectionExpr::All;
    let decision = ctx.decide(ContextLevel::Full, &all, scene.whole_atom_count)?;

    let images = if !decision.is_volumetric() {
        let session = &mut *ctx.session;
        session.orient(&all)?;
        session.zoom(&all, true)?;
        session.show(decision.backbone(), &all)?;
        session.show(Representation::Sticks, &disulfide_sticks(&scene.domain))?;
        session.deselect()?;
        ctx.export_images(&format!("{}_pdb", scene.uid))?
    } else {
        info!(
            "Structure has {} atoms; using a volumetric view.",
            scene.whole_atom_count
        );
        let params = ctx.config.volumetric.clone();
        let session = &mut *ctx.session;
        session.orient(&scene.domain)?;
        session.zoom(&all, true)?;
        session.color(&ColorValue::named(HIGHLIGHT_COLOR), &scene.domain)?;

        match orientation::face_viewer(session, &scene.domain, &SelectionExpr::object(&scene.object)) {
            Ok(_) => {}
            Err(EngineError::EmptySelection { name }) => {
                error!("No atoms found in domain selection '{}'; keeping the current view.", name);
            }
            Err(e) => return Err(e),
        }

        let surface = session.volumetric_surface(&scene.object, &params)?;
        session.set_option(RenderOption::Transparency(params.transparency))?;
        let images = ctx.export_images(&format!("{}_pdb", scene.uid))?;

        let session = &mut *ctx.session;
        session.delete(&surface.surface)?;
        rainbow::apply(session, &scene.range)?;
        session.set_option(RenderOption::Transparency(1.0))?;
        images
    };

    ctx.reporter.report(Progress::StageFinish);
    Ok(ContextOutcome {
        level: ContextLevel::Full,
        decision,
        images,
    })
}

/// Renders the chains containing the domain, zoomed to include its ligands.
pub fn render_chain_context<S: RenderSession>(
    ctx: &mut ImageContext<S>,
    scene: &DomainScene,
    ligands: &LigandDepiction,
    previous: &ContextOutcome,
) -> Result<ContextOutcome, EngineError> {
    ctx.reporter.report(Progress::StageStart {
        stage: Stage::ChainContext,
    });
    ctx.session
        .hide(previous.decision.backbone(), &SelectionExpr::All)?;
    ctx.session
        .set_option(RenderOption::RibbonTraceAtoms(false))?;

    let chains = SelectionExpr::chains(&scene.chains);
    let decision = ctx.decide(ContextLevel::Chain, &chains, scene.whole_atom_count)?;

    let session = &mut *ctx.session;
    session.show(decision.backbone(), &chains)?;
    session.orient(&chains)?;
    session.zoom(&SelectionExpr::union(chains, ligands.focus()), true)?;
    session.deselect()?;
    let images = ctx.export_images(&format!("{}_chain", scene.uid))?;

    ctx.reporter.report(Progress::StageFinish);
    Ok(ContextOutcome {
        level: ContextLevel::Chain,
        decision,
        images,
    })
}

/// Renders the domain on its own, drawn together with any assembly partners whose
/// coordinates are then saved as `{uid}_assembly.pdb`.
pub fn render_domain_context<S: RenderSession>(
    ctx: &mut ImageContext<S>,
    scene: &DomainScene,
    ligands: &LigandDepiction,
    previous: &ContextOutcome,
    partners: &[RangeSpec],
) -> Result<(ContextOutcome, Option<PathBuf>), EngineError> {
    ctx.reporter.report(Progress::StageStart {
        stage: Stage::DomainContext,
    });
    ctx.session
        .hide(previous.decision.backbone(), &SelectionExpr::All)?;
    ctx.session
        .set_option(RenderOption::RibbonTraceAtoms(false))?;

    let drawn = partners.iter().fold(scene.domain.clone(), |drawn, partner| {
        SelectionExpr::union(drawn, SelectionExpr::from_segments(partner))
    });
    let assembly_file = if partners.is_empty() {
        None
    } else {
        let path = ctx
            .config
            .output_dir
            .join(format!("{}_assembly.pdb", scene.uid));
        let saved = ctx.session.save_coordinates(&path, &drawn)?;
        info!(
            "Saved {} assembly atom(s) to {}.",
            saved,
            path.display()
        );
        Some(path)
    };

    let decision = ctx.decide(ContextLevel::Domain, &drawn, scene.whole_atom_count)?;

    let session = &mut *ctx.session;
    session.show(decision.backbone(), &drawn)?;
    session.orient(&drawn)?;
    session.zoom(&SelectionExpr::union(drawn, ligands.focus()), true)?;
    session.deselect()?;
    let images = ctx.export_images(&scene.uid)?;

    ctx.reporter.report(Progress::StageFinish);
    Ok((
        ContextOutcome {
            level: ContextLevel::Domain,
            decision,
            images,
        },
        assembly_file,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::pdb::PdbFile;
    use crate::core::io::traits::StructureFile;
    use crate::core::ranges::{parse_ligand_spec, parse_range_spec};
    use crate::engine::config::{RenderConfigBuilder, Thresholds};
    use crate::engine::representation::RepresentationMode;
    use crate::engine::scripted::PymolScriptSession;
    use std::fmt::Write as _;
    use std::fs;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn atom_line(serial: usize, name: &str, resn: &str, resi: i32, pos: [f64; 3], element: &str, het: bool) -> String {
        format!(
            "{:<6}{:>5}  {:<3} {:>3} A{:>4}    {:>8.3}{:>8.3}{:>8.3}  1.00 20.00          {:>2}",
            if het { "HETATM" } else { "ATOM" },
            serial,
            name,
            resn,
            resi,
            pos[0],
            pos[1],
            pos[2],
            element
        )
    }

    fn wobble(i: i32) -> (f64, f64) {
        (0.5 * (0.7 * i as f64).sin(), 0.5 * (0.7 * i as f64).cos())
    }

    // A 100-residue chain A along x with a zinc next to the CB of residue 10 and an
    // acetate far from the chain.
    fn write_fixture(dir: &Path) -> PathBuf {
        let mut text = String::new();
        let mut serial = 0;
        for i in 1..=100 {
            let base = 3.8 * i as f64;
            let (wy, wz) = wobble(i);
            for (name, element, dx, dy, dz) in [
                ("N", "N", -1.2, 0.8, 0.0),
                ("CA", "C", 0.0, 0.0, 0.0),
                ("C", "C", 1.2, 0.8, 0.0),
                ("O", "O", 1.2, 2.0, 0.3),
                ("CB", "C", 0.0, -1.0, 1.1),
            ] {
                serial += 1;
                let pos = [base + dx, wy + dy, wz + dz];
                writeln!(text, "{}", atom_line(serial, name, "ALA", i, pos, element, false)).unwrap();
            }
        }
        let (wy, wz) = wobble(10);
        let zinc = [38.0, wy - 3.5, wz + 1.1];
        writeln!(text, "{}", atom_line(serial + 1, "ZN", "ZN", 801, zinc, "ZN", true)).unwrap();
        writeln!(text, "{}", atom_line(serial + 2, "C", "ACT", 802, [50.0, 20.0, 0.0], "C", true)).unwrap();
        writeln!(text, "{}", atom_line(serial + 3, "O", "ACT", 802, [50.0, 21.2, 0.0], "O", true)).unwrap();
        writeln!(text, "END").unwrap();

        let path = dir.join("4hhh.pdb");
        fs::write(&path, text).unwrap();
        path
    }

    fn request(dir: &TempDir, range: &str) -> DomainRequest {
        let path = write_fixture(dir.path());
        DomainRequest::new("e4hhhA1", path, StructureFormat::Pdb, "4hhh", parse_range_spec(range))
    }

    fn config(dir: &TempDir) -> RenderConfig {
        RenderConfigBuilder::new()
            .output_dir(dir.path())
            .build()
            .unwrap()
    }

    fn count_prefixed(session: &PymolScriptSession, prefix: &str) -> usize {
        session
            .commands()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    #[test]
    fn renders_three_context_levels_as_cartoon() {
        let dir = tempfile::tempdir().unwrap();
        let request = request(&dir, "A:1-129");
        let config = config(&dir);
        let mut session = PymolScriptSession::new();

        let result = run(&mut session, &request, &config, &ProgressReporter::new()).unwrap();

        let modes: Vec<_> = result.decisions.iter().map(|(_, d)| d.mode).collect();
        assert_eq!(modes, vec![RepresentationMode::Cartoon; 3]);
        let levels: Vec<_> = result.decisions.iter().map(|(l, _)| *l).collect();
        assert_eq!(
            levels,
            vec![ContextLevel::Full, ContextLevel::Chain, ContextLevel::Domain]
        );

        let names: Vec<String> = result
            .images
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "e4hhhA1_pdb_thumb.png",
                "e4hhhA1_pdb.png",
                "e4hhhA1_chain_thumb.png",
                "e4hhhA1_chain.png",
                "e4hhhA1_thumb.png",
                "e4hhhA1.png",
            ]
        );
        assert!(result.images.iter().all(|p| p.parent() == Some(dir.path())));
        assert_eq!(count_prefixed(&session, "png "), 6);

        assert_eq!(result.assembly_file, None);
        assert!(!dir.path().join("e4hhhA1_assembly.pdb").exists());

        assert_eq!(count_prefixed(&session, "color 0x"), 100);
        let commands = session.commands();
        let position = |line: &str| commands.iter().position(|c| c == line).unwrap();
        assert!(position("bg_color white") < position("color grey80, all"));
        assert!(position("color grey80, all") < position("select dom, c. A & i. 1-129"));
        assert!(position("color 0x0000ff, c. A & i. 1") > position("select dom, c. A & i. 1-129"));
        assert!(commands.contains(&"show cartoon, all".to_string()));
        assert!(commands.contains(&"hide cartoon, all".to_string()));
        assert!(commands.contains(&"show cartoon, c. A".to_string()));
        assert!(commands.contains(&"show cartoon, dom".to_string()));
    }

    #[test]
    fn workflow_reports_every_stage_and_image() {
        let dir = tempfile::tempdir().unwrap();
        let request = request(&dir, "A:1-40");
        let config = config(&dir);
        let mut session = PymolScriptSession::new();

        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            events.lock().unwrap().push(event);
        }));
        run(&mut session, &request, &config, &reporter).unwrap();
        drop(reporter);

        let events = events.into_inner().unwrap();
        assert!(matches!(events.first(), Some(Progress::WorkflowStart { total_stages: 5 })));
        assert!(matches!(events.last(), Some(Progress::WorkflowFinish)));
        let starts = events
            .iter()
            .filter(|e| matches!(e, Progress::StageStart { .. }))
            .count();
        let exported = events
            .iter()
            .filter(|e| matches!(e, Progress::ImageExported { .. }))
            .count();
        assert_eq!(starts, 5);
        assert_eq!(exported, 6);
    }

    #[test]
    fn assembly_partners_are_drawn_and_saved() {
        let dir = tempfile::tempdir().unwrap();
        let request = request(&dir, "A:1-50")
            .with_assembly_partners(vec![parse_range_spec("A:60-80")]);
        let config = config(&dir);
        let mut session = PymolScriptSession::new();

        let result = run(&mut session, &request, &config, &ProgressReporter::new()).unwrap();

        let assembly = dir.path().join("e4hhhA1_assembly.pdb");
        assert_eq!(result.assembly_file.as_deref(), Some(assembly.as_path()));
        let saved = PdbFile::read_from_path(&assembly).unwrap();
        assert_eq!(saved.atom_count(), 71 * 5);
        assert!(session
            .commands()
            .contains(&"show cartoon, dom | (c. A & i. 60-80)".to_string()));
    }

    #[test]
    fn ligands_are_depicted_by_class() {
        let dir = tempfile::tempdir().unwrap();
        let request = request(&dir, "A:1-100")
            .with_ligands(parse_ligand_spec("A:801,A:802,A:900"));
        let config = config(&dir);
        let reporter = ProgressReporter::new();
        let mut session = PymolScriptSession::new();
        let mut ctx = ImageContext::new(&mut session, &config, &reporter);

        let scene = prepare_scene(&mut ctx, &request).unwrap();
        let depiction = depict_ligands(&mut ctx, &scene, &request.ligands).unwrap();

        let classes: Vec<_> = depiction
            .ligands
            .iter()
            .map(|l| (l.residue_name.as_str(), l.class))
            .collect();
        assert_eq!(
            classes,
            vec![("ZN", LigandClass::Atomic), ("ACT", LigandClass::Polyatomic)]
        );
        assert_eq!(depiction.spheres.to_string(), "c. A & i. 801");
        assert_eq!(depiction.sticks.to_string(), "c. A & i. 802");
        assert_eq!(
            depiction.focus().to_string(),
            "(c. A & i. 802) | (c. A & i. 801)"
        );

        // Only residue 10 has a side chain atom within reach of the zinc.
        assert_eq!(
            session
                .count_atoms(&SelectionExpr::named(LIGAND_SHELL_SELECTION))
                .unwrap(),
            5
        );
        let commands = session.commands();
        assert!(commands.contains(&"show spheres, c. A & i. 801".to_string()));
        assert!(commands.contains(&"color atomic, c. A & i. 801".to_string()));
        assert!(commands.contains(&"show sticks, c. A & i. 802".to_string()));
        assert!(commands.contains(&"color grey70, e. C & (c. A & i. 802)".to_string()));
        assert!(commands
            .iter()
            .any(|c| c.starts_with("select inter, byres (")));
    }

    #[test]
    fn very_large_structures_get_a_volumetric_overview() {
        let dir = tempfile::tempdir().unwrap();
        let request = request(&dir, "A:1-8");
        let config = RenderConfigBuilder::new()
            .output_dir(dir.path())
            .thresholds(Thresholds {
                ribbon_atom_limit: 50,
                volumetric_atom_limit: 100,
                min_backbone_ratio: 0.33,
            })
            .build()
            .unwrap();
        let mut session = PymolScriptSession::new();

        let result = run(&mut session, &request, &config, &ProgressReporter::new()).unwrap();

        let modes: Vec<_> = result.decisions.iter().map(|(_, d)| d.mode).collect();
        assert_eq!(
            modes,
            vec![
                RepresentationMode::Volumetric,
                RepresentationMode::Ribbon,
                RepresentationMode::Cartoon,
            ]
        );
        assert_eq!(result.images.len(), 6);

        let commands = session.commands();
        let position = |line: &str| commands.iter().position(|c| c == line).unwrap();
        assert!(position("color red, dom") < position("isosurface surf, map, 1"));
        assert!(position("set transparency, 0.5") < position("delete surf"));
        assert!(position("delete surf") < position("set transparency, 1"));
        assert!(commands.contains(&"hide ribbon, all".to_string()));
        // Rainbow is applied once on setup and again after the surface is removed.
        assert_eq!(count_prefixed(&session, "color 0x"), 16);
    }

    #[test]
    fn empty_domain_keeps_view_and_still_exports() {
        let dir = tempfile::tempdir().unwrap();
        let request = request(&dir, "A:500-600");
        let config = RenderConfigBuilder::new()
            .output_dir(dir.path())
            .thresholds(Thresholds {
                volumetric_atom_limit: 100,
                ..Thresholds::default()
            })
            .build()
            .unwrap();
        let mut session = PymolScriptSession::new();

        let result = run(&mut session, &request, &config, &ProgressReporter::new()).unwrap();

        assert_eq!(result.images.len(), 6);
        assert_eq!(count_prefixed(&session, "turn "), 0);
        assert_eq!(count_prefixed(&session, "color 0x"), 0);
    }
}
