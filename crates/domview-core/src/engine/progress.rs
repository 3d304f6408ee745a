use std::fmt;
use std::path::PathBuf;

/// The stages of the domain imaging workflow, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    PrepareScene,
    DepictLigands,
    StructureContext,
    ChainContext,
    DomainContext,
}

impl Stage {
    pub const COUNT: u64 = 5;
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::PrepareScene => "Preparing scene",
            Stage::DepictLigands => "Depicting ligands",
            Stage::StructureContext => "Rendering structure context",
            Stage::ChainContext => "Rendering chain context",
            Stage::DomainContext => "Rendering domain context",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub enum Progress {
    WorkflowStart { total_stages: u64 },
    StageStart { stage: Stage },
    StageFinish,
    ImageExported { path: PathBuf },
    WorkflowFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}
