use anyhow::Result;

use crate::compiler::{CompileReport, ShaderCompiler};
use crate::paths::PathConfiguration;
use crate::stager::{ResourceStager, StagingReport};


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Start,
    Compiling,
    Aborted,
    Staging,
    Done,
}

#[derive(Debug)]
pub enum Outcome {
    /// Everything compiled and was staged.
    Staged {
        compile: CompileReport,
        staging: StagingReport,
    },
    /// At least one shader failed; nothing was staged.
    CompileFailed(CompileReport),
}

impl Outcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, Outcome::Staged { .. })
    }
}

/// Compile-then-stage, run once.
///
/// Compiled output is promoted to the output roots only as a whole: a single
/// failed shader stops the run before the stager touches anything.
pub struct Pipeline<'a> {
    config: &'a PathConfiguration,
    state: PipelineState,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a PathConfiguration) -> Self {
        Self {
            config,
            state: PipelineState::Start,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    fn enter(&mut self, next: PipelineState) {
        log::debug!("Pipeline {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    pub fn run(&mut self) -> Result<Outcome> {
        if self.state != PipelineState::Start {
            anyhow::bail!("Pipeline already ran (state {:?})", self.state);
        }

        self.enter(PipelineState::Compiling);
        log::info!("GLSLC SPIR-V compilation started");
        let compile = ShaderCompiler::new(&self.config.compiler)
            .compile_dir(&self.config.shaders_dir, &self.config.compiled_shaders_dir)?;

        if compile.any_failed() {
            self.enter(PipelineState::Aborted);
            log::error!(
                "{} of {} shader(s) failed, skipping staging",
                compile.failures().count(),
                compile.len()
            );
            return Ok(Outcome::CompileFailed(compile));
        }

        self.enter(PipelineState::Staging);
        let staging = ResourceStager::new(self.config).stage()?;
        self.enter(PipelineState::Done);

        log::info!(
            "Compiled {} shader(s), staged {} file(s) into {} output root(s)",
            compile.len(),
            staging.files_copied,
            staging.roots
        );
        Ok(Outcome::Staged { compile, staging })
    }
}
