use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use anyhow::{Context, Result};

use crate::direct_files;

pub const SPIRV_EXTENSION: &str = "spv";

/// Everything a finished child process left behind.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub exit_ok: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Runs `program` to completion with both output streams captured.
///
/// `Command::output` waits for the child and reaps it before returning, so no
/// handle outlives this call whether it succeeds or fails.
pub fn run_captured<I, S>(program: &Path, args: I) -> io::Result<CommandOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = Command::new(program).args(args).output()?;

    Ok(CommandOutput {
        exit_ok: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

#[derive(Debug, Clone)]
pub struct CompileResult {
    pub source: PathBuf,
    pub output: PathBuf,
    pub succeeded: bool,
    pub exit_ok: bool,
    pub stdout: String,
    /// Whatever the compiler wrote to stderr, or the reason it could not run.
    pub diagnostics: String,
}

impl CompileResult {
    fn from_output(source: PathBuf, output: PathBuf, command: CommandOutput) -> Self {
        // Only stderr decides. A single byte counts, warnings included; the
        // exit status is recorded but does not fail the file.
        let succeeded = command.stderr.is_empty();
        Self {
            source,
            output,
            succeeded,
            exit_ok: command.exit_ok,
            stdout: command.stdout,
            diagnostics: command.stderr,
        }
    }

    fn not_started(source: PathBuf, output: PathBuf, reason: String) -> Self {
        Self {
            source,
            output,
            succeeded: false,
            exit_ok: false,
            stdout: String::new(),
            diagnostics: reason,
        }
    }
}

#[derive(Debug, Default)]
pub struct CompileReport {
    pub results: Vec<CompileResult>,
}

impl CompileReport {
    pub fn any_failed(&self) -> bool {
        self.results.iter().any(|result| !result.succeeded)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CompileResult> {
        self.results.iter().filter(|result| !result.succeeded)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Drives an external `glslc`-compatible compiler, one process per shader.
#[derive(Debug, Clone)]
pub struct ShaderCompiler {
    compiler: PathBuf,
}

impl ShaderCompiler {
    pub fn new(compiler: impl Into<PathBuf>) -> Self {
        Self {
            compiler: compiler.into(),
        }
    }

    /// `<output_dir>/<file name>.spv`, keeping the source extension.
    pub fn output_path(source: &Path, output_dir: &Path) -> Option<PathBuf> {
        let mut name = source.file_name()?.to_os_string();
        name.push(".");
        name.push(SPIRV_EXTENSION);
        Some(output_dir.join(name))
    }

    /// Compiles every file directly inside `source_dir` into `output_dir`.
    ///
    /// Per-file failures are recorded in the report and never stop the loop.
    /// Only an unreadable source directory or an output directory that cannot
    /// be created is an error.
    pub fn compile_dir(&self, source_dir: &Path, output_dir: &Path) -> Result<CompileReport> {
        let sources = direct_files(source_dir)
            .with_context(|| format!("Failed to enumerate shader sources in {}", source_dir.display()))?;

        fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create shader output directory {}", output_dir.display()))?;

        log::info!(
            "Compiling {} shader(s) from {} with {}",
            sources.len(),
            source_dir.display(),
            self.compiler.display()
        );

        let mut report = CompileReport::default();
        for source in sources {
            report.results.push(self.compile_file(&source, output_dir));
        }
        Ok(report)
    }

    pub fn compile_file(&self, source: &Path, output_dir: &Path) -> CompileResult {
        let Some(output) = Self::output_path(source, output_dir) else {
            let reason = format!("{} does not name a file", source.display());
            log::error!("{}", reason);
            return CompileResult::not_started(source.to_path_buf(), output_dir.to_path_buf(), reason);
        };

        log::info!("{} -> {}", source.display(), output.display());

        let args = [source.as_os_str(), OsStr::new("-o"), output.as_os_str()];
        match run_captured(&self.compiler, args) {
            Ok(command) => {
                echo_output(&command);
                let result = CompileResult::from_output(source.to_path_buf(), output, command);
                if !result.succeeded {
                    log::error!("Shader failed: {}", source.display());
                }
                result
            }
            Err(err) => {
                let reason = format!(
                    "Failed to execute {} {} -o {}: {}",
                    self.compiler.display(),
                    source.display(),
                    output.display(),
                    err
                );
                log::error!("{}", reason);
                CompileResult::not_started(source.to_path_buf(), output, reason)
            }
        }
    }
}

fn echo_output(command: &CommandOutput) {
    for line in command.stdout.lines().filter(|line| !line.trim().is_empty()) {
        log::info!("glslc: {}", line);
    }
    for line in command.stderr.lines().filter(|line| !line.trim().is_empty()) {
        log::error!("glslc: {}", line);
    }
    if !command.exit_ok {
        log::warn!("glslc exited with a failure status");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use serial_test::serial;

    #[test]
    fn test_output_path_keeps_source_extension() {
        let output = ShaderCompiler::output_path(Path::new("Res/Shaders/basic.vert"), Path::new("out"));
        assert_eq!(output, Some(PathBuf::from("out/basic.vert.spv")));
        assert_eq!(ShaderCompiler::output_path(Path::new(".."), Path::new("out")), None);
    }

    #[test]
    fn test_report_aggregates_failures() {
        let ok = CompileResult::from_output(
            "a.vert".into(),
            "a.vert.spv".into(),
            CommandOutput { exit_ok: true, ..Default::default() },
        );
        let mut report = CompileReport { results: vec![ok] };
        assert!(!report.any_failed());

        let warned = CompileResult::from_output(
            "b.frag".into(),
            "b.frag.spv".into(),
            CommandOutput { exit_ok: true, stdout: String::new(), stderr: "w".into() },
        );
        assert!(!warned.succeeded, "a single diagnostic byte should fail the shader");
        report.results.push(warned);

        assert!(report.any_failed());
        assert_eq!(report.failures().count(), 1);
        assert_eq!(report.len(), 2);
    }

    #[test]
    #[serial]
    fn test_missing_compiler_fails_every_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("Shaders/a.vert").write_str("void main() {}").unwrap();
        temp.child("Shaders/b.frag").write_str("void main() {}").unwrap();
        let out = temp.child("CompiledShaders");

        let compiler = ShaderCompiler::new(temp.path().join("missing-glslc"));
        let report = compiler.compile_dir(&temp.path().join("Shaders"), out.path()).unwrap();

        assert_eq!(report.len(), 2);
        assert_eq!(report.failures().count(), 2);
        assert!(report.results.iter().all(|r| r.diagnostics.contains("Failed to execute")));
        assert!(out.path().is_dir(), "output directory is created before compiling");
    }

    #[test]
    fn test_missing_source_dir_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let compiler = ShaderCompiler::new("glslc");
        let result = compiler.compile_dir(&temp.path().join("nope"), &temp.path().join("out"));

        assert!(result.is_err());
        assert!(format!("{:#}", result.unwrap_err()).contains("Failed to enumerate shader sources"));
    }

    #[cfg(unix)]
    #[test]
    #[serial]
    fn test_compiles_direct_files_only() {
        let temp = assert_fs::TempDir::new().unwrap();
        let glslc = crate::test_support::fake_compiler(temp.path());
        temp.child("Shaders/a.vert").write_str("vert").unwrap();
        temp.child("Shaders/b.frag").write_str("frag").unwrap();
        temp.child("Shaders/nested/c.comp").write_str("comp").unwrap();
        let out = temp.child("Compiled");

        let report = ShaderCompiler::new(glslc)
            .compile_dir(&temp.path().join("Shaders"), out.path())
            .unwrap();

        assert!(!report.any_failed());
        let names: Vec<_> = report
            .results
            .iter()
            .map(|r| r.output.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.vert.spv", "b.frag.spv"]);
        assert_eq!(std::fs::read_to_string(out.path().join("a.vert.spv")).unwrap(), "vert");
        assert!(report.results[0].stdout.contains("compiled"));
        assert!(!out.path().join("c.comp.spv").exists());
    }

    #[cfg(unix)]
    #[test]
    #[serial]
    fn test_diagnostics_mark_file_failed() {
        let temp = assert_fs::TempDir::new().unwrap();
        let glslc = crate::test_support::fake_compiler(temp.path());
        temp.child("Shaders/bad.vert").write_str("vert").unwrap();
        temp.child("Shaders/good.frag").write_str("frag").unwrap();
        temp.child("Shaders/warn.comp").write_str("comp").unwrap();
        let out = temp.child("Compiled");

        let report = ShaderCompiler::new(glslc)
            .compile_dir(&temp.path().join("Shaders"), out.path())
            .unwrap();

        assert!(report.any_failed());
        let failed: Vec<_> = report
            .failures()
            .map(|r| r.source.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(failed, vec!["bad.vert", "warn.comp"]);
        assert!(report.results[0].diagnostics.contains("error"));
        assert!(out.path().join("good.frag.spv").exists());
        assert!(!out.path().join("bad.vert.spv").exists());
    }

    #[cfg(unix)]
    #[test]
    #[serial]
    fn test_failing_exit_status_without_diagnostics_succeeds() {
        let temp = assert_fs::TempDir::new().unwrap();
        let glslc = crate::test_support::fake_compiler(temp.path());
        temp.child("Shaders/silent.vert").write_str("vert").unwrap();
        let out = temp.child("Compiled");

        let report = ShaderCompiler::new(glslc)
            .compile_dir(&temp.path().join("Shaders"), out.path())
            .unwrap();

        let result = &report.results[0];
        assert!(!result.exit_ok);
        assert!(result.diagnostics.is_empty());
        assert!(result.succeeded, "only stderr output fails a shader");
        assert!(!report.any_failed());
        assert!(out.path().join("silent.vert.spv").exists());
    }

    #[cfg(unix)]
    #[test]
    #[serial]
    fn test_paths_with_spaces_reach_compiler_intact() {
        let temp = assert_fs::TempDir::new().unwrap();
        let glslc = crate::test_support::fake_compiler(temp.path());
        temp.child("My Shaders/sky box.frag").write_str("frag").unwrap();
        let out = temp.child("Compiled Output");

        let report = ShaderCompiler::new(glslc)
            .compile_dir(&temp.path().join("My Shaders"), out.path())
            .unwrap();

        assert!(!report.any_failed(), "{:?}", report.results);
        assert!(out.path().join("sky box.frag.spv").exists());
    }
}
