use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub mod compiler;
pub mod paths;
pub mod pipeline;
pub mod stager;

pub use compiler::{CompileReport, CompileResult, ShaderCompiler};
pub use paths::{PathConfiguration, SharedLibrary};
pub use pipeline::{Outcome, Pipeline, PipelineState};
pub use stager::{ResourceStager, StagingReport, StagingTask};

/// Regular files directly inside `dir`, sorted by name. Subdirectories are
/// not descended into.
pub fn direct_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        // Follows symlinks, so a linked shader or texture counts as a file.
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(all(test, unix))]
pub(crate) mod test_support {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    // Stand-in for glslc: copies the input to the output, complains on stderr
    // about files named bad*, emits a lone warning byte for warn*, and exits
    // non-zero without any diagnostics for silent*.
    const FAKE_GLSLC: &str = r#"#!/bin/sh
if [ "$2" != "-o" ]; then
    echo "usage: glslc <input> -o <output>" >&2
    exit 2
fi
case "$(basename "$1")" in
    bad*)
        echo "$1:1: error: '' : syntax error" >&2
        exit 1
        ;;
    warn*)
        printf 'w' >&2
        ;;
esac
echo "compiled $1"
cp "$1" "$3"
case "$(basename "$1")" in
    silent*) exit 1 ;;
esac
"#;

    pub fn fake_compiler(dir: &Path) -> PathBuf {
        let path = dir.join("glslc");
        fs::write(&path, FAKE_GLSLC).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }
}
