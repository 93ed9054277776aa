use std::path::{Path, PathBuf};

/// Directory of the renderer project, relative to the solution root.
pub const RENDERER_PROJECT_DIR: &str = "Vulkan-Renderer";
pub const RESOURCE_DIR: &str = "Res";
pub const SHADERS_DIR: &str = "Shaders";
pub const COMPILED_SHADERS_DIR: &str = "CompiledShaders";
pub const TEXTURES_DIR: &str = "Textures";
pub const LIBS_DIR: &str = "Libs";

#[cfg(windows)]
pub const COMPILER_FILE_NAME: &str = "glslc.exe";
#[cfg(not(windows))]
pub const COMPILER_FILE_NAME: &str = "glslc";

pub const OUTPUT_ROOTS: [&str; 2] = ["x64/Debug", "x64/Release"];
pub const SHARED_LIBRARIES: [&str; 2] = ["glfw3.dll", "assimp-vc142-mt.dll"];

/// A runtime library copied verbatim into every output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedLibrary {
    pub source: PathBuf,
    /// File name under each output root.
    pub file_name: String,
}

impl SharedLibrary {
    pub fn new(source: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            file_name: file_name.into(),
        }
    }

    pub fn destination(&self, output_root: &Path) -> PathBuf {
        output_root.join(&self.file_name)
    }
}

/// Every location the cook step reads from or writes to.
///
/// Built once at startup and handed by reference to the compiler and the stager.
/// Nothing mutates it afterwards.
#[derive(Debug, Clone)]
pub struct PathConfiguration {
    pub project_root: PathBuf,
    pub shaders_dir: PathBuf,
    pub compiled_shaders_dir: PathBuf,
    pub textures_dir: PathBuf,
    pub compiler: PathBuf,
    pub output_roots: Vec<PathBuf>,
    pub shared_libraries: Vec<SharedLibrary>,
}

impl PathConfiguration {
    /// The fixed layout of the renderer solution, resolved against `solution_root`.
    pub fn from_solution_root(solution_root: impl AsRef<Path>) -> Self {
        let solution_root = solution_root.as_ref();
        let project_root = solution_root.join(RENDERER_PROJECT_DIR);
        let resources = project_root.join(RESOURCE_DIR);
        let libs = solution_root.join(LIBS_DIR);

        Self {
            shaders_dir: resources.join(SHADERS_DIR),
            compiled_shaders_dir: resources.join(COMPILED_SHADERS_DIR),
            textures_dir: resources.join(TEXTURES_DIR),
            compiler: resources.join(COMPILER_FILE_NAME),
            output_roots: OUTPUT_ROOTS
                .iter()
                .map(|root| solution_root.join(root))
                .collect(),
            shared_libraries: SHARED_LIBRARIES
                .iter()
                .map(|name| SharedLibrary::new(libs.join(name), *name))
                .collect(),
            project_root,
        }
    }

    /// Folders whose direct files end up under `<output root>/Res/<folder name>`.
    pub fn resource_folders(&self) -> [&Path; 2] {
        [&self.compiled_shaders_dir, &self.textures_dir]
    }
}
