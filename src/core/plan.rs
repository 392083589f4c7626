//! Build plan generation
//!
//! Turns a resolved [`Configuration`] plus enumerated source files into an
//! ordered, dependency-annotated set of build steps: one compile step per
//! source file, one cumulative archive step, one link step, a size step,
//! and an optional upload step. Any recipe expansion failure aborts the
//! whole plan; callers never see a partial plan.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use super::configuration::Configuration;
use super::expand::RecipeExpander;
use super::properties::PropertyTree;
use crate::error::PlanError;

/// Archive file name for the non-project object group
pub const ARCHIVE_NAME: &str = "core.a";

/// Source language, selected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLanguage {
    C,
    Cpp,
    Assembly,
}

impl SourceLanguage {
    /// Classify a path by extension, or none for non-source files
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "c" => Some(Self::C),
            "cpp" | "cc" | "cxx" => Some(Self::Cpp),
            "S" | "s" | "asm" => Some(Self::Assembly),
            _ => None,
        }
    }

    /// The recipe property that compiles this language
    pub fn recipe_key(self) -> &'static str {
        match self {
            Self::C => "recipe.c.o.pattern",
            Self::Cpp => "recipe.cpp.o.pattern",
            Self::Assembly => "recipe.S.o.pattern",
        }
    }
}

/// Which object group a compile step's output belongs to.
///
/// Project objects link directly; archive objects (libraries and the
/// platform core) go through the static archive first. The separation is
/// what makes incremental relinking correct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectGroup {
    Project,
    Archive,
}

/// One compile step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileStep {
    /// Input source path
    pub source: PathBuf,
    /// Output object path, collision-free across the whole plan
    pub object: PathBuf,
    /// Generated dependency list the build runner re-reads
    pub dep_file: PathBuf,
    /// Toolchain binary the expanded command invokes
    pub tool: Option<String>,
    /// Fully expanded command line
    pub command: String,
    /// Object group of the output
    pub group: ObjectGroup,
}

/// The cumulative archive step: one archiver invocation per object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveStep {
    /// Archive output path
    pub archive: PathBuf,
    /// Objects going into the archive, in command order
    pub objects: Vec<PathBuf>,
    /// One expanded archiver command per object
    pub commands: Vec<String>,
}

/// The link step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkStep {
    /// Linked artifact path
    pub output: PathBuf,
    /// Toolchain binary the expanded command invokes
    pub tool: Option<String>,
    /// Fully expanded command line
    pub command: String,
}

/// The complete, ordered build plan for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    /// Project name; names the linked artifact
    pub project_name: String,
    /// Build output directory
    pub build_dir: PathBuf,
    /// Compile steps, project sources first, then archive-group sources
    pub compile_steps: Vec<CompileStep>,
    /// Archive step
    pub archive: ArchiveStep,
    /// Link step
    pub link: LinkStep,
    /// Size-reporting command; diagnostic only, failure is non-fatal
    pub size_command: Option<String>,
    /// Upload command; optional terminal step
    pub upload_command: Option<String>,
}

impl BuildPlan {
    /// Objects of one group, in step order
    pub fn objects(&self, group: ObjectGroup) -> Vec<&PathBuf> {
        self.compile_steps
            .iter()
            .filter(|step| step.group == group)
            .map(|step| &step.object)
            .collect()
    }
}

/// Enumerated inputs to plan generation. Enumeration itself is the
/// filesystem collaborator's job; the generator never touches disk.
#[derive(Debug, Clone, Default)]
pub struct SourceSet {
    /// The project's own sources
    pub project: Vec<PathBuf>,
    /// Per-library sources: (library name, sources)
    pub libraries: Vec<(String, Vec<PathBuf>)>,
    /// Platform core sources
    pub core: Vec<PathBuf>,
}

/// Generates a [`BuildPlan`] from a configuration and a source set.
#[derive(Debug)]
pub struct BuildPlanGenerator<'a> {
    config: &'a Configuration,
    project_dir: &'a Path,
    build_dir: PathBuf,
}

impl<'a> BuildPlanGenerator<'a> {
    /// Create a generator writing object paths under `build_dir`
    pub fn new(config: &'a Configuration, project_dir: &'a Path, build_dir: PathBuf) -> Self {
        Self {
            config,
            project_dir,
            build_dir,
        }
    }

    /// Generate the full plan, or fail naming the offending file and
    /// recipe. Identical inputs always produce an identical plan.
    pub fn generate(&self, sources: &SourceSet) -> Result<BuildPlan, PlanError> {
        let includes = self.include_flags();
        let project_name = self
            .config
            .effective()
            .get("build.project_name")
            .unwrap_or("out")
            .to_string();

        let mut compile_steps = Vec::new();
        for source in sorted(&sources.project) {
            compile_steps.push(self.compile_step(
                &source,
                "sketch",
                ObjectGroup::Project,
                &includes,
            )?);
        }
        for source in sorted(&sources.core) {
            compile_steps.push(self.compile_step(&source, "core", ObjectGroup::Archive, &includes)?);
        }
        let mut libraries: Vec<&(String, Vec<PathBuf>)> = sources.libraries.iter().collect();
        libraries.sort_by(|a, b| a.0.cmp(&b.0));
        for (name, library_sources) in libraries {
            let subdir = format!("libraries/{name}");
            for source in sorted(library_sources) {
                compile_steps.push(self.compile_step(
                    &source,
                    &subdir,
                    ObjectGroup::Archive,
                    &includes,
                )?);
            }
        }

        let archive = self.archive_step(&compile_steps)?;
        let link = self.link_step(&compile_steps, &archive, &project_name)?;
        let size_command = self.optional_command("recipe.size.pattern", &link.output)?;
        let upload_command = self.optional_command("recipe.upload.pattern", &link.output)?;

        Ok(BuildPlan {
            project_name,
            build_dir: self.build_dir.clone(),
            compile_steps,
            archive,
            link,
            size_command,
            upload_command,
        })
    }

    /// Include flags for the project root plus every resolved library's
    /// header directories.
    fn include_flags(&self) -> String {
        let mut flags = vec![format!("-I{}", self.project_dir.display())];
        for resolved in self.config.libraries().values() {
            for dir in &resolved.library.header_dirs {
                flags.push(format!("-I{}", dir.display()));
            }
        }
        flags.join(" ")
    }

    fn compile_step(
        &self,
        source: &Path,
        subdir: &str,
        group: ObjectGroup,
        includes: &str,
    ) -> Result<CompileStep, PlanError> {
        let language = SourceLanguage::from_path(source).ok_or_else(|| {
            PlanError::NoRecipeForExtension {
                file: source.display().to_string(),
                extension: source
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("")
                    .to_string(),
            }
        })?;

        let object = self.object_path(source, subdir);
        let dep_file = object.with_extension("d");

        let mut step_vars = PropertyTree::new();
        step_vars.set("source_file", &source.display().to_string());
        step_vars.set("object_file", &object.display().to_string());
        step_vars.set("includes", includes);
        let command = self.expand_recipe(language.recipe_key(), source, &step_vars)?;

        Ok(CompileStep {
            source: source.to_path_buf(),
            tool: command_tool(&command),
            object,
            dep_file,
            command,
            group,
        })
    }

    fn archive_step(&self, compile_steps: &[CompileStep]) -> Result<ArchiveStep, PlanError> {
        let archive = self.build_dir.join(ARCHIVE_NAME);
        let mut objects = Vec::new();
        let mut commands = Vec::new();
        for step in compile_steps
            .iter()
            .filter(|step| step.group == ObjectGroup::Archive)
        {
            let mut step_vars = PropertyTree::new();
            step_vars.set("archive_file", ARCHIVE_NAME);
            step_vars.set("archive_file_path", &archive.display().to_string());
            step_vars.set("object_file", &step.object.display().to_string());
            commands.push(self.expand_recipe("recipe.ar.pattern", &step.object, &step_vars)?);
            objects.push(step.object.clone());
        }
        Ok(ArchiveStep {
            archive,
            objects,
            commands,
        })
    }

    fn link_step(
        &self,
        compile_steps: &[CompileStep],
        archive: &ArchiveStep,
        project_name: &str,
    ) -> Result<LinkStep, PlanError> {
        let output = self.build_dir.join(format!("{project_name}.elf"));
        let object_files = compile_steps
            .iter()
            .filter(|step| step.group == ObjectGroup::Project)
            .map(|step| step.object.display().to_string())
            .collect::<Vec<_>>()
            .join(" ");

        let mut step_vars = PropertyTree::new();
        step_vars.set("object_files", &object_files);
        step_vars.set("archive_file", ARCHIVE_NAME);
        step_vars.set("archive_file_path", &archive.archive.display().to_string());
        let command = self.expand_recipe("recipe.c.combine.pattern", &output, &step_vars)?;

        Ok(LinkStep {
            output,
            tool: command_tool(&command),
            command,
        })
    }

    /// Expand an optional terminal recipe; a missing pattern skips the
    /// step rather than failing the plan.
    fn optional_command(
        &self,
        recipe: &str,
        artifact: &Path,
    ) -> Result<Option<String>, PlanError> {
        if !self.config.effective().contains_key(recipe) {
            return Ok(None);
        }
        let step_vars = PropertyTree::new();
        self.expand_recipe(recipe, artifact, &step_vars).map(Some)
    }

    fn expand_recipe(
        &self,
        recipe: &str,
        file: &Path,
        step_vars: &PropertyTree,
    ) -> Result<String, PlanError> {
        let tree = self.step_tree(step_vars);
        let template =
            tree.get(recipe)
                .ok_or_else(|| PlanError::RecipeFailed {
                    recipe: recipe.to_string(),
                    file: file.display().to_string(),
                    source: crate::error::ExpandError::UnresolvedReference {
                        token: recipe.to_string(),
                    },
                })?;
        RecipeExpander::new(&tree)
            .expand(template)
            .map_err(|source| PlanError::RecipeFailed {
                recipe: recipe.to_string(),
                file: file.display().to_string(),
                source,
            })
    }

    /// Effective tree overlaid with common and per-step build variables.
    fn step_tree(&self, step_vars: &PropertyTree) -> PropertyTree {
        let mut common = PropertyTree::new();
        common.set("build.path", &self.build_dir.display().to_string());
        self.config.effective().merge(&common).merge(step_vars)
    }

    /// Deterministic, collision-free object path for a source file.
    ///
    /// Two differently-pathed sources sharing a base name get distinct
    /// objects: the name embeds a digest of the source's path relative to
    /// the project root.
    fn object_path(&self, source: &Path, subdir: &str) -> PathBuf {
        let relative = source
            .strip_prefix(self.project_dir)
            .unwrap_or(source)
            .display()
            .to_string();
        let digest = hex::encode(&Sha256::digest(relative.as_bytes())[..4]);
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("source");
        self.build_dir
            .join("objects")
            .join(subdir)
            .join(format!("{stem}_{digest}.o"))
    }
}

/// First shell word of an expanded command, quotes stripped.
fn command_tool(command: &str) -> Option<String> {
    let first = command.split_whitespace().next()?;
    Some(first.trim_matches('"').to_string())
}

fn sorted(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut paths = paths.to_vec();
    paths.sort();
    paths
}
