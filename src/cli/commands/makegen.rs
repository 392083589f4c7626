//! CLI command for generating the project Makefile
//!
//! Implements the `mcumake makegen` command: load the manifest, resolve
//! the board configuration, enumerate sources, generate the build plan,
//! and write the Makefile in one shot.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::cli::output;
use crate::error::McumakeError;
use crate::core::catalog::VersionedCatalog;
use crate::core::configuration::{resolve, Configuration, ResolveRequest};
use crate::core::makefile;
use crate::core::plan::{BuildPlanGenerator, SourceSet};
use crate::core::project::{LastConfiguration, Project};
use crate::core::version::check_engine_version;
use crate::infra::{discovery, sources};

/// Execute the makegen command
pub fn execute(packages_dir: &Path, project_dir: &Path, output: Option<PathBuf>) -> Result<()> {
    let project = Project::load(project_dir)?;
    let manifest = &project.manifest;

    if let Some(constraint) = &manifest.project.mcumake_version {
        check_engine_version(
            constraint,
            &format!("project '{}'", manifest.project.name),
        )?;
    }

    let (Some(package), Some(platform), Some(board)) = (
        manifest.board.package.as_deref(),
        manifest.board.platform.as_deref(),
        manifest.board.name.as_deref(),
    ) else {
        return Err(McumakeError::Generic(
            "No board configured. Set [board] package, platform, and name in mcumake.toml."
                .to_string(),
        )
        .into());
    };

    tracing::info!(package, platform, board, "resolving configuration");
    let env = discovery::load_environment(packages_dir)?;

    let mut project_libraries = VersionedCatalog::new();
    for library in discovery::load_libraries(&project.libraries_dir())? {
        let (name, version) = (library.name.clone(), library.version.clone());
        project_libraries.put(&name, &version, library);
    }

    let libraries: Vec<(String, Option<String>)> = manifest
        .libraries
        .keys()
        .map(|name| {
            (
                name.clone(),
                manifest.library_pin(name).map(str::to_string),
            )
        })
        .collect();

    let overrides = manifest.overrides();
    let config = resolve(
        &env,
        &ResolveRequest {
            package,
            platform,
            board,
            menu: &manifest.board.menu,
            project_name: &manifest.project.name,
            project_overrides: &overrides,
            libraries: &libraries,
            project_libraries: &project_libraries,
        },
    )?;

    for toolchain in config.toolchains() {
        if toolchain.path.is_none() {
            if let Some(url) = &toolchain.url {
                output::warning(&format!(
                    "Toolchain '{}' {} is not installed; available at {url}",
                    toolchain.name, toolchain.version
                ));
            }
        }
    }

    let source_set = enumerate_sources(&project, &config);
    tracing::info!(
        project = source_set.project.len(),
        core = source_set.core.len(),
        libraries = source_set.libraries.len(),
        "enumerated sources"
    );

    let generator = BuildPlanGenerator::new(&config, &project.root, project.build_dir());
    let plan = generator.generate(&source_set)?;
    let rendered = makefile::render(&plan);

    let makefile_path = output.unwrap_or_else(|| project.root.join("Makefile"));
    std::fs::write(&makefile_path, rendered).map_err(|source| McumakeError::Io {
        path: makefile_path.clone(),
        source,
    })?;

    if let Some(previous) = project.last_configuration() {
        if previous.board != config.board || previous.platform != config.platform {
            tracing::info!(
                previous_board = %previous.board,
                board = %config.board,
                "target changed since last generation"
            );
        }
    }

    let chosen: BTreeMap<String, String> = config
        .libraries()
        .iter()
        .map(|(name, resolved)| (name.clone(), resolved.library.version.clone()))
        .collect();
    project.save_last_configuration(&LastConfiguration {
        package: config.package.clone(),
        platform: config.platform.clone(),
        board: config.board.clone(),
        menu: manifest.board.menu.clone(),
        libraries: chosen,
    })?;

    output::success(&format!(
        "Generated {} ({} compile step(s), {} archived object(s))",
        makefile_path.display(),
        plan.compile_steps.len(),
        plan.archive.objects.len()
    ));

    Ok(())
}

/// Enumerate project, core, and library sources for the plan.
fn enumerate_sources(project: &Project, config: &Configuration) -> SourceSet {
    let excluded = [project.build_dir(), project.libraries_dir()];
    let project_sources = sources::enumerate(&project.root, &excluded);

    let core_sources = config
        .effective()
        .get("build.core")
        .zip(config.effective().get("runtime.platform.path"))
        .map(|(core, platform_path)| {
            sources::enumerate(&Path::new(platform_path).join("cores").join(core), &[])
        })
        .unwrap_or_default();

    let library_sources = config
        .libraries()
        .iter()
        .map(|(name, resolved)| {
            let mut files = Vec::new();
            for dir in &resolved.library.src_dirs {
                files.extend(sources::enumerate(dir, &[]));
            }
            (name.clone(), files)
        })
        .collect();

    SourceSet {
        project: project_sources,
        libraries: library_sources,
        core: core_sources,
    }
}
