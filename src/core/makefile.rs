//! Makefile rendering
//!
//! Materializes a [`BuildPlan`] as Make-compatible text. The target graph
//! carries real dependency edges: the linked artifact depends on every
//! object, every object depends on its source and its toolchain binary,
//! and per-object `.d` files are re-included so header changes trigger
//! recompilation. Rendering is pure; callers write the returned string in
//! one shot so a failed generation never leaves a partial file behind.

use std::fmt::Write as _;

use super::plan::{BuildPlan, ObjectGroup};

/// Render a build plan as Makefile text. Identical plans render to
/// byte-identical output.
pub fn render(plan: &BuildPlan) -> String {
    let mut out = String::new();
    let elf = plan.link.output.display().to_string();

    let _ = writeln!(
        out,
        "# Generated by mcumake {}. Do not edit.",
        crate::core::version::CURRENT_VERSION
    );
    let _ = writeln!(out, "# Project: {}", plan.project_name);
    out.push('\n');

    // default goal
    if plan.size_command.is_some() {
        let _ = writeln!(out, "all: {elf} size");
    } else {
        let _ = writeln!(out, "all: {elf}");
    }
    out.push('\n');

    // compile rules: object depends on source, toolchain binary, and its
    // re-included dependency file
    for step in &plan.compile_steps {
        let object = step.object.display();
        let source = step.source.display();
        match &step.tool {
            Some(tool) => {
                let _ = writeln!(out, "{object}: {source} {tool}");
            }
            None => {
                let _ = writeln!(out, "{object}: {source}");
            }
        }
        if let Some(dir) = step.object.parent() {
            let _ = writeln!(out, "\t@mkdir -p {}", dir.display());
        }
        let _ = writeln!(out, "\t{}", step.command);
        out.push('\n');
    }

    // cumulative archive: one archiver invocation per object
    if !plan.archive.objects.is_empty() {
        let archive = plan.archive.archive.display();
        let objects = plan
            .archive
            .objects
            .iter()
            .map(|o| o.display().to_string())
            .collect::<Vec<_>>()
            .join(" ");
        let _ = writeln!(out, "{archive}: {objects}");
        if let Some(dir) = plan.archive.archive.parent() {
            let _ = writeln!(out, "\t@mkdir -p {}", dir.display());
        }
        let _ = writeln!(out, "\t@rm -f {archive}");
        for command in &plan.archive.commands {
            let _ = writeln!(out, "\t{command}");
        }
        out.push('\n');
    }

    // link: project objects plus the archive
    {
        let mut prerequisites: Vec<String> = plan
            .objects(ObjectGroup::Project)
            .iter()
            .map(|o| o.display().to_string())
            .collect();
        if !plan.archive.objects.is_empty() {
            prerequisites.push(plan.archive.archive.display().to_string());
        }
        if let Some(tool) = &plan.link.tool {
            prerequisites.push(tool.clone());
        }
        let _ = writeln!(out, "{elf}: {}", prerequisites.join(" "));
        let _ = writeln!(out, "\t{}", plan.link.command);
        out.push('\n');
    }

    // size reporting is diagnostic only; the leading '-' keeps a failure
    // from breaking the build
    if let Some(size) = &plan.size_command {
        let _ = writeln!(out, "size: {elf}");
        let _ = writeln!(out, "\t-{size}");
        out.push('\n');
    }

    if let Some(upload) = &plan.upload_command {
        let _ = writeln!(out, "upload: {elf}");
        let _ = writeln!(out, "\t{upload}");
        out.push('\n');
    }

    let _ = writeln!(out, "clean:");
    let _ = writeln!(out, "\trm -rf {}", plan.build_dir.display());
    out.push('\n');

    let mut phony = vec!["all", "clean"];
    if plan.size_command.is_some() {
        phony.push("size");
    }
    if plan.upload_command.is_some() {
        phony.push("upload");
    }
    let _ = writeln!(out, ".PHONY: {}", phony.join(" "));
    out.push('\n');

    // header-change edges come from the compiler-generated .d files
    for step in &plan.compile_steps {
        let _ = writeln!(out, "-include {}", step.dep_file.display());
    }

    out
}
