//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests: a
//! temporary project directory and fixture builders for an installed
//! packages tree.

use std::path::PathBuf;
use tempfile::TempDir;

/// Test project context
///
/// Creates a temporary directory for test scenarios and provides
/// utilities for populating it.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Create a directory in the test project
    pub fn create_dir(&self, name: &str) {
        let path = self.dir.path().join(name);
        std::fs::create_dir_all(path).expect("Failed to create directory");
    }

    /// Check if a file exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read a file from the test project
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Sample manifest TOML for testing
#[allow(dead_code)]
pub const SAMPLE_MANIFEST: &str = r#"
[project]
name = "blink"
version = "1.0.0"

[board]
package = "arduino"
platform = "avr"
name = "uno"

[libraries]
Servo = "*"
"#;

/// Populate `root` (relative to the test project) with an installed AVR
/// package: one platform with two boards, one toolchain, a platform
/// library, and a system library.
#[allow(dead_code)]
pub fn install_avr_packages(project: &TestProject, root: &str) {
    let hw = format!("{root}/packages/arduino/hardware/avr/1.8.6");

    project.create_file(
        &format!("{hw}/platform.txt"),
        "name=AVR Boards\n\
         compiler.path=${runtime.tools.avr-gcc.path}/bin/\n\
         recipe.c.o.pattern=${compiler.path}avr-gcc -c -MMD ${includes} ${source_file} -o ${object_file}\n\
         recipe.cpp.o.pattern=${compiler.path}avr-g++ -c -MMD ${includes} ${source_file} -o ${object_file}\n\
         recipe.S.o.pattern=${compiler.path}avr-gcc -c ${source_file} -o ${object_file}\n\
         recipe.ar.pattern=${compiler.path}avr-ar rcs ${archive_file_path} ${object_file}\n\
         recipe.c.combine.pattern=${compiler.path}avr-gcc -o ${build.path}/${build.project_name}.elf ${object_files} ${archive_file_path}\n\
         recipe.size.pattern=${compiler.path}avr-size ${build.path}/${build.project_name}.elf\n\
         toolchain.avr-gcc.version=7.3.0\n",
    );

    project.create_file(
        &format!("{hw}/boards.txt"),
        "menu.cpu=Processor\n\
         uno.name=Arduino Uno\n\
         uno.build.mcu=atmega328p\n\
         uno.build.f_cpu=16000000L\n\
         mini.name=Arduino Mini\n\
         mini.menu.cpu.default=atmega328\n\
         mini.menu.cpu.atmega328=ATmega328P\n\
         mini.menu.cpu.atmega328.build.mcu=atmega328p\n\
         mini.menu.cpu.atmega168=ATmega168\n\
         mini.menu.cpu.atmega168.build.mcu=atmega168\n",
    );

    project.create_file(
        &format!("{hw}/libraries/Wire/library.properties"),
        "name=Wire\nversion=1.0\n",
    );
    project.create_file(&format!("{hw}/libraries/Wire/src/Wire.cpp"), "");

    project.create_file(
        &format!("{root}/packages/arduino/tools/avr-gcc/7.3.0/.keep"),
        "",
    );

    project.create_file(
        &format!("{root}/libraries/Servo/library.properties"),
        "name=Servo\nversion=1.8.0\n",
    );
    project.create_file(&format!("{root}/libraries/Servo/Servo.cpp"), "");
}

/// Populate `dir` (relative to the test project) with a minimal blink
/// project using the AVR fixture's uno board.
#[allow(dead_code)]
pub fn install_blink_project(project: &TestProject, dir: &str) {
    project.create_file(&format!("{dir}/mcumake.toml"), SAMPLE_MANIFEST);
    project.create_file(&format!("{dir}/blink.c"), "int main(void) { return 0; }\n");
}
