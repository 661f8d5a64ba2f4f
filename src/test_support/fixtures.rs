//! Test fixtures for common test scenarios.
//!
//! `PbxprojFixture` renders a small but realistic `project.pbxproj`: an iOS
//! app target plus a watch app target, each with its own sources phase.
//! Builder methods knock individual links out of the chain so every failure
//! mode of the lookup can be produced from the same baseline.

use std::fmt::Write as _;

/// A file reference in the fixture.
#[derive(Debug, Clone)]
pub struct FixtureFile {
    pub id: String,
    pub name: String,
    pub path: String,
}

/// A build file in the fixture.
#[derive(Debug, Clone)]
pub struct FixtureBuildFile {
    pub id: String,
    pub file_ref: String,
    pub label: String,
}

/// A native target in the fixture.
#[derive(Debug, Clone)]
pub struct FixtureTarget {
    pub id: String,
    pub name: String,
    pub product_name: String,
    pub build_phases: Vec<String>,
}

/// A build phase in the fixture.
#[derive(Debug, Clone)]
pub struct FixturePhase {
    pub id: String,
    pub isa: String,
    pub label: String,
    pub files: Vec<String>,
}

/// Fixture for a complete project document.
#[derive(Debug, Clone, Default)]
pub struct PbxprojFixture {
    pub files: Vec<FixtureFile>,
    pub build_files: Vec<FixtureBuildFile>,
    pub targets: Vec<FixtureTarget>,
    pub phases: Vec<FixturePhase>,
}

impl PbxprojFixture {
    pub const PROJECT: &'static str = "83CBB9F71A601CBA00E9B192";
    pub const MAIN_GROUP: &'static str = "83CBB9F61A601CBA00E9B192";

    pub const APP_DELEGATE_FILE_REF: &'static str = "13B07FAF1A68108700A75B9A";
    pub const APP_DELEGATE_BUILD_FILE: &'static str = "13B07FBC1A68108700A75B9A";
    pub const APP_TARGET: &'static str = "13B07F861A680F5B00A75B9A";
    pub const APP_SOURCES_PHASE: &'static str = "13B07F871A680F5B00A75B9A";

    pub const WATCH_APP_FILE_REF: &'static str = "7A385AAB1C9F421286ECF6A9";
    pub const WATCH_APP_BUILD_FILE: &'static str = "9C1D2E3F4A5B6C7D8E9F0A1B";
    pub const CONTENT_VIEW_FILE_REF: &'static str = "7A385AAB1C9F421286ECF6AA";
    pub const CONTENT_VIEW_BUILD_FILE: &'static str = "9C1D2E3F4A5B6C7D8E9F0A1C";
    pub const WATCH_TARGET: &'static str = "4F5E6D7C8B9A0F1E2D3C4B5A";
    pub const WATCH_SOURCES_PHASE: &'static str = "4F5E6D7C8B9A0F1E2D3C4B5B";
    pub const WATCH_FRAMEWORKS_PHASE: &'static str = "4F5E6D7C8B9A0F1E2D3C4B5C";
    pub const WATCH_RESOURCES_PHASE: &'static str = "4F5E6D7C8B9A0F1E2D3C4B5D";

    /// Create an empty fixture.
    pub fn new() -> Self {
        Self::default()
    }

    /// The baseline: `WatchApp.swift` compiled into the `WatchApp` target.
    pub fn watch_app() -> Self {
        PbxprojFixture::new()
            .file(Self::APP_DELEGATE_FILE_REF, "AppDelegate.swift", "Vecord/AppDelegate.swift")
            .file(Self::WATCH_APP_FILE_REF, "WatchApp.swift", "WatchApp/WatchApp.swift")
            .file(Self::CONTENT_VIEW_FILE_REF, "ContentView.swift", "WatchApp/ContentView.swift")
            .build_file(
                Self::APP_DELEGATE_BUILD_FILE,
                Self::APP_DELEGATE_FILE_REF,
                "AppDelegate.swift",
            )
            .build_file(Self::WATCH_APP_BUILD_FILE, Self::WATCH_APP_FILE_REF, "WatchApp.swift")
            .build_file(
                Self::CONTENT_VIEW_BUILD_FILE,
                Self::CONTENT_VIEW_FILE_REF,
                "ContentView.swift",
            )
            .target(Self::APP_TARGET, "Vecord", "Vecord", &[Self::APP_SOURCES_PHASE])
            .target(
                Self::WATCH_TARGET,
                "WatchApp",
                "VecordWatch",
                &[
                    Self::WATCH_SOURCES_PHASE,
                    Self::WATCH_FRAMEWORKS_PHASE,
                    Self::WATCH_RESOURCES_PHASE,
                ],
            )
            .phase(
                Self::APP_SOURCES_PHASE,
                "PBXSourcesBuildPhase",
                "Sources",
                &[Self::APP_DELEGATE_BUILD_FILE],
            )
            .phase(
                Self::WATCH_SOURCES_PHASE,
                "PBXSourcesBuildPhase",
                "Sources",
                &[Self::CONTENT_VIEW_BUILD_FILE, Self::WATCH_APP_BUILD_FILE],
            )
            .phase(Self::WATCH_FRAMEWORKS_PHASE, "PBXFrameworksBuildPhase", "Frameworks", &[])
            .phase(Self::WATCH_RESOURCES_PHASE, "PBXResourcesBuildPhase", "Resources", &[])
    }

    pub fn file(mut self, id: &str, name: &str, path: &str) -> Self {
        self.files.push(FixtureFile {
            id: id.to_string(),
            name: name.to_string(),
            path: path.to_string(),
        });
        self
    }

    pub fn build_file(mut self, id: &str, file_ref: &str, name: &str) -> Self {
        self.build_files.push(FixtureBuildFile {
            id: id.to_string(),
            file_ref: file_ref.to_string(),
            label: format!("{} in Sources", name),
        });
        self
    }

    pub fn target(mut self, id: &str, name: &str, product_name: &str, phases: &[&str]) -> Self {
        self.targets.push(FixtureTarget {
            id: id.to_string(),
            name: name.to_string(),
            product_name: product_name.to_string(),
            build_phases: phases.iter().map(|p| p.to_string()).collect(),
        });
        self
    }

    pub fn phase(mut self, id: &str, isa: &str, label: &str, files: &[&str]) -> Self {
        self.phases.push(FixturePhase {
            id: id.to_string(),
            isa: isa.to_string(),
            label: label.to_string(),
            files: files.iter().map(|f| f.to_string()).collect(),
        });
        self
    }

    /// Drop a build file record, leaving any phase entries pointing at it.
    pub fn without_build_file(mut self, id: &str) -> Self {
        self.build_files.retain(|b| b.id != id);
        self
    }

    /// Drop the watch target's sources phase record, keeping its id in the
    /// target's build phase list.
    pub fn without_sources_phase(mut self) -> Self {
        self.phases.retain(|p| p.id != Self::WATCH_SOURCES_PHASE);
        self
    }

    /// Remove a build file from every phase's file list.
    pub fn without_phase_entry(mut self, build_file: &str) -> Self {
        for phase in &mut self.phases {
            phase.files.retain(|f| f != build_file);
        }
        self
    }

    fn file_name(&self, build_file: &str) -> &str {
        self.build_files
            .iter()
            .find(|b| b.id == build_file)
            .map(|b| b.label.as_str())
            .unwrap_or("(null)")
    }

    /// Render the fixture as `project.pbxproj` text.
    pub fn render(&self) -> String {
        let mut out = String::new();

        writeln!(out, "// !$*UTF8*$!").unwrap();
        writeln!(out, "{{").unwrap();
        writeln!(out, "\tarchiveVersion = 1;").unwrap();
        writeln!(out, "\tclasses = {{\n\t}};").unwrap();
        writeln!(out, "\tobjectVersion = 54;").unwrap();
        writeln!(out, "\tobjects = {{").unwrap();

        writeln!(out, "\n/* Begin PBXBuildFile section */").unwrap();
        for b in &self.build_files {
            let name = b.label.trim_end_matches(" in Sources");
            writeln!(
                out,
                "\t\t{} /* {} */ = {{isa = PBXBuildFile; fileRef = {} /* {} */; }};",
                b.id, b.label, b.file_ref, name
            )
            .unwrap();
        }
        writeln!(out, "/* End PBXBuildFile section */").unwrap();

        writeln!(out, "\n/* Begin PBXFileReference section */").unwrap();
        for f in &self.files {
            writeln!(
                out,
                "\t\t{} /* {} */ = {{isa = PBXFileReference; lastKnownFileType = sourcecode.swift; path = {}; sourceTree = \"<group>\"; }};",
                f.id, f.name, f.path
            )
            .unwrap();
        }
        writeln!(out, "/* End PBXFileReference section */").unwrap();

        writeln!(out, "\n/* Begin PBXGroup section */").unwrap();
        writeln!(out, "\t\t{} = {{", Self::MAIN_GROUP).unwrap();
        writeln!(out, "\t\t\tisa = PBXGroup;").unwrap();
        writeln!(out, "\t\t\tchildren = (").unwrap();
        for f in &self.files {
            writeln!(out, "\t\t\t\t{} /* {} */,", f.id, f.name).unwrap();
        }
        writeln!(out, "\t\t\t);").unwrap();
        writeln!(out, "\t\t\tsourceTree = \"<group>\";").unwrap();
        writeln!(out, "\t\t}};").unwrap();
        writeln!(out, "/* End PBXGroup section */").unwrap();

        writeln!(out, "\n/* Begin PBXNativeTarget section */").unwrap();
        for t in &self.targets {
            writeln!(out, "\t\t{} /* {} */ = {{", t.id, t.name).unwrap();
            writeln!(out, "\t\t\tisa = PBXNativeTarget;").unwrap();
            writeln!(out, "\t\t\tbuildPhases = (").unwrap();
            for p in &t.build_phases {
                let label = self
                    .phases
                    .iter()
                    .find(|phase| &phase.id == p)
                    .map(|phase| phase.label.as_str())
                    .unwrap_or("Sources");
                writeln!(out, "\t\t\t\t{} /* {} */,", p, label).unwrap();
            }
            writeln!(out, "\t\t\t);").unwrap();
            writeln!(out, "\t\t\tbuildRules = (\n\t\t\t);").unwrap();
            writeln!(out, "\t\t\tdependencies = (\n\t\t\t);").unwrap();
            writeln!(out, "\t\t\tname = {};", t.name).unwrap();
            writeln!(out, "\t\t\tproductName = {};", t.product_name).unwrap();
            writeln!(out, "\t\t\tproductType = \"com.apple.product-type.application\";").unwrap();
            writeln!(out, "\t\t}};").unwrap();
        }
        writeln!(out, "/* End PBXNativeTarget section */").unwrap();

        writeln!(out, "\n/* Begin PBXProject section */").unwrap();
        writeln!(out, "\t\t{} /* Project object */ = {{", Self::PROJECT).unwrap();
        writeln!(out, "\t\t\tisa = PBXProject;").unwrap();
        writeln!(out, "\t\t\tattributes = {{").unwrap();
        writeln!(out, "\t\t\t\tTargetAttributes = {{").unwrap();
        for t in &self.targets {
            writeln!(out, "\t\t\t\t\t{} = {{\n\t\t\t\t\t\tCreatedOnToolsVersion = 15.0;\n\t\t\t\t\t}};", t.id)
                .unwrap();
        }
        writeln!(out, "\t\t\t\t}};").unwrap();
        writeln!(out, "\t\t\t}};").unwrap();
        writeln!(out, "\t\t\tmainGroup = {};", Self::MAIN_GROUP).unwrap();
        writeln!(out, "\t\t\ttargets = (").unwrap();
        for t in &self.targets {
            writeln!(out, "\t\t\t\t{} /* {} */,", t.id, t.name).unwrap();
        }
        writeln!(out, "\t\t\t);").unwrap();
        writeln!(out, "\t\t}};").unwrap();
        writeln!(out, "/* End PBXProject section */").unwrap();

        for isa in ["PBXFrameworksBuildPhase", "PBXResourcesBuildPhase", "PBXSourcesBuildPhase"] {
            writeln!(out, "\n/* Begin {} section */", isa).unwrap();
            for p in self.phases.iter().filter(|p| p.isa == isa) {
                writeln!(out, "\t\t{} /* {} */ = {{", p.id, p.label).unwrap();
                writeln!(out, "\t\t\tisa = {};", p.isa).unwrap();
                writeln!(out, "\t\t\tbuildActionMask = 2147483647;").unwrap();
                writeln!(out, "\t\t\tfiles = (").unwrap();
                for f in &p.files {
                    writeln!(out, "\t\t\t\t{} /* {} */,", f, self.file_name(f)).unwrap();
                }
                writeln!(out, "\t\t\t);").unwrap();
                writeln!(out, "\t\t\trunOnlyForDeploymentPostprocessing = 0;").unwrap();
                writeln!(out, "\t\t}};").unwrap();
            }
            writeln!(out, "/* End {} section */", isa).unwrap();
        }

        writeln!(out, "\t}};").unwrap();
        writeln!(out, "\trootObject = {} /* Project object */;", Self::PROJECT).unwrap();
        writeln!(out, "}}").unwrap();

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_contains_sections() {
        let text = PbxprojFixture::watch_app().render();
        assert!(text.contains("/* Begin PBXNativeTarget section */"));
        assert!(text.contains(
            "9C1D2E3F4A5B6C7D8E9F0A1B /* WatchApp.swift in Sources */ = {isa = PBXBuildFile;"
        ));
        assert!(text.contains("productName = VecordWatch;"));
    }

    #[test]
    fn test_without_phase_entry() {
        let fixture =
            PbxprojFixture::watch_app().without_phase_entry(PbxprojFixture::WATCH_APP_BUILD_FILE);
        let watch_sources = fixture
            .phases
            .iter()
            .find(|p| p.id == PbxprojFixture::WATCH_SOURCES_PHASE)
            .unwrap();
        assert_eq!(watch_sources.files, vec![PbxprojFixture::CONTENT_VIEW_BUILD_FILE.to_string()]);
    }
}
