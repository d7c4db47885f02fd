//! TypeScript project scaffolding pipeline
//!
//! The six steps run strictly in order; the first failure aborts the rest.
//! There is no rollback: a failure mid-pipeline leaves whatever the earlier
//! steps already wrote on disk.

use crate::error::{McpError, McpResult};
use crate::exec::{CommandInvocation, CommandRunner};
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// Arguments of the `init-typescript` tool
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaffoldRequest {
    /// Name for the new TypeScript project directory
    pub project_name: String,
    /// Absolute or relative path to the folder where the project directory
    /// should be created
    pub destination_folder: String,
}

impl ScaffoldRequest {
    /// Reject empty arguments before any side effect happens
    pub fn validate(&self) -> McpResult<()> {
        if self.project_name.trim().is_empty() {
            return Err(McpError::InvalidParams("projectName must not be empty".into()));
        }
        if self.destination_folder.trim().is_empty() {
            return Err(McpError::InvalidParams(
                "destinationFolder must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Outcome of a successful scaffold run
#[derive(Debug, Clone)]
pub struct ScaffoldReport {
    /// Project name as requested
    pub project_name: String,
    /// Absolute path of the created project directory
    pub project_path: PathBuf,
}

impl ScaffoldReport {
    /// Human-readable success message returned to the client
    pub fn message(&self) -> String {
        format!(
            "TypeScript project '{}' created successfully at '{}'",
            self.project_name,
            self.project_path.display()
        )
    }
}

/// Placeholder entry point, written byte-for-byte
pub const INDEX_TS: &str = "console.log(\"Hello, TypeScript!\");\n";

const BUILD_SCRIPT: &str = "tsc";
const START_SCRIPT: &str = "node dist/index.js";
const MAIN_ENTRY: &str = "dist/index.js";

/// Fixed tsc --init flags: src/dist layout, CommonJS, permissive-but-typed
const TSC_INIT_ARGS: &[&str] = &[
    "tsc",
    "--init",
    "--rootDir",
    "./src",
    "--outDir",
    "./dist",
    "--esModuleInterop",
    "--resolveJsonModule",
    "--lib",
    "es6,dom",
    "--module",
    "commonjs",
    "--allowJs",
    "true",
    "--noImplicitAny",
    "true",
];

/// Scaffold a minimal TypeScript project
///
/// Creates the project directory, initializes an npm package, installs the
/// TypeScript compiler as a dev dependency, generates `tsconfig.json`,
/// writes `src/index.ts`, and patches `package.json` with build/start
/// scripts and the compiled entry point.
pub async fn scaffold(
    request: &ScaffoldRequest,
    runner: &dyn CommandRunner,
) -> McpResult<ScaffoldReport> {
    request.validate()?;

    let project_path = resolve_project_path(request)?;

    info!("📁 Creating project directory at {}", project_path.display());
    fs::create_dir_all(&project_path).await?;

    info!("📦 Initializing npm project in {}", project_path.display());
    runner
        .run(&CommandInvocation::new("npm", ["init", "-y"], &project_path))
        .await?;

    info!("📦 Installing TypeScript in {}", project_path.display());
    runner
        .run(&CommandInvocation::new(
            "npm",
            ["install", "typescript", "--save-dev"],
            &project_path,
        ))
        .await?;

    info!("🔧 Initializing tsconfig.json in {}", project_path.display());
    runner
        .run(&CommandInvocation::new(
            "npx",
            TSC_INIT_ARGS.iter().copied(),
            &project_path,
        ))
        .await?;

    info!("📝 Writing src/index.ts in {}", project_path.display());
    let src_path = project_path.join("src");
    fs::create_dir_all(&src_path).await?;
    fs::write(src_path.join("index.ts"), INDEX_TS).await?;

    info!("🩹 Patching package.json in {}", project_path.display());
    patch_manifest(&project_path.join("package.json")).await?;

    let report = ScaffoldReport {
        project_name: request.project_name.clone(),
        project_path,
    };
    info!("✅ {}", report.message());
    Ok(report)
}

/// Resolve destination + project name into an absolute directory path
fn resolve_project_path(request: &ScaffoldRequest) -> McpResult<PathBuf> {
    let joined = Path::new(&request.destination_folder).join(&request.project_name);
    Ok(std::path::absolute(joined)?)
}

/// Merge build/start scripts and the entry point into the npm manifest
///
/// Other script entries are preserved; `build`, `start`, and `main` are
/// always overwritten.
async fn patch_manifest(manifest_path: &Path) -> McpResult<()> {
    let raw = fs::read_to_string(manifest_path).await?;
    let mut manifest: Value = serde_json::from_str(&raw)?;

    let root = manifest
        .as_object_mut()
        .ok_or_else(|| McpError::Internal("package.json is not a JSON object".into()))?;

    let scripts = root.entry("scripts").or_insert_with(|| json!({}));
    if !scripts.is_object() {
        *scripts = json!({});
    }
    if let Some(scripts) = scripts.as_object_mut() {
        scripts.insert("build".to_string(), json!(BUILD_SCRIPT));
        scripts.insert("start".to_string(), json!(START_SCRIPT));
    }

    root.insert("main".to_string(), json!(MAIN_ENTRY));

    let mut serialized = serde_json::to_string_pretty(&manifest)?;
    serialized.push('\n');
    fs::write(manifest_path, serialized).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::CommandOutput;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Runner that records invocations and mimics npm's on-disk effects
    struct ScriptedRunner {
        invocations: Mutex<Vec<CommandInvocation>>,
        /// 0-based index of the invocation that should fail, if any
        fail_at: Option<usize>,
    }

    impl ScriptedRunner {
        fn new() -> Self {
            Self {
                invocations: Mutex::new(Vec::new()),
                fail_at: None,
            }
        }

        fn failing_at(index: usize) -> Self {
            Self {
                invocations: Mutex::new(Vec::new()),
                fail_at: Some(index),
            }
        }

        fn recorded(&self) -> Vec<CommandInvocation> {
            self.invocations.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        async fn run(&self, invocation: &CommandInvocation) -> McpResult<CommandOutput> {
            let index = {
                let mut invocations = self.invocations.lock().unwrap();
                invocations.push(invocation.clone());
                invocations.len() - 1
            };

            if self.fail_at == Some(index) {
                return Err(McpError::Subprocess {
                    command: invocation.command_line(),
                    status: fake_status(1),
                    stderr: "npm ERR! scripted failure".to_string(),
                });
            }

            // npm init -y produces a default manifest
            if invocation.program == "npm" && invocation.args.first().map(String::as_str) == Some("init")
            {
                let manifest = serde_json::json!({
                    "name": "fixture",
                    "version": "1.0.0",
                    "scripts": { "test": "echo \"Error: no test specified\" && exit 1" }
                });
                std::fs::write(
                    invocation.cwd.join("package.json"),
                    serde_json::to_string_pretty(&manifest).unwrap(),
                )
                .unwrap();
            }

            Ok(CommandOutput::default())
        }
    }

    fn fake_status(code: i32) -> std::process::ExitStatus {
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            std::process::ExitStatus::from_raw(code << 8)
        }
        #[cfg(not(unix))]
        {
            use std::os::windows::process::ExitStatusExt;
            std::process::ExitStatus::from_raw(code as u32)
        }
    }

    fn request(dest: &Path) -> ScaffoldRequest {
        ScaffoldRequest {
            project_name: "my-app".to_string(),
            destination_folder: dest.to_string_lossy().into_owned(),
        }
    }

    #[tokio::test]
    async fn scaffold_creates_project_tree() {
        let temp = TempDir::new().unwrap();
        let runner = ScriptedRunner::new();

        let report = scaffold(&request(temp.path()), &runner).await.unwrap();

        let project = temp.path().join("my-app");
        assert_eq!(report.project_path, std::path::absolute(&project).unwrap());
        assert!(project.join("package.json").exists());
        assert!(project.join("src/index.ts").exists());
        assert!(report.message().contains("my-app"));
        assert!(report
            .message()
            .contains(&report.project_path.display().to_string()));
    }

    #[tokio::test]
    async fn scaffold_runs_commands_in_order() {
        let temp = TempDir::new().unwrap();
        let runner = ScriptedRunner::new();

        scaffold(&request(temp.path()), &runner).await.unwrap();

        let invocations = runner.recorded();
        assert_eq!(invocations.len(), 3);
        assert_eq!(invocations[0].command_line(), "npm init -y");
        assert_eq!(
            invocations[1].command_line(),
            "npm install typescript --save-dev"
        );
        assert!(invocations[2].command_line().starts_with("npx tsc --init"));
        assert!(invocations[2].command_line().contains("--noImplicitAny true"));
        let project = std::path::absolute(temp.path().join("my-app")).unwrap();
        assert!(invocations.iter().all(|i| i.cwd == project));
    }

    #[tokio::test]
    async fn index_ts_is_byte_exact() {
        let temp = TempDir::new().unwrap();
        let runner = ScriptedRunner::new();

        scaffold(&request(temp.path()), &runner).await.unwrap();

        let content = std::fs::read(temp.path().join("my-app/src/index.ts")).unwrap();
        assert_eq!(content, b"console.log(\"Hello, TypeScript!\");\n");
    }

    #[tokio::test]
    async fn manifest_patch_overwrites_build_start_main_and_keeps_others() {
        let temp = TempDir::new().unwrap();
        let runner = ScriptedRunner::new();

        scaffold(&request(temp.path()), &runner).await.unwrap();

        let raw = std::fs::read_to_string(temp.path().join("my-app/package.json")).unwrap();
        let manifest: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(manifest["scripts"]["build"], "tsc");
        assert_eq!(manifest["scripts"]["start"], "node dist/index.js");
        assert_eq!(manifest["main"], "dist/index.js");
        // pre-existing entry from npm init survives
        assert!(manifest["scripts"]["test"].is_string());
    }

    #[tokio::test]
    async fn first_failing_step_aborts_the_rest() {
        let temp = TempDir::new().unwrap();
        // npm install (second invocation) fails
        let runner = ScriptedRunner::failing_at(1);

        let err = scaffold(&request(temp.path()), &runner).await.unwrap_err();

        assert!(err.message().contains("npm install typescript --save-dev"));
        assert!(err.message().contains("scripted failure"));
        // tsc --init never ran, src/index.ts never written
        assert_eq!(runner.recorded().len(), 2);
        assert!(!temp.path().join("my-app/src").exists());
    }

    #[tokio::test]
    async fn uncreatable_destination_is_an_io_failure() {
        let temp = TempDir::new().unwrap();
        // a file where the destination directory should be
        let blocker = temp.path().join("blocked");
        std::fs::write(&blocker, "not a directory").unwrap();
        let runner = ScriptedRunner::new();

        let request = ScaffoldRequest {
            project_name: "my-app".to_string(),
            destination_folder: blocker.to_string_lossy().into_owned(),
        };
        let err = scaffold(&request, &runner).await.unwrap_err();

        assert!(matches!(err, McpError::Io(_)));
        // nothing ran, nothing was written under src/
        assert!(runner.recorded().is_empty());
        assert!(!blocker.join("my-app/src").exists());
    }

    #[tokio::test]
    async fn rerunning_with_identical_arguments_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let runner = ScriptedRunner::new();

        let first = scaffold(&request(temp.path()), &runner).await.unwrap();
        let second = scaffold(&request(temp.path()), &runner).await.unwrap();

        assert_eq!(first.project_path, second.project_path);
        let raw = std::fs::read_to_string(temp.path().join("my-app/package.json")).unwrap();
        let manifest: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(manifest["scripts"]["build"], "tsc");
    }

    #[tokio::test]
    async fn empty_arguments_are_rejected_before_side_effects() {
        let runner = ScriptedRunner::new();
        let request = ScaffoldRequest {
            project_name: "".to_string(),
            destination_folder: "/tmp".to_string(),
        };

        let err = scaffold(&request, &runner).await.unwrap_err();
        assert_eq!(err.error_code(), -32602);
        assert!(runner.recorded().is_empty());
    }

    #[tokio::test]
    async fn corrupt_manifest_is_a_parse_failure() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("my-app");
        std::fs::create_dir_all(&project).unwrap();

        // runner that never writes a manifest, so the pre-seeded garbage survives
        struct NoopRunner;
        #[async_trait]
        impl CommandRunner for NoopRunner {
            async fn run(&self, _invocation: &CommandInvocation) -> McpResult<CommandOutput> {
                Ok(CommandOutput::default())
            }
        }
        std::fs::write(project.join("package.json"), "not json at all").unwrap();

        let err = scaffold(&request(temp.path()), &NoopRunner).await.unwrap_err();
        assert!(matches!(err, McpError::Json(_)));
    }
}
