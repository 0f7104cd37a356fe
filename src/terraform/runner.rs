//! Terraform invocation.
//!
//! Obtaining a module's plan is the only part of the tool that performs
//! blocking IO: it shells out to the Terraform CLI for `init`, `refresh`,
//! `plan` and `show -json`, then parses the JSON output. The engine never
//! sees any of this; it receives the parsed [`PlanJson`] and nothing else.

use std::path::Path;
use std::process::Output;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::info;

use super::model::PlanJson;
use crate::error::TerraformError;

/// Settings for obtaining a plan from Terraform.
///
/// Recognized fields are enumerated here with explicit defaults; a single
/// [`validate`](Self::validate) call checks them before use.
#[derive(Debug, Clone)]
pub struct PlanSettings {
    /// The Terraform binary to invoke. Defaults to `terraform` from PATH;
    /// override to use a wrapper such as `terragrunt` or a pinned binary.
    pub terraform_bin: String,

    /// Skip running `terraform init` before planning. Saves time, but
    /// planning fails if the module was never initialized.
    pub skip_init: bool,

    /// Skip running `terraform refresh` before planning. Saves time, but
    /// the plan may be based on stale state.
    pub skip_refresh: bool,
}

impl Default for PlanSettings {
    fn default() -> Self {
        Self {
            terraform_bin: String::from("terraform"),
            skip_init: false,
            skip_refresh: false,
        }
    }
}

impl PlanSettings {
    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// Returns [`TerraformError::ExecutableNotFound`] if the configured
    /// binary cannot be resolved.
    pub fn validate(&self) -> Result<(), TerraformError> {
        if which::which(&self.terraform_bin).is_err() {
            return Err(TerraformError::ExecutableNotFound {
                bin: self.terraform_bin.clone(),
            });
        }
        Ok(())
    }
}

/// Obtains plans for module directories.
///
/// This is the seam between orchestration and the Terraform CLI: anything
/// that can produce a [`PlanJson`] for a directory is substitutable, so the
/// orchestration layer can be exercised without Terraform installed.
#[async_trait]
pub trait PlanProvider: Send + Sync {
    /// Obtains the plan for the module in `workdir`.
    async fn obtain_plan(&self, workdir: &Path) -> Result<PlanJson, TerraformError>;
}

/// The real [`PlanProvider`]: runs the Terraform CLI.
#[derive(Debug)]
pub struct TerraformRunner {
    settings: PlanSettings,
}

impl TerraformRunner {
    /// Creates a runner with validated settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are invalid.
    pub fn new(settings: PlanSettings) -> Result<Self, TerraformError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    /// Runs one Terraform command in `workdir` and captures its output.
    async fn run(&self, workdir: &Path, args: &[&str]) -> Result<Output, TerraformError> {
        let command_line = format!("{} {}", self.settings.terraform_bin, args.join(" "));
        info!("running {command_line:?} in {}", display_workdir(workdir));

        let output = Command::new(&self.settings.terraform_bin)
            .args(args)
            .current_dir(workdir)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| TerraformError::CommandFailed {
                command: command_line.clone(),
                workdir: workdir.display().to_string(),
                stderr: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(TerraformError::CommandFailed {
                command: command_line,
                workdir: workdir.display().to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        Ok(output)
    }
}

#[async_trait]
impl PlanProvider for TerraformRunner {
    /// Runs `init`, `refresh`, `plan` and `show -json` in `workdir`, honoring
    /// the skip flags, and parses the result.
    async fn obtain_plan(&self, workdir: &Path) -> Result<PlanJson, TerraformError> {
        ensure_workdir(workdir)?;

        if !self.settings.skip_init {
            self.run(workdir, &["init", "-input=false", "-no-color"]).await?;
        }

        if !self.settings.skip_refresh {
            self.run(workdir, &["refresh", "-input=false", "-no-color"]).await?;
        }

        let plan_file = tempfile::Builder::new()
            .prefix("tfremap.")
            .suffix(".plan")
            .tempfile()
            .map_err(|e| TerraformError::CommandFailed {
                command: String::from("create temporary plan file"),
                workdir: workdir.display().to_string(),
                stderr: e.to_string(),
            })?;
        let plan_path = plan_file.path().display().to_string();

        self.run(workdir, &["plan", "-input=false", "-no-color", &format!("-out={plan_path}")])
            .await?;

        let output = self.run(workdir, &["show", "-json", &plan_path]).await?;

        let raw = String::from_utf8_lossy(&output.stdout);
        PlanJson::from_json(&raw).map_err(|e| TerraformError::InvalidJson {
            message: e.to_string(),
        })
    }
}

/// Checks that a module directory exists.
fn ensure_workdir(path: &Path) -> Result<(), TerraformError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(TerraformError::InvalidWorkdir {
            path: path.to_path_buf(),
        })
    }
}

/// Names a working directory for log messages.
fn display_workdir(path: &Path) -> String {
    if path == Path::new(".") {
        String::from("current directory")
    } else {
        path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = PlanSettings::default();

        assert_eq!(settings.terraform_bin, "terraform");
        assert!(!settings.skip_init);
        assert!(!settings.skip_refresh);
    }

    #[test]
    fn test_validate_rejects_missing_binary() {
        let settings = PlanSettings {
            terraform_bin: String::from("definitely-not-a-real-terraform-binary"),
            ..PlanSettings::default()
        };

        let result = settings.validate();

        match result {
            Err(TerraformError::ExecutableNotFound { bin }) => {
                assert_eq!(bin, "definitely-not-a-real-terraform-binary");
            }
            other => panic!("expected ExecutableNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_ensure_workdir_rejects_missing_directory() {
        let result = ensure_workdir(Path::new("does/not/exist"));

        assert!(matches!(result, Err(TerraformError::InvalidWorkdir { .. })));
    }

    #[test]
    fn test_ensure_workdir_accepts_directory() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");

        assert!(ensure_workdir(dir.path()).is_ok());
    }
}
