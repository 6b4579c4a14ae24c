//! Static-site generator invocation.

use std::path::PathBuf;
use std::time::Duration;

use tracing::info;

use super::command::{run_command, CommandError, CommandSpec};
use crate::config::ToolType;

/// A configured generator run: source checkout in, rendered site out.
#[derive(Debug, Clone)]
pub struct Generator {
    tool: ToolType,
    src_dir: PathBuf,
    output_dir: PathBuf,
    timeout: Duration,
}

impl Generator {
    pub fn new(
        tool: ToolType,
        src_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Self {
        Self {
            tool,
            src_dir: src_dir.into(),
            output_dir: output_dir.into(),
            timeout,
        }
    }

    pub fn tool(&self) -> ToolType {
        self.tool
    }

    /// Probe the tool, then render the site.
    pub async fn build(&self) -> Result<(), CommandError> {
        run_command(&self.version_command(), self.timeout).await?;
        run_command(&self.build_command(), self.timeout).await?;
        info!(
            tool = %self.tool,
            output = %self.output_dir.display(),
            "document_generated"
        );
        Ok(())
    }

    fn version_command(&self) -> CommandSpec {
        match self.tool {
            ToolType::Hugo => CommandSpec::new("hugo").arg("version"),
            ToolType::Mdbook => CommandSpec::new("mdbook").arg("--version"),
        }
    }

    fn build_command(&self) -> CommandSpec {
        match self.tool {
            ToolType::Hugo => CommandSpec::new("hugo")
                .arg("-d")
                .path_arg(&self.output_dir)
                .current_dir(&self.src_dir),
            ToolType::Mdbook => CommandSpec::new("mdbook")
                .arg("build")
                .path_arg(&self.src_dir)
                .arg("-d")
                .path_arg(&self.output_dir),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn generator(tool: ToolType) -> Generator {
        Generator::new(tool, "/srv/demo", "/srv/demo-output", Duration::from_secs(5))
    }

    #[test]
    fn test_hugo_commands() {
        let g = generator(ToolType::Hugo);
        assert_eq!(g.version_command().to_string(), "hugo version");
        assert_eq!(
            g.build_command().to_string(),
            "cd /srv/demo && hugo -d /srv/demo-output"
        );
    }

    #[test]
    fn test_mdbook_commands() {
        let g = generator(ToolType::Mdbook);
        assert_eq!(g.version_command().to_string(), "mdbook --version");
        assert_eq!(
            g.build_command().to_string(),
            "mdbook build /srv/demo -d /srv/demo-output"
        );
    }

    #[test]
    fn test_default_output_is_absolute() {
        use crate::config::Config;

        for tool in ["hugo", "mdbook"] {
            let config = Config::from_lookup(|name| match name {
                "GIT_URL" => Some("https://github.com/acme/demo.git".to_string()),
                "TOOL_TYPE" => Some(tool.to_string()),
                _ => None,
            })
            .unwrap();
            let g = Generator::new(
                config.tool_type,
                config.repo_dir(),
                config.output_dir.clone(),
                Duration::from_secs(5),
            );

            let build = g.build_command();
            let pos = build.args.iter().position(|a| a == "-d").unwrap();
            let output = Path::new(&build.args[pos + 1]);
            assert!(output.is_absolute(), "{} output {:?}", tool, output);
            assert!(output.ends_with("demo-output"));
        }
    }
}
