#![allow(dead_code)]

use std::path::PathBuf;
use std::time::Duration;

use paladin::config::{ConfigFile, ProcessConfig, RawConfigFile};
use paladin::registry::ProcessDefinition;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                log_file: None,
                process: Vec::new(),
            },
        }
    }

    pub fn with_process(mut self, process: ProcessConfig) -> Self {
        self.config.process.push(process);
        self
    }

    pub fn with_log_file(mut self, path: &str) -> Self {
        self.config.log_file = Some(PathBuf::from(path));
        self
    }

    /// The unvalidated config, for exercising validation errors.
    pub fn build_raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `ProcessConfig` (one `[[process]]` block).
pub struct ProcessConfigBuilder {
    process: ProcessConfig,
}

impl ProcessConfigBuilder {
    pub fn new(name: &str, path: &str) -> Self {
        Self {
            process: ProcessConfig {
                name: name.to_string(),
                path: PathBuf::from(path),
                args: String::new(),
                dir: None,
                stdout: None,
                stderr: None,
                restart_delay: 0,
                ignore_failure: false,
                min_runtime: 0,
                soft_depends: vec![],
                user: String::new(),
                group: String::new(),
            },
        }
    }

    pub fn args(mut self, args: &str) -> Self {
        self.process.args = args.to_string();
        self
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.process.soft_depends.push(dep.to_string());
        self
    }

    pub fn restart_delay_ms(mut self, ms: u64) -> Self {
        self.process.restart_delay = ms;
        self
    }

    pub fn min_runtime_ms(mut self, ms: u64) -> Self {
        self.process.min_runtime = ms;
        self
    }

    pub fn ignore_failure(mut self, val: bool) -> Self {
        self.process.ignore_failure = val;
        self
    }

    pub fn build(self) -> ProcessConfig {
        self.process
    }
}

/// Builder for `ProcessDefinition`, bypassing config validation.
pub struct DefinitionBuilder {
    definition: ProcessDefinition,
}

impl DefinitionBuilder {
    pub fn new(name: &str, path: &str) -> Self {
        Self {
            definition: ProcessDefinition::new(name, path),
        }
    }

    /// A definition whose path doesn't matter (fake launchers ignore it).
    pub fn named(name: &str) -> Self {
        Self::new(name, "/bin/true")
    }

    pub fn args(mut self, args: &str) -> Self {
        self.definition.args = args.to_string();
        self
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.definition.soft_depends.push(dep.to_string());
        self
    }

    pub fn restart_delay_ms(mut self, ms: u64) -> Self {
        self.definition.restart_delay = Duration::from_millis(ms);
        self
    }

    pub fn min_runtime_ms(mut self, ms: u64) -> Self {
        self.definition.min_runtime = Duration::from_millis(ms);
        self
    }

    pub fn ignore_failure(mut self, val: bool) -> Self {
        self.definition.ignore_failure = val;
        self
    }

    pub fn dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.definition.dir = Some(dir.into());
        self
    }

    pub fn stdout(mut self, path: impl Into<PathBuf>) -> Self {
        self.definition.stdout = Some(path.into());
        self
    }

    pub fn stderr(mut self, path: impl Into<PathBuf>) -> Self {
        self.definition.stderr = Some(path.into());
        self
    }

    pub fn user(mut self, user: &str) -> Self {
        self.definition.user = user.to_string();
        self
    }

    pub fn group(mut self, group: &str) -> Self {
        self.definition.group = group.to_string();
        self
    }

    pub fn build(self) -> ProcessDefinition {
        self.definition
    }
}
