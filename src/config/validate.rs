// src/config/validate.rs

use std::collections::HashSet;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{PaladinError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = PaladinError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.log_file, raw.process))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_processes(cfg)?;
    validate_process_fields(cfg)?;
    validate_soft_depends(cfg)?;
    validate_dependency_graph(cfg)?;
    Ok(())
}

fn ensure_has_processes(cfg: &RawConfigFile) -> Result<()> {
    if cfg.process.is_empty() {
        return Err(PaladinError::Config(
            "config must contain at least one [[process]] block".to_string(),
        ));
    }
    Ok(())
}

fn validate_process_fields(cfg: &RawConfigFile) -> Result<()> {
    let mut seen = HashSet::new();

    for (idx, process) in cfg.process.iter().enumerate() {
        if process.name.trim().is_empty() {
            return Err(PaladinError::Config(format!(
                "process #{} has an empty name",
                idx + 1
            )));
        }
        if !seen.insert(process.name.as_str()) {
            return Err(PaladinError::Config(format!(
                "duplicate process name '{}'",
                process.name
            )));
        }
        if process.path.as_os_str().is_empty() {
            return Err(PaladinError::Config(format!(
                "process '{}' has an empty path",
                process.name
            )));
        }
    }

    Ok(())
}

fn validate_soft_depends(cfg: &RawConfigFile) -> Result<()> {
    let names: HashSet<&str> = cfg.process.iter().map(|p| p.name.as_str()).collect();

    for process in cfg.process.iter() {
        for dep in process.soft_depends.iter() {
            if dep == &process.name {
                return Err(PaladinError::Config(format!(
                    "process '{}' cannot depend on itself in `soft_depends`",
                    process.name
                )));
            }
            if !names.contains(dep.as_str()) {
                return Err(PaladinError::Config(format!(
                    "process '{}' has unknown dependency '{}' in `soft_depends`",
                    process.name, dep
                )));
            }
        }
    }
    Ok(())
}

fn validate_dependency_graph(cfg: &RawConfigFile) -> Result<()> {
    // Edge direction: dependency -> dependent.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for process in cfg.process.iter() {
        graph.add_node(process.name.as_str());
    }

    for process in cfg.process.iter() {
        for dep in process.soft_depends.iter() {
            graph.add_edge(dep.as_str(), process.name.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(PaladinError::DependencyCycle(format!(
            "cycle detected in soft_depends involving process '{}'",
            cycle.node_id()
        ))),
    }
}
