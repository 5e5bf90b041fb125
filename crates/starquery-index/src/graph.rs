//! Load graph
//!
//! Forward edges go from a file path to the module labels it loads; reverse
//! edges go from a label back to the loading files. Labels are turned into
//! paths with [`module_to_path`] when a traversal needs to continue, and
//! external labels (`@repo//...`) end the traversal there.

use std::collections::{BTreeMap, HashMap, HashSet};

use starquery_core::module_to_path;
use tracing::debug;

use crate::Index;

/// Load relationships between indexed files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadGraph {
    /// file path -> module labels it loads, in statement order
    pub forward: BTreeMap<String, Vec<String>>,
    /// module label -> file paths loading it, sorted
    pub reverse: BTreeMap<String, Vec<String>>,
}

impl Index {
    /// Derive the load graph from every stored Load
    pub fn build_load_graph(&self) -> LoadGraph {
        let files = self.read();
        let mut paths: Vec<&String> = files.keys().collect();
        paths.sort();

        let mut graph = LoadGraph::default();
        for path in paths {
            let Some(file) = files.get(path) else {
                continue;
            };
            let modules: Vec<String> = file.loads.iter().map(|l| l.module.clone()).collect();
            for module in &modules {
                let loaders = graph.reverse.entry(module.clone()).or_default();
                if loaders.last() != Some(path) {
                    loaders.push(path.clone());
                }
            }
            graph.forward.insert(path.clone(), modules);
        }

        debug!(
            "Built load graph: {} files, {} modules",
            graph.forward.len(),
            graph.reverse.len()
        );
        graph
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

impl LoadGraph {
    /// Files that directly load `module`
    pub fn loaded_by(&self, module: &str) -> &[String] {
        self.reverse.get(module).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every module label reachable from `path` by following loads, in
    /// depth-first discovery order. Each label appears once even when it is
    /// reachable through several paths or through a cycle.
    pub fn all_loads(&self, path: &str) -> Vec<String> {
        let mut visited = HashSet::new();
        let mut result = Vec::new();
        self.collect_loads(path, &mut visited, &mut result);
        result
    }

    fn collect_loads(&self, path: &str, visited: &mut HashSet<String>, result: &mut Vec<String>) {
        let Some(modules) = self.forward.get(path) else {
            return;
        };
        for module in modules {
            if !visited.insert(module.clone()) {
                continue;
            }
            result.push(module.clone());
            let next = module_to_path(module);
            if !next.is_empty() {
                self.collect_loads(&next, visited, result);
            }
        }
    }

    /// Find load cycles. Each cycle lists file paths from its first node
    /// back to that same node, e.g. `[a.bzl, b.bzl, a.bzl]`.
    pub fn detect_cycles(&self) -> Vec<Vec<String>> {
        let mut color: HashMap<&str, Color> = HashMap::new();
        let mut cycles = Vec::new();

        for start in self.forward.keys() {
            if color.get(start.as_str()).copied().unwrap_or(Color::White) != Color::White {
                continue;
            }

            // (node, index of the next edge to follow)
            let mut frames: Vec<(String, usize)> = vec![(start.clone(), 0)];
            let mut path: Vec<String> = vec![start.clone()];
            color.insert(start.as_str(), Color::Gray);

            while let Some((node, next)) = frames.last_mut() {
                let edges = self.forward.get(node.as_str()).map(Vec::as_slice).unwrap_or(&[]);
                let Some(module) = edges.get(*next) else {
                    let (done, _) = frames.pop().unwrap_or_default();
                    path.pop();
                    if let Some((key, _)) = self.forward.get_key_value(done.as_str()) {
                        color.insert(key.as_str(), Color::Black);
                    }
                    continue;
                };
                *next += 1;

                let target = module_to_path(module);
                if target.is_empty() {
                    continue;
                }
                let Some((target_key, _)) = self.forward.get_key_value(target.as_str()) else {
                    // Not indexed: nothing to follow
                    continue;
                };

                match color.get(target_key.as_str()).copied().unwrap_or(Color::White) {
                    Color::White => {
                        color.insert(target_key.as_str(), Color::Gray);
                        frames.push((target.clone(), 0));
                        path.push(target);
                    }
                    Color::Gray => {
                        if let Some(pos) = path.iter().position(|p| *p == target) {
                            let mut cycle = path[pos..].to_vec();
                            cycle.push(target);
                            cycles.push(cycle);
                        }
                    }
                    Color::Black => {}
                }
            }
        }

        debug!("Found {} load cycles", cycles.len());
        cycles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn graph(edges: &[(&str, &[&str])]) -> LoadGraph {
        let mut graph = LoadGraph::default();
        for (file, modules) in edges {
            let modules: Vec<String> = modules.iter().map(|m| m.to_string()).collect();
            for module in &modules {
                graph
                    .reverse
                    .entry(module.clone())
                    .or_default()
                    .push(file.to_string());
            }
            graph.forward.insert(file.to_string(), modules);
        }
        graph
    }

    #[test]
    fn test_loaded_by() {
        let g = graph(&[
            ("a/BUILD", &["//lib:defs.bzl"]),
            ("b/BUILD", &["//lib:defs.bzl", "@rules_cc//cc:defs.bzl"]),
        ]);
        assert_eq!(g.loaded_by("//lib:defs.bzl"), ["a/BUILD", "b/BUILD"]);
        assert_eq!(g.loaded_by("@rules_cc//cc:defs.bzl"), ["b/BUILD"]);
        assert!(g.loaded_by("//missing:x.bzl").is_empty());
        assert!(LoadGraph::default().loaded_by("//lib:defs.bzl").is_empty());
    }

    #[test]
    fn test_all_loads_diamond() {
        let g = graph(&[
            ("BUILD", &["//lib:a.bzl", "//lib:b.bzl"]),
            ("lib/a.bzl", &["//lib:common.bzl"]),
            ("lib/b.bzl", &["//lib:common.bzl", "@ext//:x.bzl"]),
            ("lib/common.bzl", &[]),
        ]);
        assert_eq!(
            g.all_loads("BUILD"),
            vec!["//lib:a.bzl", "//lib:common.bzl", "//lib:b.bzl", "@ext//:x.bzl"]
        );
        assert!(g.all_loads("unknown.bzl").is_empty());
    }

    #[test]
    fn test_all_loads_cycle_terminates() {
        let g = graph(&[
            ("cycle/a.bzl", &["//cycle:b.bzl"]),
            ("cycle/b.bzl", &["//cycle:c.bzl"]),
            ("cycle/c.bzl", &["//cycle:a.bzl"]),
        ]);
        assert_eq!(
            g.all_loads("cycle/a.bzl"),
            vec!["//cycle:b.bzl", "//cycle:c.bzl", "//cycle:a.bzl"]
        );
    }

    #[test]
    fn test_detect_cycles() {
        let g = graph(&[
            ("cycle/a.bzl", &["//cycle:b.bzl"]),
            ("cycle/b.bzl", &["//cycle:c.bzl"]),
            ("cycle/c.bzl", &["//cycle:a.bzl"]),
            ("self.bzl", &["//:self.bzl"]),
            ("ok.bzl", &["//cycle:a.bzl", "@ext//:x.bzl"]),
        ]);
        let cycles = g.detect_cycles();
        assert_eq!(
            cycles,
            vec![
                vec!["cycle/a.bzl", "cycle/b.bzl", "cycle/c.bzl", "cycle/a.bzl"],
                vec!["self.bzl", "self.bzl"],
            ]
        );
    }

    #[test]
    fn test_acyclic() {
        let g = graph(&[
            ("BUILD", &["//lib:a.bzl", "//lib:b.bzl"]),
            ("lib/a.bzl", &["//lib:b.bzl"]),
            ("lib/b.bzl", &[]),
        ]);
        assert!(g.detect_cycles().is_empty());
        assert!(LoadGraph::default().detect_cycles().is_empty());
    }
}
