//! 别名图与解析器
//!
//! `edges` 保存声明的别名边（别名 -> 目标，目标可能仍是别名），
//! `resolved` 是派生表（别名 -> 终端键）。每次别名变更后都要通过
//! [`AliasGraph::refresh`] 让 `resolved` 与 `edges` 保持一致。

use crate::errors::ContainerError;
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Default)]
pub(crate) struct AliasGraph {
    edges: HashMap<String, String>,
    resolved: HashMap<String, String>,
}

impl AliasGraph {
    /// 插入或覆盖一条别名边，调用方负责随后调用 `refresh`
    ///
    /// 返回该别名原先是否指向另一个目标。
    pub fn declare(&mut self, alias: String, target: String) -> bool {
        let redeclared = self.edges.get(&alias).is_some_and(|old| *old != target);
        self.edges.insert(alias, target);
        redeclared
    }

    /// 沿别名边走到终端键，同一次遍历中重复出现的键视为环
    pub fn resolve(&self, start: &str) -> Result<String, ContainerError> {
        let mut visited = HashSet::new();
        let mut current = start;

        while let Some(next) = self.edges.get(current) {
            if !visited.insert(current) {
                return Err(ContainerError::CyclicAlias {
                    key: current.to_string(),
                });
            }
            current = next.as_str();
        }

        Ok(current.to_string())
    }

    /// 重新计算给定别名的终端键
    pub fn recompute<'a, I>(&mut self, keys: I) -> Result<(), ContainerError>
    where
        I: IntoIterator<Item = &'a String>,
    {
        for key in keys {
            let terminal = self.resolve(key)?;
            self.resolved.insert(key.clone(), terminal);
        }
        Ok(())
    }

    /// 在一批别名声明插入之后更新派生表
    ///
    /// 首次配置直接解析整批别名。之后的批次里，如果某个新别名同时是
    /// 本批另一个别名的目标（批内互相链接），或者批内改写了已有别名的
    /// 目标（`redeclared`），整张图全部重算；否则只解析新别名，并把终端
    /// 恰好落在新别名上的旧条目改写到新别名的终端。
    pub fn refresh(
        &mut self,
        batch: &HashMap<String, String>,
        first_pass: bool,
        redeclared: bool,
    ) -> Result<(), ContainerError> {
        if first_pass {
            return self.recompute(batch.keys());
        }

        let targets: HashSet<&String> = batch.values().collect();
        let intersecting = batch.keys().any(|alias| targets.contains(alias));

        if intersecting || redeclared {
            tracing::debug!(batch = batch.len(), intersecting, redeclared, "Recomputing all aliases");
            let all: Vec<String> = self.edges.keys().cloned().collect();
            return self.recompute(all.iter());
        }

        self.recompute(batch.keys())?;

        let stale: Vec<(String, String)> = self
            .resolved
            .iter()
            .filter(|(alias, terminal)| !batch.contains_key(*alias) && batch.contains_key(*terminal))
            .map(|(alias, terminal)| (alias.clone(), terminal.clone()))
            .collect();

        for (alias, via) in stale {
            let terminal = match self.resolved.get(&via) {
                Some(terminal) => terminal.clone(),
                None => self.resolve(&via)?,
            };
            tracing::debug!(alias = %alias, via = %via, terminal = %terminal, "Re-pointed resolved alias");
            self.resolved.insert(alias, terminal);
        }

        Ok(())
    }

    /// 检索时使用的终端键
    ///
    /// 优先使用预计算结果；预计算的终端若仍有出边（之前某批解析失败
    /// 留下的过期条目），或键只有边而没有预计算结果，则现场遍历一次。
    pub fn terminal<'a>(&self, key: &'a str) -> Result<Cow<'a, str>, ContainerError> {
        match self.resolved.get(key) {
            Some(terminal) if !self.edges.contains_key(terminal) => {
                Ok(Cow::Owned(terminal.clone()))
            }
            Some(_) => self.resolve(key).map(Cow::Owned),
            None if self.edges.contains_key(key) => self.resolve(key).map(Cow::Owned),
            None => Ok(Cow::Borrowed(key)),
        }
    }

    /// 已解析的别名（按别名排序）
    pub fn resolved_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .resolved
            .iter()
            .map(|(alias, terminal)| (alias.clone(), terminal.clone()))
            .collect();
        pairs.sort();
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(a, t)| (a.to_string(), t.to_string()))
            .collect()
    }

    fn apply(graph: &mut AliasGraph, pairs: &[(&str, &str)], first_pass: bool) -> Result<(), ContainerError> {
        let batch = batch(pairs);
        let mut redeclared = false;
        for (alias, target) in &batch {
            redeclared |= graph.declare(alias.clone(), target.clone());
        }
        graph.refresh(&batch, first_pass, redeclared)
    }

    fn terminal(graph: &AliasGraph, key: &str) -> String {
        graph.terminal(key).unwrap().into_owned()
    }

    #[test]
    fn test_resolve_without_edges_returns_start() {
        let graph = AliasGraph::default();
        assert_eq!(graph.resolve("plain").unwrap(), "plain");
        assert!(matches!(graph.terminal("plain").unwrap(), Cow::Borrowed("plain")));
    }

    #[test]
    fn test_multi_hop_chain() {
        let mut graph = AliasGraph::default();
        apply(&mut graph, &[("a", "b"), ("b", "c"), ("c", "d")], true).unwrap();

        assert_eq!(terminal(&graph, "a"), "d");
        assert_eq!(terminal(&graph, "b"), "d");
        assert_eq!(terminal(&graph, "c"), "d");
    }

    #[test]
    fn test_cycle_names_repeated_key() {
        let mut graph = AliasGraph::default();
        graph.declare("a".to_string(), "b".to_string());
        graph.declare("b".to_string(), "a".to_string());

        let err = graph.resolve("a").unwrap_err();
        assert!(matches!(err, ContainerError::CyclicAlias { ref key } if key == "a"));
    }

    #[test]
    fn test_self_alias_is_cycle() {
        let mut graph = AliasGraph::default();
        let err = apply(&mut graph, &[("a", "a")], true).unwrap_err();
        assert!(matches!(err, ContainerError::CyclicAlias { .. }));
    }

    #[test]
    fn test_later_batch_patches_stale_terminal() {
        let mut graph = AliasGraph::default();
        apply(&mut graph, &[("x", "y")], true).unwrap();
        assert_eq!(terminal(&graph, "x"), "y");

        // y 本身变成别名，x 的旧终端需要跟着改写
        apply(&mut graph, &[("y", "z")], false).unwrap();
        assert_eq!(terminal(&graph, "x"), "z");
        assert_eq!(terminal(&graph, "y"), "z");
    }

    #[test]
    fn test_later_batch_chains_through_existing_alias() {
        let mut graph = AliasGraph::default();
        apply(&mut graph, &[("a", "b")], true).unwrap();
        apply(&mut graph, &[("c", "a")], false).unwrap();

        assert_eq!(terminal(&graph, "c"), "b");
        assert_eq!(terminal(&graph, "a"), "b");
    }

    #[test]
    fn test_redeclared_alias_moves_chains_through_it() {
        let mut graph = AliasGraph::default();
        apply(&mut graph, &[("a", "b"), ("z", "a")], true).unwrap();
        assert_eq!(terminal(&graph, "z"), "b");

        // a 改指向 c，经过 a 的 z 也要跟着改
        apply(&mut graph, &[("a", "c")], false).unwrap();
        assert_eq!(terminal(&graph, "a"), "c");
        assert_eq!(terminal(&graph, "z"), "c");
        assert_eq!(
            graph.resolved_pairs(),
            vec![
                ("a".to_string(), "c".to_string()),
                ("z".to_string(), "c".to_string())
            ]
        );
    }

    #[test]
    fn test_declare_reports_changed_target_only() {
        let mut graph = AliasGraph::default();
        assert!(!graph.declare("a".to_string(), "b".to_string()));
        assert!(!graph.declare("a".to_string(), "b".to_string()));
        assert!(graph.declare("a".to_string(), "c".to_string()));
    }

    #[test]
    fn test_intersecting_batch_recomputes_everything() {
        let mut graph = AliasGraph::default();
        apply(&mut graph, &[("old", "p")], true).unwrap();

        // p -> q -> r 在同一批里互相链接
        apply(&mut graph, &[("p", "q"), ("q", "r")], false).unwrap();

        assert_eq!(terminal(&graph, "old"), "r");
        assert_eq!(terminal(&graph, "p"), "r");
        assert_eq!(terminal(&graph, "q"), "r");
    }

    #[test]
    fn test_failed_batch_leaves_cycle_detectable() {
        let mut graph = AliasGraph::default();
        apply(&mut graph, &[("a", "b")], true).unwrap();

        let err = apply(&mut graph, &[("b", "a")], false).unwrap_err();
        assert!(matches!(err, ContainerError::CyclicAlias { .. }));

        // a 的预计算终端已过期，检索时必须重新发现环
        assert!(matches!(graph.terminal("a"), Err(ContainerError::CyclicAlias { .. })));
        assert!(matches!(graph.terminal("b"), Err(ContainerError::CyclicAlias { .. })));
    }

    #[test]
    fn test_resolved_pairs_sorted() {
        let mut graph = AliasGraph::default();
        apply(&mut graph, &[("m", "n"), ("b", "n")], true).unwrap();

        assert_eq!(
            graph.resolved_pairs(),
            vec![
                ("b".to_string(), "n".to_string()),
                ("m".to_string(), "n".to_string())
            ]
        );
    }
}
