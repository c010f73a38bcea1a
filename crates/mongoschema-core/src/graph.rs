use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::declarations::DeclarationGraph;

/// Summary of the record nesting graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NestingGraphSummary {
    pub records: usize,
    pub edges: usize,
}

/// Report of record nesting: embedded records are ordered before the
/// records that embed them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NestingGraphReport {
    pub summary: NestingGraphSummary,
    pub build_order: Option<Vec<String>>,
    pub cycle: Option<Vec<String>>,
}

impl NestingGraphReport {
    pub fn has_cycle(&self) -> bool {
        self.cycle.is_some()
    }
}

/// Build a deterministic nesting report for a declaration graph.
///
/// Only references to declared records become edges; unresolved names are
/// left for the compiler to report.
pub fn build_nesting_graph_report(graph: &DeclarationGraph) -> NestingGraphReport {
    let nesting = build_nesting(graph);
    let records = nesting.len();
    let edges = nesting.values().map(|embedders| embedders.len()).sum();
    let summary = NestingGraphSummary { records, edges };

    match toposort(&nesting) {
        Ok(order) => NestingGraphReport {
            summary,
            build_order: Some(order),
            cycle: None,
        },
        Err(cycle) => NestingGraphReport {
            summary,
            build_order: None,
            cycle: Some(cycle),
        },
    }
}

/// Edges point from an embedded record to every record that embeds it.
fn build_nesting(graph: &DeclarationGraph) -> BTreeMap<String, BTreeSet<String>> {
    let mut nesting: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for record in graph.records() {
        nesting.entry(record.name.clone()).or_default();

        for property in &record.properties {
            let Some(embedded) = property.type_ref.referenced_record() else {
                continue;
            };
            if graph.record(embedded).is_none() {
                continue;
            }
            nesting
                .entry(embedded.to_string())
                .or_default()
                .insert(record.name.clone());
        }
    }

    nesting
}

fn toposort(nesting: &BTreeMap<String, BTreeSet<String>>) -> Result<Vec<String>, Vec<String>> {
    let mut pending_inbound: BTreeMap<&str, usize> =
        nesting.keys().map(|name| (name.as_str(), 0)).collect();

    for embedders in nesting.values() {
        for embedder in embedders {
            *pending_inbound.entry(embedder.as_str()).or_insert(0) += 1;
        }
    }

    let mut ready: BTreeSet<&str> = pending_inbound
        .iter()
        .filter(|(_, count)| **count == 0)
        .map(|(name, _)| *name)
        .collect();

    let mut order = Vec::with_capacity(nesting.len());

    while let Some(name) = ready.pop_first() {
        order.push(name.to_string());

        let Some(embedders) = nesting.get(name) else {
            continue;
        };
        for embedder in embedders {
            if let Some(count) = pending_inbound.get_mut(embedder.as_str()) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    ready.insert(embedder.as_str());
                }
            }
        }
    }

    if order.len() == nesting.len() {
        Ok(order)
    } else {
        let leftover = pending_inbound
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .map(|(name, _)| name)
            .collect();
        Err(cycle_members(nesting, leftover))
    }
}

/// Narrow the records Kahn's pass could not order down to those on a cycle.
///
/// Records that merely embed a cyclic record keep no edge into the leftover
/// set once their own embedders are pruned.
fn cycle_members<'a>(
    nesting: &'a BTreeMap<String, BTreeSet<String>>,
    mut leftover: BTreeSet<&'a str>,
) -> Vec<String> {
    loop {
        let dangling: Vec<&str> = leftover
            .iter()
            .copied()
            .filter(|name| {
                !nesting.get(*name).is_some_and(|embedders| {
                    embedders
                        .iter()
                        .any(|embedder| leftover.contains(embedder.as_str()))
                })
            })
            .collect();

        if dangling.is_empty() {
            return leftover.into_iter().map(str::to_string).collect();
        }
        for name in dangling {
            leftover.remove(name);
        }
    }
}
