//! Subcommand implementations. Each renders its report as a String so the
//! binary only has to print it.

use anyhow::{anyhow, Context, Result};
use engine_config::CentralConfig;
use idea_mcts::{IdeaTree, NodeId, TreeNode, ViabilityGates};
use std::fmt::Write;
use std::path::Path;
use tracing::debug;

use crate::config::search_config;

const PREVIEW_CHARS: usize = 72;

pub fn load_tree(path: &Path) -> Result<IdeaTree> {
    let tree = IdeaTree::load_from_file(path)
        .with_context(|| format!("Failed to load tree from {}", path.display()))?;
    debug!(path = %path.display(), nodes = tree.len(), "Tree loaded");
    Ok(tree)
}

/// First line of `content`, cut to a fixed width.
fn preview(content: &str) -> String {
    let line = content.lines().next().unwrap_or("");
    if line.chars().count() > PREVIEW_CHARS {
        let cut: String = line.chars().take(PREVIEW_CHARS - 3).collect();
        format!("{cut}...")
    } else {
        line.to_string()
    }
}

fn score_label(node: &TreeNode) -> String {
    match node.state.average_score {
        Some(score) if score > 0.0 => format!("{score:.1}"),
        _ => "-".to_string(),
    }
}

fn action_label(node: &TreeNode) -> &'static str {
    node.action.map_or("root", |a| a.label())
}

pub fn inspect(tree: &IdeaTree, max_depth: Option<u32>) -> String {
    let stats = tree.stats();
    let mut out = String::new();

    let _ = writeln!(out, "nodes:         {}", stats.total_nodes);
    let _ = writeln!(out, "reviewed:      {}", stats.reviewed_nodes);
    let _ = writeln!(out, "max depth:     {}", stats.max_depth);
    let _ = writeln!(out, "root visits:   {}", stats.root_visits);
    let _ = writeln!(out, "root value:    {:.4}", stats.root_value);
    out.push('\n');

    let mut stack = vec![(tree.root(), 0u32)];
    while let Some((id, level)) = stack.pop() {
        let node = tree.get(id);
        let _ = writeln!(
            out,
            "{}[{}] {:<20} N={:<4} V={:.3} score={:<4} {}",
            "  ".repeat(level as usize),
            id,
            action_label(node),
            node.visit_count,
            node.value,
            score_label(node),
            preview(&node.state.content)
        );

        if max_depth.map_or(true, |d| level < d) {
            // Reversed so children print in creation order
            stack.extend(node.children.iter().rev().map(|(_, c)| (*c, level + 1)));
        }
    }

    out
}

pub fn best(tree: &IdeaTree, gates: &ViabilityGates) -> String {
    let Some(id) = tree.global_best_node(gates) else {
        return "No reviewed idea clears the configured gates.\n".to_string();
    };
    let mut out = String::new();
    let _ = writeln!(out, "Best idea: node {id} (score {})", score_label(tree.get(id)));
    if !gates.is_empty() {
        let list: Vec<String> = gates
            .thresholds()
            .iter()
            .map(|(aspect, t)| format!("{aspect}>={t}"))
            .collect();
        let _ = writeln!(out, "Gates: {}", list.join(", "));
    }
    out.push('\n');
    out.push_str(&describe_node(tree, id));
    out
}

pub fn node(tree: &IdeaTree, id: u32) -> Result<String> {
    let id = NodeId(id);
    tree.find(id)
        .ok_or_else(|| anyhow!("Node {} not found (tree has {} nodes)", id, tree.len()))?;
    Ok(describe_node(tree, id))
}

fn describe_node(tree: &IdeaTree, id: NodeId) -> String {
    let node = tree.get(id);
    let state = &node.state;
    let mut out = String::new();

    let path: Vec<String> = tree
        .trajectory(id)
        .into_iter()
        .map(|step| format!("{} ({})", step, action_label(tree.get(step))))
        .collect();
    let _ = writeln!(out, "Path:    {}", path.join(" -> "));
    let _ = writeln!(out, "Depth:   {}", state.depth);
    let _ = writeln!(out, "Visits:  {}  Value: {:.4}", node.visit_count, node.value);
    let _ = writeln!(out, "Score:   {}", score_label(node));
    if let Some(subject) = &state.subject {
        let _ = writeln!(out, "Subject: {subject}");
    }
    let _ = writeln!(out, "Goal:    {}", state.research_goal);

    if !state.review_scores.is_empty() {
        let _ = writeln!(out, "\nReview:");
        for (aspect, score) in &state.review_scores {
            let _ = write!(out, "  {aspect:<26} {score:>4.1}");
            match state.review_feedback.get(aspect) {
                Some(feedback) => {
                    let _ = writeln!(out, "  {}", preview(feedback));
                }
                None => out.push('\n'),
            }
        }
    }

    if let Some(feedback) = state.latest_feedback() {
        let _ = writeln!(out, "\nLatest feedback: {}", preview(feedback));
    }
    if !state.retrieved_knowledge.is_empty() {
        let _ = writeln!(
            out,
            "Retrieved records: {}",
            state.retrieved_knowledge.len()
        );
    }

    let _ = writeln!(out, "\n{}", state.content);
    out
}

pub fn show_config(central: &CentralConfig) -> String {
    let search = search_config(central);
    let mut out = String::new();

    let _ = writeln!(out, "[common]");
    let _ = writeln!(out, "data_dir = {:?}", central.common.data_dir);
    let _ = writeln!(out, "log_level = {:?}", central.common.log_level);
    let _ = writeln!(out, "\n# read by embedding applications, not by ideatree");
    let _ = writeln!(out, "[search]");
    let _ = writeln!(out, "iterations = {}", search.iterations);
    let _ = writeln!(out, "exploration_constant = {}", search.exploration_constant);
    let _ = writeln!(out, "max_depth = {}", search.max_depth);
    let _ = writeln!(out, "discount_factor = {}", search.discount_factor);
    let _ = writeln!(
        out,
        "max_iterations_per_request = {}",
        search.max_iterations_per_request
    );
    let _ = writeln!(out, "seed = {}", search.seed);
    let _ = writeln!(out, "\n[gating.thresholds]");
    for (aspect, threshold) in search.gates.thresholds() {
        let _ = writeln!(out, "{aspect} = {threshold}");
    }

    if let Err(e) = search.validate() {
        let _ = writeln!(out, "\n# warning: {e}");
    }
    out
}
