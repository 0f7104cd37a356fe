//! Human-readable summaries of the engine's decisions.
//!
//! The summarizer explains, on standard error, what the engine decided and
//! why: which resources move, which matches were too ambiguous to act on,
//! and which resources matched nothing. Higher verbosity levels add more
//! detail. None of this is decision logic; the move set is already final by
//! the time it is rendered.

use std::collections::{HashMap, HashSet};

use colored::{ColoredString, Colorize};
use tabled::{Table, Tabled};

use crate::engine::{Comparison, Move, Resource};

/// Renders the engine's decisions for a human operator.
#[derive(Debug)]
pub struct Summarizer<'a> {
    moves: &'a [Move],
    comparisons: &'a [Comparison],
    verbosity: u8,

    match_count_by_creation: HashMap<String, usize>,
    match_count_by_deletion: HashMap<String, usize>,
}

/// One resolved move, for table display.
#[derive(Tabled)]
struct MoveRow {
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "To")]
    to: String,
    #[tabled(rename = "Module")]
    module: String,
}

impl<'a> Summarizer<'a> {
    /// Creates a summarizer over a resolved move set and the comparisons it
    /// was derived from.
    #[must_use]
    pub fn new(moves: &'a [Move], comparisons: &'a [Comparison], verbosity: u8) -> Self {
        let mut match_count_by_creation: HashMap<String, usize> = HashMap::new();
        let mut match_count_by_deletion: HashMap<String, usize> = HashMap::new();
        for comparison in comparisons {
            if comparison.is_match() {
                *match_count_by_creation
                    .entry(comparison.planned_for_creation.id())
                    .or_default() += 1;
                *match_count_by_deletion
                    .entry(comparison.planned_for_deletion.id())
                    .or_default() += 1;
            }
        }

        Self {
            moves,
            comparisons,
            verbosity,
            match_count_by_creation,
            match_count_by_deletion,
        }
    }

    /// Renders the full summary.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut sections = vec![self.headline()];

        if !self.moves.is_empty() {
            sections.push(self.moves_table());
        }

        if self.verbosity >= 1 {
            let ambiguous = self.ambiguous_match_sections();
            if !ambiguous.is_empty() {
                sections.push(legend());
                sections.extend(ambiguous);
            }
        }

        if self.verbosity >= 2 {
            sections.extend(self.no_match_sections());
        }

        sections.join("\n\n")
    }

    /// The one-line outcome: how much was compared and what came of it.
    fn headline(&self) -> String {
        let matches = self.comparisons.iter().filter(|c| c.is_match()).count();
        format!(
            "{} compared, {}, {}",
            plural(self.comparisons.len(), "resource pair"),
            plural(matches, "match").magenta().bold(),
            styled_num_moves(self.moves.len())
        )
    }

    /// The resolved moves, one row each.
    fn moves_table(&self) -> String {
        let rows: Vec<MoveRow> = self
            .moves
            .iter()
            .map(|m| MoveRow {
                from: m.source_address.clone(),
                to: m.destination_address.clone(),
                module: if m.is_within_module() {
                    m.source_module.clone()
                } else {
                    format!("{} -> {}", m.source_module, m.destination_module)
                },
            })
            .collect();

        Table::new(rows).to_string()
    }

    /// One section per resource whose identity was too ambiguous to move:
    /// it matched more than one counterpart, so the resolver left it alone.
    fn ambiguous_match_sections(&self) -> Vec<String> {
        let mut sections = Vec::new();
        let mut seen = HashSet::new();

        for comparison in self.comparisons {
            let create = &comparison.planned_for_creation;
            if self.match_count_by_creation.get(&create.id()).copied().unwrap_or(0) > 1
                && seen.insert(create.id())
            {
                sections.push(self.matches_for_creation(create));
            }

            let delete = &comparison.planned_for_deletion;
            if self.match_count_by_deletion.get(&delete.id()).copied().unwrap_or(0) > 1
                && seen.insert(delete.id())
            {
                sections.push(self.matches_for_deletion(delete));
            }
        }

        sections
    }

    /// One section per resource that matched nothing at all.
    fn no_match_sections(&self) -> Vec<String> {
        let mut sections = Vec::new();
        let mut seen = HashSet::new();

        for comparison in self.comparisons {
            let create = &comparison.planned_for_creation;
            if !self.match_count_by_creation.contains_key(&create.id()) && seen.insert(create.id()) {
                sections.push(self.non_matches_for_creation(create));
            }

            let delete = &comparison.planned_for_deletion;
            if !self.match_count_by_deletion.contains_key(&delete.id()) && seen.insert(delete.id()) {
                sections.push(self.non_matches_for_deletion(delete));
            }
        }

        sections
    }

    fn matches_for_creation(&self, resource: &Resource) -> String {
        let items: Vec<String> = self
            .comparisons
            .iter()
            .filter(|c| c.planned_for_creation.id() == resource.id() && c.is_match())
            .map(|c| {
                join_parts(
                    annotated_resource(&c.planned_for_deletion, &annotation_delete()),
                    styled_attributes(c),
                )
            })
            .collect();

        format!(
            "{} for {}\n{}",
            styled_num_matches(items.len()),
            annotated_resource(resource, &annotation_create()),
            box_items(&items, |s| s.magenta().bold())
        )
    }

    fn matches_for_deletion(&self, resource: &Resource) -> String {
        let items: Vec<String> = self
            .comparisons
            .iter()
            .filter(|c| c.planned_for_deletion.id() == resource.id() && c.is_match())
            .map(|c| {
                join_parts(
                    annotated_resource(&c.planned_for_creation, &annotation_create()),
                    styled_attributes(c),
                )
            })
            .collect();

        format!(
            "{} for {}\n{}",
            styled_num_matches(items.len()),
            annotated_resource(resource, &annotation_delete()),
            box_items(&items, |s| s.magenta().bold())
        )
    }

    fn non_matches_for_creation(&self, resource: &Resource) -> String {
        // Only show counterparts that matched nothing themselves; pairing a
        // matchless resource with an already-matched one explains nothing.
        let items: Vec<String> = self
            .comparisons
            .iter()
            .filter(|c| {
                c.planned_for_creation.id() == resource.id()
                    && !c.is_match()
                    && !self
                        .match_count_by_deletion
                        .contains_key(&c.planned_for_deletion.id())
            })
            .map(|c| {
                join_parts(
                    annotated_resource(&c.planned_for_deletion, &annotation_delete()),
                    styled_attributes(c),
                )
            })
            .collect();

        format!(
            "{} for {}\n{}",
            styled_num_matches(0),
            annotated_resource(resource, &annotation_create()),
            box_items(&items, |s| s.red().bold())
        )
    }

    fn non_matches_for_deletion(&self, resource: &Resource) -> String {
        let items: Vec<String> = self
            .comparisons
            .iter()
            .filter(|c| {
                c.planned_for_deletion.id() == resource.id()
                    && !c.is_match()
                    && !self
                        .match_count_by_creation
                        .contains_key(&c.planned_for_creation.id())
            })
            .map(|c| {
                join_parts(
                    annotated_resource(&c.planned_for_creation, &annotation_create()),
                    styled_attributes(c),
                )
            })
            .collect();

        format!(
            "{} for {}\n{}",
            styled_num_matches(0),
            annotated_resource(resource, &annotation_delete()),
            box_items(&items, |s| s.red().bold())
        )
    }
}

/// Explains what the symbols in explanation sections mean.
fn legend() -> String {
    [
        String::from("The following symbols are used below:"),
        format!("  {} the resource planned for creation has this attribute", symbol_create()),
        format!("  {} the resource planned for deletion has this attribute", symbol_delete()),
        format!("  {} differences in this attribute are ignored because of a rule", symbol_ignored()),
    ]
    .join("\n")
}

/// The ignored and mismatching attributes of one comparison, one line per
/// value.
fn styled_attributes(comparison: &Comparison) -> String {
    let mut lines = Vec::new();

    for attribute in &comparison.ignored {
        lines.push(format!("{} {attribute}", symbol_ignored()));
    }

    for attribute in &comparison.mismatching {
        if let Some(value) = comparison.planned_for_creation.attributes.get(attribute) {
            lines.push(format!("{} {attribute} = {value}", symbol_create()));
        }
        if let Some(value) = comparison.planned_for_deletion.attributes.get(attribute) {
            lines.push(format!("{} {attribute} = {value}", symbol_delete()));
        }
    }

    lines.join("\n")
}

/// Styles a move count for the closing status line.
#[must_use]
pub fn styled_num_moves(n: usize) -> String {
    plural(n, "move").green().bold().to_string()
}

fn styled_num_matches(n: usize) -> String {
    if n == 0 {
        "0 matches".red().bold().to_string()
    } else {
        plural(n, "match").magenta().bold().to_string()
    }
}

fn plural(n: usize, noun: &str) -> String {
    match (n, noun) {
        (1, _) => format!("1 {noun}"),
        (_, "match") => format!("{n} matches"),
        _ => format!("{n} {noun}s"),
    }
}

fn symbol_create() -> ColoredString {
    "+".green().bold()
}

fn symbol_delete() -> ColoredString {
    "-".red().bold()
}

fn symbol_ignored() -> ColoredString {
    "~".yellow().bold()
}

fn annotation_create() -> String {
    format!("({})", "create".green().bold())
}

fn annotation_delete() -> String {
    format!("({})", "delete".red().bold())
}

fn annotated_resource(resource: &Resource, annotation: &str) -> String {
    format!(
        "{} {annotation} in {}",
        resource.address.bold(),
        resource.module_id.bold()
    )
}

fn join_parts(header: String, attributes: String) -> String {
    if attributes.is_empty() {
        header
    } else {
        format!("{header}\n\n{attributes}")
    }
}

/// Draws a list of items in a left-edged box:
///
/// ```text
/// ├─
/// │ first item
/// ├─
/// │ second item
/// └─
/// ```
fn box_items(items: &[String], paint: impl Fn(&str) -> ColoredString) -> String {
    let start = paint("├─").to_string();
    let line = paint("│").to_string();
    let separator = paint("├─").to_string();
    let end = paint("└─").to_string();

    let mut boxed = String::new();
    boxed.push_str(&start);
    boxed.push('\n');

    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            boxed.push_str(&separator);
            boxed.push('\n');
        }
        for item_line in item.lines() {
            let prefixed = format!("{line} {item_line}");
            boxed.push_str(prefixed.trim_end());
            boxed.push('\n');
        }
        if item.is_empty() {
            boxed.push_str(&line);
            boxed.push('\n');
        }
    }

    boxed.push_str(&end);
    boxed
}
