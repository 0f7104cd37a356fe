//! Move serialization.
//!
//! A resolved move set can be persisted in two forms: `moved` blocks that
//! Terraform applies declaratively, or a shell-executable sequence of
//! `terraform state mv` commands. Blocks only work when everything stays
//! within a single module; the command sequence also supports moves between
//! modules, which require transferring state between two state containers.

use std::io::Write;
use std::path::Path;

use chrono::Utc;

use crate::engine;
use crate::error::{OutputError, Result, TfremapError};

/// File name of the local working copy of a module's state during a
/// cross-module transfer.
const LOCAL_COPY_FILE_NAME: &str = "tfremap-local-copy.tfstate";

/// A `terraform state mv` operation between two working directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    /// The working directory the resource is being moved from.
    pub from_workdir: String,

    /// The working directory the resource is being moved to. Equal to
    /// `from_workdir` when the resource moves within the same module.
    pub to_workdir: String,

    /// The resource's address before the move.
    pub from_address: String,

    /// The resource's address after the move.
    pub to_address: String,
}

impl From<engine::Move> for Move {
    fn from(m: engine::Move) -> Self {
        Self {
            from_workdir: m.source_module,
            to_workdir: m.destination_module,
            from_address: m.source_address,
            to_address: m.destination_address,
        }
    }
}

/// Writes the moves as Terraform `moved` blocks.
///
/// # Errors
///
/// Returns [`OutputError::CrossModuleBlocks`] before writing anything if any
/// move crosses working directories: a `moved` block lives inside one
/// module's source code and cannot reference another module's state.
pub fn write_moved_blocks<W: Write>(w: &mut W, moves: &[Move]) -> Result<()> {
    for m in moves {
        if m.from_workdir != m.to_workdir {
            return Err(TfremapError::Output(OutputError::CrossModuleBlocks {
                source_module: m.from_workdir.clone(),
                destination_module: m.to_workdir.clone(),
            }));
        }
    }

    for m in moves {
        writeln!(w, "moved {{\n  from = {}\n  to   = {}\n}}", m.from_address, m.to_address)?;
    }

    Ok(())
}

/// Writes the moves as a newline-joined, directly executable command
/// sequence, backing up every state file it touches.
///
/// # Errors
///
/// Returns an error if writing to the sink fails.
pub fn write_move_commands<W: Write>(w: &mut W, moves: &[Move]) -> Result<()> {
    let commands = render_move_commands(moves, Utc::now().timestamp());

    if !commands.is_empty() {
        writeln!(w, "{}", commands.join("\n"))?;
    }

    Ok(())
}

/// Renders the command sequence with the given backup timestamp.
///
/// Moves within a single module become direct `state mv` commands. Moves
/// between modules need a state transfer: each touched module's state is
/// pulled into a local working copy exactly once, backed up before any
/// mutation, mutated locally by every move that touches it, and pushed back
/// exactly once after all of them. Pushing earlier would lose later moves;
/// pulling per move would overwrite earlier in-flight edits.
fn render_move_commands(moves: &[Move], backup_timestamp: i64) -> Vec<String> {
    let mut commands = Vec::new();

    // Start with moves within the same module.

    for m in moves {
        if m.from_workdir != m.to_workdir {
            continue;
        }

        let chdir_flag = if m.from_workdir == "." {
            String::new()
        } else {
            format!("-chdir={:?} ", m.from_workdir)
        };

        commands.push(format!(
            "terraform {}state mv {:?} {:?}",
            chdir_flag, m.from_address, m.to_address
        ));
    }

    // Then, pull the state of every module touched by a cross-module move,
    // once per module.

    let mut modules: Vec<&str> = moves
        .iter()
        .filter(|m| m.from_workdir != m.to_workdir)
        .flat_map(|m| [m.from_workdir.as_str(), m.to_workdir.as_str()])
        .collect();
    modules.sort_unstable();
    modules.dedup();

    for module in &modules {
        commands.push(format!(
            "terraform -chdir={:?} state pull > {:?}",
            module,
            local_copy_path(module)
        ));
    }

    // Snapshot a backup of each pulled state before mutating it.

    let backup_file_name = format!("tfremap-backup-{backup_timestamp}.tfstate");
    for module in &modules {
        commands.push(format!(
            "cp {:?} {:?}",
            local_copy_path(module),
            Path::new(module).join(&backup_file_name).display().to_string()
        ));
    }

    // Next, perform the cross-module moves against the local copies.

    for m in moves {
        if m.from_workdir == m.to_workdir {
            continue;
        }

        commands.push(format!(
            "terraform state mv -state={:?} -state-out={:?} {:?} {:?}",
            local_copy_path(&m.from_workdir),
            local_copy_path(&m.to_workdir),
            m.from_address,
            m.to_address
        ));
    }

    // Finally, push every touched module's local copy back to its state
    // store, once per module, after all of its moves have been applied.

    for module in &modules {
        commands.push(format!(
            "terraform -chdir={:?} state push {LOCAL_COPY_FILE_NAME:?}",
            module
        ));
    }

    commands
}

/// Path of a module's local state working copy.
fn local_copy_path(module: &str) -> String {
    Path::new(module).join(LOCAL_COPY_FILE_NAME).display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(from_workdir: &str, to_workdir: &str, from: &str, to: &str) -> Move {
        Move {
            from_workdir: from_workdir.to_owned(),
            to_workdir: to_workdir.to_owned(),
            from_address: from.to_owned(),
            to_address: to.to_owned(),
        }
    }

    #[test]
    fn test_blocks_within_one_module() {
        let moves = vec![
            mv(".", ".", "aws_instance.foo", "aws_instance.bar"),
            mv(".", ".", "aws_instance.baz", "aws_instance.qux"),
        ];

        let mut out = Vec::new();
        write_moved_blocks(&mut out, &moves).expect("write failed");

        let written = String::from_utf8(out).expect("invalid utf-8");
        assert_eq!(
            written,
            "moved {\n  from = aws_instance.foo\n  to   = aws_instance.bar\n}\n\
             moved {\n  from = aws_instance.baz\n  to   = aws_instance.qux\n}\n"
        );
    }

    #[test]
    fn test_blocks_reject_cross_module_moves_before_writing() {
        let moves = vec![
            mv(".", ".", "aws_instance.foo", "aws_instance.bar"),
            mv("module-a", "module-b", "aws_instance.baz", "aws_instance.qux"),
        ];

        let mut out = Vec::new();
        let result = write_moved_blocks(&mut out, &moves);

        assert!(matches!(
            result,
            Err(TfremapError::Output(OutputError::CrossModuleBlocks { .. }))
        ));
        assert!(out.is_empty(), "nothing may be written on error");
    }

    #[test]
    fn test_commands_within_one_module() {
        let moves = vec![mv("envs/prod", "envs/prod", "aws_instance.foo", "aws_instance.bar")];

        let commands = render_move_commands(&moves, 1_700_000_000);

        assert_eq!(
            commands,
            vec![
                "terraform -chdir=\"envs/prod\" state mv \"aws_instance.foo\" \"aws_instance.bar\""
            ]
        );
    }

    #[test]
    fn test_commands_omit_chdir_for_current_directory() {
        let moves = vec![mv(".", ".", "aws_instance.foo", "aws_instance.bar")];

        let commands = render_move_commands(&moves, 1_700_000_000);

        assert_eq!(
            commands,
            vec!["terraform state mv \"aws_instance.foo\" \"aws_instance.bar\""]
        );
    }

    #[test]
    fn test_cross_module_move_pulls_backs_up_moves_then_pushes() {
        let moves = vec![mv("A", "B", "aws_instance.foo", "aws_instance.bar")];

        let commands = render_move_commands(&moves, 1_700_000_000);

        assert_eq!(
            commands,
            vec![
                "terraform -chdir=\"A\" state pull > \"A/tfremap-local-copy.tfstate\"",
                "terraform -chdir=\"B\" state pull > \"B/tfremap-local-copy.tfstate\"",
                "cp \"A/tfremap-local-copy.tfstate\" \"A/tfremap-backup-1700000000.tfstate\"",
                "cp \"B/tfremap-local-copy.tfstate\" \"B/tfremap-backup-1700000000.tfstate\"",
                "terraform state mv -state=\"A/tfremap-local-copy.tfstate\" \
                 -state-out=\"B/tfremap-local-copy.tfstate\" \"aws_instance.foo\" \"aws_instance.bar\"",
                "terraform -chdir=\"A\" state push \"tfremap-local-copy.tfstate\"",
                "terraform -chdir=\"B\" state push \"tfremap-local-copy.tfstate\"",
            ]
        );
    }

    #[test]
    fn test_modules_are_pulled_and_pushed_once_despite_many_moves() {
        let moves = vec![
            mv("A", "B", "aws_instance.one", "aws_instance.uno"),
            mv("A", "B", "aws_instance.two", "aws_instance.dos"),
        ];

        let commands = render_move_commands(&moves, 1_700_000_000);

        let pulls = commands.iter().filter(|c| c.contains("state pull")).count();
        let pushes = commands.iter().filter(|c| c.contains("state push")).count();
        assert_eq!(pulls, 2, "one pull per touched module");
        assert_eq!(pushes, 2, "one push per touched module");

        // Every push comes after every move.
        let last_mv = commands
            .iter()
            .rposition(|c| c.contains("-state-out="))
            .expect("no move command");
        let first_push = commands
            .iter()
            .position(|c| c.contains("state push"))
            .expect("no push command");
        assert!(last_mv < first_push);
    }

    #[test]
    fn test_intra_module_moves_come_before_state_transfers() {
        let moves = vec![
            mv("A", "B", "aws_instance.foo", "aws_instance.bar"),
            mv("C", "C", "aws_instance.baz", "aws_instance.qux"),
        ];

        let commands = render_move_commands(&moves, 1_700_000_000);

        assert!(commands[0].starts_with("terraform -chdir=\"C\" state mv"));
        assert!(commands[1].contains("state pull"));
    }

    #[test]
    fn test_no_moves_render_no_commands() {
        let commands = render_move_commands(&[], 1_700_000_000);

        assert!(commands.is_empty());
    }
}
