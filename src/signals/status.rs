// src/signals/status.rs

use std::io::{self, Write};

use crate::types::RegistrySnapshot;

const HEADERS: [&str; 7] = ["NAME", "RUNNING", "PID", "PATH", "ARGS", "USER", "GROUP"];

/// Write a table of every process: name, running flag, pid, path, args,
/// user and group.
pub fn render_status_table(snapshot: &RegistrySnapshot, out: &mut dyn Write) -> io::Result<()> {
    let rows: Vec<[String; 7]> = snapshot
        .processes
        .iter()
        .map(|p| {
            [
                p.name.clone(),
                if p.running { "yes" } else { "no" }.to_string(),
                p.pid.map(|pid| pid.to_string()).unwrap_or_else(|| "-".to_string()),
                p.path.display().to_string(),
                p.args.clone(),
                p.user.clone(),
                p.group.clone(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in rows.iter() {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.len());
        }
    }

    write_row(out, &HEADERS.map(str::to_string), &widths)?;
    for row in rows.iter() {
        write_row(out, row, &widths)?;
    }
    out.flush()
}

fn write_row(out: &mut dyn Write, cells: &[String; 7], widths: &[usize; 7]) -> io::Result<()> {
    let line = cells
        .iter()
        .zip(widths.iter())
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(out, "{}", line.trim_end())
}
