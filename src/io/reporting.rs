// src/io/reporting.rs

use crate::error::MdpResult;
use crate::model::inventory::Solution;
use crate::model::matrix::Matrix;
use crate::simulation::engine::{HistoryRecord, SimulationSummary};
use std::io::Write;

/// Renders a table with one line per row and aligned columns.
fn render_rows(title: &str, rows: &[Vec<String>]) -> String {
    let width = rows
        .iter()
        .flat_map(|row| row.iter().map(String::len))
        .max()
        .unwrap_or(1);

    let mut out = format!("{title} =\n");
    for (i, row) in rows.iter().enumerate() {
        let cells: Vec<String> = row.iter().map(|c| format!("{c:>width$}")).collect();
        out.push_str(&format!("  {i:>3} | {}\n", cells.join("  ")));
    }
    out
}

fn format_value(value: f64) -> String {
    format!("{value:.4}")
}

/// Text rendering of a real-valued matrix.
pub fn render_matrix(title: &str, matrix: &Matrix) -> String {
    let rows: Vec<Vec<String>> = matrix
        .iter_rows()
        .map(|row| row.iter().copied().map(format_value).collect())
        .collect();
    render_rows(title, &rows)
}

/// Writes `P`, `R`, `u` and `a` in human-readable form.
///
/// Infeasible reward cells and the decision-free terminal policy row
/// print as `x` and `-`.
pub fn write_text_report<W: Write>(out: &mut W, solution: &Solution) -> MdpResult<()> {
    writeln!(
        out,
        "T = {}, s = {}, rule = {:?}\n",
        solution.horizon(),
        solution.capacity(),
        solution.policy.rule
    )?;

    writeln!(
        out,
        "{}",
        render_matrix("Transition probability P[before_sold][after_sold]", solution.transition.matrix())
    )?;

    let reward_rows: Vec<Vec<String>> = solution
        .reward
        .feasible_rows()
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|cell| cell.map_or_else(|| "x".to_string(), format_value))
                .collect()
        })
        .collect();
    writeln!(out, "{}", render_rows("Reward matrix R[current_stock][action]", &reward_rows))?;

    writeln!(
        out,
        "{}",
        render_matrix("Cumulative maximum reward u[time][current_stock]", &solution.policy.values)
    )?;

    let horizon = solution.horizon();
    let action_rows: Vec<Vec<String>> = solution
        .policy
        .actions
        .iter_rows()
        .enumerate()
        .map(|(time, row)| {
            row.iter()
                .map(|a| if time == horizon { "-".to_string() } else { a.to_string() })
                .collect()
        })
        .collect();
    writeln!(out, "{}", render_rows("Best action a[time][current_stock]", &action_rows))?;

    Ok(())
}

/// Writes all four matrices as one CSV table.
///
/// Columns are `matrix,row,0,1,..,s`; every matrix has `s+1` columns.
/// Infeasible reward cells and the terminal policy row are left empty.
pub fn write_csv_report<W: Write>(out: W, solution: &Solution) -> MdpResult<()> {
    let mut wtr = csv::Writer::from_writer(out);
    let size = solution.capacity() + 1;

    let mut header = vec!["matrix".to_string(), "row".to_string()];
    header.extend((0..size).map(|c| c.to_string()));
    wtr.write_record(&header)?;

    let mut write_row = |name: &str, index: usize, cells: Vec<String>| -> MdpResult<()> {
        let mut record = vec![name.to_string(), index.to_string()];
        record.extend(cells);
        wtr.write_record(&record)?;
        Ok(())
    };

    for (i, row) in solution.transition.matrix().iter_rows().enumerate() {
        write_row("P", i, row.iter().map(f64::to_string).collect())?;
    }
    for (i, row) in solution.reward.feasible_rows().into_iter().enumerate() {
        let cells = row
            .into_iter()
            .map(|c| c.map(|v| v.to_string()).unwrap_or_default())
            .collect();
        write_row("R", i, cells)?;
    }
    for (t, row) in solution.policy.values.iter_rows().enumerate() {
        write_row("u", t, row.iter().map(f64::to_string).collect())?;
    }
    let horizon = solution.horizon();
    for (t, row) in solution.policy.actions.iter_rows().enumerate() {
        let cells = if t == horizon {
            vec![String::new(); size]
        } else {
            row.iter().map(usize::to_string).collect()
        };
        write_row("a", t, cells)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes the solution as pretty-printed JSON.
pub fn write_json_report<W: Write>(out: &mut W, solution: &Solution) -> MdpResult<()> {
    serde_json::to_writer_pretty(&mut *out, solution)?;
    writeln!(out)?;
    Ok(())
}

/// Writes the simulation history as CSV.
///
/// # Arguments
/// * `out` - Any writer, e.g. a locked stdout.
/// * `data` - The history records from the policy simulation.
pub fn write_simulation_log<W: Write>(out: W, data: &[HistoryRecord]) -> MdpResult<()> {
    let mut wtr = csv::Writer::from_writer(out);

    for record in data {
        wtr.serialize(record)?;
    }

    wtr.flush()?;
    tracing::debug!(rows = data.len(), "exported simulation history");
    Ok(())
}

pub fn write_simulation_summary<W: Write>(out: &mut W, summary: &SimulationSummary) -> MdpResult<()> {
    writeln!(out, "=== Policy Simulation ===")?;
    writeln!(out, "Runs: {}", summary.runs)?;
    writeln!(out, "Initial stock: {}", summary.initial_stock)?;
    writeln!(out, "Optimal value u[0][{}]: {:.4}", summary.initial_stock, summary.optimal_value)?;
    writeln!(out, "Predicted value of the policy: {:.4}", summary.predicted_value)?;
    writeln!(
        out,
        "Simulated mean reward: {:.4} (std. error {:.4})",
        summary.mean_reward, summary.std_error
    )?;
    Ok(())
}
