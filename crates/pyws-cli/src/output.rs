use pyws_core::maintenance::StepOutput;
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    for line in table_lines(headers, &rows) {
        println!("{line}");
    }
}

/// Left-aligned columns separated by two spaces. The last column is
/// never padded, so long paths do not leave trailing blanks.
fn table_lines(headers: &[&str], rows: &[Vec<String>]) -> Vec<String> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let render = |cells: &[String]| -> String {
        let last = cells.len().saturating_sub(1);
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| match widths.get(i) {
                Some(&w) if i < last => format!("{cell:<w$}"),
                _ => cell.clone(),
            })
            .collect::<Vec<_>>()
            .join("  ")
    };

    let header: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    let mut lines = vec![render(&header[..]), render(&rule[..])];
    lines.extend(rows.iter().map(|row| render(row.as_slice())));
    lines
}

/// Report finished external steps; output is only shown with `verbose`.
pub fn print_steps(steps: &[StepOutput], verbose: bool) {
    for step in steps {
        println!("  ok  {}", step.command);
        if verbose && !step.output.trim().is_empty() {
            for line in step.output.lines() {
                println!("      {line}");
            }
        }
    }
}

pub fn yes_no(flag: bool) -> String {
    if flag { "yes" } else { "-" }.to_string()
}
