use cultiva_core::{ActuatorMode, SystemsState};
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Render `rows` under `headers` as left-aligned columns, two spaces apart.
///
/// Widths count chars, not bytes, so accented labels line up.
fn render_table<const N: usize>(headers: [&str; N], rows: &[[String; N]]) -> String {
    let mut widths = headers.map(|h| h.chars().count());
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let line = |cells: [&str; N]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(c, w)| format!("{c:<w$}"))
            .collect();
        padded.join("  ").trim_end().to_string()
    };

    let mut out = line(headers);
    out.push('\n');
    out.push_str(&line(widths.map(|w| "-".repeat(w)).each_ref().map(String::as_str)));
    out.push('\n');
    for row in rows {
        out.push_str(&line(row.each_ref().map(String::as_str)));
        out.push('\n');
    }
    out
}

/// The three switch positions with the current one bracketed: ` off  [auto]  on `.
fn switch(current: ActuatorMode) -> String {
    ActuatorMode::all()
        .iter()
        .map(|&m| {
            if m == current {
                format!("[{m}]")
            } else {
                format!(" {m} ")
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// One row per actuator: wire name, control label, switch.
pub fn print_state(state: &SystemsState) {
    let rows: Vec<[String; 3]> = state
        .iter()
        .map(|(name, mode)| [name.to_string(), name.label().to_string(), switch(mode)])
        .collect();
    print!("{}", render_table(["ACTUATOR", "CONTROL", "MODE"], &rows));
}
