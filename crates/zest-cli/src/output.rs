use serde::Serialize;

/// Print `value` as YAML, or as pretty JSON when `json` is set.
pub fn print<T: Serialize>(value: &T, json: bool) -> anyhow::Result<()> {
    if json {
        print_json(value)
    } else {
        print_yaml(value)
    }
}

pub fn print_yaml<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let yaml = serde_yaml::to_string(value)?;
    print!("{yaml}");
    Ok(())
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Print left-aligned columns under a dashed rule. Column widths fit the
/// widest cell; cells beyond the header count are dropped.
pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .fold(header.chars().count(), usize::max)
        })
        .collect();

    print_row(headers, &widths);
    print_row(widths.iter().map(|&w| "-".repeat(w)), &widths);
    for row in rows {
        print_row(row, &widths);
    }
}

fn print_row<S: AsRef<str>>(cells: impl IntoIterator<Item = S>, widths: &[usize]) {
    let line = cells
        .into_iter()
        .zip(widths)
        .map(|(cell, &w)| format!("{:<w$}", cell.as_ref()))
        .collect::<Vec<_>>()
        .join("  ");
    println!("{}", line.trim_end());
}
