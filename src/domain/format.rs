//! Money and percentage rendering shared by logs and reports.

/// Whole dollars with thousands separators: `$1,234,568`.
pub fn dollars(amount: f64) -> String {
    with_sign(amount, group_thousands(&format!("{:.0}", amount.abs())))
}

/// Dollars and cents with thousands separators: `$1,234.57`.
pub fn dollars_cents(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_at(fixed.len() - 3);
    with_sign(amount, format!("{}{}", group_thousands(whole), cents))
}

/// A fraction rendered as a percentage with two decimals: `0.0345` → `3.45%`.
pub fn percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

/// Render rows as a plain-text table: left-aligned columns, a dashed rule
/// under the header, two spaces between columns.
pub fn render_table<S: AsRef<str>>(headers: &[S], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.as_ref().chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(i) {
                Some(w) => *w = (*w).max(len),
                None => widths.push(len),
            }
        }
    }

    let mut out = String::new();
    let header_cells: Vec<&str> = headers.iter().map(|h| h.as_ref()).collect();
    push_row(&mut out, &header_cells, &widths);
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    let rule_cells: Vec<&str> = rule.iter().map(String::as_str).collect();
    push_row(&mut out, &rule_cells, &widths);
    for row in rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        push_row(&mut out, &cells, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[&str], widths: &[usize]) {
    let mut line = String::new();
    for (i, width) in widths.iter().enumerate() {
        if i > 0 {
            line.push_str("  ");
        }
        let cell = cells.get(i).copied().unwrap_or("");
        line.push_str(cell);
        let pad = width.saturating_sub(cell.chars().count());
        line.extend(std::iter::repeat_n(' ', pad));
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

fn with_sign(amount: f64, body: String) -> String {
    if amount < 0.0 && body.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-${}", body)
    } else {
        format!("${}", body)
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
