use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, MultiSelect};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while prices are being fetched.
pub fn spinner(msg: &'static str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("[{elapsed_precise}] {spinner} {msg}")?
            .tick_chars("#|-#"),
    );
    pb.set_message(msg);
    pb.enable_steady_tick(Duration::from_millis(120));
    Ok(pb)
}

/// Let the user tick companies off a list, starting from `preselected`.
pub fn select_companies(companies: &[String], preselected: &[String]) -> Result<Vec<String>> {
    let defaults: Vec<bool> = companies
        .iter()
        .map(|name| preselected.contains(name))
        .collect();

    let picked = MultiSelect::with_theme(&ColorfulTheme::default())
        .with_prompt("Companies to chart")
        .items(companies)
        .defaults(&defaults)
        .interact()?;

    Ok(picked.into_iter().map(|i| companies[i].clone()).collect())
}

/// Closing prices laid out with one row per date and one column per company.
pub fn render_table(header: &[&str], rows: &[(String, Vec<Option<f64>>)]) -> String {
    let date_width = 18;
    let widths: Vec<usize> = header.iter().map(|name| name.len().max(10)).collect();

    let mut out = format!("{:<date_width$}", "Date");
    for (name, width) in header.iter().zip(widths.iter().copied()) {
        out.push_str(&format!(" {name:>width$}"));
    }
    out.push('\n');

    for (label, cells) in rows {
        out.push_str(&format!("{label:<date_width$}"));
        for (cell, width) in cells.iter().zip(widths.iter().copied()) {
            match cell {
                Some(price) => out.push_str(&format!(" {price:>width$.2}")),
                None => out.push_str(&format!(" {:>width$}", "-")),
            }
        }
        out.push('\n');
    }
    out
}
