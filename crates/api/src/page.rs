//! Server-rendered dashboard HTML.

use anyhow::Context as _;
use tera::{Context, Tera};

use marketmood_core::chart::distribution_svg;
use marketmood_core::storage::table::LoadedTable;

const TEMPLATES: [(&str, &str); 3] = [
    ("base.html", include_str!("../templates/base.html")),
    ("dashboard.html", include_str!("../templates/dashboard.html")),
    ("error.html", include_str!("../templates/error.html")),
];

/// Templates are compiled into the binary; `.html` names keep tera's autoescaping on.
pub fn templates() -> anyhow::Result<Tera> {
    let mut tera = Tera::default();
    tera.add_raw_templates(TEMPLATES)
        .context("failed to compile dashboard templates")?;
    Ok(tera)
}

pub fn render_dashboard(tera: &Tera, table: Option<&LoadedTable>) -> anyhow::Result<String> {
    let mut ctx = Context::new();
    match table {
        None => ctx.insert("view", "empty"),
        Some(table) => {
            ctx.insert("source", &table.dominant_source());
            match table {
                LoadedTable::Sentiment(rows) => {
                    ctx.insert("view", "sentiment");
                    ctx.insert("rows", rows);
                }
                LoadedTable::News(rows) => {
                    ctx.insert("view", "news");
                    ctx.insert("rows", rows);
                }
            }
            if let Some(counts) = table.distribution() {
                match distribution_svg(&counts) {
                    Ok(svg) => ctx.insert("distribution_svg", &svg),
                    Err(err) => tracing::warn!(error = %err, "failed to render distribution chart"),
                }
            }
        }
    }
    tera.render("dashboard.html", &ctx)
        .context("failed to render dashboard")
}

pub fn render_error(tera: &Tera, stage: &str, error: &str) -> anyhow::Result<String> {
    let mut ctx = Context::new();
    ctx.insert("stage", stage);
    ctx.insert("error", error);
    tera.render("error.html", &ctx)
        .context("failed to render error panel")
}
