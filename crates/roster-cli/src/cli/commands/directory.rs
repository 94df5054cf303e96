//! Directory listing command.

use anyhow::Result;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use roster_core::config::Config;
use roster_core::directory::HttpDirectory;
use roster_core::enrich::Enricher;
use roster_core::model::{DisplayEmployee, EmploymentStatus, format_rupiah};
use roster_core::pipeline::{DirectoryView, RefreshOutcome};
use roster_core::session::SessionContext;

#[derive(clap::Args)]
pub struct ListArgs {
    /// Only show employees whose name contains TEXT (case-insensitive)
    #[arg(long, value_name = "TEXT")]
    filter: Option<String>,

    /// Page to print (1-based)
    #[arg(long, default_value_t = 1)]
    page: usize,

    /// Seed for the synthetic fields (position, rating, salary, ...)
    #[arg(long)]
    seed: Option<u64>,
}

pub async fn list(config: &Config, session: &SessionContext, args: ListArgs) -> Result<()> {
    let bearer = if config.directory.send_token {
        session.cached_token().map(str::to_string)
    } else {
        None
    };
    let source = HttpDirectory::from_config(&config.directory).with_bearer(bearer);
    let mut enricher = Enricher::with_optional_seed(
        config.enrichment.mode,
        args.seed.or(config.enrichment.seed),
    );

    let mut view = DirectoryView::new();
    match view.refresh(&source, &mut enricher).await? {
        RefreshOutcome::Applied { count } => tracing::debug!(count, "Listing directory"),
        RefreshOutcome::Failed { message } => {
            anyhow::bail!("Could not load employees: {message}")
        }
        RefreshOutcome::Stale => anyhow::bail!("Directory fetch was superseded"),
    }

    let state = view.state_mut();
    if let Some(filter) = args.filter {
        state.set_filter_text(filter);
    }
    if state.page_count() == 0 {
        println!("No employees match");
        return Ok(());
    }
    state.set_page(args.page)?;

    let mut table = employee_table();
    for employee in state.visible_slice() {
        table.add_row(employee_row(employee));
    }
    println!("{table}");
    println!(
        "Page {} of {} ({} employees)",
        state.current_page(),
        state.page_count(),
        state.filtered_len()
    );
    Ok(())
}

fn employee_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            header_cell("ID"),
            header_cell("Name"),
            header_cell("Position"),
            header_cell("Status"),
            header_cell("Exp"),
            header_cell("Rating"),
            header_cell("Salary"),
        ]);
    for idx in [0, 4, 5, 6] {
        if let Some(column) = table.column_mut(idx) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
    table
}

fn employee_row(employee: &DisplayEmployee) -> Vec<Cell> {
    let status_color = match employee.status {
        EmploymentStatus::Permanent => Color::Green,
        EmploymentStatus::Contract => Color::Magenta,
    };
    vec![
        Cell::new(employee.id),
        Cell::new(&employee.name),
        Cell::new(&employee.position),
        Cell::new(employee.status).fg(status_color),
        Cell::new(format!("{} yrs", employee.experience)),
        Cell::new(&employee.rating),
        Cell::new(format!("{}/month", format_rupiah(employee.salary))),
    ]
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}
