//! One-shot CLI commands
//!
//! Without a subcommand the binary serves the dashboard API. These commands
//! do a single fetch instead and print plain text.

use clap::Subcommand;

use mailroom_client::Record;

use crate::error::{DashboardError, Result};
use crate::projection::{
    format_confidence, format_timestamp, project, DashboardView, ViewBody, ViewOptions, MISSING,
};
use crate::query::QueryParams;
use crate::sync::{SliceHealth, SyncEngine};

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch once and print the table
    Snapshot {
        /// Status filter (ALL, NEW, PROCESSED, NEEDS_OPERATOR, ESCALATED, CLOSED)
        #[arg(short, long, default_value = "ALL")]
        status: String,

        /// Free-text search
        #[arg(short = 'q', long, default_value = "")]
        search: String,

        /// Page size (defaults to sync.page_limit)
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Print the CSV export link for a filter
    Export {
        #[arg(short, long, default_value = "ALL")]
        status: String,

        #[arg(short = 'q', long, default_value = "")]
        search: String,
    },

    /// Show one email in full
    Show {
        /// Email id
        id: String,
    },
}

/// Run a command against the engine and return the text to print
pub async fn execute_command(
    engine: &SyncEngine,
    command: Commands,
    page_limit: u32,
    view: &ViewOptions,
) -> Result<String> {
    match command {
        Commands::Snapshot { status, search, limit } => {
            let params = QueryParams::parse(&status, search)?
                .with_page(limit.unwrap_or(page_limit), 0)?;
            engine.trigger_refresh(params.clone()).await;

            let state = engine.state().await;
            if state.list().is_none() {
                let reason = match state.list_health() {
                    SliceHealth::Failed { error, .. } => error.clone(),
                    _ => "no response".to_string(),
                };
                return Err(DashboardError::Unavailable(reason));
            }
            Ok(format_table(&project(&state, &params, view)))
        }

        Commands::Export { status, search } => {
            let params = QueryParams::parse(&status, search)?;
            Ok(engine
                .gateway()
                .export_reference(params.status_filter(), params.search_text()))
        }

        Commands::Show { id } => {
            let record = engine.gateway().get_record(&id).await?;
            Ok(format_record(&record, view))
        }
    }
}

/// Format a projected view as a plain-text table
pub fn format_table(view: &DashboardView) -> String {
    let mut output = String::new();

    let badges: Vec<String> = view
        .badges
        .iter()
        .map(|badge| {
            if badge.active {
                format!("[{}]", badge)
            } else {
                badge.to_string()
            }
        })
        .collect();
    output.push_str(&badges.join("  "));
    output.push_str("\n\n");

    match &view.body {
        ViewBody::Loading => output.push_str("Loading emails...\n"),
        ViewBody::Empty => output.push_str("No emails found\n"),
        ViewBody::Rows(rows) => {
            output.push_str(&format!(
                "{:<15} {:<28} {:<40} {:<10} {:<10} {:>6}  {}\n",
                "STATUS", "SENDER", "SUBJECT", "SENTIMENT", "COMPLEXITY", "CONF", "RECEIVED"
            ));
            for row in rows {
                output.push_str(&format!(
                    "{:<15} {:<28} {:<40} {:<10} {:<10} {:>6}  {}\n",
                    row.status_label,
                    row.sender,
                    row.subject,
                    row.sentiment,
                    row.complexity,
                    row.confidence,
                    row.received
                ));
            }
        }
    }

    output.push('\n');
    output.push_str(&view.summary());
    if let Some(updated) = &view.last_updated {
        output.push_str(&format!(" (updated {})", updated));
    }
    output.push('\n');
    output
}

fn format_record(record: &Record, view: &ViewOptions) -> String {
    let mut output = String::new();
    output.push_str(&format!("Email {}\n", record.id));
    output.push_str(&"=".repeat(6 + record.id.len()));
    output.push_str("\n\n");

    output.push_str(&format!("From:        {}\n", record.sender));
    output.push_str(&format!("Subject:     {}\n", record.subject));
    output.push_str(&format!("Status:      {}\n", record.status.label()));
    output.push_str(&format!(
        "Received:    {}\n",
        format_timestamp(&record.created_at, &view.date_format)
    ));
    output.push_str(&format!(
        "Sentiment:   {}\n",
        record.sentiment.as_ref().map_or(MISSING, |s| s.as_str())
    ));
    output.push_str(&format!(
        "Complexity:  {}\n",
        record.complexity.as_ref().map_or(MISSING, |c| c.as_str())
    ));
    output.push_str(&format!("Confidence:  {}\n", format_confidence(record.confidence)));

    output.push_str("\nBody:\n");
    output.push_str(&record.body);
    output.push_str("\n\nAI response:\n");
    output.push_str(record.ai_response.as_deref().unwrap_or(MISSING));
    output.push('\n');
    output
}
