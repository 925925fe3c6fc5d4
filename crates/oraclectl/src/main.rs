//! Oracle Control - CLI client for the Office Hours Oracle daemon.

mod client;

use anyhow::Result;
use clap::{Parser, Subcommand};
use client::ApiClient;
use oracle_common::rpc::Submission;
use owo_colors::OwoColorize;

#[derive(Parser)]
#[command(name = "oraclectl")]
#[command(about = "Office Hours Oracle - route student questions to the right helper", long_about = None)]
#[command(version)]
struct Cli {
    /// Daemon address (default: $ORACLED_ADDR or http://127.0.0.1:7610)
    #[arg(long, global = true)]
    addr: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a question and get the assignment receipt
    Submit {
        /// Student name
        #[arg(long)]
        name: String,

        /// Course label, e.g. "CS 400"
        #[arg(long)]
        course: String,

        /// Question text
        text: String,

        /// Optional code snippet
        #[arg(long)]
        code: Option<String>,

        /// Preferred helper id (a bias, not an override)
        #[arg(long)]
        prefer: Option<u64>,
    },

    /// Show the live queue
    Queue,

    /// Show active helpers with their queue counts
    Roster,

    /// Mark a queue entry as resolved
    Resolve {
        /// Queue entry id
        queue_id: u64,
    },

    /// Show request/resolution counters
    Metrics,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = ApiClient::new(cli.addr.as_deref())?;

    match cli.command {
        Commands::Submit {
            name,
            course,
            text,
            code,
            prefer,
        } => {
            let receipt = client
                .submit(&Submission {
                    student_name: name,
                    course,
                    question_text: text,
                    code_snippet: code,
                    preferred_helper_id: prefer,
                })
                .await?;
            println!(
                "{} queue entry #{}",
                "Queued:".green().bold(),
                receipt.queue_id
            );
            println!("  Helper:   {}", receipt.assigned_helper_name.bold());
            println!("  Wait:     ~{} min", receipt.estimated_wait_minutes);
            println!("  Category: {}", receipt.category);
            println!("  Tags:     {}", receipt.tags.join(", "));
            println!("  Summary:  {}", receipt.summary);
            if !receipt.similar_entry_ids.is_empty() {
                println!(
                    "  Similar past cases: {}",
                    receipt
                        .similar_entry_ids
                        .iter()
                        .map(|id| format!("#{id}"))
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
        }

        Commands::Queue => {
            let queue = client.queue().await?;
            if queue.is_empty() {
                println!("Queue is empty.");
            }
            for entry in queue {
                println!(
                    "{} [{}] {} ({}) -> {} | ~{} min | {}",
                    format!("#{}", entry.queue_id).bold(),
                    entry.status,
                    entry.student_name,
                    entry.course,
                    entry.assigned_helper_name.cyan(),
                    entry.estimated_minutes,
                    entry.category
                );
                if let Some(hint) = &entry.student_hint {
                    println!("    hint: {}", hint.dimmed());
                }
            }
        }

        Commands::Roster => {
            for helper in client.roster().await? {
                println!(
                    "{} {} | {} queued | {}",
                    format!("#{}", helper.id).bold(),
                    helper.name.cyan(),
                    helper.queue_count,
                    helper.expertise_tags.join(", ")
                );
            }
        }

        Commands::Resolve { queue_id } => {
            let ack = client.resolve(queue_id).await?;
            if ack.newly_resolved {
                match ack.knowledge_entry_id {
                    Some(id) => println!(
                        "{} queue entry #{} (knowledge entry #{id})",
                        "Resolved:".green().bold(),
                        ack.queue_id
                    ),
                    None => println!(
                        "{} queue entry #{}",
                        "Resolved:".green().bold(),
                        ack.queue_id
                    ),
                }
            } else {
                println!("Queue entry #{} was already resolved.", ack.queue_id);
            }
        }

        Commands::Metrics => {
            let metrics = client.metrics().await?;
            println!("Total requests:     {}", metrics.total_requests);
            println!("Resolved:           {}", metrics.resolved_count);
            println!("Active queue:       {}", metrics.active_queue_count);
            println!("Knowledge base:     {}", metrics.knowledge_base_size);
            println!(
                "Est. time saved:    {} min",
                metrics.estimated_time_saved_minutes
            );
        }
    }

    Ok(())
}
