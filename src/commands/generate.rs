use anyhow::{bail, Context, Result};
use tokio::time::Instant;

use crate::api::{DashboardApi, HttpApi};
use crate::cli::GenerateArgs;
use crate::config::Config;
use crate::job::{GenerationJob, JobEvent, JobProgress, JobStatus, LogSeverity};

pub async fn run(config: &Config, args: &GenerateArgs) -> Result<()> {
    let api = HttpApi::new(&config.api)?;
    let advisory = api.advisories().await?
        .into_iter()
        .find(|a| a.id == args.advisory)
        .with_context(|| format!("Advisory {} not found", args.advisory))?;

    let job = GenerationJob::new(advisory)?;
    eprintln!("generating maps for advisory {} ({}); Ctrl-C cancels", job.advisory().id, job.advisory().color);

    let run = job.run(&api, |event| println!("{}", format_event(event, job.progress())));
    tokio::pin!(run);

    let status = tokio::select! {
        status = &mut run => status?,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("cancelling...");
            if let Err(e) = job.cancel(&api).await {
                tracing::warn!(error = format!("{e:#}"), "remote cancel failed");
            }
            run.await?
        }
    };

    match status {
        JobStatus::Completed => Ok(()),
        JobStatus::Cancelled => {
            eprintln!("cancelled");
            Ok(())
        }
        JobStatus::Failed => bail!("map generation failed: {}", job.last_message().unwrap_or_default()),
        JobStatus::Idle | JobStatus::Running => bail!("map generation ended in unexpected state {status:?}"),
    }
}

fn format_event(event: &JobEvent, progress: Option<JobProgress>) -> String {
    match event {
        JobEvent::Log { message, severity } => {
            let tag = match severity {
                LogSeverity::Info => "    ",
                LogSeverity::Success => "ok  ",
                LogSeverity::Warning => "warn",
                LogSeverity::Error => "err ",
            };
            format!("[{tag}] {message}")
        }
        JobEvent::Progress { current, total } => {
            let eta = progress.and_then(|p| p.eta(Instant::now()))
                .map(|d| format!(", ~{}s left", d.as_secs()))
                .unwrap_or_default();
            let pct = progress.map(|p| p.fraction() * 100.0).unwrap_or(0.0);
            format!("[{current}/{total}] {pct:.0}%{eta}")
        }
        JobEvent::Error { message } => format!("[err ] {message}"),
        JobEvent::Complete { message } => format!("[done] {message}"),
    }
}
