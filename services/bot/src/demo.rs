//! CLI walkthrough of one submission against in-memory fakes, for
//! trying the workflow without chat-platform or store credentials.

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use clap::Args;

use fitlog::config::{CampaignConfig, MediaConfig};
use fitlog::error::AppError;
use fitlog::submissions::{
    eligibility, AttachmentRef, DeleteTicket, DurationBucket, FormSection, FormSession, Notice,
    OwnerId,
};

use crate::infra::{BotContext, InMemoryRecordStore, RecordingGateway};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Exercise date to submit (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub(crate) date: Option<NaiveDate>,
    /// Activity label for the submitted record.
    #[arg(long, default_value = "Jogging")]
    pub(crate) activity: String,
    /// Also delete the record again at the end of the walkthrough.
    #[arg(long)]
    pub(crate) delete: bool,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let offset_hours = 8;
    let today = eligibility::campaign_today(offset_hours);
    let date = args.date.unwrap_or(today);

    let campaign = CampaignConfig {
        start_date: today - Duration::days(14),
        end_date: today + Duration::days(14),
        rolling_days: 2,
        utc_offset_hours: offset_hours,
    };
    let media = MediaConfig {
        private_host: "files.internal".to_string(),
        proxy_host: None,
        exempt_file_ids: Vec::new(),
    };

    let store = Arc::new(InMemoryRecordStore::default());
    let gateway = Arc::new(RecordingGateway::default());
    let ctx = BotContext::with_sections(store.clone(), gateway.clone(), &campaign, &media);

    let owner = OwnerId("demo-user".to_string());
    let attachment = AttachmentRef {
        file_name: "morning-run.jpg".to_string(),
        thumbnail_url: "https://files.internal/demo/thumb720.jpg".to_string(),
        source_url: "https://files.internal/demo/original.jpg".to_string(),
    };

    println!("Campaign window: {} to {} (rolling limit {} days)",
        campaign.start_date, campaign.end_date, campaign.rolling_days);

    let (mut session, _) = ctx.controller.open(attachment);
    println!("Form opened at stage {:?}", session.stage);

    ctx.controller
        .select_duration(&mut session, DurationBucket::FortyToFifty);
    println!("Duration picked -> stage {:?}", session.stage);

    let used = ctx
        .index
        .used_dates(&owner)
        .await
        .map_err(|err| AppError::Io(std::io::Error::other(err.to_string())))?;
    let render = ctx.controller.select_date(
        &mut session,
        &date.format("%Y-%m-%d").to_string(),
        &used,
        today,
    );
    println!(
        "Date {date} picked -> stage {:?}, submit enabled: {}",
        session.stage, render.submit_enabled
    );
    if let Some(status) = render.sections.iter().find_map(|section| match section {
        FormSection::DateStatus(text) => Some(text.as_str()),
        _ => None,
    }) {
        println!("Status line: {status}");
    }

    if !render.submit_enabled {
        println!("Nothing to submit; stopping here.");
        return Ok(());
    }

    finish_session(&mut session, &args.activity);
    let record = match ctx.service.submit(&session, &owner).await {
        Ok(record) => record,
        Err(err) => {
            println!("Submission rejected: {err}");
            return Ok(());
        }
    };
    println!(
        "Stored record {} for {} ({})",
        record.id.0, record.date, record.activity_type
    );

    for (_, notice) in gateway.notices() {
        if let Notice::SubmissionAccepted { record } = notice {
            println!("Confirmation sent for {}", record.date);
        }
    }

    if args.delete {
        let ticket = DeleteTicket {
            record_id: record.id.clone(),
            date: record.date,
        };
        ctx.service
            .delete(&ticket, &owner, None)
            .await
            .map_err(|err| AppError::Io(std::io::Error::other(err.to_string())))?;
        println!("Record {} deleted again", ticket.record_id.0);
    }

    println!("Store now holds {} record(s)", store.records().len());
    Ok(())
}

fn finish_session(session: &mut FormSession, activity: &str) {
    session.activity_type = Some(activity.to_string());
    session.comment = Some("recorded from the CLI demo".to_string());
}
