use std::rc::Rc;

use chrono::NaiveDateTime;
use serde_json::json;
use url::Url;

use crate::cli::config::AppConfig;
use crate::session::{SessionOutcome, SessionRunner, load_session};
use crate::settings::{MemorySettings, SettingsStore, ZAP_KEY, ZAP_URL};
use crate::transport::{Forwarder, JsonlForwarder, ZapClient};
use crate::zest::{ScriptEnvelope, Statement};

// ============================================================================
// Record Command
// ============================================================================

/// Replays a session file and writes the saved script. Returns the path
/// written.
pub fn cmd_record(
    session_path: &str,
    output: Option<&str>,
    zap_url: Option<&str>,
    api_key: Option<&str>,
    log_file: Option<&str>,
    config: &AppConfig,
    verbose: u8,
) -> Result<String, Box<dyn std::error::Error>> {
    let mut session = load_session(session_path)?;
    if session.user_agent.is_empty() {
        if let Some(user_agent) = &config.recorder.user_agent {
            session.user_agent = user_agent.clone();
        }
    }

    let settings = Rc::new(MemorySettings::new());
    config.seed_settings(settings.as_ref());
    if let Some(url) = zap_url {
        settings.set(ZAP_URL, json!(url));
    }
    if let Some(key) = api_key {
        settings.set(ZAP_KEY, json!(key));
    }

    let forwarder: Rc<dyn Forwarder> = match log_file {
        Some(path) => Rc::new(JsonlForwarder::new(path)),
        None => Rc::new(ZapClient::new(settings.clone())),
    };

    if verbose > 0 {
        eprintln!(
            "Replaying session '{}' ({} events)",
            session.name,
            session.events.len()
        );
    }

    let outcome = SessionRunner::new(settings, forwarder)
        .with_product(&config.recorder.product, &config.recorder.version)
        .run(&session)?;

    let path = match output {
        Some(path) => path.to_string(),
        None => {
            let page_url = session
                .documents
                .first()
                .map(|d| d.url.as_str())
                .unwrap_or_default();
            download_filename(page_url, &chrono::Local::now().naive_local())
        }
    };
    std::fs::write(&path, &outcome.script.script)?;

    println!("{}", record_summary(&outcome, &path));
    if verbose > 0 {
        for note in &outcome.notifications {
            eprintln!("  [{}] {}", note.title, note.message);
        }
    }
    Ok(path)
}

/// `zap-rec-<host><YYYY-MM-DD-HH-MM-SS>.zst`
pub fn download_filename(page_url: &str, at: &NaiveDateTime) -> String {
    let host = Url::parse(page_url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_default();
    format!("zap-rec-{}{}.zst", host, at.format("%Y-%m-%d-%H-%M-%S"))
}

fn record_summary(outcome: &SessionOutcome, path: &str) -> String {
    format!(
        "Recorded '{}': {} statements sent, script saved to {}",
        outcome.script.title, outcome.statement_count, path
    )
}

// ============================================================================
// Inspect Command
// ============================================================================

pub fn cmd_inspect(script_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(script_path)?;
    let envelope = ScriptEnvelope::from_json(&content)?;
    print!("{}", format_script(&envelope));
    Ok(())
}

/// One header line, then one line per statement.
pub fn format_script(envelope: &ScriptEnvelope) -> String {
    let mut out = format!(
        "{} (Zest {}, {} statements)\n",
        envelope.title,
        envelope.zest_version,
        envelope.statements.len()
    );
    for statement in &envelope.statements {
        out.push_str(&format!(
            "{:>4}  {:<28} {}\n",
            statement.index(),
            statement.element_type(),
            describe_statement(statement)
        ));
    }
    out
}

pub fn describe_statement(statement: &Statement) -> String {
    let wait = statement
        .wait_for_msec()
        .map(|ms| format!(" (wait {}ms)", ms))
        .unwrap_or_default();
    match statement {
        Statement::LaunchBrowser(launch) => format!("{} {}", launch.browser_type, launch.url),
        Statement::Comment(comment) => comment.comment.clone(),
        Statement::SendKeys(keys) => format!("{} = {:?}{}", keys.action.locator, keys.value, wait),
        Statement::SwitchToFrame(switch) if switch.parent => "parent".to_string(),
        Statement::SwitchToFrame(switch) => format!("frame {}", switch.frame_index),
        Statement::WindowClose(close) => format!("after {}s", close.sleep_in_seconds),
        other => match other.locator() {
            Some(locator) => format!("{}{}", locator, wait),
            None => String::new(),
        },
    }
}
