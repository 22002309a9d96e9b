//! Interactive duplicate resolution on the terminal.

use std::io::{self, BufRead as _, Write as _};

use namesake_match::merging::{Conflict, MergeOp, MergeResolver, Resolution};

/// Shows both contacts on stderr and reads the answer from stdin.
pub struct PromptResolver;

impl MergeResolver for PromptResolver {
  async fn resolve(&self, conflict: Conflict<'_>) -> Resolution {
    let verb = match conflict.op {
      MergeOp::Add => "adding",
      MergeOp::Commit => "saving",
    };
    if conflict.same_id {
      eprintln!("A contact with this id already exists; adding anyway stores a copy under a new id.");
    }
    eprintln!(
      "The contact you are {verb} looks like an existing one ({:?} match{}):",
      conflict.match_type,
      if conflict.identical { ", identical" } else { "" },
    );
    eprintln!("  new:      {}", describe(conflict.new));
    eprintln!("  existing: {}", describe(conflict.existing));

    let answer = tokio::task::spawn_blocking(read_answer).await;
    match answer {
      Ok(Ok(resolution)) => resolution,
      Ok(Err(e)) => {
        tracing::warn!(error = %e, "could not read answer; cancelling");
        Resolution::Cancel
      }
      Err(e) => {
        tracing::warn!(error = %e, "prompt task failed; cancelling");
        Resolution::Cancel
      }
    }
  }
}

fn describe(contact: &namesake_core::Contact) -> String {
  let mut out = contact.full_name();
  if !contact.emails.is_empty() {
    out.push_str(&format!(" <{}>", contact.emails.join(", ")));
  }
  out
}

fn read_answer() -> io::Result<Resolution> {
  let stdin = io::stdin();
  loop {
    eprint!("[m]erge, [a]dd anyway, or [c]ancel? ");
    io::stderr().flush().ok();

    let mut line = String::new();
    if stdin.lock().read_line(&mut line)? == 0 {
      return Ok(Resolution::Cancel);
    }
    if let Some(resolution) = parse_answer(&line) {
      return Ok(resolution);
    }
  }
}

fn parse_answer(line: &str) -> Option<Resolution> {
  match line.trim().to_lowercase().as_str() {
    "m" | "merge" => Some(Resolution::Merge),
    "a" | "add" => Some(Resolution::AddAnyway),
    "c" | "cancel" => Some(Resolution::Cancel),
    _ => None,
  }
}
