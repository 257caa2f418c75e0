//! Line-oriented interactive panel.
//!
//! Reads one command per line and prints the affected view. `search` input
//! is debounced: the loop waits on stdin and on the debounce deadline at the
//! same time, so a burst of searches produces a single reload.

use std::io::Write;
use std::str::FromStr;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::time::{sleep_until, Instant};
use tracing::debug;

use crate::client::RouteApi;
use crate::controller::AdminController;
use crate::error::Result;
use crate::form::RouteForm;
use crate::model::BatchOperation;
use crate::render::{text, views, HealthView};
use crate::state::{NoticeLevel, Tab};

const HELP: &str = "\
commands:
  list                         reload the current page
  next | prev | page <n>       move between pages
  per-page <n>                 page size (10, 25, 50, 100)
  active-only on|off           filter inactive routes
  search [term]                debounced search; empty clears
  show <id>                    route details
  create <path> <M1,M2> <status> <json>
  toggle <id>                  flip activation
  delete <id>                  ask for confirmation
  confirm <token> | cancel <token>
  batch activate|deactivate|delete <id,id,...>
  health                       open the health tab
  tab routes|create|health
  key <api-key>                use and save a new API key
  help | quit";

/// One parsed shell line.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    List,
    Next,
    Prev,
    Page(u32),
    PerPage(u32),
    ActiveOnly(bool),
    Search(String),
    Show(u64),
    Create(RouteForm),
    Toggle(u64),
    Delete(u64),
    Confirm(u64),
    Cancel(u64),
    Batch(BatchOperation, Vec<u64>),
    Tab(Tab),
    Key(String),
    Help,
    Quit,
}

fn number<T: FromStr>(arg: Option<&str>, what: &str) -> std::result::Result<T, String> {
    arg.and_then(|a| a.parse().ok())
        .ok_or_else(|| format!("expected {what}"))
}

impl ShellCommand {
    /// Parse a line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> std::result::Result<Option<Self>, String> {
        let line = line.trim();
        let (name, rest) = line
            .split_once(char::is_whitespace)
            .map(|(n, r)| (n, r.trim()))
            .unwrap_or((line, ""));
        let mut args = rest.split_whitespace();

        let command = match name {
            "" => return Ok(None),
            "list" | "ls" => ShellCommand::List,
            "next" | "n" => ShellCommand::Next,
            "prev" | "p" => ShellCommand::Prev,
            "page" => ShellCommand::Page(number(args.next(), "a page number")?),
            "per-page" => ShellCommand::PerPage(number(args.next(), "a page size")?),
            "active-only" => match args.next() {
                Some("on" | "true" | "yes") => ShellCommand::ActiveOnly(true),
                Some("off" | "false" | "no") => ShellCommand::ActiveOnly(false),
                _ => return Err("expected on or off".to_string()),
            },
            "search" | "/" => ShellCommand::Search(rest.to_string()),
            "show" => ShellCommand::Show(number(args.next(), "a route id")?),
            "create" => {
                let mut parts = rest.splitn(4, char::is_whitespace);
                let (Some(path), Some(methods), Some(status), Some(response)) =
                    (parts.next(), parts.next(), parts.next(), parts.next())
                else {
                    return Err("usage: create <path> <M1,M2> <status> <json>".to_string());
                };
                ShellCommand::Create(RouteForm {
                    path: path.to_string(),
                    methods: methods.split(',').map(str::to_string).collect(),
                    status_code: status.to_string(),
                    response: response.trim().to_string(),
                    ..RouteForm::blank()
                })
            }
            "toggle" => ShellCommand::Toggle(number(args.next(), "a route id")?),
            "delete" | "rm" => ShellCommand::Delete(number(args.next(), "a route id")?),
            "confirm" | "y" => ShellCommand::Confirm(number(args.next(), "a token")?),
            "cancel" => ShellCommand::Cancel(number(args.next(), "a token")?),
            "batch" => {
                let operation = args
                    .next()
                    .and_then(|op| BatchOperation::from_str(op).ok())
                    .ok_or("expected activate, deactivate or delete")?;
                let ids = args
                    .next()
                    .unwrap_or_default()
                    .split(',')
                    .filter(|id| !id.is_empty())
                    .map(|id| id.trim().parse::<u64>().map_err(|_| format!("bad id {id}")))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                if ids.is_empty() {
                    return Err("expected route ids".to_string());
                }
                ShellCommand::Batch(operation, ids)
            }
            "health" => ShellCommand::Tab(Tab::Health),
            "tab" => ShellCommand::Tab(
                args.next()
                    .and_then(|t| Tab::from_str(t).ok())
                    .ok_or("expected routes, create or health")?,
            ),
            "key" => ShellCommand::Key(
                args.next()
                    .ok_or("expected an API key")?
                    .to_string(),
            ),
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" | "q" => ShellCommand::Quit,
            other => return Err(format!("unknown command {other}, try help")),
        };
        Ok(Some(command))
    }
}

/// Drive `controller` from `input` until `quit` or end of input.
///
/// A search still pending at end of input is applied before returning;
/// `quit` discards it.
pub async fn run<A, R, W>(controller: &mut AdminController<A>, input: R, out: &mut W) -> Result<()>
where
    A: RouteApi,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();

    if let Err(e) = controller.load_routes().await {
        debug!(error = %e, "Initial route load failed");
    }
    print_list(controller, out)?;

    loop {
        let deadline = controller.search_deadline();
        tokio::select! {
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                if controller.poll_search(Instant::now()).await.unwrap_or(true) {
                    print_list(controller, out)?;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    if controller.flush_search().await.unwrap_or(true) {
                        print_list(controller, out)?;
                    }
                    break;
                };
                match ShellCommand::parse(&line) {
                    Ok(None) => {}
                    Ok(Some(ShellCommand::Quit)) => break,
                    Ok(Some(command)) => execute(controller, command, out).await?,
                    Err(message) => writeln!(out, "error: {message}")?,
                }
            }
        }
        print_notices(controller, out)?;
        out.flush()?;
    }

    print_notices(controller, out)?;
    out.flush()?;
    Ok(())
}

async fn execute<A: RouteApi, W: Write>(
    controller: &mut AdminController<A>,
    command: ShellCommand,
    out: &mut W,
) -> Result<()> {
    debug!(?command, "Shell command");
    // Failures are already notices; only successful list changes print.
    let reloaded = match command {
        ShellCommand::List => controller.load_routes().await.is_ok(),
        ShellCommand::Next => controller.next_page().await.unwrap_or(false),
        ShellCommand::Prev => controller.prev_page().await.unwrap_or(false),
        ShellCommand::Page(n) => controller.set_page(n).await.unwrap_or(false),
        ShellCommand::PerPage(n) => controller.set_items_per_page(n).await.unwrap_or(false),
        ShellCommand::ActiveOnly(on) => controller.set_active_only(on).await.unwrap_or(false),
        ShellCommand::Search(term) => {
            controller.search_input(term, Instant::now());
            false
        }
        ShellCommand::Show(id) => {
            match controller.api().get_route(id).await {
                Ok(route) => writeln!(
                    out,
                    "{}",
                    text::to_text(&views::route_detail(&route, controller.locale()))
                )?,
                Err(e) => writeln!(out, "error: {e}")?,
            }
            false
        }
        ShellCommand::Create(form) => controller.create_route(form).await.is_ok(),
        ShellCommand::Toggle(id) => controller.toggle_route(id).await.is_ok(),
        ShellCommand::Delete(id) => {
            let token = controller.request_delete(id);
            writeln!(
                out,
                "delete route #{id}? type `confirm {}` or `cancel {}`",
                token.id, token.id
            )?;
            false
        }
        ShellCommand::Confirm(token_id) => match controller.pending_delete(token_id) {
            Some(token) => controller.confirm_delete(token).await.is_ok(),
            None => {
                writeln!(out, "error: no pending delete {token_id}")?;
                false
            }
        },
        ShellCommand::Cancel(token_id) => {
            if let Some(token) = controller.pending_delete(token_id) {
                controller.cancel_delete(token);
            }
            false
        }
        ShellCommand::Batch(operation, ids) => controller.batch(operation, ids).await.is_ok(),
        ShellCommand::Tab(tab) => {
            if let Err(e) = controller.open_tab(tab).await {
                debug!(error = %e, "Health unavailable");
            }
            if tab == Tab::Health {
                print_health(controller.health(), controller, out)?;
            }
            tab == Tab::Routes
        }
        ShellCommand::Key(key) => {
            if let Err(e) = controller.save_api_key(&key) {
                debug!(error = %e, "API key not saved");
            }
            false
        }
        ShellCommand::Help => {
            writeln!(out, "{HELP}")?;
            false
        }
        ShellCommand::Quit => false,
    };

    if reloaded {
        print_list(controller, out)?;
    }
    Ok(())
}

fn print_list<A: RouteApi, W: Write>(controller: &AdminController<A>, out: &mut W) -> Result<()> {
    let locale = controller.locale();
    writeln!(out, "{}", text::to_text(&views::route_list(controller.list(), locale)))?;
    writeln!(out, "{}", text::to_text(&views::pagination(controller.pages(), locale)))?;
    Ok(())
}

fn print_health<A: RouteApi, W: Write>(
    health: &HealthView,
    controller: &AdminController<A>,
    out: &mut W,
) -> Result<()> {
    let node = views::health_panel(health, controller.locale());
    writeln!(out, "{}", text::to_text(&node))?;
    Ok(())
}

fn print_notices<A: RouteApi, W: Write>(
    controller: &mut AdminController<A>,
    out: &mut W,
) -> Result<()> {
    for notice in controller.take_notices() {
        let mark = match notice.level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Error => "!!",
        };
        writeln!(out, "[{mark}] {}", notice.message)?;
    }
    Ok(())
}
