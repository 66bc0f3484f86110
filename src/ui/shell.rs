//! Interactive shell: one command per line, dispatched through the
//! navigator. A failed command prints its error and the loop goes on.

use super::messages;
use super::navigation::{Navigator, Route, Section};
use super::views;
use crate::config::Config;
use crate::core::analytics::AnalyticsLogic;
use crate::core::auth::AuthLogic;
use crate::core::tasks::TaskLogic;
use crate::core::workers::{WorkerLogic, form_from};
use crate::errors::{AppError, AppResult};
use crate::ml::Predictor;
use crate::models::analytics::AnalyticsMetric;
use crate::store::Store;
use crate::utils::date::{parse_date, today};
use crate::utils::validation::WorkerForm;
use chrono::Duration;
use clap::ValueEnum;
use std::fmt;
use std::io::{BufRead, Write};

const HELP: &str = "\
Commands:
  go <path>                                  /login, /signup or /
  signup <user> <email> <password> <confirm>
  login <user> <password>
  logout
  section <0-3|name>                         or just the index
  dashboard | developers | chatbot | settings
  workers                                    worker table
  worker show <id>
  worker add <name> <position> <salary> <status> <score>
  worker update <id> field=value...          name, position, salary, status, score
  worker delete <id>
  tasks [worker_id]
  task add <worker_id> <description>
  task done <task_id>
  predict <worker_id>
  history <worker_id> [limit]
  analytics <metric> [from] [to] [worker_id] metric: performance, efficiency, tasks, hours, prediction
  activity
  account <user> <email>                     change your username/email
  help
  quit | exit
Quote arguments containing spaces: worker add \"Jane Roe\" Designer 4200 active 8.5";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Split a line on whitespace; single or double quotes group words.
pub fn tokenize(line: &str) -> AppResult<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_token = false;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if quote.is_some() {
        return Err(AppError::validation("Unterminated quote"));
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

fn arg<'t>(args: &'t [String], i: usize, name: &str) -> AppResult<&'t str> {
    args.get(i)
        .map(String::as_str)
        .ok_or_else(|| AppError::validation(format!("Missing argument: {}", name)))
}

fn id_arg(args: &[String], i: usize, name: &str) -> AppResult<i64> {
    let raw = arg(args, i, name)?;
    raw.parse()
        .map_err(|_| AppError::validation(format!("{} must be a number, got '{}'", name, raw)))
}

fn date_arg(raw: &str) -> AppResult<chrono::NaiveDate> {
    parse_date(raw).ok_or_else(|| AppError::InvalidDate(raw.to_string()))
}

pub struct Shell<W: Write> {
    store: Box<dyn Store>,
    cfg: Config,
    nav: Navigator,
    predictor: Option<Predictor>,
    out: W,
}

impl<W: Write> Shell<W> {
    pub fn new(store: Box<dyn Store>, cfg: Config, out: W) -> Self {
        Self {
            store,
            cfg,
            nav: Navigator::new(),
            predictor: None,
            out,
        }
    }

    pub fn navigator(&self) -> &Navigator {
        &self.nav
    }

    pub fn store_mut(&mut self) -> &mut dyn Store {
        self.store.as_mut()
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Read commands until EOF or `quit`.
    pub fn run<R: BufRead>(&mut self, input: R) -> AppResult<()> {
        writeln!(self.out, "CrewPilot shell. Type 'help' for commands.")?;
        self.prompt()?;

        for line in input.lines() {
            let line = line?;
            match self.execute(&line) {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) => {}
                Err(e) => messages::report_to(&mut self.out, &e)?,
            }
            self.prompt()?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    fn prompt(&mut self) -> AppResult<()> {
        write!(self.out, "crewpilot:{}> ", self.nav.route().path())?;
        self.out.flush()?;
        Ok(())
    }

    fn print(&mut self, block: String) -> AppResult<()> {
        self.out.write_all(block.as_bytes())?;
        Ok(())
    }

    fn success(&mut self, msg: impl fmt::Display) -> AppResult<()> {
        Ok(messages::success_to(&mut self.out, msg)?)
    }

    fn warning(&mut self, msg: impl fmt::Display) -> AppResult<()> {
        Ok(messages::warning_to(&mut self.out, msg)?)
    }

    fn info(&mut self, msg: impl fmt::Display) -> AppResult<()> {
        Ok(messages::info_to(&mut self.out, msg)?)
    }

    fn ensure_predictor(&mut self) {
        if self.predictor.is_none() {
            self.predictor = Some(Predictor::open(&self.cfg));
        }
    }

    pub fn execute(&mut self, line: &str) -> AppResult<Flow> {
        let tokens = tokenize(line)?;
        let Some((cmd, args)) = tokens.split_first() else {
            return Ok(Flow::Continue);
        };
        tracing::debug!(command = %cmd, "shell command");

        match cmd.as_str() {
            "quit" | "exit" => return Ok(Flow::Quit),
            "help" => writeln!(self.out, "{}", HELP)?,
            "go" => {
                let path = arg(args, 0, "path")?;
                let route = Route::from_path(path)
                    .ok_or_else(|| AppError::validation(format!("Unknown route '{}'", path)))?;
                let landed = self.nav.go(route);
                if landed != route {
                    self.warning("Please log in first")?;
                } else if landed == Route::Home {
                    self.show_section(self.nav.section())?;
                }
            }
            "signup" => {
                let user = self.nav.signup(
                    self.store.as_mut(),
                    arg(args, 0, "username")?,
                    arg(args, 1, "email")?,
                    arg(args, 2, "password")?,
                    arg(args, 3, "confirm password")?,
                )?;
                self.success(format!(
                    "Account '{}' created. Please log in.",
                    user.username
                ))?;
            }
            "login" => {
                let username = arg(args, 0, "username")?.to_string();
                let password = arg(args, 1, "password")?.to_string();
                let name = self
                    .nav
                    .login(self.store.as_mut(), &username, &password)?
                    .username
                    .clone();
                self.success(format!("Welcome, {}", name))?;
                self.show_section(Section::Dashboard)?;
            }
            "logout" => {
                self.nav.logout();
                self.info("Logged out")?;
            }
            "section" => {
                let raw = arg(args, 0, "section")?;
                let section = Section::parse(raw)
                    .ok_or_else(|| AppError::validation(format!("Unknown section '{}'", raw)))?;
                self.open_section(section)?;
            }
            "0" | "1" | "2" | "3" | "dashboard" | "developers" | "chatbot" | "settings" => {
                if let Some(section) = Section::parse(cmd) {
                    self.open_section(section)?;
                }
            }
            other => {
                self.nav.session().require()?;
                self.gated(other, args)?;
            }
        }
        Ok(Flow::Continue)
    }

    fn open_section(&mut self, section: Section) -> AppResult<()> {
        self.nav.select(section.index())?;
        self.show_section(section)
    }

    fn show_section(&mut self, section: Section) -> AppResult<()> {
        let heading = format!("\n── {} ──\n", section.title());
        self.print(heading)?;
        let block = match section {
            Section::Dashboard => {
                let limit = self.cfg.recent_activity_limit;
                let stats = self.store.dashboard_stats(self.cfg.high_performance_threshold)?;
                let activities = self.store.recent_activities(limit)?;
                let predictions = self.store.recent_predictions(limit)?;
                views::render_dashboard(&stats, &activities, &predictions)
            }
            Section::Developers => views::render_worker_cards(&self.store.worker_overviews()?),
            Section::Chatbot => views::render_chatbot(),
            Section::Settings => {
                let user = self.nav.session().require()?;
                views::render_settings(user, &self.cfg)
            }
        };
        self.print(block)
    }

    /// Commands that need a signed-in user.
    fn gated(&mut self, cmd: &str, args: &[String]) -> AppResult<()> {
        match cmd {
            "workers" => {
                let block = views::render_worker_table(&self.store.list_workers()?);
                self.print(block)?;
            }
            "worker" => self.worker(args)?,
            "tasks" => {
                let worker = match args.first() {
                    Some(_) => Some(id_arg(args, 0, "worker id")?),
                    None => None,
                };
                let block = views::render_tasks(&self.store.list_tasks(worker, false)?);
                self.print(block)?;
            }
            "task" => self.task(args)?,
            "predict" => {
                let id = id_arg(args, 0, "worker id")?;
                let name = WorkerLogic::get(self.store.as_mut(), id)?.name;
                self.ensure_predictor();
                let prediction = match &self.predictor {
                    Some(p) => p.predict(self.store.as_mut(), id)?,
                    None => return Err(AppError::ModelUnavailable("not loaded".into())),
                };
                self.print(views::render_prediction(&prediction, &name))?;
            }
            "history" => {
                let id = id_arg(args, 0, "worker id")?;
                let limit = match args.get(1) {
                    Some(_) => id_arg(args, 1, "limit")?.max(1) as usize,
                    None => 10,
                };
                self.ensure_predictor();
                let rows = match &self.predictor {
                    Some(p) => p.history(self.store.as_mut(), id, limit)?,
                    None => return Err(AppError::ModelUnavailable("not loaded".into())),
                };
                self.print(views::render_history(&rows))?;
            }
            "analytics" => {
                let raw = arg(args, 0, "metric")?;
                let metric = AnalyticsMetric::from_str(raw, true)
                    .map_err(|_| AppError::validation(format!("Unknown metric '{}'", raw)))?;
                let to = match args.get(2) {
                    Some(s) => date_arg(s)?,
                    None => today(),
                };
                let from = match args.get(1) {
                    Some(s) => date_arg(s)?,
                    None => to - Duration::days(self.cfg.prediction_window_days),
                };
                let worker = match args.get(3) {
                    Some(_) => Some(id_arg(args, 3, "worker id")?),
                    None => None,
                };
                let summary =
                    AnalyticsLogic::summarize(self.store.as_mut(), metric, from, to, worker)?;
                self.print(views::render_analytics(&summary))?;
            }
            "activity" => {
                let rows = self.store.recent_activities(self.cfg.recent_activity_limit)?;
                self.print(views::render_activities(&rows))?;
            }
            "account" => {
                let user = AuthLogic::update_identity(
                    self.store.as_mut(),
                    self.nav.session_mut(),
                    arg(args, 0, "username")?,
                    arg(args, 1, "email")?,
                )?;
                self.success(format!(
                    "Account updated: {} <{}>",
                    user.username, user.email
                ))?;
            }
            other => {
                return Err(AppError::validation(format!(
                    "Unknown command '{}'. Type 'help' for commands.",
                    other
                )));
            }
        }
        Ok(())
    }

    fn worker(&mut self, args: &[String]) -> AppResult<()> {
        match arg(args, 0, "worker subcommand")? {
            "show" => {
                let id = id_arg(args, 1, "worker id")?;
                let worker = WorkerLogic::get(self.store.as_mut(), id)?;
                let tasks = self.store.list_tasks(Some(id), false)?;
                self.print(views::render_worker_detail(&worker, &tasks))?;
            }
            "add" => {
                let form = WorkerForm {
                    name: arg(args, 1, "name")?.to_string(),
                    position: arg(args, 2, "position")?.to_string(),
                    salary: arg(args, 3, "salary")?.to_string(),
                    status: arg(args, 4, "status")?.to_string(),
                    performance_score: arg(args, 5, "score")?.to_string(),
                };
                let w = WorkerLogic::create(self.store.as_mut(), &form)?;
                self.success(format!("Worker '{}' added with id {}", w.name, w.id))?;
            }
            "update" => {
                let id = id_arg(args, 1, "worker id")?;
                let mut form = form_from(&WorkerLogic::get(self.store.as_mut(), id)?);
                for pair in &args[2..] {
                    let (field, value) = pair.split_once('=').ok_or_else(|| {
                        AppError::validation(format!("Expected field=value, got '{}'", pair))
                    })?;
                    let slot = match field {
                        "name" => &mut form.name,
                        "position" => &mut form.position,
                        "salary" => &mut form.salary,
                        "status" => &mut form.status,
                        "score" => &mut form.performance_score,
                        _ => {
                            return Err(AppError::validation(format!(
                                "Unknown field '{}'",
                                field
                            )));
                        }
                    };
                    *slot = value.to_string();
                }
                let w = WorkerLogic::update(self.store.as_mut(), id, &form)?;
                self.success(format!("Worker '{}' updated", w.name))?;
            }
            "delete" => {
                let id = id_arg(args, 1, "worker id")?;
                let w = WorkerLogic::delete(self.store.as_mut(), id)?;
                self.success(format!("Worker '{}' removed", w.name))?;
            }
            other => {
                return Err(AppError::validation(format!(
                    "Unknown worker subcommand '{}'",
                    other
                )));
            }
        }
        Ok(())
    }

    fn task(&mut self, args: &[String]) -> AppResult<()> {
        match arg(args, 0, "task subcommand")? {
            "add" => {
                let worker = id_arg(args, 1, "worker id")?;
                let description = args.get(2..).unwrap_or_default().join(" ");
                let task = TaskLogic::add(self.store.as_mut(), worker, &description)?;
                self.success(format!("Task {} assigned", task.id))?;
            }
            "done" => {
                let id = id_arg(args, 1, "task id")?;
                let task = TaskLogic::complete(self.store.as_mut(), id)?;
                self.success(format!("Task {} completed", task.id))?;
            }
            other => {
                return Err(AppError::validation(format!(
                    "Unknown task subcommand '{}'",
                    other
                )));
            }
        }
        Ok(())
    }
}
