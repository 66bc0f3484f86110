use crate::models::analytics::AnalyticsMetric;
use clap::{Parser, Subcommand};

/// Command-line interface definition for CrewPilot
#[derive(Parser, Debug)]
#[command(
    name = "crewpilot",
    version = env!("CARGO_PKG_VERSION"),
    about = "Track workers, tasks and performance predictions from the terminal",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    /// Username for commands that need a signed-in user
    #[arg(global = true, long = "user", env = "CREWPILOT_USER")]
    pub user: Option<String>,

    /// Password for commands that need a signed-in user
    #[arg(
        global = true,
        long = "password",
        env = "CREWPILOT_PASSWORD",
        hide_env_values = true
    )]
    pub password: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the database, the configuration and the model artifact
    Init,

    /// Manage the configuration file (view, edit or upgrade)
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(long = "editor", help = "Editor to use with --edit")]
        editor: Option<String>,

        #[arg(long = "migrate", help = "Add missing fields to the configuration file")]
        migrate: bool,
    },

    /// Manage the database
    Db {
        #[arg(long = "migrate", help = "Apply pending schema migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Create an account (password via --password)
    Signup {
        username: String,
        email: String,

        #[arg(long = "confirm", help = "Repeat the password")]
        confirm: String,
    },

    /// Check credentials and record the login
    Login,

    /// Stat cards, recent activity and recent predictions
    Dashboard {
        #[arg(long)]
        json: bool,
    },

    /// Manage workers
    Worker {
        #[command(subcommand)]
        action: WorkerAction,
    },

    /// Assign and complete tasks
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },

    /// Predict and store a performance score for a worker
    Predict {
        worker_id: i64,

        #[arg(long)]
        json: bool,
    },

    /// Stored predictions for a worker, newest first
    History {
        worker_id: i64,

        #[arg(long, default_value_t = 10)]
        limit: usize,

        #[arg(long)]
        json: bool,
    },

    /// Train or inspect the prediction model
    Model {
        #[command(subcommand)]
        action: ModelAction,
    },

    /// Daily series of a metric with a moving-average forecast
    Analytics {
        #[arg(value_enum)]
        metric: AnalyticsMetric,

        #[arg(long, help = "Start date (YYYY-MM-DD), default: window before --to")]
        from: Option<String>,

        #[arg(long, help = "End date (YYYY-MM-DD), default: today")]
        to: Option<String>,

        #[arg(long = "worker", help = "Restrict to one worker")]
        worker_id: Option<i64>,

        #[arg(long)]
        json: bool,
    },

    /// Recent activity feed
    Activity {
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show account and application settings, or change username/email
    Settings {
        #[arg(long)]
        username: Option<String>,

        #[arg(long)]
        email: Option<String>,
    },

    /// Interactive session (login, sections, commands)
    Shell,
}

#[derive(Subcommand, Debug)]
pub enum WorkerAction {
    /// Add a worker
    Add {
        name: String,

        #[arg(long)]
        position: String,

        #[arg(long)]
        salary: String,

        #[arg(long, default_value = "active", help = "active, inactive or on_leave")]
        status: String,

        #[arg(long)]
        score: String,
    },

    /// List workers
    List {
        #[arg(long, help = "Cards with task totals and open tasks")]
        cards: bool,

        #[arg(long)]
        json: bool,
    },

    /// Show one worker with its tasks
    Show {
        id: i64,

        #[arg(long)]
        json: bool,
    },

    /// Change fields of a worker; omitted fields keep their value
    Update {
        id: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        position: Option<String>,

        #[arg(long)]
        salary: Option<String>,

        #[arg(long)]
        status: Option<String>,

        #[arg(long)]
        score: Option<String>,
    },

    /// Remove a worker with its tasks and predictions
    Delete {
        id: i64,

        #[arg(long, short = 'y', help = "Do not ask for confirmation")]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum TaskAction {
    /// Assign a task to a worker
    Add {
        worker_id: i64,

        #[arg(num_args = 1.., required = true)]
        description: Vec<String>,
    },

    /// Mark a task completed
    Done { task_id: i64 },

    /// List tasks
    List {
        #[arg(long = "worker")]
        worker_id: Option<i64>,

        #[arg(long, help = "Only tasks not yet completed")]
        open: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ModelAction {
    /// Fit the model on a CSV file and save it
    Train {
        #[arg(help = "CSV with hours_worked,tasks_completed,efficiency_rate,completion_rate,score")]
        file: String,
    },

    /// Show the model artifact and its settings
    Info {
        #[arg(long)]
        json: bool,
    },
}
