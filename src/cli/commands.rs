use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "hab", about = concat!("hab v", env!("CARGO_PKG_VERSION"), " - keep your streaks going"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different directory (searched upward for .habits/)
    #[arg(short = 'C', long = "dir", global = true)]
    pub dir: Option<String>,

    /// Log store calls and state changes to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a .habits/ directory here
    Init(InitArgs),
    /// List habits (the default command)
    List(ListArgs),
    /// Show one habit in detail
    Show(ShowArgs),
    /// Add a habit
    Add(AddArgs),
    /// Edit a habit's name, category, goal or notes
    Edit(EditArgs),
    /// Mark a habit done for today, or undo that
    Toggle(ToggleArgs),
    /// Delete a habit
    Delete(DeleteArgs),
    /// Set the manual order from a list of habit IDs
    Reorder(ReorderArgs),
    /// Move one habit to a position in the manual order
    Move(MoveArgs),
    /// Re-read all habits from the store
    Refresh,
    /// Show completion and streak statistics
    Stats,
    /// Show a month calendar of when habits were started
    Calendar(CalendarArgs),
    /// List categories, or add one
    Categories(CategoriesCmd),
    /// Show or change settings
    Config(ConfigCmd),
    /// Switch between light and dark theme
    Theme,
    /// Show when the next reminder is due
    Remind,
}

#[derive(Args)]
pub struct InitArgs {
    /// Overwrite an existing config.toml
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Default)]
pub struct ListArgs {
    /// Filter by status (all, active, completed)
    #[arg(long, default_value = "all")]
    pub status: String,
    /// Filter by category (or "all")
    #[arg(long, default_value = "all")]
    pub category: String,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Habit ID
    pub id: String,
}

#[derive(Args)]
pub struct AddArgs {
    /// Habit name
    pub name: String,
    /// Category
    #[arg(short, long, default_value = "other")]
    pub category: String,
    /// What counts as done (e.g. "8 glasses")
    #[arg(long)]
    pub goal: Option<String>,
    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Habit ID
    pub id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(short, long)]
    pub category: Option<String>,
    #[arg(long)]
    pub goal: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args)]
pub struct ToggleArgs {
    /// Habit ID
    pub id: String,
}

#[derive(Args)]
pub struct DeleteArgs {
    /// Habit ID
    pub id: String,
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct ReorderArgs {
    /// Habit IDs in the new order; unlisted habits follow
    #[arg(required = true)]
    pub ids: Vec<String>,
}

#[derive(Args)]
pub struct MoveArgs {
    /// Habit ID
    pub id: String,
    /// New position, 1 = top
    #[arg(long)]
    pub to: usize,
}

#[derive(Args)]
pub struct CalendarArgs {
    /// Month to show as YYYY-MM (default: this month)
    #[arg(long)]
    pub month: Option<String>,
    /// Shift the month by this many months (e.g. -1 for the previous one)
    #[arg(long, allow_hyphen_values = true, default_value_t = 0)]
    pub offset: i32,
}

#[derive(Args)]
pub struct CategoriesCmd {
    #[command(subcommand)]
    pub action: Option<CategoriesAction>,
}

#[derive(Subcommand)]
pub enum CategoriesAction {
    /// Add a category
    Add {
        /// Category name
        name: String,
    },
}

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Set a value (reminders.time, reminders.days, ui.theme, store.backend, store.reorder_retries)
    Set {
        key: String,
        value: String,
    },
}
