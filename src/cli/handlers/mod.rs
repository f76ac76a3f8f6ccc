mod init;
pub use init::cmd_init;

use std::path::{Path, PathBuf};

use chrono::Local;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::model::config::{HabitsConfig, StoreBackend};
use crate::model::habit::{HabitEdit, HabitIntent, NewHabit};
use crate::ops::book::{Deleted, HabitBook, NoticeKind, Presenter, notify_failure};
use crate::ops::calendar::{self, Month};
use crate::ops::categories;
use crate::ops::reminder::ReminderSchedule;
use crate::ops::stats;
use crate::ops::view::{self, CategoryFilter, StatusFilter};
use crate::store::{FileStore, HabitStore, HttpStore, StoreError};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Run the command. A failure is reported through the terminal presenter
/// before it is returned.
pub fn dispatch(cli: Cli) -> CmdResult {
    let reporter = presenter(cli.json, false);
    notify_failure(&reporter, run(cli))
}

fn run(cli: Cli) -> CmdResult {
    let json = cli.json;
    let base = base_dir(cli.dir.as_deref())?;

    match cli.command.unwrap_or(Commands::List(ListArgs {
        status: "all".into(),
        category: "all".into(),
    })) {
        Commands::Init(args) => cmd_init(args, &base),

        // Read commands
        Commands::List(args) => cmd_list(&base, args, json),
        Commands::Show(args) => cmd_show(&base, args, json),
        Commands::Stats => cmd_stats(&base, json),
        Commands::Calendar(args) => cmd_calendar(&base, args, json),
        Commands::Refresh => cmd_refresh(&base, json),

        // Write commands
        Commands::Add(args) => cmd_add(&base, args, json),
        Commands::Edit(args) => cmd_edit(&base, args, json),
        Commands::Toggle(args) => cmd_toggle(&base, args, json),
        Commands::Delete(args) => cmd_delete(&base, args, json),
        Commands::Reorder(args) => cmd_reorder(&base, args, json),
        Commands::Move(args) => cmd_move(&base, args, json),

        // Settings
        Commands::Categories(cmd) => cmd_categories(&base, cmd, json),
        Commands::Config(cmd) => cmd_config(&base, cmd, json),
        Commands::Theme => cmd_theme(&base, json),
        Commands::Remind => cmd_remind(&base, json),
    }
}

/// Directory to start from: `-C` if given, else the current directory.
fn base_dir(dir: Option<&str>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match dir {
        Some(dir) => Ok(std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?),
        None => Ok(std::env::current_dir()?),
    }
}

// ---------------------------------------------------------------------------
// Context loading
// ---------------------------------------------------------------------------

/// Data directory plus its config, parsed and as an editable document.
struct Context {
    data_dir: PathBuf,
    config: HabitsConfig,
    doc: toml_edit::DocumentMut,
}

fn load_context(base: &Path) -> Result<Context, Box<dyn std::error::Error>> {
    let data_dir = config_io::discover_data_dir(base)?;
    let (config, doc) = config_io::read_config(&data_dir)?;
    log::debug!("using {} (backend {:?})", data_dir.display(), config.store.backend);
    Ok(Context {
        data_dir,
        config,
        doc,
    })
}

/// Build the store the config selects.
pub fn open_store(data_dir: &Path, config: &HabitsConfig) -> Result<Box<dyn HabitStore>, StoreError> {
    match config.store.backend {
        StoreBackend::File => Ok(Box::new(FileStore::new(data_dir.join(&config.store.file)))),
        StoreBackend::Http => Ok(Box::new(HttpStore::new(&config.store.http)?)),
    }
}

fn load_book(base: &Path) -> Result<(Context, Box<dyn HabitStore>, HabitBook), Box<dyn std::error::Error>> {
    let ctx = load_context(base)?;
    let mut store = open_store(&ctx.data_dir, &ctx.config)?;
    let book = HabitBook::load(store.as_mut())?;
    Ok((ctx, store, book))
}

fn presenter(json: bool, assume_yes: bool) -> TerminalPresenter {
    TerminalPresenter {
        assume_yes,
        quiet: json,
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(base: &Path, args: ListArgs, json: bool) -> CmdResult {
    let status: StatusFilter = args.status.parse()?;
    let category: CategoryFilter = args.category.parse()?;
    let (_, _, book) = load_book(base)?;
    let visible = view::filter_habits(book.habits(), status, &category);

    if json {
        print_json(&list_to_json(visible, status, &category))
    } else {
        print_lines(&format_habit_list(&visible, book.len()));
        Ok(())
    }
}

fn cmd_show(base: &Path, args: ShowArgs, json: bool) -> CmdResult {
    let (_, _, book) = load_book(base)?;
    let habit = book
        .get(&args.id)
        .ok_or_else(|| format!("habit not found: {}", args.id))?;
    if json {
        print_json(habit)
    } else {
        print_lines(&format_habit_detail(habit));
        Ok(())
    }
}

fn cmd_stats(base: &Path, json: bool) -> CmdResult {
    let (_, _, book) = load_book(base)?;
    let summary = stats::compute_stats(book.habits());
    let chart = stats::chart_rows(book.habits());
    if json {
        print_json(&StatsJson {
            stats: summary,
            chart,
        })
    } else {
        print_lines(&format_stats(&summary, &chart));
        Ok(())
    }
}

fn cmd_calendar(base: &Path, args: CalendarArgs, json: bool) -> CmdResult {
    let start = match args.month {
        Some(ref s) => Month::parse(s)?,
        None => Month::containing(Local::now().date_naive()),
    };
    let month = start
        .offset(args.offset)
        .ok_or_else(|| format!("month offset {} is out of range", args.offset))?;
    let (_, _, book) = load_book(base)?;
    let cal = calendar::build_month(month, book.habits(), &Local);
    if json {
        print_json(&cal)
    } else {
        print_lines(&format_calendar(&cal, book.habits()));
        Ok(())
    }
}

fn cmd_refresh(base: &Path, json: bool) -> CmdResult {
    let (_, mut store, mut book) = load_book(base)?;
    book.refresh(store.as_mut())?;
    if json {
        print_json(&book.habits())
    } else {
        println!("Loaded {} habits from the store.", book.len());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(base: &Path, args: AddArgs, json: bool) -> CmdResult {
    let (ctx, mut store, mut book) = load_book(base)?;
    if !ctx
        .config
        .categories
        .names
        .iter()
        .any(|c| c.eq_ignore_ascii_case(args.category.trim()))
    {
        log::warn!("category {} is not in config.toml", args.category);
    }
    let intent = HabitIntent::Create(NewHabit {
        name: args.name,
        category: args.category,
        goal: args.goal,
        notes: args.notes,
    });
    let habit = book.submit(store.as_mut(), intent, &Local::now())?;
    if json {
        print_json(&habit)
    } else {
        presenter(json, false).notify(&format!("Added {} ({})", habit.name, habit.id), NoticeKind::Success);
        Ok(())
    }
}

fn cmd_edit(base: &Path, args: EditArgs, json: bool) -> CmdResult {
    let (_, mut store, mut book) = load_book(base)?;
    let intent = HabitIntent::Edit {
        id: args.id,
        edit: HabitEdit {
            name: args.name,
            category: args.category,
            goal: args.goal,
            notes: args.notes,
        },
    };
    let habit = book.submit(store.as_mut(), intent, &Local::now())?;
    if json {
        print_json(&habit)
    } else {
        presenter(json, false).notify(&format!("Updated {}", habit.name), NoticeKind::Success);
        Ok(())
    }
}

fn cmd_toggle(base: &Path, args: ToggleArgs, json: bool) -> CmdResult {
    let (_, mut store, mut book) = load_book(base)?;
    let toggled = book.toggle(store.as_mut(), &args.id, &Local::now())?;
    if json {
        print_json(&toggled.habit)
    } else {
        presenter(json, false).notify(&toggled.message(), NoticeKind::Success);
        Ok(())
    }
}

fn cmd_delete(base: &Path, args: DeleteArgs, json: bool) -> CmdResult {
    let (_, mut store, mut book) = load_book(base)?;
    let p = presenter(json, args.yes);
    match book.delete(store.as_mut(), &args.id, &p)? {
        Deleted::Removed(habit) => {
            if json {
                print_json(&habit)?;
            }
            p.notify(&format!("Deleted {}", habit.name), NoticeKind::Success);
        }
        Deleted::Cancelled => {
            p.notify("Cancelled.", NoticeKind::Success);
        }
    }
    Ok(())
}

fn cmd_reorder(base: &Path, args: ReorderArgs, json: bool) -> CmdResult {
    let (ctx, mut store, mut book) = load_book(base)?;
    for id in &args.ids {
        if book.get(id).is_none() {
            log::warn!("ignoring unknown habit id {}", id);
        }
    }
    let outcome = book.reorder(store.as_mut(), &args.ids, ctx.config.store.reorder_retries)?;
    if json {
        print_json(&book.habits())
    } else {
        presenter(json, false).notify(
            &format!("Order saved ({} habits changed position).", outcome.persisted),
            NoticeKind::Success,
        );
        Ok(())
    }
}

fn cmd_move(base: &Path, args: MoveArgs, json: bool) -> CmdResult {
    if args.to == 0 {
        return Err("positions start at 1".into());
    }
    let (ctx, mut store, mut book) = load_book(base)?;
    let outcome = book.move_habit(
        store.as_mut(),
        &args.id,
        args.to - 1,
        ctx.config.store.reorder_retries,
    )?;
    if json {
        print_json(&book.habits())
    } else {
        presenter(json, false).notify(
            &format!("Order saved ({} habits changed position).", outcome.persisted),
            NoticeKind::Success,
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

fn cmd_categories(base: &Path, cmd: CategoriesCmd, json: bool) -> CmdResult {
    match cmd.action {
        Some(CategoriesAction::Add { name }) => {
            let mut ctx = load_context(base)?;
            let name = categories::validate_new_category(&ctx.config.categories.names, &name)?;
            config_io::add_category_to_config(&mut ctx.doc, &name);
            config_io::write_config(&ctx.data_dir, &ctx.doc)?;
            presenter(json, false).notify(&format!("Added category {}", name), NoticeKind::Success);
            Ok(())
        }
        None => {
            let (ctx, _, book) = load_book(base)?;
            let counts = categories::category_counts(&ctx.config.categories.names, book.habits());
            if json {
                let rows: Vec<CategoryJson> = counts
                    .into_iter()
                    .map(|(name, habits)| CategoryJson { name, habits })
                    .collect();
                return print_json(&rows);
            }
            for (name, count) in &counts {
                println!(
                    "{:<14} {:>3}  ({})",
                    categories::capitalize(name),
                    count,
                    categories::category_icon(name)
                );
            }
            Ok(())
        }
    }
}

fn cmd_config(base: &Path, cmd: ConfigCmd, json: bool) -> CmdResult {
    let mut ctx = load_context(base)?;
    match cmd.action {
        Some(ConfigAction::Set { key, value }) => {
            config_io::set_value(&mut ctx.doc, &key, &value)?;
            config_io::write_config(&ctx.data_dir, &ctx.doc)?;
            presenter(json, false).notify(&format!("{} = {}", key, value), NoticeKind::Success);
            Ok(())
        }
        None => {
            if json {
                print_json(&ctx.config)
            } else {
                print_lines(&format_config(&ctx.config));
                Ok(())
            }
        }
    }
}

fn cmd_theme(base: &Path, json: bool) -> CmdResult {
    let mut ctx = load_context(base)?;
    let next = ctx.config.ui.theme.toggled();
    config_io::set_value(&mut ctx.doc, "ui.theme", next.as_str())?;
    config_io::write_config(&ctx.data_dir, &ctx.doc)?;
    if json {
        print_json(&serde_json::json!({ "theme": next }))
    } else {
        println!("theme: {}", next.as_str());
        Ok(())
    }
}

fn cmd_remind(base: &Path, json: bool) -> CmdResult {
    let ctx = load_context(base)?;
    let schedule = ReminderSchedule::from_config(&ctx.config.reminders)?;
    let next = schedule.next_after(&Local::now());
    if json {
        print_json(&ReminderJson {
            time: schedule.time.format("%H:%M").to_string(),
            days: schedule.day_names(),
            next,
        })
    } else {
        println!("{}", format_reminder(&schedule, next));
        Ok(())
    }
}
