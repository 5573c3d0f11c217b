use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use opencrm::{
    agenda::{load_events, save_events, Agenda, Calendar},
    calendar::{MonthCursor, MonthGrid, WEEKDAYS},
    config::{is_supported_font, ConfigPatch, ConfigStore, SUPPORTED_FONTS},
    event::{parse_date, parse_start_time, CalendarEvent, EventDraft, EventType},
    export::{export, ExportFormat, ExportScope},
    filenames::opencrm_store,
    palette::Color,
    store::file::FileStore,
    theme::{CssSink, ThemeApplier},
};
use ttygrid::{add_line, grid, header};

macro_rules! compose_grid {
    ($grid:expr, $($header:expr),*) => {{
        use crossterm::style::{Colors, Color};

        let mut grid = grid!($grid, $($header),*)?;
        grid.set_header_color(Colors::new(Color::DarkCyan, Color::Reset));
        grid.set_delimiter_color(Colors::new(Color::Cyan, Color::Reset));
        grid.set_primary_color(Colors::new(Color::White, Color::Reset));
        grid.set_secondary_color(Colors::new(Color::Grey, Color::Reset));

        grid
    }}
}

#[derive(Parser, Debug)]
#[command(
    name = "opencrm",
    version,
    about = "Theme and calendar tooling for OpenCRM"
)]
#[command(propagate_version = true)]
struct ArgParser {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    #[command(about = "Print the current configuration")]
    Show,
    #[command(about = "Set the application name, also used as the window title")]
    SetName { name: String },
    #[command(about = "Set the primary color the palette is derived from, e.g. #0ea5e9")]
    SetColor { color: String },
    #[command(about = "Set the font family")]
    SetFont { font: String },
    #[command(about = "Turn dark mode on or off")]
    SetDarkMode { set: bool },
    #[command(about = "Merge a JSON object into the configuration")]
    Set { json: String },
    #[command(about = "Restore the default configuration")]
    Reset,
}

#[derive(Debug, Subcommand)]
enum EventCommand {
    #[command(alias = "a", about = "Also `a`. Add an event")]
    Add {
        title: Vec<String>,
        #[arg(short = 'd', long, help = "Date as YYYY-MM-DD; defaults to today")]
        date: Option<String>,
        #[arg(
            short = 't',
            long = "type",
            default_value = "meeting",
            help = "meeting, reminder or task"
        )]
        typ: String,
        #[arg(short = 's', long, help = "Start time as HH:MM")]
        time: Option<String>,
        #[arg(long, help = "Longer description")]
        description: Option<String>,
    },
    #[command(alias = "l", about = "Also `l`. List events for a day, or --all")]
    List {
        #[arg(short = 'd', long, help = "Date as YYYY-MM-DD; defaults to today")]
        date: Option<String>,
        #[arg(short = 'a', long, help = "List every event")]
        all: bool,
    },
    #[command(alias = "c", about = "Also `c`. Toggle a task's completion")]
    Complete { id: String },
    #[command(alias = "d", about = "Also `d`. Delete an event by ID")]
    Delete { id: String },
    #[command(about = "Export events, optionally one month's or one type's")]
    Export {
        #[arg(short = 'f', long, default_value = "json", help = "json, yaml or cbor")]
        format: String,
        #[arg(short = 'm', long, help = "Only this month, as YYYY-MM")]
        month: Option<String>,
        #[arg(short = 't', long = "type", help = "Only one type: meeting, reminder or task")]
        typ: Option<String>,
        #[arg(short = 'p', long, help = "Only tasks not yet completed")]
        pending: bool,
    },
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Manipulate Configuration")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    #[command(about = "Print the theme's CSS variables")]
    Theme,
    #[command(alias = "cal", about = "Also `cal`. Show a month")]
    Calendar {
        #[arg(short = 'y', long)]
        year: Option<i32>,
        #[arg(short = 'm', long)]
        month: Option<u32>,
    },
    #[command(alias = "e", about = "Also `e`. Manage calendar events")]
    Event {
        #[command(subcommand)]
        command: EventCommand,
    },
    #[command(about = "Show the appointments and to-do list for a day")]
    Agenda {
        #[arg(short = 'd', long, help = "Date as YYYY-MM-DD; defaults to today")]
        date: Option<String>,
    },
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

fn date_or_today(date: Option<String>) -> Result<chrono::NaiveDate> {
    date.map(|d| parse_date(&d)).unwrap_or_else(|| Ok(today()))
}

fn parse_month(s: &str) -> Result<MonthCursor> {
    let (year, month) = s
        .rsplit_once('-')
        .ok_or_else(|| anyhow!("Invalid month '{}'; must be YYYY-MM", s))?;
    MonthCursor::new(year.parse()?, month.parse()?)
}

fn print_events(events: &[&CalendarEvent]) -> Result<()> {
    if events.is_empty() {
        return Ok(());
    }

    let mut grid = compose_grid!(
        header!("TIME", 4),
        header!("TITLE", 5),
        header!("TYPE", 2),
        header!("DATE", 3),
        header!("ID", 6),
        header!("DONE", 1)
    );

    for event in events {
        add_line!(
            grid,
            event
                .start_time()
                .map(|t| t.format("%H:%M").to_string())
                .unwrap_or("All Day".to_string()),
            format!(
                "{0:.20}{1}",
                event.title(),
                if event.title().len() > 20 { "..." } else { "" }
            ),
            event.event_type().to_string(),
            event.date().to_string(),
            event.id().to_string(),
            if event.is_completed() { "X" } else { "" }.to_string()
        )?;
    }

    grid.write(std::io::stdout())?;
    Ok(())
}

// day number, `*` for today and the event count, per cell
fn week_rows(grid: &MonthGrid, now: chrono::NaiveDate) -> Vec<Vec<String>> {
    grid.weeks()
        .iter()
        .map(|week| {
            week.iter()
                .map(|cell| match cell {
                    Some(cell) => format!(
                        "{}{}{}",
                        cell.day,
                        if cell.date == now { "*" } else { "" },
                        if cell.events.is_empty() {
                            String::new()
                        } else {
                            format!(" ({})", cell.events.len())
                        }
                    ),
                    None => String::new(),
                })
                .collect()
        })
        .collect()
}

fn print_month(grid: &MonthGrid) -> Result<()> {
    println!("{}", grid.cursor.name());

    let mut table = compose_grid!(
        header!((WEEKDAYS[0])),
        header!((WEEKDAYS[1])),
        header!((WEEKDAYS[2])),
        header!((WEEKDAYS[3])),
        header!((WEEKDAYS[4])),
        header!((WEEKDAYS[5])),
        header!((WEEKDAYS[6]))
    );

    for c in week_rows(grid, today()) {
        add_line!(
            table,
            c[0].clone(),
            c[1].clone(),
            c[2].clone(),
            c[3].clone(),
            c[4].clone(),
            c[5].clone(),
            c[6].clone()
        )?;
    }

    table.write(std::io::stdout())?;
    Ok(())
}

fn print_agenda(agenda: &Agenda<'_>) -> Result<()> {
    println!("Agenda for {}", agenda.date);
    if agenda.is_empty() {
        println!("Nothing scheduled.");
        return Ok(());
    }

    if !agenda.appointments.is_empty() {
        println!("\nAppointments & reminders");
        print_events(&agenda.appointments)?;
    }

    if !agenda.tasks.is_empty() {
        println!("\nTo-Do list");
        print_events(&agenda.tasks)?;
    }

    Ok(())
}

fn update_config(mut config: ConfigStore<FileStore>, patch: ConfigPatch) -> Result<()> {
    let mut applier = ThemeApplier::new(CssSink::new());
    applier.init(config.current());

    let updated = config.update(patch)?;
    if applier.sync(&updated) {
        print!("{}", applier.sink().render());
    }

    Ok(())
}

fn process_config(command: ConfigCommand, store: FileStore) -> Result<()> {
    let mut config = ConfigStore::open(store);

    match command {
        ConfigCommand::Show => {
            println!("{}", serde_json::to_string_pretty(config.current())?);
        }
        ConfigCommand::SetName { name } => update_config(
            config,
            ConfigPatch {
                app_name: Some(name),
                ..Default::default()
            },
        )?,
        ConfigCommand::SetColor { color } => {
            color.parse::<Color>()?;
            update_config(
                config,
                ConfigPatch {
                    primary_color: Some(color),
                    ..Default::default()
                },
            )?
        }
        ConfigCommand::SetFont { font } => {
            if !is_supported_font(&font) {
                return Err(anyhow!(
                    "Unsupported font '{}'; must be one of {:?}",
                    font,
                    SUPPORTED_FONTS
                ));
            }

            update_config(
                config,
                ConfigPatch {
                    font_family: Some(font),
                    ..Default::default()
                },
            )?
        }
        ConfigCommand::SetDarkMode { set } => update_config(
            config,
            ConfigPatch {
                dark_mode: Some(set),
                ..Default::default()
            },
        )?,
        ConfigCommand::Set { json } => update_config(config, serde_json::from_str(&json)?)?,
        ConfigCommand::Reset => {
            config.reset()?;
        }
    }

    Ok(())
}

fn process_event(command: EventCommand, mut store: FileStore) -> Result<()> {
    let mut calendar = Calendar::today(load_events(&store));

    match command {
        EventCommand::Add {
            title,
            date,
            typ,
            time,
            description,
        } => {
            if title.is_empty() {
                return Err(anyhow!("An event needs a title"));
            }

            let start_time = time.map(|t| parse_start_time(&t)).transpose()?;
            let id = calendar.add_event(
                EventDraft::build(&title.join(" "), date_or_today(date)?)
                    .set_event_type(typ.parse::<EventType>()?)
                    .set_start_time(start_time)
                    .set_description(description)
                    .clone(),
            );
            save_events(&mut store, calendar.events())?;
            println!("{}", id);
        }
        EventCommand::List { date, all } => {
            if all {
                print_events(&calendar.events().iter().collect::<Vec<_>>())?;
            } else {
                calendar.select(date_or_today(date)?);
                print_agenda(&calendar.agenda())?;
            }
        }
        EventCommand::Complete { id } => {
            if !calendar.toggle_task_completion(&id) {
                return Err(anyhow!("No event with ID {}", id));
            }
            save_events(&mut store, calendar.events())?;
        }
        EventCommand::Delete { id } => {
            if !calendar.delete_event(&id) {
                return Err(anyhow!("No event with ID {}", id));
            }
            save_events(&mut store, calendar.events())?;
        }
        EventCommand::Export {
            format,
            month,
            typ,
            pending,
        } => {
            let scope = ExportScope {
                month: month.map(|m| parse_month(&m)).transpose()?,
                event_type: typ.map(|t| t.parse::<EventType>()).transpose()?,
                pending_only: pending,
            };
            export(
                &mut std::io::stdout(),
                calendar.events(),
                &scope,
                format.parse::<ExportFormat>()?,
            )?;
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = ArgParser::parse();
    let store = FileStore::new(opencrm_store());

    match cli.command {
        Command::Config { command } => process_config(command, store)?,
        Command::Theme => {
            let config = ConfigStore::open(store);
            let mut applier = ThemeApplier::new(CssSink::new());
            applier.init(config.current());

            if let Some(title) = applier.sink().title() {
                println!("/* {} */", title);
            }
            print!("{}", applier.sink().render());
        }
        Command::Calendar { year, month } => {
            let mut calendar = Calendar::today(load_events(&store));
            if year.is_some() || month.is_some() {
                let current = calendar.cursor();
                calendar.set_cursor(MonthCursor::new(
                    year.unwrap_or(current.year()),
                    month.unwrap_or(current.month()),
                )?);
            }

            print_month(&calendar.grid())?;
        }
        Command::Event { command } => process_event(command, store)?,
        Command::Agenda { date } => {
            let mut calendar = Calendar::today(load_events(&store));
            calendar.select(date_or_today(date)?);
            print_agenda(&calendar.agenda())?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_month() {
        assert_eq!(
            parse_month("2024-06").unwrap(),
            MonthCursor::new(2024, 6).unwrap()
        );
        assert_eq!(
            parse_month("-44-03").unwrap(),
            MonthCursor::new(-44, 3).unwrap()
        );
        assert!(parse_month("2024").is_err());
        assert!(parse_month("2024-13").is_err());
        assert!(parse_month("june-2024").is_err());
    }

    #[test]
    fn test_week_rows() {
        let day = chrono::NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let mut calendar = Calendar::new(day, Vec::new());
        calendar.add_event(EventDraft::build("leap day", day));
        calendar.add_event(EventDraft::build("standup", day));

        let rows = week_rows(&calendar.grid(), day);
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|r| r.len() == WEEKDAYS.len()));
        assert_eq!(rows[0][3], "");
        assert_eq!(rows[0][4], "1");
        assert_eq!(rows[4][4], "29* (2)");
        assert_eq!(rows[4][5], "");
    }
}
