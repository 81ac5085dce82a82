//! dash-runner: headless host for the consumer complaints dashboard.
//!
//! Usage:
//!   dash-runner --workbook-dir ./data --state CO
//!   dash-runner --config dashboard.json --json
//!   dash-runner --config dashboard.json --ipc-mode

use anyhow::Result;
use clap::Parser;
use complaint_dash_core::{
    config::DashConfig,
    dashboard::{Dashboard, Interaction},
    filter::{Selections, StateSelection},
    presentation::{format_pct, ChartState, TreemapNode},
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

const BAR_WIDTH: usize = 40;

#[derive(Parser)]
#[command(
    name = "dash-runner",
    about = "Load a complaint worksheet, filter it, and print the dashboard."
)]
struct Args {
    /// JSON config file. Flags below override its values.
    #[arg(long, value_name = "PATH")]
    config: Option<String>,

    /// Directory holding the spreadsheet file.
    #[arg(long, value_name = "DIR")]
    workbook_dir: Option<PathBuf>,

    /// Spreadsheet name, resolved to `<workbook-dir>/<name>.<ext>`.
    #[arg(long)]
    spreadsheet: Option<String>,

    /// Worksheet index inside the spreadsheet.
    #[arg(long)]
    worksheet: Option<usize>,

    /// Service-account key file.
    #[arg(long, value_name = "PATH", conflicts_with = "no_credentials")]
    credentials: Option<PathBuf>,

    /// Skip the credentials check (local exports).
    #[arg(long)]
    no_credentials: bool,

    /// Initial state selection.
    #[arg(long)]
    state: Option<String>,

    /// Initial channel selection.
    #[arg(long)]
    channel: Option<String>,

    /// Print the view once as JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Read JSON commands from stdin, answer with one JSON line each.
    #[arg(long)]
    ipc_mode: bool,
}

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    SelectState { state: String },
    SelectChannel { channel: String },
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = build_config(&args)?;

    let dashboard = match Dashboard::open(config) {
        Ok(d) => d,
        Err(e) => {
            if args.ipc_mode {
                let err_json = serde_json::json!({
                    "error": e.to_string(),
                    "category": e.category(),
                });
                println!("{err_json}");
            }
            return Err(anyhow::anyhow!("{}: {e}", e.category()));
        }
    };

    let mut selections = Selections {
        state: args
            .state
            .as_deref()
            .map(|s| StateSelection::from_label(s, &dashboard.config().selectors))
            .unwrap_or_default(),
        channel: args.channel.clone(),
    };

    if args.ipc_mode {
        run_ipc_loop(&dashboard, &mut selections)?;
    } else {
        let interaction = dashboard.interact(&selections);
        if args.json {
            println!("{}", serde_json::to_string_pretty(&interaction.view)?);
        } else {
            print_dashboard(&dashboard, &interaction);
        }
    }

    Ok(())
}

fn build_config(args: &Args) -> Result<DashConfig> {
    let mut config = match &args.config {
        Some(path) => DashConfig::load(path)?,
        None => DashConfig::default(),
    };
    if let Some(dir) = &args.workbook_dir {
        config.source.workbook_dir = dir.clone();
    }
    if let Some(name) = &args.spreadsheet {
        config.source.spreadsheet_name = name.clone();
    }
    if let Some(index) = args.worksheet {
        config.source.worksheet_index = index;
    }
    if let Some(path) = &args.credentials {
        config.source.credentials_path = Some(path.clone());
    }
    if args.no_credentials {
        config.source.credentials_path = None;
    }
    Ok(config)
}

fn run_ipc_loop(dashboard: &Dashboard, selections: &mut Selections) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("ignoring malformed command: {e}");
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => {}
            IpcCommand::SelectState { state } => {
                selections.state =
                    StateSelection::from_label(&state, &dashboard.config().selectors);
            }
            IpcCommand::SelectChannel { channel } => {
                selections.channel = Some(channel);
            }
        }

        let interaction = dashboard.interact(selections);
        *selections = interaction.selections;
        writeln!(stdout, "{}", serde_json::to_string(&interaction.view)?)?;
        stdout.flush()?;
    }
    Ok(())
}

fn print_dashboard(dashboard: &Dashboard, interaction: &Interaction) {
    let view = &interaction.view;
    let table = dashboard.table();

    println!("=== {} ===", view.title);
    println!("  source:   {} ({} records)", table.source_name(), table.len());
    println!(
        "  state:    {}",
        view.state_selector.selected.as_deref().unwrap_or("-")
    );
    println!(
        "  channel:  {}  [{}]",
        view.channel_selector.selected.as_deref().unwrap_or("-"),
        view.channel_selector.options.join(", ")
    );
    if let Some(notice) = &view.notice {
        println!();
        println!("  ! {notice}");
    }

    println!();
    println!("=== KPI GRID ===");
    for tile in &view.kpis {
        println!("  {:<52} {}", tile.label, tile.value);
    }

    print_section(&view.product_chart, |chart| {
        let max = chart.bars.iter().map(|b| b.count).max().unwrap_or(0);
        println!("=== {} ===", chart.title.to_uppercase());
        for bar in &chart.bars {
            println!("  {:<32} {} {}", bar.label, bar_text(bar.count, max), bar.count);
        }
    });

    print_section(&view.monthly_chart, |chart| {
        let max = chart.points.iter().map(|p| p.value).max().unwrap_or(0);
        println!("=== {} ===", chart.title.to_uppercase());
        for point in &chart.points {
            println!("  {}  {} {}", point.label, bar_text(point.value, max), point.value);
        }
    });

    if let Some(focus) = &view.channel_focus {
        println!();
        println!(
            "  {}: {} ({})",
            focus.caption,
            focus.complaints,
            format_pct(focus.share_pct)
        );
        println!(
            "    closed {}  timely {}  in progress {}",
            focus.outputs.closed_count,
            format_pct(focus.outputs.timely_pct),
            focus.outputs.in_progress_count
        );
    }

    print_section(&view.channel_chart, |chart| {
        println!("=== {} ===", chart.title.to_uppercase());
        for slice in &chart.slices {
            let marker = if slice.highlighted { "*" } else { " " };
            println!(
                "{marker} {:<32} {:>6} {:>8}",
                slice.label,
                slice.value,
                format_pct(Some(slice.share_pct))
            );
        }
    });

    print_section(&view.issue_treemap, |chart| {
        println!("=== {} ===", chart.title.to_uppercase());
        for root in &chart.roots {
            print_node(root, 1);
        }
    });

    if let Some(footer) = &view.footer {
        println!();
        println!("{footer}");
    }
}

fn print_section<T>(state: &ChartState<T>, render: impl FnOnce(&T)) {
    println!();
    match state {
        ChartState::Ready { chart } => render(chart),
        ChartState::Placeholder { message } => println!("  ({message})"),
    }
}

fn print_node(node: &TreemapNode, depth: usize) {
    println!(
        "{}{}  weight={} rows={}",
        "  ".repeat(depth),
        node.label,
        node.weight,
        node.row_count
    );
    for child in &node.children {
        print_node(child, depth + 1);
    }
}

fn bar_text(value: usize, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let width = (value * BAR_WIDTH).div_ceil(max);
    "#".repeat(width)
}

