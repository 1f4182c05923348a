use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{info, warn};
use movies_dashboard::viz::util::{format_count, map_locale};
use movies_dashboard::viz::{self, ChartData, ChartSpec, RenderOptions, Theme};
use movies_dashboard::{DashboardConfig, Dataset, FilterSelection, Genre, TitleCount, YearTrend};
use movies_dashboard::{api, stats, storage};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "movies",
    version,
    about = "Explore movie rating counts by year and genre, or serve the dashboard"
)]
struct Cli {
    /// Config file (TOML). Defaults to <config dir>/movies-dashboard/config.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Dataset CSV with title, year, rating, rating_count and one column per genre.
    #[arg(long, global = true, env = "MOVIES_DATA")]
    data: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the dashboard over HTTP.
    Serve(ServeArgs),
    /// Top 6 titles by rating count, optionally for one year and/or genre.
    Top(TopArgs),
    /// Top 10 titles by rating count since 2014.
    Trending(OutputArgs),
    /// Mean rating and total rating count per year, optionally for one genre.
    Trend(TrendArgs),
    /// Print a summary of the dataset and the dropdown choices.
    Info,
}

#[derive(ValueEnum, Clone, Debug)]
enum OutFormat {
    Csv,
    Json,
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to bind (default from config, else 127.0.0.1).
    #[arg(long)]
    host: Option<String>,
    /// Port to listen on (default from config, else 8055).
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug)]
struct TopArgs {
    /// Only rows from this year.
    #[arg(short, long)]
    year: Option<String>,
    /// Only rows flagged with this genre (e.g. Comedy, Sci-Fi, Film-Noir).
    #[arg(short, long)]
    genre: Option<String>,
    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug)]
struct TrendArgs {
    /// Only rows flagged with this genre.
    #[arg(short, long)]
    genre: Option<String>,
    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Save the table to file (format inferred by --format or extension).
    #[arg(long)]
    out: Option<PathBuf>,
    /// Output format (csv or json). If omitted, inferred from --out extension.
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
    /// Create a chart at the given path (.svg or .png).
    #[arg(long)]
    plot: Option<PathBuf>,
    /// Width of the plot (default from config, else 900).
    #[arg(long)]
    width: Option<u32>,
    /// Height of the plot (default from config, else 500).
    #[arg(long)]
    height: Option<u32>,
    /// Chart theme: dark or light.
    #[arg(long)]
    theme: Option<Theme>,
    /// Locale for number formatting (en, de, fr, ...).
    #[arg(long)]
    locale: Option<String>,
}

impl OutputArgs {
    fn render_options(&self, cfg: &DashboardConfig) -> RenderOptions {
        let mut opts = cfg.render_options();
        if let Some(w) = self.width {
            opts.width = w;
        }
        if let Some(h) = self.height {
            opts.height = h;
        }
        if let Some(t) = self.theme {
            opts.theme = t;
        }
        if let Some(l) = &self.locale {
            opts.locale = l.clone();
        }
        opts
    }

    fn export_format(&self, path: &Path) -> Result<OutFormat> {
        let fmt = match self.format {
            Some(OutFormat::Csv) => "csv",
            Some(OutFormat::Json) => "json",
            None => path.extension().and_then(|e| e.to_str()).unwrap_or("csv"),
        }
        .to_ascii_lowercase();
        match fmt.as_str() {
            "csv" => Ok(OutFormat::Csv),
            "json" => Ok(OutFormat::Json),
            other => bail!("unsupported format: {}", other),
        }
    }
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => {
            // Format up to 4 decimals, then trim trailing zeros and trailing dot.
            let s = format!("{:.4}", x);
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        }
        _ => "NA".to_string(),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let cfg = DashboardConfig::load(cli.config.as_deref())?;
    let data_path = cli
        .data
        .clone()
        .or_else(|| cfg.data_path.clone())
        .ok_or_else(|| {
            anyhow::anyhow!("no dataset given; pass --data, set MOVIES_DATA or data_path in the config")
        })?;
    let dataset = Dataset::load_csv(&data_path)
        .with_context(|| format!("cannot start without dataset {}", data_path.display()))?;

    match cli.cmd {
        Command::Serve(args) => cmd_serve(dataset, &cfg, args),
        Command::Top(args) => cmd_top(&dataset, &cfg, args),
        Command::Trending(args) => cmd_trending(&dataset, &cfg, args),
        Command::Trend(args) => cmd_trend(&dataset, &cfg, args),
        Command::Info => cmd_info(&dataset),
    }
}

fn cmd_serve(dataset: Dataset, cfg: &DashboardConfig, args: ServeArgs) -> Result<()> {
    let host = args.host.unwrap_or_else(|| cfg.host.clone());
    let port = args.port.unwrap_or(cfg.port);
    let render = cfg.render_options();
    if !viz::fonts_available(render.font_path.as_deref()) {
        warn!(
            "no chart font found; chart endpoints will fail until `font_path` or {} is set",
            viz::FONT_ENV
        );
    }

    let state = api::AppState::new(Arc::new(dataset), render);
    let app = api::build_router(state);
    let addr = format!("{host}:{port}");

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("binding {addr}"))?;
        info!("Movies Explorer Dashboard listening on http://{addr}");
        axum::serve(listener, app).await?;
        Ok::<(), anyhow::Error>(())
    })
}

fn cmd_top(dataset: &Dataset, cfg: &DashboardConfig, args: TopArgs) -> Result<()> {
    let (spec, rows) = match FilterSelection::parse(args.year.as_deref(), args.genre.as_deref()) {
        Some(sel) => (ChartSpec::top_movies(&sel), stats::top_movies(dataset, &sel)),
        None => {
            warn!("year/genre filter cannot match any row; result is empty");
            let spec = ChartSpec::top_movies_raw(args.year.as_deref(), args.genre.as_deref());
            (spec, Vec::new())
        }
    };
    let opts = args.output.render_options(cfg);
    print_ranking(&spec.title, &rows, &opts.locale);
    write_ranking(&rows, &spec, &opts, &args.output)
}

fn cmd_trending(dataset: &Dataset, cfg: &DashboardConfig, args: OutputArgs) -> Result<()> {
    let spec = ChartSpec::trending();
    let rows = stats::trending_movies(dataset);
    let opts = args.render_options(cfg);
    print_ranking(&spec.title, &rows, &opts.locale);
    write_ranking(&rows, &spec, &opts, &args)
}

fn cmd_trend(dataset: &Dataset, cfg: &DashboardConfig, args: TrendArgs) -> Result<()> {
    let spec = ChartSpec::rating_trend();
    let rows = match FilterSelection::parse(None, args.genre.as_deref()) {
        Some(sel) => stats::rating_trend(dataset, sel.genre),
        None => {
            warn!("unknown genre; result is empty");
            Vec::new()
        }
    };
    let opts = args.output.render_options(cfg);

    println!("{}", spec.title);
    if rows.is_empty() {
        println!("(no data)");
    }
    for r in &rows {
        println!(
            "{}  avg_rating={}  total_rating_count={}",
            r.year,
            fmt_opt(r.avg_rating),
            format_count(r.total_rating_count, map_locale(&opts.locale))
        );
    }

    if let Some(path) = args.output.out.as_ref() {
        match args.output.export_format(path)? {
            OutFormat::Csv => storage::save_year_trends_csv(&rows, path)?,
            OutFormat::Json => storage::save_json::<YearTrend, _>(&rows, path)?,
        }
        eprintln!("Saved {} rows to {}", rows.len(), path.display());
    }
    if let Some(plot_path) = args.output.plot.as_ref() {
        viz::render_to_file(ChartData::Trend(&rows), &spec, &opts, plot_path)?;
        eprintln!("Wrote plot to {}", plot_path.display());
    }
    Ok(())
}

fn cmd_info(dataset: &Dataset) -> Result<()> {
    let s = dataset.summary();
    println!("rows: {}", s.rows);
    println!("titles: {}", s.titles);
    println!("rows with non-numeric rating_count: {}", s.bad_rating_counts);
    println!("rows without year: {}", s.missing_years);
    println!("rows without title: {}", s.missing_titles);
    match (s.min_year, s.max_year) {
        (Some(lo), Some(hi)) => println!("years: {lo}..={hi} ({} distinct)", dataset.years().len()),
        _ => println!("years: none"),
    }
    let genres: Vec<&str> = Genre::ALL.iter().map(|g| g.column()).collect();
    println!("genres: {}", genres.join(", "));
    Ok(())
}

fn print_ranking(title: &str, rows: &[TitleCount], locale_tag: &str) {
    let locale = map_locale(locale_tag);
    println!("{title}");
    if rows.is_empty() {
        println!("(no data)");
    }
    for (i, r) in rows.iter().enumerate() {
        println!(
            "{:>2}. {}  rating_count={}",
            i + 1,
            r.title,
            format_count(r.rating_count, locale)
        );
    }
}

fn write_ranking(
    rows: &[TitleCount],
    spec: &ChartSpec,
    opts: &RenderOptions,
    args: &OutputArgs,
) -> Result<()> {
    if let Some(path) = args.out.as_ref() {
        match args.export_format(path)? {
            OutFormat::Csv => storage::save_title_counts_csv(rows, path)?,
            OutFormat::Json => storage::save_json(rows, path)?,
        }
        eprintln!("Saved {} rows to {}", rows.len(), path.display());
    }
    if let Some(plot_path) = args.plot.as_ref() {
        viz::plot_ranking(rows, spec, opts, plot_path)?;
        eprintln!("Wrote plot to {}", plot_path.display());
    }
    Ok(())
}
