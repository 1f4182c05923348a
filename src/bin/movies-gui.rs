/*!
 * Desktop dashboard for movies-dashboard
 *
 * A cross-platform window with:
 * - Year and genre dropdowns
 * - Top movies and trending bar charts, rating trend line chart
 * - An "Open dataset…" picker; loading runs on a background thread
 *
 * Platform support: Windows, macOS, Linux
 */

use anyhow::Result;
use eframe::egui;
use movies_dashboard::viz::{self, ChartData, ChartSpec, RenderOptions};
use movies_dashboard::{DashboardConfig, Dataset, FilterSelection, Genre, stats};
use std::path::PathBuf;
use std::sync::{Arc, mpsc};
use std::thread;

fn main() -> Result<(), eframe::Error> {
    // Enable logging for better debugging
    env_logger::init();

    let cfg = DashboardConfig::load(None).unwrap_or_else(|err| {
        log::warn!("{err}; using default settings");
        DashboardConfig::default()
    });
    let initial = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("MOVIES_DATA").map(PathBuf::from))
        .or_else(|| cfg.data_path.clone());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Movies Explorer Dashboard"),
        ..Default::default()
    };

    eframe::run_native(
        "Movies Explorer Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(DashboardApp::new(&cfg, initial)))),
    )
}

#[derive(Debug)]
enum LoadResult {
    Loaded(PathBuf, Dataset),
    Error(String),
}

/// A rendered chart and the inputs it was rendered for.
struct ChartSlot<K> {
    key: Option<K>,
    texture: Option<egui::TextureHandle>,
}

impl<K: PartialEq> ChartSlot<K> {
    fn new() -> Self {
        Self {
            key: None,
            texture: None,
        }
    }

    fn is_stale(&self, key: &K) -> bool {
        self.key.as_ref() != Some(key)
    }
}

/// Main application state
struct DashboardApp {
    render: RenderOptions,

    // Data
    dataset: Option<Arc<Dataset>>,
    data_path: String,
    /// Bumped on every successful load so all charts refresh.
    generation: u64,

    // Dropdowns
    year: Option<i32>,
    genre: Option<Genre>,

    // One slot per chart, keyed by the inputs it depends on
    top: ChartSlot<(u64, Option<i32>, Option<Genre>)>,
    trending: ChartSlot<u64>,
    trend: ChartSlot<(u64, Option<Genre>)>,

    // UI state
    is_loading: bool,
    status_message: String,
    error_message: String,

    // Background load
    load_receiver: Option<mpsc::Receiver<LoadResult>>,
}

impl DashboardApp {
    fn new(cfg: &DashboardConfig, initial: Option<PathBuf>) -> Self {
        let mut app = Self {
            render: cfg.render_options(),
            dataset: None,
            data_path: initial
                .as_ref()
                .map(|p| p.to_string_lossy().to_string())
                .unwrap_or_default(),
            generation: 0,
            year: None,
            genre: None,
            top: ChartSlot::new(),
            trending: ChartSlot::new(),
            trend: ChartSlot::new(),
            is_loading: false,
            status_message: String::new(),
            error_message: String::new(),
            load_receiver: None,
        };
        if let Some(path) = initial {
            app.start_load(path);
        }
        app
    }

    fn start_load(&mut self, path: PathBuf) {
        self.is_loading = true;
        self.error_message.clear();
        self.status_message = format!("Loading {}...", path.display());

        let (sender, receiver) = mpsc::channel();
        self.load_receiver = Some(receiver);

        thread::spawn(move || {
            let result = match Dataset::load_csv(&path) {
                Ok(ds) => LoadResult::Loaded(path, ds),
                Err(err) => LoadResult::Error(format!("Failed to load dataset: {err}")),
            };
            let _ = sender.send(result);
        });
    }

    fn check_load_result(&mut self) {
        if let Some(receiver) = &self.load_receiver
            && let Ok(result) = receiver.try_recv()
        {
            self.is_loading = false;
            self.load_receiver = None;

            match result {
                LoadResult::Loaded(path, ds) => {
                    self.status_message = format!(
                        "Loaded {} rows ({} titles) from {}",
                        ds.summary().rows,
                        ds.summary().titles,
                        path.display()
                    );
                    self.error_message.clear();
                    self.data_path = path.to_string_lossy().to_string();
                    // A year from the previous file may not exist in this one.
                    if let Some(y) = self.year
                        && !ds.years().contains(&y)
                    {
                        self.year = None;
                    }
                    self.dataset = Some(Arc::new(ds));
                    self.generation += 1;
                }
                LoadResult::Error(error) => {
                    self.error_message = error;
                    self.status_message.clear();
                }
            }
        }
    }

    /// Re-render only the charts whose inputs changed since the last frame.
    fn refresh_charts(&mut self, ctx: &egui::Context) {
        let Some(ds) = self.dataset.clone() else {
            return;
        };
        let generation = self.generation;
        let selection = FilterSelection::new(self.year, self.genre);

        let top_key = (generation, self.year, self.genre);
        if self.top.is_stale(&top_key) {
            let rows = stats::top_movies(&ds, &selection);
            let spec = ChartSpec::top_movies(&selection);
            self.top.texture = self.texture(ctx, "top-movies", ChartData::Ranking(&rows), &spec);
            self.top.key = Some(top_key);
        }

        if self.trending.is_stale(&generation) {
            let rows = stats::trending_movies(&ds);
            self.trending.texture =
                self.texture(ctx, "trending", ChartData::Ranking(&rows), &ChartSpec::trending());
            self.trending.key = Some(generation);
        }

        let trend_key = (generation, self.genre);
        if self.trend.is_stale(&trend_key) {
            let rows = stats::rating_trend(&ds, self.genre);
            self.trend.texture =
                self.texture(ctx, "rating-trend", ChartData::Trend(&rows), &ChartSpec::rating_trend());
            self.trend.key = Some(trend_key);
        }
    }

    fn texture(
        &mut self,
        ctx: &egui::Context,
        name: &str,
        data: ChartData<'_>,
        spec: &ChartSpec,
    ) -> Option<egui::TextureHandle> {
        match viz::render_rgb(data, spec, &self.render) {
            Ok(rgb) => {
                let size = [self.render.width as usize, self.render.height as usize];
                let image = egui::ColorImage::from_rgb(size, &rgb);
                Some(ctx.load_texture(name, image, egui::TextureOptions::LINEAR))
            }
            Err(err) => {
                self.error_message = format!("Failed to draw {}: {err:#}", spec.title);
                None
            }
        }
    }
}

fn show_chart(ui: &mut egui::Ui, texture: &Option<egui::TextureHandle>, max_width: f32) {
    match texture {
        Some(tex) => {
            ui.add(egui::Image::new(tex).max_width(max_width));
        }
        None => {
            ui.label("No chart");
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for completed background loads
        self.check_load_result();

        // Request repaint if loading (for spinner animation)
        if self.is_loading {
            ctx.request_repaint();
        }

        self.refresh_charts(ctx);

        let years: Vec<i32> = self
            .dataset
            .as_ref()
            .map(|d| d.years().to_vec())
            .unwrap_or_default();

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading("Movies Explorer Dashboard");
                ui.add_space(10.0);

                ui.horizontal(|ui| {
                    ui.label("Dataset:");
                    ui.text_edit_singleline(&mut self.data_path);
                    if ui.add_enabled(!self.is_loading, egui::Button::new("Load")).clicked()
                        && !self.data_path.trim().is_empty()
                    {
                        let path = PathBuf::from(self.data_path.trim());
                        self.start_load(path);
                    }
                    if ui
                        .add_enabled(!self.is_loading, egui::Button::new("Open dataset…"))
                        .clicked()
                        && let Some(path) = rfd::FileDialog::new()
                            .add_filter("CSV", &["csv", "xls", "txt"])
                            .pick_file()
                    {
                        self.start_load(path);
                    }
                    if self.is_loading {
                        ui.spinner();
                    }
                });

                ui.add_space(5.0);

                ui.horizontal(|ui| {
                    ui.label("Year");
                    egui::ComboBox::from_id_salt("year-dropdown")
                        .selected_text(
                            self.year
                                .map(|y| y.to_string())
                                .unwrap_or_else(|| "Select Year".to_string()),
                        )
                        .show_ui(ui, |ui| {
                            ui.selectable_value(&mut self.year, None, "All years");
                            for y in &years {
                                ui.selectable_value(&mut self.year, Some(*y), y.to_string());
                            }
                        });

                    ui.add_space(20.0);

                    ui.label("Genre");
                    egui::ComboBox::from_id_salt("genre-dropdown")
                        .selected_text(
                            self.genre
                                .map(|g| g.to_string())
                                .unwrap_or_else(|| "Select Genre".to_string()),
                        )
                        .show_ui(ui, |ui| {
                            ui.selectable_value(&mut self.genre, None, "All genres");
                            for g in Genre::ALL {
                                ui.selectable_value(&mut self.genre, Some(g), g.column());
                            }
                        });
                });

                ui.add_space(10.0);

                // Status messages
                if !self.status_message.is_empty() {
                    ui.colored_label(egui::Color32::DARK_GREEN, &self.status_message);
                }

                if !self.error_message.is_empty() {
                    ui.colored_label(egui::Color32::RED, &self.error_message);
                }

                if self.dataset.is_none() {
                    return;
                }

                let half = (ui.available_width() / 2.0 - 8.0).max(200.0);
                ui.horizontal(|ui| {
                    show_chart(ui, &self.top.texture, half);
                    show_chart(ui, &self.trending.texture, half);
                });
                ui.add_space(10.0);
                let full = ui.available_width();
                show_chart(ui, &self.trend.texture, full);
            });
        });
    }
}
