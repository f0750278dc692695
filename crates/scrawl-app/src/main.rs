use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use eframe::egui::{self, Color32, RichText};
use scrawl_lang::symbols::{SymbolKind, SymbolTable};
use scrawl_renderer::{
    DirSource, Lifecycle, MemorySurface, PixelFormat, ScriptSource, SessionError, SurfaceSession,
};
use tracing_subscriber::EnvFilter;

const DEMO: &str = "// Clear screen
setColor(WHITE);
drawRect(0, 0, SCREEN_WIDTH, SCREEN_HEIGHT);

// Draw a blue circle
setColor(BLUE);
drawCircle(250, 250, 100);

// Draw a red rectangle
setColor(RED);
drawRect(100, 100, 150, 150);

// Draw a green circle
setColor(GREEN);
drawCircle(400, 400, 80);
";

#[derive(Parser, Debug)]
#[command(name = "scrawl", version, about = "Scrawl drawing script dev window")]
struct Args {
    /// Directory scripts are loaded from
    #[arg(long, default_value = "scripts")]
    assets: PathBuf,

    /// Script to load at start-up
    #[arg(long, default_value = "app.js")]
    script: String,

    #[arg(long, default_value_t = 1400.0)]
    width: f32,

    #[arg(long, default_value_t = 800.0)]
    height: f32,
}

fn mono_row(ui: &mut egui::Ui, label: &str, value: &str) {
    ui.horizontal(|ui| {
        ui.label(RichText::new(label).monospace().color(Color32::from_rgb(140, 140, 140)));
        ui.label(RichText::new(value).monospace().color(Color32::from_rgb(210, 210, 170)));
    });
}

fn main() -> eframe::Result {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([args.width, args.height]),
        ..Default::default()
    };
    eframe::run_native("Scrawl Dev", options, Box::new(move |_cc| Ok(Box::new(App::new(args)))))
}

// ─── App state ────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, PartialEq)]
enum Tab { Canvas, Output, Errors, Symbols }

struct App {
    source: String,
    script_name: String,
    assets: DirSource,
    surface: Arc<MemorySurface>,
    session: SurfaceSession<MemorySurface>,
    /// Last compile or load error; cleared by the next accepted script.
    script_error: Option<String>,
    tab: Tab,
    texture: Option<egui::TextureHandle>,
    texture_frame: u64,
}

impl App {
    fn new(args: Args) -> Self {
        let assets = DirSource::new(&args.assets);
        let source = assets.read(&args.script).unwrap_or_else(|e| {
            tracing::warn!(error = %e, assets = %args.assets.display(), "falling back to demo script");
            DEMO.to_string()
        });

        // Real size arrives from the canvas panel on the first frame.
        let surface = Arc::new(MemorySurface::new(0, 0));
        let session = SurfaceSession::new(&surface);
        if let Err(e) = session.on_surface_created() {
            tracing::error!(error = %e, "surface setup failed");
        }

        let mut app = Self {
            source,
            script_name: args.script,
            assets,
            surface,
            session,
            script_error: None,
            tab: Tab::Canvas,
            texture: None,
            texture_frame: 0,
        };
        app.apply_source();
        app
    }

    fn apply_source(&mut self) {
        self.record(self.session.set_script(self.source.as_str()));
    }

    fn reload(&mut self) {
        match self.assets.read(&self.script_name) {
            Ok(text) => {
                self.source = text;
                self.apply_source();
            }
            Err(e) => self.record(Err(e.into())),
        }
    }

    fn record(&mut self, result: Result<(), SessionError>) {
        self.script_error = result.err().map(|e| e.to_string());
    }

    fn runtime_errors(&self) -> Vec<String> {
        self.session
            .last_report()
            .map(|r| r.exec.errors.iter().map(ToString::to_string).collect())
            .unwrap_or_default()
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Err(e) = self.session.on_surface_destroyed() {
            tracing::warn!(error = %e, "surface teardown");
        }
        self.surface.invalidate();
    }
}

// ─── UI ───────────────────────────────────────────────────────────────────────

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.columns(2, |cols| {
                // ── Left: editor ──────────────────────────────────────────────
                cols[0].vertical(|ui| {
                    ui.label(format!("Source ({})", self.script_name));
                    let response = ui.add(
                        egui::TextEdit::multiline(&mut self.source)
                            .font(egui::TextStyle::Monospace)
                            .desired_width(f32::INFINITY)
                            .desired_rows(44),
                    );
                    if response.changed() {
                        self.apply_source();
                    }
                });

                // ── Right: output ─────────────────────────────────────────────
                cols[1].vertical(|ui| {
                    // ── Status bar ────────────────────────────────────────────
                    ui.horizontal(|ui| {
                        let error_count = self.script_error.iter().count() + self.runtime_errors().len();
                        if error_count == 0 {
                            ui.label(RichText::new("✓  no errors").color(Color32::from_rgb(80, 200, 80)));
                        } else {
                            ui.label(RichText::new(format!("✗  {error_count} error(s)")).color(Color32::from_rgb(220, 80, 80)));
                        }
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("reload").clicked() {
                                self.reload();
                            }
                            if ui.button("redraw").clicked() {
                                if let Err(e) = self.session.redraw() {
                                    tracing::warn!(error = %e, "redraw");
                                }
                            }
                        });
                    });

                    ui.separator();

                    // ── Tab bar ───────────────────────────────────────────────
                    ui.horizontal(|ui| {
                        ui.selectable_value(&mut self.tab, Tab::Canvas, "Canvas");
                        ui.selectable_value(&mut self.tab, Tab::Output, "Output");
                        let errors = self.script_error.iter().count() + self.runtime_errors().len();
                        let err_label = if errors == 0 { "Errors".into() } else { format!("Errors ({errors})") };
                        ui.selectable_value(&mut self.tab, Tab::Errors, err_label);
                        ui.selectable_value(&mut self.tab, Tab::Symbols, "Symbols");
                    });

                    ui.separator();

                    // ── Tab content ───────────────────────────────────────────
                    match self.tab {
                        Tab::Canvas => self.show_canvas(ui),
                        tab => {
                            egui::ScrollArea::vertical().show(ui, |ui| match tab {
                                Tab::Output  => self.show_output(ui),
                                Tab::Errors  => self.show_errors(ui),
                                Tab::Symbols => self.show_symbols(ui),
                                Tab::Canvas  => {}
                            });
                        }
                    }
                });
            });
        });
    }
}

impl App {
    /// The panel is the surface: its size drives `on_surface_changed`.
    fn show_canvas(&mut self, ui: &mut egui::Ui) {
        let avail = ui.available_size();
        let (width, height) = (avail.x.floor() as i32, avail.y.floor() as i32);
        if width > 0 && height > 0 && self.session.dimensions() != (width, height) {
            self.surface.resize(width, height);
            let result = self.session.on_surface_changed(width, height, PixelFormat::Rgba8888);
            if let Err(e) = result {
                tracing::warn!(error = %e, "canvas resize");
            }
        }

        let frames = self.surface.frames_presented();
        if frames != self.texture_frame || self.texture.is_none() {
            if let Some(front) = self.surface.front() {
                let image = egui::ColorImage::from_rgba_unmultiplied(
                    [front.width() as usize, front.height() as usize],
                    &front.to_rgba8(),
                );
                self.texture = Some(ui.ctx().load_texture("canvas", image, egui::TextureOptions::NEAREST));
                self.texture_frame = frames;
            }
        }

        match &self.texture {
            Some(texture) => {
                ui.add(egui::Image::new((texture.id(), texture.size_vec2())));
            }
            None => {
                let msg = match self.session.lifecycle() {
                    Lifecycle::Destroyed => "Surface destroyed.",
                    _ if self.session.script().is_none() => "Fix errors to draw.",
                    _ => "Waiting for first frame…",
                };
                ui.label(RichText::new(msg).color(Color32::GRAY));
            }
        }
    }

    fn show_output(&self, ui: &mut egui::Ui) {
        let (width, height) = self.session.dimensions();
        mono_row(ui, "surface  ", &format!("{width}×{height}  {:?}", self.session.pixel_format()));
        mono_row(ui, "state    ", &self.session.lifecycle().to_string());
        mono_row(ui, "passes   ", &self.session.passes_completed().to_string());
        let Some(report) = self.session.last_report() else {
            ui.separator();
            ui.label(RichText::new("No pass yet.").color(Color32::GRAY));
            return;
        };
        mono_row(ui, "last pass", &format!(
            "{}×{}, {} commands, {} shapes, presented: {}",
            report.width, report.height, report.exec.commands_run, report.exec.shapes_drawn, report.presented,
        ));

        ui.separator();

        if report.calls.is_empty() {
            ui.label(RichText::new("No draw calls.").color(Color32::GRAY));
            return;
        }
        for (i, call) in report.calls.iter().enumerate() {
            ui.label(RichText::new(format!("{i:>3}  {call}")).monospace());
        }
    }

    fn show_errors(&self, ui: &mut egui::Ui) {
        let runtime = self.runtime_errors();
        if self.script_error.is_none() && runtime.is_empty() {
            ui.label(RichText::new("No errors.").color(Color32::GRAY));
            return;
        }
        if let Some(msg) = &self.script_error {
            ui.label(RichText::new(msg).monospace().color(Color32::from_rgb(220, 80, 80)));
        }
        for msg in &runtime {
            ui.label(RichText::new(msg).monospace().color(Color32::from_rgb(220, 180, 60)));
        }
    }

    fn show_symbols(&self, ui: &mut egui::Ui) {
        let table = SymbolTable::standard();

        egui::Grid::new("symbols_grid")
            .striped(true)
            .min_col_width(80.0)
            .show(ui, |ui| {
                ui.label(RichText::new("name").strong());
                ui.label(RichText::new("kind").strong());
                ui.label(RichText::new("detail").strong());
                ui.end_row();

                for symbol in table.functions().chain(table.constants()) {
                    let (kind, detail, kind_color) = match symbol.kind {
                        SymbolKind::Function(b) => (
                            "fn",
                            format!("({})", b.params().join(", ")),
                            Color32::from_rgb(100, 180, 255),
                        ),
                        SymbolKind::Color(c) => {
                            let [r, g, b, a] = c.rgba();
                            ("color", format!("rgba({r}, {g}, {b}, {a})"), Color32::from_rgb(255, 200, 80))
                        }
                        SymbolKind::Dimension(_) => (
                            "const",
                            "surface size at draw time".to_string(),
                            Color32::from_rgb(180, 255, 180),
                        ),
                    };
                    ui.label(RichText::new(symbol.name).monospace());
                    ui.label(RichText::new(kind).monospace().color(kind_color));
                    ui.label(RichText::new(detail).monospace().color(Color32::from_rgb(200, 200, 200)));
                    ui.end_row();
                }
            });
    }
}
